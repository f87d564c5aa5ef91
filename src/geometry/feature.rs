use crate::error::{GeometryError, Result};
use crate::math::Point2;

/// A stored ring: closed coordinate sequence with first == last.
pub type RawRing = Vec<Point2>;

/// Feature geometry as exposed by the map collaborator.
///
/// Editing always targets the first ring of the first part, so the only
/// distinction that matters here is the nesting depth of single-part
/// versus multi-part geometries.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// Single-part: exterior ring plus optional interior rings.
    Polygon(Vec<RawRing>),
    /// Multi-part: one list of rings per part.
    MultiPolygon(Vec<Vec<RawRing>>),
}

impl Geometry {
    /// Returns the editable ring, the first ring of the first part.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NoRing`] if the geometry holds no ring.
    pub fn first_ring(&self) -> Result<&RawRing> {
        match self {
            Self::Polygon(rings) => rings.first(),
            Self::MultiPolygon(parts) => parts.first().and_then(|rings| rings.first()),
        }
        .ok_or_else(|| GeometryError::NoRing.into())
    }

    /// Replaces the editable ring with `ring`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NoRing`] if the geometry holds no ring
    /// to replace.
    pub fn set_first_ring(&mut self, ring: RawRing) -> Result<()> {
        let slot = match self {
            Self::Polygon(rings) => rings.first_mut(),
            Self::MultiPolygon(parts) => parts.first_mut().and_then(|rings| rings.first_mut()),
        };
        match slot {
            Some(slot) => {
                *slot = ring;
                Ok(())
            }
            None => Err(GeometryError::NoRing.into()),
        }
    }
}

/// An editable map feature: identity plus geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    id: String,
    geometry: Geometry,
}

impl Feature {
    /// Creates a feature with the given identity and geometry.
    #[must_use]
    pub fn new(id: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            id: id.into(),
            geometry,
        }
    }

    /// The feature's identity, used to key its marker layer.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The feature's current geometry.
    #[must_use]
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Mutable access to the feature's geometry.
    pub fn geometry_mut(&mut self) -> &mut Geometry {
        &mut self.geometry
    }

    /// Replaces the feature's geometry.
    pub fn set_geometry(&mut self, geometry: Geometry) {
        self.geometry = geometry;
    }
}
