use slotmap::SlotMap;

use crate::math::{Point2, Vector2};

slotmap::new_key_type! {
    /// Unique identifier for a layer attached to a rendering surface.
    pub struct LayerId;
}

/// Axis-aligned visible extent of a map view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min: Point2,
    pub max: Point2,
}

impl Extent {
    /// Creates an extent from its min and max corners.
    #[must_use]
    pub fn new(min: Point2, max: Point2) -> Self {
        Self { min, max }
    }

    /// Returns `true` if `point` lies inside the extent (inclusive).
    #[must_use]
    pub fn contains(&self, point: Point2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }
}

/// Rendering surface collaborator for the vertex session.
///
/// The session controller receives its surface at construction rather
/// than fetching a process-wide map singleton; any map binding that can
/// layer point markers and move its view can implement this.
pub trait RenderSurface {
    /// Looks up an existing layer by key.
    fn find_layer(&self, key: &str) -> Option<LayerId>;

    /// Creates a layer and attaches it to the surface.
    fn add_layer(&mut self, key: &str) -> LayerId;

    /// Detaches a layer entirely. Unknown ids are ignored.
    fn remove_layer(&mut self, layer: LayerId);

    /// Adds a point marker to a layer's source.
    fn place_marker(&mut self, layer: LayerId, point: Point2);

    /// Clears all markers from a layer's source.
    fn clear_markers(&mut self, layer: LayerId);

    /// Current visible extent of the view.
    fn visible_extent(&self) -> Extent;

    /// Current view center.
    fn center(&self) -> Point2;

    /// Recenters the view without changing zoom.
    fn set_center(&mut self, center: Point2);
}

#[derive(Debug, Clone)]
struct MarkerLayer {
    key: String,
    markers: Vec<Point2>,
}

/// In-memory [`RenderSurface`] backed by a slotmap layer store.
///
/// Reference implementation used by the tests and the demo; real map
/// bindings substitute their own surface.
#[derive(Debug)]
pub struct MapSurface {
    layers: SlotMap<LayerId, MarkerLayer>,
    center: Point2,
    half_size: Vector2,
}

impl MapSurface {
    /// Creates a surface with a view of `width` x `height` map units
    /// centered on `center`.
    #[must_use]
    pub fn new(center: Point2, width: f64, height: f64) -> Self {
        Self {
            layers: SlotMap::with_key(),
            center,
            half_size: Vector2::new(width / 2.0, height / 2.0),
        }
    }

    /// Markers currently present on `layer`.
    #[must_use]
    pub fn markers(&self, layer: LayerId) -> &[Point2] {
        self.layers.get(layer).map_or(&[], |l| &l.markers)
    }

    /// Number of layers attached to the surface.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }
}

impl RenderSurface for MapSurface {
    fn find_layer(&self, key: &str) -> Option<LayerId> {
        self.layers
            .iter()
            .find(|(_, layer)| layer.key == key)
            .map(|(id, _)| id)
    }

    fn add_layer(&mut self, key: &str) -> LayerId {
        self.layers.insert(MarkerLayer {
            key: key.to_string(),
            markers: Vec::new(),
        })
    }

    fn remove_layer(&mut self, layer: LayerId) {
        self.layers.remove(layer);
    }

    fn place_marker(&mut self, layer: LayerId, point: Point2) {
        if let Some(layer) = self.layers.get_mut(layer) {
            layer.markers.push(point);
        }
    }

    fn clear_markers(&mut self, layer: LayerId) {
        if let Some(layer) = self.layers.get_mut(layer) {
            layer.markers.clear();
        }
    }

    fn visible_extent(&self) -> Extent {
        Extent::new(self.center - self.half_size, self.center + self.half_size)
    }

    fn center(&self) -> Point2 {
        self.center
    }

    fn set_center(&mut self, center: Point2) {
        self.center = center;
    }
}
