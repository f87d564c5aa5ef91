use super::surface::{LayerId, RenderSurface};
use crate::math::Point2;

const LAYER_SUFFIX: &str = "_vertex-marker";

/// Single-feature marker channel showing the focused vertex.
///
/// The backing layer is keyed by feature identity and shared across
/// sessions on the same feature: an existing layer is reused, otherwise
/// one is created and attached. Only [`MarkerOverlay::detach`] removes
/// it from the surface.
#[derive(Debug, Clone, Copy)]
pub struct MarkerOverlay {
    layer: LayerId,
}

impl MarkerOverlay {
    /// Binds to the marker layer for `feature_id`, creating it when
    /// absent.
    #[must_use]
    pub fn attach<S: RenderSurface>(surface: &mut S, feature_id: &str) -> Self {
        let key = format!("{feature_id}{LAYER_SUFFIX}");
        let layer = match surface.find_layer(&key) {
            Some(layer) => layer,
            None => surface.add_layer(&key),
        };
        Self { layer }
    }

    /// Shows a single marker at `point`, replacing any existing marker.
    ///
    /// If the point lies outside the visible extent, the view recenters
    /// on it without a zoom change.
    pub fn show<S: RenderSurface>(self, surface: &mut S, point: Point2) {
        surface.clear_markers(self.layer);
        surface.place_marker(self.layer, point);
        if !surface.visible_extent().contains(point) {
            surface.set_center(point);
        }
    }

    /// Removes every marker. Idempotent.
    pub fn clear<S: RenderSurface>(self, surface: &mut S) {
        surface.clear_markers(self.layer);
    }

    /// Detaches the backing layer from the surface entirely.
    pub fn detach<S: RenderSurface>(self, surface: &mut S) {
        surface.remove_layer(self.layer);
    }

    /// The backing layer id.
    #[must_use]
    pub fn layer(self) -> LayerId {
        self.layer
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::view::surface::MapSurface;

    fn surface() -> MapSurface {
        MapSurface::new(Point2::new(0.0, 0.0), 20.0, 20.0)
    }

    #[test]
    fn attach_reuses_existing_layer() {
        let mut surface = surface();
        let first = MarkerOverlay::attach(&mut surface, "parcel-1");
        let second = MarkerOverlay::attach(&mut surface, "parcel-1");
        assert_eq!(first.layer(), second.layer());
        assert_eq!(surface.layer_count(), 1);

        let other = MarkerOverlay::attach(&mut surface, "parcel-2");
        assert_ne!(first.layer(), other.layer());
        assert_eq!(surface.layer_count(), 2);
    }

    #[test]
    fn show_holds_at_most_one_marker() {
        let mut surface = surface();
        let overlay = MarkerOverlay::attach(&mut surface, "f");
        overlay.show(&mut surface, Point2::new(1.0, 1.0));
        overlay.show(&mut surface, Point2::new(2.0, 2.0));
        assert_eq!(surface.markers(overlay.layer()), &[Point2::new(2.0, 2.0)]);
    }

    #[test]
    fn show_recenters_only_when_off_extent() {
        let mut surface = surface();
        let overlay = MarkerOverlay::attach(&mut surface, "f");

        overlay.show(&mut surface, Point2::new(5.0, 5.0));
        assert_eq!(surface.center(), Point2::new(0.0, 0.0));

        overlay.show(&mut surface, Point2::new(50.0, -3.0));
        assert_eq!(surface.center(), Point2::new(50.0, -3.0));
    }

    #[test]
    fn clear_and_detach() {
        let mut surface = surface();
        let overlay = MarkerOverlay::attach(&mut surface, "f");
        overlay.show(&mut surface, Point2::new(1.0, 1.0));
        overlay.clear(&mut surface);
        assert!(surface.markers(overlay.layer()).is_empty());
        overlay.clear(&mut surface);

        overlay.detach(&mut surface);
        assert_eq!(surface.layer_count(), 0);
    }
}
