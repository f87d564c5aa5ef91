pub mod marker;
pub mod surface;

pub use marker::MarkerOverlay;
pub use surface::{Extent, LayerId, MapSurface, RenderSurface};
