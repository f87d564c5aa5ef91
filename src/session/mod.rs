pub mod controller;
pub mod interaction;
pub mod table;

pub use controller::{Key, ModifyDragStart, SessionEvent, VertexSessionController};
pub use interaction::{InteractionMode, SpatialInteractionSet};
pub use table::{FieldEdit, NavDirection, VertexRow, VertexTable};
