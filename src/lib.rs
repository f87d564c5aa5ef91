pub mod error;
pub mod geometry;
pub mod math;
pub mod session;
pub mod view;

pub use error::{EditError, Result};
