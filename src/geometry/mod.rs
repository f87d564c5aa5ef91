pub mod feature;
pub mod ring;

pub use feature::{Feature, Geometry, RawRing};
pub use ring::CoordinateRing;
