pub mod error;
pub mod geometry;

pub use error::GridError;
pub use geometry::{LineSegment, SphereBound, SphericalVoxel, TrigValues};
