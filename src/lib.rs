//! Ray traversal over spherical voxel grids: the ordered sequence of
//! (radial, polar, azimuthal) voxels a ray passes through, with entry and
//! exit times per voxel.

pub mod float_cmp;
pub mod grid;
pub mod ray;
pub mod traversal;
pub mod types;

pub use grid::{AngularPlane, PlaneAxis, SphericalVoxelGrid};
pub use ray::{Ray, RaySegment};
pub use traversal::walk_spherical_volume;
pub use types::{GridError, LineSegment, SphereBound, SphericalVoxel, TrigValues};
