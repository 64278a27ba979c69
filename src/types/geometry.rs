//! Value types shared by the grid and the traversal.

/// Radial/polar/azimuthal bounds of a spherical grid. Angular components are
/// radians; a full sphere spans `[0, 2π]` in both angular axes.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SphereBound {
    pub radial: f64,
    pub polar: f64,
    pub azimuthal: f64,
}

/// A voxel boundary point in its 2-D active plane: `(x, y)` for polar
/// boundaries, `(x, z)` for azimuthal boundaries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub p1: f64,
    pub p2: f64,
}

/// Cosine/sine pair for one angular boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrigValues {
    pub cosine: f64,
    pub sine: f64,
}

/// One traversed voxel with the ray times at which it was entered and left.
///
/// The radial index is 1-based and grows toward the sphere center (`1` is
/// the outermost shell); polar and azimuthal indices are 0-based.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SphericalVoxel {
    pub radial: usize,
    pub polar: usize,
    pub azimuthal: usize,
    pub enter_t: f64,
    pub exit_t: f64,
}
