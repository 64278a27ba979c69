mod tables;

use glam::DVec3;

use crate::ray::Ray;
use crate::traversal::walk_spherical_volume;
use crate::types::{GridError, LineSegment, SphereBound, SphericalVoxel, TrigValues};

/// Second coordinate axis of an angular plane: the polar sections live in
/// the XY plane, the azimuthal sections in the XZ plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneAxis {
    Y,
    Z,
}

impl PlaneAxis {
    #[inline]
    pub(crate) fn index(self) -> usize {
        match self {
            PlaneAxis::Y => 1,
            PlaneAxis::Z => 2,
        }
    }
}

/// Read-only view of everything the angular hit kernel needs about one
/// angular axis: boundary points on the outer sphere, the vectors from those
/// points back to the center, the section geometry, and the plane selector.
///
/// Borrowed from the grid, so one grid can serve any number of concurrent
/// traversals.
#[derive(Debug, Clone, Copy)]
pub struct AngularPlane<'a> {
    pub boundaries: &'a [LineSegment],
    pub center_to_bound: &'a [DVec3],
    pub axis: PlaneAxis,
    pub num_sections: usize,
    pub delta: f64,
    pub min_bound: f64,
    pub max_bound: f64,
    pub center: DVec3,
    pub max_radius: f64,
}

impl AngularPlane<'_> {
    /// Whether stepping `step` sections from `voxel` stays within the
    /// angular bounds of the grid. Always true for a full `[0, 2π]` range;
    /// for sectored grids a crossing out of the covered wedge ends the
    /// traversal.
    pub fn step_in_bounds(&self, step: i64, voxel: i64) -> bool {
        let radian = (voxel + 1) as f64 * self.delta;
        let angval = radian - (step as f64 * self.delta).abs();
        angval <= self.max_bound && angval >= self.min_bound
    }
}

/// A sphere partitioned into voxels by concentric shells, polar half-planes
/// (XY), and azimuthal half-planes (XZ).
///
/// All derived quantities used by the traversal are computed once here:
/// squared shell radii in descending order, boundary trig tables, boundary
/// points on the outer sphere, and center-to-boundary vectors. The grid is
/// immutable afterwards and can be shared across threads.
#[derive(Debug, Clone)]
pub struct SphericalVoxelGrid {
    num_radial_sections: usize,
    num_polar_sections: usize,
    num_azimuthal_sections: usize,
    sphere_center: DVec3,
    sphere_min_bound_polar: f64,
    sphere_max_bound_polar: f64,
    sphere_min_bound_azimuthal: f64,
    sphere_max_bound_azimuthal: f64,
    sphere_max_radius: f64,
    sphere_max_diameter: f64,
    delta_radius: f64,
    delta_theta: f64,
    delta_phi: f64,
    delta_radii_squared: Vec<f64>,
    polar_trig_values: Vec<TrigValues>,
    azimuthal_trig_values: Vec<TrigValues>,
    p_max_polar: Vec<LineSegment>,
    p_max_azimuthal: Vec<LineSegment>,
    center_to_polar_bound: Vec<DVec3>,
    center_to_azimuthal_bound: Vec<DVec3>,
}

impl SphericalVoxelGrid {
    pub fn new(
        min_bound: SphereBound,
        max_bound: SphereBound,
        num_radial_sections: usize,
        num_polar_sections: usize,
        num_azimuthal_sections: usize,
        sphere_center: DVec3,
    ) -> Result<Self, GridError> {
        if num_radial_sections == 0 || num_polar_sections == 0 || num_azimuthal_sections == 0 {
            return Err(GridError::InvalidSectionCount(format!(
                "section counts must be non-zero, got ({}, {}, {})",
                num_radial_sections, num_polar_sections, num_azimuthal_sections
            )));
        }
        if min_bound.radial < 0.0 || max_bound.radial <= min_bound.radial {
            return Err(GridError::InvalidBounds(format!(
                "radial range [{}, {}] is empty or negative",
                min_bound.radial, max_bound.radial
            )));
        }
        if max_bound.polar < min_bound.polar || max_bound.azimuthal < min_bound.azimuthal {
            return Err(GridError::InvalidBounds(format!(
                "angular bounds are inverted: polar [{}, {}], azimuthal [{}, {}]",
                min_bound.polar, max_bound.polar, min_bound.azimuthal, max_bound.azimuthal
            )));
        }

        let sphere_max_radius = max_bound.radial;
        let delta_radius = (max_bound.radial - min_bound.radial) / num_radial_sections as f64;
        let delta_theta = (max_bound.polar - min_bound.polar) / num_polar_sections as f64;
        let delta_phi = (max_bound.azimuthal - min_bound.azimuthal) / num_azimuthal_sections as f64;

        let delta_radii_squared = tables::delta_radii_squared(
            num_radial_sections,
            max_bound.radial - min_bound.radial,
            delta_radius,
        );
        let polar_trig_values = tables::trig_values(num_polar_sections, min_bound.polar, delta_theta);
        let azimuthal_trig_values =
            tables::trig_values(num_azimuthal_sections, min_bound.azimuthal, delta_phi);
        let p_max_polar = tables::max_radius_segments(
            &polar_trig_values,
            sphere_center.x,
            sphere_center.y,
            sphere_max_radius,
        );
        let p_max_azimuthal = tables::max_radius_segments(
            &azimuthal_trig_values,
            sphere_center.x,
            sphere_center.z,
            sphere_max_radius,
        );
        let center_to_polar_bound =
            tables::center_to_bound_vectors(&p_max_polar, sphere_center, PlaneAxis::Y.index());
        let center_to_azimuthal_bound =
            tables::center_to_bound_vectors(&p_max_azimuthal, sphere_center, PlaneAxis::Z.index());

        Ok(Self {
            num_radial_sections,
            num_polar_sections,
            num_azimuthal_sections,
            sphere_center,
            sphere_min_bound_polar: min_bound.polar,
            sphere_max_bound_polar: max_bound.polar,
            sphere_min_bound_azimuthal: min_bound.azimuthal,
            sphere_max_bound_azimuthal: max_bound.azimuthal,
            sphere_max_radius,
            sphere_max_diameter: sphere_max_radius * 2.0,
            delta_radius,
            delta_theta,
            delta_phi,
            delta_radii_squared,
            polar_trig_values,
            azimuthal_trig_values,
            p_max_polar,
            p_max_azimuthal,
            center_to_polar_bound,
            center_to_azimuthal_bound,
        })
    }

    /// Walk a ray through the grid. See [`walk_spherical_volume`].
    pub fn walk(&self, ray: &Ray, max_t: f64) -> Vec<SphericalVoxel> {
        walk_spherical_volume(ray, self, max_t)
    }

    #[inline]
    pub fn num_radial_sections(&self) -> usize {
        self.num_radial_sections
    }

    #[inline]
    pub fn num_polar_sections(&self) -> usize {
        self.num_polar_sections
    }

    #[inline]
    pub fn num_azimuthal_sections(&self) -> usize {
        self.num_azimuthal_sections
    }

    #[inline]
    pub fn sphere_center(&self) -> DVec3 {
        self.sphere_center
    }

    #[inline]
    pub fn sphere_max_radius(&self) -> f64 {
        self.sphere_max_radius
    }

    #[inline]
    pub fn sphere_max_diameter(&self) -> f64 {
        self.sphere_max_diameter
    }

    #[inline]
    pub fn sphere_min_bound_polar(&self) -> f64 {
        self.sphere_min_bound_polar
    }

    #[inline]
    pub fn sphere_max_bound_polar(&self) -> f64 {
        self.sphere_max_bound_polar
    }

    #[inline]
    pub fn sphere_min_bound_azimuthal(&self) -> f64 {
        self.sphere_min_bound_azimuthal
    }

    #[inline]
    pub fn sphere_max_bound_azimuthal(&self) -> f64 {
        self.sphere_max_bound_azimuthal
    }

    #[inline]
    pub fn delta_radius(&self) -> f64 {
        self.delta_radius
    }

    #[inline]
    pub fn delta_theta(&self) -> f64 {
        self.delta_theta
    }

    #[inline]
    pub fn delta_phi(&self) -> f64 {
        self.delta_phi
    }

    /// Squared radius of shell `i`, `i` in `0..=num_radial_sections`,
    /// descending from the outer sphere to the innermost bound.
    #[inline]
    pub fn delta_radii_squared(&self, i: usize) -> f64 {
        self.delta_radii_squared[i]
    }

    #[inline]
    pub fn p_max_polar(&self) -> &[LineSegment] {
        &self.p_max_polar
    }

    #[inline]
    pub fn p_max_azimuthal(&self) -> &[LineSegment] {
        &self.p_max_azimuthal
    }

    #[inline]
    pub fn center_to_polar_bound(&self, i: usize) -> DVec3 {
        self.center_to_polar_bound[i]
    }

    #[inline]
    pub fn center_to_azimuthal_bound(&self, i: usize) -> DVec3 {
        self.center_to_azimuthal_bound[i]
    }

    #[inline]
    pub fn polar_trig_values(&self) -> &[TrigValues] {
        &self.polar_trig_values
    }

    #[inline]
    pub fn azimuthal_trig_values(&self) -> &[TrigValues] {
        &self.azimuthal_trig_values
    }

    /// Polar (XY plane) boundary tables bundled for the angular hit kernel.
    pub fn polar_plane(&self) -> AngularPlane<'_> {
        AngularPlane {
            boundaries: &self.p_max_polar,
            center_to_bound: &self.center_to_polar_bound,
            axis: PlaneAxis::Y,
            num_sections: self.num_polar_sections,
            delta: self.delta_theta,
            min_bound: self.sphere_min_bound_polar,
            max_bound: self.sphere_max_bound_polar,
            center: self.sphere_center,
            max_radius: self.sphere_max_radius,
        }
    }

    /// Azimuthal (XZ plane) boundary tables bundled for the angular hit
    /// kernel.
    pub fn azimuthal_plane(&self) -> AngularPlane<'_> {
        AngularPlane {
            boundaries: &self.p_max_azimuthal,
            center_to_bound: &self.center_to_azimuthal_bound,
            axis: PlaneAxis::Z,
            num_sections: self.num_azimuthal_sections,
            delta: self.delta_phi,
            min_bound: self.sphere_min_bound_azimuthal,
            max_bound: self.sphere_max_bound_azimuthal,
            center: self.sphere_center,
            max_radius: self.sphere_max_radius,
        }
    }
}
