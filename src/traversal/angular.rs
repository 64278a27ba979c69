use glam::DVec3;

use crate::float_cmp::{is_equal, less_than};
use crate::grid::AngularPlane;
use crate::ray::{Ray, RaySegment};
use crate::types::LineSegment;

use super::{HitParameters, NO_HIT};

/// The angular cell containing the in-plane point `(p1, p2)`.
///
/// A point lies between two boundary points on the circle iff the angle it
/// subtends with them is obtuse; equality means the point sits on a
/// boundary, which resolves to the lower-index cell because the scan returns
/// at the first match. Returns `len + 1` when no cell contains the point.
pub(super) fn angular_voxel_id_from_points(
    angular_max: &[LineSegment],
    p1: f64,
    p2: f64,
) -> usize {
    for i in 0..angular_max.len() - 1 {
        let j = i + 1;
        let x_diff = angular_max[i].p1 - angular_max[j].p1;
        let y_diff = angular_max[i].p2 - angular_max[j].p2;
        let x_p1_diff = angular_max[i].p1 - p1;
        let x_p2_diff = angular_max[i].p2 - p2;
        let y_p1_diff = angular_max[j].p1 - p1;
        let y_p2_diff = angular_max[j].p2 - p2;
        let d1d2 = (x_p1_diff * x_p1_diff)
            + (x_p2_diff * x_p2_diff)
            + (y_p1_diff * y_p1_diff)
            + (y_p2_diff * y_p2_diff);
        let d3 = (x_diff * x_diff) + (y_diff * y_diff);
        if d1d2 < d3 || is_equal(d1d2, d3) {
            return i;
        }
    }
    angular_max.len() + 1
}

/// The angular cell of the traversal entry point.
///
/// `ray_sphere_2` and `grid_center_2` carry the plane's second coordinate (y
/// for polar, z for azimuthal). When the grid has a single section or the
/// ray-sphere vector has no projection onto the plane, the cell is 0.
/// Otherwise the entry point is projected onto the circle of `entry_radius`
/// and located among the boundary points.
pub(super) fn initialize_angular_voxel_id(
    num_sections: usize,
    ray_sphere: DVec3,
    angular_max: &[LineSegment],
    ray_sphere_2: f64,
    grid_center_x: f64,
    grid_center_2: f64,
    entry_radius: f64,
) -> usize {
    if num_sections == 1 {
        return 0;
    }
    let sed = ray_sphere.x * ray_sphere.x + ray_sphere_2 * ray_sphere_2;
    if sed == 0.0 {
        return 0;
    }
    let r = entry_radius / sed.sqrt();
    let p1 = grid_center_x - ray_sphere.x * r;
    let p2 = grid_center_2 - ray_sphere_2 * r;
    angular_voxel_id_from_points(angular_max, p1, p2)
}

/// Next crossing of an angular section boundary in the given plane.
///
/// The current voxel's two boundary segments (center to outer sphere) are
/// intersected against the remaining ray segment with 2-D perp products,
/// following the segment-segment test of [O'Rourke, 1998]. Parallel and
/// collinear boundaries fall back to `collinear_times`: zero when the
/// boundary is merely parallel, the time of closest approach to the center
/// when the ray runs along the boundary line.
///
/// When both boundaries are hit at the same time the ray passes through the
/// center; the step is then recomputed by asking which cell an
/// infinitesimal step of the ray backwards along its direction lies in,
/// signed by the plane direction components.
pub(super) fn angular_hit(
    ray: &Ray,
    plane: &AngularPlane<'_>,
    ray_segment: &RaySegment,
    collinear_times: [f64; 2],
    current_voxel: i64,
    t: f64,
    max_t: f64,
) -> HitParameters {
    let ax = plane.axis.index();
    let voxel = current_voxel as usize;
    let p_one = plane.boundaries[voxel];
    let p_two = plane.boundaries[voxel + 1];
    let u_min = plane.center_to_bound[voxel];
    let u_max = plane.center_to_bound[voxel + 1];
    let u = ray_segment.vector();
    let p1 = ray_segment.p1();
    let w_min = (p_one.p1 - p1.x, p_one.p2 - p1[ax]);
    let w_max = (p_two.p1 - p1.x, p_two.p2 - p1[ax]);

    let perp_uv_min = u_min.x * u[ax] - u_min[ax] * u.x;
    let perp_uv_max = u_max.x * u[ax] - u_max[ax] * u.x;
    let perp_uw_min = u_min.x * w_min.1 - u_min[ax] * w_min.0;
    let perp_uw_max = u_max.x * w_max.1 - u_max[ax] * w_max.0;
    let perp_vw_min = u.x * w_min.1 - u[ax] * w_min.0;
    let perp_vw_max = u.x * w_max.1 - u[ax] * w_max.0;

    let is_parallel_min = is_equal(perp_uv_min, 0.0);
    let is_collinear_min =
        is_parallel_min && is_equal(perp_uw_min, 0.0) && is_equal(perp_vw_min, 0.0);
    let is_parallel_max = is_equal(perp_uv_max, 0.0);
    let is_collinear_max =
        is_parallel_max && is_equal(perp_uw_max, 0.0) && is_equal(perp_vw_max, 0.0);

    let mut t_min = collinear_times[usize::from(is_collinear_min)];
    let mut is_intersect_min = false;
    if !is_parallel_min {
        let inv_perp_uv_min = 1.0 / perp_uv_min;
        let a = perp_vw_min * inv_perp_uv_min;
        let b = perp_uw_min * inv_perp_uv_min;
        if !(less_than(a, 0.0) || less_than(1.0, a) || less_than(b, 0.0) || less_than(1.0, b)) {
            is_intersect_min = true;
            t_min = ray_segment.intersection_time_at(b, ray);
        }
    }
    let mut t_max = collinear_times[usize::from(is_collinear_max)];
    let mut is_intersect_max = false;
    if !is_parallel_max {
        let inv_perp_uv_max = 1.0 / perp_uv_max;
        let a = perp_vw_max * inv_perp_uv_max;
        let b = perp_uw_max * inv_perp_uv_max;
        if !(less_than(a, 0.0) || less_than(1.0, a) || less_than(b, 0.0) || less_than(1.0, b)) {
            is_intersect_max = true;
            t_max = ray_segment.intersection_time_at(b, ray);
        }
    }

    let t_t_max_eq = is_equal(t, t_max);
    let t_max_within_bounds = t < t_max && !t_t_max_eq && t_max < max_t;
    let t_t_min_eq = is_equal(t, t_min);
    let t_min_within_bounds = t < t_min && !t_t_min_eq && t_min < max_t;
    if !t_max_within_bounds && !t_min_within_bounds {
        return HitParameters {
            t_max: NO_HIT,
            t_step: 0,
        };
    }
    if is_intersect_max && !is_intersect_min && !is_collinear_min && t_max_within_bounds {
        return HitParameters { t_max, t_step: 1 };
    }
    if is_intersect_min && !is_intersect_max && !is_collinear_max && t_min_within_bounds {
        return HitParameters {
            t_max: t_min,
            t_step: -1,
        };
    }
    if (is_intersect_min && is_intersect_max)
        || (is_intersect_min && is_collinear_max)
        || (is_intersect_max && is_collinear_min)
    {
        let min_max_eq = is_equal(t_min, t_max);
        if min_max_eq && t_min_within_bounds {
            // Both boundaries at once: the ray runs through the center. Ask
            // which cell an infinitesimal step of the ray lies in, probing
            // backwards along the direction so the answer names the cell
            // being left.
            let perturbed_t = 0.1;
            let a = -ray.direction().x * perturbed_t;
            let b = -ray.direction()[ax] * perturbed_t;
            let max_radius_over_plane_length =
                plane.max_radius / (a * a + b * b).sqrt();
            let p1 = plane.center.x - max_radius_over_plane_length * a;
            let p2 = plane.center[ax] - max_radius_over_plane_length * b;
            let next_step = (current_voxel
                - angular_voxel_id_from_points(plane.boundaries, p1, p2) as i64)
                .abs();
            let t_step = if ray.direction().x < 0.0 || ray.direction()[ax] < 0.0 {
                next_step
            } else {
                -next_step
            };
            return HitParameters { t_max, t_step };
        }
        if t_min_within_bounds && ((t_min < t_max && !min_max_eq) || t_t_max_eq) {
            return HitParameters {
                t_max: t_min,
                t_step: -1,
            };
        }
        if t_max_within_bounds && ((t_max < t_min && !min_max_eq) || t_t_min_eq) {
            return HitParameters { t_max, t_step: 1 };
        }
    }
    HitParameters {
        t_max: NO_HIT,
        t_step: 0,
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::DVec3;

    use crate::grid::SphericalVoxelGrid;
    use crate::types::SphereBound;

    use super::*;

    const TAU: f64 = std::f64::consts::TAU;

    fn grid(num_polar: usize, num_azimuthal: usize) -> SphericalVoxelGrid {
        SphericalVoxelGrid::new(
            SphereBound {
                radial: 0.0,
                polar: 0.0,
                azimuthal: 0.0,
            },
            SphereBound {
                radial: 10.0,
                polar: TAU,
                azimuthal: TAU,
            },
            4,
            num_polar,
            num_azimuthal,
            DVec3::ZERO,
        )
        .expect("grid should build")
    }

    #[test]
    fn id_from_points_picks_containing_arc() {
        let grid = grid(4, 4);
        // A point midway through the first quadrant.
        let angle = std::f64::consts::FRAC_PI_4;
        let id = angular_voxel_id_from_points(
            grid.p_max_polar(),
            10.0 * angle.cos(),
            10.0 * angle.sin(),
        );
        assert_eq!(id, 0);
        // Third quadrant.
        let angle = std::f64::consts::PI + std::f64::consts::FRAC_PI_4;
        let id = angular_voxel_id_from_points(
            grid.p_max_polar(),
            10.0 * angle.cos(),
            10.0 * angle.sin(),
        );
        assert_eq!(id, 2);
    }

    #[test]
    fn id_on_boundary_resolves_to_lower_cell() {
        let grid = grid(4, 4);
        // Exactly on the boundary between cells 0 and 1 (angle pi/2).
        let id = angular_voxel_id_from_points(grid.p_max_polar(), 0.0, 10.0);
        assert_eq!(id, 0);
    }

    #[test]
    fn init_single_section_is_zero() {
        let grid = grid(1, 1);
        let id = initialize_angular_voxel_id(
            1,
            DVec3::new(3.0, -2.0, 0.5),
            grid.p_max_polar(),
            -2.0,
            0.0,
            0.0,
            10.0,
        );
        assert_eq!(id, 0);
    }

    #[test]
    fn init_locates_entry_quadrant() {
        let grid = grid(4, 4);
        // Ray entering at (-10, 0, 0): rsv points from origin toward the
        // center, so the entry sits at angle pi.
        let rsv = DVec3::new(10.0, 1.0, 0.0);
        let id = initialize_angular_voxel_id(4, rsv, grid.p_max_polar(), 1.0, 0.0, 0.0, 10.0);
        assert_eq!(id, 2);
    }

    #[test]
    fn init_degenerate_projection_is_zero() {
        let grid = grid(4, 4);
        // No projection onto the XY plane at all.
        let rsv = DVec3::new(0.0, 0.0, 5.0);
        let id = initialize_angular_voxel_id(4, rsv, grid.p_max_polar(), 0.0, 0.0, 0.0, 10.0);
        assert_eq!(id, 0);
    }

    fn hit_for(
        grid: &SphericalVoxelGrid,
        origin: DVec3,
        direction: DVec3,
        current_voxel: i64,
        t: f64,
        max_t: f64,
    ) -> HitParameters {
        let ray = Ray::new(origin, direction);
        let mut segment = RaySegment::new(max_t, &ray);
        segment.update_at_time(t, &ray);
        let collinear_times = [0.0, ray.time_at_point(grid.sphere_center())];
        angular_hit(
            &ray,
            &grid.polar_plane(),
            &segment,
            collinear_times,
            current_voxel,
            t,
            max_t,
        )
    }

    #[test]
    fn crossing_max_boundary_steps_up() {
        let grid = grid(4, 4);
        // Inside cell 0 moving counterclockwise: crosses the pi/2 boundary
        // (the positive y-axis) at x = 0.
        let hit = hit_for(
            &grid,
            DVec3::new(8.0, 3.0, 0.0),
            DVec3::new(-1.0, 0.0, 0.0),
            0,
            0.0,
            20.0,
        );
        assert_eq!(hit.t_step, 1);
        assert_relative_eq!(hit.t_max, 8.0, epsilon = 1e-9);
    }

    #[test]
    fn crossing_min_boundary_steps_down() {
        let grid = grid(4, 4);
        // Inside cell 1 moving clockwise: crosses the pi/2 boundary back
        // into cell 0.
        let hit = hit_for(
            &grid,
            DVec3::new(-3.0, 8.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            1,
            0.0,
            20.0,
        );
        assert_eq!(hit.t_step, -1);
        assert_relative_eq!(hit.t_max, 3.0, epsilon = 1e-9);
    }

    #[test]
    fn through_center_flips_by_half_the_sections() {
        let grid = grid(4, 4);
        // Straight through the center along +x from cell 2.
        let hit = hit_for(
            &grid,
            DVec3::new(-8.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            2,
            2.0,
            30.0,
        );
        assert_eq!(hit.t_step.abs(), 2);
        assert_relative_eq!(hit.t_max, 8.0, epsilon = 1e-9);
    }

    #[test]
    fn no_hit_when_boundaries_behind() {
        let grid = grid(4, 4);
        // Moving radially outward inside cell 0: never crosses either
        // boundary of the cell.
        let hit = hit_for(
            &grid,
            DVec3::new(3.0, 3.0, 0.0),
            DVec3::new(1.0, 1.0, 0.0),
            0,
            0.0,
            20.0,
        );
        assert_eq!(hit.t_step, 0);
        assert_eq!(hit.t_max, NO_HIT);
    }
}
