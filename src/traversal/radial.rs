use crate::grid::SphericalVoxelGrid;
use crate::ray::Ray;

use super::{HitParameters, NO_HIT};

/// Next crossing of a radial shell, following the line-sphere intersection
/// mathematics of Heckbert's Graphics Gems IV treatment.
///
/// Radial voxels are numbered `1..N..1` from the outer shell inward and back
/// out, so the step is `+1` while the ray approaches the center and `-1`
/// after it passes its radial minimum. `transitioned` records that passage:
/// it flips when the only remaining crossing of the current shell is its far
/// side, or on an exact tangential hit.
pub(super) fn radial_hit(
    ray: &Ray,
    grid: &SphericalVoxelGrid,
    transitioned: &mut bool,
    current_radial_voxel: i64,
    v: f64,
    rsvd_minus_v_squared: f64,
    t: f64,
    max_t: f64,
) -> HitParameters {
    if *transitioned {
        // Outbound: the only shell left to cross is the outer boundary of
        // the current voxel, at the far root of its quadratic.
        let r_b = grid.delta_radii_squared(current_radial_voxel as usize - 1);
        let d_b = (r_b - rsvd_minus_v_squared).sqrt();
        let intersection_t = ray.time_of_intersection_at(v + d_b);
        if intersection_t < max_t {
            return HitParameters {
                t_max: intersection_t,
                t_step: -1,
            };
        }
    } else {
        let previous_idx =
            (current_radial_voxel as usize).min(grid.num_radial_sections() - 1);
        // Skip the next inner shell if the ray's closest approach never
        // reaches it; its discriminant would be negative.
        let r_a = grid.delta_radii_squared(
            previous_idx
                - usize::from(grid.delta_radii_squared(previous_idx) < rsvd_minus_v_squared),
        );
        let d_a = (r_a - rsvd_minus_v_squared).sqrt();
        let t_entrance = ray.time_of_intersection_at(v - d_a);
        let t_exit = ray.time_of_intersection_at(v + d_a);

        let t_entrance_gt_t = t_entrance > t;
        if t_entrance_gt_t && t_entrance == t_exit {
            // Tangential hit: the shell is touched, not crossed.
            *transitioned = true;
            return HitParameters {
                t_max: t_entrance,
                t_step: 0,
            };
        }
        if t_entrance_gt_t && t_entrance < max_t {
            return HitParameters {
                t_max: t_entrance,
                t_step: 1,
            };
        }
        if t_exit < max_t {
            // The near root is behind the current time, so this crossing is
            // the far side of the shell: the ray has passed its radial
            // minimum and is now outbound.
            *transitioned = true;
            return HitParameters {
                t_max: t_exit,
                t_step: -1,
            };
        }
    }
    // No intersection time X with t < X < max_t.
    HitParameters {
        t_max: NO_HIT,
        t_step: 0,
    }
}
