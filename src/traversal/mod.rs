//! The spherical voxel walk: initialization plus the incremental stepping
//! loop that repeatedly crosses the nearest radial, polar, or azimuthal
//! boundary.

mod angular;
mod radial;

use crate::float_cmp::is_equal;
use crate::grid::SphericalVoxelGrid;
use crate::ray::{Ray, RaySegment};
use crate::types::{LineSegment, SphericalVoxel};

use angular::{angular_hit, initialize_angular_voxel_id};
use radial::radial_hit;

/// Sentinel time for "no boundary crossing before `max_t`".
pub(crate) const NO_HIT: f64 = f64::MAX;

/// Outcome of one boundary test: the time of the next crossing and the
/// signed index change it causes.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HitParameters {
    pub t_max: f64,
    pub t_step: i64,
}

/// Which boundary (or boundaries, on a tie) the ray crosses next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VoxelIntersection {
    Radial,
    Polar,
    Azimuthal,
    RadialPolar,
    RadialAzimuthal,
    PolarAzimuthal,
    RadialPolarAzimuthal,
}

/// Classify the smallest of the three crossing times, treating
/// approximately equal times as simultaneous so the combined variants can
/// apply every index update at the same `t`.
fn minimum_intersection(
    radial: HitParameters,
    polar: HitParameters,
    azimuthal: HitParameters,
) -> VoxelIntersection {
    let rp_eq = is_equal(radial.t_max, polar.t_max);
    let ra_eq = is_equal(radial.t_max, azimuthal.t_max);
    let rp_lt = radial.t_max < polar.t_max;
    let ra_lt = radial.t_max < azimuthal.t_max;
    if rp_lt && !rp_eq && ra_lt && !ra_eq {
        return VoxelIntersection::Radial;
    }

    let pa_eq = is_equal(polar.t_max, azimuthal.t_max);
    let pa_lt = polar.t_max < azimuthal.t_max;
    if !rp_lt && !rp_eq && pa_lt && !pa_eq {
        return VoxelIntersection::Polar;
    }
    if !pa_lt && !pa_eq && !ra_lt && !ra_eq {
        return VoxelIntersection::Azimuthal;
    }
    if rp_eq && ra_eq {
        return VoxelIntersection::RadialPolarAzimuthal;
    }
    if pa_eq {
        return VoxelIntersection::PolarAzimuthal;
    }
    if rp_eq {
        return VoxelIntersection::RadialPolar;
    }
    VoxelIntersection::RadialAzimuthal
}

/// Boundary points for the angular initialization. A ray entering from
/// outside meets the grid on the outer sphere, so the precomputed tables
/// apply; a ray starting inside is located on the sphere of its entry
/// shell, which needs the boundary points recomputed at that radius.
fn initialize_voxel_boundary_segments(
    grid: &SphericalVoxelGrid,
    ray_origin_is_outside_grid: bool,
    entry_radius: f64,
) -> (Vec<LineSegment>, Vec<LineSegment>) {
    if ray_origin_is_outside_grid {
        return (grid.p_max_polar().to_vec(), grid.p_max_azimuthal().to_vec());
    }
    let center = grid.sphere_center();
    let p_polar = grid
        .polar_trig_values()
        .iter()
        .map(|tv| LineSegment {
            p1: entry_radius * tv.cosine + center.x,
            p2: entry_radius * tv.sine + center.y,
        })
        .collect();
    let p_azimuthal = grid
        .azimuthal_trig_values()
        .iter()
        .map(|tv| LineSegment {
            p1: entry_radius * tv.cosine + center.x,
            p2: entry_radius * tv.sine + center.z,
        })
        .collect();
    (p_polar, p_azimuthal)
}

#[inline]
fn close_last_voxel(voxels: &mut [SphericalVoxel], exit_t: f64) {
    if let Some(last) = voxels.last_mut() {
        last.exit_t = exit_t;
    }
}

/// Walk a ray through a spherical voxel grid, returning every voxel the ray
/// traverses in order, each with its entry and exit time.
///
/// `max_t` is unit-less: it is scaled by the grid's maximum diameter to form
/// the effective time window, so `1.0` covers any chord of the sphere. An
/// empty vector means the ray misses the grid or `max_t` is non-positive;
/// neither is an error.
pub fn walk_spherical_volume(
    ray: &Ray,
    grid: &SphericalVoxelGrid,
    max_t: f64,
) -> Vec<SphericalVoxel> {
    if max_t <= 0.0 {
        return Vec::new();
    }

    // Ray-sphere vector and the entry shell. The squared-radii table is
    // strictly descending, so the scan uses raw comparisons.
    let rsv = grid.sphere_center() - ray.point_at(0.0);
    let sed_from_center = rsv.length_squared();
    let mut radial_entrance_voxel = 0usize;
    while radial_entrance_voxel <= grid.num_radial_sections()
        && sed_from_center < grid.delta_radii_squared(radial_entrance_voxel)
    {
        radial_entrance_voxel += 1;
    }
    let ray_origin_is_outside_grid = radial_entrance_voxel == 0;

    let vector_index = radial_entrance_voxel - usize::from(!ray_origin_is_outside_grid);
    let entry_radius_squared = grid.delta_radii_squared(vector_index);
    let entry_radius =
        grid.delta_radius() * (grid.num_radial_sections() - vector_index) as f64;
    let rsvd = rsv.dot(rsv);
    let v = rsv.dot(ray.direction());
    let rsvd_minus_v_squared = rsvd - v * v;

    if entry_radius_squared <= rsvd_minus_v_squared {
        return Vec::new();
    }
    let d = (entry_radius_squared - rsvd_minus_v_squared).sqrt();
    let t_ray_exit = ray.time_of_intersection_at(v + d);
    if t_ray_exit < 0.0 {
        return Vec::new();
    }
    let t_ray_entrance = ray.time_of_intersection_at(v - d);
    let mut current_radial_voxel =
        radial_entrance_voxel as i64 + i64::from(ray_origin_is_outside_grid);

    let (p_polar, p_azimuthal) =
        initialize_voxel_boundary_segments(grid, ray_origin_is_outside_grid, entry_radius);

    // Reference vector for the angular initialization. A ray starting
    // exactly at the center has no angular position; an infinitesimal step
    // backwards along the direction supplies one.
    let ray_sphere = if ray_origin_is_outside_grid {
        grid.sphere_center() - ray.point_at(t_ray_entrance)
    } else if sed_from_center == 0.0 {
        rsv - ray.direction()
    } else {
        rsv
    };

    let center = grid.sphere_center();
    let polar_id = initialize_angular_voxel_id(
        grid.num_polar_sections(),
        ray_sphere,
        &p_polar,
        ray_sphere.y,
        center.x,
        center.y,
        entry_radius,
    );
    if polar_id >= grid.num_polar_sections() {
        return Vec::new();
    }
    let mut current_polar_voxel = polar_id as i64;

    let azimuthal_id = initialize_angular_voxel_id(
        grid.num_azimuthal_sections(),
        ray_sphere,
        &p_azimuthal,
        ray_sphere.z,
        center.x,
        center.z,
        entry_radius,
    );
    if azimuthal_id >= grid.num_azimuthal_sections() {
        return Vec::new();
    }
    let mut current_azimuthal_voxel = azimuthal_id as i64;

    // Tight upper bound on the number of boundary crossings of one chord.
    let mut voxels = Vec::with_capacity(
        grid.num_radial_sections() + grid.num_polar_sections() + grid.num_azimuthal_sections(),
    );
    let mut t = if ray_origin_is_outside_grid {
        t_ray_entrance
    } else {
        0.0
    };
    voxels.push(SphericalVoxel {
        radial: current_radial_voxel as usize,
        polar: current_polar_voxel as usize,
        azimuthal: current_azimuthal_voxel as usize,
        enter_t: t,
        exit_t: t,
    });

    // The caller's max_t is a fraction of the maximum chord; convert it to
    // ray time, clipped to the sphere exit when entering from outside.
    let unitized_ray_time = max_t * grid.sphere_max_diameter()
        + if ray_origin_is_outside_grid {
            t_ray_entrance
        } else {
            0.0
        };
    let max_t = if ray_origin_is_outside_grid {
        t_ray_exit.min(unitized_ray_time)
    } else {
        unitized_ray_time
    };

    // Fallback times for angular hits with a parallel (index 0) or
    // collinear (index 1) boundary.
    let collinear_times = [0.0, ray.time_at_point(grid.sphere_center())];

    let polar_plane = grid.polar_plane();
    let azimuthal_plane = grid.azimuthal_plane();
    let num_polar = grid.num_polar_sections() as i64;
    let num_azimuthal = grid.num_azimuthal_sections() as i64;

    let mut ray_segment = RaySegment::new(max_t, ray);
    let mut radial_step_has_transitioned = false;
    loop {
        let radial = radial_hit(
            ray,
            grid,
            &mut radial_step_has_transitioned,
            current_radial_voxel,
            v,
            rsvd_minus_v_squared,
            t,
            max_t,
        );
        ray_segment.update_at_time(t, ray);
        let polar = angular_hit(
            ray,
            &polar_plane,
            &ray_segment,
            collinear_times,
            current_polar_voxel,
            t,
            max_t,
        );
        let azimuthal = angular_hit(
            ray,
            &azimuthal_plane,
            &ray_segment,
            collinear_times,
            current_azimuthal_voxel,
            t,
            max_t,
        );

        if current_radial_voxel + radial.t_step == 0
            || (radial.t_max == NO_HIT && polar.t_max == NO_HIT && azimuthal.t_max == NO_HIT)
        {
            close_last_voxel(&mut voxels, t_ray_exit);
            return voxels;
        }

        match minimum_intersection(radial, polar, azimuthal) {
            VoxelIntersection::Radial => {
                t = radial.t_max;
                current_radial_voxel += radial.t_step;
            }
            VoxelIntersection::Polar => {
                t = polar.t_max;
                if !polar_plane.step_in_bounds(polar.t_step, current_polar_voxel) {
                    close_last_voxel(&mut voxels, t_ray_exit);
                    return voxels;
                }
                current_polar_voxel = (current_polar_voxel + polar.t_step).rem_euclid(num_polar);
            }
            VoxelIntersection::Azimuthal => {
                if !azimuthal_plane.step_in_bounds(azimuthal.t_step, current_azimuthal_voxel) {
                    close_last_voxel(&mut voxels, t_ray_exit);
                    return voxels;
                }
                t = azimuthal.t_max;
                current_azimuthal_voxel =
                    (current_azimuthal_voxel + azimuthal.t_step).rem_euclid(num_azimuthal);
            }
            VoxelIntersection::RadialPolar => {
                t = radial.t_max;
                if !polar_plane.step_in_bounds(polar.t_step, current_polar_voxel) {
                    close_last_voxel(&mut voxels, t_ray_exit);
                    return voxels;
                }
                current_radial_voxel += radial.t_step;
                current_polar_voxel = (current_polar_voxel + polar.t_step).rem_euclid(num_polar);
            }
            VoxelIntersection::RadialAzimuthal => {
                t = radial.t_max;
                if !azimuthal_plane.step_in_bounds(azimuthal.t_step, current_azimuthal_voxel) {
                    close_last_voxel(&mut voxels, t_ray_exit);
                    return voxels;
                }
                current_radial_voxel += radial.t_step;
                current_azimuthal_voxel =
                    (current_azimuthal_voxel + azimuthal.t_step).rem_euclid(num_azimuthal);
            }
            VoxelIntersection::PolarAzimuthal => {
                t = polar.t_max;
                if !azimuthal_plane.step_in_bounds(azimuthal.t_step, current_azimuthal_voxel)
                    || !polar_plane.step_in_bounds(polar.t_step, current_polar_voxel)
                {
                    close_last_voxel(&mut voxels, t_ray_exit);
                    return voxels;
                }
                current_polar_voxel = (current_polar_voxel + polar.t_step).rem_euclid(num_polar);
                current_azimuthal_voxel =
                    (current_azimuthal_voxel + azimuthal.t_step).rem_euclid(num_azimuthal);
            }
            VoxelIntersection::RadialPolarAzimuthal => {
                t = radial.t_max;
                if !azimuthal_plane.step_in_bounds(azimuthal.t_step, current_azimuthal_voxel)
                    || !polar_plane.step_in_bounds(polar.t_step, current_polar_voxel)
                {
                    close_last_voxel(&mut voxels, t_ray_exit);
                    return voxels;
                }
                current_radial_voxel += radial.t_step;
                current_polar_voxel = (current_polar_voxel + polar.t_step).rem_euclid(num_polar);
                current_azimuthal_voxel =
                    (current_azimuthal_voxel + azimuthal.t_step).rem_euclid(num_azimuthal);
            }
        }

        let unchanged = voxels.last().is_some_and(|last| {
            last.radial == current_radial_voxel as usize
                && last.polar == current_polar_voxel as usize
                && last.azimuthal == current_azimuthal_voxel as usize
        });
        if unchanged {
            continue;
        }
        close_last_voxel(&mut voxels, t);
        voxels.push(SphericalVoxel {
            radial: current_radial_voxel as usize,
            polar: current_polar_voxel as usize,
            azimuthal: current_azimuthal_voxel as usize,
            enter_t: t,
            exit_t: t,
        });
    }
}
