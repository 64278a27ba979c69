//! Precomputed lookup tables built once at grid construction.

use glam::DVec3;

use crate::types::{LineSegment, TrigValues};

/// Squared shell radii in descending order, `num_radial + 1` entries. Entry
/// `k` is the squared radius of shell `k`, starting at `max_radius` and
/// shrinking by `delta_radius` per entry.
///
/// For `num_radial = 3, max_radius = 6, delta_radius = 2` this yields
/// `{36, 16, 4, 0}`.
pub(crate) fn delta_radii_squared(
    num_radial: usize,
    max_radius: f64,
    delta_radius: f64,
) -> Vec<f64> {
    let mut current = max_radius;
    (0..=num_radial)
        .map(|_| {
            let r = current;
            current -= delta_radius;
            r * r
        })
        .collect()
}

/// Cosine/sine pairs for `num_sections + 1` boundary angles, starting at
/// `min_bound` and advancing by `delta`.
pub(crate) fn trig_values(num_sections: usize, min_bound: f64, delta: f64) -> Vec<TrigValues> {
    let mut radians = min_bound;
    (0..=num_sections)
        .map(|_| {
            let tv = TrigValues {
                cosine: radians.cos(),
                sine: radians.sin(),
            };
            radians += delta;
            tv
        })
        .collect()
}

/// Boundary points on the outer sphere for each angle: `p1` along the plane
/// x-axis, `p2` along the plane's second axis, offset by the corresponding
/// center components.
pub(crate) fn max_radius_segments(
    trig: &[TrigValues],
    center_x: f64,
    center_2: f64,
    max_radius: f64,
) -> Vec<LineSegment> {
    trig.iter()
        .map(|tv| LineSegment {
            p1: max_radius * tv.cosine + center_x,
            p2: max_radius * tv.sine + center_2,
        })
        .collect()
}

/// Vectors from each boundary point back to the sphere center, embedded in
/// 3-D with the boundary point's second coordinate on `axis_2` (1 for the
/// polar XY plane, 2 for the azimuthal XZ plane).
pub(crate) fn center_to_bound_vectors(
    segments: &[LineSegment],
    center: DVec3,
    axis_2: usize,
) -> Vec<DVec3> {
    segments
        .iter()
        .map(|segment| {
            let mut point = DVec3::ZERO;
            point.x = segment.p1;
            point[axis_2] = segment.p2;
            center - point
        })
        .collect()
}
