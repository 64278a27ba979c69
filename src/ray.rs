use glam::DVec3;

/// Index of the first non-zero component of a unit direction. Time
/// reconstruction always divides by this component, so it is picked once at
/// construction.
#[inline]
fn non_zero_direction(direction: DVec3) -> usize {
    if direction.x != 0.0 {
        0
    } else if direction.y != 0.0 {
        1
    } else {
        2
    }
}

/// A ray `p(t) = origin + t * direction` with a unit direction.
///
/// The per-component inverse direction and the index of a non-zero direction
/// component are cached at construction so the traversal never re-checks for
/// zero components.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    origin: DVec3,
    direction: DVec3,
    inv_direction: DVec3,
    nzd: usize,
}

impl Ray {
    /// Build a ray from an origin and a direction. The direction is
    /// normalized here; callers may pass any non-zero vector.
    pub fn new(origin: DVec3, direction: DVec3) -> Self {
        let direction = direction.normalize();
        Self {
            origin,
            direction,
            inv_direction: 1.0 / direction,
            nzd: non_zero_direction(direction),
        }
    }

    /// The position `origin + t * direction`.
    #[inline]
    pub fn point_at(&self, t: f64) -> DVec3 {
        self.origin + self.direction * t
    }

    /// The ray time for a scalar `s` along the direction, as produced by the
    /// line-sphere quadratic (`v ± √discriminant`).
    ///
    /// Algebraically this is `((origin + direction * s) - origin) /
    /// direction` evaluated on the non-zero component; reconstructing the
    /// 3-D point and differencing loses precision when the other components
    /// are near zero, so callers must go through this form.
    #[inline]
    pub fn time_of_intersection_at(&self, s: f64) -> f64 {
        self.direction[self.nzd] * s * self.inv_direction[self.nzd]
    }

    /// The ray time at which the ray reaches the point `p`, assuming `p`
    /// lies on the ray line.
    #[inline]
    pub fn time_at_point(&self, p: DVec3) -> f64 {
        (p[self.nzd] - self.origin[self.nzd]) * self.inv_direction[self.nzd]
    }

    #[inline]
    pub fn origin(&self) -> DVec3 {
        self.origin
    }

    #[inline]
    pub fn direction(&self) -> DVec3 {
        self.direction
    }

    #[inline]
    pub fn inv_direction(&self) -> DVec3 {
        self.inv_direction
    }

    #[inline]
    pub fn non_zero_direction_index(&self) -> usize {
        self.nzd
    }
}

/// A sliding sub-interval `[t, max_t]` of a ray, viewed as the segment
/// `p1 -> p2`. `p2` is fixed for the whole traversal; `p1` advances to the
/// current time each iteration. The angular hit kernel intersects this
/// segment against voxel boundary segments.
#[derive(Debug, Clone, Copy)]
pub struct RaySegment {
    p2: DVec3,
    nzd: usize,
    p1: DVec3,
    vector: DVec3,
}

impl RaySegment {
    pub fn new(max_t: f64, ray: &Ray) -> Self {
        let p2 = ray.point_at(max_t);
        Self {
            p2,
            nzd: ray.non_zero_direction_index(),
            p1: ray.origin(),
            vector: p2 - ray.origin(),
        }
    }

    /// Move the segment start to the ray position at time `t`.
    #[inline]
    pub fn update_at_time(&mut self, t: f64, ray: &Ray) {
        self.p1 = ray.point_at(t);
        self.vector = self.p2 - self.p1;
    }

    /// Ray time corresponding to the segment parameter `b` in `[0, 1]`.
    #[inline]
    pub fn intersection_time_at(&self, b: f64, ray: &Ray) -> f64 {
        (self.p1[self.nzd] + self.vector[self.nzd] * b - ray.origin()[self.nzd])
            * ray.inv_direction()[self.nzd]
    }

    #[inline]
    pub fn p1(&self) -> DVec3 {
        self.p1
    }

    #[inline]
    pub fn p2(&self) -> DVec3 {
        self.p2
    }

    #[inline]
    pub fn vector(&self) -> DVec3 {
        self.vector
    }
}
