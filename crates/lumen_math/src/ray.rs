use crate::Vec3;

/// A ray in 3D space: `origin + t * direction`.
///
/// The direction is not required to be unit length, but the integrator keeps
/// its rays normalized so that `t` is a distance.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray.
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Create a ray with its direction normalized.
    #[inline]
    pub fn normalized(origin: Vec3, direction: Vec3) -> Self {
        Self::new(origin, direction.normalize())
    }

    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Get the point along the ray at parameter t.
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Vec3::new(1.0, 0.0, 0.0), Vec3::Y);

        assert_eq!(ray.at(0.0), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(ray.at(2.0), Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(ray.at(-1.0), Vec3::new(1.0, -1.0, 0.0));
    }

    #[test]
    fn test_ray_normalized() {
        let ray = Ray::normalized(Vec3::ZERO, Vec3::new(0.0, 3.0, 4.0));
        assert!((ray.direction().length() - 1.0).abs() < 1e-6);
        assert!((ray.at(5.0) - Vec3::new(0.0, 3.0, 4.0)).length() < 1e-5);
    }
}
