// Transform utilities for Mat4
//
// glam::Mat4 already provides transform_point3(), transform_vector3() and
// inverse(); mesh placement additionally needs normals and bounds.

use crate::Aabb;
use glam::{Mat3, Mat4, Vec3};

/// Extension trait for Mat4 to provide additional transform utilities
pub trait Mat4Ext {
    /// Transform a surface normal (inverse transpose of the linear part).
    /// The result is normalized.
    fn transform_normal(&self, normal: Vec3) -> Vec3;

    /// Transform an axis-aligned bounding box.
    /// Computes the bounding box of all 8 transformed corners.
    fn transform_aabb(&self, aabb: &Aabb) -> Aabb;
}

impl Mat4Ext for Mat4 {
    fn transform_normal(&self, normal: Vec3) -> Vec3 {
        let linear = Mat3::from_mat4(*self);
        (linear.inverse().transpose() * normal).normalize_or_zero()
    }

    fn transform_aabb(&self, aabb: &Aabb) -> Aabb {
        if aabb.is_empty() {
            return Aabb::EMPTY;
        }
        let (lo, hi) = (aabb.min, aabb.max);
        Aabb::enclosing((0..8).map(|corner| {
            let p = Vec3::new(
                if corner & 1 == 0 { lo.x } else { hi.x },
                if corner & 2 == 0 { lo.y } else { hi.y },
                if corner & 4 == 0 { lo.z } else { hi.z },
            );
            self.transform_point3(p)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_transform_aabb_translation() {
        let mat = Mat4::from_translation(Vec3::new(5.0, 5.0, 5.0));
        let aabb = Aabb::from_points(Vec3::ZERO, Vec3::ONE);
        let transformed = mat.transform_aabb(&aabb);

        assert!((transformed.min - Vec3::new(5.0, 5.0, 5.0)).length() < 0.001);
        assert!((transformed.max - Vec3::new(6.0, 6.0, 6.0)).length() < 0.001);
    }

    #[test]
    fn test_transform_aabb_rotation_grows_bounds() {
        let mat = Mat4::from_rotation_y(PI / 4.0);
        let aabb = Aabb::from_points(Vec3::splat(-1.0), Vec3::splat(1.0));
        let transformed = mat.transform_aabb(&aabb);

        let half_diagonal = 2.0_f32.sqrt();
        assert!((transformed.max.x - half_diagonal).abs() < 0.001);
        assert!((transformed.max.y - 1.0).abs() < 0.001);
        assert!(Mat4::IDENTITY.transform_aabb(&Aabb::EMPTY).is_empty());
    }

    #[test]
    fn test_transform_normal_non_uniform_scale() {
        // Stretching along X tilts a diagonal normal towards Y
        let mat = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let n = mat.transform_normal(Vec3::new(1.0, 1.0, 0.0).normalize());
        let expected = Vec3::new(0.5, 1.0, 0.0).normalize();
        assert!((n - expected).length() < 0.001);
    }

    #[test]
    fn test_transform_normal_ignores_translation() {
        let mat = Mat4::from_translation(Vec3::new(10.0, 20.0, 30.0));
        assert!((mat.transform_normal(Vec3::Z) - Vec3::Z).length() < 1e-6);
    }
}
