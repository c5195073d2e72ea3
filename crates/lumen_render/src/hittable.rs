//! Intersection interchange types.
//!
//! Primitives only ever report a [`HitCache`]. The full [`HitRecord`] is
//! filled by the scene once, for the globally nearest hit.

use crate::Material;
use lumen_math::{Interval, Ray, Vec2, Vec3};

/// Lightweight result of a primitive intersection test.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HitCache {
    /// Index of the mesh the primitive belongs to
    pub shape_id: u32,
    /// Index of the triangle within its mesh
    pub prim_id: u32,
    /// Barycentric weight of the second vertex
    pub u: f32,
    /// Barycentric weight of the third vertex
    pub v: f32,
    /// Ray parameter of the hit
    pub t: f32,
}

/// Surface record of the nearest intersection along a ray.
#[derive(Clone)]
pub struct HitRecord<'a> {
    /// Point of intersection
    pub p: Vec3,
    /// Shading normal, on the same side as `geometric_normal`
    pub normal: Vec3,
    /// Unit normal of the hit triangle, facing against the incoming ray
    pub geometric_normal: Vec3,
    /// Interpolated texture coordinates
    pub uv: Vec2,
    /// Parameter t where the intersection occurs
    pub t: f32,
    /// Material at the intersection point
    pub material: &'a dyn Material,
    /// Whether the ray hit the front face (outside) of the surface
    pub front_face: bool,
    /// Whether the surface belongs to an emitter mesh
    pub is_light: bool,
    /// Index of the mesh that was hit
    pub shape_id: u32,
}

impl<'a> HitRecord<'a> {
    /// Set the face normal based on ray direction and outward normal.
    ///
    /// The stored normal always points against the ray; `front_face`
    /// remembers which side was hit.
    pub fn set_face_normal(&mut self, ray_direction: Vec3, outward_normal: Vec3) {
        self.front_face = ray_direction.dot(outward_normal) < 0.0;
        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }
}

/// Geometry that can be stored in the BVH.
///
/// Bounds are supplied separately when the tree is built; intersection
/// reports into the shared [`HitCache`] layout.
pub trait Primitive: Send + Sync {
    /// Stable identifier of the shape this primitive belongs to.
    fn shape_id(&self) -> u32;

    /// Nearest-hit test. On a hit within `ray_t`, overwrite `cache` and return true.
    fn hit(&self, ray: &Ray, ray_t: Interval, cache: &mut HitCache) -> bool;

    /// Any-hit test for shadow rays.
    fn hit_fast(&self, ray: &Ray, ray_t: Interval) -> bool {
        let mut scratch = HitCache::default();
        self.hit(ray, ray_t, &mut scratch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Lambertian;

    #[test]
    fn test_set_face_normal() {
        let material = Lambertian::new(Vec3::splat(0.5));
        let mut rec = HitRecord {
            p: Vec3::ZERO,
            normal: Vec3::ZERO,
            geometric_normal: Vec3::ZERO,
            uv: Vec2::ZERO,
            t: 1.0,
            material: &material,
            front_face: false,
            is_light: false,
            shape_id: 0,
        };

        rec.set_face_normal(Vec3::new(0.0, 0.0, -1.0), Vec3::Z);
        assert!(rec.front_face);
        assert_eq!(rec.normal, Vec3::Z);

        rec.set_face_normal(Vec3::new(0.0, 0.0, 1.0), Vec3::Z);
        assert!(!rec.front_face);
        assert_eq!(rec.normal, -Vec3::Z);
    }
}
