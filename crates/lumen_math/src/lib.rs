//! Math primitives shared by the lumen crates.
//!
//! Vector and matrix types come from `glam`; this crate adds the ray-tracing
//! specific pieces on top: parametric intervals, rays, axis-aligned bounding
//! boxes and a few transform helpers.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod interval;
mod ray;
mod transform;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;
pub use transform::Mat4Ext;

/// Returns the component of `v` along `axis` (0=X, 1=Y, 2=Z).
#[inline]
pub fn axis_component(v: Vec3, axis: usize) -> f32 {
    match axis {
        0 => v.x,
        1 => v.y,
        _ => v.z,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_component() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(axis_component(v, 0), 1.0);
        assert_eq!(axis_component(v, 1), 2.0);
        assert_eq!(axis_component(v, 2), 3.0);
    }
}
