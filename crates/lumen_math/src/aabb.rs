use crate::{axis_component, Interval, Ray, Vec3};

/// Axis-Aligned Bounding Box for spatial acceleration structures (BVH).
///
/// The empty box is `[+inf, -inf]` on every axis, so extending it with any
/// point or box yields exactly that point or box.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Box containing nothing.
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Create a box from its corners. The caller guarantees `min <= max`.
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB from two arbitrary corner points.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self::new(a.min(b), a.max(b))
    }

    /// Smallest box enclosing every point of the iterator (EMPTY when there are none).
    pub fn enclosing(points: impl IntoIterator<Item = Vec3>) -> Self {
        points.into_iter().fold(Self::EMPTY, |mut bbox, p| {
            bbox.extend_point(p);
            bbox
        })
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self::new(box0.min.min(box1.min), box0.max.max(box1.max))
    }

    /// True until the box has been extended at least once.
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Diagonal extent of the box.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Extent along a single axis (0=X, 1=Y, 2=Z).
    pub fn axis_extent(&self, axis: usize) -> f32 {
        axis_component(self.max, axis) - axis_component(self.min, axis)
    }

    pub fn extend_point(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn extend_box(&mut self, other: &Aabb) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// True if `other` lies entirely inside this box (faces included).
    pub fn contains_box(&self, other: &Aabb) -> bool {
        self.min.cmple(other.min).all() && other.max.cmple(self.max).all()
    }

    /// Test if a ray intersects this AABB within the given interval.
    ///
    /// Slab test. A direction component of exactly zero never divides: the
    /// ray is parallel to that slab and hits only if the origin lies inside
    /// it. The interval is rejected only once `max < min`, so a ray grazing a
    /// face or crossing a zero-thickness box still counts as a hit.
    pub fn hit(&self, r: &Ray, mut ray_t: Interval) -> bool {
        for axis in 0..3 {
            let origin = axis_component(r.origin, axis);
            let dir = axis_component(r.direction, axis);
            let lo = axis_component(self.min, axis);
            let hi = axis_component(self.max, axis);

            if dir == 0.0 {
                if origin < lo || origin > hi {
                    return false;
                }
                continue;
            }

            let inv_d = 1.0 / dir;
            let mut t0 = (lo - origin) * inv_d;
            let mut t1 = (hi - origin) * inv_d;
            if inv_d < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            if t0 > ray_t.min {
                ray_t.min = t0;
            }
            if t1 < ray_t.max {
                ray_t.max = t1;
            }
            if ray_t.max < ray_t.min {
                return false;
            }
        }
        true
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the longest extent.
    pub fn longest_axis(&self) -> usize {
        let size = self.size();
        if size.x > size.y && size.x > size.z {
            0
        } else if size.y > size.z {
            1
        } else {
            2
        }
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Total area of the six faces.
    pub fn surface_area(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        let d = self.size();
        2.0 * (d.x * d.y + d.y * d.z + d.z * d.x)
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}
