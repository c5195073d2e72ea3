//! Triangle primitive for ray tracing.
//!
//! Uses Wald's projection test: the triangle is projected onto the coordinate
//! plane most perpendicular to its normal, and a handful of constants derived
//! once at scene build time replace the general 3x3 solve.

use crate::hittable::{HitCache, Primitive};
use lumen_math::{axis_component, Interval, Ray, Vec3};

/// `k` value marking a triangle that can never be hit.
const DEGENERATE_AXIS: u32 = 3;

/// The two axes spanning the projection plane for dominant axis `k` are
/// `WALD_MODULO[k]` and `WALD_MODULO[k + 1]`.
const WALD_MODULO: [usize; 4] = [1, 2, 0, 1];

/// A triangle with precomputed intersection constants.
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    k: u32,
    n_u: f32,
    n_v: f32,
    n_d: f32,
    a_u: f32,
    a_v: f32,
    b_nu: f32,
    b_nv: f32,
    c_nu: f32,
    c_nv: f32,

    shape_id: u32,
    prim_id: u32,
    indices: [u32; 3],
}

impl Triangle {
    /// Derive the intersection constants for triangle `indices` of `vertices`.
    ///
    /// Zero-area triangles are kept but tagged so every test misses them.
    pub fn precompute(shape_id: u32, prim_id: u32, indices: [u32; 3], vertices: &[Vec3]) -> Self {
        let a = vertices[indices[0] as usize];
        let b_vert = vertices[indices[1] as usize];
        let c_vert = vertices[indices[2] as usize];

        let b = c_vert - a;
        let c = b_vert - a;
        let n = c.cross(b);

        // Largest projection axis
        let mut k = 0;
        for j in 1..3 {
            if axis_component(n, j).abs() > axis_component(n, k).abs() {
                k = j;
            }
        }

        let u = WALD_MODULO[k];
        let v = WALD_MODULO[k + 1];
        let n_k = axis_component(n, k);
        let denom = axis_component(b, u) * axis_component(c, v) - axis_component(b, v) * axis_component(c, u);

        let mut tri = Self {
            k: DEGENERATE_AXIS,
            n_u: 0.0,
            n_v: 0.0,
            n_d: 0.0,
            a_u: 0.0,
            a_v: 0.0,
            b_nu: 0.0,
            b_nv: 0.0,
            c_nu: 0.0,
            c_nv: 0.0,
            shape_id,
            prim_id,
            indices,
        };

        if denom == 0.0 || !denom.is_finite() {
            return tri;
        }

        tri.k = k as u32;
        tri.n_u = axis_component(n, u) / n_k;
        tri.n_v = axis_component(n, v) / n_k;
        tri.n_d = a.dot(n) / n_k;
        tri.b_nu = axis_component(b, u) / denom;
        tri.b_nv = -axis_component(b, v) / denom;
        tri.a_u = axis_component(a, u);
        tri.a_v = axis_component(a, v);
        tri.c_nu = axis_component(c, v) / denom;
        tri.c_nv = -axis_component(c, u) / denom;
        tri
    }

    /// True if the triangle was tagged as never-hit.
    pub fn is_degenerate(&self) -> bool {
        self.k == DEGENERATE_AXIS
    }

    pub fn prim_id(&self) -> u32 {
        self.prim_id
    }

    /// Vertex indices into the owning mesh.
    pub fn indices(&self) -> [u32; 3] {
        self.indices
    }

    /// Core test shared by `hit` and `hit_fast`. Returns `(u, v, t)`.
    #[inline]
    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<(f32, f32, f32)> {
        let (o, d) = (ray.origin, ray.direction);
        let (o_u, o_v, o_k, d_u, d_v, d_k) = match self.k {
            0 => (o.y, o.z, o.x, d.y, d.z, d.x),
            1 => (o.z, o.x, o.y, d.z, d.x, d.y),
            2 => (o.x, o.y, o.z, d.x, d.y, d.z),
            _ => return None,
        };

        // Plane intersection. A ray parallel to the plane gives inf or NaN,
        // both of which fail the range check below.
        let t = (self.n_d - o_u * self.n_u - o_v * self.n_v - o_k)
            / (d_u * self.n_u + d_v * self.n_v + d_k);
        if !ray_t.contains(t) {
            return None;
        }

        // Projected hit point relative to the first vertex
        let hu = o_u + t * d_u - self.a_u;
        let hv = o_v + t * d_v - self.a_v;

        let u = hv * self.b_nu + hu * self.b_nv;
        let v = hu * self.c_nu + hv * self.c_nv;

        if u >= 0.0 && v >= 0.0 && u + v <= 1.0 {
            Some((u, v, t))
        } else {
            None
        }
    }
}

impl Primitive for Triangle {
    fn shape_id(&self) -> u32 {
        self.shape_id
    }

    fn hit(&self, ray: &Ray, ray_t: Interval, cache: &mut HitCache) -> bool {
        match self.intersect(ray, ray_t) {
            Some((u, v, t)) => {
                *cache = HitCache {
                    shape_id: self.shape_id,
                    prim_id: self.prim_id,
                    u,
                    v,
                    t,
                };
                true
            }
            None => false,
        }
    }

    fn hit_fast(&self, ray: &Ray, ray_t: Interval) -> bool {
        self.intersect(ray, ray_t).is_some()
    }
}

/// Map a uniform sample on the unit square to barycentric coordinates
/// `(u, v)` distributed uniformly over a triangle.
pub fn square_to_uniform_triangle(sample: (f32, f32)) -> (f32, f32) {
    let a = (1.0 - sample.0).max(0.0).sqrt();
    (1.0 - a, a * sample.1)
}
