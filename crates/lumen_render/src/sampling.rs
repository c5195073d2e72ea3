//! Random sampling helpers shared by materials, lights and the integrator.

use std::f32::consts::PI;

use lumen_math::Vec3;
use rand::{Rng, RngCore};

/// Uniform `f32` in `[0, 1)`.
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Orthonormal basis built around a single axis.
#[derive(Debug, Clone, Copy)]
pub struct Onb {
    u: Vec3,
    v: Vec3,
    w: Vec3,
}

impl Onb {
    /// Basis whose `w` axis is `n` (normalized here).
    pub fn from_w(n: Vec3) -> Self {
        let w = n.normalize();
        let (u, v) = w.any_orthonormal_pair();
        Self { u, v, w }
    }

    pub fn w(&self) -> Vec3 {
        self.w
    }

    /// Map local coordinates to world space.
    pub fn local(&self, a: Vec3) -> Vec3 {
        a.x * self.u + a.y * self.v + a.z * self.w
    }
}

/// Cosine-weighted direction on the +Z hemisphere.
pub fn random_cosine_direction(rng: &mut dyn RngCore) -> Vec3 {
    let r1 = gen_f32(rng);
    let r2 = gen_f32(rng);

    let phi = 2.0 * PI * r1;
    let r = r2.sqrt();
    Vec3::new(phi.cos() * r, phi.sin() * r, (1.0 - r2).max(0.0).sqrt())
}

/// Uniform direction on the unit sphere.
pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    let z = 1.0 - 2.0 * gen_f32(rng);
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = 2.0 * PI * gen_f32(rng);
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}

/// Power heuristic with exponent 2 for combining two sampling strategies.
///
/// Returns 0 when both densities are 0.
#[inline]
pub fn power_heuristic(pdf_a: f32, pdf_b: f32) -> f32 {
    let a2 = pdf_a * pdf_a;
    let b2 = pdf_b * pdf_b;
    if a2 + b2 == 0.0 {
        0.0
    } else {
        a2 / (a2 + b2)
    }
}

/// Reflect a vector about a normal.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a unit vector through a surface.
#[inline]
pub fn refract(uv: Vec3, n: Vec3, etai_over_etat: f32) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}
