//! Material trait for surface scattering.
//!
//! Direction convention: `wi` is the direction of the incoming ray (pointing
//! towards the surface), `wo` the direction leaving the surface.

use std::f32::consts::FRAC_1_PI;
use std::sync::Arc;

use lumen_math::{Ray, Vec3};
use rand::RngCore;

use crate::hittable::HitRecord;
use crate::sampling::{gen_f32, random_cosine_direction, random_unit_vector, reflect, refract, Onb};
use crate::texture::{SolidColor, Texture};

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// Result of sampling a material.
#[derive(Debug, Clone, Copy)]
pub struct ScatterRecord {
    /// Continuation ray, origin at the hit point, unit direction
    pub ray: Ray,
    /// BSDF value times cosine divided by `pdf` (the throughput factor)
    pub attenuation: Color,
    /// Solid-angle density of the sampled direction; 0 for delta events
    pub pdf: f32,
    /// Direction was chosen deterministically (mirror, glass)
    pub is_delta: bool,
}

impl ScatterRecord {
    /// A delta-distributed event with no meaningful density.
    pub fn specular(ray: Ray, attenuation: Color) -> Self {
        Self {
            ray,
            attenuation,
            pdf: 0.0,
            is_delta: true,
        }
    }
}

/// Material properties for optimization hints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaterialProperties {
    /// True if the material is perfectly specular (mirror, glass)
    pub is_pure_specular: bool,
    /// True if the material emits light
    pub is_emissive: bool,
}

/// Trait for materials that describe how light interacts with surfaces.
pub trait Material: Send + Sync {
    /// Sample a continuation direction.
    ///
    /// Returns `None` if the ray is absorbed.
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterRecord>;

    /// Density with which `scatter` would pick `wo`.
    fn pdf(&self, _rec: &HitRecord, _wi: Vec3, _wo: Vec3) -> f32 {
        0.0
    }

    /// BSDF times the cosine of `wo` with the shading normal.
    fn eval(&self, _rec: &HitRecord, _wi: Vec3, _wo: Vec3) -> Color {
        Color::ZERO
    }

    /// Radiance emitted at the hit point towards the incoming ray.
    fn emitted(&self, _rec: &HitRecord) -> Color {
        Color::ZERO
    }

    fn properties(&self) -> MaterialProperties;
}

/// Lambertian (diffuse) material.
#[derive(Clone)]
pub struct Lambertian {
    albedo: Arc<dyn Texture>,
}

impl Lambertian {
    /// Create a new Lambertian material with the given albedo color.
    pub fn new(albedo: Color) -> Self {
        Self::textured(Arc::new(SolidColor::new(albedo)))
    }

    /// Albedo looked up from a texture at every hit.
    pub fn textured(albedo: Arc<dyn Texture>) -> Self {
        Self { albedo }
    }

    fn albedo_at(&self, rec: &HitRecord) -> Color {
        self.albedo.value(rec.uv, rec.p)
    }
}

impl Material for Lambertian {
    fn scatter(&self, _ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterRecord> {
        let onb = Onb::from_w(rec.normal);
        let direction = onb.local(random_cosine_direction(rng)).normalize();
        let cos_theta = direction.dot(onb.w());

        // f * cos / pdf collapses to the albedo for cosine sampling
        Some(ScatterRecord {
            ray: Ray::new(rec.p, direction),
            attenuation: self.albedo_at(rec),
            pdf: cos_theta.max(0.0) * FRAC_1_PI,
            is_delta: false,
        })
    }

    fn pdf(&self, rec: &HitRecord, _wi: Vec3, wo: Vec3) -> f32 {
        rec.normal.dot(wo.normalize()).max(0.0) * FRAC_1_PI
    }

    fn eval(&self, rec: &HitRecord, _wi: Vec3, wo: Vec3) -> Color {
        self.albedo_at(rec) * FRAC_1_PI * rec.normal.dot(wo.normalize()).max(0.0)
    }

    fn properties(&self) -> MaterialProperties {
        MaterialProperties {
            is_pure_specular: false,
            is_emissive: false,
        }
    }
}

/// Metal (specular) material.
#[derive(Debug, Clone)]
pub struct Metal {
    albedo: Color,
    fuzz: f32,
}

impl Metal {
    /// Create a new Metal material.
    ///
    /// - `albedo`: The color of the metal
    /// - `fuzz`: Roughness, 0.0 = perfect mirror, 1.0 = very rough
    pub fn new(albedo: Color, fuzz: f32) -> Self {
        Self {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }
}

impl Material for Metal {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterRecord> {
        let reflected = reflect(ray_in.direction().normalize(), rec.normal);
        let scattered_dir = reflected + self.fuzz * random_unit_vector(rng);

        // Absorbed if fuzz pushed the ray below the surface
        if scattered_dir.dot(rec.normal) > 0.0 {
            Some(ScatterRecord::specular(
                Ray::normalized(rec.p, scattered_dir),
                self.albedo,
            ))
        } else {
            None
        }
    }

    fn properties(&self) -> MaterialProperties {
        MaterialProperties {
            is_pure_specular: true,
            is_emissive: false,
        }
    }
}

/// Dielectric (glass) material.
#[derive(Debug, Clone)]
pub struct Dielectric {
    /// Index of refraction
    ior: f32,
}

impl Dielectric {
    /// Create a new Dielectric material.
    ///
    /// - `ior`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub fn new(ior: f32) -> Self {
        Self { ior }
    }

    /// Schlick's approximation for reflectance
    fn reflectance(cosine: f32, ior: f32) -> f32 {
        let r0 = ((1.0 - ior) / (1.0 + ior)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}

impl Material for Dielectric {
    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<ScatterRecord> {
        let refraction_ratio = if rec.front_face { 1.0 / self.ior } else { self.ior };

        let unit_direction = ray_in.direction().normalize();
        let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

        // Total internal reflection
        let cannot_refract = refraction_ratio * sin_theta > 1.0;

        let direction = if cannot_refract
            || Self::reflectance(cos_theta, refraction_ratio) > gen_f32(rng)
        {
            reflect(unit_direction, rec.normal)
        } else {
            refract(unit_direction, rec.normal, refraction_ratio)
        };

        Some(ScatterRecord::specular(
            Ray::normalized(rec.p, direction),
            Color::ONE,
        ))
    }

    fn properties(&self) -> MaterialProperties {
        MaterialProperties {
            is_pure_specular: true,
            is_emissive: false,
        }
    }
}

/// Diffuse area light. Emits from its front face only.
#[derive(Debug, Clone)]
pub struct DiffuseLight {
    emit: Color,
}

impl DiffuseLight {
    /// Create a new diffuse light with the given emission color.
    pub fn new(emit: Color) -> Self {
        Self { emit }
    }
}

impl Material for DiffuseLight {
    fn scatter(&self, _ray_in: &Ray, _rec: &HitRecord, _rng: &mut dyn RngCore) -> Option<ScatterRecord> {
        None
    }

    fn emitted(&self, rec: &HitRecord) -> Color {
        if rec.front_face {
            self.emit
        } else {
            Color::ZERO
        }
    }

    fn properties(&self) -> MaterialProperties {
        MaterialProperties {
            is_pure_specular: false,
            is_emissive: true,
        }
    }
}
