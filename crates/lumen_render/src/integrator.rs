//! Unidirectional path tracer with next event estimation.
//!
//! Light is gathered two ways at every diffuse vertex: an explicit sample
//! towards an emitter, and emitters found by following the BSDF sample. The
//! two are combined with the power heuristic so neither is counted twice.

use lumen_math::{Interval, Ray};
use rand::RngCore;

use crate::bvh::TraversalStack;
use crate::config::RenderConfig;
use crate::material::Color;
use crate::sampling::{gen_f32, power_heuristic};
use crate::scene::Scene;

/// Non-delta BSDF samples with a density below this end the path.
const MIN_BSDF_PDF: f32 = 1e-6;

/// Estimates incoming radiance along camera rays.
pub struct PathIntegrator<'a> {
    scene: &'a Scene,
    max_depth: u32,
    rr_start_depth: u32,
    rr_continue_probability: f32,
    ray_epsilon: f32,
}

impl<'a> PathIntegrator<'a> {
    pub fn new(scene: &'a Scene, config: &RenderConfig) -> Self {
        Self {
            scene,
            max_depth: config.max_depth,
            rr_start_depth: config.rr_start_depth,
            rr_continue_probability: config.rr_continue_probability.clamp(f32::MIN_POSITIVE, 1.0),
            ray_epsilon: config.ray_epsilon,
        }
    }

    pub fn scene(&self) -> &'a Scene {
        self.scene
    }

    /// Radiance arriving at the ray origin from the ray direction.
    ///
    /// Returns black for samples that turn out non-finite.
    pub fn li(&self, ray: &Ray, stack: &mut TraversalStack, rng: &mut dyn RngCore) -> Color {
        let scene = self.scene;
        let ray_t = Interval::from_min(self.ray_epsilon);

        let mut ray = Ray::normalized(ray.origin, ray.direction);
        let mut throughput = Color::ONE;
        let mut radiance = Color::ZERO;
        // Density of the BSDF sample that produced `ray`; 0 after a delta event
        let mut prev_pdf = 0.0;

        for depth in 0..self.max_depth {
            let Some(rec) = scene.intersect(&ray, ray_t, stack) else {
                radiance += throughput * scene.background();
                break;
            };

            if rec.is_light {
                let emission = rec.material.emitted(&rec);
                if depth == 0 || prev_pdf == 0.0 {
                    radiance += throughput * emission;
                } else {
                    let light_pdf = scene.pdf_light_direct(&rec, ray.direction);
                    radiance += throughput * emission * power_heuristic(prev_pdf, light_pdf);
                }
                break;
            }

            // Next event estimation
            if !rec.material.properties().is_pure_specular {
                if let Some(light) = scene.sample_lights(rec.p, rec.normal, self.ray_epsilon, stack, rng) {
                    let f = rec.material.eval(&rec, ray.direction, light.direction);
                    if f != Color::ZERO {
                        let bsdf_pdf = rec.material.pdf(&rec, ray.direction, light.direction);
                        let weight = power_heuristic(light.pdf, bsdf_pdf);
                        radiance += throughput * f * light.radiance * weight;
                    }
                }
            }

            let Some(scatter) = rec.material.scatter(&ray, &rec, rng) else {
                break;
            };
            if !scatter.is_delta && scatter.pdf < MIN_BSDF_PDF {
                break;
            }

            if depth >= self.rr_start_depth {
                if gen_f32(rng) > self.rr_continue_probability {
                    break;
                }
                throughput /= self.rr_continue_probability;
            }

            throughput *= scatter.attenuation;
            prev_pdf = if scatter.is_delta { 0.0 } else { scatter.pdf };
            ray = Ray::normalized(scatter.ray.origin, scatter.ray.direction);
        }

        if radiance.is_finite() {
            radiance
        } else {
            Color::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use crate::material::{DiffuseLight, Lambertian, Material, Metal};
    use crate::mesh::Mesh;
    use crate::scene::SceneBuilder;
    use lumen_math::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn config() -> RenderConfig {
        RenderConfig {
            max_depth: 8,
            ..Default::default()
        }
    }

    #[test]
    fn test_miss_returns_background() {
        let mut builder = SceneBuilder::new(SceneConfig::default().with_background(Color::new(0.1, 0.2, 0.3)));
        builder
            .add_mesh(Mesh::quad("q", Vec3::new(0.0, 0.0, -1.0), Vec3::X, Vec3::Y, Arc::new(Lambertian::new(Color::ONE))))
            .unwrap();
        let scene = builder.build();
        let integrator = PathIntegrator::new(&scene, &config());
        let mut stack = TraversalStack::default();
        let mut rng = StdRng::seed_from_u64(0);

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(integrator.li(&ray, &mut stack, &mut rng), Color::new(0.1, 0.2, 0.3));
    }

    #[test]
    fn test_camera_sees_light_directly() {
        let mut builder = SceneBuilder::new(SceneConfig::default());
        builder
            .add_mesh(Mesh::quad("light", Vec3::new(-1.0, -1.0, -1.0), Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, 2.0, 0.0), Arc::new(DiffuseLight::new(Color::splat(3.0)))))
            .unwrap();
        let scene = builder.build();
        let integrator = PathIntegrator::new(&scene, &config());
        let mut stack = TraversalStack::default();
        let mut rng = StdRng::seed_from_u64(0);

        let front = Ray::new(Vec3::ZERO, -Vec3::Z);
        assert_eq!(integrator.li(&front, &mut stack, &mut rng), Color::splat(3.0));

        // Back side emits nothing
        let back = Ray::new(Vec3::new(0.0, 0.0, -2.0), Vec3::Z);
        assert_eq!(integrator.li(&back, &mut stack, &mut rng), Color::ZERO);
    }

    #[test]
    fn test_mirror_reflects_light_at_full_weight() {
        // Mirror floor, light above, camera looking down at the mirror
        let mut builder = SceneBuilder::new(SceneConfig::default());
        let mirror: Arc<dyn Material> = Arc::new(Metal::new(Color::splat(0.5), 0.0));
        builder
            .add_mesh(Mesh::quad("mirror", Vec3::new(-5.0, 0.0, 5.0), Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -10.0), mirror))
            .unwrap();
        builder
            .add_mesh(Mesh::quad("light", Vec3::new(-5.0, 2.0, -5.0), Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 10.0), Arc::new(DiffuseLight::new(Color::splat(2.0)))))
            .unwrap();
        let scene = builder.build();
        let integrator = PathIntegrator::new(&scene, &config());
        let mut stack = TraversalStack::default();
        let mut rng = StdRng::seed_from_u64(0);

        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.1, -1.0, 0.0));
        let radiance = integrator.li(&ray, &mut stack, &mut rng);
        assert!((radiance - Color::splat(1.0)).length() < 1e-5, "{radiance:?}");
    }

    #[test]
    fn test_diffuse_floor_is_lit() {
        let mut builder = SceneBuilder::new(SceneConfig::default());
        builder
            .add_mesh(Mesh::quad("floor", Vec3::new(-5.0, 0.0, 5.0), Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -10.0), Arc::new(Lambertian::new(Color::splat(0.5)))))
            .unwrap();
        builder
            .add_mesh(Mesh::quad("light", Vec3::new(-0.5, 1.0, -0.5), Vec3::X, Vec3::Z, Arc::new(DiffuseLight::new(Color::splat(10.0)))))
            .unwrap();
        let scene = builder.build();
        let integrator = PathIntegrator::new(&scene, &config());
        let mut stack = TraversalStack::default();
        let mut rng = StdRng::seed_from_u64(4);

        let ray = Ray::new(Vec3::new(0.0, 0.5, 0.5), Vec3::new(0.0, -0.5, -0.5));
        let mut sum = Color::ZERO;
        for _ in 0..256 {
            let l = integrator.li(&ray, &mut stack, &mut rng);
            assert!(l.is_finite());
            assert!(l.min_element() >= 0.0);
            sum += l;
        }
        assert!(sum.x > 0.0);
    }
}
