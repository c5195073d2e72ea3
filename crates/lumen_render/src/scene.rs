//! Scene aggregate: meshes, the triangle BVH over all of them, and the
//! light-selection tables.
//!
//! A [`SceneBuilder`] collects meshes; [`SceneBuilder::build`] consumes it and
//! produces an immutable [`Scene`]. All acceleration data is built exactly
//! once, inside `build`, so a `Scene` is always ready to be queried and can be
//! shared between render threads by reference.

use lumen_math::{Interval, Ray, Vec2, Vec3};
use rand::RngCore;

use crate::bvh::{Bvh, TraversalStack};
use crate::cdf::DiscreteCdf;
use crate::config::SceneConfig;
use crate::error::SceneError;
use crate::hittable::HitRecord;
use crate::material::Color;
use crate::mesh::Mesh;
use crate::sampling::gen_f32;
use crate::triangle::Triangle;

/// Emitters facing the shading point more obliquely than this are skipped.
const MIN_LIGHT_COSINE: f32 = 1e-4;

/// Solid-angle densities at or below this are treated as zero.
const MIN_LIGHT_PDF: f32 = 1e-6;

/// Shadow rays stop this fraction short of the light sample.
const SHADOW_RAY_SHRINK: f32 = 1e-4;

/// A direction towards an emitter, produced by next event estimation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSample {
    /// Emitted radiance divided by `pdf`
    pub radiance: Color,
    /// Unit direction from the shading point to the light sample
    pub direction: Vec3,
    /// Solid-angle density including light selection
    pub pdf: f32,
}

/// Collects meshes before the scene is built.
pub struct SceneBuilder {
    config: SceneConfig,
    meshes: Vec<Mesh>,
}

impl SceneBuilder {
    pub fn new(config: SceneConfig) -> Self {
        Self {
            config,
            meshes: Vec::new(),
        }
    }

    /// Add a mesh and return its shape id.
    ///
    /// Meshes whose material is emissive become lights.
    pub fn add_mesh(&mut self, mesh: Mesh) -> Result<u32, SceneError> {
        mesh.validate()?;
        let shape_id = u32::try_from(self.meshes.len())
            .map_err(|_| SceneError::TooManyMeshes { max: u32::MAX as usize })?;
        self.meshes.push(mesh);
        Ok(shape_id)
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Precompute triangles, build the BVH and the light tables.
    pub fn build(self) -> Scene {
        let Self { config, mut meshes } = self;

        let triangle_total: usize = meshes.iter().map(Mesh::triangle_count).sum();
        let mut items = Vec::with_capacity(triangle_total);
        let mut degenerate = 0usize;
        for (shape_id, mesh) in meshes.iter().enumerate() {
            for (prim_id, indices) in mesh.indices.iter().enumerate() {
                let tri = Triangle::precompute(shape_id as u32, prim_id as u32, *indices, &mesh.positions);
                if tri.is_degenerate() {
                    degenerate += 1;
                    continue;
                }
                items.push((tri, mesh.triangle_bounds(prim_id)));
            }
        }
        if degenerate > 0 {
            log::warn!(
                "Scene '{}': skipped {} degenerate triangles",
                config.name,
                degenerate
            );
        }

        let bvh = Bvh::new(items);

        let mut light_ids = Vec::new();
        let mut light_cdf = DiscreteCdf::with_capacity(meshes.len());
        for (shape_id, mesh) in meshes.iter_mut().enumerate() {
            if !mesh.is_emissive() {
                continue;
            }
            let area = mesh.prepare_sampling_table();
            if area <= 0.0 {
                log::warn!("Scene '{}': emitter '{}' has no area", config.name, mesh.name);
                continue;
            }
            light_ids.push(shape_id as u32);
            light_cdf.append(mesh.sampling_weight);
        }
        light_cdf.normalize();

        if light_ids.is_empty() {
            log::warn!("Scene '{}' has no lights; only the background contributes", config.name);
        } else if !light_cdf.is_valid() {
            log::warn!("Scene '{}': all light sampling weights are zero", config.name);
        }

        log::info!(
            "Scene '{}' built: {} meshes, {} triangles, {} lights",
            config.name,
            meshes.len(),
            bvh.stats().primitive_count,
            light_ids.len()
        );

        Scene {
            config,
            meshes,
            bvh,
            light_ids,
            light_cdf,
        }
    }
}

/// Immutable, render-ready scene.
pub struct Scene {
    config: SceneConfig,
    meshes: Vec<Mesh>,
    bvh: Bvh<Triangle>,
    /// Shape ids of the emitters, in light-CDF order
    light_ids: Vec<u32>,
    light_cdf: DiscreteCdf,
}

impl Scene {
    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Radiance for rays that leave the scene.
    pub fn background(&self) -> Color {
        self.config.background
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn bvh(&self) -> &Bvh<Triangle> {
        &self.bvh
    }

    /// True if next event estimation has anything to sample.
    pub fn has_lights(&self) -> bool {
        self.light_cdf.is_valid()
    }

    /// Nearest surface along the ray.
    pub fn intersect(
        &self,
        ray: &Ray,
        ray_t: Interval,
        stack: &mut TraversalStack,
    ) -> Option<HitRecord<'_>> {
        let cache = self.bvh.hit(ray, ray_t, stack)?;
        let mesh = &self.meshes[cache.shape_id as usize];
        Some(mesh.fill_hit_record(ray, &cache, mesh.is_emissive()))
    }

    /// True if anything blocks the ray within `ray_t`.
    pub fn occluded(&self, ray: &Ray, ray_t: Interval, stack: &mut TraversalStack) -> bool {
        self.bvh.hit_fast(ray, ray_t, stack)
    }

    /// Sample a visible point on an emitter as seen from `point`.
    ///
    /// `normal` is the shading normal at `point`; the shadow ray leaves along
    /// the sampled direction starting `epsilon` away. Returns `None` when there
    /// are no lights, the emitter faces away, the density is negligible or the
    /// sample is occluded.
    pub fn sample_lights(
        &self,
        point: Vec3,
        normal: Vec3,
        epsilon: f32,
        stack: &mut TraversalStack,
        rng: &mut dyn RngCore,
    ) -> Option<LightSample> {
        if !self.has_lights() {
            return None;
        }

        let (light, selection_pdf) = self.light_cdf.sample_with_pdf(gen_f32(rng));
        let mesh = &self.meshes[self.light_ids[light] as usize];
        let (light_point, light_normal) =
            mesh.sample_position(gen_f32(rng), (gen_f32(rng), gen_f32(rng)))?;

        let offset = light_point - point;
        let dist_squared = offset.length_squared();
        if dist_squared <= 0.0 {
            return None;
        }
        let dist = dist_squared.sqrt();
        let direction = offset / dist;

        // Lights are only sampled towards the hemisphere the shading point is in
        if normal.dot(direction) <= 0.0 {
            return None;
        }

        let cos_light = light_normal.dot(-direction);
        if cos_light <= MIN_LIGHT_COSINE {
            return None;
        }

        let solid_angle_pdf = mesh.pdf_position() * dist_squared / cos_light;
        if solid_angle_pdf <= MIN_LIGHT_PDF {
            return None;
        }

        let shadow = Ray::new(point, direction);
        let shadow_t = Interval::new(epsilon, dist * (1.0 - SHADOW_RAY_SHRINK));
        if self.occluded(&shadow, shadow_t, stack) {
            return None;
        }

        let mut emitter = HitRecord {
            p: light_point,
            normal: light_normal,
            geometric_normal: light_normal,
            uv: Vec2::ZERO,
            t: dist,
            material: mesh.material.as_ref(),
            front_face: true,
            is_light: true,
            shape_id: self.light_ids[light],
        };
        emitter.set_face_normal(direction, light_normal);
        emitter.geometric_normal = emitter.normal;

        let pdf = selection_pdf * solid_angle_pdf;
        Some(LightSample {
            radiance: mesh.material.emitted(&emitter) / pdf,
            direction,
            pdf,
        })
    }

    /// Solid-angle density with which [`sample_lights`](Self::sample_lights)
    /// would have picked the emitter point described by `rec`.
    ///
    /// `direction` is the (not necessarily unit) direction of the ray that
    /// produced `rec`, so the distance travelled is `rec.t * |direction|`.
    pub fn pdf_light_direct(&self, rec: &HitRecord, direction: Vec3) -> f32 {
        if !rec.is_light || !self.has_lights() {
            return 0.0;
        }
        let mesh = &self.meshes[rec.shape_id as usize];

        let length = direction.length();
        if length <= 0.0 {
            return 0.0;
        }
        // Same normal that sample_lights measures the emitter cosine with
        let cos = (direction / length).dot(rec.geometric_normal).abs();
        if cos <= 0.0 {
            return 0.0;
        }
        let dist = rec.t * length;

        mesh.pdf_position() * dist * dist / cos
            * mesh.sampling_weight.max(0.0)
            * self.light_cdf.normalization()
    }
}
