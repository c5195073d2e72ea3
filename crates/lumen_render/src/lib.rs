//! lumen renderer - CPU path tracing over triangle meshes.
//!
//! Scenes are assembled with a [`SceneBuilder`], frozen into a [`Scene`]
//! (triangle BVH plus light tables), and rendered by a [`PathIntegrator`]
//! that combines light sampling and BSDF sampling with multiple importance
//! sampling.

mod bucket;
mod bvh;
mod camera;
mod cdf;
mod config;
mod error;
mod hittable;
mod integrator;
mod material;
mod mesh;
mod renderer;
mod sampling;
mod scene;
mod texture;
mod triangle;

pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use bvh::{Bvh, BvhNode, BvhStats, TraversalStack, LEAF_MAX_SIZE, MAX_SPLIT_DEPTH};
pub use camera::Camera;
pub use cdf::DiscreteCdf;
pub use config::{RenderConfig, SceneConfig};
pub use error::{ConfigError, SceneError};
pub use hittable::{HitCache, HitRecord, Primitive};
pub use integrator::PathIntegrator;
pub use material::{
    Color, Dielectric, DiffuseLight, Lambertian, Material, MaterialProperties, Metal, ScatterRecord,
};
pub use mesh::Mesh;
pub use renderer::{color_to_rgba, linear_to_gamma, render, ImageBuffer};
pub use sampling::{gen_f32, power_heuristic, Onb};
pub use scene::{LightSample, Scene, SceneBuilder};
pub use texture::{CheckerTexture, SolidColor, Texture, UvTexture};
pub use triangle::{square_to_uniform_triangle, Triangle};

/// Re-export common math types from lumen_math
pub use lumen_math::{Aabb, Interval, Ray, Vec2, Vec3};
