//! Parallel bucket renderer and output conversion.

use std::time::Instant;

use rayon::prelude::*;

use crate::bucket::{generate_buckets, render_bucket, BucketResult};
use crate::bvh::TraversalStack;
use crate::camera::Camera;
use crate::config::RenderConfig;
use crate::error::ConfigError;
use crate::integrator::PathIntegrator;
use crate::material::Color;
use crate::scene::Scene;

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a linear color to gamma-corrected 8-bit RGBA.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let to_byte = |c: f32| (255.0 * linear_to_gamma(c).clamp(0.0, 1.0)).round() as u8;
    [to_byte(color.x), to_byte(color.y), to_byte(color.z), 255]
}

/// Simple image buffer for storing render output.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    /// Copy a finished bucket into place.
    pub fn write_bucket(&mut self, result: &BucketResult) {
        let bucket = &result.bucket;
        for (i, color) in result.pixels.iter().enumerate() {
            let local_x = i as u32 % bucket.width;
            let local_y = i as u32 / bucket.width;
            self.set(bucket.x + local_x, bucket.y + local_y, *color);
        }
    }

    /// Mean of all pixels.
    pub fn average(&self) -> Color {
        if self.pixels.is_empty() {
            return Color::ZERO;
        }
        self.pixels.iter().copied().sum::<Color>() / self.pixels.len() as f32
    }

    /// Convert to RGBA bytes (for display or saving).
    pub fn to_rgba(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|c| color_to_rgba(*c)).collect()
    }
}

/// Render the scene through `camera` using every available core.
///
/// The camera's resolution is overridden by the configuration.
pub fn render(camera: &Camera, scene: &Scene, config: &RenderConfig) -> Result<ImageBuffer, ConfigError> {
    config.validate()?;

    let mut camera = camera.clone().with_resolution(config.width, config.height);
    camera.initialize();

    let integrator = PathIntegrator::new(scene, config);
    let buckets = generate_buckets(config.width, config.height, config.bucket_size);

    log::info!(
        "Rendering '{}' at {}x{}, {} spp, {} buckets",
        scene.name(),
        config.width,
        config.height,
        config.samples_per_pixel,
        buckets.len()
    );
    let start = Instant::now();

    let results: Vec<BucketResult> = buckets
        .par_iter()
        .map_init(TraversalStack::default, |stack, bucket| {
            render_bucket(
                bucket,
                &camera,
                &integrator,
                config.samples_per_pixel,
                config.seed,
                stack,
            )
        })
        .collect();

    let mut image = ImageBuffer::new(config.width, config.height);
    for result in &results {
        image.write_bucket(result);
    }

    log::info!("Render finished in {:.2?}", start.elapsed());
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use crate::material::Lambertian;
    use crate::mesh::Mesh;
    use crate::scene::SceneBuilder;
    use lumen_math::Vec3;
    use std::sync::Arc;

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert_eq!(linear_to_gamma(-1.0), 0.0);
        assert!((linear_to_gamma(1.0) - 1.0).abs() < 0.0001);
        assert!((linear_to_gamma(0.25) - 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_color_to_rgba_clamps() {
        assert_eq!(color_to_rgba(Color::new(0.0, 1.0, 4.0)), [0, 255, 255, 255]);
        assert_eq!(color_to_rgba(Color::splat(0.25)), [128, 128, 128, 255]);
    }

    #[test]
    fn test_pixel_index_does_not_wrap() {
        let image = ImageBuffer {
            width: 100_000,
            height: 100_000,
            pixels: Vec::new(),
        };
        assert_eq!(image.index(7, 50_000), 5_000_000_007);
    }

    #[test]
    fn test_render_background_only() {
        let mut builder = SceneBuilder::new(SceneConfig::default().with_background(Color::splat(0.5)));
        // Behind the camera, never seen
        builder
            .add_mesh(Mesh::quad("q", Vec3::new(0.0, 0.0, 5.0), Vec3::X, Vec3::Y, Arc::new(Lambertian::new(Color::ONE))))
            .unwrap();
        let scene = builder.build();

        let config = RenderConfig {
            width: 20,
            height: 10,
            samples_per_pixel: 2,
            bucket_size: 8,
            ..Default::default()
        };
        let image = render(&Camera::new(), &scene, &config).unwrap();
        assert_eq!(image.pixels.len(), 200);
        assert!(image.pixels.iter().all(|&p| p == Color::splat(0.5)));
        assert_eq!(image.to_rgba().len(), 800);
    }

    #[test]
    fn test_render_is_deterministic() {
        let mut builder = SceneBuilder::new(SceneConfig::default().with_background(Color::ONE));
        builder
            .add_mesh(Mesh::quad("floor", Vec3::new(-5.0, -1.0, 5.0), Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -10.0), Arc::new(Lambertian::new(Color::splat(0.5)))))
            .unwrap();
        let scene = builder.build();
        let config = RenderConfig {
            width: 16,
            height: 16,
            samples_per_pixel: 2,
            bucket_size: 4,
            seed: 3,
            ..Default::default()
        };

        let a = render(&Camera::new(), &scene, &config).unwrap();
        let b = render(&Camera::new(), &scene, &config).unwrap();
        assert_eq!(a.pixels, b.pixels);
    }

    #[test]
    fn test_render_rejects_invalid_config() {
        let scene = SceneBuilder::new(SceneConfig::default()).build();
        let config = RenderConfig {
            samples_per_pixel: 0,
            ..Default::default()
        };
        assert_eq!(render(&Camera::new(), &scene, &config).unwrap_err(), ConfigError::NoSamples);
    }
}
