//! Bucket-based tile rendering.
//!
//! Divides the image into tiles (buckets) that can be rendered
//! independently and in parallel using rayon.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::bvh::TraversalStack;
use crate::camera::Camera;
use crate::integrator::PathIntegrator;
use crate::material::Color;

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// X coordinate of bucket's top-left corner
    pub x: u32,
    /// Y coordinate of bucket's top-left corner
    pub y: u32,
    /// Width of the bucket in pixels
    pub width: u32,
    /// Height of the bucket in pixels
    pub height: u32,
    /// Index of this bucket in the render order
    pub index: usize,
}

impl Bucket {
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self { x, y, width, height, index }
    }

    /// Get the total number of pixels in this bucket.
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    /// Generator for this bucket, independent of which thread renders it.
    pub fn rng(&self, seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed ^ (self.index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }
}

/// Default bucket size in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 32;

/// Generate buckets for an image, sorted in spiral order from center.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let bucket_size = bucket_size.max(1);
    let mut buckets = Vec::new();
    let mut index = 0;

    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let bw = bucket_size.min(width - x);
            let bh = bucket_size.min(height - y);
            buckets.push(Bucket::new(x, y, bw, bh, index));
            index += 1;
            x += bucket_size;
        }
        y += bucket_size;
    }

    sort_spiral(&mut buckets, width, height);

    // Update indices after sorting
    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = i;
    }

    buckets
}

/// Sort buckets by distance from image center, nearest first.
fn sort_spiral(buckets: &mut [Bucket], width: u32, height: u32) {
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;

    let distance = |b: &Bucket| {
        let cx = b.x as f32 + b.width as f32 / 2.0;
        let cy = b.y as f32 + b.height as f32 / 2.0;
        (cx - center_x).powi(2) + (cy - center_y).powi(2)
    };
    buckets.sort_by(|a, b| distance(a).total_cmp(&distance(b)));
}

/// Result of rendering a bucket.
#[derive(Debug, Clone)]
pub struct BucketResult {
    /// The bucket that was rendered
    pub bucket: Bucket,
    /// Pixel colors in row-major order
    pub pixels: Vec<Color>,
}

/// Render a single bucket.
///
/// Each pixel averages `samples_per_pixel` jittered camera paths.
pub fn render_bucket(
    bucket: &Bucket,
    camera: &Camera,
    integrator: &PathIntegrator,
    samples_per_pixel: u32,
    seed: u64,
    stack: &mut TraversalStack,
) -> BucketResult {
    let mut rng = bucket.rng(seed);
    let scale = 1.0 / samples_per_pixel.max(1) as f32;
    let mut pixels = Vec::with_capacity(bucket.pixel_count() as usize);

    for local_y in 0..bucket.height {
        for local_x in 0..bucket.width {
            let (x, y) = (bucket.x + local_x, bucket.y + local_y);
            let mut color = Color::ZERO;
            for _ in 0..samples_per_pixel {
                let ray = camera.get_ray(x, y, &mut rng);
                color += integrator.li(&ray, stack, &mut rng);
            }
            pixels.push(color * scale);
        }
    }

    log::debug!(
        "Bucket {} ({}x{} at {},{}) done",
        bucket.index,
        bucket.width,
        bucket.height,
        bucket.x,
        bucket.y
    );

    BucketResult {
        bucket: *bucket,
        pixels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;

    #[test]
    fn test_generate_buckets_exact_fit() {
        let buckets = generate_buckets(128, 128, 64);
        assert_eq!(buckets.len(), 4); // 2x2 grid

        let total_pixels: u32 = buckets.iter().map(|b| b.pixel_count()).sum();
        assert_eq!(total_pixels, 128 * 128);
    }

    #[test]
    fn test_generate_buckets_partial_fit() {
        let buckets = generate_buckets(100, 70, 64);
        assert_eq!(buckets.len(), 4); // 2x2 grid with partial buckets

        let total_pixels: u32 = buckets.iter().map(|b| b.pixel_count()).sum();
        assert_eq!(total_pixels, 100 * 70);
    }

    #[test]
    fn test_spiral_order() {
        let buckets = generate_buckets(192, 192, 64);
        assert_eq!(buckets.len(), 9); // 3x3 grid

        // First bucket should be the center one
        let first = &buckets[0];
        assert_eq!((first.x, first.y), (64, 64));
        assert!(buckets.iter().enumerate().all(|(i, b)| b.index == i));
    }

    #[test]
    fn test_bucket_rng_is_per_bucket() {
        let a = Bucket::new(0, 0, 8, 8, 0);
        let b = Bucket::new(8, 0, 8, 8, 1);
        assert_eq!(a.rng(7).next_u64(), a.rng(7).next_u64());
        assert_ne!(a.rng(7).next_u64(), b.rng(7).next_u64());
    }
}
