//! Render and scene configuration.
//!
//! Both structs deserialize with `#[serde(default)]`, so a JSON file only has
//! to name the fields it wants to change.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::material::Color;

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
    /// Samples per pixel
    pub samples_per_pixel: u32,
    /// Hard limit on path length (number of surface interactions)
    pub max_depth: u32,
    /// Depth from which Russian roulette may terminate a path
    pub rr_start_depth: u32,
    /// Probability that a path survives a roulette draw
    pub rr_continue_probability: f32,
    /// Minimum hit distance for spawned rays, avoids self-intersection
    pub ray_epsilon: f32,
    /// Edge length of a render bucket in pixels
    pub bucket_size: u32,
    /// Base seed; each bucket derives its own generator from it
    pub seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 256,
            height: 256,
            samples_per_pixel: 64,
            max_depth: 50,
            rr_start_depth: 3,
            rr_continue_probability: 0.8,
            ray_epsilon: 1e-3,
            bucket_size: crate::bucket::DEFAULT_BUCKET_SIZE,
            seed: 0,
        }
    }
}

impl RenderConfig {
    /// Check the settings before any work is scheduled.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidResolution {
                width: self.width,
                height: self.height,
            });
        }
        if self.samples_per_pixel == 0 {
            return Err(ConfigError::NoSamples);
        }
        if self.max_depth == 0 {
            return Err(ConfigError::NoDepth);
        }
        let q = self.rr_continue_probability;
        if !(q > 0.0 && q <= 1.0) {
            return Err(ConfigError::InvalidRoulette(q));
        }
        if !(self.ray_epsilon > 0.0 && self.ray_epsilon.is_finite()) {
            return Err(ConfigError::InvalidEpsilon(self.ray_epsilon));
        }
        if self.bucket_size == 0 {
            return Err(ConfigError::InvalidBucketSize);
        }
        Ok(())
    }
}

/// Per-scene settings handed to [`SceneBuilder::new`](crate::SceneBuilder::new).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Human readable scene name, used in log output
    pub name: String,
    /// Radiance returned for rays that leave the scene
    pub background: Color,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            name: "untitled".to_string(),
            background: Color::ZERO,
        }
    }
}

impl SceneConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }
}
