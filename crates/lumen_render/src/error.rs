//! Error types for scene assembly and configuration.

use thiserror::Error;

/// Errors raised while adding geometry to a [`SceneBuilder`](crate::SceneBuilder).
///
/// These are only produced at the API boundary. Once a scene is built,
/// degenerate geometry is handled by contributing nothing, never by failing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("mesh '{mesh}': triangle {triangle} references vertex {index}, but only {count} vertices exist")]
    VertexIndexOutOfRange {
        mesh: String,
        triangle: usize,
        index: u32,
        count: usize,
    },

    #[error("mesh '{mesh}': expected {expected} {attribute}, found {found}")]
    AttributeLengthMismatch {
        mesh: String,
        attribute: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("mesh '{mesh}' has more than {max} triangles")]
    TooManyTriangles { mesh: String, max: usize },

    #[error("scene has more than {max} meshes")]
    TooManyMeshes { max: usize },
}

/// Invalid render settings, reported by [`RenderConfig::validate`](crate::RenderConfig::validate).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("samples_per_pixel must be at least 1")]
    NoSamples,

    #[error("max_depth must be at least 1")]
    NoDepth,

    #[error("rr_continue_probability must be in (0, 1], got {0}")]
    InvalidRoulette(f32),

    #[error("ray_epsilon must be positive and finite, got {0}")]
    InvalidEpsilon(f32),

    #[error("bucket_size must be at least 1")]
    InvalidBucketSize,

    #[error("image resolution must be non-zero, got {width}x{height}")]
    InvalidResolution { width: u32, height: u32 },
}
