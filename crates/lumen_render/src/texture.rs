//! Procedural textures evaluated at a surface point.

use std::sync::Arc;

use lumen_math::{Vec2, Vec3};

use crate::material::Color;

/// A color that varies over a surface.
pub trait Texture: Send + Sync {
    /// Color at texture coordinates `uv` and world position `p`.
    fn value(&self, uv: Vec2, p: Vec3) -> Color;
}

/// The same color everywhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolidColor {
    color: Color,
}

impl SolidColor {
    pub fn new(color: Color) -> Self {
        Self { color }
    }
}

impl Texture for SolidColor {
    fn value(&self, _uv: Vec2, _p: Vec3) -> Color {
        self.color
    }
}

/// Alternating squares in texture space.
///
/// `frequency` is the number of squares along each of u and v over the unit
/// square. Coordinates outside [0, 1] keep repeating the pattern.
#[derive(Clone)]
pub struct CheckerTexture {
    even: Arc<dyn Texture>,
    odd: Arc<dyn Texture>,
    frequency: f32,
}

impl CheckerTexture {
    pub fn new(even: Arc<dyn Texture>, odd: Arc<dyn Texture>, frequency: f32) -> Self {
        Self { even, odd, frequency }
    }

    pub fn from_colors(even: Color, odd: Color, frequency: f32) -> Self {
        Self::new(Arc::new(SolidColor::new(even)), Arc::new(SolidColor::new(odd)), frequency)
    }
}

impl Texture for CheckerTexture {
    fn value(&self, uv: Vec2, p: Vec3) -> Color {
        let cell = (uv * self.frequency).floor();
        if (cell.x + cell.y).rem_euclid(2.0) < 1.0 {
            self.even.value(uv, p)
        } else {
            self.odd.value(uv, p)
        }
    }
}

/// Shows the texture coordinates as red and green. Handy for checking UV layouts.
#[derive(Debug, Clone, Copy, Default)]
pub struct UvTexture;

impl Texture for UvTexture {
    fn value(&self, uv: Vec2, _p: Vec3) -> Color {
        Color::new(uv.x.fract().abs(), uv.y.fract().abs(), 0.0)
    }
}
