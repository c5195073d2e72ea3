//! The Cornell box, scaled to a unit cube, with a tiled floor.

use std::sync::Arc;

use anyhow::Result;
use lumen_math::{Mat4, Vec3};
use lumen_render::{
    Camera, CheckerTexture, Color, Dielectric, DiffuseLight, Lambertian, Material, Mesh, Metal,
    Scene, SceneBuilder, SceneConfig,
};

/// Build the box with a tall rotated block, a glass sphere and a mirror sphere.
pub fn build(config: SceneConfig) -> Result<Scene> {
    let red: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.65, 0.05, 0.05)));
    let white: Arc<dyn Material> = Arc::new(Lambertian::new(Color::splat(0.73)));
    let green: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.12, 0.45, 0.15)));
    let light: Arc<dyn Material> = Arc::new(DiffuseLight::new(Color::splat(15.0)));
    let glass: Arc<dyn Material> = Arc::new(Dielectric::new(1.5));
    let mirror: Arc<dyn Material> = Arc::new(Metal::new(Color::new(0.8, 0.85, 0.88), 0.02));
    let tiles: Arc<dyn Material> = Arc::new(Lambertian::textured(Arc::new(CheckerTexture::from_colors(
        Color::splat(0.73),
        Color::splat(0.35),
        8.0,
    ))));

    let mut builder = SceneBuilder::new(config);

    builder.add_mesh(Mesh::quad("left", Vec3::ZERO, Vec3::Y, Vec3::Z, red))?;
    builder.add_mesh(Mesh::quad("right", Vec3::X, Vec3::Z, Vec3::Y, green))?;
    builder.add_mesh(Mesh::quad("floor", Vec3::Z, Vec3::X, -Vec3::Z, tiles))?;
    builder.add_mesh(Mesh::quad("ceiling", Vec3::Y, Vec3::X, Vec3::Z, white.clone()))?;
    builder.add_mesh(Mesh::quad("back", Vec3::ZERO, Vec3::X, Vec3::Y, white.clone()))?;
    builder.add_mesh(Mesh::quad(
        "light",
        Vec3::new(0.38, 0.998, 0.4),
        Vec3::new(0.24, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 0.2),
        light,
    ))?;

    let block = Mesh::cuboid("block", Vec3::ZERO, Vec3::new(0.165, 0.33, 0.165), white).transformed(
        Mat4::from_translation(Vec3::new(0.24, 0.0, 0.3)) * Mat4::from_rotation_y(15f32.to_radians()),
    );
    builder.add_mesh(block)?;

    builder.add_mesh(Mesh::uv_sphere("glass", Vec3::new(0.68, 0.12, 0.45), 0.12, 48, 24, glass))?;
    builder.add_mesh(Mesh::uv_sphere("mirror", Vec3::new(0.62, 0.1, 0.78), 0.1, 48, 24, mirror))?;

    Ok(builder.build())
}

/// Camera in front of the open side of the box.
pub fn camera() -> Camera {
    Camera::new()
        .with_position(Vec3::new(0.5, 0.5, 1.9), Vec3::new(0.5, 0.5, 0.0), Vec3::Y)
        .with_fov(40.0)
}
