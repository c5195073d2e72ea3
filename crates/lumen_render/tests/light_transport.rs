//! Statistical checks of the path integrator on small closed scenes.

use std::sync::Arc;

use lumen_render::{
    Color, DiffuseLight, Lambertian, Material, Mesh, PathIntegrator, Ray, RenderConfig, Scene,
    SceneBuilder, SceneConfig, TraversalStack, Vec3,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Unit cube with inward-facing faces: emitting floor and ceiling, diffuse walls.
fn lit_box(wall_albedo: f32, radiance: f32) -> Scene {
    let light: Arc<dyn Material> = Arc::new(DiffuseLight::new(Color::splat(radiance)));
    let wall: Arc<dyn Material> = Arc::new(Lambertian::new(Color::splat(wall_albedo)));

    let mut builder = SceneBuilder::new(SceneConfig::named("furnace"));
    let faces = [
        ("floor", Vec3::new(0.0, 0.0, 1.0), Vec3::X, -Vec3::Z, &light),
        ("ceiling", Vec3::new(0.0, 1.0, 0.0), Vec3::X, Vec3::Z, &light),
        ("left", Vec3::ZERO, Vec3::Y, Vec3::Z, &wall),
        ("right", Vec3::new(1.0, 0.0, 0.0), Vec3::Z, Vec3::Y, &wall),
        ("back", Vec3::ZERO, Vec3::X, Vec3::Y, &wall),
        ("front", Vec3::new(0.0, 0.0, 1.0), Vec3::Y, Vec3::X, &wall),
    ];
    for (name, corner, u, v, material) in faces {
        builder
            .add_mesh(Mesh::quad(name, corner, u, v, Arc::clone(material)))
            .unwrap();
    }
    builder.build()
}

fn random_direction(rng: &mut StdRng) -> Vec3 {
    loop {
        let d = Vec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        let len2 = d.length_squared();
        if len2 > 1e-4 && len2 <= 1.0 {
            return d / len2.sqrt();
        }
    }
}

/// Mean radiance over `count` random rays leaving `origin`.
fn mean_radiance(scene: &Scene, config: &RenderConfig, origin: Vec3, count: usize, seed: u64) -> f32 {
    let integrator = PathIntegrator::new(scene, config);
    let mut stack = TraversalStack::default();
    let mut rng = StdRng::seed_from_u64(seed);

    let mut sum = 0.0f64;
    for _ in 0..count {
        let ray = Ray::new(origin, random_direction(&mut rng));
        let l = integrator.li(&ray, &mut stack, &mut rng);
        assert!(l.is_finite() && l.min_element() >= 0.0, "bad sample {l:?}");
        sum += l.x as f64;
    }
    (sum / count as f64) as f32
}

#[test]
fn furnace_box_returns_emitted_radiance() {
    // With white walls every surface reflects exactly the radiance it receives,
    // so every direction inside the box sees L.
    let scene = lit_box(1.0, 1.0);
    let config = RenderConfig {
        max_depth: 64,
        rr_start_depth: u32::MAX,
        ..Default::default()
    };

    let mean = mean_radiance(&scene, &config, Vec3::splat(0.5), 4000, 1);
    assert!((mean - 1.0).abs() < 0.05, "furnace mean = {mean}");

    let mean = mean_radiance(&scene, &config, Vec3::new(0.2, 0.7, 0.9), 4000, 2);
    assert!((mean - 1.0).abs() < 0.05, "furnace mean = {mean}");
}

#[test]
fn russian_roulette_is_unbiased() {
    let scene = lit_box(0.5, 1.0);
    let origin = Vec3::new(0.5, 0.5, 0.5);

    let without = RenderConfig {
        max_depth: 64,
        rr_start_depth: u32::MAX,
        ..Default::default()
    };
    let with = RenderConfig {
        max_depth: 64,
        rr_start_depth: 0,
        rr_continue_probability: 0.5,
        ..Default::default()
    };

    let reference = mean_radiance(&scene, &without, origin, 20_000, 10);
    let roulette = mean_radiance(&scene, &with, origin, 20_000, 11);
    assert!(reference > 0.3, "reference = {reference}");
    assert!(
        (reference - roulette).abs() < 0.03,
        "roulette {roulette} vs reference {reference}"
    );
}

#[test]
fn cornell_box_light_footprint() {
    let white: Arc<dyn Material> = Arc::new(Lambertian::new(Color::splat(0.73)));
    let red: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.65, 0.05, 0.05)));
    let green: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.12, 0.45, 0.15)));
    let light: Arc<dyn Material> = Arc::new(DiffuseLight::new(Color::splat(15.0)));

    let mut builder = SceneBuilder::new(SceneConfig::named("cornell"));
    builder.add_mesh(Mesh::quad("floor", Vec3::new(0.0, 0.0, 1.0), Vec3::X, -Vec3::Z, white.clone())).unwrap();
    builder.add_mesh(Mesh::quad("ceiling", Vec3::new(0.0, 1.0, 0.0), Vec3::X, Vec3::Z, white.clone())).unwrap();
    builder.add_mesh(Mesh::quad("back", Vec3::ZERO, Vec3::X, Vec3::Y, white.clone())).unwrap();
    builder.add_mesh(Mesh::quad("left", Vec3::ZERO, Vec3::Y, Vec3::Z, red)).unwrap();
    builder.add_mesh(Mesh::quad("right", Vec3::new(1.0, 0.0, 0.0), Vec3::Z, Vec3::Y, green)).unwrap();
    builder
        .add_mesh(Mesh::quad("light", Vec3::new(0.35, 0.999, 0.35), Vec3::new(0.3, 0.0, 0.0), Vec3::new(0.0, 0.0, 0.3), light))
        .unwrap();
    builder
        .add_mesh(Mesh::uv_sphere("ball", Vec3::new(0.5, 0.25, 0.5), 0.2, 32, 16, white))
        .unwrap();
    let scene = builder.build();
    assert!(scene.has_lights());

    let config = RenderConfig {
        max_depth: 16,
        ..Default::default()
    };
    let integrator = PathIntegrator::new(&scene, &config);
    let mut stack = TraversalStack::default();
    let mut rng = StdRng::seed_from_u64(2024);

    let mut estimate = |ray: Ray| {
        let mut sum = Color::ZERO;
        for _ in 0..2000 {
            sum += integrator.li(&ray, &mut stack, &mut rng);
        }
        sum / 2000.0
    };

    // Straight down onto the top of the sphere, right under the light
    let sphere_top = estimate(Ray::new(Vec3::new(0.5, 0.8, 0.5), -Vec3::Y));
    // Far floor corner next to the red wall
    let corner = estimate(Ray::new(Vec3::new(0.3, 0.5, 0.3), Vec3::new(-0.25, -0.5, -0.25)));

    assert!(sphere_top.y > 0.5, "sphere top too dark: {sphere_top:?}");
    assert!(
        sphere_top.y > 2.0 * corner.y,
        "sphere top {sphere_top:?} should outshine the corner {corner:?}"
    );
    // Light bounced off the red wall tints the corner
    assert!(corner.x > corner.z, "corner {corner:?}");
}
