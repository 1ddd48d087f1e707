//! Simple photon mapping example.
//!
//! Builds a small box scene in code, renders it and saves to PPM format.

use lux_core::{
    Checkers, ConicCamera, Light, Parallelepiped, Plane, RenderConfig, Scene, SceneBuilder, Shape,
    Sphere, Texture,
};
use lux_renderer::{build_photon_map, render, render_photonmap, Color, DVec3};

fn main() {
    env_logger::init();

    println!("Lux Photon Mapper - Simple Example");
    println!("==================================");

    let start = std::time::Instant::now();
    let scene = build_scene();
    println!("Scene built in {:?}", start.elapsed());

    let config = RenderConfig {
        direct_lighting: true,
        ..RenderConfig::default()
    }
    .with_resolution(400, 300)
    .with_photons(200_000, 150);

    let start = std::time::Instant::now();
    let photon_map = build_photon_map(&scene, &config);
    println!("{} photons stored in {:?}", photon_map.len(), start.elapsed());

    render_photonmap(&scene, &photon_map, &config)
        .save("photons.ppm")
        .expect("Failed to save photon map");

    println!(
        "Rendering {}x{} @ depth {}...",
        config.width, config.height, config.raytracer_depth
    );
    let start = std::time::Instant::now();
    let image = render(&scene, &photon_map, &config).expect("Failed to render");
    println!("Rendered in {:?}", start.elapsed());

    let filename = "output.ppm";
    image.save(filename).expect("Failed to save image");
    println!("Saved to {}", filename);
}

fn build_scene() -> Scene {
    let mut builder = SceneBuilder::new();

    let white = builder.add_texture(Texture::Colored(Color::splat(0.9)));
    let red = builder.add_texture(Texture::Colored(Color::new(0.9, 0.2, 0.2)));
    let green = builder.add_texture(Texture::Colored(Color::new(0.2, 0.9, 0.2)));
    let board = builder.add_texture(Texture::Checkers(
        Checkers::new(DVec3::X, DVec3::Z, 0.5, 0.5, Color::splat(0.9), Color::splat(0.2))
            .expect("valid checkers"),
    ));

    // Floor, ceiling and walls of a 4x3x4 room
    let walls = [
        (DVec3::ZERO, DVec3::Y, board),
        (DVec3::new(0.0, 3.0, 0.0), -DVec3::Y, white),
        (DVec3::new(-2.0, 0.0, 0.0), DVec3::X, red),
        (DVec3::new(2.0, 0.0, 0.0), -DVec3::X, green),
        (DVec3::new(0.0, 0.0, -2.0), DVec3::Z, white),
    ];
    for (point, normal, texture) in walls {
        let plane = Plane::new(point, normal).expect("valid plane");
        builder.add_shape(Shape::surface(plane, 0.8, 0.2, 0.0, texture));
    }

    // A glass ball and a diffuse block
    let glass = Sphere::new(DVec3::new(0.7, 0.6, 0.0), 0.6).expect("valid sphere");
    builder.add_shape(Shape::volume(glass, 0.0, 0.1, 0.9, 1.5, white));
    let block = Parallelepiped::new(
        DVec3::new(-1.3, 0.0, -1.0),
        DVec3::new(0.8, 0.0, 0.3),
        DVec3::new(0.0, 1.2, 0.0),
        DVec3::new(-0.3, 0.0, 0.8),
    )
    .expect("valid block");
    builder.add_shape(Shape::volume(block, 0.9, 0.1, 0.0, 1.0, white));

    builder.add_light(Light::punctual(Color::ONE, 2.0, DVec3::new(0.0, 2.8, 0.0)));
    builder.add_light(Light::global(Color::ONE, 1.0));

    // Looking down -Z into the open side of the room
    let camera = ConicCamera::new(
        DVec3::new(0.0, 1.5, 5.0),
        -DVec3::X,
        DVec3::Y,
        0.9,
        0.7,
    )
    .expect("valid camera");
    builder.build(Box::new(camera)).expect("valid scene")
}
