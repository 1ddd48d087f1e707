//! Lux Core - scene model for the photon mapper.
//!
//! This crate provides:
//!
//! - **Shapes**: planes, triangles, spheres and parallelepipeds with their
//!   photon redirection and ray splitting
//! - **Lights, cameras and textures**
//! - **Scene loading**: JSON scene descriptions and render parameters
//!
//! # Example
//!
//! ```ignore
//! use lux_core::load_scene;
//!
//! let (scene, config) = load_scene("scenes/cornell.json")?;
//! println!("Loaded {} shapes, {} lights", scene.shapes().len(), scene.lights().len());
//! ```

pub mod camera;
pub mod config;
pub mod description;
pub mod light;
pub mod sampling;
pub mod scene;
pub mod shape;
pub mod texture;

// Re-export commonly used types
pub use camera::{Camera, ConicCamera, PlanarCamera};
pub use config::RenderConfig;
pub use description::{load_scene, SceneDescription};
pub use light::Light;
pub use scene::{Scene, SceneBuilder, SceneError, SceneResult};
pub use shape::{
    GeometryError, Intersection, Parallelepiped, Plane, Shape, ShapeId, ShapeKind, Sphere,
    Triangle, NUDGE_EPSILON,
};
pub use texture::{Bitmap, Checkers, Texture, TextureError, TextureId};
