//! The scene: one camera, ordered shapes and lights, and the texture table.
//!
//! A scene is validated once when built and is read-only afterwards, so it
//! can be shared across the photon-transport and rendering worker threads.

use std::collections::HashSet;

use lux_math::{Color, DVec3, Ray};
use thiserror::Error;

use crate::camera::Camera;
use crate::light::Light;
use crate::shape::{GeometryError, Intersection, Shape, ShapeId, ShapeKind};
use crate::texture::{Texture, TextureError, TextureId};

/// Tolerance on `reflection + transmission <= 1`.
const PROBABILITY_EPSILON: f64 = 1e-9;

/// Errors raised while building or loading a scene.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Unknown texture: {0}")]
    UnknownTexture(String),

    #[error("Unknown object: {0}")]
    UnknownObject(String),

    #[error("Duplicate name: {0}")]
    DuplicateName(String),

    #[error("Texture id {0} is out of range")]
    MissingTexture(usize),

    #[error("Procedural texture {texture} is used by shapes {first} and {second}")]
    SharedTexture {
        texture: usize,
        first: usize,
        second: usize,
    },

    #[error("Light {light} needs a volume but shape {shape} is not one")]
    NotAVolume { light: usize, shape: usize },

    #[error("Invalid light {light}: {reason}")]
    InvalidLight { light: usize, reason: String },

    #[error("Invalid material on shape {shape}: {reason}")]
    InvalidMaterial { shape: usize, reason: String },

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Texture(#[from] TextureError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scene description error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SceneResult<T> = Result<T, SceneError>;

/// Immutable scene.
pub struct Scene {
    camera: Box<dyn Camera>,
    textures: Vec<Texture>,
    shapes: Vec<Shape>,
    lights: Vec<Light>,
}

impl Scene {
    /// Build a scene, validating materials, texture ownership and light
    /// references.
    pub fn new(
        camera: Box<dyn Camera>,
        textures: Vec<Texture>,
        shapes: Vec<Shape>,
        lights: Vec<Light>,
    ) -> SceneResult<Self> {
        let scene = Self {
            camera,
            textures,
            shapes,
            lights,
        };
        scene.validate()?;

        log::debug!(
            "Scene: {} shapes, {} lights ({} radiant), {} textures",
            scene.shapes.len(),
            scene.lights.len(),
            scene.radiant_lights().count(),
            scene.textures.len()
        );
        Ok(scene)
    }

    fn validate(&self) -> SceneResult<()> {
        let mut owners: Vec<Option<usize>> = vec![None; self.textures.len()];

        for (index, shape) in self.shapes.iter().enumerate() {
            check_material(index, shape)?;

            let TextureId(texture) = shape.texture();
            let Some(texture_ref) = self.textures.get(texture) else {
                return Err(SceneError::MissingTexture(texture));
            };
            if texture_ref.is_procedural() {
                if let Some(first) = owners[texture] {
                    return Err(SceneError::SharedTexture {
                        texture,
                        first,
                        second: index,
                    });
                }
                owners[texture] = Some(index);
            }
        }

        for (light_index, light) in self.lights.iter().enumerate() {
            check_light(light_index, light)?;

            if let Light::RadiantVolume { volume, .. } = light {
                let is_volume = self
                    .shapes
                    .get(volume.0)
                    .is_some_and(|shape| shape.as_volume().is_some());
                if !is_volume {
                    return Err(SceneError::NotAVolume {
                        light: light_index,
                        shape: volume.0,
                    });
                }
            }
        }

        Ok(())
    }

    pub fn camera(&self) -> &dyn Camera {
        self.camera.as_ref()
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(id.0)
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn textures(&self) -> &[Texture] {
        &self.textures
    }

    /// Texture used by a shape of this scene.
    pub fn texture_of(&self, shape: &Shape) -> &Texture {
        // Texture ids are checked in `validate`
        &self.textures[shape.texture().0]
    }

    /// Surface color of `shape` at `point`.
    pub fn local_color(&self, shape: &Shape, point: DVec3) -> Color {
        shape.local_color(point, self.texture_of(shape))
    }

    /// Lights that emit photons, with their index in the light list.
    pub fn radiant_lights(&self) -> impl Iterator<Item = (usize, &Light)> + '_ {
        self.lights
            .iter()
            .enumerate()
            .filter(|(_, light)| light.is_radiant())
    }

    /// Point-like lights usable for direct illumination.
    pub fn coherent_lights(&self) -> impl Iterator<Item = &Light> + '_ {
        self.lights.iter().filter(|light| light.origin().is_some())
    }

    /// Tint of the first global light, if any.
    pub fn global_tint(&self) -> Option<Color> {
        self.lights.iter().find_map(Light::tint)
    }

    /// Closest shape hit by the ray (linear scan, Euclidean distance).
    pub fn nearest_intersection(&self, ray: &Ray) -> Option<(&Shape, Intersection)> {
        let origin = ray.origin();
        self.shapes
            .iter()
            .filter_map(|shape| shape.nearest_intersection(ray).map(|hit| (shape, hit)))
            .min_by(|(_, p), (_, q)| {
                let dp = (p.point - origin).length_squared();
                let dq = (q.point - origin).length_squared();
                dp.total_cmp(&dq)
            })
    }
}

fn check_material(index: usize, shape: &Shape) -> SceneResult<()> {
    let invalid = |reason: String| SceneError::InvalidMaterial {
        shape: index,
        reason,
    };

    for (name, p) in [
        ("absorption", shape.absorption()),
        ("reflection", shape.reflection()),
        ("transmission", shape.transmission()),
    ] {
        if !(0.0..=1.0).contains(&p) {
            return Err(invalid(format!("{name} probability {p} is outside [0, 1]")));
        }
    }

    let sum = shape.reflection() + shape.transmission();
    if sum > 1.0 + PROBABILITY_EPSILON {
        return Err(invalid(format!(
            "reflection + transmission is {sum}, more than 1"
        )));
    }

    if let ShapeKind::Volume { index, .. } = shape.kind() {
        if index.is_nan() || *index <= 0.0 {
            return Err(invalid(format!("refractive index {index} is not positive")));
        }
    }
    Ok(())
}

fn check_light(index: usize, light: &Light) -> SceneResult<()> {
    let invalid = |reason: String| SceneError::InvalidLight {
        light: index,
        reason,
    };

    let power = light.power();
    if power.is_nan() || power < 0.0 {
        return Err(invalid(format!("power {power} is negative")));
    }
    let color = light.color();
    if color.is_nan() || color.min_element() < 0.0 {
        return Err(invalid(format!("color {color} has a negative channel")));
    }

    // normalize_or_zero maps zero and non-finite directions to zero
    if let Light::Hemispherical { direction, .. } = light {
        if *direction == DVec3::ZERO {
            return Err(GeometryError::ZeroLightDirection.into());
        }
    }
    Ok(())
}

/// Incremental scene construction with id bookkeeping.
pub struct SceneBuilder {
    textures: Vec<Texture>,
    shapes: Vec<Shape>,
    lights: Vec<Light>,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self {
            textures: Vec::new(),
            shapes: Vec::new(),
            lights: Vec::new(),
        }
    }

    pub fn add_texture(&mut self, texture: Texture) -> TextureId {
        self.textures.push(texture);
        TextureId(self.textures.len() - 1)
    }

    pub fn add_shape(&mut self, shape: Shape) -> ShapeId {
        self.shapes.push(shape);
        ShapeId(self.shapes.len() - 1)
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn build(self, camera: Box<dyn Camera>) -> SceneResult<Scene> {
        Scene::new(camera, self.textures, self.shapes, self.lights)
    }
}

impl Default for SceneBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Names already taken in one section of a scene description.
#[derive(Default)]
pub(crate) struct NameSet(HashSet<String>);

impl NameSet {
    pub(crate) fn claim(&mut self, name: &str) -> SceneResult<()> {
        if self.0.insert(name.to_owned()) {
            Ok(())
        } else {
            Err(SceneError::DuplicateName(name.to_owned()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::PlanarCamera;
    use crate::shape::{Plane, Sphere};
    use crate::texture::Checkers;

    fn camera() -> Box<dyn Camera> {
        Box::new(PlanarCamera::new(DVec3::new(0.0, 0.0, 5.0), -DVec3::X, DVec3::Y, 2.0, 2.0).unwrap())
    }

    fn checkers() -> Texture {
        Texture::Checkers(
            Checkers::new(DVec3::X, DVec3::Y, 1.0, 1.0, Color::ONE, Color::ZERO).unwrap(),
        )
    }

    fn ball(z: f64, texture: TextureId) -> Shape {
        Shape::volume(Sphere::new(DVec3::new(0.0, 0.0, z), 1.0).unwrap(), 1.0, 0.0, 0.0, 1.0, texture)
    }

    #[test]
    fn test_nearest_intersection_picks_closest() {
        let mut builder = SceneBuilder::new();
        let white = builder.add_texture(Texture::Colored(Color::ONE));
        builder.add_shape(ball(-4.0, white));
        let near = builder.add_shape(ball(0.0, white));
        let scene = builder.build(camera()).unwrap();

        let ray = Ray::new(DVec3::new(0.0, 0.0, 5.0), -DVec3::Z);
        let (shape, hit) = scene.nearest_intersection(&ray).unwrap();
        assert!(std::ptr::eq(shape, scene.shape(near).unwrap()));
        assert!((hit.point - DVec3::Z).length() < 1e-12);

        let miss = Ray::new(DVec3::new(5.0, 0.0, 5.0), -DVec3::Z);
        assert!(scene.nearest_intersection(&miss).is_none());
    }

    #[test]
    fn test_shared_procedural_texture_rejected() {
        let mut builder = SceneBuilder::new();
        let tex = builder.add_texture(checkers());
        builder.add_shape(ball(0.0, tex));
        builder.add_shape(ball(3.0, tex));

        let err = builder.build(camera()).err().unwrap();
        assert!(matches!(
            err,
            SceneError::SharedTexture {
                texture: 0,
                first: 0,
                second: 1
            }
        ));
    }

    #[test]
    fn test_shared_colored_texture_allowed() {
        let mut builder = SceneBuilder::new();
        let tex = builder.add_texture(Texture::Colored(Color::ONE));
        builder.add_shape(ball(0.0, tex));
        builder.add_shape(ball(3.0, tex));
        assert!(builder.build(camera()).is_ok());
    }

    #[test]
    fn test_invalid_probabilities_rejected() {
        let mut builder = SceneBuilder::new();
        let tex = builder.add_texture(Texture::Colored(Color::ONE));
        let plane = Plane::new(DVec3::ZERO, DVec3::Z).unwrap();
        builder.add_shape(Shape::surface(plane, 0.0, 0.7, 0.5, tex));

        let err = builder.build(camera()).err().unwrap();
        assert!(matches!(err, SceneError::InvalidMaterial { shape: 0, .. }));
    }

    #[test]
    fn test_radiant_volume_must_target_volume() {
        let mut builder = SceneBuilder::new();
        let tex = builder.add_texture(Texture::Colored(Color::ONE));
        let plane = Plane::new(DVec3::ZERO, DVec3::Z).unwrap();
        let id = builder.add_shape(Shape::surface(plane, 1.0, 0.0, 0.0, tex));
        builder.add_light(Light::radiant_volume(Color::ONE, 1.0, id));

        let err = builder.build(camera()).err().unwrap();
        assert!(matches!(err, SceneError::NotAVolume { light: 0, shape: 0 }));
    }

    #[test]
    fn test_hemispherical_light_needs_a_direction() {
        for direction in [DVec3::ZERO, DVec3::splat(f64::NAN)] {
            let mut builder = SceneBuilder::new();
            let tex = builder.add_texture(Texture::Colored(Color::ONE));
            let floor = Plane::new(DVec3::ZERO, DVec3::Y).unwrap();
            builder.add_shape(Shape::surface(floor, 1.0, 0.0, 0.0, tex));
            builder.add_light(Light::hemispherical(Color::ONE, 1.0, DVec3::Y, direction));

            let err = builder.build(camera()).err().unwrap();
            assert!(matches!(
                err,
                SceneError::Geometry(GeometryError::ZeroLightDirection)
            ));
        }
    }

    #[test]
    fn test_negative_light_power_rejected() {
        let mut builder = SceneBuilder::new();
        builder.add_light(Light::global(Color::ONE, 1.0));
        builder.add_light(Light::punctual(Color::ONE, -2.0, DVec3::ZERO));
        let err = builder.build(camera()).err().unwrap();
        assert!(matches!(err, SceneError::InvalidLight { light: 1, .. }));

        let mut builder = SceneBuilder::new();
        builder.add_light(Light::punctual(Color::new(1.0, -0.5, 1.0), 1.0, DVec3::ZERO));
        let err = builder.build(camera()).err().unwrap();
        assert!(matches!(err, SceneError::InvalidLight { light: 0, .. }));

        let mut builder = SceneBuilder::new();
        builder.add_light(Light::punctual(Color::ONE, 0.0, DVec3::ZERO));
        assert!(builder.build(camera()).is_ok());
    }

    #[test]
    fn test_missing_texture_rejected() {
        let mut builder = SceneBuilder::new();
        builder.add_shape(ball(0.0, TextureId(3)));
        let err = builder.build(camera()).err().unwrap();
        assert!(matches!(err, SceneError::MissingTexture(3)));
    }

    #[test]
    fn test_global_tint_uses_first_global_light() {
        let mut builder = SceneBuilder::new();
        builder.add_light(Light::punctual(Color::ONE, 1.0, DVec3::ZERO));
        builder.add_light(Light::global(Color::new(1.0, 0.5, 0.5), 0.5));
        builder.add_light(Light::global(Color::ZERO, 1.0));
        let scene = builder.build(camera()).unwrap();

        assert_eq!(scene.global_tint(), Some(Color::new(0.5, 0.25, 0.25)));
        assert_eq!(scene.radiant_lights().map(|(i, _)| i).collect::<Vec<_>>(), vec![0]);
        assert_eq!(scene.coherent_lights().count(), 1);
    }

    #[test]
    fn test_duplicate_names() {
        let mut names = NameSet::default();
        assert!(names.claim("floor").is_ok());
        assert!(matches!(names.claim("floor"), Err(SceneError::DuplicateName(_))));
    }
}
