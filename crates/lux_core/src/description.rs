//! JSON scene descriptions.
//!
//! A description names its textures, objects and lights; names are resolved
//! to ids here and the result goes through the same validation as scenes
//! built in code.
//!
//! ```json
//! {
//!   "parameters": { "width": 320, "height": 240, "max_photons": 50000 },
//!   "camera": { "type": "conic", "origin": [0, 1, -4],
//!               "vector_x": [-1, 0, 0], "vector_y": [0, 1, 0],
//!               "size_x": 1.0, "size_y": 0.75 },
//!   "textures": [ { "name": "white", "type": "color", "color": [1, 1, 1] } ],
//!   "objects": [ { "name": "floor", "type": "plane", "point": [0, 0, 0],
//!                  "normal": [0, 1, 0], "reflect": 0.2, "texture": "white" } ],
//!   "lights": [ { "type": "punctual", "color": [1, 1, 1], "power": 1.0,
//!                 "origin": [0, 3, 0] } ]
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use lux_math::{Color, DVec3};
use serde::Deserialize;

use crate::camera::{Camera, ConicCamera, PlanarCamera};
use crate::config::RenderConfig;
use crate::light::Light;
use crate::scene::{NameSet, Scene, SceneError, SceneResult};
use crate::shape::{Parallelepiped, Plane, Shape, ShapeId, Sphere, Triangle};
use crate::texture::{Bitmap, Checkers, Texture, TextureId};

/// A whole scene file.
#[derive(Debug, Clone, Deserialize)]
pub struct SceneDescription {
    #[serde(default)]
    pub parameters: RenderConfig,
    pub camera: CameraDescription,
    #[serde(default)]
    pub textures: Vec<TextureDescription>,
    #[serde(default)]
    pub objects: Vec<ObjectDescription>,
    #[serde(default)]
    pub lights: Vec<LightDescription>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CameraDescription {
    Planar {
        origin: DVec3,
        vector_x: DVec3,
        vector_y: DVec3,
        size_x: f64,
        size_y: f64,
    },
    Conic {
        origin: DVec3,
        vector_x: DVec3,
        vector_y: DVec3,
        size_x: f64,
        size_y: f64,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextureDescription {
    pub name: String,
    #[serde(flatten)]
    pub kind: TextureKind,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextureKind {
    Color {
        color: Color,
    },
    Checkers {
        #[serde(default)]
        text_x: DVec3,
        #[serde(default)]
        text_y: DVec3,
        x_dim: f64,
        y_dim: f64,
        even: Color,
        odd: Color,
    },
    Bitmap {
        #[serde(default)]
        text_x: DVec3,
        #[serde(default)]
        text_y: DVec3,
        x_dim: f64,
        y_dim: f64,
        /// Relative to the scene file's directory
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectDescription {
    pub name: String,
    pub texture: String,
    /// Defaults to whatever probability is left by the other two
    #[serde(default)]
    pub absorb: Option<f64>,
    #[serde(default)]
    pub reflect: f64,
    #[serde(flatten)]
    pub kind: ObjectKind,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectKind {
    Sphere {
        center: DVec3,
        radius: f64,
        #[serde(default)]
        refract: f64,
        #[serde(default = "unit_index")]
        index: f64,
    },
    Parallelepiped {
        corner: DVec3,
        x: DVec3,
        y: DVec3,
        z: DVec3,
        #[serde(default)]
        refract: f64,
        #[serde(default = "unit_index")]
        index: f64,
    },
    Plane {
        point: DVec3,
        normal: DVec3,
        #[serde(default)]
        transparency: f64,
    },
    Triangle {
        a: DVec3,
        b: DVec3,
        c: DVec3,
        #[serde(default)]
        transparency: f64,
    },
}

fn unit_index() -> f64 {
    1.0
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LightDescription {
    Punctual {
        color: Color,
        power: f64,
        origin: DVec3,
    },
    Hemispherical {
        color: Color,
        power: f64,
        origin: DVec3,
        direction: DVec3,
    },
    Global {
        color: Color,
        power: f64,
    },
    RadiantVolume {
        color: Color,
        power: f64,
        /// Name of a sphere or parallelepiped object
        volume: String,
    },
}

impl CameraDescription {
    fn build(&self) -> SceneResult<Box<dyn Camera>> {
        let camera: Box<dyn Camera> = match *self {
            CameraDescription::Planar {
                origin,
                vector_x,
                vector_y,
                size_x,
                size_y,
            } => Box::new(PlanarCamera::new(origin, vector_x, vector_y, size_x, size_y)?),
            CameraDescription::Conic {
                origin,
                vector_x,
                vector_y,
                size_x,
                size_y,
            } => Box::new(ConicCamera::new(origin, vector_x, vector_y, size_x, size_y)?),
        };
        Ok(camera)
    }
}

impl TextureKind {
    fn build(&self, base_dir: &Path) -> SceneResult<Texture> {
        let texture = match self {
            TextureKind::Color { color } => Texture::Colored(*color),
            TextureKind::Checkers {
                text_x,
                text_y,
                x_dim,
                y_dim,
                even,
                odd,
            } => Texture::Checkers(Checkers::new(*text_x, *text_y, *x_dim, *y_dim, *even, *odd)?),
            TextureKind::Bitmap {
                text_x,
                text_y,
                x_dim,
                y_dim,
                file,
            } => {
                let path = resolve_path(base_dir, file);
                Texture::Bitmap(Bitmap::load(&path, *text_x, *text_y, *x_dim, *y_dim)?)
            }
        };
        Ok(texture)
    }
}

impl ObjectDescription {
    fn build(&self, texture: TextureId) -> SceneResult<Shape> {
        let reflect = self.reflect;
        let remainder = |third: f64| self.absorb.unwrap_or((1.0 - reflect - third).max(0.0));

        let shape = match self.kind {
            ObjectKind::Sphere {
                center,
                radius,
                refract,
                index,
            } => Shape::volume(
                Sphere::new(center, radius)?,
                remainder(refract),
                reflect,
                refract,
                index,
                texture,
            ),
            ObjectKind::Parallelepiped {
                corner,
                x,
                y,
                z,
                refract,
                index,
            } => Shape::volume(
                Parallelepiped::new(corner, x, y, z)?,
                remainder(refract),
                reflect,
                refract,
                index,
                texture,
            ),
            ObjectKind::Plane {
                point,
                normal,
                transparency,
            } => Shape::surface(
                Plane::new(point, normal)?,
                remainder(transparency),
                reflect,
                transparency,
                texture,
            ),
            ObjectKind::Triangle {
                a,
                b,
                c,
                transparency,
            } => Shape::surface(
                Triangle::new(a, b, c)?,
                remainder(transparency),
                reflect,
                transparency,
                texture,
            ),
        };
        Ok(shape)
    }
}

impl LightDescription {
    fn build(&self, objects: &[String]) -> SceneResult<Light> {
        let light = match self {
            LightDescription::Punctual {
                color,
                power,
                origin,
            } => Light::punctual(*color, *power, *origin),
            LightDescription::Hemispherical {
                color,
                power,
                origin,
                direction,
            } => Light::hemispherical(*color, *power, *origin, *direction),
            LightDescription::Global { color, power } => Light::global(*color, *power),
            LightDescription::RadiantVolume {
                color,
                power,
                volume,
            } => {
                let id = find(objects, volume)
                    .ok_or_else(|| SceneError::UnknownObject(volume.clone()))?;
                Light::radiant_volume(*color, *power, ShapeId(id))
            }
        };
        Ok(light)
    }
}

impl SceneDescription {
    /// Parse a description from JSON text.
    pub fn from_json(text: &str) -> SceneResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Resolve names and build the scene. Bitmap paths are taken relative
    /// to `base_dir`.
    pub fn build(&self, base_dir: &Path) -> SceneResult<Scene> {
        let mut texture_names = NameSet::default();
        let mut textures = Vec::with_capacity(self.textures.len());
        for desc in &self.textures {
            texture_names.claim(&desc.name)?;
            textures.push(desc.kind.build(base_dir)?);
        }
        let texture_index: Vec<String> = self.textures.iter().map(|t| t.name.clone()).collect();

        let mut object_names = NameSet::default();
        let mut shapes = Vec::with_capacity(self.objects.len());
        for desc in &self.objects {
            object_names.claim(&desc.name)?;
            let texture = find(&texture_index, &desc.texture)
                .ok_or_else(|| SceneError::UnknownTexture(desc.texture.clone()))?;
            shapes.push(desc.build(TextureId(texture))?);
        }
        let object_index: Vec<String> = self.objects.iter().map(|o| o.name.clone()).collect();

        let lights = self
            .lights
            .iter()
            .map(|desc| desc.build(&object_index))
            .collect::<SceneResult<Vec<_>>>()?;

        Scene::new(self.camera.build()?, textures, shapes, lights)
    }
}

/// Read a scene file and build it, returning the scene and its parameters.
pub fn load_scene(path: impl AsRef<Path>) -> SceneResult<(Scene, RenderConfig)> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let description = SceneDescription::from_json(&text)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let scene = description.build(base_dir)?;

    log::info!(
        "Loaded scene {}: {} objects, {} lights, {} textures",
        path.display(),
        scene.shapes().len(),
        scene.lights().len(),
        scene.textures().len()
    );
    Ok((scene, description.parameters))
}

fn find(names: &[String], name: &str) -> Option<usize> {
    names.iter().position(|n| n == name)
}

/// Resolve a path relative to the base directory.
fn resolve_path(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
