use std::convert::TryFrom;
use std::f64::{ INFINITY, NEG_INFINITY };
use std::fs;
use std::path::{ Path, PathBuf };

use log::{ debug, info };
use serde::Deserialize;

use crate::tuple::Tuple4D;
use crate::color::Color;
use crate::matrix::Matrix4D;
use crate::shape::Shape;
use crate::intersect::CsgOperation;
use crate::pattern::Pattern;
use crate::light::{ PointLight, Material };
use crate::world::World;
use crate::camera::Camera;
use crate::obj::ObjParser;
use crate::consts::RECURSION_DEPTH;
use crate::error::{ Error, Result };

/// A world and a camera to look at it with.
#[derive(Clone, Debug)]
pub struct Scene {
    pub world: World,
    pub camera: Camera,
}

impl Scene {
    /// Loads a scene description from a JSON file.
    ///
    /// Relative OBJ model paths are resolved against the directory holding the
    /// scene file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Scene> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));

        info!("Loading scene {:?}", path);
        Scene::build(serde_json::from_str(&source)?, base)
    }

    /// Builds a scene from JSON text. Relative OBJ model paths are resolved
    /// against the working directory.
    pub fn from_json_str(source: &str) -> Result<Scene> {
        Scene::build(serde_json::from_str(source)?, Path::new("."))
    }

    fn build(scene_json: SceneJson, base: &Path) -> Result<Scene> {
        let camera_json = scene_json.camera;

        // Create the camera transform from the view parameters.
        let camera_transform = Matrix4D::view_transform(
            camera_json.from.into(),
            camera_json.to.into(),
            vector(camera_json.up),
        );

        let mut camera = Camera::new(
            camera_json.width,
            camera_json.height,
            camera_json.field_of_view,
            camera_transform
        )?;
        camera.depth = scene_json.depth;

        let light = PointLight::new(
            scene_json.light.intensity.into(),
            scene_json.light.position.into(),
        )?;

        let mut world = World::new(light);
        for shape_json in scene_json.shapes {
            world.objects.push(shape_json.into_shape(base)?);
        }

        info!("Loaded scene: {} top-level shapes, {}x{} camera, depth {}",
            world.objects.len(), camera.hsize, camera.vsize, camera.depth);

        Ok(Scene { world, camera })
    }
}

impl TryFrom<SceneJson> for Scene {
    type Error = Error;

    fn try_from(scene_json: SceneJson) -> Result<Scene> {
        Scene::build(scene_json, Path::new("."))
    }
}

fn vector(v: [f64; 3]) -> Tuple4D {
    Tuple4D::vector(v[0], v[1], v[2])
}

fn default_depth() -> usize {
    RECURSION_DEPTH
}

/// The top level of a scene file.
#[derive(Clone, Debug, Deserialize)]
pub struct SceneJson {
    camera: CameraJson,
    light: LightJson,

    /// Maximum reflection/refraction depth.
    #[serde(default = "default_depth")]
    depth: usize,

    #[serde(default)]
    shapes: Vec<ShapeJson>,
}

#[derive(Clone, Debug, Deserialize)]
struct CameraJson {
    width: usize,
    height: usize,

    /// In radians.
    field_of_view: f64,

    from: [f64; 3],
    to: [f64; 3],
    up: [f64; 3],
}

#[derive(Clone, Debug, Deserialize)]
struct LightJson {
    position: [f64; 3],
    intensity: [f64; 3],
}

/// One step of a transform list. Angles are in radians.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum TransformJson {
    Translate([f64; 3]),
    Scale([f64; 3]),
    RotateX(f64),
    RotateY(f64),
    RotateZ(f64),

    /// `[xy, xz, yx, yz, zx, zy]`
    Shear([f64; 6]),
}

impl TransformJson {
    fn matrix(&self) -> Matrix4D {
        match *self {
            TransformJson::Translate([x, y, z]) => Matrix4D::translation(x, y, z),
            TransformJson::Scale([x, y, z]) => Matrix4D::scaling(x, y, z),
            TransformJson::RotateX(r) => Matrix4D::rotation_x(r),
            TransformJson::RotateY(r) => Matrix4D::rotation_y(r),
            TransformJson::RotateZ(r) => Matrix4D::rotation_z(r),
            TransformJson::Shear([xy, xz, yx, yz, zx, zy])
                => Matrix4D::shearing(xy, xz, yx, yz, zx, zy),
        }
    }
}

/// Chains transform steps; the first step listed is applied first.
fn chain(steps: &[TransformJson]) -> Matrix4D {
    steps.iter().fold(Matrix4D::identity(), |acc, step| step.matrix() * acc)
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum PatternKind {
    Stripe,
    Gradient,
    Ring,
    Checkers,
}

#[derive(Clone, Debug, Deserialize)]
struct PatternJson {
    #[serde(rename = "type")]
    kind: PatternKind,
    a: [f64; 3],
    b: [f64; 3],

    #[serde(default)]
    transform: Vec<TransformJson>,
}

impl PatternJson {
    fn into_pattern(self) -> Result<Pattern> {
        let (a, b) = (Color::from(self.a), Color::from(self.b));

        let pattern = match self.kind {
            PatternKind::Stripe => Pattern::stripe(a, b),
            PatternKind::Gradient => Pattern::gradient(a, b),
            PatternKind::Ring => Pattern::ring(a, b),
            PatternKind::Checkers => Pattern::checkers(a, b),
        };

        pattern.with_transform(chain(&self.transform))
    }
}

/// A material; every field falls back to the `Material` default.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
struct MaterialJson {
    color: [f64; 3],
    ambient: f64,
    diffuse: f64,
    specular: f64,
    shininess: f64,
    reflective: f64,
    transparency: f64,
    refractive_index: f64,
    pattern: Option<PatternJson>,
}

impl Default for MaterialJson {
    fn default() -> MaterialJson {
        let m = Material::default();

        MaterialJson {
            color: [m.color.r, m.color.g, m.color.b],
            ambient: m.ambient,
            diffuse: m.diffuse,
            specular: m.specular,
            shininess: m.shininess,
            reflective: m.reflective,
            transparency: m.transparency,
            refractive_index: m.refractive_index,
            pattern: None,
        }
    }
}

impl MaterialJson {
    fn into_material(self) -> Result<Material> {
        let pattern = match self.pattern {
            Some(p) => Some(p.into_pattern()?),
            None => None,
        };

        Ok(Material {
            color: self.color.into(),
            pattern,
            ambient: self.ambient,
            diffuse: self.diffuse,
            specular: self.specular,
            shininess: self.shininess,
            reflective: self.reflective,
            transparency: self.transparency,
            refractive_index: self.refractive_index,
        })
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ShapeKind {
    Sphere,
    Plane,
    Cube,

    /// Bounds default to infinite; `closed` to false.
    Cylinder {
        minimum: Option<f64>,
        maximum: Option<f64>,
        #[serde(default)]
        closed: bool,
    },
    Cone {
        minimum: Option<f64>,
        maximum: Option<f64>,
        #[serde(default)]
        closed: bool,
    },

    Triangle {
        p1: [f64; 3],
        p2: [f64; 3],
        p3: [f64; 3],
    },
    SmoothTriangle {
        p1: [f64; 3],
        p2: [f64; 3],
        p3: [f64; 3],
        n1: [f64; 3],
        n2: [f64; 3],
        n3: [f64; 3],
    },

    Group {
        #[serde(default)]
        children: Vec<ShapeJson>,
    },
    Csg {
        operation: CsgOperation,
        left: Box<ShapeJson>,
        right: Box<ShapeJson>,
    },

    /// A Wavefront OBJ model, loaded as a group of groups.
    Obj {
        path: PathBuf,
    },
}

#[derive(Clone, Debug, Deserialize)]
struct ShapeJson {
    #[serde(flatten)]
    kind: ShapeKind,

    #[serde(default)]
    transform: Vec<TransformJson>,

    material: Option<MaterialJson>,
}

impl ShapeKind {
    fn name(&self) -> &'static str {
        match self {
            ShapeKind::Sphere => "sphere",
            ShapeKind::Plane => "plane",
            ShapeKind::Cube => "cube",
            ShapeKind::Cylinder { .. } => "cylinder",
            ShapeKind::Cone { .. } => "cone",
            ShapeKind::Triangle { .. } => "triangle",
            ShapeKind::SmoothTriangle { .. } => "smooth triangle",
            ShapeKind::Group { .. } => "group",
            ShapeKind::Csg { .. } => "csg",
            ShapeKind::Obj { .. } => "obj",
        }
    }
}

impl ShapeJson {
    fn into_shape(self, base: &Path) -> Result<Shape> {
        let name = self.kind.name();
        let shape = match self.kind {
            // Primitives
            ShapeKind::Sphere => Shape::sphere(),
            ShapeKind::Plane => Shape::plane(),
            ShapeKind::Cube => Shape::cube(),
            ShapeKind::Cylinder { minimum, maximum, closed } => {
                Shape::truncated_cylinder(
                    minimum.unwrap_or(NEG_INFINITY),
                    maximum.unwrap_or(INFINITY),
                    closed
                )?
            },
            ShapeKind::Cone { minimum, maximum, closed } => {
                Shape::truncated_cone(
                    minimum.unwrap_or(NEG_INFINITY),
                    maximum.unwrap_or(INFINITY),
                    closed
                )?
            },
            ShapeKind::Triangle { p1, p2, p3 } => {
                Shape::triangle(p1.into(), p2.into(), p3.into())?
            },
            ShapeKind::SmoothTriangle { p1, p2, p3, n1, n2, n3 } => {
                Shape::smooth_triangle(p1.into(), p2.into(), p3.into(),
                    vector(n1), vector(n2), vector(n3))?
            },

            // Group-likes. It's okay to have an empty group (no children).
            ShapeKind::Group { children } => {
                let children = children.into_iter()
                    .map(|child| child.into_shape(base))
                    .collect::<Result<Vec<Shape>>>()?;
                Shape::group(children)
            },
            ShapeKind::Csg { operation, left, right } => {
                Shape::csg(operation, left.into_shape(base)?,
                    right.into_shape(base)?)
            },

            // Models
            ShapeKind::Obj { path } => {
                let path = base.join(path);
                let obj = ObjParser::from_file(&path)?;
                if obj.ignored_lines > 0 {
                    debug!("{:?}: {} lines ignored", path, obj.ignored_lines);
                }
                obj.into_group()
            },
        };

        debug!("Built {} shape", name);

        let shape = match self.material {
            Some(material) => shape.with_material(material.into_material()?)?,
            None => shape,
        };

        if self.transform.is_empty() {
            Ok(shape)
        } else {
            shape.with_transform(chain(&self.transform))
        }
    }
}

#[cfg(test)]
const DEFAULT_WORLD_SCENE: &str = r#"{
    "camera": {
        "width": 11, "height": 11,
        "field_of_view": 1.5707963267948966,
        "from": [0, 0, -5], "to": [0, 0, 0], "up": [0, 1, 0]
    },
    "light": { "position": [-10, 10, -10], "intensity": [1, 1, 1] },
    "shapes": [
        {
            "type": "sphere",
            "material": { "color": [0.8, 1.0, 0.6], "diffuse": 0.7, "specular": 0.2 }
        },
        {
            "type": "sphere",
            "transform": [ { "scale": [0.5, 0.5, 0.5] } ]
        }
    ]
}"#;

#[cfg(test)]
fn scene_with_shapes(shapes: &str) -> Result<Scene> {
    Scene::from_json_str(&format!(r#"{{
        "camera": {{
            "width": 4, "height": 4, "field_of_view": 1.0,
            "from": [0, 0, -5], "to": [0, 0, 0], "up": [0, 1, 0]
        }},
        "light": {{ "position": [-10, 10, -10], "intensity": [1, 1, 1] }},
        "shapes": {}
    }}"#, shapes))
}

#[test]
fn default_world_from_json() {
    let scene = Scene::from_json_str(DEFAULT_WORLD_SCENE).unwrap();
    let expected = World::default();

    assert_eq!(scene.world.light_source, expected.light_source);
    assert_eq!(scene.world.objects, expected.objects);
    assert_eq!(scene.camera.depth, RECURSION_DEPTH);

    let image = scene.camera.render(&scene.world);
    assert!(image.read_pixel(5, 5).unwrap()
        .approx_eq(&Color::rgb(0.38066, 0.47583, 0.2855), 1e-4));
}

#[test]
fn transform_steps_apply_in_order() {
    let scene = scene_with_shapes(r#"[{
        "type": "cube",
        "transform": [ { "scale": [2, 2, 2] }, { "translate": [1, 0, 0] } ]
    }]"#).unwrap();

    assert_eq!(*scene.world.objects[0].transform(),
        Matrix4D::translation(1.0, 0.0, 0.0) * Matrix4D::scaling(2.0, 2.0, 2.0));
}

#[test]
fn materials_and_patterns_from_json() {
    let scene = scene_with_shapes(r#"[{
        "type": "plane",
        "material": {
            "reflective": 0.5,
            "pattern": {
                "type": "checkers", "a": [1, 1, 1], "b": [0, 0, 0],
                "transform": [ { "scale": [0.5, 0.5, 0.5] } ]
            }
        }
    }]"#).unwrap();

    let m = scene.world.objects[0].material();
    assert!(crate::feq(m.reflective, 0.5));
    assert!(crate::feq(m.diffuse, 0.9));

    let pattern = m.pattern.unwrap();
    assert_eq!(*pattern.transform(), Matrix4D::scaling(0.5, 0.5, 0.5));
    assert_eq!(pattern.pattern_at(Tuple4D::point(1.5, 0.0, 0.0)),
        Color::black());
}

#[test]
fn composite_shapes_from_json() {
    let scene = scene_with_shapes(r#"[
        {
            "type": "group",
            "children": [
                { "type": "cylinder", "minimum": -1, "maximum": 1, "closed": true },
                { "type": "cone", "minimum": -1, "maximum": 0 },
                { "type": "triangle", "p1": [0, 1, 0], "p2": [-1, 0, 0], "p3": [1, 0, 0] }
            ]
        },
        {
            "type": "csg",
            "operation": "difference",
            "left": { "type": "cube" },
            "right": { "type": "sphere", "transform": [ { "scale": [1.2, 1.2, 1.2] } ] }
        }
    ]"#).unwrap();

    let group = &scene.world.objects[0];
    assert_eq!(group.children().unwrap().len(), 3);

    let csg = &scene.world.objects[1];
    assert!(csg.csg_left().is_some());
    assert_eq!(*csg.csg_right().unwrap().transform(),
        Matrix4D::scaling(1.2, 1.2, 1.2));
}

#[test]
fn invalid_scenes_are_rejected() {
    let bad_material = scene_with_shapes(
        r#"[{ "type": "sphere", "material": { "reflective": 2.0 } }]"#
    );
    assert!(matches!(bad_material, Err(Error::MaterialOutOfRange { .. })));

    let infinite_closed = scene_with_shapes(
        r#"[{ "type": "cylinder", "closed": true }]"#
    );
    assert!(matches!(infinite_closed, Err(Error::InfiniteClosed { .. })));

    let singular = scene_with_shapes(
        r#"[{ "type": "sphere", "transform": [ { "scale": [0, 1, 1] } ] }]"#
    );
    assert!(matches!(singular, Err(Error::NotInvertible)));

    let unknown = scene_with_shapes(r#"[{ "type": "teapot" }]"#);
    assert!(matches!(unknown, Err(Error::Json(_))));

    let missing_model = scene_with_shapes(
        r#"[{ "type": "obj", "path": "no/such/model.obj" }]"#
    );
    assert!(matches!(missing_model, Err(Error::Io(_))));
}

#[test]
fn group_material_is_applied_to_children() {
    let scene = scene_with_shapes(r#"[{
        "type": "group",
        "material": { "color": [0, 0, 1], "transparency": 0.5 },
        "children": [
            { "type": "sphere" },
            { "type": "cube", "material": { "color": [1, 0, 0] } }
        ]
    }]"#).unwrap();

    for child in scene.world.objects[0].children().unwrap() {
        assert_eq!(child.material().color, Color::rgb(0.0, 0.0, 1.0));
        assert!(crate::feq(child.material().transparency, 0.5));
    }
}
