use crate::color::Color;
use crate::pattern::Pattern;
use crate::tuple::Tuple4D;
use crate::shape::Shape;
use crate::error::{ Error, Result };

/// A point light.
///
/// A very simple light source. Provides a color and a position where light is
/// produced from.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PointLight {
    pub intensity: Color,
    pub position: Tuple4D,
}

impl PointLight {
    /// Creates a point light. Fails if `position` isn't a point.
    pub fn new(intensity: Color, position: Tuple4D) -> Result<PointLight> {
        Ok(PointLight {
            intensity,
            position: position.require_point("light position")?,
        })
    }
}

/// A material record.
///
/// Materials use attributes from the Phong reflection model; ambient, diffuse,
/// specular and shininess. Reflection and refraction are controlled by
/// `reflective`, `transparency` and `refractive_index`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Material {
    pub color: Color,
    pub pattern: Option<Pattern>,

    pub ambient: f64,
    pub diffuse: f64,
    pub specular: f64,
    pub shininess: f64,

    pub reflective: f64,
    pub refractive_index: f64,
    pub transparency: f64,
}

impl Default for Material {
    fn default() -> Material {
        Material {
            color: Color::rgb(1.0, 1.0, 1.0),
            pattern: None,

            ambient: 0.1,
            diffuse: 0.9,
            specular: 0.9,
            shininess: 200.0,

            reflective: 0.0,
            refractive_index: 1.0,
            transparency: 0.0,
        }
    }
}

impl Material {
    /// Checks every coefficient against its allowed range.
    ///
    /// The Phong coefficients, transparency and refractive index must be
    /// non-negative, and `reflective` must lie within `[0, 1]`. NaN is never
    /// in range.
    ///
    /// ```
    /// # use whitted_tracer::light::Material;
    /// let ok = Material::default();
    /// assert!(ok.validate().is_ok());
    ///
    /// let bad = Material { diffuse: -0.5, ..Default::default() };
    /// assert!(bad.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        let non_negative = [
            ("ambient", self.ambient),
            ("diffuse", self.diffuse),
            ("specular", self.specular),
            ("shininess", self.shininess),
            ("transparency", self.transparency),
            ("refractive index", self.refractive_index),
        ];

        for &(name, value) in non_negative.iter() {
            if value.is_nan() || value < 0.0 {
                return Err(Error::MaterialOutOfRange { name, value });
            }
        }

        if !(0.0..=1.0).contains(&self.reflective) {
            return Err(Error::MaterialOutOfRange {
                name: "reflective",
                value: self.reflective,
            });
        }

        Ok(())
    }
}

/// Calculate the lighting of a pixel in an environment.
///
/// Effectively, this function takes a material, a single light, a point, the
/// eye vector and the normal vector, and calculates how the light looks from
/// the eye. Position is irrelevant, bar the angle around `point`. The shape is
/// only needed to evaluate the material's pattern in object space.
///
/// If this point is in a shadow (parameter `in_shadow`), only ambient light is
/// used.
pub fn lighting(m: &Material, obj: &Shape, light: &PointLight,
    point: Tuple4D, eyev: Tuple4D, normalv: Tuple4D, in_shadow: bool) -> Color {
    // A pattern takes precedence over the flat color
    let color = match m.pattern {
        Some(ref pat) => pat.pattern_at_shape(obj, point),
        None => m.color,
    };

    // Combine surface color with light's color
    let effective_color = color * light.intensity;

    // Find direction to light source
    let lightv = (light.position - point).normalize();

    let ambient = effective_color * m.ambient;

    if in_shadow {
        return ambient;
    }

    // For the side of the surface with no light, use only ambient light
    let light_dot_normal = lightv.dot(&normalv);
    if light_dot_normal < 0.0 {
        return ambient;
    }

    let diffuse = effective_color * m.diffuse * light_dot_normal;

    let reflectv = (-lightv).reflect(&normalv);
    let reflect_dot_eye = reflectv.dot(&eyev);

    // No specular highlight when the reflection points away from the eye
    let specular = if reflect_dot_eye <= 0.0 {
        Color::black()
    } else {
        let factor = reflect_dot_eye.powf(m.shininess);
        light.intensity * m.specular * factor
    };

    ambient + diffuse + specular
}

#[cfg(test)]
fn white_light(x: f64, y: f64, z: f64) -> PointLight {
    PointLight::new(Color::white(), Tuple4D::point(x, y, z)).unwrap()
}

#[test]
fn point_light_requires_a_point() {
    let ok = PointLight::new(Color::white(), Tuple4D::point(0.0, 0.0, 0.0));
    assert_eq!(ok.unwrap().position, Tuple4D::point(0.0, 0.0, 0.0));

    let bad = PointLight::new(Color::white(), Tuple4D::vector(0.0, 0.0, 0.0));
    assert!(matches!(bad, Err(Error::NotAPoint { .. })));
}

#[test]
fn default_material() {
    let m = Material::default();

    assert_eq!(m.color, Color::white());
    assert!(m.pattern.is_none());
    assert!(crate::feq(m.ambient, 0.1));
    assert!(crate::feq(m.diffuse, 0.9));
    assert!(crate::feq(m.specular, 0.9));
    assert!(crate::feq(m.shininess, 200.0));
    assert!(crate::feq(m.reflective, 0.0));
    assert!(crate::feq(m.transparency, 0.0));
    assert!(crate::feq(m.refractive_index, 1.0));
}

#[test]
fn material_coefficients_are_range_checked() {
    let out_of_range = [
        Material { ambient: -0.1, ..Default::default() },
        Material { specular: -1.0, ..Default::default() },
        Material { shininess: -5.0, ..Default::default() },
        Material { reflective: 1.01, ..Default::default() },
        Material { reflective: -0.01, ..Default::default() },
        Material { transparency: -1.0, ..Default::default() },
        Material { refractive_index: -1.5, ..Default::default() },
        Material { diffuse: std::f64::NAN, ..Default::default() },
    ];

    for m in out_of_range.iter() {
        assert!(matches!(m.validate(),
            Err(Error::MaterialOutOfRange { .. })), "{:?}", m);
    }

    let edge = Material {
        ambient: 0.0,
        reflective: 1.0,
        transparency: 2.0,
        refractive_index: 0.0,
        ..Default::default()
    };
    assert!(edge.validate().is_ok());
}

#[test]
fn eye_between_light_and_surface() {
    let m = Material::default();
    let s = Shape::sphere();
    let position = Tuple4D::point(0.0, 0.0, 0.0);

    let eyev = Tuple4D::vector(0.0, 0.0, -1.0);
    let normalv = Tuple4D::vector(0.0, 0.0, -1.0);
    let light = white_light(0.0, 0.0, -10.0);

    let res = lighting(&m, &s, &light, position, eyev, normalv, false);
    assert_eq!(res, Color::rgb(1.9, 1.9, 1.9));
}

#[test]
fn eye_between_light_and_surface_offset_45() {
    let m = Material::default();
    let s = Shape::sphere();
    let position = Tuple4D::point(0.0, 0.0, 0.0);

    let eyev = Tuple4D::vector(0.0, 2.0f64.sqrt() / 2.0, 2.0f64.sqrt() / 2.0);
    let normalv = Tuple4D::vector(0.0, 0.0, -1.0);
    let light = white_light(0.0, 0.0, -10.0);

    let res = lighting(&m, &s, &light, position, eyev, normalv, false);
    assert_eq!(res, Color::rgb(1.0, 1.0, 1.0));
}

#[test]
fn eye_opposite_from_surface_offset_45() {
    let m = Material::default();
    let s = Shape::sphere();
    let position = Tuple4D::point(0.0, 0.0, 0.0);

    let eyev = Tuple4D::vector(0.0, 0.0, -1.0);
    let normalv = Tuple4D::vector(0.0, 0.0, -1.0);
    let light = white_light(0.0, 10.0, -10.0);

    // ambient + diffuse at 45 degrees, no specular
    let expected = 0.1 + 0.9 * 2.0f64.sqrt() / 2.0;

    let res = lighting(&m, &s, &light, position, eyev, normalv, false);
    assert_eq!(res, Color::rgb(expected, expected, expected));
}

#[test]
fn eye_opposite_from_surface_in_reflection() {
    let m = Material::default();
    let s = Shape::sphere();
    let position = Tuple4D::point(0.0, 0.0, 0.0);

    let eyev = Tuple4D::vector(0., -(2.0f64.sqrt())/2., -(2.0f64.sqrt())/2.);
    let normalv = Tuple4D::vector(0.0, 0.0, -1.0);
    let light = white_light(0.0, 10.0, -10.0);

    let expected = 0.1 + 0.9 * 2.0f64.sqrt() / 2.0 + 0.9;

    let res = lighting(&m, &s, &light, position, eyev, normalv, false);
    assert_eq!(res, Color::rgb(expected, expected, expected));
}

#[test]
fn eye_across_surface_from_light() {
    let m = Material::default();
    let s = Shape::sphere();
    let position = Tuple4D::point(0.0, 0.0, 0.0);

    let eyev = Tuple4D::vector(0.0, 0.0, -1.0);
    let normalv = Tuple4D::vector(0.0, 0.0, -1.0);
    let light = white_light(0.0, 0.0, 10.0);

    let res = lighting(&m, &s, &light, position, eyev, normalv, false);
    assert_eq!(res, Color::rgb(0.1, 0.1, 0.1));
}

#[test]
fn surface_in_shadow_only_gets_ambient_light() {
    let m = Material::default();
    let s = Shape::sphere();
    let position = Tuple4D::point(0.0, 0.0, 0.0);

    let eyev = Tuple4D::vector(0.0, 0.0, -1.0);
    let normalv = Tuple4D::vector(0.0, 0.0, -1.0);
    let light = white_light(0.0, 0.0, -10.0);

    let res = lighting(&m, &s, &light, position, eyev, normalv, true);
    assert_eq!(res, Color::rgb(0.1, 0.1, 0.1));
}

#[test]
fn lighting_with_stripe_pattern() {
    let m = Material {
        color: Color::rgb(0.5, 0.5, 0.5),
        pattern: Some(Pattern::stripe(Color::white(), Color::black())),

        // Only ambient light, so the pattern color comes through untouched
        ambient: 1.0,
        diffuse: 0.0,
        specular: 0.0,

        ..Default::default()
    };
    let s = Shape::sphere().with_material(m).unwrap();

    let eyev = Tuple4D::vector(0.0, 0.0, -1.0);
    let normalv = Tuple4D::vector(0.0, 0.0, -1.0);
    let light = white_light(0.0, 0.0, -10.0);

    assert_eq!(
        Color::white(),
        lighting(s.material(), &s, &light, Tuple4D::point(0.9, 0.0, 0.0),
            eyev, normalv, false)
    );

    assert_eq!(
        Color::black(),
        lighting(s.material(), &s, &light, Tuple4D::point(1.1, 0.0, 0.0),
            eyev, normalv, false)
    );
}
