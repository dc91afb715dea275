use crate::ray::Ray4D;
use crate::tuple::Tuple4D;
use crate::color::Color;
use crate::matrix::Matrix4D;
use crate::shape::Shape;
use crate::light::{ PointLight, Material, lighting };
use crate::intersect::{ Intersections, IntersectionComputation };
use crate::error::Result;

/// A world with objects and light.
///
/// Worlds collect all objects as well as light for rendering. Most logic is
/// performed within worlds for the ray tracer. Composite objects (groups and
/// CSG shapes) sit in `objects` like any other shape.
#[derive(Clone, Debug)]
pub struct World {
    pub objects: Vec<Shape>,
    pub light_source: PointLight,
}

impl Default for World {
    /// The default world: a white light at `(-10, 10, -10)`, a green-tinted
    /// unit sphere and a white sphere of half its size inside it.
    fn default() -> World {
        let light_source = PointLight {
            intensity: Color::rgb(1.0, 1.0, 1.0),
            position: Tuple4D::point(-10.0, 10.0, -10.0),
        };

        let s1 = Shape::sphere().with_known_material(Material {
            color: Color::rgb(0.8, 1.0, 0.6),
            diffuse: 0.7,
            specular: 0.2,
            ..Default::default()
        });

        let s2 = Shape::sphere().with_known_transform(
            Matrix4D::scaling(0.5, 0.5, 0.5),
            Matrix4D::scaling(2.0, 2.0, 2.0),
        );

        World {
            objects: vec![s1, s2],
            light_source,
        }
    }
}

impl World {
    /// Creates an empty world lit by `light_source`.
    pub fn new(light_source: PointLight) -> World {
        World { objects: Vec::new(), light_source }
    }

    /// Intersects a ray against all objects in a world.
    ///
    /// The result is sorted by time and includes intersections behind the
    /// ray origin.
    pub fn intersect(&self, r: &Ray4D) -> Intersections {
        Intersections::aggregate(self.objects.iter().map(|obj| obj.intersect(r)))
    }

    /// Determines whether a point is shadowed from the light source.
    ///
    /// A point is in shadow when something sits strictly between it and the
    /// light. Fails if `p` is not a point.
    pub fn is_shadowed(&self, p: Tuple4D) -> Result<bool> {
        let p = p.require_point("shadow test point")?;
        Ok(self.shadowed_at(p))
    }

    fn shadowed_at(&self, p: Tuple4D) -> bool {
        let v = self.light_source.position - p;
        let distance = v.magnitude();

        let r = Ray4D::from_parts(p, v.normalize());
        match self.intersect(&r).hit() {
            Some(i) => i.t < distance,
            None => false,
        }
    }

    /// Calculates the color for a hit, based on shadows and light.
    ///
    /// Reflected and refracted contributions are traced recursively, with at
    /// most `remaining` more bounces. A surface that both reflects and
    /// transmits light mixes the two by its Schlick reflectance.
    pub fn shade_hit(&self, comps: &IntersectionComputation, remaining: usize)
        -> Color {
        let material = comps.obj.material();
        let in_shadow = self.shadowed_at(comps.over_point);

        let surface = lighting(material, comps.obj, &self.light_source,
            comps.over_point, comps.eyev, comps.normalv, in_shadow);

        let reflected = self.reflected_color(comps, remaining);
        let refracted = self.refracted_color(comps, remaining);

        if material.reflective > 0.0 && material.transparency > 0.0 {
            let reflectance = comps.schlick();
            surface + reflected * reflectance + refracted * (1.0 - reflectance)
        } else {
            surface + reflected + refracted
        }
    }

    /// The color seen in the mirror direction at a hit, scaled by the
    /// material's reflectivity.
    pub fn reflected_color(&self, comps: &IntersectionComputation,
        remaining: usize) -> Color {
        let reflective = comps.obj.material().reflective;
        if remaining == 0 || reflective == 0.0 {
            return Color::black();
        }

        let r = Ray4D::from_parts(comps.over_point, comps.reflectv);
        self.color_at(&r, remaining - 1) * reflective
    }

    /// The color seen through a transparent hit, bent by Snell's law and
    /// scaled by the material's transparency.
    ///
    /// Black under total internal reflection.
    pub fn refracted_color(&self, comps: &IntersectionComputation,
        remaining: usize) -> Color {
        let transparency = comps.obj.material().transparency;
        if remaining == 0 || transparency == 0.0 {
            return Color::black();
        }

        let n_ratio = comps.n1 / comps.n2;
        let cos_i = comps.eyev.dot(&comps.normalv);
        let sin2_t = n_ratio.powi(2) * (1.0 - cos_i.powi(2));

        if sin2_t > 1.0 {
            return Color::black();
        }

        let cos_t = (1.0 - sin2_t).sqrt();
        let direction = comps.normalv * (n_ratio * cos_i - cos_t)
            - comps.eyev * n_ratio;

        let r = Ray4D::from_parts(comps.under_point, direction);
        self.color_at(&r, remaining - 1) * transparency
    }

    /// Determines a color based on the intersection of a ray and the objects.
    ///
    /// Black if the ray hits nothing in front of its origin.
    pub fn color_at(&self, r: &Ray4D, remaining: usize) -> Color {
        let xs = self.intersect(r);

        match xs.hit() {
            None => Color::black(),
            Some(i) => {
                let comps = IntersectionComputation::new(r, &i, Some(&xs));
                self.shade_hit(&comps, remaining)
            },
        }
    }
}

#[cfg(test)]
use crate::consts::RECURSION_DEPTH;

#[cfg(test)]
use crate::intersect::Intersection;

#[cfg(test)]
fn ray(origin: Tuple4D, direction: Tuple4D) -> Ray4D {
    Ray4D::new(origin, direction).unwrap()
}

/// Replaces the material of a world object, starting from its current one.
#[cfg(test)]
fn restyle<F: FnOnce(&mut Material)>(w: &mut World, index: usize, f: F) {
    let mut m = *w.objects[index].material();
    f(&mut m);
    w.objects[index] = w.objects[index].clone().with_material(m).unwrap();
}

/// The ray used by the reflection and refraction scenarios, striking the
/// plane `y = -1` at `t = sqrt(2)`.
#[cfg(test)]
fn diagonal_ray() -> Ray4D {
    let k = 2.0f64.sqrt() / 2.0;
    ray(Tuple4D::point(0.0, 0.0, -3.0), Tuple4D::vector(0.0, -k, k))
}

#[cfg(test)]
fn floor(material: Material) -> Shape {
    Shape::plane()
        .with_transform(Matrix4D::translation(0.0, -1.0, 0.0)).unwrap()
        .with_material(material).unwrap()
}

#[test]
fn default_world_contents() {
    let w = World::default();

    assert_eq!(w.light_source.position, Tuple4D::point(-10.0, 10.0, -10.0));
    assert_eq!(w.light_source.intensity, Color::white());
    assert_eq!(w.objects.len(), 2);
    assert_eq!(w.objects[0].material().color, Color::rgb(0.8, 1.0, 0.6));
    assert_eq!(*w.objects[1].transform(), Matrix4D::scaling(0.5, 0.5, 0.5));
}

#[test]
fn intersect_default_world_with_ray() {
    let w = World::default();
    let r = ray(Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0));

    let xs = w.intersect(&r);

    assert_eq!(xs.len(), 4);
    assert!(crate::feq(xs[0].t, 4.0));
    assert!(crate::feq(xs[1].t, 4.5));
    assert!(crate::feq(xs[2].t, 5.5));
    assert!(crate::feq(xs[3].t, 6.0));
}

#[test]
fn shade_intersection_from_outside() {
    let w = World::default();
    let r = ray(Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0));

    let i = Intersection::new(4.0, &w.objects[0]);
    let comps = IntersectionComputation::new(&r, &i, None);
    let c = w.shade_hit(&comps, RECURSION_DEPTH);

    assert!(c.approx_eq(&Color::rgb(0.38066, 0.47583, 0.2855), 1e-4));
}

#[test]
fn shade_intersection_from_inside() {
    let mut w = World::default();
    w.light_source = PointLight::new(
        Color::white(), Tuple4D::point(0.0, 0.25, 0.0)
    ).unwrap();
    let r = ray(Tuple4D::point(0.0, 0.0, 0.0), Tuple4D::vector(0.0, 0.0, 1.0));

    let i = Intersection::new(0.5, &w.objects[1]);
    let comps = IntersectionComputation::new(&r, &i, None);
    let c = w.shade_hit(&comps, RECURSION_DEPTH);

    assert!(c.approx_eq(&Color::rgb(0.90498, 0.90498, 0.90498), 1e-4));
}

#[test]
fn shade_intersection_in_shadow() {
    let mut w = World::new(
        PointLight::new(Color::white(), Tuple4D::point(0.0, 0.0, -10.0))
            .unwrap()
    );
    w.objects.push(Shape::sphere());
    w.objects.push(Shape::sphere()
        .with_transform(Matrix4D::translation(0.0, 0.0, 10.0)).unwrap());

    let r = ray(Tuple4D::point(0.0, 0.0, 5.0), Tuple4D::vector(0.0, 0.0, 1.0));
    let i = Intersection::new(4.0, &w.objects[1]);
    let comps = IntersectionComputation::new(&r, &i, None);

    assert_eq!(w.shade_hit(&comps, RECURSION_DEPTH), Color::rgb(0.1, 0.1, 0.1));
}

#[test]
fn color_ray_miss() {
    let w = World::default();
    let r = ray(Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(0.0, 1.0, 0.0));

    assert_eq!(w.color_at(&r, RECURSION_DEPTH), Color::black());
}

#[test]
fn color_ray_hit() {
    let w = World::default();
    let r = ray(Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0));

    assert!(w.color_at(&r, RECURSION_DEPTH)
        .approx_eq(&Color::rgb(0.38066, 0.47583, 0.2855), 1e-4));
}

#[test]
fn color_behind_ray() {
    let mut w = World::default();
    restyle(&mut w, 0, |m| m.ambient = 1.0);
    restyle(&mut w, 1, |m| m.ambient = 1.0);

    let r = ray(Tuple4D::point(0.0, 0.0, 0.75), Tuple4D::vector(0.0, 0.0, -1.0));

    assert_eq!(w.color_at(&r, RECURSION_DEPTH), w.objects[1].material().color);
}

#[test]
fn composite_objects_shade_like_their_parts() {
    let expected = Color::rgb(0.38066, 0.47583, 0.2855);
    let r = ray(Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0));

    let mut grouped = World::default();
    let parts = std::mem::take(&mut grouped.objects);
    grouped.objects.push(Shape::group(parts));
    assert!(grouped.color_at(&r, RECURSION_DEPTH).approx_eq(&expected, 1e-4));

    let mut combined = World::default();
    let mut parts = std::mem::take(&mut combined.objects).into_iter();
    let (outer, inner) = (parts.next().unwrap(), parts.next().unwrap());
    combined.objects.push(
        Shape::csg(crate::intersect::CsgOperation::Union, outer, inner)
    );
    assert!(combined.color_at(&r, RECURSION_DEPTH).approx_eq(&expected, 1e-4));
}

#[test]
fn shadow_collinear_point_and_light() {
    let w = World::default();

    assert!(!w.is_shadowed(Tuple4D::point(0.0, 10.0, 0.0)).unwrap());
}

#[test]
fn shadow_object_between_point_and_light() {
    let w = World::default();

    assert!(w.is_shadowed(Tuple4D::point(10.0, -10.0, 10.0)).unwrap());
}

#[test]
fn shadow_object_behind_light() {
    let w = World::default();

    assert!(!w.is_shadowed(Tuple4D::point(-20.0, 20.0, -20.0)).unwrap());
}

#[test]
fn shadow_object_behind_point() {
    let w = World::default();

    assert!(!w.is_shadowed(Tuple4D::point(-2.0, 2.0, -2.0)).unwrap());
}

#[test]
fn shadow_test_requires_a_point() {
    let w = World::default();

    assert!(w.is_shadowed(Tuple4D::vector(10.0, -10.0, 10.0)).is_err());
}

#[test]
fn reflected_color_for_nonreflective_material() {
    let mut w = World::default();
    restyle(&mut w, 1, |m| m.ambient = 1.0);

    let r = ray(Tuple4D::point(0.0, 0.0, 0.0), Tuple4D::vector(0.0, 0.0, 1.0));
    let i = Intersection::new(1.0, &w.objects[1]);
    let comps = IntersectionComputation::new(&r, &i, None);

    assert_eq!(w.reflected_color(&comps, RECURSION_DEPTH), Color::black());
}

#[test]
fn reflected_color_for_reflective_material() {
    let mut w = World::default();
    w.objects.push(floor(Material { reflective: 0.5, ..Default::default() }));

    let r = diagonal_ray();
    let i = Intersection::new(2.0f64.sqrt(), &w.objects[2]);
    let comps = IntersectionComputation::new(&r, &i, None);

    let expected = Color::rgb(0.19033, 0.23792, 0.14275);
    assert!(w.reflected_color(&comps, RECURSION_DEPTH).approx_eq(&expected, 1e-4));

    let expected = Color::rgb(0.87676, 0.92434, 0.82917);
    assert!(w.shade_hit(&comps, RECURSION_DEPTH).approx_eq(&expected, 1e-4));
}

#[test]
fn mutually_reflective_surfaces_terminate() {
    let mut w = World::new(
        PointLight::new(Color::white(), Tuple4D::point(0.0, 0.0, 0.0)).unwrap()
    );
    let mirror = Material { reflective: 1.0, ..Default::default() };

    w.objects.push(floor(mirror));
    w.objects.push(Shape::plane()
        .with_transform(Matrix4D::translation(0.0, 1.0, 0.0)).unwrap()
        .with_material(mirror).unwrap());

    let r = ray(Tuple4D::point(0.0, 0.0, 0.0), Tuple4D::vector(0.0, 1.0, 0.0));

    assert!(w.color_at(&r, RECURSION_DEPTH).is_finite());
}

#[test]
fn color_inside_hugely_scaled_cube_is_finite() {
    let mut w = World::default();
    w.objects = vec![Shape::cube()
        .with_transform(Matrix4D::scaling(1e6, 1e6, 1e6)).unwrap()];

    let r = ray(Tuple4D::point(0.0, 0.0, 0.0), Tuple4D::vector(0.0, 0.0, 1.0));
    let hit = w.intersect(&r).hit().map(|i| i.t);

    assert!(hit.map_or(false, |t| (t - 1e6).abs() < 1e-3));
    assert!(w.color_at(&r, RECURSION_DEPTH).is_finite());
}

#[test]
fn reflected_color_at_maximum_depth() {
    let mut w = World::default();
    w.objects.push(floor(Material { reflective: 0.5, ..Default::default() }));

    let r = diagonal_ray();
    let i = Intersection::new(2.0f64.sqrt(), &w.objects[2]);
    let comps = IntersectionComputation::new(&r, &i, None);

    assert_eq!(w.reflected_color(&comps, 0), Color::black());
}

#[test]
fn refracted_color_with_opaque_surface() {
    let w = World::default();
    let r = ray(Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0));

    let xs = Intersections::new(vec![
        Intersection::new(4.0, &w.objects[0]),
        Intersection::new(6.0, &w.objects[0]),
    ]);
    let comps = IntersectionComputation::new(&r, &xs[0], Some(&xs));

    assert_eq!(w.refracted_color(&comps, RECURSION_DEPTH), Color::black());
}

#[test]
fn refracted_color_at_maximum_depth() {
    let mut w = World::default();
    restyle(&mut w, 0, |m| {
        m.transparency = 1.0;
        m.refractive_index = 1.5;
    });
    let r = ray(Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0));

    let xs = Intersections::new(vec![
        Intersection::new(4.0, &w.objects[0]),
        Intersection::new(6.0, &w.objects[0]),
    ]);
    let comps = IntersectionComputation::new(&r, &xs[0], Some(&xs));

    assert_eq!(w.refracted_color(&comps, 0), Color::black());
}

#[test]
fn refracted_color_under_total_internal_reflection() {
    let mut w = World::default();
    restyle(&mut w, 0, |m| {
        m.transparency = 1.0;
        m.refractive_index = 1.5;
    });
    let k = 2.0f64.sqrt() / 2.0;
    let r = ray(Tuple4D::point(0.0, 0.0, k), Tuple4D::vector(0.0, 1.0, 0.0));

    let xs = Intersections::new(vec![
        Intersection::new(-k, &w.objects[0]),
        Intersection::new(k, &w.objects[0]),
    ]);

    // Inside the sphere, so the second intersection is the one that matters
    let comps = IntersectionComputation::new(&r, &xs[1], Some(&xs));

    assert_eq!(w.refracted_color(&comps, RECURSION_DEPTH), Color::black());
}

#[test]
fn shade_hit_with_transparent_material() {
    let mut w = World::default();
    w.objects.push(floor(Material {
        transparency: 0.5,
        refractive_index: 1.5,
        ..Default::default()
    }));
    w.objects.push(Shape::sphere()
        .with_transform(Matrix4D::translation(0.0, -3.5, -0.5)).unwrap()
        .with_material(Material {
            color: Color::rgb(1.0, 0.0, 0.0),
            ambient: 0.5,
            ..Default::default()
        }).unwrap());

    let r = diagonal_ray();
    let xs = Intersections::new(
        vec![Intersection::new(2.0f64.sqrt(), &w.objects[2])]
    );
    let comps = IntersectionComputation::new(&r, &xs[0], Some(&xs));

    let expected = Color::rgb(0.93643, 0.68643, 0.68643);
    assert!(w.shade_hit(&comps, RECURSION_DEPTH).approx_eq(&expected, 1e-4));
}

#[test]
fn shade_hit_with_reflective_transparent_material() {
    let mut w = World::default();
    w.objects.push(floor(Material {
        reflective: 0.5,
        transparency: 0.5,
        refractive_index: 1.5,
        ..Default::default()
    }));
    w.objects.push(Shape::sphere()
        .with_transform(Matrix4D::translation(0.0, -3.5, -0.5)).unwrap()
        .with_material(Material {
            color: Color::rgb(1.0, 0.0, 0.0),
            ambient: 0.5,
            ..Default::default()
        }).unwrap());

    let r = diagonal_ray();
    let xs = Intersections::new(
        vec![Intersection::new(2.0f64.sqrt(), &w.objects[2])]
    );
    let comps = IntersectionComputation::new(&r, &xs[0], Some(&xs));

    let expected = Color::rgb(0.93391, 0.69643, 0.69243);
    assert!(w.shade_hit(&comps, RECURSION_DEPTH).approx_eq(&expected, 1e-4));
}
