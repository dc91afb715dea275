use std::ops::Index;

use serde::Deserialize;

use crate::consts::EPSILON;
use crate::tuple::Tuple4D;
use crate::ray::Ray4D;
use crate::shape::Shape;

/// An intersection.
///
/// This structure assumes that some ray produced an intersection. Parameter `t`
/// is analogous to `t` for a ray (the offset from the ray origin), and `what`
/// borrows the shape which was struck. Triangles also record the barycentric
/// `u` and `v` of the hit, which smooth triangles use to blend their normals.
#[derive(Copy, Clone, Debug)]
pub struct Intersection<'a> {
    pub t: f64,
    pub what: &'a Shape,
    pub uv: Option<(f64, f64)>,
}

/// Implements partial equality on an Intersection.
///
/// Two Intersection structures are equal if the offsets `t` of the
/// intersections are equivalent, and if the underlying *pointers* of the
/// intersections are equivalent.
impl<'a> PartialEq for Intersection<'a> {
    fn eq(&self, other: &Intersection<'a>) -> bool {
        self.t == other.t && std::ptr::eq(self.what, other.what)
    }
}

impl<'a> Intersection<'a> {
    pub fn new(t: f64, what: &'a Shape) -> Intersection<'a> {
        Intersection { t, what, uv: None }
    }

    /// Creates an intersection which remembers where a triangle was struck.
    pub fn new_uv(t: f64, what: &'a Shape, u: f64, v: f64) -> Intersection<'a> {
        Intersection { t, what, uv: Some((u, v)) }
    }
}

/// A collection of intersections, always sorted by `t`.
///
/// Sorting is stable, so intersections at the same `t` keep the order in
/// which they were produced.
#[derive(Clone, Debug, Default)]
pub struct Intersections<'a> {
    intersections: Vec<Intersection<'a>>,
}

impl<'a> Intersections<'a> {
    /// Creates a sorted list of intersections.
    pub fn new(mut intersections: Vec<Intersection<'a>>) -> Intersections<'a> {
        intersections.sort_by(|a, b|
            a.t.partial_cmp(&b.t).unwrap_or(std::cmp::Ordering::Equal)
        );

        Intersections { intersections }
    }

    pub fn empty() -> Intersections<'a> {
        Intersections { intersections: Vec::new() }
    }

    /// Merges several lists of intersections into one sorted list.
    pub fn aggregate<I>(all: I) -> Intersections<'a>
        where I: IntoIterator<Item = Intersections<'a>> {
        let merged = all.into_iter()
            .flat_map(|is| is.intersections)
            .collect();

        Intersections::new(merged)
    }

    /// Gets the visible hit: the intersection with the lowest non-negative
    /// `t`.
    ///
    /// If no hit is registered, this function returns `None`.
    pub fn hit(&self) -> Option<Intersection<'a>> {
        self.intersections.iter().find(|i| i.t >= 0.0).copied()
    }

    pub fn len(&self) -> usize {
        self.intersections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intersections.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Intersection<'a>> {
        self.intersections.iter()
    }
}

impl<'a> Index<usize> for Intersections<'a> {
    type Output = Intersection<'a>;

    fn index(&self, index: usize) -> &Intersection<'a> {
        &self.intersections[index]
    }
}

impl<'a, 'b> IntoIterator for &'b Intersections<'a> {
    type Item = &'b Intersection<'a>;
    type IntoIter = std::slice::Iter<'b, Intersection<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.intersections.iter()
    }
}

/// The boolean operation of a CSG shape.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CsgOperation {
    /// Everything inside either operand.
    Union,

    /// Everything inside both operands.
    Intersection,

    /// Everything inside the left operand but not the right one.
    Difference,
}

/// Decides whether an intersection survives a CSG operation.
///
/// `lhit` is true if the left operand was hit, `inl` is true if the ray is
/// currently inside the left operand, and `inr` is true if it is currently
/// inside the right one.
///
/// ```
/// # use whitted_tracer::intersect::{ CsgOperation, intersection_allowed };
/// // Leaving the right operand while inside the left one is a visible
/// // surface of a difference.
/// assert!(intersection_allowed(CsgOperation::Difference, false, true, true));
/// ```
pub fn intersection_allowed(op: CsgOperation, lhit: bool, inl: bool, inr: bool)
    -> bool {
    match op {
        CsgOperation::Union => (lhit && !inr) || (!lhit && !inl),
        CsgOperation::Intersection => (lhit && inr) || (!lhit && inl),
        CsgOperation::Difference => (lhit && !inr) || (!lhit && inl),
    }
}

/// Filters a sorted list of intersections down to the surfaces of a CSG
/// shape.
///
/// Every intersection belongs to either the `left` operand or the right one.
/// Walking the list, each intersection toggles whether the ray is inside the
/// operand it belongs to.
pub fn filter_intersections<'a>(op: CsgOperation, left: &Shape,
    xs: Intersections<'a>) -> Intersections<'a> {
    let mut inl = false;
    let mut inr = false;

    let mut kept = Vec::new();
    for i in xs.intersections {
        let lhit = left.includes(i.what);

        if intersection_allowed(op, lhit, inl, inr) {
            kept.push(i);
        }

        if lhit {
            inl = !inl;
        } else {
            inr = !inr;
        }
    }

    Intersections { intersections: kept }
}

/// A record for computations associated with an `Intersection`.
///
/// Mostly a superset of an `Intersection`.
#[derive(Clone, Debug)]
pub struct IntersectionComputation<'a> {
    /// The "time" of the ray intersection.
    pub t: f64,

    /// The object being intersected.
    pub obj: &'a Shape,

    /// The point where the intersection occurs.
    pub point: Tuple4D,

    /// A point slightly above the intersected surface. Used to prevent an
    /// object from shadowing itself (this causes "acne").
    pub over_point: Tuple4D,

    /// A point slightly below the intersected surface, where refracted rays
    /// start.
    pub under_point: Tuple4D,

    /// The eye vector for the intersection.
    pub eyev: Tuple4D,

    /// The normal vector of the object being intersected, facing the eye.
    pub normalv: Tuple4D,

    /// The intersection ray, reflected across the normal.
    pub reflectv: Tuple4D,

    /// Whether the intersection occurs within the object or not.
    pub inside: bool,

    /// The refractive index of the material being exited.
    pub n1: f64,

    /// The refractive index of the material being entered.
    pub n2: f64,
}

impl<'a> IntersectionComputation<'a> {
    /// Creates a new intersection computation, given a ray and intersection.
    ///
    /// The `xs` parameter is every intersection along the ray, including
    /// `hit`. If provided, refraction indices will be calculated; otherwise
    /// both are 1.0.
    pub fn new(r: &Ray4D, hit: &Intersection<'a>,
        xs: Option<&Intersections<'a>>) -> IntersectionComputation<'a> {
        let t = hit.t;
        let obj = hit.what;
        let point = r.position(t);
        let eyev = -r.direction();
        let mut normalv = obj.normal_at(point, Some(hit));

        assert!(point.is_point(), "surface point must be a point");
        assert!(eyev.is_vector() && normalv.is_vector(),
            "eye and normal must be vectors");

        let inside = if normalv.dot(&eyev) < 0.0 {
            normalv = -normalv;
            true
        } else {
            false
        };

        let over_point = point + normalv * EPSILON;
        let under_point = point - normalv * EPSILON;
        let reflectv = r.direction().reflect(&normalv);

        let (n1, n2) = match xs {
            Some(xs) => Self::refraction_indices(hit, xs),
            None => (1.0, 1.0),
        };

        IntersectionComputation {
            t, obj,
            point, over_point, under_point,
            eyev, normalv, reflectv,
            inside,
            n1, n2,
        }
    }

    /// Finds the refractive indices on either side of `hit`.
    ///
    /// A stack of the shapes the ray is currently inside of is kept while
    /// walking the intersections. The exited index belongs to the innermost
    /// shape just before the hit, the entered index to the innermost shape
    /// just after it. Empty space has an index of 1.0.
    fn refraction_indices(hit: &Intersection<'a>, xs: &Intersections<'a>)
        -> (f64, f64) {
        let innermost = |containers: &[&Shape]| containers.last()
            .map_or(1.0, |s| s.material().refractive_index);

        let mut containers: Vec<&'a Shape> = Vec::new();

        for i in xs.iter() {
            let is_hit = i == hit;
            let n1 = innermost(&containers);

            if let Some(j)
                = containers.iter().position(|&s| std::ptr::eq(s, i.what)) {
                containers.remove(j);
            } else {
                containers.push(i.what);
            }

            if is_hit {
                return (n1, innermost(&containers));
            }
        }

        (1.0, 1.0)
    }

    /// Calculates the reflectance of a hit with Schlick's approximation of
    /// the Fresnel equations.
    ///
    /// The reflectance is a number between 0 and 1, representing what fraction
    /// of the light is reflected for the hit. Past the critical angle all of it
    /// is (total internal reflection).
    pub fn schlick(&self) -> f64 {
        let mut cos = self.eyev.dot(&self.normalv);

        // Total internal reflection can only occur if n1 > n2.
        if self.n1 > self.n2 {
            let n = self.n1 / self.n2;
            let sin2_t = n.powi(2) * (1.0 - cos.powi(2));

            if sin2_t > 1.0 {
                return 1.0
            }

            // Use the cosine of the transmitted angle instead.
            cos = (1.0 - sin2_t).sqrt();
        }

        let r0 = ((self.n1 - self.n2) / (self.n1 + self.n2)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cos).powi(5)
    }
}

#[cfg(test)]
use crate::matrix::Matrix4D;

#[cfg(test)]
fn ray(origin: Tuple4D, direction: Tuple4D) -> Ray4D {
    Ray4D::new(origin, direction).unwrap()
}

#[test]
fn an_intersection_encapsulates_t_and_object() {
    let s = Shape::sphere();
    let i = Intersection::new(3.5, &s);

    assert_eq!(i.t, 3.5);
    assert!(std::ptr::eq(i.what, &s));
    assert!(i.uv.is_none());
}

#[test]
fn an_intersection_can_encapsulate_u_and_v() {
    let s = Shape::sphere();
    let i = Intersection::new_uv(3.5, &s, 0.2, 0.4);

    assert_eq!(i.uv, Some((0.2, 0.4)));
}

#[test]
fn intersections_are_sorted_stably() {
    let s1 = Shape::sphere();
    let s2 = Shape::sphere();
    let xs = Intersections::new(vec![
        Intersection::new(5.0, &s1),
        Intersection::new(-1.0, &s1),
        Intersection::new(5.0, &s2),
        Intersection::new(2.0, &s2),
    ]);

    let times: Vec<f64> = xs.iter().map(|i| i.t).collect();
    assert_eq!(times, vec![-1.0, 2.0, 5.0, 5.0]);
    assert!(std::ptr::eq(xs[2].what, &s1));
    assert!(std::ptr::eq(xs[3].what, &s2));
}

#[test]
fn aggregating_intersections() {
    let s = Shape::sphere();
    let xs = Intersections::aggregate(vec![
        Intersections::new(vec![
            Intersection::new(3.0, &s), Intersection::new(7.0, &s)
        ]),
        Intersections::empty(),
        Intersections::new(vec![Intersection::new(1.0, &s)]),
    ]);

    assert_eq!(xs.len(), 3);
    assert_eq!(xs[0].t, 1.0);
    assert_eq!(xs[2].t, 7.0);
}

#[test]
fn hit_with_all_positive() {
    let s  = Shape::sphere();
    let i1 = Intersection::new(1.0, &s);
    let i2 = Intersection::new(2.0, &s);
    let xs = Intersections::new(vec![i2, i1]);

    assert_eq!(xs.hit(), Some(i1));
}

#[test]
fn hit_with_some_negative() {
    let s  = Shape::sphere();
    let xs = Intersections::new(vec![
        Intersection::new(-2.0, &s),
        Intersection::new(-1.0, &s),
        Intersection::new(2.0, &s),
        Intersection::new(3.0, &s),
    ]);

    assert_eq!(xs.hit(), Some(Intersection::new(2.0, &s)));
}

#[test]
fn hit_with_all_negative() {
    let s  = Shape::sphere();
    let xs = Intersections::new(vec![
        Intersection::new(-2.0, &s),
        Intersection::new(-1.0, &s),
    ]);

    assert_eq!(xs.hit(), None);
    assert_eq!(Intersections::empty().hit(), None);
}

#[test]
fn hit_multiple() {
    let s  = Shape::sphere();
    let i4 = Intersection::new(2.0,  &s);
    let xs = Intersections::new(vec![
        Intersection::new(5.0,  &s),
        Intersection::new(7.0,  &s),
        Intersection::new(-3.0, &s),
        i4,
    ]);

    assert_eq!(xs.hit(), Some(i4));
}

#[test]
fn evaluating_the_rule_for_a_csg_operation() {
    use CsgOperation::*;

    let table = [
        (Union, true, true, true, false),
        (Union, true, true, false, true),
        (Union, true, false, true, false),
        (Union, true, false, false, true),
        (Union, false, true, true, false),
        (Union, false, true, false, false),
        (Union, false, false, true, true),
        (Union, false, false, false, true),
        (Intersection, true, true, true, true),
        (Intersection, true, true, false, false),
        (Intersection, true, false, true, true),
        (Intersection, true, false, false, false),
        (Intersection, false, true, true, true),
        (Intersection, false, true, false, true),
        (Intersection, false, false, true, false),
        (Intersection, false, false, false, false),
        (Difference, true, true, true, false),
        (Difference, true, true, false, true),
        (Difference, true, false, true, false),
        (Difference, true, false, false, true),
        (Difference, false, true, true, true),
        (Difference, false, true, false, true),
        (Difference, false, false, true, false),
        (Difference, false, false, false, false),
    ];

    for &(op, lhit, inl, inr, allowed) in table.iter() {
        assert_eq!(intersection_allowed(op, lhit, inl, inr), allowed,
            "{:?} lhit={} inl={} inr={}", op, lhit, inl, inr);
    }
}

#[test]
fn filtering_a_list_of_intersections() {
    let cases = [
        (CsgOperation::Union, [0, 3]),
        (CsgOperation::Intersection, [1, 2]),
        (CsgOperation::Difference, [0, 1]),
    ];

    for &(op, [x0, x1]) in cases.iter() {
        let c = Shape::csg(op, Shape::sphere(), Shape::cube());
        let s1 = c.csg_left().unwrap();
        let s2 = c.csg_right().unwrap();

        let all = [
            Intersection::new(1.0, s1),
            Intersection::new(2.0, s2),
            Intersection::new(3.0, s1),
            Intersection::new(4.0, s2),
        ];

        let result = filter_intersections(
            op, s1, Intersections::new(all.to_vec())
        );

        assert_eq!(result.len(), 2);
        assert_eq!(result[0], all[x0]);
        assert_eq!(result[1], all[x1]);
    }
}

#[test]
fn precompute_intersection_state() {
    let r = ray(Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0));
    let shape = Shape::sphere();
    let i = Intersection::new(4.0, &shape);

    let comps = IntersectionComputation::new(&r, &i, None);

    assert!(std::ptr::eq(comps.obj, i.what));
    assert_eq!(comps.t, i.t);
    assert_eq!(comps.point, Tuple4D::point(0.0, 0.0, -1.0));
    assert_eq!(comps.eyev, Tuple4D::vector(0.0, 0.0, -1.0));
    assert_eq!(comps.normalv, Tuple4D::vector(0.0, 0.0, -1.0));
    assert!(!comps.inside);
}

#[test]
fn precompute_inside_intersection() {
    let r = ray(Tuple4D::point(0.0, 0.0, 0.0), Tuple4D::vector(0.0, 0.0, 1.0));
    let shape = Shape::sphere();
    let i = Intersection::new(1.0, &shape);

    let comps = IntersectionComputation::new(&r, &i, None);

    assert!(comps.inside);
    assert_eq!(comps.point, Tuple4D::point(0.0, 0.0, 1.0));
    assert_eq!(comps.eyev, Tuple4D::vector(0.0, 0.0, -1.0));
    // Inverted, because the eye is inside the sphere.
    assert_eq!(comps.normalv, Tuple4D::vector(0.0, 0.0, -1.0));
}

#[test]
fn precompute_reflection_vector() {
    let k = 2.0f64.sqrt() / 2.0;
    let shape = Shape::plane();
    let r = ray(Tuple4D::point(0.0, 1.0, -1.0), Tuple4D::vector(0.0, -k, k));
    let i = Intersection::new(2.0f64.sqrt(), &shape);

    let comps = IntersectionComputation::new(&r, &i, None);

    assert_eq!(comps.reflectv, Tuple4D::vector(0.0, k, k));
}

#[test]
fn hit_should_offset_point() {
    let r = ray(Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0));
    let shape = Shape::sphere()
        .with_transform(Matrix4D::translation(0.0, 0.0, 1.0)).unwrap();
    let i = Intersection::new(5.0, &shape);

    let comps = IntersectionComputation::new(&r, &i, None);

    assert!(comps.over_point.z < -EPSILON / 2.0);
    assert!(comps.point.z > comps.over_point.z);
}

#[test]
fn under_point_is_offset_below_the_surface() {
    let r = ray(Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0));
    let shape = Shape::glass_sphere()
        .with_transform(Matrix4D::translation(0.0, 0.0, 1.0)).unwrap();
    let xs = Intersections::new(vec![Intersection::new(5.0, &shape)]);

    let comps = IntersectionComputation::new(&r, &xs[0], Some(&xs));

    assert!(comps.under_point.z > EPSILON / 2.0);
    assert!(comps.point.z < comps.under_point.z);
}

#[test]
fn finding_n1_and_n2_at_various_intersections() {
    use crate::light::Material;

    let glass = |index: f64, m: Matrix4D| {
        let material = Material {
            transparency: 1.0,
            refractive_index: index,
            ..Default::default()
        };

        Shape::sphere()
            .with_transform(m).unwrap()
            .with_material(material).unwrap()
    };

    let a = glass(1.5, Matrix4D::scaling(2.0, 2.0, 2.0));
    let b = glass(2.0, Matrix4D::translation(0.0, 0.0, -0.25));
    let c = glass(2.5, Matrix4D::translation(0.0, 0.0, 0.25));

    let r = ray(Tuple4D::point(0.0, 0.0, -4.0), Tuple4D::vector(0.0, 0.0, 1.0));
    let xs = Intersections::new(vec![
        Intersection::new(2.0, &a),
        Intersection::new(2.75, &b),
        Intersection::new(3.25, &c),
        Intersection::new(4.75, &b),
        Intersection::new(5.25, &c),
        Intersection::new(6.0, &a),
    ]);

    let expected = [
        (1.0, 1.5), (1.5, 2.0), (2.0, 2.5), (2.5, 2.5), (2.5, 1.5), (1.5, 1.0),
    ];

    for (index, &(n1, n2)) in expected.iter().enumerate() {
        let comps = IntersectionComputation::new(&r, &xs[index], Some(&xs));
        assert_eq!(comps.n1, n1, "n1 at {}", index);
        assert_eq!(comps.n2, n2, "n2 at {}", index);
    }
}

#[test]
fn schlick_under_total_internal_reflection() {
    let k = 2.0f64.sqrt() / 2.0;
    let shape = Shape::glass_sphere();
    let r = ray(Tuple4D::point(0.0, 0.0, k), Tuple4D::vector(0.0, 1.0, 0.0));
    let xs = Intersections::new(vec![
        Intersection::new(-k, &shape),
        Intersection::new(k, &shape),
    ]);

    let comps = IntersectionComputation::new(&r, &xs[1], Some(&xs));

    assert_eq!(comps.schlick(), 1.0);
}

#[test]
fn schlick_with_a_perpendicular_viewing_angle() {
    use crate::feq;

    let shape = Shape::glass_sphere();
    let r = ray(Tuple4D::point(0.0, 0.0, 0.0), Tuple4D::vector(0.0, 1.0, 0.0));
    let xs = Intersections::new(vec![
        Intersection::new(-1.0, &shape),
        Intersection::new(1.0, &shape),
    ]);

    let comps = IntersectionComputation::new(&r, &xs[1], Some(&xs));

    assert!(feq(comps.schlick(), 0.04));
}

#[test]
fn schlick_with_small_angle_and_n2_greater_than_n1() {
    use crate::feq;

    let shape = Shape::glass_sphere();
    let r = ray(Tuple4D::point(0.0, 0.99, -2.0), Tuple4D::vector(0.0, 0.0, 1.0));
    let xs = Intersections::new(vec![Intersection::new(1.8589, &shape)]);

    let comps = IntersectionComputation::new(&r, &xs[0], Some(&xs));

    assert!(feq(comps.schlick(), 0.48873));
}
