use crate::feq;
use crate::tuple::Tuple4D;
use crate::color::Color;
use crate::matrix::Matrix4D;
use crate::shape::Shape;
use crate::error::Result;

/// The procedural function of a pattern, with its two colors.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PatternType {
    /// Alternating stripes along X.
    Stripe(Color, Color),

    /// A linear blend from the first color to the second, repeating every
    /// unit along X.
    Gradient(Color, Color),

    /// Concentric rings around the Y axis.
    Ring(Color, Color),

    /// Alternating unit cubes in all three dimensions.
    Checkers(Color, Color),
}

/// A procedural surface pattern.
///
/// Patterns have their own transform, applied on top of the transform of the
/// shape they color: a point is taken from world space to object space, then
/// from object space to pattern space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pattern {
    pub ty: PatternType,
    transform: Matrix4D,
    inverse: Matrix4D,
}

impl Pattern {
    fn with_type(ty: PatternType) -> Pattern {
        Pattern {
            ty,
            transform: Matrix4D::identity(),
            inverse: Matrix4D::identity(),
        }
    }

    /// An alternating stripe pattern applied across the X axis.
    ///
    /// Effectively, for a point `(x, y, z)`, if `floor(x) % 2 == 0`, color `a`
    /// is applied to that point; otherwise, color `b` is used.
    pub fn stripe(a: Color, b: Color) -> Pattern {
        Pattern::with_type(PatternType::Stripe(a, b))
    }

    pub fn gradient(a: Color, b: Color) -> Pattern {
        Pattern::with_type(PatternType::Gradient(a, b))
    }

    pub fn ring(a: Color, b: Color) -> Pattern {
        Pattern::with_type(PatternType::Ring(a, b))
    }

    pub fn checkers(a: Color, b: Color) -> Pattern {
        Pattern::with_type(PatternType::Checkers(a, b))
    }

    /// Replaces the pattern transform. Fails if it cannot be inverted.
    pub fn with_transform(mut self, transform: Matrix4D) -> Result<Pattern> {
        self.inverse = transform.inverse()?;
        self.transform = transform;

        Ok(self)
    }

    pub fn transform(&self) -> &Matrix4D {
        &self.transform
    }

    /// Evaluates the pattern at a point in pattern space.
    pub fn pattern_at(&self, p: Tuple4D) -> Color {
        match self.ty {
            PatternType::Stripe(a, b) => Self::alternate(p.x.floor(), a, b),
            PatternType::Gradient(a, b) => a + (b - a) * (p.x - p.x.floor()),
            PatternType::Ring(a, b) => {
                let distance = (p.x.powi(2) + p.z.powi(2)).sqrt();
                Self::alternate(distance.floor(), a, b)
            },
            PatternType::Checkers(a, b) => Self::alternate(
                p.x.floor() + p.y.floor() + p.z.floor(), a, b
            ),
        }
    }

    /// Evaluates the pattern at a world-space point on `shape`.
    pub fn pattern_at_shape(&self, shape: &Shape, world_point: Tuple4D)
        -> Color {
        let object_point = shape.world_to_object(world_point);
        let pattern_point = self.inverse * object_point;

        self.pattern_at(pattern_point)
    }

    fn alternate(n: f64, a: Color, b: Color) -> Color {
        if feq(n.rem_euclid(2.0), 0.0) {
            a
        } else {
            b
        }
    }
}

#[test]
fn stripe_pattern_is_constant_along_y_and_z() {
    let pattern = Pattern::stripe(Color::white(), Color::black());

    for p in [
        Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::point(0.0, 1.0, 0.0),
        Tuple4D::point(0.0, 2.0, 0.0),
        Tuple4D::point(0.0, 0.0, 1.0),
        Tuple4D::point(0.0, 0.0, 2.0),
    ].iter() {
        assert_eq!(pattern.pattern_at(*p), Color::white());
    }
}

#[test]
fn stripe_pattern_alternates_along_x() {
    let pattern = Pattern::stripe(Color::white(), Color::black());

    assert_eq!(pattern.pattern_at(Tuple4D::point( 0.0, 0.0, 0.0)),
        Color::white());
    assert_eq!(pattern.pattern_at(Tuple4D::point( 0.9, 0.0, 0.0)),
        Color::white());
    assert_eq!(pattern.pattern_at(Tuple4D::point( 1.0, 0.0, 0.0)),
        Color::black());
    assert_eq!(pattern.pattern_at(Tuple4D::point(-0.1, 0.0, 0.0)),
        Color::black());
    assert_eq!(pattern.pattern_at(Tuple4D::point(-1.0, 0.0, 0.0)),
        Color::black());
    assert_eq!(pattern.pattern_at(Tuple4D::point(-1.1, 0.0, 0.0)),
        Color::white());
}

#[test]
fn stripes_with_an_object_transformation() {
    let shape = Shape::sphere()
        .with_transform(Matrix4D::scaling(2.0, 2.0, 2.0)).unwrap();
    let pattern = Pattern::stripe(Color::white(), Color::black());

    let c = pattern.pattern_at_shape(&shape, Tuple4D::point(1.5, 0.0, 0.0));
    assert_eq!(c, Color::white());
}

#[test]
fn stripes_with_a_pattern_transformation() {
    let shape = Shape::sphere();
    let pattern = Pattern::stripe(Color::white(), Color::black())
        .with_transform(Matrix4D::scaling(2.0, 2.0, 2.0)).unwrap();

    let c = pattern.pattern_at_shape(&shape, Tuple4D::point(1.5, 0.0, 0.0));
    assert_eq!(c, Color::white());
}

#[test]
fn stripes_with_both_an_object_and_a_pattern_transformation() {
    let shape = Shape::sphere()
        .with_transform(Matrix4D::scaling(2.0, 2.0, 2.0)).unwrap();
    let pattern = Pattern::stripe(Color::white(), Color::black())
        .with_transform(Matrix4D::translation(0.5, 0.0, 0.0)).unwrap();

    let c = pattern.pattern_at_shape(&shape, Tuple4D::point(2.5, 0.0, 0.0));
    assert_eq!(c, Color::white());
}

#[test]
fn patterns_see_through_enclosing_groups() {
    let sphere = Shape::sphere()
        .with_transform(Matrix4D::translation(5.0, 0.0, 0.0)).unwrap();
    let g = Shape::group(vec![sphere])
        .with_transform(Matrix4D::scaling(2.0, 2.0, 2.0)).unwrap();
    let child = &g.children().unwrap()[0];
    let pattern = Pattern::stripe(Color::white(), Color::black());

    assert_eq!(pattern.pattern_at_shape(child, Tuple4D::point(11.0, 0.0, 0.0)),
        Color::white());
    assert_eq!(pattern.pattern_at_shape(child, Tuple4D::point(12.0, 0.0, 0.0)),
        Color::black());
}

#[test]
fn singular_pattern_transform_is_rejected() {
    let pattern = Pattern::ring(Color::white(), Color::black())
        .with_transform(Matrix4D::scaling(1.0, 0.0, 1.0));

    assert!(pattern.is_err());
}

#[test]
fn gradient_linearly_interpolates_between_colors() {
    let pattern = Pattern::gradient(Color::white(), Color::black());

    assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, 0.0, 0.0)),
        Color::white());
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.25, 0.0, 0.0)),
        Color::rgb(0.75, 0.75, 0.75));
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.5, 0.0, 0.0)),
        Color::rgb(0.5, 0.5, 0.5));
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.75, 0.0, 0.0)),
        Color::rgb(0.25, 0.25, 0.25));
}

#[test]
fn ring_extends_in_both_x_and_z() {
    let pattern = Pattern::ring(Color::white(), Color::black());

    assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, 0.0, 0.0)),
        Color::white());
    assert_eq!(pattern.pattern_at(Tuple4D::point(1.0, 0.0, 0.0)),
        Color::black());
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, 0.0, 1.0)),
        Color::black());
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.708, 0.0, 0.708)),
        Color::black());
}

#[test]
fn checkers_repeat_in_every_dimension() {
    let pattern = Pattern::checkers(Color::white(), Color::black());

    assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, 0.0, 0.0)),
        Color::white());
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.99, 0.0, 0.0)),
        Color::white());
    assert_eq!(pattern.pattern_at(Tuple4D::point(1.01, 0.0, 0.0)),
        Color::black());
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, 0.99, 0.0)),
        Color::white());
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, 1.01, 0.0)),
        Color::black());
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, 0.0, 0.99)),
        Color::white());
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, 0.0, 1.01)),
        Color::black());
}
