use crate::tuple::Tuple4D;
use crate::matrix::Matrix4D;
use crate::error::Result;

/// A ray with an origin point and a direction vector.
///
/// The direction is not required to be normalized; intersection times are
/// measured in multiples of its length.
///
/// Rays can only be built through `Ray4D::new`, so the origin is always a
/// point and the direction always a vector:
///
/// ```compile_fail
/// # use whitted_tracer::ray::Ray4D;
/// # use whitted_tracer::tuple::Tuple4D;
/// let r = Ray4D {
///     origin: Tuple4D::vector(0.0, 0.0, -5.0),
///     direction: Tuple4D::vector(0.0, 0.0, 1.0),
/// };
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray4D {
    origin: Tuple4D,
    direction: Tuple4D,
}

impl Ray4D {
    /// Creates a ray, checking that `origin` is a point and `direction` is a
    /// vector.
    ///
    /// ```
    /// # use whitted_tracer::ray::Ray4D;
    /// # use whitted_tracer::tuple::Tuple4D;
    /// let p = Tuple4D::point(1.0, 2.0, 3.0);
    /// let v = Tuple4D::vector(4.0, 5.0, 6.0);
    /// assert!(Ray4D::new(p, v).is_ok());
    /// assert!(Ray4D::new(v, v).is_err());
    /// ```
    pub fn new(origin: Tuple4D, direction: Tuple4D) -> Result<Ray4D> {
        Ok(Ray4D {
            origin: origin.require_point("ray origin")?,
            direction: direction.require_vector("ray direction")?,
        })
    }

    /// Builds a ray from parts already known to be a point and a vector:
    /// camera rays, shadow rays and secondary rays cast from a hit.
    pub(crate) fn from_parts(origin: Tuple4D, direction: Tuple4D) -> Ray4D {
        Ray4D { origin, direction }
    }

    pub fn origin(&self) -> Tuple4D {
        self.origin
    }

    pub fn direction(&self) -> Tuple4D {
        self.direction
    }

    /// The point at distance `t` along the ray.
    pub fn position(&self, t: f64) -> Tuple4D {
        self.origin + (t * self.direction)
    }

    pub fn transform(&self, m: Matrix4D) -> Ray4D {
        Ray4D::from_parts(m * self.origin, m * self.direction)
    }
}

#[test]
fn ray_position() {
    let r = Ray4D::new(
                Tuple4D::point(2.0, 3.0, 4.0),
                Tuple4D::vector(1.0, 0.0, 0.0)
            ).unwrap();

    assert_eq!(r.position(0.0), Tuple4D::point(2.0, 3.0, 4.0));
    assert_eq!(r.position(1.0), Tuple4D::point(3.0, 3.0, 4.0));
    assert_eq!(r.position(-1.0), Tuple4D::point(1.0, 3.0, 4.0));
    assert_eq!(r.position(2.5), Tuple4D::point(4.5, 3.0, 4.0));
}

#[test]
fn ray_rejects_wrong_tuple_kinds() {
    use crate::error::Error;

    let p = Tuple4D::point(1.0, 2.0, 3.0);
    let v = Tuple4D::vector(0.0, 1.0, 0.0);

    assert!(matches!(Ray4D::new(v, v), Err(Error::NotAPoint { .. })));
    assert!(matches!(Ray4D::new(p, p), Err(Error::NotAVector { .. })));
}

#[test]
fn ray_translation() {
    let r = Ray4D::new(
                Tuple4D::point(1.0, 2.0, 3.0),
                Tuple4D::vector(0.0, 1.0, 0.0)
            ).unwrap();
    let t = r.transform(Matrix4D::translation(3.0, 4.0, 5.0));

    assert_eq!(t.origin(), Tuple4D::point(4.0, 6.0, 8.0));
    assert_eq!(t.direction(), Tuple4D::vector(0.0, 1.0, 0.0));
}

#[test]
fn ray_scaling() {
    let r = Ray4D::new(
                Tuple4D::point(1.0, 2.0, 3.0),
                Tuple4D::vector(0.0, 1.0, 0.0)
            ).unwrap();
    let t = r.transform(Matrix4D::scaling(2.0, 3.0, 4.0));

    assert_eq!(t.origin(), Tuple4D::point(2.0, 6.0, 12.0));
    assert_eq!(t.direction(), Tuple4D::vector(0.0, 3.0, 0.0));
}

#[test]
fn ray_accessors_return_checked_parts() {
    let r = Ray4D::new(
                Tuple4D::point(0.0, 0.0, -5.0),
                Tuple4D::vector(0.0, 0.0, 1.0)
            ).unwrap();

    assert!(r.origin().is_point());
    assert!(r.direction().is_vector());
    assert_eq!(r.origin(), Tuple4D::point(0.0, 0.0, -5.0));
}
