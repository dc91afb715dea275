use std::f64::{ INFINITY, NEG_INFINITY };

use crate::tuple::Tuple4D;
use crate::matrix::Matrix4D;
use crate::ray::Ray4D;
use crate::error::{ Error, Result };

/// An axis-aligned bounding box.
///
/// Composite shapes keep one of these around to skip testing their children
/// against rays which cannot possibly hit them. Extents may be infinite (a
/// plane is unbounded along X and Z). The empty box has a minimum of `+inf`
/// and a maximum of `-inf` on every axis, and no ray ever intersects it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds {
    pub minimum: Tuple4D,
    pub maximum: Tuple4D,
}

impl Default for Bounds {
    fn default() -> Bounds {
        Bounds::empty()
    }
}

impl Bounds {
    /// Creates a bounding box from two corner points.
    ///
    /// Both corners must be points, and `minimum` may not exceed `maximum`
    /// along any axis.
    pub fn new(minimum: Tuple4D, maximum: Tuple4D) -> Result<Bounds> {
        let minimum = minimum.require_point("bounds minimum")?;
        let maximum = maximum.require_point("bounds maximum")?;

        if minimum.x > maximum.x || minimum.y > maximum.y
            || minimum.z > maximum.z {
            return Err(Error::InvalidBounds { min: minimum, max: maximum });
        }

        Ok(Bounds { minimum, maximum })
    }

    /// Creates a bounding box from raw extents, for callers which already
    /// know that the extents are ordered.
    pub(crate) fn from_extents(min: [f64; 3], max: [f64; 3]) -> Bounds {
        Bounds {
            minimum: Tuple4D::point(min[0], min[1], min[2]),
            maximum: Tuple4D::point(max[0], max[1], max[2]),
        }
    }

    /// The empty bounding box, which contains nothing.
    pub fn empty() -> Bounds {
        Bounds::from_extents([INFINITY; 3], [NEG_INFINITY; 3])
    }

    /// True if this box encloses no points at all.
    pub fn is_empty(&self) -> bool {
        self.minimum.x > self.maximum.x
            || self.minimum.y > self.maximum.y
            || self.minimum.z > self.maximum.z
    }

    /// Grows the box so that it contains `p`.
    pub fn add_point(&mut self, p: Tuple4D) {
        self.minimum.x = self.minimum.x.min(p.x);
        self.minimum.y = self.minimum.y.min(p.y);
        self.minimum.z = self.minimum.z.min(p.z);
        self.maximum.x = self.maximum.x.max(p.x);
        self.maximum.y = self.maximum.y.max(p.y);
        self.maximum.z = self.maximum.z.max(p.z);
    }

    /// The smallest box containing both `self` and `other`.
    pub fn union(&self, other: &Bounds) -> Bounds {
        if other.is_empty() {
            return *self;
        }

        let mut merged = *self;
        merged.add_point(other.minimum);
        merged.add_point(other.maximum);

        merged
    }

    pub fn contains_point(&self, p: Tuple4D) -> bool {
        (self.minimum.x..=self.maximum.x).contains(&p.x)
            && (self.minimum.y..=self.maximum.y).contains(&p.y)
            && (self.minimum.z..=self.maximum.z).contains(&p.z)
    }

    /// Transforms the box by `m`, returning the axis-aligned box which
    /// encloses all eight transformed corners.
    ///
    /// Infinite extents are carried through explicitly. A matrix entry of zero
    /// contributes nothing, even against an infinite coordinate, and a
    /// coordinate that still comes out as NaN (opposite infinities summed)
    /// widens the box to infinity along that axis.
    pub fn transform(&self, m: &Matrix4D) -> Bounds {
        if self.is_empty() {
            return *self;
        }

        let (lo, hi) = (self.minimum, self.maximum);
        let corners = [
            [lo.x, lo.y, lo.z], [lo.x, lo.y, hi.z],
            [lo.x, hi.y, lo.z], [lo.x, hi.y, hi.z],
            [hi.x, lo.y, lo.z], [hi.x, lo.y, hi.z],
            [hi.x, hi.y, lo.z], [hi.x, hi.y, hi.z],
        ];

        let mut min = [INFINITY; 3];
        let mut max = [NEG_INFINITY; 3];
        for corner in corners.iter() {
            for axis in 0..3 {
                let value = Self::transform_coordinate(m, axis, corner);
                if value.is_nan() {
                    min[axis] = NEG_INFINITY;
                    max[axis] = INFINITY;
                } else {
                    min[axis] = min[axis].min(value);
                    max[axis] = max[axis].max(value);
                }
            }
        }

        Bounds::from_extents(min, max)
    }

    /// Computes row `axis` of `m * corner` for a point, skipping zero entries.
    fn transform_coordinate(m: &Matrix4D, axis: usize, corner: &[f64; 3])
        -> f64 {
        let mut sum = m[(axis, 3)];
        for (c, value) in corner.iter().enumerate() {
            let factor = m[(axis, c)];
            if factor != 0.0 {
                sum += factor * value;
            }
        }

        sum
    }

    /// Tests whether a ray passes through the box, using the slab method.
    pub fn intersects(&self, ray: &Ray4D) -> bool {
        if self.is_empty() {
            return false;
        }

        let (xtmin, xtmax) = Self::check_axis(
            self.minimum.x, self.maximum.x, ray.origin().x, ray.direction().x
        );
        let (ytmin, ytmax) = Self::check_axis(
            self.minimum.y, self.maximum.y, ray.origin().y, ray.direction().y
        );
        let (ztmin, ztmax) = Self::check_axis(
            self.minimum.z, self.maximum.z, ray.origin().z, ray.direction().z
        );

        let tmin = xtmin.max(ytmin).max(ztmin);
        let tmax = xtmax.min(ytmax).min(ztmax);

        tmin <= tmax
    }

    /// Gets the entry and exit offsets of a ray along one axis of a slab
    /// bounded by `min` and `max`.
    ///
    /// The smaller offset is returned first. A zero direction component
    /// divides out to a signed infinity, so a ray parallel to the slab is
    /// either always inside it or never. `f64::max`/`f64::min` ignore a NaN
    /// offset (origin exactly on the slab wall), leaving the other axes to
    /// decide.
    pub fn check_axis(min: f64, max: f64, origin: f64, direction: f64)
        -> (f64, f64) {
        let tmin = (min - origin) / direction;
        let tmax = (max - origin) / direction;

        if tmin > tmax {
            (tmax, tmin)
        } else {
            (tmin, tmax)
        }
    }
}

#[cfg(test)]
fn ray(origin: Tuple4D, direction: Tuple4D) -> Ray4D {
    Ray4D::new(origin, direction).unwrap()
}

#[test]
fn bounds_reject_misordered_corners() {
    let lo = Tuple4D::point(-1.0, -1.0, -1.0);
    let hi = Tuple4D::point(1.0, 1.0, 1.0);

    assert!(Bounds::new(lo, hi).is_ok());
    assert!(matches!(Bounds::new(hi, lo), Err(Error::InvalidBounds { .. })));
    assert!(Bounds::new(Tuple4D::vector(0.0, 0.0, 0.0), hi).is_err());
}

#[test]
fn adding_points_to_empty_bounds() {
    let mut b = Bounds::empty();
    assert!(b.is_empty());

    b.add_point(Tuple4D::point(-5.0, 2.0, 0.0));
    b.add_point(Tuple4D::point(7.0, 0.0, -3.0));

    assert!(!b.is_empty());
    assert_eq!(b.minimum, Tuple4D::point(-5.0, 0.0, -3.0));
    assert_eq!(b.maximum, Tuple4D::point(7.0, 2.0, 0.0));
}

#[test]
fn union_of_two_bounds() {
    let b1 = Bounds::from_extents([-5.0, -2.0, 0.0], [7.0, 4.0, 4.0]);
    let b2 = Bounds::from_extents([8.0, -7.0, -2.0], [14.0, 2.0, 8.0]);
    let u = b1.union(&b2);

    assert_eq!(u.minimum, Tuple4D::point(-5.0, -7.0, -2.0));
    assert_eq!(u.maximum, Tuple4D::point(14.0, 4.0, 8.0));
    assert_eq!(Bounds::empty().union(&b1), b1);
    assert_eq!(b1.union(&Bounds::empty()), b1);
    assert!(Bounds::empty().union(&Bounds::empty()).is_empty());
}

#[test]
fn transforming_bounds() {
    let b = Bounds::from_extents([-1.0; 3], [1.0; 3]);
    let m = Matrix4D::rotation_x(std::f64::consts::PI / 4.0)
        * Matrix4D::rotation_y(std::f64::consts::PI / 4.0);
    let t = b.transform(&m);

    assert_eq!(t.minimum, Tuple4D::point(-1.414214, -1.707107, -1.707107));
    assert_eq!(t.maximum, Tuple4D::point(1.414214, 1.707107, 1.707107));
}

#[test]
fn transforming_unbounded_extents_never_yields_nan() {
    let plane = Bounds::from_extents(
        [NEG_INFINITY, 0.0, NEG_INFINITY],
        [INFINITY, 0.0, INFINITY]
    );

    let same = plane.transform(&Matrix4D::identity());
    assert_eq!(same.minimum.y, 0.0);
    assert_eq!(same.maximum.y, 0.0);
    assert_eq!(same.minimum.x, NEG_INFINITY);
    assert_eq!(same.maximum.z, INFINITY);

    let tilted = plane.transform(
        &Matrix4D::rotation_z(std::f64::consts::PI / 4.0)
    );
    for v in [tilted.minimum, tilted.maximum].iter() {
        assert!(!v.x.is_nan() && !v.y.is_nan() && !v.z.is_nan());
    }
    assert_eq!(tilted.minimum.y, NEG_INFINITY);
    assert_eq!(tilted.maximum.y, INFINITY);
}

#[test]
fn ray_against_bounds() {
    let b = Bounds::from_extents([5.0, -2.0, 0.0], [11.0, 4.0, 7.0]);

    let hits = [
        (Tuple4D::point(15.0, 1.0, 2.0), Tuple4D::vector(-1.0, 0.0, 0.0)),
        (Tuple4D::point(-5.0, -1.0, 4.0), Tuple4D::vector(1.0, 0.0, 0.0)),
        (Tuple4D::point(7.0, 6.0, 5.0), Tuple4D::vector(0.0, -1.0, 0.0)),
        (Tuple4D::point(9.0, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0)),
        (Tuple4D::point(8.0, 2.0, 12.0), Tuple4D::vector(0.0, 0.0, -1.0)),
        (Tuple4D::point(8.0, 1.0, 3.5), Tuple4D::vector(0.0, 0.0, 1.0)),
    ];
    for (o, d) in hits.iter() {
        assert!(b.intersects(&ray(*o, *d)));
    }

    let misses = [
        (Tuple4D::point(9.0, -1.0, -8.0), Tuple4D::vector(2.0, 4.0, 6.0)),
        (Tuple4D::point(8.0, 3.0, -4.0), Tuple4D::vector(6.0, 2.0, 4.0)),
        (Tuple4D::point(12.0, 5.0, 4.0), Tuple4D::vector(0.0, 0.0, -1.0)),
    ];
    for (o, d) in misses.iter() {
        assert!(!b.intersects(&ray(*o, d.normalize())));
    }
}

#[test]
fn empty_bounds_are_never_hit() {
    let r = ray(Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0));

    assert!(!Bounds::empty().intersects(&r));
}

#[test]
fn tiny_direction_components_still_cross_the_slab() {
    let (tmin, tmax) = Bounds::check_axis(-1.0, 1.0, 0.0, 1e-7);
    assert!(crate::feq(tmin / 1e7, -1.0) && crate::feq(tmax / 1e7, 1.0));

    let (tmin, tmax) = Bounds::check_axis(-1.0, 1.0, -5.0, -1e-7);
    assert!(tmin.is_finite() && tmax.is_finite() && tmax < 0.0);

    // A ray moving along the box's diagonal with a direction shorter than
    // EPSILON on every axis.
    let b = Bounds::from_extents([-1.0; 3], [1.0; 3]);
    let k = 2.0f64.sqrt() / 2.0 * 1e-6;
    let r = ray(Tuple4D::point(-5.0, 5.0, 0.0), Tuple4D::vector(k, -k, 0.0));
    assert!(b.intersects(&r));
}

#[test]
fn parallel_rays_outside_a_slab_miss() {
    let b = Bounds::from_extents([-1.0; 3], [1.0; 3]);
    let r = ray(Tuple4D::point(2.0, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0));
    assert!(!b.intersects(&r));

    let r = ray(Tuple4D::point(0.5, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0));
    assert!(b.intersects(&r));
}

#[test]
fn point_containment() {
    let b = Bounds::from_extents([5.0, -2.0, 0.0], [11.0, 4.0, 7.0]);

    assert!(b.contains_point(Tuple4D::point(5.0, -2.0, 0.0)));
    assert!(b.contains_point(Tuple4D::point(8.0, 1.0, 3.0)));
    assert!(!b.contains_point(Tuple4D::point(3.0, 0.0, 3.0)));
    assert!(!b.contains_point(Tuple4D::point(8.0, 1.0, 8.0)));
    assert!(!Bounds::empty().contains_point(Tuple4D::point(0.0, 0.0, 0.0)));
}
