use std::f64::{ INFINITY, NEG_INFINITY };

use crate::consts::{ EPSILON, GLASS_RI };
use crate::tuple::Tuple4D;
use crate::ray::Ray4D;
use crate::light::Material;
use crate::matrix::Matrix4D;
use crate::bounds::Bounds;
use crate::intersect::{
    Intersection, Intersections, CsgOperation, filter_intersections
};
use crate::error::{ Error, Result };

/// The vertices of a triangle, along with precomputed edges and a normal.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TriangleInfo {
    pub p1: Tuple4D,
    pub p2: Tuple4D,
    pub p3: Tuple4D,

    /// The edge from `p1` to `p2`.
    pub e1: Tuple4D,

    /// The edge from `p1` to `p3`.
    pub e2: Tuple4D,

    pub normal: Tuple4D,
}

impl TriangleInfo {
    pub fn new(p1: Tuple4D, p2: Tuple4D, p3: Tuple4D) -> Result<TriangleInfo> {
        let p1 = p1.require_point("triangle vertex")?;
        let p2 = p2.require_point("triangle vertex")?;
        let p3 = p3.require_point("triangle vertex")?;

        let e1 = p2 - p1;
        let e2 = p3 - p1;
        let normal = e2.cross(&e1).normalize();

        Ok(TriangleInfo { p1, p2, p3, e1, e2, normal })
    }

    fn bounds(&self) -> Bounds {
        let mut bounds = Bounds::empty();
        bounds.add_point(self.p1);
        bounds.add_point(self.p2);
        bounds.add_point(self.p3);

        bounds
    }
}

/// A triangle with a normal at each vertex.
///
/// Normals are blended across the face using the barycentric coordinates of
/// each hit, which makes meshes look smooth without more triangles.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SmoothTriangleInfo {
    pub triangle_info: TriangleInfo,
    pub n1: Tuple4D,
    pub n2: Tuple4D,
    pub n3: Tuple4D,
}

impl SmoothTriangleInfo {
    pub fn new(p1: Tuple4D, p2: Tuple4D, p3: Tuple4D,
        n1: Tuple4D, n2: Tuple4D, n3: Tuple4D) -> Result<SmoothTriangleInfo> {
        Ok(SmoothTriangleInfo {
            triangle_info: TriangleInfo::new(p1, p2, p3)?,
            n1: n1.require_vector("triangle vertex normal")?,
            n2: n2.require_vector("triangle vertex normal")?,
            n3: n3.require_vector("triangle vertex normal")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShapeType {
    /// A unit sphere with its center at the object-space origin.
    Sphere,

    /// The XZ plane, with a normal pointing up along the Y axis.
    Plane,

    /// A 2-by-2-by-2 cube with its center at the object-space origin.
    Cube,

    /// A unit-radius cylinder around the Y axis. Minimum Y, maximum Y and
    /// whether the cylinder is closed.
    Cylinder(f64, f64, bool),

    /// A double-napped cone around the Y axis. Minimum Y, maximum Y and
    /// whether the cone is closed.
    Cone(f64, f64, bool),

    /// A triangle. See TriangleInfo for further explanation.
    Triangle(TriangleInfo),

    /// A smooth triangle. See SmoothTriangleInfo for further explanation.
    SmoothTriangle(SmoothTriangleInfo),

    /// A group of shapes. Can include other groups of shapes.
    Group(Vec<Shape>),

    /// A boolean combination of two shapes.
    Csg(CsgOperation, Box<Shape>, Box<Shape>),
}

/// A shape in a scene.
///
/// Shapes are built once and never change afterwards. Transforms and
/// materials are applied with the consuming `with_transform` and
/// `with_material` builders, and containers (groups and CSG operations) take
/// ownership of their children when they are constructed.
///
/// Every shape caches the inverse of its own transform and its *world*
/// inverse: the inverse of its own transform composed with the inverses of all
/// of its ancestors. A container pushes its world inverse down to its children
/// whenever it is built or transformed, so a shape nested in groups can convert
/// between world and object space without walking up the tree.
#[derive(Debug, Clone)]
pub struct Shape {
    ty: ShapeType,
    material: Material,
    transform: Matrix4D,

    inverse: Matrix4D,
    world_inverse: Matrix4D,
    world_normal: Matrix4D,
    bounds: Bounds,
}

/// Checks that two Shapes are equal.
///
/// Cached matrices are not compared; they follow from the transform and the
/// position of the shape in its tree.
impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        self.ty == other.ty
            && self.transform == other.transform
            && self.material == other.material
    }
}

impl Shape {
    fn with_type(ty: ShapeType) -> Shape {
        let bounds = match ty {
            ShapeType::Sphere | ShapeType::Cube
                => Bounds::from_extents([-1.0; 3], [1.0; 3]),
            ShapeType::Plane
                => Bounds::from_extents(
                    [NEG_INFINITY, 0.0, NEG_INFINITY],
                    [INFINITY, 0.0, INFINITY]
                ),
            ShapeType::Cylinder(min, max, _)
                => Bounds::from_extents([-1.0, min, -1.0], [1.0, max, 1.0]),
            ShapeType::Cone(min, max, _) => {
                let e = min.abs().max(max.abs());
                Bounds::from_extents([-e, min, -e], [e, max, e])
            },
            ShapeType::Triangle(ref ti) => ti.bounds(),
            ShapeType::SmoothTriangle(ref sti) => sti.triangle_info.bounds(),
            ShapeType::Group(ref children) => children.iter().fold(
                Bounds::empty(), |b, child| b.union(&child.bounding_box())
            ),
            ShapeType::Csg(_, ref left, ref right)
                => left.bounding_box().union(&right.bounding_box()),
        };

        let mut shape = Shape {
            ty,
            material: Default::default(),
            transform: Matrix4D::identity(),
            inverse: Matrix4D::identity(),
            world_inverse: Matrix4D::identity(),
            world_normal: Matrix4D::identity(),
            bounds,
        };

        shape.propagate_world_inverse();
        shape
    }

    /// Creates a unit sphere with identity transform and default material.
    pub fn sphere() -> Shape {
        Shape::with_type(ShapeType::Sphere)
    }

    /// Creates a glassy unit sphere, mostly for refraction tests.
    pub fn glass_sphere() -> Shape {
        let mut sphere = Shape::sphere();
        sphere.material.transparency = 1.0;
        sphere.material.refractive_index = GLASS_RI;

        sphere
    }

    /// Creates a plane with a normal pointing up along the Y axis.
    pub fn plane() -> Shape {
        Shape::with_type(ShapeType::Plane)
    }

    /// Creates a cube spanning -1 to 1 along each axis.
    pub fn cube() -> Shape {
        Shape::with_type(ShapeType::Cube)
    }

    /// Creates an infinitely long cylinder with no end caps.
    pub fn cylinder() -> Shape {
        Shape::with_type(ShapeType::Cylinder(NEG_INFINITY, INFINITY, false))
    }

    /// Creates a cylinder truncated to `minimum < y < maximum`.
    ///
    /// Fails if `closed` is requested for a cylinder that is still infinite
    /// at either end.
    pub fn truncated_cylinder(minimum: f64, maximum: f64, closed: bool)
        -> Result<Shape> {
        Self::check_truncation("cylinder", minimum, maximum, closed)?;
        Ok(Shape::with_type(ShapeType::Cylinder(minimum, maximum, closed)))
    }

    /// Creates an infinite double-napped cone with no end caps.
    pub fn cone() -> Shape {
        Shape::with_type(ShapeType::Cone(NEG_INFINITY, INFINITY, false))
    }

    /// Creates a double-napped cone truncated to `minimum < y < maximum`.
    ///
    /// ```
    /// # use whitted_tracer::shape::Shape;
    /// assert!(Shape::truncated_cone(-1.0, 1.0, true).is_ok());
    /// assert!(Shape::truncated_cone(-1.0, std::f64::INFINITY, true).is_err());
    /// ```
    pub fn truncated_cone(minimum: f64, maximum: f64, closed: bool)
        -> Result<Shape> {
        Self::check_truncation("cone", minimum, maximum, closed)?;
        Ok(Shape::with_type(ShapeType::Cone(minimum, maximum, closed)))
    }

    fn check_truncation(shape: &'static str, minimum: f64, maximum: f64,
        closed: bool) -> Result<()> {
        if closed && (minimum.is_infinite() || maximum.is_infinite()) {
            return Err(Error::InfiniteClosed { shape });
        }

        if minimum > maximum {
            return Err(Error::InvalidBounds {
                min: Tuple4D::point(0.0, minimum, 0.0),
                max: Tuple4D::point(0.0, maximum, 0.0),
            });
        }

        Ok(())
    }

    /// Creates a triangle, defined by three points in space.
    pub fn triangle(p1: Tuple4D, p2: Tuple4D, p3: Tuple4D) -> Result<Shape> {
        let info = TriangleInfo::new(p1, p2, p3)?;
        Ok(Shape::with_type(ShapeType::Triangle(info)))
    }

    /// Creates a "smooth" triangle with normals at each vertex.
    pub fn smooth_triangle(p1: Tuple4D, p2: Tuple4D, p3: Tuple4D,
        n1: Tuple4D, n2: Tuple4D, n3: Tuple4D) -> Result<Shape> {
        let info = SmoothTriangleInfo::new(p1, p2, p3, n1, n2, n3)?;
        Ok(Shape::with_type(ShapeType::SmoothTriangle(info)))
    }

    /// Creates a group from a list of shapes (possibly groups).
    ///
    /// The group's bounding box is computed here, once, from its children.
    pub fn group(children: Vec<Shape>) -> Shape {
        Shape::with_type(ShapeType::Group(children))
    }

    /// Creates a CSG operation combining two shapes.
    pub fn csg(operation: CsgOperation, left: Shape, right: Shape) -> Shape {
        Shape::with_type(
            ShapeType::Csg(operation, Box::new(left), Box::new(right))
        )
    }

    /// Replaces the transform of this shape.
    ///
    /// Fails if the transform cannot be inverted. Containers pass the new
    /// world inverse down to their children.
    pub fn with_transform(self, transform: Matrix4D) -> Result<Shape> {
        let inverse = transform.inverse()?;
        Ok(self.with_known_transform(transform, inverse))
    }

    /// Replaces the transform of this shape with one whose inverse is already
    /// known, as for the fixed fixtures of the default world.
    pub(crate) fn with_known_transform(mut self, transform: Matrix4D,
        inverse: Matrix4D) -> Shape {
        self.transform = transform;
        self.inverse = inverse;
        self.world_inverse = inverse;
        self.world_normal = self.world_inverse.transposition();
        self.propagate_world_inverse();

        self
    }

    /// Replaces the material of this shape, after validating it.
    ///
    /// Groups and CSG operations are never shaded themselves; their material
    /// is handed down to every shape inside them.
    pub fn with_material(self, material: Material) -> Result<Shape> {
        material.validate()?;
        Ok(self.with_known_material(material))
    }

    pub(crate) fn with_known_material(mut self, material: Material) -> Shape {
        self.set_material(material);
        self
    }

    fn set_material(&mut self, material: Material) {
        self.material = material;

        match self.ty {
            ShapeType::Group(ref mut children) => {
                for child in children.iter_mut() {
                    child.set_material(material);
                }
            },
            ShapeType::Csg(_, ref mut left, ref mut right) => {
                left.set_material(material);
                right.set_material(material);
            },
            _ => (),
        }
    }

    /// Recomputes the world inverse of this shape under a new parent.
    fn set_parent_inverse(&mut self, parent_world_inverse: Matrix4D) {
        self.world_inverse = self.inverse * parent_world_inverse;
        self.world_normal = self.world_inverse.transposition();
        self.propagate_world_inverse();
    }

    fn propagate_world_inverse(&mut self) {
        let world_inverse = self.world_inverse;

        match self.ty {
            ShapeType::Group(ref mut children) => {
                for child in children.iter_mut() {
                    child.set_parent_inverse(world_inverse);
                }
            },
            ShapeType::Csg(_, ref mut left, ref mut right) => {
                left.set_parent_inverse(world_inverse);
                right.set_parent_inverse(world_inverse);
            },
            _ => (),
        }
    }

    pub fn shape_type(&self) -> &ShapeType {
        &self.ty
    }

    /// Returns a reference to this Shape's material.
    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Returns a reference to the Shape transform.
    pub fn transform(&self) -> &Matrix4D {
        &self.transform
    }

    /// Returns a list of child `Shape`s if this is a group.
    pub fn children(&self) -> Option<&[Shape]> {
        if let ShapeType::Group(ref children) = self.ty {
            Some(children)
        } else {
            None
        }
    }

    /// Gets the left operand of a CSG operation.
    pub fn csg_left(&self) -> Option<&Shape> {
        if let ShapeType::Csg(_, ref left, _) = self.ty {
            Some(left)
        } else {
            None
        }
    }

    /// Gets the right operand of a CSG operation.
    pub fn csg_right(&self) -> Option<&Shape> {
        if let ShapeType::Csg(_, _, ref right) = self.ty {
            Some(right)
        } else {
            None
        }
    }

    /// Returns a ref. to `TriangleInfo` if this is a triangle.
    pub fn triangle_info(&self) -> Option<&TriangleInfo> {
        if let ShapeType::Triangle(ref info) = self.ty {
            Some(info)
        } else {
            None
        }
    }

    /// Returns a ref. to `SmoothTriangleInfo` if this is a smooth triangle.
    pub fn smooth_triangle_info(&self) -> Option<&SmoothTriangleInfo> {
        if let ShapeType::SmoothTriangle(ref smooth_info) = self.ty {
            Some(smooth_info)
        } else {
            None
        }
    }

    /// Deduces whether a shape includes another shape.
    ///
    /// Shapes are compared by identity, not by value; two identical spheres in
    /// different places of a scene are different shapes. A container includes
    /// itself and everything inside of it.
    pub fn includes(&self, other: &Shape) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }

        match self.ty {
            ShapeType::Group(ref children)
                => children.iter().any(|c| c.includes(other)),
            ShapeType::Csg(_, ref left, ref right)
                => left.includes(other) || right.includes(other),
            _ => false,
        }
    }

    /// The bounding box of this shape in object space.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// The bounding box of this shape in its parent's space.
    pub fn bounding_box(&self) -> Bounds {
        self.bounds.transform(&self.transform)
    }

    /// Converts a point from world to object space, through every enclosing
    /// group.
    pub fn world_to_object(&self, point: Tuple4D) -> Tuple4D {
        self.world_inverse * point
    }

    /// Converts a normal from object to world space, through every enclosing
    /// group. The result is normalized.
    ///
    /// A degenerate normal (the tip of a cone) stays a zero vector.
    pub fn normal_to_world(&self, normal: Tuple4D) -> Tuple4D {
        let mut normal = self.world_normal * normal;
        normal.w = 0.0;

        if normal.magnitude() == 0.0 {
            normal
        } else {
            normal.normalize()
        }
    }

    /// Intersects a ray with a `Shape`.
    ///
    /// The ray is converted into object space with the inverse of this shape's
    /// transform before `local_intersect` runs. Rays handed to containers are
    /// already in the container's space, so every child applies only its own
    /// transform.
    pub fn intersect(&self, ray: &Ray4D) -> Intersections {
        self.local_intersect(&ray.transform(self.inverse))
    }

    /// Computes the world-space normal at a world-space point on this shape.
    ///
    /// `hit` is required for smooth triangles, whose normal depends on where
    /// the triangle was struck.
    ///
    /// # Panics
    ///
    /// Panics when called on a group or CSG operation, which have no surface
    /// of their own, or on a smooth triangle without a `hit` carrying u/v.
    pub fn normal_at(&self, world_point: Tuple4D, hit: Option<&Intersection>)
        -> Tuple4D {
        let local_point = self.world_to_object(world_point);
        let local_normal = self.local_normal_at(&local_point, hit);
        self.normal_to_world(local_normal)
    }

    /// Intersect a ray with a Shape, in object space.
    pub fn local_intersect(&self, ray: &Ray4D) -> Intersections {
        match self.ty {
            ShapeType::Sphere => self.intersect_sphere(ray),
            ShapeType::Plane => self.intersect_plane(ray),
            ShapeType::Cube => self.intersect_cube(ray),
            ShapeType::Cylinder(min, max, closed)
                => self.intersect_cylinder(ray, min, max, closed),
            ShapeType::Cone(min, max, closed)
                => self.intersect_cone(ray, min, max, closed),
            ShapeType::Triangle(ref ti) => self.intersect_triangle(ray, ti),
            ShapeType::SmoothTriangle(ref sti)
                => self.intersect_triangle(ray, &sti.triangle_info),
            ShapeType::Group(ref children)
                => self.intersect_group(ray, children),
            ShapeType::Csg(op, ref left, ref right) => {
                let all = Intersections::aggregate(
                    vec![left.intersect(ray), right.intersect(ray)]
                );

                filter_intersections(op, left, all)
            },
        }
    }

    /// Obtain the normal vector of a Shape at a point, in object space.
    pub fn local_normal_at(&self, at: &Tuple4D, hit: Option<&Intersection>)
        -> Tuple4D {
        match self.ty {
            ShapeType::Sphere => Tuple4D { w: 0.0, ..*at },
            ShapeType::Plane => Tuple4D::vector(0.0, 1.0, 0.0),
            ShapeType::Cube => Self::normal_at_cube(at),
            ShapeType::Cylinder(min, max, _)
                => Self::normal_at_cylinder(at, min, max),
            ShapeType::Cone(min, max, _) => Self::normal_at_cone(at, min, max),
            ShapeType::Triangle(ref ti) => ti.normal,
            ShapeType::SmoothTriangle(ref sti) => {
                let (u, v) = hit.and_then(|i| i.uv).unwrap_or_else(||
                    panic!("hit.u and hit.v must be non-null")
                );

                sti.n2 * u + sti.n3 * v + sti.n1 * (1.0 - u - v)
            },
            ShapeType::Group(_) => panic!(
                "Local normal calculations should never occur on groups."
            ),

            // CSG operations always defer intersections to their children
            // objects, so no normals will ever be calculated on CSGs.
            ShapeType::Csg(..) => panic!(
                "Local normal calculations should never occur on CSG ops."
            ),
        }
    }

    /// Checks whether a ray intersects a Sphere.
    ///
    /// A tangent ray produces two equal intersections.
    fn intersect_sphere(&self, ray: &Ray4D) -> Intersections {
        // Subtracting a point removes the 'w' part of the ray origin.
        let sphere_to_ray = ray.origin() - Tuple4D::point(0.0, 0.0, 0.0);

        let a = ray.direction().dot(&ray.direction());
        let b = 2.0 * ray.direction().dot(&sphere_to_ray);
        let c = sphere_to_ray.dot(&sphere_to_ray) - 1.0;

        let discriminant = b.powi(2) - (4.0 * a * c);

        if discriminant < 0.0 {
            return Intersections::empty()
        }

        let t1 = (-b - discriminant.sqrt()) / (2.0 * a);
        let t2 = (-b + discriminant.sqrt()) / (2.0 * a);

        Intersections::new(vec![
            Intersection::new(t1, self),
            Intersection::new(t2, self),
        ])
    }

    fn intersect_plane(&self, ray: &Ray4D) -> Intersections {
        // In local space, without a Y component, the ray won't intersect.
        if ray.direction().y.abs() < EPSILON {
            return Intersections::empty();
        }

        let t = -ray.origin().y / ray.direction().y;
        Intersections::new(vec![Intersection::new(t, self)])
    }

    fn intersect_cube(&self, ray: &Ray4D) -> Intersections {
        let (xtmin, xtmax)
            = Bounds::check_axis(-1.0, 1.0, ray.origin().x, ray.direction().x);
        let (ytmin, ytmax)
            = Bounds::check_axis(-1.0, 1.0, ray.origin().y, ray.direction().y);
        let (ztmin, ztmax)
            = Bounds::check_axis(-1.0, 1.0, ray.origin().z, ray.direction().z);

        let tmin = xtmin.max(ytmin).max(ztmin);
        let tmax = xtmax.min(ytmax).min(ztmax);

        if tmin > tmax {
            return Intersections::empty()
        }

        Intersections::new(vec![
            Intersection::new(tmin, self),
            Intersection::new(tmax, self),
        ])
    }

    fn normal_at_cube(p: &Tuple4D) -> Tuple4D {
        let xa = p.x.abs();
        let ya = p.y.abs();
        let za = p.z.abs();

        let max_component = xa.max(ya).max(za);
        if max_component == xa {
            Tuple4D::vector(p.x, 0.0, 0.0)
        } else if max_component == ya {
            Tuple4D::vector(0.0, p.y, 0.0)
        } else {
            Tuple4D::vector(0.0, 0.0, p.z)
        }
    }

    fn intersect_cylinder(&self, ray: &Ray4D, minimum: f64, maximum: f64,
        closed: bool) -> Intersections {
        let mut xs = Vec::new();

        let a = ray.direction().x.powi(2) + ray.direction().z.powi(2);

        // A ray parallel to the Y axis can only strike the caps.
        if a >= EPSILON {
            let b = 2.0 * ray.origin().x * ray.direction().x
                  + 2.0 * ray.origin().z * ray.direction().z;
            let c = ray.origin().x.powi(2) + ray.origin().z.powi(2) - 1.0;

            let disc = b.powi(2) - 4.0 * a * c;
            if disc >= 0.0 {
                let t0 = (-b - disc.sqrt()) / (2.0 * a);
                let t1 = (-b + disc.sqrt()) / (2.0 * a);

                self.push_within(&mut xs, ray, t0, minimum, maximum);
                self.push_within(&mut xs, ray, t1, minimum, maximum);
            }
        }

        if closed {
            self.intersect_caps(&mut xs, ray, minimum, maximum, |_| 1.0);
        }

        Intersections::new(xs)
    }

    fn normal_at_cylinder(at: &Tuple4D, minimum: f64, maximum: f64)
        -> Tuple4D {
        // The square of the distance from the y axis.
        let dist = at.x.powi(2) + at.z.powi(2);

        if dist < 1.0 && at.y >= maximum - EPSILON {
            Tuple4D::vector(0.0, 1.0, 0.0)
        } else if dist < 1.0 && at.y <= minimum + EPSILON {
            Tuple4D::vector(0.0, -1.0, 0.0)
        } else {
            Tuple4D::vector(at.x, 0.0, at.z)
        }
    }

    fn intersect_cone(&self, ray: &Ray4D, minimum: f64, maximum: f64,
        closed: bool) -> Intersections {
        let mut xs = Vec::new();

        let a = ray.direction().x.powi(2)
              - ray.direction().y.powi(2)
              + ray.direction().z.powi(2);

        let b = 2.0 * ray.origin().x * ray.direction().x
              - 2.0 * ray.origin().y * ray.direction().y
              + 2.0 * ray.origin().z * ray.direction().z;

        let c = ray.origin().x.powi(2)
              - ray.origin().y.powi(2)
              + ray.origin().z.powi(2);

        if a.abs() < EPSILON {
            // Parallel to one of the cone's halves: a single intersection,
            // unless the ray misses entirely (both a and b are 0).
            if b.abs() >= EPSILON {
                let t = -c / (2.0 * b);
                self.push_within(&mut xs, ray, t, minimum, maximum);
            }
        } else {
            let disc = b.powi(2) - 4.0 * a * c;
            if disc >= 0.0 {
                let t0 = (-b - disc.sqrt()) / (2.0 * a);
                let t1 = (-b + disc.sqrt()) / (2.0 * a);

                self.push_within(&mut xs, ray, t0, minimum, maximum);
                self.push_within(&mut xs, ray, t1, minimum, maximum);
            }
        }

        if closed {
            self.intersect_caps(&mut xs, ray, minimum, maximum, f64::abs);
        }

        Intersections::new(xs)
    }

    fn normal_at_cone(at: &Tuple4D, minimum: f64, maximum: f64) -> Tuple4D {
        let dist = at.x.powi(2) + at.z.powi(2);

        if dist < maximum.powi(2) && at.y >= maximum - EPSILON {
            Tuple4D::vector(0.0, 1.0, 0.0)
        } else if dist < minimum.powi(2) && at.y <= minimum + EPSILON {
            Tuple4D::vector(0.0, -1.0, 0.0)
        } else {
            let mut y = dist.sqrt();
            if at.y > 0.0 {
                y = -y;
            }

            Tuple4D::vector(at.x, y, at.z)
        }
    }

    /// Keeps a wall intersection only if it lies strictly between the
    /// truncation planes.
    fn push_within<'a>(&'a self, xs: &mut Vec<Intersection<'a>>, ray: &Ray4D,
        t: f64, minimum: f64, maximum: f64) {
        let y = ray.origin().y + t * ray.direction().y;
        if minimum < y && y < maximum {
            xs.push(Intersection::new(t, self));
        }
    }

    /// Intersects the end caps at `minimum` and `maximum`.
    ///
    /// `radius` maps the Y value of a cap to the radius of that cap.
    fn intersect_caps<'a, F>(&'a self, xs: &mut Vec<Intersection<'a>>,
        ray: &Ray4D, minimum: f64, maximum: f64, radius: F)
        where F: Fn(f64) -> f64 {
        if ray.direction().y.abs() < EPSILON {
            return;
        }

        for &y in [minimum, maximum].iter() {
            let t = (y - ray.origin().y) / ray.direction().y;
            let x = ray.origin().x + t * ray.direction().x;
            let z = ray.origin().z + t * ray.direction().z;

            if x.powi(2) + z.powi(2) <= radius(y).powi(2) {
                xs.push(Intersection::new(t, self));
            }
        }
    }

    fn intersect_group<'a>(&'a self, ray: &Ray4D, children: &'a [Shape])
        -> Intersections<'a> {
        // If the ray misses the bounds, it misses every child too.
        if !self.bounds.intersects(ray) {
            return Intersections::empty();
        }

        Intersections::aggregate(
            children.iter().map(|child| child.intersect(ray))
        )
    }

    /// Intersects a triangle using the Möller–Trumbore algorithm.
    ///
    /// Triangles are intersected from either side. The barycentric `u` and
    /// `v` of the hit are kept on the intersection.
    fn intersect_triangle(&self, ray: &Ray4D, triangle_info: &TriangleInfo)
        -> Intersections {
        let dir_cross_e2 = ray.direction().cross(&triangle_info.e2);
        let determinant = triangle_info.e1.dot(&dir_cross_e2);

        if determinant.abs() < EPSILON {
            return Intersections::empty();
        }

        let f = 1.0 / determinant;
        let p1_to_origin = ray.origin() - triangle_info.p1;
        let u = f * p1_to_origin.dot(&dir_cross_e2);
        if !(0.0..=1.0).contains(&u) {
            return Intersections::empty();
        }

        let origin_cross_e1 = p1_to_origin.cross(&triangle_info.e1);
        let v = f * ray.direction().dot(&origin_cross_e1);
        if v < 0.0 || u + v > 1.0 {
            return Intersections::empty();
        }

        let t = f * triangle_info.e2.dot(&origin_cross_e1);
        Intersections::new(vec![Intersection::new_uv(t, self, u, v)])
    }
}

#[cfg(test)]
fn ray(origin: Tuple4D, direction: Tuple4D) -> Ray4D {
    Ray4D::new(origin, direction).unwrap()
}

#[cfg(test)]
fn assert_times(xs: &Intersections, expected: &[f64]) {
    assert_eq!(xs.len(), expected.len());
    for (i, t) in xs.iter().zip(expected.iter()) {
        assert!(crate::feq(i.t, *t), "t = {}, expected {}", i.t, t);
    }
}

#[cfg(test)]
fn default_triangle() -> Shape {
    Shape::triangle(
        Tuple4D::point(0.0, 1.0, 0.0),
        Tuple4D::point(-1.0, 0.0, 0.0),
        Tuple4D::point(1.0, 0.0, 0.0)
    ).unwrap()
}

#[test]
fn ray_intersects_sphere_at_two_points() {
    let r = ray(Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0));
    let s = Shape::sphere();

    assert_times(&s.intersect(&r), &[4.0, 6.0]);
}

#[test]
fn ray_is_tangent_to_sphere() {
    let r = ray(Tuple4D::point(0.0, 1.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0));
    let s = Shape::sphere();

    assert_times(&s.intersect(&r), &[5.0, 5.0]);
}

#[test]
fn ray_misses_sphere() {
    let r = ray(Tuple4D::point(0.0, 2.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0));

    assert!(Shape::sphere().intersect(&r).is_empty());
}

#[test]
fn ray_is_inside_sphere() {
    let r = ray(Tuple4D::point(0.0, 0.0, 0.0), Tuple4D::vector(0.0, 0.0, 1.0));
    let s = Shape::sphere();

    assert_times(&s.intersect(&r), &[-1.0, 1.0]);
}

#[test]
fn sphere_is_behind_ray() {
    let r = ray(Tuple4D::point(0.0, 0.0, 5.0), Tuple4D::vector(0.0, 0.0, 1.0));
    let s = Shape::sphere();

    assert_times(&s.intersect(&r), &[-6.0, -4.0]);
}

#[test]
fn intersecting_scaled_and_translated_spheres() {
    let r = ray(Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0));

    let scaled = Shape::sphere()
        .with_transform(Matrix4D::scaling(2.0, 2.0, 2.0)).unwrap();
    assert_times(&scaled.intersect(&r), &[3.0, 7.0]);

    let moved = Shape::sphere()
        .with_transform(Matrix4D::translation(5.0, 0.0, 0.0)).unwrap();
    assert!(moved.intersect(&r).is_empty());
}

#[test]
fn singular_transform_is_rejected() {
    let result = Shape::sphere().with_transform(Matrix4D::scaling(0.0, 1.0, 1.0));

    assert!(matches!(result, Err(Error::NotInvertible)));
}

#[test]
fn invalid_material_is_rejected() {
    let material = Material { reflective: 1.5, ..Default::default() };

    assert!(Shape::sphere().with_material(material).is_err());
}

#[test]
fn normal_on_sphere_axes() {
    let s = Shape::sphere();

    assert_eq!(s.normal_at(Tuple4D::point(1.0, 0.0, 0.0), None),
               Tuple4D::vector(1.0, 0.0, 0.0));
    assert_eq!(s.normal_at(Tuple4D::point(0.0, 1.0, 0.0), None),
               Tuple4D::vector(0.0, 1.0, 0.0));
    assert_eq!(s.normal_at(Tuple4D::point(0.0, 0.0, 1.0), None),
               Tuple4D::vector(0.0, 0.0, 1.0));
}

#[test]
fn normal_on_sphere_nonaxial() {
    let k = 3.0f64.sqrt() / 3.0;
    let s = Shape::sphere();

    let n = s.normal_at(Tuple4D::point(k, k, k), None);
    assert_eq!(n, Tuple4D::vector(k, k, k));
    assert_eq!(n, n.normalize());
}

#[test]
fn compute_normal_on_translated_sphere() {
    let s = Shape::sphere()
        .with_transform(Matrix4D::translation(0.0, 1.0, 0.0)).unwrap();

    let n = s.normal_at(Tuple4D::point(0.0, 1.70711, -0.70711), None);

    assert_eq!(n, Tuple4D::vector(0.0, 0.70711, -0.70711));
}

#[test]
fn compute_normal_on_transformed_sphere() {
    let s = Shape::sphere().with_transform(
        Matrix4D::scaling(1.0, 0.5, 1.0)
            * Matrix4D::rotation_z(std::f64::consts::PI / 5.0)
    ).unwrap();

    let p = Tuple4D::point(0.0, 2.0f64.sqrt() / 2.0, -(2.0f64.sqrt()) / 2.0);
    let n = s.normal_at(p, None);

    assert_eq!(n, Tuple4D::vector(0.0, 0.97014, -0.24254));
}

#[test]
fn sphere_normals_are_unit_length() {
    use crate::feq;

    let m = Matrix4D::translation(1.0, -2.0, 3.0)
        * Matrix4D::rotation_y(0.7)
        * Matrix4D::scaling(2.0, 0.5, 3.0);
    let s = Shape::sphere().with_transform(m).unwrap();

    for i in 0..16 {
        let theta = i as f64 * 0.4;
        let phi = i as f64 * 0.9;
        let local = Tuple4D::point(
            theta.sin() * phi.cos(), theta.sin() * phi.sin(), theta.cos()
        );

        let n = s.normal_at(m * local, None);
        assert!(n.is_vector());
        assert!(feq(n.magnitude(), 1.0));
    }
}

#[test]
fn normal_on_plane() {
    let p = Shape::plane();

    for at in [
        Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::point(10.0, 0.0, -10.0),
        Tuple4D::point(-5.0, 0.0, 150.0),
    ].iter() {
        assert_eq!(p.local_normal_at(at, None), Tuple4D::vector(0.0, 1.0, 0.0));
    }
}

#[test]
fn ray_parallel_or_coplanar_to_plane() {
    let p = Shape::plane();

    let parallel = ray(
        Tuple4D::point(0.0, 10.0, 0.0), Tuple4D::vector(0.0, 0.0, 1.0)
    );
    let coplanar = ray(
        Tuple4D::point(0.0, 0.0, 0.0), Tuple4D::vector(0.0, 0.0, 1.0)
    );

    assert!(p.local_intersect(&parallel).is_empty());
    assert!(p.local_intersect(&coplanar).is_empty());
}

#[test]
fn ray_intersecting_plane_from_above_and_below() {
    let p = Shape::plane();

    let above = ray(
        Tuple4D::point(0.0, 1.0, 0.0), Tuple4D::vector(0.0, -1.0, 0.0)
    );
    let below = ray(
        Tuple4D::point(0.0, -1.0, 0.0), Tuple4D::vector(0.0, 1.0, 0.0)
    );

    for r in [above, below].iter() {
        let xs = p.local_intersect(r);
        assert_eq!(xs.len(), 1);
        assert_eq!(xs[0].t, 1.0);
        assert!(std::ptr::eq(xs[0].what, &p));
    }
}

#[test]
fn ray_intersects_cube() {
    let c = Shape::cube();
    let cases = [
        ((5.0, 0.5, 0.0), (-1.0, 0.0, 0.0), 4.0, 6.0),
        ((-5.0, 0.5, 0.0), (1.0, 0.0, 0.0), 4.0, 6.0),
        ((0.5, 5.0, 0.0), (0.0, -1.0, 0.0), 4.0, 6.0),
        ((0.5, -5.0, 0.0), (0.0, 1.0, 0.0), 4.0, 6.0),
        ((0.5, 0.0, 5.0), (0.0, 0.0, -1.0), 4.0, 6.0),
        ((0.5, 0.0, -5.0), (0.0, 0.0, 1.0), 4.0, 6.0),
        ((0.0, 0.5, 0.0), (0.0, 0.0, 1.0), -1.0, 1.0),
    ];

    for &((ox, oy, oz), (dx, dy, dz), t1, t2) in cases.iter() {
        let r = ray(Tuple4D::point(ox, oy, oz), Tuple4D::vector(dx, dy, dz));
        assert_times(&c.local_intersect(&r), &[t1, t2]);
    }
}

#[test]
fn ray_misses_cube() {
    let c = Shape::cube();
    let cases = [
        ((-2.0, 0.0, 0.0), (0.2673, 0.5345, 0.8018)),
        ((0.0, -2.0, 0.0), (0.8018, 0.2673, 0.5345)),
        ((0.0, 0.0, -2.0), (0.5345, 0.8018, 0.2673)),
        ((2.0, 0.0, 2.0), (0.0, 0.0, -1.0)),
        ((0.0, 2.0, 2.0), (0.0, -1.0, 0.0)),
        ((2.0, 2.0, 0.0), (-1.0, 0.0, 0.0)),
    ];

    for &((ox, oy, oz), (dx, dy, dz)) in cases.iter() {
        let r = ray(Tuple4D::point(ox, oy, oz), Tuple4D::vector(dx, dy, dz));
        assert!(c.local_intersect(&r).is_empty());
    }
}

#[test]
fn ray_intersects_hugely_scaled_cube() {
    // In object space the direction shrinks well below EPSILON.
    let c = Shape::cube()
        .with_transform(Matrix4D::scaling(1e6, 1e6, 1e6)).unwrap();
    let r = ray(Tuple4D::point(0.0, 0.0, 0.0), Tuple4D::vector(0.0, 0.0, 1.0));
    let xs = c.intersect(&r);

    assert_eq!(xs.len(), 2);
    assert!((xs[0].t + 1e6).abs() < 1e-3, "t = {}", xs[0].t);
    assert!((xs[1].t - 1e6).abs() < 1e-3, "t = {}", xs[1].t);
}

#[test]
fn normal_on_cube_surface() {
    let c = Shape::cube();
    let cases = [
        ((1.0, 0.5, -0.8), (1.0, 0.0, 0.0)),
        ((-1.0, -0.2, 0.9), (-1.0, 0.0, 0.0)),
        ((-0.4, 1.0, -0.1), (0.0, 1.0, 0.0)),
        ((0.3, -1.0, -0.7), (0.0, -1.0, 0.0)),
        ((-0.6, 0.3, 1.0), (0.0, 0.0, 1.0)),
        ((0.4, 0.4, -1.0), (0.0, 0.0, -1.0)),
        ((1.0, 1.0, 1.0), (1.0, 0.0, 0.0)),
        ((-1.0, -1.0, -1.0), (-1.0, 0.0, 0.0)),
    ];

    for &((px, py, pz), (nx, ny, nz)) in cases.iter() {
        let n = c.local_normal_at(&Tuple4D::point(px, py, pz), None);
        assert_eq!(n, Tuple4D::vector(nx, ny, nz));
    }
}

#[test]
fn ray_misses_cylinder() {
    let cyl = Shape::cylinder();
    let cases = [
        ((1.0, 0.0, 0.0), (0.0, 1.0, 0.0)),
        ((0.0, 0.0, 0.0), (0.0, 1.0, 0.0)),
        ((0.0, 0.0, -5.0), (1.0, 1.0, 1.0)),
    ];

    for &((ox, oy, oz), (dx, dy, dz)) in cases.iter() {
        let r = ray(
            Tuple4D::point(ox, oy, oz),
            Tuple4D::vector(dx, dy, dz).normalize()
        );
        assert!(cyl.local_intersect(&r).is_empty());
    }
}

#[test]
fn ray_strikes_cylinder() {
    let cyl = Shape::cylinder();
    let cases = [
        ((1.0, 0.0, -5.0), (0.0, 0.0, 1.0), 5.0, 5.0),
        ((0.0, 0.0, -5.0), (0.0, 0.0, 1.0), 4.0, 6.0),
        ((0.5, 0.0, -5.0), (0.1, 1.0, 1.0), 6.80798, 7.08872),
    ];

    for &((ox, oy, oz), (dx, dy, dz), t0, t1) in cases.iter() {
        let r = ray(
            Tuple4D::point(ox, oy, oz),
            Tuple4D::vector(dx, dy, dz).normalize()
        );
        assert_times(&cyl.local_intersect(&r), &[t0, t1]);
    }
}

#[test]
fn normal_on_cylinder() {
    let cyl = Shape::cylinder();
    let cases = [
        ((1.0, 0.0, 0.0), (1.0, 0.0, 0.0)),
        ((0.0, 5.0, -1.0), (0.0, 0.0, -1.0)),
        ((0.0, -2.0, 1.0), (0.0, 0.0, 1.0)),
        ((-1.0, 1.0, 0.0), (-1.0, 0.0, 0.0)),
    ];

    for &((px, py, pz), (nx, ny, nz)) in cases.iter() {
        let n = cyl.local_normal_at(&Tuple4D::point(px, py, pz), None);
        assert_eq!(n, Tuple4D::vector(nx, ny, nz));
    }
}

#[test]
fn intersecting_a_truncated_cylinder() {
    let cyl = Shape::truncated_cylinder(1.0, 2.0, false).unwrap();
    let cases = [
        ((0.0, 1.5, 0.0), (0.1, 1.0, 0.0), 0),
        ((0.0, 3.0, -5.0), (0.0, 0.0, 1.0), 0),
        ((0.0, 0.0, -5.0), (0.0, 0.0, 1.0), 0),
        ((0.0, 2.0, -5.0), (0.0, 0.0, 1.0), 0),
        ((0.0, 1.0, -5.0), (0.0, 0.0, 1.0), 0),
        ((0.0, 1.5, -2.0), (0.0, 0.0, 1.0), 2),
    ];

    for &((ox, oy, oz), (dx, dy, dz), count) in cases.iter() {
        let r = ray(
            Tuple4D::point(ox, oy, oz),
            Tuple4D::vector(dx, dy, dz).normalize()
        );
        assert_eq!(cyl.local_intersect(&r).len(), count);
    }
}

#[test]
fn intersecting_the_caps_of_a_closed_cylinder() {
    let cyl = Shape::truncated_cylinder(1.0, 2.0, true).unwrap();
    let cases = [
        ((0.0, 3.0, 0.0), (0.0, -1.0, 0.0)),
        ((0.0, 3.0, -2.0), (0.0, -1.0, 2.0)),
        ((0.0, 0.0, -2.0), (0.0, 1.0, 2.0)),
    ];

    for &((ox, oy, oz), (dx, dy, dz)) in cases.iter() {
        let r = ray(
            Tuple4D::point(ox, oy, oz),
            Tuple4D::vector(dx, dy, dz).normalize()
        );
        assert_eq!(cyl.local_intersect(&r).len(), 2);
    }
}

#[test]
fn normal_on_cylinder_end_caps() {
    let cyl = Shape::truncated_cylinder(1.0, 2.0, true).unwrap();
    let cases = [
        ((0.0, 1.0, 0.0), -1.0),
        ((0.5, 1.0, 0.0), -1.0),
        ((0.0, 1.0, 0.5), -1.0),
        ((0.0, 2.0, 0.0), 1.0),
        ((0.5, 2.0, 0.0), 1.0),
        ((0.0, 2.0, 0.5), 1.0),
    ];

    for &((px, py, pz), ny) in cases.iter() {
        let n = cyl.local_normal_at(&Tuple4D::point(px, py, pz), None);
        assert_eq!(n, Tuple4D::vector(0.0, ny, 0.0));
    }
}

#[test]
fn infinite_shapes_cannot_be_closed() {
    assert!(matches!(
        Shape::truncated_cone(NEG_INFINITY, 1.0, true),
        Err(Error::InfiniteClosed { shape: "cone" })
    ));
    assert!(matches!(
        Shape::truncated_cone(-1.0, INFINITY, true),
        Err(Error::InfiniteClosed { .. })
    ));
    assert!(matches!(
        Shape::truncated_cylinder(NEG_INFINITY, INFINITY, true),
        Err(Error::InfiniteClosed { shape: "cylinder" })
    ));

    assert!(Shape::truncated_cone(NEG_INFINITY, INFINITY, false).is_ok());
    assert!(Shape::truncated_cylinder(2.0, 1.0, false).is_err());
}

#[test]
fn intersecting_a_cone() {
    let cone = Shape::cone();
    let cases = [
        ((0.0, 0.0, -5.0), (0.0, 0.0, 1.0), 5.0, 5.0),
        ((1.0, 1.0, -5.0), (-0.5, -1.0, 1.0), 4.55006, 49.44994),
    ];

    for &((ox, oy, oz), (dx, dy, dz), t0, t1) in cases.iter() {
        let r = ray(
            Tuple4D::point(ox, oy, oz),
            Tuple4D::vector(dx, dy, dz).normalize()
        );
        assert_times(&cone.local_intersect(&r), &[t0, t1]);
    }
}

#[test]
fn intersecting_a_cone_parallel_to_one_half() {
    use crate::feq;

    let cone = Shape::cone();
    let r = ray(
        Tuple4D::point(0.0, 0.0, -1.0),
        Tuple4D::vector(0.0, 1.0, 1.0).normalize()
    );

    let xs = cone.local_intersect(&r);
    assert_eq!(xs.len(), 1);
    assert!(feq(xs[0].t, 0.35355));
}

#[test]
fn intersecting_the_caps_of_a_closed_cone() {
    let cone = Shape::truncated_cone(-0.5, 0.5, true).unwrap();
    let cases = [
        ((0.0, 0.0, -5.0), (0.0, 1.0, 0.0), 0),
        ((0.0, 0.0, -0.25), (0.0, 1.0, 1.0), 2),
        ((0.0, 0.0, -0.25), (0.0, 1.0, 0.0), 4),
    ];

    for &((ox, oy, oz), (dx, dy, dz), count) in cases.iter() {
        let r = ray(
            Tuple4D::point(ox, oy, oz),
            Tuple4D::vector(dx, dy, dz).normalize()
        );
        assert_eq!(cone.local_intersect(&r).len(), count);
    }
}

#[test]
fn open_cones_have_no_caps() {
    let cone = Shape::truncated_cone(-0.5, 0.5, false).unwrap();
    let r = ray(
        Tuple4D::point(0.0, 0.0, -0.25), Tuple4D::vector(0.0, 1.0, 0.0)
    );

    assert_eq!(cone.local_intersect(&r).len(), 2);
}

#[test]
fn normal_on_cone() {
    let cone = Shape::cone();
    let cases = [
        ((0.0, 0.0, 0.0), (0.0, 0.0, 0.0)),
        ((1.0, 1.0, 1.0), (1.0, -(2.0f64.sqrt()), 1.0)),
        ((-1.0, -1.0, 0.0), (-1.0, 1.0, 0.0)),
    ];

    for &((px, py, pz), (nx, ny, nz)) in cases.iter() {
        let n = cone.local_normal_at(&Tuple4D::point(px, py, pz), None);
        assert_eq!(n, Tuple4D::vector(nx, ny, nz));
    }
}

#[test]
fn normal_on_cone_end_caps() {
    let cone = Shape::truncated_cone(-1.0, 2.0, true).unwrap();

    assert_eq!(cone.local_normal_at(&Tuple4D::point(0.5, 2.0, 0.0), None),
               Tuple4D::vector(0.0, 1.0, 0.0));
    assert_eq!(cone.local_normal_at(&Tuple4D::point(0.0, -1.0, 0.5), None),
               Tuple4D::vector(0.0, -1.0, 0.0));
}

#[test]
fn local_bounding_boxes() {
    let sphere = Shape::sphere().bounds();
    assert_eq!(sphere.minimum, Tuple4D::point(-1.0, -1.0, -1.0));
    assert_eq!(sphere.maximum, Tuple4D::point(1.0, 1.0, 1.0));

    let plane = Shape::plane().bounds();
    assert_eq!(plane.minimum, Tuple4D::point(NEG_INFINITY, 0.0, NEG_INFINITY));
    assert_eq!(plane.maximum, Tuple4D::point(INFINITY, 0.0, INFINITY));

    let cyl = Shape::truncated_cylinder(-5.0, 3.0, false).unwrap().bounds();
    assert_eq!(cyl.minimum, Tuple4D::point(-1.0, -5.0, -1.0));
    assert_eq!(cyl.maximum, Tuple4D::point(1.0, 3.0, 1.0));

    let cone = Shape::truncated_cone(-5.0, 3.0, false).unwrap().bounds();
    assert_eq!(cone.minimum, Tuple4D::point(-5.0, -5.0, -5.0));
    assert_eq!(cone.maximum, Tuple4D::point(5.0, 3.0, 5.0));

    let infinite = Shape::cone().bounds();
    assert_eq!(infinite.minimum.y, NEG_INFINITY);
    assert_eq!(infinite.maximum.x, INFINITY);

    let t = Shape::triangle(
        Tuple4D::point(-3.0, 7.0, 2.0),
        Tuple4D::point(6.0, 2.0, -4.0),
        Tuple4D::point(2.0, -1.0, -1.0)
    ).unwrap().bounds();
    assert_eq!(t.minimum, Tuple4D::point(-3.0, -1.0, -4.0));
    assert_eq!(t.maximum, Tuple4D::point(6.0, 7.0, 2.0));
}

#[test]
fn group_bounds_contain_transformed_children() {
    let s = Shape::sphere().with_transform(
        Matrix4D::translation(2.0, 5.0, -3.0) * Matrix4D::scaling(2.0, 2.0, 2.0)
    ).unwrap();
    let c = Shape::truncated_cylinder(-2.0, 2.0, false).unwrap().with_transform(
        Matrix4D::translation(-4.0, -1.0, 4.0) * Matrix4D::scaling(0.5, 1.0, 0.5)
    ).unwrap();

    let g = Shape::group(vec![s, c]);

    assert_eq!(g.bounds().minimum, Tuple4D::point(-4.5, -3.0, -5.0));
    assert_eq!(g.bounds().maximum, Tuple4D::point(4.0, 7.0, 4.5));
    assert!(Shape::group(vec![]).bounds().is_empty());
}

#[test]
fn csg_bounds_contain_both_operands() {
    let left = Shape::sphere();
    let right = Shape::sphere()
        .with_transform(Matrix4D::translation(2.0, 3.0, 4.0)).unwrap();
    let c = Shape::csg(CsgOperation::Difference, left, right);

    assert_eq!(c.bounds().minimum, Tuple4D::point(-1.0, -1.0, -1.0));
    assert_eq!(c.bounds().maximum, Tuple4D::point(3.0, 4.0, 5.0));
}

#[test]
fn creating_a_shape_group() {
    let g = Shape::group(vec![Shape::sphere(), Shape::cube()]);

    assert_eq!(*g.transform(), Matrix4D::identity());
    assert_eq!(g.children().unwrap().len(), 2);
    assert_eq!(g.children().unwrap()[1], Shape::cube());
    assert!(Shape::sphere().children().is_none());
}

#[test]
fn intersecting_ray_with_empty_group() {
    let g = Shape::group(vec![]);
    let r = ray(Tuple4D::point(0.0, 0.0, 0.0), Tuple4D::vector(0.0, 0.0, 1.0));

    assert!(g.local_intersect(&r).is_empty());
}

#[test]
fn intersecting_ray_with_nonempty_group() {
    let s1 = Shape::sphere();
    let s2 = Shape::sphere()
        .with_transform(Matrix4D::translation(0.0, 0.0, -3.0)).unwrap();
    let s3 = Shape::sphere()
        .with_transform(Matrix4D::translation(5.0, 0.0, 0.0)).unwrap();
    let g = Shape::group(vec![s1, s2, s3]);

    let r = ray(Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0));
    let xs = g.local_intersect(&r);
    let children = g.children().unwrap();

    assert_eq!(xs.len(), 4);
    assert!(std::ptr::eq(&children[1], xs[0].what));
    assert!(std::ptr::eq(&children[1], xs[1].what));
    assert!(std::ptr::eq(&children[0], xs[2].what));
    assert!(std::ptr::eq(&children[0], xs[3].what));
}

#[test]
fn intersecting_a_transformed_group() {
    let s = Shape::sphere()
        .with_transform(Matrix4D::translation(5.0, 0.0, 0.0)).unwrap();
    let g = Shape::group(vec![s])
        .with_transform(Matrix4D::scaling(2.0, 2.0, 2.0)).unwrap();

    let r = ray(
        Tuple4D::point(10.0, 0.0, -10.0), Tuple4D::vector(0.0, 0.0, 1.0)
    );

    assert_eq!(g.intersect(&r).len(), 2);
}

#[test]
fn hugely_scaled_group_is_not_culled() {
    let g = Shape::group(vec![Shape::sphere()])
        .with_transform(Matrix4D::scaling(1e6, 1e6, 1e6)).unwrap();
    let r = ray(
        Tuple4D::point(-5e6, 5e6, 0.0),
        Tuple4D::vector(1.0, -1.0, 0.0).normalize()
    );

    assert_eq!(Shape::sphere()
        .with_transform(Matrix4D::scaling(1e6, 1e6, 1e6)).unwrap()
        .intersect(&r).len(), 2);
    assert_eq!(g.intersect(&r).len(), 2);
}

#[test]
fn group_culls_rays_outside_its_bounds() {
    let g = Shape::group(vec![Shape::cube()]);
    let r = ray(Tuple4D::point(5.0, 5.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0));

    assert!(g.intersect(&r).is_empty());
}

#[cfg(test)]
fn nested_groups(scale: Matrix4D) -> Shape {
    let s = Shape::sphere()
        .with_transform(Matrix4D::translation(5.0, 0.0, 0.0)).unwrap();
    let g2 = Shape::group(vec![s]).with_transform(scale).unwrap();

    Shape::group(vec![g2])
        .with_transform(Matrix4D::rotation_y(std::f64::consts::PI / 2.0))
        .unwrap()
}

#[cfg(test)]
fn innermost(g1: &Shape) -> &Shape {
    &g1.children().unwrap()[0].children().unwrap()[0]
}

#[test]
fn converting_a_point_from_world_to_object_space() {
    let g1 = nested_groups(Matrix4D::scaling(2.0, 2.0, 2.0));

    let p = innermost(&g1).world_to_object(Tuple4D::point(-2.0, 0.0, -10.0));
    assert_eq!(p, Tuple4D::point(0.0, 0.0, -1.0));
}

#[test]
fn converting_a_normal_from_object_to_world_space() {
    let k = 3.0f64.sqrt() / 3.0;
    let g1 = nested_groups(Matrix4D::scaling(1.0, 2.0, 3.0));

    let n = innermost(&g1).normal_to_world(Tuple4D::vector(k, k, k));
    assert_eq!(n, Tuple4D::vector(2.0 / 7.0, 3.0 / 7.0, -6.0 / 7.0));
}

#[test]
fn finding_the_normal_on_a_child_object() {
    let k = 3.0f64.sqrt() / 3.0;
    let g1 = nested_groups(Matrix4D::scaling(1.0, 2.0, 3.0));

    let n = innermost(&g1)
        .normal_at(Tuple4D::point(3.0 * k, 2.0 * k, -(k + 5.0)), None);
    assert_eq!(n, Tuple4D::vector(2.0 / 7.0, 3.0 / 7.0, -6.0 / 7.0));
}

#[test]
fn transforming_a_group_after_nesting_reaches_children() {
    let s = Shape::sphere();
    let inner = Shape::group(vec![s]);
    let outer = Shape::group(vec![inner])
        .with_transform(Matrix4D::translation(0.0, 0.0, 10.0)).unwrap();

    let leaf = innermost(&outer);
    assert_eq!(leaf.world_to_object(Tuple4D::point(0.0, 0.0, 10.0)),
               Tuple4D::point(0.0, 0.0, 0.0));
}

#[test]
#[should_panic]
fn groups_have_no_local_normal() {
    Shape::group(vec![]).local_normal_at(&Tuple4D::point(0.0, 0.0, 0.0), None);
}

#[test]
fn includes_compares_identity() {
    let g = Shape::group(vec![Shape::sphere(), Shape::cube()]);
    let c = Shape::csg(CsgOperation::Union, g, Shape::sphere());

    let left = c.csg_left().unwrap();
    let right = c.csg_right().unwrap();
    let sphere_in_group = &left.children().unwrap()[0];

    assert!(c.includes(sphere_in_group));
    assert!(left.includes(sphere_in_group));
    assert!(!right.includes(sphere_in_group));
    assert!(c.includes(right));
    assert!(!left.includes(&Shape::sphere()));
}

#[test]
fn constructing_a_triangle() {
    let t = default_triangle();
    let ti = t.triangle_info().unwrap();

    assert_eq!(ti.p1, Tuple4D::point(0.0, 1.0, 0.0));
    assert_eq!(ti.p2, Tuple4D::point(-1.0, 0.0, 0.0));
    assert_eq!(ti.p3, Tuple4D::point(1.0, 0.0, 0.0));
    assert_eq!(ti.e1, Tuple4D::vector(-1.0, -1.0, 0.0));
    assert_eq!(ti.e2, Tuple4D::vector(1.0, -1.0, 0.0));
    assert_eq!(ti.normal, Tuple4D::vector(0.0, 0.0, -1.0));
}

#[test]
fn triangle_vertices_must_be_points() {
    let result = Shape::triangle(
        Tuple4D::point(0.0, 1.0, 0.0),
        Tuple4D::vector(-1.0, 0.0, 0.0),
        Tuple4D::point(1.0, 0.0, 0.0)
    );

    assert!(matches!(result, Err(Error::NotAPoint { .. })));
}

#[test]
fn finding_the_normal_on_a_triangle() {
    let t = default_triangle();
    let normal = t.triangle_info().unwrap().normal;

    assert_eq!(t.normal_at(Tuple4D::point(0.0, 0.5, 0.0), None), normal);
    assert_eq!(t.normal_at(Tuple4D::point(-0.5, 0.75, 0.0), None), normal);
    assert_eq!(t.normal_at(Tuple4D::point(0.5, 0.25, 0.0), None), normal);
}

#[test]
fn intersecting_a_ray_parallel_to_a_triangle() {
    let t = default_triangle();
    let r = ray(Tuple4D::point(0.0, -1.0, -2.0), Tuple4D::vector(0.0, 1.0, 0.0));

    assert!(t.local_intersect(&r).is_empty());
}

#[test]
fn a_ray_misses_the_triangle_edges() {
    let t = default_triangle();

    for origin in [
        Tuple4D::point(1.0, 1.0, -2.0),
        Tuple4D::point(-1.0, 1.0, -2.0),
        Tuple4D::point(0.0, -1.0, -2.0),
    ].iter() {
        let r = ray(*origin, Tuple4D::vector(0.0, 0.0, 1.0));
        assert!(t.local_intersect(&r).is_empty());
    }
}

#[test]
fn a_ray_strikes_a_triangle() {
    use crate::feq;

    let t = default_triangle();
    let r = ray(Tuple4D::point(0.0, 0.5, -2.0), Tuple4D::vector(0.0, 0.0, 1.0));

    let xs = t.local_intersect(&r);
    assert_eq!(xs.len(), 1);
    assert!(feq(xs[0].t, 2.0));
    assert!(xs[0].uv.is_some());
}

#[cfg(test)]
fn default_smooth_triangle() -> Shape {
    Shape::smooth_triangle(
        Tuple4D::point(0.0, 1.0, 0.0),
        Tuple4D::point(-1.0, 0.0, 0.0),
        Tuple4D::point(1.0, 0.0, 0.0),
        Tuple4D::vector(0.0, 1.0, 0.0),
        Tuple4D::vector(-1.0, 0.0, 0.0),
        Tuple4D::vector(1.0, 0.0, 0.0)
    ).unwrap()
}

#[test]
fn constructing_a_smooth_triangle() {
    let s = default_smooth_triangle();
    let sti = s.smooth_triangle_info().unwrap();

    assert_eq!(sti.triangle_info.p1, Tuple4D::point(0.0, 1.0, 0.0));
    assert_eq!(sti.triangle_info.p2, Tuple4D::point(-1.0, 0.0, 0.0));
    assert_eq!(sti.triangle_info.p3, Tuple4D::point(1.0, 0.0, 0.0));
    assert_eq!(sti.n1, Tuple4D::vector(0.0, 1.0, 0.0));
    assert_eq!(sti.n2, Tuple4D::vector(-1.0, 0.0, 0.0));
    assert_eq!(sti.n3, Tuple4D::vector(1.0, 0.0, 0.0));
}

#[test]
fn an_intersection_with_a_smooth_triangle_stores_uv() {
    use crate::feq;

    let s = default_smooth_triangle();
    let r = ray(Tuple4D::point(-0.2, 0.3, -2.0), Tuple4D::vector(0.0, 0.0, 1.0));

    let xs = s.local_intersect(&r);
    let (u, v) = xs[0].uv.unwrap();
    assert!(feq(u, 0.45));
    assert!(feq(v, 0.25));
}

#[test]
fn a_smooth_triangle_uses_uv_to_interpolate_the_normal() {
    let s = default_smooth_triangle();

    let i = Intersection::new_uv(1.0, &s, 0.45, 0.25);
    let n = s.normal_at(Tuple4D::point(0.0, 0.0, 0.0), Some(&i));

    assert_eq!(n, Tuple4D::vector(-0.5547, 0.83205, 0.0));
}

#[test]
#[should_panic(expected = "hit.u and hit.v must be non-null")]
fn a_smooth_triangle_needs_uv_for_its_normal() {
    let s = default_smooth_triangle();

    s.normal_at(Tuple4D::point(0.0, 0.0, 0.0), None);
}

#[test]
fn csg_is_created_with_an_operation_and_two_shapes() {
    let c = Shape::csg(CsgOperation::Union, Shape::sphere(), Shape::cube());

    assert!(matches!(c.shape_type(), ShapeType::Csg(CsgOperation::Union, ..)));
    assert_eq!(*c.csg_left().unwrap(), Shape::sphere());
    assert_eq!(*c.csg_right().unwrap(), Shape::cube());
}

#[test]
fn a_ray_misses_a_csg_object() {
    let c = Shape::csg(CsgOperation::Union, Shape::sphere(), Shape::cube());
    let r = ray(Tuple4D::point(0.0, 2.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0));

    assert!(c.local_intersect(&r).is_empty());
}

#[test]
fn a_ray_hits_a_csg_object() {
    use crate::feq;

    let s1 = Shape::sphere();
    let s2 = Shape::sphere()
        .with_transform(Matrix4D::translation(0.0, 0.0, 0.5)).unwrap();
    let c = Shape::csg(CsgOperation::Union, s1, s2);

    let r = ray(Tuple4D::point(0.0, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0));
    let xs = c.local_intersect(&r);

    assert_eq!(xs.len(), 2);
    assert!(feq(xs[0].t, 4.0));
    assert!(std::ptr::eq(xs[0].what, c.csg_left().unwrap()));
    assert!(feq(xs[1].t, 6.5));
    assert!(std::ptr::eq(xs[1].what, c.csg_right().unwrap()));
}

#[test]
fn container_material_reaches_every_leaf() {
    let red = Material {
        color: crate::color::Color::rgb(1.0, 0.0, 0.0),
        ..Default::default()
    };
    let csg = Shape::csg(CsgOperation::Union, Shape::sphere(), Shape::cube());
    let g = Shape::group(vec![Shape::plane(), csg])
        .with_material(red).unwrap();

    let children = g.children().unwrap();
    assert_eq!(*children[0].material(), red);
    assert_eq!(*children[1].csg_left().unwrap().material(), red);
    assert_eq!(*children[1].csg_right().unwrap().material(), red);

    let bad = Material { reflective: 1.5, ..Default::default() };
    assert!(Shape::group(vec![Shape::sphere()]).with_material(bad).is_err());
}
