use std::time::Instant;

use log::{ debug, info };

use crate::ray::Ray4D;
use crate::tuple::Tuple4D;
use crate::color::Color;
use crate::matrix::Matrix4D;
use crate::world::World;
use crate::canvas::Canvas;
use crate::consts::RECURSION_DEPTH;
use crate::error::Result;

/// A camera record for generating a canvas.
///
/// This record gives a "frame" of the world. Based on camera parameters,
/// different perspectives can be produced.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Camera {
    /// The horizontal size of the resultant canvas.
    pub hsize: usize,

    /// The vertical size of the resultant canvas.
    pub vsize: usize,

    pub half_width: f64,
    pub half_height: f64,
    pub pixel_size: f64,

    /// The angle describing "how much" the camera can see.
    pub field_of_view: f64,

    /// Maximum number of reflection or refraction bounces per camera ray.
    pub depth: usize,

    /// A matrix describing how the world should be oriented relative to the
    /// camera (typically a view transformation).
    transform: Matrix4D,
    inverse: Matrix4D,
}

impl Camera {
    /// Creates a camera. Fails if `transform` cannot be inverted.
    pub fn new(hsize: usize, vsize: usize, field_of_view: f64,
        transform: Matrix4D) -> Result<Camera> {
        let inverse = transform.inverse()?;

        let half_view = (field_of_view / 2.0).tan();
        let aspect = (hsize as f64) / (vsize as f64);

        let (half_width, half_height) = if aspect >= 1.0 {
            (half_view, half_view / aspect)
        } else {
            (half_view * aspect, half_view)
        };

        let pixel_size = half_width * 2.0 / (hsize as f64);
        Ok(Camera {
            hsize,
            vsize,
            half_width,
            half_height,
            pixel_size,
            field_of_view,
            depth: RECURSION_DEPTH,
            transform,
            inverse,
        })
    }

    pub fn transform(&self) -> &Matrix4D {
        &self.transform
    }

    pub fn ray_for_pixel(&self, px: usize, py: usize) -> Ray4D {
        // Offsets from the edge of the canvas to the pixel's center
        let xoffset = (px as f64 + 0.5) * self.pixel_size;
        let yoffset = (py as f64 + 0.5) * self.pixel_size;

        // The untransformed coordinates of the pixel in world space
        let world_x = self.half_width - xoffset;
        let world_y = self.half_height - yoffset;

        // Using the camera matrix, transform the canvas point and origin,
        // computing the ray's direction vector
        let pixel = self.inverse * Tuple4D::point(world_x, world_y, -1.0);
        let origin = self.inverse * Tuple4D::point(0.0, 0.0, 0.0);
        let direction = (pixel - origin).normalize();

        Ray4D::from_parts(origin, direction)
    }

    /// Renders row `y` of the image.
    pub fn render_row(&self, w: &World, y: usize) -> Vec<Color> {
        (0..self.hsize)
            .map(|x| w.color_at(&self.ray_for_pixel(x, y), self.depth))
            .collect()
    }

    /// Renders the world one row at a time on the calling thread.
    pub fn render(&self, w: &World) -> Canvas {
        let mut image = Canvas::new(self.hsize, self.vsize);
        let start = Instant::now();

        info!("Rendering {}x{} image...", self.hsize, self.vsize);
        for y in 0..self.vsize {
            image.write_row(y, &self.render_row(w, y));
            debug!("Finished row {}", y);
        }
        info!("...done in {:.2?}.", start.elapsed());

        image
    }
}

#[test]
fn pixel_size_for_horizontal_canvas() {
    let c = Camera::new(200, 125, std::f64::consts::PI / 2.0,
        Matrix4D::identity()).unwrap();

    assert!(crate::feq(c.pixel_size, 0.01));
}

#[test]
fn pixel_size_for_vertical_canvas() {
    let c = Camera::new(125, 200, std::f64::consts::PI / 2.0,
        Matrix4D::identity()).unwrap();

    assert!(crate::feq(c.pixel_size, 0.01));
}

#[test]
fn camera_traces_five_bounces_by_default() {
    let c = Camera::new(10, 10, std::f64::consts::PI / 2.0,
        Matrix4D::identity()).unwrap();

    assert_eq!(c.depth, RECURSION_DEPTH);
}

#[test]
fn camera_rejects_singular_transform() {
    let c = Camera::new(10, 10, std::f64::consts::PI / 2.0,
        Matrix4D::scaling(0.0, 1.0, 1.0));

    assert!(c.is_err());
}

#[test]
fn ray_through_center() {
    let c = Camera::new(201, 101, std::f64::consts::PI / 2.0,
        Matrix4D::identity()).unwrap();
    let r = c.ray_for_pixel(100, 50);

    assert_eq!(r.origin(), Tuple4D::point(0.0, 0.0, 0.0));
    assert_eq!(r.direction(), Tuple4D::vector(0.0, 0.0, -1.0));
}

#[test]
fn ray_through_corner() {
    let c = Camera::new(201, 101, std::f64::consts::PI / 2.0,
        Matrix4D::identity()).unwrap();
    let r = c.ray_for_pixel(0, 0);

    assert_eq!(r.origin(), Tuple4D::point(0.0, 0.0, 0.0));
    assert_eq!(r.direction(), Tuple4D::vector(0.66519, 0.33259, -0.66851));
}

#[test]
fn ray_when_camera_transformed() {
    let c = Camera::new(201, 101, std::f64::consts::PI / 2.0,
        Matrix4D::rotation_y(std::f64::consts::PI / 4.0)
            * Matrix4D::translation(0.0, -2.0, 5.0)).unwrap();
    let r = c.ray_for_pixel(100, 50);

    assert_eq!(r.origin(), Tuple4D::point(0.0, 2.0, -5.0));
    assert_eq!(r.direction(),
        Tuple4D::vector(2.0f64.sqrt() / 2.0, 0.0, -(2.0f64.sqrt() / 2.0)));
}

#[test]
fn render_world_with_camera() {
    let w = World::default();

    let from = Tuple4D::point(0.0, 0.0, -5.0);
    let to = Tuple4D::point(0.0, 0.0, 0.0);
    let up = Tuple4D::vector(0.0, 1.0, 0.0);

    let c = Camera::new(11, 11, std::f64::consts::PI / 2.0,
        Matrix4D::view_transform(from, to, up)).unwrap();

    let image = c.render(&w);
    assert!(image.read_pixel(5, 5).unwrap()
        .approx_eq(&Color::rgb(0.38066, 0.47583, 0.2855), 1e-4));
}
