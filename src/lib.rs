pub mod consts;
pub mod error;

pub mod tuple;
pub mod color;
pub mod matrix;
pub mod ray;

pub mod bounds;
pub mod shape;
pub mod intersect;
pub mod pattern;
pub mod light;
pub mod world;

pub mod camera;
pub mod canvas;
pub mod obj;
pub mod scene;
pub mod parallel;
pub mod logger;

pub use error::{ Error, Result };

use consts::EPSILON;

/// Approximate floating point equality.
///
/// Two equal infinities compare equal, which keeps unbounded boxes and
/// infinite cylinders comparable.
pub fn feq(left: f64, right: f64) -> bool {
    left == right || (left - right).abs() < EPSILON
}
