//! Error types for scene construction and loading.

use thiserror::Error;

use crate::tuple::Tuple4D;

/// Errors raised while building or loading a scene.
///
/// Geometry is only ever validated when it is constructed; once a `Shape`,
/// `Ray4D` or `Material` exists it is known to be well formed.
#[derive(Error, Debug)]
pub enum Error {
    /// A flat value list does not fit the matrix dimension.
    #[error("expected {expected} matrix values, got {actual}")]
    MatrixSize { expected: usize, actual: usize },

    /// The matrix has a zero determinant.
    #[error("matrix is not invertible")]
    NotInvertible,

    /// A tuple with `w != 1` was given where a point is required.
    #[error("{role} must be a point, got {value:?}")]
    NotAPoint { role: &'static str, value: Tuple4D },

    /// A tuple with `w != 0` was given where a vector is required.
    #[error("{role} must be a vector, got {value:?}")]
    NotAVector { role: &'static str, value: Tuple4D },

    /// A bounding box whose minimum exceeds its maximum on some axis.
    #[error("bounding box minimum {min:?} exceeds maximum {max:?}")]
    InvalidBounds { min: Tuple4D, max: Tuple4D },

    /// A material coefficient outside of its allowed range.
    #[error("material {name} out of range: {value}")]
    MaterialOutOfRange { name: &'static str, value: f64 },

    /// A cone or cylinder with an infinite extent cannot carry end caps.
    #[error("an infinite {shape} cannot be closed")]
    InfiniteClosed { shape: &'static str },

    /// A malformed Wavefront OBJ record.
    #[error("OBJ line {line}: {message}")]
    Obj { line: usize, message: String },

    /// A scene description that cannot be turned into a world.
    #[error("scene: {0}")]
    Scene(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type for scene construction.
pub type Result<T> = std::result::Result<T, Error>;
