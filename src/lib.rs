pub mod matrix {
    pub mod arithmetic;
    pub mod determinant;
    pub mod display;
    pub mod element;
    pub mod factories;
    pub mod index;
    pub mod inverse;
    #[allow(clippy::module_inception)]
    pub mod matrix;
    #[cfg(feature = "python")]
    pub mod matrix_py;
    pub mod predicates;
    pub mod shape;
}
pub mod rings {
    pub mod fraction;
}

pub mod config;
pub mod error;

pub use error::{MatrixError, Result};
pub use matrix::arithmetic::MapTarget;
pub use matrix::factories::{identity_matrix, null_matrix, vector_mag};
pub use matrix::index::{Entry, MatrixIndex, Span};
pub use matrix::matrix::Matrix;
pub use matrix::shape::Elements;
pub use rings::fraction::Fraction;

/// A Python module implemented in Rust.
#[cfg(feature = "python")]
#[pyo3::pymodule]
fn umatrix(m: &pyo3::Bound<'_, pyo3::types::PyModule>) -> pyo3::PyResult<()> {
    let _ = env_logger::try_init();
    matrix::matrix_py::register(m)
}
