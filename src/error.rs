/// Every failure the matrix operations can report.
///
/// Each variant renders a default message; the optional payload is a custom
/// detail appended on a new line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatrixError {
    #[error("Matrix dimensions do not match.{}", detail(.0))]
    DimensionMismatch(Option<String>),

    #[error("The provided matrix is not a square matrix.{}", detail(.0))]
    NotSquareMatrix(Option<String>),

    #[error("Slicing a matrix is not possible, please use integer indices.{}", detail(.0))]
    SlicingNotAllowed(Option<String>),

    #[error("The given index doesn't exist for the matrix.{}", detail(.0))]
    IndexOutOfBounds(Option<String>),

    #[error("Can't divide a matrix by matrix. Invalid Operation.{}", detail(.0))]
    DivisionByMatrix(Option<String>),

    #[error("The given matrix is singular and its inverse can't be calculated.{}", detail(.0))]
    SingularMatrix(Option<String>),

    #[error("Division by zero.{}", detail(.0))]
    DivisionByZero(Option<String>),

    #[error("Value can not be converted: {0}")]
    ConversionFailed(String),
}

fn detail(message: &Option<String>) -> String {
    match message {
        Some(message) => format!("\n{message}"),
        None => String::new(),
    }
}

impl MatrixError {
    pub fn dimension_mismatch(message: impl Into<String>) -> Self {
        MatrixError::DimensionMismatch(Some(message.into()))
    }

    pub fn not_square(message: impl Into<String>) -> Self {
        MatrixError::NotSquareMatrix(Some(message.into()))
    }

    pub fn index_out_of_bounds(message: impl Into<String>) -> Self {
        MatrixError::IndexOutOfBounds(Some(message.into()))
    }
}

pub type Result<T> = std::result::Result<T, MatrixError>;

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------
