use crate::error::{MatrixError, Result};
use crate::matrix::element::Element;
use crate::matrix::matrix::Matrix;
use crate::matrix::shape::Elements;

/// Square matrix with `value` on the diagonal and zeros elsewhere.
pub fn identity_matrix<T: Element>(n_rows: usize, n_cols: Option<usize>, value: T) -> Result<Matrix<T>> {
    if n_cols.is_some_and(|n_cols| n_cols != n_rows) {
        return Err(MatrixError::not_square(
            "The identity matrix can not be rectangular.",
        ));
    }
    Ok(Matrix::<T>::identity(n_rows).scale(value))
}

/// Zero matrix. A single row is returned as a flat vector.
pub fn null_matrix<T: Element>(n_rows: usize, n_cols: Option<usize>) -> Matrix<T> {
    let n_cols = n_cols.unwrap_or(n_rows);
    if n_rows <= 1 {
        return Matrix::vector(vec![T::zero(); n_cols]);
    }
    Matrix::new(Elements::Dense {
        rows: n_rows,
        cols: n_cols,
        cells: vec![T::zero(); n_rows * n_cols],
    })
}

/// Euclidean norm of a row or column vector, or its square.
pub fn vector_mag<T: Element>(vector: &Matrix<T>, squared: bool) -> Result<f64> {
    if vector.n_rows() != 1 && vector.n_cols() != 1 {
        return Err(MatrixError::dimension_mismatch(format!(
            "Magnitude needs a row or column vector, got {}.",
            vector.dim()
        )));
    }

    let sum_sq = vector
        .elements()
        .cells()
        .iter()
        .map(|x| x.to_f64_checked().map(|x| x * x))
        .sum::<Result<f64>>()?;
    Ok(if squared { sum_sq } else { sum_sq.sqrt() })
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_matrix() {
        assert_eq!(
            identity_matrix(3, None, 1).unwrap(),
            Matrix::from_list(vec![vec![1, 0, 0], vec![0, 1, 0], vec![0, 0, 1]]).unwrap()
        );
        assert_eq!(
            identity_matrix(2, Some(2), 5).unwrap(),
            Matrix::from_list(vec![vec![5, 0], vec![0, 5]]).unwrap()
        );
        assert_eq!(
            identity_matrix(2, Some(3), 1),
            Err(MatrixError::not_square(
                "The identity matrix can not be rectangular."
            ))
        );
    }

    #[test]
    fn test_null_matrix() {
        assert_eq!(null_matrix::<i64>(1, Some(3)), Matrix::vector(vec![0, 0, 0]));
        assert_eq!(null_matrix::<i64>(1, None), Matrix::vector(vec![0]));
        assert_eq!(
            null_matrix::<i64>(2, Some(3)),
            Matrix::from_list(vec![vec![0, 0, 0], vec![0, 0, 0]]).unwrap()
        );
        assert_eq!(null_matrix::<f64>(3, Some(1)), Matrix::column(vec![0.0; 3]));
    }

    #[test]
    fn test_vector_mag() {
        assert_eq!(vector_mag(&Matrix::vector(vec![3, 4]), false), Ok(5.0));
        assert_eq!(vector_mag(&Matrix::column(vec![3, 4]), true), Ok(25.0));
        assert_eq!(vector_mag(&Matrix::<i64>::vector(vec![]), false), Ok(0.0));
        assert!(matches!(
            vector_mag(&Matrix::from_list(vec![vec![1, 2], vec![3, 4]]).unwrap(), false),
            Err(MatrixError::DimensionMismatch(_))
        ));
    }
}
