use crate::error::{MatrixError, Result};
use crate::matrix::element::Element;
use crate::matrix::matrix::Matrix;

// Square with ones on the diagonal and zeros elsewhere, whatever the storage.
fn is_identity<T: Element>(matrix: &Matrix<T>) -> bool {
    let n = matrix.n_cols();
    matrix.is_square()
        && matrix
            .elements()
            .cells()
            .iter()
            .enumerate()
            .all(|(k, x)| if k / n == k % n { x.is_one() } else { x.is_zero() })
}

impl<T: Element> Matrix<T> {
    pub fn is_symmetric(&self) -> bool {
        *self == self.transpose()
    }

    /// `A * A^T` is the identity.
    pub fn is_orthogonal(&self) -> Result<bool> {
        Ok(is_identity(&self.multiply(&self.transpose())?))
    }

    /// `A * B^T` is the identity, for two matrices of the same order.
    pub fn is_orthogonal_to(&self, other: &Matrix<T>) -> Result<bool> {
        if self.dim() != other.dim() {
            return Err(MatrixError::dimension_mismatch(format!(
                "{} and {} have different orders.",
                self.dim(),
                other.dim()
            )));
        }
        Ok(is_identity(&self.multiply(&other.transpose())?))
    }

    /// Symmetric and `z^T A z > 0` for `z` the all-ones column. Only that one
    /// vector is tried, so `true` is not a proof of definiteness.
    pub fn is_positive_definite(&self) -> Result<bool> {
        if self.is_empty() || !self.is_symmetric() {
            return Ok(false);
        }

        let n = self.n_cols();
        let az = self.multiply(&Matrix::column(vec![T::one(); n]))?;
        let q = Matrix::vector(vec![T::one(); n]).multiply(&az)?;
        Ok(q
            .elements()
            .cells()
            .first()
            .is_some_and(|q| *q > T::zero()))
    }

    pub fn is_multiplicative_inverse_of(&self, other: &Matrix<T>) -> Result<bool> {
        Ok(is_identity(&self.multiply(other)?))
    }
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------
