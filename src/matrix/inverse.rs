use crate::error::{MatrixError, Result};
use crate::matrix::element::Element;
use crate::matrix::matrix::Matrix;

/// Gauss-Jordan elimination with partial pivoting on `[A | I]`.
///
/// Scaling divides in `f64` whatever `T` is, so the inverse is always a float
/// matrix. The caller's matrix is copied, never touched.
pub fn inverse<T: Element>(matrix: &Matrix<T>) -> Result<Matrix<f64>> {
    if !matrix.is_square() {
        return Err(MatrixError::not_square(
            "Matrix must be square for inverse calculation.",
        ));
    }

    let n = matrix.n_rows();
    let width = 2 * n;
    log::debug!("inverse of {}", matrix.dim());

    let mut aug = vec![0.0f64; n * width];
    for (k, x) in matrix.elements().cells().iter().enumerate() {
        aug[(k / n) * width + k % n] = x.to_f64_checked()?;
    }
    for i in 0..n {
        aug[i * width + n + i] = 1.0;
    }

    for col in 0..n {
        let pivot = pivot_row(&aug, width, n, col).ok_or_else(|| {
            MatrixError::SingularMatrix(Some(format!("No pivot found in column {col}.")))
        })?;
        log::trace!("column {col}: pivot row {pivot}");

        if pivot != col {
            for k in 0..width {
                aug.swap(col * width + k, pivot * width + k);
            }
        }

        let factor = 1.0 / aug[col * width + col];
        scale_row(&mut aug, width, col, factor);

        for row in 0..n {
            if row != col {
                let factor = -aug[row * width + col];
                add_scaled_row(&mut aug, width, col, row, factor);
            }
        }
    }

    let cells = aug
        .chunks(width)
        .flat_map(|row| row[n..].iter().copied())
        .collect();
    Ok(Matrix::new(matrix.elements().with_cells(cells)))
}

// Row at or below `col` with the largest non-zero magnitude in `col`.
fn pivot_row(aug: &[f64], width: usize, n: usize, col: usize) -> Option<usize> {
    let mut max_val = 0.0;
    let mut max_row = None;
    for row in col..n {
        let value = aug[row * width + col].abs();
        if value > max_val {
            max_val = value;
            max_row = Some(row);
        }
    }
    max_row
}

fn scale_row(aug: &mut [f64], width: usize, row: usize, factor: f64) {
    for x in &mut aug[row * width..(row + 1) * width] {
        *x *= factor;
    }
}

fn add_scaled_row(aug: &mut [f64], width: usize, source: usize, target: usize, factor: f64) {
    for k in 0..width {
        let scaled = aug[source * width + k] * factor;
        aug[target * width + k] += scaled;
    }
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------
