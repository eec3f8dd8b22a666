use crate::config::config;
use crate::error::{MatrixError, Result};
use crate::matrix::element::Element;
use crate::matrix::matrix::Matrix;

/// Laplace expansion along the first row.
///
/// Runs in O(n!) and is only practical for small matrices; orders from the
/// configured `cofactor_warn_order` upwards are logged but still computed.
/// The arithmetic stays in `T`, so integer input gives an exact result.
pub fn determinant<T: Element>(matrix: &Matrix<T>) -> Result<T> {
    if !matrix.is_square() {
        return Err(MatrixError::not_square(
            "Matrix must be square for determinant calculation.",
        ));
    }

    let n = matrix.n_rows();
    if n >= config().cofactor_warn_order {
        log::warn!("Cofactor expansion on a {n}x{n} matrix, this grows factorially");
    }
    log::debug!("determinant of {}", matrix.dim());

    Ok(cofactor_expansion(n, matrix.elements().cells()))
}

/// Determinant of the row-major `n x n` matrix in `cells`.
pub fn cofactor_expansion<T: Element>(n: usize, cells: &[T]) -> T {
    match n {
        0 => T::one(),
        1 => cells[0].clone(),
        _ => {
            let mut det = T::zero();
            for j in 0..n {
                let cofactor = if j % 2 == 0 {
                    cells[j].clone()
                } else {
                    -cells[j].clone()
                };
                det = det + cofactor * cofactor_expansion(n - 1, &minor(n, cells, j));
            }
            det
        }
    }
}

// Drops row 0 and column `col`.
fn minor<T: Clone>(n: usize, cells: &[T], col: usize) -> Vec<T> {
    cells[n..]
        .chunks(n)
        .flat_map(|row| {
            row.iter()
                .enumerate()
                .filter(move |(c, _)| *c != col)
                .map(|(_, x)| x.clone())
        })
        .collect()
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------
