use crate::error::{MatrixError, Result};
use crate::matrix::element::{dot, Element};
use crate::matrix::matrix::Matrix;
use crate::matrix::shape::{transpose_cells, Elements};
use itertools::Itertools;
use rayon::prelude::*;
use std::convert::Infallible;
use std::ops;

/// Which positions [`Matrix::map`] rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapTarget {
    #[default]
    Full,
    Diagonal,
    OffDiagonal,
}

impl MapTarget {
    fn covers(self, row: usize, col: usize) -> bool {
        match self {
            MapTarget::Full => true,
            MapTarget::Diagonal => row == col,
            MapTarget::OffDiagonal => row != col,
        }
    }
}

/// Algorithm picked for a product, from the shapes of both operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductKind {
    /// Row vector times a single column: one dot product.
    RowByColumn,
    /// Row vector times a multi-column matrix: one dot product per column,
    /// as a row vector.
    RowByMatrix,
    /// One-element row vector times a row vector.
    ScalarByRow,
    /// Matrix times a single column.
    MatrixByColumn,
    /// General case, row by column against the transposed right operand.
    MatrixByMatrix,
    /// Single column times a row vector.
    ColumnByRow,
}

impl ProductKind {
    pub fn of<T>(lhs: &Elements<T>, rhs: &Elements<T>) -> ProductKind {
        match (lhs.is_flat(), rhs.is_flat()) {
            (true, false) if rhs.n_cols() == 1 => ProductKind::RowByColumn,
            (true, false) => ProductKind::RowByMatrix,
            (true, true) => ProductKind::ScalarByRow,
            (false, false) if rhs.n_cols() == 1 => ProductKind::MatrixByColumn,
            (false, false) => ProductKind::MatrixByMatrix,
            (false, true) => ProductKind::ColumnByRow,
        }
    }
}

impl<T: Element> Matrix<T> {
    fn require_same_shape(&self, rhs: &Matrix<T>) -> Result<()> {
        if self.n_rows() != rhs.n_rows() || self.n_cols() != rhs.n_cols() {
            return Err(MatrixError::dimension_mismatch(format!(
                "{} and {} can not be added.",
                self.dim(),
                rhs.dim()
            )));
        }
        Ok(())
    }

    fn map_cells(&self, f: impl FnMut(&T) -> T) -> Matrix<T> {
        Matrix::new(self.elements().map_cells(f))
    }

    /// Element-wise sum; the result keeps the shape class of `self`.
    pub fn add(&self, rhs: &Matrix<T>) -> Result<Matrix<T>> {
        self.require_same_shape(rhs)?;
        let cells = self
            .elements()
            .cells()
            .iter()
            .zip(rhs.elements().cells())
            .map(|(a, b)| a.clone() + b.clone())
            .collect();
        Ok(Matrix::new(self.elements().with_cells(cells)))
    }

    pub fn add_scalar(&self, value: T) -> Matrix<T> {
        self.map_cells(|x| x.clone() + value.clone())
    }

    pub fn subtract(&self, rhs: &Matrix<T>) -> Result<Matrix<T>> {
        self.add(&rhs.scale(T::minus_one()))
    }

    pub fn subtract_scalar(&self, value: T) -> Matrix<T> {
        self.map_cells(|x| x.clone() - value.clone())
    }

    pub fn scale(&self, value: T) -> Matrix<T> {
        self.map_cells(|x| x.clone() * value.clone())
    }

    pub fn negate(&self) -> Matrix<T> {
        self.scale(T::minus_one())
    }

    /// Matrix product. A one-element result is a 1x1 matrix, never a bare
    /// scalar.
    pub fn multiply(&self, rhs: &Matrix<T>) -> Result<Matrix<T>> {
        if self.n_cols() != rhs.n_rows() {
            return Err(MatrixError::dimension_mismatch(format!(
                "Inner CxR={}x{}, not allowed.",
                self.n_cols(),
                rhs.n_rows()
            )));
        }

        let (lhs, rhs) = (self.elements(), rhs.elements());
        let kind = ProductKind::of(lhs, rhs);
        log::trace!(
            "multiply {}x{} by {}x{} as {kind:?}",
            lhs.n_rows(),
            lhs.n_cols(),
            rhs.n_rows(),
            rhs.n_cols()
        );

        let elements = match kind {
            ProductKind::RowByColumn => Elements::Vector(vec![dot(lhs.cells(), rhs.cells())]),
            ProductKind::RowByMatrix => {
                let rot = transpose_cells(rhs.n_rows(), rhs.n_cols(), rhs.cells());
                let n = rhs.n_rows();
                Elements::Vector(
                    (0..rhs.n_cols())
                        .map(|c| dot(lhs.cells(), &rot[c * n..(c + 1) * n]))
                        .collect(),
                )
            }
            ProductKind::ScalarByRow => {
                let a = &lhs.cells()[0];
                Elements::Vector(rhs.cells().iter().map(|b| a.clone() * b.clone()).collect())
            }
            ProductKind::MatrixByColumn => column_product(lhs, rhs.cells()),
            ProductKind::MatrixByMatrix => dense_product(lhs, rhs),
            ProductKind::ColumnByRow => {
                let row = Elements::Dense {
                    rows: 1,
                    cols: rhs.n_cols(),
                    cells: rhs.cells().to_vec(),
                };
                if row.n_cols() == 1 {
                    column_product(lhs, row.cells())
                } else {
                    dense_product(lhs, &row)
                }
            }
        };
        Ok(Matrix::new(elements))
    }

    /// Always fails: dividing by a matrix is not defined.
    pub fn divide(&self, _rhs: &Matrix<T>) -> Result<Matrix<T>> {
        Err(MatrixError::DivisionByMatrix(None))
    }

    pub fn divide_scalar(&self, value: T) -> Result<Matrix<T>> {
        if value.is_zero() {
            return Err(MatrixError::DivisionByZero(None));
        }
        Ok(self.map_cells(|x| x.clone() / value.clone()))
    }

    /// Element-wise `x^exponent`, reduced modulo `modulus` when given.
    pub fn power(&self, exponent: usize, modulus: Option<T>) -> Result<Matrix<T>> {
        match modulus {
            None => Ok(self.map(|x| num_traits::pow(x.clone(), exponent), MapTarget::Full)),
            Some(m) if m.is_zero() => Err(MatrixError::DivisionByZero(Some(
                "Modulus must be non-zero.".into(),
            ))),
            Some(m) => Ok(self.map(
                |x| num_traits::pow(x.clone(), exponent) % m.clone(),
                MapTarget::Full,
            )),
        }
    }

    pub fn equals(&self, rhs: &Matrix<T>) -> bool {
        self == rhs
    }

    /// Same shape and every pair of elements within `tolerance` as `f64`.
    pub fn approx_eq(&self, rhs: &Matrix<T>, tolerance: f64) -> bool {
        self.elements().is_flat() == rhs.elements().is_flat()
            && self.n_rows() == rhs.n_rows()
            && self.n_cols() == rhs.n_cols()
            && self
                .elements()
                .cells()
                .iter()
                .zip(rhs.elements().cells())
                .all(|(a, b)| match (a.to_f64(), b.to_f64()) {
                    (Some(a), Some(b)) => (a - b).abs() <= tolerance,
                    _ => false,
                })
    }
}

impl<T: Clone> Matrix<T> {
    /// New matrix with `f` applied on the `target` positions and the
    /// original elements everywhere else.
    pub fn map(&self, mut f: impl FnMut(&T) -> T, target: MapTarget) -> Matrix<T> {
        match self.try_map(|x| Ok::<T, Infallible>(f(x)), target) {
            Ok(matrix) => matrix,
            Err(never) => match never {},
        }
    }

    pub fn try_map<E>(
        &self,
        mut f: impl FnMut(&T) -> std::result::Result<T, E>,
        target: MapTarget,
    ) -> std::result::Result<Matrix<T>, E> {
        let elements = self.elements();
        let cells = (0..elements.n_rows())
            .cartesian_product(0..elements.n_cols())
            .map(|(row, col)| {
                let x = elements.at(row, col);
                if target.covers(row, col) {
                    f(x)
                } else {
                    Ok(x.clone())
                }
            })
            .collect::<std::result::Result<Vec<T>, E>>()?;
        Ok(Matrix::new(elements.with_cells(cells)))
    }
}

fn column_product<T: Element>(lhs: &Elements<T>, column: &[T]) -> Elements<T> {
    Elements::Dense {
        rows: lhs.n_rows(),
        cols: 1,
        cells: (0..lhs.n_rows()).map(|r| dot(lhs.row(r), column)).collect(),
    }
}

fn dense_product<T: Element>(lhs: &Elements<T>, rhs: &Elements<T>) -> Elements<T> {
    let rows = lhs.n_rows();
    let cols = rhs.n_cols();
    let inner = lhs.n_cols();
    let mut cells = vec![T::zero(); rows * cols];
    if cols == 0 {
        return Elements::Dense { rows, cols, cells };
    }

    let rot = transpose_cells(rhs.n_rows(), cols, rhs.cells());
    cells.par_chunks_mut(cols).enumerate().for_each(|(r, row)| {
        for (c, cell) in row.iter_mut().enumerate() {
            *cell = dot(lhs.row(r), &rot[c * inner..(c + 1) * inner]);
        }
    });

    Elements::Dense { rows, cols, cells }
}

impl<T: Element> ops::Add<&Matrix<T>> for &Matrix<T> {
    type Output = Result<Matrix<T>>;

    fn add(self, rhs: &Matrix<T>) -> Result<Matrix<T>> {
        Matrix::add(self, rhs)
    }
}

impl<T: Element> ops::Sub<&Matrix<T>> for &Matrix<T> {
    type Output = Result<Matrix<T>>;

    fn sub(self, rhs: &Matrix<T>) -> Result<Matrix<T>> {
        self.subtract(rhs)
    }
}

impl<T: Element> ops::Mul<&Matrix<T>> for &Matrix<T> {
    type Output = Result<Matrix<T>>;

    fn mul(self, rhs: &Matrix<T>) -> Result<Matrix<T>> {
        self.multiply(rhs)
    }
}

impl<T: Element> ops::Div<&Matrix<T>> for &Matrix<T> {
    type Output = Result<Matrix<T>>;

    fn div(self, rhs: &Matrix<T>) -> Result<Matrix<T>> {
        self.divide(rhs)
    }
}

impl<T: Element> ops::Neg for &Matrix<T> {
    type Output = Matrix<T>;

    fn neg(self) -> Matrix<T> {
        self.negate()
    }
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn m(lines: Vec<Vec<i64>>) -> Matrix<i64> {
        Matrix::from_list(lines).unwrap()
    }

    fn random_matrix(rng: &mut StdRng, rows: usize, cols: usize) -> Matrix<i64> {
        m((0..rows)
            .map(|_| (0..cols).map(|_| rng.gen_range(-9..=9)).collect())
            .collect())
    }

    #[test]
    fn test_negation() {
        assert_eq!(
            -&m(vec![vec![2, 6], vec![3, 2]]),
            m(vec![vec![-2, -6], vec![-3, -2]])
        );
        assert_eq!(
            m(vec![vec![1, -5], vec![2, 3]]).negate(),
            m(vec![vec![-1, 5], vec![-2, -3]])
        );
        assert_eq!(-&Matrix::vector(vec![1, -2]), Matrix::vector(vec![-1, 2]));
    }

    #[test]
    fn test_addition() {
        let e1 = m(vec![vec![2, 1], vec![-1, 3]]);
        let e3 = m(vec![vec![-1, 0], vec![1, 2]]);
        assert_eq!((&e1 + &e3).unwrap(), m(vec![vec![1, 1], vec![0, 5]]));

        let g1 = m(vec![vec![1, 2, 3], vec![-1, -1, -1], vec![0, 1, 2]]);
        let g2 = m(vec![vec![1, 1, 1], vec![2, 2, 2], vec![3, 3, 3]]);
        assert_eq!(
            (&g1 + &g2).unwrap(),
            m(vec![vec![2, 3, 4], vec![1, 1, 1], vec![3, 4, 5]])
        );

        let g3 = m(vec![vec![1, 0], vec![0, 1]]);
        let g4 = m(vec![vec![0, 2], vec![3, 0]]);
        let g5 = m(vec![vec![1, 1], vec![1, 0]]);
        assert_eq!(
            (&(&g3 + &g4).unwrap() + &g5).unwrap(),
            m(vec![vec![2, 3], vec![4, 1]])
        );

        assert_eq!(
            Matrix::vector(vec![1, 2]).add(&Matrix::vector(vec![3, 4])),
            Ok(Matrix::vector(vec![4, 6]))
        );
        assert_eq!(e1.add_scalar(1), m(vec![vec![3, 2], vec![0, 4]]));
        assert_eq!(e1.subtract_scalar(1), m(vec![vec![1, 0], vec![-2, 2]]));
    }

    #[test]
    fn test_addition_dimension_mismatch() {
        let error = m(vec![vec![1, 2]]).add(&m(vec![vec![1], vec![2]])).unwrap_err();
        assert!(matches!(error, MatrixError::DimensionMismatch(_)));
        assert!((&Matrix::vector(vec![1, 2]) - &Matrix::vector(vec![1])).is_err());
    }

    #[test]
    fn test_multiplication() {
        let f1 = m(vec![vec![-1, 2], vec![2, 1]]);
        assert_eq!(f1.scale(2), m(vec![vec![-2, 4], vec![4, 2]]));
        assert_eq!(
            m(vec![vec![1], vec![-1]]).scale(-1),
            m(vec![vec![-1], vec![1]])
        );

        let h1 = m(vec![vec![1, -2], vec![3, 4]]);
        let h2 = m(vec![vec![0, 7], vec![-3, 8]]);
        assert_eq!(
            (&h1.scale(3) - &h2.scale(2)).unwrap(),
            m(vec![vec![3, -20], vec![15, -4]])
        );

        let h3 = m(vec![vec![2, 3], vec![1, 1], vec![0, -2]]);
        let h4 = m(vec![vec![2, -1], vec![3, 0]]);
        assert_eq!(
            (&h3 * &h4).unwrap(),
            m(vec![vec![13, -2], vec![5, -1], vec![-6, 0]])
        );
    }

    #[test]
    fn test_product_dispatch() {
        let row = Matrix::vector(vec![1, 2, 3]);
        let column = Matrix::column(vec![4, 5, 6]);
        assert_eq!(ProductKind::of(row.elements(), column.elements()), ProductKind::RowByColumn);
        assert_eq!(row.multiply(&column), Ok(Matrix::vector(vec![32])));

        let b = m(vec![vec![1, 0], vec![0, 1], vec![1, 1]]);
        assert_eq!(ProductKind::of(row.elements(), b.elements()), ProductKind::RowByMatrix);
        assert_eq!(row.multiply(&b), Ok(Matrix::vector(vec![4, 5])));

        assert_eq!(
            Matrix::vector(vec![2]).multiply(&Matrix::vector(vec![1, 2, 3])),
            Ok(Matrix::vector(vec![2, 4, 6]))
        );

        let a = m(vec![vec![1, 2], vec![3, 4]]);
        let col = Matrix::column(vec![1, 1]);
        assert_eq!(ProductKind::of(a.elements(), col.elements()), ProductKind::MatrixByColumn);
        assert_eq!(a.multiply(&col), Ok(Matrix::column(vec![3, 7])));

        assert_eq!(
            column.multiply(&Matrix::vector(vec![1, -1])),
            Ok(m(vec![vec![4, -4], vec![5, -5], vec![6, -6]]))
        );
        assert_eq!(
            column.multiply(&Matrix::vector(vec![2])),
            Ok(Matrix::column(vec![8, 10, 12]))
        );
    }

    #[test]
    fn test_single_element_result_stays_a_matrix() {
        let product = Matrix::vector(vec![3]).multiply(&m(vec![vec![4]])).unwrap();
        assert_eq!(product, Matrix::vector(vec![12]));
        assert_eq!((product.n_rows(), product.n_cols()), (1, 1));

        let product = m(vec![vec![3]]).multiply(&m(vec![vec![4]])).unwrap();
        assert_eq!(product, Matrix::column(vec![12]));
    }

    #[test]
    fn test_multiplication_dimension_mismatch() {
        let error = m(vec![vec![1, 2], vec![3, 4]])
            .multiply(&m(vec![vec![1, 2, 3]]))
            .unwrap_err();
        assert_eq!(
            error,
            MatrixError::dimension_mismatch("Inner CxR=2x1, not allowed.")
        );
    }

    #[test]
    fn test_division() {
        let a = m(vec![vec![2, 4], vec![6, 8]]);
        assert_eq!(a.divide_scalar(2), Ok(m(vec![vec![1, 2], vec![3, 4]])));
        assert_eq!(a.divide_scalar(0), Err(MatrixError::DivisionByZero(None)));

        for rhs in [
            a.clone(),
            Matrix::vector(vec![1]),
            Matrix::column(vec![1, 2]),
            Matrix::vector(vec![]),
        ] {
            assert_eq!(&a / &rhs, Err(MatrixError::DivisionByMatrix(None)));
        }
    }

    #[test]
    fn test_power_and_map() {
        let a = m(vec![vec![1, 2], vec![3, 4]]);
        assert_eq!(a.power(2, None), Ok(m(vec![vec![1, 4], vec![9, 16]])));
        assert_eq!(a.power(3, Some(5)), Ok(m(vec![vec![1, 3], vec![2, 4]])));
        assert!(a.power(2, Some(0)).is_err());

        assert_eq!(
            a.map(|x| x * 10, MapTarget::Diagonal),
            m(vec![vec![10, 2], vec![3, 40]])
        );
        assert_eq!(
            a.map(|x| -x, MapTarget::OffDiagonal),
            m(vec![vec![1, -2], vec![-3, 4]])
        );
        assert_eq!(
            Matrix::vector(vec![1, 2]).map(|x| x + 1, MapTarget::Diagonal),
            Matrix::vector(vec![2, 2])
        );

        let failed: std::result::Result<_, String> =
            a.try_map(|x| if *x > 3 { Err(format!("{x}")) } else { Ok(*x) }, MapTarget::Full);
        assert_eq!(failed, Err("4".to_string()));
    }

    #[test]
    fn test_operands_are_not_mutated() {
        let a = m(vec![vec![1, 2], vec![3, 4]]);
        let b = m(vec![vec![5, 6], vec![7, 8]]);
        let (a0, b0) = (a.deep_copy(), b.deep_copy());
        let _ = (&a + &b, &a - &b, &a * &b, -&a, a.scale(3));
        assert_eq!((a, b), (a0, b0));
    }

    #[test]
    fn test_multiple_operators() {
        let i1 = m(vec![vec![-1, 3], vec![2, 0]]);
        let i2 = m(vec![vec![1, 2], vec![-3, -5]]);
        let i3 = m(vec![vec![2, 1], vec![1, 3]]);

        assert_eq!(
            &i1 * &(&i2 * &i3).unwrap(),
            &(&i1 * &i2).unwrap() * &i3
        );
        assert_eq!(
            &i1 * &(&i2 - &i3).unwrap(),
            &(&i1 * &i2).unwrap() - &(&i1 * &i3).unwrap()
        );
        assert_eq!((&i1 * &i2).unwrap().t(), (&i2.t() * &i1.t()).unwrap());

        let h1 = m(vec![vec![1, -2], vec![3, 4]]);
        let h2 = m(vec![vec![0, 7], vec![-3, 8]]);
        assert_eq!((&h1 - &h2).unwrap().t(), (&h1.t() - &h2.t()).unwrap());
    }

    #[test]
    fn test_algebraic_properties_on_random_matrices() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let n = rng.gen_range(1..=4);
            let p = rng.gen_range(1..=4);
            let q = rng.gen_range(1..=4);
            let k = rng.gen_range(1..=3);
            // flat row vectors on the left, single columns on the right
            let a = if rng.gen_bool(0.5) {
                Matrix::vector((0..p).map(|_| rng.gen_range(-9..=9)).collect())
            } else {
                random_matrix(&mut rng, n, p)
            };
            let b = random_matrix(&mut rng, p, q);
            let c = random_matrix(&mut rng, q, k);
            let d = random_matrix(&mut rng, p, q);

            assert_eq!(
                a.multiply(&b.multiply(&c).unwrap()).unwrap(),
                a.multiply(&b).unwrap().multiply(&c).unwrap()
            );
            assert_eq!(
                a.multiply(&(&b - &d).unwrap()).unwrap(),
                (&(&a * &b).unwrap() - &(&a * &d).unwrap()).unwrap()
            );
            assert_eq!(
                a.multiply(&b).unwrap().transpose(),
                b.transpose().multiply(&a.transpose()).unwrap()
            );

            let square = random_matrix(&mut rng, p, p);
            assert_eq!(square.transpose().transpose(), square);
        }
    }

    #[test]
    fn test_row_vector_products_keep_properties() {
        let a = Matrix::vector(vec![1, 2]);
        let b = m(vec![vec![1, 2], vec![3, 4]]);
        let c = m(vec![vec![0, 1], vec![1, 0]]);
        assert_eq!(a.multiply(&b), Ok(Matrix::vector(vec![7, 10])));
        assert_eq!(
            a.multiply(&b).unwrap().multiply(&c),
            Ok(Matrix::vector(vec![10, 7]))
        );
        assert_eq!(
            a.multiply(&b.multiply(&c).unwrap()),
            a.multiply(&b).unwrap().multiply(&c)
        );

        let column = Matrix::column(vec![5, 6]);
        let product = b.multiply(&column).unwrap();
        assert_eq!(product, Matrix::column(vec![17, 39]));
        assert_eq!(
            product.transpose(),
            column.transpose().multiply(&b.transpose()).unwrap()
        );
        assert_eq!(product.transpose().to_string(), "[17 39]");
    }

    #[test]
    fn test_inverse_property_on_random_matrices() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut checked = 0;
        while checked < 20 {
            let n = rng.gen_range(1..=4);
            let a = random_matrix(&mut rng, n, n);
            if a.is_singular().unwrap() {
                assert!(a.determinant().unwrap() == 0);
                continue;
            }
            let product = a.inverse().unwrap().multiply(&a.to_f64().unwrap()).unwrap();
            assert!(product.approx_eq(&Matrix::identity(n), 1e-6));
            checked += 1;
        }
    }
}
