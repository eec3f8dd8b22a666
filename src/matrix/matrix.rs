use crate::config::config;
use crate::error::{MatrixError, Result};
use crate::matrix::determinant;
use crate::matrix::element::{dot, Element};
use crate::matrix::inverse;
use crate::matrix::shape::{transpose_cells, Elements};
use crate::rings::fraction::Fraction;

/// Dense matrix or row vector.
///
/// Arithmetic always builds a new value; the only in-place mutation is
/// through [`Matrix::set`] and [`Matrix::set_element`]. Sharing one instance
/// between threads that mutate it needs external locking.
#[derive(Debug, Clone)]
pub struct Matrix<T> {
    elements: Elements<T>,
    /// Decimals used when rendering, cosmetic only.
    pub n_decimal: Option<usize>,
}

impl<T> Matrix<T> {
    pub fn new(elements: Elements<T>) -> Self {
        Matrix {
            elements,
            n_decimal: None,
        }
    }

    /// Row vector, stored flat.
    pub fn vector(values: Vec<T>) -> Self {
        Matrix::new(Elements::Vector(values))
    }

    /// Column vector, stored nested with one element per row.
    pub fn column(values: Vec<T>) -> Self {
        Matrix::new(Elements::Dense {
            rows: values.len(),
            cols: 1,
            cells: values,
        })
    }

    pub fn from_list(lines: Vec<Vec<T>>) -> Result<Self> {
        Ok(Matrix::new(Elements::from_list(lines)?))
    }

    pub fn with_n_decimal(mut self, n_decimal: usize) -> Self {
        self.n_decimal = Some(n_decimal);
        self
    }

    pub fn elements(&self) -> &Elements<T> {
        &self.elements
    }

    pub(crate) fn elements_mut(&mut self) -> &mut Elements<T> {
        &mut self.elements
    }

    pub fn n_rows(&self) -> usize {
        self.elements.n_rows()
    }

    pub fn n_cols(&self) -> usize {
        self.elements.n_cols()
    }

    pub fn dim(&self) -> String {
        format!("RxC: {}x{}", self.n_rows(), self.n_cols())
    }

    pub fn is_square(&self) -> bool {
        self.n_rows() == self.n_cols()
    }

    pub fn is_flat(&self) -> bool {
        self.elements.is_flat()
    }

    /// Elements of a vector, rows of a nested matrix.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl<T: Clone> Matrix<T> {
    /// Nested rows, the shape numeric array constructors accept.
    pub fn to_list(&self) -> Vec<Vec<T>> {
        self.elements.to_list()
    }

    /// Independent copy, storage included.
    pub fn deep_copy(&self) -> Matrix<T> {
        self.clone()
    }

    /// A single-column matrix becomes a row vector and a row vector with more
    /// than one element becomes a column; one-element and empty vectors are
    /// their own transpose.
    pub fn transpose(&self) -> Matrix<T> {
        let elements = match &self.elements {
            Elements::Vector(cells) if cells.len() > 1 => Elements::Dense {
                rows: cells.len(),
                cols: 1,
                cells: cells.clone(),
            },
            Elements::Vector(cells) => Elements::Vector(cells.clone()),
            Elements::Dense { cols: 1, cells, .. } => Elements::Vector(cells.clone()),
            Elements::Dense { rows, cols, cells } => Elements::Dense {
                rows: *cols,
                cols: *rows,
                cells: transpose_cells(*rows, *cols, cells),
            },
        };
        Matrix::new(elements)
    }

    pub fn t(&self) -> Matrix<T> {
        self.transpose()
    }

    /// Main-diagonal elements as a row vector.
    pub fn diagonal(&self) -> Matrix<T> {
        let n = self.n_rows().min(self.n_cols());
        Matrix::vector((0..n).map(|i| self.elements.at(i, i).clone()).collect())
    }
}

impl<T: PartialEq> PartialEq for Matrix<T> {
    fn eq(&self, other: &Matrix<T>) -> bool {
        self.elements == other.elements
    }
}

impl<T> From<Vec<T>> for Matrix<T> {
    fn from(values: Vec<T>) -> Matrix<T> {
        Matrix::vector(values)
    }
}

impl<T: Element> Matrix<T> {
    pub fn identity(n: usize) -> Matrix<T> {
        Matrix::new(Elements::Dense {
            rows: n,
            cols: n,
            cells: (0..n)
                .flat_map(|i| (0..n).map(move |j| if i == j { T::one() } else { T::zero() }))
                .collect(),
        })
    }

    fn require_square(&self, operation: &str) -> Result<()> {
        if !self.is_square() {
            return Err(MatrixError::not_square(format!(
                "Matrix must be square for {operation}, got {}.",
                self.dim()
            )));
        }
        Ok(())
    }

    pub fn trace(&self) -> Result<T> {
        self.require_square("trace calculation")?;
        Ok((0..self.n_rows())
            .map(|i| self.elements.at(i, i).clone())
            .sum())
    }

    /// Diagonal kept in place, every other element zeroed.
    pub fn diagonal_of_matrix(&self) -> Result<Matrix<T>> {
        self.require_square("diagonal_of_matrix")?;
        let n = self.n_cols();
        let cells = self
            .elements
            .cells()
            .iter()
            .enumerate()
            .map(|(k, x)| if k / n == k % n { x.clone() } else { T::zero() })
            .collect();
        Ok(Matrix::new(self.elements.with_cells(cells)))
    }

    /// Cofactor expansion, exponential in the order of the matrix.
    pub fn determinant(&self) -> Result<T> {
        determinant::determinant(self)
    }

    pub fn is_singular(&self) -> Result<bool> {
        Ok(self.determinant()?.is_zero())
    }

    pub fn inverse(&self) -> Result<Matrix<f64>> {
        inverse::inverse(self)
    }

    /// Inverse scaled by the determinant, shown as fractions.
    pub fn adjoint_matrix(&self) -> Result<Matrix<Fraction>> {
        let inverse = self.inverse()?;
        let determinant = self.determinant()?.to_f64_checked()?;
        inverse.scale(determinant).in_fractions()
    }

    pub fn to_f64(&self) -> Result<Matrix<f64>> {
        Ok(Matrix::new(
            self.elements.try_map_cells(|x| x.to_f64_checked())?,
        ))
    }

    /// Every element as its closest fraction under the configured
    /// denominator bound.
    pub fn in_fractions(&self) -> Result<Matrix<Fraction>> {
        let max_den = config().max_denominator;
        Ok(Matrix::new(self.elements.try_map_cells(|x| {
            Fraction::approximate(x.to_f64_checked()?, max_den)
        })?))
    }

    pub fn hadamard_product(&self, other: &Matrix<T>) -> Result<Matrix<T>> {
        if self.n_rows() != other.n_rows() || self.n_cols() != other.n_cols() {
            return Err(MatrixError::dimension_mismatch(format!(
                "Element-wise product needs equal shapes, got {} and {}.",
                self.dim(),
                other.dim()
            )));
        }

        let cells = self
            .elements
            .cells()
            .iter()
            .zip(other.elements.cells())
            .map(|(a, b)| a.clone() * b.clone())
            .collect();
        Ok(Matrix::new(self.elements.with_cells(cells)))
    }

    pub fn elementwise_product(&self, other: &Matrix<T>) -> Result<Matrix<T>> {
        self.hadamard_product(other)
    }

    /// Dot product of two row vectors.
    pub fn dot(&self, other: &Matrix<T>) -> Result<T> {
        if !self.is_flat() || !other.is_flat() || self.len() != other.len() {
            return Err(MatrixError::dimension_mismatch(format!(
                "Dot product needs two row vectors of equal length, got {} and {}.",
                self.dim(),
                other.dim()
            )));
        }
        Ok(dot(self.elements.cells(), other.elements.cells()))
    }
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------
