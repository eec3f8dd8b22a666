use crate::config::config;
use crate::error::MatrixError;
use crate::matrix::arithmetic::MapTarget;
use crate::matrix::element::Element;
use crate::matrix::factories;
use crate::matrix::index::{Entry, MatrixIndex, Span};
use crate::matrix::matrix::Matrix;
use crate::matrix::shape::Elements;
use crate::rings::fraction::Fraction;
use num_bigint::BigInt;
use pyo3::create_exception;
use pyo3::exceptions::{PyException, PyTypeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyFloat, PyList, PySlice, PyType};

create_exception!(umatrix, MatrixException, PyException);
create_exception!(umatrix, MatrixDimensionsMismatch, MatrixException);
create_exception!(umatrix, NotASquareMatrix, MatrixException);
create_exception!(umatrix, SlicingNotAllowed, MatrixException);
create_exception!(umatrix, IndexOutOfBounds, MatrixException);
create_exception!(umatrix, DivisionByMatrix, MatrixException);
create_exception!(umatrix, DeterminantIsZero, MatrixException);
create_exception!(umatrix, DivisionByZero, MatrixException);
create_exception!(umatrix, ConversionFailed, MatrixException);

impl From<MatrixError> for PyErr {
    fn from(error: MatrixError) -> PyErr {
        let message = error.to_string();
        match error {
            MatrixError::DimensionMismatch(_) => MatrixDimensionsMismatch::new_err(message),
            MatrixError::NotSquareMatrix(_) => NotASquareMatrix::new_err(message),
            MatrixError::SlicingNotAllowed(_) => SlicingNotAllowed::new_err(message),
            MatrixError::IndexOutOfBounds(_) => IndexOutOfBounds::new_err(message),
            MatrixError::DivisionByMatrix(_) => DivisionByMatrix::new_err(message),
            MatrixError::SingularMatrix(_) => DeterminantIsZero::new_err(message),
            MatrixError::DivisionByZero(_) => DivisionByZero::new_err(message),
            MatrixError::ConversionFailed(_) => ConversionFailed::new_err(message),
        }
    }
}

/// Constructor input: a list of numbers or a list of rows.
#[derive(FromPyObject)]
pub enum Layout {
    Nested(Vec<Vec<f64>>),
    Flat(Vec<f64>),
}

/// Right-hand side of the arithmetic operators.
#[derive(FromPyObject)]
pub enum Operand {
    Matrix(PyMatrix),
    Scalar(f64),
}

/// Argument of the module-level `determinant`. Lists of Python ints are kept
/// as `BigInt` so the result stays exact past 2^53.
#[derive(FromPyObject)]
pub enum DeterminantInput {
    Matrix(PyMatrix),
    Exact(Vec<Vec<BigInt>>),
    Float(Vec<Vec<f64>>),
}

/// Value given to `__setitem__`.
#[derive(FromPyObject)]
pub enum Assigned {
    Matrix(PyMatrix),
    Row(Vec<f64>),
    Scalar(f64),
}

impl From<Assigned> for Entry<f64> {
    fn from(value: Assigned) -> Entry<f64> {
        match value {
            Assigned::Matrix(matrix) => Entry::Matrix(matrix.inner),
            Assigned::Row(values) => Entry::Matrix(values.into()),
            Assigned::Scalar(x) => Entry::Scalar(x),
        }
    }
}

fn position(index: isize, len: usize) -> PyResult<usize> {
    let resolved = if index < 0 { index + len as isize } else { index };
    usize::try_from(resolved).map_err(|_| {
        MatrixError::index_out_of_bounds(format!(
            "Index {index} is out of range for length {len}."
        ))
        .into()
    })
}

fn span(slice: &Bound<'_, PySlice>, len: usize) -> PyResult<Span> {
    let indices = slice.indices(len as isize)?;
    if indices.step < 1 {
        return Err(MatrixError::SlicingNotAllowed(Some(
            "Only positive slice steps are supported.".into(),
        ))
        .into());
    }
    Ok(Span::new(
        indices.start as usize,
        indices.stop as usize,
        indices.step as usize,
    ))
}

fn matrix_index(matrix: &Matrix<f64>, index: &Bound<'_, PyAny>) -> PyResult<MatrixIndex> {
    if let Ok(i) = index.extract::<isize>() {
        return Ok(MatrixIndex::At(position(i, matrix.len())?));
    }
    if let Ok(slice) = index.downcast::<PySlice>() {
        return Ok(MatrixIndex::Rows(span(slice, matrix.len())?));
    }
    if let Ok((rows, cols)) = index.extract::<(Bound<'_, PySlice>, Bound<'_, PySlice>)>() {
        return Ok(MatrixIndex::Block(
            span(&rows, matrix.n_rows())?,
            span(&cols, matrix.n_cols())?,
        ));
    }
    Err(PyTypeError::new_err(
        "Matrix indices must be integers, slices or a pair of slices.",
    ))
}

fn map_target(apply_to: &str) -> Option<MapTarget> {
    match apply_to {
        "full" => Some(MapTarget::Full),
        "diagonal" => Some(MapTarget::Diagonal),
        "off-diagonal" => Some(MapTarget::OffDiagonal),
        _ => None,
    }
}

#[derive(Debug, Clone)]
#[pyclass(name = "Matrix")]
pub struct PyMatrix {
    pub inner: Matrix<f64>,
}

impl From<Matrix<f64>> for PyMatrix {
    fn from(inner: Matrix<f64>) -> PyMatrix {
        PyMatrix { inner }
    }
}

#[pymethods]
impl PyMatrix {
    #[new]
    #[pyo3(signature = (elements, n_decimal=None))]
    fn new(elements: Layout, n_decimal: Option<usize>) -> PyResult<Self> {
        let mut inner = match elements {
            Layout::Nested(lines) => Matrix::from_list(lines)?,
            Layout::Flat(values) => Matrix::vector(values),
        };
        inner.n_decimal = n_decimal;
        Ok(inner.into())
    }

    #[classmethod]
    pub fn from_list(_cls: &Bound<PyType>, lines: Vec<Vec<f64>>) -> PyResult<Self> {
        Ok(Matrix::from_list(lines)?.into())
    }

    pub fn to_list(&self) -> Vec<Vec<f64>> {
        self.inner.to_list()
    }

    /// Hands the nested rows to `array_function`, e.g. `numpy.array`.
    pub fn get_numpy_compatible_matrix<'py>(
        &self,
        array_function: &Bound<'py, PyAny>,
    ) -> PyResult<Bound<'py, PyAny>> {
        array_function.call1((self.inner.to_list(),))
    }

    /// Flat list for a vector, list of rows otherwise.
    #[getter]
    pub fn elements(&self, py: Python<'_>) -> PyResult<PyObject> {
        Ok(match self.inner.elements() {
            Elements::Vector(cells) => PyList::new(py, cells)?.into_any().unbind(),
            Elements::Dense { .. } => PyList::new(py, self.inner.to_list())?.into_any().unbind(),
        })
    }

    #[getter]
    pub fn n_decimal(&self) -> Option<usize> {
        self.inner.n_decimal
    }

    pub fn __add__(&self, rhs: Operand) -> PyResult<PyMatrix> {
        Ok(match rhs {
            Operand::Matrix(rhs) => self.inner.add(&rhs.inner)?,
            Operand::Scalar(x) => self.inner.add_scalar(x),
        }
        .into())
    }

    pub fn __radd__(&self, lhs: Operand) -> PyResult<PyMatrix> {
        self.__add__(lhs)
    }

    pub fn __sub__(&self, rhs: Operand) -> PyResult<PyMatrix> {
        Ok(match rhs {
            Operand::Matrix(rhs) => self.inner.subtract(&rhs.inner)?,
            Operand::Scalar(x) => self.inner.subtract_scalar(x),
        }
        .into())
    }

    pub fn __rsub__(&self, lhs: Operand) -> PyResult<PyMatrix> {
        Ok(match lhs {
            Operand::Matrix(lhs) => lhs.inner.subtract(&self.inner)?,
            Operand::Scalar(x) => self.inner.negate().add_scalar(x),
        }
        .into())
    }

    pub fn __mul__(&self, rhs: Operand) -> PyResult<PyMatrix> {
        Ok(match rhs {
            Operand::Matrix(rhs) => self.inner.multiply(&rhs.inner)?,
            Operand::Scalar(x) => self.inner.scale(x),
        }
        .into())
    }

    pub fn __rmul__(&self, lhs: Operand) -> PyResult<PyMatrix> {
        Ok(match lhs {
            Operand::Matrix(lhs) => lhs.inner.multiply(&self.inner)?,
            Operand::Scalar(x) => self.inner.scale(x),
        }
        .into())
    }

    pub fn __truediv__(&self, rhs: Operand) -> PyResult<PyMatrix> {
        Ok(match rhs {
            Operand::Matrix(rhs) => self.inner.divide(&rhs.inner)?,
            Operand::Scalar(x) => self.inner.divide_scalar(x)?,
        }
        .into())
    }

    pub fn __neg__(&self) -> PyMatrix {
        self.inner.negate().into()
    }

    pub fn __pow__(&self, exponent: usize, modulo: Option<f64>) -> PyResult<PyMatrix> {
        Ok(self.inner.power(exponent, modulo)?.into())
    }

    pub fn __eq__(&self, other: &Bound<'_, PyAny>) -> bool {
        other
            .extract::<PyRef<PyMatrix>>()
            .is_ok_and(|other| self.inner == other.inner)
    }

    pub fn __len__(&self) -> usize {
        self.inner.len()
    }

    pub fn __repr__(&self) -> String {
        self.inner.to_string()
    }

    pub fn __str__(&self) -> String {
        self.inner.to_string()
    }

    pub fn __getitem__(&self, py: Python<'_>, index: &Bound<'_, PyAny>) -> PyResult<PyObject> {
        Ok(match self.inner.get(matrix_index(&self.inner, index)?)? {
            Entry::Scalar(x) => PyFloat::new(py, x).into_any().unbind(),
            Entry::Matrix(inner) => Py::new(py, PyMatrix::from(inner))?.into_any(),
        })
    }

    pub fn __setitem__(&mut self, index: &Bound<'_, PyAny>, value: Assigned) -> PyResult<()> {
        let index = matrix_index(&self.inner, index)?;
        Ok(self.inner.set(index, value.into())?)
    }

    #[getter]
    pub fn n_rows(&self) -> usize {
        self.inner.n_rows()
    }

    #[getter]
    pub fn n_cols(&self) -> usize {
        self.inner.n_cols()
    }

    #[getter]
    pub fn dim(&self) -> String {
        self.inner.dim()
    }

    #[getter]
    pub fn is_square(&self) -> bool {
        self.inner.is_square()
    }

    #[getter]
    pub fn is_singular(&self) -> PyResult<bool> {
        Ok(self.inner.is_singular()?)
    }

    #[getter]
    pub fn trace(&self) -> PyResult<f64> {
        Ok(self.inner.trace()?)
    }

    #[getter]
    pub fn t(&self) -> PyMatrix {
        self.inner.transpose().into()
    }

    pub fn transpose(&self) -> PyMatrix {
        self.inner.transpose().into()
    }

    #[getter]
    pub fn in_fractions(&self) -> PyResult<PyFractionMatrix> {
        Ok(PyFractionMatrix {
            inner: self.inner.in_fractions()?,
        })
    }

    pub fn determinant(&self) -> PyResult<f64> {
        Ok(self.inner.determinant()?)
    }

    pub fn inverse(&self) -> PyResult<PyMatrix> {
        Ok(self.inner.inverse()?.into())
    }

    pub fn adjoint_matrix(&self) -> PyResult<PyFractionMatrix> {
        Ok(PyFractionMatrix {
            inner: self.inner.adjoint_matrix()?,
        })
    }

    pub fn diagonal(&self) -> PyMatrix {
        self.inner.diagonal().into()
    }

    pub fn diagonal_of_matrix(&self) -> PyResult<PyMatrix> {
        Ok(self.inner.diagonal_of_matrix()?.into())
    }

    pub fn hadamard_product(&self, other: PyRef<PyMatrix>) -> PyResult<PyMatrix> {
        Ok(self.inner.hadamard_product(&other.inner)?.into())
    }

    pub fn elementwise_product(&self, other: PyRef<PyMatrix>) -> PyResult<PyMatrix> {
        Ok(self.inner.elementwise_product(&other.inner)?.into())
    }

    pub fn dot(&self, other: PyRef<PyMatrix>) -> PyResult<f64> {
        Ok(self.inner.dot(&other.inner)?)
    }

    pub fn is_symmetric(&self) -> bool {
        self.inner.is_symmetric()
    }

    pub fn is_orthogonal(&self) -> PyResult<bool> {
        Ok(self.inner.is_orthogonal()?)
    }

    pub fn is_orthogonal_to(&self, other: PyRef<PyMatrix>) -> PyResult<bool> {
        Ok(self.inner.is_orthogonal_to(&other.inner)?)
    }

    pub fn is_positive_definite(&self) -> PyResult<bool> {
        Ok(self.inner.is_positive_definite()?)
    }

    pub fn is_multiplicative_inverse_of(&self, other: PyRef<PyMatrix>) -> PyResult<bool> {
        Ok(self.inner.is_multiplicative_inverse_of(&other.inner)?)
    }
}

/// Decimal value shown as its closest fraction.
#[derive(Debug, Clone)]
#[pyclass(name = "InFractions")]
pub struct PyInFractions {
    fraction: Fraction,
}

#[pymethods]
impl PyInFractions {
    #[new]
    fn new(decimal_value: f64) -> PyResult<Self> {
        Ok(PyInFractions {
            fraction: Fraction::approximate(decimal_value, config().max_denominator)?,
        })
    }

    #[getter]
    pub fn numerator(&self) -> BigInt {
        self.fraction.numerator().clone()
    }

    #[getter]
    pub fn denominator(&self) -> BigInt {
        self.fraction.denominator().clone()
    }

    pub fn __float__(&self) -> PyResult<f64> {
        Ok(self.fraction.to_f64_checked()?)
    }

    pub fn __repr__(&self) -> String {
        self.fraction.to_string()
    }
}

/// Matrix of [`PyInFractions`], as returned by `in_fractions`.
#[derive(Debug, Clone)]
#[pyclass(name = "FractionMatrix")]
pub struct PyFractionMatrix {
    inner: Matrix<Fraction>,
}

#[pymethods]
impl PyFractionMatrix {
    pub fn to_list(&self) -> Vec<Vec<PyInFractions>> {
        self.inner
            .to_list()
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|fraction| PyInFractions { fraction })
                    .collect()
            })
            .collect()
    }

    #[getter]
    pub fn n_rows(&self) -> usize {
        self.inner.n_rows()
    }

    #[getter]
    pub fn n_cols(&self) -> usize {
        self.inner.n_cols()
    }

    #[getter]
    pub fn dim(&self) -> String {
        self.inner.dim()
    }

    pub fn __len__(&self) -> usize {
        self.inner.len()
    }

    pub fn __repr__(&self) -> String {
        self.inner.to_string()
    }
}

#[pyfunction]
#[pyo3(signature = (n_rows, n_cols=None, value=1.0))]
pub fn identity_matrix(n_rows: usize, n_cols: Option<usize>, value: f64) -> PyResult<PyMatrix> {
    Ok(factories::identity_matrix(n_rows, n_cols, value)?.into())
}

#[pyfunction]
#[pyo3(signature = (n_rows, n_cols=None))]
pub fn null_matrix(n_rows: usize, n_cols: Option<usize>) -> PyMatrix {
    factories::null_matrix(n_rows, n_cols).into()
}

fn exact_determinant(lines: Vec<Vec<BigInt>>) -> crate::error::Result<BigInt> {
    Matrix::from_list(lines)?.determinant()
}

#[pyfunction]
pub fn determinant(py: Python<'_>, matrix: DeterminantInput) -> PyResult<PyObject> {
    Ok(match matrix {
        DeterminantInput::Matrix(matrix) => {
            PyFloat::new(py, matrix.inner.determinant()?).into_any().unbind()
        }
        DeterminantInput::Exact(lines) => exact_determinant(lines)?
            .into_pyobject(py)?
            .into_any()
            .unbind(),
        DeterminantInput::Float(lines) => {
            let det = Matrix::from_list(lines)?.determinant()?;
            PyFloat::new(py, det).into_any().unbind()
        }
    })
}

#[pyfunction]
#[pyo3(signature = (vector, squared=false))]
pub fn vector_mag(vector: PyRef<PyMatrix>, squared: bool) -> PyResult<f64> {
    Ok(factories::vector_mag(&vector.inner, squared)?)
}

#[pyfunction]
pub fn matrix_copy(matrix: PyRef<PyMatrix>) -> PyMatrix {
    matrix.inner.deep_copy().into()
}

/// Applies `function` to the `apply_to` positions: `"full"`, `"diagonal"` or
/// `"off-diagonal"`.
#[pyfunction]
#[pyo3(signature = (matrix, function, apply_to="full"))]
pub fn map_to_matrix(
    matrix: PyRef<PyMatrix>,
    function: &Bound<'_, PyAny>,
    apply_to: &str,
) -> PyResult<PyMatrix> {
    let target = map_target(apply_to).ok_or_else(|| {
        PyValueError::new_err(format!(
            "apply_to must be 'full', 'diagonal' or 'off-diagonal', got '{apply_to}'."
        ))
    })?;
    let mapped = matrix
        .inner
        .try_map(|x| function.call1((*x,))?.extract::<f64>(), target)?;
    Ok(mapped.into())
}

pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    let py = m.py();
    m.add_class::<PyMatrix>()?;
    m.add_class::<PyInFractions>()?;
    m.add_class::<PyFractionMatrix>()?;
    m.add_function(wrap_pyfunction!(identity_matrix, m)?)?;
    m.add_function(wrap_pyfunction!(null_matrix, m)?)?;
    m.add_function(wrap_pyfunction!(determinant, m)?)?;
    m.add_function(wrap_pyfunction!(vector_mag, m)?)?;
    m.add_function(wrap_pyfunction!(matrix_copy, m)?)?;
    m.add_function(wrap_pyfunction!(map_to_matrix, m)?)?;
    m.add("MatrixException", py.get_type::<MatrixException>())?;
    m.add("MatrixDimensionsMismatch", py.get_type::<MatrixDimensionsMismatch>())?;
    m.add("NotASquareMatrix", py.get_type::<NotASquareMatrix>())?;
    m.add("SlicingNotAllowed", py.get_type::<SlicingNotAllowed>())?;
    m.add("IndexOutOfBounds", py.get_type::<IndexOutOfBounds>())?;
    m.add("DivisionByMatrix", py.get_type::<DivisionByMatrix>())?;
    m.add("DeterminantIsZero", py.get_type::<DeterminantIsZero>())?;
    m.add("DivisionByZero", py.get_type::<DivisionByZero>())?;
    m.add("ConversionFailed", py.get_type::<ConversionFailed>())?;
    Ok(())
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position() {
        assert_eq!(position(1, 3).ok(), Some(1));
        assert_eq!(position(-1, 3).ok(), Some(2));
        assert!(position(-4, 3).is_err());
    }

    #[test]
    fn test_exact_determinant_above_float_precision() {
        let big = BigInt::from(1u64 << 53) + 1;
        let lines = vec![
            vec![big.clone(), BigInt::from(2)],
            vec![BigInt::from(1), BigInt::from(1)],
        ];
        assert_eq!(exact_determinant(lines), Ok(big - 2));
        assert!(matches!(
            exact_determinant(vec![vec![BigInt::from(1), BigInt::from(2)]]),
            Err(MatrixError::NotSquareMatrix(_))
        ));
    }

    #[test]
    fn test_row_assignment_is_flat() {
        let entry: Entry<f64> = Assigned::Row(vec![1.0, 2.0]).into();
        assert_eq!(entry, Entry::Matrix(Matrix::vector(vec![1.0, 2.0])));
    }

    #[test]
    fn test_map_target() {
        assert_eq!(map_target("full"), Some(MapTarget::Full));
        assert_eq!(map_target("off-diagonal"), Some(MapTarget::OffDiagonal));
        assert_eq!(map_target("rows"), None);
    }
}
