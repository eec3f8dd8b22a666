use crate::error::{MatrixError, Result};
use crate::matrix::matrix::Matrix;
use crate::matrix::shape::Elements;
use std::ops::{Range, RangeFrom, RangeFull, RangeTo};

/// `start..stop` with a stride, clamped to the indexed length like a Python
/// slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub stop: usize,
    pub step: usize,
}

impl Span {
    pub fn new(start: usize, stop: usize, step: usize) -> Self {
        Span { start, stop, step }
    }

    fn positions(&self, len: usize) -> Result<Vec<usize>> {
        if self.step == 0 {
            return Err(MatrixError::SlicingNotAllowed(Some(
                "Slice step cannot be zero.".into(),
            )));
        }
        let stop = self.stop.min(len);
        let start = self.start.min(stop);
        Ok((start..stop).step_by(self.step).collect())
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Span {
        Span::new(range.start, range.end, 1)
    }
}

impl From<RangeFrom<usize>> for Span {
    fn from(range: RangeFrom<usize>) -> Span {
        Span::new(range.start, usize::MAX, 1)
    }
}

impl From<RangeTo<usize>> for Span {
    fn from(range: RangeTo<usize>) -> Span {
        Span::new(0, range.end, 1)
    }
}

impl From<RangeFull> for Span {
    fn from(_: RangeFull) -> Span {
        Span::new(0, usize::MAX, 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixIndex {
    /// Element of a vector, row of a nested matrix.
    At(usize),
    Rows(Span),
    Block(Span, Span),
}

impl From<usize> for MatrixIndex {
    fn from(index: usize) -> MatrixIndex {
        MatrixIndex::At(index)
    }
}

impl From<Span> for MatrixIndex {
    fn from(span: Span) -> MatrixIndex {
        MatrixIndex::Rows(span)
    }
}

impl From<Range<usize>> for MatrixIndex {
    fn from(range: Range<usize>) -> MatrixIndex {
        MatrixIndex::Rows(range.into())
    }
}

impl From<RangeFull> for MatrixIndex {
    fn from(range: RangeFull) -> MatrixIndex {
        MatrixIndex::Rows(range.into())
    }
}

impl<R: Into<Span>, C: Into<Span>> From<(R, C)> for MatrixIndex {
    fn from((rows, cols): (R, C)) -> MatrixIndex {
        MatrixIndex::Block(rows.into(), cols.into())
    }
}

/// What indexing hands back: a scalar from a vector, a matrix otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry<T> {
    Scalar(T),
    Matrix(Matrix<T>),
}

impl<T> Entry<T> {
    pub fn into_scalar(self) -> Option<T> {
        match self {
            Entry::Scalar(value) => Some(value),
            Entry::Matrix(_) => None,
        }
    }

    pub fn into_matrix(self) -> Option<Matrix<T>> {
        match self {
            Entry::Scalar(_) => None,
            Entry::Matrix(matrix) => Some(matrix),
        }
    }
}

impl<T: Clone> Matrix<T> {
    fn check_position(&self, index: usize) -> Result<()> {
        if index >= self.len() {
            return Err(MatrixError::index_out_of_bounds(format!(
                "Index {index} is out of range for length {}.",
                self.len()
            )));
        }
        Ok(())
    }

    /// Read access by position, row slice or `(rows, cols)` block.
    pub fn get(&self, index: impl Into<MatrixIndex>) -> Result<Entry<T>> {
        let elements = self.elements();
        match index.into() {
            MatrixIndex::At(i) => {
                self.check_position(i)?;
                Ok(match elements {
                    Elements::Vector(cells) => Entry::Scalar(cells[i].clone()),
                    Elements::Dense { .. } => Entry::Matrix(Matrix::vector(elements.row(i).to_vec())),
                })
            }
            MatrixIndex::Rows(rows) => {
                let picked = rows.positions(self.len())?;
                Ok(Entry::Matrix(match elements {
                    Elements::Vector(cells) => {
                        Matrix::vector(picked.iter().map(|&i| cells[i].clone()).collect())
                    }
                    Elements::Dense { .. } => {
                        block(elements, &picked, &(0..elements.n_cols()).collect::<Vec<_>>())
                    }
                }))
            }
            MatrixIndex::Block(rows, cols) => {
                let picked_rows = rows.positions(elements.n_rows())?;
                let picked_cols = cols.positions(elements.n_cols())?;
                Ok(Entry::Matrix(match elements {
                    Elements::Vector(cells) if picked_rows.contains(&0) => {
                        Matrix::vector(picked_cols.iter().map(|&c| cells[c].clone()).collect())
                    }
                    Elements::Vector(_) => Matrix::vector(vec![]),
                    Elements::Dense { .. } => block(elements, &picked_rows, &picked_cols),
                }))
            }
        }
    }

    /// Write access by position only. A vector takes a scalar; a nested
    /// matrix takes a whole row of matching length.
    pub fn set(&mut self, index: impl Into<MatrixIndex>, value: Entry<T>) -> Result<()> {
        let i = match index.into() {
            MatrixIndex::At(i) => i,
            MatrixIndex::Rows(_) | MatrixIndex::Block(..) => {
                return Err(MatrixError::SlicingNotAllowed(None))
            }
        };
        self.check_position(i)?;

        let cols = self.n_cols();
        match (self.elements_mut(), value) {
            (Elements::Vector(cells), Entry::Scalar(value)) => cells[i] = value,
            (Elements::Dense { cells, .. }, Entry::Matrix(row))
                if row.n_rows() == 1 && row.n_cols() == cols =>
            {
                cells[i * cols..(i + 1) * cols].clone_from_slice(row.elements().cells());
            }
            (Elements::Vector(_), Entry::Matrix(_)) => {
                return Err(MatrixError::dimension_mismatch(
                    "A vector element can only be replaced by a scalar.",
                ))
            }
            (Elements::Dense { .. }, _) => {
                return Err(MatrixError::dimension_mismatch(format!(
                    "Row {i} can only be replaced by a row of {cols} elements."
                )))
            }
        }
        Ok(())
    }

    fn check_element(&self, row: usize, col: usize) -> Result<()> {
        if row >= self.n_rows() || col >= self.n_cols() {
            return Err(MatrixError::index_out_of_bounds(format!(
                "Element ({row}, {col}) is outside a {} matrix.",
                self.dim()
            )));
        }
        Ok(())
    }

    pub fn get_element(&self, row: usize, col: usize) -> Result<T> {
        self.check_element(row, col)?;
        Ok(self.elements().at(row, col).clone())
    }

    pub fn set_element(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        self.check_element(row, col)?;
        let cols = self.n_cols();
        self.elements_mut().cells_mut()[row * cols + col] = value;
        Ok(())
    }
}

fn block<T: Clone>(elements: &Elements<T>, rows: &[usize], cols: &[usize]) -> Matrix<T> {
    if rows.is_empty() {
        return Matrix::vector(vec![]);
    }
    Matrix::new(Elements::Dense {
        rows: rows.len(),
        cols: cols.len(),
        cells: rows
            .iter()
            .flat_map(|&r| cols.iter().map(move |&c| elements.at(r, c).clone()))
            .collect(),
    })
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn m(lines: Vec<Vec<i64>>) -> Matrix<i64> {
        Matrix::from_list(lines).unwrap()
    }

    #[test]
    fn test_get_position() {
        let v = Matrix::vector(vec![10, 20, 30]);
        assert_eq!(v.get(1), Ok(Entry::Scalar(20)));

        let a = m(vec![vec![1, 2], vec![3, 4]]);
        assert_eq!(a.get(1), Ok(Entry::Matrix(Matrix::vector(vec![3, 4]))));
        assert_eq!(a.get(0).unwrap().into_matrix().unwrap().get(1), Ok(Entry::Scalar(2)));

        let column = Matrix::column(vec![5, 6]);
        assert_eq!(
            column.get(0).unwrap().into_matrix().unwrap().get(0).unwrap().into_scalar(),
            Some(5)
        );
    }

    #[test]
    fn test_get_out_of_bounds() {
        let a = m(vec![vec![1, 2], vec![3, 4]]);
        assert!(matches!(a.get(2), Err(MatrixError::IndexOutOfBounds(_))));
        assert!(matches!(
            Matrix::vector(vec![1]).get(1),
            Err(MatrixError::IndexOutOfBounds(_))
        ));
        assert!(matches!(a.get_element(0, 2), Err(MatrixError::IndexOutOfBounds(_))));
    }

    #[test]
    fn test_read_slicing() {
        let a = m(vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]]);
        assert_eq!(
            a.get(1..3),
            Ok(Entry::Matrix(m(vec![vec![4, 5, 6], vec![7, 8, 9]])))
        );
        assert_eq!(
            a.get(Span::new(0, 10, 2)),
            Ok(Entry::Matrix(m(vec![vec![1, 2, 3], vec![7, 8, 9]])))
        );
        assert_eq!(
            a.get((0..2, 1..)),
            Ok(Entry::Matrix(m(vec![vec![2, 3], vec![5, 6]])))
        );
        assert_eq!(a.get(5..9), Ok(Entry::Matrix(Matrix::vector(vec![]))));
        assert_eq!(a.get(..), Ok(Entry::Matrix(a.clone())));
        assert!(a.get(Span::new(0, 3, 0)).is_err());

        let v = Matrix::vector(vec![1, 2, 3, 4]);
        assert_eq!(v.get(1..3), Ok(Entry::Matrix(Matrix::vector(vec![2, 3]))));
        assert_eq!(v.get((.., ..2)), Ok(Entry::Matrix(Matrix::vector(vec![1, 2]))));
    }

    #[test]
    fn test_set() {
        let mut v = Matrix::vector(vec![1, 2, 3]);
        v.set(2, Entry::Scalar(9)).unwrap();
        assert_eq!(v, Matrix::vector(vec![1, 2, 9]));

        let mut a = m(vec![vec![1, 2], vec![3, 4]]);
        a.set(0, Entry::Matrix(Matrix::vector(vec![7, 8]))).unwrap();
        assert_eq!(a, m(vec![vec![7, 8], vec![3, 4]]));

        a.set_element(1, 0, -3).unwrap();
        assert_eq!(a.get_element(1, 0), Ok(-3));
    }

    #[test]
    fn test_set_rejections_leave_matrix_untouched() {
        let mut a = m(vec![vec![1, 2], vec![3, 4]]);
        let before = a.clone();

        assert_eq!(
            a.set(0..1, Entry::Matrix(Matrix::vector(vec![0, 0]))),
            Err(MatrixError::SlicingNotAllowed(None))
        );
        assert_eq!(
            a.set((0..1, 0..1), Entry::Scalar(0)),
            Err(MatrixError::SlicingNotAllowed(None))
        );
        assert!(matches!(
            a.set(2, Entry::Matrix(Matrix::vector(vec![0, 0]))),
            Err(MatrixError::IndexOutOfBounds(_))
        ));
        assert!(matches!(
            a.set(0, Entry::Scalar(5)),
            Err(MatrixError::DimensionMismatch(_))
        ));
        assert!(matches!(
            a.set(0, Entry::Matrix(Matrix::vector(vec![1, 2, 3]))),
            Err(MatrixError::DimensionMismatch(_))
        ));
        assert!(a.set_element(2, 0, 1).is_err());
        assert_eq!(a, before);
    }
}
