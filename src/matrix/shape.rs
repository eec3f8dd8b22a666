use crate::error::{MatrixError, Result};

/// Storage of a matrix, classified once when the matrix is built.
#[derive(Debug, Clone, PartialEq)]
pub enum Elements<T> {
    /// Flat row vector, `1 x len`.
    Vector(Vec<T>),
    /// Nested matrix stored row-major, `rows x cols`.
    Dense {
        rows: usize,
        cols: usize,
        cells: Vec<T>,
    },
}

impl<T> Elements<T> {
    /// Classifies nested input. Every row must have the length of the first
    /// one; an empty outer list is the empty vector.
    pub fn from_list(lines: Vec<Vec<T>>) -> Result<Self> {
        let Some(first) = lines.first() else {
            return Ok(Elements::Vector(vec![]));
        };

        let rows = lines.len();
        let cols = first.len();
        if let Some((i, line)) = lines.iter().enumerate().find(|(_, l)| l.len() != cols) {
            return Err(MatrixError::dimension_mismatch(format!(
                "Row {i} has {} elements, expected {cols}.",
                line.len()
            )));
        }

        Ok(Elements::Dense {
            rows,
            cols,
            cells: lines.into_iter().flatten().collect(),
        })
    }

    pub fn n_rows(&self) -> usize {
        match self {
            Elements::Vector(_) => 1,
            Elements::Dense { rows, .. } => *rows,
        }
    }

    pub fn n_cols(&self) -> usize {
        match self {
            Elements::Vector(cells) => cells.len(),
            Elements::Dense { cols, .. } => *cols,
        }
    }

    pub fn is_flat(&self) -> bool {
        matches!(self, Elements::Vector(_))
    }

    /// Outer length: elements of a vector, rows of a nested matrix.
    pub fn len(&self) -> usize {
        match self {
            Elements::Vector(cells) => cells.len(),
            Elements::Dense { rows, .. } => *rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cells().is_empty()
    }

    pub fn cells(&self) -> &[T] {
        match self {
            Elements::Vector(cells) | Elements::Dense { cells, .. } => cells,
        }
    }

    pub fn cells_mut(&mut self) -> &mut [T] {
        match self {
            Elements::Vector(cells) | Elements::Dense { cells, .. } => cells,
        }
    }

    pub fn row(&self, row: usize) -> &[T] {
        let cols = self.n_cols();
        &self.cells()[row * cols..(row + 1) * cols]
    }

    #[inline(always)]
    pub fn at(&self, row: usize, col: usize) -> &T {
        &self.cells()[row * self.n_cols() + col]
    }

    /// Same shape, new cells. `cells` must hold `n_rows * n_cols` values.
    pub fn with_cells<U>(&self, cells: Vec<U>) -> Elements<U> {
        debug_assert_eq!(cells.len(), self.cells().len());
        match self {
            Elements::Vector(_) => Elements::Vector(cells),
            Elements::Dense { rows, cols, .. } => Elements::Dense {
                rows: *rows,
                cols: *cols,
                cells,
            },
        }
    }

    pub fn map_cells<U>(&self, f: impl FnMut(&T) -> U) -> Elements<U> {
        self.with_cells(self.cells().iter().map(f).collect())
    }

    pub fn try_map_cells<U, E>(
        &self,
        f: impl FnMut(&T) -> std::result::Result<U, E>,
    ) -> std::result::Result<Elements<U>, E> {
        Ok(self.with_cells(self.cells().iter().map(f).collect::<std::result::Result<_, _>>()?))
    }
}

impl<T: Clone> Elements<T> {
    pub fn to_list(&self) -> Vec<Vec<T>> {
        match self {
            Elements::Vector(cells) => vec![cells.clone()],
            Elements::Dense { rows, cols: 0, .. } => vec![vec![]; *rows],
            Elements::Dense { cols, cells, .. } => {
                cells.chunks(*cols).map(|line| line.into()).collect()
            }
        }
    }
}

/// Row-major `rows x cols` cells rearranged as the row-major `cols x rows`
/// transpose.
pub fn transpose_cells<T: Clone>(rows: usize, cols: usize, cells: &[T]) -> Vec<T> {
    (0..cols)
        .flat_map(|c| (0..rows).map(move |r| cells[r * cols + c].clone()))
        .collect()
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------
