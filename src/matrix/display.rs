use crate::matrix::matrix::Matrix;
use crate::matrix::shape::Elements;
use itertools::Itertools;
use num_traits::ToPrimitive;
use std::fmt;

impl<T: fmt::Display + ToPrimitive> Matrix<T> {
    fn render_cell(&self, x: &T) -> String {
        match (self.n_decimal, x.to_f64()) {
            (Some(d), Some(value)) => format!("{value:.d$}"),
            _ => x.to_string(),
        }
    }
}

/// `[a b c]` for a vector, one bracketed line per row otherwise. Every cell is
/// right-justified to the widest one.
impl<T: fmt::Display + ToPrimitive> fmt::Display for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let texts = self
            .elements()
            .cells()
            .iter()
            .map(|x| self.render_cell(x))
            .collect_vec();
        let width = texts.iter().map(|s| s.chars().count()).max().unwrap_or(0);
        let line = |cells: &[String]| {
            format!("[{}]", cells.iter().map(|s| format!("{s:>width$}")).join(" "))
        };

        match self.elements() {
            Elements::Vector(_) => write!(f, "{}", line(&texts)),
            Elements::Dense { rows, cols, .. } => {
                let lines = (0..*rows)
                    .map(|r| line(&texts[r * cols..(r + 1) * cols]))
                    .join("\n ");
                write!(f, "[{lines}]")
            }
        }
    }
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------
