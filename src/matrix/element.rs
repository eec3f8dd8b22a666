use num_traits::{One, ToPrimitive, Zero};
use std::ops::{Add, Div, Mul, Neg, Rem, Sub};

/// Scalar a matrix can hold. Negation is required, so unsigned integers are
/// not elements.
pub trait Element:  // Avoid repeating all the traits
    Clone
    + Zero
    + One
    + PartialEq
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Rem<Output = Self>
    + Neg<Output = Self>
    + std::iter::Sum<Self>
    + ToPrimitive
    + std::fmt::Display
    + std::fmt::Debug
    + Send
    + Sync
{
    fn minus_one() -> Self {
        -Self::one()
    }

    fn to_f64_checked(&self) -> crate::error::Result<f64> {
        self.to_f64()
            .ok_or_else(|| crate::error::MatrixError::ConversionFailed(self.to_string()))
    }
}

impl<T> Element for T where
    T: Clone
        + Zero
        + One
        + PartialEq
        + PartialOrd
        + Add<Output = T>
        + Sub<Output = T>
        + Mul<Output = T>
        + Div<Output = T>
        + Rem<Output = T>
        + Neg<Output = T>
        + std::iter::Sum<T>
        + ToPrimitive
        + std::fmt::Display
        + std::fmt::Debug
        + Send
        + Sync
{
}

/// Sum of pairwise products.
pub fn dot<'a, T: Element + 'a>(
    lhs: impl IntoIterator<Item = &'a T>,
    rhs: impl IntoIterator<Item = &'a T>,
) -> T {
    lhs.into_iter()
        .zip(rhs)
        .map(|(a, b)| a.clone() * b.clone())
        .sum()
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------
