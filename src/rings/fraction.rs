use crate::error::{MatrixError, Result};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Float, One, Signed, ToPrimitive, Zero};
use std::cmp::Ordering;
use std::fmt;
use std::fmt::Display;
use std::ops;
use std::str::FromStr;

/// Exact rational number, always stored reduced with a positive denominator.
#[derive(Debug, Clone)]
pub struct Fraction {
    pub num: BigInt,
    pub den: BigInt,
}

impl Fraction {
    /// # Panics
    /// If `den` is zero.
    pub fn new(num: BigInt, den: BigInt) -> Self {
        if den.is_zero() {
            panic!("Denominator cannot be zero");
        }

        let g = &num.gcd(&den);
        let num = num / g;
        let den = den / g;

        if den < BigInt::zero() {
            return Self {
                num: -num,
                den: -den,
            };
        }
        Self { num, den }
    }

    pub fn numerator(&self) -> &BigInt {
        &self.num
    }

    pub fn denominator(&self) -> &BigInt {
        &self.den
    }

    /// Exact value of a finite float: every `f64` is `mantissa * 2^exponent`.
    pub fn from_f64(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(MatrixError::ConversionFailed(value.to_string()));
        }

        let (mantissa, exponent, sign) = value.integer_decode();
        let mut num = BigInt::from(mantissa);
        if sign < 0 {
            num = -num;
        }

        if exponent >= 0 {
            Ok(Fraction::new(num << exponent as usize, BigInt::one()))
        } else {
            Ok(Fraction::new(num, BigInt::one() << (-exponent) as usize))
        }
    }

    /// Closest fraction whose denominator does not exceed `max_den`.
    pub fn limit_denominator(&self, max_den: &BigInt) -> Result<Self> {
        if *max_den < BigInt::one() {
            return Err(MatrixError::ConversionFailed(format!(
                "max_denominator {max_den} should be at least 1"
            )));
        }
        if self.den <= *max_den {
            return Ok(self.clone());
        }

        // Walk the continued fraction expansion until the next convergent's
        // denominator would exceed the bound.
        let (mut p0, mut q0, mut p1, mut q1) =
            (BigInt::zero(), BigInt::one(), BigInt::one(), BigInt::zero());
        let (mut n, mut d) = (self.num.clone(), self.den.clone());
        loop {
            let a = n.div_floor(&d);
            let q2 = &q0 + &a * &q1;
            if q2 > *max_den {
                break;
            }
            let p2 = &p0 + &a * &p1;
            p0 = std::mem::replace(&mut p1, p2);
            q0 = std::mem::replace(&mut q1, q2);
            let rest = &n - &a * &d;
            n = std::mem::replace(&mut d, rest);
        }

        let k = (max_den - &q0).div_floor(&q1);
        let semiconvergent = Fraction::new(&p0 + &k * &p1, &q0 + &k * &q1);
        let convergent = Fraction::new(p1, q1);

        let distance = |f: &Fraction| (f.clone() - self.clone()).abs();
        if distance(&convergent) <= distance(&semiconvergent) {
            Ok(convergent)
        } else {
            Ok(semiconvergent)
        }
    }

    /// Best rational approximation of `value` with a bounded denominator.
    pub fn approximate(value: f64, max_den: u64) -> Result<Self> {
        Fraction::from_f64(value)?.limit_denominator(&BigInt::from(max_den))
    }

    pub fn abs(&self) -> Fraction {
        Fraction {
            num: self.num.abs(),
            den: self.den.clone(),
        }
    }
}

impl FromStr for Fraction {
    type Err = MatrixError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || MatrixError::ConversionFailed(s.to_string());
        let mut nums = s.split('/');
        let num = nums.next().ok_or_else(invalid)?.trim();
        let den = nums.next().unwrap_or("1").trim();
        if nums.next().is_some() {
            return Err(invalid());
        }

        let num = BigInt::parse_bytes(num.as_bytes(), 10).ok_or_else(invalid)?;
        let den = BigInt::parse_bytes(den.as_bytes(), 10).ok_or_else(invalid)?;
        if den.is_zero() {
            return Err(MatrixError::DivisionByZero(Some(s.to_string())));
        }
        Ok(Fraction::new(num, den))
    }
}

impl From<i64> for Fraction {
    fn from(value: i64) -> Fraction {
        Fraction::new(BigInt::from(value), BigInt::one())
    }
}

impl From<BigInt> for Fraction {
    fn from(value: BigInt) -> Fraction {
        Fraction::new(value, BigInt::one())
    }
}

impl ops::Add for Fraction {
    type Output = Fraction;

    fn add(self, rhs: Fraction) -> Fraction {
        if self.den == rhs.den {
            return Fraction::new(self.num + rhs.num, self.den);
        }

        Fraction::new(
            &self.num * &rhs.den + &rhs.num * &self.den,
            &self.den * &rhs.den,
        )
    }
}

impl ops::Sub for Fraction {
    type Output = Fraction;

    fn sub(self, rhs: Fraction) -> Fraction {
        self + -rhs
    }
}

impl ops::Neg for Fraction {
    type Output = Fraction;

    fn neg(self) -> Fraction {
        Fraction {
            num: -self.num,
            den: self.den,
        }
    }
}

impl ops::Div for Fraction {
    type Output = Fraction;

    fn div(self, rhs: Fraction) -> Fraction {
        Fraction::new(self.num * rhs.den, self.den * rhs.num)
    }
}

impl ops::Mul for Fraction {
    type Output = Fraction;

    fn mul(self, rhs: Fraction) -> Fraction {
        Fraction::new(self.num * rhs.num, self.den * rhs.den)
    }
}

// Floored remainder: the result takes the sign of the divisor.
impl ops::Rem for Fraction {
    type Output = Fraction;

    fn rem(self, rhs: Fraction) -> Fraction {
        let quotient = self.clone() / rhs.clone();
        let floor = quotient.num.div_floor(&quotient.den);
        self - rhs * Fraction::from(floor)
    }
}

impl One for Fraction {
    fn one() -> Fraction {
        Fraction::new(BigInt::one(), BigInt::one())
    }
}

impl Zero for Fraction {
    fn zero() -> Fraction {
        Fraction::new(BigInt::zero(), BigInt::one())
    }

    fn is_zero(&self) -> bool {
        self.num.is_zero()
    }
}

impl ToPrimitive for Fraction {
    fn to_i64(&self) -> Option<i64> {
        (&self.num / &self.den).to_i64()
    }

    fn to_u64(&self) -> Option<u64> {
        (&self.num / &self.den).to_u64()
    }

    fn to_f64(&self) -> Option<f64> {
        Some(self.num.to_f64()? / self.den.to_f64()?)
    }
}

impl Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = if self.den.is_one() {
            self.num.to_string()
        } else {
            format!("{}/{}", self.num, self.den)
        };
        f.pad(&text)
    }
}

impl PartialEq<Fraction> for Fraction {
    fn eq(&self, rhs: &Fraction) -> bool {
        &self.num * &rhs.den == &rhs.num * &self.den
    }
}

impl PartialEq<i64> for Fraction {
    fn eq(&self, rhs: &i64) -> bool {
        self.num == &self.den * rhs
    }
}

impl PartialOrd<Fraction> for Fraction {
    fn partial_cmp(&self, rhs: &Fraction) -> Option<Ordering> {
        Some(self.cmp(rhs))
    }
}

impl Eq for Fraction {}
impl Ord for Fraction {
    fn cmp(&self, rhs: &Fraction) -> Ordering {
        let a = &self.num * &rhs.den;
        let b = &rhs.num * &self.den;
        a.cmp(&b)
    }
}

impl std::iter::Sum<Fraction> for Fraction {
    fn sum<I: Iterator<Item = Fraction>>(iter: I) -> Fraction {
        iter.fold(Fraction::zero(), |acc, f| acc + f)
    }
}

// --------------------------------------------------
//                      TESTS
// --------------------------------------------------
