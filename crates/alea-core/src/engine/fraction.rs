//! Exact rational numbers for displaying probabilities.
//!
//! Probabilities over a finite sample space are ratios of cardinalities, so the
//! event algebra carries them as reduced fractions alongside the floating value.
//! The Bayes engine, whose inputs are floats, uses [`Fraction::approximate`] to
//! recover a readable fraction with a bounded denominator.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Sub};

/// Iteration cap for the continued-fraction expansion in [`Fraction::approximate`].
const MAX_EXPANSION_TERMS: usize = 64;

/// A rational number `numer / denom`, always stored in lowest terms with `denom > 0`.
///
/// Because the representation is canonical, derived equality and hashing are exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Fraction {
    numer: i64,
    denom: i64,
}

impl Fraction {
    /// Creates a reduced fraction, or `None` if `denom` is zero or the reduced
    /// value does not fit in `i64` (as with `i64::MIN / -1`).
    pub fn new(numer: i64, denom: i64) -> Option<Self> {
        if denom == 0 {
            return None;
        }
        Self::try_reduced(i128::from(numer), i128::from(denom))
    }

    /// The fraction `count / total` for set cardinalities; `0` when `total == 0`.
    pub fn ratio(count: usize, total: usize) -> Self {
        if total == 0 {
            return Self::zero();
        }
        Self::reduced(count as i128, total as i128)
    }

    pub const fn zero() -> Self {
        Self { numer: 0, denom: 1 }
    }

    pub const fn one() -> Self {
        Self { numer: 1, denom: 1 }
    }

    pub fn numer(&self) -> i64 {
        self.numer
    }

    pub fn denom(&self) -> i64 {
        self.denom
    }

    pub fn is_zero(&self) -> bool {
        self.numer == 0
    }

    pub fn to_f64(&self) -> f64 {
        self.numer as f64 / self.denom as f64
    }

    /// Divides by `rhs`, returning `None` when `rhs` is zero or the quotient
    /// overflows.
    pub fn checked_div(self, rhs: Self) -> Option<Self> {
        if rhs.is_zero() {
            return None;
        }
        Self::try_reduced(
            i128::from(self.numer) * i128::from(rhs.denom),
            i128::from(self.denom) * i128::from(rhs.numer),
        )
    }

    /// Best rational approximation of `value` whose denominator does not exceed
    /// `max_denominator`.
    ///
    /// Walks the continued-fraction expansion of `value` and, once the next
    /// convergent would exceed the bound, picks whichever of the last convergent
    /// and the best semiconvergent lies closer.
    ///
    /// Returns `None` for non-finite input or a zero bound.
    ///
    /// ```rust,ignore
    /// let pi = Fraction::approximate(std::f64::consts::PI, 1000).unwrap();
    /// assert_eq!((pi.numer(), pi.denom()), (355, 113));
    /// ```
    pub fn approximate(value: f64, max_denominator: u64) -> Option<Self> {
        if !value.is_finite() || max_denominator == 0 {
            return None;
        }
        let max_den = i64::try_from(max_denominator).unwrap_or(i64::MAX);
        let negative = value < 0.0;
        let target = value.abs();
        if target >= i64::MAX as f64 {
            return None;
        }

        let (mut p0, mut q0, mut p1, mut q1) = (0_i64, 1_i64, 1_i64, 0_i64);
        let mut x = target;
        let mut exact = false;

        for _ in 0..MAX_EXPANSION_TERMS {
            let a = x.floor();
            let a_int = a as i64;
            let Some(q2) = a_int.checked_mul(q1).and_then(|v| v.checked_add(q0)) else {
                break;
            };
            if q2 > max_den {
                break;
            }
            let Some(p2) = a_int.checked_mul(p1).and_then(|v| v.checked_add(p0)) else {
                break;
            };
            (p0, q0, p1, q1) = (p1, q1, p2, q2);

            let convergent = p1 as f64 / q1 as f64;
            if (convergent - target).abs() <= f64::EPSILON * target.max(1.0) {
                exact = true;
                break;
            }
            let rest = x - a;
            if rest <= 0.0 {
                exact = true;
                break;
            }
            x = 1.0 / rest;
        }

        if q1 == 0 {
            return None;
        }

        let (numer, denom) = if exact {
            (p1, q1)
        } else {
            let k = (max_den - q0) / q1;
            let semi_numer = p0 + k * p1;
            let semi_denom = q0 + k * q1;
            let semi_err = (semi_numer as f64 / semi_denom as f64 - target).abs();
            let conv_err = (p1 as f64 / q1 as f64 - target).abs();
            if conv_err <= semi_err {
                (p1, q1)
            } else {
                (semi_numer, semi_denom)
            }
        };

        let numer = if negative { -numer } else { numer };
        Self::new(numer, denom)
    }

    fn try_reduced(numer: i128, denom: i128) -> Option<Self> {
        let (numer, denom) = if denom < 0 {
            (-numer, -denom)
        } else {
            (numer, denom)
        };
        let divisor = gcd(numer.unsigned_abs(), denom.unsigned_abs()).max(1) as i128;
        Some(Self {
            numer: i64::try_from(numer / divisor).ok()?,
            denom: i64::try_from(denom / divisor).ok()?,
        })
    }

    /// Operator path: overflow panics like integer overflow.
    fn reduced(numer: i128, denom: i128) -> Self {
        Self::try_reduced(numer, denom).expect("fraction overflows i64")
    }
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

impl Default for Fraction {
    fn default() -> Self {
        Self::zero()
    }
}

/// # Panics
///
/// Panics if the reduced result does not fit in `i64`, like integer overflow.
impl Add for Fraction {
    type Output = Fraction;

    fn add(self, rhs: Self) -> Self::Output {
        Self::reduced(
            i128::from(self.numer) * i128::from(rhs.denom)
                + i128::from(rhs.numer) * i128::from(self.denom),
            i128::from(self.denom) * i128::from(rhs.denom),
        )
    }
}

impl Sub for Fraction {
    type Output = Fraction;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::reduced(
            i128::from(self.numer) * i128::from(rhs.denom)
                - i128::from(rhs.numer) * i128::from(self.denom),
            i128::from(self.denom) * i128::from(rhs.denom),
        )
    }
}

impl Mul for Fraction {
    type Output = Fraction;

    fn mul(self, rhs: Self) -> Self::Output {
        Self::reduced(
            i128::from(self.numer) * i128::from(rhs.numer),
            i128::from(self.denom) * i128::from(rhs.denom),
        )
    }
}

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fraction {
    fn cmp(&self, other: &Self) -> Ordering {
        (i128::from(self.numer) * i128::from(other.denom))
            .cmp(&(i128::from(other.numer) * i128::from(self.denom)))
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denom == 1 {
            write!(f, "{}", self.numer)
        } else {
            write!(f, "{}/{}", self.numer, self.denom)
        }
    }
}
