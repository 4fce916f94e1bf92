//! Exact rational time values.
//!
//! Timeline positions are kept as reduced fractions so that frame- and
//! sample-aligned times never accumulate floating point drift.

use core::cmp::Ordering;
use core::fmt;
use core::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};
use serde::{Deserialize, Serialize};

/// Largest denominator produced by [`Rational::from_f64`].
const MAX_APPROX_DENOMINATOR: i64 = i32::MAX as i64;

/// A reduced fraction `num / den` with `den > 0`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(i64, i64)", into = "(i64, i64)")]
pub struct Rational {
    num: i64,
    den: i64,
}

impl Rational {
    pub const ZERO: Rational = Rational { num: 0, den: 1 };
    pub const ONE: Rational = Rational { num: 1, den: 1 };
    /// Used as an open upper bound ("until the end of time").
    pub const MAX: Rational = Rational {
        num: i64::MAX,
        den: 1,
    };

    /// Create a fraction. A zero denominator yields zero.
    pub fn new(num: i64, den: i64) -> Self {
        Self::reduce(num as i128, den as i128)
    }

    pub const fn from_integer(value: i64) -> Self {
        Self { num: value, den: 1 }
    }

    /// Approximate a float with a continued fraction.
    ///
    /// Non-finite input maps to zero.
    pub fn from_f64(value: f64) -> Self {
        if !value.is_finite() {
            return Self::ZERO;
        }

        let negative = value < 0.0;
        let mut x = value.abs();

        // Convergents h/k, seeded with h(-2)=0, h(-1)=1, k(-2)=1, k(-1)=0.
        let (mut h0, mut h1) = (0i64, 1i64);
        let (mut k0, mut k1) = (1i64, 0i64);

        for _ in 0..64 {
            let a = x.floor();
            if a >= i64::MAX as f64 {
                break;
            }
            let a = a as i64;

            let Some(h2) = a.checked_mul(h1).and_then(|v| v.checked_add(h0)) else {
                break;
            };
            let Some(k2) = a.checked_mul(k1).and_then(|v| v.checked_add(k0)) else {
                break;
            };
            if k2 > MAX_APPROX_DENOMINATOR {
                break;
            }

            h0 = h1;
            h1 = h2;
            k0 = k1;
            k1 = k2;

            let frac = x - a as f64;
            if frac < 1e-12 {
                break;
            }
            x = 1.0 / frac;
        }

        if k1 == 0 {
            return Self::ZERO;
        }

        let r = Self::new(h1, k1);
        if negative {
            -r
        } else {
            r
        }
    }

    #[inline]
    pub fn numerator(&self) -> i64 {
        self.num
    }

    #[inline]
    pub fn denominator(&self) -> i64 {
        self.den
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.num == 0
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.num < 0
    }

    pub fn to_f64(&self) -> f64 {
        self.num as f64 / self.den as f64
    }

    /// Largest integer not greater than this value.
    pub fn floor(&self) -> i64 {
        self.num.div_euclid(self.den)
    }

    /// Smallest integer not less than this value.
    pub fn ceil(&self) -> i64 {
        let q = self.num.div_euclid(self.den);
        if self.num.rem_euclid(self.den) == 0 {
            q
        } else {
            q + 1
        }
    }

    /// Reciprocal. Zero stays zero.
    pub fn recip(&self) -> Self {
        Self::new(self.den, self.num)
    }

    pub fn abs(&self) -> Self {
        Self {
            num: self.num.abs(),
            den: self.den,
        }
    }

    /// Reduce a wide fraction, saturating values that do not fit in i64.
    fn reduce(num: i128, den: i128) -> Self {
        if den == 0 {
            return Self::ZERO;
        }
        if num == 0 {
            return Self::ZERO;
        }

        let (mut num, mut den) = if den < 0 { (-num, -den) } else { (num, den) };
        let g = gcd(num.unsigned_abs(), den.unsigned_abs()) as i128;
        num /= g;
        den /= g;

        // Out-of-range results are saturated; timeline values never get near this in practice.
        while den > i64::MAX as i128 || num > i64::MAX as i128 || num < i64::MIN as i128 {
            if den == 1 {
                let num = if num > 0 { i64::MAX } else { i64::MIN + 1 };
                return Self { num, den: 1 };
            }
            num /= 2;
            den /= 2;
            if den == 0 {
                return Self::ZERO;
            }
        }

        Self {
            num: num as i64,
            den: den as i64,
        }
    }
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a.max(1)
}

impl Default for Rational {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<i64> for Rational {
    fn from(value: i64) -> Self {
        Self::from_integer(value)
    }
}

impl From<i32> for Rational {
    fn from(value: i32) -> Self {
        Self::from_integer(value as i64)
    }
}

impl From<(i64, i64)> for Rational {
    fn from((num, den): (i64, i64)) -> Self {
        Self::new(num, den)
    }
}

impl From<Rational> for (i64, i64) {
    fn from(r: Rational) -> Self {
        (r.num, r.den)
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = self.num as i128 * other.den as i128;
        let rhs = other.num as i128 * self.den as i128;
        lhs.cmp(&rhs)
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Add for Rational {
    type Output = Rational;

    fn add(self, rhs: Rational) -> Rational {
        let num = self.num as i128 * rhs.den as i128 + rhs.num as i128 * self.den as i128;
        let den = self.den as i128 * rhs.den as i128;
        Rational::reduce(num, den)
    }
}

impl Sub for Rational {
    type Output = Rational;

    fn sub(self, rhs: Rational) -> Rational {
        let num = self.num as i128 * rhs.den as i128 - rhs.num as i128 * self.den as i128;
        let den = self.den as i128 * rhs.den as i128;
        Rational::reduce(num, den)
    }
}

impl Mul for Rational {
    type Output = Rational;

    fn mul(self, rhs: Rational) -> Rational {
        Rational::reduce(
            self.num as i128 * rhs.num as i128,
            self.den as i128 * rhs.den as i128,
        )
    }
}

impl Div for Rational {
    type Output = Rational;

    fn div(self, rhs: Rational) -> Rational {
        Rational::reduce(
            self.num as i128 * rhs.den as i128,
            self.den as i128 * rhs.num as i128,
        )
    }
}

impl Neg for Rational {
    type Output = Rational;

    fn neg(self) -> Rational {
        Rational {
            num: -self.num,
            den: self.den,
        }
    }
}

impl AddAssign for Rational {
    fn add_assign(&mut self, rhs: Rational) {
        *self = *self + rhs;
    }
}

impl SubAssign for Rational {
    fn sub_assign(&mut self, rhs: Rational) {
        *self = *self - rhs;
    }
}

impl fmt::Debug for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}
