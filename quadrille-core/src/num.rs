//! Arbitrary-precision integers and exact rationals.
//!
//! Both types are thin owned wrappers over `num-bigint`/`num-rational`. The wrappers exist so that
//! every fallible operation (division) reports an [`ArithmeticError`] instead of panicking, and so
//! that the enumerators can rely on a small, stable numeric surface.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use num_bigint::BigInt;
use num_integer::Integer as _;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ArithmeticError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("inexact division")]
    InexactDivision,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Sign {
    Negative,
    Zero,
    Positive,
}

impl Sign {
    #[inline]
    pub fn negate(self) -> Self {
        match self {
            Sign::Negative => Sign::Positive,
            Sign::Zero => Sign::Zero,
            Sign::Positive => Sign::Negative,
        }
    }
}

/// Signed arbitrary-precision integer. Defaults to zero.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Integer(BigInt);

impl Integer {
    #[inline]
    pub fn zero() -> Self {
        Self(BigInt::zero())
    }

    #[inline]
    pub fn one() -> Self {
        Self(BigInt::one())
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_one(&self) -> bool {
        self.0.is_one()
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0.is_positive()
    }

    #[inline]
    pub fn sign(&self) -> Sign {
        match self.0.sign() {
            num_bigint::Sign::Minus => Sign::Negative,
            num_bigint::Sign::NoSign => Sign::Zero,
            num_bigint::Sign::Plus => Sign::Positive,
        }
    }

    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    pub fn negate(&mut self) {
        self.0 = -std::mem::take(&mut self.0);
    }

    /// Non-negative gcd; `gcd(0, 0) == 0`.
    pub fn gcd(&self, other: &Self) -> Self {
        Self(self.0.gcd(&other.0))
    }

    pub fn gcd_assign(&mut self, other: &Self) {
        self.0 = self.0.gcd(&other.0);
    }

    /// Floored division with remainder: `self = q * d + r` and `0 <= r < |d|`.
    pub fn div_rem_floor(&self, d: &Self) -> Result<(Self, Self), ArithmeticError> {
        if d.is_zero() {
            return Err(ArithmeticError::DivisionByZero);
        }
        let (mut q, mut r) = self.0.div_rem(&d.0);
        if r.is_negative() {
            if d.0.is_positive() {
                q -= 1;
                r += &d.0;
            } else {
                q += 1;
                r -= &d.0;
            }
        }
        Ok((Self(q), Self(r)))
    }

    /// Truncating division with remainder (remainder takes the sign of `self`).
    pub fn div_rem(&self, d: &Self) -> Result<(Self, Self), ArithmeticError> {
        if d.is_zero() {
            return Err(ArithmeticError::DivisionByZero);
        }
        let (q, r) = self.0.div_rem(&d.0);
        Ok((Self(q), Self(r)))
    }

    pub fn div_exact(&self, d: &Self) -> Result<Self, ArithmeticError> {
        let (q, r) = self.div_rem(d)?;
        if !r.is_zero() {
            return Err(ArithmeticError::InexactDivision);
        }
        Ok(q)
    }

    #[inline]
    pub fn to_i64(&self) -> Option<i64> {
        self.0.to_i64()
    }
}

impl From<i64> for Integer {
    #[inline]
    fn from(value: i64) -> Self {
        Self(BigInt::from(value))
    }
}

impl From<i32> for Integer {
    #[inline]
    fn from(value: i32) -> Self {
        Self(BigInt::from(value))
    }
}

impl From<u64> for Integer {
    #[inline]
    fn from(value: u64) -> Self {
        Self(BigInt::from(value))
    }
}

impl From<usize> for Integer {
    #[inline]
    fn from(value: usize) -> Self {
        Self(BigInt::from(value))
    }
}

impl From<BigInt> for Integer {
    #[inline]
    fn from(value: BigInt) -> Self {
        Self(value)
    }
}

impl FromStr for Integer {
    type Err = num_bigint::ParseBigIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<BigInt>().map(Self)
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl PartialEq<i64> for Integer {
    fn eq(&self, other: &i64) -> bool {
        self.0 == BigInt::from(*other)
    }
}

impl PartialOrd<i64> for Integer {
    fn partial_cmp(&self, other: &i64) -> Option<Ordering> {
        self.0.partial_cmp(&BigInt::from(*other))
    }
}

macro_rules! forward_binop {
    ($ty:ident, $trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident) => {
        impl $trait<$ty> for $ty {
            type Output = $ty;
            #[inline]
            fn $method(self, rhs: $ty) -> $ty {
                $ty($trait::$method(self.0, rhs.0))
            }
        }

        impl<'a> $trait<&'a $ty> for $ty {
            type Output = $ty;
            #[inline]
            fn $method(self, rhs: &'a $ty) -> $ty {
                $ty($trait::$method(self.0, &rhs.0))
            }
        }

        impl<'a, 'b> $trait<&'b $ty> for &'a $ty {
            type Output = $ty;
            #[inline]
            fn $method(self, rhs: &'b $ty) -> $ty {
                $ty($trait::$method(&self.0, &rhs.0))
            }
        }

        impl $assign_trait<$ty> for $ty {
            #[inline]
            fn $assign_method(&mut self, rhs: $ty) {
                $assign_trait::$assign_method(&mut self.0, rhs.0);
            }
        }

        impl<'a> $assign_trait<&'a $ty> for $ty {
            #[inline]
            fn $assign_method(&mut self, rhs: &'a $ty) {
                $assign_trait::$assign_method(&mut self.0, &rhs.0);
            }
        }
    };
}

forward_binop!(Integer, Add, add, AddAssign, add_assign);
forward_binop!(Integer, Sub, sub, SubAssign, sub_assign);
forward_binop!(Integer, Mul, mul, MulAssign, mul_assign);
forward_binop!(Rational, Add, add, AddAssign, add_assign);
forward_binop!(Rational, Sub, sub, SubAssign, sub_assign);
forward_binop!(Rational, Mul, mul, MulAssign, mul_assign);

impl Neg for Integer {
    type Output = Integer;
    #[inline]
    fn neg(self) -> Integer {
        Integer(-self.0)
    }
}

impl<'a> Neg for &'a Integer {
    type Output = Integer;
    #[inline]
    fn neg(self) -> Integer {
        Integer(-&self.0)
    }
}

/// Exact rational in canonical form (positive denominator, coprime parts).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Rational(BigRational);

impl Default for Rational {
    fn default() -> Self {
        Self::zero()
    }
}

impl Rational {
    pub fn new(numer: Integer, denom: Integer) -> Result<Self, ArithmeticError> {
        if denom.is_zero() {
            return Err(ArithmeticError::DivisionByZero);
        }
        Ok(Self(BigRational::new(numer.0, denom.0)))
    }

    #[inline]
    pub fn zero() -> Self {
        Self(BigRational::zero())
    }

    #[inline]
    pub fn one() -> Self {
        Self(BigRational::one())
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    #[inline]
    pub fn sign(&self) -> Sign {
        if self.0.is_zero() {
            Sign::Zero
        } else if self.0.is_negative() {
            Sign::Negative
        } else {
            Sign::Positive
        }
    }

    pub fn numer(&self) -> Integer {
        Integer(self.0.numer().clone())
    }

    pub fn denom(&self) -> Integer {
        Integer(self.0.denom().clone())
    }

    #[inline]
    pub fn is_integer(&self) -> bool {
        self.0.is_integer()
    }

    pub fn to_integer(&self) -> Option<Integer> {
        self.is_integer().then(|| Integer(self.0.numer().clone()))
    }

    /// Largest integer not exceeding `self`.
    pub fn floor(&self) -> Integer {
        Integer(self.0.floor().to_integer())
    }

    /// `self - floor(self)`, always in `[0, 1)`.
    pub fn fract_floor(&self) -> Rational {
        Self(&self.0 - self.0.floor())
    }

    pub fn negate(&mut self) {
        self.0 = -std::mem::take(&mut self.0);
    }

    pub fn checked_div(&self, other: &Self) -> Result<Self, ArithmeticError> {
        if other.is_zero() {
            return Err(ArithmeticError::DivisionByZero);
        }
        Ok(Self(&self.0 / &other.0))
    }
}

impl From<Integer> for Rational {
    #[inline]
    fn from(value: Integer) -> Self {
        Self(BigRational::from_integer(value.0))
    }
}

impl From<&Integer> for Rational {
    #[inline]
    fn from(value: &Integer) -> Self {
        Self(BigRational::from_integer(value.0.clone()))
    }
}

impl From<i64> for Rational {
    #[inline]
    fn from(value: i64) -> Self {
        Self::from(Integer::from(value))
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_integer() {
            fmt::Display::fmt(self.0.numer(), f)
        } else {
            write!(f, "{}/{}", self.0.numer(), self.0.denom())
        }
    }
}

impl Neg for Rational {
    type Output = Rational;
    #[inline]
    fn neg(self) -> Rational {
        Rational(-self.0)
    }
}

impl<'a> Neg for &'a Rational {
    type Output = Rational;
    #[inline]
    fn neg(self) -> Rational {
        Rational(-&self.0)
    }
}
