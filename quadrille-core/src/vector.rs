//! Dense fixed-length vectors over exact scalars.

use std::fmt;
use std::ops::{AddAssign, Index, IndexMut, MulAssign, Neg, SubAssign};

use crate::num::{Integer, Rational};

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum VectorError {
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
}

/// Exact scalar usable as a vector entry.
pub trait Scalar:
    Clone
    + fmt::Debug
    + fmt::Display
    + Default
    + Ord
    + Eq
    + std::hash::Hash
    + for<'a> AddAssign<&'a Self>
    + for<'a> SubAssign<&'a Self>
    + for<'a> MulAssign<&'a Self>
    + Neg<Output = Self>
{
    fn zero() -> Self;
    fn product(&self, rhs: &Self) -> Self;
    fn one() -> Self;
    fn is_zero(&self) -> bool;
    fn is_negative(&self) -> bool;
    fn negate(&mut self);
}

impl Scalar for Integer {
    #[inline(always)]
    fn zero() -> Self {
        Integer::zero()
    }

    #[inline(always)]
    fn product(&self, rhs: &Self) -> Self {
        self * rhs
    }

    #[inline(always)]
    fn one() -> Self {
        Integer::one()
    }

    #[inline(always)]
    fn is_zero(&self) -> bool {
        Integer::is_zero(self)
    }

    #[inline(always)]
    fn is_negative(&self) -> bool {
        Integer::is_negative(self)
    }

    #[inline(always)]
    fn negate(&mut self) {
        Integer::negate(self)
    }
}

impl Scalar for Rational {
    #[inline(always)]
    fn zero() -> Self {
        Rational::zero()
    }

    #[inline(always)]
    fn product(&self, rhs: &Self) -> Self {
        self * rhs
    }

    #[inline(always)]
    fn one() -> Self {
        Rational::one()
    }

    #[inline(always)]
    fn is_zero(&self) -> bool {
        Rational::is_zero(self)
    }

    #[inline(always)]
    fn is_negative(&self) -> bool {
        Rational::is_negative(self)
    }

    #[inline(always)]
    fn negate(&mut self) {
        Rational::negate(self)
    }
}

/// A vector whose length is fixed at construction.
///
/// Ordering is lexicographic on the entries, which for vectors of a common length gives the
/// canonical output order used throughout the enumerators.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Vector<T: Scalar> {
    elements: Vec<T>,
}

impl<T: Scalar> Vector<T> {
    pub fn zeros(dim: usize) -> Self {
        Self {
            elements: vec![T::zero(); dim],
        }
    }

    pub fn unit(dim: usize, index: usize) -> Self {
        debug_assert!(index < dim, "unit index {index} out of range for dimension {dim}");
        let mut v = Self::zeros(dim);
        v.elements[index] = T::one();
        v
    }

    pub fn from_elements(elements: Vec<T>) -> Self {
        Self { elements }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[T] {
        &self.elements
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.elements.iter()
    }

    pub fn into_elements(self) -> Vec<T> {
        self.elements
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.elements.get(index)
    }

    pub fn set(&mut self, index: usize, value: T) {
        debug_assert!(index < self.len(), "index {index} out of range");
        self.elements[index] = value;
    }

    pub fn is_zero(&self) -> bool {
        self.elements.iter().all(T::is_zero)
    }

    pub fn is_non_negative(&self) -> bool {
        !self.elements.iter().any(T::is_negative)
    }

    /// Indices of the non-zero entries, ascending.
    pub fn support(&self) -> impl Iterator<Item = usize> + '_ {
        self.elements
            .iter()
            .enumerate()
            .filter_map(|(i, x)| (!x.is_zero()).then_some(i))
    }

    #[inline]
    fn check_dim(&self, other: &Self) -> Result<(), VectorError> {
        if self.len() != other.len() {
            return Err(VectorError::DimensionMismatch {
                expected: self.len(),
                found: other.len(),
            });
        }
        Ok(())
    }

    pub fn add_assign(&mut self, other: &Self) -> Result<(), VectorError> {
        self.check_dim(other)?;
        for (a, b) in self.elements.iter_mut().zip(&other.elements) {
            *a += b;
        }
        Ok(())
    }

    pub fn sub_assign(&mut self, other: &Self) -> Result<(), VectorError> {
        self.check_dim(other)?;
        for (a, b) in self.elements.iter_mut().zip(&other.elements) {
            *a -= b;
        }
        Ok(())
    }

    pub fn checked_add(&self, other: &Self) -> Result<Self, VectorError> {
        let mut out = self.clone();
        out.add_assign(other)?;
        Ok(out)
    }

    pub fn checked_sub(&self, other: &Self) -> Result<Self, VectorError> {
        let mut out = self.clone();
        out.sub_assign(other)?;
        Ok(out)
    }

    pub fn scale(&mut self, factor: &T) {
        for a in &mut self.elements {
            *a *= factor;
        }
    }

    pub fn negate(&mut self) {
        for a in &mut self.elements {
            a.negate();
        }
    }

    pub fn dot(&self, other: &Self) -> Result<T, VectorError> {
        self.check_dim(other)?;
        let mut acc = T::zero();
        for (a, b) in self.elements.iter().zip(&other.elements) {
            acc += &a.product(b);
        }
        Ok(acc)
    }

    /// `dot` against a slice of the same length; used with matrix rows.
    pub fn dot_slice(&self, row: &[T]) -> Result<T, VectorError> {
        if row.len() != self.len() {
            return Err(VectorError::DimensionMismatch {
                expected: self.len(),
                found: row.len(),
            });
        }
        let mut acc = T::zero();
        for (a, b) in self.elements.iter().zip(row) {
            if a.is_zero() || b.is_zero() {
                continue;
            }
            acc += &a.product(b);
        }
        Ok(acc)
    }

    /// `self <= other` in every coordinate.
    pub fn le_componentwise(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .elements
                .iter()
                .zip(&other.elements)
                .all(|(a, b)| a <= b)
    }
}

impl Vector<Integer> {
    /// Divides through by the gcd of the entries and returns that gcd.
    ///
    /// Returns zero (and leaves the vector alone) for the zero vector.
    pub fn scale_down(&mut self) -> Integer {
        let mut gcd = Integer::zero();
        for x in &self.elements {
            if x.is_zero() {
                continue;
            }
            gcd.gcd_assign(x);
            if gcd.is_one() {
                return gcd;
            }
        }
        if gcd.is_zero() || gcd.is_one() {
            return gcd;
        }
        for x in &mut self.elements {
            if !x.is_zero() {
                // gcd divides every entry by construction.
                if let Ok(q) = x.div_exact(&gcd) {
                    *x = q;
                }
            }
        }
        gcd
    }

    pub fn gcd(&self) -> Integer {
        let mut gcd = Integer::zero();
        for x in &self.elements {
            gcd.gcd_assign(x);
        }
        gcd
    }

    pub fn to_rational(&self) -> Vector<Rational> {
        Vector::from_elements(self.elements.iter().map(Rational::from).collect())
    }

    /// Entries summed; the enumerators use this as a cheap degree.
    pub fn total(&self) -> Integer {
        let mut acc = Integer::zero();
        for x in &self.elements {
            acc += x;
        }
        acc
    }
}

impl<T: Scalar> Index<usize> for Vector<T> {
    type Output = T;

    #[inline(always)]
    fn index(&self, index: usize) -> &T {
        debug_assert!(index < self.len(), "index {index} out of range");
        &self.elements[index]
    }
}

impl<T: Scalar> IndexMut<usize> for Vector<T> {
    #[inline(always)]
    fn index_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.len(), "index {index} out of range");
        &mut self.elements[index]
    }
}

impl From<Vec<i64>> for Vector<Integer> {
    fn from(values: Vec<i64>) -> Self {
        Self::from_elements(values.into_iter().map(Integer::from).collect())
    }
}

impl From<&[i64]> for Vector<Integer> {
    fn from(values: &[i64]) -> Self {
        Self::from_elements(values.iter().copied().map(Integer::from).collect())
    }
}

impl<T: Scalar> fmt::Display for Vector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for x in &self.elements {
            write!(f, " {x}")?;
        }
        f.write_str(" )")
    }
}

#[cfg(test)]
mod tests {
    use super::{Vector, VectorError};
    use crate::num::{Integer, Rational};

    fn v(xs: &[i64]) -> Vector<Integer> {
        Vector::from(xs)
    }

    #[test]
    fn scale_down_returns_gcd_and_reduces() {
        let mut x = v(&[0, 6, -9, 12]);
        assert_eq!(x.scale_down(), Integer::from(3));
        assert_eq!(x, v(&[0, 2, -3, 4]));
        assert_eq!(x.scale_down(), Integer::one());
        assert_eq!(x, v(&[0, 2, -3, 4]));
    }

    #[test]
    fn scale_down_of_zero_vector_is_zero() {
        let mut z = Vector::<Integer>::zeros(4);
        assert!(z.scale_down().is_zero());
        assert!(z.is_zero());
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let mut a = v(&[1, 2]);
        let b = v(&[1, 2, 3]);
        assert_eq!(
            a.add_assign(&b),
            Err(VectorError::DimensionMismatch {
                expected: 2,
                found: 3
            })
        );
        assert!(a.dot(&b).is_err());
        assert_eq!(a, v(&[1, 2]));
    }

    #[test]
    fn arithmetic_and_dot() {
        let mut a = v(&[1, -2, 3]);
        a.add_assign(&v(&[1, 1, 1])).unwrap();
        assert_eq!(a, v(&[2, -1, 4]));
        a.scale(&Integer::from(2));
        assert_eq!(a, v(&[4, -2, 8]));
        a.negate();
        assert_eq!(a.dot(&v(&[1, 1, 1])).unwrap(), Integer::from(-10));
        assert_eq!(a.support().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn lexicographic_order_and_display() {
        let mut xs = vec![v(&[1, 0, 0]), v(&[0, 2, 1]), v(&[0, 2, 0])];
        xs.sort();
        assert_eq!(xs, vec![v(&[0, 2, 0]), v(&[0, 2, 1]), v(&[1, 0, 0])]);
        assert_eq!(v(&[1, -2, 0]).to_string(), "( 1 -2 0 )");
    }

    #[test]
    fn rational_vectors_share_the_api() {
        let half = Rational::new(Integer::one(), Integer::from(2)).unwrap();
        let mut r = v(&[2, 4]).to_rational();
        r.scale(&half);
        assert_eq!(r, v(&[1, 2]).to_rational());
        assert_eq!(Vector::<Rational>::unit(2, 1).to_string(), "( 0 1 )");
    }
}
