use crate::FundamentError as Error;
use quadrille_core::{Integer, Mask, Vector};

/// A ray of the partial cone during double description, with its support cached as a mask.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RaySpec<M: Mask> {
    pub(crate) vector: Vector<Integer>,
    pub(crate) support: M,
}

impl<M: Mask> RaySpec<M> {
    pub fn unit(dim: usize, index: usize) -> Self {
        let mut support = M::empty(dim);
        support.set(index);
        Self {
            vector: Vector::unit(dim, index),
            support,
        }
    }

    #[inline(always)]
    pub fn vector(&self) -> &Vector<Integer> {
        &self.vector
    }

    #[inline(always)]
    pub fn support(&self) -> &M {
        &self.support
    }

    pub fn into_vector(self) -> Vector<Integer> {
        self.vector
    }

    #[inline]
    pub(crate) fn eval(&self, row: &[Integer]) -> Result<Integer, Error> {
        Ok(self.vector.dot_slice(row)?)
    }

    /// `pos_dot * neg - neg_dot * pos`, reduced to a primitive vector.
    ///
    /// With `pos_dot > 0 > neg_dot` the result is non-negative and orthogonal to the row that
    /// produced the dot products.
    pub(crate) fn combine(
        pos: &Self,
        pos_dot: &Integer,
        neg: &Self,
        neg_dot: &Integer,
        support: M,
    ) -> Result<Self, Error> {
        debug_assert!(pos_dot.is_positive() && neg_dot.is_negative());
        let mut vector = neg.vector.clone();
        vector.scale(pos_dot);
        let mut other = pos.vector.clone();
        other.scale(neg_dot);
        vector.sub_assign(&other)?;
        if vector.scale_down().is_zero() {
            return Err(Error::invalid("combination of adjacent rays vanished"));
        }
        debug_assert!(vector.is_non_negative(), "combined ray has a negative entry");
        Ok(Self { vector, support })
    }
}
