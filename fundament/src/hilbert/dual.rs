//! Hilbert basis enumeration by the dual method.
//!
//! Starting from the unit vectors (the Hilbert basis of the orthant), each matching equation is
//! imposed in turn. Basis elements are split by the sign of the equation's value; sums of
//! positive/negative pairs are added until the set is closed under non-reducible sums, and the
//! elements on the hyperplane then generate the new monoid.

use quadrille_core::validity::{admissible, support_mask};
use quadrille_core::{BitSet, Integer, Mask, ProgressTracker, Sign, Vector};
use tracing::{debug, trace};

use super::{inter_reduce, FaceSolver};
use crate::FundamentError as Error;
use crate::{checkpoint, poll_cancelled, MatchingMatrix};

/// Pair sums formed between cancellation polls.
const PAIR_BATCH: usize = 1 << 10;

#[derive(Clone, Debug)]
struct Entry<M> {
    vector: Vector<Integer>,
    support: M,
    /// Value of the equation currently being imposed.
    value: Integer,
}

impl<M: Mask> Entry<M> {
    fn new(vector: Vector<Integer>, row: &[Integer]) -> Result<Self, Error> {
        let value = vector.dot_slice(row)?;
        Ok(Self {
            support: support_mask(&vector),
            vector,
            value,
        })
    }

    fn sum(pos: &Self, neg: &Self, support: M) -> Result<Self, Error> {
        Ok(Self {
            vector: pos.vector.checked_add(&neg.vector)?,
            support,
            value: &pos.value + &neg.value,
        })
    }

    /// Whether `self - other` is a non-zero element of the previous monoid lying on the same
    /// side of the hyperplane as `self` (or on it).
    #[inline]
    fn reduced_by(&self, other: &Self) -> bool {
        let same_side = match self.value.sign() {
            Sign::Positive => other.value <= self.value,
            Sign::Negative => other.value >= self.value,
            Sign::Zero => other.value.is_zero(),
        };
        same_side
            && other.support.is_subset_of(&self.support)
            && other.vector.le_componentwise(&self.vector)
    }
}

struct Completion<'a, M> {
    masks: &'a [M],
    tracker: Option<&'a ProgressTracker>,
    since_poll: usize,
    sums: usize,
}

impl<'a, M: Mask> Completion<'a, M> {
    /// Closes `basis` under non-reducible sums across `row` and returns the elements on it.
    fn impose(
        &mut self,
        basis: Vec<Vector<Integer>>,
        row: &[Integer],
    ) -> Result<Vec<Vector<Integer>>, Error> {
        let mut zero: Vec<Entry<M>> = Vec::new();
        let mut pos: Vec<Entry<M>> = Vec::new();
        let mut neg: Vec<Entry<M>> = Vec::new();
        for v in basis {
            let entry = Entry::new(v, row)?;
            match entry.value.sign() {
                Sign::Zero => zero.push(entry),
                Sign::Positive => pos.push(entry),
                Sign::Negative => neg.push(entry),
            }
        }

        // Pairs with both members older than these marks were handled in an earlier round.
        let (mut old_pos, mut old_neg) = (0usize, 0usize);
        let mut round = 0usize;
        loop {
            let mut fresh_pos: Vec<Entry<M>> = Vec::new();
            let mut fresh_neg: Vec<Entry<M>> = Vec::new();
            for (i, p) in pos.iter().enumerate() {
                for (j, n) in neg.iter().enumerate() {
                    if i < old_pos && j < old_neg {
                        continue;
                    }
                    self.tick()?;
                    let union = p.support.union(&n.support);
                    if !admissible(&union, self.masks) {
                        continue;
                    }
                    let s = Entry::sum(p, n, union)?;
                    self.sums += 1;
                    match s.value.sign() {
                        Sign::Zero => {
                            if !zero.iter().any(|g| s.reduced_by(g)) {
                                zero.push(s);
                            }
                        }
                        Sign::Positive => {
                            let reducible = zero
                                .iter()
                                .chain(&pos)
                                .chain(&fresh_pos)
                                .any(|g| s.reduced_by(g));
                            if !reducible {
                                fresh_pos.push(s);
                            }
                        }
                        Sign::Negative => {
                            let reducible = zero
                                .iter()
                                .chain(&neg)
                                .chain(&fresh_neg)
                                .any(|g| s.reduced_by(g));
                            if !reducible {
                                fresh_neg.push(s);
                            }
                        }
                    }
                }
            }
            round += 1;
            trace!(
                round,
                zero = zero.len(),
                fresh_pos = fresh_pos.len(),
                fresh_neg = fresh_neg.len(),
                "dual completion round"
            );
            if fresh_pos.is_empty() && fresh_neg.is_empty() {
                break;
            }
            old_pos = pos.len();
            old_neg = neg.len();
            pos.extend(fresh_pos);
            neg.extend(fresh_neg);
        }

        Ok(inter_reduce(zero.into_iter().map(|e| e.vector).collect()))
    }

    #[inline]
    fn tick(&mut self) -> Result<(), Error> {
        self.since_poll += 1;
        if self.since_poll == PAIR_BATCH {
            self.since_poll = 0;
            poll_cancelled(self.tracker)?;
        }
        Ok(())
    }
}

/// Hilbert basis of `{x >= 0 : Mx = 0}` restricted to vectors meeting every mask in at most one
/// coordinate, sorted.
pub fn hilbert_dual<M: Mask>(
    matrix: &MatchingMatrix,
    masks: &[M],
    tracker: Option<&ProgressTracker>,
) -> Result<Vec<Vector<Integer>>, Error> {
    let dim = matrix.col_count();
    if let Some(capacity) = M::CAPACITY {
        if dim > capacity {
            return Err(Error::CapacityExceeded {
                dimension: dim,
                capacity,
            });
        }
    }

    let mut basis: Vec<Vector<Integer>> = (0..dim).map(|i| Vector::unit(dim, i)).collect();
    let mut completion = Completion {
        masks,
        tracker,
        since_poll: 0,
        sums: 0,
    };
    let total = matrix.row_count();
    for row_index in 0..total {
        if !matrix.is_zero_row(row_index) {
            basis = completion.impose(basis, matrix.row(row_index))?;
        }
        debug!(
            row = row_index,
            of = total,
            basis = basis.len(),
            sums = completion.sums,
            "dual method row processed"
        );
        checkpoint(tracker, row_index + 1, total)?;
    }
    basis.sort();
    Ok(basis)
}

/// Per-face delegate that solves each face with the dual method on the face's own columns.
///
/// Built without a matrix (as when only rays are known) it refuses every face.
#[derive(Copy, Clone, Debug, Default)]
pub struct DualFaceSolver<'a> {
    matrix: Option<&'a MatchingMatrix>,
}

impl<'a> DualFaceSolver<'a> {
    pub fn new(matrix: &'a MatchingMatrix) -> Self {
        Self {
            matrix: Some(matrix),
        }
    }

    pub fn without_equations() -> Self {
        Self { matrix: None }
    }
}

impl FaceSolver for DualFaceSolver<'_> {
    fn name(&self) -> &'static str {
        "dual"
    }

    fn hilbert_basis(
        &self,
        face: &[usize],
        _generators: &[Vector<Integer>],
    ) -> Result<Vec<Vector<Integer>>, Error> {
        let Some(matrix) = self.matrix else {
            return Err(Error::invalid("matching equations are not available"));
        };
        let restricted = matrix.select_columns(face)?;
        let local = hilbert_dual::<BitSet>(&restricted, &[], None)?;
        let dim = matrix.col_count();
        Ok(local
            .into_iter()
            .map(|v| {
                let mut lifted = Vector::zeros(dim);
                for (&col, x) in face.iter().zip(v.into_elements()) {
                    lifted[col] = x;
                }
                lifted
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::{hilbert_dual, DualFaceSolver};
    use crate::hilbert::FaceSolver;
    use crate::MatchingMatrix;
    use quadrille_core::{ProgressTracker, ValidityConstraints, Vector};

    #[test]
    fn single_equation_basis() {
        let m = MatchingMatrix::from_i64_rows(3, &[[1i64, 1, -2]]).unwrap();
        let basis = hilbert_dual::<u64>(&m, &[], None).unwrap();
        assert_eq!(
            basis,
            vec![
                Vector::from(vec![0, 2, 1]),
                Vector::from(vec![1, 1, 1]),
                Vector::from(vec![2, 0, 1]),
            ]
        );
    }

    #[test]
    fn no_equations_leaves_the_unit_vectors() {
        let m = MatchingMatrix::empty(2);
        let basis = hilbert_dual::<u32>(&m, &[], None).unwrap();
        assert_eq!(basis, vec![Vector::from(vec![0, 1]), Vector::from(vec![1, 0])]);
    }

    #[test]
    fn masks_exclude_mixed_elements() {
        // x0 + x1 = x2 with x0, x1 never both non-zero.
        let m = MatchingMatrix::from_i64_rows(3, &[[1i64, 1, -1]]).unwrap();
        let mut constraints = ValidityConstraints::none();
        constraints.add_block([0, 1]);
        let masks = constraints.bitmasks::<u64>(3).unwrap();
        let basis = hilbert_dual(&m, &masks, None).unwrap();
        assert_eq!(
            basis,
            vec![Vector::from(vec![0, 1, 1]), Vector::from(vec![1, 0, 1])]
        );
    }

    #[test]
    fn cancelled_before_the_first_row() {
        let m = MatchingMatrix::from_i64_rows(2, &[[1i64, -1]]).unwrap();
        let tracker = ProgressTracker::new();
        tracker.cancel();
        let err = hilbert_dual::<u64>(&m, &[], Some(&tracker)).unwrap_err();
        assert!(err.is_cancelled());
    }

    #[test]
    fn face_delegate_lifts_back_to_full_coordinates() {
        let m = MatchingMatrix::from_i64_rows(4, &[[1i64, 1, -2, 0]]).unwrap();
        let solver = DualFaceSolver::new(&m);
        let basis = solver.hilbert_basis(&[0, 2], &[]).unwrap();
        assert_eq!(basis, vec![Vector::from(vec![2, 0, 1, 0])]);

        assert!(DualFaceSolver::without_equations()
            .hilbert_basis(&[0, 2], &[])
            .is_err());
    }
}
