use quadrille_core::validity::admissible;
use quadrille_core::{Integer, Mask, ProgressTracker, Sign};
use tracing::{debug, trace};

use crate::dd::ray::RaySpec;
use crate::FundamentError as Error;
use crate::{checkpoint, poll_cancelled, MatchingMatrix};

/// Pair combinations checked between cancellation polls.
const PAIR_BATCH: usize = 1 << 10;

/// Double description over a matching matrix, restricted to rays satisfying the validity masks.
///
/// Rays are the valid unit vectors to begin with; each matching equation then cuts the cone,
/// keeping the rays on the hyperplane and adding one new ray per adjacent pair on opposite sides.
/// Two rays are adjacent iff no third ray has support inside the union of their supports.
pub struct DoubleDescription<'a, M: Mask> {
    matrix: &'a MatchingMatrix,
    masks: &'a [M],
    sequence: Vec<usize>,
    sort_between_rows: bool,
    tracker: Option<&'a ProgressTracker>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DdStats {
    pub rows_processed: usize,
    pub pairs_considered: usize,
    pub rays_created: usize,
    pub peak_rays: usize,
}

impl<'a, M: Mask> DoubleDescription<'a, M> {
    pub fn new(matrix: &'a MatchingMatrix, masks: &'a [M], sequence: Vec<usize>) -> Self {
        Self {
            matrix,
            masks,
            sequence,
            sort_between_rows: true,
            tracker: None,
        }
    }

    pub fn with_sort_between_rows(mut self, sort: bool) -> Self {
        self.sort_between_rows = sort;
        self
    }

    pub fn with_tracker(mut self, tracker: Option<&'a ProgressTracker>) -> Self {
        self.tracker = tracker;
        self
    }

    /// Runs to completion and returns the extreme rays.
    ///
    /// Nothing is returned on cancellation, so no partial ray set ever escapes.
    pub fn run(self) -> Result<(Vec<RaySpec<M>>, DdStats), Error> {
        let dim = self.matrix.col_count();
        if let Some(capacity) = M::CAPACITY {
            if dim > capacity {
                return Err(Error::CapacityExceeded {
                    dimension: dim,
                    capacity,
                });
            }
        }
        if let Some(&bad) = self.sequence.iter().find(|&&r| r >= self.matrix.row_count()) {
            return Err(Error::invalid(format!("row {bad} out of range")));
        }

        let mut stats = DdStats::default();
        let mut rays: Vec<RaySpec<M>> = (0..dim)
            .map(|i| RaySpec::unit(dim, i))
            .filter(|ray| admissible(ray.support(), self.masks))
            .collect();
        stats.peak_rays = rays.len();

        let total = self.sequence.len();
        for (done, &row_index) in self.sequence.iter().enumerate() {
            if !self.matrix.is_zero_row(row_index) {
                rays = self.cut(rays, self.matrix.row(row_index), &mut stats)?;
                if self.sort_between_rows {
                    rays.sort_by(|a, b| a.vector().cmp(b.vector()));
                }
            }
            stats.rows_processed += 1;
            stats.peak_rays = stats.peak_rays.max(rays.len());
            debug!(
                row = row_index,
                step = done + 1,
                of = total,
                rays = rays.len(),
                "double description row processed"
            );
            checkpoint(self.tracker, done + 1, total)?;
        }
        Ok((rays, stats))
    }

    fn cut(
        &self,
        rays: Vec<RaySpec<M>>,
        row: &[Integer],
        stats: &mut DdStats,
    ) -> Result<Vec<RaySpec<M>>, Error> {
        let mut zero = Vec::new();
        let mut pos = Vec::new();
        let mut neg = Vec::new();
        for (i, ray) in rays.iter().enumerate() {
            let dot = ray.eval(row)?;
            match dot.sign() {
                Sign::Zero => zero.push(i),
                Sign::Positive => pos.push((i, dot)),
                Sign::Negative => neg.push((i, dot)),
            }
        }
        trace!(
            zero = zero.len(),
            pos = pos.len(),
            neg = neg.len(),
            "partitioned rays"
        );

        let mut created = Vec::new();
        let mut since_poll = 0usize;
        for (a, a_dot) in &pos {
            for (b, b_dot) in &neg {
                stats.pairs_considered += 1;
                since_poll += 1;
                if since_poll == PAIR_BATCH {
                    since_poll = 0;
                    poll_cancelled(self.tracker)?;
                }
                let (ray_a, ray_b) = (&rays[*a], &rays[*b]);
                let union = ray_a.support().union(ray_b.support());
                if !admissible(&union, self.masks) {
                    continue;
                }
                let blocked = rays.iter().enumerate().any(|(c, ray_c)| {
                    c != *a && c != *b && ray_c.support().is_subset_of(&union)
                });
                if blocked {
                    continue;
                }
                created.push(RaySpec::combine(ray_a, a_dot, ray_b, b_dot, union)?);
            }
        }
        stats.rays_created += created.len();

        let mut kept: Vec<RaySpec<M>> = Vec::with_capacity(zero.len() + created.len());
        let mut rays = rays.into_iter().map(Some).collect::<Vec<_>>();
        for i in zero {
            if let Some(ray) = rays[i].take() {
                kept.push(ray);
            }
        }
        kept.extend(created);
        Ok(kept)
    }
}

#[cfg(test)]
mod tests {
    use super::DoubleDescription;
    use crate::FundamentError;
    use crate::MatchingMatrix;
    use quadrille_core::{Integer, ProgressTracker, ValidityConstraints, Vector};

    fn rays_of(matrix: &MatchingMatrix, constraints: &ValidityConstraints) -> Vec<Vector<Integer>> {
        let masks = constraints.bitmasks::<u64>(matrix.col_count()).unwrap();
        let sequence = (0..matrix.row_count()).collect();
        let (rays, _) = DoubleDescription::new(matrix, &masks, sequence).run().unwrap();
        let mut out: Vec<_> = rays.into_iter().map(|r| r.into_vector()).collect();
        out.sort();
        out
    }

    #[test]
    fn single_equation_cuts_the_orthant() {
        let m = MatchingMatrix::from_i64_rows(3, &[[1i64, -1, 0]]).unwrap();
        assert_eq!(
            rays_of(&m, &ValidityConstraints::none()),
            vec![Vector::from(vec![0, 0, 1]), Vector::from(vec![1, 1, 0])]
        );
    }

    #[test]
    fn non_adjacent_pairs_are_not_combined() {
        // x0 + x1 = x2 + x3 gives a square cone; x0 = x1 then cuts through two opposite
        // corners, and the diagonal pairs must not contribute (1, 1, 1, 1).
        let square = MatchingMatrix::from_i64_rows(4, &[[1i64, 1, -1, -1]]).unwrap();
        assert_eq!(
            rays_of(&square, &ValidityConstraints::none()),
            vec![
                Vector::from(vec![0, 1, 0, 1]),
                Vector::from(vec![0, 1, 1, 0]),
                Vector::from(vec![1, 0, 0, 1]),
                Vector::from(vec![1, 0, 1, 0]),
            ]
        );

        let cut = MatchingMatrix::from_i64_rows(4, &[[1i64, 1, -1, -1], [1, -1, 0, 0]]).unwrap();
        assert_eq!(
            rays_of(&cut, &ValidityConstraints::none()),
            vec![Vector::from(vec![1, 1, 0, 2]), Vector::from(vec![1, 1, 2, 0])]
        );
    }

    #[test]
    fn zero_rows_change_nothing() {
        let m = MatchingMatrix::from_i64_rows(2, &[[0i64, 0]]).unwrap();
        assert_eq!(
            rays_of(&m, &ValidityConstraints::none()),
            vec![Vector::from(vec![0, 1]), Vector::from(vec![1, 0])]
        );
    }

    #[test]
    fn oversized_dimension_is_a_capacity_error() {
        let m = MatchingMatrix::empty(40);
        let masks: Vec<u32> = Vec::new();
        let err = DoubleDescription::new(&m, &masks, Vec::new())
            .run()
            .unwrap_err();
        assert_eq!(
            err,
            FundamentError::CapacityExceeded {
                dimension: 40,
                capacity: 32
            }
        );
    }

    #[test]
    fn cancellation_returns_no_rays() {
        let m = MatchingMatrix::from_i64_rows(3, &[[1i64, -1, 0]]).unwrap();
        let tracker = ProgressTracker::new();
        tracker.cancel();
        let masks: Vec<u64> = Vec::new();
        let result = DoubleDescription::new(&m, &masks, vec![0])
            .with_tracker(Some(&tracker))
            .run();
        assert_eq!(result.unwrap_err(), FundamentError::Cancelled);
    }
}
