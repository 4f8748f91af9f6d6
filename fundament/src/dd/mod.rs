//! Extreme ray enumeration by the double description method.

pub mod engine;
pub mod order;
pub mod ray;

pub use engine::{DdStats, DoubleDescription};
pub use order::row_sequence;
pub use ray::RaySpec;

use quadrille_core::{Integer, Mask, ProgressTracker, Vector};

use crate::options::EnumerationOptions;
use crate::FundamentError as Error;
use crate::MatchingMatrix;

/// Extreme rays of `{x >= 0 : Mx = 0}` meeting every mask in at most one coordinate, each
/// primitive. Sorted when `options.sort_between_rows()` is set.
pub fn extreme_rays<M: Mask>(
    matrix: &MatchingMatrix,
    masks: &[M],
    options: &EnumerationOptions,
    tracker: Option<&ProgressTracker>,
) -> Result<(Vec<Vector<Integer>>, DdStats), Error> {
    let sequence = row_sequence(matrix, options.initial_rows(), options.row_order())?;
    let (rays, stats) = DoubleDescription::new(matrix, masks, sequence)
        .with_sort_between_rows(options.sort_between_rows())
        .with_tracker(tracker)
        .run()?;
    let mut rays: Vec<Vector<Integer>> = rays.into_iter().map(RaySpec::into_vector).collect();
    if options.sort_between_rows() {
        rays.sort();
    }
    Ok((rays, stats))
}
