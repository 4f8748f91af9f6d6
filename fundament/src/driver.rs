//! Entry points routing a request to the enumerators.
//!
//! Every entry point resolves the mask width, builds the constraint masks, declares weighted
//! progress stages and marks the tracker finished before returning, whatever the outcome.

use quadrille_core::{BitSet, Integer, Mask, MaskWidth, ProgressTracker, ValidityConstraints, Vector};
use tracing::debug;

use crate::dd::extreme_rays;
use crate::hilbert::{hilbert_dual, hilbert_primal, DualFaceSolver, FaceSolver, SimplicialSolver};
use crate::options::{EnumerationMode, EnumerationOptions, HilbertDelegate};
use crate::FundamentError as Error;
use crate::{poll_cancelled, MatchingMatrix};

const STAGE_RAYS: &str = "Enumerating extremal rays";
const STAGE_INIT: &str = "Initialising Hilbert basis enumeration";
const STAGE_EXPAND: &str = "Expanding to Hilbert basis";
const STAGE_DUAL: &str = "Enumerating Hilbert basis (dual method)";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnumerationSummary {
    /// Vectors handed to the sink.
    pub emitted: usize,
    /// Matching equations processed by the double description or dual method.
    pub rows_processed: usize,
    pub extreme_rays: usize,
    /// Maximal admissible faces solved by the primal method.
    pub faces: usize,
    /// Concrete mask width the run used.
    pub mask_width: MaskWidth,
}

/// Runs `body` with `$m` bound to the mask type of a resolved width.
macro_rules! with_mask {
    ($width:expr, $m:ident => $body:expr) => {
        match $width {
            MaskWidth::W32 => {
                type $m = u32;
                $body
            }
            MaskWidth::W64 => {
                type $m = u64;
                $body
            }
            MaskWidth::W128 => {
                type $m = u128;
                $body
            }
            MaskWidth::Unbounded | MaskWidth::Auto => {
                type $m = BitSet;
                $body
            }
        }
    };
}

fn resolve_width(requested: MaskWidth, dim: usize) -> Result<MaskWidth, Error> {
    requested.resolve(dim).ok_or(Error::CapacityExceeded {
        dimension: dim,
        capacity: requested.capacity().unwrap_or_default(),
    })
}

#[inline]
fn stage(tracker: Option<&ProgressTracker>, description: &str, weight: f64) {
    if let Some(tracker) = tracker {
        tracker.new_stage(description, weight);
    }
}

fn finish<T>(tracker: Option<&ProgressTracker>, result: Result<T, Error>) -> Result<T, Error> {
    if let Some(tracker) = tracker {
        tracker.set_finished();
    }
    result
}

/// Enumerates the extreme rays or the Hilbert basis of `{x >= 0 : Mx = 0}` restricted to the
/// vectors satisfying `constraints`, streaming each vector into `sink`.
///
/// On cancellation the result is `Err(Cancelled)` and the tracker is still marked finished; a
/// tracker cancelled before the call fails every mode without emitting anything.
///
/// Emission order depends on the mode. Extreme rays are emitted once the double description has
/// completed, in ascending order when `sort_between_rows` is set. The dual method emits its basis
/// in ascending order once complete. The primal method streams face by face as each face is
/// solved; the sequence is deterministic for a given input but not sorted overall.
pub fn enumerate<F>(
    matrix: &MatchingMatrix,
    constraints: &ValidityConstraints,
    options: &EnumerationOptions,
    tracker: Option<&ProgressTracker>,
    mut sink: F,
) -> Result<EnumerationSummary, Error>
where
    F: FnMut(Vector<Integer>),
{
    let result = resolve_width(options.mask_width(), matrix.col_count()).and_then(|width| {
        with_mask!(width, M => run::<M, F>(matrix, constraints, options, tracker, &mut sink, width))
    });
    finish(tracker, result)
}

fn run<M, F>(
    matrix: &MatchingMatrix,
    constraints: &ValidityConstraints,
    options: &EnumerationOptions,
    tracker: Option<&ProgressTracker>,
    sink: &mut F,
    width: MaskWidth,
) -> Result<EnumerationSummary, Error>
where
    M: Mask,
    F: FnMut(Vector<Integer>),
{
    let dim = matrix.col_count();
    let mut summary = EnumerationSummary {
        mask_width: width,
        ..EnumerationSummary::default()
    };
    poll_cancelled(tracker)?;
    match options.mode() {
        EnumerationMode::ExtremeRays => {
            stage(tracker, STAGE_RAYS, 1.0);
            let masks = constraints.bitmasks::<M>(dim)?;
            let (rays, stats) = extreme_rays(matrix, &masks, options, tracker)?;
            summary.rows_processed = stats.rows_processed;
            summary.extreme_rays = rays.len();
            for ray in rays {
                summary.emitted += 1;
                sink(ray);
            }
        }
        EnumerationMode::HilbertPrimal => {
            stage(tracker, STAGE_INIT, 0.1);
            let masks = constraints.bitmasks::<M>(dim)?;
            stage(tracker, STAGE_RAYS, 0.4);
            let (rays, stats) = extreme_rays(matrix, &masks, options, tracker)?;
            summary.rows_processed = stats.rows_processed;
            summary.extreme_rays = rays.len();

            stage(tracker, STAGE_EXPAND, 0.5);
            let primal = match options.hilbert_delegate() {
                HilbertDelegate::Simplicial => {
                    hilbert_primal(&rays, &masks, &SimplicialSolver, tracker, sink)?
                }
                HilbertDelegate::Dual => {
                    hilbert_primal(&rays, &masks, &DualFaceSolver::new(matrix), tracker, sink)?
                }
            };
            summary.faces = primal.faces;
            summary.emitted = primal.emitted;
        }
        EnumerationMode::HilbertDual => {
            stage(tracker, STAGE_DUAL, 1.0);
            let masks = constraints.bitmasks::<M>(dim)?;
            let basis = hilbert_dual(matrix, &masks, tracker)?;
            summary.rows_processed = matrix.row_count();
            for v in basis {
                summary.emitted += 1;
                sink(v);
            }
        }
    }
    debug!(
        mode = %options.mode(),
        width = %width,
        emitted = summary.emitted,
        rays = summary.extreme_rays,
        faces = summary.faces,
        "enumeration finished"
    );
    Ok(summary)
}

/// Primal Hilbert basis enumeration for callers that already hold the extreme rays.
///
/// No matching equations are known here, so the dual delegate reports every face as unsolved.
pub fn hilbert_primal_from_rays<F>(
    rays: &[Vector<Integer>],
    constraints: &ValidityConstraints,
    options: &EnumerationOptions,
    tracker: Option<&ProgressTracker>,
    mut sink: F,
) -> Result<EnumerationSummary, Error>
where
    F: FnMut(Vector<Integer>),
{
    let dim = rays.first().map_or(0, Vector::len);
    let result = resolve_width(options.mask_width(), dim).and_then(|width| {
        with_mask!(width, M => expand::<M, F>(rays, constraints, options, tracker, &mut sink, width))
    });
    finish(tracker, result)
}

fn expand<M, F>(
    rays: &[Vector<Integer>],
    constraints: &ValidityConstraints,
    options: &EnumerationOptions,
    tracker: Option<&ProgressTracker>,
    sink: &mut F,
    width: MaskWidth,
) -> Result<EnumerationSummary, Error>
where
    M: Mask,
    F: FnMut(Vector<Integer>),
{
    stage(tracker, STAGE_EXPAND, 1.0);
    poll_cancelled(tracker)?;
    let dim = rays.first().map_or(0, Vector::len);
    let masks = constraints.bitmasks::<M>(dim)?;
    let dual = DualFaceSolver::without_equations();
    let solver: &dyn FaceSolver = match options.hilbert_delegate() {
        HilbertDelegate::Simplicial => &SimplicialSolver,
        HilbertDelegate::Dual => &dual,
    };
    let primal = hilbert_primal(rays, &masks, solver, tracker, sink)?;
    debug!(
        width = %width,
        rays = rays.len(),
        faces = primal.faces,
        emitted = primal.emitted,
        "hilbert basis expanded from rays"
    );
    Ok(EnumerationSummary {
        emitted: primal.emitted,
        rows_processed: 0,
        extreme_rays: rays.len(),
        faces: primal.faces,
        mask_width: width,
    })
}
