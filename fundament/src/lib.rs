//! Vertex and Hilbert basis enumeration for cones of the form `{x >= 0 : Mx = 0}` under
//! "at most one non-zero per block" validity constraints.
//!
//! The entry point is [`driver::enumerate`]; the individual algorithms live in [`dd`] (double
//! description, extreme rays) and [`hilbert`] (primal and dual Hilbert basis enumeration).

pub mod dd;
pub mod driver;
pub mod hilbert;
pub mod linalg;
pub mod matrix;
pub mod options;

pub use driver::{enumerate, hilbert_primal_from_rays, EnumerationSummary};
pub use matrix::MatchingMatrix;
pub use options::{EnumerationMode, EnumerationOptions, HilbertDelegate, RowOrder};
pub use quadrille_core::{
    Integer, MaskWidth, ProgressTracker, Rational, TypeTrie, ValidityConstraints, Vector,
};

use quadrille_core::{ArithmeticError, ConstraintError, VectorError};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FundamentError {
    #[error("invalid argument: {context}")]
    InvalidArgument { context: String },
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("arithmetic error: {0}")]
    Arithmetic(#[from] ArithmeticError),
    #[error("dimension {dimension} exceeds mask capacity {capacity}")]
    CapacityExceeded { dimension: usize, capacity: usize },
    #[error("{delegate} solver failed on face {face:?}: {reason}")]
    UnsolvedCase {
        delegate: &'static str,
        face: Vec<usize>,
        reason: String,
    },
    #[error("enumeration cancelled")]
    Cancelled,
}

impl FundamentError {
    pub(crate) fn invalid(context: impl Into<String>) -> Self {
        Self::InvalidArgument {
            context: context.into(),
        }
    }

    /// Cancellation is a requested stop, not a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<VectorError> for FundamentError {
    fn from(err: VectorError) -> Self {
        match err {
            VectorError::DimensionMismatch { expected, found } => {
                Self::DimensionMismatch { expected, found }
            }
        }
    }
}

impl From<ConstraintError> for FundamentError {
    fn from(err: ConstraintError) -> Self {
        match err {
            ConstraintError::MaskCapacity { len, capacity } => Self::CapacityExceeded {
                dimension: len,
                capacity,
            },
            other => Self::invalid(other.to_string()),
        }
    }
}

/// Reports progress through the current stage; fails with `Cancelled` once cancellation is seen.
#[inline]
pub(crate) fn checkpoint(
    tracker: Option<&ProgressTracker>,
    done: usize,
    total: usize,
) -> Result<(), FundamentError> {
    let Some(tracker) = tracker else {
        return Ok(());
    };
    let percent = if total == 0 {
        100.0
    } else {
        100.0 * done as f64 / total as f64
    };
    if tracker.set_percent(percent) {
        Ok(())
    } else {
        Err(FundamentError::Cancelled)
    }
}

/// Polls for cancellation without touching the reported percent.
#[inline]
pub(crate) fn poll_cancelled(tracker: Option<&ProgressTracker>) -> Result<(), FundamentError> {
    match tracker {
        Some(tracker) if tracker.is_cancelled() => Err(FundamentError::Cancelled),
        _ => Ok(()),
    }
}
