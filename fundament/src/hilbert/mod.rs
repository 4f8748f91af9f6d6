//! Hilbert basis enumeration.
//!
//! Two methods are provided: the primal method ([`primal`]) decomposes the admissible region into
//! maximal admissible faces and solves each face with a [`FaceSolver`]; the dual method ([`dual`])
//! completes a generating set one matching equation at a time.

pub mod dual;
pub mod faces;
pub mod primal;
pub mod simplicial;

pub use dual::{hilbert_dual, DualFaceSolver};
pub use faces::maximal_admissible_faces;
pub use primal::{hilbert_primal, PrimalSummary};
pub use simplicial::{simplicial_hilbert_basis, SimplicialSolver};

use quadrille_core::{Integer, Vector};

use crate::FundamentError as Error;

/// Computes the Hilbert basis of the cone spanned by `generators` over the integer lattice.
///
/// `face` lists the coordinates the face may use (its support), ascending; every generator is
/// non-negative, non-zero and supported inside it.
pub trait FaceSolver {
    fn name(&self) -> &'static str;

    fn hilbert_basis(
        &self,
        face: &[usize],
        generators: &[Vector<Integer>],
    ) -> Result<Vec<Vector<Integer>>, Error>;
}

/// Drops any `x` for which another kept `y` satisfies `y <= x` entrywise; `y == x` counts.
///
/// Sorting by entry total first guarantees reducers are kept before what they reduce.
pub(crate) fn inter_reduce(mut vectors: Vec<Vector<Integer>>) -> Vec<Vector<Integer>> {
    vectors.sort_by(|a, b| a.total().cmp(&b.total()).then_with(|| a.cmp(b)));
    let mut kept: Vec<Vector<Integer>> = Vec::with_capacity(vectors.len());
    for v in vectors {
        if !kept.iter().any(|k| k.le_componentwise(&v)) {
            kept.push(v);
        }
    }
    kept.sort();
    kept
}
