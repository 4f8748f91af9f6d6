//! Hilbert basis enumeration by the primal method.
//!
//! The admissible part of the cone is a union of faces, so its Hilbert basis is the union of the
//! Hilbert bases of its maximal admissible faces. Each face is handed to a [`FaceSolver`]; results
//! are streamed to the sink, skipping duplicates and anything componentwise above a kept element.

use ahash::AHashSet;
use quadrille_core::validity::{admissible, support_mask};
use quadrille_core::{Integer, Mask, ProgressTracker, Vector};
use tracing::debug;

use super::faces::maximal_admissible_faces;
use super::FaceSolver;
use crate::checkpoint;
use crate::FundamentError as Error;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PrimalSummary {
    pub faces: usize,
    pub emitted: usize,
}

/// Streams the Hilbert basis of the admissible region spanned by `rays` into `sink`.
///
/// Every ray must be non-negative, non-zero, of common length and admissible for `masks`.
pub fn hilbert_primal<M, S, F>(
    rays: &[Vector<Integer>],
    masks: &[M],
    solver: &S,
    tracker: Option<&ProgressTracker>,
    sink: &mut F,
) -> Result<PrimalSummary, Error>
where
    M: Mask,
    S: FaceSolver + ?Sized,
    F: FnMut(Vector<Integer>),
{
    let Some(first) = rays.first() else {
        checkpoint(tracker, 0, 0)?;
        return Ok(PrimalSummary::default());
    };
    let dim = first.len();
    if let Some(capacity) = M::CAPACITY {
        if dim > capacity {
            return Err(Error::CapacityExceeded {
                dimension: dim,
                capacity,
            });
        }
    }

    let mut supports: Vec<M> = Vec::with_capacity(rays.len());
    for ray in rays {
        if ray.len() != dim {
            return Err(Error::DimensionMismatch {
                expected: dim,
                found: ray.len(),
            });
        }
        if !ray.is_non_negative() || ray.is_zero() {
            return Err(Error::invalid(format!(
                "extreme ray {ray} must be non-negative and non-zero"
            )));
        }
        let support: M = support_mask(ray);
        if !admissible(&support, masks) {
            return Err(Error::invalid(format!(
                "extreme ray {ray} violates the validity constraints"
            )));
        }
        supports.push(support);
    }

    let faces = maximal_admissible_faces(&supports, masks, dim);
    let total = faces.len();
    let mut seen: AHashSet<Vector<Integer>> = AHashSet::new();
    let mut kept: Vec<(M, Vector<Integer>)> = Vec::new();
    let mut summary = PrimalSummary {
        faces: total,
        emitted: 0,
    };
    for (done, face) in faces.iter().enumerate() {
        checkpoint(tracker, done, total)?;
        let generators: Vec<Vector<Integer>> = rays
            .iter()
            .zip(&supports)
            .filter(|(_, support)| support.is_subset_of(face))
            .map(|(ray, _)| ray.clone())
            .collect();
        let indices = face.ones();
        let basis = match solver.hilbert_basis(&indices, &generators) {
            Ok(basis) => basis,
            Err(Error::Cancelled) => return Err(Error::Cancelled),
            Err(err) => {
                return Err(Error::UnsolvedCase {
                    delegate: solver.name(),
                    face: indices,
                    reason: err.to_string(),
                })
            }
        };
        let mut fresh = 0usize;
        let mut dominated = 0usize;
        for v in basis {
            if !seen.insert(v.clone()) {
                continue;
            }
            let support: M = support_mask(&v);
            if kept
                .iter()
                .any(|(s, k)| s.is_subset_of(&support) && k.le_componentwise(&v))
            {
                dominated += 1;
                continue;
            }
            kept.push((support, v.clone()));
            fresh += 1;
            sink(v);
        }
        summary.emitted += fresh;
        debug!(
            face = done + 1,
            of = total,
            generators = generators.len(),
            fresh,
            dominated,
            "primal face solved"
        );
    }
    checkpoint(tracker, total, total)?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::hilbert_primal;
    use crate::hilbert::{FaceSolver, SimplicialSolver};
    use crate::FundamentError;
    use quadrille_core::{Integer, ValidityConstraints, Vector};

    struct Refusing;

    impl FaceSolver for Refusing {
        fn name(&self) -> &'static str {
            "refusing"
        }

        fn hilbert_basis(
            &self,
            _face: &[usize],
            _generators: &[Vector<Integer>],
        ) -> Result<Vec<Vector<Integer>>, FundamentError> {
            Err(FundamentError::invalid("no"))
        }
    }

    /// Returns the generators followed by their sum.
    struct Padded;

    impl FaceSolver for Padded {
        fn name(&self) -> &'static str {
            "padded"
        }

        fn hilbert_basis(
            &self,
            _face: &[usize],
            generators: &[Vector<Integer>],
        ) -> Result<Vec<Vector<Integer>>, FundamentError> {
            let mut out = generators.to_vec();
            let mut sum = generators[0].clone();
            for g in &generators[1..] {
                sum.add_assign(g)?;
            }
            out.push(sum);
            Ok(out)
        }
    }

    fn collect(
        rays: &[Vector<Integer>],
        constraints: &ValidityConstraints,
    ) -> Result<Vec<Vector<Integer>>, FundamentError> {
        let masks = constraints.bitmasks::<u64>(rays[0].len())?;
        let mut out = Vec::new();
        hilbert_primal(rays, &masks, &SimplicialSolver, None, &mut |v| out.push(v))?;
        out.sort();
        Ok(out)
    }

    #[test]
    fn single_face_basis() {
        let rays = [Vector::from(vec![1, 0]), Vector::from(vec![1, 2])];
        assert_eq!(
            collect(&rays, &ValidityConstraints::none()).unwrap(),
            vec![
                Vector::from(vec![1, 0]),
                Vector::from(vec![1, 1]),
                Vector::from(vec![1, 2]),
            ]
        );
    }

    #[test]
    fn shared_rays_are_emitted_once() {
        // Faces {0, 2} and {1, 2} share the ray e2.
        let mut constraints = ValidityConstraints::none();
        constraints.add_block([0, 1]);
        let rays = [
            Vector::from(vec![1, 0, 0]),
            Vector::from(vec![0, 1, 0]),
            Vector::from(vec![0, 0, 1]),
        ];
        let out = collect(&rays, &constraints).unwrap();
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn dominated_elements_are_not_emitted() {
        let mut constraints = ValidityConstraints::none();
        constraints.add_block([0, 1]);
        let rays = [
            Vector::from(vec![1, 0, 0]),
            Vector::from(vec![0, 1, 0]),
            Vector::from(vec![0, 0, 1]),
        ];
        let masks = constraints.bitmasks::<u64>(3).unwrap();
        let mut out = Vec::new();
        let summary = hilbert_primal(&rays, &masks, &Padded, None, &mut |v| out.push(v)).unwrap();
        out.sort();
        assert_eq!(summary.faces, 2);
        assert_eq!(summary.emitted, 3);
        assert_eq!(
            out,
            vec![
                Vector::from(vec![0, 0, 1]),
                Vector::from(vec![0, 1, 0]),
                Vector::from(vec![1, 0, 0]),
            ]
        );
    }

    #[test]
    fn invalid_rays_are_rejected() {
        let mut constraints = ValidityConstraints::none();
        constraints.add_block([0, 1]);
        let err = collect(&[Vector::from(vec![1, 1, 0])], &constraints).unwrap_err();
        assert!(matches!(err, FundamentError::InvalidArgument { .. }));

        let err = collect(
            &[Vector::from(vec![1, 0]), Vector::from(vec![1, 0, 0])],
            &ValidityConstraints::none(),
        )
        .unwrap_err();
        assert!(matches!(err, FundamentError::DimensionMismatch { .. }));

        let err = collect(&[Vector::from(vec![1, -1])], &ValidityConstraints::none()).unwrap_err();
        assert!(matches!(err, FundamentError::InvalidArgument { .. }));
    }

    #[test]
    fn delegate_failure_names_the_face() {
        let rays = [Vector::from(vec![1, 0, 1])];
        let masks: Vec<u64> = Vec::new();
        let err = hilbert_primal(&rays, &masks, &Refusing, None, &mut |_| {}).unwrap_err();
        match err {
            FundamentError::UnsolvedCase { delegate, face, .. } => {
                assert_eq!(delegate, "refusing");
                assert_eq!(face, vec![0, 2]);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
