use std::time::Duration;

use fundament::{MatchingMatrix, ValidityConstraints, Vector};
use fundament_kit::{expand_collect, run_collect, EnumerationSpec, RunConfig};

fn quad_pair() -> (MatchingMatrix, ValidityConstraints) {
    // Two tetrahedra in quad coordinates glued along one matching equation.
    let matrix = MatchingMatrix::from_i64_rows(6, &[[1i64, 1, 0, -1, 0, -1]]).unwrap();
    (matrix, ValidityConstraints::quad(2))
}

#[test]
fn spec_string_drives_a_run() {
    let (matrix, constraints) = quad_pair();
    let spec: EnumerationSpec = "hilbert-primal:auto".parse().unwrap();
    let primal = run_collect(&matrix, &constraints, &RunConfig::new(spec.options())).unwrap();

    let spec: EnumerationSpec = "hilbert-dual".parse().unwrap();
    let dual = run_collect(&matrix, &constraints, &RunConfig::new(spec.into())).unwrap();

    assert_eq!(primal.vectors, dual.vectors);
    assert_eq!(primal.summary.emitted, primal.vectors.len());
    for v in &primal.vectors {
        assert!(matrix.annihilates(v).unwrap());
        assert!(constraints.is_satisfied_by(v).unwrap());
    }
}

#[test]
fn generous_deadline_does_not_interfere() {
    let (matrix, constraints) = quad_pair();
    let config = RunConfig::default().with_deadline(Duration::from_secs(600));
    let out = run_collect(&matrix, &constraints, &config).unwrap();
    assert!(!out.vectors.is_empty());
}

#[test]
fn expired_deadline_cancels() {
    let (matrix, constraints) = quad_pair();
    let config = RunConfig::default().with_deadline(Duration::ZERO);
    let err = run_collect(&matrix, &constraints, &config).unwrap_err();
    assert!(err.to_string().contains("cancelled"), "{err:#}");
}

#[test]
fn expired_deadline_cancels_without_equations() {
    let matrix = MatchingMatrix::empty(3);
    for spec in ["extreme-rays", "hilbert-primal", "hilbert-dual"] {
        let spec: EnumerationSpec = spec.parse().unwrap();
        let config = RunConfig::new(spec.options()).with_deadline(Duration::ZERO);
        let err = run_collect(&matrix, &ValidityConstraints::none(), &config).unwrap_err();
        assert!(err.to_string().contains("cancelled"), "{spec}: {err:#}");
    }
}

#[test]
fn failures_carry_context() {
    let matrix = MatchingMatrix::empty(40);
    let spec: EnumerationSpec = "extreme-rays:w32".parse().unwrap();
    let err = run_collect(
        &matrix,
        &ValidityConstraints::none(),
        &RunConfig::new(spec.options()),
    )
    .unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("extreme-rays enumeration failed"), "{message}");
    assert!(message.contains("capacity"), "{message}");
}

#[test]
fn rays_expand_through_the_kit() {
    let rays = [Vector::from(vec![1, 0]), Vector::from(vec![1, 2])];
    let out = expand_collect(&rays, &ValidityConstraints::none(), &RunConfig::default()).unwrap();
    assert_eq!(
        out.vectors,
        vec![
            Vector::from(vec![1, 0]),
            Vector::from(vec![1, 1]),
            Vector::from(vec![1, 2]),
        ]
    );
    assert_eq!(out.summary.extreme_rays, 2);
}
