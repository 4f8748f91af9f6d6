use fundament::{
    enumerate, EnumerationMode, EnumerationOptions, Integer, MatchingMatrix, ValidityConstraints,
    Vector,
};
use proptest::prelude::*;

fn collect(
    matrix: &MatchingMatrix,
    constraints: &ValidityConstraints,
    mode: EnumerationMode,
) -> Vec<Vector<Integer>> {
    let mut out = Vec::new();
    enumerate(
        matrix,
        constraints,
        &EnumerationOptions::new(mode),
        None,
        |v| out.push(v),
    )
    .unwrap();
    out.sort();
    out
}

fn small_system() -> impl Strategy<Value = (MatchingMatrix, ValidityConstraints)> {
    (1usize..=2, any::<bool>()).prop_flat_map(|(rows, quad)| {
        prop::collection::vec(prop::collection::vec(-2i64..=2, 5), rows).prop_map(move |rows| {
            let matrix = MatchingMatrix::from_i64_rows(5, &rows).unwrap();
            let mut constraints = ValidityConstraints::none();
            if quad {
                constraints.add_block([0, 1, 2]);
            }
            (matrix, constraints)
        })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_extreme_rays_are_valid_primitive_solutions((matrix, constraints) in small_system()) {
        let rays = collect(&matrix, &constraints, EnumerationMode::ExtremeRays);
        for r in &rays {
            prop_assert!(r.is_non_negative() && !r.is_zero());
            prop_assert!(matrix.annihilates(r).unwrap());
            prop_assert!(r.gcd().is_one());
            prop_assert!(constraints.is_satisfied_by(r).unwrap());
        }
        let mut deduped = rays.clone();
        deduped.dedup();
        prop_assert_eq!(deduped.len(), rays.len());
    }

    #[test]
    fn prop_primal_and_dual_hilbert_bases_agree((matrix, constraints) in small_system()) {
        let primal = collect(&matrix, &constraints, EnumerationMode::HilbertPrimal);
        let dual = collect(&matrix, &constraints, EnumerationMode::HilbertDual);
        prop_assert_eq!(&primal, &dual);
        for r in collect(&matrix, &constraints, EnumerationMode::ExtremeRays) {
            prop_assert!(primal.contains(&r));
        }
    }
}
