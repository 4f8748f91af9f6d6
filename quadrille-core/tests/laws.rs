use proptest::prelude::*;
use quadrille_core::{BitSet, Integer, Mask, TypeTrie, Vector};

fn strip(v: &[u8]) -> &[u8] {
    let len = v.iter().rposition(|&x| x != 0).map_or(0, |i| i + 1);
    &v[..len]
}

proptest! {
    #[test]
    fn prop_scale_down_is_idempotent(xs in prop::collection::vec(-1000i64..1000, 0..8)) {
        let mut v = Vector::<Integer>::from(xs.clone());
        let g = v.scale_down();
        let once = v.clone();
        let h = v.scale_down();
        prop_assert_eq!(&v, &once);
        if xs.iter().all(|&x| x == 0) {
            prop_assert!(g.is_zero());
            prop_assert!(h.is_zero());
        } else {
            prop_assert!(!g.is_negative() && !g.is_zero());
            prop_assert!(h.is_one());
            prop_assert!(v.gcd().is_one());
            let mut back = v.clone();
            back.scale(&g);
            prop_assert_eq!(back, Vector::<Integer>::from(xs));
        }
    }

    #[test]
    fn prop_trie_dominates_inserted_smaller_vectors(
        stored in prop::collection::vec(0u8..4, 0..6),
        extra in prop::collection::vec(0u8..4, 0..6),
    ) {
        // `query` agrees with `stored` wherever `stored` is non-zero.
        let len = stored.len().max(extra.len());
        let query: Vec<u8> = (0..len)
            .map(|i| match stored.get(i).copied().unwrap_or(0) {
                0 => extra.get(i).copied().unwrap_or(0),
                x => x,
            })
            .collect();
        let mut trie = TypeTrie::<4>::new();
        trie.insert(&stored);
        prop_assert!(trie.dominates(&query));
        prop_assert!(trie.contains(strip(&stored)));
    }

    #[test]
    fn prop_trie_rejects_conflicting_entries(
        stored in prop::collection::vec(1u8..4, 1..6),
        pos in 0usize..6,
    ) {
        let pos = pos % stored.len();
        let mut query = stored.clone();
        query[pos] = if stored[pos] == 3 { 1 } else { stored[pos] + 1 };
        let mut trie = TypeTrie::<4>::new();
        trie.insert(&stored);
        prop_assert!(!trie.dominates(&query));
    }

    #[test]
    fn prop_bitset_matches_u128(a in any::<u128>(), b in any::<u128>()) {
        let to_set = |bits: u128| {
            let mut s = BitSet::empty(128);
            for i in bits.ones() {
                s.set(i);
            }
            s
        };
        let (sa, sb) = (to_set(a), to_set(b));
        prop_assert_eq!(sa.union(&sb).ones(), a.union(&b).ones());
        prop_assert_eq!(sa.intersection(&sb).ones(), a.intersection(&b).ones());
        prop_assert_eq!(sa.is_subset_of(&sb), a.is_subset_of(&b));
        prop_assert_eq!(sa.meets_twice(&sb), a.meets_twice(&b));
        prop_assert_eq!(sa.count(), a.count());
    }
}

#[test]
fn trie_dominance_worked_example() {
    let mut trie = TypeTrie::<4>::new();
    trie.insert(&[1, 0, 2]);
    trie.insert(&[0, 3, 0, 0]);
    assert!(trie.dominates(&[1, 0, 2]));
    assert!(trie.dominates(&[1, 3, 2]));
    assert!(!trie.dominates(&[2, 0, 2]));
}
