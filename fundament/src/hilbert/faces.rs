//! Maximal admissible faces of a cone spanned by valid extreme rays.
//!
//! Every face of a cone inside the non-negative orthant is cut out by coordinate hyperplanes, so a
//! face is determined by the union of its rays' supports. A face is admissible iff that union meets
//! each validity mask in at most one coordinate.

use ahash::AHashSet;
use quadrille_core::validity::admissible;
use quadrille_core::{Mask, TypeTrie};
use tracing::trace;

/// Complement of `support` as a 0/1 type vector over `len` coordinates.
fn complement<M: Mask>(support: &M, len: usize) -> Vec<u8> {
    (0..len).map(|i| u8::from(!support.get(i))).collect()
}

/// Supports of the maximal admissible faces, in discovery order.
///
/// Unions of ray supports are grown a ray at a time; a union that no further ray extends
/// admissibly is maximal. Each maximal face is recorded once.
pub fn maximal_admissible_faces<M: Mask>(supports: &[M], masks: &[M], len: usize) -> Vec<M> {
    let mut seen: AHashSet<M> = AHashSet::new();
    let mut level: Vec<M> = Vec::new();
    for support in supports {
        if seen.insert(support.clone()) {
            level.push(support.clone());
        }
    }

    // A face F is covered by a recorded face G iff complement(G) <= complement(F) entrywise,
    // which is exactly trie dominance over the complements.
    let mut recorded = TypeTrie::<2>::new();
    let mut faces = Vec::new();
    let mut depth = 0usize;
    while !level.is_empty() {
        let mut next = Vec::new();
        for union in &level {
            let mut extended = false;
            for support in supports {
                if support.is_subset_of(union) {
                    continue;
                }
                let grown = union.union(support);
                if !admissible(&grown, masks) {
                    continue;
                }
                extended = true;
                if seen.insert(grown.clone()) {
                    next.push(grown);
                }
            }
            if !extended {
                let key = complement(union, len);
                if !recorded.dominates(&key) {
                    recorded.insert(&key);
                    faces.push(union.clone());
                }
            }
        }
        depth += 1;
        trace!(depth, frontier = next.len(), faces = faces.len(), "face level");
        level = next;
    }
    faces
}

#[cfg(test)]
mod tests {
    use super::maximal_admissible_faces;
    use quadrille_core::{Mask, ValidityConstraints};

    fn mask(bits: &[usize]) -> u64 {
        let mut m = 0u64;
        for &b in bits {
            m.set(b);
        }
        m
    }

    #[test]
    fn unconstrained_cone_is_its_own_face() {
        let supports = [mask(&[0, 2]), mask(&[1, 2]), mask(&[0, 1])];
        let faces = maximal_admissible_faces(&supports, &[], 3);
        assert_eq!(faces, vec![mask(&[0, 1, 2])]);
    }

    #[test]
    fn quad_constraints_split_the_cone() {
        // One tetrahedron in quad coordinates plus a free fourth coordinate.
        let masks = ValidityConstraints::quad(1).bitmasks::<u64>(4).unwrap();
        let supports = [mask(&[0, 3]), mask(&[1, 3]), mask(&[2]), mask(&[3])];
        let mut faces = maximal_admissible_faces(&supports, &masks, 4);
        faces.sort_unstable();
        assert_eq!(faces, vec![mask(&[0, 3]), mask(&[1, 3]), mask(&[2, 3])]);
    }

    #[test]
    fn no_rays_no_faces() {
        assert!(maximal_admissible_faces::<u64>(&[], &[], 3).is_empty());
    }
}
