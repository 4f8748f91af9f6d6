//! Validity constraints: sets of coordinates of which at most one may be non-zero.
//!
//! Constraints are stored compactly. Coordinates are grouped into `n_blocks` consecutive blocks of
//! `block_size` coordinates (one block per tetrahedron in normal surface coordinates). A *local*
//! pattern is a set of offsets within a block and yields one constraint per block; a *global*
//! pattern is unioned across every block and yields a single constraint. Arbitrary explicit
//! blocks of coordinate indices can be added alongside.

use crate::mask::{BitSet, Mask};
use crate::num::Integer;
use crate::vector::{Scalar, Vector};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConstraintError {
    #[error("constraint index {index} is out of range for dimension {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("block offset {offset} is out of range for block size {block_size}")]
    OffsetOutOfRange { offset: usize, block_size: usize },
    #[error("block size {block_size} exceeds the 64 offsets a local pattern can hold")]
    BlockTooLarge { block_size: usize },
    #[error("dimension {len} exceeds mask capacity {capacity}")]
    MaskCapacity { len: usize, capacity: usize },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ValidityConstraints {
    block_size: usize,
    n_blocks: usize,
    local: Vec<u64>,
    global: Vec<u64>,
    blocks: Vec<Vec<usize>>,
}

impl ValidityConstraints {
    /// No constraints at all.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(block_size: usize, n_blocks: usize) -> Result<Self, ConstraintError> {
        if block_size > u64::BITS as usize {
            return Err(ConstraintError::BlockTooLarge { block_size });
        }
        Ok(Self {
            block_size,
            n_blocks,
            ..Self::default()
        })
    }

    /// Quadrilateral coordinates: three quad types per tetrahedron, at most one non-zero.
    pub fn quad(n_tets: usize) -> Self {
        Self {
            block_size: 3,
            n_blocks: n_tets,
            local: vec![0b111],
            ..Self::default()
        }
    }

    /// Standard coordinates: four triangles then three quads per tetrahedron.
    pub fn standard(n_tets: usize) -> Self {
        Self {
            block_size: 7,
            n_blocks: n_tets,
            local: vec![0b111_0000],
            ..Self::default()
        }
    }

    pub fn from_blocks<I, B>(blocks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: IntoIterator<Item = usize>,
    {
        let mut out = Self::none();
        for block in blocks {
            out.add_block(block);
        }
        out
    }

    fn pattern<I: IntoIterator<Item = usize>>(&self, offsets: I) -> Result<u64, ConstraintError> {
        let mut pattern = 0u64;
        for offset in offsets {
            if offset >= self.block_size {
                return Err(ConstraintError::OffsetOutOfRange {
                    offset,
                    block_size: self.block_size,
                });
            }
            pattern |= 1u64 << offset;
        }
        Ok(pattern)
    }

    /// Adds one constraint per block, covering `offsets` within that block.
    pub fn add_local<I: IntoIterator<Item = usize>>(
        &mut self,
        offsets: I,
    ) -> Result<(), ConstraintError> {
        let pattern = self.pattern(offsets)?;
        self.local.push(pattern);
        Ok(())
    }

    /// Adds a single constraint covering `offsets` in every block simultaneously.
    pub fn add_global<I: IntoIterator<Item = usize>>(
        &mut self,
        offsets: I,
    ) -> Result<(), ConstraintError> {
        let pattern = self.pattern(offsets)?;
        self.global.push(pattern);
        Ok(())
    }

    /// Adds an explicit constraint over absolute coordinate indices.
    ///
    /// Indices are checked against the dimension when masks are built.
    pub fn add_block<I: IntoIterator<Item = usize>>(&mut self, indices: I) {
        let mut block: Vec<usize> = indices.into_iter().collect();
        block.sort_unstable();
        block.dedup();
        self.blocks.push(block);
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    #[inline]
    pub fn n_blocks(&self) -> usize {
        self.n_blocks
    }

    /// Coordinates covered by the block structure.
    #[inline]
    pub fn natural_len(&self) -> usize {
        self.block_size * self.n_blocks
    }

    pub fn is_empty(&self) -> bool {
        (self.n_blocks == 0 || (self.local.is_empty() && self.global.is_empty()))
            && self.blocks.is_empty()
    }

    fn pattern_indices(&self, pattern: u64, block: usize) -> impl Iterator<Item = usize> + '_ {
        let base = block * self.block_size;
        (0..self.block_size)
            .filter(move |offset| (pattern >> offset) & 1 != 0)
            .map(move |offset| base + offset)
    }

    /// Every constraint as a list of absolute coordinate indices.
    pub fn index_sets(&self) -> Vec<Vec<usize>> {
        let mut out = Vec::new();
        for &pattern in &self.local {
            for block in 0..self.n_blocks {
                out.push(self.pattern_indices(pattern, block).collect());
            }
        }
        for &pattern in &self.global {
            out.push(
                (0..self.n_blocks)
                    .flat_map(|block| self.pattern_indices(pattern, block))
                    .collect(),
            );
        }
        out.extend(self.blocks.iter().cloned());
        out
    }

    /// One mask per constraint for vectors of length `len`.
    ///
    /// Constraints with fewer than two coordinates can never be violated and are skipped.
    pub fn bitmasks<M: Mask>(&self, len: usize) -> Result<Vec<M>, ConstraintError> {
        if let Some(capacity) = M::CAPACITY {
            if len > capacity {
                return Err(ConstraintError::MaskCapacity { len, capacity });
            }
        }
        let mut out = Vec::new();
        for indices in self.index_sets() {
            if let Some(&index) = indices.iter().find(|&&i| i >= len) {
                return Err(ConstraintError::IndexOutOfRange { index, len });
            }
            if indices.len() < 2 {
                continue;
            }
            let mut mask = M::empty(len);
            for i in indices {
                mask.set(i);
            }
            if !out.contains(&mask) {
                out.push(mask);
            }
        }
        Ok(out)
    }

    /// Whether `v` has at most one non-zero coordinate in every constraint.
    pub fn is_satisfied_by<T: Scalar>(&self, v: &Vector<T>) -> Result<bool, ConstraintError> {
        let masks = self.bitmasks::<BitSet>(v.len())?;
        Ok(!masks.iter().any(|mask| violates(v, mask)))
    }
}

/// True iff at least two coordinates selected by `mask` are non-zero in `v`.
pub fn violates<T: Scalar, M: Mask>(v: &Vector<T>, mask: &M) -> bool {
    let mut seen = false;
    for i in mask.ones() {
        if v.get(i).is_some_and(|x| !x.is_zero()) {
            if seen {
                return true;
            }
            seen = true;
        }
    }
    false
}

/// True iff `support` meets every constraint mask in at most one coordinate.
#[inline]
pub fn admissible<M: Mask>(support: &M, masks: &[M]) -> bool {
    !masks.iter().any(|mask| support.meets_twice(mask))
}

/// True iff a single per-constraint choice of coordinate covers all of `supports`; equivalently
/// the union of the supports is admissible.
pub fn compatible<'a, M: Mask + 'a, I>(supports: I, masks: &[M], len: usize) -> bool
where
    I: IntoIterator<Item = &'a M>,
{
    let mut union = M::empty(len);
    for support in supports {
        union.union_with(support);
    }
    admissible(&union, masks)
}

/// Support of an integer vector as a mask.
pub fn support_mask<M: Mask>(v: &Vector<Integer>) -> M {
    let mut mask = M::empty(v.len());
    for i in v.support() {
        mask.set(i);
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::{admissible, compatible, support_mask, violates, ConstraintError, ValidityConstraints};
    use crate::mask::Mask;
    use crate::num::Integer;
    use crate::vector::Vector;

    fn v(xs: &[i64]) -> Vector<Integer> {
        Vector::from(xs)
    }

    #[test]
    fn quad_preset_yields_one_mask_per_tetrahedron() {
        let c = ValidityConstraints::quad(2);
        let masks = c.bitmasks::<u64>(6).unwrap();
        assert_eq!(masks, vec![0b000_111, 0b111_000]);
        assert_eq!(c.natural_len(), 6);
    }

    #[test]
    fn standard_preset_covers_quads_only() {
        let c = ValidityConstraints::standard(2);
        let masks = c.bitmasks::<u32>(14).unwrap();
        assert_eq!(masks, vec![0b111_0000, 0b111_0000 << 7]);
    }

    #[test]
    fn global_patterns_span_all_blocks() {
        let mut c = ValidityConstraints::new(3, 2).unwrap();
        c.add_global([2]).unwrap();
        assert_eq!(c.bitmasks::<u64>(6).unwrap(), vec![0b100_100]);
        assert_eq!(
            c.add_local([3]),
            Err(ConstraintError::OffsetOutOfRange {
                offset: 3,
                block_size: 3
            })
        );
    }

    #[test]
    fn out_of_range_indices_are_rejected() {
        let c = ValidityConstraints::from_blocks([vec![0, 1, 5]]);
        assert_eq!(
            c.bitmasks::<u64>(3),
            Err(ConstraintError::IndexOutOfRange { index: 5, len: 3 })
        );
        assert_eq!(
            ValidityConstraints::none().bitmasks::<u32>(40),
            Err(ConstraintError::MaskCapacity {
                len: 40,
                capacity: 32
            })
        );
    }

    #[test]
    fn violation_and_compatibility() {
        let c = ValidityConstraints::from_blocks([vec![0, 1, 2]]);
        let masks = c.bitmasks::<u64>(4).unwrap();
        assert!(violates(&v(&[1, 1, 0, 0]), &masks[0]));
        assert!(!violates(&v(&[0, 1, 0, 5]), &masks[0]));
        assert!(c.is_satisfied_by(&v(&[0, 0, 3, 3])).unwrap());
        assert!(!c.is_satisfied_by(&v(&[2, 0, 3, 0])).unwrap());

        let a: u64 = support_mask(&v(&[1, 0, 0, 1]));
        let b: u64 = support_mask(&v(&[1, 0, 0, 0]));
        let d: u64 = support_mask(&v(&[0, 1, 0, 0]));
        assert!(admissible(&a, &masks));
        assert!(compatible([&a, &b], &masks, 4));
        assert!(!compatible([&a, &d], &masks, 4));
        assert_eq!(a.ones(), vec![0, 3]);
    }

    #[test]
    fn empty_constraints() {
        assert!(ValidityConstraints::none().is_empty());
        assert!(ValidityConstraints::quad(0).is_empty());
        assert!(!ValidityConstraints::quad(1).is_empty());
        assert!(ValidityConstraints::from_blocks([vec![1]])
            .bitmasks::<u64>(2)
            .unwrap()
            .is_empty());
    }
}
