//! Coordinate bit masks.
//!
//! The enumerators track the support of every ray as a bit mask. Fixed-width masks (`u32`, `u64`,
//! `u128`) are the fast path; [`BitSet`] lifts the capacity limit at the cost of a heap allocation
//! per mask.

use std::fmt;
use std::hash::Hash;

const WORD_BITS: usize = u64::BITS as usize;

pub trait Mask: Clone + Eq + Hash + fmt::Debug {
    /// Largest dimension the mask can represent, or `None` if unbounded.
    const CAPACITY: Option<usize>;

    /// Empty mask sized for `len` coordinates.
    fn empty(len: usize) -> Self;

    fn set(&mut self, index: usize);

    fn get(&self, index: usize) -> bool;

    fn union_with(&mut self, other: &Self);

    fn intersection(&self, other: &Self) -> Self;

    fn is_subset_of(&self, other: &Self) -> bool;

    fn count(&self) -> usize;

    fn is_empty(&self) -> bool;

    /// Indices of the set bits, ascending.
    fn ones(&self) -> Vec<usize>;

    #[inline]
    fn union(&self, other: &Self) -> Self {
        let mut out = self.clone();
        out.union_with(other);
        out
    }

    /// True iff `self & other` has two or more bits.
    #[inline]
    fn meets_twice(&self, other: &Self) -> bool {
        self.intersection(other).count() >= 2
    }

    fn fits(len: usize) -> bool {
        Self::CAPACITY.map_or(true, |cap| len <= cap)
    }
}

macro_rules! word_mask {
    ($ty:ty) => {
        impl Mask for $ty {
            const CAPACITY: Option<usize> = Some(<$ty>::BITS as usize);

            #[inline(always)]
            fn empty(len: usize) -> Self {
                debug_assert!(
                    len <= <$ty>::BITS as usize,
                    "mask length {len} exceeds {} bits",
                    <$ty>::BITS
                );
                0
            }

            #[inline(always)]
            fn set(&mut self, index: usize) {
                debug_assert!(index < <$ty>::BITS as usize, "mask index {index} out of range");
                *self |= (1 as $ty) << index;
            }

            #[inline(always)]
            fn get(&self, index: usize) -> bool {
                index < <$ty>::BITS as usize && (*self >> index) & 1 != 0
            }

            #[inline(always)]
            fn union_with(&mut self, other: &Self) {
                *self |= *other;
            }

            #[inline(always)]
            fn intersection(&self, other: &Self) -> Self {
                *self & *other
            }

            #[inline(always)]
            fn is_subset_of(&self, other: &Self) -> bool {
                *self & !*other == 0
            }

            #[inline(always)]
            fn count(&self) -> usize {
                self.count_ones() as usize
            }

            #[inline(always)]
            fn is_empty(&self) -> bool {
                *self == 0
            }

            #[inline(always)]
            fn meets_twice(&self, other: &Self) -> bool {
                let both = *self & *other;
                both & both.wrapping_sub(1) != 0
            }

            fn ones(&self) -> Vec<usize> {
                let mut out = Vec::with_capacity(self.count_ones() as usize);
                let mut bits = *self;
                while bits != 0 {
                    out.push(bits.trailing_zeros() as usize);
                    bits &= bits - 1;
                }
                out
            }
        }
    };
}

word_mask!(u32);
word_mask!(u64);
word_mask!(u128);

/// Growable bit set; trailing zero words are trimmed so equality and hashing are structural.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct BitSet {
    words: Vec<u64>,
}

impl BitSet {
    #[inline]
    fn trim(&mut self) {
        while self.words.last().is_some_and(|w| *w == 0) {
            self.words.pop();
        }
    }
}

impl Mask for BitSet {
    const CAPACITY: Option<usize> = None;

    fn empty(len: usize) -> Self {
        Self {
            words: Vec::with_capacity(len.div_ceil(WORD_BITS)),
        }
    }

    #[inline]
    fn set(&mut self, index: usize) {
        let word = index / WORD_BITS;
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1u64 << (index % WORD_BITS);
    }

    #[inline]
    fn get(&self, index: usize) -> bool {
        self.words
            .get(index / WORD_BITS)
            .is_some_and(|w| (*w >> (index % WORD_BITS)) & 1 != 0)
    }

    fn union_with(&mut self, other: &Self) {
        if other.words.len() > self.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a |= *b;
        }
    }

    fn intersection(&self, other: &Self) -> Self {
        let mut out = Self {
            words: self
                .words
                .iter()
                .zip(&other.words)
                .map(|(a, b)| a & b)
                .collect(),
        };
        out.trim();
        out
    }

    fn is_subset_of(&self, other: &Self) -> bool {
        self.words.iter().enumerate().all(|(i, w)| {
            let o = other.words.get(i).copied().unwrap_or(0);
            w & !o == 0
        })
    }

    fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    fn meets_twice(&self, other: &Self) -> bool {
        let mut seen = 0usize;
        for (a, b) in self.words.iter().zip(&other.words) {
            seen += (a & b).count_ones() as usize;
            if seen >= 2 {
                return true;
            }
        }
        false
    }

    fn ones(&self) -> Vec<usize> {
        let mut out = Vec::new();
        for (i, &word) in self.words.iter().enumerate() {
            let mut bits = word;
            while bits != 0 {
                out.push(i * WORD_BITS + bits.trailing_zeros() as usize);
                bits &= bits - 1;
            }
        }
        out
    }
}

/// Selects the mask representation used by the enumerators.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum MaskWidth {
    W32,
    #[default]
    W64,
    W128,
    Unbounded,
    /// Smallest fixed width that fits, falling back to `Unbounded`.
    Auto,
}

impl MaskWidth {
    pub fn canonical_token(self) -> &'static str {
        match self {
            Self::W32 => "w32",
            Self::W64 => "w64",
            Self::W128 => "w128",
            Self::Unbounded => "unbounded",
            Self::Auto => "auto",
        }
    }

    pub fn capacity(self) -> Option<usize> {
        match self {
            Self::W32 => <u32 as Mask>::CAPACITY,
            Self::W64 => <u64 as Mask>::CAPACITY,
            Self::W128 => <u128 as Mask>::CAPACITY,
            Self::Unbounded | Self::Auto => None,
        }
    }

    /// Concrete width for `dim` coordinates, or `None` if `dim` overflows a fixed width.
    pub fn resolve(self, dim: usize) -> Option<MaskWidth> {
        match self {
            Self::Auto => Some(
                [Self::W32, Self::W64, Self::W128]
                    .into_iter()
                    .find(|w| w.capacity().is_some_and(|cap| dim <= cap))
                    .unwrap_or(Self::Unbounded),
            ),
            Self::Unbounded => Some(Self::Unbounded),
            fixed => fixed
                .capacity()
                .is_some_and(|cap| dim <= cap)
                .then_some(fixed),
        }
    }
}

impl fmt::Display for MaskWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_token())
    }
}

impl std::str::FromStr for MaskWidth {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "w32" | "32" => Ok(Self::W32),
            "w64" | "64" => Ok(Self::W64),
            "w128" | "128" => Ok(Self::W128),
            "unbounded" | "bitset" => Ok(Self::Unbounded),
            "auto" => Ok(Self::Auto),
            _ => Err(format!(
                "unknown mask width '{value}' (expected w32, w64, w128, unbounded or auto)"
            )),
        }
    }
}
