//! Core data structures for normal surface enumeration: exact numbers, vectors, coordinate masks,
//! validity constraints, type tries and progress tracking.

pub mod mask;
pub mod num;
pub mod progress;
pub mod trie;
pub mod validity;
pub mod vector;

pub use mask::{BitSet, Mask, MaskWidth};
pub use num::{ArithmeticError, Integer, Rational, Sign};
pub use progress::ProgressTracker;
pub use trie::TypeTrie;
pub use validity::{ConstraintError, ValidityConstraints};
pub use vector::{Scalar, Vector, VectorError};
