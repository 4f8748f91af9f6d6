use std::fmt;

use quadrille_core::MaskWidth;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum EnumerationMode {
    /// Extreme rays by double description.
    #[default]
    ExtremeRays,
    /// Extreme rays, then a Hilbert basis per maximal admissible face.
    HilbertPrimal,
    /// Hilbert basis by hyperplane-at-a-time completion.
    HilbertDual,
}

impl EnumerationMode {
    pub fn canonical_token(self) -> &'static str {
        match self {
            Self::ExtremeRays => "extreme-rays",
            Self::HilbertPrimal => "hilbert-primal",
            Self::HilbertDual => "hilbert-dual",
        }
    }
}

/// Solver used for the per-face Hilbert bases of the primal method.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum HilbertDelegate {
    /// Bundled triangulation and parallelepiped solver.
    #[default]
    Simplicial,
    /// Dual completion on the matching equations restricted to the face.
    Dual,
}

impl HilbertDelegate {
    pub fn canonical_token(self) -> &'static str {
        match self {
            Self::Simplicial => "simplicial",
            Self::Dual => "dual",
        }
    }
}

/// Order in which the double description processes matching equations.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum RowOrder {
    /// Rows sorted by the positions of their non-zero entries.
    #[default]
    Positional,
    AsGiven,
}

impl RowOrder {
    pub fn canonical_token(self) -> &'static str {
        match self {
            Self::Positional => "positional",
            Self::AsGiven => "as-given",
        }
    }
}

macro_rules! token_enum {
    ($ty:ident, $what:literal, [$($variant:ident),+ $(,)?]) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.canonical_token())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = String;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                let raw = value.trim().to_ascii_lowercase().replace('_', "-");
                $(
                    if raw == $ty::$variant.canonical_token() {
                        return Ok($ty::$variant);
                    }
                )+
                let expected: Vec<&str> = vec![$($ty::$variant.canonical_token()),+];
                Err(format!(
                    concat!("unknown ", $what, " '{}' (expected one of: {})"),
                    value,
                    expected.join(", ")
                ))
            }
        }
    };
}

token_enum!(EnumerationMode, "enumeration mode", [ExtremeRays, HilbertPrimal, HilbertDual]);
token_enum!(HilbertDelegate, "hilbert delegate", [Simplicial, Dual]);
token_enum!(RowOrder, "row order", [Positional, AsGiven]);

/// Knobs for a single enumeration run.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct EnumerationOptions {
    mode: EnumerationMode,
    mask_width: MaskWidth,
    sort_between_rows: bool,
    hilbert_delegate: HilbertDelegate,
    initial_rows: usize,
    row_order: RowOrder,
}

impl Default for EnumerationOptions {
    fn default() -> Self {
        Self {
            mode: EnumerationMode::default(),
            mask_width: MaskWidth::default(),
            sort_between_rows: true,
            hilbert_delegate: HilbertDelegate::default(),
            initial_rows: 0,
            row_order: RowOrder::default(),
        }
    }
}

impl EnumerationOptions {
    pub fn new(mode: EnumerationMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: EnumerationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_mask_width(mut self, mask_width: MaskWidth) -> Self {
        self.mask_width = mask_width;
        self
    }

    /// Sorting keeps the ray list (and so the output order) canonical.
    pub fn with_sort_between_rows(mut self, sort: bool) -> Self {
        self.sort_between_rows = sort;
        self
    }

    pub fn with_hilbert_delegate(mut self, delegate: HilbertDelegate) -> Self {
        self.hilbert_delegate = delegate;
        self
    }

    /// The first `count` matching equations are processed as given, before any reordering.
    pub fn with_initial_rows(mut self, count: usize) -> Self {
        self.initial_rows = count;
        self
    }

    pub fn with_row_order(mut self, order: RowOrder) -> Self {
        self.row_order = order;
        self
    }

    #[inline]
    pub fn mode(&self) -> EnumerationMode {
        self.mode
    }

    #[inline]
    pub fn mask_width(&self) -> MaskWidth {
        self.mask_width
    }

    #[inline]
    pub fn sort_between_rows(&self) -> bool {
        self.sort_between_rows
    }

    #[inline]
    pub fn hilbert_delegate(&self) -> HilbertDelegate {
        self.hilbert_delegate
    }

    #[inline]
    pub fn initial_rows(&self) -> usize {
        self.initial_rows
    }

    #[inline]
    pub fn row_order(&self) -> RowOrder {
        self.row_order
    }
}
