use std::fmt;

use fundament::{EnumerationMode, EnumerationOptions, HilbertDelegate, MaskWidth};

/// A textual enumeration request: `mode[:width][@delegate]`, e.g. `hilbert-primal:w128@dual`.
///
/// The delegate selector only applies to `hilbert-primal`. Omitted parts take their defaults and
/// are omitted again when displayed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct EnumerationSpec {
    pub mode: EnumerationMode,
    pub mask_width: MaskWidth,
    pub delegate: HilbertDelegate,
}

impl EnumerationSpec {
    /// Options carrying this request's knobs; the remaining knobs keep their defaults.
    pub fn options(&self) -> EnumerationOptions {
        EnumerationOptions::new(self.mode)
            .with_mask_width(self.mask_width)
            .with_hilbert_delegate(self.delegate)
    }
}

impl From<EnumerationSpec> for EnumerationOptions {
    fn from(spec: EnumerationSpec) -> Self {
        spec.options()
    }
}

impl fmt::Display for EnumerationSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mode.canonical_token())?;
        if self.mask_width != MaskWidth::default() {
            write!(f, ":{}", self.mask_width)?;
        }
        if self.delegate != HilbertDelegate::default() {
            write!(f, "@{}", self.delegate)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for EnumerationSpec {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let raw = value.trim();
        if raw.is_empty() {
            return Err("enumeration spec cannot be empty".to_string());
        }
        let raw = raw.to_ascii_lowercase();

        let (head, delegate) = match raw.split_once('@') {
            Some((head, selector)) => {
                if selector.contains('@') {
                    return Err(format!(
                        "enumeration spec '{value}' contains multiple '@' selectors (expected e.g. hilbert-primal@dual)"
                    ));
                }
                let selector = selector.trim();
                if selector.is_empty() {
                    return Err(format!(
                        "enumeration spec '{value}' has an empty '@' selector"
                    ));
                }
                (head.trim(), Some(selector.parse::<HilbertDelegate>()?))
            }
            None => (raw.as_str(), None),
        };

        let (mode, width) = head
            .split_once(':')
            .map(|(m, w)| (m.trim(), Some(w.trim())))
            .unwrap_or((head, None));
        if mode.is_empty() {
            return Err(format!("enumeration spec '{value}' is missing a mode"));
        }
        let mode = mode.parse::<EnumerationMode>()?;
        let mask_width = match width {
            None | Some("") => MaskWidth::default(),
            Some(width) => width.parse::<MaskWidth>()?,
        };

        if delegate.is_some() && mode != EnumerationMode::HilbertPrimal {
            return Err(format!(
                "enumeration spec '{value}' selects a delegate, which only applies to {}",
                EnumerationMode::HilbertPrimal
            ));
        }

        Ok(Self {
            mode,
            mask_width,
            delegate: delegate.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::EnumerationSpec;
    use fundament::{EnumerationMode, HilbertDelegate, MaskWidth};

    #[test]
    fn full_spec_parses() {
        let spec: EnumerationSpec = "hilbert-primal:w128@dual".parse().unwrap();
        assert_eq!(
            spec,
            EnumerationSpec {
                mode: EnumerationMode::HilbertPrimal,
                mask_width: MaskWidth::W128,
                delegate: HilbertDelegate::Dual,
            }
        );
        assert_eq!(spec.to_string(), "hilbert-primal:w128@dual");
    }

    #[test]
    fn defaults_are_elided() {
        let spec: EnumerationSpec = " Extreme_Rays:W64 ".parse().unwrap();
        assert_eq!(spec, EnumerationSpec::default());
        assert_eq!(spec.to_string(), "extreme-rays");

        let spec: EnumerationSpec = "hilbert-dual:auto".parse().unwrap();
        assert_eq!(spec.to_string(), "hilbert-dual:auto");
    }

    #[test]
    fn malformed_specs_are_rejected() {
        for bad in [
            "",
            "vertices",
            ":w64",
            "extreme-rays:w7",
            "hilbert-primal@",
            "hilbert-primal@dual@dual",
            "hilbert-dual@dual",
        ] {
            assert!(bad.parse::<EnumerationSpec>().is_err(), "accepted '{bad}'");
        }
    }
}
