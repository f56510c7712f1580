use crate::error::{FramestackError, FramestackResult};

/// Axis a size constraint applies to. Determines which source-dimension
/// symbol a percentage expands against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Axis {
    Width,
    Height,
}

impl Axis {
    /// The backend symbol for the source extent along this axis.
    pub fn source_symbol(self) -> &'static str {
        match self {
            Axis::Width => "iw",
            Axis::Height => "ih",
        }
    }
}

/// A width or height constraint for an overlay clip.
///
/// `Percent` holds a fraction of the source axis (`0.5`, not `50`).
/// `Unconstrained` means the axis keeps the overlay's native size and the
/// scale argument for it is omitted entirely.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum SizeSpec {
    Percent(f64),
    Absolute(f64),
    #[default]
    Unconstrained,
}

impl SizeSpec {
    /// Parse a caller-supplied size string: `"NN%"` or a bare number.
    ///
    /// Malformed input is rejected rather than passed through, so an
    /// invalid expression can never reach the backend.
    pub fn parse(raw: &str) -> FramestackResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(FramestackError::size("size string must be non-empty"));
        }

        if let Some(num) = raw.strip_suffix('%') {
            let pct: f64 = num
                .trim()
                .parse()
                .map_err(|_| FramestackError::size(format!("invalid percentage '{raw}'")))?;
            if !pct.is_finite() || pct < 0.0 {
                return Err(FramestackError::size(format!(
                    "percentage must be finite and >= 0, got '{raw}'"
                )));
            }
            return Ok(SizeSpec::Percent(pct / 100.0));
        }

        let value: f64 = raw
            .parse()
            .map_err(|_| FramestackError::size(format!("invalid size value '{raw}'")))?;
        if !value.is_finite() || value < 0.0 {
            return Err(FramestackError::size(format!(
                "size must be finite and >= 0, got '{raw}'"
            )));
        }
        Ok(SizeSpec::Absolute(value))
    }

    /// Resolve to a backend scale expression for the given axis, or `None`
    /// when the axis is unconstrained.
    pub fn resolve(self, axis: Axis) -> Option<String> {
        match self {
            SizeSpec::Percent(fraction) => {
                Some(format!("{}*{}", axis.source_symbol(), fmt_num(fraction)))
            }
            SizeSpec::Absolute(value) => Some(fmt_num(value)),
            SizeSpec::Unconstrained => None,
        }
    }

    pub fn is_unconstrained(self) -> bool {
        matches!(self, SizeSpec::Unconstrained)
    }
}

impl From<f64> for SizeSpec {
    fn from(value: f64) -> Self {
        SizeSpec::Absolute(value)
    }
}

/// Format a number the way the backend expects: no trailing `.0`, no
/// exponent notation for the magnitudes composition deals in.
pub(crate) fn fmt_num(v: f64) -> String {
    format!("{v}")
}
