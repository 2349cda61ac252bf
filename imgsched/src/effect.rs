//! Effect codes and dispatch.
//!
//! Effects are addressed by single-letter codes in the task feed:
//!
//! | Code | Effect       | Kernel                 |
//! |------|--------------|------------------------|
//! | `G`  | Grayscale    | per-pixel RGB average  |
//! | `S`  | Sharpen      | 3×3 convolution        |
//! | `B`  | Blur         | 3×3 box convolution    |
//! | `E`  | EdgeDetect   | 3×3 Laplacian          |
//!
//! The set is closed. Anything else fails with [`SchedulerError::UnknownEffect`]
//! at parse time so no scheduler ever sees an unrecognized code.

use std::fmt;
use std::str::FromStr;

use crate::error::SchedulerError;

/// A named per-row image transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    Grayscale,
    Sharpen,
    Blur,
    EdgeDetect,
}

impl Effect {
    /// All effects, in code order.
    pub const ALL: [Effect; 4] = [
        Effect::Grayscale,
        Effect::Sharpen,
        Effect::Blur,
        Effect::EdgeDetect,
    ];

    /// Parses a feed code (`"G"`, `"S"`, `"B"`, `"E"`).
    pub fn from_code(code: &str) -> Result<Self, SchedulerError> {
        match code {
            "G" => Ok(Effect::Grayscale),
            "S" => Ok(Effect::Sharpen),
            "B" => Ok(Effect::Blur),
            "E" => Ok(Effect::EdgeDetect),
            other => Err(SchedulerError::UnknownEffect(other.to_string())),
        }
    }

    /// Returns the feed code for this effect.
    pub fn code(self) -> &'static str {
        match self {
            Effect::Grayscale => "G",
            Effect::Sharpen => "S",
            Effect::Blur => "B",
            Effect::EdgeDetect => "E",
        }
    }

    /// Returns a human-readable name for logging.
    pub fn name(self) -> &'static str {
        match self {
            Effect::Grayscale => "grayscale",
            Effect::Sharpen => "sharpen",
            Effect::Blur => "blur",
            Effect::EdgeDetect => "edge-detect",
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Effect {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Effect::from_code(s)
    }
}

/// Parses a list of feed codes, failing on the first unknown one.
pub fn parse_effects<S: AsRef<str>>(codes: &[S]) -> Result<Vec<Effect>, SchedulerError> {
    codes.iter().map(|c| Effect::from_code(c.as_ref())).collect()
}
