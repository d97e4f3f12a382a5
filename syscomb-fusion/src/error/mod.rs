use alloc::string::String;
use core::fmt;

/// Failures raised by the fusion kernels.
///
/// `ZeroTotalWeight` is the arithmetic case; the other variants signal
/// misuse by the caller or an unknown method name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FusionError {
    /// `combine` was called with no scores.
    EmptyScores,
    /// `scores` and `weights` do not pair up.
    LengthMismatch { scores: usize, weights: usize },
    /// A weighted mean was requested but the weights sum to zero.
    ZeroTotalWeight,
    /// The method name is not one of MAX, MIN, MED, SUM, MNZ, ANZ.
    UnsupportedMethod(String),
}

impl FusionError {
    /// True for the division-by-zero family of failures.
    pub fn is_arithmetic(&self) -> bool {
        matches!(self, FusionError::ZeroTotalWeight)
    }
}

impl fmt::Display for FusionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FusionError::EmptyScores => write!(f, "cannot combine an empty score list"),
            FusionError::LengthMismatch { scores, weights } => write!(
                f,
                "score count ({}) does not match weight count ({})",
                scores, weights
            ),
            FusionError::ZeroTotalWeight => write!(f, "total weight is zero"),
            FusionError::UnsupportedMethod(name) => write!(f, "Unsupported method: {}", name),
        }
    }
}

impl core::error::Error for FusionError {}
