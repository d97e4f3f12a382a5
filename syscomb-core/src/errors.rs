//! errors.rs - Custom error types for the syscomb-core library.
//!
//! Configuration problems and arithmetic failures are kept as separate
//! variants so callers can report them differently. File-level failures
//! (missing or corrupt XML and YAML) travel as `anyhow::Error` with context
//! and are wrapped in `Input` when they cross into this type.
//!
//! License: MIT OR APACHE 2.0

use syscomb_fusion::FusionError;
use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SyscombError {
    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),

    #[error("Number of weights ({weights}) doesn't match number of input files ({inputs}).")]
    WeightCountMismatch { weights: usize, inputs: usize },

    #[error("Weight #{index} is invalid ({value}); weights must be finite and non-negative.")]
    InvalidWeight { index: usize, value: f64 },

    #[error("No input detection lists were given.")]
    NoInputs,

    #[error("Invalid decision parameters: {0}")]
    InvalidDecisionParams(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Arithmetic error while merging keyword '{keyword}' in '{filename}': {source}")]
    Arithmetic {
        keyword: String,
        filename: String,
        #[source]
        source: FusionError,
    },

    #[error("Input error: {0:#}")]
    Input(#[from] anyhow::Error),
}

impl SyscombError {
    /// Errors that must be reported before any processing starts.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SyscombError::UnsupportedMethod(_)
                | SyscombError::WeightCountMismatch { .. }
                | SyscombError::InvalidWeight { .. }
                | SyscombError::NoInputs
                | SyscombError::InvalidDecisionParams(_)
                | SyscombError::Config(_)
        )
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(self, SyscombError::Arithmetic { .. })
    }
}

impl From<FusionError> for SyscombError {
    /// Name-level fusion failures become configuration errors. Arithmetic
    /// failures need keyword context and are built by the aggregator instead.
    fn from(err: FusionError) -> Self {
        match err {
            FusionError::UnsupportedMethod(name) => SyscombError::UnsupportedMethod(name),
            other => SyscombError::Arithmetic {
                keyword: String::new(),
                filename: String::new(),
                source: other,
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, SyscombError>;
