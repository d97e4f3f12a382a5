//! Keyword-specific thresholding (KST).
//!
//! The expected number of true occurrences of a keyword is estimated from the
//! sum of its detection scores. The threshold that maximizes the expected
//! term-weighted value for that estimate follows from the corpus duration and
//! the false-alarm cost `beta`.

use libm::{log, pow};

/// Lower and upper clamp applied to a threshold before it is used as a
/// normalization pivot.
pub const THRESHOLD_FLOOR: f64 = 1e-6;
pub const THRESHOLD_CEIL: f64 = 1.0 - 1e-6;

/// Inputs of the KST rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KstParams {
    /// False-alarm cost ratio.
    pub beta: f64,
    /// Total duration of the searched audio, in seconds.
    pub total_duration: f64,
    /// Multiplier applied to the score mass when estimating true occurrences.
    pub ntrue_scale: f64,
}

impl KstParams {
    /// True when every parameter is finite and in its valid range.
    pub fn is_valid(&self) -> bool {
        self.beta.is_finite()
            && self.beta > 0.0
            && self.total_duration.is_finite()
            && self.total_duration > 0.0
            && self.ntrue_scale.is_finite()
            && self.ntrue_scale >= 0.0
    }
}

/// Estimated number of true occurrences for a keyword with `score_mass`.
pub fn estimate_ntrue(score_mass: f64, params: &KstParams) -> f64 {
    params.ntrue_scale * score_mass
}

/// Decision threshold for a keyword whose estimated true count is `ntrue`.
pub fn kst_threshold(ntrue: f64, params: &KstParams) -> f64 {
    let denom = params.total_duration / params.beta + (params.beta - 1.0) / params.beta * ntrue;
    if denom <= 0.0 {
        return THRESHOLD_CEIL;
    }
    ntrue / denom
}

/// Maps `score` so that `threshold` lands on 0.5.
///
/// The mapping is a power curve: monotone on `[0, 1]`, with 0 and 1 fixed.
pub fn normalize_to_threshold(score: f64, threshold: f64) -> f64 {
    let pivot = threshold.clamp(THRESHOLD_FLOOR, THRESHOLD_CEIL);
    if score <= 0.0 {
        return 0.0;
    }
    let exponent = log(0.5) / log(pivot);
    pow(score, exponent)
}
