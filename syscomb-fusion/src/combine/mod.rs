//! Score combination rules.
//!
//! Each rule reduces the scores of one candidate group (and the weights of
//! the systems that produced them) to a single score. MAX, MIN and MED ignore
//! the weights.

use alloc::string::ToString;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use crate::error::FusionError;

/// The pluggable rule used to reduce a group of scores to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CombinationMethod {
    /// Maximum score.
    Max,
    /// Minimum score.
    Min,
    /// Median score.
    Med,
    /// Sum of `score * weight`.
    Sum,
    /// Sum of `score * weight`, multiplied by the sum of the weights.
    Mnz,
    /// Weighted mean: sum of `score * weight` divided by the sum of the weights.
    Anz,
}

impl CombinationMethod {
    pub const ALL: [CombinationMethod; 6] = [
        CombinationMethod::Max,
        CombinationMethod::Min,
        CombinationMethod::Med,
        CombinationMethod::Sum,
        CombinationMethod::Mnz,
        CombinationMethod::Anz,
    ];

    /// Canonical upper-case name.
    pub fn name(&self) -> &'static str {
        match self {
            CombinationMethod::Max => "MAX",
            CombinationMethod::Min => "MIN",
            CombinationMethod::Med => "MED",
            CombinationMethod::Sum => "SUM",
            CombinationMethod::Mnz => "MNZ",
            CombinationMethod::Anz => "ANZ",
        }
    }

    /// Whether the rule reads the weights at all.
    pub fn uses_weights(&self) -> bool {
        matches!(
            self,
            CombinationMethod::Sum | CombinationMethod::Mnz | CombinationMethod::Anz
        )
    }

    /// Applies this rule to paired `scores` and `weights`.
    pub fn combine(&self, scores: &[f64], weights: &[f64]) -> Result<f64, FusionError> {
        combine(*self, scores, weights)
    }
}

impl fmt::Display for CombinationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CombinationMethod {
    type Err = FusionError;

    /// Parses a method name case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        CombinationMethod::ALL
            .iter()
            .copied()
            .find(|m| m.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| FusionError::UnsupportedMethod(s.to_string()))
    }
}

/// Combines `scores` (paired by index with `weights`) under `method`.
pub fn combine(method: CombinationMethod, scores: &[f64], weights: &[f64]) -> Result<f64, FusionError> {
    if scores.is_empty() {
        return Err(FusionError::EmptyScores);
    }
    if scores.len() != weights.len() {
        return Err(FusionError::LengthMismatch {
            scores: scores.len(),
            weights: weights.len(),
        });
    }

    Ok(match method {
        CombinationMethod::Max => comb_max(scores),
        CombinationMethod::Min => comb_min(scores),
        CombinationMethod::Med => comb_med(scores),
        CombinationMethod::Sum => comb_sum(scores, weights),
        CombinationMethod::Mnz => comb_mnz(scores, weights),
        CombinationMethod::Anz => comb_anz(scores, weights)?,
    })
}

pub fn comb_max(scores: &[f64]) -> f64 {
    scores.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

pub fn comb_min(scores: &[f64]) -> f64 {
    scores.iter().copied().fold(f64::INFINITY, f64::min)
}

/// Median; the mean of the two central values for an even count.
pub fn comb_med(scores: &[f64]) -> f64 {
    let mut sorted: Vec<f64> = scores.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

pub fn comb_sum(scores: &[f64], weights: &[f64]) -> f64 {
    weighted_sum(scores, weights)
}

pub fn comb_mnz(scores: &[f64], weights: &[f64]) -> f64 {
    weighted_sum(scores, weights) * weights.iter().sum::<f64>()
}

pub fn comb_anz(scores: &[f64], weights: &[f64]) -> Result<f64, FusionError> {
    let total_weight: f64 = weights.iter().sum();
    if total_weight == 0.0 {
        return Err(FusionError::ZeroTotalWeight);
    }
    Ok(weighted_sum(scores, weights) / total_weight)
}

fn weighted_sum(scores: &[f64], weights: &[f64]) -> f64 {
    scores.iter().zip(weights).map(|(s, w)| s * w).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    extern crate alloc;
    use alloc::vec;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("max".parse::<CombinationMethod>(), Ok(CombinationMethod::Max));
        assert_eq!("Mnz".parse::<CombinationMethod>(), Ok(CombinationMethod::Mnz));
        assert_eq!("ANZ".parse::<CombinationMethod>(), Ok(CombinationMethod::Anz));
    }

    #[test]
    fn test_parse_unknown_method() {
        let err = "AVG".parse::<CombinationMethod>().unwrap_err();
        assert_eq!(err, FusionError::UnsupportedMethod("AVG".into()));
        assert!(!err.is_arithmetic());
    }

    #[test]
    fn test_max_min_ignore_weights() {
        let scores = [0.2, 0.9, 0.4];
        let weights = [10.0, 0.0, 3.0];
        assert_eq!(combine(CombinationMethod::Max, &scores, &weights), Ok(0.9));
        assert_eq!(combine(CombinationMethod::Min, &scores, &weights), Ok(0.2));
    }

    #[test]
    fn test_median_odd_returns_exact_middle() {
        let scores = vec![0.7, 0.1, 0.3];
        assert_eq!(comb_med(&scores), 0.3);
    }

    #[test]
    fn test_median_even_averages_central_pair() {
        let scores = [0.8, 0.2, 0.6, 0.4];
        assert!((comb_med(&scores) - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_sum_and_mnz() {
        let scores = [0.5, 0.25];
        let weights = [2.0, 4.0];
        assert!((comb_sum(&scores, &weights) - 2.0).abs() < EPSILON);
        assert!((comb_mnz(&scores, &weights) - 12.0).abs() < EPSILON);
    }

    #[test]
    fn test_anz_is_weighted_mean() {
        let scores = [0.5, 0.25];
        let weights = [3.0, 1.0];
        let expected = (0.5 * 3.0 + 0.25 * 1.0) / 4.0;
        let got = combine(CombinationMethod::Anz, &scores, &weights).unwrap();
        assert!((got - expected).abs() < EPSILON);
    }

    #[test]
    fn test_anz_zero_total_weight() {
        let err = combine(CombinationMethod::Anz, &[0.5, 0.5], &[0.0, 0.0]).unwrap_err();
        assert_eq!(err, FusionError::ZeroTotalWeight);
        assert!(err.is_arithmetic());
    }

    #[test]
    fn test_rejects_empty_and_mismatched_inputs() {
        assert_eq!(
            combine(CombinationMethod::Sum, &[], &[]),
            Err(FusionError::EmptyScores)
        );
        assert_eq!(
            combine(CombinationMethod::Sum, &[0.1, 0.2], &[1.0]),
            Err(FusionError::LengthMismatch { scores: 2, weights: 1 })
        );
    }

    #[test]
    fn test_pairing_survives_reordering() {
        let a = combine(CombinationMethod::Sum, &[0.1, 0.7], &[2.0, 1.0]).unwrap();
        let b = combine(CombinationMethod::Sum, &[0.7, 0.1], &[1.0, 2.0]).unwrap();
        assert!((a - b).abs() < EPSILON);
    }
}
