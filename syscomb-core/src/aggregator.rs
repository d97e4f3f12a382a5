//! Reduction of a candidate group to one merged detection.
//!
//! License: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};
use syscomb_fusion::{combine, CombinationMethod, FusionError};

use crate::detection::Detection;
use crate::errors::{Result, SyscombError};
use crate::merger::CandidateGroup;

/// What to do when a group's total weight is zero.
///
/// This happens when every member of a group comes from a zero-weight
/// system: the weighted time average is then `0 / 0`, and so is ANZ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroWeightPolicy {
    /// Raise `SyscombError::Arithmetic` and abort the run.
    #[default]
    Fail,
    /// Use the plain mean of the member spans, and unit weights for the score.
    Unweighted,
}

/// Turns candidate groups into merged detections.
#[derive(Debug, Clone, Copy)]
pub struct SpanAggregator {
    method: CombinationMethod,
    policy: ZeroWeightPolicy,
}

impl SpanAggregator {
    pub fn new(method: CombinationMethod) -> Self {
        Self::with_policy(method, ZeroWeightPolicy::default())
    }

    pub fn with_policy(method: CombinationMethod, policy: ZeroWeightPolicy) -> Self {
        Self { method, policy }
    }

    pub fn method(&self) -> CombinationMethod {
        self.method
    }

    pub fn policy(&self) -> ZeroWeightPolicy {
        self.policy
    }

    /// Merges `group` (of keyword `kwid`) into one detection.
    ///
    /// Start and end times are averages of the member times weighted by
    /// `score * weight`; the score comes from the combination method.
    pub fn aggregate(&self, kwid: &str, group: &CandidateGroup<'_>) -> Result<Detection> {
        let arithmetic = |source: FusionError| SyscombError::Arithmetic {
            keyword: kwid.to_string(),
            filename: group.filename.to_string(),
            source,
        };

        if group.members.is_empty() {
            return Err(arithmetic(FusionError::EmptyScores));
        }

        let scores: Vec<f64> = group.members.iter().map(|m| m.detection.score).collect();
        let weights: Vec<f64> = group.members.iter().map(|m| m.weight).collect();

        let mass: f64 = group
            .members
            .iter()
            .map(|m| m.detection.score * m.weight)
            .sum();

        let (start_time, end_time) = if mass != 0.0 {
            let start: f64 = group
                .members
                .iter()
                .map(|m| m.detection.start_time * m.detection.score * m.weight)
                .sum();
            let end: f64 = group
                .members
                .iter()
                .map(|m| m.detection.end_time * m.detection.score * m.weight)
                .sum();
            (start / mass, end / mass)
        } else {
            match self.policy {
                ZeroWeightPolicy::Fail => return Err(arithmetic(FusionError::ZeroTotalWeight)),
                ZeroWeightPolicy::Unweighted => {
                    let n = group.members.len() as f64;
                    let start: f64 = group.members.iter().map(|m| m.detection.start_time).sum();
                    let end: f64 = group.members.iter().map(|m| m.detection.end_time).sum();
                    (start / n, end / n)
                }
            }
        };

        let score = match combine(self.method, &scores, &weights) {
            Ok(score) => score,
            Err(FusionError::ZeroTotalWeight) if self.policy == ZeroWeightPolicy::Unweighted => {
                let ones = vec![1.0; scores.len()];
                combine(self.method, &scores, &ones).map_err(arithmetic)?
            }
            Err(e) => return Err(arithmetic(e)),
        };

        Ok(Detection::new(group.filename, start_time, end_time, score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merger::IntervalMerger;

    const EPSILON: f64 = 1e-9;

    fn single_group<'a>(sources: &[(&'a [Detection], f64)]) -> CandidateGroup<'a> {
        let mut merger = IntervalMerger::new();
        for (dets, w) in sources {
            merger.add_source(dets, *w);
        }
        let group = merger.next_group().unwrap();
        assert!(merger.next_group().is_none());
        group
    }

    #[test]
    fn test_max_scenario() {
        let a = vec![Detection::new("file1", 0.0, 1.0, 0.8)];
        let b = vec![Detection::new("file1", 0.5, 1.5, 0.6)];
        let group = single_group(&[(&a, 1.0), (&b, 1.0)]);
        let merged = SpanAggregator::new(CombinationMethod::Max)
            .aggregate("K1", &group)
            .unwrap();
        assert_eq!(merged.filename, "file1");
        assert_eq!(merged.score, 0.8);
        assert!((merged.start_time - 0.3 / 1.4).abs() < EPSILON);
        assert!((merged.end_time - 1.7 / 1.4).abs() < EPSILON);
    }

    #[test]
    fn test_sum_scenario_before_normalization() {
        let a = vec![Detection::new("file1", 0.0, 1.0, 0.8)];
        let b = vec![Detection::new("file1", 0.5, 1.5, 0.6)];
        let group = single_group(&[(&a, 1.0), (&b, 1.0)]);
        let merged = SpanAggregator::new(CombinationMethod::Sum)
            .aggregate("K1", &group)
            .unwrap();
        assert!((merged.score - 1.4).abs() < EPSILON);
    }

    #[test]
    fn test_weights_pull_span_towards_heavier_system() {
        let a = vec![Detection::new("f", 0.0, 1.0, 0.5)];
        let b = vec![Detection::new("f", 0.5, 1.5, 0.5)];
        let group = single_group(&[(&a, 3.0), (&b, 1.0)]);
        let merged = SpanAggregator::new(CombinationMethod::Anz)
            .aggregate("K1", &group)
            .unwrap();
        assert!((merged.start_time - 0.125).abs() < EPSILON);
        assert!((merged.end_time - 1.125).abs() < EPSILON);
        assert!((merged.score - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_zero_weight_fails_by_default() {
        let a = vec![Detection::new("f", 0.0, 1.0, 0.5)];
        let group = single_group(&[(&a, 0.0)]);
        let err = SpanAggregator::new(CombinationMethod::Max)
            .aggregate("K7", &group)
            .unwrap_err();
        assert!(err.is_arithmetic());
        assert!(err.to_string().contains("K7"));
    }

    #[test]
    fn test_zero_weight_unweighted_fallback() {
        let a = vec![Detection::new("f", 0.0, 1.0, 0.4)];
        let b = vec![Detection::new("f", 0.5, 2.0, 0.8)];
        let group = single_group(&[(&a, 0.0), (&b, 0.0)]);
        let merged = SpanAggregator::with_policy(CombinationMethod::Anz, ZeroWeightPolicy::Unweighted)
            .aggregate("K1", &group)
            .unwrap();
        assert!((merged.start_time - 0.25).abs() < EPSILON);
        assert!((merged.end_time - 1.5).abs() < EPSILON);
        assert!((merged.score - 0.6).abs() < EPSILON);
    }

    #[test]
    fn test_zero_weight_sum_is_zero_under_fallback() {
        let a = vec![Detection::new("f", 0.0, 1.0, 0.4)];
        let group = single_group(&[(&a, 0.0)]);
        let merged = SpanAggregator::with_policy(CombinationMethod::Sum, ZeroWeightPolicy::Unweighted)
            .aggregate("K1", &group)
            .unwrap();
        assert_eq!(merged.score, 0.0);
        assert_eq!((merged.start_time, merged.end_time), (0.0, 1.0));
    }
}
