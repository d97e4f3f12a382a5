//! Keyword-by-keyword combination of N detection lists.
//!
//! For every keyword of the keyword list the combiner gathers that keyword's
//! detections from each input, streams them through the `IntervalMerger`,
//! reduces each candidate group with the `SpanAggregator`, and finally
//! rescales the keyword's scores with the `ScoreNormalizer`. Keywords share
//! no state, so with the `parallel` feature they are processed on the rayon
//! pool and reassembled in keyword-list order.
//!
//! License: MIT OR Apache-2.0

use log::{debug, info};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use syscomb_fusion::CombinationMethod;

use crate::aggregator::{SpanAggregator, ZeroWeightPolicy};
use crate::detection::{Detection, DetectionList, KeywordDetections};
use crate::errors::{Result, SyscombError};
use crate::kwlist::KwList;
use crate::merger::IntervalMerger;
use crate::normalizer::ScoreNormalizer;

/// Checks user-supplied weights against the number of inputs.
///
/// `None` means "all ones". Weights must be finite and non-negative.
pub fn resolve_weights(weights: Option<&[f64]>, inputs: usize) -> Result<Vec<f64>> {
    if inputs == 0 {
        return Err(SyscombError::NoInputs);
    }
    let weights = match weights {
        Some(w) if w.len() != inputs => {
            return Err(SyscombError::WeightCountMismatch {
                weights: w.len(),
                inputs,
            })
        }
        Some(w) => w.to_vec(),
        None => vec![1.0; inputs],
    };
    validate_weights(&weights)?;
    Ok(weights)
}

fn validate_weights(weights: &[f64]) -> Result<()> {
    for (index, &value) in weights.iter().enumerate() {
        if !value.is_finite() || value < 0.0 {
            return Err(SyscombError::InvalidWeight { index, value });
        }
    }
    Ok(())
}

/// Merges and combines detections from several systems.
#[derive(Debug, Clone)]
pub struct SystemCombiner {
    aggregator: SpanAggregator,
    weights: Vec<f64>,
}

impl SystemCombiner {
    pub fn new(method: CombinationMethod, weights: Vec<f64>) -> Result<Self> {
        Self::with_policy(method, weights, ZeroWeightPolicy::default())
    }

    pub fn with_policy(
        method: CombinationMethod,
        weights: Vec<f64>,
        policy: ZeroWeightPolicy,
    ) -> Result<Self> {
        if weights.is_empty() {
            return Err(SyscombError::NoInputs);
        }
        validate_weights(&weights)?;
        Ok(Self {
            aggregator: SpanAggregator::with_policy(method, policy),
            weights,
        })
    }

    pub fn method(&self) -> CombinationMethod {
        self.aggregator.method()
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Combines one keyword. `sources[i]` holds input `i`'s detections.
    pub fn combine_keyword(&self, kwid: &str, sources: &[&[Detection]]) -> Result<KeywordDetections> {
        if sources.len() != self.weights.len() {
            return Err(SyscombError::WeightCountMismatch {
                weights: self.weights.len(),
                inputs: sources.len(),
            });
        }

        let mut merger = IntervalMerger::new();
        for (dets, &weight) in sources.iter().zip(&self.weights) {
            merger.add_source(dets, weight);
        }
        let input_count = merger.remaining();

        let mut entry = KeywordDetections::new(kwid);
        let mut max_score = 0.0_f64;
        while let Some(group) = merger.next_group() {
            let merged = self.aggregator.aggregate(kwid, &group)?;
            if merged.score > max_score {
                max_score = merged.score;
            }
            entry.detections.push(merged);
        }

        let divisor = ScoreNormalizer::apply(&mut entry.detections, max_score);
        debug!(
            "Keyword '{}': {} detections merged into {}{}.",
            kwid,
            input_count,
            entry.detections.len(),
            divisor
                .map(|d| format!(", scores divided by {:.6}", d))
                .unwrap_or_default()
        );
        Ok(entry)
    }

    fn gather<'a>(kwid: &str, inputs: &'a [DetectionList]) -> Vec<&'a [Detection]> {
        inputs.iter().map(|list| list.get(kwid).unwrap_or(&[])).collect()
    }

    fn check_inputs(&self, inputs: &[DetectionList]) -> Result<()> {
        if inputs.is_empty() {
            return Err(SyscombError::NoInputs);
        }
        if inputs.len() != self.weights.len() {
            return Err(SyscombError::WeightCountMismatch {
                weights: self.weights.len(),
                inputs: inputs.len(),
            });
        }
        Ok(())
    }

    /// Combines every keyword of `kwlist` on the current thread.
    pub fn combine_sequential(&self, kwlist: &KwList, inputs: &[DetectionList]) -> Result<DetectionList> {
        self.check_inputs(inputs)?;
        let entries = self.sequential_entries(kwlist, inputs)?;
        Ok(self.finish(kwlist, entries))
    }

    /// Combines every keyword of `kwlist`, in parallel when the `parallel`
    /// feature is enabled.
    pub fn combine(&self, kwlist: &KwList, inputs: &[DetectionList]) -> Result<DetectionList> {
        self.check_inputs(inputs)?;
        let entries = self.keyword_entries(kwlist, inputs)?;
        Ok(self.finish(kwlist, entries))
    }

    fn sequential_entries(&self, kwlist: &KwList, inputs: &[DetectionList]) -> Result<Vec<KeywordDetections>> {
        kwlist
            .iter()
            .map(|kw| self.combine_keyword(&kw.id, &Self::gather(&kw.id, inputs)))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn keyword_entries(&self, kwlist: &KwList, inputs: &[DetectionList]) -> Result<Vec<KeywordDetections>> {
        kwlist
            .keywords()
            .par_iter()
            .map(|kw| self.combine_keyword(&kw.id, &Self::gather(&kw.id, inputs)))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn keyword_entries(&self, kwlist: &KwList, inputs: &[DetectionList]) -> Result<Vec<KeywordDetections>> {
        self.sequential_entries(kwlist, inputs)
    }

    fn finish(&self, kwlist: &KwList, entries: Vec<KeywordDetections>) -> DetectionList {
        let list = DetectionList::from_entries(kwlist, entries);
        info!(
            "Combined {} keywords with method {}: {} merged detections.",
            list.keyword_count(),
            self.method(),
            list.detection_count()
        );
        list
    }
}
