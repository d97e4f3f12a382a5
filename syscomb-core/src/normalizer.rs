//! Per-keyword score normalization.
//!
//! Combination rules such as SUM and MNZ can produce scores above 1. Each
//! keyword's merged scores are divided by that keyword's maximum when the
//! maximum exceeds 1, which restores the `[0, 1]` range without changing
//! the ranking.

use log::debug;
use syscomb_fusion::normalize::{max_normalizer, max_score};

use crate::detection::{Detection, DetectionList};

pub struct ScoreNormalizer;

impl ScoreNormalizer {
    /// Rescales `detections` given their tracked maximum score.
    ///
    /// Returns the divisor applied, or `None` if nothing changed.
    pub fn apply(detections: &mut [Detection], tracked_max: f64) -> Option<f64> {
        let divisor = max_normalizer(tracked_max)?;
        for det in detections.iter_mut() {
            det.score /= divisor;
        }
        Some(divisor)
    }

    /// Rescales `detections` using their own maximum.
    pub fn normalize(detections: &mut [Detection]) -> Option<f64> {
        let scores: Vec<f64> = detections.iter().map(|d| d.score).collect();
        Self::apply(detections, max_score(&scores))
    }

    /// Normalizes every keyword of `list` independently.
    pub fn normalize_list(list: &mut DetectionList) -> usize {
        let mut rescaled = 0;
        for entry in list.entries_mut() {
            if let Some(divisor) = Self::normalize(&mut entry.detections) {
                debug!("Keyword '{}': scores divided by {:.6}.", entry.kwid, divisor);
                rescaled += 1;
            }
        }
        rescaled
    }
}
