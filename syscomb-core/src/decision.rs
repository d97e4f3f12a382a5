//! YES/NO decisions with keyword-specific thresholds.
//!
//! License: MIT OR Apache-2.0

use log::debug;
use syscomb_fusion::threshold::{estimate_ntrue, kst_threshold, KstParams};

use crate::detection::DetectionList;
use crate::errors::{Result, SyscombError};

/// Scale applied on top of the language's posterior boost when estimating
/// true occurrences from combined scores.
pub const COMBINED_NTRUE_SCALE: f64 = 1.4;

/// Assigns decisions to a finished detection list.
#[derive(Debug, Clone, Copy)]
pub struct DecisionMaker {
    params: KstParams,
}

impl DecisionMaker {
    pub fn new(beta: f64, total_duration: f64, ntrue_scale: f64) -> Result<Self> {
        let params = KstParams {
            beta,
            total_duration,
            ntrue_scale,
        };
        if !params.is_valid() {
            return Err(SyscombError::InvalidDecisionParams(format!(
                "beta={}, total_duration={}, ntrue_scale={}",
                beta, total_duration, ntrue_scale
            )));
        }
        Ok(Self { params })
    }

    /// Decision maker for combined lists: the posterior boost is scaled by
    /// `COMBINED_NTRUE_SCALE`.
    pub fn for_combination(beta: f64, total_duration: f64, posterior_boost: f64) -> Result<Self> {
        Self::new(beta, total_duration, posterior_boost * COMBINED_NTRUE_SCALE)
    }

    pub fn params(&self) -> &KstParams {
        &self.params
    }

    /// Sets `decision` on every detection and records each keyword's threshold.
    ///
    /// Returns the number of YES decisions.
    pub fn apply(&self, list: &mut DetectionList) -> usize {
        let mut accepted = 0;
        for entry in list.entries_mut() {
            if entry.detections.is_empty() {
                entry.threshold = None;
                continue;
            }
            let mass: f64 = entry.detections.iter().map(|d| d.score).sum();
            let threshold = kst_threshold(estimate_ntrue(mass, &self.params), &self.params);
            for det in entry.detections.iter_mut() {
                let yes = det.score >= threshold;
                det.decision = Some(yes);
                if yes {
                    accepted += 1;
                }
            }
            debug!("Keyword '{}': threshold {:.6}.", entry.kwid, threshold);
            entry.threshold = Some(threshold);
        }
        accepted
    }
}
