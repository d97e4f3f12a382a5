//! Detection data structures.
//!
//! A `Detection` is one hypothesized keyword occurrence. A `DetectionList`
//! groups detections by keyword id, in keyword-list order, and carries the
//! metadata written into the `<kwslist>` header.
//!
//! License: MIT OR Apache-2.0

use std::cmp::Ordering;
use std::collections::HashMap;

use log::warn;

use crate::kwlist::KwList;

/// One scored, time-bounded keyword hypothesis.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Source recording.
    pub filename: String,
    /// Start of the hit, in seconds.
    pub start_time: f64,
    /// End of the hit, in seconds. Never less than `start_time`.
    pub end_time: f64,
    /// Non-negative confidence.
    pub score: f64,
    /// Accept/reject flag, set by the decision maker or read from input.
    pub decision: Option<bool>,
}

impl Detection {
    pub fn new(filename: impl Into<String>, start_time: f64, end_time: f64, score: f64) -> Self {
        Self {
            filename: filename.into(),
            start_time,
            end_time,
            score,
            decision: None,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    /// Total order on `(filename, start_time, end_time)`.
    pub fn key_cmp(&self, other: &Detection) -> Ordering {
        self.filename
            .cmp(&other.filename)
            .then_with(|| self.start_time.total_cmp(&other.start_time))
            .then_with(|| self.end_time.total_cmp(&other.end_time))
    }
}

/// A detection paired with the weight of the system that produced it.
#[derive(Debug, Clone, Copy)]
pub struct WeightedDetection<'a> {
    pub detection: &'a Detection,
    pub weight: f64,
}

/// Detections of one keyword.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KeywordDetections {
    pub kwid: String,
    pub detections: Vec<Detection>,
    /// Decision threshold recorded by the decision maker.
    pub threshold: Option<f64>,
    pub search_time: Option<f64>,
    pub oov_count: Option<u32>,
}

impl KeywordDetections {
    pub fn new(kwid: impl Into<String>) -> Self {
        Self {
            kwid: kwid.into(),
            ..Self::default()
        }
    }
}

/// Mapping from keyword id to detections, ordered by the keyword list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DetectionList {
    pub kwlist_filename: String,
    pub language: String,
    pub system_id: String,
    entries: Vec<KeywordDetections>,
    index: HashMap<String, usize>,
}

impl DetectionList {
    /// An empty list with one (empty) entry per keyword of `kwlist`.
    pub fn new(kwlist: &KwList) -> Self {
        let mut list = DetectionList {
            kwlist_filename: kwlist.filename.clone(),
            language: kwlist.language.clone().unwrap_or_default(),
            ..Self::default()
        };
        for kw in kwlist {
            list.index.insert(kw.id.clone(), list.entries.len());
            list.entries.push(KeywordDetections::new(kw.id.clone()));
        }
        list
    }

    /// Builds a list from fully materialized per-keyword entries.
    ///
    /// Entries whose keyword is not in `kwlist` are dropped; keywords with no
    /// entry get an empty one.
    pub fn from_entries(kwlist: &KwList, entries: Vec<KeywordDetections>) -> Self {
        let mut list = Self::new(kwlist);
        for entry in entries {
            match list.index.get(&entry.kwid) {
                Some(&i) => list.entries[i] = entry,
                None => warn!("Dropping detections for unknown keyword '{}'.", entry.kwid),
            }
        }
        list
    }

    pub fn get(&self, kwid: &str) -> Option<&[Detection]> {
        self.entry(kwid).map(|e| e.detections.as_slice())
    }

    pub fn entry(&self, kwid: &str) -> Option<&KeywordDetections> {
        self.index.get(kwid).map(|&i| &self.entries[i])
    }

    pub fn entry_mut(&mut self, kwid: &str) -> Option<&mut KeywordDetections> {
        match self.index.get(kwid) {
            Some(&i) => Some(&mut self.entries[i]),
            None => None,
        }
    }

    /// Appends `det` to keyword `kwid`. Returns `false` if the keyword is unknown.
    pub fn push(&mut self, kwid: &str, det: Detection) -> bool {
        match self.entry_mut(kwid) {
            Some(entry) => {
                entry.detections.push(det);
                true
            }
            None => false,
        }
    }

    pub fn entries(&self) -> &[KeywordDetections] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [KeywordDetections] {
        &mut self.entries
    }

    /// Number of keywords (including those without detections).
    pub fn keyword_count(&self) -> usize {
        self.entries.len()
    }

    pub fn detection_count(&self) -> usize {
        self.entries.iter().map(|e| e.detections.len()).sum()
    }

    /// Drops every detection whose score is not strictly positive.
    pub fn remove_zero_scores(&mut self) -> usize {
        let mut removed = 0;
        for entry in &mut self.entries {
            let before = entry.detections.len();
            entry.detections.retain(|d| d.score > 0.0);
            removed += before - entry.detections.len();
        }
        removed
    }
}
