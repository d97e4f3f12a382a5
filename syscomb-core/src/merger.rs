//! Multi-source interval merging.
//!
//! Each source is one system's detections for a single keyword, sorted by
//! `(filename, start_time, end_time)` and read through a cursor. The merger
//! repeatedly seeds a group with the smallest head across all sources and
//! then sweeps every source, pulling in detections from the same file that
//! start before the group's running end time. Pulling a detection can push
//! the end time out, which can make heads of sources already visited
//! overlap, so the sweep repeats until a full pass takes nothing.
//!
//! License: MIT OR Apache-2.0

use log::trace;

use crate::detection::{Detection, WeightedDetection};

/// One system's detections, in merge order.
#[derive(Debug)]
struct SourceCursor<'a> {
    detections: Vec<&'a Detection>,
    weight: f64,
    pos: usize,
}

impl<'a> SourceCursor<'a> {
    fn new(detections: &'a [Detection], weight: f64) -> Self {
        let mut sorted: Vec<&'a Detection> = detections.iter().collect();
        sorted.sort_by(|a, b| a.key_cmp(b));
        Self {
            detections: sorted,
            weight,
            pos: 0,
        }
    }

    fn peek(&self) -> Option<&'a Detection> {
        self.detections.get(self.pos).copied()
    }

    fn take(&mut self) -> Option<WeightedDetection<'a>> {
        let detection = self.peek()?;
        self.pos += 1;
        Some(WeightedDetection {
            detection,
            weight: self.weight,
        })
    }

    fn remaining(&self) -> usize {
        self.detections.len() - self.pos
    }
}

/// A maximal set of transitively overlapping detections from one file.
#[derive(Debug, Clone)]
pub struct CandidateGroup<'a> {
    pub filename: &'a str,
    /// Furthest end time reached by any member.
    pub window_end: f64,
    pub members: Vec<WeightedDetection<'a>>,
}

impl<'a> CandidateGroup<'a> {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Earliest start time among the members.
    pub fn window_start(&self) -> f64 {
        self.members
            .iter()
            .map(|m| m.detection.start_time)
            .fold(f64::INFINITY, f64::min)
    }
}

/// Streams candidate groups out of N sorted detection sources.
///
/// ```
/// use syscomb_core::detection::Detection;
/// use syscomb_core::merger::IntervalMerger;
///
/// let a = vec![Detection::new("file1", 0.0, 1.0, 0.8)];
/// let b = vec![Detection::new("file1", 0.5, 1.5, 0.6)];
/// let groups: Vec<_> = IntervalMerger::new()
///     .with_source(&a, 1.0)
///     .with_source(&b, 1.0)
///     .collect();
/// assert_eq!(groups.len(), 1);
/// assert_eq!(groups[0].members.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct IntervalMerger<'a> {
    sources: Vec<SourceCursor<'a>>,
}

impl<'a> IntervalMerger<'a> {
    pub fn new() -> Self {
        Self { sources: Vec::new() }
    }

    /// Adds one system's detections with that system's weight.
    pub fn add_source(&mut self, detections: &'a [Detection], weight: f64) {
        self.sources.push(SourceCursor::new(detections, weight));
    }

    pub fn with_source(mut self, detections: &'a [Detection], weight: f64) -> Self {
        self.add_source(detections, weight);
        self
    }

    /// Detections not yet assigned to a group.
    pub fn remaining(&self) -> usize {
        self.sources.iter().map(SourceCursor::remaining).sum()
    }

    /// Index of the source whose head has the smallest key.
    fn min_head(&self) -> Option<usize> {
        let mut best: Option<(usize, &'a Detection)> = None;
        for (i, source) in self.sources.iter().enumerate() {
            if let Some(head) = source.peek() {
                match best {
                    Some((_, current)) if head.key_cmp(current).is_ge() => {}
                    _ => best = Some((i, head)),
                }
            }
        }
        best.map(|(i, _)| i)
    }

    /// Assembles the next candidate group, or `None` when every source is drained.
    pub fn next_group(&mut self) -> Option<CandidateGroup<'a>> {
        let seed_idx = self.min_head()?;
        let seed = self.sources[seed_idx].take()?;

        let mut group = CandidateGroup {
            filename: seed.detection.filename.as_str(),
            window_end: seed.detection.end_time,
            members: vec![seed],
        };

        let mut passes = 0usize;
        loop {
            passes += 1;
            let mut took_any = false;
            for source in self.sources.iter_mut() {
                while let Some(head) = source.peek() {
                    if head.filename != group.filename || !(head.start_time < group.window_end) {
                        break;
                    }
                    if head.end_time > group.window_end {
                        group.window_end = head.end_time;
                    }
                    if let Some(member) = source.take() {
                        group.members.push(member);
                    }
                    took_any = true;
                }
            }
            if !took_any {
                break;
            }
        }

        trace!(
            "Group in '{}' ending at {:.3}: {} members after {} passes.",
            group.filename,
            group.window_end,
            group.members.len(),
            passes
        );
        Some(group)
    }
}

impl<'a> Iterator for IntervalMerger<'a> {
    type Item = CandidateGroup<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_group()
    }
}
