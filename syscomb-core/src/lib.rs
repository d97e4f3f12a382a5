// syscomb-core/src/lib.rs
//! # syscomb Core Library
//!
//! `syscomb-core` combines keyword-search detection lists produced by several
//! independent systems into one list. For every keyword, temporally
//! overlapping hypotheses from different systems are merged into a single
//! hypothesis whose score comes from a pluggable combination rule and whose
//! span is a score-weighted average of the members. Scores are then
//! rescaled per keyword so they never exceed 1.
//!
//! The numeric rules live in the `no_std` crate `syscomb-fusion`; this crate
//! adds the data model, the merge algorithm, file I/O and run orchestration.
//!
//! ## Modules
//!
//! * `detection`: `Detection`, `WeightedDetection` and `DetectionList`.
//! * `kwlist`: keyword list loading.
//! * `merger`: the N-source `IntervalMerger` producing candidate groups.
//! * `aggregator`: `SpanAggregator`, reducing a group to one detection.
//! * `normalizer`: per-keyword max normalization.
//! * `pipeline`: `SystemCombiner`, the per-keyword orchestrator.
//! * `decision`: keyword-specific-threshold YES/NO decisions.
//! * `kwslist`: reading and writing `<kwslist>` XML.
//! * `config`: YAML language configuration and `RunSettings`.
//! * `batch`: one-shot runs from file paths to output files.
//! * `errors`: the `SyscombError` taxonomy.
//!
//! ## Usage Example
//!
//! ```rust
//! use syscomb_core::{CombinationMethod, Detection, DetectionList, Keyword, KwList, SystemCombiner};
//!
//! fn main() -> anyhow::Result<()> {
//!     let kwlist = KwList::from_keywords(vec![Keyword { id: "K1".into(), text: "hello".into() }])?;
//!
//!     let mut a = DetectionList::new(&kwlist);
//!     a.push("K1", Detection::new("file1", 0.0, 1.0, 0.8));
//!     let mut b = DetectionList::new(&kwlist);
//!     b.push("K1", Detection::new("file1", 0.5, 1.5, 0.6));
//!
//!     let combiner = SystemCombiner::new(CombinationMethod::Max, vec![1.0, 1.0])?;
//!     let out = combiner.combine(&kwlist, &[a, b])?;
//!     assert_eq!(out.get("K1").unwrap()[0].score, 0.8);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Algorithmic entry points return [`SyscombError`], which separates
//! configuration errors from arithmetic ones. File loaders return
//! `anyhow::Result` with context and are folded into `SyscombError::Input`
//! by the batch runner.
//!
//! ---
//! License: MIT OR Apache-2.0

pub mod aggregator;
pub mod batch;
pub mod config;
pub mod decision;
pub mod detection;
pub mod errors;
pub mod kwlist;
pub mod kwslist;
pub mod merger;
pub mod normalizer;
pub mod pipeline;

/// Re-exports the combination rules from the fusion kernel.
pub use syscomb_fusion::{CombinationMethod, FusionError};

pub use aggregator::{SpanAggregator, ZeroWeightPolicy};
pub use batch::{run_combination, CombinationRequest, RunSummary};
pub use config::{LanguageConfig, RunSettings};
pub use decision::DecisionMaker;
pub use detection::{Detection, DetectionList, KeywordDetections, WeightedDetection};
pub use errors::SyscombError;
pub use kwlist::{Keyword, KwList};
pub use kwslist::{read_kwslist, write_kwslist, ReadOptions};
pub use merger::{CandidateGroup, IntervalMerger};
pub use normalizer::ScoreNormalizer;
pub use pipeline::{resolve_weights, SystemCombiner};
