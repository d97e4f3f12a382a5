//! One-shot combination runs.
//!
//! `run_combination` ties the pieces together: validate the request, load
//! the keyword list and every input, combine, decide, and write the raw and
//! normalized output lists.
//!
//! License: MIT OR Apache-2.0

use anyhow::Context;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use syscomb_fusion::CombinationMethod;

use crate::aggregator::ZeroWeightPolicy;
use crate::config::RunSettings;
use crate::decision::DecisionMaker;
use crate::detection::DetectionList;
use crate::errors::{Result, SyscombError};
use crate::kwlist::KwList;
use crate::kwslist::{read_kwslist, write_kwslist, ReadOptions};
use crate::pipeline::{resolve_weights, SystemCombiner};

/// Output file with the combined, max-normalized scores.
pub const RAW_OUTPUT_NAME: &str = "kwslist.raw.xml";
/// Output file with threshold-normalized scores, ready for scoring.
pub const NORMALIZED_OUTPUT_NAME: &str = "kwslist.xml";

/// A fully specified combination run.
#[derive(Debug, Clone)]
pub struct CombinationRequest {
    pub settings: RunSettings,
    /// Method name, matched case-insensitively.
    pub method: String,
    pub inputs: Vec<PathBuf>,
    /// One weight per input; `None` for all ones.
    pub weights: Option<Vec<f64>>,
    pub output_dir: PathBuf,
    pub zero_weight: ZeroWeightPolicy,
    pub system_id: String,
}

/// Counts reported after a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub keywords: usize,
    pub inputs: usize,
    pub input_detections: usize,
    pub output_detections: usize,
    pub accepted: usize,
    pub raw_output: PathBuf,
    pub normalized_output: PathBuf,
}

/// Validated, ready-to-run form of a request.
#[derive(Debug)]
struct Plan {
    combiner: SystemCombiner,
    decisions: DecisionMaker,
}

fn plan(request: &CombinationRequest) -> Result<Plan> {
    let method: CombinationMethod = request.method.parse()?;
    let weights = resolve_weights(request.weights.as_deref(), request.inputs.len())?;
    let combiner = SystemCombiner::with_policy(method, weights, request.zero_weight)?;
    let s = &request.settings;
    let decisions = DecisionMaker::for_combination(s.beta, s.total_duration, s.posterior_boost)?;
    Ok(Plan { combiner, decisions })
}

/// Loads every input list, in order, with zero-score detections removed.
pub fn load_inputs(paths: &[PathBuf], weights: &[f64], kwlist: &KwList) -> Result<Vec<DetectionList>> {
    let options = ReadOptions {
        remove_zero_score: true,
    };
    let mut lists = Vec::with_capacity(paths.len());
    for (path, weight) in paths.iter().zip(weights) {
        info!(
            "Loading input detection list {} (weight = {:.6}) ...",
            path.display(),
            weight
        );
        lists.push(read_kwslist(path, kwlist, options)?);
    }
    Ok(lists)
}

/// Runs a whole combination and writes both output files.
///
/// Configuration problems are reported before any file is read.
pub fn run_combination(request: &CombinationRequest) -> Result<RunSummary> {
    let plan = plan(request)?;

    let kwlist = KwList::load_from_file(&request.settings.kwlist_file)?;
    let inputs = load_inputs(&request.inputs, plan.combiner.weights(), &kwlist)?;
    let input_detections = inputs.iter().map(DetectionList::detection_count).sum();

    info!("Combining input detection lists ...");
    let mut combined = plan.combiner.combine(&kwlist, &inputs)?;
    combined.language = request.settings.language.clone();
    combined.system_id = request.system_id.clone();

    let accepted = plan.decisions.apply(&mut combined);

    info!("Writing output detection lists ...");
    let (raw_output, normalized_output) = write_outputs(&combined, &request.output_dir)?;

    Ok(RunSummary {
        keywords: combined.keyword_count(),
        inputs: inputs.len(),
        input_detections,
        output_detections: combined.detection_count(),
        accepted,
        raw_output,
        normalized_output,
    })
}

/// Writes the raw and normalized lists into `dir`, creating it if needed.
pub fn write_outputs(list: &DetectionList, dir: &Path) -> Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    let raw = dir.join(RAW_OUTPUT_NAME);
    let normalized = dir.join(NORMALIZED_OUTPUT_NAME);
    write_kwslist(list, &raw, false)?;
    write_kwslist(list, &normalized, true)?;
    Ok((raw, normalized))
}

/// Reports whether `err` should be shown with usage help.
pub fn is_usage_error(err: &SyscombError) -> bool {
    err.is_configuration()
}
