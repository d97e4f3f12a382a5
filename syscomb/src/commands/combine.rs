// syscomb/src/commands/combine.rs
//! The combine command: resolve settings, expand inputs, run, report.
//!
//! License: MIT OR Apache-2.0

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use log::{debug, info};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use syscomb_core::{run_combination, CombinationRequest, LanguageConfig, RunSummary, SyscombError};

use crate::cli::Cli;
use crate::ui::output_format;

/// Problems with the input file arguments.
#[derive(Error, Debug)]
pub enum InputPatternError {
    #[error("Invalid input pattern '{pattern}': {source}")]
    BadPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    #[error("Input pattern '{0}' matched no files")]
    NoMatch(String),
}

/// Helper for printing info messages to stderr.
pub fn info_msg(msg: impl AsRef<str>) {
    let color = io::stderr().is_terminal();
    let _ = output_format::print_info_message(&mut io::stderr(), msg.as_ref(), color);
}

/// Helper for printing warning messages to stderr.
pub fn warn_msg(msg: impl AsRef<str>) {
    let color = io::stderr().is_terminal();
    let _ = output_format::print_warn_message(&mut io::stderr(), msg.as_ref(), color);
}

/// Helper for printing error messages to stderr.
pub fn error_msg(msg: impl AsRef<str>) {
    let color = io::stderr().is_terminal();
    let _ = output_format::print_error_message(&mut io::stderr(), msg.as_ref(), color);
}

fn has_glob_meta(arg: &str) -> bool {
    arg.contains(['*', '?', '['])
}

/// Expands glob patterns in `args`, keeping plain paths as given.
///
/// Each pattern's matches are sorted; argument order is otherwise kept.
pub fn expand_inputs(args: &[String]) -> Result<Vec<PathBuf>, InputPatternError> {
    let mut paths = Vec::with_capacity(args.len());
    for arg in args {
        if !has_glob_meta(arg) {
            paths.push(PathBuf::from(arg));
            continue;
        }
        let entries = glob::glob(arg).map_err(|source| InputPatternError::BadPattern {
            pattern: arg.clone(),
            source,
        })?;
        let mut matched: Vec<PathBuf> = entries.filter_map(|e| e.ok()).collect();
        if matched.is_empty() {
            return Err(InputPatternError::NoMatch(arg.clone()));
        }
        matched.sort();
        debug!("Pattern '{}' expanded to {} files.", arg, matched.len());
        paths.extend(matched);
    }
    Ok(paths)
}

/// Turns parsed arguments into a ready-to-run request.
pub fn build_request(cli: &Cli) -> Result<CombinationRequest> {
    let config = LanguageConfig::locate_and_load(cli.config.as_deref())?;
    let mut settings = config.resolve(&cli.language, &cli.corpus, &cli.kwlist_id)?;
    if let Some(kwlist) = &cli.kwlist {
        debug!("Keyword list overridden with {}", kwlist.display());
        settings.kwlist_file = kwlist.clone();
    }
    let inputs = expand_inputs(&cli.inputs)?;

    Ok(CombinationRequest {
        settings,
        method: cli.method.clone(),
        inputs,
        weights: cli.weights.clone(),
        output_dir: cli.output_dir.clone(),
        zero_weight: cli.zero_weight.into(),
        system_id: cli.system_id.clone(),
    })
}

/// Runs the combine command and prints the summary to stdout.
pub fn run(cli: &Cli) -> Result<RunSummary> {
    let request = build_request(cli)?;
    info!(
        "Combining {} systems with method {} for language {} ({}), corpus {}, keyword list {}",
        request.inputs.len(),
        request.method,
        request.settings.language,
        request.settings.language_code,
        request.settings.corpus,
        request.settings.kwlist_id
    );
    let summary = run_combination(&request)?;

    let color = io::stdout().is_terminal();
    output_format::print_summary(&mut io::stdout(), &summary, color)
        .context("Failed to write run summary")?;
    if summary.output_detections == 0 {
        warn_msg("The combined list contains no detections.");
    }
    Ok(summary)
}

/// Reports whether `err` is a mistake in how the command was invoked.
pub fn is_usage_error(err: &anyhow::Error) -> bool {
    if let Some(e) = err.downcast_ref::<SyscombError>() {
        return e.is_configuration();
    }
    matches!(
        err.downcast_ref::<InputPatternError>(),
        Some(InputPatternError::BadPattern { .. })
    )
}
