// syscomb/src/cli.rs
//! Command-line interface definition for the syscomb application.
//! License: MIT OR Apache-2.0

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use syscomb_core::ZeroWeightPolicy;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "syscomb",
    author = "Relay",
    version = env!("CARGO_PKG_VERSION"),
    about = "Combine keyword-search detection lists from several systems",
    long_about = "syscomb merges the detection lists of several keyword-search systems into one. Temporally overlapping detections of the same keyword in the same recording become a single detection whose score is computed by the selected combination method (MAX, MIN, MED, SUM, MNZ or ANZ). Both the raw combined list and a threshold-normalized list are written to the output directory.",
    arg_required_else_help = true,
)]
pub struct Cli {
    /// Suppress all log output.
    #[arg(long, short = 'q', help = "Suppress all informational and debug messages.")]
    pub quiet: bool,

    /// Enable debug logging for the syscomb crates.
    #[arg(long, short = 'd', help = "Enable debug logging.")]
    pub debug: bool,

    /// Language configuration file (YAML).
    #[arg(long = "config", value_name = "FILE", env = "SYSCOMB_CONFIG", help = "Path to the language configuration file (YAML).")]
    pub config: Option<PathBuf>,

    /// Keyword list to use instead of the one named in the configuration.
    #[arg(long = "kwlist", value_name = "FILE", help = "Override the keyword list file resolved from the configuration.")]
    pub kwlist: Option<PathBuf>,

    /// What to do when a group's weights sum to zero.
    #[arg(long = "zero-weight", value_enum, default_value = "fail", help = "Behaviour when the weights of a merged group sum to zero.")]
    pub zero_weight: ZeroWeightChoice,

    /// System id written into the output lists.
    #[arg(long = "system-id", value_name = "ID", default_value = "", help = "System id recorded in the output lists.")]
    pub system_id: String,

    /// Language code, e.g. `206`.
    #[arg(value_name = "LANGUAGE")]
    pub language: String,

    /// Corpus name, e.g. `dev` or `eval`.
    #[arg(value_name = "CORPUS")]
    pub corpus: String,

    /// Keyword list id within the corpus.
    #[arg(value_name = "KWLIST_ID")]
    pub kwlist_id: String,

    /// Combination method: max, min, med, sum, mnz or anz.
    #[arg(value_name = "METHOD")]
    pub method: String,

    /// Directory receiving kwslist.raw.xml and kwslist.xml.
    #[arg(value_name = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Input detection lists; glob patterns are expanded.
    #[arg(value_name = "INPUT", required = true, num_args = 1..)]
    pub inputs: Vec<String>,

    /// One weight per input, in input order.
    #[arg(
        long = "weights",
        short = 'w',
        visible_alias = "weight",
        value_name = "W",
        num_args = 1..,
        allow_negative_numbers = true,
        help = "One weight per input system (default: all 1.0)."
    )]
    pub weights: Option<Vec<f64>>,
}

/// CLI spelling of [`ZeroWeightPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ZeroWeightChoice {
    /// Abort the run with an arithmetic error.
    Fail,
    /// Fall back to unweighted averaging.
    Unweighted,
}

impl From<ZeroWeightChoice> for ZeroWeightPolicy {
    fn from(choice: ZeroWeightChoice) -> Self {
        match choice {
            ZeroWeightChoice::Fail => ZeroWeightPolicy::Fail,
            ZeroWeightChoice::Unweighted => ZeroWeightPolicy::Unweighted,
        }
    }
}
