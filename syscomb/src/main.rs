// syscomb/src/main.rs
//! syscomb entry point.
//!
//! Exit codes: 0 on success, 2 for invocation and configuration mistakes,
//! 1 for every other failure.

use clap::Parser;
use std::process::ExitCode;

use syscomb::cli::Cli;
use syscomb::commands::combine;
use syscomb::logger;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init_logger(logger::level_from_flags(cli.debug, cli.quiet));

    match combine::run(&cli) {
        Ok(summary) => {
            if !cli.quiet {
                combine::info_msg(format!(
                    "Wrote {} detections for {} keywords.",
                    summary.output_detections, summary.keywords
                ));
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            combine::error_msg(format!("{:#}", err));
            if combine::is_usage_error(&err) {
                combine::info_msg(
                    "Usage: syscomb <LANGUAGE> <CORPUS> <KWLIST_ID> <METHOD> <OUTPUT_DIR> <INPUT>... [--weights W...]\n       Run 'syscomb --help' for details.",
                );
                ExitCode::from(2)
            } else {
                ExitCode::from(1)
            }
        }
    }
}
