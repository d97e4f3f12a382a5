// syscomb/src/logger.rs
//! Logger bootstrap for the syscomb binary.
//! License: MIT OR Apache-2.0

use env_logger::{Builder, Env};
use log::LevelFilter;
use std::io::Write;

/// Crates whose level is forced when an explicit level is requested.
const OWN_CRATES: [&str; 3] = ["syscomb", "syscomb_core", "syscomb_fusion"];

/// Installs `env_logger`, writing to stderr.
///
/// With `Some(level)` the syscomb crates log at exactly that level and
/// `RUST_LOG` still applies to everything else. With `None`, `RUST_LOG`
/// decides and defaults to `info`. Calling it twice is harmless.
pub fn init_logger(level: Option<LevelFilter>) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    if let Some(level) = level {
        for name in OWN_CRATES {
            builder.filter_module(name, level);
        }
    }
    builder.format(|buf, record| {
        writeln!(buf, "[{}] {}", record.level(), record.args())
    });
    let _ = builder.try_init();
}

/// Level requested by the `--debug` / `--quiet` flags, if any.
pub fn level_from_flags(debug: bool, quiet: bool) -> Option<LevelFilter> {
    if quiet {
        Some(LevelFilter::Off)
    } else if debug {
        Some(LevelFilter::Debug)
    } else {
        None
    }
}
