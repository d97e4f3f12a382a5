// syscomb/src/lib.rs
//! # syscomb CLI Application
//!
//! Command-line front end of the `syscomb-core` system combiner: resolves the
//! evaluation setting from the language configuration, expands input
//! patterns and reports the outcome of a run.

pub mod cli;
pub mod commands;
pub mod logger;
pub mod ui;

pub use cli::Cli;
