// syscomb/src/ui/output_format.rs
//! Formatting of user-facing messages and the run summary.
//!
//! Messages go to a caller-supplied writer so tests can capture them.
//! Color is applied only when the caller says the target supports it.
//!
//! License: MIT OR Apache-2.0

use owo_colors::OwoColorize;
use std::io::{self, Write};

use syscomb_core::RunSummary;

/// Message categories with their prefix and color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Warn,
    Error,
    Success,
}

impl MessageKind {
    fn prefix(self) -> &'static str {
        match self {
            MessageKind::Info => "INFO:",
            MessageKind::Warn => "WARN:",
            MessageKind::Error => "ERROR:",
            MessageKind::Success => "OK:",
        }
    }
}

fn print_message<W: Write>(out: &mut W, kind: MessageKind, msg: &str, color: bool) -> io::Result<()> {
    let prefix = kind.prefix();
    if !color {
        return writeln!(out, "{} {}", prefix, msg);
    }
    match kind {
        MessageKind::Info => writeln!(out, "{} {}", prefix.cyan(), msg),
        MessageKind::Warn => writeln!(out, "{} {}", prefix.yellow(), msg),
        MessageKind::Error => writeln!(out, "{} {}", prefix.red().bold(), msg),
        MessageKind::Success => writeln!(out, "{} {}", prefix.green(), msg),
    }
}

pub fn print_info_message<W: Write>(out: &mut W, msg: &str, color: bool) -> io::Result<()> {
    print_message(out, MessageKind::Info, msg, color)
}

pub fn print_warn_message<W: Write>(out: &mut W, msg: &str, color: bool) -> io::Result<()> {
    print_message(out, MessageKind::Warn, msg, color)
}

pub fn print_error_message<W: Write>(out: &mut W, msg: &str, color: bool) -> io::Result<()> {
    print_message(out, MessageKind::Error, msg, color)
}

pub fn print_success_message<W: Write>(out: &mut W, msg: &str, color: bool) -> io::Result<()> {
    print_message(out, MessageKind::Success, msg, color)
}

/// Writes the end-of-run summary block.
pub fn print_summary<W: Write>(out: &mut W, summary: &RunSummary, color: bool) -> io::Result<()> {
    let header = "Combination Summary";
    if color {
        writeln!(out, "{}", header.bold())?;
    } else {
        writeln!(out, "{}", header)?;
    }
    writeln!(out, "  keywords:           {}", summary.keywords)?;
    writeln!(out, "  input systems:      {}", summary.inputs)?;
    writeln!(out, "  input detections:   {}", summary.input_detections)?;
    writeln!(out, "  output detections:  {}", summary.output_detections)?;
    writeln!(out, "  accepted (YES):     {}", summary.accepted)?;
    writeln!(out, "  raw output:         {}", summary.raw_output.display())?;
    writeln!(out, "  normalized output:  {}", summary.normalized_output.display())?;
    Ok(())
}
