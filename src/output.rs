//! Terminal rendering for pipeline events.
//! Used by `signsh run` for the live session view.

use crate::pipeline::PipelineEvent;
use std::io::{self, Write};

const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// Clear the current terminal line (replaces the live gesture readout).
pub fn clear_line() {
    eprint!("\r\x1b[2K");
}

/// Return the ANSI color code for a vote confidence.
fn confidence_color(confidence: f32) -> &'static str {
    if confidence >= 0.9 {
        GREEN
    } else if confidence >= 0.7 {
        "" // default terminal color
    } else if confidence >= 0.5 {
        YELLOW
    } else {
        RED
    }
}

/// Percentage readout shown next to the gesture label.
fn format_confidence(confidence: f32) -> String {
    format!("{:.0}%", confidence * 100.0)
}

/// Render a pipeline event to stderr.
///
/// Gesture events paint an in-place line that later events overwrite, so
/// a held sign reads as one updating row rather than a scrolling log.
/// Spoken text goes on its own line and stays.
pub fn render_event(event: &PipelineEvent) {
    match event {
        PipelineEvent::Gesture { label, confidence } => {
            let color = confidence_color(*confidence);
            let pct = format_confidence(*confidence);
            if color.is_empty() {
                eprint!("\r\x1b[2K{label} {DIM}{pct}{RESET}");
            } else {
                eprint!("\r\x1b[2K{color}{label}{RESET} {DIM}{pct}{RESET}");
            }
            io::stderr().flush().ok();
        }
        PipelineEvent::Cleared => {
            clear_line();
            io::stderr().flush().ok();
        }
        PipelineEvent::Spoken { text, lang } => {
            clear_line();
            eprintln!("{text} {DIM}[{lang}]{RESET}");
        }
        PipelineEvent::Stopped { transcript } => {
            clear_line();
            if transcript.is_empty() {
                eprintln!("{DIM}session ended, nothing spoken{RESET}");
            } else {
                eprintln!("{DIM}session ended{RESET}");
            }
        }
    }
}
