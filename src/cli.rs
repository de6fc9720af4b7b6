//! Command-line interface for signsh
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Sign language to speech
#[derive(Parser, Debug)]
#[command(
    name = "signsh",
    version,
    about = "Turn recorded sign-language landmark streams into speech"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress live output (quiet mode)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose output (startup and engine detail)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Parse a duration string into milliseconds.
///
/// Supports bare numbers (milliseconds) and any format accepted by
/// `humantime`: single-unit (`800ms`, `2s`) and compound (`1s 500ms`).
fn parse_millis(s: &str) -> Result<u64, String> {
    let s = s.trim();
    // Bare number → milliseconds
    if let Ok(ms) = s.parse::<u64>() {
        return Ok(ms);
    }
    humantime::parse_duration(s)
        .map(|d| d.as_millis() as u64)
        .map_err(|e| e.to_string())
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a recorded landmark stream through the recognition pipeline
    Run {
        /// Landmark recording to replay (JSONL, one frame per line)
        #[arg(long, value_name = "FILE")]
        replay: PathBuf,

        /// Target language for speech (default: from config). Examples: en, es, de
        #[arg(long, value_name = "LANG")]
        language: Option<String>,

        /// Load the gesture dataset from a local export instead of the backend
        #[arg(long, value_name = "FILE")]
        dataset: Option<PathBuf>,

        /// Vote window duration override. Examples: 800ms, 1s, 1200
        #[arg(long, value_name = "DURATION", value_parser = parse_millis)]
        window: Option<u64>,

        /// Print events as JSON lines on stdout instead of the live view
        #[arg(long)]
        json: bool,

        /// Write the transcript to transcript-YYYY-MM-DD.txt when the session ends
        #[arg(long)]
        save_transcript: bool,
    },

    /// Inspect and modify the gesture dataset backend
    #[cfg(feature = "remote")]
    Dataset {
        #[command(subcommand)]
        action: DatasetAction,
    },

    /// List supported target languages
    Languages,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Actions against the gesture dataset backend.
#[cfg(feature = "remote")]
#[derive(Subcommand, Debug)]
pub enum DatasetAction {
    /// Show stored labels and example counts
    Stats,

    /// Export the dataset to a JSON artifact
    Export {
        /// Output path (default: gesture-dataset-YYYY-MM-DD.json)
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Import a dataset export, merging it into the backend
    Import {
        /// JSON file to import (wrapped export or bare label mapping)
        file: PathBuf,

        /// Overwrite stored examples for conflicting labels
        #[arg(long)]
        replace: bool,
    },

    /// Delete one gesture label and its examples
    Delete {
        /// Label to delete
        label: String,
    },

    /// Delete every stored gesture
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}
