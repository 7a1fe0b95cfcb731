//! CLI definitions for uiinspect.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use uiinspect_core::protocols::BackendKind;

/// uiinspect CLI.
#[derive(Parser)]
#[command(name = "uiinspect")]
#[command(about = "Synthesize and resolve accessibility-tree selectors")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (default: ~/.uiinspect/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Build a selector for the element at a child-index path
    Synth {
        /// Snapshot tree (JSON)
        #[arg(long)]
        tree: PathBuf,

        /// Child indices from the root, e.g. 0/2/1
        #[arg(long, default_value = "")]
        path: String,

        /// Also print helper code for the default check marks
        #[arg(long)]
        code: bool,

        /// Print the structured query as JSON instead of selector text
        #[arg(long)]
        json: bool,
    },

    /// Resolve a selector file against a tree and print the element
    Resolve {
        /// Snapshot tree (JSON)
        #[arg(long)]
        tree: PathBuf,

        /// Selector text, or a structured query when the file ends in .json
        #[arg(long)]
        selector: PathBuf,

        /// Override the configured timeout
        #[arg(long)]
        timeout_ms: Option<u64>,
    },

    /// Show the element under a screen point
    #[command(allow_negative_numbers = true)]
    At {
        /// Snapshot tree (JSON)
        #[arg(long)]
        tree: PathBuf,

        x: i32,

        y: i32,
    },

    /// Parse a selector file and report syntax errors
    Check {
        /// Selector text file
        #[arg(long)]
        selector: PathBuf,

        /// Grammar to check against (default: from config)
        #[arg(long)]
        backend: Option<BackendKind>,
    },
}
