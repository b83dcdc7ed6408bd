//! CLI definitions using clap.

use clap::builder::TypedValueParser;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::STATE_DIR_ENV;

pub mod commands;

/// export-state CLI - incremental export state for notebook pipelines
#[derive(Parser, Debug)]
#[command(name = "export-state", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Export base directory holding .export-state.json (default: current directory)
    // clap's default PathBuf parser rejects empty values itself; a blank
    // value (e.g. set-but-empty EXPORT_STATE_DIR) must instead reach the
    // store's own base-directory validation.
    #[arg(
        short = 'd',
        long,
        global = true,
        env = STATE_DIR_ENV,
        value_parser = clap::builder::OsStringValueParser::new().map(PathBuf::from)
    )]
    pub dir: Option<PathBuf>,

    /// Output as JSON (for agent/pipeline integration)
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show all recorded export state
    Status,

    /// Print the last-export instant for one notebook
    Last {
        /// Notebook identifier
        id: String,
    },

    /// Record a successful export for one notebook
    Mark {
        /// Notebook identifier
        id: String,

        /// Instant to record (RFC 3339 with offset, e.g. 2024-01-01T00:00:00Z; default: now)
        #[arg(long)]
        at: Option<String>,
    },

    /// Delete the state file so the next run starts from scratch
    Clear,

    /// Print version information
    Version,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}
