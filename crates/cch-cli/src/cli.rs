//! Command-line argument definitions.

use std::path::PathBuf;

use cch_export::Format;
use clap::{Args, Parser, Subcommand};

/// Claude Code history export.
///
/// Reads the conversation archive under `~/.claude` and writes projects,
/// sessions and todo lists as Markdown or JSON.
#[derive(Debug, Parser)]
#[command(name = "cc-export", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Export conversation history to a file or directory.
    Export(ExportArgs),

    /// List projects in the archive.
    List(ListArgs),
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Path to the .claude directory (defaults to ~/.claude).
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Output file, or output directory with --batch. Use - for stdout.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Export format: json, markdown, html.
    #[arg(short, long)]
    pub format: Option<Format>,

    /// Comma-separated project path substrings to keep.
    #[arg(long, value_delimiter = ',')]
    pub projects: Vec<String>,

    /// Start date/time (YYYY-MM-DD, YYYY-MM-DD HH:MM:SS, RFC 3339 or "2 days ago").
    #[arg(long)]
    pub start_time: Option<String>,

    /// End date/time. A date alone includes the whole day.
    #[arg(long)]
    pub end_time: Option<String>,

    /// Maximum number of sessions to export (0 = unlimited).
    #[arg(long)]
    pub max_sessions: Option<usize>,

    /// Pretty print JSON output.
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub pretty: Option<bool>,

    /// Include thinking blocks in Markdown.
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub show_thinking: Option<bool>,

    /// Include raw message payloads in JSON.
    #[arg(long)]
    pub include_raw: bool,

    /// Include todo lists.
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub include_todos: Option<bool>,

    /// Write each project to its own file in the output directory.
    #[arg(long)]
    pub batch: bool,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Path to the .claude directory (defaults to ~/.claude).
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Comma-separated project path substrings to keep.
    #[arg(long, value_delimiter = ',')]
    pub projects: Vec<String>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}
