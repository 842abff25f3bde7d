//! Claude Code history export CLI library.
//!
//! This crate provides the command-line interface for `cc-export`.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, ExportArgs, ListArgs};
pub use config::Config;
