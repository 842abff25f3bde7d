//! CLI subcommand implementations.

pub mod export;
pub mod list;
pub mod util;
