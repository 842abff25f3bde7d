//! Rendering and export for Claude Code history.
//!
//! Converts the session and project model from `cch-core` into JSON or
//! Markdown documents and writes them to a stream, a single file, or one
//! file per item.

pub mod batch;
pub mod error;
pub mod exporter;
pub mod format;
pub mod json;
pub mod markdown;

pub use batch::{BatchExportResult, BatchExporter, BatchItemError};
pub use error::ExportError;
pub use exporter::{CountingWriter, ExportTarget, FileExporter, Format};
pub use format::{format_date, format_duration, format_timestamp};
pub use json::{JsonConverter, JsonOptions};
pub use markdown::{MarkdownConverter, MarkdownOptions};
