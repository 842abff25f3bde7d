//! Ingestion of Claude Code conversation archives.
//!
//! This crate contains:
//! - Record reading: tolerant line-by-line parsing of session files
//! - Content decoding: user text, tool results, assistant responses
//! - Aggregation: sessions and projects with on-demand statistics
//! - Scanning: project discovery with path, date and session-count filters

pub mod content;
pub mod filter;
pub mod message;
pub mod project;
pub mod reader;
pub mod session;
pub mod todo;

pub use content::{AssistantMessage, Content, ContentBlock, DecodeError, ToolResult, Usage, UserText};
pub use filter::{DateRange, ProjectFilter, SessionBudget};
pub use message::{Message, MessageType, Record, RecordKind};
pub use project::{Project, decode_project_path};
pub use reader::{
    Diagnostic, ScanError, ScanOptions, ScanResult, Scanner, SessionReadError, read_session,
    read_session_from, stream_messages,
};
pub use session::{Session, TokenUsage};
pub use todo::{Todo, TodoList, TodoPriority, TodoStatus};
