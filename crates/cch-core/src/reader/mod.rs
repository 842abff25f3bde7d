//! Readers for the on-disk archive.

pub mod jsonl;
pub mod records;
pub mod scanner;
pub mod todos;

pub use jsonl::{
    MessageStream, SessionReadError, StreamError, read_session, read_session_from,
    read_session_with_warnings, stream_messages,
};
pub use records::{LineWarning, MAX_LINE_BYTES, RecordError, RecordReader};
pub use scanner::{Diagnostic, ScanError, ScanOptions, ScanResult, Scanner};
pub use todos::{TodoError, parse_todo_filename, read_todo_list, read_todos};
