//! Line-delimited record reading.

use std::fmt;
use std::io::{self, BufRead, Read};

use thiserror::Error;

use crate::message::Record;

/// Longest accepted line, excluding the terminator.
pub const MAX_LINE_BYTES: usize = 10 * 1024 * 1024;

/// Conditions that end a record stream.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("line {line} exceeds the {limit} byte limit")]
    LineTooLong { line: usize, limit: usize },
    #[error("read failed at line {line}: {source}")]
    Io {
        line: usize,
        #[source]
        source: io::Error,
    },
}

/// A recoverable problem with a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineWarning {
    /// 1-based line number.
    pub line: usize,
    pub message: String,
}

impl fmt::Display for LineWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

/// Lazy iterator over the records of a session file.
///
/// Unparseable lines are skipped and reported through [`RecordReader::warnings`].
/// The first fatal error is yielded once, after which the iterator is fused.
pub struct RecordReader<R> {
    reader: R,
    buf: Vec<u8>,
    line: usize,
    max_line_bytes: usize,
    warnings: Vec<LineWarning>,
    finished: bool,
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            line: 0,
            max_line_bytes: MAX_LINE_BYTES,
            warnings: Vec::new(),
            finished: false,
        }
    }

    #[must_use]
    pub const fn with_max_line_bytes(mut self, limit: usize) -> Self {
        self.max_line_bytes = limit;
        self
    }

    /// Line number of the most recently read line.
    pub const fn line(&self) -> usize {
        self.line
    }

    pub fn warnings(&self) -> &[LineWarning] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<LineWarning> {
        std::mem::take(&mut self.warnings)
    }

    pub(crate) fn warn(&mut self, line: usize, message: String) {
        tracing::warn!(line, message = %message, "skipping line");
        self.warnings.push(LineWarning { line, message });
    }

    /// Read the next line into `buf`, without its terminator.
    ///
    /// Returns `Ok(false)` at end of input.
    fn read_line(&mut self) -> Result<bool, RecordError> {
        self.buf.clear();
        // Room for the line, `\r\n`, and one byte to detect overflow.
        let cap = self.max_line_bytes as u64 + 2;
        let n = (&mut self.reader)
            .take(cap)
            .read_until(b'\n', &mut self.buf)
            .map_err(|source| RecordError::Io {
                line: self.line + 1,
                source,
            })?;
        if n == 0 {
            return Ok(false);
        }
        self.line += 1;

        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
        }
        if self.buf.len() > self.max_line_bytes {
            return Err(RecordError::LineTooLong {
                line: self.line,
                limit: self.max_line_bytes,
            });
        }
        Ok(true)
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<Record, RecordError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            match self.read_line() {
                Ok(false) => self.finished = true,
                Ok(true) => {
                    if self.buf.iter().all(u8::is_ascii_whitespace) {
                        continue;
                    }
                    match serde_json::from_slice::<Record>(&self.buf) {
                        Ok(record) => return Some(Ok(record)),
                        Err(e) => self.warn(self.line, format!("invalid record: {e}")),
                    }
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }
        None
    }
}
