//! Session files: records to decoded messages to sessions.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use thiserror::Error;

use crate::message::Message;
use crate::reader::records::{LineWarning, RecordError, RecordReader};
use crate::session::Session;

/// Buffer size for `BufReader` (64KB for large session files)
const BUFFER_SIZE: usize = 64 * 1024;

#[derive(Debug, Error)]
pub enum SessionReadError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error("no messages found in session")]
    NoMessages,
}

/// Error from [`stream_messages`].
#[derive(Debug, Error)]
pub enum StreamError<E> {
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error("line {line}: {source}")]
    Callback {
        line: usize,
        #[source]
        source: E,
    },
}

/// Decoded conversation messages from a record stream.
///
/// Bookkeeping records are skipped. Conversation records without a timestamp
/// and payloads that fail to decode are reported as warnings; the latter are
/// still yielded with `content == None`.
pub struct MessageStream<R> {
    records: RecordReader<R>,
}

impl<R: BufRead> MessageStream<R> {
    pub fn new(reader: R) -> Self {
        Self::from_records(RecordReader::new(reader))
    }

    pub const fn from_records(records: RecordReader<R>) -> Self {
        Self { records }
    }

    /// Line number of the most recently yielded message.
    pub const fn line(&self) -> usize {
        self.records.line()
    }

    pub fn warnings(&self) -> &[LineWarning] {
        self.records.warnings()
    }

    pub fn take_warnings(&mut self) -> Vec<LineWarning> {
        self.records.take_warnings()
    }
}

impl<R: BufRead> Iterator for MessageStream<R> {
    type Item = Result<Message, RecordError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = match self.records.next()? {
                Ok(record) => record,
                Err(e) => return Some(Err(e)),
            };
            let line = self.records.line();

            let Some(kind) = record.kind.message_type() else {
                tracing::debug!(line, "skipping non-conversation record");
                continue;
            };
            let Some(mut message) = Message::from_record(record) else {
                self.records
                    .warn(line, format!("{kind} record without timestamp"));
                continue;
            };
            if let Err(e) = message.decode_content() {
                self.records.warn(line, e.to_string());
            }
            return Some(Ok(message));
        }
    }
}

/// Read a session file.
pub fn read_session(path: &Path) -> Result<Session, SessionReadError> {
    read_session_with_warnings(path).map(|(session, _)| session)
}

/// Read a session file, returning the per-line warnings alongside it.
pub fn read_session_with_warnings(
    path: &Path,
) -> Result<(Session, Vec<LineWarning>), SessionReadError> {
    let file = File::open(path)?;
    fold_session(BufReader::with_capacity(BUFFER_SIZE, file))
}

/// Read a session from any buffered source.
pub fn read_session_from<R: BufRead>(reader: R) -> Result<Session, SessionReadError> {
    fold_session(reader).map(|(session, _)| session)
}

fn fold_session<R: BufRead>(reader: R) -> Result<(Session, Vec<LineWarning>), SessionReadError> {
    let mut stream = MessageStream::new(reader);
    let mut session = Session::new();
    for message in stream.by_ref() {
        session.append(message?);
    }
    if session.message_count() == 0 {
        return Err(SessionReadError::NoMessages);
    }
    Ok((session, stream.take_warnings()))
}

/// Visit decoded messages one at a time without building a session.
///
/// Stops at the first callback error. Returns the number of messages visited.
pub fn stream_messages<R, F, E>(reader: R, mut callback: F) -> Result<usize, StreamError<E>>
where
    R: BufRead,
    F: FnMut(Message) -> Result<(), E>,
{
    let mut stream = MessageStream::new(reader);
    let mut count = 0;
    while let Some(message) = stream.next() {
        callback(message?).map_err(|source| StreamError::Callback {
            line: stream.line(),
            source,
        })?;
        count += 1;
    }
    Ok(count)
}
