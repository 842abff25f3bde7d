//! Conversation records and messages.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::content::{Content, DecodeError};

/// Role of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    User,
    Assistant,
}

impl MessageType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            _ => Err(format!("invalid message type: {s}")),
        }
    }
}

/// The `type` tag of a raw line.
///
/// Session files also carry bookkeeping lines (`summary`, `system`,
/// `file-history-snapshot`, ...) which parse as [`RecordKind::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    User,
    Assistant,
    #[serde(other)]
    Other,
}

impl RecordKind {
    /// The message role for conversation records.
    #[must_use]
    pub const fn message_type(self) -> Option<MessageType> {
        match self {
            Self::User => Some(MessageType::User),
            Self::Assistant => Some(MessageType::Assistant),
            Self::Other => None,
        }
    }
}

/// One line of a session file, as written by Claude Code.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    #[serde(default)]
    pub uuid: String,
    pub parent_uuid: Option<String>,
    pub session_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub user_type: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub request_id: Option<String>,
    pub version: Option<String>,
    pub cwd: Option<String>,
    pub message: Option<Box<RawValue>>,
}

/// A single user or assistant message within a session.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub uuid: String,
    /// Parent in the reply tree.
    pub parent_uuid: Option<String>,
    pub session_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: MessageType,
    pub user_type: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub request_id: Option<String>,
    pub version: Option<String>,
    pub cwd: Option<String>,
    /// The opaque `message` payload, kept verbatim.
    pub payload: Option<Box<RawValue>>,
    /// Decoded payload; `None` when it matched no known shape.
    #[serde(skip)]
    pub content: Option<Content>,
}

impl Message {
    /// Build an undecoded message from a conversation record.
    ///
    /// Returns `None` for non-conversation records and for records without a
    /// timestamp.
    pub fn from_record(record: Record) -> Option<Self> {
        let kind = record.kind.message_type()?;
        let timestamp = record.timestamp?;
        Some(Self {
            uuid: record.uuid,
            parent_uuid: record.parent_uuid,
            session_id: record.session_id.filter(|id| !id.is_empty()),
            kind,
            user_type: record.user_type,
            timestamp,
            request_id: record.request_id,
            version: record.version,
            cwd: record.cwd.filter(|cwd| !cwd.is_empty()),
            payload: record.message,
            content: None,
        })
    }

    /// Decode the payload into [`Message::content`].
    ///
    /// On error the message keeps `content == None`; the error is returned so
    /// the caller can report it.
    pub fn decode_content(&mut self) -> Result<(), DecodeError> {
        self.content = Content::decode(
            self.kind,
            self.user_type.as_deref(),
            self.payload.as_deref(),
        )?;
        Ok(())
    }

    /// Assistant payload, if decoded.
    pub fn assistant(&self) -> Option<&crate::content::AssistantMessage> {
        match &self.content {
            Some(Content::Assistant(msg)) => Some(msg),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(line: &str) -> Record {
        serde_json::from_str(line).unwrap()
    }

    #[test]
    fn test_record_parses_full_line() {
        let rec = record(
            r#"{"uuid":"m1","parentUuid":"m0","sessionId":"s1","type":"user","userType":"external","timestamp":"2024-01-01T10:00:00.250Z","requestId":"r1","version":"1.0.3","cwd":"/repo","message":{"role":"user","content":"Hello"}}"#,
        );
        assert_eq!(rec.kind, RecordKind::User);
        assert_eq!(rec.parent_uuid.as_deref(), Some("m0"));
        assert_eq!(rec.session_id.as_deref(), Some("s1"));
        assert_eq!(
            rec.timestamp.unwrap().to_rfc3339(),
            "2024-01-01T10:00:00.250+00:00"
        );
        assert_eq!(
            rec.message.unwrap().get(),
            r#"{"role":"user","content":"Hello"}"#
        );
    }

    #[test]
    fn test_record_unknown_type_is_other() {
        let rec = record(r#"{"type":"summary","summary":"Fixing tests","leafUuid":"abc"}"#);
        assert_eq!(rec.kind, RecordKind::Other);
        assert!(Message::from_record(rec).is_none());
    }

    #[test]
    fn test_from_record_requires_timestamp() {
        let rec = record(r#"{"uuid":"m1","type":"assistant","message":{}}"#);
        assert!(Message::from_record(rec).is_none());
    }

    #[test]
    fn test_from_record_drops_empty_session_id() {
        let rec = record(
            r#"{"uuid":"m1","sessionId":"","type":"user","timestamp":"2024-01-01T10:00:00Z"}"#,
        );
        let msg = Message::from_record(rec).unwrap();
        assert!(msg.session_id.is_none());
        assert_eq!(msg.kind, MessageType::User);
    }

    #[test]
    fn test_decode_content_degrades_on_mismatch() {
        let rec = record(
            r#"{"uuid":"m1","type":"assistant","timestamp":"2024-01-01T10:00:00Z","message":{"content":"not blocks"}}"#,
        );
        let mut msg = Message::from_record(rec).unwrap();
        assert!(msg.decode_content().is_err());
        assert!(msg.content.is_none());
    }

    #[test]
    fn test_message_type_roundtrip() {
        for kind in [MessageType::User, MessageType::Assistant] {
            let parsed: MessageType = kind.as_str().parse().unwrap();
            assert_eq!(parsed, kind);
            assert_eq!(
                serde_json::to_value(kind).unwrap().as_str().unwrap(),
                kind.to_string()
            );
        }
        assert!("system".parse::<MessageType>().is_err());
    }
}
