//! Session aggregation.

use std::iter::Sum;
use std::ops::Add;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::message::{Message, MessageType};

/// Token totals over a set of assistant messages.
///
/// `input` includes cache-read input tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TokenUsage {
    pub input: u64,
    pub output: u64,
}

impl TokenUsage {
    pub const fn total(&self) -> u64 {
        self.input.saturating_add(self.output)
    }

    pub const fn is_empty(&self) -> bool {
        self.input == 0 && self.output == 0
    }
}

impl Add for TokenUsage {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            input: self.input.saturating_add(rhs.input),
            output: self.output.saturating_add(rhs.output),
        }
    }
}

impl Sum for TokenUsage {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// One conversation, backed by one session file.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Taken from the first record that carries one.
    pub id: Option<String>,
    /// Encoded name of the owning project; set by `Project::add_session`.
    pub project_id: String,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    messages: Vec<Message>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message, keeping the time bounds current.
    pub fn append(&mut self, message: Message) {
        let ts = message.timestamp;
        if self.start_time.is_none_or(|start| ts < start) {
            self.start_time = Some(ts);
        }
        if self.end_time.is_none_or(|end| ts > end) {
            self.end_time = Some(ts);
        }
        if self.id.is_none() {
            self.id.clone_from(&message.session_id);
        }
        self.messages.push(message);
    }

    /// Earliest message timestamp.
    pub const fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    /// Latest message timestamp.
    pub const fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    /// Messages in file order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Session id, or `"unknown"` when no record carried one.
    pub fn display_id(&self) -> &str {
        self.id.as_deref().unwrap_or("unknown")
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn user_message_count(&self) -> usize {
        self.count_of(MessageType::User)
    }

    pub fn assistant_message_count(&self) -> usize {
        self.count_of(MessageType::Assistant)
    }

    fn count_of(&self, kind: MessageType) -> usize {
        self.messages.iter().filter(|m| m.kind == kind).count()
    }

    /// `end - start`, zero unless both bounds are known.
    pub fn duration(&self) -> TimeDelta {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => end - start,
            _ => TimeDelta::zero(),
        }
    }

    /// Token totals over assistant messages with decoded usage.
    pub fn token_usage(&self) -> TokenUsage {
        self.messages
            .iter()
            .filter(|m| m.kind == MessageType::Assistant)
            .filter_map(|m| m.assistant().and_then(|a| a.usage.as_ref()))
            .map(|usage| TokenUsage {
                input: usage.total_input_tokens(),
                output: usage.output_tokens,
            })
            .sum()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::content::{AssistantMessage, Content, Usage};
    use chrono::TimeZone;

    pub(crate) fn message(uuid: &str, kind: MessageType, ts: DateTime<Utc>) -> Message {
        Message {
            uuid: uuid.to_string(),
            parent_uuid: None,
            session_id: Some("test-session".to_string()),
            kind,
            user_type: None,
            timestamp: ts,
            request_id: None,
            version: None,
            cwd: None,
            payload: None,
            content: None,
        }
    }

    pub(crate) fn assistant_with_usage(
        uuid: &str,
        ts: DateTime<Utc>,
        input: u64,
        output: u64,
        cache_read: u64,
    ) -> Message {
        let mut msg = message(uuid, MessageType::Assistant, ts);
        msg.content = Some(Content::Assistant(AssistantMessage {
            id: format!("msg_{uuid}"),
            kind: "message".to_string(),
            role: "assistant".to_string(),
            model: "claude-3".to_string(),
            content: Vec::new(),
            usage: Some(Usage {
                input_tokens: input,
                output_tokens: output,
                cache_read_input_tokens: cache_read,
                ..Usage::default()
            }),
        }));
        msg
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 14, h, m, 0).unwrap()
    }

    #[test]
    fn test_session_operations() {
        let mut session = Session::new();
        session.append(message("msg1", MessageType::User, at(10, 0)));
        session.append(assistant_with_usage("msg2", at(10, 5), 10, 20, 0));
        session.append(message("msg3", MessageType::User, at(10, 10)));

        assert_eq!(session.message_count(), 3);
        assert_eq!(session.user_message_count(), 2);
        assert_eq!(session.assistant_message_count(), 1);
        assert_eq!(session.start_time(), Some(at(10, 0)));
        assert_eq!(session.end_time(), Some(at(10, 10)));
        assert_eq!(session.duration(), TimeDelta::minutes(10));
        assert_eq!(
            session.token_usage(),
            TokenUsage {
                input: 10,
                output: 20
            }
        );
        assert_eq!(session.id.as_deref(), Some("test-session"));
    }

    #[test]
    fn test_bounds_track_min_and_max_out_of_order() {
        let mut session = Session::new();
        session.append(message("a", MessageType::User, at(12, 0)));
        session.append(message("b", MessageType::Assistant, at(9, 30)));
        session.append(message("c", MessageType::User, at(15, 45)));
        session.append(message("d", MessageType::Assistant, at(11, 0)));

        let timestamps: Vec<_> = session.messages().iter().map(|m| m.timestamp).collect();
        assert_eq!(session.start_time(), timestamps.iter().min().copied());
        assert_eq!(session.end_time(), timestamps.iter().max().copied());
        // Append order is preserved.
        let ids: Vec<_> = session.messages().iter().map(|m| m.uuid.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c", "d"]);
    }

    #[test]
    fn test_empty_session() {
        let session = Session::new();
        assert_eq!(session.message_count(), 0);
        assert!(session.start_time().is_none());
        assert!(session.end_time().is_none());
        assert_eq!(session.duration(), TimeDelta::zero());
        assert_eq!(session.token_usage(), TokenUsage::default());
        assert_eq!(session.display_id(), "unknown");
    }

    #[test]
    fn test_token_usage_includes_cache_reads_and_skips_undecoded() {
        let mut session = Session::new();
        session.append(assistant_with_usage("a", at(10, 0), 100, 50, 25));
        session.append(assistant_with_usage("b", at(10, 1), 5, 10, 0));
        // Assistant message without decoded content contributes nothing.
        session.append(message("c", MessageType::Assistant, at(10, 2)));

        let usage = session.token_usage();
        assert_eq!(usage.input, 130);
        assert_eq!(usage.output, 60);
        assert_eq!(usage.total(), 190);
    }

    #[test]
    fn test_token_usage_saturates() {
        let mut session = Session::new();
        session.append(assistant_with_usage("a", at(10, 0), u64::MAX - 1, u64::MAX, 5));
        session.append(assistant_with_usage("b", at(10, 1), 7, 3, 0));

        let usage = session.token_usage();
        assert_eq!(usage.input, u64::MAX);
        assert_eq!(usage.output, u64::MAX);
        assert_eq!(usage.total(), u64::MAX);
    }

    #[test]
    fn test_session_id_from_first_record_carrying_one() {
        let mut session = Session::new();
        let mut first = message("a", MessageType::User, at(10, 0));
        first.session_id = None;
        let mut second = message("b", MessageType::User, at(10, 1));
        second.session_id = Some("s-2".to_string());
        let mut third = message("c", MessageType::User, at(10, 2));
        third.session_id = Some("s-3".to_string());

        session.append(first);
        session.append(second);
        session.append(third);
        assert_eq!(session.id.as_deref(), Some("s-2"));
    }
}
