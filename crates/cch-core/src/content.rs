//! Decoding of the polymorphic `message` payload.
//!
//! User payloads are either plain text or a list of tool results; assistant
//! payloads follow the Messages API response schema. The variant is chosen by
//! trial decoding in a fixed order, and anything that matches no known shape
//! stays undecoded.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::value::RawValue;
use thiserror::Error;

use crate::message::MessageType;

/// `userType` of messages typed by a person (as opposed to injected ones).
pub const EXTERNAL_USER_TYPE: &str = "external";

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed user payload: {0}")]
    User(#[source] serde_json::Error),
    #[error("malformed assistant payload: {0}")]
    Assistant(#[source] serde_json::Error),
}

/// Decoded message payload.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Content {
    UserText(UserText),
    ToolResults(Vec<ToolResult>),
    Assistant(AssistantMessage),
}

/// Plain text typed by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserText {
    pub role: String,
    #[serde(rename = "content")]
    pub text: String,
}

/// Result of a tool invocation, sent back as a user message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    #[serde(default)]
    pub tool_use_id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Tool output, kept verbatim (string or structured).
    pub content: Option<Box<RawValue>>,
}

/// An assistant response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantMessage {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl AssistantMessage {
    /// Concatenated text blocks.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn tool_use_count(&self) -> usize {
        self.content
            .iter()
            .filter(|b| matches!(b, ContentBlock::ToolUse { .. }))
            .count()
    }
}

/// Token counters reported with an assistant response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub cache_creation_input_tokens: u64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub cache_read_input_tokens: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_tier: Option<String>,
}

impl Usage {
    /// Input tokens including cache reads.
    pub const fn total_input_tokens(&self) -> u64 {
        self.input_tokens
            .saturating_add(self.cache_read_input_tokens)
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(n: &u64) -> bool {
    *n == 0
}

/// One structured unit of an assistant message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "BlockRecord", into = "BlockRecord")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    Thinking {
        thinking: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Option<Box<RawValue>>,
    },
    /// Any block type not modelled above (`image`, `redacted_thinking`, ...).
    Other {
        kind: String,
        text: Option<String>,
    },
}

impl ContentBlock {
    /// The wire `type` tag.
    pub fn kind(&self) -> &str {
        match self {
            Self::Text { .. } => "text",
            Self::Thinking { .. } => "thinking",
            Self::ToolUse { .. } => "tool_use",
            Self::Other { kind, .. } => kind,
        }
    }
}

/// Flat wire shape of a content block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct BlockRecord {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thinking: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    input: Option<Box<RawValue>>,
}

impl From<BlockRecord> for ContentBlock {
    fn from(raw: BlockRecord) -> Self {
        match raw.kind.as_str() {
            "text" => Self::Text {
                text: raw.text.unwrap_or_default(),
            },
            "thinking" => Self::Thinking {
                thinking: raw.thinking.unwrap_or_default(),
            },
            "tool_use" => Self::ToolUse {
                id: raw.id.unwrap_or_default(),
                name: raw.name.unwrap_or_default(),
                input: raw.input,
            },
            _ => Self::Other {
                kind: raw.kind,
                text: raw.text,
            },
        }
    }
}

impl From<ContentBlock> for BlockRecord {
    fn from(block: ContentBlock) -> Self {
        match block {
            ContentBlock::Text { text } => Self {
                kind: "text".to_string(),
                text: Some(text),
                ..Self::default()
            },
            ContentBlock::Thinking { thinking } => Self {
                kind: "thinking".to_string(),
                thinking: Some(thinking),
                ..Self::default()
            },
            ContentBlock::ToolUse { id, name, input } => Self {
                kind: "tool_use".to_string(),
                id: Some(id),
                name: Some(name),
                input,
                ..Self::default()
            },
            ContentBlock::Other { kind, text } => Self {
                kind,
                text,
                ..Self::default()
            },
        }
    }
}

/// Envelope of a user payload; `content` is decoded in a second step.
///
/// An explicit `null` is kept as a raw value so it can decode as empty text;
/// only a missing key is `None`.
#[derive(Debug, Deserialize)]
struct UserEnvelope {
    #[serde(default)]
    role: String,
    #[serde(default, deserialize_with = "present_raw")]
    content: Option<Box<RawValue>>,
}

fn present_raw<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Box<RawValue>>, D::Error> {
    Box::<RawValue>::deserialize(deserializer).map(Some)
}

impl Content {
    /// Decode a message payload according to the message role.
    ///
    /// `Ok(None)` means the payload is valid JSON of an unknown shape (or is
    /// absent); `Err` means the envelope itself did not decode.
    pub fn decode(
        kind: MessageType,
        user_type: Option<&str>,
        payload: Option<&RawValue>,
    ) -> Result<Option<Self>, DecodeError> {
        let Some(payload) = payload else {
            return Ok(None);
        };

        match kind {
            MessageType::User if user_type == Some(EXTERNAL_USER_TYPE) => {
                let envelope: UserEnvelope =
                    serde_json::from_str(payload.get()).map_err(DecodeError::User)?;
                Ok(envelope
                    .content
                    .and_then(|content| decode_user_content(envelope.role, &content)))
            }
            MessageType::User => Ok(None),
            MessageType::Assistant => {
                let msg: AssistantMessage =
                    serde_json::from_str(payload.get()).map_err(DecodeError::Assistant)?;
                Ok(Some(Self::Assistant(msg)))
            }
        }
    }
}

/// Trial-decode user content: plain text (or `null`, as empty text) first,
/// then a list of tool-result objects with every field optional.
fn decode_user_content(role: String, content: &RawValue) -> Option<Content> {
    if let Ok(text) = serde_json::from_str::<Option<String>>(content.get()) {
        return Some(Content::UserText(UserText {
            role,
            text: text.unwrap_or_default(),
        }));
    }
    serde_json::from_str::<Vec<ToolResult>>(content.get())
        .ok()
        .map(Content::ToolResults)
}
