//! Wire types: turns, payloads, and conversation snapshots.
//!
//! Every payload is self-contained JSON; no payload references another.
//! Field names are camelCase on the wire; `kind` tags are snake_case.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// One side of a completed exchange. Function-argument only, never
/// persisted standalone.
#[derive(Debug, Clone)]
pub struct Turn {
    pub speaker_role: Role,
    pub text: String,
    pub conversation_id: String,
    pub character_name: String,
    pub timestamp: DateTime<Utc>,
}

/// A single entry of a full-conversation snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: Role,
    /// Display name of the speaker.
    pub name: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// One user/assistant exchange, forwarded in real time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    pub character: String,
    /// Empty when the conversation opened with the assistant.
    pub user_message: String,
    pub assistant_message: String,
    pub chat_id: String,
    pub timestamp: DateTime<Utc>,
}

/// A snapshot of an entire conversation, sent after a quiet period or
/// when switching away from the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullConversationPayload {
    pub character: String,
    pub chat_id: String,
    pub message_count: usize,
    /// Ordered oldest-first, system entries excluded.
    pub messages: Vec<ConversationMessage>,
    pub timestamp: DateTime<Utc>,
}

/// The unit of delivery, tagged by `kind` on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SyncPayload {
    Message(MessagePayload),
    FullConversation(FullConversationPayload),
}

impl SyncPayload {
    /// Build a message payload from a user/assistant turn pair.
    pub fn from_turns(user: &Turn, assistant: &Turn) -> Self {
        SyncPayload::Message(MessagePayload {
            character: assistant.character_name.clone(),
            user_message: user.text.clone(),
            assistant_message: assistant.text.clone(),
            chat_id: assistant.conversation_id.clone(),
            timestamp: assistant.timestamp,
        })
    }

    /// The conversation this payload belongs to.
    pub fn chat_id(&self) -> &str {
        match self {
            SyncPayload::Message(m) => &m.chat_id,
            SyncPayload::FullConversation(c) => &c.chat_id,
        }
    }
}
