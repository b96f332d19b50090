//! Idle-triggered aggregation: deadline debounce and conversation
//! snapshots.

use chrono::{DateTime, Duration, Utc};

use crate::host::HistoryMessage;
use crate::payload::{ConversationMessage, FullConversationPayload, Role, SyncPayload};

/// A single rearm-by-replacement deadline.
///
/// Armed means a full-conversation sync is pending; disarmed means no
/// deadline exists. Rearming overwrites any previous deadline, so at
/// most one countdown can exist. The embedder polls [`fire_due`]
/// from its loop; firing disarms.
///
/// [`fire_due`]: IdleTimer::fire_due
#[derive(Debug, Default)]
pub struct IdleTimer {
    deadline: Option<DateTime<Utc>>,
}

impl IdleTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or rearm) the deadline `quiet_period` from `now`.
    pub fn arm(&mut self, now: DateTime<Utc>, quiet_period: Duration) {
        self.deadline = Some(now + quiet_period);
    }

    /// Drop any pending deadline.
    pub fn disarm(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Consume the deadline if it has passed. At most one fire per arm.
    pub fn fire_due(&mut self, now: DateTime<Utc>) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Build a full-conversation snapshot from a transcript, excluding
/// system entries. Returns `None` for an effectively empty conversation.
pub fn build_snapshot(
    history: &[HistoryMessage],
    chat_id: &str,
    character: &str,
    now: DateTime<Utc>,
) -> Option<SyncPayload> {
    let messages: Vec<ConversationMessage> = history
        .iter()
        .filter(|m| m.role != Role::System)
        .map(|m| ConversationMessage {
            role: m.role,
            name: m.name.clone(),
            content: m.text.clone(),
            timestamp: m.timestamp,
        })
        .collect();
    if messages.is_empty() {
        return None;
    }
    Some(SyncPayload::FullConversation(FullConversationPayload {
        character: character.to_string(),
        chat_id: chat_id.to_string(),
        message_count: messages.len(),
        messages,
        timestamp: now,
    }))
}
