//! The host application seam: transcript access and user notifications.

use chrono::{DateTime, Utc};

use crate::payload::Role;

/// One entry of the host's in-memory transcript.
#[derive(Debug, Clone)]
pub struct HistoryMessage {
    pub role: Role,
    /// Display name of the speaker.
    pub name: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Severity of a user-visible notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyKind {
    Success,
    Warning,
    Error,
}

/// What the core needs from the embedding chat application.
///
/// The embedder implements this and wires host events to the engine's
/// handlers. The core never registers hooks itself; waiting for the
/// host to become ready before wiring them is the embedder's duty.
pub trait ChatHost {
    /// The active conversation's transcript, oldest-first.
    fn conversation_history(&self) -> Vec<HistoryMessage>;

    fn active_character_name(&self) -> String;

    fn active_conversation_id(&self) -> String;

    /// Show an ephemeral notification. Best-effort: the core never
    /// depends on it succeeding.
    fn notify(&self, kind: NotifyKind, message: &str);
}
