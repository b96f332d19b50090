//! Turn extraction from host transcripts.

use crate::host::HistoryMessage;
use crate::payload::{Role, SyncPayload, Turn};

/// Extract the message payload for the exchange completed at `turn_index`.
///
/// The indexed entry must be the just-produced assistant message; the
/// nearest preceding user entry supplies the user half (empty when the
/// conversation opened with the assistant). Returns `None` (a no-op,
/// not an error) when the index is out of range, points at a
/// non-assistant entry, or the history holds fewer than two entries.
pub fn extract_exchange(
    history: &[HistoryMessage],
    turn_index: usize,
    chat_id: &str,
    character: &str,
) -> Option<SyncPayload> {
    if history.len() < 2 {
        return None;
    }
    let assistant_entry = history.get(turn_index)?;
    if assistant_entry.role != Role::Assistant {
        return None;
    }

    let user_text = history[..turn_index]
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .map(|m| m.text.clone())
        .unwrap_or_default();

    let user = Turn {
        speaker_role: Role::User,
        text: user_text,
        conversation_id: chat_id.to_string(),
        character_name: character.to_string(),
        timestamp: assistant_entry.timestamp,
    };
    let assistant = Turn {
        speaker_role: Role::Assistant,
        text: assistant_entry.text.clone(),
        conversation_id: chat_id.to_string(),
        character_name: character.to_string(),
        timestamp: assistant_entry.timestamp,
    };
    Some(SyncPayload::from_turns(&user, &assistant))
}
