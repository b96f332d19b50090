//! Duplicate suppression: content fingerprints and the bounded set
//! behind them.
//!
//! Fingerprints are intentionally lossy (fixed-length text prefixes):
//! enough to catch exact re-delivery from a duplicate host event without
//! hashing entire conversations.

use std::collections::VecDeque;

use crate::config::{FINGERPRINT_CAPACITY, FINGERPRINT_PREFIX_CHARS};
use crate::payload::SyncPayload;

/// Compute the suppression fingerprint for a payload.
///
/// Message and full-conversation payloads hash under distinct namespaces,
/// so similar text can never collide across kinds. A snapshot fingerprint
/// covers only the message count and the last message's text: edits to
/// older messages don't retrigger a sync.
pub fn fingerprint(payload: &SyncPayload) -> String {
    let identity = match payload {
        SyncPayload::Message(m) => format!(
            "msg:{}:{}:{}",
            m.chat_id,
            prefix(&m.user_message),
            prefix(&m.assistant_message),
        ),
        SyncPayload::FullConversation(c) => {
            let last = c.messages.last().map(|m| m.content.as_str()).unwrap_or("");
            format!("conv:{}:{}:{}", c.chat_id, c.message_count, prefix(last))
        }
    };
    blake3::hash(identity.as_bytes()).to_hex().to_string()
}

/// First `FINGERPRINT_PREFIX_CHARS` characters, on a char boundary.
fn prefix(text: &str) -> &str {
    match text.char_indices().nth(FINGERPRINT_PREFIX_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Bounded, insertion-ordered set of recently queued fingerprints.
///
/// Insertion order is recency; eviction is oldest-first once over
/// capacity. The serialized form is a plain list, most-recent-last.
#[derive(Debug)]
pub struct FingerprintSet {
    entries: VecDeque<String>,
    capacity: usize,
}

impl FingerprintSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
        }
    }

    /// Rebuild from a persisted list, most-recent-last. Entries beyond
    /// capacity are evicted oldest-first on load.
    pub fn from_entries(entries: Vec<String>, capacity: usize) -> Self {
        let mut set = Self::new(capacity);
        for fp in entries {
            set.insert(fp);
        }
        set
    }

    pub fn contains(&self, fp: &str) -> bool {
        self.entries.iter().any(|e| e == fp)
    }

    /// Insert a fingerprint, evicting the oldest past capacity.
    /// Returns false without mutating when it is already present.
    pub fn insert(&mut self, fp: String) -> bool {
        if self.contains(&fp) {
            return false;
        }
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(fp);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot for persistence, most-recent-last.
    pub fn to_entries(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }
}

impl Default for FingerprintSet {
    fn default() -> Self {
        Self::new(FINGERPRINT_CAPACITY)
    }
}

/// Stateful suppression filter over a [`FingerprintSet`].
#[derive(Debug, Default)]
pub struct DedupFilter {
    set: FingerprintSet,
}

impl DedupFilter {
    pub fn new(set: FingerprintSet) -> Self {
        Self { set }
    }

    /// Whether `payload` was already queued for delivery.
    ///
    /// Records the fingerprint on first sight. When `enabled` is false
    /// the filter neither suppresses nor records anything.
    pub fn should_suppress(&mut self, payload: &SyncPayload, enabled: bool) -> bool {
        if !enabled {
            return false;
        }
        let fp = fingerprint(payload);
        if !self.set.insert(fp) {
            tracing::debug!("axon: duplicate payload suppressed");
            return true;
        }
        false
    }

    pub fn fingerprints(&self) -> &FingerprintSet {
        &self.set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{ConversationMessage, FullConversationPayload, MessagePayload, Role};
    use chrono::Utc;

    fn message(user: &str, assistant: &str) -> SyncPayload {
        SyncPayload::Message(MessagePayload {
            character: "Aria".into(),
            user_message: user.into(),
            assistant_message: assistant.into(),
            chat_id: "chat-1".into(),
            timestamp: Utc::now(),
        })
    }

    fn snapshot(contents: &[&str]) -> SyncPayload {
        SyncPayload::FullConversation(FullConversationPayload {
            character: "Aria".into(),
            chat_id: "chat-1".into(),
            message_count: contents.len(),
            messages: contents
                .iter()
                .map(|c| ConversationMessage {
                    role: Role::Assistant,
                    name: "Aria".into(),
                    content: (*c).into(),
                    timestamp: Utc::now(),
                })
                .collect(),
            timestamp: Utc::now(),
        })
    }

    #[test]
    fn same_content_same_fingerprint() {
        assert_eq!(
            fingerprint(&message("hi", "hello")),
            fingerprint(&message("hi", "hello"))
        );
    }

    #[test]
    fn kinds_never_collide() {
        // A one-message snapshot and a message over the same text must
        // fingerprint differently.
        assert_ne!(
            fingerprint(&message("", "hello")),
            fingerprint(&snapshot(&["hello"]))
        );
    }

    #[test]
    fn snapshot_fingerprint_ignores_older_edits() {
        let a = snapshot(&["first", "second", "last"]);
        let b = snapshot(&["first EDITED", "second", "last"]);
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn snapshot_fingerprint_tracks_growth() {
        let a = snapshot(&["first", "last"]);
        let b = snapshot(&["first", "last", "newer"]);
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn prefix_respects_multibyte_boundaries() {
        let text = "é".repeat(FINGERPRINT_PREFIX_CHARS + 10);
        assert_eq!(prefix(&text).chars().count(), FINGERPRINT_PREFIX_CHARS);
    }

    #[test]
    fn filter_suppresses_second_sighting() {
        let mut filter = DedupFilter::default();
        assert!(!filter.should_suppress(&message("hi", "hello"), true));
        assert!(filter.should_suppress(&message("hi", "hello"), true));
        assert_eq!(filter.fingerprints().len(), 1);
    }

    #[test]
    fn disabled_filter_never_suppresses_or_records() {
        let mut filter = DedupFilter::default();
        assert!(!filter.should_suppress(&message("hi", "hello"), false));
        assert!(!filter.should_suppress(&message("hi", "hello"), false));
        assert!(filter.fingerprints().is_empty());
    }

    #[test]
    fn set_evicts_oldest_over_capacity() {
        let mut set = FingerprintSet::new(2);
        set.insert("a".into());
        set.insert("b".into());
        set.insert("c".into());
        assert_eq!(set.len(), 2);
        assert!(!set.contains("a"));
        assert!(set.contains("b"));
        assert!(set.contains("c"));
    }
}
