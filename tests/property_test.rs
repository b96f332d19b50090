//! Property tests for the bounded collections and fingerprinting.

use chrono::Utc;
use proptest::prelude::*;

use axon::config::FINGERPRINT_CAPACITY;
use axon::dedup::{fingerprint, FingerprintSet};
use axon::payload::{MessagePayload, SyncPayload};
use axon::queue::OfflineQueue;

fn numbered_payload(i: usize) -> SyncPayload {
    SyncPayload::Message(MessagePayload {
        character: "Aria".into(),
        user_message: format!("question {i}"),
        assistant_message: format!("answer {i}"),
        chat_id: "chat-1".into(),
        timestamp: Utc::now(),
    })
}

fn payload_index(payload: &SyncPayload) -> usize {
    match payload {
        SyncPayload::Message(m) => m
            .assistant_message
            .strip_prefix("answer ")
            .unwrap()
            .parse()
            .unwrap(),
        _ => unreachable!(),
    }
}

proptest! {
    #[test]
    fn queue_never_exceeds_capacity(pushes in 0usize..300, capacity in 1usize..50) {
        let mut queue = OfflineQueue::new(capacity);
        for i in 0..pushes {
            queue.push(numbered_payload(i));
        }
        prop_assert_eq!(queue.len(), pushes.min(capacity));
    }

    #[test]
    fn queue_retains_the_most_recent_entries(pushes in 1usize..300, capacity in 1usize..50) {
        let mut queue = OfflineQueue::new(capacity);
        for i in 0..pushes {
            queue.push(numbered_payload(i));
        }
        // The survivors are exactly the last min(pushes, capacity)
        // payloads, oldest-first.
        let kept = queue.len();
        let first_kept = pushes - kept;
        let mut expected = first_kept;
        while let Some(payload) = queue.pop_front() {
            prop_assert_eq!(payload_index(&payload), expected);
            expected += 1;
        }
        prop_assert_eq!(expected, pushes);
    }

    #[test]
    fn fingerprint_set_is_bounded_and_duplicate_free(
        entries in proptest::collection::vec("[a-f0-9]{8}", 0..700)
    ) {
        let mut set = FingerprintSet::default();
        for fp in &entries {
            set.insert(fp.clone());
        }
        prop_assert!(set.len() <= FINGERPRINT_CAPACITY);

        let snapshot = set.to_entries();
        let mut unique = snapshot.clone();
        unique.sort();
        unique.dedup();
        prop_assert_eq!(unique.len(), snapshot.len());
    }

    #[test]
    fn reinserting_a_present_fingerprint_never_mutates(fp in "[a-f0-9]{16}") {
        let mut set = FingerprintSet::default();
        prop_assert!(set.insert(fp.clone()));
        let before = set.to_entries();
        prop_assert!(!set.insert(fp));
        prop_assert_eq!(set.to_entries(), before);
    }

    #[test]
    fn fingerprints_are_deterministic(user in ".{0,200}", assistant in ".{0,200}") {
        let a = SyncPayload::Message(MessagePayload {
            character: "Aria".into(),
            user_message: user.clone(),
            assistant_message: assistant.clone(),
            chat_id: "chat-1".into(),
            timestamp: Utc::now(),
        });
        let b = SyncPayload::Message(MessagePayload {
            character: "Aria".into(),
            user_message: user,
            assistant_message: assistant,
            chat_id: "chat-1".into(),
            timestamp: Utc::now(),
        });
        // Timestamps differ; identity fields alone drive the digest.
        prop_assert_eq!(fingerprint(&a), fingerprint(&b));
    }
}
