//! SyncEngine — pipeline orchestration: turn handling, delivery, offline
//! buffering, flush, and the idle full-conversation sync.

use chrono::{DateTime, Utc};

use crate::adapter;
use crate::config::{SyncSettings, FINGERPRINT_CAPACITY};
use crate::dedup::{DedupFilter, FingerprintSet};
use crate::errors::DeliveryError;
use crate::host::{ChatHost, HistoryMessage, NotifyKind};
use crate::idle::{self, IdleTimer};
use crate::payload::SyncPayload;
use crate::queue::OfflineQueue;
use crate::store::{self, StateStore, KEY_FINGERPRINTS, KEY_QUEUE, KEY_SETTINGS};
use crate::transport::Transport;

/// What became of one payload handed to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// Accepted by the endpoint.
    Delivered,
    /// Identical content was already queued for delivery.
    Suppressed,
    /// Delivery failed; the payload sits in the offline queue.
    Buffered,
    /// Delivery failed and buffering is disabled.
    Dropped,
}

/// Result of one offline-queue flush pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlushReport {
    /// Payloads accepted by the endpoint during this pass.
    pub flushed: usize,
    /// Payloads still queued after this pass.
    pub remaining: usize,
}

/// Orchestrates the sync pipeline.
///
/// Owns every piece of mutable state (settings, fingerprint set,
/// offline queue, idle deadline) and is driven entirely by the
/// embedder: host event handlers plus a `tick` poll. Takes `&mut self`
/// throughout; an embedder using OS threads must wrap it in a mutex or
/// actor boundary.
pub struct SyncEngine {
    settings: SyncSettings,
    dedup: DedupFilter,
    queue: OfflineQueue,
    idle: IdleTimer,
    transport: Box<dyn Transport>,
    store: Box<dyn StateStore>,
    tracked_chat_id: Option<String>,
    tracked_character: String,
    /// Last observed transcript, kept so a conversation switch can flush
    /// the departing conversation after the host has already moved on.
    last_history: Vec<HistoryMessage>,
}

impl SyncEngine {
    /// Construct the engine, restoring settings, fingerprints, and the
    /// offline queue from the store. A corrupt record resets to its
    /// default without blocking startup.
    pub fn new(transport: Box<dyn Transport>, store: Box<dyn StateStore>) -> Self {
        let mut settings: SyncSettings = store::load_or_default(store.as_ref(), KEY_SETTINGS);
        settings.clamp();
        let fingerprints: Vec<String> = store::load_or_default(store.as_ref(), KEY_FINGERPRINTS);
        let queued: Vec<SyncPayload> = store::load_or_default(store.as_ref(), KEY_QUEUE);
        let dedup = DedupFilter::new(FingerprintSet::from_entries(
            fingerprints,
            FINGERPRINT_CAPACITY,
        ));
        let queue = OfflineQueue::from_entries(queued, settings.max_buffer_size);
        tracing::info!(
            "axon: engine ready, {} fingerprints, {} queued payloads",
            dedup.fingerprints().len(),
            queue.len()
        );
        Self {
            settings,
            dedup,
            queue,
            idle: IdleTimer::new(),
            transport,
            store,
            tracked_chat_id: None,
            tracked_character: String::new(),
            last_history: Vec::new(),
        }
    }

    // ── host event handlers ──────────────────────────────────

    /// Handle a completed turn at `turn_index` in the host transcript.
    ///
    /// A no-op (never an error) when the index doesn't name a fresh
    /// assistant message. Every emitted exchange rearms the idle
    /// deadline; the exchange itself is forwarded only on the real-time
    /// path.
    pub fn handle_turn_completed(&mut self, host: &dyn ChatHost, turn_index: usize) {
        let chat_id = host.active_conversation_id();
        let character = host.active_character_name();
        // Snapshot every notification, emitted or not: a conversation
        // switch flushes the departing chat from this.
        self.last_history = host.conversation_history();
        if self.tracked_chat_id.is_none() {
            self.tracked_chat_id = Some(chat_id.clone());
        }
        self.tracked_character = character.clone();

        if !self.settings.enabled {
            return;
        }
        let Some(payload) =
            adapter::extract_exchange(&self.last_history, turn_index, &chat_id, &character)
        else {
            return;
        };
        self.rearm_idle(Utc::now());
        if self.settings.realtime_sync {
            let outcome = self.deliver(host, payload);
            tracing::debug!("axon: turn delivery: {outcome:?}");
        }
    }

    /// Handle the host switching to another conversation.
    ///
    /// The departing conversation gets one full snapshot sync, built
    /// from the transcript observed at its last turn, before tracking
    /// moves on. A chat is therefore flushed at the moment of switching
    /// away regardless of the idle timeout.
    pub fn handle_conversation_switched(&mut self, host: &dyn ChatHost) {
        let new_chat_id = host.active_conversation_id();
        if let Some(prev_id) = self.tracked_chat_id.take() {
            if prev_id != new_chat_id
                && self.settings.enabled
                && self.settings.full_conversation_sync
            {
                let character = self.tracked_character.clone();
                if let Some(snapshot) =
                    idle::build_snapshot(&self.last_history, &prev_id, &character, Utc::now())
                {
                    tracing::info!("axon: flushing conversation {prev_id} on switch");
                    self.submit_snapshot(host, snapshot);
                }
            }
        }
        self.tracked_chat_id = Some(new_chat_id);
        self.tracked_character = host.active_character_name();
        self.last_history = host.conversation_history();
        self.rearm_idle(Utc::now());
    }

    /// Poll the idle deadline. The embedder calls this from its loop;
    /// when the quiet period has elapsed, one full-conversation snapshot
    /// of the active chat is submitted.
    pub fn tick(&mut self, host: &dyn ChatHost, now: DateTime<Utc>) {
        if !self.idle.fire_due(now) {
            return;
        }
        if !self.settings.enabled || !self.settings.full_conversation_sync {
            return;
        }
        let chat_id = host.active_conversation_id();
        let character = host.active_character_name();
        self.last_history = host.conversation_history();
        if self.tracked_chat_id.is_none() {
            self.tracked_chat_id = Some(chat_id.clone());
        }
        let Some(snapshot) = idle::build_snapshot(&self.last_history, &chat_id, &character, now)
        else {
            return;
        };
        tracing::debug!("axon: idle deadline elapsed for {chat_id}");
        self.submit_snapshot(host, snapshot);
    }

    // ── delivery ─────────────────────────────────────────────

    /// Deliver one payload now.
    ///
    /// Message payloads pass through the dedup filter first; snapshots
    /// are suppressed by their own key before reaching here. Failures
    /// land in the offline queue; callers observe an outcome, never an
    /// error.
    pub fn deliver(&mut self, host: &dyn ChatHost, payload: SyncPayload) -> DeliveryOutcome {
        if matches!(payload, SyncPayload::Message(_)) {
            if self
                .dedup
                .should_suppress(&payload, self.settings.dedup_enabled)
            {
                return DeliveryOutcome::Suppressed;
            }
            if self.settings.dedup_enabled {
                self.persist_fingerprints();
            }
        }
        self.attempt(host, payload)
    }

    /// Drain the offline queue oldest-first through the transport.
    ///
    /// A transport-level failure stops the pass (assume still offline),
    /// retaining the failed entry and everything untried in original
    /// order. An HTTP rejection retains that one item and the pass
    /// continues. Queued payloads skip the dedup filter: they were
    /// filtered when first queued.
    pub fn flush(&mut self, host: &dyn ChatHost) -> FlushReport {
        let mut retained: Vec<SyncPayload> = Vec::new();
        let mut flushed = 0usize;
        while let Some(payload) = self.queue.pop_front() {
            match self
                .transport
                .post_json(&self.settings.endpoint_url, &payload)
            {
                Ok(()) => flushed += 1,
                Err(DeliveryError::Rejected { status, .. }) => {
                    tracing::debug!(
                        "axon: endpoint rejected queued payload (HTTP {status}), keeping it"
                    );
                    retained.push(payload);
                }
                Err(DeliveryError::Network { reason }) => {
                    tracing::debug!("axon: still offline during flush: {reason}");
                    retained.push(payload);
                    break;
                }
            }
        }
        self.queue.restore_front(retained);

        let report = FlushReport {
            flushed,
            remaining: self.queue.len(),
        };
        if report.flushed > 0 {
            self.settings.last_sync_time = Some(Utc::now());
            self.persist_settings();
        }
        self.persist_queue();
        if report.remaining == 0 && report.flushed > 0 {
            tracing::info!("axon: flushed {} buffered payloads", report.flushed);
            if self.settings.notify_on_success {
                host.notify(
                    NotifyKind::Success,
                    &format!("Flushed {} buffered sync payloads", report.flushed),
                );
            }
        }
        report
    }

    /// Dedup a full-conversation snapshot by its own key, then deliver.
    fn submit_snapshot(&mut self, host: &dyn ChatHost, snapshot: SyncPayload) {
        if self
            .dedup
            .should_suppress(&snapshot, self.settings.dedup_enabled)
        {
            tracing::debug!("axon: unchanged conversation snapshot, skipping");
            return;
        }
        if self.settings.dedup_enabled {
            self.persist_fingerprints();
        }
        let outcome = self.attempt(host, snapshot);
        tracing::debug!("axon: snapshot delivery: {outcome:?}");
    }

    /// One transport attempt plus the success/failure bookkeeping shared
    /// by the real-time and snapshot paths.
    fn attempt(&mut self, host: &dyn ChatHost, payload: SyncPayload) -> DeliveryOutcome {
        match self
            .transport
            .post_json(&self.settings.endpoint_url, &payload)
        {
            Ok(()) => {
                self.settings.last_sync_time = Some(Utc::now());
                self.persist_settings();
                if self.settings.notify_on_success {
                    host.notify(NotifyKind::Success, "Memory sync complete");
                }
                // Reachability confirmed: drain anything buffered.
                if !self.queue.is_empty() {
                    let report = self.flush(host);
                    tracing::debug!("axon: post-delivery flush: {report:?}");
                }
                DeliveryOutcome::Delivered
            }
            Err(e) => {
                tracing::debug!("axon: delivery failed: {e}");
                if self.settings.notify_on_error {
                    host.notify(NotifyKind::Error, &format!("Memory sync failed: {e}"));
                }
                if self.settings.offline_buffer_enabled {
                    self.queue.push(payload);
                    self.persist_queue();
                    DeliveryOutcome::Buffered
                } else {
                    DeliveryOutcome::Dropped
                }
            }
        }
    }

    // ── settings & introspection ─────────────────────────────

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Replace the settings, clamping invalid values, resizing the
    /// offline queue, and persisting the result.
    pub fn update_settings(&mut self, mut settings: SyncSettings) {
        settings.clamp();
        self.queue.set_max_size(settings.max_buffer_size);
        if !settings.enabled || !settings.full_conversation_sync {
            self.idle.disarm();
        }
        self.settings = settings;
        self.persist_settings();
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn fingerprint_count(&self) -> usize {
        self.dedup.fingerprints().len()
    }

    pub fn idle_armed(&self) -> bool {
        self.idle.is_armed()
    }

    fn rearm_idle(&mut self, now: DateTime<Utc>) {
        if self.settings.enabled && self.settings.full_conversation_sync {
            self.idle.arm(now, self.settings.idle_timeout());
        } else {
            self.idle.disarm();
        }
    }

    // ── persistence (best-effort) ────────────────────────────

    fn persist_settings(&self) {
        store::persist(self.store.as_ref(), KEY_SETTINGS, &self.settings);
    }

    fn persist_fingerprints(&self) {
        store::persist(
            self.store.as_ref(),
            KEY_FINGERPRINTS,
            &self.dedup.fingerprints().to_entries(),
        );
    }

    fn persist_queue(&self) {
        store::persist(self.store.as_ref(), KEY_QUEUE, &self.queue.to_entries());
    }
}
