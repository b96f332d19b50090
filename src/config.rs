//! Sync settings: defaults, merge-on-load, and clamping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Single source of truth for all default values.
pub const DEFAULT_ENDPOINT_URL: &str = "http://localhost:3000/api/memory/ingest";
pub const DEFAULT_IDLE_TIMEOUT_MINUTES: u64 = 5;
pub const DEFAULT_MAX_BUFFER_SIZE: usize = 100;
/// Most recent fingerprints retained for duplicate suppression.
pub const FINGERPRINT_CAPACITY: usize = 500;
/// Fixed-length text prefix hashed into a fingerprint.
pub const FINGERPRINT_PREFIX_CHARS: usize = 80;

/// Runtime configuration for the sync pipeline.
///
/// Deserializing a partial blob backfills missing keys from the defaults,
/// so settings persisted by an older version load cleanly. Persisted and
/// exchanged with the host UI as camelCase JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncSettings {
    /// Master switch for the whole pipeline.
    pub enabled: bool,
    /// Memory-ingestion endpoint receiving the POSTs.
    pub endpoint_url: String,
    /// Forward each completed turn as it happens.
    pub realtime_sync: bool,
    /// Send a full-conversation snapshot after a quiet period.
    pub full_conversation_sync: bool,
    /// Quiet period before a full-conversation snapshot, in minutes. Min 1.
    pub idle_timeout_minutes: u64,
    /// Buffer failed deliveries for a later flush.
    pub offline_buffer_enabled: bool,
    /// Offline buffer capacity. The oldest entry is dropped past this. Min 1.
    pub max_buffer_size: usize,
    /// Suppress re-delivery of already-sent content.
    pub dedup_enabled: bool,
    /// Notify the user on successful delivery.
    pub notify_on_success: bool,
    /// Notify the user on failed delivery. Off so an unreachable endpoint
    /// doesn't produce a toast per turn.
    pub notify_on_error: bool,
    /// Timestamp of the last successful delivery.
    pub last_sync_time: Option<DateTime<Utc>>,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint_url: DEFAULT_ENDPOINT_URL.to_string(),
            realtime_sync: true,
            full_conversation_sync: true,
            idle_timeout_minutes: DEFAULT_IDLE_TIMEOUT_MINUTES,
            offline_buffer_enabled: true,
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
            dedup_enabled: true,
            notify_on_success: true,
            notify_on_error: false,
            last_sync_time: None,
        }
    }
}

impl SyncSettings {
    /// Clamp out-of-range numeric fields to their minimums.
    pub fn clamp(&mut self) {
        if self.idle_timeout_minutes < 1 {
            tracing::warn!("axon: idleTimeoutMinutes below 1, clamping");
            self.idle_timeout_minutes = 1;
        }
        if self.max_buffer_size < 1 {
            tracing::warn!("axon: maxBufferSize below 1, clamping");
            self.max_buffer_size = 1;
        }
    }

    /// The idle quiet period as a duration.
    pub fn idle_timeout(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.idle_timeout_minutes as i64)
    }
}
