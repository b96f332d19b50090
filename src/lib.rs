//! # axon
//!
//! Client-side sync reliability layer for chat applications: forwards
//! completed turns to a remote memory-ingestion endpoint, suppresses
//! duplicate deliveries, buffers payloads while the endpoint is
//! unreachable, and submits a full-conversation snapshot after a
//! configurable quiet period.
//!
//! The host application is reached only through trait seams (`ChatHost`,
//! `Transport`, `StateStore`). The crate registers no hooks, owns no
//! globals, and never lets a sync failure escape into the host.

pub mod adapter;
pub mod config;
pub mod dedup;
pub mod engine;
pub mod errors;
pub mod host;
pub mod idle;
pub mod payload;
pub mod queue;
pub mod store;
pub mod transport;

// Re-export the most commonly used types at the crate root.
pub use config::SyncSettings;
pub use engine::{DeliveryOutcome, FlushReport, SyncEngine};
pub use errors::{DeliveryError, SyncError, SyncResult};
pub use host::{ChatHost, HistoryMessage, NotifyKind};
pub use payload::{Role, SyncPayload, Turn};
pub use store::{JsonFileStore, MemoryStore, StateStore};
#[cfg(feature = "http")]
pub use transport::HttpTransport;
pub use transport::Transport;
