//! Error taxonomy for the sync pipeline.

/// Failure of a single delivery attempt.
///
/// The two variants drive different recovery paths: a `Network` failure
/// aborts a queue flush (assume still offline), while a `Rejected`
/// response retains the one item and lets the flush continue.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// DNS, connect, or timeout failure. The endpoint was never reached.
    #[error("network error: {reason}")]
    Network { reason: String },

    /// The endpoint answered with a non-2xx status.
    #[error("endpoint rejected payload: HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Crate-wide errors.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    /// Persistence I/O failure. Best-effort: callers log and keep going.
    #[error("state store error: {reason}")]
    State { reason: String },
}

/// Crate-wide result alias.
pub type SyncResult<T> = Result<T, SyncError>;
