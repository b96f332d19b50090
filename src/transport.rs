//! Delivery transport: the trait seam and the blocking HTTP
//! implementation.

use crate::errors::DeliveryError;
use crate::payload::SyncPayload;

/// A way to hand one payload to the remote endpoint.
///
/// One call is one attempt: no retry, no backoff; recovery belongs to
/// the offline queue's flush. Implementations must classify failures:
/// `Network` when the endpoint was never reached, `Rejected` when it
/// answered non-2xx. The flush logic depends on that distinction.
pub trait Transport {
    fn post_json(&self, url: &str, payload: &SyncPayload) -> Result<(), DeliveryError>;
}

/// Blocking HTTP POST transport over reqwest.
///
/// Sends `Content-Type: application/json` with the serialized payload as
/// the body. No auth header, no compression, transport-default timeout.
#[cfg(feature = "http")]
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

#[cfg(feature = "http")]
impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
        }
    }
}

#[cfg(feature = "http")]
impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "http")]
impl Transport for HttpTransport {
    fn post_json(&self, url: &str, payload: &SyncPayload) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .map_err(|e| DeliveryError::Network {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!("axon: payload delivered, HTTP {status}");
            return Ok(());
        }
        // Body is read for diagnostics only.
        let body = response.text().unwrap_or_default();
        Err(DeliveryError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
