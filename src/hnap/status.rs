//! Composite status query.

use super::messages::{StatusEnvelope, StatusRequest};
use super::session::Session;
use crate::error::{Error, Result};
use tokio_util::sync::CancellationToken;

/// HNAP action that bundles several queries into one request.
pub const STATUS_ACTION: &str = "GetMultipleHNAPs";

/// Requests downstream and upstream channel info in one signed call.
pub async fn fetch_status(session: &Session, cancel: &CancellationToken) -> Result<StatusEnvelope> {
    let body = session
        .call(STATUS_ACTION, &StatusRequest::default(), cancel)
        .await?;
    decode_envelope(&body)
}

/// Decodes a status reply, live or captured.
pub fn decode_envelope(body: &[u8]) -> Result<StatusEnvelope> {
    let envelope: StatusEnvelope = serde_json::from_slice(body)
        .map_err(|e| Error::Decode(format!("status envelope: {}", e)))?;

    if envelope.response.result != "OK" {
        tracing::debug!(result = %envelope.response.result, "Status query reported non-OK result");
    }
    Ok(envelope)
}
