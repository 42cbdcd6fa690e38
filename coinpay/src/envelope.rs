//! Two-phase decoding of the remote API's JSON envelope.
//!
//! Every response has the shape `{"error": "...", "result": ...}`. On success
//! `error` is [`SUCCESS`] and `result` holds the command's payload, usually an
//! object. On failure the remote service sends `result` as an empty *list*,
//! which does not fit the typed payload shape at all. Decoding therefore runs
//! as an ordered protocol:
//!
//! 1. the status must be `200 OK`, else fail without reading the body;
//! 2. decode the body as [`ErrorEnvelope`] only, ignoring `result`;
//! 3. if `error` is not [`SUCCESS`], fail with that message and never look at
//!    `result`;
//! 4. decode the same body again into the typed `result`.
//!
//! Collapsing steps 2 and 4 into a single typed parse breaks on every
//! remote error response.

use http::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::Error;

/// Value of the envelope's `error` field on a successful call.
pub const SUCCESS: &str = "ok";

/// The minimal shape every response conforms to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorEnvelope {
    /// `"ok"` on success, a human-readable message otherwise.
    pub error: String,
}

impl ErrorEnvelope {
    /// Returns `true` if the envelope carries the success sentinel.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error == SUCCESS
    }
}

/// The full envelope, read only after [`ErrorEnvelope`] reported success.
#[derive(Debug, Deserialize)]
struct ResultEnvelope<T> {
    result: T,
}

/// Applies the two-phase policy to a raw response.
///
/// # Errors
///
/// - [`Error::UnexpectedStatus`] if `status` is not `200 OK`
/// - [`Error::Decode`] if the body is not an error envelope, or the success
///   payload does not match `T`
/// - [`Error::Remote`] if the envelope reports an error
pub fn decode<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T, Error> {
    // Step 1: status gate.
    if status != StatusCode::OK {
        return Err(Error::UnexpectedStatus { status });
    }

    // Step 2: error envelope only.
    let envelope = decode_error_envelope(body)?;

    // Step 3: remote error wins; `result` is unreliable here.
    if !envelope.is_success() {
        #[cfg(feature = "telemetry")]
        tracing::debug!(error = %envelope.error, "remote api reported an error");
        return Err(Error::Remote(envelope.error));
    }

    // Step 4: typed payload.
    let full: ResultEnvelope<T> = serde_json::from_slice(body)?;
    Ok(full.result)
}

/// Decodes just the `error` field of a response body.
///
/// # Errors
///
/// Returns [`Error::Decode`] if the body is not a JSON object with a string
/// `error` field.
pub fn decode_error_envelope(body: &[u8]) -> Result<ErrorEnvelope, Error> {
    Ok(serde_json::from_slice(body)?)
}
