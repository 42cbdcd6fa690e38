//! Error types for the CoinPayments protocol engine.

use http::StatusCode;

use crate::transport::TransportError;

/// Convenience alias for results carrying [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur while calling the remote API.
///
/// A call either yields a fully typed result or exactly one of these; there is
/// no partial success.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The client could not be constructed.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The command is not in the client's allow-list. No request was sent.
    #[error("command is not supported by api client: {0}")]
    UnsupportedCommand(String),

    /// A command adapter rejected its input before building the request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The signed request could not be assembled.
    #[error("failed to build request: {0}")]
    Request(#[from] http::Error),

    /// The transport failed to obtain a response.
    #[error("{0}")]
    Transport(#[from] TransportError),

    /// The response status was not `200 OK`. The body was not inspected.
    #[error("failed to make api call: expected status 200 OK, got {status}")]
    UnexpectedStatus {
        /// The status actually received.
        status: StatusCode,
    },

    /// The remote API reported an error in the envelope's `error` field.
    #[error("{0}")]
    Remote(String),

    /// The response body did not match the expected JSON shape.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl Error {
    /// Returns the remote-reported message, if this is [`Error::Remote`].
    #[must_use]
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            Self::Remote(message) => Some(message),
            _ => None,
        }
    }
}

/// Reasons a [`crate::Client`] cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The public key is empty.
    #[error("public key missing from config")]
    MissingPublicKey,

    /// The private key is empty.
    #[error("private key missing from config")]
    MissingPrivateKey,

    /// No transport was supplied.
    #[error("no transport provided")]
    MissingTransport,

    /// The endpoint is not a valid absolute URI.
    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint {
        /// The rejected endpoint.
        endpoint: String,
        /// Why it was rejected.
        reason: String,
    },
}
