//! Error types for the HTTP transport.

/// Errors that can occur while sending a request over HTTP.
///
/// Surfaced to callers as [`coinpay::Error::Transport`]; use
/// [`coinpay::TransportError::get_ref`] and downcast to inspect the variant.
#[derive(Debug, thiserror::Error)]
pub enum HttpTransportError {
    /// The signed request could not be converted into a reqwest request.
    #[error("Failed to build request: {context}: {source}")]
    Build {
        /// Human-readable context.
        context: &'static str,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// HTTP transport error (connection, TLS, timeout).
    #[error("HTTP error: {context}: {source}")]
    Http {
        /// Human-readable context.
        context: &'static str,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// Failed to read response body.
    #[error("Failed to read response body: {context}: {source}")]
    ResponseBodyRead {
        /// Human-readable context.
        context: &'static str,
        /// The underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
}

impl HttpTransportError {
    /// Returns `true` if the request timed out.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Build { source, .. }
            | Self::Http { source, .. }
            | Self::ResponseBodyRead { source, .. } => source.is_timeout(),
        }
    }
}

impl From<HttpTransportError> for coinpay::TransportError {
    fn from(err: HttpTransportError) -> Self {
        Self::new(err)
    }
}
