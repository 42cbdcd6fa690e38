//! The injectable network capability used by [`crate::Client`].
//!
//! The client builds a complete, signed [`http::Request`] and hands it to a
//! [`Transport`]; the transport performs exactly one send and returns the raw
//! response. Timeouts, TLS, proxies, and redirect policy are the transport's
//! own configuration. The reqwest-backed implementation lives in the
//! `coinpay-http` crate.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A boxed, `Send` future, used to keep [`Transport`] object-safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Sends one request and returns the raw response.
///
/// Implementations must not retry. A response with any status code is a
/// successful send; only failures to obtain a response at all (connection,
/// DNS, TLS, timeouts) are [`TransportError`]s.
pub trait Transport: Send + Sync {
    /// Sends `request` and returns the response with its full body.
    fn send(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> BoxFuture<'_, Result<http::Response<Vec<u8>>, TransportError>>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn send(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> BoxFuture<'_, Result<http::Response<Vec<u8>>, TransportError>> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> BoxFuture<'_, Result<http::Response<Vec<u8>>, TransportError>> {
        (**self).send(request)
    }
}

/// A network-level failure reported by a [`Transport`].
///
/// Wraps the transport's own error and displays it verbatim.
pub struct TransportError {
    inner: Box<dyn std::error::Error + Send + Sync>,
}

impl TransportError {
    /// Wraps a transport-specific error.
    pub fn new(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self { inner: err.into() }
    }

    /// Returns the wrapped error.
    #[must_use]
    pub fn get_ref(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        &*self.inner
    }

    /// Consumes the error, returning the wrapped one.
    #[must_use]
    pub fn into_inner(self) -> Box<dyn std::error::Error + Send + Sync> {
        self.inner
    }
}

impl fmt::Debug for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TransportError").field(&self.inner).finish()
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner.source()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_displays_verbatim() {
        let err = TransportError::new("connection refused");
        assert_eq!(err.to_string(), "connection refused");
        assert_eq!(err.get_ref().to_string(), "connection refused");
    }

    #[test]
    fn test_transport_error_wraps_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out");
        let err = TransportError::new(io);
        let inner = err.into_inner();
        let io = inner.downcast::<std::io::Error>().unwrap();
        assert_eq!(io.kind(), std::io::ErrorKind::TimedOut);
    }
}
