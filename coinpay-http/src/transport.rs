//! A [`coinpay::Transport`] that sends requests with `reqwest`.
//!
//! ## Features
//!
//! - One request per call, no retries or redirects beyond reqwest's defaults
//! - Optional per-request timeout and default headers
//! - Integrates with `tracing` if the `telemetry` feature is enabled

use std::time::Duration;

use coinpay::{BoxFuture, ClientBuilder, Transport, TransportError};
use http::HeaderMap;
use reqwest::Client;
#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::error::HttpTransportError;

/// Settings for [`HttpTransport`].
#[derive(Clone, Debug, Default)]
pub struct HttpTransportConfig {
    /// Timeout applied to each request.
    pub timeout: Option<Duration>,
    /// Pre-built client to share connection pools with other code.
    pub client: Option<Client>,
    /// Headers added to each request unless the request already sets them.
    pub headers: HeaderMap,
}

impl HttpTransportConfig {
    /// Sets a timeout for each request.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Uses an existing reqwest client.
    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Attaches default headers.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }
}

/// Sends signed API requests over HTTP(S).
#[derive(Clone, Debug)]
pub struct HttpTransport {
    /// Shared Reqwest HTTP client
    client: Client,
    /// Optional custom headers sent with each request
    headers: HeaderMap,
    /// Optional request timeout
    timeout: Option<Duration>,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport {
    /// Creates a transport with a fresh reqwest client and no timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(HttpTransportConfig::default())
    }

    /// Creates a transport from `config`.
    #[must_use]
    pub fn from_config(config: HttpTransportConfig) -> Self {
        Self {
            client: config.client.unwrap_or_default(),
            headers: config.headers,
            timeout: config.timeout,
        }
    }

    /// Returns any custom headers configured on the transport.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the configured timeout, if any.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Sends `request` and collects the full response.
    ///
    /// Any status code is a successful send; judging it is the caller's job.
    ///
    /// # Errors
    ///
    /// Returns [`HttpTransportError`] if the request cannot be built, the
    /// send fails, or the body cannot be read.
    #[cfg_attr(
        feature = "telemetry",
        instrument(
            name = "coinpay.http.send",
            skip_all,
            fields(
                http.url = %request.uri(),
                timeout = ?self.timeout,
                http.status_code = tracing::field::Empty,
                otel.status_code = tracing::field::Empty,
                error.message = tracing::field::Empty,
            )
        )
    )]
    pub async fn execute(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> Result<http::Response<Vec<u8>>, HttpTransportError> {
        let result = self.execute_inner(request).await;
        record_result_on_span(&result);
        result
    }

    async fn execute_inner(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> Result<http::Response<Vec<u8>>, HttpTransportError> {
        let context = "POST api";
        let mut req = reqwest::Request::try_from(request)
            .map_err(|e| HttpTransportError::Build { context, source: e })?;
        for (key, value) in &self.headers {
            req.headers_mut()
                .entry(key)
                .or_insert_with(|| value.clone());
        }
        if let Some(timeout) = self.timeout {
            *req.timeout_mut() = Some(timeout);
        }

        let http_response = self
            .client
            .execute(req)
            .await
            .map_err(|e| HttpTransportError::Http { context, source: e })?;

        let status = http_response.status();
        let version = http_response.version();
        let headers = http_response.headers().clone();
        let body = http_response
            .bytes()
            .await
            .map_err(|e| HttpTransportError::ResponseBodyRead { context, source: e })?;

        let mut response = http::Response::new(body.to_vec());
        *response.status_mut() = status;
        *response.version_mut() = version;
        *response.headers_mut() = headers;
        Ok(response)
    }
}

impl Transport for HttpTransport {
    fn send(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> BoxFuture<'_, Result<http::Response<Vec<u8>>, TransportError>> {
        Box::pin(async move { Ok(self.execute(request).await?) })
    }
}

/// Wires an [`HttpTransport`] into a [`ClientBuilder`].
pub trait ClientBuilderExt {
    /// Uses a default [`HttpTransport`].
    #[must_use]
    fn with_http_transport(self) -> Self;

    /// Uses an [`HttpTransport`] built from `config`.
    #[must_use]
    fn with_http_transport_config(self, config: HttpTransportConfig) -> Self;
}

impl ClientBuilderExt for ClientBuilder {
    fn with_http_transport(self) -> Self {
        self.with_transport(HttpTransport::new())
    }

    fn with_http_transport_config(self, config: HttpTransportConfig) -> Self {
        self.with_transport(HttpTransport::from_config(config))
    }
}

/// Records the outcome of a request on the current span.
#[cfg(feature = "telemetry")]
fn record_result_on_span(result: &Result<http::Response<Vec<u8>>, HttpTransportError>) {
    let span = tracing::Span::current();
    match result {
        Ok(response) => {
            span.record("http.status_code", response.status().as_u16());
            span.record("otel.status_code", "OK");
        }
        Err(err) => {
            span.record("otel.status_code", "ERROR");
            span.record("error.message", tracing::field::display(err));
        }
    }
}

/// Noop if telemetry feature is off.
#[cfg(not(feature = "telemetry"))]
const fn record_result_on_span(_result: &Result<http::Response<Vec<u8>>, HttpTransportError>) {}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use coinpay::api::{Balance, BalancesRequest, TxListRequest};
    use coinpay::{Client, ClientConfig, Error};
    use http::{HeaderValue, StatusCode};
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client_for(server: &MockServer, config: HttpTransportConfig) -> Client {
        Client::builder(ClientConfig::new("public", "private"))
            .with_endpoint(format!("{}/api.php", server.uri()))
            .with_http_transport_config(config)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_balances_round_trip() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api.php"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string("all=1&key=public&version=1&format=json&cmd=balances"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"error":"ok","result":{"BTC":{"balance":5,"balancef":"0.00000005"}}}"#,
            ))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server, HttpTransportConfig::default());
        let balances: HashMap<String, Balance> = client
            .balances(&BalancesRequest { all: true })
            .await
            .unwrap();
        assert_eq!(balances["BTC"].balance, 5);

        // The server recomputes the signature over the bytes it received.
        let received = mock_server.received_requests().await.unwrap();
        assert_eq!(received.len(), 1);
        let request = &received[0];
        let expected = coinpay::signature::sign(b"private", &request.body);
        assert_eq!(request.headers.get("HMAC").unwrap(), expected.as_str());
        assert_eq!(
            request.headers.get("content-length").unwrap(),
            request.body.len().to_string().as_str()
        );
    }

    #[tokio::test]
    async fn test_status_failure_ignores_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server, HttpTransportConfig::default());
        let err = client
            .get_tx_list(&TxListRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedStatus { status } if status == StatusCode::INTERNAL_SERVER_ERROR
        ));
        assert_eq!(
            err.to_string(),
            "failed to make api call: expected status 200 OK, got 500 Internal Server Error"
        );
    }

    #[tokio::test]
    async fn test_remote_error_with_list_result() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"error":"some failure","result":[]}"#),
            )
            .mount(&mock_server)
            .await;

        let client = client_for(&mock_server, HttpTransportConfig::default());
        let err = client
            .balances(&BalancesRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.remote_message(), Some("some failure"));
    }

    #[tokio::test]
    async fn test_default_headers_do_not_override_signature() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(header("x-merchant", "shop"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"error":"ok","result":["A"]}"#),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut headers = HeaderMap::new();
        headers.insert("x-merchant", HeaderValue::from_static("shop"));
        headers.insert("HMAC", HeaderValue::from_static("forged"));
        let client = client_for(&mock_server, HttpTransportConfig::default().with_headers(headers));

        let ids = client.get_tx_list(&TxListRequest::default()).await.unwrap();
        assert_eq!(ids, ["A"]);

        let received = mock_server.received_requests().await.unwrap();
        let request = &received[0];
        assert_ne!(request.headers.get("HMAC").unwrap(), "forged");
    }

    #[tokio::test]
    async fn test_timeout_is_transport_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"error":"ok","result":{}}"#)
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&mock_server)
            .await;

        let config = HttpTransportConfig::default().with_timeout(Duration::from_millis(50));
        let client = client_for(&mock_server, config);
        let err = client
            .balances(&BalancesRequest::default())
            .await
            .unwrap_err();

        let transport = match err {
            Error::Transport(transport) => transport,
            other => panic!("expected transport error, got {other:?}"),
        };
        let inner = transport
            .get_ref()
            .downcast_ref::<HttpTransportError>()
            .unwrap();
        assert!(inner.is_timeout());
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let client = Client::builder(ClientConfig::new("public", "private"))
            .with_endpoint("http://127.0.0.1:1/api.php")
            .with_http_transport()
            .build()
            .unwrap();

        let err = client
            .balances(&BalancesRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport(_)), "{err:?}");
    }
}
