//! The call orchestrator.
//!
//! [`Client::call`] is the single path every remote command takes:
//!
//! 1. check the command against the client's [`CommandRegistry`];
//! 2. append the protocol fields `key`, `version`, `format`, `cmd`;
//! 3. encode the bag ([`Params::encode`]) and sign the encoded bytes;
//! 4. build a `POST` with the `HMAC`, `Content-Type`, and `Content-Length`
//!    headers and hand it to the [`Transport`];
//! 5. decode the response with [`envelope::decode`].
//!
//! The typed per-command operations in [`crate::api`] only build a [`Params`]
//! and delegate here.

use std::sync::Arc;

use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{Method, Uri};
use serde::de::DeserializeOwned;
#[cfg(feature = "telemetry")]
use tracing::instrument;

use crate::command::{Command, CommandRegistry};
use crate::config::{ClientConfig, Credentials};
use crate::envelope;
use crate::error::{ConfigError, Error, Result};
use crate::ipn::NotificationError;
use crate::params::Params;
use crate::signature::Signer;
use crate::transport::Transport;

/// Default API endpoint.
pub const DEFAULT_API_URL: &str = "https://www.coinpayments.net/api.php";

/// Protocol version sent as the `version` field.
pub const API_VERSION: &str = "1";

/// Response format sent as the `format` field.
pub const FORMAT_JSON: &str = "json";

/// Header carrying the hex request signature.
pub const HMAC_HEADER: &str = "HMAC";

/// Content type of every request body.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Field names the client appends itself; callers may not supply them.
const RESERVED_FIELDS: [&str; 4] = ["key", "version", "format", "cmd"];

/// A CoinPayments API client.
///
/// Holds the credentials, the transport, and the command allow-list. All of
/// it is immutable after construction and every call builds its request from
/// scratch, so a `Client` can be shared across tasks (it is cheap to clone).
///
/// # Example
///
/// ```no_run
/// # async fn run(transport: impl coinpay::Transport + 'static) -> Result<(), coinpay::Error> {
/// use coinpay::{Client, ClientConfig};
/// use coinpay::api::BalancesRequest;
///
/// let client = Client::builder(ClientConfig::new("public", "private"))
///     .with_transport(transport)
///     .build()?;
///
/// let balances = client.balances(&BalancesRequest::default()).await?;
/// for (coin, balance) in &balances {
///     println!("{coin}: {}", balance.balancef);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    credentials: Credentials,
    endpoint: Uri,
    transport: Arc<dyn Transport>,
    commands: CommandRegistry,
    ipn_secret: Option<Signer>,
    ipn_url: Option<String>,
    btc_forwarding_address: Option<String>,
    eth_forwarding_address: Option<String>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("credentials", &self.credentials)
            .field("endpoint", &self.endpoint)
            .field("commands", &self.commands)
            .field("has_ipn_secret", &self.ipn_secret.is_some())
            .field("ipn_url", &self.ipn_url)
            .field("btc_forwarding_address", &self.btc_forwarding_address)
            .field("eth_forwarding_address", &self.eth_forwarding_address)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Starts building a client from `config`.
    #[must_use]
    pub fn builder(config: ClientConfig) -> ClientBuilder {
        ClientBuilder::new(config)
    }

    /// Creates a client with the default endpoint and command set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if either key is missing or the configured
    /// endpoint is invalid.
    pub fn new(config: ClientConfig, transport: impl Transport + 'static) -> Result<Self, ConfigError> {
        Self::builder(config).with_transport(transport).build()
    }

    /// Returns the public key.
    #[must_use]
    pub fn public_key(&self) -> &str {
        self.credentials.public_key()
    }

    /// Returns the endpoint requests are posted to.
    #[must_use]
    pub const fn endpoint(&self) -> &Uri {
        &self.endpoint
    }

    /// Returns the command allow-list.
    #[must_use]
    pub const fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    /// Returns the configured IPN URL.
    #[must_use]
    pub fn ipn_url(&self) -> Option<&str> {
        self.ipn_url.as_deref()
    }

    /// Returns the configured BTC forwarding address.
    #[must_use]
    pub fn btc_forwarding_address(&self) -> Option<&str> {
        self.btc_forwarding_address.as_deref()
    }

    /// Returns the configured ETH forwarding address.
    #[must_use]
    pub fn eth_forwarding_address(&self) -> Option<&str> {
        self.eth_forwarding_address.as_deref()
    }

    /// Calls `command` by wire name and decodes its `result` as `T`.
    ///
    /// This is the low-level entry point for commands without a typed
    /// wrapper, or for callers that want a different result shape.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedCommand`] without touching the network if
    /// `command` is not allowed, and otherwise any error from
    /// [`Client::call_command`].
    pub async fn call<T: DeserializeOwned>(&self, command: &str, params: Params) -> Result<T> {
        let command = self
            .commands
            .resolve(command)
            .ok_or_else(|| Error::UnsupportedCommand(command.to_owned()))?;
        self.dispatch(command, params).await
    }

    /// Calls `command` and decodes its `result` as `T`.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedCommand`] if the command is not allowed
    /// - [`Error::InvalidRequest`] if `params` uses a reserved field name
    /// - [`Error::Transport`] if the transport fails
    /// - [`Error::UnexpectedStatus`], [`Error::Remote`], [`Error::Decode`]
    ///   from the response decoder
    pub async fn call_command<T: DeserializeOwned>(
        &self,
        command: Command,
        params: Params,
    ) -> Result<T> {
        if !self.commands.contains(command) {
            return Err(Error::UnsupportedCommand(command.as_str().to_owned()));
        }
        self.dispatch(command, params).await
    }

    #[cfg_attr(
        feature = "telemetry",
        instrument(
            name = "coinpay.call",
            skip_all,
            fields(
                cmd = %command,
                otel.status_code = tracing::field::Empty,
                error.message = tracing::field::Empty,
            )
        )
    )]
    async fn dispatch<T: DeserializeOwned>(&self, command: Command, params: Params) -> Result<T> {
        let request = self.signed_request(command, params)?;

        #[cfg(feature = "telemetry")]
        tracing::debug!(body_len = request.body().len(), "sending request");

        let result = match self.transport.send(request).await {
            Ok(response) => {
                let (parts, body) = response.into_parts();
                envelope::decode(parts.status, &body)
            }
            Err(err) => Err(Error::from(err)),
        };

        record_result_on_span(&result);

        result
    }

    /// Builds the signed request for `command` without sending it.
    ///
    /// The body is `params` followed by `key`, `version`, `format`, and
    /// `cmd`, form-encoded; the `HMAC` header is the signature over exactly
    /// those bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if `params` already holds one of the
    /// protocol field names.
    pub fn signed_request(
        &self,
        command: Command,
        mut params: Params,
    ) -> Result<http::Request<Vec<u8>>> {
        if let Some(field) = RESERVED_FIELDS.iter().find(|f| params.contains(f)) {
            return Err(Error::InvalidRequest(format!(
                "'{field}' is set by the client and cannot be supplied"
            )));
        }
        params.append("key", self.credentials.public_key());
        params.append("version", API_VERSION);
        params.append("format", FORMAT_JSON);
        params.append("cmd", command.as_str());

        let body = params.encode();
        let signature = self.credentials.sign(body.as_bytes());

        let request = http::Request::builder()
            .method(Method::POST)
            .uri(self.endpoint.clone())
            .header(HMAC_HEADER, signature)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .header(CONTENT_LENGTH, body.len())
            .body(body.into_bytes())?;
        Ok(request)
    }

    /// Checks a notification's `HMAC` header against its raw body.
    ///
    /// The remote service signs each notification body with HMAC-SHA512
    /// keyed by the IPN secret. Pass the body bytes exactly as received,
    /// before any decoding.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::MissingSecret`] if the client has no IPN
    /// secret and [`NotificationError::BadSignature`] on mismatch.
    pub fn verify_notification(&self, body: &[u8], signature: &str) -> Result<(), NotificationError> {
        let signer = self
            .ipn_secret
            .as_ref()
            .ok_or(NotificationError::MissingSecret)?;
        if signer.verify(body, signature) {
            Ok(())
        } else {
            Err(NotificationError::BadSignature)
        }
    }
}

/// Builder for [`Client`].
pub struct ClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    commands: CommandRegistry,
}

impl std::fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("config", &self.config)
            .field("has_transport", &self.transport.is_some())
            .field("commands", &self.commands)
            .finish()
    }
}

impl ClientBuilder {
    /// Creates a builder with no transport and every command allowed.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            transport: None,
            commands: CommandRegistry::default(),
        }
    }

    /// Sets the transport.
    #[must_use]
    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Sets a transport shared with other clients.
    #[must_use]
    pub fn with_shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Overrides the API endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = Some(endpoint.into());
        self
    }

    /// Restricts the commands the client may send.
    #[must_use]
    pub fn with_commands(mut self, commands: CommandRegistry) -> Self {
        self.commands = commands;
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingPublicKey`] / [`ConfigError::MissingPrivateKey`]
    ///   if a key is empty
    /// - [`ConfigError::MissingTransport`] if no transport was set
    /// - [`ConfigError::InvalidEndpoint`] if the endpoint is not an absolute URI
    pub fn build(self) -> Result<Client, ConfigError> {
        let credentials = self.config.credentials()?;
        let transport = self.transport.ok_or(ConfigError::MissingTransport)?;
        let endpoint = parse_endpoint(self.config.endpoint.as_deref().unwrap_or(DEFAULT_API_URL))?;

        Ok(Client {
            credentials,
            endpoint,
            transport,
            commands: self.commands,
            ipn_secret: non_empty(self.config.ipn_secret).map(Signer::new),
            ipn_url: non_empty(self.config.ipn_url),
            btc_forwarding_address: non_empty(self.config.btc_forwarding_address),
            eth_forwarding_address: non_empty(self.config.eth_forwarding_address),
        })
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Uri, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEndpoint {
        endpoint: endpoint.to_owned(),
        reason,
    };
    let uri: Uri = endpoint.parse().map_err(|e: http::uri::InvalidUri| invalid(e.to_string()))?;
    if uri.scheme().is_none() || uri.authority().is_none() {
        return Err(invalid("endpoint must be an absolute URL".to_owned()));
    }
    Ok(uri)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Records the outcome of a call on the current span.
#[cfg(feature = "telemetry")]
fn record_result_on_span<R>(result: &Result<R>) {
    let span = tracing::Span::current();
    match result {
        Ok(_) => {
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
const fn record_result_on_span<R>(_result: &Result<R>) {}
