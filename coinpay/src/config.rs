//! Client configuration and API credentials.
//!
//! [`ClientConfig`] is plain data (`serde`-friendly, so callers can load it
//! from TOML, JSON, or the environment). [`Credentials`] is the validated
//! key pair a [`crate::Client`] signs with.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::signature::Signer;

/// Everything needed to construct a [`crate::Client`].
///
/// Only the key pair is consumed by the protocol engine. The IPN secret is
/// used by [`crate::Client::verify_notification`]; the IPN URL and
/// forwarding addresses are held for callers.
///
/// # Example
///
/// ```rust
/// use coinpay::ClientConfig;
///
/// let config = ClientConfig::new("public", "private")
///     .with_ipn_secret("ipn-secret")
///     .with_ipn_url("https://shop.example/ipn");
/// assert_eq!(config.ipn_url.as_deref(), Some("https://shop.example/ipn"));
/// ```
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Public API key, sent as the `key` field.
    #[serde(default)]
    pub public_key: String,

    /// Private API key, used only to sign requests.
    #[serde(default)]
    pub private_key: String,

    /// Secret shared with the remote service for signing notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipn_secret: Option<String>,

    /// URL the remote service posts notifications to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipn_url: Option<String>,

    /// BTC address incoming funds may be forwarded to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub btc_forwarding_address: Option<String>,

    /// ETH address incoming funds may be forwarded to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eth_forwarding_address: Option<String>,

    /// Overrides the API endpoint (defaults to [`crate::DEFAULT_API_URL`]).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl ClientConfig {
    /// Creates a config holding just the key pair.
    #[must_use]
    pub fn new(public_key: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            private_key: private_key.into(),
            ..Self::default()
        }
    }

    /// Sets the IPN secret.
    #[must_use]
    pub fn with_ipn_secret(mut self, secret: impl Into<String>) -> Self {
        self.ipn_secret = Some(secret.into());
        self
    }

    /// Sets the IPN URL.
    #[must_use]
    pub fn with_ipn_url(mut self, url: impl Into<String>) -> Self {
        self.ipn_url = Some(url.into());
        self
    }

    /// Sets the BTC forwarding address.
    #[must_use]
    pub fn with_btc_forwarding_address(mut self, address: impl Into<String>) -> Self {
        self.btc_forwarding_address = Some(address.into());
        self
    }

    /// Sets the ETH forwarding address.
    #[must_use]
    pub fn with_eth_forwarding_address(mut self, address: impl Into<String>) -> Self {
        self.eth_forwarding_address = Some(address.into());
        self
    }

    /// Overrides the API endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Validates the key pair and returns it as [`Credentials`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingPublicKey`] or
    /// [`ConfigError::MissingPrivateKey`] if either key is empty.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        Credentials::new(self.public_key.clone(), self.private_key.as_bytes())
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("public_key", &self.public_key)
            .field("has_private_key", &!self.private_key.is_empty())
            .field("has_ipn_secret", &self.ipn_secret.is_some())
            .field("ipn_url", &self.ipn_url)
            .field("btc_forwarding_address", &self.btc_forwarding_address)
            .field("eth_forwarding_address", &self.eth_forwarding_address)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// A validated public/private key pair.
///
/// The private key is never transmitted; it only derives request signatures.
#[derive(Clone)]
pub struct Credentials {
    public_key: String,
    signer: Signer,
}

impl Credentials {
    /// Creates credentials from a key pair.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingPublicKey`] or
    /// [`ConfigError::MissingPrivateKey`] if either key is empty.
    pub fn new(
        public_key: impl Into<String>,
        private_key: impl AsRef<[u8]>,
    ) -> Result<Self, ConfigError> {
        let public_key = public_key.into();
        if public_key.is_empty() {
            return Err(ConfigError::MissingPublicKey);
        }
        let private_key = private_key.as_ref();
        if private_key.is_empty() {
            return Err(ConfigError::MissingPrivateKey);
        }
        Ok(Self {
            public_key,
            signer: Signer::new(private_key),
        })
    }

    /// Returns the public key.
    #[must_use]
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// Signs `message` with the private key.
    #[must_use]
    pub fn sign(&self, message: &[u8]) -> String {
        self.signer.sign(message)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}
