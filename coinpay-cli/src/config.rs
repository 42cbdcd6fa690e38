//! Command-line tool configuration.
//!
//! Loads configuration from a TOML file with support for environment variable
//! expansion in string values. Variables use `$VAR` or `${VAR}` syntax.
//!
//! # Example Configuration
//!
//! ```toml
//! public_key = "$COINPAY_PUBLIC_KEY"
//! private_key = "${COINPAY_PRIVATE_KEY}"
//! ipn_secret = "$COINPAY_IPN_SECRET"
//! ipn_url = "https://shop.example/ipn"
//! timeout_secs = 30
//! ```
//!
//! # Environment Variables
//!
//! - `COINPAY_CONFIG` - Path to configuration file (default: `coinpay.toml`)
//! - `COINPAY_PUBLIC_KEY` / `COINPAY_PRIVATE_KEY` - Override the key pair
//! - `COINPAY_IPN_SECRET` - Override the IPN secret
//! - `COINPAY_ENDPOINT` - Override the API endpoint

use std::path::Path;
use std::time::Duration;

use coinpay::ClientConfig;
use serde::{Deserialize, Serialize};

/// Default configuration file name.
pub const DEFAULT_CONFIG_PATH: &str = "coinpay.toml";

/// Top-level tool configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Client settings, at the top level of the file.
    #[serde(flatten)]
    pub client: ClientConfig,

    /// Per-request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl CliConfig {
    /// Loads configuration from `path`, or from defaults if it does not exist.
    ///
    /// All `$VAR` / `${VAR}` references are expanded from the process
    /// environment, then the `COINPAY_*` variables override file values.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = if path.exists() {
            std::fs::read_to_string(path)?
        } else {
            // No config file: rely on defaults and env overrides
            String::new()
        };
        Self::parse(&content, |name| std::env::var(name).ok())
    }

    /// Parses TOML `content`, resolving variables through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if the expanded content is not valid configuration.
    pub fn parse<F>(content: &str, lookup: F) -> Result<Self, Box<dyn std::error::Error>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let expanded = expand_vars(content, &lookup);
        let mut config: Self = toml::from_str(&expanded)?;

        if let Some(key) = lookup("COINPAY_PUBLIC_KEY") {
            config.client.public_key = key;
        }
        if let Some(key) = lookup("COINPAY_PRIVATE_KEY") {
            config.client.private_key = key;
        }
        if let Some(secret) = lookup("COINPAY_IPN_SECRET") {
            config.client.ipn_secret = Some(secret);
        }
        if let Some(endpoint) = lookup("COINPAY_ENDPOINT") {
            config.client.endpoint = Some(endpoint);
        }

        Ok(config)
    }

    /// Returns the configured timeout.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Expands `$VAR` and `${VAR}` patterns using `lookup`.
///
/// Unresolved variables are left as-is.
fn expand_vars<F>(input: &str, lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' {
            result.push(ch);
            continue;
        }

        let braced = chars.peek() == Some(&'{');
        if braced {
            chars.next(); // consume '{'
        }

        let mut var_name = String::new();
        while let Some(&c) = chars.peek() {
            if braced {
                if c == '}' {
                    chars.next();
                    break;
                }
            } else if !c.is_ascii_alphanumeric() && c != '_' {
                break;
            }
            var_name.push(c);
            chars.next();
        }

        match lookup(&var_name) {
            Some(value) if !var_name.is_empty() => result.push_str(&value),
            _ => {
                result.push('$');
                if braced {
                    result.push('{');
                }
                result.push_str(&var_name);
                if braced && !var_name.is_empty() {
                    result.push('}');
                }
            }
        }
    }

    result
}
