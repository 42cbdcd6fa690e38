use serde::{Deserialize, Serialize};

use super::{ApiRequest, require};
use crate::client::Client;
use crate::command::Command;
use crate::error::Result;
use crate::params::Params;

/// Request for `convert_limits`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionLimitsRequest {
    /// Ticker to convert from.
    pub from: String,
    /// Ticker to convert to.
    pub to: String,
}

impl ConversionLimitsRequest {
    /// Creates a request for the `from` to `to` pair.
    #[must_use]
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Amount bounds for a coin conversion, in units of the source coin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionLimits {
    /// Smallest convertible amount.
    pub min: String,
    /// Largest convertible amount; `0` means no upper bound.
    pub max: String,
}

impl ApiRequest for ConversionLimitsRequest {
    const COMMAND: Command = Command::GetConversionLimits;
    type Output = ConversionLimits;

    fn to_params(&self) -> Result<Params> {
        let mut params = Params::new();
        require(&mut params, "from", &self.from)?;
        require(&mut params, "to", &self.to)?;
        Ok(params)
    }
}

impl Client {
    /// Returns the conversion limits between two coins.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidRequest`] if either ticker is empty,
    /// otherwise see [`Client::call_command`].
    pub async fn get_conversion_limits(
        &self,
        request: &ConversionLimitsRequest,
    ) -> Result<ConversionLimits> {
        self.execute(request).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::Error;
    use crate::client::tests::{CannedTransport, client_with};

    #[tokio::test]
    async fn test_get_conversion_limits() {
        let transport =
            CannedTransport::ok(r#"{"error":"ok","result":{"min":"0.0025","max":"12.5"}}"#);
        let client = client_with(Arc::clone(&transport));

        let limits = client
            .get_conversion_limits(&ConversionLimitsRequest::new("BTC", "LTC"))
            .await
            .unwrap();
        assert_eq!(limits.min, "0.0025");
        assert_eq!(limits.max, "12.5");
        assert_eq!(
            transport.last_body(),
            "from=BTC&to=LTC&key=public&version=1&format=json&cmd=convert_limits"
        );
    }

    #[tokio::test]
    async fn test_get_conversion_limits_requires_both_tickers() {
        let transport = CannedTransport::ok(r#"{"error":"ok","result":{}}"#);
        let client = client_with(Arc::clone(&transport));

        let err = client
            .get_conversion_limits(&ConversionLimitsRequest::new("BTC", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)), "{err:?}");
        assert_eq!(transport.sent_count(), 0);
    }
}
