use serde::{Deserialize, Serialize};

use super::{ApiRequest, require};
use crate::client::Client;
use crate::command::Command;
use crate::error::{Error, Result};
use crate::params::Params;

/// Request for `create_transfer`, moving funds to another merchant account.
///
/// Exactly one of `merchant` or `pbntag` names the recipient.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferRequest {
    /// Amount to send, in `currency`.
    pub amount: String,
    /// Ticker of the coin to send.
    pub currency: String,
    /// Recipient merchant ID.
    pub merchant: Option<String>,
    /// Recipient `$PayByName` tag.
    pub pbntag: Option<String>,
    /// Skip the confirmation email.
    pub auto_confirm: bool,
}

/// Outcome of `create_transfer`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferResult {
    /// Transfer ID.
    pub id: String,
    /// `0` if waiting for email confirmation, `1` if already confirmed.
    pub status: u8,
    /// Amount transferred.
    pub amount: String,
}

impl TransferResult {
    /// Returns `true` if the transfer still awaits email confirmation.
    #[must_use]
    pub const fn awaiting_confirmation(&self) -> bool {
        self.status == 0
    }
}

impl ApiRequest for TransferRequest {
    const COMMAND: Command = Command::CreateTransfer;
    type Output = TransferResult;

    fn to_params(&self) -> Result<Params> {
        let mut params = Params::new();
        require(&mut params, "amount", &self.amount)?;
        require(&mut params, "currency", &self.currency)?;

        let merchant = self.merchant.as_deref().filter(|m| !m.is_empty());
        let pbntag = self.pbntag.as_deref().filter(|t| !t.is_empty());
        match (merchant, pbntag) {
            (Some(merchant), None) => params.append("merchant", merchant),
            (None, Some(pbntag)) => params.append("pbntag", pbntag),
            (None, None) => {
                return Err(Error::InvalidRequest(
                    "one of 'merchant' or 'pbntag' is required".to_owned(),
                ));
            }
            (Some(_), Some(_)) => {
                return Err(Error::InvalidRequest(
                    "'merchant' and 'pbntag' are mutually exclusive".to_owned(),
                ));
            }
        };

        params.append_flag("auto_confirm", self.auto_confirm);
        Ok(params)
    }
}

impl Client {
    /// Transfers funds to another merchant account.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if the amount, currency, or recipient
    /// is missing, otherwise see [`Client::call_command`].
    pub async fn create_transfer(&self, request: &TransferRequest) -> Result<TransferResult> {
        self.execute(request).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::client::tests::{CannedTransport, client_with};

    fn request() -> TransferRequest {
        TransferRequest {
            amount: "0.5".to_owned(),
            currency: "BTC".to_owned(),
            merchant: Some("m-2".to_owned()),
            ..TransferRequest::default()
        }
    }

    #[tokio::test]
    async fn test_create_transfer() {
        let transport = CannedTransport::ok(
            r#"{"error":"ok","result":{"id":"CTFA1","status":1,"amount":"0.5"}}"#,
        );
        let client = client_with(Arc::clone(&transport));

        let transfer = client
            .create_transfer(&TransferRequest {
                auto_confirm: true,
                ..request()
            })
            .await
            .unwrap();
        assert_eq!(transfer.id, "CTFA1");
        assert!(!transfer.awaiting_confirmation());
        assert_eq!(
            transport.last_body(),
            "amount=0.5&currency=BTC&merchant=m-2&auto_confirm=1&key=public&version=1&format=json&cmd=create_transfer"
        );
    }

    #[test]
    fn test_transfer_by_pbntag() {
        let params = TransferRequest {
            merchant: None,
            pbntag: Some("$shop".to_owned()),
            ..request()
        }
        .to_params()
        .unwrap();
        assert_eq!(params.get("pbntag"), Some("$shop"));
        assert!(!params.contains("merchant"));
        assert!(!params.contains("auto_confirm"));
    }

    #[test]
    fn test_transfer_recipient_rules() {
        let none = TransferRequest {
            merchant: Some(String::new()),
            ..request()
        };
        assert!(matches!(none.to_params(), Err(Error::InvalidRequest(_))));

        let both = TransferRequest {
            pbntag: Some("$shop".to_owned()),
            ..request()
        };
        assert!(matches!(both.to_params(), Err(Error::InvalidRequest(_))));

        let no_amount = TransferRequest {
            amount: String::new(),
            ..request()
        };
        assert!(matches!(no_amount.to_params(), Err(Error::InvalidRequest(_))));
    }
}
