use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{ApiRequest, require};
use crate::client::Client;
use crate::command::Command;
use crate::error::{Error, Result};
use crate::params::Params;

/// Page size used by [`TxListRequest`] when none is given.
pub const DEFAULT_TX_LIST_LIMIT: u32 = 25;

/// Most transaction IDs accepted by one `get_tx_info_multi` call.
pub const MAX_TX_INFO_MULTI: usize = 25;

/// Request for `create_transaction`: a buyer checkout.
///
/// `amount` is priced in `currency1` and paid in `currency2`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionRequest {
    /// Price in `currency1`.
    pub amount: String,
    /// Ticker the price is quoted in.
    pub currency1: String,
    /// Ticker the buyer pays with.
    pub currency2: String,
    /// Buyer email, used for refunds and receipts.
    pub buyer_email: String,

    /// Forwarding address overriding the account's settings.
    pub address: Option<String>,
    /// Buyer name, shown on the checkout page.
    pub buyer_name: Option<String>,
    /// Item description.
    pub item_name: Option<String>,
    /// Merchant-side item number.
    pub item_number: Option<String>,
    /// Merchant-side invoice number.
    pub invoice: Option<String>,
    /// Free-form value echoed back in notifications.
    pub custom: Option<String>,
    /// Notification URL for this transaction only.
    pub ipn_url: Option<String>,
    /// Where the buyer lands after paying.
    pub success_url: Option<String>,
    /// Where the buyer lands after cancelling.
    pub cancel_url: Option<String>,
}

/// A created transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionResult {
    /// Amount the buyer must send, in `currency2`.
    pub amount: String,
    /// Address the buyer sends to.
    pub address: String,
    /// Transaction ID.
    pub txn_id: String,
    /// Confirmations required before the payment completes.
    pub confirms_needed: String,
    /// Seconds the buyer has to pay.
    pub timeout: u32,
    /// Page where the buyer can follow the payment.
    pub status_url: String,
    /// Hosted checkout page.
    pub checkout_url: String,
    /// QR code image of the payment address.
    pub qrcode_url: String,
}

impl ApiRequest for TransactionRequest {
    const COMMAND: Command = Command::CreateTransaction;
    type Output = TransactionResult;

    fn to_params(&self) -> Result<Params> {
        let mut params = Params::new();
        require(&mut params, "amount", &self.amount)?;
        require(&mut params, "currency1", &self.currency1)?;
        require(&mut params, "currency2", &self.currency2)?;
        require(&mut params, "buyer_email", &self.buyer_email)?;

        params.append_opt("address", self.address.as_deref());
        params.append_opt("buyer_name", self.buyer_name.as_deref());
        params.append_opt("item_name", self.item_name.as_deref());
        params.append_opt("item_number", self.item_number.as_deref());
        params.append_opt("invoice", self.invoice.as_deref());
        params.append_opt("custom", self.custom.as_deref());
        params.append_opt("ipn_url", self.ipn_url.as_deref());
        params.append_opt("success_url", self.success_url.as_deref());
        params.append_opt("cancel_url", self.cancel_url.as_deref());
        Ok(params)
    }
}

/// A deposit address, from `get_callback_address` or `get_deposit_address`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    /// The address to send coins to.
    pub address: String,
    /// NXT only.
    pub pubkey: String,
    /// Destination tag for coins that need one.
    pub dest_tag: String,
}

/// Request for `get_callback_address`.
///
/// Deposits to the returned address trigger notifications to `ipn_url`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackAddressRequest {
    /// Ticker of the coin.
    pub currency: String,
    /// Overrides the account's notification URL.
    pub ipn_url: Option<String>,
}

impl ApiRequest for CallbackAddressRequest {
    const COMMAND: Command = Command::GetCallbackAddress;
    type Output = Address;

    fn to_params(&self) -> Result<Params> {
        let mut params = Params::new();
        require(&mut params, "currency", &self.currency)?;
        params.append_opt("ipn_url", self.ipn_url.as_deref());
        Ok(params)
    }
}

/// Request for `get_deposit_address`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepositAddressRequest {
    /// Ticker of the coin.
    pub currency: String,
}

impl ApiRequest for DepositAddressRequest {
    const COMMAND: Command = Command::GetDepositAddress;
    type Output = Address;

    fn to_params(&self) -> Result<Params> {
        let mut params = Params::new();
        require(&mut params, "currency", &self.currency)?;
        Ok(params)
    }
}

/// Transaction details. The shape varies with the coin and the `full` flag.
pub type TxInfo = serde_json::Map<String, serde_json::Value>;

/// Request for `get_tx_info`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxInfoRequest {
    /// Transaction ID.
    pub txid: String,
    /// Include the checkout and shipping details.
    pub full: bool,
}

impl ApiRequest for TxInfoRequest {
    const COMMAND: Command = Command::GetTxInfo;
    type Output = TxInfo;

    fn to_params(&self) -> Result<Params> {
        let mut params = Params::new();
        require(&mut params, "txid", &self.txid)?;
        params.append_flag("full", self.full);
        Ok(params)
    }
}

/// Request for `get_tx_info_multi`: up to [`MAX_TX_INFO_MULTI`] transactions
/// in one call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxInfoMultiRequest {
    /// Transaction IDs.
    pub txids: Vec<String>,
}

impl ApiRequest for TxInfoMultiRequest {
    const COMMAND: Command = Command::GetTxInfoMulti;
    type Output = HashMap<String, TxInfo>;

    fn to_params(&self) -> Result<Params> {
        if self.txids.is_empty() || self.txids.len() > MAX_TX_INFO_MULTI {
            return Err(Error::InvalidRequest(format!(
                "'txid' takes 1 to {MAX_TX_INFO_MULTI} transaction ids, got {}",
                self.txids.len()
            )));
        }
        if self.txids.iter().any(|id| id.is_empty() || id.contains('|')) {
            return Err(Error::InvalidRequest(
                "transaction ids must be non-empty and must not contain '|'".to_owned(),
            ));
        }
        let mut params = Params::new();
        params.append("txid", self.txids.join("|"));
        Ok(params)
    }
}

/// Request for the list of the account's transaction IDs (`get_tx_ids`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TxListRequest {
    /// Page size; [`DEFAULT_TX_LIST_LIMIT`] when unset.
    pub limit: Option<u32>,
    /// Offset of the first ID returned.
    pub start: Option<u32>,
    /// Only transactions newer than this Unix timestamp.
    pub newer: Option<u64>,
    /// Include transfers and other non-checkout transactions.
    pub all: bool,
}

impl ApiRequest for TxListRequest {
    const COMMAND: Command = Command::GetTxList;
    type Output = Vec<String>;

    fn to_params(&self) -> Result<Params> {
        let mut params = Params::new();
        params.append(
            "limit",
            self.limit.unwrap_or(DEFAULT_TX_LIST_LIMIT).to_string(),
        );
        params.append_opt("start", self.start.map(|s| s.to_string()));
        params.append_opt("newer", self.newer.map(|n| n.to_string()));
        params.append_flag("all", self.all);
        Ok(params)
    }
}

impl Client {
    /// Creates a checkout transaction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if a required field is empty,
    /// otherwise see [`Client::call_command`].
    pub async fn create_transaction(
        &self,
        request: &TransactionRequest,
    ) -> Result<TransactionResult> {
        self.execute(request).await
    }

    /// Returns a new address whose deposits trigger notifications.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if `currency` is empty, otherwise
    /// see [`Client::call_command`].
    pub async fn get_callback_address(&self, request: &CallbackAddressRequest) -> Result<Address> {
        self.execute(request).await
    }

    /// Returns a deposit address for the account's wallet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if `currency` is empty, otherwise
    /// see [`Client::call_command`].
    pub async fn get_deposit_address(&self, request: &DepositAddressRequest) -> Result<Address> {
        self.execute(request).await
    }

    /// Returns the details of one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if `txid` is empty, otherwise see
    /// [`Client::call_command`].
    pub async fn get_tx_info(&self, request: &TxInfoRequest) -> Result<TxInfo> {
        self.execute(request).await
    }

    /// Returns the details of several transactions, keyed by ID.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] unless 1 to [`MAX_TX_INFO_MULTI`]
    /// well-formed IDs are given, otherwise see [`Client::call_command`].
    pub async fn get_tx_info_multi(
        &self,
        request: &TxInfoMultiRequest,
    ) -> Result<HashMap<String, TxInfo>> {
        self.execute(request).await
    }

    /// Returns a page of the account's transaction IDs.
    ///
    /// # Errors
    ///
    /// See [`Client::call_command`].
    pub async fn get_tx_list(&self, request: &TxListRequest) -> Result<Vec<String>> {
        self.execute(request).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::client::tests::{CannedTransport, client_with};

    fn transaction() -> TransactionRequest {
        TransactionRequest {
            amount: "10.00".to_owned(),
            currency1: "USD".to_owned(),
            currency2: "BTC".to_owned(),
            buyer_email: "buyer@example.com".to_owned(),
            ..TransactionRequest::default()
        }
    }

    #[tokio::test]
    async fn test_create_transaction() {
        let transport = CannedTransport::ok(
            r#"{"error":"ok","result":{"amount":"0.00083","address":"3Pk9","txn_id":"CPBF1","confirms_needed":"2","timeout":9000,"status_url":"https://example.com/s","checkout_url":"https://example.com/c","qrcode_url":"https://example.com/q"}}"#,
        );
        let client = client_with(Arc::clone(&transport));

        let request = TransactionRequest {
            item_name: Some("T-shirt".to_owned()),
            invoice: Some(String::new()),
            ..transaction()
        };
        let result = client.create_transaction(&request).await.unwrap();
        assert_eq!(result.txn_id, "CPBF1");
        assert_eq!(result.timeout, 9000);
        assert_eq!(result.confirms_needed, "2");
        assert_eq!(
            transport.last_body(),
            "amount=10.00&currency1=USD&currency2=BTC&buyer_email=buyer%40example.com&item_name=T-shirt&key=public&version=1&format=json&cmd=create_transaction"
        );
    }

    #[test]
    fn test_create_transaction_requires_buyer_email() {
        let request = TransactionRequest {
            buyer_email: String::new(),
            ..transaction()
        };
        let err = request.to_params().unwrap_err();
        assert_eq!(err.to_string(), "invalid request: 'buyer_email' is required");
    }

    #[tokio::test]
    async fn test_get_callback_address() {
        let transport = CannedTransport::ok(
            r#"{"error":"ok","result":{"address":"1BitcoinAddress","dest_tag":"7"}}"#,
        );
        let client = client_with(Arc::clone(&transport));

        let address = client
            .get_callback_address(&CallbackAddressRequest {
                currency: "XRP".to_owned(),
                ipn_url: Some("https://shop.example/ipn".to_owned()),
            })
            .await
            .unwrap();
        assert_eq!(address.address, "1BitcoinAddress");
        assert_eq!(address.dest_tag, "7");
        assert!(address.pubkey.is_empty());
        assert!(
            transport
                .last_body()
                .starts_with("currency=XRP&ipn_url=https%3A%2F%2Fshop.example%2Fipn&key=")
        );
    }

    #[tokio::test]
    async fn test_get_deposit_address_remote_error() {
        let transport = CannedTransport::ok(r#"{"error":"Invalid currency","result":[]}"#);
        let client = client_with(transport);

        let err = client
            .get_deposit_address(&DepositAddressRequest {
                currency: "NOPE".to_owned(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.remote_message(), Some("Invalid currency"));
    }

    #[tokio::test]
    async fn test_get_tx_info() {
        let transport = CannedTransport::ok(
            r#"{"error":"ok","result":{"time_created":1500000000,"status":100,"status_text":"Complete","coin":"BTC"}}"#,
        );
        let client = client_with(Arc::clone(&transport));

        let info = client
            .get_tx_info(&TxInfoRequest {
                txid: "CPBF1".to_owned(),
                full: true,
            })
            .await
            .unwrap();
        assert_eq!(info["status"], 100);
        assert_eq!(info["status_text"], "Complete");
        assert!(transport.last_body().starts_with("txid=CPBF1&full=1&key="));
    }

    #[tokio::test]
    async fn test_get_tx_info_multi() {
        let transport = CannedTransport::ok(
            r#"{"error":"ok","result":{"A":{"error":"ok","status":0},"B":{"error":"ok","status":100}}}"#,
        );
        let client = client_with(Arc::clone(&transport));

        let infos = client
            .get_tx_info_multi(&TxInfoMultiRequest {
                txids: vec!["A".to_owned(), "B".to_owned()],
            })
            .await
            .unwrap();
        assert_eq!(infos["B"]["status"], 100);
        assert!(transport.last_body().starts_with("txid=A%7CB&key="));
    }

    #[test]
    fn test_get_tx_info_multi_bounds() {
        let empty = TxInfoMultiRequest::default();
        assert!(matches!(empty.to_params(), Err(Error::InvalidRequest(_))));

        let too_many = TxInfoMultiRequest {
            txids: (0..=MAX_TX_INFO_MULTI).map(|i| format!("T{i}")).collect(),
        };
        assert!(matches!(too_many.to_params(), Err(Error::InvalidRequest(_))));

        let piped = TxInfoMultiRequest {
            txids: vec!["A|B".to_owned()],
        };
        assert!(matches!(piped.to_params(), Err(Error::InvalidRequest(_))));

        let full = TxInfoMultiRequest {
            txids: (0..MAX_TX_INFO_MULTI).map(|i| format!("T{i}")).collect(),
        };
        assert!(full.to_params().is_ok());
    }

    #[tokio::test]
    async fn test_get_tx_list_defaults_limit() {
        let transport = CannedTransport::ok(r#"{"error":"ok","result":["CPBF1","CPBF2"]}"#);
        let client = client_with(Arc::clone(&transport));

        let ids = client.get_tx_list(&TxListRequest::default()).await.unwrap();
        assert_eq!(ids, ["CPBF1", "CPBF2"]);
        assert_eq!(
            transport.last_body(),
            "limit=25&key=public&version=1&format=json&cmd=get_tx_ids"
        );
    }

    #[test]
    fn test_get_tx_list_all_fields() {
        let params = TxListRequest {
            limit: Some(100),
            start: Some(50),
            newer: Some(1_500_000_000),
            all: true,
        }
        .to_params()
        .unwrap();
        assert_eq!(
            params.encode(),
            "limit=100&start=50&newer=1500000000&all=1"
        );
    }
}
