//! Decoders for instant payment notifications (IPN).
//!
//! The remote service posts a form-encoded body to the merchant's IPN URL
//! whenever a deposit or checkout changes state. Decoding is field-by-field
//! extraction: a missing field decodes as an empty string, and when a field
//! repeats the first value wins.
//!
//! Decoding never authenticates. Check the `HMAC` header with
//! [`crate::Client::verify_notification`] against the same raw bytes first.

use std::io::Read;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// Errors produced while reading or authenticating a notification.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// The body could not be read.
    #[error("failed to read notification body: {0}")]
    Read(#[from] std::io::Error),

    /// The client holds no IPN secret to verify with.
    #[error("no ipn secret configured")]
    MissingSecret,

    /// The `HMAC` header does not match the body.
    #[error("notification signature mismatch")]
    BadSignature,
}

/// First value of each field in a form body.
struct Form<'a> {
    pairs: Vec<(std::borrow::Cow<'a, str>, std::borrow::Cow<'a, str>)>,
}

impl<'a> Form<'a> {
    fn parse(body: &'a [u8]) -> Self {
        Self {
            pairs: form_urlencoded::parse(body).collect(),
        }
    }

    fn get(&self, key: &str) -> String {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone().into_owned())
            .unwrap_or_default()
    }
}

fn read_body<R: Read>(mut reader: R) -> Result<Vec<u8>, NotificationError> {
    let mut body = Vec::new();
    reader.read_to_end(&mut body)?;
    Ok(body)
}

/// A deposit to a callback address changed state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositNotification {
    /// Address that received the deposit.
    pub address: String,
    /// Transaction ID.
    pub txn_id: String,
    /// Numeric status; `100` or above means complete, negative means failed.
    pub status: String,
    /// Human-readable status.
    pub status_text: String,
    /// Coin ticker.
    pub currency: String,
    /// Confirmations received so far.
    pub confirms: String,
    /// Amount deposited.
    pub amount: String,
    /// Amount in the coin's smallest unit.
    pub amounti: String,
    /// Fee charged.
    pub fee: String,
    /// Fee in the coin's smallest unit.
    pub feei: String,
    /// Destination tag, for coins that use one.
    pub dest_tag: String,
}

impl DepositNotification {
    /// Decodes a form-encoded notification body.
    #[must_use]
    pub fn from_form(body: &[u8]) -> Self {
        let form = Form::parse(body);
        Self {
            address: form.get("address"),
            txn_id: form.get("txn_id"),
            status: form.get("status"),
            status_text: form.get("status_text"),
            currency: form.get("currency"),
            confirms: form.get("confirms"),
            amount: form.get("amount"),
            amounti: form.get("amounti"),
            fee: form.get("fee"),
            feei: form.get("feei"),
            dest_tag: form.get("dest_tag"),
        }
    }

    /// Reads the whole body from `reader` and decodes it.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::Read`] if reading fails.
    pub fn read_from<R: Read>(reader: R) -> Result<Self, NotificationError> {
        Ok(Self::from_form(&read_body(reader)?))
    }
}

/// A checkout created through `create_transaction` changed state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiNotification {
    /// Numeric status; `100` or above means complete, negative means failed.
    pub status: String,
    /// Human-readable status.
    pub status_text: String,
    /// Transaction ID.
    pub txn_id: String,
    /// Ticker the price was quoted in.
    pub currency1: String,
    /// Ticker the buyer paid with.
    pub currency2: String,
    /// Price in `currency1`.
    pub amount1: String,
    /// Amount due in `currency2`.
    pub amount2: String,
    /// Fee charged.
    pub fee: String,
    /// Buyer name.
    pub buyer_name: String,
    /// Buyer email.
    pub email: String,
    /// Item description.
    pub item_name: String,
    /// Item number.
    pub item_number: String,
    /// Invoice number.
    pub invoice: String,
    /// Value passed as `custom` at checkout.
    pub custom: String,
    /// Payout transaction to the merchant, once sent.
    pub send_tx: String,
    /// Amount received so far, in `currency2`.
    pub received_amount: String,
    /// Confirmations on the received amount.
    pub received_confirms: String,
}

impl ApiNotification {
    /// Decodes a form-encoded notification body.
    #[must_use]
    pub fn from_form(body: &[u8]) -> Self {
        let form = Form::parse(body);
        Self {
            status: form.get("status"),
            status_text: form.get("status_text"),
            txn_id: form.get("txn_id"),
            currency1: form.get("currency1"),
            currency2: form.get("currency2"),
            amount1: form.get("amount1"),
            amount2: form.get("amount2"),
            fee: form.get("fee"),
            buyer_name: form.get("buyer_name"),
            email: form.get("email"),
            item_name: form.get("item_name"),
            item_number: form.get("item_number"),
            invoice: form.get("invoice"),
            custom: form.get("custom"),
            send_tx: form.get("send_tx"),
            received_amount: form.get("received_amount"),
            received_confirms: form.get("received_confirms"),
        }
    }

    /// Reads the whole body from `reader` and decodes it.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::Read`] if reading fails.
    pub fn read_from<R: Read>(reader: R) -> Result<Self, NotificationError> {
        Ok(Self::from_form(&read_body(reader)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deposit_notification() {
        let n = DepositNotification::from_form(b"address=1A2b&txn_id=T1&status=100&amount=0.5");
        assert_eq!(n.address, "1A2b");
        assert_eq!(n.txn_id, "T1");
        assert_eq!(n.status, "100");
        assert_eq!(n.amount, "0.5");
        assert_eq!(n.fee, "");
        assert_eq!(n.dest_tag, "");
    }

    #[test]
    fn test_first_value_wins_and_decoding() {
        let n = ApiNotification::from_form(
            b"status=1&status=2&email=buyer%40example.com&item_name=Blue+shirt",
        );
        assert_eq!(n.status, "1");
        assert_eq!(n.email, "buyer@example.com");
        assert_eq!(n.item_name, "Blue shirt");
        assert_eq!(n.send_tx, "");
    }

    #[test]
    fn test_empty_body_decodes_to_empty_fields() {
        assert_eq!(ApiNotification::from_form(b""), ApiNotification::default());
        assert_eq!(
            DepositNotification::from_form(b""),
            DepositNotification::default()
        );
    }

    #[test]
    fn test_read_from_reader() {
        let body: &[u8] = b"txn_id=CPBF1&currency1=USD&amount1=10.00";
        let n = ApiNotification::read_from(body).unwrap();
        assert_eq!(n.txn_id, "CPBF1");
        assert_eq!(n.currency1, "USD");
        assert_eq!(n.amount1, "10.00");
    }

    #[test]
    fn test_read_failure() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("connection reset"))
            }
        }
        let err = DepositNotification::read_from(Broken).unwrap_err();
        assert!(matches!(err, NotificationError::Read(_)));
    }
}
