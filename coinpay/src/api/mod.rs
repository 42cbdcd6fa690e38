//! Typed request and result shapes for each remote command.
//!
//! Every request type implements [`ApiRequest`]: it names its [`Command`],
//! its decoded output, and how it flattens into a [`Params`] bag. The
//! matching `Client` method is a one-line call to [`Client::execute`].

mod balances;
mod convert;
mod info;
mod transfer;
mod tx;

use serde::de::DeserializeOwned;

pub use balances::{Balance, BalancesRequest};
pub use convert::{ConversionLimits, ConversionLimitsRequest};
pub use info::{BasicInfo, BasicInfoRequest, Rate, RatesRequest};
pub use transfer::{TransferRequest, TransferResult};
pub use tx::{
    Address, CallbackAddressRequest, DepositAddressRequest, TransactionRequest, TransactionResult,
    DEFAULT_TX_LIST_LIMIT, MAX_TX_INFO_MULTI, TxInfo, TxInfoMultiRequest, TxInfoRequest,
    TxListRequest,
};

use crate::client::Client;
use crate::command::Command;
use crate::error::{Error, Result};
use crate::params::Params;

/// A request for one remote command.
pub trait ApiRequest {
    /// The command this request is sent as.
    const COMMAND: Command;

    /// The decoded `result` payload.
    type Output: DeserializeOwned;

    /// Flattens the request into its parameter bag.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if a required field is empty.
    fn to_params(&self) -> Result<Params>;
}

impl Client {
    /// Sends a typed request and decodes its result.
    ///
    /// # Errors
    ///
    /// Any error from [`ApiRequest::to_params`] or [`Client::call_command`].
    pub async fn execute<R: ApiRequest>(&self, request: &R) -> Result<R::Output> {
        let params = request.to_params()?;
        self.call_command(R::COMMAND, params).await
    }
}

/// Appends a field the remote API rejects when missing.
fn require(params: &mut Params, key: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::InvalidRequest(format!("'{key}' is required")));
    }
    params.append(key, value);
    Ok(())
}
