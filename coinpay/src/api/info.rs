use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::ApiRequest;
use crate::client::Client;
use crate::command::Command;
use crate::error::Result;
use crate::params::Params;

/// Account details returned by `get_basic_info`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicInfo {
    /// Login name.
    pub username: String,
    /// Merchant ID, used as a transfer recipient.
    pub merchant_id: String,
    /// Account email address.
    pub email: String,
    /// Name shown to buyers.
    pub public_name: String,
}

/// Request for `get_basic_info`. Takes no parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BasicInfoRequest;

impl ApiRequest for BasicInfoRequest {
    const COMMAND: Command = Command::GetBasicInfo;
    type Output = BasicInfo;

    fn to_params(&self) -> Result<Params> {
        Ok(Params::new())
    }
}

/// Request for `rates`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RatesRequest {
    /// Omit coin names and other metadata.
    pub short: bool,
    /// Only return coins enabled for the account.
    pub accepted: bool,
}

/// Exchange rate of one coin against BTC.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rate {
    /// `1` for fiat currencies.
    pub is_fiat: u8,
    /// Value of one unit in BTC.
    pub rate_btc: String,
    /// Unix timestamp of the last rate update.
    pub last_update: String,
}

impl Rate {
    /// Returns `true` for fiat currencies.
    #[must_use]
    pub const fn is_fiat(&self) -> bool {
        self.is_fiat != 0
    }
}

impl ApiRequest for RatesRequest {
    const COMMAND: Command = Command::Rates;
    type Output = HashMap<String, Rate>;

    fn to_params(&self) -> Result<Params> {
        let mut params = Params::new();
        params.append_flag("short", self.short);
        params.append_flag("accepted", self.accepted);
        Ok(params)
    }
}

impl Client {
    /// Returns the merchant account's basic information.
    ///
    /// # Errors
    ///
    /// See [`Client::call_command`].
    pub async fn get_basic_info(&self) -> Result<BasicInfo> {
        self.execute(&BasicInfoRequest).await
    }

    /// Returns exchange rates keyed by ticker.
    ///
    /// # Errors
    ///
    /// See [`Client::call_command`].
    pub async fn rates(&self, request: &RatesRequest) -> Result<HashMap<String, Rate>> {
        self.execute(request).await
    }
}
