use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::ApiRequest;
use crate::client::Client;
use crate::command::Command;
use crate::error::Result;
use crate::params::Params;

/// Request for `balances`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BalancesRequest {
    /// Include coins with a zero balance.
    pub all: bool,
}

/// One coin's wallet balance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Balance {
    /// Balance in the coin's smallest unit.
    pub balance: i64,
    /// Balance as a decimal string.
    pub balancef: String,
}

impl ApiRequest for BalancesRequest {
    const COMMAND: Command = Command::Balances;
    type Output = HashMap<String, Balance>;

    fn to_params(&self) -> Result<Params> {
        let mut params = Params::new();
        params.append_flag("all", self.all);
        Ok(params)
    }
}

impl Client {
    /// Returns the wallet balance of each coin, keyed by ticker.
    ///
    /// # Errors
    ///
    /// See [`Client::call_command`].
    pub async fn balances(&self, request: &BalancesRequest) -> Result<HashMap<String, Balance>> {
        self.execute(request).await
    }
}
