//! Remote command names and the allow-list of commands a client may send.
//!
//! [`Command`] is the closed set of commands this crate knows how to speak.
//! [`CommandRegistry`] is the per-client allow-list checked before any
//! request is built: an unknown name fails locally instead of costing a
//! round trip to the remote endpoint.

use std::collections::HashMap;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// A command understood by the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Command {
    /// `create_transaction`
    CreateTransaction,
    /// `get_basic_info`
    GetBasicInfo,
    /// `rates`
    Rates,
    /// `balances`
    Balances,
    /// `get_callback_address`
    GetCallbackAddress,
    /// `get_deposit_address`
    GetDepositAddress,
    /// `get_tx_info`
    GetTxInfo,
    /// `get_tx_info_multi`
    GetTxInfoMulti,
    /// `get_tx_ids`
    GetTxList,
    /// `convert_limits`
    GetConversionLimits,
    /// `create_transfer`
    CreateTransfer,
}

impl Command {
    /// Every command, in declaration order.
    pub const ALL: [Self; 11] = [
        Self::CreateTransaction,
        Self::GetBasicInfo,
        Self::Rates,
        Self::Balances,
        Self::GetCallbackAddress,
        Self::GetDepositAddress,
        Self::GetTxInfo,
        Self::GetTxInfoMulti,
        Self::GetTxList,
        Self::GetConversionLimits,
        Self::CreateTransfer,
    ];

    /// Returns the wire name sent as the `cmd` field.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CreateTransaction => "create_transaction",
            Self::GetBasicInfo => "get_basic_info",
            Self::Rates => "rates",
            Self::Balances => "balances",
            Self::GetCallbackAddress => "get_callback_address",
            Self::GetDepositAddress => "get_deposit_address",
            Self::GetTxInfo => "get_tx_info",
            Self::GetTxInfoMulti => "get_tx_info_multi",
            Self::GetTxList => "get_tx_ids",
            Self::GetConversionLimits => "convert_limits",
            Self::CreateTransfer => "create_transfer",
        }
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for Command {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Error returned when parsing a name that is not a known [`Command`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown command '{0}'")]
pub struct UnknownCommand(pub String);

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCommand(s.to_owned()))
    }
}

/// The fixed set of commands a client is allowed to send.
///
/// Populated once at construction and never mutated afterwards. The default
/// registry allows every [`Command`]; [`CommandRegistry::from_commands`]
/// builds a narrower one, e.g. a read-only client without
/// [`Command::CreateTransfer`].
#[derive(Clone, PartialEq, Eq)]
pub struct CommandRegistry(HashMap<&'static str, Command>);

impl Debug for CommandRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.0.keys().copied().collect();
        names.sort_unstable();
        f.debug_tuple("CommandRegistry").field(&names).finish()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::from_commands(Command::ALL)
    }
}

impl CommandRegistry {
    /// Creates a registry allowing every known command.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry allowing exactly `commands`.
    pub fn from_commands(commands: impl IntoIterator<Item = Command>) -> Self {
        Self(commands.into_iter().map(|c| (c.as_str(), c)).collect())
    }

    /// Returns `true` if `name` is an allowed command.
    #[must_use]
    pub fn is_supported(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Returns `true` if `command` is allowed.
    #[must_use]
    pub fn contains(&self, command: Command) -> bool {
        self.0.contains_key(command.as_str())
    }

    /// Resolves an allowed command by wire name.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<Command> {
        self.0.get(name).copied()
    }

    /// Iterates over the allowed commands in declaration order.
    pub fn commands(&self) -> impl Iterator<Item = Command> + '_ {
        Command::ALL.into_iter().filter(|c| self.contains(*c))
    }

    /// Number of allowed commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no command is allowed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_command_is_supported_by_default() {
        let registry = CommandRegistry::new();
        for command in Command::ALL {
            assert!(registry.is_supported(command.as_str()), "{command}");
            assert_eq!(registry.resolve(command.as_str()), Some(command));
        }
        assert_eq!(registry.len(), Command::ALL.len());
    }

    #[test]
    fn test_unknown_names_are_rejected() {
        let registry = CommandRegistry::new();
        for name in ["doesntexist", "", "BALANCES", "get_tx_list", " balances"] {
            assert!(!registry.is_supported(name), "{name:?}");
            assert_eq!(registry.resolve(name), None);
        }
    }

    #[test]
    fn test_tx_list_uses_remote_name() {
        assert_eq!(Command::GetTxList.as_str(), "get_tx_ids");
        assert_eq!(Command::GetConversionLimits.as_str(), "convert_limits");
    }

    #[test]
    fn test_from_str_roundtrip() {
        for command in Command::ALL {
            assert_eq!(command.as_str().parse::<Command>(), Ok(command));
        }
        assert_eq!(
            "nope".parse::<Command>(),
            Err(UnknownCommand("nope".to_owned()))
        );
    }

    #[test]
    fn test_narrowed_registry() {
        let registry = CommandRegistry::from_commands([Command::Balances, Command::Rates]);
        assert!(registry.contains(Command::Balances));
        assert!(!registry.contains(Command::CreateTransfer));
        assert!(!registry.is_supported("create_transfer"));
        assert_eq!(
            registry.commands().collect::<Vec<_>>(),
            vec![Command::Rates, Command::Balances]
        );
    }
}
