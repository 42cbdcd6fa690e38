//! Command-line tool for the CoinPayments merchant API.
//!
//! # Modules
//!
//! - [`cli`] - Argument parsing and command dispatch
//! - [`config`] - TOML configuration with environment variable expansion

pub mod cli;
pub mod config;
