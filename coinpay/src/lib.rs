#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Client for the CoinPayments merchant API.
//!
//! Every remote command is a form-encoded `POST` to a single endpoint,
//! authenticated by an HMAC-SHA512 signature over the exact request body and
//! answered with a JSON envelope `{"error": "...", "result": ...}`. This crate
//! builds and signs those requests, hands them to an injectable [`Transport`],
//! and decodes the envelope error-first into typed results.
//!
//! # Overview
//!
//! A [`Client`] is built once from a [`ClientConfig`] and a transport, then
//! reused for any number of calls. Each call performs exactly one request;
//! there is no retry, backoff, or rate limiting.
//!
//! # Modules
//!
//! - [`api`] - Typed request and result shapes for each command
//! - [`client`] - The call orchestrator
//! - [`command`] - The command allow-list
//! - [`config`] - Client configuration and credentials
//! - [`envelope`] - Two-phase response decoding
//! - [`ipn`] - Instant payment notification decoders
//! - [`params`] - The ordered, signable parameter bag
//! - [`signature`] - HMAC-SHA512 request signing
//! - [`transport`] - The network capability trait
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation for debugging and monitoring

pub mod api;
pub mod client;
pub mod command;
pub mod config;
pub mod envelope;
pub mod error;
pub mod ipn;
pub mod params;
pub mod signature;
pub mod transport;

pub use client::{Client, ClientBuilder, DEFAULT_API_URL};
pub use command::{Command, CommandRegistry, UnknownCommand};
pub use config::{ClientConfig, Credentials};
pub use error::{ConfigError, Error, Result};
pub use ipn::{ApiNotification, DepositNotification, NotificationError};
pub use params::Params;
pub use transport::{BoxFuture, Transport, TransportError};
