//! HTTP transport for the CoinPayments API client.
//!
//! Provides [`HttpTransport`], a `reqwest`-backed [`coinpay::Transport`], and
//! [`ClientBuilderExt`] for wiring it into a [`coinpay::ClientBuilder`].
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use coinpay::{Client, ClientConfig};
//! use coinpay_http::ClientBuilderExt;
//!
//! let client = Client::builder(ClientConfig::new("public", "private"))
//!     .with_http_transport()
//!     .build()?;
//! let info = client.get_basic_info().await?;
//! println!("{}", info.username);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`error`] - HTTP transport error types
//! - [`transport`] - The reqwest transport and its configuration

pub mod error;
pub mod transport;

pub use error::HttpTransportError;
pub use transport::{ClientBuilderExt, HttpTransport, HttpTransportConfig};
