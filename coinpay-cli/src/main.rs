//! `coinpay`: query and operate a CoinPayments merchant account.
//!
//! # Usage
//!
//! ```bash
//! # Show balances using coinpay.toml in the current directory
//! cargo run -p coinpay-cli -- balances
//!
//! # Run with a custom config path
//! COINPAY_CONFIG=/path/to/coinpay.toml cargo run -p coinpay-cli -- rates --accepted
//!
//! # Verify and decode a notification body
//! cargo run -p coinpay-cli -- ipn-api --hmac "$SIG" < body.txt
//!
//! # Configure logging level
//! RUST_LOG=debug cargo run -p coinpay-cli -- basic-info
//! ```
//!
//! # Environment Variables
//!
//! - `COINPAY_CONFIG` - Path to TOML configuration file (default: `coinpay.toml`)
//! - `COINPAY_PUBLIC_KEY` / `COINPAY_PRIVATE_KEY` - Override the key pair
//! - `RUST_LOG` - Log level filter (default: `info`)

use clap::Parser;
use tracing_subscriber::EnvFilter;

use coinpay_cli::cli::Cli;
use coinpay_cli::config::CliConfig;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        tracing::error!("coinpay failed: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = CliConfig::load_from(&cli.config)?;
    tracing::debug!(
        path = %cli.config.display(),
        config = ?config,
        "Loaded configuration"
    );
    cli.run(config).await
}
