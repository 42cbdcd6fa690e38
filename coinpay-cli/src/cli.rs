//! Command-line interface.

use std::io::Read;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use coinpay::api::{
    BalancesRequest, CallbackAddressRequest, ConversionLimitsRequest, DepositAddressRequest,
    RatesRequest, TransactionRequest, TransferRequest, TxInfoMultiRequest, TxInfoRequest,
    TxListRequest,
};
use coinpay::{ApiNotification, Client, DepositNotification};
use coinpay_http::{ClientBuilderExt, HttpTransportConfig};
use serde::Serialize;

use crate::config::{CliConfig, DEFAULT_CONFIG_PATH};

/// Query and operate a CoinPayments merchant account
#[derive(Debug, Parser)]
#[command(name = "coinpay")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, env = "COINPAY_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the account's basic information
    BasicInfo,

    /// Show coin balances
    Balances {
        /// Include coins with a zero balance
        #[arg(long)]
        all: bool,
    },

    /// Show exchange rates
    Rates {
        /// Omit coin names and other metadata
        #[arg(long)]
        short: bool,
        /// Only coins enabled for the account
        #[arg(long)]
        accepted: bool,
    },

    /// Get a deposit address for the account's wallet
    DepositAddress {
        /// Coin ticker
        currency: String,
    },

    /// Get a new address whose deposits trigger notifications
    CallbackAddress {
        /// Coin ticker
        currency: String,
        /// Notification URL for this address
        #[arg(long)]
        ipn_url: Option<String>,
    },

    /// Show one transaction
    TxInfo {
        /// Transaction ID
        txid: String,
        /// Include checkout and shipping details
        #[arg(long)]
        full: bool,
    },

    /// Show several transactions at once
    TxInfoMulti {
        /// Transaction IDs (at most 25)
        #[arg(required = true)]
        txids: Vec<String>,
    },

    /// List transaction IDs
    TxList {
        /// Page size
        #[arg(long)]
        limit: Option<u32>,
        /// Offset of the first ID
        #[arg(long)]
        start: Option<u32>,
        /// Only transactions newer than this Unix timestamp
        #[arg(long)]
        newer: Option<u64>,
        /// Include non-checkout transactions
        #[arg(long)]
        all: bool,
    },

    /// Show conversion limits between two coins
    ConvertLimits {
        /// Source coin ticker
        from: String,
        /// Target coin ticker
        to: String,
    },

    /// Create a checkout transaction
    CreateTransaction(CreateTransactionArgs),

    /// Transfer funds to another merchant account
    CreateTransfer(CreateTransferArgs),

    /// Decode a deposit notification read from stdin
    IpnDeposit(IpnArgs),

    /// Decode a checkout notification read from stdin
    IpnApi(IpnArgs),
}

/// Arguments for `create-transaction`.
#[derive(Debug, Args)]
pub struct CreateTransactionArgs {
    /// Price in `currency1`
    #[arg(long)]
    pub amount: String,
    /// Ticker the price is quoted in
    #[arg(long)]
    pub currency1: String,
    /// Ticker the buyer pays with
    #[arg(long)]
    pub currency2: String,
    /// Buyer email
    #[arg(long)]
    pub buyer_email: String,
    /// Forwarding address
    #[arg(long)]
    pub address: Option<String>,
    /// Buyer name
    #[arg(long)]
    pub buyer_name: Option<String>,
    /// Item description
    #[arg(long)]
    pub item_name: Option<String>,
    /// Item number
    #[arg(long)]
    pub item_number: Option<String>,
    /// Invoice number
    #[arg(long)]
    pub invoice: Option<String>,
    /// Value echoed back in notifications
    #[arg(long)]
    pub custom: Option<String>,
    /// Notification URL (defaults to the configured one)
    #[arg(long)]
    pub ipn_url: Option<String>,
    /// Redirect after payment
    #[arg(long)]
    pub success_url: Option<String>,
    /// Redirect after cancellation
    #[arg(long)]
    pub cancel_url: Option<String>,
}

/// Arguments for `create-transfer`.
#[derive(Debug, Args)]
pub struct CreateTransferArgs {
    /// Amount to send
    #[arg(long)]
    pub amount: String,
    /// Coin ticker
    #[arg(long)]
    pub currency: String,
    /// Recipient merchant ID
    #[arg(long, conflicts_with = "pbntag", required_unless_present = "pbntag")]
    pub merchant: Option<String>,
    /// Recipient `$PayByName` tag
    #[arg(long)]
    pub pbntag: Option<String>,
    /// Skip the confirmation email
    #[arg(long)]
    pub auto_confirm: bool,
}

/// Arguments for the notification decoders.
#[derive(Debug, Args)]
pub struct IpnArgs {
    /// Verify the body against this `HMAC` header value first
    #[arg(long)]
    pub hmac: Option<String>,
}

impl Cli {
    /// Runs the selected command against the configured account.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be built, the call fails, or
    /// the output cannot be written.
    pub async fn run(self, config: CliConfig) -> Result<(), Box<dyn std::error::Error>> {
        match self.command {
            Commands::IpnDeposit(args) => {
                let body = read_stdin()?;
                verify(&config, &body, args.hmac.as_deref())?;
                print_json(&DepositNotification::from_form(&body))
            }
            Commands::IpnApi(args) => {
                let body = read_stdin()?;
                verify(&config, &body, args.hmac.as_deref())?;
                print_json(&ApiNotification::from_form(&body))
            }
            command => {
                let client = build_client(&config)?;
                call(&client, command).await
            }
        }
    }
}

async fn call(client: &Client, command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::BasicInfo => print_json(&client.get_basic_info().await?),
        Commands::Balances { all } => print_json(&client.balances(&BalancesRequest { all }).await?),
        Commands::Rates { short, accepted } => {
            print_json(&client.rates(&RatesRequest { short, accepted }).await?)
        }
        Commands::DepositAddress { currency } => print_json(
            &client
                .get_deposit_address(&DepositAddressRequest { currency })
                .await?,
        ),
        Commands::CallbackAddress { currency, ipn_url } => {
            let ipn_url = ipn_url.or_else(|| client.ipn_url().map(str::to_owned));
            print_json(
                &client
                    .get_callback_address(&CallbackAddressRequest { currency, ipn_url })
                    .await?,
            )
        }
        Commands::TxInfo { txid, full } => {
            print_json(&client.get_tx_info(&TxInfoRequest { txid, full }).await?)
        }
        Commands::TxInfoMulti { txids } => print_json(
            &client
                .get_tx_info_multi(&TxInfoMultiRequest { txids })
                .await?,
        ),
        Commands::TxList {
            limit,
            start,
            newer,
            all,
        } => print_json(
            &client
                .get_tx_list(&TxListRequest {
                    limit,
                    start,
                    newer,
                    all,
                })
                .await?,
        ),
        Commands::ConvertLimits { from, to } => print_json(
            &client
                .get_conversion_limits(&ConversionLimitsRequest { from, to })
                .await?,
        ),
        Commands::CreateTransaction(args) => {
            let ipn_url = args
                .ipn_url
                .or_else(|| client.ipn_url().map(str::to_owned));
            let request = TransactionRequest {
                amount: args.amount,
                currency1: args.currency1,
                currency2: args.currency2,
                buyer_email: args.buyer_email,
                address: args.address,
                buyer_name: args.buyer_name,
                item_name: args.item_name,
                item_number: args.item_number,
                invoice: args.invoice,
                custom: args.custom,
                ipn_url,
                success_url: args.success_url,
                cancel_url: args.cancel_url,
            };
            print_json(&client.create_transaction(&request).await?)
        }
        Commands::CreateTransfer(args) => {
            let request = TransferRequest {
                amount: args.amount,
                currency: args.currency,
                merchant: args.merchant,
                pbntag: args.pbntag,
                auto_confirm: args.auto_confirm,
            };
            print_json(&client.create_transfer(&request).await?)
        }
        Commands::IpnDeposit(_) | Commands::IpnApi(_) => Ok(()),
    }
}

fn build_client(config: &CliConfig) -> Result<Client, coinpay::ConfigError> {
    let mut transport = HttpTransportConfig::default();
    if let Some(timeout) = config.timeout() {
        transport = transport.with_timeout(timeout);
    }
    let client = Client::builder(config.client.clone())
        .with_http_transport_config(transport)
        .build()?;
    tracing::debug!(endpoint = %client.endpoint(), "Client ready");
    Ok(client)
}

fn verify(
    config: &CliConfig,
    body: &[u8],
    hmac: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(hmac) = hmac else {
        return Ok(());
    };
    build_client(config)?.verify_notification(body, hmac)?;
    tracing::info!("Notification signature verified");
    Ok(())
}

fn read_stdin() -> std::io::Result<Vec<u8>> {
    let mut body = Vec::new();
    std::io::stdin().lock().read_to_end(&mut body)?;
    Ok(body)
}

#[allow(clippy::print_stdout)]
fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
