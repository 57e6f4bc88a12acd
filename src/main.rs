//! ibgate -- Interactive Brokers TWS/Gateway session runner.
//!
//! Opens one API session, optionally asks for positions and an account
//! summary, and prints every reply as a JSON line on stdout until the server
//! closes the connection or Ctrl+C is pressed.

mod models;
mod sink;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use ibgate_api::IBClient;

use crate::models::Event;
use crate::sink::JsonSink;

/// Account summary tags requested with `--account-summary`.
const SUMMARY_TAGS: &str = "NetLiquidation,TotalCashValue,BuyingPower,AvailableFunds,GrossPositionValue";
const SUMMARY_REQ_ID: i32 = 9001;

/// ibgate -- Interactive Brokers TWS/Gateway session runner.
#[derive(Parser, Debug)]
#[command(name = "ibgate", version)]
struct Args {
    /// IB TWS/Gateway host
    #[arg(long = "ib-host", env = "IB_HOST", default_value = "127.0.0.1")]
    ib_host: String,

    /// IB TWS/Gateway port
    #[arg(long = "ib-port", env = "IB_PORT", default_value_t = 4002)]
    ib_port: u16,

    /// IB client ID
    #[arg(long = "ib-client-id", env = "IB_CLIENT_ID", default_value_t = 0)]
    ib_client_id: i32,

    /// Seconds to wait for the TCP connection
    #[arg(long = "connect-timeout-secs", default_value_t = 10)]
    connect_timeout_secs: u64,

    /// Extra connect options sent with the version range, e.g. +PACEAPI
    #[arg(long = "connect-options", default_value = "")]
    connect_options: String,

    /// Request positions after connecting
    #[arg(long)]
    positions: bool,

    /// Request an account summary after connecting
    #[arg(long = "account-summary")]
    account_summary: bool,
}

#[tokio::main]
async fn main() {
    // Initialize logging; stdout is reserved for records.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();

    let sink = Arc::new(JsonSink::new(std::io::stdout()));
    let client = IBClient::new(sink.clone());

    let shutdown = client.shutdown_token();
    if let Err(e) = ctrlc::set_handler(move || {
        tracing::info!("received Ctrl+C, shutting down");
        shutdown.cancel();
    }) {
        tracing::warn!(error = %e, "failed to install Ctrl+C handler");
    }

    tracing::info!(
        host = %args.ib_host,
        port = args.ib_port,
        client_id = args.ib_client_id,
        "connecting to IB TWS/Gateway"
    );
    let options = Some(args.connect_options.as_str()).filter(|o| !o.is_empty());
    let timeout = Some(Duration::from_secs(args.connect_timeout_secs));
    if let Err(e) = client
        .connect(&args.ib_host, args.ib_port, args.ib_client_id, timeout, options)
        .await
    {
        // Already delivered to the sink as an error record.
        tracing::error!(error = %e, "failed to connect");
        eprintln!("Please ensure:");
        eprintln!("  1. TWS or IB Gateway is running");
        eprintln!("  2. API connections are enabled in TWS/Gateway settings");
        eprintln!("  3. The host and port are correct");
        std::process::exit(1);
    }

    sink.emit(Event::Connected {
        server_version: client.server_version(),
        connection_time: client.connection_time(),
    });

    if args.positions {
        client.req_positions().await;
    }
    if args.account_summary {
        client.req_account_summary(SUMMARY_REQ_ID, "All", SUMMARY_TAGS).await;
    }

    client.closed().await;

    // Cleanup
    client.disconnect().await;
    sink.emit(Event::Stats(client.stats_snapshot()));
    tracing::info!("shutdown complete");
}
