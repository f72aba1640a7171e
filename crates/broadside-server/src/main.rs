//! Command-line entry point: parse flags, set up logging, serve until
//! Ctrl-C.

use broadside::prelude::*;
use broadside::DEFAULT_MAX_FRAME_LEN;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Two-player battleship server over length-prefixed JSON on TCP.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "65432")]
    port: u16,

    /// Largest frame payload accepted from a client, in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_FRAME_LEN)]
    max_frame_len: usize,

    /// Log filter used when RUST_LOG is unset (e.g. "debug",
    /// "broadside_room=debug")
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), BroadsideError> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let server = BroadsideServer::builder()
        .bind(&format!("{}:{}", args.host, args.port))
        .max_frame_len(args.max_frame_len)
        .build()
        .await?;

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
            tracing::info!("Ctrl-C received, shutting down");
        })
        .await
}
