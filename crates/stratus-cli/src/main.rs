//! Command-line interface for the Stratus messages service.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use stratus_core::{RequestContext, StratusConfig};
use stratus_messages::MessageApi;

/// Stratus - user messages for block storage operations.
#[derive(Parser, Debug)]
#[command(name = "stratus")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Action to perform.
    #[command(subcommand)]
    command: Command,

    /// Configuration file (TOML).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Start the web server.
    Serve {
        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to.
        #[arg(short, long, default_value_t = 8776)]
        port: u16,
    },

    /// Delete expired messages from the persistent store and exit.
    Cleanup,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = StratusConfig::load(args.config.as_deref())?;

    match args.command {
        Command::Serve { host, port } => run_server(host, port, config).await,
        Command::Cleanup => run_cleanup(config).await,
    }
}

fn init_logging(verbose: bool) {
    // JSON logs for production/container environments
    let json_logging = std::env::var("STRATUS_LOG_JSON")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(false);

    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("stratus={},tower_http=info", default_level))
        .add_directive(tracing::Level::WARN.into())
    });

    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .compact()
            .init();
    }
}

async fn run_server(host: String, port: u16, config: StratusConfig) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid address: {}:{}", host, port))?;

    stratus_api::run(addr, config).await
}

async fn run_cleanup(config: StratusConfig) -> Result<()> {
    if config.data_dir.is_none() {
        bail!("cleanup needs a persistent store; set data_dir or STRATUS_DATA_DIR");
    }

    let store = stratus_api::server::open_store(&config)?;
    let api = MessageApi::new(store, config.shared());
    let removed = api.cleanup_expired(&RequestContext::internal_admin()).await?;
    println!("Removed {} expired messages", removed);
    Ok(())
}
