//! Payroll engine HTTP server.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use payroll_engine::api::{AppState, create_router};
use payroll_engine::config::ConfigLoader;
use payroll_engine::store::PayrollStore;

/// Payroll engine server.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding engine.yaml, tax.yaml and thr.yaml.
    #[arg(short, long, default_value = "./config/payroll")]
    config: PathBuf,

    /// Address to bind the server to.
    #[arg(short, long, default_value = "127.0.0.1:3000")]
    bind: SocketAddr,

    /// JSON store snapshot to start from. Starts empty if not provided.
    #[arg(short, long)]
    seed: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ConfigLoader::load(&args.config)?;
    info!(
        config = %args.config.display(),
        rule_version = %config.engine().rule_version,
        "Configuration loaded"
    );

    let store = match &args.seed {
        Some(path) => {
            info!(seed = %path.display(), "Loading store snapshot");
            PayrollStore::from_json_file(path)?
        }
        None => PayrollStore::new(),
    };

    let app = create_router(AppState::with_store(config, store));

    info!(addr = %args.bind, "Server listening");
    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
