use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use wclite::cmd::worker::Args;
use wclite::worker;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let dir = args.dir.unwrap_or_else(|| PathBuf::from("."));
    info!(driver = %args.join, "worker starting");

    worker::run(&args.join, &dir).await
}
