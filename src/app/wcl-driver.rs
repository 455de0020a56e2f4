use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tonic::transport::Server;
use tracing::info;
use tracing_subscriber::EnvFilter;

use wclite::cmd::driver::{self, Args};
use wclite::driver::WordCountService;
use wclite::rpc::word_count_server::WordCountServer;
use wclite::workspace;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let port = args.port.unwrap_or(50051);
    let dir = args.dir.unwrap_or_else(|| PathBuf::from("."));
    let (n_map, n_reduce) = driver::task_counts(&args)?;

    // A fresh run must never observe artifacts from a previous one.
    info!("cleaning up the workspace before starting the driver");
    workspace::clean(&dir)?;

    let service = WordCountService::new(n_map, n_reduce)?;
    let addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;
    info!(%addr, n_map, n_reduce, "driver listening");

    Server::builder()
        .add_service(WordCountServer::new(service))
        .serve(addr)
        .await?;

    Ok(())
}
