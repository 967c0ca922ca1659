//! DevAssist command-line client.

mod api;
mod cli;
mod commands;
mod context;
mod store;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::api::ApiClient;
use crate::cli::Cli;
use crate::context::ClientContext;
use crate::store::SessionStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();

    let api = ApiClient::new(&cli.api_url)?;
    let store = SessionStore::default_location()?;
    let mut ctx = ClientContext::new(api, store)?;

    commands::run(&mut ctx, cli.command).await
}
