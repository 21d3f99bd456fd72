use std::future::Future;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use super::build_chat_service;
use crate::models::Config;
use crate::server::{AppState, serve};

#[derive(Debug, Args)]
pub struct ServeArgs {
    #[arg(long, help = "Address to bind (overrides config)")]
    pub host: Option<String>,

    #[arg(long, short = 'p', help = "Port to listen on (overrides config and PORT)")]
    pub port: Option<u16>,
}

pub async fn handle_serve<F>(args: ServeArgs, config: Config, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    config.validate().context("invalid configuration")?;

    let host = args.host.unwrap_or_else(|| config.server.host.clone());
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("invalid listen address: {host}:{port}"))?;

    let chat = build_chat_service(&config)?;
    info!(
        llm = %config.llm.base_url,
        model = %config.llm.model,
        collection = config.vector_store.collection.as_deref().unwrap_or_default(),
        "Starting Jarvis backend"
    );

    serve(AppState::new(chat), addr, shutdown)
        .await
        .with_context(|| format!("server on {addr} failed"))
}
