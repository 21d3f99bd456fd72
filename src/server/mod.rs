//! HTTP transport for the chat service.
//!
//! Routes are served both at the root and under `/api` so the existing web
//! frontend and direct callers hit the same handlers.

mod handlers;
pub mod protocol;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::services::{ChatService, TranscriptStore};

pub use handlers::{BANNER, MAX_SESSION_ID_LEN, TRANSCRIPT_FILENAME};

#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatService>,
    pub transcripts: Arc<TranscriptStore>,
}

impl AppState {
    pub fn new(chat: ChatService) -> Self {
        Self {
            chat: Arc::new(chat),
            transcripts: Arc::new(TranscriptStore::new()),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/chat", post(handlers::chat))
        .route("/health", get(handlers::health))
        .route("/transcript", get(handlers::transcript));

    Router::new()
        .route("/", get(handlers::banner))
        .merge(api.clone())
        .nest("/api", api)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until `shutdown` resolves, letting in-flight requests finish.
pub async fn serve<F>(state: AppState, addr: SocketAddr, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr).await?;
    info!(address = %listener.local_addr()?, "Jarvis backend listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server stopped");
    Ok(())
}
