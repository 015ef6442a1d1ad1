use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    chat_handler, clear_handler, health_handler, history_handler, models_handler, test_handler,
};
use crate::state::AppState;

/// Assemble the HTTP surface. When `static_dir` is set, unmatched paths are
/// served from it so a chat page can live next to the API.
pub fn build_router(state: AppState, static_dir: Option<&str>) -> Router {
    let mut app = Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/api/clear", post(clear_handler))
        .route("/api/history", get(history_handler))
        .route("/api/models", get(models_handler))
        .route("/health", get(health_handler))
        .route("/test", get(test_handler));

    if let Some(dir) = static_dir {
        tracing::info!("Serving static files from {}", dir);
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(
    state: AppState,
    addr: SocketAddr,
    static_dir: Option<String>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> anyhow::Result<()> {
    let app = build_router(state, static_dir.as_deref());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
            tracing::info!("Server shutting down signal received");
        })
        .await?;

    Ok(())
}
