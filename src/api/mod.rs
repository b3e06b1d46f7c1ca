pub mod chat;

use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

async fn health() -> &'static str {
    "ok"
}

/// Build the HTTP router: the chat endpoint, a health probe, permissive
/// CORS for the website widget, and request tracing.
pub fn build_router(state: AppState) -> axum::Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    axum::Router::new()
        .route("/api/chat", post(chat::chat))
        .route("/healthz", get(health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
