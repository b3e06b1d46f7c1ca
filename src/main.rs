use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn, Level};

use obecbot::api;
use obecbot::assistant::{AssistantClient, Orchestrator, PollPolicy};
use obecbot::kb::KbStore;
use obecbot::routing::Router;
use obecbot::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let _ = dotenv::dotenv();

    let kb_path = PathBuf::from(dotenv::var("KB_PATH").unwrap_or_else(|_| "kb/kb.json".to_string()));
    let kb_ttl = dotenv::var("KB_CACHE_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(60);
    let kb = Arc::new(KbStore::new(kb_path.clone(), Duration::from_secs(kb_ttl)));

    // probe once so a broken KB shows up in the log at startup; requests
    // still recover per-request
    match kb.snapshot().await {
        Ok(snapshot) => info!(
            path = %kb_path.display(),
            entries = snapshot.entries.len(),
            chunks = snapshot.chunks.len(),
            "knowledge base loaded"
        ),
        Err(e) => warn!(path = %kb_path.display(), error = %e, "knowledge base not readable"),
    }

    let site_url = dotenv::var("SITE_URL").ok().filter(|s| !s.is_empty());

    let orchestrator = match AssistantClient::from_env() {
        Ok(client) => {
            info!("generative fallback enabled");
            Some(Arc::new(Orchestrator::new(
                Arc::new(client),
                PollPolicy::from_env(),
            )))
        }
        Err(e) => {
            warn!(error = %e, "generative fallback disabled");
            None
        }
    };

    let state = AppState {
        kb,
        router: Arc::new(Router::default()),
        orchestrator,
        site_url,
    };

    let port = dotenv::var("PORT").unwrap_or_else(|_| "8787".to_string());
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "obecbot listening");

    axum::serve(listener, api::build_router(state)).await?;

    Ok(())
}
