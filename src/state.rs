use std::sync::Arc;

use crate::assistant::Orchestrator;
use crate::kb::KbStore;
use crate::routing::Router;

/// Shared, read-only service state. Requests only ever read from it;
/// per-request data lives on the stack of the handler.
#[derive(Clone)]
pub struct AppState {
    pub kb: Arc<KbStore>,
    pub router: Arc<Router>,
    /// None when the assistant credentials are not configured; the
    /// KB-direct and KB-link strategies still work.
    pub orchestrator: Option<Arc<Orchestrator>>,
    /// Official site fallback when the KB does not carry one.
    pub site_url: Option<String>,
}
