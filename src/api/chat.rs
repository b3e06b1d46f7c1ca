use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::assistant::FallbackError;
use crate::routing::{ensure_sources, FallbackContext, RoutingDecision};
use crate::search::retrieve;
use crate::state::AppState;

/// How many candidates the retriever hands to the router.
const RETRIEVE_LIMIT: usize = 8;
const MIN_SCORE: u32 = 1;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

type ChatResult = Result<Json<ChatResponse>, (StatusCode, Json<ErrorBody>)>;

fn reply(text: impl Into<String>) -> ChatResult {
    Ok(Json(ChatResponse { reply: text.into() }))
}

fn error(status: StatusCode, message: &str, details: Option<String>) -> ChatResult {
    Err((
        status,
        Json(ErrorBody {
            error: message.to_string(),
            details,
        }),
    ))
}

/// POST /api/chat: answer one citizen question.
pub async fn chat(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> ChatResult {
    let Some(message) = req.message else {
        return error(StatusCode::BAD_REQUEST, "Chybí dotaz.", None);
    };
    let question = message.trim();
    if question.is_empty() {
        return reply("Napište prosím dotaz.");
    }

    let kb = match state.kb.snapshot().await {
        Ok(kb) => kb,
        Err(e) => {
            warn!(error = %e, "knowledge base unavailable");
            return match &state.site_url {
                Some(site) => reply(format!(
                    "Tuhle informaci teď nemám k dispozici. Zkuste prosím web obce: {}",
                    site
                )),
                None => error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Znalostní báze není dostupná.",
                    None,
                ),
            };
        }
    };

    let site = kb.site.as_deref().or(state.site_url.as_deref());
    let units = kb.units();
    let candidates = retrieve(&units, question, RETRIEVE_LIMIT, MIN_SCORE);
    let decision = state.router.route(question, &candidates, site);

    match decision {
        RoutingDecision::DirectAnswer { answer, url } => {
            info!(strategy = "direct", "query answered from KB");
            reply(format!("{}\n\n📎 Oficiální odkaz: {}", answer, url))
        }
        RoutingDecision::LinkAnswer { title, url } => {
            info!(strategy = "link", "query answered with a link");
            reply(format!("Najdete to tady:\n📎 {}: {}", title, url))
        }
        RoutingDecision::Fallback { question, context } => {
            run_fallback(&state, &question, context).await
        }
    }
}

/// Delegate to the generative fallback, degrading to a polite reply with
/// the best available link whenever the run cannot produce an answer.
async fn run_fallback(state: &AppState, question: &str, context: FallbackContext) -> ChatResult {
    let Some(orchestrator) = &state.orchestrator else {
        // fallback credentials missing; KB strategies already had their chance
        return match context.best_url() {
            Some(url) => reply(format!(
                "Generativní část asistenta není nastavená. Zkuste prosím tento oficiální odkaz: {}",
                url
            )),
            None => error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Asistent není nakonfigurován.",
                None,
            ),
        };
    };

    match orchestrator.run(question, Some(&context.prompt_text())).await {
        Ok(answer) => {
            info!(strategy = "fallback", "query answered by assistant run");
            reply(ensure_sources(&answer, &context))
        }
        Err(e) => {
            warn!(stage = e.stage(), error = %e, "fallback failed");
            match context.best_url() {
                Some(url) => reply(format!(
                    "Tuhle informaci nemám potvrzenou. Zkuste prosím oficiální odkaz: {}",
                    url
                )),
                None => {
                    let status = match e {
                        FallbackError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                        _ => StatusCode::BAD_GATEWAY,
                    };
                    error(
                        status,
                        "Nepodařilo se získat odpověď. Zkuste to prosím později.",
                        Some(e.stage().to_string()),
                    )
                }
            }
        }
    }
}
