//! HTTP boundary: a thin wrapper around the retrieval core.
//!
//! The core's observable output is the ranked document sequence; everything
//! here (framing, status codes, error strings) is transport plumbing.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::cache::CacheManager;
use crate::config::ScoringProfile;
use crate::embedder::Embedder;
use crate::gemini::GeminiClient;
use crate::store::{Document, Store};

const DEBUG_PREVIEW_LEN: usize = 200;

/// Shared application state. The store is immutable after publish, so no
/// locking is needed for concurrent requests.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub embedder: Arc<dyn Embedder>,
    pub generator: Arc<GeminiClient>,
    pub cache: Arc<CacheManager>,
    pub profile: Arc<ScoringProfile>,
}

#[derive(Deserialize)]
pub struct ChatRequest {
    pub question: String,
}

#[derive(Serialize, Default)]
pub struct ChatResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
struct DebugDoc {
    content: String,
    source: String,
    length: usize,
}

#[derive(Serialize)]
struct DebugResponse {
    question: String,
    keywords: Vec<String>,
    documents: Vec<DebugDoc>,
    total_context: usize,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/health", get(health))
        .route("/clear-cache", post(clear_cache))
        .route("/debug-search", post(debug_search))
        .with_state(state)
}

/// Bind and serve until shutdown.
pub async fn run(addr: &str, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {addr}");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

// ── Handlers ─────────────────────────────────────────────────────────

async fn chat(State(state): State<AppState>, Json(req): Json<ChatRequest>) -> Json<ChatResponse> {
    let question = req.question.trim();
    if question.is_empty() {
        return Json(error_response("question must not be empty"));
    }

    let query_vector = match state.embedder.embed(question) {
        Ok(v) => v,
        Err(e) => {
            warn!("Query embedding failed: {e}");
            return Json(error_response("failed to process question"));
        }
    };

    let keywords = question_keywords(question);
    let docs = state
        .store
        .search_with_keywords(&query_vector, &keywords, &state.profile);
    let context = build_context(&docs);

    match state.generator.generate_answer(&context, question).await {
        Ok(answer) => Json(ChatResponse {
            answer: Some(answer),
            error: None,
        }),
        Err(e) => {
            error!("Answer generation failed: {e}");
            Json(error_response("failed to generate answer"))
        }
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn clear_cache(State(state): State<AppState>) -> (StatusCode, &'static str) {
    match state.cache.clear() {
        Ok(()) => (StatusCode::OK, "cache cleared"),
        Err(e) => {
            error!("Failed to clear cache: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to clear cache")
        }
    }
}

/// Inspect what retrieval would feed the generator for a question.
async fn debug_search(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<DebugResponse>, StatusCode> {
    let question = req.question.trim();
    if question.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }

    let query_vector = state.embedder.embed(question).unwrap_or_default();
    let keywords = question_keywords(question);
    let docs = state
        .store
        .search_with_keywords(&query_vector, &keywords, &state.profile);

    let documents = docs
        .iter()
        .map(|d| DebugDoc {
            content: preview(&d.content),
            source: d.source.clone(),
            length: d.content.len(),
        })
        .collect();

    Ok(Json(DebugResponse {
        question: question.to_string(),
        keywords,
        total_context: docs.len(),
        documents,
    }))
}

// ── Helpers ──────────────────────────────────────────────────────────

fn error_response(msg: &str) -> ChatResponse {
    ChatResponse {
        answer: None,
        error: Some(msg.to_string()),
    }
}

/// Keywords for the lexical side of the ranker: the lowercased question,
/// whitespace-split.
pub fn question_keywords(question: &str) -> Vec<String> {
    question
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Concatenate ranked documents' text, most relevant first, joined by
/// blank lines. This string is all that crosses the generation boundary.
pub fn build_context(docs: &[Document]) -> String {
    docs.iter()
        .map(|d| d.content.as_str())
        .filter(|c| !c.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn preview(content: &str) -> String {
    if content.len() <= DEBUG_PREVIEW_LEN {
        return content.to_string();
    }
    let mut end = DEBUG_PREVIEW_LEN;
    while !content.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &content[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(content: &str) -> Document {
        Document {
            id: "doc_0".to_string(),
            content: content.to_string(),
            source: "https://example.com".to_string(),
            vector: vec![0.0; 4],
        }
    }

    #[test]
    fn test_question_keywords_lowercased_and_split() {
        let kw = question_keywords("What IS   InfinitePay?");
        assert_eq!(kw, vec!["what", "is", "infinitepay?"]);
    }

    #[test]
    fn test_build_context_joins_with_blank_lines() {
        let docs = vec![doc("first passage"), doc("second passage")];
        assert_eq!(build_context(&docs), "first passage\n\nsecond passage");
    }

    #[test]
    fn test_build_context_skips_blank_content() {
        let docs = vec![doc("kept"), doc("   ")];
        assert_eq!(build_context(&docs), "kept");
    }

    #[test]
    fn test_preview_truncates_long_content() {
        let long = "x".repeat(300);
        let p = preview(&long);
        assert_eq!(p.len(), DEBUG_PREVIEW_LEN + 3);
        assert!(p.ends_with("..."));
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        // Multi-byte characters straddling the cut point must not panic.
        let text = "é".repeat(150);
        let p = preview(&text);
        assert!(p.ends_with("..."));
    }
}
