//! Completion collaborator: `(context, question) → answer` via the Gemini
//! generateContent API.
//!
//! Only the assembled context (ranked passages joined by blank lines) and
//! the question cross this boundary. Failures here are request-scoped and
//! never touch the document store.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const GENERATE_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("GEMINI_API_KEY environment variable is required")]
    MissingApiKey,

    #[error("completion request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("completion API returned status {0}: {1}")]
    Status(u16, String),

    #[error("completion API returned no candidates")]
    EmptyResponse,
}

// ── Wire types ───────────────────────────────────────────────────────

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

// ── Client ───────────────────────────────────────────────────────────

/// HTTP client for the completion provider.
pub struct GeminiClient {
    api_key: String,
    client: reqwest::Client,
}

impl GeminiClient {
    /// Build a client from `GEMINI_API_KEY`. Missing key is an error the
    /// caller treats as fatal at startup.
    pub fn from_env() -> Result<Self, GeneratorError> {
        let api_key =
            std::env::var("GEMINI_API_KEY").map_err(|_| GeneratorError::MissingApiKey)?;
        Self::new(api_key)
    }

    pub fn new(api_key: String) -> Result<Self, GeneratorError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { api_key, client })
    }

    /// Generate an answer grounded in the retrieved context.
    pub async fn generate_answer(
        &self,
        context: &str,
        question: &str,
    ) -> Result<String, GeneratorError> {
        let prompt = build_prompt(context, question);
        debug!("Generating answer ({} context chars)", context.len());

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let resp = self
            .client
            .post(format!("{GENERATE_URL}?key={}", self.api_key))
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GeneratorError::Status(status.as_u16(), body));
        }

        let parsed: GenerateResponse = resp.json().await?;
        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or(GeneratorError::EmptyResponse)
    }
}

/// Assemble the generation prompt: context block, question, answer rules.
fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "You are a virtual assistant answering questions about CloudWalk and its products.\n\
         \n\
         CONTEXT:\n\
         {context}\n\
         \n\
         QUESTION: {question}\n\
         \n\
         INSTRUCTIONS:\n\
         - Answer clearly, directly, and objectively\n\
         - Use only information from the context above\n\
         - Organize the answer in short paragraphs\n\
         - If the context is insufficient, say so politely\n\
         \n\
         ANSWER:"
    )
}
