//! # webrag — Web-presence RAG Server
//!
//! Answers natural-language questions about a company's public websites by
//! retrieving relevant crawled passages and feeding them as context to a
//! completion provider.
//!
//! ## Architecture
//!
//! - **[`config`]** — JSON configuration with defaults, plus the swappable
//!   scoring vocabulary
//! - **[`crawler`]** — seed-list crawler with a domain allow-list and depth
//!   limit (external collaborator)
//! - **[`ingest`]** — filter/normalize/embed loop turning raw passages into
//!   a document snapshot
//! - **[`store`]** — immutable in-memory document store and the hybrid
//!   keyword+vector retrieval engine
//! - **[`cache`]** — on-disk snapshot persistence with a freshness window
//! - **[`embedder`]** — embedding trait plus the deterministic hash
//!   placeholder
//! - **[`gemini`]** — completion provider client
//! - **[`server`]** — axum HTTP endpoints (`/chat`, `/health`,
//!   `/clear-cache`, `/debug-search`)

pub mod cache;
pub mod config;
pub mod crawler;
pub mod embedder;
pub mod gemini;
pub mod ingest;
pub mod server;
pub mod store;
