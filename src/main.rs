use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use webrag::cache::CacheManager;
use webrag::config::Config;
use webrag::crawler;
use webrag::embedder::hash::HashEmbedder;
use webrag::gemini::GeminiClient;
use webrag::ingest;
use webrag::server::{self, AppState};
use webrag::store::Store;

#[derive(Parser, Debug)]
#[command(version, about = "Web-presence RAG server")]
struct Args {
    /// Path to the JSON config file
    #[arg(short, long, default_value = "")]
    config: String,

    /// Override the listen address from the config
    #[arg(long)]
    addr: Option<String>,

    /// Discard the persisted cache and re-ingest before serving
    #[arg(long)]
    refresh: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional; real env vars win either way.
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let config = Config::load(&args.config)?;
    config.validate().context("invalid configuration")?;

    let generator = Arc::new(GeminiClient::from_env().context("completion provider setup")?);
    let embedder: Arc<dyn webrag::embedder::Embedder> =
        Arc::new(HashEmbedder::new(config.dimensions));
    let cache = Arc::new(CacheManager::new(
        &config.cache_path,
        config.cache_ttl_hours,
        config.dimensions,
    ));

    if args.refresh {
        cache.clear().context("failed to clear cache")?;
    }

    // Cache first; any load problem falls through to a fresh ingestion.
    let mut documents = None;
    if cache.is_valid() {
        match cache.load() {
            Ok(docs) => documents = Some(docs),
            Err(e) => warn!("Cache load failed, re-ingesting: {e}"),
        }
    }

    let documents = match documents {
        Some(docs) => docs,
        None => {
            info!("No valid cache, starting crawl");
            let raw = crawler::crawl(&config.crawl)
                .await
                .context("crawl failed")?;

            let docs = ingest::build_snapshot(
                raw,
                embedder.as_ref(),
                config.min_content_len,
                Duration::from_millis(config.embed_delay_ms),
            )
            .await;

            // Without a corpus there is nothing to serve.
            anyhow::ensure!(!docs.is_empty(), "ingestion produced no documents");

            if let Err(e) = cache.save(&docs) {
                warn!("Cache save failed (continuing with in-memory snapshot): {e}");
            }
            docs
        }
    };

    info!("Serving {} documents", documents.len());

    // Snapshot published: read-only from here on.
    let state = AppState {
        store: Arc::new(Store::new(documents)),
        embedder,
        generator,
        cache,
        profile: Arc::new(config.scoring.clone()),
    };

    let addr = args.addr.unwrap_or_else(|| config.listen_addr.clone());
    server::run(&addr, state).await
}
