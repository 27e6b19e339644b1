//! Configuration loading, validation, and defaults.
//!
//! The config is a JSON file; every field has a default so a partial file
//! works. A missing file yields the defaults (and a generated template for
//! the default path); invalid JSON falls back to defaults with a warning
//! rather than failing startup.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

// ── Default value functions ──────────────────────────────────────────

fn default_cache_path() -> String {
    "./documents_cache.json".to_string()
}

fn default_cache_ttl_hours() -> u64 {
    24
}

fn default_dimensions() -> usize {
    384
}

fn default_min_content_len() -> usize {
    20
}

fn default_embed_delay_ms() -> u64 {
    100
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_max_depth() -> usize {
    3
}

fn default_allowed_domains() -> Vec<String> {
    vec![
        "www.cloudwalk.io".to_string(),
        "cloudwalk.io".to_string(),
        "infinitepay.io".to_string(),
        "help.infinitepay.io".to_string(),
    ]
}

fn default_seed_urls() -> Vec<String> {
    [
        "https://www.cloudwalk.io/",
        "https://www.cloudwalk.io/en",
        "https://www.cloudwalk.io/en/mission",
        "https://www.cloudwalk.io/en/about",
        "https://www.cloudwalk.io/en/products",
        "https://www.cloudwalk.io/en/solutions",
        "https://www.cloudwalk.io/infinitepay",
        "https://www.cloudwalk.io/stratus",
        "https://infinitepay.io/",
        "https://infinitepay.io/maquininha",
        "https://infinitepay.io/produtos",
        "https://infinitepay.io/conta-digital",
        "https://help.infinitepay.io/",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_product_weight() -> f64 {
    1.5
}

fn default_company_weight() -> f64 {
    1.0
}

fn default_density_threshold() -> usize {
    3
}

fn default_product_terms() -> Vec<String> {
    [
        "produto",
        "serviço",
        "solução",
        "oferece",
        "maquininha",
        "infinitepay",
        "stratus",
        "conta",
        "digital",
        "pagamento",
        "pix",
        "cartão",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_company_terms() -> Vec<String> {
    [
        "cloudwalk", "empresa", "fintech", "tecnologia", "missão", "objetivo", "atua",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

// ── Config structs ───────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default = "default_cache_path")]
    pub cache_path: String,

    /// Freshness window for the persisted corpus, in hours.
    #[serde(default = "default_cache_ttl_hours")]
    pub cache_ttl_hours: u64,

    /// Embedding vector dimension shared by every document in a snapshot.
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    /// Minimum normalized passage length accepted at ingestion time.
    /// Independent of the crawler's own capture thresholds.
    #[serde(default = "default_min_content_len")]
    pub min_content_len: usize,

    /// Fixed delay between embedding calls, in milliseconds (provider
    /// rate limit).
    #[serde(default = "default_embed_delay_ms")]
    pub embed_delay_ms: u64,

    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default)]
    pub crawl: CrawlConfig,

    #[serde(default)]
    pub scoring: ScoringProfile,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CrawlConfig {
    #[serde(default = "default_seed_urls")]
    pub seed_urls: Vec<String>,

    #[serde(default = "default_allowed_domains")]
    pub allowed_domains: Vec<String>,

    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

/// Domain vocabulary for the hybrid ranker.
///
/// The keyword sets are configuration rather than constants so the
/// vocabulary can be swapped for another company without touching the
/// ranking logic.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ScoringProfile {
    #[serde(default = "ScoringProfile::default_product")]
    pub product: KeywordSet,

    #[serde(default = "ScoringProfile::default_company")]
    pub company: KeywordSet,
}

/// One role's terms, per-hit weight, and the hit count that triggers the
/// density boost.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct KeywordSet {
    pub weight: f64,

    #[serde(default = "default_density_threshold")]
    pub density_threshold: usize,

    pub terms: Vec<String>,
}

// ── Default impls ────────────────────────────────────────────────────

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_path: default_cache_path(),
            cache_ttl_hours: default_cache_ttl_hours(),
            dimensions: default_dimensions(),
            min_content_len: default_min_content_len(),
            embed_delay_ms: default_embed_delay_ms(),
            listen_addr: default_listen_addr(),
            crawl: CrawlConfig::default(),
            scoring: ScoringProfile::default(),
        }
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            seed_urls: default_seed_urls(),
            allowed_domains: default_allowed_domains(),
            max_depth: default_max_depth(),
        }
    }
}

impl ScoringProfile {
    fn default_product() -> KeywordSet {
        KeywordSet {
            weight: default_product_weight(),
            density_threshold: default_density_threshold(),
            terms: default_product_terms(),
        }
    }

    fn default_company() -> KeywordSet {
        KeywordSet {
            weight: default_company_weight(),
            density_threshold: default_density_threshold(),
            terms: default_company_terms(),
        }
    }
}

impl Default for ScoringProfile {
    fn default() -> Self {
        Self {
            product: Self::default_product(),
            company: Self::default_company(),
        }
    }
}

// ── Config implementation ────────────────────────────────────────────

impl Config {
    /// Load configuration from a JSON file.
    ///
    /// If `config_path` is empty, defaults to `"config.json"`.
    /// If the file does not exist, returns a default config and generates
    /// a template file for the default path.
    pub fn load(config_path: &str) -> Result<Self> {
        let path = if config_path.is_empty() {
            "config.json"
        } else {
            config_path
        };

        if !Path::new(path).exists() {
            info!("{path} not found, using defaults");
            let cfg = Self::default();

            if path == "config.json" {
                match cfg.save(path) {
                    Ok(()) => info!("Generated config template: {path}"),
                    Err(e) => warn!("Failed to generate config template: {e}"),
                }
            }

            return Ok(cfg);
        }

        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {path}"))?;

        let cfg: Config = match serde_json::from_str(&data) {
            Ok(c) => c,
            Err(e) => {
                warn!("Invalid JSON in {path}: {e}");
                warn!("Using default configuration");
                return Ok(Self::default());
            }
        };

        info!("Loaded configuration from {path}");
        Ok(cfg)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &str) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("failed to marshal config")?;
        std::fs::write(path, data).with_context(|| format!("failed to write config: {path}"))?;
        Ok(())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.dimensions > 0, "dimensions must be positive");
        anyhow::ensure!(self.cache_ttl_hours > 0, "cache_ttl_hours must be positive");
        anyhow::ensure!(
            !self.crawl.seed_urls.is_empty(),
            "at least one seed URL must be specified"
        );
        anyhow::ensure!(
            !self.crawl.allowed_domains.is_empty(),
            "at least one allowed domain must be specified"
        );
        anyhow::ensure!(
            self.scoring.product.density_threshold > 0
                && self.scoring.company.density_threshold > 0,
            "density thresholds must be positive"
        );
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────────
