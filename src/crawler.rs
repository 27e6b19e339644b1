//! Site crawler: seed URLs → raw `(content, source)` passages.
//!
//! An external collaborator from the retrieval core's point of view. Fetches
//! pages breadth-first within a domain allow-list and depth limit, extracting
//! text blocks with CSS selectors. The `visited` set is owned by a single
//! crawl session, so repeated crawls never share state.
//!
//! Capture thresholds here (50 chars for blocks, 30 for paragraphs) are the
//! crawler's own policy and independent of the ingestion-time length filter.

use std::collections::{HashSet, VecDeque};
use std::time::Duration;

use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::CrawlConfig;
use crate::ingest::RawPassage;

const MIN_BLOCK_LEN: usize = 50;
const MIN_PARAGRAPH_LEN: usize = 30;
const MIN_HEADING_LEN: usize = 5;
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const FETCH_DELAY: Duration = Duration::from_millis(200);

#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("HTTP client setup failed: {0}")]
    Client(#[from] reqwest::Error),
}

/// Crawl the configured seed URLs and return every captured passage.
///
/// Individual fetch failures are logged and skipped; the call itself only
/// fails when the HTTP client cannot be constructed. Whether an empty
/// result is fatal is the caller's decision.
pub async fn crawl(config: &CrawlConfig) -> Result<Vec<RawPassage>, CrawlError> {
    let client = reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .user_agent(concat!("webrag-crawler/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let allowed: HashSet<&str> = config.allowed_domains.iter().map(String::as_str).collect();

    // Per-session state; never shared across crawls.
    let mut visited: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<(Url, usize)> = VecDeque::new();
    let mut passages = Vec::new();

    for seed in &config.seed_urls {
        match Url::parse(seed) {
            Ok(url) => {
                if visited.insert(url.as_str().to_string()) {
                    queue.push_back((url, 0));
                }
            }
            Err(e) => warn!("Skipping invalid seed URL {seed}: {e}"),
        }
    }

    let mut pages = 0usize;
    while let Some((url, depth)) = queue.pop_front() {
        debug!("Fetching {url} (depth {depth})");

        let body = match fetch_page(&client, &url).await {
            Ok(b) => b,
            Err(e) => {
                warn!("Failed to fetch {url}: {e}");
                continue;
            }
        };
        pages += 1;

        let extract = extract_page(&body, &url);
        passages.extend(extract.passages);

        if depth < config.max_depth {
            for link in extract.links {
                if !is_allowed(&link, &allowed) {
                    continue;
                }
                if visited.insert(link.as_str().to_string()) {
                    queue.push_back((link, depth + 1));
                }
            }
        }

        tokio::time::sleep(FETCH_DELAY).await;
    }

    info!("Crawl finished: {} passages from {pages} pages", passages.len());
    Ok(passages)
}

async fn fetch_page(client: &reqwest::Client, url: &Url) -> Result<String, reqwest::Error> {
    let resp = client.get(url.clone()).send().await?.error_for_status()?;
    resp.text().await
}

struct PageExtract {
    passages: Vec<RawPassage>,
    links: Vec<Url>,
}

fn is_allowed(url: &Url, allowed: &HashSet<&str>) -> bool {
    matches!(url.scheme(), "http" | "https")
        && url.host_str().is_some_and(|h| allowed.contains(h))
}

/// Pull text passages and outgoing links from one HTML page.
fn extract_page(body: &str, url: &Url) -> PageExtract {
    // Selectors are static and known-good.
    let block_sel = Selector::parse(
        "article, section, main, div.content, div[class*='content'], div[class*='text']",
    )
    .unwrap();
    let paragraph_sel = Selector::parse("p, li").unwrap();
    let heading_sel = Selector::parse("h1, h2, h3").unwrap();
    let link_sel = Selector::parse("a[href]").unwrap();

    let doc = Html::parse_document(body);
    let source = url.as_str().to_string();
    let mut passages = Vec::new();

    // Larger contextual blocks first.
    for element in doc.select(&block_sel) {
        let text = collapse(element.text());
        if text.len() > MIN_BLOCK_LEN && !text.contains("Cookie") {
            passages.push(RawPassage {
                content: text,
                source: source.clone(),
            });
        }
    }

    // Individual paragraphs and list items as backup.
    for element in doc.select(&paragraph_sel) {
        let text = collapse(element.text());
        if text.len() > MIN_PARAGRAPH_LEN {
            passages.push(RawPassage {
                content: text,
                source: source.clone(),
            });
        }
    }

    // Headings, with the following sibling element for context.
    for element in doc.select(&heading_sel) {
        let title = collapse(element.text());
        if title.len() > MIN_HEADING_LEN {
            let content = match element.next_siblings().find_map(ElementRef::wrap) {
                Some(next) => {
                    let context = collapse(next.text());
                    if context.is_empty() {
                        title
                    } else {
                        format!("{title} - {context}")
                    }
                }
                None => title,
            };
            passages.push(RawPassage {
                content,
                source: source.clone(),
            });
        }
    }

    let links = doc
        .select(&link_sel)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| url.join(href).ok())
        .map(|mut u| {
            // Fragments point inside a page we already capture whole.
            u.set_fragment(None);
            u
        })
        .collect();

    PageExtract { passages, links }
}

fn collapse<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    let joined = parts.collect::<Vec<_>>().join(" ");
    joined.split_whitespace().collect::<Vec<_>>().join(" ")
}
