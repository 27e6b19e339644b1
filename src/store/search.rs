//! Hybrid retrieval: lexical-first scoring with a vector-similarity assist.
//!
//! The embedding stage may be a low-fidelity placeholder, so the weights
//! deliberately subordinate cosine similarity to exact keyword matches. The
//! formula below is the behavioral contract; anyone swapping in a real
//! embedding provider is expected to re-tune it.

use super::{Document, Store};
use crate::config::ScoringProfile;

const BASE_WEIGHT: f64 = 0.1;
const QUERY_HIT_WEIGHT: f64 = 2.0;
const LENGTH_WEIGHT: f64 = 0.3;
const LENGTH_DIVISOR: f64 = 500.0;
const LENGTH_CAP: f64 = 2.0;
const DENSITY_BOOST: f64 = 1.0;
const MIN_SCORE: f64 = 0.1;
const MAX_RESULTS: usize = 20;

/// Fallback keywords for callers that have none of their own.
const DEFAULT_KEYWORDS: [&str; 3] = ["cloudwalk", "produto", "serviço"];

#[derive(Debug)]
struct Scored<'a> {
    doc: &'a Document,
    score: f64,
}

impl Store {
    /// Rank the corpus against a query embedding plus the query's keywords.
    ///
    /// Returns at most 20 documents with score above the minimum relevance
    /// threshold, best first. Ties keep store order (stable sort). Each call
    /// recomputes from scratch over the immutable snapshot.
    #[must_use]
    pub fn search_with_keywords(
        &self,
        query_vector: &[f32],
        keywords: &[String],
        profile: &ScoringProfile,
    ) -> Vec<Document> {
        let mut results: Vec<Scored<'_>> = Vec::new();
        for doc in self.documents() {
            let content_lower = doc.content.to_lowercase();

            let base = cosine_similarity(query_vector, &doc.vector);

            let query_hits = count_hits(&content_lower, keywords);
            let product_hits = count_hits(&content_lower, &profile.product.terms);
            let company_hits = count_hits(&content_lower, &profile.company.terms);

            let length_score = (doc.content.len() as f64 / LENGTH_DIVISOR).min(LENGTH_CAP);

            let density_boost = if product_hits >= profile.product.density_threshold
                || company_hits >= profile.company.density_threshold
            {
                DENSITY_BOOST
            } else {
                0.0
            };

            let score = base * BASE_WEIGHT
                + query_hits as f64 * QUERY_HIT_WEIGHT
                + product_hits as f64 * profile.product.weight
                + company_hits as f64 * profile.company.weight
                + length_score * LENGTH_WEIGHT
                + density_boost;

            if score > MIN_SCORE {
                results.push(Scored { doc, score });
            }
        }

        // Stable sort: equal scores keep crawl order.
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(MAX_RESULTS);

        results.into_iter().map(|r| r.doc.clone()).collect()
    }

    /// Similarity-only entry point for callers with no user-supplied keywords.
    #[must_use]
    pub fn search(&self, query_vector: &[f32], profile: &ScoringProfile) -> Vec<Document> {
        let keywords: Vec<String> = DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect();
        self.search_with_keywords(query_vector, &keywords, profile)
    }
}

/// Count how many terms occur as substrings of the (already lowercased) content.
fn count_hits(content_lower: &str, terms: &[String]) -> usize {
    terms
        .iter()
        .filter(|t| !t.is_empty() && content_lower.contains(t.to_lowercase().as_str()))
        .count()
}

/// Cosine similarity of two vectors.
///
/// Returns `0.0` when the lengths differ or either vector has zero norm.
/// That is a neutral fallback, not an error: documents without a usable
/// embedding simply get no vector contribution.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += f64::from(*x) * f64::from(*y);
        norm_a += f64::from(*x) * f64::from(*x);
        norm_b += f64::from(*y) * f64::from(*y);
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}
