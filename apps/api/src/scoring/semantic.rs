//! Semantic Scorer: pluggable contextual relevance between candidate and job text.
//!
//! Default: `KeywordOverlapScorer` (pure-Rust, deterministic, no I/O).
//! Remote: `LlmSemanticScorer` (Claude judgement via `LlmClient`).
//!
//! `AppState` holds an `Arc<dyn SemanticScorer>`, chosen at startup via config.
//! The engine only relies on the contract: a score in 0–100, 0 for empty input.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::llm_client::LlmClient;
use crate::scoring::prompts::{render_semantic_prompt, SEMANTIC_SYSTEM};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SemanticError {
    #[error("semantic scorer timed out after {0:?}")]
    Timeout(Duration),

    #[error("semantic scorer failed: {0}")]
    Backend(String),

    #[error("semantic scorer returned out-of-range score {0}")]
    InvalidScore(f64),
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Implement this to swap similarity methods without touching the engine.
#[async_trait]
pub trait SemanticScorer: Send + Sync {
    /// Label recorded for transparency ("keyword", "llm", ...).
    fn backend(&self) -> &'static str;

    async fn score(&self, candidate_text: &str, job_text: &str) -> Result<f64, SemanticError>;
}

/// Runs `scorer` under an optional deadline and checks the returned range.
pub async fn score_within(
    scorer: &dyn SemanticScorer,
    candidate_text: &str,
    job_text: &str,
    timeout: Option<Duration>,
) -> Result<f64, SemanticError> {
    let call = scorer.score(candidate_text, job_text);
    let score = match timeout {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| SemanticError::Timeout(limit))??,
        None => call.await?,
    };

    if !score.is_finite() || !(0.0..=100.0).contains(&score) {
        return Err(SemanticError::InvalidScore(score));
    }
    Ok(score)
}

// ────────────────────────────────────────────────────────────────────────────
// KeywordOverlapScorer: default implementation
// ────────────────────────────────────────────────────────────────────────────

/// Share of distinct job-text terms that appear in the candidate text.
///
/// Algorithm:
/// 1. Tokenize both texts (lowercase runs of `[a-z0-9.+#/-]`, stop words dropped)
/// 2. overlap = |job ∩ candidate| / |job| × 100
/// 3. Dampen by hedging phrases in the candidate text ("beginner", "exposed to", ...):
///    factor = max(0.85, 1 − 0.03 × hits)
pub struct KeywordOverlapScorer;

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "in", "is", "it", "of",
    "on", "or", "our", "the", "to", "we", "will", "with", "you", "your",
];

const HEDGES: &[&str] = &[
    " no ",
    " not ",
    " without ",
    " lack of ",
    " beginner",
    " basic",
    " exposed to",
    " familiarity with",
];

#[async_trait]
impl SemanticScorer for KeywordOverlapScorer {
    fn backend(&self) -> &'static str {
        "keyword"
    }

    async fn score(&self, candidate_text: &str, job_text: &str) -> Result<f64, SemanticError> {
        Ok(keyword_overlap(candidate_text, job_text))
    }
}

pub fn keyword_overlap(candidate_text: &str, job_text: &str) -> f64 {
    let job_terms = terms(job_text);
    let candidate_terms = terms(candidate_text);
    if job_terms.is_empty() || candidate_terms.is_empty() {
        return 0.0;
    }

    let shared = job_terms.intersection(&candidate_terms).count();
    let overlap = 100.0 * shared as f64 / job_terms.len() as f64;
    (overlap * hedge_factor(candidate_text)).clamp(0.0, 100.0)
}

fn terms(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '#' | '/' | '-')))
        .map(|t| t.trim_matches(|c: char| matches!(c, '.' | '/' | '-')))
        .filter(|t| !t.is_empty() && !STOP_WORDS.contains(t))
        .map(str::to_string)
        .collect()
}

fn hedge_factor(text: &str) -> f64 {
    let words: Vec<_> = text.to_lowercase().split_whitespace().map(str::to_string).collect();
    let padded = format!(" {} ", words.join(" "));
    let hits: usize = HEDGES.iter().map(|h| padded.matches(h).count()).sum();
    (1.0 - 0.03 * hits as f64).max(0.85)
}

// ────────────────────────────────────────────────────────────────────────────
// LlmSemanticScorer: remote judgement
// ────────────────────────────────────────────────────────────────────────────

/// Asks Claude for a 0–100 relevance judgement. Every failure (transport, API,
/// unparsable JSON) surfaces as `SemanticError::Backend` so the engine can fall back.
pub struct LlmSemanticScorer(pub LlmClient);

#[derive(Debug, Deserialize)]
struct RelevanceJudgement {
    score: f64,
    #[serde(default)]
    rationale: Option<String>,
}

#[async_trait]
impl SemanticScorer for LlmSemanticScorer {
    fn backend(&self) -> &'static str {
        "llm"
    }

    async fn score(&self, candidate_text: &str, job_text: &str) -> Result<f64, SemanticError> {
        if candidate_text.trim().is_empty() || job_text.trim().is_empty() {
            return Ok(0.0);
        }

        let prompt = render_semantic_prompt(job_text, candidate_text);

        let judgement = self
            .0
            .call_json::<RelevanceJudgement>(&prompt, SEMANTIC_SYSTEM)
            .await
            .map_err(|e| SemanticError::Backend(e.to_string()))?;

        debug!(
            score = judgement.score,
            rationale = judgement.rationale.as_deref().unwrap_or(""),
            "LLM relevance judgement"
        );
        Ok(judgement.score)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// FixedSemanticScorer: deterministic stand-in
// ────────────────────────────────────────────────────────────────────────────

/// Always returns the same score. Used where a deterministic capability is
/// needed (tests, dry runs).
pub struct FixedSemanticScorer(pub f64);

#[async_trait]
impl SemanticScorer for FixedSemanticScorer {
    fn backend(&self) -> &'static str {
        "fixed"
    }

    async fn score(&self, _candidate_text: &str, _job_text: &str) -> Result<f64, SemanticError> {
        Ok(self.0)
    }
}
