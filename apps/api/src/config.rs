use anyhow::{Context, Result};

use crate::scoring::ranking::DEFAULT_RANK_CONCURRENCY;
use crate::scoring::{CriticalSkillPolicy, ScoringConfig, ScoringWeights, SemanticFallback};

pub const DEFAULT_LLM_MODEL: &str = "claude-sonnet-4-5";
const DEFAULT_SEMANTIC_TIMEOUT_MS: u64 = 3000;

/// Application configuration loaded from environment variables.
/// Startup fails if any scoring default is malformed.
#[derive(Debug, Clone)]
pub struct Config {
    /// When set, semantic scoring is delegated to Claude.
    pub anthropic_api_key: Option<String>,
    pub llm_model: String,
    pub port: u16,
    pub rust_log: String,
    /// Service-wide defaults, overridable per request.
    pub scoring: ScoringConfig,
    pub policy: CriticalSkillPolicy,
    pub rank_concurrency: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let weights = ScoringWeights {
            alpha: parse_or(var("SCORING_ALPHA"), "SCORING_ALPHA", 0.55)?,
            beta: parse_or(var("SCORING_BETA"), "SCORING_BETA", 0.25)?,
            gamma: parse_or(var("SCORING_GAMMA"), "SCORING_GAMMA", 0.10)?,
            delta: parse_or(var("SCORING_DELTA"), "SCORING_DELTA", 0.10)?,
        };

        let fallback = match var("SEMANTIC_FALLBACK") {
            Some(raw) => raw
                .parse::<SemanticFallback>()
                .context("SEMANTIC_FALLBACK is invalid")?,
            None => SemanticFallback::default(),
        };

        let timeout_ms = parse_or(
            var("SEMANTIC_TIMEOUT_MS"),
            "SEMANTIC_TIMEOUT_MS",
            DEFAULT_SEMANTIC_TIMEOUT_MS,
        )?;
        let scoring = ScoringConfig::new(weights)
            .context("SCORING_ALPHA..SCORING_DELTA do not form a valid weight split")?
            .with_semantic_fallback(fallback)
            .with_semantic_timeout_ms(timeout_ms);

        let policy = match var("CRITICAL_SKILL_POLICY") {
            Some(raw) => raw
                .parse::<CriticalSkillPolicy>()
                .context("CRITICAL_SKILL_POLICY is invalid")?,
            None => CriticalSkillPolicy::default(),
        };

        let rank_concurrency = parse_or(
            var("RANK_CONCURRENCY"),
            "RANK_CONCURRENCY",
            DEFAULT_RANK_CONCURRENCY,
        )?;
        if rank_concurrency == 0 {
            anyhow::bail!("RANK_CONCURRENCY must be at least 1");
        }

        Ok(Config {
            anthropic_api_key: var("ANTHROPIC_API_KEY"),
            llm_model: var("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            port: parse_or(var("PORT"), "PORT", 8080)?,
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            scoring,
            policy,
            rank_concurrency,
        })
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) => value
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{value}'")),
        None => Ok(default),
    }
}
