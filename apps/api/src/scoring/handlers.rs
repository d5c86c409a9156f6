//! Axum route handlers for the Scoring API.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::scoring::breakdown::ScoreOutcome;
use crate::scoring::engine::score_candidate;
use crate::scoring::errors::ScoringError;
use crate::scoring::explain::{explain, Explanation};
use crate::scoring::models::{
    CandidateProfile, CriticalSkillPolicy, JobProfile, JobProfileSpec, ScoringConfig,
    ScoringConfigSpec, ScoringWeights, SemanticFallback, SkillAdjacency,
};
use crate::scoring::ranking::{
    rank_candidates_with_concurrency, CandidateFailure, RankedCandidate, DEFAULT_SHORTLIST_CUTOFF,
    DEFAULT_SHORTLIST_SIZE,
};
use crate::state::AppState;

const WEAKEST_SKILLS_SHOWN: usize = 3;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct DefaultsResponse {
    pub weights: ScoringWeights,
    pub policy: String,
    pub semantic_backend: &'static str,
    pub semantic_timeout_ms: Option<u64>,
    pub semantic_fallback: SemanticFallback,
    pub adjacencies: Vec<SkillAdjacency>,
}

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub candidate: CandidateProfile,
    pub job: JobProfileSpec,
    /// Overrides the service defaults for this call.
    pub config: Option<ScoringConfigSpec>,
    /// `cap:<pct>`, `flat:<pct>` or `auto_reject`.
    pub policy: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub outcome: ScoreOutcome,
    pub explanation: Explanation,
}

#[derive(Debug, Deserialize)]
pub struct ShortlistParams {
    pub cutoff: Option<f64>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct RankRequest {
    /// Decoded one by one so a malformed candidate only fails itself.
    pub candidates: Vec<Value>,
    pub job: JobProfileSpec,
    pub config: Option<ScoringConfigSpec>,
    pub policy: Option<String>,
    pub shortlist: Option<ShortlistParams>,
}

#[derive(Debug, Serialize)]
pub struct RankedEntry {
    #[serde(flatten)]
    pub ranked: RankedCandidate,
    pub explanation: Explanation,
}

#[derive(Debug, Serialize)]
pub struct RankResponse {
    pub job_id: String,
    pub ranked: Vec<RankedEntry>,
    /// Candidate ids, best first.
    pub shortlist: Vec<String>,
    pub failures: Vec<CandidateFailure>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/scoring/defaults
///
/// Returns the weights, policy and adjacency table this service applies when a
/// request does not override them.
pub async fn handle_defaults(State(state): State<AppState>) -> Json<DefaultsResponse> {
    let config = state.config.scoring;
    Json(DefaultsResponse {
        weights: config.weights(),
        policy: state.config.policy.to_string(),
        semantic_backend: state.semantic.backend(),
        semantic_timeout_ms: config.semantic_timeout().map(|d| d.as_millis() as u64),
        semantic_fallback: config.semantic_fallback(),
        adjacencies: state.default_adjacencies.clone(),
    })
}

/// POST /api/v1/scoring/score
///
/// Scores one candidate against one job and returns the full breakdown.
pub async fn handle_score(
    State(state): State<AppState>,
    payload: Result<Json<ScoreRequest>, JsonRejection>,
) -> Result<Json<ScoreResponse>, AppError> {
    let Json(request) = payload?;
    let job = JobProfile::new(request.job)?;
    let (config, policy) = resolve_settings(&state, request.config, request.policy.as_deref())?;

    let outcome =
        score_candidate(&request.candidate, &job, &config, state.semantic.as_ref(), policy).await?;
    let explanation = explain(&outcome, WEAKEST_SKILLS_SHOWN);

    Ok(Json(ScoreResponse {
        outcome,
        explanation,
    }))
}

/// POST /api/v1/scoring/rank
///
/// Ranks a batch of candidates for one job. Candidates with invalid input are
/// listed under `failures`; the rest of the batch is still ranked.
pub async fn handle_rank(
    State(state): State<AppState>,
    payload: Result<Json<RankRequest>, JsonRejection>,
) -> Result<Json<RankResponse>, AppError> {
    let Json(request) = payload?;
    if request.candidates.is_empty() {
        return Err(AppError::Validation("candidates cannot be empty".to_string()));
    }

    let job = JobProfile::new(request.job)?;
    let (config, policy) = resolve_settings(&state, request.config, request.policy.as_deref())?;

    let parsed = parse_candidates(request.candidates);

    let report = rank_candidates_with_concurrency(
        &parsed.candidates,
        &job,
        &config,
        state.semantic.as_ref(),
        policy,
        state.config.rank_concurrency,
    )
    .await;

    let (cutoff, limit) = match request.shortlist {
        Some(params) => (
            params.cutoff.unwrap_or(DEFAULT_SHORTLIST_CUTOFF),
            params.limit.unwrap_or(DEFAULT_SHORTLIST_SIZE),
        ),
        None => (DEFAULT_SHORTLIST_CUTOFF, DEFAULT_SHORTLIST_SIZE),
    };
    let shortlist = report
        .shortlist(cutoff, limit)
        .into_iter()
        .map(|r| r.candidate_id.clone())
        .collect();

    let mut failures = parsed.failures;
    failures.extend(report.failures.into_iter().map(|mut failure| {
        failure.index = parsed.positions[failure.index];
        failure
    }));
    failures.sort_by_key(|f| f.index);

    let ranked = report
        .ranked
        .into_iter()
        .map(|ranked| {
            let explanation = explain(&ranked.outcome, WEAKEST_SKILLS_SHOWN);
            RankedEntry {
                ranked,
                explanation,
            }
        })
        .collect();

    Ok(Json(RankResponse {
        job_id: report.job_id,
        ranked,
        shortlist,
        failures,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

struct ParsedCandidates {
    candidates: Vec<CandidateProfile>,
    /// Batch index of each entry in `candidates`.
    positions: Vec<usize>,
    failures: Vec<CandidateFailure>,
}

fn parse_candidates(raw: Vec<Value>) -> ParsedCandidates {
    let mut parsed = ParsedCandidates {
        candidates: Vec::with_capacity(raw.len()),
        positions: Vec::with_capacity(raw.len()),
        failures: Vec::new(),
    };
    for (index, value) in raw.into_iter().enumerate() {
        let candidate_id = value
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        match serde_json::from_value::<CandidateProfile>(value) {
            Ok(candidate) => {
                parsed.candidates.push(candidate);
                parsed.positions.push(index);
            }
            Err(e) => {
                let err = ScoringError::invalid_input(format!("candidate at index {index}: {e}"));
                parsed.failures.push(CandidateFailure {
                    index,
                    candidate_id,
                    code: err.code(),
                    message: err.to_string(),
                });
            }
        }
    }
    parsed
}

/// Request overrides win over the service defaults. Both are validated before
/// any candidate is scored.
fn resolve_settings(
    state: &AppState,
    config: Option<ScoringConfigSpec>,
    policy: Option<&str>,
) -> Result<(ScoringConfig, CriticalSkillPolicy), AppError> {
    let config = match config {
        Some(spec) => spec.over(&state.config.scoring)?,
        None => state.config.scoring,
    };
    let policy = match policy {
        Some(raw) => raw.parse::<CriticalSkillPolicy>()?,
        None => state.config.policy,
    };
    Ok((config, policy))
}
