//! Batch ranking of many candidates against one job.
//!
//! Candidates are scored concurrently (bounded by `concurrency`) and share only
//! read-only inputs. One candidate's input error is reported as a per-item
//! failure and never aborts the batch.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::info;

use crate::scoring::breakdown::ScoreOutcome;
use crate::scoring::engine::score_candidate;
use crate::scoring::models::{CandidateProfile, CriticalSkillPolicy, JobProfile, ScoringConfig};
use crate::scoring::semantic::SemanticScorer;

pub const DEFAULT_RANK_CONCURRENCY: usize = 8;
pub const DEFAULT_SHORTLIST_CUTOFF: f64 = 75.0;
pub const DEFAULT_SHORTLIST_SIZE: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCandidate {
    /// 1-based position.
    pub rank: usize,
    pub candidate_id: String,
    pub outcome: ScoreOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateFailure {
    /// Position in the submitted batch.
    pub index: usize,
    pub candidate_id: String,
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingReport {
    pub job_id: String,
    /// Sorted by final score descending, ties by candidate id ascending.
    pub ranked: Vec<RankedCandidate>,
    /// Failed candidates in submission order.
    pub failures: Vec<CandidateFailure>,
}

impl RankingReport {
    /// Non-rejected candidates scoring at least `cutoff`, best first, at most `limit`.
    pub fn shortlist(&self, cutoff: f64, limit: usize) -> Vec<&RankedCandidate> {
        self.ranked
            .iter()
            .filter(|r| !r.outcome.is_rejected() && r.outcome.final_score() >= cutoff)
            .take(limit)
            .collect()
    }
}

pub async fn rank_candidates(
    candidates: &[CandidateProfile],
    job: &JobProfile,
    config: &ScoringConfig,
    semantic: &dyn SemanticScorer,
    policy: CriticalSkillPolicy,
) -> RankingReport {
    rank_candidates_with_concurrency(
        candidates,
        job,
        config,
        semantic,
        policy,
        DEFAULT_RANK_CONCURRENCY,
    )
    .await
}

pub async fn rank_candidates_with_concurrency(
    candidates: &[CandidateProfile],
    job: &JobProfile,
    config: &ScoringConfig,
    semantic: &dyn SemanticScorer,
    policy: CriticalSkillPolicy,
    concurrency: usize,
) -> RankingReport {
    let pending: Vec<_> = candidates
        .iter()
        .enumerate()
        .map(|(index, candidate)| async move {
            let result = score_candidate(candidate, job, config, semantic, policy).await;
            (index, candidate, result)
        })
        .collect();
    let results: Vec<_> = stream::iter(pending)
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut ranked = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for (index, candidate, result) in results {
        match result {
            Ok(outcome) => ranked.push(RankedCandidate {
                rank: 0,
                candidate_id: candidate.id.clone(),
                outcome,
            }),
            Err(e) => failures.push(CandidateFailure {
                index,
                candidate_id: candidate.id.clone(),
                code: e.code(),
                message: e.to_string(),
            }),
        }
    }

    ranked.sort_by(|a, b| {
        b.outcome
            .final_score()
            .total_cmp(&a.outcome.final_score())
            .then_with(|| a.candidate_id.cmp(&b.candidate_id))
    });
    for (position, entry) in ranked.iter_mut().enumerate() {
        entry.rank = position + 1;
    }

    let rejected = ranked.iter().filter(|r| r.outcome.is_rejected()).count();
    info!(
        job_id = job.id(),
        scored = ranked.len() - rejected,
        rejected,
        failed = failures.len(),
        "Ranked candidates"
    );

    RankingReport {
        job_id: job.id().to_string(),
        ranked,
        failures,
    }
}
