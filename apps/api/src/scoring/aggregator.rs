//! Hybrid Aggregator: blends the component scores into the final score.
//!
//! `final = clamp(0, 100, α·rubric + β·semantic + γ·experience − δ·gap)`
//!
//! A `CapAt` verdict from gap evaluation is applied after the blend. When the
//! semantic component is unavailable, the configured `SemanticFallback` decides
//! the weights actually applied; they are recorded on the breakdown.

use crate::scoring::breakdown::{ScoreBreakdown, SemanticStatus, SkillDetail};
use crate::scoring::gap::{GapEvaluation, GapVerdict};
use crate::scoring::models::{ScoringConfig, ScoringWeights, SemanticFallback, WEIGHT_EPSILON};
use crate::scoring::semantic::SemanticError;

/// Component scores entering the blend.
#[derive(Debug, Clone)]
pub struct ComponentScores {
    pub rubric: f64,
    pub semantic: Result<f64, SemanticError>,
    pub semantic_backend: &'static str,
    pub experience: f64,
}

pub fn blend(
    weights: ScoringWeights,
    rubric: f64,
    semantic: f64,
    experience: f64,
    gap: f64,
) -> f64 {
    (weights.alpha * rubric + weights.beta * semantic + weights.gamma * experience
        - weights.delta * gap)
        .clamp(0.0, 100.0)
}

/// Weights to apply when the semantic component is missing.
pub fn fallback_weights(weights: ScoringWeights, fallback: SemanticFallback) -> ScoringWeights {
    match fallback {
        SemanticFallback::Zero => weights,
        SemanticFallback::Renormalize => {
            let remaining = 1.0 - weights.beta;
            if remaining <= WEIGHT_EPSILON {
                return ScoringWeights {
                    alpha: 0.0,
                    beta: 0.0,
                    gamma: 0.0,
                    delta: 0.0,
                };
            }
            ScoringWeights {
                alpha: weights.alpha / remaining,
                beta: 0.0,
                gamma: weights.gamma / remaining,
                delta: weights.delta / remaining,
            }
        }
    }
}

pub fn aggregate(
    candidate_id: &str,
    job_id: &str,
    config: &ScoringConfig,
    scores: ComponentScores,
    gap: GapEvaluation,
    per_skill_detail: Vec<SkillDetail>,
) -> ScoreBreakdown {
    let backend = scores.semantic_backend.to_string();
    let (semantic_score, applied_weights, semantic) = match scores.semantic {
        Ok(score) => (score, config.weights(), SemanticStatus::Available { backend }),
        Err(e) => {
            let fallback = config.semantic_fallback();
            (
                0.0,
                fallback_weights(config.weights(), fallback),
                SemanticStatus::Unavailable {
                    backend,
                    reason: e.to_string(),
                    fallback,
                },
            )
        }
    };

    let blended = blend(
        applied_weights,
        scores.rubric,
        semantic_score,
        scores.experience,
        gap.gap_penalty,
    );

    let score_cap = match gap.verdict {
        GapVerdict::CapAt(ceiling) => Some(ceiling),
        GapVerdict::Continue | GapVerdict::Reject => None,
    };
    let final_score = match score_cap {
        Some(ceiling) => blended.min(ceiling),
        None => blended,
    };

    ScoreBreakdown {
        candidate_id: candidate_id.to_string(),
        job_id: job_id.to_string(),
        rubric_score: scores.rubric,
        semantic_score,
        experience_score: scores.experience,
        gap_penalty: gap.gap_penalty,
        final_score,
        per_skill_detail,
        semantic,
        applied_weights,
        unmet_critical: gap.unmet_critical,
        score_cap,
    }
}
