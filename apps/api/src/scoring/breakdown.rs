//! Scoring outputs. A `ScoreOutcome` is built once per (candidate, job, config)
//! and never mutated afterwards; its fields are only readable through accessors.

use serde::Serialize;

use crate::scoring::models::{ScoringWeights, SemanticFallback};
use crate::scoring::normalizer::{AdjacencyUse, NormalizedRequirement, SkillSource};
use crate::scoring::rubric::line_contribution;

/// Per-requirement explanation row, in job declaration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillDetail {
    pub skill: String,
    pub weight: f64,
    pub required: u8,
    pub achieved: f64,
    pub source: SkillSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub via: Option<AdjacencyUse>,
    pub critical: bool,
    pub met: bool,
    /// Rubric points this line item earned.
    pub contribution: f64,
}

impl SkillDetail {
    pub fn from_pair(pair: &NormalizedRequirement<'_>) -> Self {
        Self {
            skill: pair.requirement.name.clone(),
            weight: pair.requirement.weight,
            required: pair.requirement.min_level,
            achieved: pair.achieved_level,
            source: pair.source,
            via: pair.via.clone(),
            critical: pair.requirement.critical,
            met: pair.is_met(),
            contribution: line_contribution(pair),
        }
    }

    /// Capped line-item credit, 0.0 – 1.0.
    pub fn ratio(&self) -> f64 {
        (self.achieved / f64::from(self.required)).clamp(0.0, 1.0)
    }
}

/// Whether the semantic component took part in the blend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SemanticStatus {
    Available {
        backend: String,
    },
    Unavailable {
        backend: String,
        reason: String,
        fallback: SemanticFallback,
    },
}

impl SemanticStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, SemanticStatus::Available { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub(crate) candidate_id: String,
    pub(crate) job_id: String,
    pub(crate) rubric_score: f64,
    pub(crate) semantic_score: f64,
    pub(crate) experience_score: f64,
    pub(crate) gap_penalty: f64,
    pub(crate) final_score: f64,
    pub(crate) per_skill_detail: Vec<SkillDetail>,
    pub(crate) semantic: SemanticStatus,
    /// Weights actually used in the blend (differs from the config after renormalization).
    pub(crate) applied_weights: ScoringWeights,
    pub(crate) unmet_critical: Vec<String>,
    /// Ceiling in force from a `CapAt` policy, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) score_cap: Option<f64>,
}

impl ScoreBreakdown {
    pub fn candidate_id(&self) -> &str {
        &self.candidate_id
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn rubric_score(&self) -> f64 {
        self.rubric_score
    }

    pub fn semantic_score(&self) -> f64 {
        self.semantic_score
    }

    pub fn experience_score(&self) -> f64 {
        self.experience_score
    }

    pub fn gap_penalty(&self) -> f64 {
        self.gap_penalty
    }

    pub fn final_score(&self) -> f64 {
        self.final_score
    }

    pub fn per_skill_detail(&self) -> &[SkillDetail] {
        &self.per_skill_detail
    }

    pub fn semantic(&self) -> &SemanticStatus {
        &self.semantic
    }

    pub fn applied_weights(&self) -> ScoringWeights {
        self.applied_weights
    }

    pub fn unmet_critical(&self) -> &[String] {
        &self.unmet_critical
    }

    pub fn score_cap(&self) -> Option<f64> {
        self.score_cap
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum RejectReason {
    MissingCriticalSkills { skills: Vec<String> },
}

/// Terminal result of the auto-reject policy. Not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedResult {
    pub(crate) candidate_id: String,
    pub(crate) job_id: String,
    pub(crate) reason: RejectReason,
    pub(crate) final_score: f64,
    pub(crate) rubric_score: f64,
    pub(crate) experience_score: f64,
    pub(crate) gap_penalty: f64,
    pub(crate) per_skill_detail: Vec<SkillDetail>,
}

impl RejectedResult {
    pub fn candidate_id(&self) -> &str {
        &self.candidate_id
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn reason(&self) -> &RejectReason {
        &self.reason
    }

    pub fn final_score(&self) -> f64 {
        self.final_score
    }

    pub fn rubric_score(&self) -> f64 {
        self.rubric_score
    }

    pub fn experience_score(&self) -> f64 {
        self.experience_score
    }

    pub fn gap_penalty(&self) -> f64 {
        self.gap_penalty
    }

    pub fn per_skill_detail(&self) -> &[SkillDetail] {
        &self.per_skill_detail
    }

    pub fn missing_critical(&self) -> &[String] {
        match &self.reason {
            RejectReason::MissingCriticalSkills { skills } => skills,
        }
    }
}

/// `Aggregated` for the normal path, `Rejected` for the auto-reject exit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ScoreOutcome {
    Aggregated(ScoreBreakdown),
    Rejected(RejectedResult),
}

impl ScoreOutcome {
    pub fn candidate_id(&self) -> &str {
        match self {
            ScoreOutcome::Aggregated(b) => b.candidate_id(),
            ScoreOutcome::Rejected(r) => r.candidate_id(),
        }
    }

    pub fn final_score(&self) -> f64 {
        match self {
            ScoreOutcome::Aggregated(b) => b.final_score(),
            ScoreOutcome::Rejected(r) => r.final_score(),
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, ScoreOutcome::Rejected(_))
    }

    pub fn breakdown(&self) -> Option<&ScoreBreakdown> {
        match self {
            ScoreOutcome::Aggregated(b) => Some(b),
            ScoreOutcome::Rejected(_) => None,
        }
    }

    pub fn per_skill_detail(&self) -> &[SkillDetail] {
        match self {
            ScoreOutcome::Aggregated(b) => b.per_skill_detail(),
            ScoreOutcome::Rejected(r) => r.per_skill_detail(),
        }
    }
}
