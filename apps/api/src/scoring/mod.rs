// Hybrid candidate scoring engine.
// Implements: skill normalization, rubric, semantic, experience and gap scoring,
// the weighted blend, and batch ranking.
// Remote semantic judgements go through llm_client; everything else is pure.

pub mod aggregator;
pub mod breakdown;
pub mod engine;
pub mod errors;
pub mod experience;
pub mod explain;
pub mod gap;
pub mod handlers;
pub mod models;
pub mod normalizer;
pub mod prompts;
pub mod ranking;
pub mod rubric;
pub mod semantic;

// Re-export the public API consumed by handlers and the binary.
pub use breakdown::{RejectedResult, ScoreBreakdown, ScoreOutcome, SkillDetail};
pub use engine::score_candidate;
pub use errors::ScoringError;
pub use models::{
    CandidateProfile, CandidateSkill, CriticalSkillPolicy, JobProfile, JobProfileSpec,
    Percentage, ScoringConfig, ScoringWeights, SemanticFallback, SkillAdjacency,
    SkillRequirement,
};
pub use ranking::{rank_candidates, RankingReport};
pub use semantic::{
    FixedSemanticScorer, KeywordOverlapScorer, LlmSemanticScorer, SemanticError, SemanticScorer,
};
