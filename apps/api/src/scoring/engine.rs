//! `score_candidate`: the per-request scoring pipeline.
//!
//! Stages: Normalized → Scored → GapEvaluated → {Aggregated | Rejected}.
//!
//! The engine owns no state and no cache. Rubric, experience and gap evaluation
//! depend only on the normalized pairs, so an auto-reject is decided before the
//! semantic capability is called; a rejected candidate never costs a semantic call.
//! Input errors abort the call before any output is built.

use tracing::{debug, warn};

use crate::scoring::aggregator::{aggregate, ComponentScores};
use crate::scoring::breakdown::{RejectReason, RejectedResult, ScoreOutcome, SkillDetail};
use crate::scoring::errors::ScoringError;
use crate::scoring::experience::experience_score;
use crate::scoring::gap::{evaluate_gaps, GapVerdict};
use crate::scoring::models::{CandidateProfile, CriticalSkillPolicy, JobProfile, ScoringConfig};
use crate::scoring::normalizer::normalize;
use crate::scoring::rubric::rubric_score;
use crate::scoring::semantic::{score_within, SemanticScorer};

pub async fn score_candidate(
    candidate: &CandidateProfile,
    job: &JobProfile,
    config: &ScoringConfig,
    semantic: &dyn SemanticScorer,
    policy: CriticalSkillPolicy,
) -> Result<ScoreOutcome, ScoringError> {
    candidate.validate()?;

    let pairs = normalize(candidate, job);
    debug!(candidate_id = %candidate.id, job_id = job.id(), "Normalized candidate skills");

    let rubric = rubric_score(job, &pairs)?;
    let experience = experience_score(candidate.years_experience, job.target_experience_years());
    let per_skill_detail: Vec<SkillDetail> = pairs.iter().map(SkillDetail::from_pair).collect();

    let gap = evaluate_gaps(&pairs, policy);
    debug!(
        candidate_id = %candidate.id,
        job_id = job.id(),
        gap_penalty = gap.gap_penalty,
        unmet_critical = gap.unmet_critical.len(),
        %policy,
        "Gap evaluated"
    );

    if gap.verdict == GapVerdict::Reject {
        debug!(
            candidate_id = %candidate.id,
            job_id = job.id(),
            "Rejected by critical skill policy"
        );
        return Ok(ScoreOutcome::Rejected(RejectedResult {
            candidate_id: candidate.id.clone(),
            job_id: job.id().to_string(),
            reason: RejectReason::MissingCriticalSkills {
                skills: gap.unmet_critical,
            },
            final_score: 0.0,
            rubric_score: rubric,
            experience_score: experience,
            gap_penalty: gap.gap_penalty,
            per_skill_detail,
        }));
    }

    let semantic_result = score_within(
        semantic,
        &candidate.narrative_text,
        job.narrative_text(),
        config.semantic_timeout(),
    )
    .await;
    if let Err(e) = &semantic_result {
        warn!(
            candidate_id = %candidate.id,
            job_id = job.id(),
            backend = semantic.backend(),
            fallback = ?config.semantic_fallback(),
            "Semantic score unavailable: {e}"
        );
    }
    debug!(
        candidate_id = %candidate.id,
        job_id = job.id(),
        rubric,
        experience,
        semantic = semantic_result.as_ref().ok().copied(),
        "Component scores computed"
    );

    let breakdown = aggregate(
        &candidate.id,
        job.id(),
        config,
        ComponentScores {
            rubric,
            semantic: semantic_result,
            semantic_backend: semantic.backend(),
            experience,
        },
        gap,
        per_skill_detail,
    );
    debug!(
        candidate_id = %candidate.id,
        job_id = job.id(),
        final_score = breakdown.final_score(),
        "Aggregated"
    );

    Ok(ScoreOutcome::Aggregated(breakdown))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::scoring::breakdown::SemanticStatus;
    use crate::scoring::models::{
        CandidateSkill, JobProfileSpec, Percentage, SkillAdjacency, SkillRequirement,
    };
    use crate::scoring::normalizer::SkillSource;
    use crate::scoring::semantic::{FixedSemanticScorer, KeywordOverlapScorer, SemanticError};

    struct CountingScorer(AtomicUsize);

    #[async_trait]
    impl SemanticScorer for CountingScorer {
        fn backend(&self) -> &'static str {
            "counting"
        }

        async fn score(&self, _: &str, _: &str) -> Result<f64, SemanticError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(50.0)
        }
    }

    struct HangingScorer;

    #[async_trait]
    impl SemanticScorer for HangingScorer {
        fn backend(&self) -> &'static str {
            "hanging"
        }

        async fn score(&self, _: &str, _: &str) -> Result<f64, SemanticError> {
            std::future::pending::<()>().await;
            Ok(100.0)
        }
    }

    fn analyst_job() -> JobProfile {
        let req = |name: &str, weight: f64, min_level: u8, critical: bool| SkillRequirement {
            name: name.to_string(),
            weight,
            min_level,
            critical,
        };
        JobProfile::new(JobProfileSpec {
            id: "senior-data-analyst".to_string(),
            requirements: vec![
                req("Python", 0.3, 3, false),
                req("SQL", 0.25, 2, false),
                req("Pandas", 0.25, 2, false),
                req("AWS", 0.2, 3, true),
            ],
            adjacencies: vec![
                SkillAdjacency::new("GCP", "AWS", 0.7),
                SkillAdjacency::new("Excel", "Pandas", 0.8),
            ],
            target_experience_years: 4.0,
            narrative_text: "Python SQL analytics dashboards stakeholders".to_string(),
            aliases: BTreeMap::new(),
        })
        .unwrap()
    }

    fn candidate(id: &str, skills: &[(&str, f64)], years: f64) -> CandidateProfile {
        CandidateProfile {
            id: id.to_string(),
            skills: skills
                .iter()
                .map(|(name, level)| CandidateSkill {
                    name: name.to_string(),
                    level: *level,
                })
                .collect(),
            years_experience: years,
            narrative_text: "Built Python and SQL analytics dashboards for stakeholders"
                .to_string(),
        }
    }

    #[tokio::test]
    async fn test_exact_minimums_give_full_rubric_and_no_gap() {
        let job = analyst_job();
        let c = candidate(
            "c1",
            &[("Python", 3.0), ("SQL", 2.0), ("Pandas", 2.0), ("AWS", 3.0)],
            4.0,
        );
        let outcome = score_candidate(
            &c,
            &job,
            &ScoringConfig::default(),
            &FixedSemanticScorer(80.0),
            CriticalSkillPolicy::AutoReject,
        )
        .await
        .unwrap();

        let b = outcome.breakdown().expect("aggregated");
        assert!((b.rubric_score() - 100.0).abs() < 1e-9);
        assert_eq!(b.gap_penalty(), 0.0);
        assert_eq!(b.experience_score(), 100.0);
        // 55 + 0.25·80 + 10 = 85
        assert!((b.final_score() - 85.0).abs() < 1e-9);
        assert!(b.per_skill_detail().iter().all(|d| d.source == SkillSource::Direct && d.met));
    }

    #[tokio::test]
    async fn test_gcp_substitutes_for_aws() {
        let job = analyst_job();
        let c = candidate(
            "c2",
            &[("Python", 3.0), ("SQL", 2.0), ("Pandas", 2.0), ("GCP", 5.0)],
            4.0,
        );
        let outcome = score_candidate(
            &c,
            &job,
            &ScoringConfig::default(),
            &FixedSemanticScorer(80.0),
            CriticalSkillPolicy::AutoReject,
        )
        .await
        .unwrap();

        let aws = &outcome.per_skill_detail()[3];
        assert_eq!(aws.skill, "AWS");
        assert_eq!(aws.source, SkillSource::Adjacent);
        assert!((aws.achieved - 3.5).abs() < 1e-9);
        assert!(aws.met);
        assert!((aws.contribution - 20.0).abs() < 1e-9);
        assert!(!outcome.is_rejected());
    }

    #[tokio::test]
    async fn test_auto_reject_short_circuits_without_semantic_call() {
        let job = analyst_job();
        let scorer = CountingScorer(AtomicUsize::new(0));
        let c = candidate("c3", &[("Python", 5.0), ("SQL", 5.0), ("Pandas", 5.0)], 10.0);
        let outcome = score_candidate(
            &c,
            &job,
            &ScoringConfig::default(),
            &scorer,
            CriticalSkillPolicy::AutoReject,
        )
        .await
        .unwrap();

        assert!(outcome.is_rejected());
        assert_eq!(outcome.final_score(), 0.0);
        assert_eq!(scorer.0.load(Ordering::SeqCst), 0);
        match outcome {
            ScoreOutcome::Rejected(r) => {
                assert_eq!(r.missing_critical(), ["AWS".to_string()]);
                assert!((r.rubric_score() - 80.0).abs() < 1e-9);
            }
            ScoreOutcome::Aggregated(_) => panic!("expected rejection"),
        }
    }

    #[tokio::test]
    async fn test_cap_policy_clamps_final_score() {
        let job = analyst_job();
        let c = candidate(
            "c4",
            &[("Python", 5.0), ("SQL", 5.0), ("Pandas", 5.0), ("AWS", 2.0)],
            10.0,
        );
        let policy = CriticalSkillPolicy::CapAt(Percentage::new(55.0).unwrap());
        let outcome = score_candidate(
            &c,
            &job,
            &ScoringConfig::default(),
            &FixedSemanticScorer(100.0),
            policy,
        )
        .await
        .unwrap();

        let b = outcome.breakdown().unwrap();
        assert_eq!(b.final_score(), 55.0);
        assert_eq!(b.unmet_critical(), ["AWS".to_string()]);
    }

    #[tokio::test]
    async fn test_flat_policy_raises_gap_penalty() {
        let job = analyst_job();
        let c = candidate(
            "c5",
            &[("Python", 5.0), ("SQL", 5.0), ("Pandas", 5.0), ("AWS", 2.0)],
            10.0,
        );
        let policy = CriticalSkillPolicy::FlatGapPenalty(Percentage::new(10.0).unwrap());
        let outcome = score_candidate(
            &c,
            &job,
            &ScoringConfig::default(),
            &FixedSemanticScorer(100.0),
            policy,
        )
        .await
        .unwrap();

        // AWS 2/3 → 0.2 × (1/3) × 100 = 6.67, plus flat 10
        let b = outcome.breakdown().unwrap();
        assert!((b.gap_penalty() - (20.0 / 3.0 + 10.0)).abs() < 1e-9);
        assert!(b.score_cap().is_none());
    }

    #[tokio::test]
    async fn test_invalid_candidate_is_rejected_as_input_error() {
        let job = analyst_job();
        let c = candidate("c6", &[("Python", 9.0)], 3.0);
        let err = score_candidate(
            &c,
            &job,
            &ScoringConfig::default(),
            &FixedSemanticScorer(50.0),
            CriticalSkillPolicy::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ScoringError::InvalidInput(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_semantic_timeout_falls_back_and_is_recorded() {
        let job = analyst_job();
        let c = candidate(
            "c7",
            &[("Python", 3.0), ("SQL", 2.0), ("Pandas", 2.0), ("AWS", 3.0)],
            4.0,
        );
        let config = ScoringConfig::default().with_semantic_timeout(Duration::from_millis(200));
        let outcome = score_candidate(
            &c,
            &job,
            &config,
            &HangingScorer,
            CriticalSkillPolicy::default(),
        )
        .await
        .unwrap();

        let b = outcome.breakdown().unwrap();
        assert!(!b.semantic().is_available());
        assert!(matches!(b.semantic(), SemanticStatus::Unavailable { .. }));
        // (55 + 10) / 0.75
        assert!((b.final_score() - 65.0 / 0.75).abs() < 1e-9, "got {}", b.final_score());
    }

    #[tokio::test]
    async fn test_scoring_is_idempotent() {
        let job = analyst_job();
        let c = candidate("c8", &[("Python", 2.0), ("Excel", 4.0), ("GCP", 3.0)], 2.5);
        let config = ScoringConfig::default();
        let first = score_candidate(
            &c,
            &job,
            &config,
            &KeywordOverlapScorer,
            CriticalSkillPolicy::default(),
        )
        .await
        .unwrap();
        let second = score_candidate(
            &c,
            &job,
            &config,
            &KeywordOverlapScorer,
            CriticalSkillPolicy::default(),
        )
        .await
        .unwrap();

        assert_eq!(first, second);
        assert_eq!(first.final_score().to_bits(), second.final_score().to_bits());
    }

    #[tokio::test]
    async fn test_final_score_in_range_across_configs() {
        let job = analyst_job();
        let candidates = [
            candidate("a", &[], 0.0),
            candidate(
                "b",
                &[("Python", 5.0), ("SQL", 5.0), ("Pandas", 5.0), ("AWS", 5.0)],
                30.0,
            ),
            candidate("c", &[("R", 5.0), ("Excel", 1.0)], 1.0),
        ];
        let configs = [
            ScoringConfig::default(),
            ScoringConfig::new(crate::scoring::models::ScoringWeights {
                alpha: 0.0,
                beta: 0.0,
                gamma: 0.0,
                delta: 1.0,
            })
            .unwrap(),
        ];
        for config in &configs {
            for c in &candidates {
                let outcome = score_candidate(
                    c,
                    &job,
                    config,
                    &FixedSemanticScorer(100.0),
                    CriticalSkillPolicy::default(),
                )
                .await
                .unwrap();
                assert!((0.0..=100.0).contains(&outcome.final_score()));
            }
        }
    }
}
