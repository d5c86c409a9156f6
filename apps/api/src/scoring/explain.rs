//! "Why" cards for the job overview and comparison views.

use serde::Serialize;

use crate::scoring::breakdown::{ScoreOutcome, SemanticStatus, SkillDetail};
use crate::scoring::normalizer::SkillSource;

/// Compact explanation rendered next to a candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanation {
    pub recommendation: String,
    pub weakest_skills: Vec<SkillDetail>,
    /// e.g. "GCP → AWS (0.7)"
    pub adjacent_credit: Vec<String>,
}

pub fn explain(outcome: &ScoreOutcome, weakest: usize) -> Explanation {
    Explanation {
        recommendation: recommendation(outcome),
        weakest_skills: weakest_skills(outcome.per_skill_detail(), weakest)
            .into_iter()
            .cloned()
            .collect(),
        adjacent_credit: adjacent_credit(outcome.per_skill_detail()),
    }
}

/// Unmet line items, lowest credit first; ties keep declaration order.
pub fn weakest_skills(details: &[SkillDetail], n: usize) -> Vec<&SkillDetail> {
    let mut unmet: Vec<&SkillDetail> = details.iter().filter(|d| !d.met).collect();
    unmet.sort_by(|a, b| a.ratio().total_cmp(&b.ratio()));
    unmet.truncate(n);
    unmet
}

pub fn adjacent_credit(details: &[SkillDetail]) -> Vec<String> {
    details
        .iter()
        .filter(|d| d.source == SkillSource::Adjacent)
        .filter_map(|d| {
            d.via
                .as_ref()
                .map(|via| format!("{} → {} ({})", via.from_skill, d.skill, via.decay))
        })
        .collect()
}

pub fn recommendation(outcome: &ScoreOutcome) -> String {
    let breakdown = match outcome {
        ScoreOutcome::Rejected(rejected) => {
            return format!(
                "Rejected: missing critical skills: {}.",
                rejected.missing_critical().join(", ")
            );
        }
        ScoreOutcome::Aggregated(b) => b,
    };

    let final_score = breakdown.final_score();
    // Rounded for display only.
    let score = final_score.round() as u32;
    let top_gaps: Vec<&str> = weakest_skills(breakdown.per_skill_detail(), 3)
        .into_iter()
        .map(|d| d.skill.as_str())
        .collect();

    let mut text = if final_score >= 80.0 {
        "Strong fit. Candidate meets the key requirements.".to_string()
    } else if final_score >= 60.0 {
        if top_gaps.is_empty() {
            format!("Moderate fit ({score}/100).")
        } else {
            format!("Moderate fit ({score}/100). Gaps to review: {}.", top_gaps.join(", "))
        }
    } else if top_gaps.is_empty() {
        format!("Low fit ({score}/100).")
    } else {
        format!("Low fit ({score}/100). Significant gaps: {}.", top_gaps.join(", "))
    };

    if !breakdown.unmet_critical().is_empty() {
        text.push_str(&format!(
            " Critical skills below minimum: {}.",
            breakdown.unmet_critical().join(", ")
        ));
    }
    if let SemanticStatus::Unavailable { .. } = breakdown.semantic() {
        text.push_str(" Semantic score unavailable.");
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::breakdown::{RejectReason, RejectedResult, ScoreBreakdown};
    use crate::scoring::models::{ScoringWeights, SemanticFallback};
    use crate::scoring::normalizer::AdjacencyUse;

    fn detail(skill: &str, required: u8, achieved: f64, source: SkillSource) -> SkillDetail {
        SkillDetail {
            skill: skill.to_string(),
            weight: 0.25,
            required,
            achieved,
            source,
            via: None,
            critical: false,
            met: achieved >= f64::from(required),
            contribution: 0.0,
        }
    }

    fn breakdown(
        final_score: f64,
        details: Vec<SkillDetail>,
        semantic: SemanticStatus,
    ) -> ScoreOutcome {
        ScoreOutcome::Aggregated(ScoreBreakdown {
            candidate_id: "c".to_string(),
            job_id: "j".to_string(),
            rubric_score: 0.0,
            semantic_score: 0.0,
            experience_score: 0.0,
            gap_penalty: 0.0,
            final_score,
            per_skill_detail: details,
            semantic,
            applied_weights: ScoringWeights::default(),
            unmet_critical: vec![],
            score_cap: None,
        })
    }

    fn available() -> SemanticStatus {
        SemanticStatus::Available {
            backend: "keyword".to_string(),
        }
    }

    #[test]
    fn test_weakest_skills_order() {
        let details = vec![
            detail("Python", 3, 3.0, SkillSource::Direct),
            detail("SQL", 2, 1.0, SkillSource::Direct),
            detail("AWS", 3, 0.0, SkillSource::None),
            detail("Pandas", 2, 1.0, SkillSource::Direct),
        ];
        let weakest: Vec<_> = weakest_skills(&details, 5)
            .iter()
            .map(|d| d.skill.as_str())
            .collect();
        assert_eq!(weakest, vec!["AWS", "SQL", "Pandas"]);
        assert_eq!(weakest_skills(&details, 1)[0].skill, "AWS");
    }

    #[test]
    fn test_adjacent_credit_label() {
        let mut d = detail("AWS", 3, 3.5, SkillSource::Adjacent);
        d.via = Some(AdjacencyUse {
            from_skill: "GCP".to_string(),
            decay: 0.7,
        });
        assert_eq!(adjacent_credit(&[d]), vec!["GCP → AWS (0.7)".to_string()]);
    }

    #[test]
    fn test_recommendation_strong() {
        let outcome = breakdown(86.0, vec![], available());
        assert!(recommendation(&outcome).starts_with("Strong fit"));
    }

    #[test]
    fn test_recommendation_thresholds_use_unrounded_score() {
        let gap = || vec![detail("Kafka", 3, 1.0, SkillSource::Direct)];
        let just_below = recommendation(&breakdown(79.5, gap(), available()));
        assert!(just_below.starts_with("Moderate fit (80/100)"), "got {just_below}");

        let low = recommendation(&breakdown(59.6, gap(), available()));
        assert!(low.starts_with("Low fit (60/100)"), "got {low}");

        assert!(recommendation(&breakdown(80.0, gap(), available())).starts_with("Strong fit"));
    }

    #[test]
    fn test_recommendation_moderate_lists_gaps() {
        let gaps = vec![detail("Kafka", 3, 1.0, SkillSource::Direct)];
        let outcome = breakdown(65.0, gaps, available());
        let rec = recommendation(&outcome);
        assert!(rec.contains("65"));
        assert!(rec.contains("Kafka"));
    }

    #[test]
    fn test_recommendation_low_flags_semantic_unavailable() {
        let status = SemanticStatus::Unavailable {
            backend: "llm".to_string(),
            reason: "timed out".to_string(),
            fallback: SemanticFallback::Renormalize,
        };
        let rec = recommendation(&breakdown(31.0, vec![], status));
        assert!(rec.starts_with("Low fit (31/100)"));
        assert!(rec.contains("Semantic score unavailable"));
    }

    #[test]
    fn test_recommendation_rejected() {
        let outcome = ScoreOutcome::Rejected(RejectedResult {
            candidate_id: "c".to_string(),
            job_id: "j".to_string(),
            reason: RejectReason::MissingCriticalSkills {
                skills: vec!["AWS".to_string()],
            },
            final_score: 0.0,
            rubric_score: 80.0,
            experience_score: 100.0,
            gap_penalty: 20.0,
            per_skill_detail: vec![],
        });
        assert_eq!(recommendation(&outcome), "Rejected: missing critical skills: AWS.");
    }

    #[test]
    fn test_explain_bundles_everything() {
        let gaps = vec![detail("SQL", 2, 1.0, SkillSource::Direct)];
        let outcome = breakdown(70.0, gaps, available());
        let e = explain(&outcome, 3);
        assert_eq!(e.weakest_skills.len(), 1);
        assert!(e.adjacent_credit.is_empty());
        assert!(e.recommendation.contains("SQL"));
    }
}
