//! Gap Penalty Evaluator: penalty for unmet requirements plus the
//! critical-skill override.
//!
//! Base penalty: `Σ weight × (1 − achieved / min_level) × 100` over unmet
//! requirements, clipped to 0–100. When any critical requirement is unmet the
//! policy decides what happens next:
//! - `CapAt(c)`         → the aggregator clamps the final score to ≤ c
//! - `FlatGapPenalty(p)` → p is added to the penalty (clipped again)
//! - `AutoReject`        → the pipeline stops with a rejected result

use crate::scoring::models::CriticalSkillPolicy;
use crate::scoring::normalizer::NormalizedRequirement;

/// What the pipeline does after gap evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GapVerdict {
    Continue,
    CapAt(f64),
    Reject,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GapEvaluation {
    /// 0 – 100, flat critical penalty included.
    pub gap_penalty: f64,
    /// Names of critical requirements below `min_level`, in declaration order.
    pub unmet_critical: Vec<String>,
    pub verdict: GapVerdict,
}

pub fn base_gap_penalty(pairs: &[NormalizedRequirement<'_>]) -> f64 {
    let penalty: f64 = pairs
        .iter()
        .filter(|pair| !pair.is_met())
        .map(|pair| pair.requirement.weight * (1.0 - pair.raw_ratio()) * 100.0)
        .sum();
    penalty.clamp(0.0, 100.0)
}

pub fn unmet_critical(pairs: &[NormalizedRequirement<'_>]) -> Vec<String> {
    pairs
        .iter()
        .filter(|pair| pair.requirement.critical && !pair.is_met())
        .map(|pair| pair.requirement.name.clone())
        .collect()
}

pub fn evaluate_gaps(
    pairs: &[NormalizedRequirement<'_>],
    policy: CriticalSkillPolicy,
) -> GapEvaluation {
    let base = base_gap_penalty(pairs);
    let unmet_critical = unmet_critical(pairs);

    if unmet_critical.is_empty() {
        return GapEvaluation {
            gap_penalty: base,
            unmet_critical,
            verdict: GapVerdict::Continue,
        };
    }

    let (gap_penalty, verdict) = match policy {
        CriticalSkillPolicy::CapAt(ceiling) => (base, GapVerdict::CapAt(ceiling.value())),
        CriticalSkillPolicy::FlatGapPenalty(flat) => {
            ((base + flat.value()).clamp(0.0, 100.0), GapVerdict::Continue)
        }
        CriticalSkillPolicy::AutoReject => (base, GapVerdict::Reject),
    };

    GapEvaluation {
        gap_penalty,
        unmet_critical,
        verdict,
    }
}
