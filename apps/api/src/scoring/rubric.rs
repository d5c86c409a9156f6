//! Rubric Scorer: structured requirements-match score.
//!
//! `rubric = 100 × Σ(weight × min(achieved / min_level, 1.0))`
//!
//! Requirement weights are validated when the `JobProfile` is built, so nothing
//! is re-checked here beyond alignment with the job.

use crate::scoring::errors::ScoringError;
use crate::scoring::models::JobProfile;
use crate::scoring::normalizer::NormalizedRequirement;

/// Line-item credit, capped at full credit.
pub fn line_ratio(pair: &NormalizedRequirement<'_>) -> f64 {
    pair.raw_ratio().clamp(0.0, 1.0)
}

/// Rubric points one line item contributes (0 – weight × 100).
pub fn line_contribution(pair: &NormalizedRequirement<'_>) -> f64 {
    100.0 * pair.requirement.weight * line_ratio(pair)
}

/// Fails with `InvalidInput` when `pairs` is not aligned one-to-one with the job.
pub fn rubric_score(
    job: &JobProfile,
    pairs: &[NormalizedRequirement<'_>],
) -> Result<f64, ScoringError> {
    check_alignment(job, pairs)?;
    let score: f64 = pairs.iter().map(line_contribution).sum();
    Ok(score.clamp(0.0, 100.0))
}

pub(crate) fn check_alignment(
    job: &JobProfile,
    pairs: &[NormalizedRequirement<'_>],
) -> Result<(), ScoringError> {
    if pairs.len() != job.requirements().len() {
        return Err(ScoringError::invalid_input(format!(
            "job {}: expected {} requirement/achievement pairs, got {}",
            job.id(),
            job.requirements().len(),
            pairs.len()
        )));
    }
    for (requirement, pair) in job.requirements().iter().zip(pairs) {
        if requirement.name != pair.requirement.name {
            return Err(ScoringError::invalid_input(format!(
                "job {}: missing achievement for requirement '{}'",
                job.id(),
                requirement.name
            )));
        }
    }
    Ok(())
}
