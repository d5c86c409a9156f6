//! Scoring inputs: candidate and job profiles, weights and the critical-skill policy.
//!
//! Job profiles, configs and percentages validate when they are built (including
//! via serde), so the engine never has to re-check them while scoring.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::scoring::errors::ScoringError;
use crate::scoring::normalizer::SkillCanonicalizer;

/// Tolerance for every "weights sum to 1.0" check.
pub const WEIGHT_EPSILON: f64 = 1e-6;

/// Highest proficiency level on the 1..5 scale.
pub const MAX_LEVEL: f64 = 5.0;

// ────────────────────────────────────────────────────────────────────────────
// Skills
// ────────────────────────────────────────────────────────────────────────────

/// One weighted skill line item of a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillRequirement {
    pub name: String,
    /// Fraction of the rubric this line item accounts for.
    pub weight: f64,
    /// Ordinal 1..=5.
    pub min_level: u8,
    #[serde(default)]
    pub critical: bool,
}

/// Directed substitution rule: holding `from_skill` counts toward `to_skill`,
/// scaled by `decay`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillAdjacency {
    pub from_skill: String,
    pub to_skill: String,
    pub decay: f64,
}

impl SkillAdjacency {
    pub fn new(from_skill: &str, to_skill: &str, decay: f64) -> Self {
        Self {
            from_skill: from_skill.to_string(),
            to_skill: to_skill.to_string(),
            decay,
        }
    }
}

/// Adjacency rules shipped with the product settings page.
pub fn default_adjacencies() -> Vec<SkillAdjacency> {
    vec![
        SkillAdjacency::new("GCP", "AWS", 0.7),
        SkillAdjacency::new("Excel", "Pandas", 0.8),
        SkillAdjacency::new("R", "Python", 0.6),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSkill {
    pub name: String,
    /// Continuous 0.0 – 5.0.
    pub level: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub id: String,
    #[serde(default)]
    pub skills: Vec<CandidateSkill>,
    pub years_experience: f64,
    #[serde(default)]
    pub narrative_text: String,
}

impl CandidateProfile {
    /// Checks the fields the engine relies on. Called once per scoring call.
    pub fn validate(&self) -> Result<(), ScoringError> {
        if self.id.trim().is_empty() {
            return Err(ScoringError::invalid_input("candidate id cannot be empty"));
        }
        if !self.years_experience.is_finite() || self.years_experience < 0.0 {
            return Err(ScoringError::invalid_input(format!(
                "candidate {}: years_experience must be a non-negative number (got {})",
                self.id, self.years_experience
            )));
        }
        for skill in &self.skills {
            if skill.name.trim().is_empty() {
                return Err(ScoringError::invalid_input(format!(
                    "candidate {}: skill name cannot be empty",
                    self.id
                )));
            }
            if !skill.level.is_finite() || !(0.0..=MAX_LEVEL).contains(&skill.level) {
                return Err(ScoringError::invalid_input(format!(
                    "candidate {}: level for '{}' must be within 0–5 (got {})",
                    self.id, skill.name, skill.level
                )));
            }
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Job profile
// ────────────────────────────────────────────────────────────────────────────

/// A job profile as submitted, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobProfileSpec {
    pub id: String,
    pub requirements: Vec<SkillRequirement>,
    #[serde(default)]
    pub adjacencies: Vec<SkillAdjacency>,
    #[serde(default)]
    pub target_experience_years: f64,
    #[serde(default)]
    pub narrative_text: String,
    /// Extra canonical-name → alias entries on top of the built-in table.
    #[serde(default)]
    pub aliases: BTreeMap<String, Vec<String>>,
}

/// A validated job profile. Immutable once built and safe to share across
/// concurrent scoring calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "JobProfileSpec", into = "JobProfileSpec")]
pub struct JobProfile {
    spec: JobProfileSpec,
    canonicalizer: SkillCanonicalizer,
}

impl JobProfile {
    /// Validates requirement weights, levels, adjacency decays and the experience
    /// target. Any violation is a `ScoringError::Configuration`.
    pub fn new(spec: JobProfileSpec) -> Result<Self, ScoringError> {
        let canonicalizer = SkillCanonicalizer::with_aliases(&spec.aliases);

        if spec.id.trim().is_empty() {
            return Err(ScoringError::configuration("job id cannot be empty"));
        }
        if spec.requirements.is_empty() {
            return Err(ScoringError::configuration(format!(
                "job {}: at least one skill requirement is needed",
                spec.id
            )));
        }

        let mut seen = HashSet::new();
        let mut weight_sum = 0.0;
        for req in &spec.requirements {
            if req.name.trim().is_empty() {
                return Err(ScoringError::configuration(format!(
                    "job {}: requirement name cannot be empty",
                    spec.id
                )));
            }
            if !seen.insert(canonicalizer.canon(&req.name)) {
                return Err(ScoringError::configuration(format!(
                    "job {}: duplicate requirement for skill '{}'",
                    spec.id, req.name
                )));
            }
            if !is_fraction(req.weight) {
                return Err(ScoringError::configuration(format!(
                    "job {}: weight for '{}' must be within 0–1 (got {})",
                    spec.id, req.name, req.weight
                )));
            }
            if !(1..=5).contains(&req.min_level) {
                return Err(ScoringError::configuration(format!(
                    "job {}: min_level for '{}' must be within 1–5 (got {})",
                    spec.id, req.name, req.min_level
                )));
            }
            weight_sum += req.weight;
        }
        if (weight_sum - 1.0).abs() > WEIGHT_EPSILON {
            return Err(ScoringError::configuration(format!(
                "job {}: requirement weights must sum to 1.0 (got {weight_sum:.4})",
                spec.id
            )));
        }

        for adj in &spec.adjacencies {
            if adj.from_skill.trim().is_empty() || adj.to_skill.trim().is_empty() {
                return Err(ScoringError::configuration(format!(
                    "job {}: adjacency skills cannot be empty",
                    spec.id
                )));
            }
            if canonicalizer.canon(&adj.from_skill) == canonicalizer.canon(&adj.to_skill) {
                return Err(ScoringError::configuration(format!(
                    "job {}: adjacency '{}' cannot target itself",
                    spec.id, adj.from_skill
                )));
            }
            if !is_fraction(adj.decay) {
                return Err(ScoringError::configuration(format!(
                    "job {}: decay for {} → {} must be within 0–1 (got {})",
                    spec.id, adj.from_skill, adj.to_skill, adj.decay
                )));
            }
        }

        if !spec.target_experience_years.is_finite() || spec.target_experience_years < 0.0 {
            return Err(ScoringError::configuration(format!(
                "job {}: target_experience_years must be a non-negative number (got {})",
                spec.id, spec.target_experience_years
            )));
        }

        Ok(Self {
            spec,
            canonicalizer,
        })
    }

    pub fn id(&self) -> &str {
        &self.spec.id
    }

    /// Requirements in declaration order.
    pub fn requirements(&self) -> &[SkillRequirement] {
        &self.spec.requirements
    }

    pub fn adjacencies(&self) -> &[SkillAdjacency] {
        &self.spec.adjacencies
    }

    pub fn target_experience_years(&self) -> f64 {
        self.spec.target_experience_years
    }

    pub fn narrative_text(&self) -> &str {
        &self.spec.narrative_text
    }

    pub fn canonicalizer(&self) -> &SkillCanonicalizer {
        &self.canonicalizer
    }
}

impl TryFrom<JobProfileSpec> for JobProfile {
    type Error = ScoringError;

    fn try_from(spec: JobProfileSpec) -> Result<Self, Self::Error> {
        JobProfile::new(spec)
    }
}

impl From<JobProfile> for JobProfileSpec {
    fn from(job: JobProfile) -> Self {
        job.spec
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Scoring config
// ────────────────────────────────────────────────────────────────────────────

/// Blend weights: α rubric, β semantic, γ experience, δ gap penalty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    pub delta: f64,
}

impl ScoringWeights {
    pub fn sum(&self) -> f64 {
        self.alpha + self.beta + self.gamma + self.delta
    }
}

impl Default for ScoringWeights {
    /// 55 / 25 / 10 / 10. A default, not a constraint.
    fn default() -> Self {
        Self {
            alpha: 0.55,
            beta: 0.25,
            gamma: 0.10,
            delta: 0.10,
        }
    }
}

/// What the aggregator does when the semantic capability is unavailable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticFallback {
    /// Scale the remaining weights by 1 / (1 − β).
    #[default]
    Renormalize,
    /// Keep the weights and treat the semantic score as 0.
    Zero,
}

impl FromStr for SemanticFallback {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "renormalize" => Ok(SemanticFallback::Renormalize),
            "zero" => Ok(SemanticFallback::Zero),
            other => Err(ScoringError::configuration(format!(
                "unknown semantic fallback '{other}' (expected 'renormalize' or 'zero')"
            ))),
        }
    }
}

/// Raw config as it arrives over the wire. A `semantic_timeout_ms` of 0 disables
/// the timeout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfigSpec {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    pub delta: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_fallback: Option<SemanticFallback>,
}

impl ScoringConfigSpec {
    /// Validates the weights and takes the timeout and fallback from `base`
    /// wherever this spec leaves them out.
    pub fn over(self, base: &ScoringConfig) -> Result<ScoringConfig, ScoringError> {
        let config = ScoringConfig::new(self.weights())?
            .with_semantic_fallback(self.semantic_fallback.unwrap_or(base.semantic_fallback));
        Ok(match self.semantic_timeout_ms {
            Some(ms) => config.with_semantic_timeout_ms(ms),
            None => ScoringConfig {
                semantic_timeout: base.semantic_timeout,
                ..config
            },
        })
    }

    fn weights(&self) -> ScoringWeights {
        ScoringWeights {
            alpha: self.alpha,
            beta: self.beta,
            gamma: self.gamma,
            delta: self.delta,
        }
    }
}

/// Validated scoring configuration. There is no ambient config: every scoring
/// call receives one of these explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ScoringConfigSpec", into = "ScoringConfigSpec")]
pub struct ScoringConfig {
    weights: ScoringWeights,
    semantic_timeout: Option<Duration>,
    semantic_fallback: SemanticFallback,
}

impl ScoringConfig {
    /// Rejects (never normalizes) weights outside 0–1 or not summing to 1.0.
    pub fn new(weights: ScoringWeights) -> Result<Self, ScoringError> {
        for (label, value) in [
            ("alpha", weights.alpha),
            ("beta", weights.beta),
            ("gamma", weights.gamma),
            ("delta", weights.delta),
        ] {
            if !is_fraction(value) {
                return Err(ScoringError::configuration(format!(
                    "{label} must be within 0–1 (got {value})"
                )));
            }
        }
        let sum = weights.sum();
        if (sum - 1.0).abs() > WEIGHT_EPSILON {
            return Err(ScoringError::configuration(format!(
                "scoring weights must sum to 1.0 (got {sum:.4})"
            )));
        }
        Ok(Self {
            weights,
            semantic_timeout: None,
            semantic_fallback: SemanticFallback::default(),
        })
    }

    pub fn with_semantic_timeout(mut self, timeout: Duration) -> Self {
        self.semantic_timeout = Some(timeout);
        self
    }

    /// `0` disables the timeout.
    pub fn with_semantic_timeout_ms(mut self, ms: u64) -> Self {
        self.semantic_timeout = (ms > 0).then(|| Duration::from_millis(ms));
        self
    }

    pub fn with_semantic_fallback(mut self, fallback: SemanticFallback) -> Self {
        self.semantic_fallback = fallback;
        self
    }

    pub fn weights(&self) -> ScoringWeights {
        self.weights
    }

    pub fn semantic_timeout(&self) -> Option<Duration> {
        self.semantic_timeout
    }

    pub fn semantic_fallback(&self) -> SemanticFallback {
        self.semantic_fallback
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            semantic_timeout: None,
            semantic_fallback: SemanticFallback::default(),
        }
    }
}

impl TryFrom<ScoringConfigSpec> for ScoringConfig {
    type Error = ScoringError;

    fn try_from(spec: ScoringConfigSpec) -> Result<Self, Self::Error> {
        spec.over(&ScoringConfig::default())
    }
}

impl From<ScoringConfig> for ScoringConfigSpec {
    fn from(config: ScoringConfig) -> Self {
        Self {
            alpha: config.weights.alpha,
            beta: config.weights.beta,
            gamma: config.weights.gamma,
            delta: config.weights.delta,
            semantic_timeout_ms: config.semantic_timeout.map(|d| d.as_millis() as u64),
            semantic_fallback: Some(config.semantic_fallback),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Critical-skill policy
// ────────────────────────────────────────────────────────────────────────────

/// A percentage in 0–100.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Percentage(f64);

impl Percentage {
    pub fn new(value: f64) -> Result<Self, ScoringError> {
        if !value.is_finite() || !(0.0..=100.0).contains(&value) {
            return Err(ScoringError::configuration(format!(
                "percentage must be within 0–100 (got {value})"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Percentage {
    type Error = ScoringError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Percentage::new(value)
    }
}

impl From<Percentage> for f64 {
    fn from(p: Percentage) -> Self {
        p.0
    }
}

/// Override applied when any critical requirement is unmet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "percent", rename_all = "snake_case")]
pub enum CriticalSkillPolicy {
    /// Clamp the final score to at most this value.
    CapAt(Percentage),
    /// Add this flat amount to the gap penalty.
    FlatGapPenalty(Percentage),
    /// Stop the pipeline and return a rejected result.
    AutoReject,
}

impl Default for CriticalSkillPolicy {
    /// "Cap score at 55% if missing".
    fn default() -> Self {
        CriticalSkillPolicy::CapAt(Percentage(55.0))
    }
}

impl FromStr for CriticalSkillPolicy {
    type Err = ScoringError;

    /// Parses `cap:<pct>`, `flat:<pct>` or `auto_reject`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        if s == "auto_reject" {
            return Ok(CriticalSkillPolicy::AutoReject);
        }
        let (kind, value) = s.split_once(':').ok_or_else(|| {
            ScoringError::configuration(format!(
                "unknown critical skill policy '{s}' \
                 (expected cap:<pct>, flat:<pct> or auto_reject)"
            ))
        })?;
        let pct = value.trim().parse::<f64>().map_err(|_| {
            ScoringError::configuration(format!(
                "critical skill policy percent '{value}' is not a number"
            ))
        })?;
        match kind.trim() {
            "cap" => Ok(CriticalSkillPolicy::CapAt(Percentage::new(pct)?)),
            "flat" => Ok(CriticalSkillPolicy::FlatGapPenalty(Percentage::new(pct)?)),
            other => Err(ScoringError::configuration(format!(
                "unknown critical skill policy kind '{other}'"
            ))),
        }
    }
}

impl fmt::Display for CriticalSkillPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CriticalSkillPolicy::CapAt(p) => write!(f, "cap:{}", p.value()),
            CriticalSkillPolicy::FlatGapPenalty(p) => write!(f, "flat:{}", p.value()),
            CriticalSkillPolicy::AutoReject => write!(f, "auto_reject"),
        }
    }
}

fn is_fraction(value: f64) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}
