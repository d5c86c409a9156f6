//! Skill Profile Normalizer: aligns a candidate's skills with a job's requirements.
//!
//! For every requirement, in declaration order:
//! 1. Direct level = the candidate's level for the requirement's canonical name.
//! 2. If the direct level is missing or below `min_level`, every adjacency rule
//!    targeting the requirement is tried: `level(from_skill) × decay`.
//! 3. The larger of direct and best adjacent level wins (ties go to direct).
//! 4. No direct and no adjacent match → achieved 0, source `None`.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::scoring::models::{CandidateProfile, JobProfile, SkillRequirement};

/// Built-in canonical name → aliases table.
const DEFAULT_ALIASES: &[(&str, &[&str])] = &[
    ("react.js", &["react", "reactjs"]),
    ("next.js", &["next", "nextjs"]),
    ("ci/cd", &["cicd", "continuous integration", "continuous delivery"]),
    ("web vitals", &["core web vitals", "web-vitals"]),
    ("testing library", &["@testing-library", "rtl"]),
    ("a11y", &["accessibility"]),
    ("wcag", &["wcag2", "wcag 2.1"]),
    ("node", &["nodejs", "node.js"]),
    ("golang", &["go"]),
    ("postgresql", &["postgres"]),
];

/// Maps skill names to a canonical lowercase form through an alias table.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillCanonicalizer {
    alias_to_canon: HashMap<String, String>,
}

impl Default for SkillCanonicalizer {
    fn default() -> Self {
        Self::with_aliases(&BTreeMap::new())
    }
}

impl SkillCanonicalizer {
    /// Built-in aliases plus `extra`. Entries in `extra` win on conflict.
    pub fn with_aliases(extra: &BTreeMap<String, Vec<String>>) -> Self {
        let mut alias_to_canon = HashMap::new();
        for (canon, aliases) in DEFAULT_ALIASES {
            insert_aliases(&mut alias_to_canon, canon, aliases.iter().copied());
        }
        for (canon, aliases) in extra {
            insert_aliases(&mut alias_to_canon, canon, aliases.iter().map(String::as_str));
        }

        Self { alias_to_canon }
    }

    pub fn canon(&self, name: &str) -> String {
        let folded = fold(name);
        match self.alias_to_canon.get(&folded) {
            Some(canon) => canon.clone(),
            None => folded,
        }
    }
}

fn insert_aliases<'a>(
    map: &mut HashMap<String, String>,
    canon: &str,
    aliases: impl Iterator<Item = &'a str>,
) {
    let canon = fold(canon);
    map.insert(canon.clone(), canon.clone());
    for alias in aliases {
        let alias = fold(alias);
        if !alias.is_empty() {
            map.insert(alias, canon.clone());
        }
    }
}

fn fold(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Where a requirement's achieved level came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillSource {
    Direct,
    Adjacent,
    None,
}

/// The adjacency rule that supplied an achieved level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjacencyUse {
    pub from_skill: String,
    pub decay: f64,
}

/// One requirement paired with what the candidate achieved for it.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRequirement<'a> {
    pub requirement: &'a SkillRequirement,
    pub achieved_level: f64,
    pub source: SkillSource,
    pub via: Option<AdjacencyUse>,
}

impl NormalizedRequirement<'_> {
    /// `achieved / min_level`, uncapped.
    pub fn raw_ratio(&self) -> f64 {
        self.achieved_level / f64::from(self.requirement.min_level)
    }

    pub fn is_met(&self) -> bool {
        self.achieved_level >= f64::from(self.requirement.min_level)
    }
}

/// Pure function: aligns the candidate with `job.requirements()` one-to-one.
pub fn normalize<'a>(
    candidate: &CandidateProfile,
    job: &'a JobProfile,
) -> Vec<NormalizedRequirement<'a>> {
    let canonicalizer = job.canonicalizer();

    // Duplicate candidate entries collapse to the highest level.
    let mut levels: HashMap<String, f64> = HashMap::new();
    for skill in &candidate.skills {
        let entry = levels.entry(canonicalizer.canon(&skill.name)).or_insert(0.0);
        if skill.level > *entry {
            *entry = skill.level;
        }
    }

    job.requirements()
        .iter()
        .map(|requirement| {
            let key = canonicalizer.canon(&requirement.name);
            let min_level = f64::from(requirement.min_level);
            let direct = levels.get(&key).copied();

            if let Some(level) = direct {
                if level >= min_level {
                    return NormalizedRequirement {
                        requirement,
                        achieved_level: level,
                        source: SkillSource::Direct,
                        via: None,
                    };
                }
            }

            let mut best_adjacent: Option<(f64, AdjacencyUse)> = None;
            for adj in job.adjacencies() {
                if canonicalizer.canon(&adj.to_skill) != key {
                    continue;
                }
                let Some(from_level) = levels.get(&canonicalizer.canon(&adj.from_skill)) else {
                    continue;
                };
                let effective = from_level * adj.decay;
                let better = best_adjacent
                    .as_ref()
                    .map_or(true, |(best, _)| effective > *best);
                if better {
                    best_adjacent = Some((
                        effective,
                        AdjacencyUse {
                            from_skill: adj.from_skill.clone(),
                            decay: adj.decay,
                        },
                    ));
                }
            }

            match (direct, best_adjacent) {
                (Some(level), Some((adjacent, via))) if adjacent > level => NormalizedRequirement {
                    requirement,
                    achieved_level: adjacent,
                    source: SkillSource::Adjacent,
                    via: Some(via),
                },
                (Some(level), _) => NormalizedRequirement {
                    requirement,
                    achieved_level: level,
                    source: SkillSource::Direct,
                    via: None,
                },
                (None, Some((adjacent, via))) => NormalizedRequirement {
                    requirement,
                    achieved_level: adjacent,
                    source: SkillSource::Adjacent,
                    via: Some(via),
                },
                (None, None) => NormalizedRequirement {
                    requirement,
                    achieved_level: 0.0,
                    source: SkillSource::None,
                    via: None,
                },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::models::{CandidateSkill, JobProfileSpec, SkillAdjacency};

    fn candidate(skills: &[(&str, f64)]) -> CandidateProfile {
        CandidateProfile {
            id: "cand".to_string(),
            skills: skills
                .iter()
                .map(|(name, level)| CandidateSkill {
                    name: name.to_string(),
                    level: *level,
                })
                .collect(),
            years_experience: 4.0,
            narrative_text: String::new(),
        }
    }

    fn job(requirements: &[(&str, f64, u8)], adjacencies: Vec<SkillAdjacency>) -> JobProfile {
        JobProfile::new(JobProfileSpec {
            id: "job".to_string(),
            requirements: requirements
                .iter()
                .map(|(name, weight, min_level)| SkillRequirement {
                    name: name.to_string(),
                    weight: *weight,
                    min_level: *min_level,
                    critical: false,
                })
                .collect(),
            adjacencies,
            target_experience_years: 3.0,
            narrative_text: String::new(),
            aliases: BTreeMap::new(),
        })
        .unwrap()
    }

    #[test]
    fn test_direct_match_case_insensitive() {
        let job = job(&[("Python", 1.0, 3)], vec![]);
        let normalized = normalize(&candidate(&[("python", 4.0)]), &job);
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized[0].source, SkillSource::Direct);
        assert_eq!(normalized[0].achieved_level, 4.0);
        assert!(normalized[0].via.is_none());
    }

    #[test]
    fn test_adjacency_substitution_gcp_for_aws() {
        let job = job(&[("AWS", 1.0, 3)], vec![SkillAdjacency::new("GCP", "AWS", 0.7)]);
        let normalized = normalize(&candidate(&[("GCP", 5.0)]), &job);
        assert_eq!(normalized[0].source, SkillSource::Adjacent);
        assert!((normalized[0].achieved_level - 3.5).abs() < 1e-9);
        assert_eq!(
            normalized[0].via,
            Some(AdjacencyUse {
                from_skill: "GCP".to_string(),
                decay: 0.7
            })
        );
    }

    #[test]
    fn test_max_over_multiple_adjacency_rules() {
        let job = job(
            &[("AWS", 1.0, 4)],
            vec![
                SkillAdjacency::new("GCP", "AWS", 0.7),
                SkillAdjacency::new("Azure", "AWS", 0.8),
            ],
        );
        let normalized = normalize(&candidate(&[("GCP", 5.0), ("Azure", 4.0)]), &job);
        // GCP: 3.5, Azure: 3.2
        assert!((normalized[0].achieved_level - 3.5).abs() < 1e-9);
        assert_eq!(normalized[0].via.as_ref().unwrap().from_skill, "GCP");
    }

    #[test]
    fn test_weak_direct_loses_to_stronger_adjacent() {
        let job = job(&[("Python", 1.0, 3)], vec![SkillAdjacency::new("R", "Python", 0.6)]);
        let normalized = normalize(&candidate(&[("Python", 1.0), ("R", 5.0)]), &job);
        assert_eq!(normalized[0].source, SkillSource::Adjacent);
        assert!((normalized[0].achieved_level - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_weak_direct_beats_weaker_adjacent() {
        let job = job(&[("Python", 1.0, 3)], vec![SkillAdjacency::new("R", "Python", 0.6)]);
        let normalized = normalize(&candidate(&[("Python", 2.0), ("R", 2.0)]), &job);
        assert_eq!(normalized[0].source, SkillSource::Direct);
        assert_eq!(normalized[0].achieved_level, 2.0);
    }

    #[test]
    fn test_met_direct_skips_adjacency() {
        let job = job(&[("AWS", 1.0, 3)], vec![SkillAdjacency::new("GCP", "AWS", 1.0)]);
        let normalized = normalize(&candidate(&[("AWS", 3.0), ("GCP", 5.0)]), &job);
        assert_eq!(normalized[0].source, SkillSource::Direct);
        assert_eq!(normalized[0].achieved_level, 3.0);
    }

    #[test]
    fn test_missing_skill_yields_none() {
        let job = job(&[("Rust", 1.0, 2)], vec![]);
        let normalized = normalize(&candidate(&[("Go", 5.0)]), &job);
        assert_eq!(normalized[0].source, SkillSource::None);
        assert_eq!(normalized[0].achieved_level, 0.0);
        assert!(!normalized[0].is_met());
    }

    #[test]
    fn test_output_follows_declaration_order() {
        let job = job(&[("SQL", 0.5, 2), ("Python", 0.3, 3), ("AWS", 0.2, 2)], vec![]);
        let candidate = candidate(&[("AWS", 2.0), ("Python", 3.0), ("SQL", 2.0)]);
        let normalized = normalize(&candidate, &job);
        let names: Vec<_> = normalized.iter().map(|n| n.requirement.name.as_str()).collect();
        assert_eq!(names, vec!["SQL", "Python", "AWS"]);
    }

    #[test]
    fn test_aliases_resolve_to_canonical_names() {
        let job = job(&[("PostgreSQL", 0.5, 2), ("Node", 0.5, 2)], vec![]);
        let normalized = normalize(&candidate(&[("postgres", 3.0), ("Node.js", 2.0)]), &job);
        assert!(normalized.iter().all(|n| n.source == SkillSource::Direct));
    }

    #[test]
    fn test_duplicate_candidate_skills_keep_highest_level() {
        let job = job(&[("Rust", 1.0, 3)], vec![]);
        let normalized = normalize(&candidate(&[("Rust", 2.0), ("rust", 4.0)]), &job);
        assert_eq!(normalized[0].achieved_level, 4.0);
    }

    #[test]
    fn test_job_aliases_extend_builtin_table() {
        let mut extra = BTreeMap::new();
        extra.insert("kubernetes".to_string(), vec!["k8s".to_string()]);
        let canonicalizer = SkillCanonicalizer::with_aliases(&extra);
        assert_eq!(canonicalizer.canon(" K8s "), "kubernetes");
        assert_eq!(canonicalizer.canon("go"), "golang");
        assert_eq!(canonicalizer.canon("Elixir"), "elixir");
    }
}
