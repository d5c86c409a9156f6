/// Experience score: `100 × min(candidate_years / target_years, 1.0)`.
///
/// A target of 0 means no experience requirement and always scores 100.
/// Exceeding the target earns no extra credit.
pub fn experience_score(candidate_years: f64, target_years: f64) -> f64 {
    if target_years <= 0.0 {
        return 100.0;
    }
    let ratio = (candidate_years / target_years).clamp(0.0, 1.0);
    100.0 * ratio
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_target_is_full_score() {
        assert_eq!(experience_score(0.0, 0.0), 100.0);
        assert_eq!(experience_score(7.0, 0.0), 100.0);
    }

    #[test]
    fn test_proportional_below_target() {
        assert!((experience_score(2.0, 4.0) - 50.0).abs() < 1e-9);
        assert_eq!(experience_score(0.0, 5.0), 0.0);
    }

    #[test]
    fn test_capped_above_target() {
        assert_eq!(experience_score(20.0, 5.0), 100.0);
        assert_eq!(experience_score(5.0, 5.0), 100.0);
    }
}
