// WHY: Combined-value rating ("50c30c20") folded largest first: each value applies to what remains

use super::{priority, DetectionContext, Detector, MatchOutcome};
use crate::error::DetectorError;

pub struct CombinationDetector;

impl CombinationDetector {
    pub const ID: &'static str = "combinations";
}

/// Fold percentages (0..=100) largest first; returns the combined fraction
pub fn combine(percentages: &[f64]) -> f64 {
    let mut sorted = percentages.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));
    sorted
        .iter()
        .fold(0.0, |running, p| running + (p / 100.0) * (1.0 - running))
}

impl Detector for CombinationDetector {
    fn id(&self) -> &str {
        Self::ID
    }

    fn priority(&self) -> i32 {
        priority::COMBINATIONS
    }

    fn detect(&self, text: &str, ctx: &DetectionContext<'_>) -> Result<MatchOutcome, DetectorError> {
        let trimmed = text.trim();
        if !ctx.patterns.matches("combination", trimmed) {
            return Ok(MatchOutcome::NoMatch);
        }

        let mut values = Vec::new();
        for found in ctx.patterns.find_iter("decimal", trimmed) {
            let Ok(value) = trimmed[found.range()].parse::<f64>() else {
                return Ok(MatchOutcome::NoMatch);
            };
            if value > 100.0 {
                return Ok(MatchOutcome::NoMatch);
            }
            values.push(value);
        }
        if values.len() < 2 {
            return Ok(MatchOutcome::NoMatch);
        }

        let combined = (combine(&values) * 100.0).round();
        Ok(MatchOutcome::Text(format!("{combined:.0}% combined")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::detectors::{RatingTable, Scope};
    use crate::patterns::PatternRegistry;
    use chrono::NaiveDate;
    use std::sync::OnceLock;

    static SHARED_PATTERNS: OnceLock<PatternRegistry> = OnceLock::new();

    fn detect(text: &str) -> MatchOutcome {
        let config = Config::default();
        let ratings = RatingTable::standard();
        let ctx = DetectionContext {
            config: &config,
            patterns: SHARED_PATTERNS.get_or_init(|| PatternRegistry::new().unwrap()),
            ratings: &ratings,
            today: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            scope: Scope::Whole,
            matches: &[],
        };
        CombinationDetector.detect(text, &ctx).unwrap()
    }

    #[test]
    fn test_combine_is_order_independent() {
        let a = combine(&[20.0, 50.0, 30.0]);
        let b = combine(&[50.0, 30.0, 20.0]);
        assert!((a - b).abs() < 1e-12);
        assert!((a - 0.72).abs() < 1e-12);
    }

    #[test]
    fn test_combination_shapes() {
        assert_eq!(detect("50c30"), MatchOutcome::Text("65% combined".into()));
        assert_eq!(detect("20% c 50% C 30%"), MatchOutcome::Text("72% combined".into()));
        assert_eq!(detect("100c40"), MatchOutcome::Text("100% combined".into()));
    }

    #[test]
    fn test_declines_non_combinations() {
        assert_eq!(detect("50"), MatchOutcome::NoMatch);
        assert_eq!(detect("50c"), MatchOutcome::NoMatch);
        assert_eq!(detect("150c30"), MatchOutcome::NoMatch);
        assert_eq!(detect("65% combined"), MatchOutcome::NoMatch);
    }
}
