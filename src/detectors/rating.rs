// WHY: Disability-rating codes ("PD 25", "rating 12%", "40%") to a payout amount
// weeks come from the rating table, dollars from config.rating.weekly_rate

use std::collections::BTreeMap;

use super::{priority, DetectionContext, Detector, MatchOutcome};
use crate::error::DetectorError;
use crate::formatters::numbers::format_currency;

/// Percentage to cumulative weeks of payment
#[derive(Debug, Clone, PartialEq)]
pub struct RatingTable {
    weeks: BTreeMap<u32, f64>,
}

/// Weeks paid for each individual percentage point, by band
fn weeks_for_point(point: u32) -> f64 {
    match point {
        1..=9 => 3.0,
        10..=14 => 4.0,
        15..=24 => 5.0,
        25..=29 => 6.0,
        30..=49 => 7.0,
        50..=69 => 8.0,
        _ => 9.0,
    }
}

impl RatingTable {
    /// Built-in schedule covering 1..=99
    pub fn standard() -> Self {
        let mut total = 0.0;
        let weeks = (1..=99)
            .map(|point| {
                total += weeks_for_point(point);
                (point, total)
            })
            .collect();
        Self { weeks }
    }

    /// Table from explicit `(percentage, weeks)` pairs
    pub fn from_entries(entries: impl IntoIterator<Item = (u32, f64)>) -> Self {
        Self {
            weeks: entries.into_iter().collect(),
        }
    }

    pub fn weeks_for(&self, percentage: u32) -> Option<f64> {
        self.weeks.get(&percentage).copied()
    }

    pub fn len(&self) -> usize {
        self.weeks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }
}

impl Default for RatingTable {
    fn default() -> Self {
        Self::standard()
    }
}

pub struct RatingDetector;

impl RatingDetector {
    pub const ID: &'static str = "rating";
}

impl Detector for RatingDetector {
    fn id(&self) -> &str {
        Self::ID
    }

    fn priority(&self) -> i32 {
        priority::RATING
    }

    fn detect(&self, text: &str, ctx: &DetectionContext<'_>) -> Result<MatchOutcome, DetectorError> {
        let Some(caps) = ctx.patterns.captures("percentage_code", text.trim()) else {
            return Ok(MatchOutcome::NoMatch);
        };
        let Some(digits) = caps.get(1).or_else(|| caps.get(2)) else {
            return Ok(MatchOutcome::NoMatch);
        };
        let Ok(percentage) = digits.parse::<u32>() else {
            return Ok(MatchOutcome::NoMatch);
        };
        let Some(weeks) = ctx.ratings.weeks_for(percentage) else {
            return Ok(MatchOutcome::NoMatch);
        };

        let amount = weeks * ctx.config.rating.weekly_rate;
        let formatted = format_currency(amount)
            .ok_or_else(|| DetectorError::Failed(format!("payout for {percentage}% is not finite")))?;
        Ok(MatchOutcome::Text(formatted))
    }
}
