// WHY: Thin detector adapters over the registered arithmetic and date-range formatters

use std::sync::Arc;

use super::{priority, DetectionContext, Detector, MatchOutcome};
use crate::error::DetectorError;
use crate::formatters::Formatter;

/// Detector that defers gate and processing to a [`Formatter`]
pub struct FormatterDetector {
    id: &'static str,
    priority: i32,
    formatter: Arc<dyn Formatter>,
}

impl FormatterDetector {
    pub fn new(id: &'static str, priority: i32, formatter: Arc<dyn Formatter>) -> Self {
        Self {
            id,
            priority,
            formatter,
        }
    }

    pub fn arithmetic(formatter: Arc<dyn Formatter>) -> Self {
        Self::new("arithmetic", priority::ARITHMETIC, formatter)
    }

    pub fn date_range(formatter: Arc<dyn Formatter>) -> Self {
        Self::new("date_range", priority::DATE_RANGE, formatter)
    }
}

impl Detector for FormatterDetector {
    fn id(&self) -> &str {
        self.id
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn detect(&self, text: &str, ctx: &DetectionContext<'_>) -> Result<MatchOutcome, DetectorError> {
        let opts = ctx.formatter_options();
        if !self.formatter.is_candidate(text, &opts) {
            return Ok(MatchOutcome::NoMatch);
        }
        Ok(MatchOutcome::from_option(self.formatter.process(text, &opts)))
    }
}
