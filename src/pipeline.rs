// WHY: One entry point from raw text to transformed text plus an optional side effect
// Seed first (prefix preserved), whole text second, surrounding whitespace always restored

use anyhow::Result;
use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::detectors::{
    DetectionContext, Detector, DetectorRegistry, DispatchResult, MatchRecord, RatingTable, Scope,
    SideEffect,
};
use crate::formatters::FormatterRegistry;
use crate::patterns::PatternRegistry;
use crate::seed::{extract_seed, Seed};

/// What the host receives for one input
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineOutput {
    pub text: String,
    pub changed: bool,
    pub matched_id: Option<String>,
    pub side_effect: Option<SideEffect>,
    pub matches: Vec<MatchRecord>,
}

impl PipelineOutput {
    fn unchanged(raw: &str) -> Self {
        Self {
            text: raw.to_string(),
            changed: false,
            matched_id: None,
            side_effect: None,
            matches: Vec::new(),
        }
    }

    fn from_dispatch(raw: &str, text: String, result: DispatchResult) -> Self {
        Self {
            changed: text != raw,
            text,
            matched_id: result.matched_id,
            side_effect: result.side_effect,
            matches: result.matches,
        }
    }
}

/// Compiled patterns, formatters, detectors and configuration, built once
pub struct Pipeline {
    config: Config,
    patterns: PatternRegistry,
    formatters: FormatterRegistry,
    detectors: DetectorRegistry,
    ratings: RatingTable,
    today: Option<NaiveDate>,
}

impl Pipeline {
    pub fn new(config: Config) -> Result<Self> {
        Self::with_formatters(config, FormatterRegistry::standard()?)
    }

    /// Build the standard detectors over host-supplied formatter implementations
    pub fn with_formatters(config: Config, formatters: FormatterRegistry) -> Result<Self> {
        config.validate()?;
        let patterns = PatternRegistry::new()?;
        let detectors = DetectorRegistry::standard(&formatters, &config)?;
        info!(detectors = ?detectors.ids(), "Pipeline ready");

        Ok(Self {
            config,
            patterns,
            formatters,
            detectors,
            ratings: RatingTable::standard(),
            today: None,
        })
    }

    /// Pin the reference date used for year inference
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn with_rating_table(mut self, ratings: RatingTable) -> Self {
        self.ratings = ratings;
        self
    }

    /// Register an additional detector alongside the built-ins
    pub fn with_detector(mut self, detector: Box<dyn Detector>) -> Result<Self> {
        self.detectors.register(detector)?;
        Ok(self)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn patterns(&self) -> &PatternRegistry {
        &self.patterns
    }

    pub fn formatters(&self) -> &FormatterRegistry {
        &self.formatters
    }

    pub fn detectors(&self) -> &DetectorRegistry {
        &self.detectors
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn extract_seed<'a>(&self, text: &'a str) -> Seed<'a> {
        extract_seed(text, &self.patterns)
    }

    /// Run every detector over `text` with a fresh match log
    pub fn dispatch(&self, text: &str, scope: Scope) -> DispatchResult {
        let ctx = DetectionContext {
            config: &self.config,
            patterns: &self.patterns,
            ratings: &self.ratings,
            today: self.today(),
            scope,
            matches: &[],
        };
        self.detectors.dispatch(text, &ctx)
    }

    pub fn process(&self, raw: &str) -> PipelineOutput {
        let body = raw.trim();
        if body.is_empty() {
            return PipelineOutput::unchanged(raw);
        }
        let leading = &raw[..raw.len() - raw.trim_start().len()];
        let trailing = &raw[raw.trim_end().len()..];

        let seed = self.extract_seed(body);
        if !seed.prefix.is_empty() {
            let result = self.dispatch(seed.seed, Scope::Seed);
            if let Some(primary) = &result.primary {
                debug!(prefix = seed.prefix, seed = seed.seed, "Seed matched");
                let text = format!("{leading}{}{primary}{trailing}", seed.prefix);
                return PipelineOutput::from_dispatch(raw, text, result);
            }
        }

        let result = self.dispatch(body, Scope::Whole);
        let text = match &result.primary {
            Some(primary) => format!("{leading}{primary}{trailing}"),
            None => raw.to_string(),
        };
        PipelineOutput::from_dispatch(raw, text, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::EffectKind;

    fn pipeline() -> Pipeline {
        Pipeline::new(Config::default())
            .unwrap()
            .with_today(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap())
    }

    #[test]
    fn test_whole_text_arithmetic() {
        let out = pipeline().process("2+3*4");
        assert_eq!(out.text, "14");
        assert!(out.changed);
        assert_eq!(out.matched_id.as_deref(), Some("arithmetic"));
        assert!(out.side_effect.is_none());
    }

    #[test]
    fn test_prefix_and_whitespace_preserved() {
        let out = pipeline().process("  Total: 10+5\n");
        assert_eq!(out.text, "  Total: 15\n");
    }

    #[test]
    fn test_side_effect_keeps_text() {
        let out = pipeline().process("example.com");
        assert_eq!(out.text, "example.com");
        assert!(!out.changed);
        assert_eq!(out.matched_id.as_deref(), Some("navigation"));
        assert_eq!(out.side_effect.map(|e| e.kind), Some(EffectKind::OpenUrl));
    }

    #[test]
    fn test_decimal_arithmetic_is_not_a_date() {
        let pipeline = pipeline();
        for (input, expected) in [("2.5-10", "-7.5"), ("12.5/10", "1.25"), ("1.5-22", "-20.5")] {
            let out = pipeline.process(input);
            assert_eq!(out.text, expected, "input {input}");
            assert_eq!(out.matched_id.as_deref(), Some("arithmetic"));
            assert!(out.side_effect.is_none());
        }
    }

    #[test]
    fn test_negated_group() {
        let pipeline = pipeline();
        assert_eq!(pipeline.process("10/-(2+3)").text, "-2");
        assert_eq!(pipeline.process("2^-(1+1)").text, "0.25");
    }

    #[test]
    fn test_bracket_separator_feeds_seed() {
        let out = pipeline().process("Distance [5 km to mi");
        assert_eq!(out.text, "Distance [3.1069 mi");
        assert_eq!(out.matched_id.as_deref(), Some("units"));
    }

    #[test]
    fn test_blank_input_is_untouched() {
        let out = pipeline().process("  \n");
        assert_eq!(out, PipelineOutput::unchanged("  \n"));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = Config::default();
        config.units.precision = 99;
        assert!(Pipeline::new(config).is_err());
    }
}
