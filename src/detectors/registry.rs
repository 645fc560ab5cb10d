// WHY: Priority-ordered detector dispatch with per-detector fault isolation
// A failing or panicking detector is logged and skipped; later detectors still run

use serde::Serialize;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, warn};

use super::{
    CombinationDetector, DetectionContext, Detector, FormatterDetector, MatchOutcome, MatchRecord,
    NavigationDetector, PhoneDetector, RatingDetector, SideEffect, TimeCalcDetector, UnitDetector,
};
use crate::config::Config;
use crate::error::RegistryError;
use crate::formatters::FormatterRegistry;

/// Everything one dispatch produced
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchResult {
    /// Display text of the first (highest-priority) match
    pub primary: Option<String>,
    /// Id of the detector that produced `primary`
    pub matched_id: Option<String>,
    /// Every match in dispatch order
    pub matches: Vec<MatchRecord>,
    /// Last side effect recorded
    pub side_effect: Option<SideEffect>,
    /// The recorded side effect came from the navigation fallback
    pub handled_by_navigation: bool,
}

impl DispatchResult {
    pub fn matched(&self) -> bool {
        !self.matches.is_empty()
    }
}

/// Detectors sorted by ascending priority
#[derive(Default)]
pub struct DetectorRegistry {
    detectors: Vec<Box<dyn Detector>>,
}

impl DetectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in detectors minus those disabled in `config`
    pub fn standard(formatters: &FormatterRegistry, config: &Config) -> Result<Self, RegistryError> {
        let builtins: Vec<Box<dyn Detector>> = vec![
            Box::new(FormatterDetector::date_range(formatters.get("date_range")?)),
            Box::new(PhoneDetector),
            Box::new(RatingDetector),
            Box::new(CombinationDetector),
            Box::new(FormatterDetector::arithmetic(formatters.get("arithmetic")?)),
            Box::new(UnitDetector),
            Box::new(TimeCalcDetector),
            Box::new(NavigationDetector),
        ];

        let mut registry = Self::new();
        for detector in builtins {
            if config.is_disabled(detector.id()) {
                debug!(detector = detector.id(), "Detector disabled by configuration");
                continue;
            }
            registry.register(detector)?;
        }
        Ok(registry)
    }

    /// Add a detector; ids must be non-empty and unique
    pub fn register(&mut self, detector: Box<dyn Detector>) -> Result<(), RegistryError> {
        let id = detector.id();
        if id.trim().is_empty() {
            return Err(RegistryError::EmptyId);
        }
        if self.detectors.iter().any(|d| d.id() == id) {
            return Err(RegistryError::DuplicateId(id.to_string()));
        }

        debug!(detector = id, priority = detector.priority(), "Registered detector");
        self.detectors.push(detector);
        // Stable: equal priorities keep registration order
        self.detectors.sort_by_key(|d| d.priority());
        Ok(())
    }

    /// Ids in dispatch order
    pub fn ids(&self) -> Vec<&str> {
        self.detectors.iter().map(|d| d.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    /// Run every detector once, in priority order, over `text`
    pub fn dispatch(&self, text: &str, base: &DetectionContext<'_>) -> DispatchResult {
        let mut result = DispatchResult::default();

        for detector in &self.detectors {
            let ctx = base.with_matches(&result.matches);
            let outcome = run_isolated(detector.as_ref(), text, &ctx);

            let (display_text, effect) = match outcome {
                MatchOutcome::NoMatch => continue,
                MatchOutcome::Text(text) => (text, None),
                MatchOutcome::SideEffect {
                    display_text,
                    effect,
                } => (display_text, Some(effect)),
            };

            let id = detector.id();
            debug!(detector = id, output = %display_text, "Detector matched");

            if result.primary.is_none() {
                result.primary = Some(display_text.clone());
                result.matched_id = Some(id.to_string());
            }
            if let Some(effect) = effect {
                result.handled_by_navigation = id == NavigationDetector::ID;
                result.side_effect = Some(effect);
            }
            result.matches.push(MatchRecord {
                id: id.to_string(),
                raw: display_text,
            });
        }

        result
    }
}

fn run_isolated(detector: &dyn Detector, text: &str, ctx: &DetectionContext<'_>) -> MatchOutcome {
    match catch_unwind(AssertUnwindSafe(|| detector.detect(text, ctx))) {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => {
            warn!(detector = detector.id(), error = %e, "Detector failed, skipping");
            MatchOutcome::NoMatch
        }
        Err(_) => {
            warn!(detector = detector.id(), "Detector panicked, skipping");
            MatchOutcome::NoMatch
        }
    }
}
