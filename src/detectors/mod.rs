// WHY: Detector interface plus the match/side-effect types the registry accumulates
// Detectors are pure over (text, context); all accumulation happens in the registry

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::Config;
use crate::error::DetectorError;
use crate::formatters::FormatterOptions;
use crate::patterns::PatternRegistry;

pub mod combinations;
pub mod formatted;
pub mod navigation;
pub mod phone;
pub mod rating;
pub mod registry;
pub mod time_calc;
pub mod units;

pub use combinations::CombinationDetector;
pub use formatted::FormatterDetector;
pub use navigation::NavigationDetector;
pub use phone::PhoneDetector;
pub use rating::{RatingDetector, RatingTable};
pub use registry::{DetectorRegistry, DispatchResult};
pub use time_calc::TimeCalcDetector;
pub use units::UnitDetector;

/// Priorities of the built-in detectors; lower runs first
pub mod priority {
    pub const DATE_RANGE: i32 = 10;
    pub const PHONE: i32 = 20;
    pub const RATING: i32 = 30;
    pub const COMBINATIONS: i32 = 40;
    pub const ARITHMETIC: i32 = 50;
    pub const UNITS: i32 = 60;
    pub const TIME_CALC: i32 = 70;
    pub const NAVIGATION: i32 = 1000;
}

/// What a side effect asks the host to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    OpenUrl,
    OpenPath,
}

/// Deferred action recorded by a detector; never performed here
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SideEffect {
    pub kind: EffectKind,
    /// URL or filesystem path
    pub payload: String,
    /// Human-readable notice for the host
    pub message: String,
}

/// Result of one detector over one text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    NoMatch,
    /// Replacement text
    Text(String),
    /// Text to show plus an action for the host
    SideEffect {
        display_text: String,
        effect: SideEffect,
    },
}

impl MatchOutcome {
    pub fn from_option(text: Option<String>) -> Self {
        text.map_or(Self::NoMatch, Self::Text)
    }

    pub fn is_match(&self) -> bool {
        !matches!(self, Self::NoMatch)
    }

    /// Text the host should show for this outcome
    pub fn display_text(&self) -> Option<&str> {
        match self {
            Self::NoMatch => None,
            Self::Text(text) => Some(text),
            Self::SideEffect { display_text, .. } => Some(display_text),
        }
    }
}

/// One entry of the per-dispatch match log
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchRecord {
    pub id: String,
    pub raw: String,
}

/// Whether a dispatch covers an extracted seed or the whole input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Seed,
    Whole,
}

/// Read-only view handed to every detector
#[derive(Clone, Copy)]
pub struct DetectionContext<'a> {
    pub config: &'a Config,
    pub patterns: &'a PatternRegistry,
    pub ratings: &'a RatingTable,
    pub today: NaiveDate,
    pub scope: Scope,
    /// Matches recorded earlier in the same dispatch
    pub matches: &'a [MatchRecord],
}

impl<'a> DetectionContext<'a> {
    pub fn formatter_options(&self) -> FormatterOptions<'a> {
        FormatterOptions {
            patterns: self.patterns,
            config: self.config,
            today: self.today,
        }
    }

    /// Same view with a different match log
    pub fn with_matches<'b>(&self, matches: &'b [MatchRecord]) -> DetectionContext<'b>
    where
        'a: 'b,
    {
        DetectionContext {
            config: self.config,
            patterns: self.patterns,
            ratings: self.ratings,
            today: self.today,
            scope: self.scope,
            matches,
        }
    }
}

/// A pattern-gated transformer with a unique id and a dispatch priority
pub trait Detector: Send + Sync {
    fn id(&self) -> &str;

    /// Lower runs first; ties keep registration order
    fn priority(&self) -> i32;

    /// `Err` marks a fault; the registry logs it and treats the detector as not matching
    fn detect(&self, text: &str, ctx: &DetectionContext<'_>) -> Result<MatchOutcome, DetectorError>;
}
