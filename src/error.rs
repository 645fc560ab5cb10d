// WHY: Typed failures for construction-time problems and detector faults
// Evaluation misses are never errors; they surface as `None` / `MatchOutcome::NoMatch`

/// Configuration rejected by [`crate::config::Config::validate`]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("rating.weekly_rate must be a positive finite number, got {0}")]
    InvalidWeeklyRate(f64),

    #[error("units.precision must be at most {max}, got {got}")]
    PrecisionTooLarge { got: usize, max: usize },

    #[error("navigation.search_url must contain the ${{query}} placeholder: {0}")]
    SearchUrlMissingQuery(String),

    #[error("detectors.disabled names an unknown detector: {0}")]
    UnknownDetector(String),
}

/// Registration rejected by a detector or formatter registry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("registered id must not be empty")]
    EmptyId,

    #[error("'{0}' is already registered")]
    DuplicateId(String),

    #[error("no formatter named '{0}' is registered")]
    MissingFormatter(String),
}

/// Unexpected failure inside a detector; the registry logs it and moves on
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DetectorError {
    #[error("{0}")]
    Failed(String),
}
