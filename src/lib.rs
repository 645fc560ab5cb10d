pub mod config;
pub mod detectors;
pub mod error;
pub mod formatters;
pub mod patterns;
pub mod pipeline;
pub mod seed;

// Re-export main types for convenient access
pub use config::Config;
pub use pipeline::{Pipeline, PipelineOutput};
pub use patterns::PatternRegistry;
pub use seed::{extract_seed, Seed};

// Re-export detector and formatter surfaces for custom registrations
pub use detectors::{
    DetectionContext, Detector, DetectorRegistry, DispatchResult, EffectKind, MatchOutcome,
    MatchRecord, Scope, SideEffect,
};
pub use error::{ConfigError, DetectorError, RegistryError};
pub use formatters::{Formatter, FormatterOptions, FormatterRegistry};
