// WHY: Formatter interface shared by the arithmetic evaluator and the date-range parser
// Detectors hold formatters through this trait; implementations are validated at registration

use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::config::Config;
use crate::error::RegistryError;
use crate::patterns::PatternRegistry;

pub mod arithmetic;
pub mod date_range;
pub mod numbers;

pub use arithmetic::ArithmeticFormatter;
pub use date_range::{DateComponents, DateRange, DateRangeFormatter};

/// Read-only inputs every formatter call receives
#[derive(Clone, Copy)]
pub struct FormatterOptions<'a> {
    pub patterns: &'a PatternRegistry,
    pub config: &'a Config,
    /// Reference date for year inference
    pub today: NaiveDate,
}

/// A candidate gate plus a processor that turns matching text into its replacement
pub trait Formatter: Send + Sync {
    /// Registry key
    fn name(&self) -> &'static str;

    /// Cheap pre-check; `false` means `process` would decline
    fn is_candidate(&self, text: &str, opts: &FormatterOptions<'_>) -> bool;

    /// Replacement text, or `None` when the input is not handled
    fn process(&self, text: &str, opts: &FormatterOptions<'_>) -> Option<String>;
}

/// Named formatter implementations behind one interface
#[derive(Default, Clone)]
pub struct FormatterRegistry {
    formatters: HashMap<&'static str, Arc<dyn Formatter>>,
}

impl FormatterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in `arithmetic` and `date_range` formatters
    pub fn standard() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.register(Arc::new(ArithmeticFormatter))?;
        registry.register(Arc::new(DateRangeFormatter))?;
        Ok(registry)
    }

    /// Add an implementation; names must be non-empty and unique
    pub fn register(&mut self, formatter: Arc<dyn Formatter>) -> Result<(), RegistryError> {
        let name = formatter.name();
        if name.trim().is_empty() {
            return Err(RegistryError::EmptyId);
        }
        if self.formatters.contains_key(name) {
            return Err(RegistryError::DuplicateId(name.to_string()));
        }
        debug!(formatter = name, "Registered formatter");
        self.formatters.insert(name, formatter);
        Ok(())
    }

    /// Swap the implementation behind an existing name
    pub fn replace(&mut self, formatter: Arc<dyn Formatter>) -> Result<(), RegistryError> {
        let name = formatter.name();
        if !self.formatters.contains_key(name) {
            return Err(RegistryError::MissingFormatter(name.to_string()));
        }
        self.formatters.insert(name, formatter);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Formatter>, RegistryError> {
        self.formatters
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::MissingFormatter(name.to_string()))
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.formatters.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

/// Substitute `${name}` placeholders; unknown names render as the empty string
pub fn render_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let key = &after[..end];
                if let Some((_, value)) = values.iter().find(|(name, _)| *name == key) {
                    out.push_str(value);
                }
                rest = &after[end + 1..];
            }
            None => {
                // Unterminated placeholder is kept verbatim
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
