// WHY: "<value> <unit> to <unit>" conversions within one measurement category
// Linear units scale through a base unit; temperatures go through Celsius

use super::{priority, DetectionContext, Detector, MatchOutcome};
use crate::error::DetectorError;
use crate::formatters::numbers::{format_decimal, normalize_number};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Length,
    Mass,
    Volume,
    Data,
    Time,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureScale {
    Celsius,
    Fahrenheit,
    Kelvin,
}

impl TemperatureScale {
    fn to_celsius(self, value: f64) -> f64 {
        match self {
            Self::Celsius => value,
            Self::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
            Self::Kelvin => value - 273.15,
        }
    }

    fn from_celsius(self, value: f64) -> f64 {
        match self {
            Self::Celsius => value,
            Self::Fahrenheit => value * 9.0 / 5.0 + 32.0,
            Self::Kelvin => value + 273.15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Unit {
    /// Category plus the size of one unit in the category's base unit
    Scaled(Category, f64),
    Temperature(TemperatureScale),
}

use Category::*;

/// Aliases (lowercase) and factors relative to m, kg, L, byte, s
const SCALED_UNITS: &[(&[&str], Category, f64)] = &[
    (&["mm", "millimeter", "millimeters", "millimetre", "millimetres"], Length, 0.001),
    (&["cm", "centimeter", "centimeters", "centimetre", "centimetres"], Length, 0.01),
    (&["m", "meter", "meters", "metre", "metres"], Length, 1.0),
    (&["km", "kilometer", "kilometers", "kilometre", "kilometres"], Length, 1000.0),
    (&["in", "inch", "inches", "\""], Length, 0.0254),
    (&["ft", "foot", "feet", "'"], Length, 0.3048),
    (&["yd", "yard", "yards"], Length, 0.9144),
    (&["mi", "mile", "miles"], Length, 1609.344),
    (&["nmi", "nautical mile", "nautical miles"], Length, 1852.0),
    (&["mg", "milligram", "milligrams"], Mass, 0.000_001),
    (&["g", "gram", "grams"], Mass, 0.001),
    (&["kg", "kilogram", "kilograms", "kilo", "kilos"], Mass, 1.0),
    (&["t", "tonne", "tonnes", "metric ton", "metric tons"], Mass, 1000.0),
    (&["oz", "ounce", "ounces"], Mass, 0.028_349_523_125),
    (&["lb", "lbs", "pound", "pounds"], Mass, 0.453_592_37),
    (&["st", "stone", "stones"], Mass, 6.350_293_18),
    (&["ml", "milliliter", "milliliters", "millilitre", "millilitres"], Volume, 0.001),
    (&["cl", "centiliter", "centiliters"], Volume, 0.01),
    (&["dl", "deciliter", "deciliters"], Volume, 0.1),
    (&["l", "liter", "liters", "litre", "litres"], Volume, 1.0),
    (&["tsp", "teaspoon", "teaspoons"], Volume, 0.004_928_921_593_75),
    (&["tbsp", "tablespoon", "tablespoons"], Volume, 0.014_786_764_781_25),
    (&["fl oz", "floz", "fluid ounce", "fluid ounces"], Volume, 0.029_573_529_562_5),
    (&["cup", "cups"], Volume, 0.236_588_236_5),
    (&["pt", "pint", "pints"], Volume, 0.473_176_473),
    (&["qt", "quart", "quarts"], Volume, 0.946_352_946),
    (&["gal", "gallon", "gallons"], Volume, 3.785_411_784),
    (&["b", "byte", "bytes"], Data, 1.0),
    (&["kb", "kilobyte", "kilobytes"], Data, 1e3),
    (&["mb", "megabyte", "megabytes"], Data, 1e6),
    (&["gb", "gigabyte", "gigabytes"], Data, 1e9),
    (&["tb", "terabyte", "terabytes"], Data, 1e12),
    (&["kib", "kibibyte", "kibibytes"], Data, 1024.0),
    (&["mib", "mebibyte", "mebibytes"], Data, 1_048_576.0),
    (&["gib", "gibibyte", "gibibytes"], Data, 1_073_741_824.0),
    (&["ms", "millisecond", "milliseconds"], Time, 0.001),
    (&["s", "sec", "secs", "second", "seconds"], Time, 1.0),
    (&["min", "mins", "minute", "minutes"], Time, 60.0),
    (&["h", "hr", "hrs", "hour", "hours"], Time, 3600.0),
    (&["d", "day", "days"], Time, 86_400.0),
    (&["wk", "week", "weeks"], Time, 604_800.0),
];

const TEMPERATURE_UNITS: &[(&[&str], TemperatureScale)] = &[
    (&["c", "°c", "celsius", "degc"], TemperatureScale::Celsius),
    (&["f", "°f", "fahrenheit", "degf"], TemperatureScale::Fahrenheit),
    (&["k", "kelvin"], TemperatureScale::Kelvin),
];

/// Resolve a unit name or alias, case-insensitively
pub fn lookup_unit(name: &str) -> Option<Unit> {
    let key = name.trim().trim_end_matches('.').to_lowercase();
    if let Some((_, category, factor)) = SCALED_UNITS.iter().find(|(aliases, _, _)| aliases.contains(&key.as_str())) {
        return Some(Unit::Scaled(*category, *factor));
    }
    TEMPERATURE_UNITS
        .iter()
        .find(|(aliases, _)| aliases.contains(&key.as_str()))
        .map(|(_, scale)| Unit::Temperature(*scale))
}

/// Convert between two units of the same category
pub fn convert(value: f64, from: Unit, to: Unit) -> Option<f64> {
    match (from, to) {
        (Unit::Scaled(a, from_factor), Unit::Scaled(b, to_factor)) if a == b => {
            Some(value * from_factor / to_factor)
        }
        (Unit::Temperature(from), Unit::Temperature(to)) => Some(to.from_celsius(from.to_celsius(value))),
        _ => None,
    }
}

pub struct UnitDetector;

impl UnitDetector {
    pub const ID: &'static str = "units";
}

impl Detector for UnitDetector {
    fn id(&self) -> &str {
        Self::ID
    }

    fn priority(&self) -> i32 {
        priority::UNITS
    }

    fn detect(&self, text: &str, ctx: &DetectionContext<'_>) -> Result<MatchOutcome, DetectorError> {
        let Some(caps) = ctx.patterns.captures("unit_conversion", text.trim()) else {
            return Ok(MatchOutcome::NoMatch);
        };
        let (Some(raw_value), Some(from_name), Some(to_name)) = (caps.get(1), caps.get(2), caps.get(3))
        else {
            return Ok(MatchOutcome::NoMatch);
        };

        let value = normalize_number(raw_value).and_then(|n| n.parse::<f64>().ok());
        let from = lookup_unit(from_name);
        let to = lookup_unit(to_name);
        let (Some(value), Some(from), Some(to)) = (value, from, to) else {
            return Ok(MatchOutcome::NoMatch);
        };

        let Some(converted) = convert(value, from, to).filter(|v| v.is_finite()) else {
            return Ok(MatchOutcome::NoMatch);
        };
        let precision = ctx.config.units.precision;
        Ok(MatchOutcome::Text(format!(
            "{} {}",
            format_decimal(converted, precision),
            to_name.trim()
        )))
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

    fn detect_with(text: &str, config: &Config) -> MatchOutcome {
        let ratings = RatingTable::standard();
        let ctx = DetectionContext {
            config,
            patterns: SHARED_PATTERNS.get_or_init(|| PatternRegistry::new().unwrap()),
            ratings: &ratings,
            today: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            scope: Scope::Whole,
            matches: &[],
        };
        UnitDetector.detect(text, &ctx).unwrap()
    }

    fn detect(text: &str) -> MatchOutcome {
        detect_with(text, &Config::default())
    }

    fn text(s: &str) -> MatchOutcome {
        MatchOutcome::Text(s.to_string())
    }

    #[test]
    fn test_linear_conversions() {
        assert_eq!(detect("5 km to mi"), text("3.1069 mi"));
        assert_eq!(detect("12 in in cm"), text("30.48 cm"));
        assert_eq!(detect("1,500 g as kg"), text("1.5 kg"));
        assert_eq!(detect("2 GiB into MB"), text("2147.4836 MB"));
        assert_eq!(detect("90 minutes to hours"), text("1.5 hours"));
    }

    #[test]
    fn test_temperature_conversions() {
        assert_eq!(detect("100 C to F"), text("212 F"));
        assert_eq!(detect("32 fahrenheit to celsius"), text("0 celsius"));
        assert_eq!(detect("0 K to C"), text("-273.15 C"));
    }

    #[test]
    fn test_precision_from_config() {
        let config = Config::from_toml_str("[units]\nprecision = 1").unwrap();
        assert_eq!(detect_with("5 km to mi", &config), text("3.1 mi"));
    }

    #[test]
    fn test_declines_mismatched_or_unknown_units() {
        assert_eq!(detect("5 kg to km"), MatchOutcome::NoMatch);
        assert_eq!(detect("5 furlongs to m"), MatchOutcome::NoMatch);
        assert_eq!(detect("5 km"), MatchOutcome::NoMatch);
        assert_eq!(detect("walk to school"), MatchOutcome::NoMatch);
    }
}
