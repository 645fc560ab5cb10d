// WHY: Named, precompiled matchers shared by the seed extractor, formatters and detectors
// Every pattern is compiled once in a loose (search) form and a full (anchored) form

use anyhow::{Context, Result};
use regex_automata::{meta::Regex, util::captures::Captures, Match};
use std::collections::HashMap;
use std::ops::Range;
use tracing::{debug, info};

/// Month names and standard abbreviations, matched case-insensitively
const MONTH: &str = "jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?";

/// Characters an arithmetic run may consist of (digits, operators, grouping, currency)
const ARITH_CLASS: &str = r"[\d\s$.,()+\-*/%^]";

/// Separators a numeric date may use; one date never mixes them
const DATE_SEPARATORS: &[&str] = &["/", r"\.", "-"];

/// Alternation of `shape` instantiated once per date separator
fn each_separator(shape: impl Fn(&str) -> String) -> String {
    DATE_SEPARATORS.iter().map(|sep| shape(sep)).collect::<Vec<_>>().join("|")
}

/// Month, day and 2- or 4-digit year joined by `sep`
fn mdy(sep: &str) -> String {
    format!(r"\d{{1,2}}{sep}\d{{1,2}}{sep}(?:\d{{4}}|\d{{2}})")
}

fn pattern_table() -> Vec<(&'static str, String)> {
    vec![
        // Arithmetic
        (
            "arithmetic_candidate",
            format!(r"[\s$(.]*[-+]?[\s$(.]*\d{ARITH_CLASS}*(?:(?i:of){ARITH_CLASS}+)?"),
        ),
        ("arithmetic_run", r"[\d.()+\-*/%^\s$,cC]+".to_string()),
        ("arithmetic_tail", r"\s+([\d.()+\-*/%^\s$,cC]+)$".to_string()),
        ("localized_number", r"\d[\d.,]*\d|\d".to_string()),
        ("decimal", r"\d+(?:\.\d+)?".to_string()),
        ("percentage_of", r"(\d+(?:\.\d+)?)%(?i:of)(\d+(?:\.\d+)?)".to_string()),
        ("percentage_add", r"(\d+(?:\.\d+)?)\+(\d+(?:\.\d+)?)%".to_string()),
        ("percentage_sub", r"(\d+(?:\.\d+)?)-(\d+(?:\.\d+)?)%".to_string()),
        // Dates; one alternative per separator so "2.5-10" is never a date
        ("date_full", each_separator(|s| format!(r"{}|\d{{4}}{s}\d{{1,2}}{s}\d{{1,2}}", mdy(s)))),
        (
            "date_token",
            format!(r"\b(?:{}|\d{{1,2}}/\d{{1,2}})\b", each_separator(mdy)),
        ),
        (
            "date_token_iso",
            format!(r"\b(?:{})\b", each_separator(|s| format!(r"\d{{4}}{s}\d{{1,2}}{s}\d{{1,2}}"))),
        ),
        (
            "date_token_text",
            format!(
                r"(?i)\b(?:{MONTH})\.?\s+\d{{1,2}}(?:st|nd|rd|th)?(?:,?\s+\d{{4}})?\b|\b\d{{1,2}}(?:st|nd|rd|th)?\s+(?:{MONTH})\.?(?:,?\s+\d{{4}})?\b"
            ),
        ),
        (
            "date_part_iso",
            each_separator(|s| format!(r"(\d{{4}}){s}(\d{{1,2}}){s}(\d{{1,2}})")),
        ),
        (
            "date_part_mdy",
            each_separator(|s| format!(r"(\d{{1,2}}){s}(\d{{1,2}}){s}(\d{{4}}|\d{{2}})")),
        ),
        ("date_part_md", r"(\d{1,2})/(\d{1,2})".to_string()),
        (
            "date_part_month_day",
            format!(r"(?i)({MONTH})\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?(?:,?\s+(\d{{4}}))?"),
        ),
        (
            "date_part_day_month",
            format!(r"(?i)(\d{{1,2}})(?:st|nd|rd|th)?\s+({MONTH})\.?(?:,?\s+(\d{{4}}))?"),
        ),
        // Ratings and combinations
        (
            "percentage_code",
            r"(?i)(?:pd|rating)\s*(\d{1,3})\s*%?|(\d{1,3})\s*%".to_string(),
        ),
        (
            "combination",
            r"\d+(?:\.\d+)?\s*%?(?:\s*[cC]\s*\d+(?:\.\d+)?\s*%?)+".to_string(),
        ),
        // Phone numbers
        ("phone", r"(?:\+?1[\s.\-]?)?\d{3}[\s.\-]?\d{3}[\s.\-]?\d{4}".to_string()),
        ("phone_formatted", r"\(\d{3}\)\s?\d{3}-\d{4}".to_string()),
        // Units
        (
            "unit_conversion",
            r#"(-?\d[\d,]*(?:\.\d+)?|-?\.\d+)\s*([a-zA-Z°µ'"][a-zA-Z°µ'". ]*?)\s+(?i:to|into|in|as)\s+([a-zA-Z°µ'"][a-zA-Z°µ'". ]*)"#
                .to_string(),
        ),
        // Time calculations
        (
            "time_calc",
            r"(\d{1,2}(?::\d{2}){0,2}\s*(?i:[ap]\.?m\.?)?)\s*([+\-])\s*(\S.*)".to_string(),
        ),
        (
            "time_of_day",
            r"(\d{1,2})(?::(\d{2}))?(?::(\d{2}))?\s*(?i:([ap])\.?m\.?)?".to_string(),
        ),
        ("duration_clock", r"(\d+):(\d{2})(?::(\d{2}))?".to_string()),
        (
            "duration_part",
            r"(?i)(\d+(?:\.\d+)?)\s*(days|day|d|hours|hour|hrs|hr|h|minutes|minute|mins|min|m|seconds|second|secs|sec|s)"
                .to_string(),
        ),
        // Navigation
        ("url", r"(?i:https?)://\S+".to_string()),
        ("app_url", r"[a-zA-Z][a-zA-Z0-9+.\-]*://\S*".to_string()),
        (
            "domain",
            r"(?:[a-zA-Z0-9](?:[a-zA-Z0-9\-]*[a-zA-Z0-9])?\.)+([a-zA-Z]{2,})(?::\d+)?(?:/\S*)?".to_string(),
        ),
        ("file_path", r"(?:~|/|[A-Za-z]:\\)[^\n]*".to_string()),
    ]
}

/// Loose and anchored compilations of one named pattern
struct CompiledPattern {
    loose: Regex,
    full: Regex,
}

/// Capture groups of a full match, borrowed against the matched text
pub struct Captured<'t> {
    text: &'t str,
    caps: Captures,
}

impl<'t> Captured<'t> {
    /// Text of capture group `index` (0 is the whole match), if it participated
    pub fn get(&self, index: usize) -> Option<&'t str> {
        self.caps.get_group(index).map(|span| &self.text[span.range()])
    }

    /// Groups of the first participating alternative, for patterns written as
    /// alternatives of `N` groups each
    pub fn alternative<const N: usize>(&self) -> Option<[&'t str; N]> {
        let sets = self.caps.group_len().saturating_sub(1) / N;
        (0..sets).find_map(|set| {
            let mut groups = [""; N];
            for (offset, slot) in groups.iter_mut().enumerate() {
                *slot = self.get(1 + set * N + offset)?;
            }
            Some(groups)
        })
    }

    /// Byte range of capture group `index` within the searched text
    pub fn span(&self, index: usize) -> Option<Range<usize>> {
        self.caps.get_group(index).map(|span| span.range())
    }
}

/// Cache of compiled matchers keyed by name
pub struct PatternRegistry {
    patterns: HashMap<&'static str, CompiledPattern>,
}

impl PatternRegistry {
    /// Compile the standard pattern table
    pub fn new() -> Result<Self> {
        let table = pattern_table();
        let mut patterns = HashMap::with_capacity(table.len());

        for (name, source) in table {
            let loose = Regex::new(&source)
                .with_context(|| format!("Failed to compile pattern '{name}'"))?;
            let full = Regex::new(&format!("^(?:{source})$"))
                .with_context(|| format!("Failed to compile anchored pattern '{name}'"))?;
            patterns.insert(name, CompiledPattern { loose, full });
        }

        info!("Compiled {} named patterns", patterns.len());
        Ok(Self { patterns })
    }

    fn lookup(&self, name: &str) -> Option<&CompiledPattern> {
        let found = self.patterns.get(name);
        if found.is_none() {
            debug!(pattern = name, "Unknown pattern name");
        }
        found
    }

    /// Loose (unanchored) regex for `name`
    pub fn get(&self, name: &str) -> Option<&Regex> {
        self.lookup(name).map(|p| &p.loose)
    }

    /// True when `text` matches the pattern in its entirety
    pub fn matches(&self, name: &str, text: &str) -> bool {
        self.lookup(name).is_some_and(|p| p.full.is_match(text))
    }

    /// True when the pattern matches anywhere inside `text`
    pub fn contains(&self, name: &str, text: &str) -> bool {
        self.lookup(name).is_some_and(|p| p.loose.is_match(text))
    }

    /// Leftmost match anywhere inside `text`
    pub fn find(&self, name: &str, text: &str) -> Option<Match> {
        self.lookup(name).and_then(|p| p.loose.find(text))
    }

    /// All non-overlapping matches, left to right
    pub fn find_iter(&self, name: &str, text: &str) -> Vec<Match> {
        match self.lookup(name) {
            Some(p) => p.loose.find_iter(text).collect(),
            None => Vec::new(),
        }
    }

    /// Capture groups when `text` matches the pattern in its entirety
    pub fn captures<'t>(&self, name: &str, text: &'t str) -> Option<Captured<'t>> {
        let pattern = self.lookup(name)?;
        let mut caps = pattern.full.create_captures();
        pattern.full.captures(text, &mut caps);
        if caps.is_match() {
            Some(Captured { text, caps })
        } else {
            None
        }
    }

    /// Capture groups of the leftmost match anywhere inside `text`
    pub fn captures_in<'t>(&self, name: &str, text: &'t str) -> Option<Captured<'t>> {
        let pattern = self.lookup(name)?;
        let mut caps = pattern.loose.create_captures();
        pattern.loose.captures(text, &mut caps);
        if caps.is_match() {
            Some(Captured { text, caps })
        } else {
            None
        }
    }
}
