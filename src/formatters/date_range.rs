// WHY: Date-range parser behind the date-range detector
// token scan -> per-token components -> year inference -> validation -> ordering -> inclusive day count

use chrono::{Datelike, NaiveDate};
use std::cmp::Reverse;
use tracing::debug;

use super::{Formatter, FormatterOptions};
use crate::patterns::PatternRegistry;

/// Token-shape matchers scanned over the source text
const TOKEN_PATTERNS: &[&str] = &["date_token_iso", "date_token", "date_token_text"];

/// Phrases between two dates that make them a range
const SEPARATOR_WORDS: &[&str] = &[" to ", " and ", " through ", " thru "];

/// Hyphen, en dash, em dash
const SEPARATOR_DASHES: &[char] = &['-', '\u{2013}', '\u{2014}'];

/// How far ahead of "now" a 2-digit year may land before it is read as last century
const CENTURY_WINDOW_YEARS: i32 = 30;

/// A date-shaped span of the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateToken<'t> {
    pub start: usize,
    pub end: usize,
    pub text: &'t str,
}

/// Month/day/year as read from one token, before validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateComponents {
    pub month: u32,
    pub day: u32,
    pub year: Option<i32>,
    pub year_was_inferred: bool,
}

impl DateComponents {
    /// Calendar date, if the components (with a year) are valid
    pub fn to_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year?, self.month, self.day)
    }

    fn with_year(&self, year: i32) -> Self {
        Self {
            year: Some(year),
            year_was_inferred: true,
            ..*self
        }
    }
}

/// Ordered, validated date range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub inclusive_days: i64,
}

impl DateRange {
    /// `MM/DD/YYYY to MM/DD/YYYY, N days`
    pub fn describe(&self) -> String {
        format!(
            "{} to {}, {} days",
            self.start.format("%m/%d/%Y"),
            self.end.format("%m/%d/%Y"),
            self.inclusive_days
        )
    }
}

fn is_edge_punctuation(c: char) -> bool {
    matches!(c, ',' | ';' | ':' | '(' | ')' | '[' | ']' | '{' | '}' | '"' | '\'' | '.')
}

/// "5/10" in "12.5/10" is the tail of a decimal, not a date
fn is_inside_number(text: &str, start: usize, end: usize) -> bool {
    let joins = |punct: Option<char>, digit: Option<char>| {
        matches!((punct, digit), (Some('.' | ','), Some(d)) if d.is_ascii_digit())
    };
    let mut before = text[..start].chars().rev();
    let mut after = text[end..].chars();
    joins(before.next(), before.next()) || joins(after.next(), after.next())
}

/// Scan all token shapes, trim edge punctuation, drop overlapping spans, order by position
pub fn collect_tokens<'t>(text: &'t str, patterns: &PatternRegistry) -> Vec<DateToken<'t>> {
    let mut found = Vec::new();

    for name in TOKEN_PATTERNS {
        for m in patterns.find_iter(name, text) {
            let raw = &text[m.range()];
            let trimmed_start = raw.trim_start_matches(is_edge_punctuation);
            let trimmed = trimmed_start.trim_end_matches(is_edge_punctuation);
            if trimmed.is_empty() {
                continue;
            }
            let start = m.start() + (raw.len() - trimmed_start.len());
            let end = start + trimmed.len();
            if is_inside_number(text, start, end) {
                continue;
            }
            found.push(DateToken {
                start,
                end,
                text: trimmed,
            });
        }
    }

    // Earliest first; on a shared start the longer token wins
    found.sort_by_key(|t| (t.start, Reverse(t.end - t.start)));

    let mut tokens: Vec<DateToken<'t>> = Vec::with_capacity(found.len());
    for token in found {
        if tokens.last().is_some_and(|last| token.start < last.end) {
            continue;
        }
        tokens.push(token);
    }
    tokens
}

/// Month number for a name or standard abbreviation
fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_ascii_lowercase();
    let key = lower.get(..3)?;
    let month = match key {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// Expand a 2-digit year into the current century, or the previous one when the
/// result would sit more than 30 years in the future
pub fn expand_two_digit_year(two_digits: i32, today: NaiveDate) -> i32 {
    let century = today.year() / 100 * 100;
    let year = century + two_digits;
    if year > today.year() + CENTURY_WINDOW_YEARS {
        year - 100
    } else {
        year
    }
}

fn parse_year(digits: &str, today: NaiveDate) -> Option<i32> {
    let value: i32 = digits.parse().ok()?;
    if digits.len() == 2 {
        Some(expand_two_digit_year(value, today))
    } else {
        Some(value)
    }
}

fn components(month: u32, day: u32, year: Option<i32>) -> Option<DateComponents> {
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }
    Some(DateComponents {
        month,
        day,
        year,
        year_was_inferred: false,
    })
}

/// Parse one token; ISO, then M/D/Y, then M/D, then "Month D[, Y]", then "D Month[, Y]"
pub fn parse_token(token: &str, patterns: &PatternRegistry, today: NaiveDate) -> Option<DateComponents> {
    if let Some(caps) = patterns.captures("date_part_iso", token) {
        let [year, month, day] = caps.alternative()?;
        return components(month.parse().ok()?, day.parse().ok()?, Some(year.parse().ok()?));
    }
    if let Some(caps) = patterns.captures("date_part_mdy", token) {
        let [month, day, year] = caps.alternative()?;
        return components(month.parse().ok()?, day.parse().ok()?, Some(parse_year(year, today)?));
    }
    if let Some(caps) = patterns.captures("date_part_md", token) {
        return components(caps.get(1)?.parse().ok()?, caps.get(2)?.parse().ok()?, None);
    }
    if let Some(caps) = patterns.captures("date_part_month_day", token) {
        let year = match caps.get(3) {
            Some(digits) => Some(digits.parse().ok()?),
            None => None,
        };
        return components(month_number(caps.get(1)?)?, caps.get(2)?.parse().ok()?, year);
    }
    if let Some(caps) = patterns.captures("date_part_day_month", token) {
        let year = match caps.get(3) {
            Some(digits) => Some(digits.parse().ok()?),
            None => None,
        };
        return components(month_number(caps.get(2)?)?, caps.get(1)?.parse().ok()?, year);
    }
    None
}

fn has_separator_cue(text: &str) -> bool {
    let lower = text.to_lowercase();
    SEPARATOR_WORDS.iter().any(|word| lower.contains(word)) || text.contains(SEPARATOR_DASHES)
}

fn parsed_components(text: &str, patterns: &PatternRegistry, today: NaiveDate) -> Vec<DateComponents> {
    collect_tokens(text, patterns)
        .iter()
        .filter_map(|token| parse_token(token.text, patterns, today))
        .collect()
}

/// At least two parseable date tokens plus a range separator
pub fn is_range_candidate(text: &str, patterns: &PatternRegistry, today: NaiveDate) -> bool {
    has_separator_cue(text) && parsed_components(text, patterns, today).len() >= 2
}

/// Resolve the first two date tokens into an ordered, inclusive range
pub fn parse_range(text: &str, patterns: &PatternRegistry, today: NaiveDate) -> Option<DateRange> {
    if !has_separator_cue(text) {
        return None;
    }
    let parsed = parsed_components(text, patterns, today);
    let (mut first, mut second) = match parsed.as_slice() {
        [a, b, ..] => (*a, *b),
        _ => return None,
    };

    match (first.year, second.year) {
        (Some(_), Some(_)) => {}
        (Some(year), None) => second = second.with_year(year),
        (None, Some(year)) => first = first.with_year(year),
        (None, None) => {
            first = first.with_year(today.year());
            second = second.with_year(today.year());
        }
    }

    let mut start = first.to_date()?;
    let mut end = second.to_date()?;

    if end < start {
        if second.year_was_inferred {
            if let Some(bumped) = second.year.and_then(|y| second.with_year(y + 1).to_date()) {
                end = bumped;
            }
        } else if first.year_was_inferred {
            if let Some(bumped) = first.year.and_then(|y| first.with_year(y - 1).to_date()) {
                start = bumped;
            }
        }
    }
    if end < start {
        std::mem::swap(&mut start, &mut end);
    }

    let inclusive_days = (end - start).num_days().abs() + 1;
    debug!(%start, %end, inclusive_days, "Resolved date range");
    Some(DateRange {
        start,
        end,
        inclusive_days,
    })
}

/// `"MM/DD/YYYY to MM/DD/YYYY, N days"` or `None`
pub fn describe_range(text: &str, patterns: &PatternRegistry, today: NaiveDate) -> Option<String> {
    parse_range(text, patterns, today).map(|range| range.describe())
}

/// Formatter wrapper around [`describe_range`]
#[derive(Debug, Default, Clone, Copy)]
pub struct DateRangeFormatter;

impl Formatter for DateRangeFormatter {
    fn name(&self) -> &'static str {
        "date_range"
    }

    fn is_candidate(&self, text: &str, opts: &FormatterOptions<'_>) -> bool {
        is_range_candidate(text, opts.patterns, opts.today)
    }

    fn process(&self, text: &str, opts: &FormatterOptions<'_>) -> Option<String> {
        describe_range(text, opts.patterns, opts.today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;

    static SHARED_PATTERNS: OnceLock<PatternRegistry> = OnceLock::new();

    fn patterns() -> &'static PatternRegistry {
        SHARED_PATTERNS.get_or_init(|| PatternRegistry::new().unwrap())
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn describe(text: &str) -> Option<String> {
        describe_range(text, patterns(), today())
    }

    #[test]
    fn test_single_day_range() {
        assert_eq!(
            describe("01/01/2024 to 01/01/2024").as_deref(),
            Some("01/01/2024 to 01/01/2024, 1 days")
        );
    }

    #[test]
    fn test_explicit_year_rollover() {
        assert_eq!(
            describe("12/30/2024 - 1/2/2025").as_deref(),
            Some("12/30/2024 to 01/02/2025, 4 days")
        );
    }

    #[test]
    fn test_inferred_years_bump_end_forward() {
        assert_eq!(
            describe("12/30 - 1/2").as_deref(),
            Some("12/30/2026 to 01/02/2027, 4 days")
        );
    }

    #[test]
    fn test_sibling_year_inference() {
        assert_eq!(
            describe("January 5 - January 10, 2024").as_deref(),
            Some("01/05/2024 to 01/10/2024, 6 days")
        );
        assert_eq!(
            describe("Dec 30, 2024 to Jan 2").as_deref(),
            Some("12/30/2024 to 01/02/2025, 4 days")
        );
    }

    #[test]
    fn test_start_year_bumped_back_when_end_is_explicit() {
        assert_eq!(
            describe("Dec 30 through Jan 2, 2025").as_deref(),
            Some("12/30/2024 to 01/02/2025, 4 days")
        );
    }

    #[test]
    fn test_explicit_reverse_order_swaps() {
        assert_eq!(
            describe("2024-03-10 to 2024-03-01").as_deref(),
            Some("03/01/2024 to 03/10/2024, 10 days")
        );
    }

    #[test]
    fn test_token_shapes() {
        assert_eq!(
            describe("5 March 2024 and 7th March 2024").as_deref(),
            Some("03/05/2024 to 03/07/2024, 3 days")
        );
        assert_eq!(
            describe("12.25.24 – 12.31.24").as_deref(),
            Some("12/25/2024 to 12/31/2024, 7 days")
        );
        assert_eq!(
            describe("Sept. 1st thru Sept. 30th, 2025").as_deref(),
            Some("09/01/2025 to 09/30/2025, 30 days")
        );
    }

    #[test]
    fn test_leap_year_validation() {
        assert_eq!(
            describe("2/28/2024 - 2/29/2024").as_deref(),
            Some("02/28/2024 to 02/29/2024, 2 days")
        );
        assert_eq!(describe("2/28/2023 - 2/29/2023"), None);
        assert_eq!(describe("4/31/2024 - 5/2/2024"), None);
    }

    #[test]
    fn test_non_ranges_decline() {
        assert_eq!(describe("1/1/2024"), None);
        assert_eq!(describe("1/1/2024 1/5/2024"), None);
        assert_eq!(describe("no dates here - none"), None);
        assert!(!is_range_candidate("3/4", patterns(), today()));
        assert!(is_range_candidate("3/4 to 3/9", patterns(), today()));
    }

    #[test]
    fn test_sliding_century() {
        assert_eq!(expand_two_digit_year(24, today()), 2024);
        assert_eq!(expand_two_digit_year(56, today()), 2056);
        assert_eq!(expand_two_digit_year(57, today()), 1957);
        assert_eq!(expand_two_digit_year(99, today()), 1999);
    }

    #[test]
    fn test_overlapping_tokens_deduplicated() {
        let tokens = collect_tokens("2024/01/05 - (2024/01/09)", patterns());
        let texts: Vec<_> = tokens.iter().map(|t| t.text).collect();
        assert_eq!(texts, vec!["2024/01/05", "2024/01/09"]);
        assert_eq!(tokens[1].start, 14);
    }

    #[test]
    fn test_decimal_tails_are_not_dates() {
        assert!(collect_tokens("12.5/10", patterns()).is_empty());
        assert!(collect_tokens("1,5/10 + 2", patterns()).is_empty());
        assert!(collect_tokens("3/4.5", patterns()).is_empty());
        assert!(collect_tokens("2.5-10", patterns()).is_empty());
        let tokens = collect_tokens("due 3/4. 5 days", patterns());
        assert_eq!(tokens.iter().map(|t| t.text).collect::<Vec<_>>(), vec!["3/4"]);
    }
}
