// WHY: Splits free text into an untouched prefix and the trailing "seed" worth evaluating
// Strategies run in a fixed order; the first one that produces a non-empty seed wins

use serde::Serialize;
use tracing::debug;

use crate::formatters::date_range::collect_tokens;
use crate::patterns::PatternRegistry;

/// Phrases after which the seed starts, when nothing more specific applies
const SEPARATORS: &[&str] = &["= ", ": ", "(", "[", "{"];

/// `prefix + seed` reproduces the input (minus trailing whitespace, or all
/// surrounding whitespace when no strategy split it)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Seed<'a> {
    pub prefix: &'a str,
    pub seed: &'a str,
}

impl<'a> Seed<'a> {
    fn split(body: &'a str, at: usize) -> Self {
        Self {
            prefix: &body[..at],
            seed: &body[at..],
        }
    }

    fn whole(body: &'a str) -> Self {
        Self {
            prefix: "",
            seed: body.trim(),
        }
    }
}

type Strategy = fn(&str, &PatternRegistry) -> Option<usize>;

const STRATEGIES: &[(&str, Strategy)] = &[
    ("date_range", split_before_first_date),
    ("arithmetic", split_arithmetic_run),
    ("separator", split_after_separator),
    ("whitespace", split_after_last_whitespace),
];

/// Choose the substring to evaluate; falls back to the whole trimmed text
pub fn extract_seed<'a>(text: &'a str, patterns: &PatternRegistry) -> Seed<'a> {
    let body = text.trim_end();
    if body.trim_start().is_empty() {
        return Seed::whole(body);
    }

    for (name, strategy) in STRATEGIES {
        if let Some(at) = strategy(body, patterns) {
            if at < body.len() {
                let seed = Seed::split(body, at);
                debug!(strategy = name, prefix = seed.prefix, seed = seed.seed, "Extracted seed");
                return seed;
            }
        }
    }

    debug!("No seed strategy applied, using whole text");
    Seed::whole(body)
}

fn leading_whitespace(text: &str) -> usize {
    text.len() - text.trim_start().len()
}

fn has_operand(text: &str) -> bool {
    text.chars().any(|c| c.is_ascii_digit() || c == '(')
}

/// Seed starts at the first date-shaped token
fn split_before_first_date(body: &str, patterns: &PatternRegistry) -> Option<usize> {
    collect_tokens(body, patterns).first().map(|token| token.start)
}

/// Whole text when it is one arithmetic run, otherwise the trailing run after whitespace
fn split_arithmetic_run(body: &str, patterns: &PatternRegistry) -> Option<usize> {
    if patterns.matches("arithmetic_run", body) && has_operand(body) {
        return Some(leading_whitespace(body));
    }

    let caps = patterns.captures_in("arithmetic_tail", body)?;
    let run = caps.get(1)?;
    if !has_operand(run) {
        return None;
    }
    caps.span(1).map(|span| span.start)
}

/// Text after the last separator, skipping the whitespace that follows it
fn split_after_separator(body: &str, _patterns: &PatternRegistry) -> Option<usize> {
    let end = SEPARATORS
        .iter()
        .filter_map(|sep| body.rfind(sep).map(|at| at + sep.len()))
        .max()?;
    let start = end + leading_whitespace(&body[end..]);
    (start < body.len()).then_some(start)
}

/// Last whitespace-delimited word
fn split_after_last_whitespace(body: &str, _patterns: &PatternRegistry) -> Option<usize> {
    let offset = leading_whitespace(body);
    let (at, ws) = body[offset..]
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())?;
    Some(offset + at + ws.len_utf8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;

    static SHARED_PATTERNS: OnceLock<PatternRegistry> = OnceLock::new();

    fn patterns() -> &'static PatternRegistry {
        SHARED_PATTERNS.get_or_init(|| PatternRegistry::new().unwrap())
    }

    fn seed_of(text: &str) -> (String, String) {
        let seed = extract_seed(text, patterns());
        (seed.prefix.to_string(), seed.seed.to_string())
    }

    #[test]
    fn test_trailing_arithmetic_run() {
        assert_eq!(seed_of("Total: 10+5"), ("Total: ".into(), "10+5".into()));
        assert_eq!(seed_of("Subtotal $1,200 + $300"), ("Subtotal ".into(), "$1,200 + $300".into()));
    }

    #[test]
    fn test_whole_text_arithmetic() {
        assert_eq!(seed_of("5 + 3"), ("".into(), "5 + 3".into()));
        assert_eq!(seed_of("(2+3)*4\n"), ("".into(), "(2+3)*4".into()));
    }

    #[test]
    fn test_date_strategy_runs_first() {
        assert_eq!(
            seed_of("Trip: Jan 5 to Jan 10"),
            ("Trip: ".into(), "Jan 5 to Jan 10".into())
        );
        assert_eq!(seed_of("3/4 - 3/9"), ("".into(), "3/4 - 3/9".into()));
    }

    #[test]
    fn test_separator_strategy() {
        assert_eq!(seed_of("total = 12 apples"), ("total = ".into(), "12 apples".into()));
        assert_eq!(seed_of("convert: 5 km to mi"), ("convert: ".into(), "5 km to mi".into()));
        assert_eq!(seed_of("Distance [5 km to mi"), ("Distance [".into(), "5 km to mi".into()));
        assert_eq!(seed_of("set {5 km to mi"), ("set {".into(), "5 km to mi".into()));
        assert_eq!(seed_of("weight (5 kg to lb"), ("weight (".into(), "5 kg to lb".into()));
    }

    #[test]
    fn test_bare_colon_and_equals_do_not_split() {
        assert_eq!(seed_of("meet at 10:30"), ("meet at ".into(), "10:30".into()));
        assert_eq!(seed_of("x=5 km to mi"), ("x=5 km to ".into(), "mi".into()));
        assert_eq!(seed_of("first. second"), ("first. ".into(), "second".into()));
    }

    #[test]
    fn test_whitespace_fallback() {
        assert_eq!(seed_of("hello world"), ("hello ".into(), "world".into()));
    }

    #[test]
    fn test_identity_fallback() {
        assert_eq!(seed_of("  word  "), ("".into(), "word".into()));
        assert_eq!(seed_of(""), ("".into(), "".into()));
        assert_eq!(seed_of("   "), ("".into(), "".into()));
    }

    #[test]
    fn test_prefix_and_seed_reassemble_input() {
        for text in ["Total: 10+5", "hello world", "a = b", "Trip: 3/4 to 3/9"] {
            let seed = extract_seed(text, patterns());
            assert_eq!(format!("{}{}", seed.prefix, seed.seed), text);
        }
    }
}
