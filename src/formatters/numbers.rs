// WHY: Shared number normalization and display helpers for every formatter and detector
// Decimal/grouping disambiguation lives here so arithmetic, units and ratings agree on it

use crate::patterns::PatternRegistry;

/// Tolerance under which a result is displayed as an integer
pub const INTEGER_EPSILON: f64 = 1e-9;

/// Decimal places kept when a non-integer result is displayed
const DISPLAY_DECIMALS: usize = 10;

/// Normalize a single numeric token to plain `[-+]digits[.digits]` form
///
/// Strips a leading `$` and surrounding whitespace, keeps an explicit leading sign,
/// then resolves `,` and `.` into decimal point vs. grouping marks.
/// Returns `None` when the token holds no digits.
pub fn normalize_number(token: &str) -> Option<String> {
    let mut rest = token.trim();
    let mut sign = "";

    if let Some(stripped) = rest.strip_prefix(|c: char| c == '-' || c == '+') {
        sign = &rest[..1];
        rest = stripped.trim_start();
    }
    if let Some(stripped) = rest.strip_prefix('$') {
        rest = stripped.trim_start();
    }
    // "$-5" and "-$5" are both accepted
    if sign.is_empty() {
        if let Some(stripped) = rest.strip_prefix(|c: char| c == '-' || c == '+') {
            sign = &rest[..1];
            rest = stripped.trim_start();
        }
    }

    if !rest.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    if !rest.chars().all(|c| c.is_ascii_digit() || c == ',' || c == '.') {
        return None;
    }

    let sign = if sign == "-" { "-" } else { "" };
    Some(format!("{sign}{}", normalize_separators(rest)))
}

/// Resolve grouping and decimal separators in a run of digits, commas and periods
pub fn normalize_separators(run: &str) -> String {
    let last_comma = run.rfind(',');
    let last_period = run.rfind('.');

    match (last_comma, last_period) {
        (Some(comma), Some(period)) => {
            // Rightmost separator is the decimal point, the other one groups
            let decimal_at = comma.max(period);
            rebuild(run, Some(decimal_at))
        }
        (Some(comma), None) => {
            let trailing = run.len() - comma - 1;
            if run.matches(',').count() == 1 && trailing != 3 && trailing > 0 {
                rebuild(run, Some(comma))
            } else {
                rebuild(run, None)
            }
        }
        (None, Some(period)) => {
            if run.matches('.').count() > 1 {
                rebuild(run, None)
            } else {
                rebuild(run, Some(period))
            }
        }
        (None, None) => run.to_string(),
    }
}

/// Keep digits, turn the separator at `decimal_at` into `.`, drop all other separators
fn rebuild(run: &str, decimal_at: Option<usize>) -> String {
    let mut out = String::with_capacity(run.len());
    for (i, c) in run.char_indices() {
        if c.is_ascii_digit() {
            out.push(c);
        } else if Some(i) == decimal_at {
            out.push('.');
        }
    }
    out
}

/// Normalize every localized number inside an expression, leaving operators untouched
pub fn normalize_localized(expr: &str, patterns: &PatternRegistry) -> String {
    let mut out = String::with_capacity(expr.len());
    let mut last = 0;

    for m in patterns.find_iter("localized_number", expr) {
        out.push_str(&expr[last..m.start()]);
        out.push_str(&normalize_separators(&expr[m.range()]));
        last = m.end();
    }
    out.push_str(&expr[last..]);
    out
}

/// Insert `,` every three digits in an unsigned integer string
pub fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    let len = digits.len();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Format as `$1,234.56` / `-$1,234.56`; `None` for non-finite values
pub fn format_currency(value: f64) -> Option<String> {
    if !value.is_finite() {
        return None;
    }

    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.')?;
    let negative = value < 0.0 && fixed.bytes().any(|b| b != b'0' && b != b'.');
    let sign = if negative { "-" } else { "" };

    Some(format!("{sign}${}.{cents}", group_thousands(whole)))
}

/// Format a result as an integer when it is within [`INTEGER_EPSILON`] of one,
/// otherwise as a decimal with trailing zeros trimmed
pub fn format_number(value: f64) -> Option<String> {
    if !value.is_finite() {
        return None;
    }

    let rounded = value.round();
    if (value - rounded).abs() < INTEGER_EPSILON {
        if rounded == 0.0 {
            return Some("0".to_string());
        }
        return Some(format!("{rounded:.0}"));
    }

    Some(format_decimal(value, DISPLAY_DECIMALS))
}

/// Fixed-precision formatting with trailing zeros (and a bare point) removed
pub fn format_decimal(value: f64, precision: usize) -> String {
    let fixed = format!("{value:.precision$}");
    let trimmed = if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.')
    } else {
        fixed.as_str()
    };

    match trimmed {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_number_separators() {
        assert_eq!(normalize_number("1,234.56").as_deref(), Some("1234.56"));
        assert_eq!(normalize_number("1.234,56").as_deref(), Some("1234.56"));
        assert_eq!(normalize_number("1,234").as_deref(), Some("1234"));
        assert_eq!(normalize_number("1,5").as_deref(), Some("1.5"));
        assert_eq!(normalize_number("12,50").as_deref(), Some("12.50"));
        assert_eq!(normalize_number("1,234,567").as_deref(), Some("1234567"));
        assert_eq!(normalize_number("1.234.567").as_deref(), Some("1234567"));
    }

    #[test]
    fn test_normalize_number_currency_and_sign() {
        assert_eq!(normalize_number(" $24,000 ").as_deref(), Some("24000"));
        assert_eq!(normalize_number("-$5.25").as_deref(), Some("-5.25"));
        assert_eq!(normalize_number("$-5").as_deref(), Some("-5"));
        assert_eq!(normalize_number("+7").as_deref(), Some("7"));
        assert_eq!(normalize_number("$"), None);
        assert_eq!(normalize_number("12abc"), None);
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(20400.0).as_deref(), Some("$20,400.00"));
        assert_eq!(format_currency(-1234.567).as_deref(), Some("-$1,234.57"));
        assert_eq!(format_currency(0.5).as_deref(), Some("$0.50"));
        assert_eq!(format_currency(-0.001).as_deref(), Some("$0.00"));
        assert_eq!(format_currency(1_000_000.0).as_deref(), Some("$1,000,000.00"));
        assert_eq!(format_currency(f64::NAN), None);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(14.0).as_deref(), Some("14"));
        assert_eq!(format_number(27599.999999999996).as_deref(), Some("27600"));
        assert_eq!(format_number(0.75).as_deref(), Some("0.75"));
        assert_eq!(format_number(0.1 + 0.2).as_deref(), Some("0.3"));
        assert_eq!(format_number(-3.0).as_deref(), Some("-3"));
        assert_eq!(format_number(f64::INFINITY), None);
    }

    #[test]
    fn test_format_decimal_trims() {
        assert_eq!(format_decimal(3.10686, 4), "3.1069");
        assert_eq!(format_decimal(2.5, 4), "2.5");
        assert_eq!(format_decimal(100.0, 4), "100");
        assert_eq!(format_decimal(-0.00001, 4), "0");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("1"), "1");
        assert_eq!(group_thousands("1000"), "1,000");
        assert_eq!(group_thousands("123456"), "123,456");
        assert_eq!(group_thousands("1234567"), "1,234,567");
    }
}
