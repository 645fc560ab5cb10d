// WHY: Bare 10-digit phone numbers to "(XXX) XXX-XXXX", keeping any ';'-separated extras

use super::{priority, DetectionContext, Detector, MatchOutcome};
use crate::error::DetectorError;

pub struct PhoneDetector;

impl PhoneDetector {
    pub const ID: &'static str = "phone";
}

/// Ten national digits, dropping a leading country code `1`
fn national_digits(number: &str) -> Option<String> {
    let digits: String = number.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        10 => Some(digits),
        11 if digits.starts_with('1') => Some(digits[1..].to_string()),
        _ => None,
    }
}

impl Detector for PhoneDetector {
    fn id(&self) -> &str {
        Self::ID
    }

    fn priority(&self) -> i32 {
        priority::PHONE
    }

    fn detect(&self, text: &str, ctx: &DetectionContext<'_>) -> Result<MatchOutcome, DetectorError> {
        let mut fields = text.trim().split(';');
        let number = fields.next().unwrap_or_default().trim();
        if !ctx.patterns.matches("phone", number) {
            return Ok(MatchOutcome::NoMatch);
        }
        let Some(digits) = national_digits(number) else {
            return Ok(MatchOutcome::NoMatch);
        };

        let mut parts = vec![format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..])];
        parts.extend(
            fields
                .map(str::trim)
                .filter(|field| !field.is_empty())
                .map(str::to_string),
        );
        Ok(MatchOutcome::Text(parts.join("; ")))
    }
}
