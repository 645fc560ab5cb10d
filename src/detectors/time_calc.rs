// WHY: Clock arithmetic ("3:30pm + 2h 15m", "23:30 - 1:45") wrapping around midnight
// Output keeps the input's clock style: 12-hour in, 12-hour out

use chrono::{NaiveTime, TimeDelta};

use super::{priority, DetectionContext, Detector, MatchOutcome};
use crate::error::DetectorError;
use crate::patterns::PatternRegistry;

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 3_600;
const SECONDS_PER_DAY: i64 = 86_400;

/// A parsed time of day plus how it was written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTime {
    pub time: NaiveTime,
    pub twelve_hour: bool,
    pub with_seconds: bool,
}

impl ClockTime {
    pub fn render(&self, time: NaiveTime) -> String {
        let format = match (self.twelve_hour, self.with_seconds) {
            (true, true) => "%-I:%M:%S %p",
            (true, false) => "%-I:%M %p",
            (false, true) => "%H:%M:%S",
            (false, false) => "%H:%M",
        };
        time.format(format).to_string()
    }
}

fn parse_group<T: std::str::FromStr>(text: Option<&str>) -> Option<Option<T>> {
    match text {
        Some(digits) => digits.parse().ok().map(Some),
        None => Some(None),
    }
}

/// "3pm", "3:30 p.m.", "15:45", "07:05:30"; a bare hour needs a meridiem
pub fn parse_time_of_day(text: &str, patterns: &PatternRegistry) -> Option<ClockTime> {
    let caps = patterns.captures("time_of_day", text.trim())?;
    let hour: u32 = caps.get(1)?.parse().ok()?;
    let minute: Option<u32> = parse_group(caps.get(2))?;
    let second: Option<u32> = parse_group(caps.get(3))?;
    let meridiem = caps.get(4).map(|m| m.eq_ignore_ascii_case("p"));

    if minute.is_none() && meridiem.is_none() {
        return None;
    }

    let hour = match meridiem {
        Some(is_pm) => {
            if !(1..=12).contains(&hour) {
                return None;
            }
            hour % 12 + if is_pm { 12 } else { 0 }
        }
        None => hour,
    };

    let time = NaiveTime::from_hms_opt(hour, minute.unwrap_or(0), second.unwrap_or(0))?;
    Some(ClockTime {
        time,
        twelve_hour: meridiem.is_some(),
        with_seconds: second.is_some(),
    })
}

fn unit_seconds(unit: &str) -> Option<f64> {
    let unit = unit.to_lowercase();
    let seconds = match unit.as_str() {
        "d" | "day" | "days" => SECONDS_PER_DAY,
        "h" | "hr" | "hrs" | "hour" | "hours" => SECONDS_PER_HOUR,
        "m" | "min" | "mins" | "minute" | "minutes" => SECONDS_PER_MINUTE,
        "s" | "sec" | "secs" | "second" | "seconds" => 1,
        _ => return None,
    };
    Some(seconds as f64)
}

/// "1:45", "1:45:30", "2h 15m", "1 hour and 30 minutes", "90 min" as whole seconds
pub fn parse_duration(text: &str, patterns: &PatternRegistry) -> Option<i64> {
    let text = text.trim();

    if let Some(caps) = patterns.captures("duration_clock", text) {
        let hours: i64 = caps.get(1)?.parse().ok()?;
        let minutes: i64 = caps.get(2)?.parse().ok()?;
        let seconds: i64 = parse_group(caps.get(3))?.unwrap_or(0);
        if minutes >= 60 || seconds >= 60 {
            return None;
        }
        return hours
            .checked_mul(SECONDS_PER_HOUR)?
            .checked_add(minutes * SECONDS_PER_MINUTE + seconds);
    }

    let parts = patterns.find_iter("duration_part", text);
    if parts.is_empty() {
        return None;
    }

    let mut total = 0.0;
    let mut leftover = String::new();
    let mut last = 0;
    for part in &parts {
        leftover.push_str(&text[last..part.start()]);
        last = part.end();

        let caps = patterns.captures("duration_part", &text[part.range()])?;
        let value: f64 = caps.get(1)?.parse().ok()?;
        total += value * unit_seconds(caps.get(2)?)?;
    }
    leftover.push_str(&text[last..]);

    // Only whitespace, commas and "and" may sit between parts
    let clean = leftover
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|word| !word.is_empty())
        .all(|word| word.eq_ignore_ascii_case("and"));
    // Out-of-range totals decline rather than saturate
    let total = total.round();
    if !clean || !total.is_finite() || total.abs() >= i64::MAX as f64 {
        return None;
    }
    Some(total as i64)
}

pub struct TimeCalcDetector;

impl TimeCalcDetector {
    pub const ID: &'static str = "time_calc";
}

impl Detector for TimeCalcDetector {
    fn id(&self) -> &str {
        Self::ID
    }

    fn priority(&self) -> i32 {
        priority::TIME_CALC
    }

    fn detect(&self, text: &str, ctx: &DetectionContext<'_>) -> Result<MatchOutcome, DetectorError> {
        let patterns = ctx.patterns;
        let Some(caps) = patterns.captures("time_calc", text.trim()) else {
            return Ok(MatchOutcome::NoMatch);
        };
        let (Some(time_text), Some(sign), Some(duration_text)) = (caps.get(1), caps.get(2), caps.get(3))
        else {
            return Ok(MatchOutcome::NoMatch);
        };

        let Some(clock) = parse_time_of_day(time_text, patterns) else {
            return Ok(MatchOutcome::NoMatch);
        };
        let Some(delta) = parse_duration(duration_text, patterns).and_then(TimeDelta::try_seconds) else {
            return Ok(MatchOutcome::NoMatch);
        };

        let (result, _days) = if sign == "-" {
            clock.time.overflowing_sub_signed(delta)
        } else {
            clock.time.overflowing_add_signed(delta)
        };
        Ok(MatchOutcome::Text(clock.render(result)))
    }
}
