// Input/expected pairs for end-to-end pipeline checks
// WHY: All date cases assume the reference date 2026-10-19

/// (input, expected text, detector id)
pub const TRANSFORM_CASES: &[(&str, &str, &str)] = &[
    ("2+3*4", "14", "arithmetic"),
    ("2(3+4)", "14", "arithmetic"),
    ("$24000 - 15%", "$20,400.00", "arithmetic"),
    ("15% of 24000", "3600", "arithmetic"),
    ("24000 + 15%", "27600", "arithmetic"),
    ("Total: 10+5", "Total: 15", "arithmetic"),
    ("10/-(2+3)", "-2", "arithmetic"),
    ("2^-(1+1)", "0.25", "arithmetic"),
    ("2.5-10", "-7.5", "arithmetic"),
    ("12.5/10", "1.25", "arithmetic"),
    ("1.5-22", "-20.5", "arithmetic"),
    ("12/30 - 1/2", "12/30/2026 to 01/02/2027, 4 days", "date_range"),
    (
        "Vacation: Dec 30, 2024 to Jan 2, 2025",
        "Vacation: 12/30/2024 to 01/02/2025, 4 days",
        "date_range",
    ),
    ("5551234567", "(555) 123-4567", "phone"),
    ("PD 25", "$29,870.00", "rating"),
    ("50c30", "65% combined", "combinations"),
    ("5 km to mi", "3.1069 mi", "units"),
    ("Distance [5 km to mi", "Distance [3.1069 mi", "units"),
    ("3:30pm + 2h 15m", "5:45 PM", "time_calc"),
    ("23:30 + 1:45", "01:15", "time_calc"),
];

/// Inputs that only produce a navigation side effect
pub const NAVIGATION_CASES: &[&str] = &[
    "https://example.com/docs",
    "example.com",
    "/usr/local/bin",
    "hello world",
];
