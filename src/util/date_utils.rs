use chrono::NaiveDate;

/// Canonical day-first format used when dates are written back out.
pub const DAY_FIRST_FORMAT: &str = "%d-%m-%Y";

/**
Parse a date cell, trying each chrono format in order.

Surrounding whitespace is ignored. Returns `None` when no format matches,
the caller decides what a missing date means.
 */
pub fn parse_day_first(value: &str, formats: &[String]) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    formats
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

/**
Every calendar day from `start` to `end`, both inclusive.
Returns an empty vector if `end` is before `start`.
 */
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .collect()
}
