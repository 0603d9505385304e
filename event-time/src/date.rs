use chrono::{DateTime, Datelike, NaiveDate};

use crate::{Error, Result};

// Tried in order. Month names are matched case-insensitively and in either
// full or abbreviated form.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%m.%d.%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%A, %B %d, %Y",
];

const MAX_DATE_DIGITS: usize = 8;

/// Parses a date typed by a user into a calendar date.
///
/// Accepts ISO (`2026-08-08`), US numeric (`8/8/2026`), month-name
/// (`August 8, 2026`) and RFC 3339 timestamp input. Years must be written
/// with four digits.
pub fn parse_date<S: AsRef<str>>(input: S) -> Result<NaiveDate> {
    let raw = input.as_ref();
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(Error::InvalidDate(raw.to_string()));
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| {
            NaiveDate::parse_from_str(trimmed, format)
                .ok()
                .filter(has_full_year)
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|timestamp| timestamp.date_naive())
        })
        .ok_or_else(|| Error::InvalidDate(raw.to_string()))
}

// Rejects what a two-digit year parses to.
fn has_full_year(date: &NaiveDate) -> bool {
    (1000..=9999).contains(&date.year())
}

/// Normalizes a typed date into the stored `YYYY-MM-DD` form.
pub fn normalize_date<S: AsRef<str>>(input: S) -> Result<String> {
    let date = parse_date(input)?;
    Ok(format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        date.month(),
        date.day()
    ))
}

/// Masks date field input as `MM/DD/YYYY` while it is being typed.
pub fn format_date_input<S: AsRef<str>>(input: S) -> String {
    let digits = input
        .as_ref()
        .chars()
        .filter(char::is_ascii_digit)
        .take(MAX_DATE_DIGITS)
        .collect::<String>();

    match digits.len() {
        0..=2 => digits,
        3..=4 => format!("{}/{}", &digits[..2], &digits[2..]),
        _ => format!("{}/{}/{}", &digits[..2], &digits[2..4], &digits[4..]),
    }
}

pub fn format_display_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}
