//! UTCTime and GeneralizedTime content parsing.

use chrono::{DateTime, NaiveDate, Utc};

/// Parse UTCTime "YYMMDDHHMMSSZ".
/// RFC 5280: 00-49 → 2000-2049, 50-99 → 1950-1999.
pub(crate) fn parse_utc_time(s: &str) -> Result<DateTime<Utc>, &'static str> {
    let s = s.strip_suffix('Z').ok_or("missing 'Z' suffix")?;
    if s.len() != 12 || !s.is_ascii() {
        return Err("expected YYMMDDHHMMSSZ");
    }
    let yy = digits(s, 0..2)?;
    let year = if yy < 50 { 2000 + yy } else { 1900 + yy };
    build(year, &s[2..], 0)
}

/// Parse GeneralizedTime "YYYYMMDDHHMMSS[.fff]Z".
pub(crate) fn parse_generalized_time(s: &str) -> Result<DateTime<Utc>, &'static str> {
    let s = s.strip_suffix('Z').ok_or("missing 'Z' suffix")?;
    let (main, nanos) = match s.split_once('.') {
        Some((main, frac)) => (main, fraction_nanos(frac)?),
        None => (s, 0),
    };
    if main.len() != 14 || !main.is_ascii() {
        return Err("expected YYYYMMDDHHMMSS[.f]Z");
    }
    let year = digits(main, 0..4)?;
    build(year, &main[4..], nanos)
}

/// Build the timestamp from "MMDDHHMMSS".
fn build(year: u32, rest: &str, nanos: u32) -> Result<DateTime<Utc>, &'static str> {
    let month = digits(rest, 0..2)?;
    let day = digits(rest, 2..4)?;
    let hour = digits(rest, 4..6)?;
    let min = digits(rest, 6..8)?;
    let sec = digits(rest, 8..10)?;
    let year = i32::try_from(year).map_err(|_| "year out of range")?;
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or("invalid calendar date")?
        .and_hms_nano_opt(hour, min, sec, nanos)
        .ok_or("invalid time of day")
        .map(|dt| dt.and_utc())
}

fn digits(s: &str, range: std::ops::Range<usize>) -> Result<u32, &'static str> {
    let part = s.get(range).ok_or("field out of range")?;
    if !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err("non-digit character");
    }
    part.parse().map_err(|_| "non-digit character")
}

fn fraction_nanos(frac: &str) -> Result<u32, &'static str> {
    if frac.is_empty() || frac.len() > 9 || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err("invalid fractional seconds");
    }
    let value: u32 = frac.parse().map_err(|_| "invalid fractional seconds")?;
    Ok(value * 10u32.pow(9 - frac.len() as u32))
}
