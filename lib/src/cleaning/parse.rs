//! Stateless field parsers shared by the cleaner and by prediction queries.

use crate::error::{FareError, Result};
use chrono::{NaiveDate, NaiveTime};

const CABIN_QUALIFIERS: [&str; 2] = [" premium economy", " business"];
const DATE_FORMATS: [&str; 4] = ["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d"];
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

/// Title-case a string: the first letter of every alphabetic run is
/// uppercased, the rest lowercased. Non-letters (digits, spaces, `'`) end a run.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for ch in s.chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}

/// Remove cabin qualifiers (`" Premium economy"`, `" Business"`, any case)
/// from an airline name, then title-case it.
///
/// ```
/// use flight_fare::cleaning::clean_airline_name;
/// assert_eq!(clean_airline_name("JET AIRWAYS BUSINESS"), "Jet Airways");
/// assert_eq!(clean_airline_name("Vistara Premium economy"), "Vistara");
/// ```
pub fn clean_airline_name(raw: &str) -> String {
    let mut name = raw.trim().to_string();
    for qualifier in CABIN_QUALIFIERS {
        // ASCII lowercasing keeps byte offsets aligned with `name`
        while let Some(pos) = name.to_ascii_lowercase().find(qualifier) {
            name.replace_range(pos..pos + qualifier.len(), "");
        }
    }
    title_case(name.trim())
}

/// Parse a journey date, day first (`24/03/2019`, `24-03-2019`, `24.03.2019`)
/// or ISO (`2019-03-24`). Anything after the first whitespace is ignored.
pub fn parse_journey_date(raw: &str) -> Result<NaiveDate> {
    let token = raw.split_whitespace().next().unwrap_or("");
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(token, format).ok())
        .ok_or_else(|| {
            FareError::parse("date_of_journey", raw, "expected a day-first date like 24/03/2019")
        })
}

/// Parse `HH:MM` or `HH:MM:SS`; trailing text such as `"01:10 22 Mar"` is dropped.
pub fn parse_time_of_day(column: &str, raw: &str) -> Result<NaiveTime> {
    let token = raw.split_whitespace().next().unwrap_or("");
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(token, format).ok())
        .ok_or_else(|| FareError::parse(column, raw, "expected HH:MM or HH:MM:SS"))
}

/// Parse `"<h>h <m>m"` / `"<h>h"` into total minutes.
///
/// ```
/// use flight_fare::cleaning::parse_duration_minutes;
/// assert_eq!(parse_duration_minutes("2h 50m").unwrap(), 170);
/// assert_eq!(parse_duration_minutes("19h").unwrap(), 1140);
/// assert!(parse_duration_minutes("45m").is_err());
/// ```
pub fn parse_duration_minutes(raw: &str) -> Result<u32> {
    let mut tokens = raw.split_whitespace();
    let hour_token = tokens
        .next()
        .ok_or_else(|| FareError::parse("duration", raw, "empty duration"))?;
    let minute_token = tokens.next();
    if tokens.next().is_some() {
        return Err(FareError::parse("duration", raw, "expected at most two tokens"));
    }

    let hours: u32 = hour_token
        .replace('h', "")
        .parse()
        .map_err(|_| FareError::parse("duration", raw, "hour token is not an integer"))?;
    let minutes: u32 = match minute_token {
        None => 0,
        Some(token) => token
            .replace('m', "")
            .parse()
            .map_err(|_| FareError::parse("duration", raw, "minute token is not an integer"))?,
    };

    hours
        .checked_mul(60)
        .and_then(|h| h.checked_add(minutes))
        .ok_or_else(|| FareError::parse("duration", raw, "duration overflows"))
}

/// Parse `"non-stop"`, `"1 stop"`, `"N stops"` (or a bare integer).
pub fn parse_total_stops(raw: &str) -> Result<u32> {
    let value = raw.trim();
    if value.eq_ignore_ascii_case("non-stop") {
        return Ok(0);
    }
    let count = value
        .strip_suffix(" stops")
        .or_else(|| value.strip_suffix(" stop"))
        .unwrap_or(value);
    count
        .trim()
        .parse()
        .map_err(|_| FareError::parse("total_stops", raw, "expected non-stop or `N stop(s)`"))
}
