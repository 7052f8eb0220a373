//! Publication-date string parsing.
//!
//! News pages expose timestamps in several shapes: structured meta tags in
//! ISO form, visible dates in dotted day-month-year, time-first variants,
//! and localized long-month spellings. Parsing tries an ordered list of
//! formats and, by contract, never fails: anything unrecognized falls back
//! to the current instant. That makes such articles look freshly published,
//! which is deliberate (see DESIGN.md).

use chrono::{DateTime, NaiveDateTime, Utc};

/// Formats without an offset, interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d.%m.%Y %H:%M",
    "%H:%M %d.%m.%Y",
];

/// Formats carrying a numeric UTC offset.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%z"];

/// Genitive month names as they appear in localized long-form dates
/// ("15 января 2024, 14:30"). chrono's `%B` only knows English names.
const MONTHS: &[(&str, u32)] = &[
    ("января", 1),
    ("февраля", 2),
    ("марта", 3),
    ("апреля", 4),
    ("мая", 5),
    ("июня", 6),
    ("июля", 7),
    ("августа", 8),
    ("сентября", 9),
    ("октября", 10),
    ("ноября", 11),
    ("декабря", 12),
];

/// Parse a raw date string into a UTC timestamp.
///
/// Normalizes `T` separators to spaces and strips a trailing `Z`, then
/// tries each known format in order. Empty or unparseable input returns
/// `Utc::now()` — never an error.
#[must_use]
pub fn parse_date_string(raw: &str) -> DateTime<Utc> {
    let normalized = raw.replace('T', " ");
    let normalized = normalized.trim_end_matches('Z').trim();

    if !normalized.is_empty() {
        for format in OFFSET_FORMATS {
            if let Ok(parsed) = DateTime::parse_from_str(normalized, format) {
                return parsed.with_timezone(&Utc);
            }
        }
        for format in NAIVE_FORMATS {
            if let Ok(parsed) = NaiveDateTime::parse_from_str(normalized, format) {
                return parsed.and_utc();
            }
        }
        if let Some(parsed) = parse_long_month(normalized) {
            return parsed.and_utc();
        }
    }

    tracing::debug!(raw, "unparseable date string — defaulting to now");
    Utc::now()
}

/// Handle "15 января 2024, 14:30" by substituting the month name with its
/// number and re-parsing numerically.
fn parse_long_month(normalized: &str) -> Option<NaiveDateTime> {
    let lowered = normalized.to_lowercase();
    for (name, number) in MONTHS {
        if lowered.contains(name) {
            let replaced = lowered.replacen(name, &format!("{number:02}"), 1);
            if let Ok(parsed) = NaiveDateTime::parse_from_str(&replaced, "%d %m %Y, %H:%M") {
                return Some(parsed);
            }
        }
    }
    None
}
