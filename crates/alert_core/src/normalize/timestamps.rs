use time::format_description::well_known::Rfc3339;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::domain::TimestampInfo;
use crate::raw::TimestampValue;

/// Absolute value used when a record carries no usable timestamp.
pub const UNKNOWN_ABSOLUTE: &str = "1970-01-01T00:00:00Z";
pub const UNKNOWN_RELATIVE: &str = "Unknown";

/// Timezone-less formats, assumed UTC.
const PRIMITIVE_FORMATS: &[&[BorrowedFormatItem<'static>]] = &[
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]"),
];

/// Epoch magnitudes above this are milliseconds, not seconds.
const EPOCH_MILLIS_THRESHOLD: f64 = 1e11;

/// Source of "now" for relative labels.
pub trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}

pub fn canonicalize_rfc3339_utc(dt: OffsetDateTime) -> Option<String> {
    dt.to_offset(UtcOffset::UTC).format(&Rfc3339).ok()
}

/// Parse a producer timestamp.
///
/// RFC3339 first, then a deterministic allowlist of timezone-less formats which are assumed to
/// be UTC. No fuzzy parsing.
pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Some(dt);
    }

    for fmt in PRIMITIVE_FORMATS {
        if let Ok(pdt) = PrimitiveDateTime::parse(trimmed, *fmt) {
            return Some(pdt.assume_utc());
        }
    }

    Date::parse(trimmed, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|d| d.midnight().assume_utc())
}

pub fn from_epoch(value: f64) -> Option<OffsetDateTime> {
    if !value.is_finite() {
        return None;
    }
    let nanos = if value.abs() > EPOCH_MILLIS_THRESHOLD {
        value * 1_000_000.0
    } else {
        value * 1_000_000_000.0
    };
    OffsetDateTime::from_unix_timestamp_nanos(nanos as i128).ok()
}

pub fn resolve_timestamp(value: &TimestampValue) -> Option<OffsetDateTime> {
    match value {
        TimestampValue::Text(s) => parse_timestamp(s),
        TimestampValue::Epoch(n) => from_epoch(*n),
    }
}

/// Coarse label for the distance between `then` and `now`.
///
/// Future instants are reported as "Just now".
pub fn to_relative_at(then: OffsetDateTime, now: OffsetDateTime) -> String {
    let secs = (now - then).whole_seconds();
    if secs < 60 {
        return "Just now".to_string();
    }
    let minutes = secs / 60;
    if minutes < 60 {
        return format!("{minutes} min ago");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours} hr ago");
    }
    let days = hours / 24;
    if days == 1 {
        "1 day ago".to_string()
    } else {
        format!("{days} days ago")
    }
}

/// Relative label for an ISO-8601 string against the current wall clock.
pub fn to_relative(iso_timestamp: &str) -> String {
    match parse_timestamp(iso_timestamp) {
        Some(then) => to_relative_at(then, OffsetDateTime::now_utc()),
        None => UNKNOWN_RELATIVE.to_string(),
    }
}

pub(crate) fn timestamp_info(
    value: Option<&TimestampValue>,
    now: OffsetDateTime,
) -> TimestampInfo {
    let resolved = value
        .and_then(resolve_timestamp)
        .map(|dt| (dt, canonicalize_rfc3339_utc(dt)));
    match resolved {
        Some((dt, Some(absolute))) => TimestampInfo {
            absolute,
            relative: to_relative_at(dt, now),
        },
        _ => {
            if let Some(v) = value {
                tracing::debug!(value = ?v, "unparseable timestamp; using unknown placeholder");
            }
            TimestampInfo {
                absolute: UNKNOWN_ABSOLUTE.to_string(),
                relative: UNKNOWN_RELATIVE.to_string(),
            }
        }
    }
}
