//! Timestamp normalisation for stored result records
//!
//! Records written by this crate carry an explicit `+00:00` offset. Older
//! records may be naive (`2024-03-01T14:05:00`). Naive values are read as the
//! host's *current* local offset, the one in effect when the query runs, and
//! then converted to UTC. That conversion is lossy: it is only right if the
//! host offset has not changed since the record was written (DST switches
//! included). The original offset of those records was never stored, so
//! there is nothing better to recover.

use crate::types::{AppError, Result, TimestampKind};
use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Layouts accepted for timestamps carrying an offset (`%z` takes `+hh:mm` and `+hhmm`)
const AWARE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M%z",
];

/// Layouts accepted for naive timestamps
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Decide whether a timestamp carries its own offset.
///
/// Looks past the date part so the `-` separators of `YYYY-MM-DD` are not
/// mistaken for a negative offset.
pub fn classify(raw: &str) -> TimestampKind {
    let trimmed = raw.trim();
    if trimmed.ends_with('Z') || trimmed.ends_with('z') {
        return TimestampKind::Aware;
    }

    let time_part = match trimmed.find(['T', 't', ' ']) {
        Some(idx) => &trimmed[idx + 1..],
        None => return TimestampKind::Naive,
    };

    if time_part.contains('+') || time_part.contains('-') {
        TimestampKind::Aware
    } else {
        TimestampKind::Naive
    }
}

/// Normalise a stored timestamp to UTC using the host's current local offset
/// for naive values.
pub fn normalize(raw: &str) -> Result<DateTime<Utc>> {
    normalize_with_offset(raw, current_local_offset())
}

/// Normalise a stored timestamp to UTC, reading naive values in `local_offset`
pub fn normalize_with_offset(raw: &str, local_offset: FixedOffset) -> Result<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::parse("empty timestamp"));
    }

    match classify(trimmed) {
        TimestampKind::Aware => parse_aware(trimmed),
        TimestampKind::Naive => {
            let naive = parse_naive(trimmed)?;
            local_offset
                .from_local_datetime(&naive)
                .single()
                .map(|local| local.with_timezone(&Utc))
                .ok_or_else(|| AppError::parse(format!("timestamp '{}' is out of range", raw)))
        }
    }
}

/// The UTC offset the host is using right now
pub fn current_local_offset() -> FixedOffset {
    *Local::now().offset()
}

fn parse_aware(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }

    // `Z` outside of strict RFC 3339 (minutes-only times, space separator)
    let normalised = match raw.strip_suffix(['Z', 'z']) {
        Some(rest) => format!("{}+00:00", rest),
        None => raw.to_string(),
    };

    AWARE_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(&normalised, format).ok())
        .map(|parsed| parsed.with_timezone(&Utc))
        .ok_or_else(|| AppError::parse(format!("unrecognised timestamp '{}'", raw)))
}

fn parse_naive(raw: &str) -> Result<NaiveDateTime> {
    if let Some(parsed) = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
    {
        return Ok(parsed);
    }

    // A bare date means midnight
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")?;
    date.and_hms_opt(0, 0, 0)
        .ok_or_else(|| AppError::parse(format!("timestamp '{}' is out of range", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Timelike};

    fn offset_hours(hours: i32) -> FixedOffset {
        FixedOffset::east_opt(hours * 3600).unwrap()
    }

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("2024-01-01T10:00:00Z"), TimestampKind::Aware);
        assert_eq!(classify("2024-01-01T10:00:00+02:00"), TimestampKind::Aware);
        assert_eq!(classify("2024-01-01T10:00:00-05:00"), TimestampKind::Aware);
        assert_eq!(classify("2024-01-01 10:00:00.5+0100"), TimestampKind::Aware);
        assert_eq!(classify("2024-01-01T10:00:00"), TimestampKind::Naive);
        assert_eq!(classify("2024-01-01 10:00"), TimestampKind::Naive);
        assert_eq!(classify("2024-01-01"), TimestampKind::Naive);
    }

    #[test]
    fn test_aware_timestamps_ignore_local_offset() {
        let expected = utc(2024, 1, 1, 10, 0, 0);
        for raw in [
            "2024-01-01T10:00:00Z",
            "2024-01-01T10:00:00+00:00",
            "2024-01-01T10:00:00.000000+00:00",
            "2024-01-01T12:00:00+02:00",
            "2024-01-01T05:00:00-05:00",
            "2024-01-01 12:00:00+0200",
            "2024-01-01T10:00Z",
        ] {
            assert_eq!(normalize_with_offset(raw, offset_hours(9)).unwrap(), expected, "{}", raw);
        }
    }

    #[test]
    fn test_fractional_seconds_are_kept() {
        let parsed = normalize_with_offset("2026-10-18T09:30:00.123456+00:00", offset_hours(0)).unwrap();
        assert_eq!(parsed.nanosecond(), 123_456_000);
    }

    #[test]
    fn test_naive_timestamps_use_supplied_offset() {
        let parsed = normalize_with_offset("2024-01-01T12:00:00", offset_hours(2)).unwrap();
        assert_eq!(parsed, utc(2024, 1, 1, 10, 0, 0));

        let parsed = normalize_with_offset("2024-01-01 07:30:00.250", offset_hours(-5)).unwrap();
        assert_eq!(parsed, utc(2024, 1, 1, 12, 30, 0) + Duration::milliseconds(250));
    }

    #[test]
    fn test_bare_date_is_local_midnight() {
        let parsed = normalize_with_offset("2024-06-15", offset_hours(1)).unwrap();
        assert_eq!(parsed, utc(2024, 6, 14, 23, 0, 0));
    }

    #[test]
    fn test_naive_local_now_round_trips() {
        let now = Utc::now();
        let local_wall_clock = now.with_timezone(&Local).naive_local();
        let raw = local_wall_clock.format("%Y-%m-%dT%H:%M:%S%.6f").to_string();

        let parsed = normalize(&raw).unwrap();
        assert!((parsed - now).num_seconds().abs() <= 1);
    }

    #[test]
    fn test_garbage_is_rejected() {
        for raw in ["", "   ", "yesterday", "2024-13-01T00:00:00", "2024-01-01T25:00:00Z", "01/02/2024"] {
            let err = normalize_with_offset(raw, offset_hours(0)).unwrap_err();
            assert_eq!(err.category(), "PARSE", "{}", raw);
        }
    }
}
