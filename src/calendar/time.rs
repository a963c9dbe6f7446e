//! Date and time helpers for the calendar adapter.
//!
//! Dates are `YYYY-MM-DD`, times of day are `HH:MM` (24-hour), and both are
//! interpreted in the adapter's configured timezone. Timestamps exchanged with
//! the provider are RFC 3339.

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;

use super::{CalendarError, CalendarResult};

/// Timezone used when none is configured or the configured name is unknown.
pub const DEFAULT_TIMEZONE: Tz = Tz::UTC;

/// Resolves an IANA timezone name, falling back to [`DEFAULT_TIMEZONE`].
#[must_use]
pub fn resolve_timezone(name: Option<&str>) -> Tz {
    let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else {
        return DEFAULT_TIMEZONE;
    };

    name.parse::<Tz>().unwrap_or_else(|_| {
        tracing::warn!(
            timezone = name,
            fallback = DEFAULT_TIMEZONE.name(),
            "Unknown timezone, using fallback"
        );
        DEFAULT_TIMEZONE
    })
}

/// Parses a `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns [`CalendarError::InvalidDate`] if the input is not a valid date.
pub fn parse_date(value: &str) -> CalendarResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|source| CalendarError::InvalidDate {
        value: value.to_string(),
        source,
    })
}

/// Parses an `HH:MM` time of day.
///
/// # Errors
///
/// Returns [`CalendarError::InvalidTime`] if the input is not a valid time.
pub fn parse_time(value: &str) -> CalendarResult<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|source| CalendarError::InvalidTime {
        value: value.to_string(),
        source,
    })
}

/// Places a local date and time in `tz`.
///
/// Ambiguous times (DST fall-back) resolve to the earlier instant.
///
/// # Errors
///
/// Returns [`CalendarError::NonexistentLocalTime`] for times skipped by a
/// DST transition.
pub fn localize(local: NaiveDateTime, tz: Tz) -> CalendarResult<DateTime<Tz>> {
    tz.from_local_datetime(&local)
        .earliest()
        .ok_or_else(|| CalendarError::NonexistentLocalTime {
            value: local.format("%Y-%m-%d %H:%M").to_string(),
            timezone: tz.name().to_string(),
        })
}

/// Combines a `YYYY-MM-DD` date and an `HH:MM` time into a timestamp in `tz`.
///
/// # Errors
///
/// Returns an error if either part fails to parse or the local time does not
/// exist in `tz`.
pub fn compose(date: &str, time: &str, tz: Tz) -> CalendarResult<DateTime<Tz>> {
    let date = parse_date(date)?;
    let time = parse_time(time)?;
    localize(date.and_time(time), tz)
}

/// Splits an RFC 3339 timestamp into its local date and time of day in `tz`.
///
/// # Errors
///
/// Returns [`CalendarError::InvalidTimestamp`] if the input is not RFC 3339.
pub fn decompose(timestamp: &str, tz: Tz) -> CalendarResult<(NaiveDate, NaiveTime)> {
    let parsed = DateTime::parse_from_rfc3339(timestamp).map_err(|source| {
        CalendarError::InvalidTimestamp {
            value: timestamp.to_string(),
            source,
        }
    })?;
    let local = parsed.with_timezone(&tz).naive_local();
    Ok((local.date(), local.time()))
}

/// Formats a timestamp as RFC 3339 with whole seconds.
#[must_use]
pub fn format_timestamp(timestamp: &DateTime<Tz>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Returns the current time in `tz`.
#[must_use]
pub fn now_in(tz: Tz) -> DateTime<Tz> {
    Utc::now().with_timezone(&tz)
}

/// Returns the window `[now, now + days)`.
///
/// # Errors
///
/// Returns [`CalendarError::OutOfRange`] if the end overflows the calendar.
pub fn days_window(now: DateTime<Tz>, days: u32) -> CalendarResult<(DateTime<Tz>, DateTime<Tz>)> {
    let end = now
        .checked_add_days(Days::new(u64::from(days)))
        .ok_or(CalendarError::OutOfRange)?;
    Ok((now, end))
}

/// Returns the window covering `start_date` through `end_date` inclusive.
///
/// The upper bound is midnight at the start of the day after `end_date`.
///
/// # Errors
///
/// Returns an error if a date fails to parse or midnight does not exist in
/// `tz` on one of the bounding days.
pub fn date_range_window(
    start_date: &str,
    end_date: &str,
    tz: Tz,
) -> CalendarResult<(DateTime<Tz>, DateTime<Tz>)> {
    let start = parse_date(start_date)?;
    let end = parse_date(end_date)?
        .checked_add_days(Days::new(1))
        .ok_or(CalendarError::OutOfRange)?;

    Ok((
        localize(start.and_time(NaiveTime::MIN), tz)?,
        localize(end.and_time(NaiveTime::MIN), tz)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dubai() -> Tz {
        "Asia/Dubai".parse().unwrap()
    }

    #[test]
    fn missing_or_unknown_timezone_falls_back_to_utc() {
        assert_eq!(resolve_timezone(None), Tz::UTC);
        assert_eq!(resolve_timezone(Some("")), Tz::UTC);
        assert_eq!(resolve_timezone(Some("Mars/Olympus_Mons")), Tz::UTC);
    }

    #[test]
    fn known_timezone_resolves() {
        assert_eq!(resolve_timezone(Some("Asia/Dubai")), dubai());
    }

    #[test]
    fn compose_uses_timezone_offset() {
        let ts = compose("2026-02-20", "10:00", dubai()).unwrap();
        assert_eq!(format_timestamp(&ts), "2026-02-20T10:00:00+04:00");
    }

    #[test]
    fn compose_utc_uses_z_suffix() {
        let ts = compose("2026-02-20", "09:30", Tz::UTC).unwrap();
        assert_eq!(format_timestamp(&ts), "2026-02-20T09:30:00Z");
    }

    #[test]
    fn compose_rejects_bad_time() {
        assert!(matches!(
            compose("2026-02-20", "25:00", Tz::UTC),
            Err(CalendarError::InvalidTime { .. })
        ));
        assert!(matches!(
            compose("2026-02-30", "10:00", Tz::UTC),
            Err(CalendarError::InvalidDate { .. })
        ));
    }

    #[test]
    fn compose_rejects_time_in_dst_gap() {
        let new_york: Tz = "America/New_York".parse().unwrap();
        assert!(matches!(
            compose("2026-03-08", "02:30", new_york),
            Err(CalendarError::NonexistentLocalTime { .. })
        ));
    }

    #[test]
    fn compose_ambiguous_time_takes_earlier_instant() {
        let new_york: Tz = "America/New_York".parse().unwrap();
        let ts = compose("2026-11-01", "01:30", new_york).unwrap();
        assert_eq!(format_timestamp(&ts), "2026-11-01T01:30:00-04:00");
    }

    #[test]
    fn decompose_converts_into_timezone() {
        let (date, time) = decompose("2026-02-20T22:30:00Z", dubai()).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 2, 21).unwrap());
        assert_eq!(time, NaiveTime::from_hms_opt(2, 30, 0).unwrap());
    }

    #[test]
    fn decompose_rejects_non_rfc3339() {
        assert!(matches!(
            decompose("2026-02-20 10:00", Tz::UTC),
            Err(CalendarError::InvalidTimestamp { .. })
        ));
    }

    #[test]
    fn days_window_spans_requested_days() {
        let now = compose("2026-02-20", "08:15", dubai()).unwrap();
        let (start, end) = days_window(now, 14).unwrap();
        assert_eq!(start, now);
        assert_eq!(format_timestamp(&end), "2026-03-06T08:15:00+04:00");
    }

    #[test]
    fn date_range_window_includes_whole_end_date() {
        let (start, end) = date_range_window("2026-02-20", "2026-02-22", dubai()).unwrap();
        assert_eq!(format_timestamp(&start), "2026-02-20T00:00:00+04:00");
        assert_eq!(format_timestamp(&end), "2026-02-23T00:00:00+04:00");
    }

    #[test]
    fn date_range_window_rejects_bad_dates() {
        assert!(date_range_window("20-02-2026", "2026-02-22", Tz::UTC).is_err());
        assert!(date_range_window("2026-02-20", "tomorrow", Tz::UTC).is_err());
    }
}
