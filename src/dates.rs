use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;

/// Parses a stored timestamp into the configured timezone.
///
/// RFC 3339 strings are taken as absolute instants. Strings without an
/// offset (`2024-03-15T10:00`, `2024-03-15 10:00:00`, `2024-03-15`) are read
/// as wall-clock time in `tz`; a time skipped by a forward DST jump lands
/// an hour later. Anything else yields `None`.
pub fn parse_timestamp(value: &str, tz: Tz) -> Option<DateTime<Tz>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(instant.with_timezone(&tz));
    }

    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;

    tz.from_local_datetime(&naive).earliest().or_else(|| {
        naive
            .checked_add_signed(Duration::hours(1))
            .and_then(|shifted| tz.from_local_datetime(&shifted).earliest())
    })
}

/// Local calendar day of a stored timestamp.
pub fn local_date(value: &str, tz: Tz) -> Option<NaiveDate> {
    parse_timestamp(value, tz).map(|instant| instant.date_naive())
}

/// Normalizes a timestamp to the `2024-03-15T10:00:00.000Z` form goals are stored in.
pub fn normalize_timestamp(value: &str, tz: Tz) -> Option<String> {
    parse_timestamp(value, tz).map(|instant| to_stored(instant.with_timezone(&Utc)))
}

pub fn to_stored(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// A goal has ended once `now` reaches its end date. Missing or unparseable
/// end dates never end.
pub fn has_ended(end_at: Option<&str>, now: DateTime<Utc>, tz: Tz) -> bool {
    end_at
        .and_then(|value| parse_timestamp(value, tz))
        .is_some_and(|end| now >= end.with_timezone(&Utc))
}

pub fn today(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn rfc3339_is_shifted_into_the_configured_zone() {
        let tz: Tz = "America/New_York".parse().unwrap();
        let date = local_date("2024-01-01T03:00:00Z", tz).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());

        let date = local_date("2024-01-01T03:00:00Z", Tz::UTC).unwrap();
        assert_eq!(date.year(), 2024);
    }

    #[test]
    fn naive_values_are_local_wall_clock() {
        let tz: Tz = "Asia/Tokyo".parse().unwrap();
        let parsed = parse_timestamp("2024-03-15T23:30", tz).unwrap();
        assert_eq!(parsed.date_naive(), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(
            normalize_timestamp("2024-03-15T23:30", tz).as_deref(),
            Some("2024-03-15T14:30:00.000Z")
        );
        assert_eq!(
            local_date("2024-02-29", Tz::UTC),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
    }

    #[test]
    fn wall_clock_in_dst_gap_moves_forward() {
        let tz: Tz = "America/New_York".parse().unwrap();
        assert_eq!(
            normalize_timestamp("2024-03-10T02:30", tz).as_deref(),
            Some("2024-03-10T07:30:00.000Z")
        );
        assert_eq!(
            local_date("2024-03-10T02:30", tz),
            NaiveDate::from_ymd_opt(2024, 3, 10)
        );
        // Fall-back overlap keeps the first occurrence.
        assert_eq!(
            normalize_timestamp("2024-11-03T01:30", tz).as_deref(),
            Some("2024-11-03T05:30:00.000Z")
        );
    }

    #[test]
    fn garbage_does_not_parse() {
        assert!(parse_timestamp("", Tz::UTC).is_none());
        assert!(parse_timestamp("not a date", Tz::UTC).is_none());
        assert!(parse_timestamp("2023-02-29", Tz::UTC).is_none());
    }

    #[test]
    fn ended_only_after_end_date() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        assert!(has_ended(Some("2024-06-01T12:00:00Z"), now, Tz::UTC));
        assert!(has_ended(Some("2024-05-01T00:00:00Z"), now, Tz::UTC));
        assert!(!has_ended(Some("2024-06-02T00:00:00Z"), now, Tz::UTC));
        assert!(!has_ended(Some("soon"), now, Tz::UTC));
        assert!(!has_ended(None, now, Tz::UTC));
    }
}
