//! Calendar policy shared by every dashboard view.
//!
//! All week and day arithmetic happens in the zone carried by the reference
//! instant. Days are calendar dates in that zone, never fixed 24h spans, so
//! 23h and 25h DST days bucket the same as any other day.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime, TimeZone, Utc};

const MS_PER_DAY: i64 = 86_400_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekWindow<Tz: TimeZone> {
    /// Sunday 00:00 local.
    pub start: DateTime<Tz>,
    /// Saturday 23:59:59.999 local.
    pub end: DateTime<Tz>,
    /// The following Sunday 00:00 local.
    pub next_start: DateTime<Tz>,
}

impl<Tz: TimeZone> WeekWindow<Tz> {
    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        *instant >= self.start && *instant < self.next_start
    }

    pub fn days(&self) -> Vec<NaiveDate> {
        let first = self.start.date_naive();
        (0..7).filter_map(|i| first.checked_add_days(Days::new(i))).collect()
    }
}

/// Sunday of the week containing `date`.
pub fn week_start_date(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_sunday() as u64;
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

/// First instant of `date` in `tz`.
pub fn local_midnight<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Tz> {
    let midnight = date.and_time(chrono::NaiveTime::MIN);
    if let Some(instant) = tz.from_local_datetime(&midnight).earliest() {
        return instant;
    }
    // Midnight sits inside a DST gap; walk forward to the first valid minute.
    let mut candidate = midnight;
    for _ in 0..(24 * 60) {
        candidate += chrono::Duration::minutes(1);
        if let Some(instant) = tz.from_local_datetime(&candidate).earliest() {
            return instant;
        }
    }
    tz.from_utc_datetime(&midnight)
}

pub fn week_window<Tz: TimeZone>(now: &DateTime<Tz>) -> WeekWindow<Tz> {
    let tz = now.timezone();
    let sunday = week_start_date(now.date_naive());
    let start = local_midnight(sunday, &tz);
    let next_sunday = sunday.checked_add_days(Days::new(7)).unwrap_or(sunday);
    let next_start = local_midnight(next_sunday, &tz);
    let end = next_start.clone() - chrono::Duration::milliseconds(1);
    WeekWindow {
        start,
        end,
        next_start,
    }
}

/// Calendar date of `instant` as seen in `tz`.
pub fn local_date<Tz: TimeZone>(instant: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

/// Whole days elapsed from `due` to `now`, floored.
pub fn days_overdue<Tz: TimeZone>(due: &DateTime<Utc>, now: &DateTime<Tz>) -> i64 {
    let elapsed = now.with_timezone(&Utc) - *due;
    elapsed.num_milliseconds().div_euclid(MS_PER_DAY)
}

/// Accepts RFC 3339, naive ISO-8601 date-times and bare dates. Naive values
/// are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .map(|d| Utc.from_utc_datetime(&d.and_time(chrono::NaiveTime::MIN)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use chrono_tz::America::New_York;

    #[test]
    fn week_starts_on_sunday() {
        // Wednesday 2026-10-21
        let now = New_York.with_ymd_and_hms(2026, 10, 21, 15, 0, 0).unwrap();
        let window = week_window(&now);
        assert_eq!(window.start.date_naive(), NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
        assert_eq!(window.start.hour(), 0);
        assert_eq!(window.end.date_naive(), NaiveDate::from_ymd_opt(2026, 10, 24).unwrap());
        assert_eq!(window.end.hour(), 23);
        assert_eq!(window.end.nanosecond(), 999_000_000);
    }

    #[test]
    fn sunday_is_its_own_week_start() {
        let now = New_York.with_ymd_and_hms(2026, 10, 18, 0, 0, 0).unwrap();
        assert_eq!(week_window(&now).start, now);
    }

    #[test]
    fn spring_forward_week_is_167_hours() {
        let now = New_York.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap();
        let window = week_window(&now);
        let span = window.next_start.clone() - window.start.clone();
        assert_eq!(span.num_hours(), 167);
        assert_eq!(window.days().len(), 7);
    }

    #[test]
    fn fall_back_week_is_169_hours() {
        let now = New_York.with_ymd_and_hms(2026, 11, 4, 9, 0, 0).unwrap();
        let window = week_window(&now);
        let span = window.next_start.clone() - window.start.clone();
        assert_eq!(span.num_hours(), 169);
    }

    #[test]
    fn midnight_in_dst_gap_moves_forward() {
        // Havana springs forward at midnight.
        let tz = chrono_tz::America::Havana;
        let date = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap();
        let midnight = local_midnight(date, &tz);
        assert_eq!(midnight.date_naive(), date);
        assert_eq!(midnight.hour(), 1);
    }

    #[test]
    fn days_overdue_floors() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        let due = Utc.with_ymd_and_hms(2026, 10, 16, 13, 0, 0).unwrap();
        assert_eq!(days_overdue(&due, &now), 1);
        let due = Utc.with_ymd_and_hms(2026, 10, 18, 11, 0, 0).unwrap();
        assert_eq!(days_overdue(&due, &now), 0);
    }

    #[test]
    fn parses_backend_timestamp_shapes() {
        let expected = Utc.with_ymd_and_hms(2025, 10, 20, 12, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2025-10-20T12:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2025-10-20T08:00:00-04:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-10-20T12:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2025-10-20 12:00:00.000"), Some(expected));
        assert_eq!(
            parse_timestamp("2025-10-20"),
            Some(Utc.with_ymd_and_hms(2025, 10, 20, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("tomorrow"), None);
        assert_eq!(parse_timestamp(""), None);
    }
}
