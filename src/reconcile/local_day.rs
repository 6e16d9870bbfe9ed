use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

// Upper bound on a DST gap, in minutes.
const MAX_GAP_MINUTES: i64 = 3 * 60;

/// Maps absolute instants onto calendar days of one fixed zone.
/// Never consults the host's local zone.
#[derive(Debug, Clone, Copy)]
pub struct LocalDayKeyer {
    tz: Tz,
}

impl LocalDayKeyer {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    pub fn localize(&self, instant: DateTime<Utc>) -> DateTime<Tz> {
        instant.with_timezone(&self.tz)
    }

    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        self.localize(instant).date_naive()
    }

    /// `YYYY-MM-DD` as observed in the reference zone.
    pub fn day_key(&self, instant: DateTime<Utc>) -> String {
        self.local_date(instant).format("%Y-%m-%d").to_string()
    }

    /// en-PH style display, e.g. `8/1/2025, 8:20:00 AM`.
    pub fn display_string(&self, instant: DateTime<Utc>) -> String {
        self.localize(instant)
            .format("%-m/%-d/%Y, %-I:%M:%S %p")
            .to_string()
    }

    /// First instant of `date` in the reference zone. When midnight falls in
    /// a DST gap this is the first wall-clock minute that exists.
    pub fn start_of_day(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        let midnight = date.and_hms_opt(0, 0, 0)?;
        (0..MAX_GAP_MINUTES)
            .map(|m| midnight + Duration::minutes(m))
            .find_map(|local| self.tz.from_local_datetime(&local).earliest())
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// 23:59:59.999 of `date` in the reference zone, or the last existing
    /// wall-clock minute before it when that time falls in a DST gap.
    pub fn end_of_day(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        let last = date.and_hms_milli_opt(23, 59, 59, 999)?;
        (0..MAX_GAP_MINUTES)
            .map(|m| last - Duration::minutes(m))
            .find_map(|local| self.tz.from_local_datetime(&local).latest())
            .map(|dt| dt.with_timezone(&Utc))
    }
}
