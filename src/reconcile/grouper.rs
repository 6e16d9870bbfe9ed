use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use super::local_day::LocalDayKeyer;
use crate::model::punch::{DeviceLog, RawPunch};

/// Inclusive local-date range. Either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self::new(Some(start), Some(end))
    }

    /// A bound that cannot be placed on the timeline excludes everything.
    pub fn contains(&self, instant: DateTime<Utc>, keyer: &LocalDayKeyer) -> bool {
        let after_start = match self.start {
            Some(date) => keyer.start_of_day(date).is_some_and(|lower| lower <= instant),
            None => true,
        };
        let before_end = match self.end {
            Some(date) => keyer.end_of_day(date).is_some_and(|upper| instant <= upper),
            None => true,
        };
        after_start && before_end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayGroupKey {
    pub employee_id: String,
    pub date: NaiveDate,
}

impl DayGroupKey {
    pub fn date_key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

/// A punch together with its wall-clock time in the reference zone.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalPunch {
    pub punch: RawPunch,
    pub local: DateTime<Tz>,
}

impl LocalPunch {
    pub fn time_of_day(&self) -> NaiveTime {
        // Sub-second precision is dropped, matching the HH:MM:SS display.
        self.local.time().with_nanosecond(0).unwrap_or_else(|| self.local.time())
    }

    pub fn hour(&self) -> u32 {
        self.local.hour()
    }
}

/// Punches of one employee on one local day, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct DayGroup {
    pub key: DayGroupKey,
    pub punches: Vec<LocalPunch>,
}

impl DayGroup {
    pub fn len(&self) -> usize {
        self.punches.len()
    }
}

/// Groups device logs by (employee, local day).
///
/// Logs whose timestamp cannot be parsed are dropped, as are logs outside
/// `range`. Groups are sorted chronologically with a stable sort, so
/// duplicate timestamps keep their device order.
pub fn group_punches<'a, I>(
    logs: I,
    keyer: &LocalDayKeyer,
    range: &DateRange,
) -> BTreeMap<DayGroupKey, DayGroup>
where
    I: IntoIterator<Item = &'a DeviceLog>,
{
    let mut grouped: BTreeMap<DayGroupKey, DayGroup> = BTreeMap::new();
    let mut dropped = 0usize;

    for log in logs {
        let punch = match RawPunch::from_log(log, keyer.tz()) {
            Ok(p) => p,
            Err(anomaly) => {
                debug!(error = %anomaly, "Dropping punch");
                dropped += 1;
                continue;
            }
        };

        if !range.contains(punch.timestamp, keyer) {
            continue;
        }

        let local = keyer.localize(punch.timestamp);
        let key = DayGroupKey {
            employee_id: punch.employee_id.clone(),
            date: local.date_naive(),
        };

        grouped
            .entry(key.clone())
            .or_insert_with(|| DayGroup {
                key,
                punches: Vec::new(),
            })
            .punches
            .push(LocalPunch { punch, local });
    }

    for group in grouped.values_mut() {
        group.punches.sort_by_key(|p| p.punch.timestamp);
    }

    if dropped > 0 {
        debug!(dropped, "Punches with unparseable timestamps were skipped");
    }

    grouped
}
