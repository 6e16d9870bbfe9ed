use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

use crate::reconcile::grouper::DateRange;

/// Payroll cut-off windows.
#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Default,
    Display,
    EnumString,
    Serialize,
    Deserialize,
    ToSchema,
)]
pub enum PresetRange {
    /// 26th of the previous month through the 10th of this month.
    #[strum(to_string = "A", serialize = "a")]
    #[serde(alias = "a")]
    A,
    /// 11th through the 25th of this month.
    #[default]
    #[strum(to_string = "B", serialize = "b")]
    #[serde(alias = "b")]
    B,
}

impl PresetRange {
    /// Resolves the preset against `today`, a date in the reference zone.
    pub fn resolve(self, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        let (year, month) = (today.year(), today.month());
        match self {
            PresetRange::A => {
                let (prev_year, prev_month) = if month == 1 {
                    (year - 1, 12)
                } else {
                    (year, month - 1)
                };
                Some((
                    NaiveDate::from_ymd_opt(prev_year, prev_month, 26)?,
                    NaiveDate::from_ymd_opt(year, month, 10)?,
                ))
            }
            PresetRange::B => Some((
                NaiveDate::from_ymd_opt(year, month, 11)?,
                NaiveDate::from_ymd_opt(year, month, 25)?,
            )),
        }
    }

    pub fn date_range(self, today: NaiveDate) -> Option<DateRange> {
        self.resolve(today).map(|(start, end)| DateRange::between(start, end))
    }
}
