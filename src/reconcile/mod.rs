//! Turns raw device punches into per-employee daily attendance.
//!
//! Logs are grouped by employee and local day, each group's punches are
//! assigned to slots by the configured [`SlotStrategy`], and the result is
//! rendered either as per-punch rows or as evaluated day records.

pub mod grouper;
pub mod local_day;
pub mod policy;
pub mod slots;

use serde::Deserialize;
use strum_macros::{Display, EnumString};

use crate::model::attendance::{AttendanceReport, AttendanceRow, DayRecord, SlotLabel};
use crate::model::employee::EmployeeDirectory;
use crate::model::punch::DeviceLog;
use grouper::{DateRange, DayGroup, group_punches};
use local_day::LocalDayKeyer;
use policy::{DayTimes, PolicyEvaluator};
use slots::{DaySlots, SlotStrategy, SlotStrategyKind};

pub const MISSING_CHECK_OUT: &str = "Missing Check-Out";
pub const EVENT_DESCRIPTION: &str = "Attendance Log";

#[derive(Debug, Copy, Clone, Eq, PartialEq, Display, EnumString, Deserialize)]
pub enum ReportMode {
    /// One row per slotted punch.
    #[strum(serialize = "rows")]
    #[serde(rename = "rows")]
    Rows,
    /// One policy-evaluated record per employee-day.
    #[strum(serialize = "days")]
    #[serde(rename = "days")]
    Days,
}

impl ReportMode {
    /// Ordinal slots render as rows; only time-window slots carry the
    /// complete day a policy evaluation needs.
    pub fn for_strategy(kind: SlotStrategyKind) -> Self {
        match kind {
            SlotStrategyKind::Ordinal => ReportMode::Rows,
            SlotStrategyKind::TimeWindow => ReportMode::Days,
        }
    }
}

/// Labels stamped on every row.
#[derive(Debug, Clone)]
pub struct RowLabels {
    pub device_name: String,
    pub event_point: String,
}

impl Default for RowLabels {
    fn default() -> Self {
        Self {
            device_name: "ZKTeco Device".to_string(),
            event_point: "Main Door".to_string(),
        }
    }
}

pub struct Reconciler {
    keyer: LocalDayKeyer,
    strategy: Box<dyn SlotStrategy>,
    mode: ReportMode,
    evaluator: PolicyEvaluator,
    labels: RowLabels,
}

impl Reconciler {
    pub fn new(keyer: LocalDayKeyer, kind: SlotStrategyKind) -> Self {
        Self {
            keyer,
            strategy: kind.build(),
            mode: ReportMode::for_strategy(kind),
            evaluator: PolicyEvaluator::default(),
            labels: RowLabels::default(),
        }
    }

    pub fn with_labels(mut self, labels: RowLabels) -> Self {
        self.labels = labels;
        self
    }

    pub fn keyer(&self) -> &LocalDayKeyer {
        &self.keyer
    }

    pub fn mode(&self) -> ReportMode {
        self.mode
    }

    pub fn reconcile(
        &self,
        logs: &[DeviceLog],
        directory: &EmployeeDirectory,
        range: &DateRange,
    ) -> AttendanceReport {
        let groups = group_punches(logs, &self.keyer, range);

        match self.mode {
            ReportMode::Rows => AttendanceReport::Rows(
                groups
                    .values()
                    .flat_map(|g| self.rows_for(g, &self.strategy.assign(g), directory))
                    .collect(),
            ),
            ReportMode::Days => AttendanceReport::Days(
                groups
                    .values()
                    .map(|g| self.day_record_for(g, &self.strategy.assign(g), directory))
                    .collect(),
            ),
        }
    }

    fn rows_for(
        &self,
        group: &DayGroup,
        slots: &DaySlots,
        directory: &EmployeeDirectory,
    ) -> Vec<AttendanceRow> {
        let (first_name, last_name) = directory.names(&group.key.employee_id);

        slots
            .assigned()
            .into_iter()
            .map(|(label, punch)| {
                let remarks = if slots.punch_count == 1 && label == SlotLabel::CheckIn {
                    MISSING_CHECK_OUT
                } else {
                    ""
                };

                AttendanceRow {
                    date: self.keyer.day_key(punch.punch.timestamp),
                    date_time: self.keyer.display_string(punch.punch.timestamp),
                    employee_id: group.key.employee_id.clone(),
                    first_name: first_name.clone(),
                    last_name: last_name.clone(),
                    device_name: self.labels.device_name.clone(),
                    event_point: self.labels.event_point.clone(),
                    verify_type: punch.punch.verify_type.clone(),
                    status: label,
                    event_description: EVENT_DESCRIPTION.to_string(),
                    remarks: remarks.to_string(),
                }
            })
            .collect()
    }

    fn day_record_for(
        &self,
        group: &DayGroup,
        slots: &DaySlots,
        directory: &EmployeeDirectory,
    ) -> DayRecord {
        let time = |label| slots.get(label).map(|p| p.time_of_day());
        let times = DayTimes {
            date: group.key.date,
            check_in: time(SlotLabel::CheckIn),
            break_out: time(SlotLabel::BreakOut),
            break_in: time(SlotLabel::BreakIn),
            check_out: time(SlotLabel::CheckOut),
        };
        let fmt = |t: Option<chrono::NaiveTime>| t.map(|t| t.format("%H:%M:%S").to_string());

        DayRecord {
            date: group.key.date_key(),
            employee_id: group.key.employee_id.clone(),
            username: directory.username(&group.key.employee_id),
            check_in: fmt(times.check_in),
            break_out: fmt(times.break_out),
            break_in: fmt(times.break_in),
            check_out: fmt(times.check_out),
            remarks: self.evaluator.evaluate(&times),
        }
    }
}
