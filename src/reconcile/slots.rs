use serde::Deserialize;
use strum_macros::{Display, EnumString};

use super::grouper::{DayGroup, LocalPunch};
use crate::model::attendance::SlotLabel;

/// The four semantic slots of a day, any of which may be empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DaySlots {
    pub check_in: Option<LocalPunch>,
    pub break_out: Option<LocalPunch>,
    pub break_in: Option<LocalPunch>,
    pub check_out: Option<LocalPunch>,
    /// Size of the group the slots were assigned from.
    pub punch_count: usize,
}

impl DaySlots {
    pub fn get(&self, label: SlotLabel) -> Option<&LocalPunch> {
        match label {
            SlotLabel::CheckIn => self.check_in.as_ref(),
            SlotLabel::BreakOut => self.break_out.as_ref(),
            SlotLabel::BreakIn => self.break_in.as_ref(),
            SlotLabel::CheckOut => self.check_out.as_ref(),
        }
    }

    fn set(&mut self, label: SlotLabel, punch: LocalPunch) {
        let slot = match label {
            SlotLabel::CheckIn => &mut self.check_in,
            SlotLabel::BreakOut => &mut self.break_out,
            SlotLabel::BreakIn => &mut self.break_in,
            SlotLabel::CheckOut => &mut self.check_out,
        };
        *slot = Some(punch);
    }

    /// Filled slots in Check-In, Break-Out, Break-In, Check-Out order.
    pub fn assigned(&self) -> Vec<(SlotLabel, &LocalPunch)> {
        [
            SlotLabel::CheckIn,
            SlotLabel::BreakOut,
            SlotLabel::BreakIn,
            SlotLabel::CheckOut,
        ]
        .into_iter()
        .filter_map(|label| self.get(label).map(|p| (label, p)))
        .collect()
    }
}

pub trait SlotStrategy: Send + Sync {
    fn assign(&self, group: &DayGroup) -> DaySlots;
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Display, EnumString, Deserialize)]
pub enum SlotStrategyKind {
    #[strum(serialize = "ordinal")]
    #[serde(rename = "ordinal")]
    Ordinal,
    #[strum(to_string = "time-window", serialize = "time_window")]
    #[serde(rename = "time-window", alias = "time_window")]
    TimeWindow,
}

impl SlotStrategyKind {
    pub fn build(self) -> Box<dyn SlotStrategy> {
        match self {
            SlotStrategyKind::Ordinal => Box::new(OrdinalStrategy),
            SlotStrategyKind::TimeWindow => Box::new(TimeWindowStrategy),
        }
    }
}

/// Labels punches purely by their position in the day.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrdinalStrategy;

impl OrdinalStrategy {
    pub fn labels_for(count: usize) -> &'static [SlotLabel] {
        use SlotLabel::*;
        match count {
            0 => &[],
            1 => &[CheckIn],
            2 => &[CheckIn, CheckOut],
            3 => &[CheckIn, BreakOut, CheckOut],
            _ => &[CheckIn, BreakOut, BreakIn, CheckOut],
        }
    }
}

impl SlotStrategy for OrdinalStrategy {
    fn assign(&self, group: &DayGroup) -> DaySlots {
        let mut slots = DaySlots {
            punch_count: group.len(),
            ..DaySlots::default()
        };

        // zip drops everything past the fourth punch
        for (label, punch) in Self::labels_for(group.len()).iter().zip(&group.punches) {
            slots.set(*label, punch.clone());
        }

        slots
    }
}

/// Classifies punches by local hour-of-day.
///
/// | hour     | role                                              |
/// |----------|---------------------------------------------------|
/// | < 11     | check-in, earliest wins                           |
/// | 11..=13  | break-out earliest, break-in latest               |
/// | 14       | ignored                                           |
/// | >= 15    | check-out, latest wins                            |
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeWindowStrategy;

impl TimeWindowStrategy {
    pub const CHECK_IN_BEFORE_HOUR: u32 = 11;
    pub const BREAK_FIRST_HOUR: u32 = 11;
    pub const BREAK_LAST_HOUR: u32 = 13;
    pub const CHECK_OUT_FROM_HOUR: u32 = 15;
}

fn keep_earliest(slot: &mut Option<LocalPunch>, candidate: &LocalPunch) {
    if slot.as_ref().is_none_or(|cur| candidate.time_of_day() < cur.time_of_day()) {
        *slot = Some(candidate.clone());
    }
}

fn keep_latest(slot: &mut Option<LocalPunch>, candidate: &LocalPunch) {
    if slot.as_ref().is_none_or(|cur| candidate.time_of_day() > cur.time_of_day()) {
        *slot = Some(candidate.clone());
    }
}

impl SlotStrategy for TimeWindowStrategy {
    fn assign(&self, group: &DayGroup) -> DaySlots {
        let mut slots = DaySlots {
            punch_count: group.len(),
            ..DaySlots::default()
        };

        for punch in &group.punches {
            let hour = punch.hour();

            if hour < Self::CHECK_IN_BEFORE_HOUR {
                keep_earliest(&mut slots.check_in, punch);
            }

            if (Self::BREAK_FIRST_HOUR..=Self::BREAK_LAST_HOUR).contains(&hour) {
                keep_earliest(&mut slots.break_out, punch);
                keep_latest(&mut slots.break_in, punch);
            }

            if hour >= Self::CHECK_OUT_FROM_HOUR {
                keep_latest(&mut slots.check_out, punch);
            }
        }

        slots
    }
}
