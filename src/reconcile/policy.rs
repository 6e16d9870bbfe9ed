use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

pub const INCOMPLETE: &str = "Incomplete attendance";
pub const LATE_CHECK_IN: &str = "Late check-in";
pub const LEFT_EARLY: &str = "Left early";
pub const LONG_BREAK: &str = "Late from lunch break";
pub const PRESENT: &str = "Present";

/// Fixed office policy windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyRules {
    pub late_after: NaiveTime,
    pub leave_not_before: NaiveTime,
    pub max_break: Duration,
}

impl Default for PolicyRules {
    fn default() -> Self {
        Self {
            late_after: NaiveTime::from_hms_opt(8, 15, 0).unwrap_or_default(),
            leave_not_before: NaiveTime::from_hms_opt(18, 30, 0).unwrap_or_default(),
            max_break: Duration::minutes(60),
        }
    }
}

/// The local times a day-record carries into evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayTimes {
    pub date: NaiveDate,
    pub check_in: Option<NaiveTime>,
    pub break_out: Option<NaiveTime>,
    pub break_in: Option<NaiveTime>,
    pub check_out: Option<NaiveTime>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyEvaluator {
    rules: PolicyRules,
}

impl PolicyEvaluator {
    /// Remarks for one day, joined with ", " in the order the rules fire.
    pub fn evaluate(&self, day: &DayTimes) -> String {
        self.remarks(day).join(", ")
    }

    pub fn remarks(&self, day: &DayTimes) -> Vec<&'static str> {
        let (Some(check_in), Some(break_out), Some(break_in), Some(check_out)) =
            (day.check_in, day.break_out, day.break_in, day.check_out)
        else {
            return vec![INCOMPLETE];
        };

        let at = |t: NaiveTime| NaiveDateTime::new(day.date, t);
        let mut remarks = Vec::new();

        if at(check_in) > at(self.rules.late_after) {
            remarks.push(LATE_CHECK_IN);
        }

        if at(check_out) < at(self.rules.leave_not_before) {
            remarks.push(LEFT_EARLY);
        }

        if at(break_in) - at(break_out) > self.rules.max_break {
            remarks.push(LONG_BREAK);
        }

        if remarks.is_empty() {
            remarks.push(PRESENT);
        }

        remarks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> Option<NaiveTime> {
        Some(NaiveTime::parse_from_str(s, "%H:%M:%S").unwrap())
    }

    type Time = Option<NaiveTime>;

    fn day(ci: Time, bo: Time, bi: Time, co: Time) -> DayTimes {
        DayTimes {
            date: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap(),
            check_in: ci,
            break_out: bo,
            break_in: bi,
            check_out: co,
        }
    }

    #[test]
    fn late_and_early_example() {
        let e = PolicyEvaluator::default();
        let d = day(t("08:20:00"), t("12:00:00"), t("12:45:00"), t("18:25:00"));
        assert_eq!(e.evaluate(&d), "Late check-in, Left early");
    }

    #[test]
    fn on_time_day_is_present() {
        let e = PolicyEvaluator::default();
        let d = day(t("08:15:00"), t("12:00:00"), t("13:00:00"), t("18:30:00"));
        assert_eq!(e.evaluate(&d), PRESENT);
    }

    #[test]
    fn long_break_is_flagged() {
        let e = PolicyEvaluator::default();
        let d = day(t("08:00:00"), t("11:30:00"), t("12:30:01"), t("19:00:00"));
        assert_eq!(e.evaluate(&d), LONG_BREAK);
    }

    #[test]
    fn all_three_rules_accumulate() {
        let e = PolicyEvaluator::default();
        let d = day(t("09:00:00"), t("11:00:00"), t("13:30:00"), t("17:00:00"));
        assert_eq!(e.evaluate(&d), "Late check-in, Left early, Late from lunch break");
    }

    #[test]
    fn any_missing_field_is_only_incomplete() {
        let e = PolicyEvaluator::default();
        let full = [t("09:30:00"), t("11:00:00"), t("13:50:00"), t("16:00:00")];

        for missing in 0..4 {
            let mut f = full;
            f[missing] = None;
            let d = day(f[0], f[1], f[2], f[3]);
            assert_eq!(e.remarks(&d), vec![INCOMPLETE], "slot {missing} missing");
        }
        assert_eq!(e.evaluate(&day(None, None, None, None)), INCOMPLETE);
    }
}
