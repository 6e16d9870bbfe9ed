use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
    ToSchema,
)]
pub enum SlotLabel {
    #[strum(serialize = "Check-In")]
    #[serde(rename = "Check-In")]
    CheckIn,
    #[strum(serialize = "Break-Out")]
    #[serde(rename = "Break-Out")]
    BreakOut,
    #[strum(serialize = "Break-In")]
    #[serde(rename = "Break-In")]
    BreakIn,
    #[strum(serialize = "Check-Out")]
    #[serde(rename = "Check-Out")]
    CheckOut,
}

/// One row per recognised punch, using the column headers the
/// downstream sheet expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "Date": "2025-08-01",
    "Date and time": "8/1/2025, 8:20:00 AM",
    "Personnel ID": "7",
    "First Name": "Juan",
    "Last Name": "Dela Cruz",
    "Device Name": "ZKTeco Device",
    "Event Point": "Main Door",
    "Verify Type": "Fingerprint/Card",
    "In/Out Status": "Check-In",
    "Event Description": "Attendance Log",
    "Remarks": ""
}))]
pub struct AttendanceRow {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Date and time")]
    pub date_time: String,
    #[serde(rename = "Personnel ID")]
    pub employee_id: String,
    #[serde(rename = "First Name")]
    pub first_name: String,
    #[serde(rename = "Last Name")]
    pub last_name: String,
    #[serde(rename = "Device Name")]
    pub device_name: String,
    #[serde(rename = "Event Point")]
    pub event_point: String,
    #[serde(rename = "Verify Type")]
    pub verify_type: String,
    #[serde(rename = "In/Out Status")]
    pub status: SlotLabel,
    #[serde(rename = "Event Description")]
    pub event_description: String,
    #[serde(rename = "Remarks")]
    pub remarks: String,
}

/// Per-employee summary of one local day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "date": "2025-08-01",
    "employeeId": "7",
    "username": "Juan Dela Cruz",
    "checkIn": "08:20:00",
    "breakOut": "12:00:00",
    "breakIn": "12:45:00",
    "checkOut": "18:25:00",
    "remarks": "Late check-in, Left early"
}))]
pub struct DayRecord {
    pub date: String,
    pub employee_id: String,
    pub username: String,
    pub check_in: Option<String>,
    pub break_out: Option<String>,
    pub break_in: Option<String>,
    pub check_out: Option<String>,
    pub remarks: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttendanceReport {
    Rows(Vec<AttendanceRow>),
    Days(Vec<DayRecord>),
}

impl AttendanceReport {
    pub fn len(&self) -> usize {
        match self {
            AttendanceReport::Rows(rows) => rows.len(),
            AttendanceReport::Days(days) => days.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn slot_labels_render_with_hyphen() {
        assert_eq!(SlotLabel::BreakOut.to_string(), "Break-Out");
        assert_eq!(SlotLabel::from_str("Check-Out").unwrap(), SlotLabel::CheckOut);
        assert_eq!(serde_json::to_value(SlotLabel::CheckIn).unwrap(), "Check-In");
    }

    #[test]
    fn report_serializes_as_bare_array() {
        let report = AttendanceReport::Days(vec![]);
        assert_eq!(serde_json::to_string(&report).unwrap(), "[]");
        assert_eq!(report.len(), 0);
    }
}
