use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

pub const DEFAULT_VERIFY_TYPE: &str = "Fingerprint/Card";

/// Attendance log exactly as the device gateway reports it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeviceLog {
    #[schema(example = "7")]
    pub device_user_id: String,

    #[schema(example = "2025-08-01T00:20:00.000Z")]
    pub record_time: String,

    #[serde(rename = "type", default)]
    #[schema(example = "Fingerprint", nullable = true)]
    pub verify_type: Option<String>,
}

#[derive(Debug, Error, PartialEq)]
#[error("unparseable record time {record_time:?} for user {employee_id}")]
pub struct PunchAnomaly {
    pub employee_id: String,
    pub record_time: String,
}

/// A single biometric scan with its absolute instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPunch {
    pub employee_id: String,
    pub timestamp: DateTime<Utc>,
    pub verify_type: String,
}

impl RawPunch {
    /// Offset-carrying timestamps are taken as-is; naive ones are read as
    /// wall-clock time in `tz`.
    pub fn from_log(log: &DeviceLog, tz: Tz) -> Result<Self, PunchAnomaly> {
        let timestamp = parse_record_time(log.record_time.trim(), tz).ok_or_else(|| PunchAnomaly {
            employee_id: log.device_user_id.clone(),
            record_time: log.record_time.clone(),
        })?;

        let verify_type = log
            .verify_type
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_VERIFY_TYPE)
            .to_string();

        Ok(Self {
            employee_id: log.device_user_id.trim().to_string(),
            timestamp,
            verify_type,
        })
    }
}

fn parse_record_time(raw: &str, tz: Tz) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .and_then(|naive| tz.from_local_datetime(&naive).earliest())
        .map(|local| local.with_timezone(&Utc))
}
