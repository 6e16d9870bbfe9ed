use crate::api::attendance::{AttendanceQuery, SyncQuery, SyncResponse};
use crate::model::attendance::{AttendanceRow, DayRecord, SlotLabel};
use crate::model::employee::DeviceUser;
use crate::model::punch::DeviceLog;
use crate::sync::ranges::PresetRange;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Sync API",
        version = "0.1.0",
        description = r#"
## Biometric Attendance Sync

Polls the biometric terminal for raw punches, reconciles them into daily
attendance and forwards the result to the payroll webhook.

### 🔹 Endpoints
- **Attendance**
  - Reconciled attendance for a local date range
  - Preset cut-off sync (`A`: 26th–10th, `B`: 11th–25th) with retried delivery
- **Device**
  - User table enrolled on the terminal

### 🕘 Day boundaries
All dates are local calendar days in the configured zone (Asia/Manila by default).

### 📦 Response Format
- `SLOT_STRATEGY=ordinal`: one row per punch labelled Check-In / Break-Out / Break-In / Check-Out
- `SLOT_STRATEGY=time-window`: one record per employee-day with policy remarks

---
Built with **Rust**, **Actix Web**, **Reqwest**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::get_attendance,
        crate::api::attendance::run_sync,
        crate::api::attendance::list_users,
        crate::api::attendance::health
    ),
    components(
        schemas(
            AttendanceQuery,
            SyncQuery,
            SyncResponse,
            AttendanceRow,
            DayRecord,
            SlotLabel,
            PresetRange,
            DeviceUser,
            DeviceLog
        )
    ),
    tags(
        (name = "Attendance", description = "Attendance reconciliation and sync APIs"),
        (name = "Device", description = "Biometric terminal APIs"),
        (name = "Health", description = "Liveness probe"),
    )
)]
pub struct ApiDoc;
