use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};

use crate::api::error::ApiError;
use crate::reconcile::grouper::DateRange;
use crate::sync::SyncOrchestrator;
use crate::sync::ranges::PresetRange;

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AttendanceQuery {
    /// First local day, `YYYY-MM-DD`.
    #[schema(example = "2025-08-01")]
    pub start: Option<String>,

    /// Last local day, inclusive.
    #[schema(example = "2025-08-15")]
    pub end: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct SyncQuery {
    /// `A` = 26th..10th, `B` = 11th..25th
    #[schema(example = "B")]
    pub set: Option<PresetRange>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    #[schema(example = "Attendance sync completed")]
    pub message: String,
    #[schema(example = "2025-08-11")]
    pub start_date: String,
    #[schema(example = "2025-08-25")]
    pub end_date: String,
    #[schema(example = 42)]
    pub records: usize,
    #[schema(example = 1)]
    pub attempts: u32,
}

fn parse_day(raw: Option<&str>, name: &str) -> Result<Option<NaiveDate>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ApiError::BadRequest(format!("{name} must be YYYY-MM-DD, got {s:?}"))),
    }
}

fn fmt_day(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

/// Reconciled attendance for an optional local date range
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(AttendanceQuery),
    responses(
        (
            status = 200,
            description = "Per-punch rows (ordinal) or per-day DayRecord objects (time-window)",
            body = [crate::model::attendance::AttendanceRow]
        ),
        (status = 400, description = "Malformed date", body = Object, example = json!({
            "error": "start must be YYYY-MM-DD, got \"08/01/2025\""
        })),
        (status = 503, description = "Device unavailable", body = Object, example = json!({
            "error": "device unavailable: device connect failed: connection refused"
        }))
    ),
    tag = "Attendance"
)]
#[instrument(name = "get_attendance", skip(orchestrator))]
pub async fn get_attendance(
    orchestrator: web::Data<SyncOrchestrator>,
    query: web::Query<AttendanceQuery>,
) -> Result<impl Responder, ApiError> {
    let range = DateRange::new(
        parse_day(query.start.as_deref(), "start")?,
        parse_day(query.end.as_deref(), "end")?,
    );

    let report = orchestrator.report(range).await?;
    Ok(HttpResponse::Ok().json(report))
}

/// Run a preset-range sync to the configured webhook
#[utoipa::path(
    post,
    path = "/api/attendance/sync",
    params(SyncQuery),
    responses(
        (
            status = 200,
            description = "Sync ran; delivery failures are reported in the message",
            body = SyncResponse
        ),
        (status = 409, description = "A sync is already running", body = Object, example = json!({
            "error": "a sync run is already in progress"
        })),
        (status = 503, description = "Device unavailable")
    ),
    tag = "Attendance"
)]
#[instrument(name = "post_sync", skip(orchestrator))]
pub async fn run_sync(
    orchestrator: web::Data<SyncOrchestrator>,
    query: web::Query<SyncQuery>,
) -> Result<impl Responder, ApiError> {
    let preset = query.set.unwrap_or_default();
    let today = orchestrator.today();

    let (range, outcome) = orchestrator.sync_preset(preset, today).await?;

    let message = if outcome.delivered() {
        "Attendance sync completed"
    } else {
        "Attendance sync finished without delivery"
    };
    info!(%preset, delivered = outcome.delivered(), "Preset sync finished");

    Ok(HttpResponse::Ok().json(SyncResponse {
        message: message.to_string(),
        start_date: fmt_day(range.start),
        end_date: fmt_day(range.end),
        records: outcome.records,
        attempts: outcome.delivery.attempts(),
    }))
}

/// Users enrolled on the device
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (
            status = 200,
            description = "Device user table",
            body = [crate::model::employee::DeviceUser]
        ),
        (status = 503, description = "Device unavailable")
    ),
    tag = "Device"
)]
pub async fn list_users(
    orchestrator: web::Data<SyncOrchestrator>,
) -> Result<impl Responder, ApiError> {
    let users = orchestrator.users().await?;
    Ok(HttpResponse::Ok().json(users))
}

#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (
            status = 200,
            description = "Service is up",
            body = Object,
            example = json!({ "status": "ok" })
        )
    ),
    tag = "Health"
)]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}
