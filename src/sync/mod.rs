//! End-to-end sync runs: device snapshot, reconciliation, webhook delivery.

pub mod ranges;

use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::audit::AuditLog;
use crate::delivery::Delivery;
use crate::delivery::backoff::{Backoff, BackoffOutcome};
use crate::device::{self, DeviceConnector, DeviceError, DeviceSnapshot};
use crate::model::attendance::AttendanceReport;
use crate::model::employee::{DeviceUser, EmployeeDirectory};
use crate::reconcile::Reconciler;
use crate::reconcile::grouper::DateRange;
use ranges::PresetRange;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("device unavailable: {0}")]
    DeviceUnavailable(#[from] DeviceError),

    #[error("a sync run is already in progress")]
    Busy,

    #[error("preset {0} has no valid dates for {1}")]
    InvalidPreset(PresetRange, NaiveDate),
}

/// Result of one delivery run. Delivery failures end up here, not as errors.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncOutcome {
    pub records: usize,
    pub delivery: BackoffOutcome,
}

impl SyncOutcome {
    pub fn delivered(&self) -> bool {
        self.delivery.succeeded()
    }
}

pub struct SyncOrchestrator {
    device: Arc<dyn DeviceConnector>,
    delivery: Arc<dyn Delivery>,
    audit: Arc<dyn AuditLog>,
    reconciler: Reconciler,
    backoff: Backoff,
    destination: String,
    /// Held while a device session is open; the terminal takes one client.
    device_lock: Mutex<()>,
    /// Held for a whole delivery run; overlapping triggers are refused.
    run_gate: Mutex<()>,
}

impl SyncOrchestrator {
    pub fn new(
        device: Arc<dyn DeviceConnector>,
        delivery: Arc<dyn Delivery>,
        audit: Arc<dyn AuditLog>,
        reconciler: Reconciler,
        backoff: Backoff,
        destination: String,
    ) -> Self {
        Self {
            device,
            delivery,
            audit,
            reconciler,
            backoff,
            destination,
            device_lock: Mutex::new(()),
            run_gate: Mutex::new(()),
        }
    }

    /// Today's date in the reference zone.
    pub fn today(&self) -> NaiveDate {
        self.reconciler.keyer().local_date(Utc::now())
    }

    async fn snapshot(&self) -> Result<DeviceSnapshot, DeviceError> {
        let _session = self.device_lock.lock().await;
        device::fetch_snapshot(self.device.as_ref()).await
    }

    pub async fn users(&self) -> Result<Vec<DeviceUser>, SyncError> {
        let _session = self.device_lock.lock().await;
        device::fetch_users(self.device.as_ref()).await.map_err(|e| {
            error!(error = %e, "Error getting users");
            SyncError::from(e)
        })
    }

    /// Reads the device and reconciles `range` without delivering anything.
    #[instrument(name = "attendance_report", skip(self))]
    pub async fn report(&self, range: DateRange) -> Result<AttendanceReport, SyncError> {
        let snapshot = self.snapshot().await.map_err(|e| {
            error!(error = %e, "Error getting attendance");
            SyncError::from(e)
        })?;

        let directory = EmployeeDirectory::from_users(&snapshot.users);
        let report = self.reconciler.reconcile(&snapshot.logs, &directory, &range);
        info!(
            logs = snapshot.logs.len(),
            records = report.len(),
            mode = %self.reconciler.mode(),
            "Attendance reconciled"
        );
        Ok(report)
    }

    /// Runs a preset range against the configured destination.
    pub async fn sync_preset(
        &self,
        preset: PresetRange,
        today: NaiveDate,
    ) -> Result<(DateRange, SyncOutcome), SyncError> {
        let range = preset
            .date_range(today)
            .ok_or(SyncError::InvalidPreset(preset, today))?;
        let outcome = self.sync(range, &self.destination).await?;
        Ok((range, outcome))
    }

    /// Full run for `range`. Refuses to start while another run is active.
    /// Device failures are returned; delivery failures are logged, audited
    /// and reported in the outcome.
    #[instrument(name = "attendance_sync", skip(self), fields(run_id = %Uuid::new_v4()))]
    pub async fn sync(
        &self,
        range: DateRange,
        destination: &str,
    ) -> Result<SyncOutcome, SyncError> {
        let Ok(_run) = self.run_gate.try_lock() else {
            warn!("Sync requested while another run is in flight");
            return Err(SyncError::Busy);
        };

        let report = match self.report(range).await {
            Ok(report) => report,
            Err(e) => {
                self.audit.append(&format!("❌ Failed to fetch logs: {e}"));
                return Err(e);
            }
        };

        let delivery = self
            .backoff
            .run(
                |_| self.delivery.post(destination, &report),
                |attempt, err| {
                    error!(attempt, error = %err, "Error in delivery attempt");
                    self.audit.append(&format!("❌ Error: {err}"));
                },
            )
            .await;

        match &delivery {
            BackoffOutcome::Succeeded { attempts } => {
                info!(attempts, "Sync successful");
                self.audit.append(&format!("✅ Sync successful after {attempts} attempt(s)"));
            }
            BackoffOutcome::Exhausted { attempts, last_error } => {
                error!(attempts, error = %last_error, "Sync failed, giving up");
                self.audit.append(&format!("❌ Sync failed after {attempts} attempt(s)"));
            }
            BackoffOutcome::Cancelled { attempts } => {
                warn!(attempts, "Sync cancelled before delivery succeeded");
                self.audit.append(&format!("Sync cancelled after {attempts} attempt(s)"));
            }
        }

        Ok(SyncOutcome {
            records: report.len(),
            delivery,
        })
    }
}
