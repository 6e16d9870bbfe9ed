pub mod gateway;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::model::employee::DeviceUser;
use crate::model::punch::DeviceLog;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("device connect failed: {0}")]
    Connect(String),

    #[error("device read failed: {0}")]
    Read(#[from] reqwest::Error),

    #[error("device returned status {status} for {path}")]
    Status { path: String, status: u16 },
}

/// Opens sessions against the biometric device.
#[async_trait]
pub trait DeviceConnector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn DeviceSession>, DeviceError>;
}

#[async_trait]
pub trait DeviceSession: Send {
    async fn list_users(&mut self) -> Result<Vec<DeviceUser>, DeviceError>;
    async fn list_punches(&mut self) -> Result<Vec<DeviceLog>, DeviceError>;
    async fn disconnect(self: Box<Self>) -> Result<(), DeviceError>;
}

/// Everything one run needs from the device.
#[derive(Debug, Clone, Default)]
pub struct DeviceSnapshot {
    pub users: Vec<DeviceUser>,
    pub logs: Vec<DeviceLog>,
}

/// Opens a session, reads users then punches, and disconnects whether or
/// not the reads succeeded.
pub async fn fetch_snapshot(
    connector: &dyn DeviceConnector,
) -> Result<DeviceSnapshot, DeviceError> {
    let mut session = connector.connect().await?;
    debug!("Device session opened");

    let result = read_snapshot(session.as_mut()).await;

    if let Err(e) = session.disconnect().await {
        warn!(error = %e, "Device disconnect failed");
    } else {
        debug!("Device session closed");
    }

    result
}

async fn read_snapshot(session: &mut dyn DeviceSession) -> Result<DeviceSnapshot, DeviceError> {
    let users = session.list_users().await?;
    let logs = session.list_punches().await?;
    debug!(users = users.len(), logs = logs.len(), "Device snapshot read");
    Ok(DeviceSnapshot { users, logs })
}

/// Just the user list; still a full connect/disconnect cycle.
pub async fn fetch_users(connector: &dyn DeviceConnector) -> Result<Vec<DeviceUser>, DeviceError> {
    let mut session = connector.connect().await?;
    let result = session.list_users().await;

    if let Err(e) = session.disconnect().await {
        warn!(error = %e, "Device disconnect failed");
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeDevice;

    #[tokio::test]
    async fn snapshot_disconnects_after_success() {
        let device = FakeDevice::with_logs(vec![("7", "2025-08-01T00:20:00Z")]);
        let snapshot = fetch_snapshot(&device).await.unwrap();

        assert_eq!(snapshot.logs.len(), 1);
        assert_eq!(device.connects(), 1);
        assert_eq!(device.disconnects(), 1);
    }

    #[tokio::test]
    async fn snapshot_disconnects_when_read_fails() {
        let device = FakeDevice::failing_reads();
        let err = fetch_snapshot(&device).await.unwrap_err();

        assert!(matches!(err, DeviceError::Status { status: 503, .. }));
        assert_eq!(device.disconnects(), 1);
    }

    #[tokio::test]
    async fn failed_connect_has_nothing_to_release() {
        let device = FakeDevice::unreachable();
        assert!(fetch_snapshot(&device).await.is_err());
        assert_eq!(device.disconnects(), 0);
    }
}
