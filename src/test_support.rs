//! In-memory collaborators for unit tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::audit::AuditLog;
use crate::delivery::backoff::Sleeper;
use crate::delivery::{Delivery, DeliveryError};
use crate::device::{DeviceConnector, DeviceError, DeviceSession};
use crate::model::attendance::AttendanceReport;
use crate::model::employee::DeviceUser;
use crate::model::punch::DeviceLog;

#[derive(Default)]
struct DeviceCounters {
    connects: AtomicU32,
    disconnects: AtomicU32,
}

pub struct FakeDevice {
    users: Vec<DeviceUser>,
    logs: Vec<DeviceLog>,
    reachable: bool,
    reads_fail: bool,
    counters: Arc<DeviceCounters>,
}

impl FakeDevice {
    pub fn with_logs(logs: Vec<(&str, &str)>) -> Self {
        Self {
            users: vec![DeviceUser {
                user_id: "7".into(),
                name: "Juan Dela Cruz".into(),
            }],
            logs: logs
                .into_iter()
                .map(|(user, time)| DeviceLog {
                    device_user_id: user.into(),
                    record_time: time.into(),
                    verify_type: None,
                })
                .collect(),
            reachable: true,
            reads_fail: false,
            counters: Arc::default(),
        }
    }

    pub fn failing_reads() -> Self {
        Self {
            reads_fail: true,
            ..Self::with_logs(vec![])
        }
    }

    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            ..Self::with_logs(vec![])
        }
    }

    pub fn connects(&self) -> u32 {
        self.counters.connects.load(Ordering::SeqCst)
    }

    pub fn disconnects(&self) -> u32 {
        self.counters.disconnects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeviceConnector for FakeDevice {
    async fn connect(&self) -> Result<Box<dyn DeviceSession>, DeviceError> {
        if !self.reachable {
            return Err(DeviceError::Connect("connection refused".into()));
        }
        self.counters.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            users: self.users.clone(),
            logs: self.logs.clone(),
            reads_fail: self.reads_fail,
            counters: self.counters.clone(),
        }))
    }
}

struct FakeSession {
    users: Vec<DeviceUser>,
    logs: Vec<DeviceLog>,
    reads_fail: bool,
    counters: Arc<DeviceCounters>,
}

fn read_failure(path: &str) -> DeviceError {
    DeviceError::Status {
        path: path.to_string(),
        status: 503,
    }
}

#[async_trait]
impl DeviceSession for FakeSession {
    async fn list_users(&mut self) -> Result<Vec<DeviceUser>, DeviceError> {
        if self.reads_fail {
            return Err(read_failure("/users"));
        }
        Ok(self.users.clone())
    }

    async fn list_punches(&mut self) -> Result<Vec<DeviceLog>, DeviceError> {
        if self.reads_fail {
            return Err(read_failure("/attendances"));
        }
        Ok(self.logs.clone())
    }

    async fn disconnect(self: Box<Self>) -> Result<(), DeviceError> {
        self.counters.disconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Fails the first `failures` posts, then accepts.
pub struct ScriptedDelivery {
    failures: u32,
    calls: AtomicU32,
    urls: Mutex<Vec<String>>,
    last: Mutex<Option<AttendanceReport>>,
}

impl ScriptedDelivery {
    pub fn failing_times(failures: u32) -> Self {
        Self {
            failures,
            calls: AtomicU32::new(0),
            urls: Mutex::default(),
            last: Mutex::default(),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }

    pub fn last_payload(&self) -> Option<AttendanceReport> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl Delivery for ScriptedDelivery {
    async fn post(&self, url: &str, payload: &AttendanceReport) -> Result<(), DeliveryError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.urls.lock().unwrap().push(url.to_string());

        if call <= self.failures {
            return Err(DeliveryError::Status(503));
        }
        *self.last.lock().unwrap() = Some(payload.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

#[derive(Default)]
pub struct MemoryAudit {
    lines: Mutex<Vec<String>>,
}

impl MemoryAudit {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl AuditLog for MemoryAudit {
    fn append(&self, message: &str) {
        self.lines.lock().unwrap().push(message.to_string());
    }
}
