pub mod backoff;

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::model::attendance::AttendanceReport;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("webhook request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("webhook responded with status {0}")]
    Status(u16),
}

/// Downstream sink for reconciled attendance.
#[async_trait]
pub trait Delivery: Send + Sync {
    async fn post(&self, url: &str, payload: &AttendanceReport) -> Result<(), DeliveryError>;
}

#[derive(Clone)]
pub struct WebhookClient {
    client: Client,
}

impl WebhookClient {
    pub fn new(timeout: Duration) -> Result<Self, DeliveryError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Delivery for WebhookClient {
    async fn post(&self, url: &str, payload: &AttendanceReport) -> Result<(), DeliveryError> {
        debug!(%url, records = payload.len(), "Posting attendance to webhook");
        let resp = self.client.post(url).json(payload).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DeliveryError::Status(status.as_u16()));
        }
        Ok(())
    }
}
