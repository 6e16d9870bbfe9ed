use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{DeviceConnector, DeviceError, DeviceSession};
use crate::model::employee::DeviceUser;
use crate::model::punch::DeviceLog;

/// Talks to a device gateway that exposes the terminal's user table and
/// attendance buffer as JSON.
#[derive(Clone)]
pub struct GatewayConnector {
    base_url: String,
    client: Client,
}

impl GatewayConnector {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, DeviceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DeviceError::Connect(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl DeviceConnector for GatewayConnector {
    async fn connect(&self) -> Result<Box<dyn DeviceSession>, DeviceError> {
        debug!(base_url = %self.base_url, "Connecting to device gateway");
        Ok(Box::new(GatewaySession {
            base_url: self.base_url.clone(),
            client: self.client.clone(),
        }))
    }
}

struct GatewaySession {
    base_url: String,
    client: Client,
}

/// Gateways answer either with a bare array or with `{ "data": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Wrapped { data: Vec<T> },
    Bare(Vec<T>),
}

impl<T> Listing<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Wrapped { data } => data,
            Listing::Bare(items) => items,
        }
    }
}

impl GatewaySession {
    async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, DeviceError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.client.get(&url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DeviceError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(resp.json::<Listing<T>>().await?.into_vec())
    }
}

#[async_trait]
impl DeviceSession for GatewaySession {
    async fn list_users(&mut self) -> Result<Vec<DeviceUser>, DeviceError> {
        self.get_list("/users").await
    }

    async fn list_punches(&mut self) -> Result<Vec<DeviceLog>, DeviceError> {
        self.get_list("/attendances").await
    }

    async fn disconnect(self: Box<Self>) -> Result<(), DeviceError> {
        debug!(base_url = %self.base_url, "Releasing device gateway session");
        Ok(())
    }
}
