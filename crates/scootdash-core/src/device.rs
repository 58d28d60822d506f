//! Device transport
//!
//! The scooter display module runs a small web server on its access point:
//!
//! - `GET /data` → telemetry JSON
//! - `GET /config` → config JSON
//! - `POST /updateConfig` (form-encoded) → ignored body
//! - `GET /action/{name}/{value}` → ignored body
//!
//! ## Usage
//!
//! ```ignore
//! let mut device = HttpDevice::new("http://192.168.4.1");
//! let snapshot = device.fetch_data().await?;
//! println!("{} km/h", snapshot.speed_kmh()?);
//! ```

use std::future::Future;

use crate::actions::Action;
use crate::config_sync::ConfigSnapshot;
use crate::error::DashError;
use crate::telemetry::TelemetrySnapshot;

/// Default address of the display module's access point
pub const DEFAULT_DEVICE_URL: &str = "http://192.168.4.1";

/// Abstraction over whatever answers the dashboard's requests (HTTP or simulated)
pub trait Device {
    /// `GET /data`
    fn fetch_data(&mut self) -> impl Future<Output = Result<TelemetrySnapshot, DashError>>;

    /// `GET /config`
    fn fetch_config(&mut self) -> impl Future<Output = Result<ConfigSnapshot, DashError>>;

    /// `POST /updateConfig` with the given pairs, in order
    fn update_config(
        &mut self,
        pairs: &[(String, String)],
    ) -> impl Future<Output = Result<(), DashError>>;

    /// `GET /action/{name}/{value}`; the reply is not inspected
    fn send_action(&mut self, action: &Action) -> impl Future<Output = Result<(), DashError>>;
}

/// Device reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpDevice {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDevice {
    /// Device at `base_url`; a trailing slash is ignored
    pub fn new(base_url: &str) -> Self {
        // the device sits on its own access point, never behind a proxy
        let client = reqwest::Client::builder()
            .user_agent(concat!("ScootDash/", env!("CARGO_PKG_VERSION")))
            .no_proxy()
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        HttpDevice {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for a device path
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_text(&self, path: &str) -> Result<String, DashError> {
        let url = self.endpoint(path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| DashError::Request {
                endpoint: path.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(DashError::Status {
                endpoint: path.to_string(),
                status: response.status().as_u16(),
            });
        }

        response.text().await.map_err(|source| DashError::Request {
            endpoint: path.to_string(),
            source,
        })
    }
}

impl Default for HttpDevice {
    fn default() -> Self {
        Self::new(DEFAULT_DEVICE_URL)
    }
}

fn malformed(endpoint: &str, err: serde_json::Error) -> DashError {
    DashError::MalformedBody {
        endpoint: endpoint.to_string(),
        reason: err.to_string(),
    }
}

impl Device for HttpDevice {
    async fn fetch_data(&mut self) -> Result<TelemetrySnapshot, DashError> {
        let body = self.get_text("/data").await?;
        TelemetrySnapshot::from_json(&body).map_err(|e| malformed("/data", e))
    }

    async fn fetch_config(&mut self) -> Result<ConfigSnapshot, DashError> {
        let body = self.get_text("/config").await?;
        ConfigSnapshot::from_json(&body).map_err(|e| malformed("/config", e))
    }

    async fn update_config(&mut self, pairs: &[(String, String)]) -> Result<(), DashError> {
        let path = "/updateConfig";
        let response = self
            .client
            .post(self.endpoint(path))
            .form(pairs)
            .send()
            .await
            .map_err(|source| DashError::Request {
                endpoint: path.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(DashError::Status {
                endpoint: path.to_string(),
                status: response.status().as_u16(),
            });
        }
        Ok(())
    }

    async fn send_action(&mut self, action: &Action) -> Result<(), DashError> {
        let path = action.path();
        let response = self
            .client
            .get(self.endpoint(&path))
            .send()
            .await
            .map_err(|source| DashError::Request {
                endpoint: path.clone(),
                source,
            })?;

        if !response.status().is_success() {
            // the next telemetry poll shows whether the device applied it
            tracing::debug!("Device answered {} with HTTP {}", path, response.status());
        }
        Ok(())
    }
}
