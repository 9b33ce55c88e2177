//! Moonraker toolhead position query
//!
//! `GET /printer/objects/query?toolhead=position` answers with
//! `{"result": {"status": {"toolhead": {"position": [x, y, z, e]}}}}`.

use async_trait::async_trait;
use layerwatch_core::constants::{DEFAULT_MOONRAKER_PORT, DEFAULT_STATUS_TIMEOUT_MS};
use layerwatch_core::StatusError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, trace};

use super::HeightSource;

/// Object query for the toolhead position
pub const TOOLHEAD_QUERY_PATH: &str = "/printer/objects/query?toolhead=position";

/// Where the printer's Moonraker instance listens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoonrakerConfig {
    pub host: String,
    pub port: u16,
    pub timeout_ms: u64,
}

impl Default for MoonrakerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_MOONRAKER_PORT,
            timeout_ms: DEFAULT_STATUS_TIMEOUT_MS,
        }
    }
}

impl MoonrakerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Full URL of the toolhead query
    pub fn query_url(&self) -> String {
        format!("http://{}:{}{}", self.host, self.port, TOOLHEAD_QUERY_PATH)
    }
}

/// Extract `result.status.toolhead.position[2]` from a query response
pub fn parse_toolhead_z(body: &Value) -> Result<f64, StatusError> {
    let position = body
        .pointer("/result/status/toolhead/position")
        .ok_or_else(|| StatusError::MalformedResponse {
            reason: "missing result.status.toolhead.position".to_string(),
        })?;
    let z = position
        .as_array()
        .and_then(|axes| axes.get(2))
        .ok_or_else(|| StatusError::MalformedResponse {
            reason: format!("toolhead position has no Z component: {}", position),
        })?;
    z.as_f64()
        .filter(|z| z.is_finite())
        .ok_or_else(|| StatusError::MalformedResponse {
            reason: format!("toolhead Z is not a number: {}", z),
        })
}

/// HTTP client for one Moonraker instance
#[derive(Debug, Clone)]
pub struct MoonrakerClient {
    config: MoonrakerConfig,
    url: String,
    http: reqwest::Client,
}

impl MoonrakerClient {
    pub fn new(config: MoonrakerConfig) -> Result<Self, StatusError> {
        let url = config.query_url();
        // printers sit on the local network; never route through a proxy
        let http = reqwest::Client::builder()
            .no_proxy()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| StatusError::Request {
                url: url.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self { config, url, http })
    }

    pub fn config(&self) -> &MoonrakerConfig {
        &self.config
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl HeightSource for MoonrakerClient {
    async fn query_height(&self) -> Result<f64, StatusError> {
        trace!("Querying {}", self.url);
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| StatusError::Request {
                url: self.url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(StatusError::HttpStatus {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| StatusError::MalformedResponse {
                reason: e.to_string(),
            })?;
        let z = parse_toolhead_z(&body)?;
        debug!("Toolhead Z {:.3} mm", z);
        Ok(z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_url() {
        let config = MoonrakerConfig::new("voron.local", 7125);
        assert_eq!(
            config.query_url(),
            "http://voron.local:7125/printer/objects/query?toolhead=position"
        );
    }

    #[test]
    fn test_parse_position() {
        let body = json!({
            "result": {
                "eventtime": 1234.5,
                "status": {"toolhead": {"position": [120.0, 98.5, 10.02, 1532.1]}}
            }
        });
        assert_eq!(parse_toolhead_z(&body).unwrap(), 10.02);
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        let cases = [
            json!({}),
            json!({"result": {"status": {}}}),
            json!({"result": {"status": {"toolhead": {"position": [1.0, 2.0]}}}}),
            json!({"result": {"status": {"toolhead": {"position": [1.0, 2.0, "z"]}}}}),
            json!({"result": {"status": {"toolhead": {"position": "1,2,3"}}}}),
        ];
        for body in cases {
            assert!(matches!(
                parse_toolhead_z(&body),
                Err(StatusError::MalformedResponse { .. })
            ));
        }
    }

    #[tokio::test]
    async fn test_unreachable_printer_is_none() {
        let config = MoonrakerConfig {
            host: "127.0.0.1".to_string(),
            port: 9,
            timeout_ms: 200,
        };
        let client = MoonrakerClient::new(config).unwrap();
        assert_eq!(client.current_height().await, None);
    }
}
