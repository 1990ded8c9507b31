// src/core/telemetry.rs

//! Best-effort progress reporting to the scan-tracking backend.
//!
//! Status updates are telemetry, not correctness: every transport,
//! authentication or HTTP failure is logged and swallowed here so it can
//! never leak into scan control flow.

use std::time::Duration;

use serde_json::json;
use tracing::{debug, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const ADD_STATUS_MUTATION: &str = "
    mutation newScanStatus($scanId: Int!, $key: String!, $value: String!, $updateIfExist: Boolean) {
      addScanStatus(scanId: $scanId, key: $key, value: $value, updateIfExist: $updateIfExist) {
        scanStatus {
          key
        }
      }
    }
";

/// Outcome level of a tracked scan action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum StatusLevel {
    Success,
    Error,
}

/// Builds the backend key for one (action, level) pair.
fn status_key(action: &str, level: StatusLevel) -> String {
    format!("scan__{action}__{level}")
}

/// Pushes per-action status updates for one scan.
pub struct StatusTracker {
    endpoint: String,
    auth_token: String,
    scan_id: i64,
    client: reqwest::Client,
}

impl StatusTracker {
    pub fn new(endpoint: String, auth_token: String, scan_id: i64) -> Self {
        Self { endpoint, auth_token, scan_id, client: reqwest::Client::new() }
    }

    /// Records one status update. Never fails.
    pub async fn add_status(&self, action: &str, level: StatusLevel, message: &str) {
        let key = status_key(action, level);
        let body = json!({
            "query": ADD_STATUS_MUTATION,
            "variables": {
                "scanId": self.scan_id,
                "key": key,
                "value": message,
                "updateIfExist": false,
            },
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Token {}", self.auth_token))
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => {
                debug!(key, "status update delivered");
            }
            Ok(response) => {
                warn!(key, status = %response.status(), "status update rejected, ignoring");
            }
            Err(error) => {
                warn!(key, %error, "status update failed, ignoring");
            }
        }
    }
}
