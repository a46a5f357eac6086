//! Error generator client
//!
//! Fire-and-report: a failed trigger is logged and reported as `false`,
//! never retried.

use gbeat_common::config::join_url;
use gbeat_common::{TriggerAck, TriggerPayload};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_ERROR_GENERATOR_URL: &str = "http://localhost:9090";
pub const TRIGGER_TIMEOUT: Duration = Duration::from_secs(2);
pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(2);

/// Probe `{base_url}/health`; any 2xx answer within the timeout is healthy.
pub async fn service_healthy(http_client: &reqwest::Client, base_url: &str) -> bool {
    let url = join_url(base_url, "health");
    match http_client.get(&url).timeout(HEALTH_TIMEOUT).send().await {
        Ok(response) => {
            debug!(url = %url, status = response.status().as_u16(), "Health probe answered");
            response.status().is_success()
        }
        Err(e) => {
            debug!(url = %url, error = %e, "Health probe failed");
            false
        }
    }
}

/// HTTP client for the error generator's rhythm trigger endpoint
#[derive(Clone)]
pub struct ErrorGeneratorClient {
    http_client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl ErrorGeneratorClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, TRIGGER_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.into(),
            timeout,
        }
    }

    pub async fn check_health(&self) -> bool {
        service_healthy(&self.http_client, &self.base_url).await
    }

    /// POST the payload to `/api/rhythm-trigger`; true when the generator
    /// accepted it.
    pub async fn trigger(&self, payload: &TriggerPayload) -> bool {
        let url = join_url(&self.base_url, "api/rhythm-trigger");

        let response = match self
            .http_client
            .post(&url)
            .json(payload)
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(beat = payload.beat, error = %e, "Failed to trigger error generator");
                return false;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(
                beat = payload.beat,
                status = status.as_u16(),
                "Error generator rejected trigger"
            );
            return false;
        }

        // A missing or odd ack body still counts as delivered
        let ack: TriggerAck = response.json().await.unwrap_or_default();
        info!(
            beat = payload.beat,
            section = %payload.section,
            error_type = %payload.error_type,
            "Beat trigger sent: {}",
            ack.message.as_deref().unwrap_or("no message")
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gbeat_common::ErrorType;

    #[tokio::test]
    async fn test_unreachable_generator_reports_false() {
        let client =
            ErrorGeneratorClient::with_timeout("http://127.0.0.1:9", Duration::from_millis(300));
        let payload = TriggerPayload::new(ErrorType::Basic, 16, "verse", 120.0);

        assert!(!client.trigger(&payload).await);
        assert!(!client.check_health().await);
    }
}
