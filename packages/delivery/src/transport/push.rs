use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use common::config::PushConfig;
use common::push::{MulticastResponse, PushPayload};

use crate::error::DeliveryError;

/// Push gateway abstraction: one multicast call per token batch.
#[async_trait]
pub trait PushGateway: Send + Sync {
    async fn send_multicast(
        &self,
        tokens: &[String],
        payload: &PushPayload,
    ) -> Result<MulticastResponse, DeliveryError>;
}

/// Request payload for a multicast send.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MulticastRequest<'a> {
    tokens: &'a [String],
    notification: &'a PushPayload,
}

/// HTTP client for the push gateway's multicast endpoint.
pub struct HttpPushGateway {
    client: Client,
    endpoint: String,
}

impl HttpPushGateway {
    pub fn new(config: &PushConfig) -> Result<Self, DeliveryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DeliveryError::Gateway(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

#[async_trait]
impl PushGateway for HttpPushGateway {
    async fn send_multicast(
        &self,
        tokens: &[String],
        payload: &PushPayload,
    ) -> Result<MulticastResponse, DeliveryError> {
        let request = MulticastRequest {
            tokens,
            notification: payload,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    DeliveryError::Transient(e.to_string())
                } else {
                    DeliveryError::Gateway(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Gateway(format!(
                "multicast returned {status}: {detail}"
            )));
        }

        let parsed: MulticastResponse = response
            .json()
            .await
            .map_err(|e| DeliveryError::Gateway(e.to_string()))?;

        debug!(
            tokens = tokens.len(),
            failures = parsed.failure_count(),
            "Multicast batch sent"
        );

        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn multicast_request_wire_shape() {
        let tokens = vec!["token-1".to_string(), "token-2".to_string()];
        let payload = PushPayload::new("Reminder", "Starts in an hour");
        let request = MulticastRequest {
            tokens: &tokens,
            notification: &payload,
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "tokens": ["token-1", "token-2"],
                "notification": {"title": "Reminder", "body": "Starts in an hour"},
            })
        );
    }

    #[test]
    fn gateway_builds_from_config() {
        let config = PushConfig {
            endpoint: "https://push.example.com/multicast".into(),
            max_batch_size: 500,
            timeout_secs: 30,
        };
        let gateway = HttpPushGateway::new(&config).unwrap();
        assert_eq!(gateway.endpoint, config.endpoint);
    }
}
