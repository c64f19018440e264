use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use common::push::{MulticastResponse, PushPayload};

use crate::error::DeliveryError;
use crate::transport::PushGateway;

use super::classifier::classify;

/// Token persistence supplied by the domain layer. The pipeline only needs
/// bulk removal of tokens the provider declared dead.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn delete_all(&self, tokens: &[String]) -> Result<(), DeliveryError>;
}

/// Push channel entry point for the domain services.
pub struct PushService {
    gateway: Arc<dyn PushGateway>,
    tokens: Arc<dyn TokenStore>,
    max_batch_size: usize,
}

impl PushService {
    pub fn new(
        gateway: Arc<dyn PushGateway>,
        tokens: Arc<dyn TokenStore>,
        max_batch_size: usize,
    ) -> Self {
        assert!(max_batch_size > 0, "max_batch_size must be positive");
        Self {
            gateway,
            tokens,
            max_batch_size,
        }
    }

    /// Send a reminder to every token, batching through the gateway's
    /// multicast API and triaging each batch response.
    pub async fn remind(&self, tokens: &[String], payload: &PushPayload) -> Result<(), DeliveryError> {
        for batch in tokens.chunks(self.max_batch_size) {
            let response = self.gateway.send_multicast(batch, payload).await?;
            self.triage(&response, batch).await?;
        }
        Ok(())
    }

    /// Send a poke to a single recipient.
    pub async fn poke(&self, token: &str, payload: &PushPayload) -> Result<(), DeliveryError> {
        let tokens = [token.to_string()];
        self.remind(&tokens, payload).await
    }

    async fn triage(
        &self,
        response: &MulticastResponse,
        batch: &[String],
    ) -> Result<(), DeliveryError> {
        let classification = classify(response, batch);

        if !classification.retryable.is_empty() {
            debug!(
                count = classification.retryable.len(),
                "Transient push failures left for the next trigger"
            );
        }

        if !classification.deletable.is_empty() {
            info!(
                count = classification.deletable.len(),
                "Removing dead push tokens"
            );
            self.tokens.delete_all(&classification.deletable).await?;
        }

        Ok(())
    }
}
