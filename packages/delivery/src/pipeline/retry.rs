use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use common::backoff::calculate_backoff;
use common::config::RetryConfig;

use crate::error::DeliveryError;
use crate::transport::MailSender;

/// Wraps a delegate with bounded retry on transient transport failures.
///
/// Non-transient errors pass through on the first occurrence, and an
/// exhausted retry returns the last underlying error unwrapped so the
/// failover layer can still classify the provider message.
pub struct RetryingSender {
    delegate: Arc<dyn MailSender>,
    config: RetryConfig,
}

impl RetryingSender {
    pub fn new(delegate: Arc<dyn MailSender>, config: RetryConfig) -> Self {
        Self { delegate, config }
    }
}

#[async_trait]
impl MailSender for RetryingSender {
    async fn send(
        &self,
        recipients: &[String],
        subject: &str,
        body: &str,
    ) -> Result<(), DeliveryError> {
        let mut attempt = 1u32;

        loop {
            match self.delegate.send(recipients, subject, body).await {
                Ok(()) => return Ok(()),
                Err(e) if e.is_transient() && attempt < self.config.max_attempts => {
                    let delay = calculate_backoff(
                        attempt,
                        self.config.base_delay_ms,
                        self.config.max_delay_ms,
                    );
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Transient mail failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
