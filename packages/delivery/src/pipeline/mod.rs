//! The layered mail send pipeline: chunking → retry → breaker/failover →
//! SMTP transport. Each layer implements [`MailSender`] and wraps the next.

pub mod breaker;
pub mod chunk;
pub mod health;
pub mod retry;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error};

use common::config::{BreakerConfig, MailConfig, RetryConfig};

use crate::transport::MailSender;

pub use breaker::{CircuitBreaker, CircuitState, FailoverSender};
pub use chunk::ChunkedSender;
pub use health::run_breaker_health_check;
pub use retry::RetryingSender;

/// Sink for per-recipient delivery confirmations. Implemented by the outbox
/// store; the chunk layer reports every recipient of a successful batch.
#[async_trait]
pub trait SuccessHandler: Send + Sync {
    async fn confirm(&self, recipient: &str, subject: &str, body: &str);
}

/// Entry point for post-commit and sweep-triggered sends. Failures are
/// logged, not surfaced: once a notification is in the outbox, the recovery
/// sweep is the safety net for anything retry and failover could not fix.
pub struct Dispatcher {
    sender: ChunkedSender,
}

impl Dispatcher {
    pub fn new(sender: ChunkedSender) -> Self {
        Self { sender }
    }

    pub async fn dispatch(&self, recipients: &[String], subject: &str, body: &str) {
        match self.sender.send(recipients, subject, body).await {
            Ok(()) => debug!(
                recipients = recipients.len(),
                subject, "Notification delivered"
            ),
            Err(e) => error!(
                recipients = recipients.len(),
                subject,
                error = %e,
                "Notification delivery failed, leaving outbox entry for recovery sweep"
            ),
        }
    }
}

/// Wire the full mail stack from configuration.
pub fn build_mail_pipeline(
    primary: Arc<dyn MailSender>,
    secondary: Arc<dyn MailSender>,
    circuit_breaker: Arc<CircuitBreaker>,
    success: Arc<dyn SuccessHandler>,
    mail: &MailConfig,
    retry: &RetryConfig,
    breaker: &BreakerConfig,
) -> Dispatcher {
    let retried = Arc::new(RetryingSender::new(primary, retry.clone()));
    let failover = Arc::new(FailoverSender::new(
        circuit_breaker,
        retried,
        secondary,
        breaker.quota_signature.clone(),
    ));
    Dispatcher::new(ChunkedSender::new(failover, mail.max_batch_size, success))
}
