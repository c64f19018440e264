use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::DeliveryError;
use crate::transport::MailSender;

/// Breaker state for the primary mail transport.
///
/// Narrower than a generic failure-rate breaker: `ForcedOpen` is reached
/// only through an explicit transition on a classified quota error, and
/// leaving it requires the health probe to succeed. There is no time-based
/// half-open state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    ForcedOpen,
}

impl CircuitState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Open,
            2 => Self::ForcedOpen,
            _ => Self::Closed,
        }
    }
}

/// Explicit-state circuit breaker guarding the primary transport.
pub struct CircuitBreaker {
    state: AtomicU8,
}

impl CircuitBreaker {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(CircuitState::Closed as u8),
        }
    }

    pub fn state(&self) -> CircuitState {
        CircuitState::from_u8(self.state.load(Ordering::SeqCst))
    }

    pub fn is_call_permitted(&self) -> bool {
        self.state() == CircuitState::Closed
    }

    /// Trip the breaker on a classified provider quota error.
    pub fn force_open(&self) {
        self.state
            .store(CircuitState::ForcedOpen as u8, Ordering::SeqCst);
    }

    /// Open without the forced marker (operator intervention). The health
    /// probe leaves this state alone.
    pub fn open(&self) {
        self.state.store(CircuitState::Open as u8, Ordering::SeqCst);
    }

    pub fn close(&self) {
        self.state
            .store(CircuitState::Closed as u8, Ordering::SeqCst);
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new()
    }
}

/// Routes sends to the retry-wrapped primary while the breaker is closed and
/// falls back to the secondary transport on any primary failure, including
/// breaker-open fast-fail. The secondary gets no retry or breaker of its own.
pub struct FailoverSender {
    breaker: Arc<CircuitBreaker>,
    primary: Arc<dyn MailSender>,
    secondary: Arc<dyn MailSender>,
    quota_signature: String,
}

impl FailoverSender {
    pub fn new(
        breaker: Arc<CircuitBreaker>,
        primary: Arc<dyn MailSender>,
        secondary: Arc<dyn MailSender>,
        quota_signature: String,
    ) -> Self {
        Self {
            breaker,
            primary,
            secondary,
            quota_signature,
        }
    }

    /// A quota error is not self-healing on a short timer, so trip the
    /// breaker and stop sending traffic to the doomed primary.
    fn classify_primary_failure(&self, error: &DeliveryError) {
        if error.to_string().contains(&self.quota_signature) {
            warn!(error = %error, "Primary provider quota exhausted, forcing circuit open");
            self.breaker.force_open();
        }
    }
}

#[async_trait]
impl MailSender for FailoverSender {
    async fn send(
        &self,
        recipients: &[String],
        subject: &str,
        body: &str,
    ) -> Result<(), DeliveryError> {
        if self.breaker.is_call_permitted() {
            match self.primary.send(recipients, subject, body).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    self.classify_primary_failure(&e);
                    warn!(error = %e, "Primary mail transport failed, using secondary");
                }
            }
        } else {
            debug!("Circuit open, skipping primary mail transport");
        }

        self.secondary.send(recipients, subject, body).await
    }
}
