use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use common::config::BreakerConfig;

use crate::transport::MailSender;

use super::{CircuitBreaker, CircuitState};

/// Run the primary transport health probe as a background task.
///
/// Quota errors reset on the provider's schedule, not ours, so the breaker
/// is restored by an active probe instead of a time-based half-open state.
pub async fn run_breaker_health_check(
    breaker: Arc<CircuitBreaker>,
    primary: Arc<dyn MailSender>,
    config: BreakerConfig,
) {
    let check_interval = Duration::from_secs(config.health_check_interval_secs);

    info!(
        interval_secs = config.health_check_interval_secs,
        probe_recipient = %config.probe_recipient,
        "Starting mail transport health check"
    );

    let mut interval = tokio::time::interval(check_interval);

    loop {
        interval.tick().await;
        check_once(&breaker, primary.as_ref(), &config.probe_recipient).await;
    }
}

/// Probe the primary transport if and only if the breaker was force-opened
/// by a quota error. A plain `Open` breaker is operator-held; probing it
/// would only waste probe traffic.
pub async fn check_once(breaker: &CircuitBreaker, primary: &dyn MailSender, probe_recipient: &str) {
    if breaker.state() != CircuitState::ForcedOpen {
        return;
    }

    let probe = primary
        .send(
            &[probe_recipient.to_string()],
            "Mail transport health check",
            "Automated probe verifying the primary transport has recovered.",
        )
        .await;

    match probe {
        Ok(()) => {
            breaker.close();
            info!("Primary mail transport recovered, circuit closed");
        }
        Err(e) => {
            warn!(error = %e, "Primary mail transport still failing, circuit stays open");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    use crate::error::DeliveryError;

    use super::*;

    struct ProbeSender {
        calls: AtomicU32,
        healthy: bool,
    }

    impl ProbeSender {
        fn new(healthy: bool) -> Self {
            Self {
                calls: AtomicU32::new(0),
                healthy,
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MailSender for ProbeSender {
        async fn send(
            &self,
            _recipients: &[String],
            _subject: &str,
            _body: &str,
        ) -> Result<(), DeliveryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.healthy {
                Ok(())
            } else {
                Err(DeliveryError::Transient("connect timed out".into()))
            }
        }
    }

    #[tokio::test]
    async fn successful_probe_closes_forced_open_breaker() {
        let breaker = CircuitBreaker::new();
        breaker.force_open();
        let probe = ProbeSender::new(true);

        check_once(&breaker, &probe, "ops@example.com").await;
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert_eq!(probe.calls(), 1);
    }

    #[tokio::test]
    async fn failed_probe_keeps_breaker_forced_open() {
        let breaker = CircuitBreaker::new();
        breaker.force_open();
        let probe = ProbeSender::new(false);

        check_once(&breaker, &probe, "ops@example.com").await;
        assert_eq!(breaker.state(), CircuitState::ForcedOpen);
        assert_eq!(probe.calls(), 1);
    }

    #[tokio::test]
    async fn plain_open_breaker_is_not_probed() {
        let breaker = CircuitBreaker::new();
        breaker.open();
        let probe = ProbeSender::new(true);

        check_once(&breaker, &probe, "ops@example.com").await;
        assert_eq!(breaker.state(), CircuitState::Open);
        assert_eq!(probe.calls(), 0);
    }

    #[tokio::test]
    async fn closed_breaker_is_not_probed() {
        let breaker = CircuitBreaker::new();
        let probe = ProbeSender::new(true);

        check_once(&breaker, &probe, "ops@example.com").await;
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert_eq!(probe.calls(), 0);
    }
}
