use std::sync::Arc;

use tracing::{Level, info};

use delivery::config::AppConfig;
use delivery::database::init_db;
use delivery::outbox::{OutboxSuccessHandler, run_recovery_sweeper};
use delivery::pipeline::{CircuitBreaker, build_mail_pipeline, run_breaker_health_check};
use delivery::transport::{MailSender, SmtpMailer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load()?;
    let db = init_db(&config.database.url).await?;

    let primary: Arc<SmtpMailer> = Arc::new(SmtpMailer::new(
        &config.mail.primary,
        &config.mail.from,
    )?);
    let secondary: Arc<dyn MailSender> = Arc::new(SmtpMailer::new(
        &config.mail.secondary,
        &config.mail.from,
    )?);

    let breaker = Arc::new(CircuitBreaker::new());
    let success = Arc::new(OutboxSuccessHandler::new(db.clone()));

    let dispatcher = Arc::new(build_mail_pipeline(
        primary.clone(),
        secondary,
        breaker.clone(),
        success,
        &config.mail,
        &config.retry,
        &config.breaker,
    ));

    tokio::spawn(run_breaker_health_check(
        breaker,
        primary,
        config.breaker.clone(),
    ));
    tokio::spawn(run_recovery_sweeper(
        db.clone(),
        dispatcher.clone(),
        config.sweep.clone(),
    ));

    info!("Delivery daemon running");

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");

    Ok(())
}
