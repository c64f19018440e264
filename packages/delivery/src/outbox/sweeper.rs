use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sea_orm::DatabaseConnection;
use tracing::{error, info};

use common::config::SweepConfig;

use crate::pipeline::Dispatcher;

use super::store::{OutboxStore, log_backlog};

/// Run the outbox recovery sweep as a background task.
pub async fn run_recovery_sweeper(
    db: DatabaseConnection,
    dispatcher: Arc<Dispatcher>,
    config: SweepConfig,
) {
    let sweep_interval = Duration::from_secs(config.interval_secs);

    info!(
        interval_secs = config.interval_secs,
        lock_staleness_secs = config.lock_staleness_secs,
        "Starting outbox recovery sweeper"
    );

    let mut interval = tokio::time::interval(sweep_interval);

    loop {
        interval.tick().await;

        log_backlog(&db).await;

        match sweep_once(&db, &dispatcher, &config).await {
            Ok(0) => {}
            Ok(resent) => info!(resent, "Recovery sweep re-dispatched stale notifications"),
            Err(e) => error!(error = %e, "Outbox recovery sweep failed"),
        }
    }
}

/// One sweep pass. Entries with a fresh lease are skipped (claimed by the
/// fast path or a concurrent sweeper); empty entries are deleted; the rest
/// have their lease refreshed and their remaining recipients re-dispatched.
///
/// The lease is a plain timestamp comparison, so two sweepers racing on the
/// same entry can double-send. Success handling is idempotent, which keeps
/// that race harmless rather than impossible.
///
/// Returns the number of entries re-dispatched.
pub async fn sweep_once(
    db: &DatabaseConnection,
    dispatcher: &Dispatcher,
    config: &SweepConfig,
) -> anyhow::Result<u64> {
    let threshold = Utc::now() - chrono::Duration::seconds(config.lock_staleness_secs as i64);

    let store = OutboxStore::new(db);
    let stale = store.stale_entries(threshold).await?;

    let mut resent = 0u64;

    for entry in stale {
        let recipients = store.recipients_of(entry.id).await?;

        if recipients.is_empty() {
            // Should have been removed with its last recipient; a crash
            // between recipient-removal and entry-deletion leaves these.
            store.delete_entry(entry.id).await?;
            info!(entry_id = entry.id, "Deleted empty outbox entry");
            continue;
        }

        store.claim(entry.id, Utc::now()).await?;

        info!(
            entry_id = entry.id,
            recipients = recipients.len(),
            subject = %entry.subject,
            "Re-dispatching stale outbox entry"
        );

        dispatcher
            .dispatch(&recipients, &entry.subject, &entry.body)
            .await;

        resent += 1;
    }

    Ok(resent)
}
