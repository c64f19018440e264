use std::sync::Arc;

use sea_orm::{DatabaseConnection, DatabaseTransaction, DbErr, TransactionTrait};
use tracing::debug;

use crate::pipeline::Dispatcher;

use super::store::OutboxStore;

/// One queued notification awaiting the post-commit fast path.
struct PendingDispatch {
    recipients: Vec<String>,
    subject: String,
    body: String,
}

/// A business transaction with outbox enqueue support.
///
/// The outbox row must become durable atomically with the business fact that
/// justified it, so `enqueue` is only reachable through this wrapper: there
/// is no way to enqueue without an open transaction. Delivery is attempted
/// only after `commit` returns; `rollback` (or dropping the wrapper)
/// discards both the rows and the queued sends.
pub struct OutboxTransaction {
    txn: DatabaseTransaction,
    dispatcher: Arc<Dispatcher>,
    pending: Vec<PendingDispatch>,
}

impl OutboxTransaction {
    pub async fn begin(
        db: &DatabaseConnection,
        dispatcher: Arc<Dispatcher>,
    ) -> Result<Self, DbErr> {
        Ok(Self {
            txn: db.begin().await?,
            dispatcher,
            pending: Vec::new(),
        })
    }

    /// The underlying transaction, for the caller's own business writes.
    pub fn transaction(&self) -> &DatabaseTransaction {
        &self.txn
    }

    /// Persist an entry plus its recipients in this transaction and queue
    /// the post-commit send. An empty recipient list is a no-op: an entry
    /// only exists together with at least one recipient.
    pub async fn enqueue(
        &mut self,
        recipients: &[String],
        subject: &str,
        body: &str,
    ) -> Result<(), DbErr> {
        if recipients.is_empty() {
            return Ok(());
        }

        OutboxStore::new(&self.txn)
            .insert(subject, body, recipients)
            .await?;

        self.pending.push(PendingDispatch {
            recipients: recipients.to_vec(),
            subject: subject.to_string(),
            body: body.to_string(),
        });

        Ok(())
    }

    /// Commit the business transaction, then kick off the queued sends on
    /// the worker pool. Send failures are not surfaced here: once the
    /// transaction committed, delivery is the pipeline's responsibility.
    pub async fn commit(self) -> Result<(), DbErr> {
        let Self {
            txn,
            dispatcher,
            pending,
        } = self;

        txn.commit().await?;

        for notification in pending {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move {
                dispatcher
                    .dispatch(
                        &notification.recipients,
                        &notification.subject,
                        &notification.body,
                    )
                    .await;
            });
        }

        Ok(())
    }

    /// Roll back; nothing is persisted and nothing is sent.
    pub async fn rollback(self) -> Result<(), DbErr> {
        debug!(
            discarded = self.pending.len(),
            "Outbox transaction rolled back"
        );
        self.txn.rollback().await
    }
}
