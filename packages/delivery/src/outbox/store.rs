use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use tracing::{debug, error, info};

use crate::entity::{outbox_entry, outbox_recipient};
use crate::pipeline::SuccessHandler;

/// Row-level operations on the notification outbox.
pub struct OutboxStore<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> OutboxStore<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Persist one entry plus one recipient row per distinct address.
    pub async fn insert(
        &self,
        subject: &str,
        body: &str,
        recipients: &[String],
    ) -> Result<outbox_entry::Model, DbErr> {
        let now = Utc::now();

        let entry = outbox_entry::ActiveModel {
            subject: Set(subject.to_string()),
            body: Set(body.to_string()),
            created_at: Set(now),
            locked_at: Set(now),
            ..Default::default()
        }
        .insert(self.conn)
        .await?;

        let mut seen = std::collections::HashSet::new();
        for recipient in recipients {
            // (entry, address) is unique; duplicate addresses collapse here.
            if !seen.insert(recipient.as_str()) {
                continue;
            }
            outbox_recipient::ActiveModel {
                outbox_id: Set(entry.id),
                recipient_email: Set(recipient.clone()),
                ..Default::default()
            }
            .insert(self.conn)
            .await?;
        }

        Ok(entry)
    }

    /// Remove a confirmed recipient, and the entry too when it was the last
    /// one. A missing entry or recipient is a no-op: the fast path and the
    /// sweep may both confirm the same delivery.
    pub async fn handle_success(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), DbErr> {
        let entry = outbox_entry::Entity::find()
            .filter(outbox_entry::Column::Subject.eq(subject))
            .filter(outbox_entry::Column::Body.eq(body))
            .order_by_asc(outbox_entry::Column::Id)
            .one(self.conn)
            .await?;

        let Some(entry) = entry else {
            return Ok(());
        };

        outbox_recipient::Entity::delete_many()
            .filter(outbox_recipient::Column::OutboxId.eq(entry.id))
            .filter(outbox_recipient::Column::RecipientEmail.eq(recipient))
            .exec(self.conn)
            .await?;

        let remaining = outbox_recipient::Entity::find()
            .filter(outbox_recipient::Column::OutboxId.eq(entry.id))
            .count(self.conn)
            .await?;

        if remaining == 0 {
            outbox_entry::Entity::delete_by_id(entry.id)
                .exec(self.conn)
                .await?;
            debug!(entry_id = entry.id, "Outbox entry fully delivered");
        }

        Ok(())
    }

    /// Entries whose lease expired before `threshold`, oldest first.
    pub async fn stale_entries(
        &self,
        threshold: DateTime<Utc>,
    ) -> Result<Vec<outbox_entry::Model>, DbErr> {
        outbox_entry::Entity::find()
            .filter(outbox_entry::Column::LockedAt.lt(threshold))
            .order_by_asc(outbox_entry::Column::LockedAt)
            .all(self.conn)
            .await
    }

    /// Remaining pending addresses of one entry.
    pub async fn recipients_of(&self, entry_id: i32) -> Result<Vec<String>, DbErr> {
        let rows = outbox_recipient::Entity::find()
            .filter(outbox_recipient::Column::OutboxId.eq(entry_id))
            .order_by_asc(outbox_recipient::Column::Id)
            .all(self.conn)
            .await?;

        Ok(rows.into_iter().map(|r| r.recipient_email).collect())
    }

    /// Refresh the lease timestamp, claiming the entry for one resend pass.
    pub async fn claim(&self, entry_id: i32, now: DateTime<Utc>) -> Result<(), DbErr> {
        outbox_entry::Entity::update_many()
            .col_expr(
                outbox_entry::Column::LockedAt,
                sea_orm::sea_query::Expr::value(now),
            )
            .filter(outbox_entry::Column::Id.eq(entry_id))
            .exec(self.conn)
            .await?;
        Ok(())
    }

    /// Delete an entry and any recipient rows still attached to it.
    pub async fn delete_entry(&self, entry_id: i32) -> Result<(), DbErr> {
        outbox_recipient::Entity::delete_many()
            .filter(outbox_recipient::Column::OutboxId.eq(entry_id))
            .exec(self.conn)
            .await?;
        outbox_entry::Entity::delete_by_id(entry_id)
            .exec(self.conn)
            .await?;
        Ok(())
    }

    /// Number of entries still awaiting delivery.
    pub async fn pending_count(&self) -> Result<u64, DbErr> {
        outbox_entry::Entity::find().count(self.conn).await
    }
}

/// [`SuccessHandler`] backed by the outbox tables. Confirmation failures are
/// logged and swallowed: a recipient row that survives a confirmation hiccup
/// is re-sent by the sweep, which is the cheaper failure mode.
pub struct OutboxSuccessHandler {
    db: DatabaseConnection,
}

impl OutboxSuccessHandler {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SuccessHandler for OutboxSuccessHandler {
    async fn confirm(&self, recipient: &str, subject: &str, body: &str) {
        let store = OutboxStore::new(&self.db);
        if let Err(e) = store.handle_success(recipient, subject, body).await {
            error!(recipient, error = %e, "Failed to record delivery confirmation");
        } else {
            debug!(recipient, "Delivery confirmed");
        }
    }
}

/// Log the outbox backlog size; called by the sweeper each pass.
pub async fn log_backlog(db: &DatabaseConnection) {
    match OutboxStore::new(db).pending_count().await {
        Ok(0) => {}
        Ok(pending) => info!(pending, "Outbox entries awaiting delivery"),
        Err(e) => error!(error = %e, "Failed to count outbox backlog"),
    }
}
