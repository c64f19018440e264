use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One logical notification (one subject + one body) awaiting full delivery.
///
/// An entry exists only while it has at least one recipient; the last
/// recipient removal deletes the entry with it.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "outbox_entry")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub subject: String,

    #[sea_orm(column_type = "Text")]
    pub body: String,

    pub created_at: DateTimeUtc,

    /// Soft lease timestamp. Refreshed by whichever sweeper claims the entry
    /// for resend; entries with a recent lease are skipped.
    #[sea_orm(indexed)]
    pub locked_at: DateTimeUtc,

    #[sea_orm(has_many)]
    pub recipients: HasMany<super::outbox_recipient::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
