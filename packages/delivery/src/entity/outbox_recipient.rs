use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One pending address within an outbox entry.
///
/// Unique per (entry, address) — the store deduplicates addresses at insert
/// time. Deleted exactly once, on confirmed delivery to that address.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "outbox_recipient")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub outbox_id: i32,

    #[sea_orm(belongs_to, from = "outbox_id", to = "id")]
    pub entry: BelongsTo<super::outbox_entry::Entity>,

    pub recipient_email: String,
}

impl ActiveModelBehavior for ActiveModel {}
