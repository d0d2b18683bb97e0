use sea_orm::entity::prelude::*;

/// Outbound token message waiting for an external relay (email or SMS gateway).
/// The relay sets `processed_at` once it has handed the message off.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "outbox_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// `passwordless_email` or `passwordless_sms`.
    pub kind: String,
    /// `{ "to", "subject", "body" }`.
    pub payload: Json,
    #[sea_orm(unique)]
    pub idempotency_key: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub processed_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
