use sea_orm::entity::prelude::*;

/// Passwordless login token issued to a user over one channel.
///
/// Rows are never deleted by the service; expiry is derived from `created_at`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "passwordless_tokens")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    /// `"EMAIL"` or `"MOBILE"`.
    pub channel: String,
    /// Email address or phone number the token was requested for.
    pub identifier: String,
    #[sea_orm(unique)]
    pub long_token: String,
    pub short_token: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub uses: i32,
    /// `None` means unlimited redemptions within the lifetime.
    pub max_uses: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
