use sea_orm::entity::prelude::*;

/// Account record read by the passwordless service.
/// Only the identifying fields needed for token issuance and redemption.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: Option<String>,
    /// E.164 formatted.
    #[sea_orm(unique)]
    pub phone_number: Option<String>,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::passwordless_tokens::Entity")]
    PasswordlessTokens,
}

impl Related<super::passwordless_tokens::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PasswordlessTokens.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
