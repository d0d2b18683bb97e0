use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PasswordlessTokens::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PasswordlessTokens::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PasswordlessTokens::UserId).uuid().not_null())
                    .col(ColumnDef::new(PasswordlessTokens::Channel).string().not_null())
                    .col(
                        ColumnDef::new(PasswordlessTokens::Identifier)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PasswordlessTokens::LongToken)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(PasswordlessTokens::ShortToken)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PasswordlessTokens::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PasswordlessTokens::Uses)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(PasswordlessTokens::MaxUses).integer())
                    .foreign_key(
                        ForeignKey::create()
                            .from(PasswordlessTokens::Table, PasswordlessTokens::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Serves both the rate-limit probe and candidate lookup on redemption.
        manager
            .create_index(
                Index::create()
                    .table(PasswordlessTokens::Table)
                    .col(PasswordlessTokens::UserId)
                    .col(PasswordlessTokens::Channel)
                    .col(PasswordlessTokens::CreatedAt)
                    .name("idx_passwordless_tokens_user_channel_created_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PasswordlessTokens::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum PasswordlessTokens {
    Table,
    Id,
    UserId,
    Channel,
    Identifier,
    LongToken,
    ShortToken,
    CreatedAt,
    Uses,
    MaxUses,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
