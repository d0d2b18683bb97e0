use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use passwordless_auth_schema::{passwordless_tokens, users};
use passwordless_domain::channel::{Channel, Identifier};

use crate::domain::repository::{TokenRepository, UserPort};
use crate::domain::types::{PasswordlessToken, PasswordlessUser};
use crate::error::PasswordlessError;

// ── User lookup ───────────────────────────────────────────────────────────────

/// Account column holding the identifier for each channel.
fn identifier_column(channel: Channel) -> users::Column {
    match channel {
        Channel::Email => users::Column::Email,
        Channel::Mobile => users::Column::PhoneNumber,
    }
}

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserPort for DbUserRepository {
    async fn find_by_identifier(
        &self,
        identifier: &Identifier,
    ) -> Result<Option<PasswordlessUser>, PasswordlessError> {
        let model = users::Entity::find()
            .filter(identifier_column(identifier.channel()).eq(identifier.as_str()))
            .filter(users::Column::IsActive.eq(true))
            .one(&self.db)
            .await
            .context("find user by identifier")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PasswordlessUser>, PasswordlessError> {
        let model = users::Entity::find_by_id(id)
            .filter(users::Column::IsActive.eq(true))
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }
}

fn user_from_model(model: users::Model) -> PasswordlessUser {
    PasswordlessUser {
        id: model.id,
        email: model.email,
        phone_number: model.phone_number,
    }
}

// ── Token repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbTokenRepository {
    pub db: DatabaseConnection,
}

/// `max_uses IS NULL OR uses < max_uses`
fn not_exhausted() -> Condition {
    Condition::any()
        .add(passwordless_tokens::Column::MaxUses.is_null())
        .add(
            Expr::col(passwordless_tokens::Column::Uses)
                .lt(Expr::col(passwordless_tokens::Column::MaxUses)),
        )
}

async fn latest_active_model<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    channel: Channel,
    since: DateTime<Utc>,
) -> Result<Option<passwordless_tokens::Model>, PasswordlessError> {
    let model = passwordless_tokens::Entity::find()
        .filter(passwordless_tokens::Column::UserId.eq(user_id))
        .filter(passwordless_tokens::Column::Channel.eq(channel.as_str()))
        .filter(passwordless_tokens::Column::CreatedAt.gte(since))
        .filter(not_exhausted())
        .order_by_desc(passwordless_tokens::Column::CreatedAt)
        .one(conn)
        .await
        .context("find latest active token")?;
    Ok(model)
}

impl TokenRepository for DbTokenRepository {
    async fn create_unless_outstanding(
        &self,
        token: &PasswordlessToken,
        since: DateTime<Utc>,
    ) -> Result<bool, PasswordlessError> {
        let txn = self.db.begin().await.context("begin token issuance")?;

        // Row lock on the owner serialises issuance per user. SQLite has no row
        // locks and serialises writers on its own.
        users::Entity::find_by_id(token.user_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .context("lock token owner")?;

        if latest_active_model(&txn, token.user_id, token.channel, since)
            .await?
            .is_some()
        {
            txn.rollback().await.context("roll back token issuance")?;
            return Ok(false);
        }

        passwordless_tokens::ActiveModel {
            id: Set(token.id),
            user_id: Set(token.user_id),
            channel: Set(token.channel.as_str().to_owned()),
            identifier: Set(token.identifier.clone()),
            long_token: Set(token.long_token.clone()),
            short_token: Set(token.short_token.clone()),
            created_at: Set(token.created_at),
            uses: Set(token.uses as i32),
            max_uses: Set(token.max_uses.map(|max| max as i32)),
        }
        .insert(&txn)
        .await
        .context("create passwordless token")?;

        txn.commit().await.context("commit token issuance")?;
        Ok(true)
    }

    async fn find_latest_active(
        &self,
        user_id: Uuid,
        channel: Channel,
        since: DateTime<Utc>,
    ) -> Result<Option<PasswordlessToken>, PasswordlessError> {
        latest_active_model(&self.db, user_id, channel, since)
            .await?
            .map(token_from_model)
            .transpose()
    }

    async fn find_active_by_long_token(
        &self,
        long_token: &str,
        since: DateTime<Utc>,
    ) -> Result<Option<PasswordlessToken>, PasswordlessError> {
        let model = passwordless_tokens::Entity::find()
            .filter(passwordless_tokens::Column::LongToken.eq(long_token))
            .filter(passwordless_tokens::Column::CreatedAt.gte(since))
            .filter(not_exhausted())
            .one(&self.db)
            .await
            .context("find active token by long token")?;
        model.map(token_from_model).transpose()
    }

    async fn consume_use(&self, id: Uuid, since: DateTime<Utc>) -> Result<bool, PasswordlessError> {
        // Single UPDATE: the predicates are re-checked by the database, so two
        // redemptions racing for the last use cannot both match.
        let result = passwordless_tokens::Entity::update_many()
            .col_expr(
                passwordless_tokens::Column::Uses,
                Expr::col(passwordless_tokens::Column::Uses).add(1),
            )
            .filter(passwordless_tokens::Column::Id.eq(id))
            .filter(passwordless_tokens::Column::CreatedAt.gte(since))
            .filter(not_exhausted())
            .exec(&self.db)
            .await
            .context("consume token use")?;
        Ok(result.rows_affected == 1)
    }
}

fn token_from_model(model: passwordless_tokens::Model) -> Result<PasswordlessToken, PasswordlessError> {
    let channel = model
        .channel
        .parse::<Channel>()
        .context("stored token channel")?;
    let uses = u32::try_from(model.uses).context("stored token uses")?;
    let max_uses = model
        .max_uses
        .map(u32::try_from)
        .transpose()
        .context("stored token max_uses")?;
    Ok(PasswordlessToken {
        id: model.id,
        user_id: model.user_id,
        channel,
        identifier: model.identifier,
        long_token: model.long_token,
        short_token: model.short_token,
        created_at: model.created_at,
        uses,
        max_uses,
    })
}
