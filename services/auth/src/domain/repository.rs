#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use passwordless_domain::channel::{Channel, Identifier};

use crate::domain::types::{OutboundMessage, PasswordlessToken, PasswordlessUser};
use crate::error::PasswordlessError;

/// Port for resolving accounts. Inactive accounts are never returned.
pub trait UserPort: Send + Sync {
    async fn find_by_identifier(
        &self,
        identifier: &Identifier,
    ) -> Result<Option<PasswordlessUser>, PasswordlessError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PasswordlessUser>, PasswordlessError>;
}

/// Repository for issued passwordless tokens.
///
/// `since` is the oldest `created_at` still considered unexpired; callers derive
/// it from their clock so the store never reads the system time.
pub trait TokenRepository: Send + Sync {
    /// Persist `token` unless its (user, channel) already has a token with
    /// `created_at >= since` and uses left. Check and insert are serialised per
    /// user, so concurrent requests cannot both issue. Returns `false` when an
    /// outstanding token blocked the insert.
    async fn create_unless_outstanding(
        &self,
        token: &PasswordlessToken,
        since: DateTime<Utc>,
    ) -> Result<bool, PasswordlessError>;

    /// Most recently created token for (user, channel) with `created_at >= since`
    /// and uses left.
    async fn find_latest_active(
        &self,
        user_id: Uuid,
        channel: Channel,
        since: DateTime<Utc>,
    ) -> Result<Option<PasswordlessToken>, PasswordlessError>;

    /// Token with this exact long token, `created_at >= since` and uses left.
    async fn find_active_by_long_token(
        &self,
        long_token: &str,
        since: DateTime<Utc>,
    ) -> Result<Option<PasswordlessToken>, PasswordlessError>;

    /// Atomically add one use if the token still has `created_at >= since` and
    /// uses left. Returns `false` when nothing was recorded, including when a
    /// concurrent redemption took the last use.
    async fn consume_use(&self, id: Uuid, since: DateTime<Utc>) -> Result<bool, PasswordlessError>;
}

/// Delivery transport for rendered token messages.
pub trait TokenSender: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> Result<(), PasswordlessError>;
}
