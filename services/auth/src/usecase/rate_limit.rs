use chrono::{DateTime, Utc};
use uuid::Uuid;

use passwordless_domain::channel::Channel;

use crate::config::TokenPolicy;
use crate::domain::repository::TokenRepository;
use crate::error::PasswordlessError;

/// Guards issuance: one outstanding token per (user, channel) per cooldown window.
///
/// Holds no state of its own; the most recent persisted token is the reference.
pub struct TokenRequestLimiter<'a, T: TokenRepository> {
    pub tokens: &'a T,
    pub policy: &'a TokenPolicy,
}

impl<T: TokenRepository> TokenRequestLimiter<'_, T> {
    /// Oldest `created_at` that still falls inside the cooldown window.
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.policy.cooldown()
    }

    pub async fn may_issue(
        &self,
        user_id: Uuid,
        channel: Channel,
        now: DateTime<Utc>,
    ) -> Result<bool, PasswordlessError> {
        let since = self.window_start(now);
        let outstanding = self
            .tokens
            .find_latest_active(user_id, channel, since)
            .await?;
        Ok(outstanding.is_none())
    }
}
