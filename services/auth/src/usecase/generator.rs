use chrono::{DateTime, Utc};
use rand::RngExt;
use uuid::Uuid;

use passwordless_domain::channel::Identifier;

use crate::config::TokenPolicy;
use crate::domain::repository::TokenRepository;
use crate::domain::types::{PasswordlessToken, PasswordlessUser};
use crate::error::PasswordlessError;

const SHORT_TOKEN_CHARSET: &[u8] = b"0123456789";

const LONG_TOKEN_CHARSET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Draws from the thread-local CSPRNG.
fn random_string(charset: &[u8], len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| charset[rng.random_range(0..charset.len())] as char)
        .collect()
}

/// Creates and persists at most one token per issuance request.
pub struct TokenGenerator<'a> {
    pub policy: &'a TokenPolicy,
}

impl TokenGenerator<'_> {
    /// Build a fresh token without persisting it. Short and long tokens are
    /// drawn independently.
    pub fn generate(
        &self,
        user: &PasswordlessUser,
        identifier: &Identifier,
        now: DateTime<Utc>,
    ) -> PasswordlessToken {
        PasswordlessToken {
            id: Uuid::new_v4(),
            user_id: user.id,
            channel: identifier.channel(),
            identifier: identifier.as_str().to_owned(),
            long_token: random_string(LONG_TOKEN_CHARSET, self.policy.long_token_length),
            short_token: random_string(SHORT_TOKEN_CHARSET, self.policy.short_token_length),
            created_at: now,
            uses: 0,
            max_uses: self.policy.max_token_uses,
        }
    }

    /// Generate and persist a token unless an outstanding one for the same
    /// (user, channel) was created at or after `since`. `None` means blocked.
    pub async fn issue<T: TokenRepository>(
        &self,
        tokens: &T,
        user: &PasswordlessUser,
        identifier: &Identifier,
        now: DateTime<Utc>,
        since: DateTime<Utc>,
    ) -> Result<Option<PasswordlessToken>, PasswordlessError> {
        let token = self.generate(user, identifier, now);
        let created = tokens.create_unless_outstanding(&token, since).await?;
        Ok(created.then_some(token))
    }
}
