use std::sync::Arc;

use subtle::ConstantTimeEq;

use passwordless_domain::channel::Identifier;

use crate::config::TokenPolicy;
use crate::domain::clock::Clock;
use crate::domain::repository::{TokenRepository, UserPort};
use crate::domain::types::Credentials;
use crate::error::PasswordlessError;
use crate::usecase::session::SessionIssuer;

fn short_token_matches(stored: &str, presented: &str) -> bool {
    stored.as_bytes().ct_eq(presented.as_bytes()).into()
}

// ── Short token (manual entry) ────────────────────────────────────────────────

pub struct ExchangeShortTokenInput {
    pub identifier: Identifier,
    pub token: String,
}

pub struct ExchangeShortTokenUseCase<U, T>
where
    U: UserPort,
    T: TokenRepository,
{
    pub users: U,
    pub tokens: T,
    pub sessions: SessionIssuer,
    pub policy: Arc<TokenPolicy>,
    pub clock: Arc<dyn Clock>,
}

impl<U, T> ExchangeShortTokenUseCase<U, T>
where
    U: UserPort,
    T: TokenRepository,
{
    pub async fn execute(
        &self,
        input: ExchangeShortTokenInput,
    ) -> Result<Credentials, PasswordlessError> {
        let channel = input.identifier.channel();

        // 1. Resolve user; unknown identifiers look like a bad code
        let user = self
            .users
            .find_by_identifier(&input.identifier)
            .await?
            .ok_or(PasswordlessError::InvalidOrExpiredToken)?;

        // 2. Latest unexpired, unexhausted token for (user, channel)
        let now = self.clock.now();
        let since = now - self.policy.lifetime();
        let candidate = self
            .tokens
            .find_latest_active(user.id, channel, since)
            .await?
            .ok_or(PasswordlessError::InvalidOrExpiredToken)?;

        // 3. Wrong code → 400, optionally burning a use
        if !short_token_matches(&candidate.short_token, &input.token) {
            if self.policy.incorrect_short_token_redeems_token {
                self.tokens.consume_use(candidate.id, since).await?;
            }
            tracing::info!(user_id = %user.id, %channel, token_id = %candidate.id, "incorrect short token");
            return Err(PasswordlessError::InvalidOrExpiredToken);
        }

        // 4. Record the use; losing a race for the last use is a failed redemption
        if !self.tokens.consume_use(candidate.id, since).await? {
            return Err(PasswordlessError::InvalidOrExpiredToken);
        }
        tracing::info!(user_id = %user.id, %channel, token_id = %candidate.id, "short token redeemed");

        self.sessions.issue_credentials(&user, now)
    }
}

// ── Long token (magic link) ───────────────────────────────────────────────────

pub struct ExchangeLongTokenInput {
    pub token: String,
}

pub struct ExchangeLongTokenUseCase<U, T>
where
    U: UserPort,
    T: TokenRepository,
{
    pub users: U,
    pub tokens: T,
    pub sessions: SessionIssuer,
    pub policy: Arc<TokenPolicy>,
    pub clock: Arc<dyn Clock>,
}

impl<U, T> ExchangeLongTokenUseCase<U, T>
where
    U: UserPort,
    T: TokenRepository,
{
    pub async fn execute(
        &self,
        input: ExchangeLongTokenInput,
    ) -> Result<Credentials, PasswordlessError> {
        let now = self.clock.now();
        let since = now - self.policy.lifetime();
        let token = self
            .tokens
            .find_active_by_long_token(&input.token, since)
            .await?
            .ok_or(PasswordlessError::InvalidOrExpiredToken)?;

        // Owner may have been deactivated since issuance
        let user = self
            .users
            .find_by_id(token.user_id)
            .await?
            .ok_or(PasswordlessError::InvalidOrExpiredToken)?;

        if !self.tokens.consume_use(token.id, since).await? {
            return Err(PasswordlessError::InvalidOrExpiredToken);
        }
        tracing::info!(user_id = %user.id, channel = %token.channel, token_id = %token.id, "long token redeemed");

        self.sessions.issue_credentials(&user, now)
    }
}
