use std::sync::Arc;

use passwordless_domain::channel::{Channel, Identifier};

use crate::config::TokenPolicy;
use crate::domain::clock::Clock;
use crate::domain::repository::{TokenRepository, TokenSender, UserPort};
use crate::domain::types::{OutboundMessage, PasswordlessToken};
use crate::error::PasswordlessError;
use crate::usecase::generator::TokenGenerator;
use crate::usecase::rate_limit::TokenRequestLimiter;

pub const EMAIL_SUBJECT: &str = "Your login code";

/// Render the message carrying the short token (and, for email, the magic link).
pub fn render_message(token: &PasswordlessToken, policy: &TokenPolicy) -> OutboundMessage {
    let minutes = (policy.token_lifetime / 60).max(1);
    let (subject, body) = match token.channel {
        Channel::Email => {
            let mut body = format!(
                "Your login code is {}.\n\nIt expires in {minutes} minutes.",
                token.short_token
            );
            if let Some(url) = &policy.email_login_url {
                body.push_str("\n\nOr sign in with this link: ");
                body.push_str(&url.replace("{token}", &token.long_token));
            }
            (Some(EMAIL_SUBJECT.to_owned()), body)
        }
        Channel::Mobile => (None, format!("Your login code is {}", token.short_token)),
    };
    OutboundMessage {
        token_id: token.id,
        channel: token.channel,
        to: token.identifier.clone(),
        subject,
        body,
        created_at: token.created_at,
    }
}

pub struct RequestTokenInput {
    pub identifier: Identifier,
}

pub struct RequestTokenUseCase<U, T, S>
where
    U: UserPort,
    T: TokenRepository,
    S: TokenSender,
{
    pub users: U,
    pub tokens: T,
    pub sender: S,
    pub policy: Arc<TokenPolicy>,
    pub clock: Arc<dyn Clock>,
}

impl<U, T, S> RequestTokenUseCase<U, T, S>
where
    U: UserPort,
    T: TokenRepository,
    S: TokenSender,
{
    pub async fn execute(&self, input: RequestTokenInput) -> Result<(), PasswordlessError> {
        let channel = input.identifier.channel();

        // 1. Unknown identifiers get the same response as known ones.
        let Some(user) = self.users.find_by_identifier(&input.identifier).await? else {
            tracing::debug!(%channel, "token requested for unknown identifier");
            return Ok(());
        };

        // 2. Cooldown check → 429
        let now = self.clock.now();
        let limiter = TokenRequestLimiter {
            tokens: &self.tokens,
            policy: &self.policy,
        };
        if !limiter.may_issue(user.id, channel, now).await? {
            tracing::info!(user_id = %user.id, %channel, "token request rate limited");
            return Err(PasswordlessError::RateLimited);
        }

        // 3. Generate + persist
        let generator = TokenGenerator {
            policy: &self.policy,
        };
        // The store re-checks the window under a per-user lock, so a concurrent
        // request that passed the check above still cannot issue a second token.
        let Some(token) = generator
            .issue(&self.tokens, &user, &input.identifier, now, limiter.window_start(now))
            .await?
        else {
            tracing::info!(user_id = %user.id, %channel, "concurrent token request rate limited");
            return Err(PasswordlessError::RateLimited);
        };
        tracing::info!(user_id = %user.id, %channel, token_id = %token.id, "passwordless token issued");

        // 4. Fire-and-forget delivery
        let message = render_message(&token, &self.policy);
        if let Err(e) = self.sender.send(&message).await {
            tracing::warn!(error = %e, token_id = %token.id, %channel, "token delivery failed");
        }
        Ok(())
    }
}
