use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use passwordless_domain::channel::Channel;

/// Active account resolved from an identifier or a token's owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordlessUser {
    pub id: Uuid,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

/// Passwordless login token bound to one user and one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordlessToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub channel: Channel,
    /// Email address or phone number the token was sent to.
    pub identifier: String,
    /// High-entropy token for link redemption.
    pub long_token: String,
    /// Numeric code for manual entry.
    pub short_token: String,
    pub created_at: DateTime<Utc>,
    /// Never decreases.
    pub uses: u32,
    /// `None` is an unlimited budget.
    pub max_uses: Option<u32>,
}

impl PasswordlessToken {
    /// Use budget spent. Expiry is checked by the store against a `since` bound.
    pub fn is_exhausted(&self) -> bool {
        self.max_uses.is_some_and(|max| self.uses >= max)
    }
}

/// Rendered token message handed to the delivery transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub token_id: Uuid,
    pub channel: Channel,
    pub to: String,
    /// Email only.
    pub subject: Option<String>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// JWT pair returned by a successful exchange.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub access: String,
    pub refresh: String,
}
