use chrono::Duration;
use serde::Deserialize;

use passwordless_core::config::Config;
use passwordless_domain::channel::Channel;

/// Where rendered token messages are handed off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryBackend {
    /// Insert into `outbox_events` for an external email/SMS relay.
    #[default]
    Outbox,
    /// Write the message to the log (development console backend).
    Log,
}

/// Auth service configuration loaded from environment variables.
#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    /// PostgreSQL connection URL. Env var: `DATABASE_URL`.
    pub database_url: String,
    /// HMAC secret for signing JWT access and refresh tokens. Env var: `JWT_SECRET`.
    pub jwt_secret: String,
    /// TCP port to listen on (default 3112). Env var: `AUTH_PORT`.
    #[serde(default = "default_auth_port")]
    pub auth_port: u16,
    /// Access token lifetime in seconds (default 5 minutes).
    #[serde(default = "default_access_token_lifetime")]
    pub access_token_lifetime: u64,
    /// Refresh token lifetime in seconds (default 1 day).
    #[serde(default = "default_refresh_token_lifetime")]
    pub refresh_token_lifetime: u64,
    /// `outbox` (default) or `log`. Env var: `DELIVERY_BACKEND`.
    #[serde(default)]
    pub delivery_backend: DeliveryBackend,
}

impl Config for ServiceConfig {}

/// Upper bound for every lifetime setting, in seconds (one year).
pub const MAX_LIFETIME_SECS: u64 = 365 * 24 * 60 * 60;

fn bounded_seconds(secs: u64) -> Option<Duration> {
    (secs > 0 && secs <= MAX_LIFETIME_SECS).then(|| Duration::seconds(secs as i64))
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ServiceConfigError {
    #[error("access token lifetime must be between one second and one year, got {0}")]
    AccessTokenLifetime(u64),
    #[error("refresh token lifetime must be between one second and one year, got {0}")]
    RefreshTokenLifetime(u64),
}

impl ServiceConfig {
    pub fn validate(&self) -> Result<(), ServiceConfigError> {
        self.access_lifetime()?;
        self.refresh_lifetime()?;
        Ok(())
    }

    pub fn access_lifetime(&self) -> Result<Duration, ServiceConfigError> {
        bounded_seconds(self.access_token_lifetime)
            .ok_or(ServiceConfigError::AccessTokenLifetime(self.access_token_lifetime))
    }

    pub fn refresh_lifetime(&self) -> Result<Duration, ServiceConfigError> {
        bounded_seconds(self.refresh_token_lifetime)
            .ok_or(ServiceConfigError::RefreshTokenLifetime(self.refresh_token_lifetime))
    }
}

fn default_auth_port() -> u16 {
    3112
}

fn default_access_token_lifetime() -> u64 {
    300
}

fn default_refresh_token_lifetime() -> u64 {
    86_400
}

/// Token lifecycle policy. Every field is read from `PASSWORDLESS_<FIELD>`.
///
/// Built once at startup and shared read-only by the rate limiter, the token
/// generator and the redemption use cases.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPolicy {
    /// Channels with mounted request/exchange routes, e.g. `EMAIL,MOBILE`.
    #[serde(default = "default_allowed_methods")]
    pub allowed_passwordless_methods: Vec<Channel>,
    /// Seconds a token stays redeemable after issuance.
    #[serde(default = "default_token_lifetime")]
    pub token_lifetime: u64,
    /// Seconds during which an unexhausted token blocks a new request for the
    /// same user and channel. Defaults to `token_lifetime`.
    #[serde(default)]
    pub token_request_cooldown: Option<u64>,
    /// Redemption budget per token; `None` is unlimited.
    #[serde(default)]
    pub max_token_uses: Option<u32>,
    /// Whether a wrong short token still consumes one use of the candidate token.
    #[serde(default)]
    pub incorrect_short_token_redeems_token: bool,
    #[serde(default = "default_short_token_length")]
    pub short_token_length: usize,
    #[serde(default = "default_long_token_length")]
    pub long_token_length: usize,
    /// Magic-link template for emails; `{token}` is replaced by the long token.
    #[serde(default)]
    pub email_login_url: Option<String>,
}

impl Config for TokenPolicy {
    const PREFIX: &'static str = "PASSWORDLESS_";
}

fn default_allowed_methods() -> Vec<Channel> {
    Channel::ALL.to_vec()
}

fn default_token_lifetime() -> u64 {
    600
}

fn default_short_token_length() -> usize {
    6
}

fn default_long_token_length() -> usize {
    64
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self {
            allowed_passwordless_methods: default_allowed_methods(),
            token_lifetime: default_token_lifetime(),
            token_request_cooldown: None,
            max_token_uses: None,
            incorrect_short_token_redeems_token: false,
            short_token_length: default_short_token_length(),
            long_token_length: default_long_token_length(),
            email_login_url: None,
        }
    }
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    #[error("short token length must be between 4 and 12, got {0}")]
    ShortTokenLength(usize),
    #[error("long token length must be at least 32, got {0}")]
    LongTokenLength(usize),
    #[error("max token uses must be at least 1")]
    MaxTokenUses,
    #[error("token lifetime must be between one second and one year, got {0}")]
    TokenLifetime(u64),
    #[error("token request cooldown must be at most one year, got {0}")]
    TokenRequestCooldown(u64),
    #[error("email login url must contain a {{token}} placeholder")]
    EmailLoginUrl,
}

impl TokenPolicy {
    pub fn validate(&self) -> Result<(), PolicyError> {
        if !(4..=12).contains(&self.short_token_length) {
            return Err(PolicyError::ShortTokenLength(self.short_token_length));
        }
        if self.long_token_length < 32 {
            return Err(PolicyError::LongTokenLength(self.long_token_length));
        }
        if self.max_token_uses == Some(0) {
            return Err(PolicyError::MaxTokenUses);
        }
        if bounded_seconds(self.token_lifetime).is_none() {
            return Err(PolicyError::TokenLifetime(self.token_lifetime));
        }
        if let Some(cooldown) = self.token_request_cooldown {
            if cooldown > MAX_LIFETIME_SECS {
                return Err(PolicyError::TokenRequestCooldown(cooldown));
            }
        }
        if let Some(url) = &self.email_login_url {
            if !url.contains("{token}") {
                return Err(PolicyError::EmailLoginUrl);
            }
        }
        Ok(())
    }

    pub fn allows(&self, channel: Channel) -> bool {
        self.allowed_passwordless_methods.contains(&channel)
    }

    /// Clamped to [`MAX_LIFETIME_SECS`]; `validate` rejects anything larger.
    pub fn lifetime(&self) -> Duration {
        Duration::seconds(self.token_lifetime.min(MAX_LIFETIME_SECS) as i64)
    }

    pub fn cooldown(&self) -> Duration {
        let secs = self.token_request_cooldown.unwrap_or(self.token_lifetime);
        Duration::seconds(secs.min(MAX_LIFETIME_SECS) as i64)
    }
}
