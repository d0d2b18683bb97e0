use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::types::{Credentials, PasswordlessUser};
use crate::error::PasswordlessError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// JWT claims for both access and refresh tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User ID (UUID string).
    pub sub: String,
    pub token_type: TokenType,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// Mints the access/refresh pair once a passwordless token has been redeemed.
#[derive(Clone)]
pub struct SessionIssuer {
    secret: String,
    access_lifetime: Duration,
    refresh_lifetime: Duration,
}

impl SessionIssuer {
    pub fn new(secret: impl Into<String>, access_lifetime: Duration, refresh_lifetime: Duration) -> Self {
        Self {
            secret: secret.into(),
            access_lifetime,
            refresh_lifetime,
        }
    }

    pub fn issue_credentials(
        &self,
        user: &PasswordlessUser,
        now: DateTime<Utc>,
    ) -> Result<Credentials, PasswordlessError> {
        Ok(Credentials {
            access: self.sign(user.id, TokenType::Access, now, self.access_lifetime)?,
            refresh: self.sign(user.id, TokenType::Refresh, now, self.refresh_lifetime)?,
        })
    }

    fn sign(
        &self,
        user_id: Uuid,
        token_type: TokenType,
        now: DateTime<Utc>,
        lifetime: Duration,
    ) -> Result<String, PasswordlessError> {
        let claims = SessionClaims {
            sub: user_id.to_string(),
            token_type,
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
            jti: Uuid::new_v4().simple().to_string(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| PasswordlessError::Internal(e.into()))
    }

    /// Validate signature, expiry and token type, returning the claims.
    pub fn verify(
        &self,
        token: &str,
        expected: TokenType,
    ) -> Result<SessionClaims, PasswordlessError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.required_spec_claims.clear();
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|_| PasswordlessError::InvalidSessionToken)?;

        if data.claims.token_type != expected {
            return Err(PasswordlessError::InvalidSessionToken);
        }
        Ok(data.claims)
    }
}
