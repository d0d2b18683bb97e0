use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use passwordless_domain::channel::IdentifierError;

/// Passwordless service error variants.
#[derive(Debug, thiserror::Error)]
pub enum PasswordlessError {
    #[error("{0}")]
    Validation(String),
    /// Also returned for unknown identifiers so callers cannot probe for accounts.
    #[error("invalid or expired token")]
    InvalidOrExpiredToken,
    #[error("too many token requests")]
    RateLimited,
    #[error("invalid session token")]
    InvalidSessionToken,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl PasswordlessError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidOrExpiredToken => "INVALID_OR_EXPIRED_TOKEN",
            Self::RateLimited => "TOO_MANY_REQUESTS",
            Self::InvalidSessionToken => "INVALID_SESSION_TOKEN",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl From<IdentifierError> for PasswordlessError {
    fn from(e: IdentifierError) -> Self {
        Self::Validation(e.to_string())
    }
}

impl IntoResponse for PasswordlessError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation(_) | Self::InvalidOrExpiredToken => StatusCode::BAD_REQUEST,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::InvalidSessionToken => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // 4xx are expected client errors and TraceLayer already records their status.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = ?e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
