use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde::{Deserialize, Serialize};

use passwordless_domain::channel::{Channel, Identifier};

use crate::error::PasswordlessError;
use crate::state::AppState;
use crate::usecase::request::{RequestTokenInput, RequestTokenUseCase};

pub const TOKEN_SENT_DETAIL: &str = "A token has been sent to you";

#[derive(Deserialize)]
pub struct EmailTokenRequest {
    pub email: Option<String>,
}

#[derive(Deserialize)]
pub struct MobileTokenRequest {
    pub phone_number: Option<String>,
}

#[derive(Serialize)]
pub struct TokenRequestResponse {
    pub detail: &'static str,
}

/// Turn an axum JSON rejection into a 400 with our error body.
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, PasswordlessError> {
    body.map(|Json(b)| b)
        .map_err(|e| PasswordlessError::Validation(e.body_text()))
}

pub(crate) fn parse_identifier(channel: Channel, raw: Option<String>) -> Result<Identifier, PasswordlessError> {
    Ok(Identifier::parse(channel, raw.as_deref().unwrap_or_default())?)
}

async fn request_token(
    state: &AppState,
    identifier: Identifier,
) -> Result<Json<TokenRequestResponse>, PasswordlessError> {
    let usecase = RequestTokenUseCase {
        users: state.user_repo(),
        tokens: state.token_repo(),
        sender: state.token_sender(),
        policy: state.policy.clone(),
        clock: state.clock.clone(),
    };
    usecase.execute(RequestTokenInput { identifier }).await?;
    Ok(Json(TokenRequestResponse {
        detail: TOKEN_SENT_DETAIL,
    }))
}

// ── POST /passwordless/request/email ──────────────────────────────────────────

pub async fn request_email_token(
    State(state): State<AppState>,
    body: Result<Json<EmailTokenRequest>, JsonRejection>,
) -> Result<Json<TokenRequestResponse>, PasswordlessError> {
    let body = json_body(body)?;
    let identifier = parse_identifier(Channel::Email, body.email)?;
    request_token(&state, identifier).await
}

// ── POST /passwordless/request/mobile ─────────────────────────────────────────

pub async fn request_mobile_token(
    State(state): State<AppState>,
    body: Result<Json<MobileTokenRequest>, JsonRejection>,
) -> Result<Json<TokenRequestResponse>, PasswordlessError> {
    let body = json_body(body)?;
    let identifier = parse_identifier(Channel::Mobile, body.phone_number)?;
    request_token(&state, identifier).await
}
