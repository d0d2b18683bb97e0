use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde::Deserialize;

use passwordless_domain::channel::{Channel, Identifier};

use crate::domain::types::Credentials;
use crate::error::PasswordlessError;
use crate::handlers::request::{json_body, parse_identifier};
use crate::state::AppState;
use crate::usecase::exchange::{
    ExchangeLongTokenInput, ExchangeLongTokenUseCase, ExchangeShortTokenInput,
    ExchangeShortTokenUseCase,
};

#[derive(Deserialize)]
pub struct EmailExchangeRequest {
    pub email: Option<String>,
    pub token: Option<String>,
}

#[derive(Deserialize)]
pub struct MobileExchangeRequest {
    pub phone_number: Option<String>,
    pub token: Option<String>,
}

#[derive(Deserialize)]
pub struct LinkExchangeRequest {
    pub token: Option<String>,
}

fn required_token(token: Option<String>) -> Result<String, PasswordlessError> {
    match token.map(|t| t.trim().to_owned()) {
        Some(t) if !t.is_empty() => Ok(t),
        _ => Err(PasswordlessError::Validation("token is required".to_owned())),
    }
}

async fn exchange_short_token(
    state: &AppState,
    identifier: Identifier,
    token: String,
) -> Result<Json<Credentials>, PasswordlessError> {
    let usecase = ExchangeShortTokenUseCase {
        users: state.user_repo(),
        tokens: state.token_repo(),
        sessions: state.sessions.clone(),
        policy: state.policy.clone(),
        clock: state.clock.clone(),
    };
    let credentials = usecase
        .execute(ExchangeShortTokenInput { identifier, token })
        .await?;
    Ok(Json(credentials))
}

// ── POST /passwordless/exchange/email ─────────────────────────────────────────

pub async fn exchange_email_token(
    State(state): State<AppState>,
    body: Result<Json<EmailExchangeRequest>, JsonRejection>,
) -> Result<Json<Credentials>, PasswordlessError> {
    let body = json_body(body)?;
    let identifier = parse_identifier(Channel::Email, body.email)?;
    let token = required_token(body.token)?;
    exchange_short_token(&state, identifier, token).await
}

// ── POST /passwordless/exchange/mobile ────────────────────────────────────────

pub async fn exchange_mobile_token(
    State(state): State<AppState>,
    body: Result<Json<MobileExchangeRequest>, JsonRejection>,
) -> Result<Json<Credentials>, PasswordlessError> {
    let body = json_body(body)?;
    let identifier = parse_identifier(Channel::Mobile, body.phone_number)?;
    let token = required_token(body.token)?;
    exchange_short_token(&state, identifier, token).await
}

// ── POST /passwordless/exchange ───────────────────────────────────────────────

pub async fn exchange_link_token(
    State(state): State<AppState>,
    body: Result<Json<LinkExchangeRequest>, JsonRejection>,
) -> Result<Json<Credentials>, PasswordlessError> {
    let body = json_body(body)?;
    let token = required_token(body.token)?;
    let usecase = ExchangeLongTokenUseCase {
        users: state.user_repo(),
        tokens: state.token_repo(),
        sessions: state.sessions.clone(),
        policy: state.policy.clone(),
        clock: state.clock.clone(),
    };
    let credentials = usecase.execute(ExchangeLongTokenInput { token }).await?;
    Ok(Json(credentials))
}
