use axum::http::StatusCode;
use serde_json::{Value, json};

use passwordless_auth::config::TokenPolicy;
use passwordless_auth::usecase::session::TokenType;

use crate::helpers::{
    TEST_EMAIL, TEST_PHONE_NUMBER, TestApp, error_kind, spawn_app, test_sessions, wrong_code,
};

fn assert_invalid(resp: &axum_test::TestResponse) {
    assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(error_kind(&resp.json::<Value>()), "INVALID_OR_EXPIRED_TOKEN");
}

fn assert_credentials(resp: &axum_test::TestResponse, app: &TestApp) {
    resp.assert_status_ok();
    let body = resp.json::<Value>();
    let access = test_sessions()
        .verify(body["access"].as_str().unwrap(), TokenType::Access)
        .unwrap();
    assert_eq!(access.sub, app.user_id.to_string());
    test_sessions()
        .verify(body["refresh"].as_str().unwrap(), TokenType::Refresh)
        .unwrap();
}

fn policy(max_token_uses: Option<u32>, redeems: bool) -> TokenPolicy {
    TokenPolicy {
        max_token_uses,
        incorrect_short_token_redeems_token: redeems,
        ..TokenPolicy::default()
    }
}

// ── Happy path ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_exchange_delivered_email_code() {
    let app = spawn_app(TokenPolicy::default()).await;
    app.request_email().await.assert_status_ok();
    let code = app.delivered_code("passwordless_email").await;

    let resp = app.exchange_email(&code).await;
    assert_credentials(&resp, &app);
    assert_eq!(app.only_token().await.uses, 1);
}

#[tokio::test]
async fn should_exchange_delivered_mobile_code() {
    let app = spawn_app(TokenPolicy::default()).await;
    app.request_mobile().await.assert_status_ok();
    let code = app.delivered_code("passwordless_sms").await;

    let resp = app.exchange_mobile(&code).await;
    assert_credentials(&resp, &app);
}

// ── Use budget ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_allow_single_use_email_token_once() {
    let app = spawn_app(policy(Some(1), false)).await;
    app.request_email().await.assert_status_ok();
    let code = app.delivered_code("passwordless_email").await;

    app.exchange_email(&code).await.assert_status_ok();
    assert_invalid(&app.exchange_email(&code).await);
    assert_eq!(app.only_token().await.uses, 1);
}

#[tokio::test]
async fn should_allow_single_use_mobile_token_once() {
    let app = spawn_app(policy(Some(1), false)).await;
    app.request_mobile().await.assert_status_ok();
    let code = app.delivered_code("passwordless_sms").await;

    app.exchange_mobile(&code).await.assert_status_ok();
    assert_invalid(&app.exchange_mobile(&code).await);
}

#[tokio::test]
async fn should_allow_two_use_email_token_twice() {
    let app = spawn_app(policy(Some(2), false)).await;
    app.request_email().await.assert_status_ok();
    let code = app.delivered_code("passwordless_email").await;

    app.exchange_email(&code).await.assert_status_ok();
    app.exchange_email(&code).await.assert_status_ok();
    assert_invalid(&app.exchange_email(&code).await);
    assert_eq!(app.only_token().await.uses, 2);
}

#[tokio::test]
async fn should_allow_two_use_mobile_token_twice() {
    let app = spawn_app(policy(Some(2), false)).await;
    app.request_mobile().await.assert_status_ok();
    let code = app.delivered_code("passwordless_sms").await;

    app.exchange_mobile(&code).await.assert_status_ok();
    app.exchange_mobile(&code).await.assert_status_ok();
    assert_invalid(&app.exchange_mobile(&code).await);
    assert_eq!(app.only_token().await.uses, 2);
}

// ── Expiry ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_expired_email_token() {
    let app = spawn_app(TokenPolicy::default()).await;
    app.request_email().await.assert_status_ok();
    let code = app.delivered_code("passwordless_email").await;

    app.advance(601);
    assert_invalid(&app.exchange_email(&code).await);
    assert_eq!(app.only_token().await.uses, 0);
}

#[tokio::test]
async fn should_reject_expired_mobile_token() {
    let app = spawn_app(TokenPolicy::default()).await;
    app.request_mobile().await.assert_status_ok();
    let code = app.delivered_code("passwordless_sms").await;

    app.advance(601);
    assert_invalid(&app.exchange_mobile(&code).await);
    assert_eq!(app.only_token().await.uses, 0);
}

#[tokio::test]
async fn should_accept_token_on_last_second_of_lifetime() {
    let app = spawn_app(TokenPolicy::default()).await;
    app.request_email().await.assert_status_ok();
    let code = app.delivered_code("passwordless_email").await;

    app.advance(600);
    app.exchange_email(&code).await.assert_status_ok();
}

// ── Incorrect short token ────────────────────────────────────────────────────

#[tokio::test]
async fn should_burn_email_uses_on_wrong_code_when_configured() {
    let app = spawn_app(policy(Some(2), true)).await;
    app.request_email().await.assert_status_ok();
    let code = app.delivered_code("passwordless_email").await;

    assert_invalid(&app.exchange_email(&wrong_code(&code)).await);
    assert_invalid(&app.exchange_email(&wrong_code(&code)).await);
    assert_eq!(app.only_token().await.uses, 2);
    assert_invalid(&app.exchange_email(&code).await);
}

#[tokio::test]
async fn should_burn_mobile_uses_on_wrong_code_when_configured() {
    let app = spawn_app(policy(Some(2), true)).await;
    app.request_mobile().await.assert_status_ok();
    let code = app.delivered_code("passwordless_sms").await;

    assert_invalid(&app.exchange_mobile(&wrong_code(&code)).await);
    assert_invalid(&app.exchange_mobile(&wrong_code(&code)).await);
    assert_eq!(app.only_token().await.uses, 2);
}

#[tokio::test]
async fn should_keep_email_uses_on_wrong_code_by_default() {
    let app = spawn_app(policy(Some(2), false)).await;
    app.request_email().await.assert_status_ok();
    let code = app.delivered_code("passwordless_email").await;

    assert_invalid(&app.exchange_email(&wrong_code(&code)).await);
    assert_invalid(&app.exchange_email(&wrong_code(&code)).await);
    assert_eq!(app.only_token().await.uses, 0);
    app.exchange_email(&code).await.assert_status_ok();
}

#[tokio::test]
async fn should_keep_mobile_uses_on_wrong_code_by_default() {
    let app = spawn_app(policy(Some(2), false)).await;
    app.request_mobile().await.assert_status_ok();
    let code = app.delivered_code("passwordless_sms").await;

    assert_invalid(&app.exchange_mobile(&wrong_code(&code)).await);
    assert_invalid(&app.exchange_mobile(&wrong_code(&code)).await);
    assert_eq!(app.only_token().await.uses, 0);
}

// ── Rate limit then redeem ───────────────────────────────────────────────────

#[tokio::test]
async fn should_redeem_new_email_code_after_rate_limit_window() {
    let app = spawn_app(TokenPolicy::default()).await;
    app.request_email().await.assert_status_ok();
    assert_eq!(
        app.request_email().await.status_code(),
        StatusCode::TOO_MANY_REQUESTS
    );

    app.advance(601);
    app.request_email().await.assert_status_ok();
    let code = app.delivered_code("passwordless_email").await;

    let resp = app.exchange_email(&code).await;
    assert_credentials(&resp, &app);
}

#[tokio::test]
async fn should_redeem_new_mobile_code_after_rate_limit_window() {
    let app = spawn_app(TokenPolicy::default()).await;
    app.request_mobile().await.assert_status_ok();
    assert_eq!(
        app.request_mobile().await.status_code(),
        StatusCode::TOO_MANY_REQUESTS
    );

    app.advance(601);
    app.request_mobile().await.assert_status_ok();
    let code = app.delivered_code("passwordless_sms").await;

    app.exchange_mobile(&code).await.assert_status_ok();
}

// ── Validation ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_reject_exchange_without_identifier() {
    let app = spawn_app(TokenPolicy::default()).await;

    let resp = app
        .server
        .post("/passwordless/exchange/email")
        .json(&json!({ "token": "123456" }))
        .await;
    assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(error_kind(&resp.json::<Value>()), "VALIDATION_ERROR");

    let resp = app
        .server
        .post("/passwordless/exchange/mobile")
        .json(&json!({ "token": "123456" }))
        .await;
    assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(error_kind(&resp.json::<Value>()), "VALIDATION_ERROR");
}

#[tokio::test]
async fn should_reject_exchange_without_token() {
    let app = spawn_app(TokenPolicy::default()).await;

    let resp = app
        .server
        .post("/passwordless/exchange/email")
        .json(&json!({ "email": TEST_EMAIL }))
        .await;
    assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(resp.json::<Value>()["message"], "token is required");

    let resp = app
        .server
        .post("/passwordless/exchange/mobile")
        .json(&json!({ "phone_number": TEST_PHONE_NUMBER, "token": "" }))
        .await;
    assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(error_kind(&resp.json::<Value>()), "VALIDATION_ERROR");
}

#[tokio::test]
async fn should_reject_unknown_identifier_like_bad_code() {
    let app = spawn_app(TokenPolicy::default()).await;

    let resp = app
        .server
        .post("/passwordless/exchange/email")
        .json(&json!({ "email": "ringo@beatles.com", "token": "123456" }))
        .await;
    assert_invalid(&resp);
}

#[tokio::test]
async fn should_reject_code_without_issued_token() {
    let app = spawn_app(TokenPolicy::default()).await;
    assert_invalid(&app.exchange_email("123456").await);
}

#[tokio::test]
async fn should_not_redeem_email_code_over_mobile() {
    let app = spawn_app(TokenPolicy::default()).await;
    app.request_email().await.assert_status_ok();
    let code = app.delivered_code("passwordless_email").await;

    assert_invalid(&app.exchange_mobile(&code).await);
    assert_eq!(app.only_token().await.uses, 0);
}

// ── Magic link ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_exchange_long_token_from_link() {
    let app = spawn_app(policy(Some(1), false)).await;
    app.request_email().await.assert_status_ok();
    let token = app.only_token().await;

    let resp = app
        .server
        .post("/passwordless/exchange")
        .json(&json!({ "token": token.long_token }))
        .await;
    assert_credentials(&resp, &app);

    // The short code shares the exhausted budget.
    let code = app.delivered_code("passwordless_email").await;
    assert_invalid(&app.exchange_email(&code).await);
}

#[tokio::test]
async fn should_reject_unknown_or_expired_long_token() {
    let app = spawn_app(TokenPolicy::default()).await;
    app.request_email().await.assert_status_ok();
    let token = app.only_token().await;

    let resp = app
        .server
        .post("/passwordless/exchange")
        .json(&json!({ "token": "x".repeat(64) }))
        .await;
    assert_invalid(&resp);
    assert_eq!(app.only_token().await.uses, 0);

    app.advance(601);
    let resp = app
        .server
        .post("/passwordless/exchange")
        .json(&json!({ "token": token.long_token }))
        .await;
    assert_invalid(&resp);
}

#[tokio::test]
async fn should_reject_link_exchange_without_token() {
    let app = spawn_app(TokenPolicy::default()).await;

    let resp = app.server.post("/passwordless/exchange").json(&json!({})).await;
    assert_eq!(resp.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(error_kind(&resp.json::<Value>()), "VALIDATION_ERROR");
}
