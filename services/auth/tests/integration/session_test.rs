use chrono::{Duration, Utc};

use passwordless_auth::error::PasswordlessError;
use passwordless_auth::usecase::session::{SessionIssuer, TokenType};

use crate::helpers::{TEST_JWT_SECRET, test_sessions, test_user};

#[tokio::test]
async fn should_issue_access_and_refresh_tokens_for_user() {
    let user = test_user();
    let now = Utc::now();
    let credentials = test_sessions().issue_credentials(&user, now).unwrap();

    let access = test_sessions()
        .verify(&credentials.access, TokenType::Access)
        .unwrap();
    assert_eq!(access.sub, user.id.to_string());
    assert_eq!(access.iat, now.timestamp());
    assert_eq!(access.exp, (now + Duration::minutes(5)).timestamp());

    let refresh = test_sessions()
        .verify(&credentials.refresh, TokenType::Refresh)
        .unwrap();
    assert_eq!(refresh.sub, user.id.to_string());
    assert_eq!(refresh.exp, (now + Duration::days(1)).timestamp());
    assert_ne!(access.jti, refresh.jti);
}

#[tokio::test]
async fn should_reject_token_of_wrong_type() {
    let credentials = test_sessions()
        .issue_credentials(&test_user(), Utc::now())
        .unwrap();

    let result = test_sessions().verify(&credentials.refresh, TokenType::Access);
    assert!(
        matches!(result, Err(PasswordlessError::InvalidSessionToken)),
        "expected InvalidSessionToken, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_token_signed_with_wrong_secret() {
    let credentials = test_sessions()
        .issue_credentials(&test_user(), Utc::now())
        .unwrap();
    let other = SessionIssuer::new("wrong-secret", Duration::minutes(5), Duration::days(1));

    let result = other.verify(&credentials.access, TokenType::Access);
    assert!(matches!(result, Err(PasswordlessError::InvalidSessionToken)));
}

#[tokio::test]
async fn should_reject_expired_access_token() {
    let issued_at = Utc::now() - Duration::hours(1);
    let credentials = test_sessions()
        .issue_credentials(&test_user(), issued_at)
        .unwrap();

    let result = test_sessions().verify(&credentials.access, TokenType::Access);
    assert!(matches!(result, Err(PasswordlessError::InvalidSessionToken)));
}

#[tokio::test]
async fn should_reject_garbage_token() {
    let issuer = SessionIssuer::new(TEST_JWT_SECRET, Duration::minutes(5), Duration::days(1));
    let result = issuer.verify("not-a-jwt", TokenType::Access);
    assert!(matches!(result, Err(PasswordlessError::InvalidSessionToken)));
}
