use std::sync::Arc;

use sea_orm::Database;
use tracing::info;

use passwordless_auth::config::{ServiceConfig, TokenPolicy};
use passwordless_auth::domain::clock::SystemClock;
use passwordless_auth::router::build_router;
use passwordless_auth::state::AppState;
use passwordless_auth::usecase::session::SessionIssuer;
use passwordless_core::config::Config;
use passwordless_core::tracing::init_tracing;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = ServiceConfig::from_env().expect("invalid service configuration");
    config.validate().expect("invalid service configuration");
    let policy = TokenPolicy::from_env().expect("invalid PASSWORDLESS_* configuration");
    policy.validate().expect("invalid token policy");

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let sessions = SessionIssuer::new(
        config.jwt_secret.clone(),
        config.access_lifetime().expect("invalid access token lifetime"),
        config.refresh_lifetime().expect("invalid refresh token lifetime"),
    );

    info!(
        channels = ?policy.allowed_passwordless_methods,
        token_lifetime = policy.token_lifetime,
        max_token_uses = ?policy.max_token_uses,
        delivery = ?config.delivery_backend,
        "token policy loaded"
    );

    let state = AppState {
        db,
        policy: Arc::new(policy),
        sessions,
        delivery: config.delivery_backend,
        clock: Arc::new(SystemClock),
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.auth_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("passwordless auth service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
