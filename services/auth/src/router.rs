use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use passwordless_core::middleware::{propagate_request_id_layer, request_id_layer};
use passwordless_domain::channel::Channel;

use crate::handlers::{
    exchange::{exchange_email_token, exchange_link_token, exchange_mobile_token},
    health::{healthz, readyz},
    request::{request_email_token, request_mobile_token},
};
use crate::state::AppState;

/// Request/exchange routes for one channel.
fn channel_routes(channel: Channel) -> Router<AppState> {
    match channel {
        Channel::Email => Router::new()
            .route("/passwordless/request/email", post(request_email_token))
            .route("/passwordless/exchange/email", post(exchange_email_token)),
        Channel::Mobile => Router::new()
            .route("/passwordless/request/mobile", post(request_mobile_token))
            .route("/passwordless/exchange/mobile", post(exchange_mobile_token)),
    }
}

/// Channels missing from `allowed_passwordless_methods` are not mounted.
pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Magic link
        .route("/passwordless/exchange", post(exchange_link_token));

    let router = Channel::ALL
        .into_iter()
        .filter(|channel| state.policy.allows(*channel))
        .fold(router, |router, channel| router.merge(channel_routes(channel)));

    router
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id_layer())
        .layer(request_id_layer())
        .with_state(state)
}
