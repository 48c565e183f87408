//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{activity, credits, health, tools, webhooks};
use crate::state::AppState;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Tools (user JWT auth)
/// - `POST /v1/tools/run` - Run a tool, debiting credits
/// - `POST /v1/activity` - Log a tool run (premium users)
///
/// ## Credits (user JWT auth)
/// - `GET /v1/credits/balance` - Get current balance
/// - `GET /v1/credits/entries` - List ledger history
/// - `GET /v1/entitlement` - Get premium entitlement
///
/// ## Webhooks
/// - `POST /webhooks/purchase` - Purchase confirmations from payment providers
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.cors_origins);
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let state = Arc::new(state);

    Router::new()
        // Health (public)
        .route("/health", get(health::health))
        // Tools
        .route("/v1/tools/run", post(tools::run_tool))
        .route("/v1/activity", post(activity::log_activity))
        // Credits
        .route("/v1/credits/balance", get(credits::get_balance))
        .route("/v1/credits/entries", get(credits::list_entries))
        .route("/v1/entitlement", get(credits::get_entitlement))
        // Webhooks
        .route("/webhooks/purchase", post(webhooks::purchase_webhook))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
