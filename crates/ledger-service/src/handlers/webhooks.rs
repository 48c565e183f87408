//! Purchase webhook handler.
//!
//! Payment providers confirm purchases by webhook and may redeliver events;
//! the provider event ID doubles as the idempotency key, so a redelivered
//! event is rejected instead of double-crediting. Provider signature
//! verification happens in the gateway upstream of this service.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use ledger_core::{IdempotencyKey, UserId};

use crate::error::ApiError;
use crate::state::AppState;

/// Premium window granted by a premium pack purchase, in days.
///
/// Repeat purchases restart this window; remaining time does not accumulate.
const PREMIUM_PACK_DURATION_DAYS: i64 = 30;

/// Payment providers we accept purchase confirmations from.
const SUPPORTED_PROVIDERS: &[&str] = &["stripe", "google_play", "app_store"];

/// Purchase webhook payload.
#[derive(Debug, Deserialize)]
pub struct PurchaseWebhook {
    /// Payment provider that confirmed the purchase.
    pub provider: String,

    /// Provider event ID; used as the idempotency key.
    pub event_id: String,

    /// The purchasing user.
    pub user_id: String,

    /// Credits purchased.
    pub credits_purchased: i64,

    /// Name of the purchased pack.
    pub pack_name: String,

    /// Whether this pack includes a premium entitlement window.
    #[serde(default)]
    pub is_premium: bool,
}

/// Purchase webhook response.
#[derive(Debug, Serialize)]
pub struct PurchaseResponse {
    /// Balance after crediting.
    pub new_balance: i64,

    /// Whether the account is premium after this purchase.
    pub is_premium: bool,

    /// Premium expiry, if set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub premium_expires: Option<String>,
}

/// Handle a confirmed purchase: credit the account and log the entry.
pub async fn purchase_webhook(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PurchaseWebhook>,
) -> Result<Json<PurchaseResponse>, ApiError> {
    if !SUPPORTED_PROVIDERS.contains(&body.provider.as_str()) {
        return Err(ApiError::BadRequest(format!(
            "Unsupported payment provider: {}",
            body.provider
        )));
    }

    let user_id: UserId = body
        .user_id
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid user ID".into()))?;

    let idempotency_key = IdempotencyKey::new(body.event_id.clone())
        .map_err(|_| ApiError::BadRequest("Missing or invalid event ID".into()))?;

    let premium_days = body.is_premium.then_some(PREMIUM_PACK_DURATION_DAYS);
    let details = format!("Purchase of {} pack", body.pack_name);

    let account = state.engine.credit(
        &user_id,
        body.credits_purchased,
        &details,
        &idempotency_key,
        premium_days,
    )?;

    tracing::info!(
        provider = %body.provider,
        event_id = %body.event_id,
        user_id = %user_id,
        credits = body.credits_purchased,
        new_balance = account.credits_remaining,
        "Purchase credited"
    );

    Ok(Json(PurchaseResponse {
        new_balance: account.credits_remaining,
        is_premium: account.is_premium,
        premium_expires: account.premium_expires.map(|t| t.to_rfc3339()),
    }))
}
