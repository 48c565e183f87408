//! Balance, ledger history, and entitlement handlers.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use ledger_core::LedgerEntry;
use ledger_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Balance response.
#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    /// Current credit balance.
    pub credits_remaining: i64,
}

/// Get the caller's current credit balance.
pub async fn get_balance(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<BalanceResponse>, ApiError> {
    let account = state.engine.account(&auth.user_id)?;

    Ok(Json(BalanceResponse {
        credits_remaining: account.credits_remaining,
    }))
}

/// Entry list query parameters.
#[derive(Debug, Deserialize)]
pub struct ListEntriesQuery {
    /// Maximum number of entries to return (default: 50, max: 100).
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Offset for pagination (default: 0).
    #[serde(default)]
    pub offset: usize,
}

fn default_limit() -> usize {
    50
}

/// Ledger entry response.
#[derive(Debug, Serialize)]
pub struct EntryResponse {
    /// Entry ID.
    pub id: String,
    /// Entry kind (`debit` or `purchase`).
    pub kind: String,
    /// Signed amount (negative = debit, positive = purchase).
    pub amount: i64,
    /// Free-text context.
    pub details: String,
    /// Timestamp.
    pub created_at: String,
}

impl From<&LedgerEntry> for EntryResponse {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            kind: entry.kind.as_str().to_string(),
            amount: entry.amount,
            details: entry.details.clone(),
            created_at: entry.created_at.to_rfc3339(),
        }
    }
}

/// List entries response.
#[derive(Debug, Serialize)]
pub struct ListEntriesResponse {
    /// Entries (newest first).
    pub entries: Vec<EntryResponse>,
    /// Whether there are more entries.
    pub has_more: bool,
}

/// List the caller's ledger history.
pub async fn list_entries(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Query(query): Query<ListEntriesQuery>,
) -> Result<Json<ListEntriesResponse>, ApiError> {
    // Verify account exists
    state.engine.account(&auth.user_id)?;

    // Fetch one more than requested to determine has_more
    let limit = query.limit.min(100);
    let entries = state
        .store
        .list_entries_by_user(&auth.user_id, limit + 1, query.offset)?;

    let has_more = entries.len() > limit;
    let entries: Vec<_> = entries.iter().take(limit).map(EntryResponse::from).collect();

    Ok(Json(ListEntriesResponse { entries, has_more }))
}

/// Entitlement response.
#[derive(Debug, Serialize)]
pub struct EntitlementResponse {
    /// Whether the caller is currently premium.
    pub is_premium: bool,
    /// The stored expiry, if a premium window was ever granted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub premium_expires: Option<String>,
}

/// Get the caller's premium entitlement, evaluated at request time.
pub async fn get_entitlement(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<EntitlementResponse>, ApiError> {
    let status = state.engine.entitlement(&auth.user_id)?;

    Ok(Json(EntitlementResponse {
        is_premium: status.is_premium,
        premium_expires: status.premium_expires.map(|t| t.to_rfc3339()),
    }))
}
