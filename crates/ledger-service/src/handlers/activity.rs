//! Premium activity log handler.
//!
//! Activity history is a premium feature: the entitlement evaluator decides
//! at request time whether anything is stored. Non-premium calls succeed
//! without writing, matching the tool-store client contract.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use ledger_store::{ActivityRecord, Store};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Activity log request.
#[derive(Debug, Deserialize)]
pub struct LogActivityRequest {
    /// The tool that was run.
    pub tool_id: String,

    /// Tool inputs.
    pub inputs: serde_json::Value,

    /// Tool outputs.
    pub outputs: serde_json::Value,
}

/// Activity log response.
#[derive(Debug, Serialize)]
pub struct LogActivityResponse {
    /// Whether the record was stored (premium users only).
    pub stored: bool,
}

/// Log a tool run for a premium user.
pub async fn log_activity(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<LogActivityRequest>,
) -> Result<Json<LogActivityResponse>, ApiError> {
    if body.tool_id.is_empty() || body.inputs.is_null() || body.outputs.is_null() {
        return Err(ApiError::BadRequest(
            "Missing required fields: tool_id, inputs, or outputs".into(),
        ));
    }

    let status = state.engine.entitlement(&auth.user_id)?;

    if !status.is_premium {
        tracing::debug!(user_id = %auth.user_id, "Activity not stored for non-premium user");
        return Ok(Json(LogActivityResponse { stored: false }));
    }

    let record = ActivityRecord::new(
        auth.user_id.clone(),
        body.tool_id,
        body.inputs,
        body.outputs,
    );
    state.store.put_activity(&record)?;

    tracing::info!(
        user_id = %auth.user_id,
        activity_id = %record.id,
        "Activity logged"
    );

    Ok(Json(LogActivityResponse { stored: true }))
}
