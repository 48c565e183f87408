//! Tool execution handler.
//!
//! Running a tool debits the caller's balance atomically before the model is
//! invoked. Prompts and model outputs are held in memory only and never
//! persisted.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Tool run request.
#[derive(Debug, Deserialize)]
pub struct RunToolRequest {
    /// The tool being run.
    pub tool_id: String,

    /// The model to bill and invoke.
    pub model: String,

    /// The user's prompt. Never stored.
    pub prompt: String,
}

/// Tool run response.
#[derive(Debug, Serialize)]
pub struct RunToolResponse {
    /// The model output. Never stored.
    pub result: String,

    /// Credits deducted for this run.
    pub cost: i64,

    /// Balance after the debit.
    pub remaining_credits: i64,
}

/// Run an AI tool, debiting the caller's balance first.
pub async fn run_tool(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<RunToolRequest>,
) -> Result<Json<RunToolResponse>, ApiError> {
    if body.tool_id.is_empty() || body.model.is_empty() || body.prompt.is_empty() {
        return Err(ApiError::BadRequest(
            "Missing required fields: tool_id, model, or prompt".into(),
        ));
    }

    let cost = state.config.cost_table.cost_for(&body.model);

    // Debit first: the run is only billed if the debit commits, and the
    // model is only invoked if the run was billed.
    let remaining_credits = state.engine.debit(&auth.user_id, cost, &body.model)?;

    tracing::info!(
        user_id = %auth.user_id,
        tool_id = %body.tool_id,
        model = %body.model,
        cost,
        remaining_credits,
        "Tool run billed"
    );

    let result = invoke_model(&body.model, &body.prompt);

    Ok(Json(RunToolResponse {
        result,
        cost,
        remaining_credits,
    }))
}

/// Invoke the requested model provider.
///
/// Stubbed: a real deployment dispatches to the provider API selected by
/// `model`, with keys from the environment. The prompt and response stay in
/// memory only.
fn invoke_model(model: &str, prompt: &str) -> String {
    let preview: String = prompt.chars().take(50).collect();
    format!("This is a mocked response from {model} for your prompt: \"{preview}...\"")
}
