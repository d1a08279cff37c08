//! The operation endpoint.
//!
//! Clients post one [`Operation`] per request and receive `{"data": ...}`
//! on success or `{"error": "..."}` with a 4xx/5xx status otherwise.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde_json::{Value, json};

use crate::error::{AppError, Result};
use crate::schema::Operation;
use crate::state::AppState;

/// Run the posted operation against the store.
///
/// # Errors
///
/// Returns `AppError::BadRequest` for a body that is not a known operation
/// with well-formed arguments, and `AppError::Operation` if it fails.
pub async fn execute(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Operation>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(operation) = payload.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    let name = operation.name();
    tracing::info!(
        operation = name,
        mutation = operation.is_mutation(),
        "Executing operation"
    );

    let data = operation.execute(state.store()).await.map_err(|e| {
        tracing::debug!(operation = name, error = %e, "Operation failed");
        AppError::from(e)
    })?;

    Ok(Json(json!({ "data": data })))
}
