use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

/// PUT /employees/:id/active - Flip the active flag
pub async fn put(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let active = state.employees.toggle_active(&id).await?;
    Ok(Json(json!({
        "message": "Employee status updated",
        "active": active,
    })))
}
