use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    Json,
};
use serde_json::{json, Value};

use super::form::read_employee_form;
use crate::database::Employee;
use crate::error::ApiError;
use crate::state::AppState;

/// GET /employees/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Employee>, ApiError> {
    Ok(Json(state.employees.get(&id).await?))
}

/// PUT /employees/:id - Partial update; fields left out keep their values
pub async fn put(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Employee>, ApiError> {
    let body = read_employee_form(multipart).await?;
    let employee = state.employees.update(&id, body.form, body.image).await?;
    Ok(Json(employee))
}

/// DELETE /employees/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    state.employees.delete(&id).await?;
    Ok(Json(json!({ "message": "Employee deleted successfully" })))
}
