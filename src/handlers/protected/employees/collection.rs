use axum::{
    extract::{multipart::MultipartRejection, rejection::QueryRejection, Multipart, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use super::form::read_employee_form;
use crate::error::ApiError;
use crate::services::{EmployeePage, ListParams};
use crate::state::AppState;

/// GET /employees - Paged, searchable, sorted listing
///
/// Query: `page`, `limit`, `search`, `sortField`, `sortOrder`. Out-of-range
/// values are clamped, never rejected; `page` and `limit` in the response are
/// the values actually used.
pub async fn get(
    State(state): State<AppState>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<EmployeePage>, ApiError> {
    let Query(params) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let page = state.employees.list(&params).await?;
    Ok(Json(page))
}

/// POST /employees - Create from a multipart form with an optional `image` file
pub async fn post(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let body = read_employee_form(multipart).await?;
    let employee = state.employees.create(body.form, body.image).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Employee added successfully",
            "employee": employee,
        })),
    ))
}
