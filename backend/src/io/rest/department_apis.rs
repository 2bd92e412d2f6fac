//! # REST API for Departments

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use super::auth_apis::AdminSession;
use super::error::{ApiError, ApiResult};
use crate::AppState;
use shared::{DepartmentListResponse, RemoveDepartmentResponse};

pub fn router() -> Router<AppState> {
    Router::new().route("/departments", get(list_departments).delete(delete_department))
}

#[derive(Debug, Deserialize)]
pub struct DepartmentQuery {
    pub name: Option<String>,
}

/// Departments with record counts, in order of first appearance
pub async fn list_departments(
    State(state): State<AppState>,
    _session: AdminSession,
) -> ApiResult<Json<DepartmentListResponse>> {
    info!("GET /api/departments");

    let departments = state.birthday_service.departments().await?;
    Ok(Json(DepartmentListResponse { departments }))
}

/// Remove every record of one department
pub async fn delete_department(
    State(state): State<AppState>,
    _session: AdminSession,
    Query(query): Query<DepartmentQuery>,
) -> ApiResult<Json<RemoveDepartmentResponse>> {
    info!("DELETE /api/departments - name: {:?}", query.name);

    let name = query
        .name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::bad_request("MISSING_DEPARTMENT", "Department name is required"))?;

    let removed = state.birthday_service.remove_department(&name).await?;
    Ok(Json(RemoveDepartmentResponse {
        success: true,
        removed,
    }))
}
