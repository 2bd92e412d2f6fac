//! # REST API for Individual Records
//!
//! Structured edits on top of the text store. A record is addressed by its
//! source line (`originalLine`). Every edit rewrites the whole text from the
//! parsed records.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use tracing::info;

use super::auth_apis::AdminSession;
use super::error::{ApiError, ApiResult};
use crate::domain::RecordError;
use crate::AppState;
use shared::{RecordFields, RecordListResponse, RecordResponse, SuccessResponse, UpdateRecordRequest};

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/records",
        get(list_records)
            .post(create_record)
            .put(update_record)
            .delete(delete_record),
    )
}

#[derive(Debug, Deserialize)]
pub struct RecordQuery {
    pub line: Option<String>,
}

fn record_error(e: RecordError) -> ApiError {
    match e {
        RecordError::Invalid(message) => ApiError::bad_request("INVALID_RECORD", message),
        RecordError::NotFound => ApiError::not_found("RECORD_NOT_FOUND", "Record not found"),
        RecordError::Storage(e) => ApiError::internal("Failed to save records", e),
    }
}

/// Parsed records plus anything the strict parser flagged
pub async fn list_records(State(state): State<AppState>, _session: AdminSession) -> ApiResult<Json<RecordListResponse>> {
    info!("GET /api/records");

    let report = state.birthday_service.list_records().await?;
    Ok(Json(RecordListResponse {
        records: report.records,
        diagnostics: report.diagnostics,
    }))
}

pub async fn create_record(
    State(state): State<AppState>,
    _session: AdminSession,
    WithRejection(Json(fields), _): WithRejection<Json<RecordFields>, ApiError>,
) -> ApiResult<(StatusCode, Json<RecordResponse>)> {
    info!("POST /api/records - name: {}", fields.name);

    let record = state.birthday_service.add_record(fields).await.map_err(record_error)?;
    Ok((StatusCode::CREATED, Json(RecordResponse { success: true, record })))
}

pub async fn update_record(
    State(state): State<AppState>,
    _session: AdminSession,
    WithRejection(Json(request), _): WithRejection<Json<UpdateRecordRequest>, ApiError>,
) -> ApiResult<Json<RecordResponse>> {
    info!("PUT /api/records - line: {:?}", request.original_line);

    let record = state
        .birthday_service
        .update_record(&request.original_line, request.record)
        .await
        .map_err(record_error)?;
    Ok(Json(RecordResponse { success: true, record }))
}

pub async fn delete_record(
    State(state): State<AppState>,
    _session: AdminSession,
    Query(query): Query<RecordQuery>,
) -> ApiResult<Json<SuccessResponse>> {
    info!("DELETE /api/records - line: {:?}", query.line);

    let line = query
        .line
        .filter(|l| !l.is_empty())
        .ok_or_else(|| ApiError::bad_request("MISSING_LINE", "Record line is required"))?;

    state
        .birthday_service
        .delete_record(&line)
        .await
        .map_err(record_error)?;
    Ok(Json(SuccessResponse::ok()))
}
