//! # REST API for Today's Birthdays

use axum::{extract::State, routing::get, Json, Router};
use tracing::info;

use super::auth_apis::AdminSession;
use super::error::{ApiError, ApiResult};
use crate::AppState;
use shared::TodayResponse;

pub fn router() -> Router<AppState> {
    Router::new().route("/today", get(get_today))
}

/// Records whose solar or lunar birthday is today in the configured zone
pub async fn get_today(State(state): State<AppState>, _session: AdminSession) -> ApiResult<Json<TodayResponse>> {
    info!("GET /api/today");

    let reference = state
        .today_service
        .reference_date()
        .map_err(|e| ApiError::internal("Failed to compute today's date", e))?;

    let today = state.birthday_service.today_birthdays(&reference).await?;

    Ok(Json(TodayResponse {
        today,
        date: reference.solar.format("%Y-%m-%d").to_string(),
        lunar: reference.lunar,
    }))
}
