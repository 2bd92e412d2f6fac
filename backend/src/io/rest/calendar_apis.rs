//! # REST API for Calendar Conversion
//!
//! Lets the admin UI preview which solar day a lunar birthday lands on, and
//! the reverse.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use super::auth_apis::AdminSession;
use super::error::{ApiError, ApiResult};
use crate::domain::lunar::{lunar_to_solar, solar_to_lunar};
use crate::AppState;
use shared::{LunarDate, SolarDateResponse};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/calendar/lunar", get(to_lunar))
        .route("/calendar/solar", get(to_solar))
}

#[derive(Debug, Deserialize)]
pub struct SolarQuery {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LunarQuery {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    #[serde(default)]
    pub leap: bool,
}

/// Lunar date for `?date=YYYY-MM-DD`, defaulting to today
pub async fn to_lunar(
    State(state): State<AppState>,
    _session: AdminSession,
    Query(query): Query<SolarQuery>,
) -> ApiResult<Json<LunarDate>> {
    info!("GET /api/calendar/lunar - date: {:?}", query.date);

    let date = match query.date.as_deref().filter(|d| !d.is_empty()) {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| ApiError::bad_request("INVALID_DATE", "Date must be YYYY-MM-DD"))?,
        None => state.today_service.solar_today(),
    };

    let lunar = solar_to_lunar(date).map_err(|e| ApiError::bad_request("DATE_OUT_OF_RANGE", e.to_string()))?;
    Ok(Json(lunar))
}

/// Solar date of a lunar date
pub async fn to_solar(_session: AdminSession, Query(query): Query<LunarQuery>) -> ApiResult<Json<SolarDateResponse>> {
    info!("GET /api/calendar/solar - {:?}", query);

    let lunar = LunarDate {
        year: query.year,
        month: query.month,
        day: query.day,
        is_leap: query.leap,
    };
    let date = lunar_to_solar(lunar)
        .ok_or_else(|| ApiError::bad_request("INVALID_LUNAR_DATE", format!("No such lunar date: {}", lunar)))?;

    Ok(Json(SolarDateResponse {
        date: date.format("%Y-%m-%d").to_string(),
    }))
}
