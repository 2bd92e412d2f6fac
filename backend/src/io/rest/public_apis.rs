//! # Public Export
//!
//! `GET /api/public/birthdays?m=KEY` hands out the raw text to holders of
//! the static key. Responses on this surface are plain text, errors
//! included.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::domain::PublicAccessError;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/public/birthdays", get(export_birthdays))
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub m: Option<String>,
}

fn plain_error(status: StatusCode, message: &'static str) -> Response {
    (status, message).into_response()
}

pub async fn export_birthdays(State(state): State<AppState>, Query(query): Query<ExportQuery>) -> Response {
    info!("GET /api/public/birthdays");

    match state.api_key_service.authorize(query.m.as_deref()).await {
        Ok(()) => {}
        Err(PublicAccessError::MissingKey) => return plain_error(StatusCode::UNAUTHORIZED, "Missing key"),
        Err(PublicAccessError::NotConfigured) => {
            warn!("Public export requested but no API key is configured");
            return plain_error(StatusCode::UNAUTHORIZED, "API key not configured");
        }
        Err(PublicAccessError::Mismatch) => {
            warn!("Public export requested with a wrong key");
            return plain_error(StatusCode::FORBIDDEN, "Invalid key");
        }
        Err(PublicAccessError::Storage(e)) => {
            error!("Failed to read API key: {:?}", e);
            return plain_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal error");
        }
    }

    match state.birthday_service.get_text().await {
        Ok(text) => (
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
                (header::CACHE_CONTROL, "no-cache"),
            ],
            text,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to read birthdays for export: {:?}", e);
            plain_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        }
    }
}
