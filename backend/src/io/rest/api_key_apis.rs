//! # REST API for the Export Key
//!
//! Lets the admin read, rotate, and revoke the static key that opens
//! `GET /api/public/birthdays`.

use axum::{body::Bytes, extract::State, routing::get, Json, Router};
use tracing::{info, warn};

use super::auth_apis::AdminSession;
use super::error::{ApiError, ApiResult};
use crate::domain::api_key_service::endpoint_for;
use crate::domain::ApiKeyError;
use crate::AppState;
use shared::{ApiKeyResponse, GenerateApiKeyRequest, GenerateApiKeyResponse, SuccessResponse};

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api-key",
        get(get_api_key).post(generate_api_key).delete(delete_api_key),
    )
}

/// The current key and its export URL, both null when unset
pub async fn get_api_key(State(state): State<AppState>, _session: AdminSession) -> ApiResult<Json<ApiKeyResponse>> {
    info!("GET /api/api-key");

    let api_key = state.api_key_service.current().await?;
    let endpoint = api_key.as_deref().map(endpoint_for);
    Ok(Json(ApiKeyResponse { api_key, endpoint }))
}

/// An empty body asks for a generated key. Anything else must be a valid
/// request, so a garbled body never rotates the published key.
fn parse_generate_request(body: &[u8]) -> ApiResult<GenerateApiKeyRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(GenerateApiKeyRequest::default());
    }
    serde_json::from_slice(body).map_err(|e| {
        warn!("Rejected API key request body: {}", e);
        ApiError::bad_request("INVALID_API_KEY", format!("Invalid request body: {}", e))
    })
}

/// Set a custom key or generate one; the previous key stops working
pub async fn generate_api_key(
    State(state): State<AppState>,
    _session: AdminSession,
    body: Bytes,
) -> ApiResult<Json<GenerateApiKeyResponse>> {
    let request = parse_generate_request(&body)?;
    info!("POST /api/api-key - custom: {}", request.custom_key.is_some());

    let api_key = state
        .api_key_service
        .rotate(request.custom_key.as_deref())
        .await
        .map_err(|e| match e {
            ApiKeyError::InvalidFormat => ApiError::bad_request("INVALID_API_KEY", e.to_string()),
            ApiKeyError::Storage(e) => ApiError::internal("Failed to store API key", e),
        })?;

    let endpoint = endpoint_for(&api_key);
    Ok(Json(GenerateApiKeyResponse {
        success: true,
        api_key,
        endpoint,
    }))
}

pub async fn delete_api_key(State(state): State<AppState>, _session: AdminSession) -> ApiResult<Json<SuccessResponse>> {
    info!("DELETE /api/api-key");

    state.api_key_service.revoke().await?;
    Ok(Json(SuccessResponse::ok()))
}
