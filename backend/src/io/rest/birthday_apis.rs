//! # REST API for the Birthday Text
//!
//! The admin edits the whole store as plain text. `PUT` stores the body
//! verbatim; with `?strict=true` it is stored only when every non-blank
//! line parses cleanly, otherwise the diagnostics come back with a 422.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use super::auth_apis::AdminSession;
use super::error::{ApiError, ApiResult};
use crate::AppState;
use shared::{DiagnosticsResponse, SuccessResponse};

pub fn router() -> Router<AppState> {
    Router::new().route("/birthdays", get(get_birthdays).put(put_birthdays))
}

#[derive(Debug, Default, Deserialize)]
pub struct SaveQuery {
    #[serde(default)]
    pub strict: bool,
}

/// Return the stored text as-is
pub async fn get_birthdays(State(state): State<AppState>, _session: AdminSession) -> ApiResult<String> {
    info!("GET /api/birthdays");

    state
        .birthday_service
        .get_text()
        .await
        .map_err(|e| ApiError::internal("Failed to read birthdays", e))
}

/// Replace the stored text
pub async fn put_birthdays(
    State(state): State<AppState>,
    _session: AdminSession,
    Query(query): Query<SaveQuery>,
    text: String,
) -> ApiResult<Response> {
    info!("PUT /api/birthdays - {} bytes, strict: {}", text.len(), query.strict);

    if !query.strict {
        state.birthday_service.save_text(&text).await?;
        return Ok(Json(SuccessResponse::ok()).into_response());
    }

    let report = state.birthday_service.save_text_strict(&text).await?;
    if report.is_clean() {
        return Ok(Json(SuccessResponse::ok()).into_response());
    }

    let body = DiagnosticsResponse {
        error: format!("{} line(s) need attention", report.diagnostics.len()),
        code: "PARSE_DIAGNOSTICS".to_string(),
        diagnostics: report.diagnostics,
    };
    Ok((StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::rest::test_support::{session_cookie, test_state};
    use axum::{
        body::Body,
        http::{header, Method, Request},
    };
    use shared::DiagnosticReason;
    use tower::util::ServiceExt;

    fn put(uri: &str, cookie: &str, text: &str) -> Request<Body> {
        Request::builder()
            .method(Method::PUT)
            .uri(uri)
            .header(header::COOKIE, cookie)
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from(text.to_string()))
            .unwrap()
    }

    fn get(cookie: &str) -> Request<Body> {
        Request::builder()
            .uri("/birthdays")
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap()
    }

    async fn text_of(response: Response) -> String {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_requires_session() {
        let app = router().with_state(test_state());

        let request = Request::builder().uri("/birthdays").body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let request = Request::builder()
            .method(Method::PUT)
            .uri("/birthdays")
            .body(Body::from("Alice-5-20-a"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_empty_store_returns_empty_text() {
        let state = test_state();
        let cookie = session_cookie(&state);
        let app = router().with_state(state);

        let response = app.oneshot(get(&cookie)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/plain"));
        assert_eq!(text_of(response).await, "");
    }

    #[tokio::test]
    async fn test_put_then_get_round_trips_verbatim() {
        let state = test_state();
        let cookie = session_cookie(&state);
        let app = router().with_state(state);
        let text = "Alice-1990-5-20-a-Sales\n\nnot a record\nBob-8-15-b";

        let response = app.clone().oneshot(put("/birthdays", &cookie, text)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(text_of(response).await, r#"{"success":true}"#);

        let response = app.oneshot(get(&cookie)).await.unwrap();
        assert_eq!(text_of(response).await, text);
    }

    #[tokio::test]
    async fn test_strict_put_rejects_bad_lines() {
        let state = test_state();
        let cookie = session_cookie(&state);
        let app = router().with_state(state);

        app.clone()
            .oneshot(put("/birthdays", &cookie, "Alice-5-20-a"))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(put("/birthdays?strict=true", &cookie, "Bob-6-1-b\nbroken"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body: DiagnosticsResponse = serde_json::from_str(&text_of(response).await).unwrap();
        assert_eq!(body.code, "PARSE_DIAGNOSTICS");
        assert_eq!(body.diagnostics.len(), 1);
        assert_eq!(body.diagnostics[0].line_number, 2);
        assert_eq!(body.diagnostics[0].reason, DiagnosticReason::TooFewFields);

        let response = app.clone().oneshot(get(&cookie)).await.unwrap();
        assert_eq!(text_of(response).await, "Alice-5-20-a");

        let response = app
            .clone()
            .oneshot(put("/birthdays?strict=true", &cookie, "Bob-6-1-b"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(get(&cookie)).await.unwrap();
        assert_eq!(text_of(response).await, "Bob-6-1-b");
    }
}
