//! # REST API for Admin Login
//!
//! `POST /api/login` checks the admin password and sets the session cookie,
//! `DELETE /api/login` clears it. [`AdminSession`] guards every other admin
//! endpoint.

use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{request::Parts, StatusCode},
    routing::post,
    Json, Router,
};
use axum_extra::extract::{
    cookie::{Cookie, CookieJar, SameSite},
    WithRejection,
};
use tracing::{info, warn};

use super::error::{ApiError, ApiResult};
use crate::domain::{LoginError, SessionClaims};
use crate::AppState;
use shared::{LoginRequest, SuccessResponse};

pub const SESSION_COOKIE: &str = "auth_token";

pub fn router() -> Router<AppState> {
    Router::new().route("/login", post(login).delete(logout))
}

fn build_session_cookie(value: String, max_age_seconds: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(time::Duration::seconds(max_age_seconds))
        .build()
}

/// Check the admin password and start a session
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(request), _): WithRejection<Json<LoginRequest>, ApiError>,
) -> ApiResult<(CookieJar, Json<SuccessResponse>)> {
    info!("POST /api/login");

    let token = state
        .auth_service
        .login(request.password.as_deref())
        .map_err(|e| match e {
            LoginError::MissingPassword => ApiError::bad_request("MISSING_PASSWORD", e.to_string()),
            LoginError::InvalidPassword => {
                ApiError::new(StatusCode::UNAUTHORIZED, "INVALID_PASSWORD", e.to_string())
            }
        })?;

    let cookie = build_session_cookie(
        token,
        state.auth_service.session_ttl_seconds(),
        state.cookie_secure,
    );
    Ok((jar.add(cookie), Json(SuccessResponse::ok())))
}

/// End the session by expiring the cookie
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Json<SuccessResponse>) {
    info!("DELETE /api/login");

    let cookie = build_session_cookie(String::new(), 0, state.cookie_secure);
    (jar.add(cookie), Json(SuccessResponse::ok()))
}

/// A request carrying a valid admin session cookie
#[derive(Debug, Clone)]
pub struct AdminSession(pub SessionClaims);

#[async_trait]
impl FromRequestParts<AppState> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(ApiError::unauthorized)?;

        match state.auth_service.verify_session(&token) {
            Ok(claims) => Ok(AdminSession(claims)),
            Err(e) => {
                warn!("Rejected session for {} {}: {}", parts.method, parts.uri.path(), e);
                Err(ApiError::unauthorized())
            }
        }
    }
}
