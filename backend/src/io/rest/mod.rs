//! # REST API Interface Layer
//!
//! HTTP endpoints for the birthday manager, mounted under `/api`.
//! This layer handles:
//! - request/response serialization
//! - the session cookie and the export key checks
//! - translating domain errors into status codes
//! - request logging
//!
//! Each module exposes a `router()` with its routes; [`api_router`] merges
//! them. Business rules stay in the domain layer.

pub mod api_key_apis;
pub mod auth_apis;
pub mod birthday_apis;
pub mod calendar_apis;
pub mod department_apis;
pub mod error;
pub mod public_apis;
pub mod record_apis;
pub mod today_apis;

use axum::Router;

use crate::AppState;

pub use auth_apis::{AdminSession, SESSION_COOKIE};
pub use error::{ApiError, ApiResult};

/// All API routes, relative to `/api`
pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(auth_apis::router())
        .merge(birthday_apis::router())
        .merge(department_apis::router())
        .merge(today_apis::router())
        .merge(api_key_apis::router())
        .merge(public_apis::router())
        .merge(record_apis::router())
        .merge(calendar_apis::router())
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use chrono::NaiveDate;

    use crate::domain::{hash_password, FixedClock};
    use crate::storage::InMemoryStore;
    use crate::AppState;

    pub const ADMIN_PASSWORD: &str = "correct horse battery staple";
    const SESSION_SECRET: &str = "test-secret-for-session-tokens-0123456789";
    const WEEK: i64 = 7 * 24 * 60 * 60;

    /// Fresh in-memory state with the clock fixed on `date`
    pub fn test_state_on(date: NaiveDate) -> AppState {
        AppState::from_parts(
            Arc::new(InMemoryStore::new()),
            Arc::new(FixedClock::on(date)),
            &hash_password(ADMIN_PASSWORD),
            SESSION_SECRET,
            WEEK,
            chrono_tz::UTC,
            true,
        )
    }

    pub fn test_state() -> AppState {
        test_state_on(NaiveDate::from_ymd_opt(2024, 5, 20).unwrap())
    }

    /// `Cookie` header value for a logged-in admin
    pub fn session_cookie(state: &AppState) -> String {
        let token = state.auth_service.login(Some(ADMIN_PASSWORD)).unwrap();
        format!("{}={}", super::SESSION_COOKIE, token)
    }
}
