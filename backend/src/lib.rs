//! # Birthday Manager Backend
//!
//! Admin service for a plain-text list of birthdays, with matching against
//! both the solar and the Chinese lunar calendar.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (REST handlers, session cookie, export key)
//!     ↓
//! Domain Layer (codec, departments, today matching, services)
//!     ↓
//! Storage Layer (key-value store: SQLite or in-memory)
//! ```
//!
//! [`initialize_backend`] wires the layers from an [`AppConfig`] and
//! [`create_router`] builds the HTTP surface.

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use std::sync::Arc;

use anyhow::Result;
use axum::{
    http::{HeaderValue, Method},
    Router,
};
use chrono_tz::Tz;
use tower_http::{
    cors::{AllowHeaders, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{info, warn};

pub use config::AppConfig;

use domain::{ApiKeyService, AuthService, BirthdayService, Clock, SessionSigner, SystemClock, TodayService};
use storage::{DbConnection, InMemoryStore, KeyValueStore};

/// Services shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub birthday_service: BirthdayService,
    pub api_key_service: ApiKeyService,
    pub auth_service: AuthService,
    pub today_service: TodayService,
    pub cookie_secure: bool,
}

impl AppState {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, config: &AppConfig) -> Self {
        Self::from_parts(
            store,
            clock,
            &config.admin_password_hash,
            &config.session_secret,
            config.session_ttl_seconds(),
            config.timezone,
            config.cookie_secure,
        )
    }

    pub fn from_parts(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        password_hash: &str,
        session_secret: &str,
        session_ttl_seconds: i64,
        timezone: Tz,
        cookie_secure: bool,
    ) -> Self {
        let signer = SessionSigner::new(session_secret.as_bytes(), session_ttl_seconds);
        Self {
            birthday_service: BirthdayService::new(store.clone()),
            api_key_service: ApiKeyService::new(store),
            auth_service: AuthService::new(password_hash, signer, clock.clone()),
            today_service: TodayService::new(clock, timezone),
            cookie_secure,
        }
    }
}

/// Open the store selected by the configuration
pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn KeyValueStore>> {
    if config.uses_memory_store() {
        warn!("Using in-memory store; data is lost on exit");
        return Ok(Arc::new(InMemoryStore::new()));
    }

    let db = DbConnection::new(&config.database_url).await?;
    let keys = db.list_keys().await?;
    info!("Opened {} with keys {:?}", config.database_url, keys);
    Ok(Arc::new(db))
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    info!("Setting up storage");
    let store = open_store(config).await?;

    info!("Setting up domain services (time zone {})", config.timezone);
    Ok(AppState::new(store, Arc::new(SystemClock), config))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState, config: &AppConfig) -> Router {
    let mut app = Router::new().nest("/api", io::rest::api_router());

    if let Some(dir) = &config.static_dir {
        info!("Serving static files from {}", dir.display());
        app = app.fallback_service(ServeDir::new(dir));
    }

    if let Some(origin) = &config.allowed_origin {
        match origin.parse::<HeaderValue>() {
            Ok(origin) => {
                let cors = CorsLayer::new()
                    .allow_origin(origin)
                    .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                    .allow_headers(AllowHeaders::mirror_request())
                    .allow_credentials(true);
                app = app.layer(cors);
            }
            Err(e) => warn!("Ignoring invalid ALLOWED_ORIGIN {:?}: {}", origin, e),
        }
    }

    app.layer(TraceLayer::new_for_http()).with_state(app_state)
}
