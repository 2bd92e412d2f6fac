//! # Configuration
//!
//! Command line flags with environment fallbacks, validated once at startup
//! into an [`AppConfig`]. A missing or malformed secret aborts startup.

use chrono_tz::Tz;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

/// `DATABASE_URL` value selecting the process-local store
pub const MEMORY_DATABASE: &str = "memory";

const MIN_SESSION_SECRET_LEN: usize = 32;

#[derive(Debug, Parser)]
#[command(name = "birthday-manager", version, about = "Birthday records admin server")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub server: ServerArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the SHA-256 hex digest to use as ADMIN_PASSWORD_HASH
    HashPassword { password: String },
}

#[derive(Debug, Clone, Args)]
pub struct ServerArgs {
    /// Address to listen on
    #[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:3000")]
    pub bind_addr: SocketAddr,

    /// SQLite URL, or `memory` for a non-persistent store
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:birthdays.db")]
    pub database_url: String,

    /// Hex SHA-256 digest of the admin password
    #[arg(long, env = "ADMIN_PASSWORD_HASH", hide_env_values = true)]
    pub admin_password_hash: Option<String>,

    /// Secret used to sign session tokens (at least 32 bytes)
    #[arg(long, env = "SESSION_SECRET", hide_env_values = true)]
    pub session_secret: Option<String>,

    /// IANA time zone that defines "today"
    #[arg(long, env = "TIMEZONE", default_value = "UTC")]
    pub timezone: String,

    #[arg(long, env = "SESSION_TTL_DAYS", default_value_t = 7)]
    pub session_ttl_days: i64,

    /// Mark the session cookie `Secure`
    #[arg(long, env = "COOKIE_SECURE", default_value_t = true, action = ArgAction::Set)]
    pub cookie_secure: bool,

    /// Origin allowed to call the API cross-site
    #[arg(long, env = "ALLOWED_ORIGIN")]
    pub allowed_origin: Option<String>,

    /// Directory of static files served outside `/api`
    #[arg(long, env = "STATIC_DIR")]
    pub static_dir: Option<PathBuf>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("ADMIN_PASSWORD_HASH is not set")]
    MissingPasswordHash,
    #[error("ADMIN_PASSWORD_HASH must be 64 hex characters")]
    InvalidPasswordHash,
    #[error("SESSION_SECRET is not set")]
    MissingSessionSecret,
    #[error("SESSION_SECRET must be at least 32 bytes, got {0}")]
    SessionSecretTooShort(usize),
    #[error("unknown time zone '{0}'")]
    UnknownTimezone(String),
    #[error("SESSION_TTL_DAYS must be positive, got {0}")]
    InvalidSessionTtl(i64),
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub admin_password_hash: String,
    pub session_secret: String,
    pub timezone: Tz,
    pub session_ttl_days: i64,
    pub cookie_secure: bool,
    pub allowed_origin: Option<String>,
    pub static_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_args(args: ServerArgs) -> Result<Self, ConfigError> {
        let admin_password_hash = args
            .admin_password_hash
            .ok_or(ConfigError::MissingPasswordHash)?;
        if admin_password_hash.len() != 64
            || !admin_password_hash.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return Err(ConfigError::InvalidPasswordHash);
        }

        let session_secret = args.session_secret.ok_or(ConfigError::MissingSessionSecret)?;
        if session_secret.len() < MIN_SESSION_SECRET_LEN {
            return Err(ConfigError::SessionSecretTooShort(session_secret.len()));
        }

        let timezone: Tz = args
            .timezone
            .parse()
            .map_err(|_| ConfigError::UnknownTimezone(args.timezone.clone()))?;

        if args.session_ttl_days <= 0 {
            return Err(ConfigError::InvalidSessionTtl(args.session_ttl_days));
        }

        Ok(Self {
            bind_addr: args.bind_addr,
            database_url: args.database_url,
            admin_password_hash,
            session_secret,
            timezone,
            session_ttl_days: args.session_ttl_days,
            cookie_secure: args.cookie_secure,
            allowed_origin: args.allowed_origin.filter(|o| !o.is_empty()),
            static_dir: args.static_dir,
        })
    }

    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_days * 24 * 60 * 60
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url == MEMORY_DATABASE
    }
}
