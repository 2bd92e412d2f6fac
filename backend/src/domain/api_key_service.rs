//! # API Key Service
//!
//! Manages the single static key that gates the public text export.
//! The key is 16 ASCII alphanumerics, stored under `api_secret_key`.
//! Setting a new key replaces the old one immediately.

use anyhow::Result;
use once_cell::sync::Lazy;
use rand::{distributions::Alphanumeric, Rng};
use regex::Regex;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::{info, warn};

use crate::storage::{KeyValueStore, API_KEY_STORAGE_KEY};

pub const API_KEY_LENGTH: usize = 16;

const PUBLIC_ENDPOINT: &str = "/api/public/birthdays";

static API_KEY_FORMAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]{16}$").expect("API key pattern compiles"));

#[derive(Debug, Error)]
pub enum ApiKeyError {
    #[error("Custom key must be exactly 16 letters or digits")]
    InvalidFormat,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Why a public export request was turned away
#[derive(Debug, Error)]
pub enum PublicAccessError {
    #[error("Missing key")]
    MissingKey,
    #[error("API key not configured")]
    NotConfigured,
    #[error("Invalid key")]
    Mismatch,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Whether `key` has the accepted shape
pub fn is_valid_api_key(key: &str) -> bool {
    API_KEY_FORMAT.is_match(key)
}

/// A fresh random key
pub fn generate_api_key() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(API_KEY_LENGTH)
        .map(char::from)
        .collect()
}

/// Relative URL clients use to fetch the export with `key`
pub fn endpoint_for(key: &str) -> String {
    format!("{}?m={}", PUBLIC_ENDPOINT, key)
}

#[derive(Clone)]
pub struct ApiKeyService {
    store: Arc<dyn KeyValueStore>,
}

impl ApiKeyService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The stored key, if one is configured
    pub async fn current(&self) -> Result<Option<String>> {
        self.store.get(API_KEY_STORAGE_KEY).await
    }

    /// Store `custom` (when non-empty) or a freshly generated key
    pub async fn rotate(&self, custom: Option<&str>) -> Result<String, ApiKeyError> {
        let key = match custom.filter(|k| !k.is_empty()) {
            Some(custom) if is_valid_api_key(custom) => custom.to_string(),
            Some(_) => {
                warn!("Rejected malformed custom API key");
                return Err(ApiKeyError::InvalidFormat);
            }
            None => generate_api_key(),
        };

        self.store.put(API_KEY_STORAGE_KEY, &key).await?;
        info!("API key rotated");
        Ok(key)
    }

    /// Remove the key; the public export is closed until a new one is set
    pub async fn revoke(&self) -> Result<()> {
        let existed = self.store.delete(API_KEY_STORAGE_KEY).await?;
        info!("API key revoked (existed: {})", existed);
        Ok(())
    }

    /// Check the `m` query value against the stored key
    pub async fn authorize(&self, presented: Option<&str>) -> Result<(), PublicAccessError> {
        let presented = presented
            .filter(|k| !k.is_empty())
            .ok_or(PublicAccessError::MissingKey)?;

        let stored = self
            .current()
            .await?
            .ok_or(PublicAccessError::NotConfigured)?;

        if bool::from(presented.as_bytes().ct_eq(stored.as_bytes())) {
            Ok(())
        } else {
            Err(PublicAccessError::Mismatch)
        }
    }
}
