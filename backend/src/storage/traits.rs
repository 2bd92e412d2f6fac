//! # Storage Traits
//!
//! The storage capability handed to every service at construction time.

use anyhow::Result;
use async_trait::async_trait;

/// Key holding the birthday text blob
pub const BIRTHDAYS_KEY: &str = "birthdays.txt";

/// Key holding the public export API key
pub const API_KEY_STORAGE_KEY: &str = "api_secret_key";

/// Flat string key-value storage.
///
/// Writes overwrite unconditionally; there is no versioning, so concurrent
/// writers to the same key are last-write-wins.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Retrieve a value by its key
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value, replacing any existing value for the key
    async fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value by its key.
    /// Returns true if the key existed
    async fn delete(&self, key: &str) -> Result<bool>;
}
