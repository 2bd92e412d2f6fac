//! # Storage Module
//!
//! Persistence for the birthday manager. Everything the service keeps lives
//! as flat string values in a key-value store:
//!
//! - `birthdays.txt`: the full birthday text, one record per line
//! - `api_secret_key`: the key gating the public export endpoint
//!
//! The domain layer only sees the [`KeyValueStore`] trait, so the SQLite
//! backend used in production and the in-memory backend used in tests are
//! interchangeable.

pub mod memory;
pub mod sqlite;
pub mod traits;

pub use memory::InMemoryStore;
pub use sqlite::DbConnection;
pub use traits::{KeyValueStore, API_KEY_STORAGE_KEY, BIRTHDAYS_KEY};
