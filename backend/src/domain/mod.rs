//! # Domain Layer
//!
//! Business logic for the birthday manager, independent of HTTP and of the
//! storage engine.
//!
//! ## Components
//!
//! - **codec**: flat text <-> [`shared::BirthdayRecord`]
//! - **departments**: department list and bulk removal
//! - **lunar**: solar/lunar calendar conversion
//! - **today**: "whose birthday is today" for both calendars
//! - **session** / **auth_service**: admin password and session tokens
//! - **api_key_service**: the static key for the public export
//! - **birthday_service**: reads and edits of the stored text
//!
//! Services hold an `Arc<dyn KeyValueStore>` handed in at construction.

pub mod api_key_service;
pub mod auth_service;
pub mod birthday_service;
pub mod codec;
pub mod departments;
pub mod lunar;
pub mod session;
pub mod today;

pub use api_key_service::{ApiKeyError, ApiKeyService, PublicAccessError};
pub use auth_service::{hash_password, AuthService, LoginError};
pub use birthday_service::{BirthdayService, RecordError};
pub use lunar::CalendarError;
pub use session::{SessionClaims, SessionError, SessionSigner};
pub use today::{Clock, FixedClock, ReferenceDate, SystemClock, TodayService};
