use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;
use std::sync::Arc;
use tracing::{info, warn};

use super::session::{SessionClaims, SessionError, SessionSigner};
use super::today::Clock;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoginError {
    #[error("Password is required")]
    MissingPassword,
    #[error("Invalid password")]
    InvalidPassword,
}

/// Lowercase hex SHA-256 digest of `password`
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Admin login and session checks
#[derive(Clone)]
pub struct AuthService {
    password_hash: String,
    signer: SessionSigner,
    clock: Arc<dyn Clock>,
}

impl AuthService {
    /// `password_hash` is the hex SHA-256 digest of the admin password
    pub fn new(password_hash: &str, signer: SessionSigner, clock: Arc<dyn Clock>) -> Self {
        Self {
            password_hash: password_hash.to_ascii_lowercase(),
            signer,
            clock,
        }
    }

    pub fn session_ttl_seconds(&self) -> i64 {
        self.signer.ttl_seconds()
    }

    fn password_matches(&self, password: &str) -> bool {
        let candidate = hash_password(password);
        candidate.as_bytes().ct_eq(self.password_hash.as_bytes()).into()
    }

    /// Check the admin password and issue a session token
    pub fn login(&self, password: Option<&str>) -> Result<String, LoginError> {
        let password = password
            .filter(|p| !p.is_empty())
            .ok_or(LoginError::MissingPassword)?;

        if !self.password_matches(password) {
            warn!("Rejected admin login attempt");
            return Err(LoginError::InvalidPassword);
        }

        let token = self.signer.issue(self.clock.now().timestamp());
        info!("Admin session issued");
        Ok(token)
    }

    /// Validate a session token taken from the cookie
    pub fn verify_session(&self, token: &str) -> Result<SessionClaims, SessionError> {
        self.signer.verify(token, self.clock.now().timestamp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FixedClock;
    use chrono::{Duration, NaiveDate};

    const SECRET: &str = "test-session-secret-with-32-bytes-min";

    fn clock() -> FixedClock {
        FixedClock::on(NaiveDate::from_ymd_opt(2024, 5, 20).unwrap())
    }

    fn service_at(clock: FixedClock) -> AuthService {
        AuthService::new(&hash_password("hunter2"), SessionSigner::new(SECRET, 3600), Arc::new(clock))
    }

    fn service() -> AuthService {
        service_at(clock())
    }

    #[test]
    fn test_hash_password_is_hex_sha256() {
        assert_eq!(
            hash_password("password"),
            "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8"
        );
    }

    #[test]
    fn test_login_with_correct_password() {
        let service = service();
        let token = service.login(Some("hunter2")).unwrap();
        let claims = service.verify_session(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_uppercase_configured_hash_is_accepted() {
        let service = AuthService::new(
            &hash_password("hunter2").to_uppercase(),
            SessionSigner::new(SECRET, 3600),
            Arc::new(clock()),
        );
        assert!(service.login(Some("hunter2")).is_ok());
    }

    #[test]
    fn test_login_rejects_wrong_or_missing_password() {
        let service = service();
        assert_eq!(service.login(Some("hunter3")), Err(LoginError::InvalidPassword));
        assert_eq!(service.login(Some("")), Err(LoginError::MissingPassword));
        assert_eq!(service.login(None), Err(LoginError::MissingPassword));
    }

    #[test]
    fn test_verify_rejects_foreign_token() {
        let other = AuthService::new(
            &hash_password("hunter2"),
            SessionSigner::new("a-completely-different-secret-value", 3600),
            Arc::new(clock()),
        );
        let token = other.login(Some("hunter2")).unwrap();
        assert_eq!(service().verify_session(&token), Err(SessionError::BadSignature));
    }

    #[test]
    fn test_session_follows_the_clock() {
        let token = service().login(Some("hunter2")).unwrap();
        let issued_at = clock().0;

        let claims = service().verify_session(&token).unwrap();
        assert_eq!(claims.iat, issued_at.timestamp());

        let almost = service_at(FixedClock(issued_at + Duration::seconds(3599)));
        assert!(almost.verify_session(&token).is_ok());

        let later = service_at(FixedClock(issued_at + Duration::seconds(3600)));
        assert_eq!(later.verify_session(&token), Err(SessionError::Expired));
    }
}
