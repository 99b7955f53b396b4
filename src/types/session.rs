//! Login sessions and their refresh-token state machine
//!
//! A session starts `Active`. While active its refresh hash and expiry may be
//! rotated any number of times. Revocation is terminal.

use crate::storage::Entity;
use crate::types::error::Error;
use crate::types::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Session may be refreshed
    Active,
    /// Session was revoked; terminal
    Revoked,
}

/// Field-level validation failures raised by session setters
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Refresh hash was empty
    #[error("refresh hash must not be empty")]
    EmptyRefreshHash,

    /// Expiry was the zero timestamp
    #[error("expiry must be set")]
    ZeroExpiry,

    /// Revocation time was the zero timestamp
    #[error("revocation time must be set")]
    ZeroRevocationTime,

    /// Session is already revoked
    #[error("session {0} is revoked")]
    Revoked(String),
}

impl From<SessionError> for Error {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Revoked(_) => Error::conflict(err.to_string()),
            _ => Error::invalid_argument(err.to_string()),
        }
    }
}

/// Hex-encoded BLAKE3 digest of a refresh token
///
/// Only the digest is persisted; the token itself never reaches the store.
pub fn hash_refresh_token(token: &str) -> String {
    hex::encode(blake3::hash(token.as_bytes()).as_bytes())
}

/// An authenticated login session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Session identifier
    pub id: String,
    /// Authenticated user
    pub user_id: String,
    /// Credential used to log in
    pub credential_id: String,
    /// Digest of the current refresh token
    pub refresh_hash: String,
    /// When the current refresh token expires
    pub expires_at: Timestamp,
    /// Set once revoked
    pub revoked_at: Option<Timestamp>,
    /// Client user agent at login
    pub user_agent: String,
    /// Login time
    pub created_at: Timestamp,
    /// Last modification time
    pub updated_at: Timestamp,
}

impl Session {
    /// Create an active session
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        credential_id: impl Into<String>,
        refresh_hash: impl Into<String>,
        expires_at: Timestamp,
        at: Timestamp,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            credential_id: credential_id.into(),
            refresh_hash: refresh_hash.into(),
            expires_at,
            revoked_at: None,
            user_agent: String::new(),
            created_at: at,
            updated_at: at,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        if self.revoked_at.is_some() {
            SessionState::Revoked
        } else {
            SessionState::Active
        }
    }

    /// Whether the session is revoked
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Whether the session can be used at `now`
    pub fn is_active_at(&self, now: Timestamp) -> bool {
        !self.is_revoked() && now < self.expires_at
    }

    /// Replace the refresh hash and expiry
    pub fn rotate_refresh(&mut self, refresh_hash: impl Into<String>, expires_at: Timestamp, at: Timestamp) -> Result<(), SessionError> {
        let refresh_hash = refresh_hash.into();
        if self.is_revoked() {
            return Err(SessionError::Revoked(self.id.clone()));
        }
        if refresh_hash.is_empty() {
            return Err(SessionError::EmptyRefreshHash);
        }
        if expires_at.is_zero() {
            return Err(SessionError::ZeroExpiry);
        }
        self.refresh_hash = refresh_hash;
        self.expires_at = expires_at;
        self.updated_at = at.advance_past(self.updated_at);
        Ok(())
    }

    /// Revoke the session
    pub fn revoke(&mut self, at: Timestamp) -> Result<(), SessionError> {
        if self.is_revoked() {
            return Err(SessionError::Revoked(self.id.clone()));
        }
        if at.is_zero() {
            return Err(SessionError::ZeroRevocationTime);
        }
        self.revoked_at = Some(at);
        self.updated_at = at.advance_past(self.updated_at);
        Ok(())
    }
}

impl Entity for Session {
    const KIND: &'static str = "session";

    fn id(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> Timestamp {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorKind;

    fn session() -> Session {
        Session::new("s1", "u1", "c1", "h0", Timestamp::from_millis(100), Timestamp::from_millis(1))
    }

    #[test]
    fn rotate_while_active() {
        let mut s = session();
        s.rotate_refresh("h1", Timestamp::from_millis(200), Timestamp::from_millis(2)).unwrap();
        s.rotate_refresh("h2", Timestamp::from_millis(300), Timestamp::from_millis(3)).unwrap();
        assert_eq!(s.refresh_hash, "h2");
        assert_eq!(s.expires_at, Timestamp::from_millis(300));
        assert_eq!(s.state(), SessionState::Active);
    }

    #[test]
    fn rotate_validation() {
        let mut s = session();
        assert_eq!(
            s.rotate_refresh("", Timestamp::from_millis(200), Timestamp::from_millis(2)),
            Err(SessionError::EmptyRefreshHash)
        );
        assert_eq!(
            s.rotate_refresh("h1", Timestamp::ZERO, Timestamp::from_millis(2)),
            Err(SessionError::ZeroExpiry)
        );
        assert_eq!(s.refresh_hash, "h0");
    }

    #[test]
    fn revoked_is_terminal() {
        let mut s = session();
        assert_eq!(s.revoke(Timestamp::ZERO), Err(SessionError::ZeroRevocationTime));
        s.revoke(Timestamp::from_millis(5)).unwrap();
        assert_eq!(s.state(), SessionState::Revoked);
        assert!(!s.is_active_at(Timestamp::from_millis(6)));

        let err = s.rotate_refresh("h1", Timestamp::from_millis(200), Timestamp::from_millis(7)).unwrap_err();
        assert_eq!(Error::from(err).kind(), ErrorKind::Conflict);
        let err = s.revoke(Timestamp::from_millis(8)).unwrap_err();
        assert_eq!(Error::from(err).kind(), ErrorKind::Conflict);
    }

    #[test]
    fn revoke_with_stale_time_still_advances_updated_at() {
        let mut equal = session();
        equal.revoke(Timestamp::from_millis(1)).unwrap();
        assert_eq!(equal.revoked_at, Some(Timestamp::from_millis(1)));
        assert!(equal.updated_at > Timestamp::from_millis(1));

        let mut older = session();
        older.rotate_refresh("h1", Timestamp::from_millis(200), Timestamp::from_millis(50)).unwrap();
        older.revoke(Timestamp::from_millis(5)).unwrap();
        assert_eq!(older.revoked_at, Some(Timestamp::from_millis(5)));
        assert!(older.updated_at > Timestamp::from_millis(50));
    }

    #[test]
    fn validation_errors_map_to_invalid_argument() {
        assert_eq!(Error::from(SessionError::EmptyRefreshHash).kind(), ErrorKind::InvalidArgument);
        assert_eq!(Error::from(SessionError::ZeroExpiry).kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn refresh_hash_is_stable_hex() {
        let a = hash_refresh_token("token-1");
        assert_eq!(a.len(), 64);
        assert_eq!(a, hash_refresh_token("token-1"));
        assert_ne!(a, hash_refresh_token("token-2"));
    }
}
