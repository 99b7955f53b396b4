//! Credentials bind an authentication method to a user

use crate::storage::Entity;
use crate::types::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Authentication method a credential represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthKind {
    /// Username and password
    Password,
    /// Long-lived API key
    ApiKey,
    /// External OpenID Connect identity
    Oidc,
}

impl AuthKind {
    /// Stable string form
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthKind::Password => "password",
            AuthKind::ApiKey => "api_key",
            AuthKind::Oidc => "oidc",
        }
    }
}

impl fmt::Display for AuthKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user's credential of one [`AuthKind`]
///
/// At most one credential per (user, kind) is expected; the memory backend
/// detects violations at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Credential identifier
    pub id: String,
    /// Owning user id
    pub user_id: String,
    /// Authentication method
    pub kind: AuthKind,
    /// Operator-facing label, e.g. the API key name
    pub label: String,
    /// Last successful use
    pub last_used_at: Option<Timestamp>,
    /// Creation time
    pub created_at: Timestamp,
    /// Last modification time
    pub updated_at: Timestamp,
}

impl Credential {
    /// Create a credential
    pub fn new(id: impl Into<String>, user_id: impl Into<String>, kind: AuthKind, at: Timestamp) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            kind,
            label: String::new(),
            last_used_at: None,
            created_at: at,
            updated_at: at,
        }
    }

    /// Record a successful authentication with this credential
    pub fn record_use(&mut self, at: Timestamp) {
        self.last_used_at = Some(at);
        self.updated_at = at.advance_past(self.updated_at);
    }

    /// Update last modification time
    pub fn touch(&mut self, at: Timestamp) {
        self.updated_at = at.advance_past(self.updated_at);
    }
}

impl Entity for Credential {
    const KIND: &'static str = "credential";

    fn id(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> Timestamp {
        self.updated_at
    }
}
