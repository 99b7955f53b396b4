//! Verifiers hold the material used to check a credential

use crate::storage::Entity;
use crate::types::error::{Error, Result};
use crate::types::Timestamp;
use serde::{Deserialize, Serialize};

/// Verification material for one credential, e.g. a PHC-formatted password hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verifier {
    /// Verifier identifier
    pub id: String,
    /// Credential this verifier checks, expected to be unique
    pub credential_id: String,
    /// Algorithm name, e.g. `argon2id`
    pub algorithm: String,
    /// Encoded digest; never the secret itself
    pub digest: String,
    /// Creation time
    pub created_at: Timestamp,
    /// Last modification time
    pub updated_at: Timestamp,
}

impl Verifier {
    /// Create a verifier
    pub fn new(
        id: impl Into<String>,
        credential_id: impl Into<String>,
        algorithm: impl Into<String>,
        digest: impl Into<String>,
        at: Timestamp,
    ) -> Self {
        Self {
            id: id.into(),
            credential_id: credential_id.into(),
            algorithm: algorithm.into(),
            digest: digest.into(),
            created_at: at,
            updated_at: at,
        }
    }

    /// Replace the digest, e.g. after a password change or rehash
    pub fn replace_digest(&mut self, algorithm: impl Into<String>, digest: impl Into<String>, at: Timestamp) -> Result<()> {
        let digest = digest.into();
        if digest.is_empty() {
            return Err(Error::invalid_argument("verifier digest must not be empty"));
        }
        if at.is_zero() {
            return Err(Error::invalid_argument("verifier update time must be set"));
        }
        self.algorithm = algorithm.into();
        self.digest = digest;
        self.updated_at = at.advance_past(self.updated_at);
        Ok(())
    }

    /// Update last modification time
    pub fn touch(&mut self, at: Timestamp) {
        self.updated_at = at.advance_past(self.updated_at);
    }
}

impl Entity for Verifier {
    const KIND: &'static str = "verifier";

    fn id(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> Timestamp {
        self.updated_at
    }
}
