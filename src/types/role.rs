//! Roles group permissions; users reference them by id

use crate::storage::Entity;
use crate::types::{Permission, PermissionSet, Timestamp};
use serde::{Deserialize, Serialize};

/// Named set of permissions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Role identifier
    pub id: String,
    /// Role name, expected to be unique
    pub name: String,
    /// Free-form description
    pub description: String,
    /// Granted permissions
    pub permissions: PermissionSet,
    /// Creation time
    pub created_at: Timestamp,
    /// Last modification time
    pub updated_at: Timestamp,
}

impl Role {
    /// Create a role
    pub fn new(id: impl Into<String>, name: impl Into<String>, permissions: PermissionSet, at: Timestamp) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            permissions,
            created_at: at,
            updated_at: at,
        }
    }

    /// Grant a permission
    pub fn grant(&mut self, permission: Permission, at: Timestamp) {
        self.permissions.grant(permission);
        self.updated_at = at.advance_past(self.updated_at);
    }

    /// Revoke a permission
    pub fn revoke(&mut self, permission: Permission, at: Timestamp) {
        self.permissions.revoke(permission);
        self.updated_at = at.advance_past(self.updated_at);
    }

    /// Update last modification time
    pub fn touch(&mut self, at: Timestamp) {
        self.updated_at = at.advance_past(self.updated_at);
    }
}

impl Entity for Role {
    const KIND: &'static str = "role";

    fn id(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> Timestamp {
        self.updated_at
    }
}
