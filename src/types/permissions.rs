use crate::types::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Individual permission that can be granted through a role
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Permission {
    /// View agents and their sync state
    #[serde(rename = "agents:read")]
    AgentsRead,
    /// Register, relabel and remove agents
    #[serde(rename = "agents:write")]
    AgentsWrite,
    /// View users
    #[serde(rename = "users:read")]
    UsersRead,
    /// Create, disable and delete users
    #[serde(rename = "users:write")]
    UsersWrite,
    /// Create and edit roles
    #[serde(rename = "roles:manage")]
    RolesManage,
    /// Inspect and revoke sessions
    #[serde(rename = "sessions:manage")]
    SessionsManage,
    /// Administrative access (all permissions)
    #[serde(rename = "admin")]
    Admin,
}

impl Permission {
    /// Every permission, in declaration order
    pub const ALL: [Permission; 7] = [
        Permission::AgentsRead,
        Permission::AgentsWrite,
        Permission::UsersRead,
        Permission::UsersWrite,
        Permission::RolesManage,
        Permission::SessionsManage,
        Permission::Admin,
    ];

    /// Stable string form
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::AgentsRead => "agents:read",
            Permission::AgentsWrite => "agents:write",
            Permission::UsersRead => "users:read",
            Permission::UsersWrite => "users:write",
            Permission::RolesManage => "roles:manage",
            Permission::SessionsManage => "sessions:manage",
            Permission::Admin => "admin",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Permission::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| Error::invalid_argument(format!("unknown permission: {s}")))
    }
}

/// Set of permissions carried by a role
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet {
    /// Individual permissions granted
    permissions: BTreeSet<Permission>,
}

impl PermissionSet {
    /// Create empty permission set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create permission set with read-only access
    pub fn read_only() -> Self {
        [Permission::AgentsRead, Permission::UsersRead].into_iter().collect()
    }

    /// Create permission set for fleet operators
    pub fn operator() -> Self {
        [Permission::AgentsRead, Permission::AgentsWrite, Permission::UsersRead]
            .into_iter()
            .collect()
    }

    /// Create permission set with administrative access
    pub fn admin() -> Self {
        [Permission::Admin].into_iter().collect()
    }

    /// Add a permission to the set
    pub fn grant(&mut self, permission: Permission) {
        self.permissions.insert(permission);
    }

    /// Remove a permission from the set
    pub fn revoke(&mut self, permission: Permission) {
        self.permissions.remove(&permission);
    }

    /// Check if a specific permission is granted
    pub fn has_permission(&self, permission: Permission) -> bool {
        // Admin permission grants all others
        self.permissions.contains(&Permission::Admin) || self.permissions.contains(&permission)
    }

    /// Check if the set has admin access
    pub fn is_admin(&self) -> bool {
        self.permissions.contains(&Permission::Admin)
    }

    /// Permissions explicitly present in the set
    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        self.permissions.iter().copied()
    }

    /// Number of explicitly granted permissions
    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    /// Whether nothing is granted
    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        Self {
            permissions: iter.into_iter().collect(),
        }
    }
}
