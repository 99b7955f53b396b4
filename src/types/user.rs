use crate::storage::Entity;
use crate::types::Timestamp;
use serde::{Deserialize, Serialize};

/// An operator account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User identifier
    pub id: String,

    /// External identity subject, expected to be unique
    pub subject: String,

    /// Contact email
    pub email: String,

    /// Display name for UI
    pub display_name: String,

    /// Ids of the roles assigned to this user
    pub role_ids: Vec<String>,

    /// Disabled accounts cannot authenticate
    pub disabled: bool,

    /// Last successful login
    pub last_login_at: Option<Timestamp>,

    /// When user account was created
    pub created_at: Timestamp,

    /// Last modification time
    pub updated_at: Timestamp,
}

impl User {
    /// Create a new, enabled user with no roles
    pub fn new(id: impl Into<String>, subject: impl Into<String>, email: impl Into<String>, at: Timestamp) -> Self {
        Self {
            id: id.into(),
            subject: subject.into(),
            email: email.into(),
            display_name: String::new(),
            role_ids: Vec::new(),
            disabled: false,
            last_login_at: None,
            created_at: at,
            updated_at: at,
        }
    }

    /// Assign a role; assigning twice is a no-op
    pub fn assign_role(&mut self, role_id: impl Into<String>, at: Timestamp) {
        let role_id = role_id.into();
        if !self.role_ids.contains(&role_id) {
            self.role_ids.push(role_id);
            self.updated_at = at.advance_past(self.updated_at);
        }
    }

    /// Remove a role assignment
    pub fn unassign_role(&mut self, role_id: &str, at: Timestamp) {
        let before = self.role_ids.len();
        self.role_ids.retain(|r| r != role_id);
        if self.role_ids.len() != before {
            self.updated_at = at.advance_past(self.updated_at);
        }
    }

    /// Enable or disable the account
    pub fn set_disabled(&mut self, disabled: bool, at: Timestamp) {
        self.disabled = disabled;
        self.updated_at = at.advance_past(self.updated_at);
    }

    /// Record a successful login
    pub fn record_login(&mut self, at: Timestamp) {
        self.last_login_at = Some(at);
        self.updated_at = at.advance_past(self.updated_at);
    }

    /// Update last modification time
    pub fn touch(&mut self, at: Timestamp) {
        self.updated_at = at.advance_past(self.updated_at);
    }

    /// Check if user is active
    pub fn is_active(&self) -> bool {
        !self.disabled
    }
}

impl Entity for User {
    const KIND: &'static str = "user";

    fn id(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> Timestamp {
        self.updated_at
    }
}
