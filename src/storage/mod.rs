//! Storage layer for the fleet store
//!
//! This module provides the storage abstraction that the service layer calls
//! into: one [`Storage`] aggregate per backend, exposing a CRUD + list surface
//! per entity kind plus the derived uniqueness lookups.
//!
//! Uniqueness (user subject, role name, one credential per user and kind, one
//! verifier per credential) is not enforced on write. Lookups probe for a
//! second match and report duplicates as `Internal`, since they mean a broken
//! invariant rather than a caller error.
//!
//! No operation spans more than one entity kind. Callers that cascade (for
//! example deleting a user and then its sessions) issue independent calls and
//! must tolerate partial completion.

/// Entity contract
pub mod entity;

/// Cancellation context
pub mod context;

/// Pagination cursors
pub mod cursor;

/// List options and results
pub mod page;

/// Backend-typed list filters
pub mod filter;

/// In-memory backend
pub mod memory;

/// Backend construction from configuration
pub mod factory;

pub use context::Context;
pub use cursor::{Cursor, CursorCodec};
pub use entity::Entity;
pub use factory::create_storage;
pub use filter::ListFilter;
pub use memory::MemoryStorage;
pub use page::{ListOptions, ListResult, PageLimits};

use crate::types::{Agent, AuthKind, Credential, Result, Role, Session, SyncReport, Timestamp, User, Verifier};

/// Aggregate storage interface over every entity kind
///
/// List methods take the backend's own filter builder for the entity kind as
/// `&dyn ListFilter`; any other filter type fails with `InvalidArgument`.
pub trait Storage: Send + Sync {
    /// Backend name, e.g. `memory`
    fn backend(&self) -> &'static str;

    // Agents

    /// Insert a new agent
    fn create_agent(&self, ctx: &Context, agent: &Agent) -> Result<()>;
    /// Insert or replace an agent
    fn upsert_agent(&self, ctx: &Context, agent: &Agent) -> Result<()>;
    /// Fetch an agent
    fn get_agent(&self, ctx: &Context, id: &str) -> Result<Agent>;
    /// List agents
    fn list_agents(&self, ctx: &Context, filter: Option<&dyn ListFilter>, options: &ListOptions) -> Result<ListResult<Agent>>;
    /// Delete an agent
    fn delete_agent(&self, ctx: &Context, id: &str) -> Result<()>;
    /// Apply a sync report to an agent atomically
    fn record_agent_sync(&self, ctx: &Context, id: &str, report: SyncReport) -> Result<Agent>;

    // Users

    /// Insert a new user
    fn create_user(&self, ctx: &Context, user: &User) -> Result<()>;
    /// Insert or replace a user
    fn upsert_user(&self, ctx: &Context, user: &User) -> Result<()>;
    /// Fetch a user
    fn get_user(&self, ctx: &Context, id: &str) -> Result<User>;
    /// Fetch users in caller order, duplicates included
    fn get_users(&self, ctx: &Context, ids: &[String]) -> Result<Vec<User>>;
    /// Fetch the single user with identity subject `subject`
    fn get_user_by_subject(&self, ctx: &Context, subject: &str) -> Result<User>;
    /// List users
    fn list_users(&self, ctx: &Context, filter: Option<&dyn ListFilter>, options: &ListOptions) -> Result<ListResult<User>>;
    /// Delete a user
    fn delete_user(&self, ctx: &Context, id: &str) -> Result<()>;

    // Roles

    /// Insert a new role
    fn create_role(&self, ctx: &Context, role: &Role) -> Result<()>;
    /// Insert or replace a role
    fn upsert_role(&self, ctx: &Context, role: &Role) -> Result<()>;
    /// Fetch a role
    fn get_role(&self, ctx: &Context, id: &str) -> Result<Role>;
    /// Fetch roles in caller order, duplicates included
    fn get_roles(&self, ctx: &Context, ids: &[String]) -> Result<Vec<Role>>;
    /// Fetch the single role named `name`
    fn get_role_by_name(&self, ctx: &Context, name: &str) -> Result<Role>;
    /// List roles
    fn list_roles(&self, ctx: &Context, filter: Option<&dyn ListFilter>, options: &ListOptions) -> Result<ListResult<Role>>;
    /// Delete a role
    fn delete_role(&self, ctx: &Context, id: &str) -> Result<()>;

    // Credentials

    /// Insert a new credential
    fn create_credential(&self, ctx: &Context, credential: &Credential) -> Result<()>;
    /// Insert or replace a credential
    fn upsert_credential(&self, ctx: &Context, credential: &Credential) -> Result<()>;
    /// Fetch a credential
    fn get_credential(&self, ctx: &Context, id: &str) -> Result<Credential>;
    /// Fetch the single credential of `kind` owned by `user_id`
    fn get_credential_by_user_and_auth(&self, ctx: &Context, user_id: &str, kind: AuthKind) -> Result<Credential>;
    /// List credentials
    fn list_credentials(&self, ctx: &Context, filter: Option<&dyn ListFilter>, options: &ListOptions) -> Result<ListResult<Credential>>;
    /// Delete a credential
    fn delete_credential(&self, ctx: &Context, id: &str) -> Result<()>;

    // Verifiers

    /// Insert a new verifier
    fn create_verifier(&self, ctx: &Context, verifier: &Verifier) -> Result<()>;
    /// Insert or replace a verifier
    fn upsert_verifier(&self, ctx: &Context, verifier: &Verifier) -> Result<()>;
    /// Fetch a verifier
    fn get_verifier(&self, ctx: &Context, id: &str) -> Result<Verifier>;
    /// Fetch the single verifier for `credential_id`
    fn get_verifier_by_credential(&self, ctx: &Context, credential_id: &str) -> Result<Verifier>;
    /// List verifiers
    fn list_verifiers(&self, ctx: &Context, filter: Option<&dyn ListFilter>, options: &ListOptions) -> Result<ListResult<Verifier>>;
    /// Delete a verifier
    fn delete_verifier(&self, ctx: &Context, id: &str) -> Result<()>;

    // Sessions

    /// Insert a new session
    fn create_session(&self, ctx: &Context, session: &Session) -> Result<()>;
    /// Insert or replace a session
    fn upsert_session(&self, ctx: &Context, session: &Session) -> Result<()>;
    /// Fetch a session
    fn get_session(&self, ctx: &Context, id: &str) -> Result<Session>;
    /// List sessions
    fn list_sessions(&self, ctx: &Context, filter: Option<&dyn ListFilter>, options: &ListOptions) -> Result<ListResult<Session>>;
    /// Replace a session's refresh hash and expiry; fails once revoked
    fn rotate_refresh(&self, ctx: &Context, id: &str, refresh_hash: &str, expires_at: Timestamp) -> Result<Session>;
    /// Revoke a session at `at`; revocation is terminal
    fn revoke_session(&self, ctx: &Context, id: &str, at: Timestamp) -> Result<Session>;
    /// Delete a session
    fn delete_session(&self, ctx: &Context, id: &str) -> Result<()>;
}
