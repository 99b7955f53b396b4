//! Type definitions for the fleet store
//!
//! This module contains the domain entities and the shared error and time
//! types, organized by category.

/// System-wide error types
pub mod error;
/// Identifier helpers
pub mod ids;
/// Timestamps
pub mod timestamp;
/// Permission types
pub mod permissions;
/// Agent types
pub mod agent;
/// User types
pub mod user;
/// Role types
pub mod role;
/// Credential types
pub mod credential;
/// Verifier types
pub mod verifier;
/// Session types
pub mod session;

// Re-export commonly used types for convenience
pub use error::{Error, ErrorKind, Result};
pub use ids::new_id;
pub use timestamp::Timestamp;
pub use permissions::{Permission, PermissionSet};
pub use agent::{Agent, AgentStatus, SyncReport};
pub use user::User;
pub use role::Role;
pub use credential::{AuthKind, Credential};
pub use verifier::Verifier;
pub use session::{hash_refresh_token, Session, SessionError, SessionState};
