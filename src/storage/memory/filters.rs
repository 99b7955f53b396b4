//! Filter builders for the in-memory backend
//!
//! Every builder method appends one predicate and hands the builder back for
//! chaining. A filter matches when all of its predicates match; an empty
//! filter matches everything.

use crate::constants::MEMORY_BACKEND_TAG;
use crate::storage::filter::ListFilter;
use crate::storage::Entity;
use crate::types::{Agent, AgentStatus, AuthKind, Credential, Permission, Role, Session, Timestamp, User, Verifier};
use std::any::Any;
use std::fmt;

type BoxedPredicate<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// Ordered, AND-composed predicates over one entity kind
pub struct PredicateChain<T> {
    predicates: Vec<BoxedPredicate<T>>,
}

impl<T> PredicateChain<T> {
    fn new() -> Self {
        Self { predicates: Vec::new() }
    }

    fn push(&mut self, predicate: impl Fn(&T) -> bool + Send + Sync + 'static) {
        self.predicates.push(Box::new(predicate));
    }

    /// True only if every predicate matches
    pub fn matches(&self, entity: &T) -> bool {
        self.predicates.iter().all(|p| p(entity))
    }

    /// Number of predicates
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Whether there are no predicates
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

macro_rules! memory_filter {
    ($(#[$doc:meta])* $name:ident, $entity:ty) => {
        $(#[$doc])*
        pub struct $name {
            chain: PredicateChain<$entity>,
        }

        impl $name {
            /// Empty filter matching every entity
            pub fn new() -> Self {
                Self { chain: PredicateChain::new() }
            }

            /// True only if every predicate matches
            pub fn matches(&self, entity: &$entity) -> bool {
                self.chain.matches(entity)
            }

            /// Number of predicates
            pub fn len(&self) -> usize {
                self.chain.len()
            }

            /// Whether the filter has no predicates
            pub fn is_empty(&self) -> bool {
                self.chain.is_empty()
            }

            fn with(mut self, predicate: impl Fn(&$entity) -> bool + Send + Sync + 'static) -> Self {
                self.chain.push(predicate);
                self
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("predicates", &self.chain.len())
                    .finish()
            }
        }

        impl ListFilter for $name {
            fn backend(&self) -> &'static str {
                MEMORY_BACKEND_TAG
            }

            fn entity_kind(&self) -> &'static str {
                <$entity as Entity>::KIND
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }
    };
}

memory_filter!(
    /// Filter over agents
    AgentFilter,
    Agent
);
memory_filter!(
    /// Filter over users
    UserFilter,
    User
);
memory_filter!(
    /// Filter over roles
    RoleFilter,
    Role
);
memory_filter!(
    /// Filter over credentials
    CredentialFilter,
    Credential
);
memory_filter!(
    /// Filter over verifiers
    VerifierFilter,
    Verifier
);
memory_filter!(
    /// Filter over sessions
    SessionFilter,
    Session
);

impl AgentFilter {
    /// Agents on `platform`
    pub fn by_platform(self, platform: impl Into<String>) -> Self {
        let platform = platform.into();
        self.with(move |a| a.platform == platform)
    }

    /// Agents carrying label `key=value`
    pub fn by_label(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let (key, value) = (key.into(), value.into());
        self.with(move |a| a.labels.get(&key) == Some(&value))
    }

    /// Agents named `name`
    pub fn by_name(self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.with(move |a| a.name == name)
    }

    /// Agents whose last reported status is `status`
    pub fn by_status(self, status: AgentStatus) -> Self {
        self.with(move |a| a.status == status)
    }

    /// Agents that synced at or after `since`
    pub fn by_seen_since(self, since: Timestamp) -> Self {
        self.with(move |a| a.last_seen_at.is_some_and(|seen| seen >= since))
    }
}

impl UserFilter {
    /// Users with `email`, compared case-insensitively
    pub fn by_email(self, email: impl Into<String>) -> Self {
        let email = email.into();
        self.with(move |u| u.email.eq_ignore_ascii_case(&email))
    }

    /// Users whose disabled flag equals `disabled`
    pub fn by_disabled(self, disabled: bool) -> Self {
        self.with(move |u| u.disabled == disabled)
    }

    /// Users assigned role `role_id`
    pub fn by_role_id(self, role_id: impl Into<String>) -> Self {
        let role_id = role_id.into();
        self.with(move |u| u.role_ids.iter().any(|r| *r == role_id))
    }

    /// Users with identity subject `subject`
    pub fn by_subject(self, subject: impl Into<String>) -> Self {
        let subject = subject.into();
        self.with(move |u| u.subject == subject)
    }
}

impl RoleFilter {
    /// Roles named `name`
    pub fn by_name(self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.with(move |r| r.name == name)
    }

    /// Roles granting `permission`, directly or through `admin`
    pub fn by_permission(self, permission: Permission) -> Self {
        self.with(move |r| r.permissions.has_permission(permission))
    }
}

impl CredentialFilter {
    /// Credentials owned by `user_id`
    pub fn by_user_id(self, user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        self.with(move |c| c.user_id == user_id)
    }

    /// Credentials of `kind`
    pub fn by_kind(self, kind: AuthKind) -> Self {
        self.with(move |c| c.kind == kind)
    }
}

impl VerifierFilter {
    /// Verifiers for `credential_id`
    pub fn by_credential_id(self, credential_id: impl Into<String>) -> Self {
        let credential_id = credential_id.into();
        self.with(move |v| v.credential_id == credential_id)
    }

    /// Verifiers using `algorithm`
    pub fn by_algorithm(self, algorithm: impl Into<String>) -> Self {
        let algorithm = algorithm.into();
        self.with(move |v| v.algorithm == algorithm)
    }
}

impl SessionFilter {
    /// Sessions of `user_id`
    pub fn by_user_id(self, user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        self.with(move |s| s.user_id == user_id)
    }

    /// Sessions opened with `credential_id`
    pub fn by_credential_id(self, credential_id: impl Into<String>) -> Self {
        let credential_id = credential_id.into();
        self.with(move |s| s.credential_id == credential_id)
    }

    /// Sessions whose revoked state equals `revoked`
    pub fn by_revoked(self, revoked: bool) -> Self {
        self.with(move |s| s.is_revoked() == revoked)
    }

    /// Sessions usable at `now`: not revoked and not expired
    pub fn by_active_at(self, now: Timestamp) -> Self {
        self.with(move |s| s.is_active_at(now))
    }
}
