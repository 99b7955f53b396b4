//! In-memory storage backend
//!
//! Six independent [`GenericStore`]s, one per entity kind, each behind its own
//! lock, so agent traffic never contends with user or session traffic.
//! Nothing survives a restart.

/// Generic lock-protected entity store
pub mod generic;

/// Filter builders for this backend
pub mod filters;

#[cfg(test)]
mod tests;

pub use filters::{AgentFilter, CredentialFilter, RoleFilter, SessionFilter, UserFilter, VerifierFilter};
pub use generic::GenericStore;

use crate::constants::{MEMORY_BACKEND_TAG, SCAN_BATCH_SIZE, UNIQUE_PROBE_LIMIT};
use crate::core::config::StorageConfig;
use crate::storage::filter::{downcast_filter, ListFilter};
use crate::storage::{Context, CursorCodec, Entity, ListOptions, ListResult, PageLimits, Storage};
use crate::types::{
    Agent, AuthKind, Credential, Error, Result, Role, Session, SyncReport, Timestamp, User, Verifier,
};

/// In-memory implementation of [`Storage`]
pub struct MemoryStorage {
    agents: GenericStore<Agent>,
    users: GenericStore<User>,
    roles: GenericStore<Role>,
    credentials: GenericStore<Credential>,
    verifiers: GenericStore<Verifier>,
    sessions: GenericStore<Session>,
}

impl MemoryStorage {
    /// Create an empty storage with default page limits
    pub fn new() -> Self {
        Self::with_settings(PageLimits::default(), SCAN_BATCH_SIZE)
    }

    /// Create an empty storage from configuration
    pub fn with_config(config: &StorageConfig) -> Self {
        let limits = PageLimits {
            default_size: config.default_page_size,
            max_size: config.max_page_size,
        };
        Self::with_settings(limits, config.scan_batch_size)
    }

    /// Create an empty storage with explicit page limits and scan batch size
    pub fn with_settings(limits: PageLimits, scan_batch: usize) -> Self {
        let codec = CursorCodec::memory();
        Self {
            agents: GenericStore::with_settings(codec, limits, scan_batch),
            users: GenericStore::with_settings(codec, limits, scan_batch),
            roles: GenericStore::with_settings(codec, limits, scan_batch),
            credentials: GenericStore::with_settings(codec, limits, scan_batch),
            verifiers: GenericStore::with_settings(codec, limits, scan_batch),
            sessions: GenericStore::with_settings(codec, limits, scan_batch),
        }
    }

    /// Agent store, for typed predicate listing
    pub fn agents(&self) -> &GenericStore<Agent> {
        &self.agents
    }

    /// User store, for typed predicate listing
    pub fn users(&self) -> &GenericStore<User> {
        &self.users
    }

    /// Role store, for typed predicate listing
    pub fn roles(&self) -> &GenericStore<Role> {
        &self.roles
    }

    /// Credential store, for typed predicate listing
    pub fn credentials(&self) -> &GenericStore<Credential> {
        &self.credentials
    }

    /// Verifier store, for typed predicate listing
    pub fn verifiers(&self) -> &GenericStore<Verifier> {
        &self.verifiers
    }

    /// Session store, for typed predicate listing
    pub fn sessions(&self) -> &GenericStore<Session> {
        &self.sessions
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

/// List through a type-checked backend filter
fn list_with<T, F>(
    store: &GenericStore<T>,
    ctx: &Context,
    filter: Option<&dyn ListFilter>,
    options: &ListOptions,
    matches: impl Fn(&F, &T) -> bool + Send + Sync,
) -> Result<ListResult<T>>
where
    T: Entity,
    F: ListFilter,
{
    match downcast_filter::<F>(filter)? {
        None => store.list(ctx, None, options),
        Some(filter) => {
            let predicate = |entity: &T| matches(filter, entity);
            store.list(ctx, Some(&predicate), options)
        }
    }
}

/// Single-result lookup over a store without a unique index
///
/// Probes for up to two matches: none is `NotFound`, more than one is
/// `Internal` because two "unique" records mean a broken invariant.
fn find_unique<T: Entity>(
    store: &GenericStore<T>,
    ctx: &Context,
    what: String,
    predicate: impl Fn(&T) -> bool + Send + Sync,
) -> Result<T> {
    let page = store.list(ctx, Some(&predicate), &ListOptions::with_limit(UNIQUE_PROBE_LIMIT))?;
    let mut items = page.items;
    if items.len() > 1 {
        return Err(Error::internal(format!("{what} matches more than one {}", T::KIND)));
    }
    items.pop().ok_or_else(|| Error::not_found(what))
}

fn require_key(name: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::invalid_argument(format!("{name} must not be empty")));
    }
    Ok(())
}

impl Storage for MemoryStorage {
    fn backend(&self) -> &'static str {
        MEMORY_BACKEND_TAG
    }

    fn create_agent(&self, ctx: &Context, agent: &Agent) -> Result<()> {
        self.agents.create(ctx, agent)
    }

    fn upsert_agent(&self, ctx: &Context, agent: &Agent) -> Result<()> {
        self.agents.upsert(ctx, agent)
    }

    fn get_agent(&self, ctx: &Context, id: &str) -> Result<Agent> {
        self.agents.get(ctx, id)
    }

    fn list_agents(&self, ctx: &Context, filter: Option<&dyn ListFilter>, options: &ListOptions) -> Result<ListResult<Agent>> {
        list_with(&self.agents, ctx, filter, options, AgentFilter::matches)
    }

    fn delete_agent(&self, ctx: &Context, id: &str) -> Result<()> {
        self.agents.delete(ctx, id)
    }

    fn record_agent_sync(&self, ctx: &Context, id: &str, report: SyncReport) -> Result<Agent> {
        self.agents.update(ctx, id, |agent| {
            if report.at.is_zero() {
                return Err(Error::invalid_argument("sync report time must be set"));
            }
            agent.record_sync(report);
            Ok(())
        })
    }

    fn create_user(&self, ctx: &Context, user: &User) -> Result<()> {
        self.users.create(ctx, user)
    }

    fn upsert_user(&self, ctx: &Context, user: &User) -> Result<()> {
        self.users.upsert(ctx, user)
    }

    fn get_user(&self, ctx: &Context, id: &str) -> Result<User> {
        self.users.get(ctx, id)
    }

    fn get_users(&self, ctx: &Context, ids: &[String]) -> Result<Vec<User>> {
        self.users.get_many(ctx, ids)
    }

    fn get_user_by_subject(&self, ctx: &Context, subject: &str) -> Result<User> {
        require_key("subject", subject)?;
        let filter = UserFilter::new().by_subject(subject);
        find_unique(&self.users, ctx, format!("user with subject {subject:?}"), |u| filter.matches(u))
    }

    fn list_users(&self, ctx: &Context, filter: Option<&dyn ListFilter>, options: &ListOptions) -> Result<ListResult<User>> {
        list_with(&self.users, ctx, filter, options, UserFilter::matches)
    }

    fn delete_user(&self, ctx: &Context, id: &str) -> Result<()> {
        self.users.delete(ctx, id)
    }

    fn create_role(&self, ctx: &Context, role: &Role) -> Result<()> {
        self.roles.create(ctx, role)
    }

    fn upsert_role(&self, ctx: &Context, role: &Role) -> Result<()> {
        self.roles.upsert(ctx, role)
    }

    fn get_role(&self, ctx: &Context, id: &str) -> Result<Role> {
        self.roles.get(ctx, id)
    }

    fn get_roles(&self, ctx: &Context, ids: &[String]) -> Result<Vec<Role>> {
        self.roles.get_many(ctx, ids)
    }

    fn get_role_by_name(&self, ctx: &Context, name: &str) -> Result<Role> {
        require_key("role name", name)?;
        let filter = RoleFilter::new().by_name(name);
        find_unique(&self.roles, ctx, format!("role named {name:?}"), |r| filter.matches(r))
    }

    fn list_roles(&self, ctx: &Context, filter: Option<&dyn ListFilter>, options: &ListOptions) -> Result<ListResult<Role>> {
        list_with(&self.roles, ctx, filter, options, RoleFilter::matches)
    }

    fn delete_role(&self, ctx: &Context, id: &str) -> Result<()> {
        self.roles.delete(ctx, id)
    }

    fn create_credential(&self, ctx: &Context, credential: &Credential) -> Result<()> {
        self.credentials.create(ctx, credential)
    }

    fn upsert_credential(&self, ctx: &Context, credential: &Credential) -> Result<()> {
        self.credentials.upsert(ctx, credential)
    }

    fn get_credential(&self, ctx: &Context, id: &str) -> Result<Credential> {
        self.credentials.get(ctx, id)
    }

    fn get_credential_by_user_and_auth(&self, ctx: &Context, user_id: &str, kind: AuthKind) -> Result<Credential> {
        require_key("user id", user_id)?;
        let filter = CredentialFilter::new().by_user_id(user_id).by_kind(kind);
        find_unique(
            &self.credentials,
            ctx,
            format!("{kind} credential of user {user_id:?}"),
            |c| filter.matches(c),
        )
    }

    fn list_credentials(&self, ctx: &Context, filter: Option<&dyn ListFilter>, options: &ListOptions) -> Result<ListResult<Credential>> {
        list_with(&self.credentials, ctx, filter, options, CredentialFilter::matches)
    }

    fn delete_credential(&self, ctx: &Context, id: &str) -> Result<()> {
        self.credentials.delete(ctx, id)
    }

    fn create_verifier(&self, ctx: &Context, verifier: &Verifier) -> Result<()> {
        self.verifiers.create(ctx, verifier)
    }

    fn upsert_verifier(&self, ctx: &Context, verifier: &Verifier) -> Result<()> {
        self.verifiers.upsert(ctx, verifier)
    }

    fn get_verifier(&self, ctx: &Context, id: &str) -> Result<Verifier> {
        self.verifiers.get(ctx, id)
    }

    fn get_verifier_by_credential(&self, ctx: &Context, credential_id: &str) -> Result<Verifier> {
        require_key("credential id", credential_id)?;
        let filter = VerifierFilter::new().by_credential_id(credential_id);
        find_unique(
            &self.verifiers,
            ctx,
            format!("verifier for credential {credential_id:?}"),
            |v| filter.matches(v),
        )
    }

    fn list_verifiers(&self, ctx: &Context, filter: Option<&dyn ListFilter>, options: &ListOptions) -> Result<ListResult<Verifier>> {
        list_with(&self.verifiers, ctx, filter, options, VerifierFilter::matches)
    }

    fn delete_verifier(&self, ctx: &Context, id: &str) -> Result<()> {
        self.verifiers.delete(ctx, id)
    }

    fn create_session(&self, ctx: &Context, session: &Session) -> Result<()> {
        self.sessions.create(ctx, session)
    }

    fn upsert_session(&self, ctx: &Context, session: &Session) -> Result<()> {
        self.sessions.upsert(ctx, session)
    }

    fn get_session(&self, ctx: &Context, id: &str) -> Result<Session> {
        self.sessions.get(ctx, id)
    }

    fn list_sessions(&self, ctx: &Context, filter: Option<&dyn ListFilter>, options: &ListOptions) -> Result<ListResult<Session>> {
        list_with(&self.sessions, ctx, filter, options, SessionFilter::matches)
    }

    fn rotate_refresh(&self, ctx: &Context, id: &str, refresh_hash: &str, expires_at: Timestamp) -> Result<Session> {
        self.sessions.update(ctx, id, |session| {
            let at = Timestamp::now_after(session.updated_at);
            session.rotate_refresh(refresh_hash, expires_at, at).map_err(Error::from)
        })
    }

    fn revoke_session(&self, ctx: &Context, id: &str, at: Timestamp) -> Result<Session> {
        self.sessions
            .update(ctx, id, |session| session.revoke(at).map_err(Error::from))
    }

    fn delete_session(&self, ctx: &Context, id: &str) -> Result<()> {
        self.sessions.delete(ctx, id)
    }
}
