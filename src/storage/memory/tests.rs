use super::*;
use crate::types::{
    hash_refresh_token, AgentStatus, ErrorKind, Permission, PermissionSet, SessionState,
};
use std::any::Any;
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

fn ctx() -> Context {
    Context::background()
}

fn ms(millis: i64) -> Timestamp {
    Timestamp::from_millis(millis)
}

fn agent(id: &str, platform: &str, env: &str, millis: i64) -> Agent {
    Agent::new(id, format!("agent-{id}"), platform, ms(millis)).with_label("env", env)
}

fn user(id: &str, subject: &str, millis: i64) -> User {
    User::new(id, subject, format!("{id}@example.com"), ms(millis))
}

fn role(id: &str, name: &str, millis: i64) -> Role {
    Role::new(id, name, PermissionSet::read_only(), ms(millis))
}

fn session(id: &str, user_id: &str, millis: i64) -> Session {
    Session::new(
        id,
        user_id,
        "cred-1",
        hash_refresh_token("initial"),
        ms(millis + 60_000),
        ms(millis),
    )
}

fn agent_ids(items: &[Agent]) -> Vec<&str> {
    items.iter().map(|a| a.id.as_str()).collect()
}

#[test]
fn agents_page_newest_first_until_exhausted() {
    let storage = MemoryStorage::new();
    for (i, id) in ["a1", "a2", "a3", "a4", "a5"].iter().enumerate() {
        storage
            .create_agent(&ctx(), &agent(id, "linux", "dev", 1_000 + i as i64))
            .unwrap();
    }

    let first = storage.list_agents(&ctx(), None, &ListOptions::with_limit(2)).unwrap();
    assert_eq!(agent_ids(&first.items), ["a5", "a4"]);
    assert!(first.has_more());

    let second = storage
        .list_agents(&ctx(), None, &ListOptions::after(first.next_cursor, 2))
        .unwrap();
    assert_eq!(agent_ids(&second.items), ["a3", "a2"]);

    let third = storage
        .list_agents(&ctx(), None, &ListOptions::after(second.next_cursor, 2))
        .unwrap();
    assert_eq!(agent_ids(&third.items), ["a1"]);
    assert!(third.next_cursor.is_empty());
}

#[test]
fn agent_filter_narrows_listing() {
    let storage = MemoryStorage::new();
    storage.create_agent(&ctx(), &agent("a1", "kubernetes", "prod", 1)).unwrap();
    storage.create_agent(&ctx(), &agent("a2", "linux", "prod", 2)).unwrap();
    storage.create_agent(&ctx(), &agent("a3", "kubernetes", "dev", 3)).unwrap();

    let filter = AgentFilter::new().by_platform("kubernetes").by_label("env", "prod");
    let page = storage
        .list_agents(&ctx(), Some(&filter), &ListOptions::default())
        .unwrap();
    assert_eq!(agent_ids(&page.items), ["a1"]);
    assert!(page.next_cursor.is_empty());
}

#[test]
fn foreign_filters_are_rejected_without_side_effects() {
    struct OtherBackendFilter;

    impl ListFilter for OtherBackendFilter {
        fn backend(&self) -> &'static str {
            "other"
        }

        fn entity_kind(&self) -> &'static str {
            "agent"
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    let storage = MemoryStorage::new();
    storage.create_agent(&ctx(), &agent("a1", "linux", "dev", 1)).unwrap();

    let wrong_kind = UserFilter::new().by_subject("x");
    let err = storage
        .list_agents(&ctx(), Some(&wrong_kind), &ListOptions::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = storage
        .list_agents(&ctx(), Some(&OtherBackendFilter), &ListOptions::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    assert_eq!(storage.agents().len(), 1);
    assert_eq!(storage.get_agent(&ctx(), "a1").unwrap().platform, "linux");
}

#[test]
fn get_roles_keeps_caller_order() {
    let storage = MemoryStorage::new();
    storage.create_role(&ctx(), &role("r1", "viewer", 1)).unwrap();
    storage.create_role(&ctx(), &role("r2", "operator", 2)).unwrap();

    let ids = vec!["r2".to_string(), "r1".to_string(), "r2".to_string()];
    let roles = storage.get_roles(&ctx(), &ids).unwrap();
    let got: Vec<&str> = roles.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(got, ["r2", "r1", "r2"]);

    let err = storage
        .get_roles(&ctx(), &["r1".to_string(), "missing".to_string()])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = storage.get_roles(&ctx(), &[]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn get_users_fetches_in_order() {
    let storage = MemoryStorage::new();
    storage.create_user(&ctx(), &user("u1", "sub-1", 1)).unwrap();
    storage.create_user(&ctx(), &user("u2", "sub-2", 2)).unwrap();

    let users = storage
        .get_users(&ctx(), &["u2".to_string(), "u1".to_string()])
        .unwrap();
    assert_eq!(users[0].subject, "sub-2");
    assert_eq!(users[1].subject, "sub-1");
}

#[test]
fn user_by_subject_detects_duplicates() {
    let storage = MemoryStorage::new();
    storage.create_user(&ctx(), &user("u1", "sub-1", 1)).unwrap();

    assert_eq!(storage.get_user_by_subject(&ctx(), "sub-1").unwrap().id, "u1");
    assert_eq!(
        storage.get_user_by_subject(&ctx(), "sub-9").unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        storage.get_user_by_subject(&ctx(), "").unwrap_err().kind(),
        ErrorKind::InvalidArgument
    );

    storage.create_user(&ctx(), &user("u2", "sub-1", 2)).unwrap();
    assert_eq!(
        storage.get_user_by_subject(&ctx(), "sub-1").unwrap_err().kind(),
        ErrorKind::Internal
    );
}

#[test]
fn role_by_name_detects_duplicates() {
    let storage = MemoryStorage::new();
    storage.create_role(&ctx(), &role("r1", "admin", 1)).unwrap();
    assert_eq!(storage.get_role_by_name(&ctx(), "admin").unwrap().id, "r1");

    storage.create_role(&ctx(), &role("r2", "admin", 2)).unwrap();
    assert_eq!(
        storage.get_role_by_name(&ctx(), "admin").unwrap_err().kind(),
        ErrorKind::Internal
    );
    assert_eq!(
        storage.get_role_by_name(&ctx(), "viewer").unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[test]
fn credential_lookup_is_per_user_and_kind() {
    let storage = MemoryStorage::new();
    storage
        .create_credential(&ctx(), &Credential::new("c1", "u1", AuthKind::Password, ms(1)))
        .unwrap();
    storage
        .create_credential(&ctx(), &Credential::new("c2", "u1", AuthKind::ApiKey, ms(2)))
        .unwrap();
    storage
        .create_credential(&ctx(), &Credential::new("c3", "u2", AuthKind::Password, ms(3)))
        .unwrap();

    let found = storage
        .get_credential_by_user_and_auth(&ctx(), "u1", AuthKind::Password)
        .unwrap();
    assert_eq!(found.id, "c1");
    assert_eq!(
        storage
            .get_credential_by_user_and_auth(&ctx(), "u2", AuthKind::Oidc)
            .unwrap_err()
            .kind(),
        ErrorKind::NotFound
    );

    storage
        .create_credential(&ctx(), &Credential::new("c4", "u1", AuthKind::Password, ms(4)))
        .unwrap();
    assert_eq!(
        storage
            .get_credential_by_user_and_auth(&ctx(), "u1", AuthKind::Password)
            .unwrap_err()
            .kind(),
        ErrorKind::Internal
    );
}

#[test]
fn verifier_lookup_by_credential() {
    let storage = MemoryStorage::new();
    storage
        .create_verifier(&ctx(), &Verifier::new("v1", "c1", "argon2id", "digest-1", ms(1)))
        .unwrap();

    assert_eq!(storage.get_verifier_by_credential(&ctx(), "c1").unwrap().id, "v1");
    assert_eq!(
        storage.get_verifier_by_credential(&ctx(), "c2").unwrap_err().kind(),
        ErrorKind::NotFound
    );

    storage
        .create_verifier(&ctx(), &Verifier::new("v2", "c1", "argon2id", "digest-2", ms(2)))
        .unwrap();
    assert_eq!(
        storage.get_verifier_by_credential(&ctx(), "c1").unwrap_err().kind(),
        ErrorKind::Internal
    );
}

#[test]
fn record_agent_sync_updates_status_and_order() {
    let storage = MemoryStorage::new();
    storage.create_agent(&ctx(), &agent("a1", "linux", "dev", 1)).unwrap();
    storage.create_agent(&ctx(), &agent("a2", "linux", "dev", 2)).unwrap();

    let report = SyncReport {
        status: AgentStatus::Healthy,
        version: "1.4.0".into(),
        report: serde_json::json!({"units": 3}),
        at: ms(10),
    };
    let synced = storage.record_agent_sync(&ctx(), "a1", report).unwrap();
    assert_eq!(synced.status, AgentStatus::Healthy);
    assert_eq!(synced.sync_count, 1);
    assert_eq!(synced.last_seen_at, Some(ms(10)));
    assert_eq!(storage.get_agent(&ctx(), "a1").unwrap(), synced);

    let page = storage.list_agents(&ctx(), None, &ListOptions::default()).unwrap();
    assert_eq!(agent_ids(&page.items), ["a1", "a2"]);

    let healthy = AgentFilter::new().by_status(AgentStatus::Healthy);
    let page = storage
        .list_agents(&ctx(), Some(&healthy), &ListOptions::default())
        .unwrap();
    assert_eq!(agent_ids(&page.items), ["a1"]);

    let unset = SyncReport {
        status: AgentStatus::Degraded,
        version: String::new(),
        report: serde_json::Value::Null,
        at: Timestamp::ZERO,
    };
    let err = storage.record_agent_sync(&ctx(), "a2", unset).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(storage.get_agent(&ctx(), "a2").unwrap().sync_count, 0);
}

#[test]
fn session_rotation_and_revocation() {
    let storage = MemoryStorage::new();
    let original = session("s1", "u1", 1);
    storage.create_session(&ctx(), &original).unwrap();

    let next_hash = hash_refresh_token("second");
    let rotated = storage
        .rotate_refresh(&ctx(), "s1", &next_hash, ms(120_000))
        .unwrap();
    assert_eq!(rotated.refresh_hash, next_hash);
    assert_eq!(rotated.expires_at, ms(120_000));
    assert!(rotated.updated_at > original.updated_at);

    let err = storage
        .rotate_refresh(&ctx(), "s1", "", ms(180_000))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(storage.get_session(&ctx(), "s1").unwrap(), rotated);

    let err = storage.revoke_session(&ctx(), "s1", Timestamp::ZERO).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let revoked = storage.revoke_session(&ctx(), "s1", ms(90_000)).unwrap();
    assert_eq!(revoked.state(), SessionState::Revoked);
    assert_eq!(revoked.revoked_at, Some(ms(90_000)));

    let err = storage
        .rotate_refresh(&ctx(), "s1", &hash_refresh_token("third"), ms(200_000))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    let err = storage.revoke_session(&ctx(), "s1", ms(95_000)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(storage.get_session(&ctx(), "s1").unwrap(), revoked);

    assert_eq!(
        storage.revoke_session(&ctx(), "missing", ms(1)).unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[test]
fn stale_mutation_times_never_move_updated_at_backwards() {
    let storage = MemoryStorage::new();
    storage.create_session(&ctx(), &session("s1", "u1", 5)).unwrap();
    let revoked = storage.revoke_session(&ctx(), "s1", ms(5)).unwrap();
    assert_eq!(revoked.revoked_at, Some(ms(5)));
    assert!(revoked.updated_at > ms(5));

    storage.create_agent(&ctx(), &agent("a1", "linux", "dev", 50)).unwrap();
    storage.create_agent(&ctx(), &agent("a2", "linux", "dev", 40)).unwrap();
    let late = SyncReport {
        status: AgentStatus::Healthy,
        version: String::new(),
        report: serde_json::Value::Null,
        at: ms(10),
    };
    let synced = storage.record_agent_sync(&ctx(), "a1", late).unwrap();
    assert!(synced.updated_at > ms(50));
    assert_eq!(synced.last_seen_at, Some(ms(10)));

    let page = storage.list_agents(&ctx(), None, &ListOptions::default()).unwrap();
    assert_eq!(agent_ids(&page.items), ["a1", "a2"]);
}

#[test]
fn session_filters_through_storage() {
    let storage = MemoryStorage::new();
    storage.create_session(&ctx(), &session("s1", "u1", 1)).unwrap();
    storage.create_session(&ctx(), &session("s2", "u1", 2)).unwrap();
    storage.create_session(&ctx(), &session("s3", "u2", 3)).unwrap();
    storage.revoke_session(&ctx(), "s2", ms(10)).unwrap();

    let live_for_u1 = SessionFilter::new().by_user_id("u1").by_revoked(false);
    let page = storage
        .list_sessions(&ctx(), Some(&live_for_u1), &ListOptions::default())
        .unwrap();
    let ids: Vec<&str> = page.items.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, ["s1"]);
}

#[test]
fn kinds_are_stored_independently() {
    let storage = MemoryStorage::new();
    storage.create_user(&ctx(), &user("same-id", "sub", 1)).unwrap();
    storage.create_role(&ctx(), &role("same-id", "viewer", 1)).unwrap();
    storage.create_agent(&ctx(), &agent("same-id", "linux", "dev", 1)).unwrap();

    storage.delete_user(&ctx(), "same-id").unwrap();
    assert_eq!(storage.get_role(&ctx(), "same-id").unwrap().name, "viewer");
    assert_eq!(storage.get_agent(&ctx(), "same-id").unwrap().platform, "linux");
    assert_eq!(
        storage.get_user(&ctx(), "same-id").unwrap_err().kind(),
        ErrorKind::NotFound
    );
}

#[test]
fn update_on_one_kind_does_not_block_another() {
    let storage = MemoryStorage::new();
    storage.create_agent(&ctx(), &agent("a1", "linux", "dev", 1)).unwrap();

    // The user write happens while the agent write lock is held.
    storage
        .agents()
        .update(&ctx(), "a1", |a| {
            storage.create_user(&ctx(), &user("u1", "sub", 1))?;
            a.set_label("owner", "u1", ms(2));
            Ok(())
        })
        .unwrap();

    assert_eq!(storage.get_user(&ctx(), "u1").unwrap().subject, "sub");
    assert_eq!(storage.get_agent(&ctx(), "a1").unwrap().label("owner"), Some("u1"));
}

#[test]
fn returned_entities_do_not_alias_storage() {
    let storage = MemoryStorage::new();
    let mut role = role("r1", "viewer", 1);
    storage.create_role(&ctx(), &role).unwrap();

    role.grant(Permission::Admin, ms(2));
    let mut fetched = storage.get_role(&ctx(), "r1").unwrap();
    assert!(!fetched.permissions.is_admin());

    fetched.name = "changed".into();
    assert_eq!(storage.get_role(&ctx(), "r1").unwrap().name, "viewer");
}

#[test]
fn configured_limits_apply_to_every_kind() {
    let storage = MemoryStorage::with_settings(PageLimits { default_size: 2, max_size: 3 }, 1);
    for i in 0..5 {
        storage.create_user(&ctx(), &user(&format!("u{i}"), "sub", i + 1)).unwrap();
    }

    let page = storage.list_users(&ctx(), None, &ListOptions::default()).unwrap();
    assert_eq!(page.items.len(), 2);
    let page = storage.list_users(&ctx(), None, &ListOptions::with_limit(50)).unwrap();
    assert_eq!(page.items.len(), 3);

    let codec = CursorCodec::memory();
    let cursor = codec.decode(&page.next_cursor).unwrap();
    assert_eq!(cursor.updated_at(), ms(3));
    assert_eq!(cursor.id, "u2");
    assert_eq!(cursor.backend_tag, codec.backend_tag());
    assert_eq!(cursor.version, codec.version());
}

#[test]
fn cancelled_context_stops_storage_calls() {
    let storage = MemoryStorage::new();
    let cancelled = Context::background();
    cancelled.cancel();

    let err = storage
        .create_agent(&cancelled, &agent("a1", "linux", "dev", 1))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert!(storage.agents().is_empty());
    assert_eq!(
        storage.get_user_by_subject(&cancelled, "sub").unwrap_err().kind(),
        ErrorKind::Cancelled
    );
}

#[test]
fn concurrent_writers_across_kinds() {
    let storage = Arc::new(MemoryStorage::new());
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let storage = Arc::clone(&storage);
            thread::spawn(move || {
                for i in 0..50 {
                    let id = format!("t{t}-{i}");
                    storage.create_agent(&ctx(), &agent(&id, "linux", "dev", i + 1)).unwrap();
                    storage.create_user(&ctx(), &user(&id, &id, i + 1)).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let mut seen = HashSet::new();
    let mut cursor = String::new();
    loop {
        let page = storage
            .list_agents(&ctx(), None, &ListOptions::after(cursor, 37))
            .unwrap();
        for a in &page.items {
            assert!(seen.insert(a.id.clone()));
        }
        if page.next_cursor.is_empty() {
            break;
        }
        cursor = page.next_cursor;
    }
    assert_eq!(seen.len(), 400);
    assert_eq!(storage.users().len(), 400);
}
