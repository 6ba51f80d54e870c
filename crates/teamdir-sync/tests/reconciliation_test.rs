//! Integration tests for membership reconciliation.
//!
//! These run the full engine pipeline against the in-memory directory
//! and store backends and assert on the exact directory traffic.

use std::collections::HashMap;
use std::sync::Arc;

use teamdir_directory::{
    DirectoryConfig, DirectoryError, MemoryDirectory, ModifyOp,
};
use teamdir_store::{MemoryStore, Principal, PrincipalStore, Team, TeamStore};
use teamdir_sync::{MembershipChange, MembershipSyncEngine, SyncError};

const GROUP_DN: &str = "cn=eng,ou=groups,dc=example,dc=com";
const PLACEHOLDER_DN: &str = "uid=nobody,ou=users,dc=example,dc=com";

fn user_dn(username: &str) -> String {
    format!("uid={username},ou=users,dc=example,dc=com")
}

fn group_entry(members: &[&str]) -> HashMap<String, Vec<String>> {
    let mut attrs = HashMap::new();
    attrs.insert("objectClass".to_string(), vec!["groupOfNames".to_string()]);
    attrs.insert("cn".to_string(), vec!["eng".to_string()]);
    attrs.insert(
        "member".to_string(),
        members.iter().map(ToString::to_string).collect(),
    );
    attrs
}

struct Env {
    directory: Arc<MemoryDirectory>,
    store: Arc<MemoryStore>,
    engine: MembershipSyncEngine,
}

async fn env(config: DirectoryConfig) -> Env {
    let directory = Arc::new(MemoryDirectory::new());
    let store = Arc::new(MemoryStore::new());
    let engine = MembershipSyncEngine::new(
        directory.clone(),
        config,
        store.clone(),
        store.clone(),
    );
    Env {
        directory,
        store,
        engine,
    }
}

fn config() -> DirectoryConfig {
    DirectoryConfig::new("ldap://localhost:389", "dc=example,dc=com")
}

async fn principal(store: &MemoryStore, username: &str) -> Principal {
    store
        .insert_principal(Principal::new(username).with_directory_dn(user_dn(username)))
        .await
        .unwrap()
}

/// The scripted admin scenario: bob as admin is rejected until his
/// member addition has committed, and each step issues exactly one
/// batched modify against the right attribute.
#[tokio::test]
async fn test_admin_requires_committed_membership_scenario() {
    let env = env(config()).await;
    let alice = principal(&env.store, "alice").await;
    let bob = principal(&env.store, "bob").await;

    env.directory
        .put_entry(GROUP_DN, group_entry(&[&user_dn("alice")]));
    let mut team = Team::new("Engineering", "eng").with_directory_name("eng");
    team.members.insert(alice.id);
    let team = env.store.insert_team(team).await.unwrap();

    // Admin first: rejected, nothing written anywhere.
    let err = env
        .engine
        .apply(MembershipChange::add_admins(team.id, vec![bob.id]))
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::ConstraintViolation { .. }));
    assert!(env.directory.modify_log().is_empty());
    let current = env.store.team(team.id).await.unwrap().unwrap();
    assert_eq!(current.members, team.members);
    assert!(current.admins.is_empty());

    // Member addition: exactly one ADD(member, bob_dn).
    env.engine
        .apply(MembershipChange::add_members(team.id, vec![bob.id]))
        .await
        .unwrap();

    // Admin addition now succeeds: exactly one ADD(owner, bob_dn).
    env.engine
        .apply(MembershipChange::add_admins(team.id, vec![bob.id]))
        .await
        .unwrap();

    let log = env.directory.modify_log();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].changes[0].attribute, "member");
    assert_eq!(log[0].changes[0].op, ModifyOp::Add);
    assert_eq!(log[0].changes[0].values, vec![user_dn("bob")]);
    assert_eq!(log[1].changes[0].attribute, "owner");
    assert_eq!(log[1].changes[0].op, ModifyOp::Add);
    assert_eq!(log[1].changes[0].values, vec![user_dn("bob")]);

    let current = env.store.team(team.id).await.unwrap().unwrap();
    assert!(current.admins_are_members());
    assert!(current.has_admin(bob.id));
}

/// Round-trip property: add issues one ADD with exactly P's DN,
/// remove issues one DELETE with the same DN, and no other DN appears.
#[tokio::test]
async fn test_member_add_remove_round_trip_exact_dns() {
    let env = env(config()).await;
    let alice = principal(&env.store, "alice").await;
    let bob = principal(&env.store, "bob").await;

    env.directory
        .put_entry(GROUP_DN, group_entry(&[&user_dn("alice")]));
    let mut team = Team::new("Engineering", "eng").with_directory_name("eng");
    team.members.insert(alice.id);
    let team = env.store.insert_team(team).await.unwrap();

    env.engine
        .apply(MembershipChange::add_members(team.id, vec![bob.id]))
        .await
        .unwrap();
    env.engine
        .apply(MembershipChange::remove_members(team.id, vec![bob.id]))
        .await
        .unwrap();

    let log = env.directory.modify_log();
    assert_eq!(log.len(), 2);
    for recorded in &log {
        assert_eq!(recorded.dn, GROUP_DN);
        assert_eq!(recorded.changes.len(), 1);
        assert_eq!(recorded.changes[0].values, vec![user_dn("bob")]);
    }
    assert_eq!(log[0].changes[0].op, ModifyOp::Add);
    assert_eq!(log[1].changes[0].op, ModifyOp::Delete);

    // The directory group is back to its original membership.
    let entry = env.directory.entry(GROUP_DN).unwrap();
    assert_eq!(entry.values("member"), [user_dn("alice")]);
}

/// A mirrored group with the non-empty requirement never goes empty:
/// the placeholder lands before the final removal.
#[tokio::test]
async fn test_group_never_observed_empty() {
    let mut config = config().with_placeholder(PLACEHOLDER_DN);
    config.require_non_empty_group = true;
    let env = env(config).await;

    let alice = principal(&env.store, "alice").await;
    let nobody = env
        .store
        .insert_principal(Principal::new("nobody").with_directory_dn(PLACEHOLDER_DN))
        .await
        .unwrap();
    env.directory
        .put_entry(GROUP_DN, group_entry(&[&user_dn("alice")]));
    let mut team = Team::new("Engineering", "eng").with_directory_name("eng");
    team.members.insert(alice.id);
    let team = env.store.insert_team(team).await.unwrap();

    let outcome = env
        .engine
        .apply(MembershipChange::remove_members(team.id, vec![alice.id]))
        .await
        .unwrap();
    assert!(outcome.placeholder_injected);

    let log = env.directory.modify_log();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].changes[0].op, ModifyOp::Add);
    assert_eq!(log[0].changes[0].values, vec![PLACEHOLDER_DN.to_string()]);
    assert_eq!(log[1].changes[0].op, ModifyOp::Delete);

    // Directory and local store agree: both hold only the placeholder.
    let entry = env.directory.entry(GROUP_DN).unwrap();
    assert_eq!(entry.values("member"), [PLACEHOLDER_DN.to_string()]);
    let team = env.store.team(team.id).await.unwrap().unwrap();
    assert!(!team.has_member(alice.id));
    assert!(team.has_member(nobody.id));
}

/// A non-empty-group removal with no local principal linked to the
/// placeholder DN fails before anything is written on either side.
#[tokio::test]
async fn test_unlinked_placeholder_rejects_final_removal() {
    let mut config = config().with_placeholder(PLACEHOLDER_DN);
    config.require_non_empty_group = true;
    let env = env(config).await;

    let alice = principal(&env.store, "alice").await;
    env.directory
        .put_entry(GROUP_DN, group_entry(&[&user_dn("alice")]));
    let mut team = Team::new("Engineering", "eng").with_directory_name("eng");
    team.members.insert(alice.id);
    let team = env.store.insert_team(team).await.unwrap();

    let err = env
        .engine
        .apply(MembershipChange::remove_members(team.id, vec![alice.id]))
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::PlaceholderUnlinked { .. }));

    assert!(env.directory.modify_log().is_empty());
    let entry = env.directory.entry(GROUP_DN).unwrap();
    assert_eq!(entry.values("member"), [user_dn("alice")]);
    let team = env.store.team(team.id).await.unwrap().unwrap();
    assert!(team.has_member(alice.id));
}

/// Missing mirrored group: every mutation fails with a not-found
/// directory error and the local member set stays put.
#[tokio::test]
async fn test_missing_group_rejects_mutation() {
    let env = env(config()).await;
    let alice = principal(&env.store, "alice").await;
    let team = env
        .store
        .insert_team(Team::new("Engineering", "eng").with_directory_name("eng"))
        .await
        .unwrap();

    let err = env
        .engine
        .apply(MembershipChange::add_members(team.id, vec![alice.id]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SyncError::Directory(DirectoryError::EntryNotFound { kind: "group", .. })
    ));
    let current = env.store.team(team.id).await.unwrap().unwrap();
    assert!(current.members.is_empty());
}

/// Two groups with the same name is a data-integrity problem, not a
/// pick-one.
#[tokio::test]
async fn test_duplicate_group_is_inconsistency() {
    let env = env(config()).await;
    let alice = principal(&env.store, "alice").await;
    env.directory.put_entry(GROUP_DN, group_entry(&[]));
    env.directory.put_entry(
        "cn=eng,ou=legacy,ou=groups,dc=example,dc=com",
        group_entry(&[]),
    );
    let team = env
        .store
        .insert_team(Team::new("Engineering", "eng").with_directory_name("eng"))
        .await
        .unwrap();

    let err = env
        .engine
        .apply(MembershipChange::add_members(team.id, vec![alice.id]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SyncError::Directory(DirectoryError::AmbiguousEntry { .. })
    ));
}

/// Transport failure aborts with local state unchanged, and the error
/// is classified retryable.
#[tokio::test]
async fn test_unavailable_directory_rejects_local_mutation() {
    let env = env(config()).await;
    let alice = principal(&env.store, "alice").await;
    env.directory.put_entry(GROUP_DN, group_entry(&[]));
    let team = env
        .store
        .insert_team(Team::new("Engineering", "eng").with_directory_name("eng"))
        .await
        .unwrap();

    env.directory
        .inject_failure(DirectoryError::Timeout { timeout_secs: 30 });

    let err = env
        .engine
        .apply(MembershipChange::add_members(team.id, vec![alice.id]))
        .await
        .unwrap_err();
    assert!(err.is_transient());
    let current = env.store.team(team.id).await.unwrap().unwrap();
    assert!(current.members.is_empty());

    // A retry of the same change succeeds once the directory is back.
    env.engine
        .apply(MembershipChange::add_members(team.id, vec![alice.id]))
        .await
        .unwrap();
    let current = env.store.team(team.id).await.unwrap().unwrap();
    assert!(current.has_member(alice.id));
}

/// Concurrent changes to the same team serialize instead of
/// interleaving their directory traffic.
#[tokio::test]
async fn test_same_team_changes_serialize() {
    let env = env(config()).await;
    env.directory.put_entry(GROUP_DN, group_entry(&[]));
    let team = env
        .store
        .insert_team(Team::new("Engineering", "eng").with_directory_name("eng"))
        .await
        .unwrap();

    let mut ids = Vec::new();
    for i in 0..8 {
        ids.push(principal(&env.store, &format!("user{i}")).await.id);
    }

    let engine = Arc::new(env.engine);
    let mut handles = Vec::new();
    for id in ids.clone() {
        let engine = engine.clone();
        let team_id = team.id;
        handles.push(tokio::spawn(async move {
            engine
                .apply(MembershipChange::add_members(team_id, vec![id]))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    // No lost updates: every principal landed.
    let current = env.store.team(team.id).await.unwrap().unwrap();
    assert_eq!(current.members.len(), 8);
    let entry = env.directory.entry(GROUP_DN).unwrap();
    assert_eq!(entry.values("member").len(), 8);
}
