//! Integration tests for the identity and social-graph layer
//!
//! These tests run against a live PostgreSQL instance configured through
//! `DATABASE_URL` and are ignored by default:
//!
//! ```sh
//! DATABASE_URL=postgresql://... cargo test -p chat -- --ignored
//! ```

use axum::extract::{Json, State};
use sqlx::PgPool;
use uuid::Uuid;

use chat::admin;
use chat::config::BootstrapConfig;
use chat::error::ApiError;
use chat::jwt::{JwtConfig, JwtService};
use chat::realtime::registry::{ConnectionRegistry, RoomRegistry};
use chat::repositories::{
    AddFriendOutcome, MessageRepository, SocialRepository, UserRepository,
};
use chat::routes::{self, CredentialsRequest};
use chat::state::AppState;
use chat::{database, middleware::AuthUser};

async fn test_state() -> AppState {
    let db_config = common::database::DatabaseConfig::from_env().expect("DATABASE_URL must be set");
    let pool: PgPool = common::database::init_pool(&db_config)
        .await
        .expect("database must be reachable");
    database::ensure_schema(&pool).await.expect("schema");

    let bootstrap = BootstrapConfig {
        default_friend_username: "assistant".to_string(),
        default_avatar_url: "/assets/default-avatar.png".to_string(),
        welcome_message: "Welcome to the chat!".to_string(),
    };

    let users = UserRepository::new(pool.clone());
    let default_friend_id = users
        .ensure_default_friend(&bootstrap)
        .await
        .expect("default friend");

    AppState {
        db_pool: pool.clone(),
        jwt: JwtService::new(JwtConfig {
            secret: "integration-test-secret".to_string(),
            token_expiry: 3600,
        }),
        users,
        social: SocialRepository::new(pool.clone()),
        messages: MessageRepository::new(pool),
        connections: ConnectionRegistry::new(),
        rooms: RoomRegistry::new(),
        default_friend_id,
        bootstrap,
    }
}

fn unique_name(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn register_bootstrap_commits_all_four_effects() {
    let state = test_state().await;
    let name = unique_name("boot");

    let user = state
        .users
        .register(&name, "pw1", state.default_friend_id, &state.bootstrap)
        .await
        .unwrap();

    // account exists
    let found = state.users.find_by_username(&name).await.unwrap().unwrap();
    assert_eq!(found.id, user.id);

    // friendship holds in both directions
    let mine = state.social.list_friends(user.id).await.unwrap();
    assert!(mine.iter().any(|f| f.id == state.default_friend_id));
    let theirs = state
        .social
        .list_friends(state.default_friend_id)
        .await
        .unwrap();
    assert!(theirs.iter().any(|f| f.id == user.id));

    // exactly one welcome message from the default friend
    let conversation = state
        .messages
        .conversation(state.default_friend_id, user.id)
        .await
        .unwrap();
    assert_eq!(conversation.len(), 1);
    assert_eq!(conversation[0].sender_id, state.default_friend_id);
    assert_eq!(conversation[0].recipient_id, user.id);
    assert_eq!(conversation[0].content, state.bootstrap.welcome_message);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn duplicate_register_conflicts_and_leaves_no_partial_state() {
    let state = test_state().await;
    let name = unique_name("dup");

    let first = state
        .users
        .register(&name, "pw1", state.default_friend_id, &state.bootstrap)
        .await
        .unwrap();

    let err = state
        .users
        .register(&name, "pw2", state.default_friend_id, &state.bootstrap)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));

    // the failed attempt wrote nothing: still one welcome message, and the
    // original account still logs in with its own password
    let conversation = state
        .messages
        .conversation(state.default_friend_id, first.id)
        .await
        .unwrap();
    assert_eq!(conversation.len(), 1);

    let found = state.users.find_by_username(&name).await.unwrap().unwrap();
    assert_eq!(found.id, first.id);
    assert!(state.users.verify_password(&found, "pw1"));
    assert!(!state.users.verify_password(&found, "pw2"));
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn concurrent_register_of_same_name_yields_one_conflict() {
    let state = test_state().await;
    let name = unique_name("race");

    let (first, second) = tokio::join!(
        state
            .users
            .register(&name, "pw1", state.default_friend_id, &state.bootstrap),
        state
            .users
            .register(&name, "pw2", state.default_friend_id, &state.bootstrap),
    );

    // exactly one wins; the loser sees a conflict, never an internal fault
    let (winner, loser) = match (first, second) {
        (Ok(user), Err(err)) | (Err(err), Ok(user)) => (user, err),
        (Ok(_), Ok(_)) => panic!("both concurrent registrations succeeded"),
        (Err(a), Err(b)) => panic!("both concurrent registrations failed: {a}, {b}"),
    };
    assert!(matches!(loser, ApiError::Conflict(_)));

    let found = state.users.find_by_username(&name).await.unwrap().unwrap();
    assert_eq!(found.id, winner.id);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn default_friend_account_cannot_be_deleted() {
    let state = test_state().await;

    let err = admin::del_users(
        State(state.clone()),
        Json(admin::DeleteUserRequest {
            user_id: Some(state.default_friend_id),
        }),
    )
    .await
    .err()
    .expect("deleting the default friend must fail");
    assert!(matches!(err, ApiError::InvalidOperation(_)));

    // the account is untouched and registrations still bootstrap against it
    let name = unique_name("after_del");
    let user = state
        .users
        .register(&name, "pw", state.default_friend_id, &state.bootstrap)
        .await
        .unwrap();
    let friends = state.social.list_friends(user.id).await.unwrap();
    assert!(friends.iter().any(|f| f.id == state.default_friend_id));
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn add_friend_is_symmetric_and_idempotent() {
    let state = test_state().await;
    let name_a = unique_name("sym_a");
    let name_b = unique_name("sym_b");

    let a = state
        .users
        .register(&name_a, "pw", state.default_friend_id, &state.bootstrap)
        .await
        .unwrap();
    let b = state
        .users
        .register(&name_b, "pw", state.default_friend_id, &state.bootstrap)
        .await
        .unwrap();

    let outcome = state.social.add_friend(a.id, &name_b).await.unwrap();
    assert_eq!(outcome, AddFriendOutcome::Added);

    let a_friends = state.social.list_friends(a.id).await.unwrap();
    let b_friends = state.social.list_friends(b.id).await.unwrap();
    assert!(a_friends.iter().any(|f| f.id == b.id));
    assert!(b_friends.iter().any(|f| f.id == a.id));

    // a second call is a no-op
    let outcome = state.social.add_friend(a.id, &name_b).await.unwrap();
    assert_eq!(outcome, AddFriendOutcome::AlreadyFriends);
    assert_eq!(
        state.social.list_friends(a.id).await.unwrap().len(),
        a_friends.len()
    );
    assert_eq!(
        state.social.list_friends(b.id).await.unwrap().len(),
        b_friends.len()
    );
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn add_friend_rejects_self_and_unknown_target() {
    let state = test_state().await;
    let name = unique_name("self");

    let user = state
        .users
        .register(&name, "pw", state.default_friend_id, &state.bootstrap)
        .await
        .unwrap();

    let err = state.social.add_friend(user.id, &name).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidOperation(_)));

    let err = state
        .social
        .add_friend(user.id, &unique_name("nobody"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn remove_user_cascades_and_second_call_is_not_found() {
    let state = test_state().await;
    let name_a = unique_name("del_a");
    let name_b = unique_name("del_b");

    let a = state
        .users
        .register(&name_a, "pw", state.default_friend_id, &state.bootstrap)
        .await
        .unwrap();
    let b = state
        .users
        .register(&name_b, "pw", state.default_friend_id, &state.bootstrap)
        .await
        .unwrap();
    state.social.add_friend(a.id, &name_b).await.unwrap();

    let deleted = state.social.remove_user(b.id).await.unwrap();
    assert_eq!(deleted.id, b.id);

    // no remaining friend list contains the deleted id
    let a_friends = state.social.list_friends(a.id).await.unwrap();
    assert!(a_friends.iter().all(|f| f.id != b.id));
    let default_friends = state
        .social
        .list_friends(state.default_friend_id)
        .await
        .unwrap();
    assert!(default_friends.iter().all(|f| f.id != b.id));

    let err = state.social.remove_user(b.id).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn list_friends_never_returns_dead_references() {
    let state = test_state().await;
    let name_a = unique_name("live_a");
    let name_b = unique_name("live_b");

    let a = state
        .users
        .register(&name_a, "pw", state.default_friend_id, &state.bootstrap)
        .await
        .unwrap();
    let b = state
        .users
        .register(&name_b, "pw", state.default_friend_id, &state.bootstrap)
        .await
        .unwrap();
    state.social.add_friend(a.id, &name_b).await.unwrap();

    // delete the user row without running the sweep: a dangling reference
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(b.id)
        .execute(&state.db_pool)
        .await
        .unwrap();

    let friends = state.social.list_friends(a.id).await.unwrap();
    assert!(friends.iter().all(|f| f.id != b.id));

    // the sweep is idempotent and repairs the graph on a later run
    state.social.sweep_references(b.id).await.unwrap();
    state.social.sweep_references(b.id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn login_failures_are_indistinguishable() {
    let state = test_state().await;
    let name = unique_name("login");

    state
        .users
        .register(&name, "right-password", state.default_friend_id, &state.bootstrap)
        .await
        .unwrap();

    let unknown_user = routes::login(
        State(state.clone()),
        Json(CredentialsRequest {
            username: unique_name("ghost"),
            password: "whatever".to_string(),
        }),
    )
    .await
    .err()
    .expect("login with an unknown username must fail");

    let wrong_password = routes::login(
        State(state.clone()),
        Json(CredentialsRequest {
            username: name,
            password: "wrong-password".to_string(),
        }),
    )
    .await
    .err()
    .expect("login with a wrong password must fail");

    assert!(matches!(unknown_user, ApiError::Unauthorized));
    assert!(matches!(wrong_password, ApiError::Unauthorized));
    assert_eq!(unknown_user.to_string(), wrong_password.to_string());
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (set DATABASE_URL)"]
async fn full_scenario_register_login_befriend_delete() {
    let state = test_state().await;
    let alice_name = unique_name("alice");
    let bob_name = unique_name("bob");

    state
        .users
        .register(&alice_name, "pw1", state.default_friend_id, &state.bootstrap)
        .await
        .unwrap();
    state
        .users
        .register(&bob_name, "pw2", state.default_friend_id, &state.bootstrap)
        .await
        .unwrap();

    // login succeeds and the token decodes back to alice
    let response = routes::login(
        State(state.clone()),
        Json(CredentialsRequest {
            username: alice_name.clone(),
            password: "pw1".to_string(),
        }),
    )
    .await;
    assert!(response.is_ok());

    let alice = state
        .users
        .find_by_username(&alice_name)
        .await
        .unwrap()
        .unwrap();
    let token = state.jwt.issue(&alice).unwrap();
    let claims = state.jwt.verify(&token).unwrap();
    assert_eq!(claims.name, alice_name);
    assert_eq!(claims.sub, alice.id);

    // the middleware's view of the token matches the account
    let auth_user = AuthUser {
        id: claims.sub,
        name: claims.name,
        avatar: claims.avatar,
    };
    assert_eq!(auth_user.id, alice.id);

    // befriend and verify both sides
    state.social.add_friend(alice.id, &bob_name).await.unwrap();
    let bob = state
        .users
        .find_by_username(&bob_name)
        .await
        .unwrap()
        .unwrap();
    assert!(
        state
            .social
            .list_friends(alice.id)
            .await
            .unwrap()
            .iter()
            .any(|f| f.id == bob.id)
    );
    assert!(
        state
            .social
            .list_friends(bob.id)
            .await
            .unwrap()
            .iter()
            .any(|f| f.id == alice.id)
    );

    // deletion cascades out of alice's list
    state.social.remove_user(bob.id).await.unwrap();
    assert!(
        state
            .social
            .list_friends(alice.id)
            .await
            .unwrap()
            .iter()
            .all(|f| f.id != bob.id)
    );
}
