//! Integration tests for the session lifecycle against a live backend.

mod helpers;

use portcullis_auth::AuthState;
use portcullis_core::error::ErrorKind;

use helpers::{MockBackend, Stack, config_for, dead_base_url, expired_jwt, file_config_for, role, user};

#[tokio::test]
async fn test_login_then_boot_from_shared_file_storage() {
    let backend = MockBackend::start().await;
    backend.add_account("s3cret", user("ana", &["invoice.view"]));
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("session.json");

    let first = Stack::new(file_config_for(&backend.base_url, &path));
    let signed_in = first.session.authenticate("ana", "s3cret").await.expect("login");
    assert_eq!(signed_in.username, "ana");
    assert!(first.session.is_authenticated());

    // A second process opening the same storage boots into the session.
    let second = Stack::new(file_config_for(&backend.base_url, &path));
    let state = second.session.init().await;
    assert_eq!(state.session().expect("session").user.username, "ana");
    assert_eq!(backend.hits("GET /auth/verify-token"), 1);
}

#[tokio::test]
async fn test_boot_replaces_cached_user_with_backend_user() {
    let backend = MockBackend::start().await;
    backend.add_account("pw", user("ana", &["invoice.view"]));
    let stack = Stack::new(config_for(&backend.base_url));
    stack.session.authenticate("ana", "pw").await.expect("login");

    let mut promoted = user("ana", &["invoice.view"]);
    promoted.roles.push(role("billing", &["invoice.approve"]));
    backend.update_user(promoted.clone());

    let state = stack.session.init().await;
    assert_eq!(state.session().expect("session").user, promoted);
}

#[tokio::test]
async fn test_bad_credentials_leave_session_untouched() {
    let backend = MockBackend::start().await;
    backend.add_account("right", user("ana", &[]));
    let stack = Stack::new(config_for(&backend.base_url));
    stack.session.init().await;

    let err = stack.session.authenticate("ana", "wrong").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authentication);
    assert_eq!(stack.session.state(), AuthState::Unauthenticated);
    assert!(!stack.has_stored_session());
}

#[tokio::test]
async fn test_expired_stored_token_never_reaches_backend() {
    let backend = MockBackend::start().await;
    let stack = Stack::new(config_for(&backend.base_url));
    stack.seed(&expired_jwt(), &user("ana", &[]));

    assert!(!stack.session.is_authenticated());
    assert!(!stack.has_stored_session());
    assert_eq!(stack.session.init().await, AuthState::Unauthenticated);
    assert_eq!(backend.hits("GET /auth/verify-token"), 0);
}

#[tokio::test]
async fn test_non_jwt_token_is_unauthenticated() {
    let backend = MockBackend::start().await;
    let stack = Stack::new(config_for(&backend.base_url));
    stack.seed("definitely-not-a-jwt", &user("ana", &[]));

    assert!(!stack.session.is_authenticated());
    assert_eq!(stack.session.init().await, AuthState::Unauthenticated);
    assert!(!stack.has_stored_session());
}

#[tokio::test]
async fn test_revoked_token_fails_boot() {
    let backend = MockBackend::start().await;
    backend.add_account("pw", user("ana", &[]));
    let stack = Stack::new(config_for(&backend.base_url));
    stack.session.authenticate("ana", "pw").await.expect("login");

    backend.revoke_all_tokens();
    assert_eq!(stack.session.init().await, AuthState::Unauthenticated);
    assert!(!stack.has_stored_session());
}

#[tokio::test]
async fn test_logout_notifies_backend() {
    let backend = MockBackend::start().await;
    backend.add_account("pw", user("ana", &[]));
    let stack = Stack::new(config_for(&backend.base_url));
    stack.session.authenticate("ana", "pw").await.expect("login");
    assert_eq!(backend.live_tokens(), 1);

    stack.session.logout().await;
    assert_eq!(backend.hits("POST /auth/logout"), 1);
    assert_eq!(backend.live_tokens(), 0);
    assert!(!stack.has_stored_session());
}

#[tokio::test]
async fn test_logout_clears_locally_when_backend_errors() {
    let backend = MockBackend::start().await;
    backend.add_account("pw", user("ana", &[]));
    let stack = Stack::new(config_for(&backend.base_url));
    stack.session.authenticate("ana", "pw").await.expect("login");

    backend.set_logout_down(true);
    stack.session.logout().await;
    assert!(!stack.session.is_authenticated());
    assert!(!stack.has_stored_session());
}

#[tokio::test]
async fn test_logout_clears_locally_when_network_is_down() {
    let stack = Stack::new(config_for(&dead_base_url().await));
    stack
        .session
        .login(user("ana", &[]), helpers::jwt(Some(chrono::Utc::now().timestamp() + 600), 1))
        .expect("login");
    assert!(stack.has_stored_session());

    stack.session.logout().await;
    assert_eq!(stack.session.state(), AuthState::Unauthenticated);
    assert!(!stack.has_stored_session());
}

#[tokio::test]
async fn test_refresh_picks_up_backend_changes() {
    let backend = MockBackend::start().await;
    backend.add_account("pw", user("ana", &[]));
    let stack = Stack::new(config_for(&backend.base_url));
    stack.session.authenticate("ana", "pw").await.expect("login");

    backend.update_user(user("ana", &["report.export"]));
    let refreshed = stack.session.refresh().await.expect("refresh");
    assert!(refreshed.grants("report.export"));
    assert!(stack.session.user().expect("user").grants("report.export"));
}

#[tokio::test]
async fn test_independent_managers_do_not_share_state() {
    let backend = MockBackend::start().await;
    backend.add_account("pw", user("ana", &[]));
    let a = Stack::new(config_for(&backend.base_url));
    let b = Stack::new(config_for(&backend.base_url));

    a.session.authenticate("ana", "pw").await.expect("login");
    assert!(a.session.is_authenticated());
    assert_eq!(b.session.init().await, AuthState::Unauthenticated);
}
