//! Integration tests for route guards and permission gating.

mod helpers;

use portcullis_auth::{GuardDecision, Location, PermissionGate, ProtectedRoute, PublicRoute, RouteGuard};

use helpers::{MockBackend, Stack, config_for, expired_jwt, role, user};

#[tokio::test]
async fn test_expired_token_on_load_redirects_to_login_with_from() {
    let backend = MockBackend::start().await;
    let stack = Stack::new(config_for(&backend.base_url));
    stack.seed(&expired_jwt(), &user("ana", &["invoice.view"]));

    let guard = ProtectedRoute::new(&stack.config.routes);
    let decision = guard.evaluate(&stack.session, &Location::new("/invoices/42"));

    match decision {
        GuardDecision::Redirect(redirect) => {
            assert_eq!(redirect.to, "/login");
            assert_eq!(
                redirect.state.and_then(|s| s.from).as_deref(),
                Some("/invoices/42")
            );
            assert!(redirect.replace);
        }
        other => panic!("expected redirect, got {other:?}"),
    }
    assert!(!stack.has_stored_session());
}

#[tokio::test]
async fn test_protected_route_pending_until_boot_settles() {
    let backend = MockBackend::start().await;
    backend.add_account("pw", user("ana", &[]));
    let stack = Stack::new(config_for(&backend.base_url));
    stack.session.authenticate("ana", "pw").await.expect("login");

    // A fresh manager over the same storage has not verified yet.
    let booting = Stack::with_storage(stack.config.clone(), stack.storage.clone());
    let guard = ProtectedRoute::new(&booting.config.routes);
    assert_eq!(
        guard.evaluate(&booting.session, &Location::new("/x")),
        GuardDecision::Pending
    );

    booting.session.init().await;
    assert!(guard.evaluate(&booting.session, &Location::new("/x")).is_render());
}

#[tokio::test]
async fn test_permission_guard_renders_iff_permission_held() {
    let backend = MockBackend::start().await;
    let mut clerk = user("clerk", &[]);
    clerk.roles.push(role("billing", &["x"]));
    backend.add_account("pw", clerk);
    backend.add_account("pw", user("viewer", &["y"]));

    let guard = ProtectedRoute::new(&helpers::config_for("http://unused").routes).permissions(["x"]);

    let stack = Stack::new(config_for(&backend.base_url));
    stack.session.authenticate("clerk", "pw").await.expect("login");
    assert!(guard.evaluate(&stack.session, &Location::new("/billing")).is_render());

    let stack = Stack::new(config_for(&backend.base_url));
    stack.session.authenticate("viewer", "pw").await.expect("login");
    assert_eq!(
        guard
            .evaluate(&stack.session, &Location::new("/billing"))
            .redirect_target(),
        Some("/forbidden")
    );
}

#[tokio::test]
async fn test_required_role_mismatch_is_forbidden_not_login() {
    let backend = MockBackend::start().await;
    backend.add_account("pw", user("ana", &[]));
    let stack = Stack::new(config_for(&backend.base_url));
    stack.session.authenticate("ana", "pw").await.expect("login");

    let guard = ProtectedRoute::new(&stack.config.routes).required_role("auditor");
    let decision = guard.evaluate(&stack.session, &Location::new("/audit"));
    assert_eq!(decision.redirect_target(), Some("/forbidden"));
}

#[tokio::test]
async fn test_public_route_returns_to_captured_destination() {
    let backend = MockBackend::start().await;
    backend.add_account("pw", user("ana", &[]));
    let stack = Stack::new(config_for(&backend.base_url));
    stack.session.init().await;

    let guard = PublicRoute::new(&stack.config.routes);
    let login_page = Location::new("/login").with_from("/invoices/42");
    assert!(guard.evaluate(&stack.session, &login_page).is_render());

    stack.session.authenticate("ana", "pw").await.expect("login");
    assert_eq!(
        guard.evaluate(&stack.session, &login_page).redirect_target(),
        Some("/invoices/42")
    );
    assert_eq!(
        guard
            .evaluate(&stack.session, &Location::new("/login"))
            .redirect_target(),
        Some("/dashboard")
    );
}

#[tokio::test]
async fn test_super_admin_role_grants_everything() {
    let backend = MockBackend::start().await;
    let mut root = user("root", &[]);
    root.roles.push(role("super_admin", &[]));
    backend.add_account("pw", root);
    let stack = Stack::new(config_for(&backend.base_url));
    stack.session.authenticate("root", "pw").await.expect("login");

    let gate = PermissionGate::new(stack.session.clone());
    assert!(gate.has_permission("admin.view"));
    assert!(gate.has_all_permissions(&["admin.view", "admin.edit"]));
    assert!(
        ProtectedRoute::new(&stack.config.routes)
            .permissions(["admin.view"])
            .required_role("auditor")
            .evaluate(&stack.session, &Location::new("/admin"))
            .is_render()
    );
}

#[tokio::test]
async fn test_remote_fallback_queries_backend_every_time() {
    let backend = MockBackend::start().await;
    backend.add_account("pw", user("ana", &["invoice.view"]));
    backend.grant_remote("report.export");

    let mut config = config_for(&backend.base_url);
    config.session.remote_permission_fallback = true;
    let stack = Stack::new(config);
    stack.session.authenticate("ana", "pw").await.expect("login");

    let gate = PermissionGate::new(stack.session.clone());
    assert!(gate.check_permission("invoice.view").await.expect("local"));
    assert_eq!(backend.hits("GET /auth/check-permission"), 0);

    assert!(gate.check_permission("report.export").await.expect("remote"));
    assert!(gate.check_permission("report.export").await.expect("remote"));
    assert!(!gate.check_permission("report.delete").await.expect("remote"));
    assert_eq!(backend.hits("GET /auth/check-permission"), 3);

    // The snapshot is unchanged.
    assert!(!gate.has_permission("report.export"));
}

#[tokio::test]
async fn test_explicit_remote_check_with_default_config() {
    let backend = MockBackend::start().await;
    backend.add_account("pw", user("ana", &["invoice.view"]));
    backend.grant_remote("report.export");

    let stack = Stack::new(config_for(&backend.base_url));
    assert!(!stack.config.session.remote_permission_fallback);
    stack.session.authenticate("ana", "pw").await.expect("login");

    let gate = PermissionGate::new(stack.session.clone());
    assert!(!gate.check_permission("report.export").await.expect("local"));
    assert_eq!(backend.hits("GET /auth/check-permission"), 0);

    assert!(gate.check_permission_remote("report.export").await.expect("remote"));
    assert_eq!(backend.hits("GET /auth/check-permission"), 1);
}
