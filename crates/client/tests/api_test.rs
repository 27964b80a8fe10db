//! End-to-end tests against an in-process mock backend.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use admin_client::api::{ApiClient, MenuSource};
use admin_client::error::{ApiError, NavigationError};
use admin_client::router::{DASHBOARD, LOGIN, MAIN};
use admin_client::session::Session;
use admin_client::storage::{FileStore, KeyValueStore, MemoryStore};
use admin_client::token::{TOKEN_KEY, TokenStore};
use admin_test_utils::{
    MockBackend, TEST_PASSWORD, TEST_TOKEN, TEST_USERNAME, menu_group, menu_leaf,
};
use reqwest::StatusCode;
use serde_json::json;

mod common;
use common::{temp_storage, token};

fn session_with(backend: &MockBackend, storage: Arc<dyn KeyValueStore>) -> Session {
    let tokens = TokenStore::new(storage);
    let api = ApiClient::new(&backend.url(), Duration::from_secs(5), tokens.clone()).unwrap();
    Session::new(tokens, api)
}

fn memory_session(backend: &MockBackend) -> Session {
    session_with(backend, Arc::new(MemoryStore::new()))
}

#[tokio::test]
async fn login_stores_token_and_registers_menu_routes() {
    let backend = MockBackend::start().await;
    let session = memory_session(&backend);

    let location = session.login(TEST_USERNAME, TEST_PASSWORD).await.unwrap();

    assert_eq!(location.name(), MAIN);
    assert_eq!(session.get_token().unwrap().unwrap().as_str(), TEST_TOKEN);
    assert_eq!(backend.menu_requests(), 1);
    assert_eq!(
        backend.last_authorization().as_deref(),
        Some("Bearer test-token")
    );

    let router = session.router();
    let names: Vec<&str> = router.dynamic_routes().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["overview", "users", "roles"]);
    assert_eq!(
        router.route("users").unwrap().component.as_str(),
        "views/system/Users.vue"
    );
    assert!(!router.has_route("system"));
}

#[tokio::test]
async fn bad_credentials_are_reported() {
    let backend = MockBackend::start().await;
    let session = memory_session(&backend);

    let err = session.login(TEST_USERNAME, "wrong").await.unwrap_err();

    match err {
        NavigationError::Api(ApiError::Status { status, body }) => {
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(body.contains("invalid username or password"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(session.get_token().unwrap().is_none());
    assert_eq!(backend.menu_requests(), 0);
}

#[tokio::test]
async fn verify_and_user_info_use_stored_token() {
    let backend = MockBackend::start().await;
    let session = memory_session(&backend);

    let err = session.user_info().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(backend.last_authorization(), None);
    assert!(session.verify().await.unwrap_err().is_unauthorized());

    session.set_token(&token(TEST_TOKEN)).unwrap();

    let info = session.user_info().await.unwrap();
    assert_eq!(info["username"], TEST_USERNAME);
    let verified = session.verify().await.unwrap();
    assert_eq!(verified["valid"], true);
}

#[tokio::test]
async fn logout_sends_user_back_to_login() {
    let backend = MockBackend::start().await;
    let session = memory_session(&backend);
    session.login(TEST_USERNAME, TEST_PASSWORD).await.unwrap();

    session.logout().unwrap();

    assert_eq!(session.current_route().as_deref(), Some(LOGIN));
    let location = session.navigate("/system/users").await.unwrap();
    assert_eq!(location.name(), LOGIN);
    assert_eq!(backend.menu_requests(), 1);
}

#[tokio::test]
async fn token_persists_across_sessions() {
    let backend = MockBackend::start().await;
    let path = temp_storage("persist");

    let first = session_with(&backend, Arc::new(FileStore::new(&path)));
    first.login(TEST_USERNAME, TEST_PASSWORD).await.unwrap();
    drop(first);

    let second = session_with(&backend, Arc::new(FileStore::new(&path)));
    let location = second.navigate("/system/roles").await.unwrap();

    assert_eq!(location.name(), "roles");
    assert_eq!(backend.login_requests(), 1);
    assert_eq!(backend.menu_requests(), 2);

    second.logout().unwrap();
    assert_eq!(FileStore::new(&path).get(TOKEN_KEY).unwrap(), None);
    std::fs::remove_file(&path).unwrap();
}

#[tokio::test]
async fn menu_endpoint_failure_stops_navigation() {
    let backend = MockBackend::start().await;
    backend.fail_menus(true);
    let session = memory_session(&backend);
    session.set_token(&token(TEST_TOKEN)).unwrap();

    let err = session.navigate("/system/users").await.unwrap_err();

    assert!(matches!(
        err,
        NavigationError::Api(ApiError::Status { status, .. }) if status == StatusCode::INTERNAL_SERVER_ERROR
    ));
    assert!(session.current_route().is_none());
}

#[tokio::test]
async fn concurrent_navigations_issue_one_request() {
    let backend = MockBackend::start().await;
    backend.set_menu_delay(Duration::from_millis(50));
    let session = memory_session(&backend);
    session.set_token(&token(TEST_TOKEN)).unwrap();

    let (a, b, c) = tokio::join!(
        session.navigate("/system/users"),
        session.navigate("roles"),
        session.navigate(MAIN),
    );

    assert_eq!(a.unwrap().name(), "users");
    assert_eq!(b.unwrap().name(), "roles");
    assert_eq!(c.unwrap().name(), MAIN);
    assert_eq!(backend.menu_requests(), 1);
}

#[tokio::test]
async fn nested_directories_register_in_tree_order() {
    let backend = MockBackend::with_menus(json!([
        menu_group(
            "ops",
            vec![
                menu_group("logs", vec![menu_leaf("audit", "/ops/logs/audit", "views/ops/Audit.vue")]),
                menu_leaf("jobs", "/ops/jobs", "views/ops/Jobs.vue"),
            ],
        ),
        menu_leaf("profile", "/users/:id", "views/Profile.vue"),
    ]))
    .await;
    let session = memory_session(&backend);
    session.set_token(&token(TEST_TOKEN)).unwrap();

    let location = session.navigate("/users/42").await.unwrap();
    assert_eq!(location.name(), "profile");
    assert_eq!(location.params.get("id").map(String::as_str), Some("42"));

    let names: Vec<String> = session
        .router()
        .dynamic_routes()
        .map(|r| r.name.clone())
        .collect();
    assert_eq!(names, ["audit", "jobs", "profile"]);
}

#[tokio::test]
async fn empty_directory_from_backend_does_not_block_navigation() {
    let backend = MockBackend::with_menus(json!([
        menu_leaf("users", "/system/users", "views/system/Users.vue"),
        {"code": "reports", "title": "Reports", "is_directory": true, "path": null, "children": []},
    ]))
    .await;
    let session = memory_session(&backend);
    session.set_token(&token(TEST_TOKEN)).unwrap();

    let location = session.navigate("/system/users").await.unwrap();
    assert_eq!(location.name(), "users");
    assert!(!session.router().has_route("reports"));

    session.navigate(DASHBOARD).await.unwrap();
    assert_eq!(backend.menu_requests(), 1);
}

#[tokio::test]
async fn api_client_fetches_menu_tree() {
    let backend = MockBackend::start().await;
    let tokens = TokenStore::new(Arc::new(MemoryStore::new()));
    tokens.set_token(&token(TEST_TOKEN)).unwrap();
    let api = ApiClient::new(&backend.url(), Duration::from_secs(5), tokens).unwrap();

    let menus = api.fetch_menus().await.unwrap();

    assert_eq!(menus.len(), 2);
    assert_eq!(menus[1].name, "system");
    assert_eq!(menus[1].children().len(), 2);
    assert_eq!(menus[1].children()[0].url.as_deref(), Some("/system/users"));
}
