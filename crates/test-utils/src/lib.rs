//! Admin client test utilities.
//!
//! Helpers for integration testing: menu fixtures and an in-process mock of
//! the admin backend's authentication and menu endpoints.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{Value as JsonValue, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Username the mock backend accepts.
pub const TEST_USERNAME: &str = "admin";

/// Password the mock backend accepts.
pub const TEST_PASSWORD: &str = "secret";

/// Token issued by the mock backend on a successful login.
pub const TEST_TOKEN: &str = "test-token";

/// A leaf menu entry in the backend's wire format.
pub fn menu_leaf(code: &str, path: &str, component_path: &str) -> JsonValue {
    json!({
        "code": code,
        "title": code,
        "is_directory": false,
        "path": path,
        "component_path": component_path,
        "sort": 0,
        "is_visible": true,
        "children": null,
    })
}

/// A directory menu entry in the backend's wire format.
pub fn menu_group(code: &str, children: Vec<JsonValue>) -> JsonValue {
    json!({
        "code": code,
        "title": code,
        "is_directory": true,
        "path": null,
        "sort": 0,
        "is_visible": true,
        "children": children,
    })
}

/// The menu used by most tests: one leaf, one directory with two leaves.
pub fn sample_menu() -> JsonValue {
    json!([
        menu_leaf("overview", "/overview", "views/Overview.vue"),
        menu_group(
            "system",
            vec![
                menu_leaf("users", "/system/users", "views/system/Users.vue"),
                menu_leaf("roles", "/system/roles", "views/system/Roles.vue"),
            ],
        ),
    ])
}

#[derive(Debug)]
struct MockState {
    menus: Mutex<JsonValue>,
    menu_delay: Mutex<Duration>,
    fail_menus: AtomicBool,
    menu_requests: AtomicUsize,
    login_requests: AtomicUsize,
    last_authorization: Mutex<Option<String>>,
}

/// A running mock backend bound to a local port.
///
/// The server task is aborted when the value is dropped.
#[derive(Debug)]
pub struct MockBackend {
    addr: SocketAddr,
    state: Arc<MockState>,
    handle: JoinHandle<()>,
}

impl MockBackend {
    /// Start a backend serving [`sample_menu`].
    pub async fn start() -> Self {
        Self::with_menus(sample_menu()).await
    }

    /// Start a backend serving `menus` from `GET /api/system/menus/`.
    pub async fn with_menus(menus: JsonValue) -> Self {
        let state = Arc::new(MockState {
            menus: Mutex::new(menus),
            menu_delay: Mutex::new(Duration::ZERO),
            fail_menus: AtomicBool::new(false),
            menu_requests: AtomicUsize::new(0),
            login_requests: AtomicUsize::new(0),
            last_authorization: Mutex::new(None),
        });

        let app = Router::new()
            .route("/api/login/", post(login))
            .route("/api/login_verify/", post(verify))
            .route("/api/login_user_info/", get(user_info))
            .route("/api/system/menus/", get(menus_handler))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap_or_else(|e| panic!("failed to bind mock backend: {e}"));
        let addr = listener
            .local_addr()
            .unwrap_or_else(|e| panic!("mock backend has no local address: {e}"));

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "mock backend stopped");
            }
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    /// Base URL to point a client at.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Replace the served menu.
    pub fn set_menus(&self, menus: JsonValue) {
        *self.state.menus.lock() = menus;
    }

    /// Delay every menu response.
    pub fn set_menu_delay(&self, delay: Duration) {
        *self.state.menu_delay.lock() = delay;
    }

    /// Make the menu endpoint answer 500.
    pub fn fail_menus(&self, fail: bool) {
        self.state.fail_menus.store(fail, Ordering::SeqCst);
    }

    /// Number of menu requests received, failed ones included.
    pub fn menu_requests(&self) -> usize {
        self.state.menu_requests.load(Ordering::SeqCst)
    }

    pub fn login_requests(&self) -> usize {
        self.state.login_requests.load(Ordering::SeqCst)
    }

    /// `Authorization` header of the most recent authenticated request.
    pub fn last_authorization(&self) -> Option<String> {
        self.state.last_authorization.lock().clone()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[derive(Debug, Deserialize)]
struct LoginBody {
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct VerifyBody {
    token: Option<String>,
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

/// Check the bearer token, recording the header as seen.
fn authorized(state: &MockState, headers: &HeaderMap) -> bool {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let expected = format!("Bearer {TEST_TOKEN}");
    let ok = value.as_deref() == Some(expected.as_str());
    *state.last_authorization.lock() = value;
    ok
}

async fn login(State(state): State<Arc<MockState>>, Json(body): Json<LoginBody>) -> Response {
    state.login_requests.fetch_add(1, Ordering::SeqCst);
    if body.username == TEST_USERNAME && body.password == TEST_PASSWORD {
        Json(json!({ "access_token": TEST_TOKEN, "token_type": "Bearer" })).into_response()
    } else {
        detail(StatusCode::BAD_REQUEST, "invalid username or password")
    }
}

async fn verify(Json(body): Json<VerifyBody>) -> Response {
    if body.token.as_deref() == Some(TEST_TOKEN) {
        Json(json!({ "valid": true, "username": TEST_USERNAME })).into_response()
    } else {
        detail(StatusCode::UNAUTHORIZED, "invalid token")
    }
}

async fn user_info(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if !authorized(&state, &headers) {
        return detail(StatusCode::UNAUTHORIZED, "not authenticated");
    }
    Json(json!({ "username": TEST_USERNAME, "roles": ["admin"] })).into_response()
}

async fn menus_handler(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.menu_requests.fetch_add(1, Ordering::SeqCst);
    if !authorized(&state, &headers) {
        return detail(StatusCode::UNAUTHORIZED, "not authenticated");
    }

    let delay = *state.menu_delay.lock();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    if state.fail_menus.load(Ordering::SeqCst) {
        return detail(StatusCode::INTERNAL_SERVER_ERROR, "menu service unavailable");
    }

    let menus = state.menus.lock().clone();
    Json(menus).into_response()
}
