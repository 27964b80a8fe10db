#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! [`StubSource`] stands in for the backend where a test only cares about
//! the menu; tests that exercise HTTP use `admin_test_utils::MockBackend`.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::StatusCode;

use admin_client::api::MenuSource;
use admin_client::error::ApiError;
use admin_client::menu::MenuNode;
use admin_client::session::Session;
use admin_client::storage::MemoryStore;
use admin_client::token::{Token, TokenStore};

/// Menu source returning a fixed tree.
#[derive(Debug, Default)]
pub struct StubSource {
    menus: Mutex<Vec<MenuNode>>,
    delay: Mutex<Duration>,
    fail: AtomicBool,
    calls: AtomicUsize,
}

impl StubSource {
    pub fn new(menus: Vec<MenuNode>) -> Self {
        Self {
            menus: Mutex::new(menus),
            ..Self::default()
        }
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.lock() = delay;
        self
    }

    pub fn set_menus(&self, menus: Vec<MenuNode>) {
        *self.menus.lock() = menus;
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Number of fetches started.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MenuSource for StubSource {
    async fn fetch_menus(&self) -> Result<Vec<MenuNode>, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: "menu service unavailable".to_string(),
            });
        }
        Ok(self.menus.lock().clone())
    }
}

/// Menu source whose tree depends on the stored token: one leaf named
/// `home_<token>`.
pub struct IdentitySource {
    tokens: TokenStore,
}

impl IdentitySource {
    pub fn new(tokens: TokenStore) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl MenuSource for IdentitySource {
    async fn fetch_menus(&self) -> Result<Vec<MenuNode>, ApiError> {
        let raw = self
            .tokens
            .get_token()?
            .map(|t| t.as_str().to_string())
            .unwrap_or_default();
        tokio::task::yield_now().await;
        Ok(vec![MenuNode::leaf(
            &format!("home_{raw}"),
            &format!("/home/{raw}"),
            "views/Home.vue",
        )])
    }
}

/// The example tree: a leaf, and a group holding one leaf.
pub fn example_menu() -> Vec<MenuNode> {
    vec![
        MenuNode::leaf("dash", "/d", "Dash.vue"),
        MenuNode::group("grp", vec![MenuNode::leaf("sub", "/g/sub", "Sub.vue")]),
    ]
}

/// Session over in-memory storage with no token.
pub fn session(source: StubSource) -> Session<StubSource> {
    Session::new(TokenStore::new(Arc::new(MemoryStore::new())), source)
}

/// Session over in-memory storage holding `raw` as its token.
pub fn logged_in(source: StubSource, raw: &str) -> Session<StubSource> {
    let session = session(source);
    session.set_token(&token(raw)).unwrap();
    session
}

pub fn token(raw: &str) -> Token {
    Token::new(raw).unwrap()
}

/// A fresh storage file path for this test binary.
pub fn temp_storage(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("admin-client-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(format!("{name}-{}.json", uuid::Uuid::now_v7()));
    let _ = std::fs::remove_file(&path);
    path
}
