//! Session-scoped client state.
//!
//! A [`Session`] owns everything that lives for one authenticated identity:
//! the token store, the menu store and the router. It starts with no menu
//! and only static routes; `set_token` and `clear_token` end the current
//! identity and drop its menu and dynamic routes.
//!
//! Navigations run the guard, and when the menu is missing they perform
//! fetch, register, move to main and proceed as one awaited sequence.
//! Fetches are serialized so that concurrent navigations issue one request.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use serde_json::Value as JsonValue;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, MenuSource};
use crate::error::{ApiError, NavResult, NavigationError, StorageError};
use crate::guard::{self, GuardDecision, GuardInput};
use crate::menu::MenuStore;
use crate::router::{
    LOGIN, Location, MAIN, PathResolver, Router, ViewResolver, register_menu_routes,
};
use crate::token::{Token, TokenStore};

/// Default bound on redirects followed by one navigation.
pub const DEFAULT_MAX_REDIRECTS: usize = 8;

/// A navigation target: a route name, or a path when it starts with `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Name(String),
    Path(String),
}

impl From<&str> for Target {
    fn from(s: &str) -> Self {
        if s.starts_with('/') {
            Target::Path(s.to_string())
        } else {
            Target::Name(s.to_string())
        }
    }
}

impl From<String> for Target {
    fn from(s: String) -> Self {
        Target::from(s.as_str())
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Name(name) => write!(f, "route '{name}'"),
            Target::Path(path) => write!(f, "path '{path}'"),
        }
    }
}

/// Client state for one identity at a time.
pub struct Session<S = ApiClient> {
    tokens: TokenStore,
    menus: MenuStore,
    router: RwLock<Router>,
    source: S,
    resolver: Arc<dyn ViewResolver>,
    // Serializes menu fetches.
    fetch_lock: Mutex<()>,
    // Bumped whenever the identity changes; fetches started under an older
    // identity are discarded.
    identity: AtomicU64,
    max_redirects: usize,
}

impl<S: MenuSource> Session<S> {
    pub fn new(tokens: TokenStore, source: S) -> Self {
        Self {
            tokens,
            menus: MenuStore::new(),
            router: RwLock::new(Router::new()),
            source,
            resolver: Arc::new(PathResolver),
            fetch_lock: Mutex::new(()),
            identity: AtomicU64::new(0),
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }

    /// Use a different component resolver for dynamic routes.
    pub fn with_resolver(mut self, resolver: Arc<dyn ViewResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn menus(&self) -> &MenuStore {
        &self.menus
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Read access to the route table.
    pub fn router(&self) -> RwLockReadGuard<'_, Router> {
        self.router.read()
    }

    /// Name of the current route, if any navigation has completed.
    pub fn current_route(&self) -> Option<String> {
        self.router.read().current().map(|loc| loc.name().to_string())
    }

    pub fn get_token(&self) -> Result<Option<Token>, StorageError> {
        self.tokens.get_token()
    }

    /// Store a token for a new identity. The previous identity's menu and
    /// dynamic routes are dropped so the next navigation refetches them.
    pub fn set_token(&self, token: &Token) -> Result<(), StorageError> {
        self.tokens.set_token(token)?;
        drop(self.end_identity());
        info!("session token set");
        Ok(())
    }

    /// Log out: remove the token, drop the menu, and go to the login route.
    pub fn clear_token(&self) -> Result<(), StorageError> {
        self.tokens.clear_token()?;

        let mut router = self.end_identity();
        if let Some(login) = router.locate(LOGIN) {
            router.push(login);
        }
        info!("session token cleared");
        Ok(())
    }

    /// Drop the current identity's menu and routes. Runs under the router
    /// write lock, which `load_menu` also holds while committing a fetch.
    fn end_identity(&self) -> RwLockWriteGuard<'_, Router> {
        let mut router = self.router.write();
        self.identity.fetch_add(1, Ordering::SeqCst);
        self.menus.clear();
        router.reset_dynamic();
        router
    }

    fn locate(&self, target: &Target) -> Option<Location> {
        let router = self.router.read();
        match target {
            Target::Name(name) => router.locate(name),
            Target::Path(path) => router.resolve_path(path),
        }
    }

    /// Navigate to `target`, running the guard on the way.
    ///
    /// On success the returned location is also the router's current route.
    /// On failure the current route is left as it was, except that a menu
    /// load that succeeded before the failure will have moved it to main.
    pub async fn navigate(&self, target: impl Into<Target>) -> NavResult<Location> {
        let mut target = target.into();

        for _ in 0..=self.max_redirects {
            let location = self.locate(&target);
            let input = GuardInput {
                target: location.as_ref().map(Location::name),
                has_token: self.tokens.get_token()?.is_some(),
                menu_loaded: self.menus.is_loaded(),
            };
            let decision = guard::decide(input);
            debug!(
                %target,
                has_token = input.has_token,
                menu_loaded = input.menu_loaded,
                ?decision,
                "navigation guard"
            );

            match decision {
                GuardDecision::Proceed => return self.proceed(&target, location),
                GuardDecision::Redirect(name) => {
                    info!(from = %target, to = name, "navigation redirected");
                    target = Target::Name(name.to_string());
                }
                GuardDecision::LoadMenu => {
                    self.load_menu().await?;
                    if let Some(main) = self.locate(&Target::Name(MAIN.to_string())) {
                        self.router.write().push(main);
                    }
                    // Routes may have appeared for a path that was unknown before.
                    let location = self.locate(&target);
                    return self.proceed(&target, location);
                }
            }
        }

        warn!(%target, limit = self.max_redirects, "redirect limit reached");
        Err(NavigationError::RedirectLoop(self.max_redirects))
    }

    fn proceed(&self, target: &Target, location: Option<Location>) -> NavResult<Location> {
        let location = location.ok_or_else(|| NavigationError::NotFound(target.to_string()))?;
        self.router.write().push(location.clone());
        info!(route = %location.name(), "navigated");
        Ok(location)
    }

    /// Fetch the menu and register its routes unless another navigation
    /// already did so. Returns the number of routes registered here.
    pub async fn load_menu(&self) -> NavResult<usize> {
        let _in_flight = self.fetch_lock.lock().await;
        if self.menus.is_loaded() {
            debug!("menu loaded by a concurrent navigation");
            return Ok(0);
        }

        let identity = self.identity.load(Ordering::SeqCst);
        let menus = self.source.fetch_menus().await?;

        let mut router = self.router.write();
        if self.identity.load(Ordering::SeqCst) != identity {
            warn!("discarding menu fetched for a previous identity");
            return Err(NavigationError::Interrupted);
        }
        let added = register_menu_routes(&mut router, &menus, self.resolver.as_ref())?;
        self.menus.set_menu_list(menus);
        Ok(added)
    }
}

impl Session<ApiClient> {
    /// Log in, store the token and go to the main route.
    pub async fn login(&self, username: &str, password: &str) -> NavResult<Location> {
        let token = self.source.login(username, password).await?;
        self.set_token(&token)?;
        self.navigate(MAIN).await
    }

    /// Log out. Equivalent to [`Session::clear_token`].
    pub fn logout(&self) -> Result<(), StorageError> {
        self.clear_token()
    }

    pub async fn verify(&self) -> Result<JsonValue, ApiError> {
        self.source.verify_login().await
    }

    pub async fn user_info(&self) -> Result<JsonValue, ApiError> {
        self.source.user_info().await
    }
}

impl<S> fmt::Debug for Session<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("menus", &self.menus)
            .field("router", &*self.router.read())
            .field("max_redirects", &self.max_redirects)
            .finish_non_exhaustive()
    }
}
