//! Client-side route table.
//!
//! Starts with the static routes every session has (login, the main
//! container, the dashboard) and grows at runtime as the menu tree is
//! registered. Routes are kept in registration order.

mod registration;
mod resolver;

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

pub use registration::{MAX_MENU_DEPTH, register_menu_routes};
pub use resolver::{ComponentRef, PathResolver, ViewCatalog, ViewResolver};

/// Name of the login route.
pub const LOGIN: &str = "login";

/// Name of the container route dynamic routes are nested under. Also the
/// home route authenticated users are sent to.
pub const MAIN: &str = "main";

/// Name of the statically declared dashboard route.
pub const DASHBOARD: &str = "dashboard";

/// A named route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub name: String,
    /// Path pattern; `:name` segments capture parameters.
    pub path: String,
    pub component: ComponentRef,
    /// Name of the enclosing route, if nested.
    pub parent: Option<String>,
    /// False for the built-in routes.
    pub dynamic: bool,
}

/// Where a navigation ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub route: Route,
    /// Path parameters extracted (e.g., {"id": "42"}).
    pub params: HashMap<String, String>,
}

impl Location {
    pub fn name(&self) -> &str {
        &self.route.name
    }
}

/// The route table plus the current location.
#[derive(Debug)]
pub struct Router {
    routes: Vec<Route>,
    by_name: HashMap<String, usize>,
    current: Option<Location>,
}

impl Router {
    /// Router holding only the static routes.
    pub fn new() -> Self {
        let mut router = Self {
            routes: Vec::new(),
            by_name: HashMap::new(),
            current: None,
        };
        for (name, path, component, parent) in [
            (LOGIN, "/login", "views/Login.vue", None),
            (MAIN, "/", "views/container/Container.vue", None),
            (
                DASHBOARD,
                "/dashboard",
                "views/dashboard/Dashboard.vue",
                Some(MAIN),
            ),
        ] {
            router.insert(Route {
                name: name.to_string(),
                path: path.to_string(),
                component: ComponentRef::new_unchecked(component),
                parent: parent.map(str::to_string),
                dynamic: false,
            });
        }
        router
    }

    /// Append a route. Callers validate uniqueness first.
    pub(crate) fn insert(&mut self, route: Route) {
        debug!(name = %route.name, path = %route.path, "route added");
        self.by_name.insert(route.name.clone(), self.routes.len());
        self.routes.push(route);
    }

    /// Drop every dynamic route, keeping the static ones.
    pub(crate) fn reset_dynamic(&mut self) {
        let before = self.routes.len();
        self.routes.retain(|r| !r.dynamic);
        self.by_name = self
            .routes
            .iter()
            .enumerate()
            .map(|(i, r)| (r.name.clone(), i))
            .collect();
        if self
            .current
            .as_ref()
            .is_some_and(|loc| loc.route.dynamic)
        {
            self.current = None;
        }
        debug!(removed = before - self.routes.len(), "dynamic routes reset");
    }

    pub fn route(&self, name: &str) -> Option<&Route> {
        self.by_name.get(name).map(|&i| &self.routes[i])
    }

    pub fn has_route(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// All routes in registration order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Routes added from the menu, in registration order.
    pub fn dynamic_routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter().filter(|r| r.dynamic)
    }

    /// Find the route whose pattern matches `path`.
    ///
    /// Literal patterns win over parameterized ones; among those, the route
    /// registered first wins.
    pub fn resolve_path(&self, path: &str) -> Option<Location> {
        let path = normalize_path(path);
        let mut best: Option<(usize, &Route, HashMap<String, String>)> = None;

        for route in &self.routes {
            let Some(params) = match_pattern(&normalize_path(&route.path), &path) else {
                continue;
            };
            if best.as_ref().is_none_or(|(count, _, _)| params.len() < *count) {
                best = Some((params.len(), route, params));
            }
        }

        best.map(|(_, route, params)| Location {
            route: route.clone(),
            params,
        })
    }

    /// Location for a route by name, with no parameters.
    pub fn locate(&self, name: &str) -> Option<Location> {
        self.route(name).map(|route| Location {
            route: route.clone(),
            params: HashMap::new(),
        })
    }

    pub fn current(&self) -> Option<&Location> {
        self.current.as_ref()
    }

    pub(crate) fn push(&mut self, location: Location) {
        debug!(route = %location.route.name, "current route set");
        self.current = Some(location);
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

/// Strip a trailing slash (except for the root) and make the path absolute.
fn normalize_path(path: &str) -> String {
    let trimmed = path.trim();
    let trimmed = trimmed.strip_suffix('/').filter(|p| !p.is_empty()).unwrap_or(trimmed);
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Match a route pattern against a path, extracting parameters.
///
/// Pattern: "/users/:id/edit"
/// Path: "/users/42/edit"
/// Result: Some({"id": "42"})
fn match_pattern(pattern: &str, path: &str) -> Option<HashMap<String, String>> {
    let pattern_parts: Vec<&str> = pattern.split('/').collect();
    let path_parts: Vec<&str> = path.split('/').collect();

    if pattern_parts.len() != path_parts.len() {
        return None;
    }

    let mut params = HashMap::new();

    for (pat, actual) in pattern_parts.iter().zip(path_parts.iter()) {
        if let Some(param_name) = pat.strip_prefix(':') {
            if actual.is_empty() {
                return None;
            }
            params.insert(param_name.to_string(), actual.to_string());
        } else if pat != actual {
            return None;
        }
    }

    Some(params)
}
