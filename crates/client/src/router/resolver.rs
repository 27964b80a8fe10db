//! Resolving menu component paths to view references.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

/// Normalized reference to a view component, e.g. `views/system/Users.vue`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ComponentRef(String);

impl ComponentRef {
    /// Normalize a component path as written in a menu payload.
    ///
    /// Accepts `@/views/X.vue`, `/views/X.vue`, `./views/X.vue` and
    /// `views/X.vue` as the same view. Rejects empty paths, empty segments
    /// and `.`/`..` segments.
    pub fn parse(raw: &str) -> Option<Self> {
        let mut path = raw.trim();
        for prefix in ["@/", "./", "/"] {
            if let Some(rest) = path.strip_prefix(prefix) {
                path = rest;
                break;
            }
        }
        if path.is_empty() {
            return None;
        }
        let valid = path
            .split('/')
            .all(|seg| !seg.is_empty() && seg != "." && seg != ".." && !seg.contains('\\'));
        valid.then(|| Self(path.to_string()))
    }

    /// Wrap an already normalized path.
    pub(crate) fn new_unchecked(path: &str) -> Self {
        Self(path.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Turns a menu leaf's component path into a view reference.
pub trait ViewResolver: Send + Sync {
    /// `None` if the path does not name a view this client can show.
    fn resolve(&self, component_path: &str) -> Option<ComponentRef>;
}

/// Accepts any well-formed component path.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathResolver;

impl ViewResolver for PathResolver {
    fn resolve(&self, component_path: &str) -> Option<ComponentRef> {
        ComponentRef::parse(component_path)
    }
}

/// Accepts only views from a fixed catalog.
#[derive(Debug, Clone, Default)]
pub struct ViewCatalog {
    views: BTreeSet<ComponentRef>,
}

impl ViewCatalog {
    pub fn new<I, S>(views: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            views: views
                .into_iter()
                .filter_map(|v| ComponentRef::parse(v.as_ref()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

impl ViewResolver for ViewCatalog {
    fn resolve(&self, component_path: &str) -> Option<ComponentRef> {
        ComponentRef::parse(component_path).filter(|c| self.views.contains(c))
    }
}
