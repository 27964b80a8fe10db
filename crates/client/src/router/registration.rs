//! Registering routes from the menu tree.

use std::collections::HashSet;

use tracing::{debug, info};

use super::{MAIN, Route, Router, ViewResolver, normalize_path};
use crate::error::RegistrationError;
use crate::menu::MenuNode;

/// Deepest menu nesting accepted.
pub const MAX_MENU_DEPTH: usize = 32;

/// Register one route per leaf of `menus` under the main container.
///
/// Leaves are visited depth-first, left to right, and registered in that
/// order. Grouping nodes produce no route. The batch is validated as a
/// whole: on error nothing is registered. Returns the number of routes added.
pub fn register_menu_routes(
    router: &mut Router,
    menus: &[MenuNode],
    resolver: &dyn ViewResolver,
) -> Result<usize, RegistrationError> {
    let mut pending = Vec::new();
    collect_leaves(menus, resolver, 0, &mut pending)?;

    let mut names: HashSet<&str> = HashSet::new();
    let mut paths: HashSet<String> = router
        .routes()
        .iter()
        .map(|r| normalize_path(&r.path))
        .collect();

    for route in &pending {
        if router.has_route(&route.name) || !names.insert(&route.name) {
            return Err(RegistrationError::DuplicateName(route.name.clone()));
        }
        if !paths.insert(normalize_path(&route.path)) {
            return Err(RegistrationError::DuplicatePath {
                name: route.name.clone(),
                path: route.path.clone(),
            });
        }
    }

    let count = pending.len();
    for route in pending {
        router.insert(route);
    }
    info!(routes = count, "menu routes registered");
    Ok(count)
}

fn collect_leaves(
    nodes: &[MenuNode],
    resolver: &dyn ViewResolver,
    depth: usize,
    out: &mut Vec<Route>,
) -> Result<(), RegistrationError> {
    if depth >= MAX_MENU_DEPTH {
        return Err(RegistrationError::TooDeep(MAX_MENU_DEPTH));
    }

    for node in nodes {
        if node.is_leaf() {
            out.push(leaf_route(node, resolver)?);
        } else {
            debug!(group = %node.name, children = node.children().len(), "descending into menu group");
            collect_leaves(node.children(), resolver, depth + 1, out)?;
        }
    }
    Ok(())
}

fn leaf_route(node: &MenuNode, resolver: &dyn ViewResolver) -> Result<Route, RegistrationError> {
    let name = node.name.trim();
    let Some(url) = node.url.as_deref().map(str::trim).filter(|u| !u.is_empty()) else {
        return Err(RegistrationError::IncompleteLeaf(display_name(node), "url"));
    };
    if name.is_empty() {
        return Err(RegistrationError::IncompleteLeaf(url.to_string(), "name"));
    }
    let Some(component_path) = node
        .component_path
        .as_deref()
        .filter(|c| !c.trim().is_empty())
    else {
        return Err(RegistrationError::IncompleteLeaf(
            name.to_string(),
            "component path",
        ));
    };
    let Some(component) = resolver.resolve(component_path) else {
        return Err(RegistrationError::UnresolvedComponent {
            name: name.to_string(),
            component: component_path.to_string(),
        });
    };

    Ok(Route {
        name: name.to_string(),
        path: url.to_string(),
        component,
        parent: Some(MAIN.to_string()),
        dynamic: true,
    })
}

fn display_name(node: &MenuNode) -> String {
    if node.name.trim().is_empty() {
        "<unnamed>".to_string()
    } else {
        node.name.trim().to_string()
    }
}
