//! Menu tree nodes as served by the backend.

use serde::{Deserialize, Serialize};

/// One node of the permission-scoped menu tree.
///
/// A node flagged as a directory, or with a non-empty `children` list, is a
/// grouping node; anything else is a leaf that maps to exactly one view.
/// Directories without children register nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuNode {
    /// Route name; the backend's menu `code`.
    #[serde(alias = "code")]
    pub name: String,

    /// Route path (e.g. "/system/users"); empty for directories.
    #[serde(default, alias = "path")]
    pub url: Option<String>,

    /// View component path (e.g. "views/system/Users.vue").
    #[serde(default)]
    pub component_path: Option<String>,

    #[serde(default)]
    pub children: Option<Vec<MenuNode>>,

    /// Backend row id.
    #[serde(default)]
    pub id: Option<i64>,

    /// Display title.
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub icon: Option<String>,

    /// Display order assigned by the backend. Not used to reorder.
    #[serde(default)]
    pub sort: i32,

    /// Whether the node appears in navigation. Hidden leaves still route.
    #[serde(default = "default_true")]
    pub is_visible: bool,

    #[serde(default, alias = "is_catalog")]
    pub is_directory: bool,

    #[serde(default)]
    pub parent_id: Option<i64>,
}

fn default_true() -> bool {
    true
}

impl MenuNode {
    /// A leaf node.
    pub fn leaf(name: &str, url: &str, component_path: &str) -> Self {
        Self {
            name: name.to_string(),
            url: Some(url.to_string()),
            component_path: Some(component_path.to_string()),
            is_directory: false,
            ..Self::group(name, Vec::new())
        }
    }

    /// A grouping node.
    pub fn group(name: &str, children: Vec<MenuNode>) -> Self {
        Self {
            name: name.to_string(),
            url: None,
            component_path: None,
            children: Some(children),
            id: None,
            title: None,
            icon: None,
            sort: 0,
            is_visible: true,
            is_directory: true,
            parent_id: None,
        }
    }

    /// Child nodes, empty for leaves.
    pub fn children(&self) -> &[MenuNode] {
        self.children.as_deref().unwrap_or_default()
    }

    pub fn is_leaf(&self) -> bool {
        !self.is_directory && self.children().is_empty()
    }

    /// Title if set, otherwise the route name.
    pub fn label(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    /// Number of leaves under (and including) this node. Empty directories
    /// count zero.
    pub fn leaf_count(&self) -> usize {
        if self.is_leaf() {
            1
        } else {
            self.children().iter().map(MenuNode::leaf_count).sum()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_shape() {
        let json = r#"[
            {"name": "dash", "url": "/d", "component_path": "Dash.vue"},
            {"name": "grp", "children": [
                {"name": "sub", "url": "/g/sub", "component_path": "Sub.vue"}
            ]}
        ]"#;
        let nodes: Vec<MenuNode> = serde_json::from_str(json).unwrap();

        assert_eq!(nodes.len(), 2);
        assert!(nodes[0].is_leaf());
        assert!(!nodes[1].is_leaf());
        assert_eq!(nodes[1].children()[0].url.as_deref(), Some("/g/sub"));
        assert!(nodes[0].is_visible);
    }

    #[test]
    fn parses_backend_tree_shape() {
        let json = r#"{
            "id": 3, "code": "system", "title": "System", "is_directory": true,
            "path": null, "icon": "el-icon-setting", "sort": 2, "is_visible": true,
            "parent_id": null,
            "children": [{
                "id": 4, "code": "users", "title": "Users", "is_directory": false,
                "path": "/system/users", "component_path": "views/system/Users.vue",
                "sort": 0, "is_visible": false, "parent_id": 3, "children": null
            }]
        }"#;
        let node: MenuNode = serde_json::from_str(json).unwrap();

        assert_eq!(node.name, "system");
        assert_eq!(node.label(), "System");
        let child = &node.children()[0];
        assert_eq!(child.name, "users");
        assert_eq!(child.url.as_deref(), Some("/system/users"));
        assert_eq!(child.component_path.as_deref(), Some("views/system/Users.vue"));
        assert!(!child.is_visible);
        assert!(child.is_leaf());
    }

    #[test]
    fn empty_children_without_directory_flag_is_a_leaf() {
        let node: MenuNode = serde_json::from_str(
            r#"{"name": "x", "url": "/x", "component_path": "X.vue", "children": []}"#,
        )
        .unwrap();
        assert!(node.is_leaf());
        assert_eq!(node.leaf_count(), 1);
    }

    #[test]
    fn childless_directory_is_not_a_leaf() {
        let node: MenuNode =
            serde_json::from_str(r#"{"code": "reports", "is_directory": true, "path": null}"#)
                .unwrap();
        assert!(!node.is_leaf());
        assert!(node.children().is_empty());
        assert_eq!(node.leaf_count(), 0);

        let node: MenuNode =
            serde_json::from_str(r#"{"name": "reports", "url": "/r", "is_catalog": true}"#).unwrap();
        assert!(node.is_directory);
        assert!(!node.is_leaf());

        assert!(!MenuNode::group("empty", Vec::new()).is_leaf());
    }

    #[test]
    fn leaf_count_walks_tree() {
        let tree = MenuNode::group(
            "root",
            vec![
                MenuNode::leaf("a", "/a", "A.vue"),
                MenuNode::group("g", vec![MenuNode::leaf("b", "/b", "B.vue")]),
            ],
        );
        assert_eq!(tree.leaf_count(), 2);
    }
}
