//! Session-wide holder of the fetched menu tree.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use super::MenuNode;

/// Reactive menu list. Writers replace the whole list; readers get cheap
/// snapshots or subscribe to changes.
#[derive(Debug)]
pub struct MenuStore {
    tx: watch::Sender<Arc<[MenuNode]>>,
}

impl MenuStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Arc::from(Vec::new()));
        Self { tx }
    }

    /// Replace the list. Last write wins.
    pub fn set_menu_list(&self, list: Vec<MenuNode>) {
        let len = list.len();
        self.tx.send_replace(Arc::from(list));
        debug!(menus = len, "menu list replaced");
    }

    /// Snapshot of the current list.
    pub fn get_menu_list(&self) -> Arc<[MenuNode]> {
        self.tx.borrow().clone()
    }

    /// Number of top-level nodes; zero means the menu has not been loaded.
    pub fn get_menu_length(&self) -> usize {
        self.tx.borrow().len()
    }

    pub fn is_loaded(&self) -> bool {
        self.get_menu_length() > 0
    }

    pub fn clear(&self) {
        self.set_menu_list(Vec::new());
    }

    /// Receiver notified on every replacement.
    pub fn subscribe(&self) -> watch::Receiver<Arc<[MenuNode]>> {
        self.tx.subscribe()
    }
}

impl Default for MenuStore {
    fn default() -> Self {
        Self::new()
    }
}
