//! Menu tree model and the session's menu store.
//!
//! The backend decides which views a user may reach and sends them as a
//! tree: directories group entries, leaves name a route path and the view
//! component that renders it.

mod node;
mod store;

pub use node::MenuNode;
pub use store::MenuStore;
