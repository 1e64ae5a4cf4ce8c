//! Durable expand/collapse state for document tree folders.
//!
//! Each folder row has a stable [`NodeId`] derived from its path. The
//! expansion flag is stored under that id as `"true"` or `"false"`; a
//! folder with no stored flag starts collapsed.

use crate::error::Result;
use crate::storage::{bool_value, KeyValueStore};
use log::debug;
use std::fmt::Write as _;

/// Prefix shared by every tree node id.
pub const NODE_ID_PREFIX: &str = "tree-";

/// Stable identifier of a tree row, also used as its store key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeId(String);

impl NodeId {
    /// Derive the id for a node path.
    ///
    /// ASCII letters, digits, `-` and `.` are kept; every other byte becomes
    /// `_XX` in uppercase hex. `_` is always escaped, so distinct paths never
    /// collide.
    pub fn for_path(path: &str) -> Self {
        let mut id = String::with_capacity(NODE_ID_PREFIX.len() + path.len());
        id.push_str(NODE_ID_PREFIX);
        for byte in path.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'.' {
                id.push(byte as char);
            } else {
                let _ = write!(id, "_{:02X}", byte);
            }
        }
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Record whether a folder is expanded.
pub fn set_expanded(store: &mut dyn KeyValueStore, id: &NodeId, expanded: bool) -> Result<()> {
    debug!("Folder {} expanded: {}", id, expanded);
    store.set(id.as_str(), bool_value(expanded))
}

/// Whether a folder should render expanded.
///
/// Absent means collapsed. Any stored value other than `"false"` counts as
/// expanded.
pub fn is_expanded(store: &dyn KeyValueStore, id: &NodeId) -> bool {
    match store.get(id.as_str()) {
        Some(value) => value != "false",
        None => false,
    }
}
