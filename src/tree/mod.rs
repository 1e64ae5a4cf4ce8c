//! Document tree: scanning the notes folder and remembering which folders
//! are expanded.

mod node;
pub mod visibility;

pub use node::{scan_notes_root, DocumentNode, IgnoreSet, NodeKind};
pub use visibility::NodeId;
