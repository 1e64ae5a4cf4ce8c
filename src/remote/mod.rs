//! The remote document store and how requests reach it.
//!
//! The store is reached only through four operations. Requests run off the
//! UI thread via a [`Dispatch`] implementation and come back as
//! [`Completion`]s that the application state applies one at a time.

mod dispatch;
mod local;
#[cfg(test)]
mod memory;
mod retry;

pub use dispatch::{
    execute, Completion, Dispatch, InlineDispatcher, Request, Response, ThreadDispatcher, Ticket,
    Waker,
};
pub use local::LocalDocumentStore;
pub use retry::RetryPolicy;

#[cfg(test)]
pub use dispatch::ManualDispatcher;
#[cfg(test)]
pub use memory::MemoryDocumentStore;

use crate::error::Result;

/// The four operations offered by the document store.
///
/// Paths are the same strings used as tab identifiers. A non-success answer
/// carries the store's message, which is shown to the user verbatim.
pub trait DocumentStore: Send {
    /// Read the full content of a document.
    fn fetch_content(&self, path: &str) -> Result<String>;

    /// Replace the full content of a document.
    fn persist_content(&self, path: &str, content: &str) -> Result<()>;

    /// Create a note or folder under `parent` and return its path.
    ///
    /// A name ending in `/` creates a folder.
    fn create_node(&self, parent: &str, name: &str) -> Result<String>;

    /// Move `source` into the folder `dest_dir`, keeping its file name.
    fn move_node(&self, source: &str, dest_dir: &str) -> Result<()>;
}

/// Where a moved node ends up: `dest_dir` joined with the source file name.
pub fn moved_path(source: &str, dest_dir: &str) -> String {
    let name = std::path::Path::new(source)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| source.to_string());
    std::path::Path::new(dest_dir)
        .join(name)
        .to_string_lossy()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moved_path() {
        assert_eq!(moved_path("/n/a.md", "/n/archive"), "/n/archive/a.md");
        assert_eq!(moved_path("/n/a.md", "/n/archive/"), "/n/archive/a.md");
    }
}
