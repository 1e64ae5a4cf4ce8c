//! Open tabs and the active tab, kept durable across restarts.
//!
//! `Session` is the data owner. It knows how to read itself from and write
//! itself to a `KeyValueStore`, and it enforces two invariants on every
//! mutation: `open_paths` holds no duplicates, and `active_path`, when set,
//! is one of `open_paths`. Deciding *when* to mutate is the job of the tab
//! lifecycle controller in `state`.

mod codec;
mod tab;

pub use codec::{join_paths, split_paths};
pub use tab::{display_name, DocumentKind, Tab};

use crate::error::Result;
use crate::storage::KeyValueStore;
use log::debug;

/// Store key holding the delimiter-joined open tab paths.
pub const OPEN_TABS_KEY: &str = "openTabPaths";

/// Store key holding the active tab path.
pub const ACTIVE_TAB_KEY: &str = "activeTabPath";

/// Ordered open tabs plus the active one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    open_paths: Vec<String>,
    active_path: Option<String>,
}

impl Session {
    /// An empty session: no tabs, nothing active.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a session from raw parts, repairing anything that breaks the
    /// invariants: duplicates keep their first position, and an active path
    /// that is not open is dropped.
    pub fn from_parts(open_paths: Vec<String>, active_path: Option<String>) -> Self {
        let mut session = Self::new();
        for path in open_paths {
            session.open(&path);
        }
        session.active_path = active_path.filter(|p| session.contains(p));
        session
    }

    /// Read the session from the store.
    ///
    /// Absent or malformed entries give the empty session; this never fails.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let open_paths = store
            .get(OPEN_TABS_KEY)
            .map(|value| split_paths(&value))
            .unwrap_or_default();
        let active_path = store.get(ACTIVE_TAB_KEY).filter(|p| !p.is_empty());

        let session = Self::from_parts(open_paths, active_path);
        debug!(
            "Loaded session: {} open tab(s), active: {:?}",
            session.open_paths.len(),
            session.active_path
        );
        session
    }

    /// Write the session to the store.
    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<()> {
        store.set(OPEN_TABS_KEY, &join_paths(&self.open_paths))?;
        match &self.active_path {
            Some(path) => store.set(ACTIVE_TAB_KEY, path),
            None => store.remove(ACTIVE_TAB_KEY),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Open paths in tab-bar order.
    pub fn open_paths(&self) -> &[String] {
        &self.open_paths
    }

    /// The active path, if any.
    pub fn active_path(&self) -> Option<&str> {
        self.active_path.as_deref()
    }

    /// Whether `path` is open.
    pub fn contains(&self, path: &str) -> bool {
        self.open_paths.iter().any(|p| p == path)
    }

    /// Number of open tabs.
    pub fn len(&self) -> usize {
        self.open_paths.len()
    }

    /// Whether no tabs are open.
    pub fn is_empty(&self) -> bool {
        self.open_paths.is_empty()
    }

    /// Tab bar projection.
    pub fn tabs(&self) -> Vec<Tab> {
        self.open_paths
            .iter()
            .map(|p| Tab::new(p.clone(), self.active_path.as_deref() == Some(p.as_str())))
            .collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Append `path` unless it is already open. Returns whether it was added.
    pub fn open(&mut self, path: &str) -> bool {
        if self.contains(path) {
            return false;
        }
        self.open_paths.push(path.to_string());
        true
    }

    /// Make an open `path` active. Returns `false` if it is not open.
    pub fn activate(&mut self, path: &str) -> bool {
        if !self.contains(path) {
            return false;
        }
        self.active_path = Some(path.to_string());
        true
    }

    /// Remove `path`. Returns `None` if it was not open, otherwise whether it
    /// was the active tab. Closing the active tab leaves nothing active.
    pub fn close(&mut self, path: &str) -> Option<bool> {
        let index = self.open_paths.iter().position(|p| p == path)?;
        self.open_paths.remove(index);

        let was_active = self.active_path.as_deref() == Some(path);
        if was_active {
            self.active_path = None;
        }
        Some(was_active)
    }

    /// Point an open tab at a new path after the document moved.
    ///
    /// The tab keeps its position. If `new` is already open the old tab is
    /// dropped instead. Returns `false` if `old` was not open.
    pub fn retarget(&mut self, old: &str, new: &str) -> bool {
        let Some(index) = self.open_paths.iter().position(|p| p == old) else {
            return false;
        };
        if old == new {
            return true;
        }

        if self.contains(new) {
            self.open_paths.remove(index);
        } else {
            self.open_paths[index] = new.to_string();
        }
        if self.active_path.as_deref() == Some(old) {
            self.active_path = Some(new.to_string());
        }
        true
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn paths(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_new_session_is_empty() {
        let session = Session::new();
        assert!(session.is_empty());
        assert!(session.active_path().is_none());
    }

    #[test]
    fn test_open_is_idempotent() {
        let mut session = Session::new();
        assert!(session.open("/a.md"));
        assert!(!session.open("/a.md"));
        assert_eq!(session.open_paths(), &paths(&["/a.md"])[..]);
    }

    #[test]
    fn test_activate_requires_open_path() {
        let mut session = Session::new();
        assert!(!session.activate("/a.md"));
        assert!(session.active_path().is_none());

        session.open("/a.md");
        assert!(session.activate("/a.md"));
        assert_eq!(session.active_path(), Some("/a.md"));
    }

    #[test]
    fn test_close_active_unsets_active() {
        let mut session = Session::from_parts(paths(&["/a.md", "/b.md"]), Some("/b.md".into()));
        assert_eq!(session.close("/b.md"), Some(true));
        assert!(session.active_path().is_none());
        assert_eq!(session.open_paths(), &paths(&["/a.md"])[..]);
    }

    #[test]
    fn test_close_inactive_keeps_active() {
        let mut session = Session::from_parts(paths(&["/a.md", "/b.md"]), Some("/b.md".into()));
        assert_eq!(session.close("/a.md"), Some(false));
        assert_eq!(session.active_path(), Some("/b.md"));
    }

    #[test]
    fn test_close_unknown_path() {
        let mut session = Session::from_parts(paths(&["/a.md"]), None);
        assert_eq!(session.close("/zzz.md"), None);
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn test_from_parts_repairs_invariants() {
        let session = Session::from_parts(
            paths(&["/a.md", "/b.md", "/a.md"]),
            Some("/missing.md".into()),
        );
        assert_eq!(session.open_paths(), &paths(&["/a.md", "/b.md"])[..]);
        assert!(session.active_path().is_none());
    }

    #[test]
    fn test_save_then_load_reproduces_session() {
        let mut store = MemoryStore::new();
        let session = Session::from_parts(
            paths(&["/notes/x, y.md", "/notes/b.md"]),
            Some("/notes/x, y.md".into()),
        );
        session.save(&mut store).unwrap();

        let loaded = Session::load(&store);
        assert_eq!(loaded, session);
    }

    #[test]
    fn test_save_without_active_removes_key() {
        let mut store = MemoryStore::new();
        store.set(ACTIVE_TAB_KEY, "/old.md").unwrap();

        Session::from_parts(paths(&["/a.md"]), None)
            .save(&mut store)
            .unwrap();
        assert!(store.get(ACTIVE_TAB_KEY).is_none());
        assert_eq!(store.get(OPEN_TABS_KEY).as_deref(), Some("/a.md"));
    }

    #[test]
    fn test_load_absent_or_malformed_is_empty() {
        let store = MemoryStore::new();
        assert_eq!(Session::load(&store), Session::new());

        let mut store = MemoryStore::new();
        store.set(OPEN_TABS_KEY, ",,,").unwrap();
        store.set(ACTIVE_TAB_KEY, "/not-open.md").unwrap();
        assert_eq!(Session::load(&store), Session::new());
    }

    #[test]
    fn test_tabs_projection_marks_active() {
        let session = Session::from_parts(paths(&["/a.md", "/b.md"]), Some("/a.md".into()));
        let tabs = session.tabs();
        assert_eq!(tabs.len(), 2);
        assert!(tabs[0].is_active);
        assert!(!tabs[1].is_active);
        assert_eq!(tabs[1].title(), "b.md");
    }

    #[test]
    fn test_retarget_keeps_position_and_active() {
        let mut session =
            Session::from_parts(paths(&["/a.md", "/b.md", "/c.md"]), Some("/b.md".into()));
        assert!(session.retarget("/b.md", "/archive/b.md"));
        assert_eq!(
            session.open_paths(),
            &paths(&["/a.md", "/archive/b.md", "/c.md"])[..]
        );
        assert_eq!(session.active_path(), Some("/archive/b.md"));
    }

    #[test]
    fn test_retarget_onto_open_path_drops_old() {
        let mut session = Session::from_parts(paths(&["/a.md", "/b.md"]), Some("/a.md".into()));
        assert!(session.retarget("/a.md", "/b.md"));
        assert_eq!(session.open_paths(), &paths(&["/b.md"])[..]);
        assert_eq!(session.active_path(), Some("/b.md"));
    }
}
