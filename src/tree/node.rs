//! Document tree data structures and notes-folder scanning.

use crate::search::DocumentEntry;
use log::warn;
use regex::Regex;
use std::cmp::Ordering;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

// ─────────────────────────────────────────────────────────────────────────────
// Document Node
// ─────────────────────────────────────────────────────────────────────────────

/// A node in the document tree representing a note or a folder.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentNode {
    /// Display name of the note or folder
    pub name: String,

    /// Full path, the identifier used by tabs and the document store
    pub path: String,

    /// Note or folder with children
    pub kind: NodeKind,
}

/// The kind of tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A note (any regular file)
    File,

    /// A folder with children
    Directory {
        /// Child nodes, folders first then case-insensitive by name
        children: Vec<DocumentNode>,
    },
}

impl DocumentNode {
    /// Create a new file node.
    pub fn file(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: NodeKind::File,
        }
    }

    /// Create a new directory node.
    pub fn directory(
        name: impl Into<String>,
        path: impl Into<String>,
        children: Vec<DocumentNode>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            kind: NodeKind::Directory { children },
        }
    }

    /// Check if this node is a directory.
    pub fn is_directory(&self) -> bool {
        matches!(self.kind, NodeKind::Directory { .. })
    }

    /// Get children if this is a directory.
    pub fn children(&self) -> Option<&[DocumentNode]> {
        match &self.kind {
            NodeKind::Directory { children } => Some(children),
            NodeKind::File => None,
        }
    }

    fn push_child(&mut self, child: DocumentNode) {
        if let NodeKind::Directory { children } = &mut self.kind {
            children.push(child);
        }
    }

    /// Flat list of every note in the tree, depth-first in display order.
    pub fn documents(&self) -> Vec<DocumentEntry> {
        let mut entries = Vec::new();
        self.collect_documents(&mut entries);
        entries
    }

    fn collect_documents(&self, entries: &mut Vec<DocumentEntry>) {
        match &self.kind {
            NodeKind::File => entries.push(DocumentEntry::new(&self.path, &self.name)),
            NodeKind::Directory { children } => {
                for child in children {
                    child.collect_documents(entries);
                }
            }
        }
    }

    /// Paths of every folder in the tree, the root included.
    pub fn directories(&self) -> Vec<String> {
        let mut dirs = Vec::new();
        self.collect_directories(&mut dirs);
        dirs
    }

    fn collect_directories(&self, dirs: &mut Vec<String>) {
        if let NodeKind::Directory { children } = &self.kind {
            dirs.push(self.path.clone());
            for child in children {
                child.collect_directories(dirs);
            }
        }
    }

    /// Count all notes in this tree (recursive).
    pub fn file_count(&self) -> usize {
        match &self.kind {
            NodeKind::File => 1,
            NodeKind::Directory { children } => children.iter().map(|c| c.file_count()).sum(),
        }
    }

    /// Icon for the tree row.
    pub fn icon(&self, expanded: bool) -> &'static str {
        match &self.kind {
            NodeKind::Directory { .. } if expanded => "📂",
            NodeKind::Directory { .. } => "📁",
            NodeKind::File => crate::session::DocumentKind::from_path(&self.path).icon(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Ignore Patterns
// ─────────────────────────────────────────────────────────────────────────────

/// Compiled ignore patterns, matched anywhere in a root-relative path.
#[derive(Debug, Clone, Default)]
pub struct IgnoreSet {
    patterns: Vec<Regex>,
}

impl IgnoreSet {
    /// Compile patterns. Invalid patterns are skipped with a warning.
    pub fn new(patterns: &[String]) -> Self {
        let patterns = patterns
            .iter()
            .filter_map(|p| match Regex::new(p) {
                Ok(regex) => Some(regex),
                Err(e) => {
                    warn!("Ignoring invalid ignore pattern '{}': {}", p, e);
                    None
                }
            })
            .collect();
        Self { patterns }
    }

    /// Whether a root-relative path should be left out of the tree.
    pub fn is_ignored(&self, relative_path: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(relative_path))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scanning
// ─────────────────────────────────────────────────────────────────────────────

/// Scan a notes folder and build its document tree.
///
/// Dot-files (including the client's own state directory) and anything
/// matching `ignore` are left out. Unreadable entries are skipped.
pub fn scan_notes_root(root: &Path, ignore: &IgnoreSet) -> DocumentNode {
    let root_name = root
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("notes")
        .to_string();
    let mut stack = vec![DocumentNode::directory(
        root_name,
        root.to_string_lossy(),
        Vec::new(),
    )];

    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by(compare_entries)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_excluded(entry, root, ignore));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry while scanning notes: {}", e);
                continue;
            }
        };
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };

        // The parent of an entry at depth d sits at stack index d - 1
        while stack.len() > entry.depth() {
            fold_top(&mut stack);
        }

        let path = entry.path().to_string_lossy().to_string();
        if entry.file_type().is_dir() {
            stack.push(DocumentNode::directory(name, path, Vec::new()));
        } else if let Some(parent) = stack.last_mut() {
            parent.push_child(DocumentNode::file(name, path));
        }
    }

    while stack.len() > 1 {
        fold_top(&mut stack);
    }
    stack
        .pop()
        .unwrap_or_else(|| DocumentNode::directory("notes", root.to_string_lossy(), Vec::new()))
}

/// Pop the top directory and attach it to its parent.
fn fold_top(stack: &mut Vec<DocumentNode>) {
    if stack.len() < 2 {
        return;
    }
    if let Some(done) = stack.pop() {
        if let Some(parent) = stack.last_mut() {
            parent.push_child(done);
        }
    }
}

fn is_excluded(entry: &DirEntry, root: &Path, ignore: &IgnoreSet) -> bool {
    let name = entry.file_name().to_string_lossy();
    if name.starts_with('.') {
        return true;
    }
    let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
    ignore.is_ignored(&relative.to_string_lossy())
}

/// Folders first, then case-insensitive by name.
fn compare_entries(a: &DirEntry, b: &DirEntry) -> Ordering {
    match (a.file_type().is_dir(), b.file_type().is_dir()) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a
            .file_name()
            .to_string_lossy()
            .to_lowercase()
            .cmp(&b.file_name().to_string_lossy().to_lowercase()),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn sample_tree() -> DocumentNode {
        DocumentNode::directory(
            "root",
            "/root",
            vec![
                DocumentNode::directory(
                    "sub",
                    "/root/sub",
                    vec![DocumentNode::file("b.md", "/root/sub/b.md")],
                ),
                DocumentNode::file("a.md", "/root/a.md"),
            ],
        )
    }

    #[test]
    fn test_documents_flatten_in_display_order() {
        let docs = sample_tree().documents();
        let paths: Vec<&str> = docs.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["/root/sub/b.md", "/root/a.md"]);
        assert_eq!(docs[0].name, "b.md");
    }

    #[test]
    fn test_directories_include_root() {
        assert_eq!(
            sample_tree().directories(),
            vec!["/root".to_string(), "/root/sub".to_string()]
        );
    }

    #[test]
    fn test_file_count() {
        assert_eq!(sample_tree().file_count(), 2);
    }

    #[test]
    fn test_icons() {
        let tree = sample_tree();
        assert_eq!(tree.icon(false), "📁");
        assert_eq!(tree.icon(true), "📂");
        assert_eq!(DocumentNode::file("a.md", "/a.md").icon(false), "📝");
    }

    #[test]
    fn test_ignore_set_searches_anywhere() {
        let ignore = IgnoreSet::new(&[
            "__pycache__".to_string(),
            ".*.swp".to_string(),
            "[invalid".to_string(),
        ]);
        assert!(ignore.is_ignored("src/__pycache__"));
        assert!(ignore.is_ignored("notes/todo.md.swp"));
        assert!(!ignore.is_ignored("notes/todo.md"));
    }

    #[test]
    fn test_scan_notes_root() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("Work/projects")).unwrap();
        fs::create_dir_all(root.join(".folio")).unwrap();
        fs::create_dir_all(root.join("__pycache__")).unwrap();
        fs::write(root.join("zeta.md"), "z").unwrap();
        fs::write(root.join("Alpha.md"), "a").unwrap();
        fs::write(root.join("Work/plan.md"), "p").unwrap();
        fs::write(root.join("Work/projects/x.md"), "x").unwrap();
        fs::write(root.join(".folio/state.json"), "{}").unwrap();
        fs::write(root.join("__pycache__/junk.pyc"), "").unwrap();

        let ignore = IgnoreSet::new(&["__pycache__".to_string()]);
        let tree = scan_notes_root(root, &ignore);

        let names: Vec<&str> = tree
            .children()
            .unwrap()
            .iter()
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(names, vec!["Work", "Alpha.md", "zeta.md"]);

        let work = &tree.children().unwrap()[0];
        let work_names: Vec<&str> = work
            .children()
            .unwrap()
            .iter()
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(work_names, vec!["projects", "plan.md"]);
        assert_eq!(tree.file_count(), 4);
    }

    #[test]
    fn test_scan_missing_root_is_empty() {
        let temp = TempDir::new().unwrap();
        let tree = scan_notes_root(&temp.path().join("nope"), &IgnoreSet::default());
        assert!(tree.is_directory());
        assert_eq!(tree.file_count(), 0);
    }
}
