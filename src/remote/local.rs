//! Document store backed by the local notes folder.

use super::DocumentStore;
use crate::error::{Error, Result};
use log::{debug, info};
use std::fs::{self, OpenOptions};
use std::path::{Component, PathBuf};

/// Serves the four document operations from a folder on disk.
///
/// Every path handed in must lie inside `root`; anything else is refused
/// with [`Error::OutsideRoot`].
#[derive(Debug, Clone)]
pub struct LocalDocumentStore {
    root: PathBuf,
}

impl LocalDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve `path` and check it stays inside the root.
    fn checked(&self, path: &str) -> Result<PathBuf> {
        let candidate = PathBuf::from(path);
        let escapes = candidate
            .components()
            .any(|c| matches!(c, Component::ParentDir));
        if escapes || !candidate.starts_with(&self.root) {
            return Err(Error::OutsideRoot {
                path: path.to_string(),
            });
        }
        Ok(candidate)
    }
}

impl DocumentStore for LocalDocumentStore {
    fn fetch_content(&self, path: &str) -> Result<String> {
        let file = self.checked(path)?;
        let content = fs::read_to_string(&file)?;
        debug!("Fetched {} ({} bytes)", path, content.len());
        Ok(content)
    }

    fn persist_content(&self, path: &str, content: &str) -> Result<()> {
        if path.is_empty() {
            return Err(Error::remote("File path is empty"));
        }
        let file = self.checked(path)?;
        if content.is_empty() {
            return Err(Error::remote("File content is empty"));
        }

        fs::write(&file, content).map_err(|e| Error::FileWrite {
            path: file.clone(),
            source: e,
        })?;
        debug!("Persisted {} ({} bytes)", path, content.len());
        Ok(())
    }

    fn create_node(&self, parent: &str, name: &str) -> Result<String> {
        let name = name.trim();
        if parent.is_empty() || name.is_empty() {
            return Err(Error::remote("path_can_not_be_empty"));
        }
        let parent_dir = self.checked(parent)?;

        if let Some(dir_name) = name.strip_suffix('/') {
            let dir = parent_dir.join(dir_name);
            let entity = format!("{}/", dir.to_string_lossy());
            self.checked(&entity)?;
            fs::create_dir(&dir)
                .map_err(|_| Error::remote(format!("failed_to_creat_dir:{}", entity)))?;
            info!("Created folder {}", entity);
            return Ok(entity);
        }

        let file_name = if name.ends_with(".md") {
            name.to_string()
        } else {
            format!("{}.md", name)
        };
        let file = parent_dir.join(file_name);
        let entity = file.to_string_lossy().to_string();
        self.checked(&entity)?;
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&file)
            .map_err(|_| Error::remote(format!("failed_to_creat_md:{}", entity)))?;
        info!("Created note {}", entity);
        Ok(entity)
    }

    fn move_node(&self, source: &str, dest_dir: &str) -> Result<()> {
        let from = self.checked(source)?;
        let dest = self.checked(dest_dir)?;
        let Some(file_name) = from.file_name() else {
            return Err(Error::remote(format!("Cannot move {}", source)));
        };
        if !dest.is_dir() {
            return Err(Error::remote(format!("{} is not a folder", dest_dir)));
        }

        let to = dest.join(file_name);
        if to.exists() {
            return Err(Error::remote(format!("{} already exists", to.display())));
        }
        fs::rename(&from, &to)?;
        info!("Moved {} to {}", source, to.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, LocalDocumentStore, String) {
        let temp = TempDir::new().unwrap();
        let store = LocalDocumentStore::new(temp.path());
        let root = temp.path().to_string_lossy().to_string();
        (temp, store, root)
    }

    #[test]
    fn test_fetch_and_persist() {
        let (temp, store, _) = setup();
        let file = temp.path().join("a.md");
        fs::write(&file, "hello").unwrap();
        let path = file.to_string_lossy().to_string();

        assert_eq!(store.fetch_content(&path).unwrap(), "hello");
        store.persist_content(&path, "changed\n").unwrap();
        assert_eq!(fs::read_to_string(&file).unwrap(), "changed\n");
    }

    #[test]
    fn test_fetch_missing_is_io_error() {
        let (_temp, store, root) = setup();
        let err = store.fetch_content(&format!("{}/nope.md", root)).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_persist_refuses_empty_content() {
        let (_temp, store, root) = setup();
        let err = store
            .persist_content(&format!("{}/a.md", root), "")
            .unwrap_err();
        assert_eq!(err.to_string(), "File content is empty");
    }

    #[test]
    fn test_refuses_paths_outside_root() {
        let (_temp, store, root) = setup();
        assert!(matches!(
            store.fetch_content("/etc/hostname"),
            Err(Error::OutsideRoot { .. })
        ));
        assert!(matches!(
            store.persist_content(&format!("{}/../escape.md", root), "x"),
            Err(Error::OutsideRoot { .. })
        ));
        assert!(matches!(
            store.create_node(&root, "../escape"),
            Err(Error::OutsideRoot { .. })
        ));
    }

    #[test]
    fn test_create_note_appends_extension() {
        let (temp, store, root) = setup();
        let entity = store.create_node(&root, "  ideas  ").unwrap();
        assert!(entity.ends_with("ideas.md"));
        assert!(temp.path().join("ideas.md").is_file());

        let entity = store.create_node(&root, "todo.md").unwrap();
        assert!(entity.ends_with("todo.md"));
        assert!(!entity.ends_with(".md.md"));
    }

    #[test]
    fn test_create_existing_note_fails() {
        let (temp, store, root) = setup();
        fs::write(temp.path().join("ideas.md"), "keep").unwrap();
        let err = store.create_node(&root, "ideas").unwrap_err();
        assert!(err.to_string().starts_with("failed_to_creat_md:"));
        assert_eq!(
            fs::read_to_string(temp.path().join("ideas.md")).unwrap(),
            "keep"
        );
    }

    #[test]
    fn test_create_folder() {
        let (temp, store, root) = setup();
        let entity = store.create_node(&root, "journal/").unwrap();
        assert!(entity.ends_with("journal/"));
        assert!(temp.path().join("journal").is_dir());

        let err = store.create_node(&root, "journal/").unwrap_err();
        assert!(err.to_string().starts_with("failed_to_creat_dir:"));
    }

    #[test]
    fn test_create_requires_name() {
        let (_temp, store, root) = setup();
        let err = store.create_node(&root, "   ").unwrap_err();
        assert_eq!(err.to_string(), "path_can_not_be_empty");
    }

    #[test]
    fn test_move_into_folder() {
        let (temp, store, root) = setup();
        fs::create_dir(temp.path().join("archive")).unwrap();
        fs::write(temp.path().join("a.md"), "x").unwrap();

        store
            .move_node(&format!("{}/a.md", root), &format!("{}/archive", root))
            .unwrap();
        assert!(!temp.path().join("a.md").exists());
        assert!(temp.path().join("archive/a.md").is_file());
    }

    #[test]
    fn test_move_refuses_overwrite_and_non_folder() {
        let (temp, store, root) = setup();
        fs::create_dir(temp.path().join("archive")).unwrap();
        fs::write(temp.path().join("a.md"), "new").unwrap();
        fs::write(temp.path().join("archive/a.md"), "old").unwrap();

        assert!(store
            .move_node(&format!("{}/a.md", root), &format!("{}/archive", root))
            .is_err());
        assert_eq!(
            fs::read_to_string(temp.path().join("archive/a.md")).unwrap(),
            "old"
        );
        assert!(store
            .move_node(&format!("{}/a.md", root), &format!("{}/missing", root))
            .is_err());
    }
}
