//! In-memory document store for tests.

use super::DocumentStore;
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Inner {
    documents: HashMap<String, String>,
    /// Remaining injected failures per operation name
    failures: HashMap<&'static str, u32>,
    persist_log: Vec<(String, String)>,
}

/// Shared-state document store. Clones see the same documents, so a test can
/// keep one handle while another is moved into a dispatcher.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(self, path: &str, content: &str) -> Self {
        self.lock()
            .documents
            .insert(path.to_string(), content.to_string());
        self
    }

    /// Make the next `times` calls to `operation` fail with a transient error.
    pub fn fail_times(&self, operation: &'static str, times: u32) {
        self.lock().failures.insert(operation, times);
    }

    pub fn content(&self, path: &str) -> Option<String> {
        self.lock().documents.get(path).cloned()
    }

    /// Every successful persist, in order.
    pub fn persist_log(&self) -> Vec<(String, String)> {
        self.lock().persist_log.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn injected_failure(inner: &mut Inner, operation: &'static str) -> Result<()> {
        if let Some(remaining) = inner.failures.get_mut(operation) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(Error::Io(io::Error::new(
                    io::ErrorKind::ConnectionReset,
                    format!("{} failed", operation),
                )));
            }
        }
        Ok(())
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn fetch_content(&self, path: &str) -> Result<String> {
        let mut inner = self.lock();
        Self::injected_failure(&mut inner, "fetch")?;
        inner
            .documents
            .get(path)
            .cloned()
            .ok_or_else(|| Error::remote(format!("No such document: {}", path)))
    }

    fn persist_content(&self, path: &str, content: &str) -> Result<()> {
        let mut inner = self.lock();
        Self::injected_failure(&mut inner, "persist")?;
        if content.is_empty() {
            return Err(Error::remote("File content is empty"));
        }
        inner
            .documents
            .insert(path.to_string(), content.to_string());
        inner
            .persist_log
            .push((path.to_string(), content.to_string()));
        Ok(())
    }

    fn create_node(&self, parent: &str, name: &str) -> Result<String> {
        let mut inner = self.lock();
        Self::injected_failure(&mut inner, "create")?;
        let name = name.trim();
        if let Some(dir) = name.strip_suffix('/') {
            return Ok(format!("{}/{}/", parent, dir));
        }
        let suffix = if name.ends_with(".md") { "" } else { ".md" };
        let entity = format!("{}/{}{}", parent, name, suffix);
        if inner.documents.contains_key(&entity) {
            return Err(Error::remote(format!("failed_to_creat_md:{}", entity)));
        }
        inner.documents.insert(entity.clone(), String::new());
        Ok(entity)
    }

    fn move_node(&self, source: &str, dest_dir: &str) -> Result<()> {
        let mut inner = self.lock();
        Self::injected_failure(&mut inner, "move")?;
        let Some(content) = inner.documents.remove(source) else {
            return Err(Error::remote(format!("No such document: {}", source)));
        };
        let name = source.rsplit('/').next().unwrap_or(source);
        inner
            .documents
            .insert(format!("{}/{}", dest_dir.trim_end_matches('/'), name), content);
        Ok(())
    }
}
