//! Search-as-you-type over the known document list.

use super::fuzzy::SubsequenceMatcher;
use fuzzy_matcher::FuzzyMatcher;

/// A searchable document: its path and the name shown in results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEntry {
    pub path: String,
    pub name: String,
}

impl DocumentEntry {
    pub fn new(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
        }
    }
}

/// One search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    /// Path to open when the result is chosen
    pub path: String,
    /// Name shown in the result list
    pub display_name: String,
    /// Character indices in `path` that matched the query
    pub positions: Vec<usize>,
}

/// The read-only document list the search runs against.
#[derive(Debug, Clone, Default)]
pub struct DocumentIndex {
    entries: Vec<DocumentEntry>,
}

impl DocumentIndex {
    pub fn new(entries: Vec<DocumentEntry>) -> Self {
        Self { entries }
    }

    /// Documents whose path matches `query`, in index order.
    ///
    /// An empty query returns no results: the result list is hidden rather
    /// than showing every document.
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        if query.is_empty() {
            return Vec::new();
        }

        let matcher = SubsequenceMatcher;
        self.entries
            .iter()
            .filter_map(|entry| {
                matcher
                    .fuzzy_indices(&entry.path, query)
                    .map(|(_, positions)| SearchHit {
                        path: entry.path.clone(),
                        display_name: entry.name.clone(),
                        positions,
                    })
            })
            .collect()
    }
}

/// Transient search field state: the query and its current results.
///
/// Never persisted. Recomputed on every keystroke.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    query: String,
    hits: Vec<SearchHit>,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the query and recompute the results.
    pub fn update(&mut self, query: &str, index: &DocumentIndex) -> &[SearchHit] {
        self.query = query.to_string();
        self.hits = index.search(query);
        &self.hits
    }

    /// Recompute results for the current query, e.g. after the index changed.
    pub fn refresh(&mut self, index: &DocumentIndex) {
        self.hits = index.search(&self.query);
    }

    /// Drop the query and its results.
    pub fn clear(&mut self) {
        self.query.clear();
        self.hits.clear();
    }

    pub fn hits(&self) -> &[SearchHit] {
        &self.hits
    }
}
