//! Fuzzy document search.

mod fuzzy;
mod index;

pub use index::{DocumentEntry, DocumentIndex, SearchHit, SearchState};
