//! Editor module for Folio
//!
//! This module owns the single live editor: the seams the rest of the app
//! talks to ([`EditorFactory`], [`EditorInstance`]), the binding that ties an
//! editor to the active tab, the autosave debouncer, and the egui widget.

mod autosave;
mod binding;
pub mod options;
mod toolbar;
mod widget;

pub use autosave::Autosave;
pub use binding::{EditorBinding, FetchOutcome};
pub use options::EditorOptions;
pub use widget::{MarkdownEditor, MarkdownEditorFactory};

/// A live editor instance. Dropping it destroys the editor.
pub trait EditorInstance {
    /// The full current buffer.
    fn text(&self) -> &str;
}

/// Constructs editor instances from initial content and configuration.
pub trait EditorFactory {
    type Editor: EditorInstance;

    fn create(&mut self, content: String, options: &EditorOptions) -> Self::Editor;
}
