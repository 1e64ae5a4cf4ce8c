//! UI components for Folio
//!
//! Panels and overlays rendered by the app each frame. None of them touch the
//! document store directly; they report what the user did through output
//! structs.

mod dialogs;
mod file_tree;
mod quick_search;
mod settings;
mod tab_bar;

pub use dialogs::{NodeDialog, NodeDialogResult};
pub use file_tree::{FileTreeContextAction, FileTreePanel};
pub use quick_search::QuickSearch;
pub use settings::SettingsPanel;
pub use tab_bar::show_tab_bar;
