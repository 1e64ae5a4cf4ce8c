//! Editor preferences, read from the durable store each time an editor is
//! built.
//!
//! These are pass-through settings: the binding hands them to the editor
//! factory untouched.

use crate::error::Result;
use crate::storage::KeyValueStore;

pub const THEME_KEY: &str = "theme";
pub const PREVIEW_THEME_KEY: &str = "previewTheme";
pub const EDITOR_THEME_KEY: &str = "editorTheme";
pub const TASK_LISTS_KEY: &str = "settingsTaskLists";
pub const CODE_FOLDING_KEY: &str = "settingsCodeFolding";
pub const CHARTS_KEY: &str = "settingsCharts";
pub const SEQUENCES_KEY: &str = "settingsSequences";
pub const KATEX_KEY: &str = "settingsKatex";
pub const EMOJI_KEY: &str = "settingsEmoji";
pub const TOOLBAR_KEY: &str = "settingsToolbar";

/// Theme names offered in the settings panel.
pub const THEMES: &[&str] = &["dark", "light"];

/// Editor configuration object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorOptions {
    pub theme: String,
    pub preview_theme: String,
    pub editor_theme: String,
    pub task_lists: bool,
    pub code_folding: bool,
    pub charts: bool,
    pub sequences: bool,
    pub katex: bool,
    pub emoji: bool,
    pub toolbar: bool,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            preview_theme: "dark".to_string(),
            editor_theme: "pastel-on-dark".to_string(),
            task_lists: false,
            code_folding: false,
            charts: false,
            sequences: false,
            katex: false,
            emoji: false,
            toolbar: true,
        }
    }
}

impl EditorOptions {
    /// Read options from the store. Absent or empty values keep the default.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let defaults = Self::default();
        Self {
            theme: read_string(store, THEME_KEY, defaults.theme),
            preview_theme: read_string(store, PREVIEW_THEME_KEY, defaults.preview_theme),
            editor_theme: read_string(store, EDITOR_THEME_KEY, defaults.editor_theme),
            task_lists: read_flag(store, TASK_LISTS_KEY, defaults.task_lists),
            code_folding: read_flag(store, CODE_FOLDING_KEY, defaults.code_folding),
            charts: read_flag(store, CHARTS_KEY, defaults.charts),
            sequences: read_flag(store, SEQUENCES_KEY, defaults.sequences),
            katex: read_flag(store, KATEX_KEY, defaults.katex),
            emoji: read_flag(store, EMOJI_KEY, defaults.emoji),
            toolbar: read_flag(store, TOOLBAR_KEY, defaults.toolbar),
        }
    }

    /// Write every option to the store.
    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<()> {
        store.set(THEME_KEY, &self.theme)?;
        store.set(PREVIEW_THEME_KEY, &self.preview_theme)?;
        store.set(EDITOR_THEME_KEY, &self.editor_theme)?;
        for (key, value) in [
            (TASK_LISTS_KEY, self.task_lists),
            (CODE_FOLDING_KEY, self.code_folding),
            (CHARTS_KEY, self.charts),
            (SEQUENCES_KEY, self.sequences),
            (KATEX_KEY, self.katex),
            (EMOJI_KEY, self.emoji),
            (TOOLBAR_KEY, self.toolbar),
        ] {
            store.set(key, flag_value(value))?;
        }
        Ok(())
    }

    /// Whether the editor should use dark visuals.
    pub fn is_dark(&self) -> bool {
        self.theme != "light"
    }
}

fn read_string(store: &dyn KeyValueStore, key: &str, default: String) -> String {
    store.get(key).filter(|v| !v.is_empty()).unwrap_or(default)
}

/// Flags are stored as `"1"`/`"0"`; any other present value reads as off.
fn read_flag(store: &dyn KeyValueStore, key: &str, default: bool) -> bool {
    match store.get(key) {
        Some(value) if !value.is_empty() => value == "1",
        _ => default,
    }
}

fn flag_value(value: bool) -> &'static str {
    if value {
        "1"
    } else {
        "0"
    }
}
