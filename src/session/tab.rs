//! Display projection of an open tab.
//!
//! A tab is identified only by its path; everything shown in the tab bar is
//! derived from that path on demand so it can never drift from it.

use std::path::Path;

// ─────────────────────────────────────────────────────────────────────────────
// Document Kind
// ─────────────────────────────────────────────────────────────────────────────

/// Document kinds the tab bar and tree distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentKind {
    /// Markdown notes (.md, .markdown)
    #[default]
    Markdown,
    /// Plain text (.txt)
    Text,
    /// Images (png, jpg, ...)
    Image,
    /// Anything else
    Other,
}

impl DocumentKind {
    /// Detect the kind from a path's extension.
    pub fn from_path(path: &str) -> Self {
        Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Other)
    }

    /// Detect the kind from an extension string.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "md" | "markdown" | "mdown" | "mkd" => Self::Markdown,
            "txt" | "text" => Self::Text,
            "png" | "jpg" | "jpeg" | "gif" | "svg" | "webp" => Self::Image,
            _ => Self::Other,
        }
    }

    /// Icon shown next to the document name.
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Markdown => "📝",
            Self::Text => "📄",
            Self::Image => "🖼",
            Self::Other => "📄",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tab
// ─────────────────────────────────────────────────────────────────────────────

/// One open document, as shown in the tab bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    /// Document path (primary key)
    pub path: String,
    /// Whether this is the active tab
    pub is_active: bool,
}

impl Tab {
    /// Project a path into a tab.
    pub fn new(path: impl Into<String>, is_active: bool) -> Self {
        Self {
            path: path.into(),
            is_active,
        }
    }

    /// Title shown in the tab bar: the file name, or the whole path if it has none.
    pub fn title(&self) -> String {
        display_name(&self.path)
    }

    /// Icon derived from the path's extension.
    pub fn icon(&self) -> &'static str {
        self.kind().icon()
    }

    /// Document kind derived from the path's extension.
    pub fn kind(&self) -> DocumentKind {
        DocumentKind::from_path(&self.path)
    }
}

/// Last component of a path, used as a human-readable name.
pub fn display_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.to_string())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(DocumentKind::from_extension("md"), DocumentKind::Markdown);
        assert_eq!(DocumentKind::from_extension("MD"), DocumentKind::Markdown);
        assert_eq!(DocumentKind::from_extension("txt"), DocumentKind::Text);
        assert_eq!(DocumentKind::from_extension("png"), DocumentKind::Image);
        assert_eq!(DocumentKind::from_extension("rs"), DocumentKind::Other);
    }

    #[test]
    fn test_kind_from_path_without_extension() {
        assert_eq!(DocumentKind::from_path("/notes/README"), DocumentKind::Other);
    }

    #[test]
    fn test_tab_title_and_icon() {
        let tab = Tab::new("/notes/journal/2024-01-01.md", true);
        assert_eq!(tab.title(), "2024-01-01.md");
        assert_eq!(tab.icon(), "📝");
        assert!(tab.is_active);
    }

    #[test]
    fn test_display_name_falls_back_to_path() {
        assert_eq!(display_name("/"), "/");
        assert_eq!(display_name("notes.md"), "notes.md");
    }
}
