//! User settings and preferences for Folio
//!
//! This module defines the `Settings` struct that holds the application-level
//! options, with serde support for JSON persistence. Per-notes-folder UI
//! state (tabs, folder expansion, editor preferences) lives in the durable
//! store instead.

use crate::remote::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

// ─────────────────────────────────────────────────────────────────────────────
// Window Size Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Window dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowSize {
    /// Window width in pixels
    pub width: f32,
    /// Window height in pixels
    pub height: f32,
    /// Whether the window was maximized
    #[serde(default)]
    pub maximized: bool,
}

impl Default for WindowSize {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            maximized: false,
        }
    }
}

/// Paths excluded from the document tree, as regular expressions matched
/// anywhere in the path relative to the notes folder.
pub fn default_ignore_patterns() -> Vec<String> {
    [
        "env/.*",
        ".git",
        ".*.swp",
        ".*.pyc",
        "__pycache__",
        ".allmark",
        "_vnote.json",
        "!!!meta.json",
        "PaxHeader",
        ".nojekyll",
        ".*.sqlite",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Main Settings Struct
// ─────────────────────────────────────────────────────────────────────────────

/// Application settings.
///
/// Serialized to JSON in the user's config directory. Every field has a
/// default, so partial or older files still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // ─────────────────────────────────────────────────────────────────────────
    // Notes Folder
    // ─────────────────────────────────────────────────────────────────────────
    /// Folder opened at startup when none is given on the command line
    pub notes_root: Option<PathBuf>,

    /// Recently opened notes folders (most recent first)
    pub recent_roots: Vec<PathBuf>,

    /// Maximum number of recent folders to remember
    pub max_recent_roots: usize,

    /// Regular expressions for paths hidden from the tree
    pub ignore_patterns: Vec<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Saving
    // ─────────────────────────────────────────────────────────────────────────
    /// Quiet period after the last edit before the document is saved
    pub autosave_delay_ms: u64,

    /// How long a document store request may stay unanswered
    pub request_timeout_ms: u64,

    /// Retry policy for failed saves
    pub persist_retry: RetryPolicy,

    // ─────────────────────────────────────────────────────────────────────────
    // Appearance & Window State
    // ─────────────────────────────────────────────────────────────────────────
    /// Font size for the editor (in points)
    pub font_size: f32,

    /// Width of the document tree panel in pixels
    pub file_tree_width: f32,

    /// Window size
    pub window_size: WindowSize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // Notes Folder
            notes_root: None,
            recent_roots: Vec::new(),
            max_recent_roots: 10,
            ignore_patterns: default_ignore_patterns(),

            // Saving
            autosave_delay_ms: 2000,
            request_timeout_ms: 10_000,
            persist_retry: RetryPolicy::default(),

            // Appearance & Window State
            font_size: 14.0,
            file_tree_width: 250.0,
            window_size: WindowSize::default(),
        }
    }
}

impl Settings {
    /// Remember `path` as the current notes folder.
    ///
    /// It moves to the front of the recent list, which is trimmed to
    /// `max_recent_roots`.
    pub fn add_recent_root(&mut self, path: PathBuf) {
        self.recent_roots.retain(|p| p != &path);
        self.recent_roots.insert(0, path.clone());
        self.recent_roots.truncate(self.max_recent_roots);
        self.notes_root = Some(path);
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Validation Constants and Sanitization
    // ─────────────────────────────────────────────────────────────────────────

    /// Minimum allowed font size.
    pub const MIN_FONT_SIZE: f32 = 8.0;
    /// Maximum allowed font size.
    pub const MAX_FONT_SIZE: f32 = 72.0;
    /// Minimum autosave delay.
    pub const MIN_AUTOSAVE_DELAY_MS: u64 = 200;
    /// Maximum autosave delay.
    pub const MAX_AUTOSAVE_DELAY_MS: u64 = 60_000;
    /// Minimum request timeout.
    pub const MIN_REQUEST_TIMEOUT_MS: u64 = 1000;
    /// Maximum request timeout.
    pub const MAX_REQUEST_TIMEOUT_MS: u64 = 300_000;
    /// Minimum window dimension.
    pub const MIN_WINDOW_SIZE: f32 = 200.0;
    /// Maximum window dimension.
    pub const MAX_WINDOW_SIZE: f32 = 10000.0;
    /// Minimum tree panel width.
    pub const MIN_FILE_TREE_WIDTH: f32 = 120.0;
    /// Maximum tree panel width.
    pub const MAX_FILE_TREE_WIDTH: f32 = 600.0;

    /// Clamp values to valid ranges.
    ///
    /// Used after loading a file that may have been edited by hand.
    pub fn sanitize(&mut self) {
        self.font_size = self
            .font_size
            .clamp(Self::MIN_FONT_SIZE, Self::MAX_FONT_SIZE);

        self.autosave_delay_ms = self
            .autosave_delay_ms
            .clamp(Self::MIN_AUTOSAVE_DELAY_MS, Self::MAX_AUTOSAVE_DELAY_MS);
        self.request_timeout_ms = self
            .request_timeout_ms
            .clamp(Self::MIN_REQUEST_TIMEOUT_MS, Self::MAX_REQUEST_TIMEOUT_MS);
        self.persist_retry.sanitize();
        // A fully retried save leaves half the request timeout for the store
        self.persist_retry.fit_within(self.request_timeout() / 2);

        self.window_size.width = self
            .window_size
            .width
            .clamp(Self::MIN_WINDOW_SIZE, Self::MAX_WINDOW_SIZE);
        self.window_size.height = self
            .window_size
            .height
            .clamp(Self::MIN_WINDOW_SIZE, Self::MAX_WINDOW_SIZE);
        self.file_tree_width = self
            .file_tree_width
            .clamp(Self::MIN_FILE_TREE_WIDTH, Self::MAX_FILE_TREE_WIDTH);

        if self.max_recent_roots == 0 {
            self.max_recent_roots = 10;
        } else if self.max_recent_roots > 100 {
            self.max_recent_roots = 100;
        }
        self.recent_roots.truncate(self.max_recent_roots);
    }

    /// Deserialize and sanitize in one step.
    pub fn from_json_sanitized(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.autosave_delay_ms, 2000);
        assert_eq!(settings.request_timeout_ms, 10_000);
        assert_eq!(settings.persist_retry.max_attempts, 3);
        assert!(settings.notes_root.is_none());
        assert!(settings.ignore_patterns.contains(&"__pycache__".to_string()));
    }

    #[test]
    fn test_add_recent_root() {
        let mut settings = Settings {
            max_recent_roots: 2,
            ..Settings::default()
        };
        settings.add_recent_root(PathBuf::from("/a"));
        settings.add_recent_root(PathBuf::from("/b"));
        settings.add_recent_root(PathBuf::from("/a"));
        settings.add_recent_root(PathBuf::from("/c"));

        assert_eq!(
            settings.recent_roots,
            vec![PathBuf::from("/c"), PathBuf::from("/a")]
        );
        assert_eq!(settings.notes_root, Some(PathBuf::from("/c")));
    }

    #[test]
    fn test_settings_serialization_roundtrip() {
        let original = Settings {
            notes_root: Some(PathBuf::from("/home/me/notes")),
            autosave_delay_ms: 1500,
            ..Settings::default()
        };
        let json = serde_json::to_string_pretty(&original).unwrap();
        let deserialized: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(original, deserialized);
    }

    #[test]
    fn test_settings_deserialize_with_defaults() {
        let json = r#"{"font_size": 18.0}"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.font_size, 18.0);
        assert_eq!(settings.autosave_delay_ms, 2000);
        assert_eq!(settings.ignore_patterns, default_ignore_patterns());
    }

    #[test]
    fn test_sanitize_autosave_delay() {
        let mut settings = Settings {
            autosave_delay_ms: 10,
            ..Settings::default()
        };
        settings.sanitize();
        assert_eq!(settings.autosave_delay_ms, Settings::MIN_AUTOSAVE_DELAY_MS);

        settings.autosave_delay_ms = 999_999;
        settings.sanitize();
        assert_eq!(settings.autosave_delay_ms, Settings::MAX_AUTOSAVE_DELAY_MS);
    }

    #[test]
    fn test_sanitize_font_size_and_panels() {
        let mut settings = Settings {
            font_size: 2.0,
            file_tree_width: 5000.0,
            ..Settings::default()
        };
        settings.sanitize();
        assert_eq!(settings.font_size, Settings::MIN_FONT_SIZE);
        assert_eq!(settings.file_tree_width, Settings::MAX_FILE_TREE_WIDTH);
    }

    #[test]
    fn test_sanitize_recent_roots() {
        let mut settings = Settings {
            max_recent_roots: 0,
            recent_roots: (0..20).map(|i| PathBuf::from(format!("/r{}", i))).collect(),
            ..Settings::default()
        };
        settings.sanitize();
        assert_eq!(settings.max_recent_roots, 10);
        assert_eq!(settings.recent_roots.len(), 10);
    }

    #[test]
    fn test_from_json_sanitized() {
        let json = r#"{"request_timeout_ms": 1, "persist_retry": {"max_attempts": 0}}"#;
        let settings = Settings::from_json_sanitized(json).unwrap();
        assert_eq!(settings.request_timeout_ms, Settings::MIN_REQUEST_TIMEOUT_MS);
        assert_eq!(settings.persist_retry.max_attempts, 1);
    }

    #[test]
    fn test_sanitize_fits_retries_into_request_timeout() {
        let json = r#"{
            "request_timeout_ms": 1000,
            "persist_retry": {"max_attempts": 3, "initial_backoff_ms": 800, "max_backoff_ms": 800}
        }"#;
        let settings = Settings::from_json_sanitized(json).unwrap();
        assert_eq!(settings.persist_retry.max_attempts, 3);
        assert!(settings.persist_retry.total_backoff() < settings.request_timeout());
        assert_eq!(settings.persist_retry.total_backoff(), Duration::from_millis(500));
    }

    #[test]
    fn test_durations() {
        let settings = Settings::default();
        assert_eq!(settings.autosave_delay(), Duration::from_millis(2000));
        assert_eq!(settings.request_timeout(), Duration::from_secs(10));
    }
}
