//! Main application module for Folio
//!
//! This module implements the eframe App trait: it wires the document tree,
//! tab bar, editor and overlays to [`AppState`], and turns keyboard shortcuts
//! into controller calls. All document work happens in the controller; the
//! shell only renders and forwards.

use crate::config::{Settings, WindowSize};
use crate::editor::MarkdownEditorFactory;
use crate::files::dialogs::open_folder_dialog;
use crate::remote::{Dispatch, InlineDispatcher, LocalDocumentStore, ThreadDispatcher};
use crate::session::display_name;
use crate::state::{AppState, StatusKind};
use crate::storage::{FileStore, KeyValueStore, MemoryStore};
use crate::ui::{
    show_tab_bar, FileTreeContextAction, FileTreePanel, NodeDialog, NodeDialogResult,
    QuickSearch, SettingsPanel,
};
use eframe::egui;
use log::{debug, info, warn};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Application name constant.
pub const APP_NAME: &str = "Folio";

/// How long an info message stays in the status bar.
const STATUS_INFO_TTL: Duration = Duration::from_secs(4);

/// How long an error message stays in the status bar.
const STATUS_ERROR_TTL: Duration = Duration::from_secs(10);

/// Keyboard shortcut actions that need to be deferred.
///
/// These actions are detected in the input handling closure and executed
/// afterwards to avoid borrow conflicts.
#[derive(Debug, Clone, Copy)]
enum KeyboardAction {
    /// Save the active note now (Ctrl+S)
    Save,
    /// Open the quick search overlay (Ctrl+P)
    QuickSearch,
    /// New note at the notes root (Ctrl+I)
    NewNote,
    /// Close the active tab (Ctrl+W)
    CloseTab,
    /// Toggle the settings panel (Ctrl+,)
    OpenSettings,
}

/// Build the controller for `notes_root`.
///
/// The durable store lives inside the notes folder; if that folder cannot be
/// written the session is kept in memory only. Remote requests run on a
/// worker thread that wakes the UI when an answer arrives.
fn build_state(
    notes_root: PathBuf,
    settings: Settings,
    ctx: &egui::Context,
) -> AppState<MarkdownEditorFactory> {
    let file_store = FileStore::for_notes_root(&notes_root);
    let store: Box<dyn KeyValueStore> = match file_store.probe_writable() {
        Ok(()) => Box::new(file_store),
        Err(e) => {
            warn!(
                "State file {} is not writable, keeping state in memory: {}",
                file_store.path().display(),
                e
            );
            Box::new(MemoryStore::new())
        }
    };

    let waker_ctx = ctx.clone();
    let dispatcher: Box<dyn Dispatch> = match ThreadDispatcher::spawn(
        Box::new(LocalDocumentStore::new(notes_root.clone())),
        settings.persist_retry,
        Some(Box::new(move || waker_ctx.request_repaint())),
    ) {
        Ok(dispatcher) => Box::new(dispatcher),
        Err(e) => {
            warn!("Failed to start document store worker, running inline: {}", e);
            Box::new(InlineDispatcher::new(
                Box::new(LocalDocumentStore::new(notes_root.clone())),
                settings.persist_retry,
            ))
        }
    };

    let mut state = AppState::new(
        notes_root.clone(),
        settings,
        store,
        dispatcher,
        MarkdownEditorFactory::default(),
    );
    state.update_settings(|s| s.add_recent_root(notes_root));
    state.restore_session();
    state
}

/// The main application struct that holds all state and implements eframe::App.
pub struct FolioApp {
    /// Tab lifecycle controller
    state: AppState<MarkdownEditorFactory>,
    /// Document tree sidebar
    file_tree_panel: FileTreePanel,
    /// Quick search overlay (Ctrl+P)
    quick_search: QuickSearch,
    /// Settings panel component
    settings_panel: SettingsPanel,
    /// Last window size written to settings
    last_window_size: Option<WindowSize>,
}

impl FolioApp {
    /// Create the app for `notes_root`, restoring its last session.
    pub fn new(cc: &eframe::CreationContext<'_>, notes_root: PathBuf, settings: Settings) -> Self {
        info!("Initializing {} for {}", APP_NAME, notes_root.display());

        let file_tree_panel = FileTreePanel::new(settings.file_tree_width);
        let state = build_state(notes_root, settings, &cc.egui_ctx);
        apply_visuals(&cc.egui_ctx, state.options().is_dark());

        Self {
            state,
            file_tree_panel,
            quick_search: QuickSearch::new(),
            settings_panel: SettingsPanel::new(),
            last_window_size: None,
        }
    }

    /// Get the window title based on current state.
    ///
    /// Returns "note.md - Folio" while a note is active, otherwise the notes
    /// folder name.
    fn window_title(&self) -> String {
        match self.state.active_path() {
            Some(path) => format!("{} - {}", display_name(path), APP_NAME),
            None => format!("{} - {}", self.state.tree().name, APP_NAME),
        }
    }

    /// Record window size changes in settings.
    fn update_window_state(&mut self, ctx: &egui::Context) {
        let (size, maximized) = ctx.input(|i| {
            (
                i.viewport().inner_rect.map(|rect| rect.size()),
                i.viewport().maximized.unwrap_or(false),
            )
        });
        let Some(size) = size else {
            return;
        };

        let previous = self.last_window_size.unwrap_or(self.state.settings.window_size);
        // A maximized window keeps the restored size
        let current = if maximized {
            WindowSize {
                maximized,
                ..previous
            }
        } else {
            WindowSize {
                width: size.x,
                height: size.y,
                maximized,
            }
        };

        let changed = (current.width - previous.width).abs() > 1.0
            || (current.height - previous.height).abs() > 1.0
            || current.maximized != previous.maximized;
        if changed || self.last_window_size.is_none() {
            self.last_window_size = Some(current);
        }
        if changed {
            debug!(
                "Window state updated: {}x{}, maximized: {}",
                current.width, current.height, current.maximized
            );
            self.state.update_settings(|s| s.window_size = current);
        }
    }

    /// Switch to another notes folder, closing the current one cleanly.
    fn open_notes_root(&mut self, root: PathBuf, ctx: &egui::Context) {
        if root == self.state.notes_root() {
            return;
        }
        info!("Opening notes folder {}", root.display());
        self.state.shutdown();
        self.quick_search.close();
        let settings = self.state.settings.clone();
        self.state = build_state(root, settings, ctx);
        apply_visuals(ctx, self.state.options().is_dark());
    }

    fn handle_open_folder(&mut self, ctx: &egui::Context) {
        let initial = Some(self.state.notes_root().to_path_buf());
        if let Some(root) = open_folder_dialog(initial.as_ref()) {
            self.open_notes_root(root, ctx);
        }
    }

    fn handle_quick_search(&mut self) {
        if self.quick_search.is_open() {
            self.quick_search.close();
            self.state.clear_search();
        } else {
            self.state.clear_search();
            self.quick_search.open();
        }
    }

    fn handle_new_note_at_root(&mut self) {
        let root = self.state.tree().path.clone();
        self.state.ui.dialog = Some(NodeDialog::new_note(root));
    }

    /// Handle file tree context menu actions.
    fn handle_file_tree_context_action(&mut self, action: FileTreeContextAction) {
        match action {
            FileTreeContextAction::NewNote(parent) => {
                self.state.ui.dialog = Some(NodeDialog::new_note(parent));
            }
            FileTreeContextAction::NewFolder(parent) => {
                self.state.ui.dialog = Some(NodeDialog::new_folder(parent));
            }
            FileTreeContextAction::MoveTo(source) => {
                let dirs = self.state.tree().directories();
                self.state.ui.dialog = Some(NodeDialog::move_node(source, &dirs));
            }
            FileTreeContextAction::Refresh => {
                self.state.request_tree_refresh();
                self.state.set_info("Document tree refreshed");
            }
        }
    }

    /// Render the main UI content.
    fn render_ui(&mut self, ctx: &egui::Context) {
        let is_dark = ctx.style().visuals.dark_mode;

        // Top menu bar
        let mut open_folder = false;
        let mut open_recent = None;
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("📂 Open Folder…").clicked() {
                        open_folder = true;
                        ui.close_menu();
                    }
                    let current = self.state.notes_root().to_path_buf();
                    let recent: Vec<PathBuf> = self
                        .state
                        .settings
                        .recent_roots
                        .iter()
                        .filter(|p| **p != current)
                        .cloned()
                        .collect();
                    ui.add_enabled_ui(!recent.is_empty(), |ui| {
                        ui.menu_button("Recent Folders", |ui| {
                            for path in recent {
                                if ui.button(path.display().to_string()).clicked() {
                                    open_recent = Some(path);
                                    ui.close_menu();
                                }
                            }
                        });
                    });
                    ui.separator();
                    if ui.button("📝 New Note    Ctrl+I").clicked() {
                        self.handle_new_note_at_root();
                        ui.close_menu();
                    }
                    if ui.button("💾 Save    Ctrl+S").clicked() {
                        self.state.manual_save(Instant::now());
                        ui.close_menu();
                    }
                    if ui.button("✖ Close Tab    Ctrl+W").clicked() {
                        self.state.close_active_tab();
                        ui.close_menu();
                    }
                });
                if ui.button("🔍 Search").clicked() {
                    self.handle_quick_search();
                }
                if ui.button("⚙ Settings").clicked() {
                    self.state.ui.show_settings = !self.state.ui.show_settings;
                }
            });
        });
        if open_folder {
            self.handle_open_folder(ctx);
        }
        if let Some(root) = open_recent {
            self.open_notes_root(root, ctx);
        }

        self.render_status_bar(ctx);

        // Document tree
        let state = &self.state;
        let tree_output = self.file_tree_panel.show(
            ctx,
            state.tree(),
            &|path| state.is_expanded(path),
            state.active_path(),
            is_dark,
        );
        if let Some(path) = tree_output.file_clicked {
            self.state.open_tab(&path);
        }
        if let Some((path, expanded)) = tree_output.path_toggled {
            self.state.set_expanded(&path, expanded);
        }
        if let Some(width) = tree_output.new_width {
            self.state.update_settings(|s| s.file_tree_width = width);
        }
        if let Some(action) = tree_output.context_action {
            self.handle_file_tree_context_action(action);
        }

        // Tabs and editor
        let tabs = self.state.tabs();
        let loading = self.state.is_loading();
        let has_active = self.state.active_path().is_some();
        let font_size = self.state.settings.font_size;
        let mut tab_output = None;
        let mut edited = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            if !self.state.session().is_empty() {
                tab_output = Some(show_tab_bar(ui, &tabs));
                ui.separator();
            }

            match self.state.editor_mut() {
                Some(editor) => edited = editor.show(ui, font_size),
                None => {
                    let hint = if loading {
                        "Loading…"
                    } else if has_active {
                        "This note could not be opened"
                    } else {
                        "Open a note from the tree or press Ctrl+P to search"
                    };
                    ui.centered_and_justified(|ui| {
                        ui.label(egui::RichText::new(hint).weak().italics());
                    });
                }
            }
        });

        if edited {
            self.state.notify_edit(Instant::now());
        }
        if let Some(output) = tab_output {
            if let Some(path) = output.close {
                self.state.close_tab(&path);
            } else if let Some(path) = output.activate {
                self.state.switch_tab(&path);
            }
        }

        self.render_overlays(ctx, is_dark);
    }

    fn render_status_bar(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        if let Some(status) = self.state.status() {
            let ttl = match status.kind {
                StatusKind::Info => STATUS_INFO_TTL,
                StatusKind::Error => STATUS_ERROR_TTL,
            };
            if now.saturating_duration_since(status.raised_at) > ttl {
                self.state.clear_status();
            }
        }

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some(status) = self.state.status() {
                    let color = match status.kind {
                        StatusKind::Info => ui.visuals().text_color(),
                        StatusKind::Error => ui.visuals().error_fg_color,
                    };
                    ui.colored_label(color, &status.text);
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!("{} open", self.state.session().len()));
                    if self.state.requests_in_flight() > 0 {
                        ui.spinner();
                    } else if self.state.autosave_pending() {
                        ui.label(egui::RichText::new("● unsaved").weak());
                    }
                });
            });
        });
    }

    /// Render quick search, node dialogs and the settings panel.
    fn render_overlays(&mut self, ctx: &egui::Context, is_dark: bool) {
        if self.quick_search.is_open() {
            let hits = self.state.search_state().hits().to_vec();
            let output = self.quick_search.show(ctx, &hits, is_dark);
            if output.query_changed {
                let query = self.quick_search.query().to_string();
                self.state.search(&query);
            }
            if let Some(path) = output.selected {
                self.state.open_tab(&path);
            }
            if output.closed {
                self.state.clear_search();
            }
        }

        let result = match self.state.ui.dialog.as_mut() {
            Some(dialog) => dialog.show(ctx, is_dark),
            None => NodeDialogResult::None,
        };
        match result {
            NodeDialogResult::None => {}
            NodeDialogResult::Cancelled => {
                self.state.ui.dialog = None;
            }
            NodeDialogResult::Create { parent, name } => {
                self.state.ui.dialog = None;
                self.state.create_node(&parent, &name);
            }
            NodeDialogResult::Move { source, dest_dir } => {
                self.state.ui.dialog = None;
                self.state.move_node(&source, &dest_dir);
            }
        }

        if self.state.ui.show_settings {
            let mut options = self.state.options().clone();
            let mut settings = self.state.settings.clone();
            let output = self
                .settings_panel
                .show(ctx, &mut options, &mut settings, is_dark);
            if output.options_changed {
                apply_visuals(ctx, options.is_dark());
                self.state.set_options(options);
            }
            if output.settings_changed {
                self.state.update_settings(|s| *s = settings);
            }
            if output.close_requested {
                self.state.ui.show_settings = false;
            }
        }
    }

    /// Handle keyboard shortcuts.
    ///
    /// - Ctrl+S: Save the active note
    /// - Ctrl+P: Quick search
    /// - Ctrl+I: New note at the notes root
    /// - Ctrl+W: Close the active tab
    /// - Ctrl+,: Settings
    fn handle_keyboard_shortcuts(&mut self, ctx: &egui::Context) {
        let action = ctx.input(|i| {
            if !i.modifiers.command {
                return None;
            }
            if i.key_pressed(egui::Key::S) {
                debug!("Keyboard shortcut: Ctrl+S (Save)");
                return Some(KeyboardAction::Save);
            }
            if i.key_pressed(egui::Key::P) {
                debug!("Keyboard shortcut: Ctrl+P (Quick Search)");
                return Some(KeyboardAction::QuickSearch);
            }
            if i.key_pressed(egui::Key::I) {
                debug!("Keyboard shortcut: Ctrl+I (New Note)");
                return Some(KeyboardAction::NewNote);
            }
            if i.key_pressed(egui::Key::W) {
                debug!("Keyboard shortcut: Ctrl+W (Close Tab)");
                return Some(KeyboardAction::CloseTab);
            }
            if i.key_pressed(egui::Key::Comma) {
                debug!("Keyboard shortcut: Ctrl+, (Settings)");
                return Some(KeyboardAction::OpenSettings);
            }
            None
        });

        let Some(action) = action else {
            return;
        };
        match action {
            KeyboardAction::Save => {
                if !self.state.manual_save(Instant::now()) {
                    self.state.set_info("Nothing to save");
                }
            }
            KeyboardAction::QuickSearch => self.handle_quick_search(),
            KeyboardAction::NewNote => self.handle_new_note_at_root(),
            KeyboardAction::CloseTab => {
                self.state.close_active_tab();
            }
            KeyboardAction::OpenSettings => {
                self.state.ui.show_settings = !self.state.ui.show_settings;
            }
        }
    }
}

fn apply_visuals(ctx: &egui::Context, dark: bool) {
    ctx.set_visuals(if dark {
        egui::Visuals::dark()
    } else {
        egui::Visuals::light()
    });
}

impl eframe::App for FolioApp {
    /// Called each time the UI needs repainting.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();

        // Apply store answers and fire a due autosave before drawing
        self.state.poll(now);
        self.state.refresh_tree_if_dirty();

        ctx.send_viewport_cmd(egui::ViewportCommand::Title(self.window_title()));
        self.update_window_state(ctx);

        self.render_ui(ctx);
        self.handle_keyboard_shortcuts(ctx);

        let mut wake = self.state.next_wake(Instant::now());
        if let Some(status) = self.state.status() {
            let ttl = match status.kind {
                StatusKind::Info => STATUS_INFO_TTL,
                StatusKind::Error => STATUS_ERROR_TTL,
            };
            let remaining = ttl.saturating_sub(now.saturating_duration_since(status.raised_at));
            wake = Some(wake.map_or(remaining, |w| w.min(remaining)));
        }
        if let Some(wait) = wake {
            ctx.request_repaint_after(wait);
        }
    }

    /// Called when the application is about to close.
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Application exiting");
        self.state.shutdown();
    }

    /// Save persistent state.
    fn save(&mut self, _storage: &mut dyn eframe::Storage) {
        debug!("Saving application state");
        self.state.save_settings_if_dirty();
    }

    /// Auto-save interval for settings.
    fn auto_save_interval(&self) -> Duration {
        Duration::from_secs(30)
    }
}
