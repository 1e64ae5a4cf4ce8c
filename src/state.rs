//! Application state management for Folio
//!
//! `AppState` is the tab lifecycle controller. It owns the session, the
//! durable store, the editor binding, the autosave debouncer and the request
//! dispatcher, and it is the only place that mutates any of them. All of its
//! methods run on the UI thread; document store answers arrive through
//! [`AppState::poll`] and are applied one at a time.

use crate::config::{save_config_silent, Settings};
use crate::editor::{Autosave, EditorBinding, EditorFactory, EditorOptions, FetchOutcome};
use crate::error::Error;
use crate::remote::{moved_path, Completion, Dispatch, Request, Response, Ticket};
use crate::search::{DocumentIndex, SearchHit, SearchState};
use crate::session::{display_name, Session, Tab};
use crate::storage::KeyValueStore;
use crate::tree::{scan_notes_root, visibility, DocumentNode, IgnoreSet, NodeId};
use crate::ui::NodeDialog;
use log::{debug, info, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

// ─────────────────────────────────────────────────────────────────────────────
// Status Region
// ─────────────────────────────────────────────────────────────────────────────

/// Severity of a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

/// The latest user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
    pub raised_at: Instant,
}

// ─────────────────────────────────────────────────────────────────────────────
// UI State
// ─────────────────────────────────────────────────────────────────────────────

/// UI-related state flags.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Whether the settings panel is open
    pub show_settings: bool,
    /// Open create or move dialog, if any
    pub dialog: Option<NodeDialog>,
}

/// A request that has not been answered yet.
#[derive(Debug, Clone, Copy)]
struct InFlight {
    operation: &'static str,
    started: Instant,
}

// ─────────────────────────────────────────────────────────────────────────────
// Application State
// ─────────────────────────────────────────────────────────────────────────────

/// Central application state.
///
/// Every session mutation is written back to the durable store before the
/// method returns.
pub struct AppState<F: EditorFactory> {
    /// Application settings (loaded from config)
    pub settings: Settings,
    /// Whether settings have been modified and need saving
    settings_dirty: bool,
    /// UI-related state
    pub ui: UiState,

    notes_root: PathBuf,
    store: Box<dyn KeyValueStore>,
    session: Session,
    binding: EditorBinding<F>,
    autosave: Autosave,
    dispatcher: Box<dyn Dispatch>,
    in_flight: BTreeMap<Ticket, InFlight>,
    /// Timed-out creates and moves whose late answers are still applied
    unresolved: BTreeSet<Ticket>,
    /// Source paths of moves the store has not answered yet
    moving: BTreeMap<Ticket, String>,
    options: EditorOptions,

    ignore: IgnoreSet,
    tree: DocumentNode,
    tree_dirty: bool,
    index: DocumentIndex,
    search: SearchState,

    status: Option<StatusMessage>,
    /// Latest time observed through `poll` or `notify_edit`
    clock: Instant,
}

impl<F: EditorFactory> AppState<F> {
    /// Create the state for `notes_root`.
    ///
    /// The session is not loaded yet; call [`restore_session`](Self::restore_session)
    /// once at startup.
    pub fn new(
        notes_root: PathBuf,
        settings: Settings,
        store: Box<dyn KeyValueStore>,
        dispatcher: Box<dyn Dispatch>,
        factory: F,
    ) -> Self {
        let options = EditorOptions::load(store.as_ref());
        let ignore = IgnoreSet::new(&settings.ignore_patterns);
        let autosave = Autosave::new(settings.autosave_delay());
        let tree = DocumentNode::directory(
            display_name(&notes_root.to_string_lossy()),
            notes_root.to_string_lossy(),
            Vec::new(),
        );
        info!("AppState initialized for {}", notes_root.display());

        Self {
            settings,
            settings_dirty: false,
            ui: UiState::default(),
            notes_root,
            store,
            session: Session::new(),
            binding: EditorBinding::new(factory),
            autosave,
            dispatcher,
            in_flight: BTreeMap::new(),
            unresolved: BTreeSet::new(),
            moving: BTreeMap::new(),
            options,
            ignore,
            tree,
            tree_dirty: true,
            index: DocumentIndex::default(),
            search: SearchState::new(),
            status: None,
            clock: Instant::now(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn notes_root(&self) -> &Path {
        &self.notes_root
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Tab bar projection of the session.
    pub fn tabs(&self) -> Vec<Tab> {
        self.session.tabs()
    }

    pub fn active_path(&self) -> Option<&str> {
        self.session.active_path()
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    /// The live editor, if the active document has loaded.
    pub fn editor_mut(&mut self) -> Option<&mut F::Editor> {
        self.binding.editor_mut()
    }

    /// Text of the live editor, empty when nothing is bound.
    pub fn current_text(&self) -> &str {
        self.binding.current_text()
    }

    /// Whether the active document's content is still being fetched.
    pub fn is_loading(&self) -> bool {
        self.binding.pending_path().is_some()
    }

    pub fn autosave_pending(&self) -> bool {
        self.autosave.is_pending()
    }

    /// Number of unanswered document store requests.
    pub fn requests_in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// How soon `poll` needs to run again, if anything is waiting.
    pub fn next_wake(&self, now: Instant) -> Option<Duration> {
        let request_wake = (!self.in_flight.is_empty()).then(|| Duration::from_millis(100));
        match (self.autosave.time_until_due(now), request_wake) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Tab Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Open `path` in a tab and make it active.
    ///
    /// Opening an already open path only activates it. Either way the editor
    /// is rebound to `path`.
    pub fn open_tab(&mut self, path: &str) {
        if self.session.open(path) {
            debug!("Opened tab {}", path);
        }
        self.session.activate(path);
        self.rebind(path);
        self.persist_session();
    }

    /// Make an open tab active. Returns `false` (and changes nothing) if
    /// `path` is not open.
    pub fn switch_tab(&mut self, path: &str) -> bool {
        if !self.session.activate(path) {
            warn!("Cannot switch to {}: tab is not open", path);
            return false;
        }
        debug!("Switched to tab {}", path);
        self.rebind(path);
        self.persist_session();
        true
    }

    /// Close a tab. Closing the active tab leaves no tab active. Returns
    /// `false` (and changes nothing) if `path` is not open.
    pub fn close_tab(&mut self, path: &str) -> bool {
        let Some(was_active) = self.session.close(path) else {
            warn!("Cannot close {}: tab is not open", path);
            return false;
        };
        debug!("Closed tab {} (was active: {})", path, was_active);

        let editor_on_path =
            self.binding.bound_path() == Some(path) || self.binding.pending_path() == Some(path);
        if was_active || editor_on_path {
            self.binding.unbind();
        }
        self.persist_session();
        true
    }

    /// Close the active tab, if any.
    pub fn close_active_tab(&mut self) -> bool {
        match self.session.active_path().map(str::to_string) {
            Some(path) => self.close_tab(&path),
            None => false,
        }
    }

    /// Load the session from the durable store and rebind the editor to the
    /// active tab, if there is one. Called once at startup.
    pub fn restore_session(&mut self) {
        self.binding.unbind();
        self.session = Session::load(self.store.as_ref());
        info!(
            "Restored {} tab(s) from previous session",
            self.session.len()
        );

        if let Some(active) = self.session.active_path().map(str::to_string) {
            self.switch_tab(&active);
        }
    }

    fn rebind(&mut self, path: &str) {
        let ticket = self.binding.bind(path, self.dispatcher.as_mut());
        self.track(ticket, "fetch");
    }

    fn persist_session(&mut self) {
        if let Err(e) = self.session.save(self.store.as_mut()) {
            warn!("Failed to persist session: {}", e);
            self.set_error(format!("Failed to remember open tabs: {}", e));
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Saving
    // ─────────────────────────────────────────────────────────────────────────

    /// Record edit activity in the live editor.
    pub fn notify_edit(&mut self, now: Instant) {
        self.advance_clock(now);
        if self.binding.is_bound() {
            self.autosave.on_edit(now);
        }
    }

    /// Save now, dropping any scheduled autosave. Returns whether a save was
    /// issued.
    pub fn manual_save(&mut self, now: Instant) -> bool {
        self.advance_clock(now);
        self.autosave.cancel();
        self.flush()
    }

    /// Persist the live editor's text under the path active right now.
    ///
    /// Suppressed when no editor is bound. Deferred while the note, or a
    /// folder holding it, is being moved, so the write cannot recreate the
    /// old path.
    fn flush(&mut self) -> bool {
        let (Some(active), Some(bound)) = (self.session.active_path(), self.binding.bound_path())
        else {
            debug!("Save suppressed: no editor bound");
            return false;
        };
        if active != bound {
            warn!("Save suppressed: editor shows {} but {} is active", bound, active);
            return false;
        }
        if let Some(source) = self.moving.values().find(|source| is_within(active, source)) {
            debug!("Save of {} deferred until the move of {} resolves", active, source);
            self.autosave.on_edit(self.clock);
            return false;
        }

        let request = Request::Persist {
            path: active.to_string(),
            content: self.binding.current_text().to_string(),
        };
        let ticket = self.dispatcher.submit(request);
        self.track(ticket, "persist");
        true
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Event Loop
    // ─────────────────────────────────────────────────────────────────────────

    /// Apply arrived completions, expire overdue requests and run a due
    /// autosave. Call once per frame.
    pub fn poll(&mut self, now: Instant) {
        self.advance_clock(now);

        for completion in self.dispatcher.drain() {
            self.apply_completion(completion);
        }
        self.expire_requests(now);

        if self.autosave.poll(now) {
            self.flush();
        }
    }

    fn advance_clock(&mut self, now: Instant) {
        if now > self.clock {
            self.clock = now;
        }
    }

    fn track(&mut self, ticket: Ticket, operation: &'static str) {
        self.in_flight.insert(
            ticket,
            InFlight {
                operation,
                started: self.clock,
            },
        );
    }

    fn expire_requests(&mut self, now: Instant) {
        let timeout = self.settings.request_timeout();
        let overdue: Vec<(Ticket, InFlight)> = self
            .in_flight
            .iter()
            .filter(|(_, f)| now.saturating_duration_since(f.started) >= timeout)
            .map(|(t, f)| (*t, *f))
            .collect();

        for (ticket, flight) in overdue {
            self.in_flight.remove(&ticket);
            warn!("{} request #{} timed out", flight.operation, ticket.value());

            // The store may still carry out a create or move
            if matches!(flight.operation, "create" | "move") {
                self.unresolved.insert(ticket);
            }

            // A superseded fetch times out silently
            if flight.operation == "fetch" && self.binding.abandon_fetch(ticket).is_none() {
                continue;
            }
            let error = Error::TimedOut {
                operation: flight.operation,
            };
            self.set_error(error.to_string());
        }
    }

    fn apply_completion(&mut self, completion: Completion) {
        let Completion {
            ticket,
            request,
            result,
        } = completion;
        self.moving.remove(&ticket);
        let tracked = self.in_flight.remove(&ticket).is_some();
        if !tracked && !self.unresolved.remove(&ticket) {
            debug!("Ignoring late answer to request #{}", ticket.value());
            return;
        }

        match (request, result) {
            (Request::Fetch { .. }, result) => {
                let content = result.and_then(|response| match response {
                    Response::Content(content) => Ok(content),
                    other => Err(Error::Application(format!(
                        "Unexpected answer to fetch: {:?}",
                        other
                    ))),
                });
                match self.binding.complete_fetch(ticket, content, &self.options) {
                    FetchOutcome::Bound { path } => debug!("Editor bound to {}", path),
                    FetchOutcome::Failed { path, error } => {
                        self.set_error(format!("Failed to open {}: {}", display_name(&path), error));
                    }
                    FetchOutcome::Stale => {}
                }
            }
            (Request::Persist { path, .. }, Ok(_)) => {
                info!("Saved {}", path);
                self.set_info(format!("Saved {}", display_name(&path)));
            }
            (Request::Persist { path, .. }, Err(e)) => {
                warn!("Failed to save {}: {}", path, e);
                self.set_error(format!("Failed to save {}: {}", display_name(&path), e));
            }
            (Request::Create { .. }, Ok(Response::Created(entity))) => {
                self.tree_dirty = true;
                if entity.ends_with('/') {
                    self.set_info(format!("Created folder {}", entity));
                } else {
                    self.set_info(format!("Created {}", display_name(&entity)));
                    self.open_tab(&entity);
                }
            }
            (Request::Move { source, dest_dir }, Ok(_)) => {
                self.tree_dirty = true;
                self.follow_move(&source, &moved_path(&source, &dest_dir));
                self.set_info(format!("Moved {} to {}", display_name(&source), dest_dir));
            }
            (Request::Create { .. } | Request::Move { .. }, Err(e)) => {
                self.set_error(e.to_string());
            }
            (request, Ok(response)) => {
                warn!(
                    "Unexpected answer to {}: {:?}",
                    request.operation(),
                    response
                );
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Node Creation & Move
    // ─────────────────────────────────────────────────────────────────────────

    /// Ask the store to create a note (or a folder, if `name` ends in `/`)
    /// under `parent`. A created note is opened once the store confirms.
    pub fn create_node(&mut self, parent: &str, name: &str) {
        let ticket = self.dispatcher.submit(Request::Create {
            parent: parent.to_string(),
            name: name.to_string(),
        });
        self.track(ticket, "create");
    }

    /// Ask the store to move `source` into `dest_dir`.
    ///
    /// A scheduled autosave of `source` is flushed first so the save is
    /// ordered before the move.
    pub fn move_node(&mut self, source: &str, dest_dir: &str) {
        if self.autosave.is_pending() && self.binding.bound_path() == Some(source) {
            self.autosave.cancel();
            self.flush();
        }
        let ticket = self.dispatcher.submit(Request::Move {
            source: source.to_string(),
            dest_dir: dest_dir.to_string(),
        });
        self.track(ticket, "move");
        self.moving.insert(ticket, source.to_string());
    }

    /// Point tabs and the live editor at the new location of a moved note,
    /// or of every note under a moved folder.
    fn follow_move(&mut self, source: &str, new_path: &str) {
        let affected: Vec<String> = self
            .session
            .open_paths()
            .iter()
            .filter(|p| is_within(p, source))
            .cloned()
            .collect();
        if affected.is_empty() {
            self.binding.retarget(source, new_path);
            return;
        }

        for old in affected {
            let new = format!("{}{}", new_path, &old[source.len()..]);
            debug!("Tab {} now points at {}", old, new);
            self.binding.retarget(&old, &new);
            self.session.retarget(&old, &new);
        }
        self.persist_session();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Document Tree & Search
    // ─────────────────────────────────────────────────────────────────────────

    pub fn tree(&self) -> &DocumentNode {
        &self.tree
    }

    /// Replace the document tree and the search index derived from it.
    pub fn set_tree(&mut self, tree: DocumentNode) {
        self.index = DocumentIndex::new(tree.documents());
        self.search.refresh(&self.index);
        self.tree = tree;
        self.tree_dirty = false;
    }

    /// Rescan the notes folder if something changed it.
    pub fn refresh_tree_if_dirty(&mut self) {
        if self.tree_dirty {
            let tree = scan_notes_root(&self.notes_root, &self.ignore);
            debug!("Document tree rescanned: {} note(s)", tree.file_count());
            self.set_tree(tree);
        }
    }

    /// Rescan the notes folder on the next frame.
    pub fn request_tree_refresh(&mut self) {
        self.tree_dirty = true;
    }

    /// Run the search for `query` and return the matches in index order.
    pub fn search(&mut self, query: &str) -> &[SearchHit] {
        self.search.update(query, &self.index)
    }

    pub fn search_state(&self) -> &SearchState {
        &self.search
    }

    pub fn clear_search(&mut self) {
        self.search.clear();
    }

    /// Remember whether the folder at `path` is expanded.
    pub fn set_expanded(&mut self, path: &str, expanded: bool) {
        let id = NodeId::for_path(path);
        if let Err(e) = visibility::set_expanded(self.store.as_mut(), &id, expanded) {
            warn!("Failed to store expansion of {}: {}", path, e);
            self.set_error(format!("Failed to remember folder state: {}", e));
        }
    }

    /// Whether the folder at `path` is expanded. Collapsed unless recorded.
    pub fn is_expanded(&self, path: &str) -> bool {
        visibility::is_expanded(self.store.as_ref(), &NodeId::for_path(path))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Preferences & Settings
    // ─────────────────────────────────────────────────────────────────────────

    /// Store new editor preferences. They apply to the next editor built.
    pub fn set_options(&mut self, options: EditorOptions) {
        if let Err(e) = options.save(self.store.as_mut()) {
            warn!("Failed to store editor preferences: {}", e);
            self.set_error(format!("Failed to save preferences: {}", e));
        }
        self.options = options;
    }

    /// Update settings and mark them dirty.
    pub fn update_settings<G>(&mut self, f: G)
    where
        G: FnOnce(&mut Settings),
    {
        f(&mut self.settings);
        self.settings.sanitize();
        self.autosave.set_delay(self.settings.autosave_delay());
        self.settings_dirty = true;
    }

    /// Save settings to the config file if modified. Returns `true` if saved.
    pub fn save_settings_if_dirty(&mut self) -> bool {
        if self.settings_dirty && save_config_silent(&self.settings) {
            self.settings_dirty = false;
            info!("Settings saved");
            return true;
        }
        false
    }

    /// Flush a scheduled autosave and save settings before exit.
    ///
    /// Waits up to the request timeout for outstanding requests so a final
    /// save handed to a worker thread is written before the process exits.
    pub fn shutdown(&mut self) {
        let deadline = Instant::now() + self.settings.request_timeout();
        loop {
            // A save deferred behind a move is retried once the move resolves
            if self.autosave.cancel() {
                self.flush();
            }
            if self.in_flight.is_empty() || Instant::now() >= deadline {
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
            self.poll(Instant::now());
        }
        self.settings_dirty = true;
        self.save_settings_if_dirty();
        info!("AppState shutdown complete");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Status Helpers
    // ─────────────────────────────────────────────────────────────────────────

    pub fn set_info(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            kind: StatusKind::Info,
            text: text.into(),
            raised_at: self.clock,
        });
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            kind: StatusKind::Error,
            text: text.into(),
            raised_at: self.clock,
        });
    }
}

/// Whether `path` is `source` itself or lies inside the folder `source`.
fn is_within(path: &str, source: &str) -> bool {
    path.strip_prefix(source)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
