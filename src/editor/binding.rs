//! Owns the single live editor and ties it to the active document.
//!
//! Binding is two-phase: `bind` tears down the current editor and issues a
//! content fetch; the editor is constructed only when that fetch completes.
//! Because `bind` drops the old instance before anything else happens, two
//! editors never exist at once.

use super::{EditorFactory, EditorInstance, EditorOptions};
use crate::error::{Error, Result};
use crate::remote::{Dispatch, Request, Ticket};
use log::{debug, warn};

struct Bound<E> {
    path: String,
    editor: E,
}

struct PendingFetch {
    ticket: Ticket,
    path: String,
}

/// What happened when a fetch completion was applied.
#[derive(Debug)]
pub enum FetchOutcome {
    /// An editor is now live for `path`.
    Bound { path: String },
    /// The fetch failed; nothing is bound.
    Failed { path: String, error: Error },
    /// The completion belongs to a bind that was superseded and was ignored.
    Stale,
}

/// Editor lifecycle for the active tab.
pub struct EditorBinding<F: EditorFactory> {
    factory: F,
    bound: Option<Bound<F::Editor>>,
    pending: Option<PendingFetch>,
}

impl<F: EditorFactory> EditorBinding<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            bound: None,
            pending: None,
        }
    }

    /// Start binding `path`: drop the current editor (unsaved edits go with
    /// it) and request the document content.
    pub fn bind(&mut self, path: &str, dispatcher: &mut dyn Dispatch) -> Ticket {
        self.unbind();
        let ticket = dispatcher.submit(Request::Fetch {
            path: path.to_string(),
        });
        debug!("Binding editor to {} (fetch #{})", path, ticket.value());
        self.pending = Some(PendingFetch {
            ticket,
            path: path.to_string(),
        });
        ticket
    }

    /// Destroy the live editor, if any, and forget any fetch in flight.
    /// Returns whether an editor was live.
    pub fn unbind(&mut self) -> bool {
        self.pending = None;
        match self.bound.take() {
            Some(bound) => {
                debug!("Editor for {} destroyed", bound.path);
                true
            }
            None => false,
        }
    }

    /// Apply the answer to a fetch issued by [`bind`](Self::bind).
    ///
    /// Only the most recent fetch can bind; anything older is `Stale`. The
    /// editor is built with the content plus one trailing newline.
    pub fn complete_fetch(
        &mut self,
        ticket: Ticket,
        result: Result<String>,
        options: &EditorOptions,
    ) -> FetchOutcome {
        let Some(pending) = self.take_pending(ticket) else {
            debug!("Discarding stale fetch #{}", ticket.value());
            return FetchOutcome::Stale;
        };

        match result {
            Ok(content) => {
                let editor = self.factory.create(format!("{}\n", content), options);
                self.bound = Some(Bound {
                    path: pending.path.clone(),
                    editor,
                });
                FetchOutcome::Bound { path: pending.path }
            }
            Err(error) => {
                warn!("Failed to load {}: {}", pending.path, error);
                FetchOutcome::Failed {
                    path: pending.path,
                    error,
                }
            }
        }
    }

    /// Give up on the fetch `ticket` if it is still the one awaited.
    pub fn abandon_fetch(&mut self, ticket: Ticket) -> Option<String> {
        self.take_pending(ticket).map(|p| p.path)
    }

    /// Follow a document that moved from `old` to `new`. The live editor and
    /// any fetch in flight keep going under the new path.
    pub fn retarget(&mut self, old: &str, new: &str) -> bool {
        let mut changed = false;
        if let Some(bound) = self.bound.as_mut().filter(|b| b.path == old) {
            bound.path = new.to_string();
            changed = true;
        }
        if let Some(pending) = self.pending.as_mut().filter(|p| p.path == old) {
            pending.path = new.to_string();
            changed = true;
        }
        changed
    }

    /// Text of the live editor, or empty when nothing is bound.
    pub fn current_text(&self) -> &str {
        self.bound.as_ref().map_or("", |b| b.editor.text())
    }

    /// Path the live editor is showing.
    pub fn bound_path(&self) -> Option<&str> {
        self.bound.as_ref().map(|b| b.path.as_str())
    }

    /// Path whose content is being fetched.
    pub fn pending_path(&self) -> Option<&str> {
        self.pending.as_ref().map(|p| p.path.as_str())
    }

    pub fn is_bound(&self) -> bool {
        self.bound.is_some()
    }

    pub fn editor_mut(&mut self) -> Option<&mut F::Editor> {
        self.bound.as_mut().map(|b| &mut b.editor)
    }

    fn take_pending(&mut self, ticket: Ticket) -> Option<PendingFetch> {
        if self.pending.as_ref().is_some_and(|p| p.ticket == ticket) {
            self.pending.take()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::testing::TestFactory;
    use crate::remote::ManualDispatcher;

    fn setup() -> (EditorBinding<TestFactory>, TestFactory, ManualDispatcher) {
        let factory = TestFactory::new();
        (
            EditorBinding::new(factory.clone()),
            factory,
            ManualDispatcher::new(),
        )
    }

    #[test]
    fn test_bind_issues_fetch_and_builds_on_success() {
        let (mut binding, factory, manual) = setup();
        let mut dispatcher = manual.clone();

        let ticket = binding.bind("/n/a.md", &mut dispatcher);
        assert!(!binding.is_bound());
        assert_eq!(binding.pending_path(), Some("/n/a.md"));
        assert_eq!(
            manual.outstanding()[0].1,
            Request::Fetch {
                path: "/n/a.md".into()
            }
        );

        let outcome = binding.complete_fetch(
            ticket,
            Ok("# Title".to_string()),
            &EditorOptions::default(),
        );
        assert!(matches!(outcome, FetchOutcome::Bound { ref path } if path == "/n/a.md"));
        assert_eq!(binding.current_text(), "# Title\n");
        assert_eq!(binding.bound_path(), Some("/n/a.md"));
        assert_eq!(factory.live(), 1);
    }

    #[test]
    fn test_empty_content_still_gets_trailing_newline() {
        let (mut binding, _factory, manual) = setup();
        let ticket = binding.bind("/n/a.md", &mut manual.clone());
        binding.complete_fetch(ticket, Ok(String::new()), &EditorOptions::default());
        assert_eq!(binding.current_text(), "\n");
    }

    #[test]
    fn test_fetch_failure_leaves_nothing_bound() {
        let (mut binding, factory, manual) = setup();
        let ticket = binding.bind("/n/a.md", &mut manual.clone());
        let outcome = binding.complete_fetch(
            ticket,
            Err(Error::remote("smt went wrong")),
            &EditorOptions::default(),
        );
        assert!(matches!(outcome, FetchOutcome::Failed { .. }));
        assert!(!binding.is_bound());
        assert_eq!(binding.current_text(), "");
        assert_eq!(factory.created(), 0);
    }

    #[test]
    fn test_rebind_tears_down_before_next_construct() {
        let (mut binding, factory, manual) = setup();
        let mut dispatcher = manual.clone();
        let options = EditorOptions::default();

        let first = binding.bind("/n/a.md", &mut dispatcher);
        binding.complete_fetch(first, Ok("a".into()), &options);
        assert_eq!(factory.live(), 1);

        let second = binding.bind("/n/b.md", &mut dispatcher);
        assert_eq!(factory.live(), 0);
        binding.complete_fetch(second, Ok("b".into()), &options);
        assert_eq!(factory.live(), 1);
        assert_eq!(factory.max_live(), 1);
        assert_eq!(binding.current_text(), "b\n");
    }

    #[test]
    fn test_superseded_fetch_is_stale() {
        let (mut binding, factory, manual) = setup();
        let mut dispatcher = manual.clone();
        let options = EditorOptions::default();

        let first = binding.bind("/n/a.md", &mut dispatcher);
        let second = binding.bind("/n/b.md", &mut dispatcher);

        // The answer to the superseded bind must not build an editor
        assert!(matches!(
            binding.complete_fetch(first, Ok("a".into()), &options),
            FetchOutcome::Stale
        ));
        assert!(!binding.is_bound());
        binding.complete_fetch(second, Ok("b".into()), &options);
        assert_eq!(binding.bound_path(), Some("/n/b.md"));
        assert_eq!(factory.created(), 1);
    }

    #[test]
    fn test_unbind_discards_pending_fetch() {
        let (mut binding, _factory, manual) = setup();
        let ticket = binding.bind("/n/a.md", &mut manual.clone());
        assert!(!binding.unbind());
        assert!(matches!(
            binding.complete_fetch(ticket, Ok("a".into()), &EditorOptions::default()),
            FetchOutcome::Stale
        ));
    }

    #[test]
    fn test_unbind_when_nothing_bound_is_safe() {
        let (mut binding, _factory, _manual) = setup();
        assert!(!binding.unbind());
        assert!(!binding.unbind());
    }

    #[test]
    fn test_retarget_keeps_editor_alive() {
        let (mut binding, factory, manual) = setup();
        let ticket = binding.bind("/n/a.md", &mut manual.clone());
        binding.complete_fetch(ticket, Ok("a".into()), &EditorOptions::default());

        assert!(binding.retarget("/n/a.md", "/n/sub/a.md"));
        assert_eq!(binding.bound_path(), Some("/n/sub/a.md"));
        assert_eq!(binding.current_text(), "a\n");
        assert_eq!(factory.created(), 1);
        assert!(!binding.retarget("/n/other.md", "/n/sub/other.md"));
    }

    #[test]
    fn test_retarget_pending_fetch() {
        let (mut binding, _factory, manual) = setup();
        let ticket = binding.bind("/n/a.md", &mut manual.clone());
        assert!(binding.retarget("/n/a.md", "/n/sub/a.md"));

        let outcome = binding.complete_fetch(ticket, Ok("a".into()), &EditorOptions::default());
        assert!(matches!(outcome, FetchOutcome::Bound { ref path } if path == "/n/sub/a.md"));
    }

    #[test]
    fn test_abandon_fetch() {
        let (mut binding, _factory, manual) = setup();
        let ticket = binding.bind("/n/a.md", &mut manual.clone());
        assert_eq!(binding.abandon_fetch(ticket).as_deref(), Some("/n/a.md"));
        assert!(binding.abandon_fetch(ticket).is_none());
        assert!(binding.pending_path().is_none());
    }
}
