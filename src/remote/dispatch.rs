//! Issuing document store requests without blocking the UI thread.
//!
//! Requests are submitted with a [`Ticket`] and their [`Completion`]s are
//! collected later by polling, so every response is handled on the UI thread
//! as a discrete event, in arrival order.

use super::{DocumentStore, RetryPolicy};
use crate::error::{Error, Result};
use log::{debug, warn};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;

/// Identifies one submitted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// One of the four document store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Fetch { path: String },
    Persist { path: String, content: String },
    Create { parent: String, name: String },
    Move { source: String, dest_dir: String },
}

impl Request {
    /// Short operation name for logs and error messages.
    pub fn operation(&self) -> &'static str {
        match self {
            Request::Fetch { .. } => "fetch",
            Request::Persist { .. } => "persist",
            Request::Create { .. } => "create",
            Request::Move { .. } => "move",
        }
    }
}

/// Successful answer to a [`Request`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Content(String),
    Persisted,
    /// Path of the created entity. Folders keep a trailing `/`.
    Created(String),
    Moved,
}

/// A finished request.
#[derive(Debug)]
pub struct Completion {
    pub ticket: Ticket,
    pub request: Request,
    pub result: Result<Response>,
}

/// Run a request to completion against `store`.
///
/// Persists are retried according to `retry`; other operations get a single
/// attempt.
pub fn execute(
    store: &dyn DocumentStore,
    request: &Request,
    retry: &RetryPolicy,
) -> Result<Response> {
    match request {
        Request::Fetch { path } => store.fetch_content(path).map(Response::Content),
        Request::Persist { path, content } => retry
            .run(|| store.persist_content(path, content), thread::sleep)
            .map(|()| Response::Persisted),
        Request::Create { parent, name } => {
            store.create_node(parent, name).map(Response::Created)
        }
        Request::Move { source, dest_dir } => {
            store.move_node(source, dest_dir).map(|()| Response::Moved)
        }
    }
}

/// Submits requests and hands back their completions.
pub trait Dispatch {
    /// Queue a request. Never blocks.
    fn submit(&mut self, request: Request) -> Ticket;

    /// Completions that arrived since the last call. Never blocks.
    fn drain(&mut self) -> Vec<Completion>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Worker Thread
// ─────────────────────────────────────────────────────────────────────────────

/// Callback run on the worker after each completion, used to wake the UI.
pub type Waker = Box<dyn Fn() + Send>;

/// Runs requests one at a time on a background thread.
///
/// Requests are served in submission order. The worker exits once the
/// dispatcher is dropped.
pub struct ThreadDispatcher {
    requests: Sender<(Ticket, Request)>,
    completions: Receiver<Completion>,
    undelivered: Vec<Completion>,
    next_ticket: u64,
}

impl ThreadDispatcher {
    /// Start the worker thread.
    pub fn spawn(
        store: Box<dyn DocumentStore>,
        retry: RetryPolicy,
        waker: Option<Waker>,
    ) -> Result<Self> {
        let (request_tx, request_rx) = channel::<(Ticket, Request)>();
        let (completion_tx, completion_rx) = channel();

        thread::Builder::new()
            .name("folio-store".to_string())
            .spawn(move || {
                for (ticket, request) in request_rx {
                    let result = execute(store.as_ref(), &request, &retry);
                    let completion = Completion {
                        ticket,
                        request,
                        result,
                    };
                    if completion_tx.send(completion).is_err() {
                        break;
                    }
                    if let Some(wake) = &waker {
                        wake();
                    }
                }
                debug!("Document store worker stopped");
            })?;

        Ok(Self {
            requests: request_tx,
            completions: completion_rx,
            undelivered: Vec::new(),
            next_ticket: 0,
        })
    }
}

impl Dispatch for ThreadDispatcher {
    fn submit(&mut self, request: Request) -> Ticket {
        self.next_ticket += 1;
        let ticket = Ticket(self.next_ticket);
        debug!("Submitting {} request #{}", request.operation(), ticket.0);

        if let Err(err) = self.requests.send((ticket, request)) {
            // Worker is gone; answer locally so the caller still gets a completion
            let (_, request) = err.0;
            warn!("Document store worker unavailable for {}", request.operation());
            self.undelivered.push(Completion {
                ticket,
                request,
                result: Err(Error::remote("Document store is unavailable")),
            });
        }
        ticket
    }

    fn drain(&mut self) -> Vec<Completion> {
        let mut completions = std::mem::take(&mut self.undelivered);
        while let Ok(completion) = self.completions.try_recv() {
            completions.push(completion);
        }
        completions
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Inline
// ─────────────────────────────────────────────────────────────────────────────

/// Runs each request immediately inside `submit`.
///
/// Completions are still delivered through `drain`, so callers see the same
/// event order as with the worker thread.
pub struct InlineDispatcher {
    store: Box<dyn DocumentStore>,
    retry: RetryPolicy,
    ready: Vec<Completion>,
    next_ticket: u64,
}

impl InlineDispatcher {
    pub fn new(store: Box<dyn DocumentStore>, retry: RetryPolicy) -> Self {
        Self {
            store,
            retry,
            ready: Vec::new(),
            next_ticket: 0,
        }
    }
}

impl Dispatch for InlineDispatcher {
    fn submit(&mut self, request: Request) -> Ticket {
        self.next_ticket += 1;
        let ticket = Ticket(self.next_ticket);
        let result = execute(self.store.as_ref(), &request, &self.retry);
        self.ready.push(Completion {
            ticket,
            request,
            result,
        });
        ticket
    }

    fn drain(&mut self) -> Vec<Completion> {
        std::mem::take(&mut self.ready)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Manual (tests)
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
pub use manual::ManualDispatcher;


#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::MemoryDocumentStore;
    use std::time::{Duration, Instant};

    fn drain_until(dispatcher: &mut ThreadDispatcher, count: usize) -> Vec<Completion> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut completions = Vec::new();
        while completions.len() < count && Instant::now() < deadline {
            completions.extend(dispatcher.drain());
            thread::sleep(Duration::from_millis(5));
        }
        completions
    }

    #[test]
    fn test_execute_maps_responses() {
        let store = MemoryDocumentStore::new().with_document("/n/a.md", "hi");
        let retry = RetryPolicy::none();

        let fetched = execute(
            &store,
            &Request::Fetch {
                path: "/n/a.md".into(),
            },
            &retry,
        );
        assert_eq!(fetched.unwrap(), Response::Content("hi".into()));

        let created = execute(
            &store,
            &Request::Create {
                parent: "/n".into(),
                name: "b".into(),
            },
            &retry,
        );
        assert_eq!(created.unwrap(), Response::Created("/n/b.md".into()));
    }

    #[test]
    fn test_execute_retries_persist_only() {
        let store = MemoryDocumentStore::new().with_document("/n/a.md", "hi");
        let retry = RetryPolicy {
            max_attempts: 3,
            initial_backoff_ms: 1,
            max_backoff_ms: 1,
        };

        store.fail_times("persist", 2);
        let saved = execute(
            &store,
            &Request::Persist {
                path: "/n/a.md".into(),
                content: "new".into(),
            },
            &retry,
        );
        assert_eq!(saved.unwrap(), Response::Persisted);
        assert_eq!(store.content("/n/a.md").as_deref(), Some("new"));

        store.fail_times("fetch", 1);
        let fetched = execute(
            &store,
            &Request::Fetch {
                path: "/n/a.md".into(),
            },
            &retry,
        );
        assert!(fetched.is_err());
    }

    #[test]
    fn test_inline_dispatcher_delivers_on_drain() {
        let store = MemoryDocumentStore::new().with_document("/n/a.md", "hi");
        let mut dispatcher = InlineDispatcher::new(Box::new(store), RetryPolicy::none());

        let first = dispatcher.submit(Request::Fetch {
            path: "/n/a.md".into(),
        });
        let second = dispatcher.submit(Request::Fetch {
            path: "/n/missing.md".into(),
        });
        assert_ne!(first, second);

        let completions = dispatcher.drain();
        assert_eq!(completions.len(), 2);
        assert_eq!(completions[0].ticket, first);
        assert!(completions[0].result.is_ok());
        assert!(completions[1].result.is_err());
        assert!(dispatcher.drain().is_empty());
    }

    #[test]
    fn test_thread_dispatcher_preserves_order() {
        let store = MemoryDocumentStore::new();
        let observer = store.clone();
        let mut dispatcher =
            ThreadDispatcher::spawn(Box::new(store), RetryPolicy::none(), None).unwrap();

        let tickets: Vec<Ticket> = (0..3)
            .map(|i| {
                dispatcher.submit(Request::Persist {
                    path: "/n/a.md".into(),
                    content: format!("v{}", i),
                })
            })
            .collect();

        let completions = drain_until(&mut dispatcher, 3);
        let seen: Vec<Ticket> = completions.iter().map(|c| c.ticket).collect();
        assert_eq!(seen, tickets);
        assert_eq!(observer.content("/n/a.md").as_deref(), Some("v2"));
    }

    #[test]
    fn test_thread_dispatcher_calls_waker() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let wakes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&wakes);
        let mut dispatcher = ThreadDispatcher::spawn(
            Box::new(MemoryDocumentStore::new()),
            RetryPolicy::none(),
            Some(Box::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })),
        )
        .unwrap();

        dispatcher.submit(Request::Fetch {
            path: "/n/none.md".into(),
        });
        assert_eq!(drain_until(&mut dispatcher, 1).len(), 1);

        // The wake follows the send, so give the worker a moment to run it
        let deadline = Instant::now() + Duration::from_secs(5);
        while wakes.load(Ordering::SeqCst) == 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(wakes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_manual_dispatcher_answers_out_of_order() {
        let manual = ManualDispatcher::new();
        let mut dispatcher: Box<dyn Dispatch> = Box::new(manual.clone());

        let a = dispatcher.submit(Request::Fetch { path: "/a".into() });
        let b = dispatcher.submit(Request::Fetch { path: "/b".into() });
        assert_eq!(manual.outstanding().len(), 2);
        assert_eq!(manual.last_ticket(), Some(b));

        manual.complete(b, Ok(Response::Content("B".into())));
        manual.complete(a, Ok(Response::Content("A".into())));
        let order: Vec<Ticket> = dispatcher.drain().iter().map(|c| c.ticket).collect();
        assert_eq!(order, vec![b, a]);
    }
}
