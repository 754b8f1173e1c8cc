//! Runs queued [`Task`]s on the tokio runtime.
//!
//! Each task becomes one spawned future whose result is posted back to the
//! main loop as a [`Msg`] over an unbounded channel.  The main loop drains
//! the channel every tick, so all state changes still happen on the UI
//! thread.
//!
//! ## For contributors
//!
//! Page fetches are tracked per feed so that tearing a row down aborts its
//! request.  Other lookups always post exactly one message, an error on
//! timeout included; the receiver matches it against current state (search
//! sequence numbers, selected `imdb_id`), so a late answer is harmless.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::api::{ApiClient, ApiError};
use crate::app::Task;
use crate::feed::{FeedId, PageCompletion};
use crate::source::{Credits, Movie};

/// Results sent from background tasks to the main loop.
#[derive(Debug)]
pub enum Msg {
    Page(PageCompletion),
    TopPicks(Result<Vec<Movie>, ApiError>),
    Search {
        seq: u64,
        result: Result<Vec<Movie>, ApiError>,
    },
    Credits {
        imdb_id: String,
        result: Result<Credits, ApiError>,
    },
    Similar {
        imdb_id: String,
        result: Result<Vec<Movie>, ApiError>,
    },
}

pub struct Dispatcher {
    runtime: Handle,
    api: Arc<ApiClient>,
    tx: UnboundedSender<Msg>,
    timeout: Duration,
    pages: HashMap<FeedId, JoinHandle<()>>,
}

impl Dispatcher {
    /// Returns the dispatcher and the receiver the main loop should drain.
    pub fn new(
        runtime: Handle,
        api: Arc<ApiClient>,
        timeout: Duration,
    ) -> (Self, UnboundedReceiver<Msg>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let dispatcher = Self {
            runtime,
            api,
            tx,
            timeout,
            pages: HashMap::new(),
        };
        (dispatcher, rx)
    }

    pub fn run(&mut self, task: Task) {
        match task {
            Task::Page(fetch) => {
                let feed = fetch.feed;
                let tx = self.tx.clone();
                let timeout = self.timeout;
                let handle = self.runtime.spawn(async move {
                    let done = fetch.run(timeout).await;
                    // The receiver is gone only when the app is exiting.
                    let _ = tx.send(Msg::Page(done));
                });
                self.pages.retain(|_, h| !h.is_finished());
                self.pages.insert(feed, handle);
            }
            Task::CancelFeed(feed) => {
                if let Some(handle) = self.pages.remove(&feed) {
                    tracing::debug!(feed, "aborting page fetch");
                    handle.abort();
                }
            }
            Task::TopPicks { limit } => {
                let api = Arc::clone(&self.api);
                self.spawn(async move { api.trending(0, limit).await }, Msg::TopPicks);
            }
            Task::Search(request) => {
                let api = Arc::clone(&self.api);
                let seq = request.seq;
                self.spawn(
                    async move { api.search(&request.query, 0, request.limit).await },
                    move |result| Msg::Search { seq, result },
                );
            }
            Task::Details {
                imdb_id,
                similar_limit,
            } => {
                let api = Arc::clone(&self.api);
                let id = imdb_id.clone();
                let credits_id = imdb_id.clone();
                self.spawn(async move { api.credits(&id).await }, move |result| {
                    Msg::Credits {
                        imdb_id: credits_id,
                        result,
                    }
                });

                let api = Arc::clone(&self.api);
                let id = imdb_id.clone();
                self.spawn(
                    async move { api.similar(&id, 0, similar_limit).await },
                    move |result| Msg::Similar { imdb_id, result },
                );
            }
        }
    }

    /// Run `work` with the request timeout and post its outcome through
    /// `post`.  A timeout is posted as [`ApiError::Timeout`].
    fn spawn<T, F, P>(&self, work: F, post: P)
    where
        T: Send + 'static,
        F: Future<Output = Result<T, ApiError>> + Send + 'static,
        P: FnOnce(Result<T, ApiError>) -> Msg + Send + 'static,
    {
        let tx = self.tx.clone();
        let timeout = self.timeout;
        self.runtime.spawn(async move {
            let result = match tokio::time::timeout(timeout, work).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(?timeout, "background lookup timed out");
                    Err(ApiError::Timeout(timeout))
                }
            };
            let _ = tx.send(post(result));
        });
    }

    /// Number of page fetches that may still be running.
    #[cfg(test)]
    pub fn pages_in_flight(&self) -> usize {
        self.pages.values().filter(|h| !h.is_finished()).count()
    }
}
