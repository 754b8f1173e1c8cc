//! Incremental feed loading.
//!
//! A [`FeedLoader`] owns one row's worth of state: the movies fetched so
//! far, the cursor for the next page, and whether a fetch is outstanding.
//! Loading is split in two halves so the UI thread never blocks:
//!
//! * [`FeedLoader::begin_load`] marks the loader busy and hands back a
//!   [`PageFetch`], which the caller runs wherever it likes (normally a
//!   tokio task, see [`crate::dispatch`]).
//! * [`FeedLoader::finish_load`] applies the resulting [`PageCompletion`].
//!
//! While a fetch is outstanding `begin_load` returns `None`, so a loader
//! never has more than one request in flight no matter how often the user
//! presses "+ More".
//!
//! ## State rules
//!
//! * `items` only grows, in arrival order.
//! * `offset` advances by exactly `page_size` after a non-empty page and
//!   never otherwise; empty pages and failures leave both fields alone.
//! * `is_loading` is cleared by every completion, including failures and
//!   timeouts.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::api::ApiError;
use crate::source::{Movie, PageSource};

/// Identifies one loader instance for the lifetime of the app.
pub type FeedId = u64;

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedOptions {
    /// Items requested per page.  Zero is bumped to one.
    pub page_size: usize,
    /// Request the first page as soon as the loader is created.
    pub auto_load: bool,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            auto_load: true,
        }
    }
}

/// Snapshot of a loader's progress.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedState {
    pub items: Vec<Movie>,
    /// Cursor for the next page.
    pub offset: usize,
    pub is_loading: bool,
    /// The most recent completed fetch came back empty.  Only a hint; it
    /// does not stop further loads.
    pub reached_end: bool,
}

/// One outstanding page request, detached from its loader.
pub struct PageFetch {
    pub feed: FeedId,
    pub ticket: u64,
    pub offset: usize,
    pub limit: usize,
    source: Arc<dyn PageSource>,
}

impl fmt::Debug for PageFetch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageFetch")
            .field("feed", &self.feed)
            .field("ticket", &self.ticket)
            .field("source", &self.source.name())
            .field("offset", &self.offset)
            .field("limit", &self.limit)
            .finish()
    }
}

impl PageFetch {
    /// Call the source, giving up after `timeout`.
    pub async fn run(self, timeout: Duration) -> PageCompletion {
        let fetch = self.source.fetch_page(self.offset, self.limit);
        let result = match tokio::time::timeout(timeout, fetch).await {
            Ok(result) => result,
            Err(_) => Err(ApiError::Timeout(timeout)),
        };
        PageCompletion {
            feed: self.feed,
            ticket: self.ticket,
            result,
        }
    }
}

/// Result of a [`PageFetch`], to be fed back into its loader.
#[derive(Debug)]
pub struct PageCompletion {
    pub feed: FeedId,
    pub ticket: u64,
    pub result: Result<Vec<Movie>, ApiError>,
}

/// What [`FeedLoader::finish_load`] did with a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// This many items were appended.
    Appended(usize),
    Empty,
    Failed,
    /// Not the outstanding fetch of this loader; nothing changed.
    Stale,
}

pub struct FeedLoader {
    id: FeedId,
    title: String,
    source: Arc<dyn PageSource>,
    page_size: usize,
    state: FeedState,
    ticket: u64,
}

impl FeedLoader {
    /// Create a loader, returning the first fetch if `options.auto_load`.
    pub fn create(
        id: FeedId,
        title: impl Into<String>,
        source: Arc<dyn PageSource>,
        options: FeedOptions,
    ) -> (Self, Option<PageFetch>) {
        let mut loader = Self {
            id,
            title: title.into(),
            source,
            page_size: options.page_size.max(1),
            state: FeedState::default(),
            ticket: 0,
        };
        let first = if options.auto_load {
            loader.begin_load()
        } else {
            None
        };
        (loader, first)
    }

    pub fn id(&self) -> FeedId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    #[cfg(test)]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn items(&self) -> &[Movie] {
        &self.state.items
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading
    }

    /// Start fetching the next page, unless one is already outstanding.
    pub fn begin_load(&mut self) -> Option<PageFetch> {
        if self.state.is_loading {
            tracing::debug!(feed = self.id, title = %self.title, "load already in flight");
            return None;
        }

        self.state.is_loading = true;
        self.ticket += 1;
        tracing::debug!(
            feed = self.id,
            title = %self.title,
            offset = self.state.offset,
            limit = self.page_size,
            "loading page"
        );

        Some(PageFetch {
            feed: self.id,
            ticket: self.ticket,
            offset: self.state.offset,
            limit: self.page_size,
            source: Arc::clone(&self.source),
        })
    }

    /// Apply the outcome of the fetch started by the last `begin_load`.
    pub fn finish_load(&mut self, done: PageCompletion) -> Applied {
        if done.feed != self.id || done.ticket != self.ticket || !self.state.is_loading {
            tracing::debug!(
                feed = self.id,
                got_feed = done.feed,
                got_ticket = done.ticket,
                "dropping stale page"
            );
            return Applied::Stale;
        }

        self.state.is_loading = false;

        match done.result {
            Ok(page) if page.is_empty() => {
                self.state.reached_end = true;
                Applied::Empty
            }
            Ok(page) => {
                let n = page.len();
                self.state.items.extend(page);
                self.state.offset += self.page_size;
                self.state.reached_end = false;
                Applied::Appended(n)
            }
            Err(e) => {
                tracing::warn!(
                    feed = self.id,
                    title = %self.title,
                    source = self.source.name(),
                    offset = self.state.offset,
                    error = %e,
                    "page fetch failed"
                );
                Applied::Failed
            }
        }
    }

    /// Fetch and apply the next page in one go.
    #[cfg(test)]
    pub async fn load_more(&mut self, timeout: Duration) -> Applied {
        match self.begin_load() {
            Some(fetch) => {
                let done = fetch.run(timeout).await;
                self.finish_load(done)
            }
            None => Applied::Stale,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
