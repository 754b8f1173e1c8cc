//! Page source abstraction layer.
//!
//! This module defines the [`PageSource`] trait, the shared [`Movie`] type,
//! and the API-backed sources that feed the home screen rows (see
//! [`catalog`]).
//!
//! ## For contributors: adding a new feed
//!
//! 1. Define a struct holding whatever the feed needs (a client, a genre
//!    name, a preference payload…).
//! 2. Implement [`PageSource`] for it.
//! 3. Hand an `Arc` of it to [`crate::app::App::add_feed`].
//!
//! The loader, the row widget and key handling are all source-agnostic.

mod catalog;
mod movie;

pub use catalog::{GenreSource, PersonalSource, TrendingSource};
pub use movie::{CastMember, Credits, CrewMember, Movie};

use async_trait::async_trait;

use crate::api::ApiError;

/// Anything that can produce one page of movies for a given cursor.
///
/// A [`crate::feed::FeedLoader`] calls [`fetch_page`](PageSource::fetch_page)
/// from a tokio task, so implementations must be `Send + Sync`.
///
/// ## Implementing a new source
///
/// ```ignore
/// struct Fixed(Vec<Movie>);
///
/// #[async_trait]
/// impl PageSource for Fixed {
///     fn name(&self) -> &str { "fixed" }
///
///     async fn fetch_page(&self, offset: usize, limit: usize) -> Result<Vec<Movie>, ApiError> {
///         Ok(self.0.iter().skip(offset).take(limit).cloned().collect())
///     }
/// }
/// ```
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Short label used in log lines.
    fn name(&self) -> &str;

    /// Fetch up to `limit` items starting at `offset`.
    ///
    /// An empty `Vec` means "nothing at this offset"; errors are logged by
    /// the loader and leave its state untouched.
    async fn fetch_page(&self, offset: usize, limit: usize) -> Result<Vec<Movie>, ApiError>;
}
