//! Detail pane for the selected movie.
//!
//! Selecting a movie immediately shows what the movie record carries; cast
//! and similar titles arrive later and are only kept if they belong to the
//! movie that is still selected.

use crate::api::ApiError;
use crate::source::{CastMember, Credits, CrewMember, Movie};

pub const MAX_CAST: usize = 6;
pub const MAX_SIMILAR: usize = 7;

/// Lookups to start after a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRequest {
    pub imdb_id: String,
}

#[derive(Debug, Default)]
pub struct Detail {
    movie: Option<Movie>,
    pub cast: Vec<CastMember>,
    pub directors: Vec<String>,
    pub similar: Vec<Movie>,
}

impl Detail {
    pub fn movie(&self) -> Option<&Movie> {
        self.movie.as_ref()
    }

    /// Show `movie`.  Returns the lookups to run if it has an `imdb_id`.
    pub fn select(&mut self, movie: Movie) -> Option<DetailRequest> {
        self.cast.clear();
        self.directors.clear();
        self.similar.clear();
        let request = movie.imdb_id.clone().map(|imdb_id| DetailRequest { imdb_id });
        self.movie = Some(movie);
        request
    }

    fn is_current(&self, imdb_id: &str) -> bool {
        self.movie
            .as_ref()
            .and_then(|m| m.imdb_id.as_deref())
            .is_some_and(|id| id == imdb_id)
    }

    pub fn apply_credits(&mut self, imdb_id: &str, result: Result<Credits, ApiError>) {
        if !self.is_current(imdb_id) {
            return;
        }
        match result {
            Ok(credits) => {
                self.cast = credits.cast;
                self.cast.truncate(MAX_CAST);
                self.directors = credits
                    .crew
                    .into_iter()
                    .filter(|c| c.job.eq_ignore_ascii_case("director") && !c.name.is_empty())
                    .map(|c| c.name)
                    .collect();
            }
            Err(e) => {
                tracing::warn!(imdb_id, error = %e, "credits lookup failed");
                self.cast.clear();
                self.directors.clear();
            }
        }
    }

    pub fn apply_similar(&mut self, imdb_id: &str, result: Result<Vec<Movie>, ApiError>) {
        if !self.is_current(imdb_id) {
            return;
        }
        match result {
            Ok(movies) => {
                self.similar = movies;
                self.similar.truncate(MAX_SIMILAR);
            }
            Err(e) => {
                tracing::warn!(imdb_id, error = %e, "similar lookup failed");
                self.similar.clear();
            }
        }
    }
}
