//! Search-as-you-type.
//!
//! Keystrokes update the query immediately but the request is only issued
//! once the query has been stable for the debounce window.  Every edit bumps
//! a sequence number, and [`SearchBox::apply`] ignores responses for any
//! sequence but the latest, so a slow answer for `"st"` can never replace
//! the results for `"star"`.

use std::time::{Duration, Instant};

use crate::api::ApiError;
use crate::source::Movie;

/// Queries shorter than this clear the results and issue no request.
pub const MIN_QUERY_CHARS: usize = 2;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);

/// A search that is due to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub seq: u64,
    pub query: String,
    pub limit: usize,
}

#[derive(Debug)]
pub struct SearchBox {
    query: String,
    pub results: Vec<Movie>,
    /// Highlighted result in the dropdown.
    pub selected: usize,
    debounce: Duration,
    limit: usize,
    due: Option<Instant>,
    seq: u64,
}

impl SearchBox {
    pub fn new(debounce: Duration, limit: usize) -> Self {
        Self {
            query: String::new(),
            results: Vec::new(),
            selected: 0,
            debounce,
            limit: limit.max(1),
            due: None,
            seq: 0,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn push_char(&mut self, c: char, now: Instant) {
        let mut q = std::mem::take(&mut self.query);
        q.push(c);
        self.set_query(q, now);
    }

    pub fn backspace(&mut self, now: Instant) {
        let mut q = std::mem::take(&mut self.query);
        q.pop();
        self.set_query(q, now);
    }

    /// Replace the query.  Any request already in flight becomes stale.
    pub fn set_query(&mut self, query: String, now: Instant) {
        self.query = query;
        self.seq += 1;
        if self.query.chars().count() < MIN_QUERY_CHARS {
            self.results.clear();
            self.selected = 0;
            self.due = None;
        } else {
            self.due = Some(now + self.debounce);
        }
    }

    /// Return the pending request once its debounce window has passed.
    pub fn poll(&mut self, now: Instant) -> Option<SearchRequest> {
        let due = self.due?;
        if now < due {
            return None;
        }
        self.due = None;
        tracing::debug!(seq = self.seq, query = %self.query, "search due");
        Some(SearchRequest {
            seq: self.seq,
            query: self.query.clone(),
            limit: self.limit,
        })
    }

    /// Apply a response.  Returns `false` if it was stale and ignored.
    pub fn apply(&mut self, seq: u64, result: Result<Vec<Movie>, ApiError>) -> bool {
        if seq != self.seq {
            tracing::debug!(seq, latest = self.seq, "dropping stale search response");
            return false;
        }
        self.results = match result {
            Ok(movies) => movies,
            Err(e) => {
                tracing::warn!(query = %self.query, error = %e, "search failed");
                Vec::new()
            }
        };
        self.selected = 0;
        true
    }

    pub fn select_next(&mut self) {
        if !self.results.is_empty() {
            self.selected = (self.selected + 1).min(self.results.len() - 1);
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Take the highlighted result and reset the box.
    pub fn take_selected(&mut self) -> Option<Movie> {
        if self.results.is_empty() {
            return None;
        }
        let i = self.selected.min(self.results.len() - 1);
        let movie = self.results.swap_remove(i);
        self.clear();
        Some(movie)
    }

    /// Empty query and results; in-flight responses become stale.
    pub fn clear(&mut self) {
        self.query.clear();
        self.results.clear();
        self.selected = 0;
        self.due = None;
        self.seq += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::tests::movie;

    fn search_box() -> SearchBox {
        SearchBox::new(Duration::ZERO, 10)
    }

    fn ab_movie() -> Movie {
        Movie {
            id: Some(serde_json::json!(1)),
            title: Some("Ab Movie".into()),
            ..Default::default()
        }
    }

    #[test]
    fn single_character_issues_no_request() {
        let now = Instant::now();
        let mut sb = search_box();
        sb.set_query("a".into(), now);

        assert!(sb.poll(now).is_none());
        assert!(sb.poll(now + Duration::from_secs(10)).is_none());
        assert!(sb.results.is_empty());
    }

    #[test]
    fn two_characters_issue_exactly_one_request() {
        let now = Instant::now();
        let mut sb = search_box();
        sb.set_query("ab".into(), now);

        let req = sb.poll(now).expect("request due");
        assert_eq!(req.query, "ab");
        assert!(sb.poll(now).is_none());

        assert!(sb.apply(req.seq, Ok(vec![ab_movie()])));
        assert_eq!(sb.results.len(), 1);
        assert_eq!(sb.results[0].display_title(), "Ab Movie");
    }

    #[test]
    fn multibyte_characters_count_once() {
        let now = Instant::now();
        let mut sb = search_box();
        sb.set_query("é".into(), now);
        assert!(sb.poll(now).is_none());
    }

    #[test]
    fn debounce_collapses_fast_typing() {
        let start = Instant::now();
        let mut sb = SearchBox::new(Duration::from_millis(250), 10);

        sb.push_char('s', start);
        sb.push_char('t', start + Duration::from_millis(100));
        assert!(sb.poll(start + Duration::from_millis(200)).is_none());
        sb.push_char('a', start + Duration::from_millis(300));
        assert!(sb.poll(start + Duration::from_millis(500)).is_none());

        let req = sb.poll(start + Duration::from_millis(550)).unwrap();
        assert_eq!(req.query, "sta");
        assert!(sb.poll(start + Duration::from_secs(5)).is_none());
    }

    #[test]
    fn stale_response_never_overwrites_newer_query() {
        let now = Instant::now();
        let mut sb = search_box();

        sb.set_query("st".into(), now);
        let slow = sb.poll(now).unwrap();
        sb.set_query("star".into(), now);
        let fast = sb.poll(now).unwrap();

        assert!(sb.apply(fast.seq, Ok(vec![movie("star-wars")])));
        assert!(!sb.apply(slow.seq, Ok(vec![movie("stalker")])));
        assert_eq!(sb.results[0].key().as_deref(), Some("star-wars"));
    }

    #[test]
    fn shortening_the_query_clears_results_and_invalidates_requests() {
        let now = Instant::now();
        let mut sb = search_box();
        sb.set_query("ab".into(), now);
        let req = sb.poll(now).unwrap();
        sb.apply(req.seq, Ok(vec![ab_movie()]));

        sb.backspace(now);
        assert_eq!(sb.query(), "a");
        assert!(sb.results.is_empty());
        assert!(!sb.apply(req.seq, Ok(vec![ab_movie()])));
    }

    #[test]
    fn failed_search_clears_results() {
        let now = Instant::now();
        let mut sb = search_box();
        sb.set_query("ab".into(), now);
        let first = sb.poll(now).unwrap();
        sb.apply(first.seq, Ok(vec![ab_movie()]));

        sb.set_query("abc".into(), now);
        let second = sb.poll(now).unwrap();
        let err = ApiError::Status {
            status: 500,
            body: "down".into(),
        };
        assert!(sb.apply(second.seq, Err(err)));
        assert!(sb.results.is_empty());
    }

    #[test]
    fn taking_a_result_resets_the_box() {
        let now = Instant::now();
        let mut sb = search_box();
        sb.set_query("mo".into(), now);
        let req = sb.poll(now).unwrap();
        sb.apply(req.seq, Ok(vec![movie("a"), movie("b")]));

        sb.select_next();
        sb.select_next();
        let picked = sb.take_selected().unwrap();
        assert_eq!(picked.key().as_deref(), Some("b"));
        assert_eq!(sb.query(), "");
        assert!(sb.results.is_empty());
        assert!(sb.take_selected().is_none());
    }
}
