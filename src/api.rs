//! HTTP client for the remote movie-metadata API.
//!
//! Every endpoint returns JSON.  Paged endpoints take `offset` and `limit`
//! query parameters and answer with a list of movie objects; the body is
//! decoded once here (see [`decode_page`]) so callers only ever see
//! `Vec<Movie>`.
//!
//! ## For contributors
//!
//! Add a new endpoint by building its URL with [`ApiClient::endpoint`] and
//! passing it to [`ApiClient::get_json`] or [`ApiClient::post_json`].  Path
//! segments are percent-escaped by `endpoint`, so pass raw values.

use std::time::Duration;

use reqwest::Url;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::reco::Preferences;
use crate::source::{Credits, Movie};

/// Failure of a single API call.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid API base URL {0:?}")]
    InvalidBaseUrl(String),

    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx answer.  `body` is the response text as sent by the server.
    #[error("API {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed JSON response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

/// Thin wrapper around a shared [`reqwest::Client`] bound to one base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, ApiError> {
        let base = Url::parse(base_url)
            .map_err(|_| ApiError::InvalidBaseUrl(base_url.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;

        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    // -- endpoints -----------------------------------------------------------

    pub async fn trending(&self, offset: usize, limit: usize) -> Result<Vec<Movie>, ApiError> {
        let url = self.endpoint(&["trending"], &page_query(offset, limit));
        self.get_json(url).await.map(decode_page)
    }

    pub async fn genre(
        &self,
        genre: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Movie>, ApiError> {
        let url = self.endpoint(&["genre", genre], &page_query(offset, limit));
        self.get_json(url).await.map(decode_page)
    }

    pub async fn search(
        &self,
        query: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Movie>, ApiError> {
        let mut params = vec![("q", query.to_string())];
        params.extend(page_query(offset, limit));
        let url = self.endpoint(&["search"], &params);
        self.get_json(url).await.map(decode_page)
    }

    pub async fn similar(
        &self,
        imdb_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Movie>, ApiError> {
        let url = self.endpoint(&["movies", imdb_id, "similar"], &page_query(offset, limit));
        self.get_json(url).await.map(decode_page)
    }

    pub async fn credits(&self, imdb_id: &str) -> Result<Credits, ApiError> {
        let url = self.endpoint(&["movies", imdb_id, "credits"], &[]);
        self.get_json(url).await.map(|v| Credits::from_json(&v))
    }

    pub async fn personal_recommendations(
        &self,
        prefs: &Preferences,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Movie>, ApiError> {
        let url = self.endpoint(&["personal-recommend"], &page_query(offset, limit));
        self.post_json(url, prefs).await.map(decode_page)
    }

    // -- plumbing ------------------------------------------------------------

    /// Join escaped path `segments` and `query` pairs onto the base URL.
    pub fn endpoint(&self, segments: &[&str], query: &[(&str, String)]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        url
    }

    pub async fn get_json(&self, url: Url) -> Result<Value, ApiError> {
        tracing::debug!(%url, "GET");
        let response = self.http.get(url).send().await?;
        read_json(response).await
    }

    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<Value, ApiError> {
        tracing::debug!(%url, "POST");
        let response = self.http.post(url).json(body).send().await?;
        read_json(response).await
    }
}

fn page_query(offset: usize, limit: usize) -> Vec<(&'static str, String)> {
    vec![("offset", offset.to_string()), ("limit", limit.to_string())]
}

async fn read_json(response: reqwest::Response) -> Result<Value, ApiError> {
    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            body: text,
        });
    }
    Ok(serde_json::from_str(&text)?)
}

/// Decode a paged response body.
///
/// Anything other than a JSON list is an empty page.  List entries that do
/// not decode as a [`Movie`] are dropped.
pub fn decode_page(body: Value) -> Vec<Movie> {
    let Value::Array(entries) = body else {
        tracing::debug!("page body is not a list; treating as empty");
        return Vec::new();
    };

    entries
        .into_iter()
        .filter_map(|entry| {
            if !entry.is_object() {
                tracing::warn!(%entry, "skipping non-object page entry");
                return None;
            }
            match serde_json::from_value::<Movie>(entry) {
                Ok(movie) => Some(movie),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping undecodable page entry");
                    None
                }
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> ApiClient {
        ApiClient::new(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn rejects_unusable_base_url() {
        assert!(matches!(
            ApiClient::new("not a url", Duration::from_secs(1)),
            Err(ApiError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            ApiClient::new("mailto:someone@example.com", Duration::from_secs(1)),
            Err(ApiError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn endpoint_escapes_segments_and_keeps_base_path() {
        let api = ApiClient::new("https://api.example.com/v1/", Duration::from_secs(1)).unwrap();
        let url = api.endpoint(&["genre", "Sci Fi/Fantasy"], &page_query(20, 10));
        assert_eq!(
            url.as_str(),
            "https://api.example.com/v1/genre/Sci%20Fi%2FFantasy?offset=20&limit=10"
        );
    }

    #[test]
    fn decode_page_coerces_non_lists_to_empty() {
        assert!(decode_page(json!({ "detail": "oops" })).is_empty());
        assert!(decode_page(Value::Null).is_empty());

        let movies = decode_page(json!([{ "imdb_id": "tt1" }, 7, "x", { "imdb_id": "tt2" }]));
        let keys: Vec<_> = movies.iter().filter_map(Movie::key).collect();
        assert_eq!(keys, vec!["tt1", "tt2"]);
    }

    #[test]
    fn decode_page_keeps_movies_with_string_numbers() {
        let movies = decode_page(json!([
            { "imdb_id": "tt1", "title": "X", "year": "" },
            { "imdb_id": "tt2", "vote_count": "1200" },
        ]));
        let keys: Vec<_> = movies.iter().filter_map(Movie::key).collect();
        assert_eq!(keys, vec!["tt1", "tt2"]);
        assert_eq!(movies[1].vote_count, Some(1200.0));
    }

    #[tokio::test]
    async fn trending_sends_paging_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/trending"))
            .and(query_param("offset", "10"))
            .and(query_param("limit", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "imdb_id": "tt1", "title": "One" },
                { "imdb_id": "tt2", "title": "Two" },
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let movies = client(&server).trending(10, 10).await.unwrap();
        assert_eq!(movies.len(), 2);
        assert_eq!(movies[1].display_title(), "Two");
    }

    #[tokio::test]
    async fn search_encodes_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "star wars"))
            .and(query_param("offset", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 1, "title": "Star Wars" }])))
            .mount(&server)
            .await;

        let movies = client(&server).search("star wars", 0, 10).await.unwrap();
        assert_eq!(movies[0].key().as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn non_success_status_carries_body_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/genre/Drama"))
            .respond_with(ResponseTemplate::new(503).set_body_string("warming up"))
            .mount(&server)
            .await;

        let err = client(&server).genre("Drama", 0, 10).await.unwrap_err();
        match &err {
            ApiError::Status { status, body } => {
                assert_eq!(*status, 503);
                assert_eq!(body, "warming up");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.to_string(), "API 503: warming up");
    }

    #[tokio::test]
    async fn invalid_json_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/trending"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client(&server).trending(0, 6).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn credits_and_similar_use_escaped_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/movies/tt0816692/credits"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "cast": [{ "name": "Jessica Chastain" }],
                "crew": [],
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/movies/tt0816692/similar"))
            .and(query_param("limit", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "imdb_id": "tt1375666" }])))
            .mount(&server)
            .await;

        let api = client(&server);
        let credits = api.credits("tt0816692").await.unwrap();
        assert_eq!(credits.cast[0].name, "Jessica Chastain");

        let similar = api.similar("tt0816692", 0, 5).await.unwrap();
        assert_eq!(similar[0].key().as_deref(), Some("tt1375666"));
    }

    #[tokio::test]
    async fn personal_recommendations_post_preferences() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/personal-recommend"))
            .and(query_param("offset", "0"))
            .and(query_param("limit", "10"))
            .and(body_json(json!({
                "movie": "Dune",
                "genres": ["Sci-Fi"],
                "rating": 7.5,
                "mood": "Dark",
                "yearFrom": 2010,
                "yearTo": 2024,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "imdb_id": "tt15239678" }])))
            .expect(1)
            .mount(&server)
            .await;

        let prefs = Preferences {
            movie: "Dune".into(),
            genres: vec!["Sci-Fi".into()],
            rating: 7.5,
            mood: "Dark".into(),
            year_from: 2010,
            year_to: 2024,
        };
        let movies = client(&server)
            .personal_recommendations(&prefs, 0, 10)
            .await
            .unwrap();
        assert_eq!(movies.len(), 1);
    }
}
