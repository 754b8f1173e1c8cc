//! Page sources backed by the metadata API.
//!
//! Each struct binds an [`ApiClient`] to one endpoint and whatever fixed
//! arguments that endpoint needs, leaving only `(offset, limit)` open.

use std::sync::Arc;

use async_trait::async_trait;

use super::{Movie, PageSource};
use crate::api::{ApiClient, ApiError};
use crate::reco::Preferences;

/// The global trending list.
pub struct TrendingSource {
    api: Arc<ApiClient>,
}

impl TrendingSource {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl PageSource for TrendingSource {
    fn name(&self) -> &str {
        "trending"
    }

    async fn fetch_page(&self, offset: usize, limit: usize) -> Result<Vec<Movie>, ApiError> {
        self.api.trending(offset, limit).await
    }
}

/// Movies of one genre.
pub struct GenreSource {
    api: Arc<ApiClient>,
    genre: String,
}

impl GenreSource {
    pub fn new(api: Arc<ApiClient>, genre: impl Into<String>) -> Self {
        Self {
            api,
            genre: genre.into(),
        }
    }
}

#[async_trait]
impl PageSource for GenreSource {
    fn name(&self) -> &str {
        &self.genre
    }

    async fn fetch_page(&self, offset: usize, limit: usize) -> Result<Vec<Movie>, ApiError> {
        self.api.genre(&self.genre, offset, limit).await
    }
}

/// Recommendations for a submitted preference form.
pub struct PersonalSource {
    api: Arc<ApiClient>,
    prefs: Preferences,
}

impl PersonalSource {
    pub fn new(api: Arc<ApiClient>, prefs: Preferences) -> Self {
        Self { api, prefs }
    }
}

#[async_trait]
impl PageSource for PersonalSource {
    fn name(&self) -> &str {
        "personal"
    }

    async fn fetch_page(&self, offset: usize, limit: usize) -> Result<Vec<Movie>, ApiError> {
        self.api
            .personal_recommendations(&self.prefs, offset, limit)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn genre_source_pages_through_its_genre() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/genre/Comedy"))
            .and(query_param("offset", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "imdb_id": "tt3" }])))
            .mount(&server)
            .await;

        let api = Arc::new(ApiClient::new(&server.uri(), Duration::from_secs(5)).unwrap());
        let source = GenreSource::new(api, "Comedy");
        assert_eq!(source.name(), "Comedy");

        let page = source.fetch_page(10, 10).await.unwrap();
        assert_eq!(page[0].key().as_deref(), Some("tt3"));
    }
}
