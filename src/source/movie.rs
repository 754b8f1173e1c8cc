//! The record type shared by every feed, the search box and the detail pane.
//!
//! `Movie` mirrors the JSON objects the metadata API returns.  Loaders treat
//! it as opaque apart from [`Movie::key`]; only the display layer reads the
//! other fields.
//!
//! ## For contributors
//!
//! The API is loose about shapes: numbers may arrive as floats or as
//! strings, empty strings stand in for `null` in any column, and `genres`
//! is sometimes a list and sometimes a comma-separated string.  Normalise
//! such quirks here, in the `Deserialize` impl, so nothing downstream has
//! to re-check them.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One title as returned by the metadata API.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Movie {
    /// External catalog identifier, the preferred stable key.
    #[serde(default, deserialize_with = "non_empty_string")]
    pub imdb_id: Option<String>,

    /// Internal row id.  Search results sometimes carry only this.
    #[serde(default)]
    pub id: Option<Value>,

    #[serde(default, deserialize_with = "non_empty_string")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "non_empty_string")]
    pub overview: Option<String>,

    /// Relative image path, joined with an image prefix from the config.
    #[serde(default, deserialize_with = "non_empty_string")]
    pub poster_path: Option<String>,

    #[serde(default, deserialize_with = "non_empty_string")]
    pub backdrop_path: Option<String>,

    #[serde(default, deserialize_with = "lenient_number")]
    pub vote_average: Option<f64>,

    #[serde(default, deserialize_with = "lenient_number")]
    pub vote_count: Option<f64>,

    #[serde(default, deserialize_with = "lenient_number")]
    pub popularity: Option<f64>,

    #[serde(default, deserialize_with = "lenient_number")]
    pub year: Option<f64>,

    /// Genre names in API order.
    #[serde(default, deserialize_with = "genre_list")]
    pub genres: Vec<String>,
}

/// Maximum number of genre chips shown for one movie.
pub const MAX_DISPLAY_GENRES: usize = 4;

impl Movie {
    /// Stable key used to identify this movie across pages and views.
    ///
    /// Prefers `imdb_id`; falls back to the textual form of `id`.
    pub fn key(&self) -> Option<String> {
        if let Some(imdb) = &self.imdb_id {
            return Some(imdb.clone());
        }
        match &self.id {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Null) | None => None,
            Some(Value::String(_)) => None,
            Some(other) => Some(other.to_string()),
        }
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("(untitled)")
    }

    pub fn display_overview(&self) -> &str {
        self.overview
            .as_deref()
            .unwrap_or("No description available.")
    }

    pub fn display_genres(&self) -> &[String] {
        let n = self.genres.len().min(MAX_DISPLAY_GENRES);
        &self.genres[..n]
    }

    /// Poster URL under `prefix`, if the movie has a poster.
    pub fn poster_url(&self, prefix: &str) -> Option<String> {
        self.poster_path.as_ref().map(|p| format!("{prefix}{p}"))
    }

    /// Banner image: the backdrop when present, otherwise the poster.
    pub fn banner_url(&self, backdrop_prefix: &str, poster_prefix: &str) -> Option<String> {
        self.backdrop_path
            .as_ref()
            .map(|p| format!("{backdrop_prefix}{p}"))
            .or_else(|| self.poster_url(poster_prefix))
    }
}

// ---------------------------------------------------------------------------
// Credits
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct CastMember {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct CrewMember {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub job: String,
}

/// Cast and crew for one movie.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Credits {
    pub cast: Vec<CastMember>,
    pub crew: Vec<CrewMember>,
}

impl Credits {
    /// Decode a credits body, treating any non-list section as empty.
    pub fn from_json(value: &Value) -> Self {
        fn list<T: for<'de> Deserialize<'de>>(value: Option<&Value>) -> Vec<T> {
            match value {
                Some(Value::Array(entries)) => entries
                    .iter()
                    .filter_map(|e| serde_json::from_value(e.clone()).ok())
                    .collect(),
                _ => Vec::new(),
            }
        }

        Self {
            cast: list(value.get("cast")),
            crew: list(value.get("crew")),
        }
    }
}

// ---------------------------------------------------------------------------
// Field decoders
// ---------------------------------------------------------------------------

fn non_empty_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Numbers, numeric strings, or `None` for anything else (including `""`).
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    })
}

/// Accepts `["A", "B"]`, `"A, B"` or anything else (which yields no genres).
fn genre_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(entries)) => entries
            .into_iter()
            .filter_map(|e| match e {
                Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                _ => None,
            })
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: Value) -> Movie {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn decodes_full_record_and_ignores_unknown_fields() {
        let movie = decode(json!({
            "imdb_id": "tt0816692",
            "title": "Interstellar",
            "overview": "A team travels through a wormhole.",
            "poster_path": "/poster.jpg",
            "backdrop_path": "/backdrop.jpg",
            "vote_average": 8.4,
            "vote_count": 32000,
            "popularity": 140.7,
            "year": 2014.0,
            "genres": ["Adventure", "Drama", "Science Fiction"],
            "directors": "Christopher Nolan",
        }));

        assert_eq!(movie.key().as_deref(), Some("tt0816692"));
        assert_eq!(movie.display_title(), "Interstellar");
        assert_eq!(movie.vote_count, Some(32000.0));
        assert_eq!(movie.genres.len(), 3);
    }

    #[test]
    fn numeric_fields_tolerate_strings() {
        let blank = decode(json!({ "imdb_id": "tt1", "title": "X", "year": "" }));
        assert_eq!(blank.key().as_deref(), Some("tt1"));
        assert!(blank.year.is_none());

        let quoted = decode(json!({ "imdb_id": "tt2", "vote_count": "1200", "popularity": " 7.5 " }));
        assert_eq!(quoted.vote_count, Some(1200.0));
        assert_eq!(quoted.popularity, Some(7.5));

        let odd = decode(json!({ "vote_average": "n/a", "year": [2014], "popularity": null }));
        assert!(odd.vote_average.is_none());
        assert!(odd.year.is_none());
        assert!(odd.popularity.is_none());
    }

    #[test]
    fn genres_accept_comma_separated_string() {
        let movie = decode(json!({ "genres": "Action, Crime ,Drama,,Thriller, War" }));
        assert_eq!(movie.genres, vec!["Action", "Crime", "Drama", "Thriller", "War"]);
        assert_eq!(movie.display_genres(), &movie.genres[..4]);
    }

    #[test]
    fn genres_of_unexpected_shape_are_empty() {
        assert!(decode(json!({ "genres": 12 })).genres.is_empty());
        assert!(decode(json!({ "genres": null })).genres.is_empty());
        assert!(decode(json!({})).genres.is_empty());
    }

    #[test]
    fn empty_strings_count_as_missing() {
        let movie = decode(json!({ "title": "", "overview": " ", "poster_path": "" }));
        assert_eq!(movie.display_title(), "(untitled)");
        assert_eq!(movie.display_overview(), "No description available.");
        assert!(movie.poster_url("https://img/w500").is_none());
    }

    #[test]
    fn key_falls_back_to_numeric_id() {
        let movie = decode(json!({ "id": 1, "title": "Ab Movie" }));
        assert_eq!(movie.key().as_deref(), Some("1"));

        let movie = decode(json!({ "id": "m-7" }));
        assert_eq!(movie.key().as_deref(), Some("m-7"));

        assert!(decode(json!({ "title": "Keyless" })).key().is_none());
    }

    #[test]
    fn banner_prefers_backdrop_then_poster() {
        let both = decode(json!({ "poster_path": "/p.jpg", "backdrop_path": "/b.jpg" }));
        assert_eq!(
            both.banner_url("https://img/original", "https://img/w500").as_deref(),
            Some("https://img/original/b.jpg")
        );

        let poster_only = decode(json!({ "poster_path": "/p.jpg" }));
        assert_eq!(
            poster_only.banner_url("https://img/original", "https://img/w500").as_deref(),
            Some("https://img/w500/p.jpg")
        );

        assert!(Movie::default().banner_url("a", "b").is_none());
    }

    #[test]
    fn credits_tolerate_missing_or_odd_sections() {
        let credits = Credits::from_json(&json!({
            "cast": [{ "name": "Matthew McConaughey" }, { "name": "Anne Hathaway" }],
            "crew": [{ "name": "Christopher Nolan", "job": "Director" }],
        }));
        assert_eq!(credits.cast.len(), 2);
        assert_eq!(credits.crew[0].job, "Director");

        let odd = Credits::from_json(&json!({ "cast": "nobody" }));
        assert!(odd.cast.is_empty());
        assert!(odd.crew.is_empty());

        assert_eq!(Credits::from_json(&json!([])), Credits::default());
    }
}
