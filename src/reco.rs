//! Personal recommendation form.
//!
//! The modal only collects preferences; the ranking itself happens on the
//! server.  Numeric inputs are clamped as they change so
//! [`RecoForm::submit`] always yields a consistent [`Preferences`].

use chrono::Datelike;
use serde::Serialize;

pub const GENRES: [&str; 8] = [
    "Action",
    "Drama",
    "Comedy",
    "Horror",
    "Romance",
    "Sci-Fi",
    "Thriller",
    "Adventure",
];

pub const MOODS: [&str; 4] = ["Fast", "Emotional", "Dark", "Light"];

pub const MIN_YEAR: i32 = 1950;
pub const DEFAULT_YEAR_FROM: i32 = 2000;
pub const MIN_RATING: f64 = 5.0;
pub const MAX_RATING: f64 = 9.0;
pub const RATING_STEP: f64 = 0.5;
pub const DEFAULT_RATING: f64 = 7.0;

/// Body of the personal-recommendation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// Recently watched or favourite title, free text.
    pub movie: String,
    pub genres: Vec<String>,
    /// Minimum rating.
    pub rating: f64,
    /// One of [`MOODS`], or empty for no preference.
    pub mood: String,
    pub year_from: i32,
    pub year_to: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Movie,
    Genres,
    YearFrom,
    YearTo,
    Rating,
    Mood,
}

impl Field {
    const ORDER: [Field; 6] = [
        Field::Movie,
        Field::Genres,
        Field::YearFrom,
        Field::YearTo,
        Field::Rating,
        Field::Mood,
    ];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Movie => "Recently watched / favorite movie",
            Field::Genres => "Preferred genres",
            Field::YearFrom => "Release year from",
            Field::YearTo => "Release year to",
            Field::Rating => "Minimum IMDb rating",
            Field::Mood => "Mood",
        }
    }
}

/// Modal state.
#[derive(Debug, Clone)]
pub struct RecoForm {
    pub open: bool,
    pub field: Field,
    /// Highlighted chip within the genre or mood list.
    pub genre_cursor: usize,
    pub mood_cursor: usize,
    movie: String,
    genres: Vec<String>,
    rating: f64,
    mood: String,
    year_from: i32,
    year_to: i32,
    current_year: i32,
}

impl RecoForm {
    pub fn new() -> Self {
        Self::with_current_year(chrono::Local::now().year())
    }

    pub fn with_current_year(current_year: i32) -> Self {
        let current_year = current_year.max(MIN_YEAR);
        Self {
            open: false,
            field: Field::Movie,
            genre_cursor: 0,
            mood_cursor: 0,
            movie: String::new(),
            genres: Vec::new(),
            rating: DEFAULT_RATING,
            mood: String::new(),
            year_from: DEFAULT_YEAR_FROM.min(current_year),
            year_to: current_year,
            current_year,
        }
    }

    pub fn open(&mut self) {
        self.open = true;
        self.field = Field::Movie;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    // -- accessors -----------------------------------------------------------

    pub fn movie(&self) -> &str {
        &self.movie
    }

    pub fn is_genre_selected(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g == genre)
    }

    pub fn rating(&self) -> f64 {
        self.rating
    }

    pub fn mood(&self) -> &str {
        &self.mood
    }

    pub fn years(&self) -> (i32, i32) {
        (self.year_from, self.year_to)
    }

    // -- field navigation ----------------------------------------------------

    pub fn next_field(&mut self) {
        let i = (self.field.position() + 1) % Field::ORDER.len();
        self.field = Field::ORDER[i];
    }

    pub fn prev_field(&mut self) {
        let len = Field::ORDER.len();
        let i = (self.field.position() + len - 1) % len;
        self.field = Field::ORDER[i];
    }

    // -- editing -------------------------------------------------------------

    pub fn type_char(&mut self, c: char) {
        if self.field == Field::Movie {
            self.movie.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if self.field == Field::Movie {
            self.movie.pop();
        }
    }

    /// Right arrow: raise a number or move the chip cursor right.
    pub fn increase(&mut self) {
        self.step(1);
    }

    /// Left arrow: lower a number or move the chip cursor left.
    pub fn decrease(&mut self) {
        self.step(-1);
    }

    fn step(&mut self, dir: i32) {
        match self.field {
            Field::Movie => {}
            Field::Genres => self.genre_cursor = wrap(self.genre_cursor, dir, GENRES.len()),
            Field::Mood => self.mood_cursor = wrap(self.mood_cursor, dir, MOODS.len()),
            Field::YearFrom => self.set_year_from(self.year_from + dir),
            Field::YearTo => self.set_year_to(self.year_to + dir),
            Field::Rating => self.set_rating(self.rating + f64::from(dir) * RATING_STEP),
        }
    }

    /// Space: toggle the highlighted genre or pick the highlighted mood.
    pub fn activate(&mut self) {
        match self.field {
            Field::Genres => self.toggle_genre(GENRES[self.genre_cursor]),
            Field::Mood => self.select_mood(MOODS[self.mood_cursor]),
            Field::Movie => self.movie.push(' '),
            _ => {}
        }
    }

    pub fn toggle_genre(&mut self, genre: &str) {
        if let Some(pos) = self.genres.iter().position(|g| g == genre) {
            self.genres.remove(pos);
        } else {
            self.genres.push(genre.to_string());
        }
    }

    pub fn select_mood(&mut self, mood: &str) {
        self.mood = mood.to_string();
    }

    /// Clamp to `[MIN_YEAR, year_to]`.
    pub fn set_year_from(&mut self, year: i32) {
        self.year_from = year.clamp(MIN_YEAR, self.year_to);
    }

    /// Clamp to `[year_from, current_year]`.
    pub fn set_year_to(&mut self, year: i32) {
        self.year_to = year.clamp(self.year_from, self.current_year);
    }

    /// Clamp to `[MIN_RATING, MAX_RATING]`, snapped to the step.
    pub fn set_rating(&mut self, rating: f64) {
        let snapped = (rating / RATING_STEP).round() * RATING_STEP;
        self.rating = snapped.clamp(MIN_RATING, MAX_RATING);
    }

    /// Close the form and return what was entered.  The entries are kept
    /// for the next time it opens.
    pub fn submit(&mut self) -> Preferences {
        self.open = false;
        Preferences {
            movie: self.movie.clone(),
            genres: self.genres.clone(),
            rating: self.rating,
            mood: self.mood.clone(),
            year_from: self.year_from,
            year_to: self.year_to,
        }
    }
}

impl Default for RecoForm {
    fn default() -> Self {
        Self::new()
    }
}

fn wrap(i: usize, dir: i32, len: usize) -> usize {
    if dir >= 0 {
        (i + 1) % len
    } else {
        (i + len - 1) % len
    }
}
