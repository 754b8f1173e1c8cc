//! Application state.
//!
//! [`App`] owns everything the UI shows and is only ever touched from the
//! main loop.  Methods that need network work don't perform it; they queue
//! a [`Task`] which the main loop hands to [`crate::dispatch::Dispatcher`].
//! Results come back as [`Msg`]s through [`App::handle`].  Keeping I/O out
//! of here lets the tests drive the whole app synchronously.

use std::ops::Range;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::api::ApiClient;
use crate::config::{Config, ImageConfig};
use crate::detail::Detail;
use crate::dispatch::Msg;
use crate::feed::{Applied, FeedId, FeedLoader, FeedOptions, PageFetch};
use crate::reco::RecoForm;
use crate::search::{SearchBox, SearchRequest};
use crate::showcase::Showcase;
use crate::source::{GenreSource, Movie, PageSource, PersonalSource, TrendingSource};

/// Cards moved by one scroll-arrow press.
pub const CARD_STEP: usize = 4;

/// Rows with more items than this show scroll arrows.
pub const ARROWS_AFTER: usize = 5;

pub const RECO_TITLE: &str = "Recommended For You";

/// Work for the dispatcher.
#[derive(Debug)]
pub enum Task {
    Page(PageFetch),
    /// A row was torn down; abort its fetch if one is running.
    CancelFeed(FeedId),
    TopPicks { limit: usize },
    Search(SearchRequest),
    Details { imdb_id: String, similar_limit: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Browse,
    Search,
    Reco,
}

/// Tunables taken from [`Config`].
#[derive(Debug, Clone)]
pub struct Settings {
    pub page_size: usize,
    pub genres: Vec<String>,
    pub top_picks: usize,
    pub similar_limit: usize,
    pub showcase_interval: Duration,
    pub search_debounce: Duration,
    pub images: ImageConfig,
}

impl From<&Config> for Settings {
    fn from(config: &Config) -> Self {
        Self {
            page_size: config.feeds.page_size,
            genres: config.feeds.genres.clone(),
            top_picks: config.feeds.top_picks,
            similar_limit: config.feeds.similar_limit,
            showcase_interval: config.ui.showcase_interval(),
            search_debounce: config.ui.search_debounce(),
            images: config.images.clone(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

/// A feed plus its horizontal cursor.  The card after the last movie is
/// the "+ More" card.
pub struct Row {
    pub loader: FeedLoader,
    pub cursor: usize,
    first: usize,
}

impl Row {
    fn new(loader: FeedLoader) -> Self {
        Self {
            loader,
            cursor: 0,
            first: 0,
        }
    }

    pub fn card_count(&self) -> usize {
        self.loader.items().len() + 1
    }

    pub fn on_more_card(&self) -> bool {
        self.cursor == self.loader.items().len()
    }

    pub fn shows_arrows(&self) -> bool {
        self.loader.items().len() > ARROWS_AFTER
    }

    pub fn selected_movie(&self) -> Option<&Movie> {
        self.loader.items().get(self.cursor)
    }

    pub fn move_by(&mut self, delta: isize) {
        let last = self.card_count() - 1;
        self.cursor = self.cursor.saturating_add_signed(delta).min(last);
    }

    /// Visible card range for a strip of `capacity` cards, scrolled so the
    /// cursor stays in view.
    pub fn window(&mut self, capacity: usize) -> Range<usize> {
        let capacity = capacity.max(1);
        let count = self.card_count();
        if self.cursor < self.first {
            self.first = self.cursor;
        } else if self.cursor >= self.first + capacity {
            self.first = self.cursor + 1 - capacity;
        }
        self.first = self.first.min(count.saturating_sub(capacity));
        self.first..(self.first + capacity).min(count)
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    pub rows: Vec<Row>,
    /// Index into `rows` of the row with keyboard focus.
    pub focused: usize,
    pub showcase: Showcase,
    pub detail: Detail,
    pub search: SearchBox,
    pub reco: RecoForm,
    pub mode: Mode,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Last status message.
    pub status: String,
    pub settings: Settings,
    api: Arc<ApiClient>,
    tasks: Vec<Task>,
    next_feed: FeedId,
    reco_feed: Option<FeedId>,
}

impl App {
    /// An app with no rows and nothing queued.
    pub fn new(api: Arc<ApiClient>, settings: Settings) -> Self {
        Self {
            rows: Vec::new(),
            focused: 0,
            showcase: Showcase::new(settings.showcase_interval),
            detail: Detail::default(),
            search: SearchBox::new(settings.search_debounce, settings.page_size),
            reco: RecoForm::new(),
            mode: Mode::Browse,
            quit: false,
            status: "Starting…".into(),
            settings,
            api,
            tasks: Vec::new(),
            next_feed: 1,
            reco_feed: None,
        }
    }

    /// The home screen: top picks, "Trending", then one row per genre.
    pub fn bootstrap(api: Arc<ApiClient>, settings: Settings) -> Self {
        let mut app = Self::new(Arc::clone(&api), settings);
        let options = app.feed_options();

        app.add_feed("Trending", Arc::new(TrendingSource::new(Arc::clone(&api))), options);
        for genre in app.settings.genres.clone() {
            let source = Arc::new(GenreSource::new(Arc::clone(&api), genre.clone()));
            app.add_feed(genre, source, options);
        }

        app.tasks.push(Task::TopPicks {
            limit: app.settings.top_picks,
        });
        app
    }

    fn feed_options(&self) -> FeedOptions {
        FeedOptions {
            page_size: self.settings.page_size,
            auto_load: true,
        }
    }

    /// Drain the queued work.
    pub fn take_tasks(&mut self) -> Vec<Task> {
        std::mem::take(&mut self.tasks)
    }

    // -- feeds ---------------------------------------------------------------

    pub fn add_feed(
        &mut self,
        title: impl Into<String>,
        source: Arc<dyn PageSource>,
        options: FeedOptions,
    ) -> FeedId {
        let at = self.rows.len();
        self.insert_feed(at, title, source, options)
    }

    fn insert_feed(
        &mut self,
        at: usize,
        title: impl Into<String>,
        source: Arc<dyn PageSource>,
        options: FeedOptions,
    ) -> FeedId {
        let id = self.next_feed;
        self.next_feed += 1;

        let (loader, first) = FeedLoader::create(id, title, source, options);
        tracing::debug!(feed = id, title = loader.title(), "feed created");
        self.tasks.extend(first.map(Task::Page));
        self.rows.insert(at.min(self.rows.len()), Row::new(loader));
        id
    }

    pub fn remove_feed(&mut self, id: FeedId) {
        let Some(pos) = self.rows.iter().position(|r| r.loader.id() == id) else {
            return;
        };
        let row = self.rows.remove(pos);
        tracing::debug!(feed = id, title = row.loader.title(), "feed removed");
        self.tasks.push(Task::CancelFeed(id));

        if pos < self.focused {
            self.focused -= 1;
        }
        self.focused = self.focused.min(self.rows.len().saturating_sub(1));
    }

    #[cfg(test)]
    pub fn row(&self, id: FeedId) -> Option<&Row> {
        self.rows.iter().find(|r| r.loader.id() == id)
    }

    pub fn reco_feed(&self) -> Option<FeedId> {
        self.reco_feed
    }

    fn clear_reco_row(&mut self) {
        if let Some(id) = self.reco_feed.take() {
            self.remove_feed(id);
        }
    }

    // -- async results -------------------------------------------------------

    pub fn handle(&mut self, msg: Msg, now: Instant) {
        match msg {
            Msg::Page(done) => {
                let feed = done.feed;
                let Some(row) = self.rows.iter_mut().find(|r| r.loader.id() == feed) else {
                    tracing::debug!(feed, "page for removed feed dropped");
                    return;
                };
                if let Applied::Appended(n) = row.loader.finish_load(done) {
                    self.status = format!("{}: +{n} titles", row.loader.title());
                }
            }
            Msg::TopPicks(result) => {
                let picks = match result {
                    Ok(movies) => movies,
                    Err(e) => {
                        tracing::warn!(error = %e, "top picks failed");
                        Vec::new()
                    }
                };
                let first = picks.first().cloned();
                self.showcase.set_items(picks, now);
                if self.detail.movie().is_none() {
                    if let Some(movie) = first {
                        self.show_detail(movie);
                    }
                }
            }
            Msg::Search { seq, result } => {
                self.search.apply(seq, result);
            }
            Msg::Credits { imdb_id, result } => self.detail.apply_credits(&imdb_id, result),
            Msg::Similar { imdb_id, result } => self.detail.apply_similar(&imdb_id, result),
        }
    }

    /// Advance time-driven state: the showcase and debounced search.
    pub fn tick(&mut self, now: Instant) {
        self.showcase.tick(now);
        if let Some(request) = self.search.poll(now) {
            self.tasks.push(Task::Search(request));
        }
    }

    // -- selection -----------------------------------------------------------

    /// User picked a movie.  Personal recommendations are dismissed.
    pub fn select_movie(&mut self, movie: Movie) {
        self.clear_reco_row();
        self.show_detail(movie);
        self.mode = Mode::Browse;
    }

    fn show_detail(&mut self, movie: Movie) {
        self.status = movie.display_title().to_string();
        if let Some(request) = self.detail.select(movie) {
            self.tasks.push(Task::Details {
                imdb_id: request.imdb_id,
                similar_limit: self.settings.similar_limit,
            });
        }
    }

    pub fn view_showcase(&mut self) {
        if let Some(movie) = self.showcase.current().cloned() {
            self.select_movie(movie);
        }
    }

    // -- row navigation ------------------------------------------------------

    pub fn focused_row(&self) -> Option<&Row> {
        self.rows.get(self.focused)
    }

    pub fn focus_next_row(&mut self) {
        if !self.rows.is_empty() {
            self.focused = (self.focused + 1).min(self.rows.len() - 1);
        }
    }

    pub fn focus_previous_row(&mut self) {
        self.focused = self.focused.saturating_sub(1);
    }

    pub fn move_card(&mut self, delta: isize) {
        if let Some(row) = self.rows.get_mut(self.focused) {
            row.move_by(delta);
        }
    }

    /// Scroll-arrow equivalent; only available once arrows are shown.
    pub fn scroll_row(&mut self, dir: isize) {
        if let Some(row) = self.rows.get_mut(self.focused) {
            if row.shows_arrows() {
                row.move_by(dir * CARD_STEP as isize);
            }
        }
    }

    pub fn load_more(&mut self) {
        if let Some(row) = self.rows.get_mut(self.focused) {
            if let Some(fetch) = row.loader.begin_load() {
                self.tasks.push(Task::Page(fetch));
            }
        }
    }

    /// Enter on a card: open the movie, or load more on the "+ More" card.
    pub fn activate_card(&mut self) {
        let Some(row) = self.focused_row() else {
            return;
        };
        if row.on_more_card() {
            self.load_more();
        } else if let Some(movie) = row.selected_movie().cloned() {
            self.select_movie(movie);
        }
    }

    // -- search --------------------------------------------------------------

    pub fn open_search(&mut self) {
        self.mode = Mode::Search;
    }

    pub fn leave_search(&mut self) {
        self.search.clear();
        self.mode = Mode::Browse;
    }

    pub fn choose_search_result(&mut self) {
        if let Some(movie) = self.search.take_selected() {
            self.select_movie(movie);
        }
    }

    // -- recommendations -----------------------------------------------------

    pub fn open_reco(&mut self) {
        self.clear_reco_row();
        self.reco.open();
        self.mode = Mode::Reco;
    }

    pub fn close_reco(&mut self) {
        self.reco.close();
        self.mode = Mode::Browse;
    }

    /// Mount a recommendations row for the entered preferences at the top.
    pub fn submit_reco(&mut self) {
        let prefs = self.reco.submit();
        self.mode = Mode::Browse;
        self.clear_reco_row();

        tracing::info!(?prefs, "requesting personal recommendations");
        let source = Arc::new(PersonalSource::new(Arc::clone(&self.api), prefs));
        let options = self.feed_options();
        let id = self.insert_feed(0, RECO_TITLE, source, options);
        self.reco_feed = Some(id);
        self.focused = 0;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
