//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).  Nothing in this module mutates
//! app state except the per-row scroll windows, which depend on the
//! terminal width.
//!
//! ## For contributors
//!
//! * Top to bottom: navbar with the search box, the "Top Picks" banner, the
//!   detail pane, the feed rows and a one-line status bar.  The search
//!   dropdown and the recommendation form are drawn last, over the rest.
//! * Colours and styles are defined inline, as in the rest of the file.
//! * [`ratatui`] is the TUI framework; see its docs for widget details.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Mode, Row};
use crate::detail::{Detail, MAX_CAST};
use crate::reco::{Field, RecoForm, GENRES, MOODS};
use crate::showcase::Showcase;

/// Characters per card in a row strip.
const CARD_WIDTH: usize = 18;

/// Lines taken by one row: border, cards, border.
const ROW_HEIGHT: u16 = 3;

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let banner_height = if app.showcase.is_empty() { 0 } else { 6 };
    let detail_height = if app.detail.movie().is_some() { 9 } else { 0 };

    let [nav_area, banner_area, detail_area, rows_area, status_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(banner_height),
        Constraint::Length(detail_height),
        Constraint::Min(ROW_HEIGHT),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_navbar(app, frame, nav_area);
    if banner_height > 0 {
        draw_showcase(&app.showcase, app, frame, banner_area);
    }
    if detail_height > 0 {
        draw_detail(&app.detail, app, frame, detail_area);
    }
    draw_rows(app, frame, rows_area);
    draw_status_bar(app, frame, status_area);

    if !app.search.results.is_empty() {
        draw_search_results(app, frame, nav_area);
    }
    if app.reco.open {
        draw_reco_form(&app.reco, frame);
    }
}

// ---------------------------------------------------------------------------
// Navbar & search
// ---------------------------------------------------------------------------

fn draw_navbar(app: &App, frame: &mut Frame, area: Rect) {
    let searching = app.mode == Mode::Search;
    let query = if app.search.query().is_empty() && !searching {
        Span::styled(
            "Search movies, actors, genres...  (/)",
            Style::default().fg(Color::DarkGray),
        )
    } else {
        Span::styled(
            format!("{}{}", app.search.query(), if searching { "▏" } else { "" }),
            Style::default().fg(Color::White),
        )
    };

    let line = Line::from(vec![
        Span::styled(
            "CiniMatch ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" 🔍 "),
        query,
    ]);

    let border = if searching { Color::Yellow } else { Color::DarkGray };
    let nav = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title_bottom(Line::from(" 🎯 r: AI Recommends ").right_aligned()),
    );
    frame.render_widget(nav, area);
}

fn draw_search_results(app: &App, frame: &mut Frame, nav_area: Rect) {
    let screen = frame.area();
    let height = (app.search.results.len() as u16 + 2).min(12);
    let top = nav_area.y + nav_area.height;
    let area = Rect {
        x: nav_area.x + 12,
        y: top,
        width: nav_area.width.saturating_sub(12).min(60),
        height: height.min(screen.height.saturating_sub(top)),
    };
    if area.width == 0 || area.height == 0 {
        return;
    }

    let items: Vec<ListItem> = app
        .search
        .results
        .iter()
        .map(|m| ListItem::new(m.display_title().to_string()))
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" Results "))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol("▸ ");

    let mut state = ListState::default();
    state.select(Some(app.search.selected));
    frame.render_widget(Clear, area);
    frame.render_stateful_widget(list, area, &mut state);
}

// ---------------------------------------------------------------------------
// Showcase & detail pane
// ---------------------------------------------------------------------------

fn draw_showcase(showcase: &Showcase, app: &App, frame: &mut Frame, area: Rect) {
    let Some(movie) = showcase.current() else {
        return;
    };
    let images = &app.settings.images;

    let mut lines = vec![
        Line::from(Span::styled(
            movie.display_title().to_string(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(movie.display_overview().to_string()),
    ];
    if let Some(url) = movie.banner_url(&images.backdrop, &images.poster) {
        lines.push(Line::from(Span::styled(url, Style::default().fg(Color::DarkGray))));
    }

    let title = format!(" Top Picks  {}/{} ", showcase.index() + 1, showcase.len());
    let banner = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .title_bottom(Line::from(" v: View Details ").right_aligned()),
        );
    frame.render_widget(banner, area);
}

fn draw_detail(detail: &Detail, app: &App, frame: &mut Frame, area: Rect) {
    let Some(movie) = detail.movie() else {
        return;
    };

    let mut stats = vec![
        Span::styled(
            format!("⭐ {:.1}", movie.vote_average.unwrap_or(0.0)),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw(format!("  {:.0} votes", movie.vote_count.unwrap_or(0.0))),
        Span::raw(format!("  🔥 {:.0}", movie.popularity.unwrap_or(0.0).round())),
    ];
    for genre in movie.display_genres() {
        stats.push(Span::raw("  "));
        stats.push(Span::styled(format!("[{genre}]"), Style::default().fg(Color::Cyan)));
    }

    let mut lines = vec![
        Line::from(Span::styled(
            movie.display_title().to_string(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(stats),
        Line::from(movie.display_overview().to_string()),
    ];

    if !detail.cast.is_empty() {
        let names: Vec<&str> = detail
            .cast
            .iter()
            .take(MAX_CAST)
            .map(|c| c.name.as_str())
            .collect();
        lines.push(Line::from(vec![
            Span::styled("Cast: ", Style::default().fg(Color::Green)),
            Span::raw(names.join(", ")),
        ]));
    }
    if !detail.directors.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("Director: ", Style::default().fg(Color::Green)),
            Span::raw(detail.directors.join(", ")),
        ]));
    }
    if !detail.similar.is_empty() {
        let titles: Vec<&str> = detail.similar.iter().map(|m| m.display_title()).collect();
        lines.push(Line::from(vec![
            Span::styled("More Like This: ", Style::default().fg(Color::Green)),
            Span::raw(titles.join(" · ")),
        ]));
    }
    if let Some(url) = movie.poster_url(&app.settings.images.poster) {
        lines.push(Line::from(Span::styled(url, Style::default().fg(Color::DarkGray))));
    }

    let pane = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Details "));
    frame.render_widget(pane, area);
}

// ---------------------------------------------------------------------------
// Feed rows
// ---------------------------------------------------------------------------

fn draw_rows(app: &mut App, frame: &mut Frame, area: Rect) {
    if app.rows.is_empty() {
        return;
    }
    let fit = (area.height / ROW_HEIGHT).max(1) as usize;
    let first = app.focused.saturating_sub(fit - 1);
    let focused = app.focused;
    let reco = app.reco_feed();

    for (slot, i) in (first..app.rows.len().min(first + fit)).enumerate() {
        let row_area = Rect {
            y: area.y + slot as u16 * ROW_HEIGHT,
            height: ROW_HEIGHT.min(area.height),
            ..area
        };
        let row = &mut app.rows[i];
        let is_reco = reco == Some(row.loader.id());
        draw_row(row, i == focused, is_reco, frame, row_area);
    }
}

fn draw_row(row: &mut Row, focused: bool, is_reco: bool, frame: &mut Frame, area: Rect) {
    let inner_width = area.width.saturating_sub(2) as usize;
    let arrows = row.shows_arrows();
    let arrow_width = if arrows { 4 } else { 0 };
    let capacity = (inner_width.saturating_sub(arrow_width) / (CARD_WIDTH + 1)).max(1);
    let window = row.window(capacity);
    let item_count = row.loader.items().len();

    let mut spans = Vec::new();
    if arrows {
        spans.push(Span::styled("‹ ", Style::default().fg(Color::DarkGray)));
    }
    for i in window {
        let selected = focused && i == row.cursor;
        let (text, base) = match row.loader.items().get(i) {
            Some(movie) => (movie.display_title().to_string(), Style::default().fg(Color::White)),
            None if row.loader.is_loading() => {
                ("Loading…".to_string(), Style::default().fg(Color::DarkGray))
            }
            None => ("+ More".to_string(), Style::default().fg(Color::Cyan)),
        };
        let style = if selected {
            base.add_modifier(Modifier::BOLD).bg(Color::DarkGray)
        } else {
            base
        };
        spans.push(Span::styled(fit_card(&text), style));
        spans.push(Span::raw(" "));
    }
    if arrows {
        spans.push(Span::styled(" ›", Style::default().fg(Color::DarkGray)));
    }

    let mut title = if is_reco {
        format!(" 🎯 {} ", row.loader.title())
    } else {
        format!(" {} ", row.loader.title())
    };
    if row.loader.state().reached_end && item_count > 0 {
        title.push_str("· end ");
    }
    let border = if focused { Color::Yellow } else { Color::DarkGray };
    let strip = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(title),
    );
    frame.render_widget(strip, area);
}

/// Truncate or pad `text` to exactly [`CARD_WIDTH`] characters.
fn fit_card(text: &str) -> String {
    if text.chars().count() > CARD_WIDTH {
        let mut s: String = text.chars().take(CARD_WIDTH - 1).collect();
        s.push('…');
        s
    } else {
        format!("{text:<CARD_WIDTH$}")
    }
}

// ---------------------------------------------------------------------------
// Recommendation form
// ---------------------------------------------------------------------------

fn draw_reco_form(form: &RecoForm, frame: &mut Frame) {
    let area = centered(frame.area(), 64, 17);
    let focus = |field: Field| {
        if form.field == field {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        }
    };
    let marker = |field: Field| if form.field == field { "▸ " } else { "  " };

    let mut lines = Vec::new();

    lines.push(Line::from(Span::styled(
        format!("{}{}", marker(Field::Movie), Field::Movie.label()),
        focus(Field::Movie),
    )));
    let title = if form.movie().is_empty() {
        Span::styled("    Interstellar, Joker, Dune...", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(format!("    {}", form.movie()))
    };
    lines.push(Line::from(title));

    lines.push(Line::from(Span::styled(
        format!("{}{}", marker(Field::Genres), Field::Genres.label()),
        focus(Field::Genres),
    )));
    let mut chips = vec![Span::raw("    ")];
    for (i, genre) in GENRES.iter().enumerate() {
        let mut style = if form.is_genre_selected(genre) {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default().fg(Color::Cyan)
        };
        if form.field == Field::Genres && form.genre_cursor == i {
            style = style.add_modifier(Modifier::UNDERLINED | Modifier::BOLD);
        }
        chips.push(Span::styled(genre.to_string(), style));
        chips.push(Span::raw(" "));
    }
    lines.push(Line::from(chips));

    let (from, to) = form.years();
    lines.push(Line::from(vec![
        Span::styled(format!("{}from ", marker(Field::YearFrom)), focus(Field::YearFrom)),
        Span::raw(from.to_string()),
        Span::styled(format!("   {}to ", marker(Field::YearTo)), focus(Field::YearTo)),
        Span::raw(to.to_string()),
    ]));

    lines.push(Line::from(Span::styled(
        format!("{}{}: {:.1}+", marker(Field::Rating), Field::Rating.label(), form.rating()),
        focus(Field::Rating),
    )));

    lines.push(Line::from(Span::styled(
        format!("{}{}", marker(Field::Mood), Field::Mood.label()),
        focus(Field::Mood),
    )));
    let mut moods = vec![Span::raw("    ")];
    for (i, mood) in MOODS.iter().enumerate() {
        let mut style = if form.mood() == *mood {
            Style::default().fg(Color::Black).bg(Color::Magenta)
        } else {
            Style::default().fg(Color::Magenta)
        };
        if form.field == Field::Mood && form.mood_cursor == i {
            style = style.add_modifier(Modifier::UNDERLINED | Modifier::BOLD);
        }
        moods.push(Span::styled(mood.to_string(), style));
        moods.push(Span::raw(" "));
    }
    lines.push(Line::from(moods));

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Enter", Style::default().fg(Color::Green)),
        Span::raw(": Get Recommendations   "),
        Span::styled("Esc", Style::default().fg(Color::Red)),
        Span::raw(": Cancel   Tab: next field   ←/→: adjust   Space: toggle"),
    ]));

    let modal = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" 🎯 Personalized Picks "),
    );
    frame.render_widget(Clear, area);
    frame.render_widget(modal, area);
}

fn centered(outer: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(outer.width);
    let height = height.min(outer.height);
    Rect {
        x: outer.x + (outer.width - width) / 2,
        y: outer.y + (outer.height - height) / 2,
        width,
        height,
    }
}

// ---------------------------------------------------------------------------
// Status bar
// ---------------------------------------------------------------------------

fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let hints = match app.mode {
        Mode::Browse => "q: quit  ↑/↓: rows  ←/→: cards  Enter: open/more  m: more  /: search",
        Mode::Search => "type to search  ↑/↓: choose  Enter: open  Esc: back",
        Mode::Reco => "Enter: submit  Esc: cancel",
    };
    let status = Paragraph::new(Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(&app.status, Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(
            format!("{} rows", app.rows.len()),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  "),
        Span::raw(hints),
    ]));
    frame.render_widget(status, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::app::Settings;
    use crate::dispatch::Msg;
    use crate::feed::tests::{movie, ScriptedSource, Step};
    use crate::feed::FeedOptions;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    fn app() -> App {
        let api = Arc::new(ApiClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap());
        App::new(api, Settings::default())
    }

    fn render(app: &mut App, width: u16, height: u16) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(app, f)).unwrap();
        let buf = terminal.backend().buffer().clone();
        buf.content()
            .iter()
            .map(|c| c.symbol().chars().next().unwrap_or(' '))
            .collect()
    }

    async fn loaded_app() -> App {
        let mut app = app();
        let items = (1..=7).map(|i| movie(&format!("tt{i}"))).collect();
        app.add_feed(
            "Trending",
            ScriptedSource::new(vec![Step::Page(items)]),
            FeedOptions::default(),
        );
        for task in app.take_tasks() {
            if let crate::app::Task::Page(fetch) = task {
                let done = fetch.run(Duration::from_secs(5)).await;
                app.handle(Msg::Page(done), Instant::now());
            }
        }
        app
    }

    #[test]
    fn draw_does_not_panic_when_empty() {
        let mut app = app();
        let text = render(&mut app, 80, 24);
        assert!(text.contains("CiniMatch"));
        assert!(text.contains("0 rows"));
    }

    #[test]
    fn draw_survives_tiny_terminal() {
        let mut app = app();
        app.reco.open();
        render(&mut app, 10, 4);
    }

    #[test]
    fn loading_row_shows_loading_card() {
        let mut app = app();
        app.add_feed("Drama", ScriptedSource::new(vec![]), FeedOptions::default());
        let text = render(&mut app, 100, 30);
        assert!(text.contains("Drama"));
        assert!(text.contains("Loading…"));
    }

    #[tokio::test]
    async fn loaded_row_shows_titles_more_card_and_arrows() {
        let mut app = loaded_app().await;
        app.move_card(100);
        let text = render(&mut app, 120, 30);
        assert!(text.contains("Movie tt7"));
        assert!(text.contains("+ More"));
        assert!(text.contains('‹'));
    }

    #[test]
    fn showcase_and_detail_render() {
        let mut app = app();
        let mut pick = movie("tt1");
        pick.overview = Some("Into the wormhole".into());
        pick.genres = vec!["Drama".into()];
        app.handle(Msg::TopPicks(Ok(vec![pick])), Instant::now());

        let text = render(&mut app, 120, 40);
        assert!(text.contains("Top Picks"));
        assert!(text.contains("Details"));
        assert!(text.contains("Into the wormhole"));
        assert!(text.contains("[Drama]"));
    }

    #[test]
    fn search_dropdown_lists_results() {
        let mut app = app();
        let now = Instant::now();
        app.open_search();
        app.search.set_query("ab".into(), now);
        let req = app.search.poll(now + Duration::from_secs(1)).unwrap();
        let mut hit = movie("1");
        hit.title = Some("Ab Movie".into());
        app.search.apply(req.seq, Ok(vec![hit]));

        let text = render(&mut app, 100, 30);
        assert!(text.contains("Results"));
        assert!(text.contains("Ab Movie"));
    }

    #[test]
    fn reco_form_renders_as_modal() {
        let mut app = app();
        app.open_reco();
        let text = render(&mut app, 100, 30);
        assert!(text.contains("Personalized Picks"));
        assert!(text.contains("Sci-Fi"));
        assert!(text.contains("7.0+"));
    }

    #[test]
    fn recommendations_row_is_marked() {
        let mut app = app();
        app.open_reco();
        app.submit_reco();
        let text = render(&mut app, 100, 30);
        assert!(text.contains("Recommended For You"));
    }

    #[tokio::test]
    async fn movies_without_posters_still_get_cards() {
        let mut app = app();
        let mut bare = movie("tt1");
        bare.title = Some("No Poster".into());
        bare.poster_path = None;
        let mut framed = movie("tt2");
        framed.title = Some("Has Poster".into());
        framed.poster_path = Some("/p.jpg".into());
        app.add_feed(
            "Drama",
            ScriptedSource::new(vec![Step::Page(vec![bare, framed])]),
            FeedOptions::default(),
        );
        for task in app.take_tasks() {
            if let crate::app::Task::Page(fetch) = task {
                let done = fetch.run(Duration::from_secs(5)).await;
                app.handle(Msg::Page(done), Instant::now());
            }
        }

        let text = render(&mut app, 120, 30);
        assert!(text.contains("No Poster"));
        assert!(text.contains("Has Poster"));
    }

    #[test]
    fn card_text_is_fixed_width() {
        assert_eq!(fit_card("Up").chars().count(), CARD_WIDTH);
        let long = fit_card("The Lord of the Rings: The Return of the King");
        assert_eq!(long.chars().count(), CARD_WIDTH);
        assert!(long.ends_with('…'));
    }
}
