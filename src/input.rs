//! Keyboard input handling.
//!
//! Maps terminal key events to [`App`] actions.  Which keys mean what
//! depends on [`Mode`]: browsing the rows, typing in the search box, or
//! filling in the recommendation form.
//!
//! ## For contributors
//!
//! To add a new keybinding:
//!
//! 1. Add a method on [`App`] for the action (if one doesn't exist).
//! 2. Add a `KeyCode` match arm in the handler for the right mode.
//! 3. Update the help text in [`crate::ui`]'s status bar.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{App, Mode};
use crate::reco::Field;

/// Process a single key event, updating app state accordingly.
///
/// Only reacts to key-press events (ignoring release / repeat) so that each
/// physical keypress triggers exactly one action.
pub fn handle_key_event(app: &mut App, key: KeyEvent, now: Instant) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit = true;
        return;
    }

    match app.mode {
        Mode::Browse => browse(app, key),
        Mode::Search => search(app, key, now),
        Mode::Reco => reco(app, key),
    }
}

fn browse(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Down | KeyCode::Char('j') => app.focus_next_row(),
        KeyCode::Up | KeyCode::Char('k') => app.focus_previous_row(),
        KeyCode::Right | KeyCode::Char('l') => app.move_card(1),
        KeyCode::Left | KeyCode::Char('h') => app.move_card(-1),
        KeyCode::Char(']') => app.scroll_row(1),
        KeyCode::Char('[') => app.scroll_row(-1),
        KeyCode::Enter => app.activate_card(),
        KeyCode::Char('m') => app.load_more(),
        KeyCode::Char('v') => app.view_showcase(),
        KeyCode::Char('/') => app.open_search(),
        KeyCode::Char('r') => app.open_reco(),
        _ => {}
    }
}

fn search(app: &mut App, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Esc => app.leave_search(),
        KeyCode::Enter => app.choose_search_result(),
        KeyCode::Down => app.search.select_next(),
        KeyCode::Up => app.search.select_previous(),
        KeyCode::Backspace => app.search.backspace(now),
        KeyCode::Char(c) => app.search.push_char(c, now),
        _ => {}
    }
}

fn reco(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_reco(),
        KeyCode::Enter => app.submit_reco(),
        KeyCode::Tab | KeyCode::Down => app.reco.next_field(),
        KeyCode::BackTab | KeyCode::Up => app.reco.prev_field(),
        KeyCode::Right => app.reco.increase(),
        KeyCode::Left => app.reco.decrease(),
        KeyCode::Backspace => app.reco.backspace(),
        KeyCode::Char(' ') if app.reco.field != Field::Movie => app.reco.activate(),
        KeyCode::Char(c) => app.reco.type_char(c),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::app::Settings;
    use std::sync::Arc;
    use std::time::Duration;

    fn app() -> App {
        let api = Arc::new(ApiClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap());
        App::new(api, Settings::default())
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key_event(app, KeyEvent::from(code), Instant::now());
    }

    #[test]
    fn q_quits_in_browse_mode() {
        let mut app = app();
        press(&mut app, KeyCode::Char('q'));
        assert!(app.quit);
    }

    #[test]
    fn q_is_text_in_search_mode() {
        let mut app = app();
        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.quit);
        assert_eq!(app.search.query(), "q");

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode, Mode::Browse);
        assert_eq!(app.search.query(), "");
    }

    #[test]
    fn release_events_are_ignored() {
        let mut app = app();
        let mut key = KeyEvent::from(KeyCode::Char('q'));
        key.kind = KeyEventKind::Release;
        handle_key_event(&mut app, key, Instant::now());
        assert!(!app.quit);
    }

    #[test]
    fn ctrl_c_quits_from_any_mode() {
        let mut app = app();
        press(&mut app, KeyCode::Char('r'));
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        handle_key_event(&mut app, key, Instant::now());
        assert!(app.quit);
    }

    #[test]
    fn reco_form_keys() {
        let mut app = app();
        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.mode, Mode::Reco);

        for c in "Up Dog".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        assert_eq!(app.reco.movie(), "Up Dog");

        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char(' '));
        assert!(app.reco.is_genre_selected("Action"));

        press(&mut app, KeyCode::BackTab);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode, Mode::Browse);
        assert!(app.rows.is_empty());
    }
}
