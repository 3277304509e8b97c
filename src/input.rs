//! Keyboard input handling.
//!
//! Maps terminal key events to [`App`] actions.  There are two key maps:
//! browse mode (navigation, paging, refresh controls) and search mode
//! (typed characters edit the filter).
//!
//! ## For contributors
//!
//! To add a new keybinding:
//!
//! 1. Add a method on [`App`] for the action (if one doesn't exist).
//! 2. Add a `KeyCode` match arm in [`handle_browse_key`] that calls it.
//! 3. Update the help text in [`crate::ui`].

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{App, Mode};

/// Process a single key event, updating app state accordingly.
///
/// Only reacts to key-press events (ignoring release / repeat) so that each
/// physical keypress triggers exactly one action.
pub fn handle_key_event(app: &mut App, key: KeyEvent, now: Instant) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit = true;
        return;
    }

    match app.mode {
        Mode::Browse => handle_browse_key(app, key.code, now),
        Mode::Search => handle_search_key(app, key.code),
    }
}

fn handle_browse_key(app: &mut App, code: KeyCode, now: Instant) {
    match code {
        KeyCode::Char('q') => app.quit = true,
        KeyCode::Esc if !app.query.is_empty() => app.cancel_search(),
        KeyCode::Esc => app.quit = true,
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Home | KeyCode::Char('g') => app.select_first(),
        KeyCode::End | KeyCode::Char('G') => app.select_last(),
        KeyCode::Enter | KeyCode::Char(' ') => app.toggle_source(),
        KeyCode::Char('/') => app.begin_search(),
        KeyCode::Right | KeyCode::Char('n') => app.next_page(),
        KeyCode::Left | KeyCode::Char('p') => app.prev_page(),
        KeyCode::Char('r') => app.refresh(),
        KeyCode::Char('a') => app.toggle_auto_refresh(now),
        KeyCode::Char('+') | KeyCode::Char('=') => app.poll_slower(now),
        KeyCode::Char('-') => app.poll_faster(now),
        _ => {}
    }
}

fn handle_search_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => app.cancel_search(),
        KeyCode::Enter => app.commit_search(),
        KeyCode::Backspace => app.pop_query(),
        KeyCode::Char(c) => app.push_query(c),
        KeyCode::Down => app.select_next(),
        KeyCode::Up => app.select_previous(),
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::poll::Request;
    use crate::schedule::PollSchedule;

    fn press(app: &mut App, code: KeyCode) {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE), Instant::now());
    }

    fn app() -> App {
        App::new(PollSchedule::new(Duration::from_secs(60), true, Instant::now()), 1)
    }

    #[test]
    fn q_and_esc_quit_in_browse_mode() {
        let mut a = app();
        press(&mut a, KeyCode::Char('q'));
        assert!(a.quit);

        let mut a = app();
        press(&mut a, KeyCode::Esc);
        assert!(a.quit);
    }

    #[test]
    fn ctrl_c_quits_even_while_searching() {
        let mut a = app();
        press(&mut a, KeyCode::Char('/'));
        handle_key_event(&mut a, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), Instant::now());
        assert!(a.quit);
    }

    #[test]
    fn search_mode_captures_letters() {
        let mut a = app();
        press(&mut a, KeyCode::Char('/'));
        assert_eq!(a.mode, Mode::Search);

        press(&mut a, KeyCode::Char('q'));
        press(&mut a, KeyCode::Char('r'));
        assert_eq!(a.query, "qr");
        assert!(!a.quit, "'q' is text while searching");
        assert!(a.drain_requests().is_empty(), "'r' is text while searching");

        press(&mut a, KeyCode::Backspace);
        assert_eq!(a.query, "q");

        press(&mut a, KeyCode::Enter);
        assert_eq!(a.mode, Mode::Browse);
        assert_eq!(a.query, "q");

        // Esc in browse mode clears an active filter before it quits.
        press(&mut a, KeyCode::Esc);
        assert!(a.query.is_empty());
        assert!(!a.quit);
    }

    #[test]
    fn r_queues_a_manual_refresh() {
        let mut a = app();
        press(&mut a, KeyCode::Char('r'));
        assert!(matches!(a.drain_requests().as_slice(), [Request::LoadPage { page: 1, .. }]));
    }

    #[test]
    fn a_toggles_auto_refresh() {
        let mut a = app();
        assert!(a.schedule.enabled());
        press(&mut a, KeyCode::Char('a'));
        assert!(!a.schedule.enabled());
    }

    #[test]
    fn plus_and_minus_step_the_interval() {
        let mut a = app();
        press(&mut a, KeyCode::Char('+'));
        assert_eq!(a.schedule.interval(), Duration::from_secs(120));
        press(&mut a, KeyCode::Char('-'));
        press(&mut a, KeyCode::Char('-'));
        assert_eq!(a.schedule.interval(), Duration::from_secs(30));
    }

    #[test]
    fn release_events_are_ignored() {
        let mut a = app();
        let mut key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        handle_key_event(&mut a, key, Instant::now());
        assert!(!a.quit);
    }
}
