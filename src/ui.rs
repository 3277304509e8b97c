//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).
//!
//! ## For contributors
//!
//! * The layout is a header line (search box), a card list beside a detail
//!   pane, and a one-line status bar at the bottom.
//! * Transient elements (new-items badge, notices) are drawn only while
//!   their window is open, so `draw` takes the current [`Instant`].
//! * [`ratatui`] is the TUI framework; see its docs for widget details.

use std::time::Instant;

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Mode, SourceState};
use crate::catalog::ScriptItem;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame, now: Instant) {
    let [header_area, body_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let [list_area, detail_area] = Layout::horizontal([
        Constraint::Percentage(45),
        Constraint::Percentage(55),
    ])
    .areas(body_area);

    draw_header(app, frame, header_area);
    draw_card_list(app, frame, list_area);
    draw_detail(app, frame, detail_area);
    draw_status_bar(app, frame, status_area, now);
}

fn draw_header(app: &App, frame: &mut Frame, area: Rect) {
    let searching = app.mode == Mode::Search;
    let query_style = if searching {
        Style::default().fg(Color::Black).bg(Color::Yellow)
    } else {
        Style::default().fg(Color::Yellow)
    };

    let mut spans = vec![
        Span::styled(" scriptdeck ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" "),
    ];
    if searching || !app.query.is_empty() {
        spans.push(Span::styled(format!("/{}", app.query), query_style));
        if searching {
            spans.push(Span::styled("▏", query_style));
        }
    } else {
        spans.push(Span::styled("/ to search", Style::default().fg(Color::DarkGray)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the scrollable card list.
fn draw_card_list(app: &mut App, frame: &mut Frame, area: Rect) {
    let cards: Vec<ListItem> = app.visible_items().map(card).collect();
    let empty = cards.is_empty();

    let title = format!(" Scripts ({}/{}) ", app.visible_len(), app.items.len());
    let block = Block::default().title(title).borders(Borders::ALL);

    if empty {
        let message = if app.loading {
            "Loading…"
        } else if app.items.is_empty() {
            "No scripts found."
        } else {
            "Nothing matches the search."
        };
        let placeholder = Paragraph::new(Span::styled(message, Style::default().fg(Color::DarkGray)))
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let list = List::new(cards)
        .block(block)
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("▸ ");

    // The cards borrow `app`; render against a copy of the state and
    // write the scroll offset back afterwards.
    let mut state = app.list_state.clone();
    frame.render_stateful_widget(list, area, &mut state);
    app.list_state = state;
}

fn card(item: &ScriptItem) -> ListItem<'_> {
    let date_str = item
        .published
        .map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_else(|| "no date".into());

    let mut meta = vec![
        Span::styled(format!("  {}", item.byline()), Style::default().fg(Color::Cyan)),
        Span::styled(format!("  {date_str}"), Style::default().fg(Color::DarkGray)),
    ];
    if let Some(lang) = &item.language {
        meta.push(Span::styled(format!("  [{lang}]"), Style::default().fg(Color::Magenta)));
    }

    ListItem::new(vec![
        Line::from(Span::styled(item.title.as_str(), Style::default().fg(Color::White))),
        Line::from(meta),
    ])
}

/// Render the selected item with its source, when revealed.
fn draw_detail(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default().title(" Details ").borders(Borders::ALL);

    let Some(item) = app.selected_item() else {
        frame.render_widget(Paragraph::new("").block(block), area);
        return;
    };

    let label = Style::default().fg(Color::DarkGray);
    let mut lines = vec![
        Line::from(Span::styled(item.title.as_str(), Style::default().add_modifier(Modifier::BOLD))),
        Line::from(vec![Span::styled("by ", label), Span::raw(item.byline())]),
    ];
    if let Some(url) = item.author.as_ref().and_then(|a| a.url.as_deref()) {
        lines.push(Line::from(vec![Span::styled("profile ", label), Span::raw(url)]));
    }
    if let Some(ts) = item.published {
        lines.push(Line::from(vec![
            Span::styled("published ", label),
            Span::raw(ts.format(DATE_FORMAT).to_string()),
        ]));
    }
    if let Some(lang) = &item.language {
        lines.push(Line::from(vec![Span::styled("language ", label), Span::raw(lang.as_str())]));
    }
    if let Some(thumb) = &item.thumbnail {
        lines.push(Line::from(vec![Span::styled("thumbnail ", label), Span::raw(thumb.as_str())]));
    }
    if let Some(desc) = &item.description {
        lines.push(Line::raw(""));
        lines.extend(desc.lines().map(Line::raw));
    }

    lines.push(Line::raw(""));
    lines.extend(source_lines(app, item));

    let detail = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(detail, area);
}

fn source_lines<'a>(app: &'a App, item: &ScriptItem) -> Vec<Line<'a>> {
    let hint = Style::default().fg(Color::DarkGray);

    if !app.is_revealed(&item.id) {
        return vec![Line::from(Span::styled("[Enter] show source", hint))];
    }

    let mut lines = vec![Line::from(Span::styled("[Enter] hide source", hint))];
    match app.source(&item.id) {
        Some(SourceState::Loaded(view)) => {
            lines.extend(
                view.text
                    .lines()
                    .map(|l| Line::styled(l.replace('\t', "    "), Style::default().fg(Color::Green))),
            );
            if view.truncated {
                lines.push(Line::from(Span::styled("… (truncated)", hint)));
            }
        }
        Some(SourceState::Failed(placeholder)) => {
            lines.push(Line::from(Span::styled(placeholder.as_str(), Style::default().fg(Color::Red))));
        }
        Some(SourceState::Loading) | None => {
            lines.push(Line::from(Span::styled("Loading source…", hint)));
        }
    }
    lines
}

/// Render the bottom status bar.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect, now: Instant) {
    let on = Style::default().fg(Color::White);
    let off = Style::default().fg(Color::DarkGray);

    let max = app.max_page.map_or_else(|| "?".to_string(), |m| m.to_string());
    let mut spans = vec![
        Span::raw(" "),
        Span::styled("‹", if app.can_prev_page() { on } else { off }),
        Span::raw(format!(" {}/{max} ", app.page)),
        Span::styled("›", if app.can_next_page() { on } else { off }),
        Span::raw("  "),
    ];

    let auto = if app.schedule.enabled() {
        format!("auto {}s", app.schedule.interval().as_secs())
    } else {
        "auto off".to_string()
    };
    spans.push(Span::styled(auto, Style::default().fg(Color::Blue)));
    spans.push(Span::raw("  "));

    if let Some(count) = app.badge.get(now) {
        spans.push(Span::styled(
            format!("+{count} new"),
            Style::default().fg(Color::Black).bg(Color::Green),
        ));
        spans.push(Span::raw("  "));
    }

    match app.notice.get(now) {
        Some(notice) => spans.push(Span::styled(notice.as_str(), Style::default().fg(Color::Red))),
        None => spans.push(Span::styled(app.status.as_str(), Style::default().fg(Color::Yellow))),
    }

    spans.push(Span::raw("  q quit  / search  ⏎ source  n/p page  r refresh  a auto  +/- interval"));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use crate::catalog::{at, PageInfo, PageResult, SourceView};
    use crate::poll::{LoadOrigin, Request, Response};
    use crate::schedule::{PollSchedule, NOTICE_DURATION};

    fn render(app: &mut App, now: Instant) -> String {
        let backend = TestBackend::new(160, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(app, f, now)).unwrap();
        let buf = terminal.backend().buffer().clone();
        buf.content()
            .iter()
            .map(|c| c.symbol().chars().next().unwrap_or(' '))
            .collect()
    }

    fn loaded_app(now: Instant) -> App {
        let mut app = App::new(PollSchedule::new(Duration::from_secs(30), true, now), 1);
        app.start();
        app.drain_requests();
        let mut first = at("t2", 2);
        first.title = "Infinite Jump".into();
        first.language = Some("lua".into());
        first.raw_url = Some("/raw/t2".into());
        app.apply(
            Response::Page {
                seq: 1,
                page: 1,
                origin: LoadOrigin::Startup,
                result: Ok(PageResult {
                    items: vec![first, at("t1", 1)],
                    info: PageInfo { current: Some(1), max: Some(5) },
                }),
            },
            now,
        );
        app
    }

    #[test]
    fn draw_does_not_panic_with_no_items() {
        let mut app = App::new(PollSchedule::new(Duration::from_secs(30), false, Instant::now()), 1);
        let text = render(&mut app, Instant::now());
        assert!(text.contains("No scripts found."));
        assert!(text.contains("auto off"));
    }

    #[test]
    fn draw_shows_cards_and_page_status() {
        let now = Instant::now();
        let mut app = loaded_app(now);
        let text = render(&mut app, now);

        assert!(text.contains("Infinite Jump"));
        assert!(text.contains("[lua]"));
        assert!(text.contains("1/5"));
        assert!(text.contains("auto 30s"));
        assert!(text.contains("Scripts (2/2)"));
    }

    #[test]
    fn badge_is_drawn_only_inside_its_window() {
        let now = Instant::now();
        let mut app = loaded_app(now);
        app.badge.show(3, now);

        assert!(render(&mut app, now).contains("+3 new"));
        assert!(!render(&mut app, now + NOTICE_DURATION).contains("+3 new"));
    }

    #[test]
    fn revealed_source_is_rendered_in_detail_pane() {
        let now = Instant::now();
        let mut app = loaded_app(now);

        assert!(render(&mut app, now).contains("show source"));

        app.toggle_source();
        assert!(render(&mut app, now).contains("Loading source"));

        let Some(Request::LoadSource { id, .. }) = app.drain_requests().pop() else {
            panic!("reveal should queue a source load");
        };
        app.apply(
            Response::Source { id, result: Ok(SourceView { text: "print('jump')".into(), truncated: true }) },
            now,
        );
        let text = render(&mut app, now);
        assert!(text.contains("print('jump')"));
        assert!(text.contains("(truncated)"));
    }

    #[test]
    fn search_query_is_shown_in_header() {
        let now = Instant::now();
        let mut app = loaded_app(now);
        app.begin_search();
        app.push_query('j');
        app.push_query('u');

        let text = render(&mut app, now);
        assert!(text.contains("/ju"));
        assert!(text.contains("Scripts (1/2)"));
    }
}
