//! scriptdeck — a live-updating script catalog browser for the terminal.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌──────────┐  Request   ┌──────────┐  draw()  ┌──────────┐
//! │  poll.rs │ ◄───────── │  app.rs  │ ───────► │  ui.rs   │
//! │ (tokio)  │ ─────────► │ (state)  │          │ (render) │
//! └──────────┘  Response  └──────────┘          └──────────┘
//!      │                       ▲
//!      ▼                       │ handle_key_event()
//! ┌──────────┐            ┌──────────┐
//! │ catalog/ │            │ input.rs │
//! └──────────┘            └──────────┘
//! ```
//!
//! * **`catalog/`** — the `CatalogSource` trait, item types, and the HTTP
//!   implementation.
//! * **`detect`** — watermark-based detection of newly published items.
//! * **`poll`** — runs catalog requests on the tokio runtime.
//! * **`schedule`** — auto-refresh cadence and transient badge timers.
//! * **`app`** — owns all application state and applies completions.
//! * **`ui`** — pure rendering: reads `App` state and draws widgets.
//! * **`input`** — maps key events to `App` mutations.
//! * **`main`** — wires everything together: parse args, set up logging
//!   and the terminal, and run the event loop.

mod app;
mod catalog;
mod config;
mod detect;
mod input;
mod logging;
mod poll;
mod schedule;
mod ui;

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use app::App;
use catalog::HttpCatalog;
use config::{Args, Config};
use schedule::PollSchedule;

// ---------------------------------------------------------------------------
// RAII terminal guard — idiomatic cleanup even on panic
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
///
/// Constructing this struct enters raw mode + alternate screen.  When the
/// value is dropped (normally or during stack unwinding) it restores the
/// terminal.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Install a panic hook that restores the terminal before printing the
/// panic message.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        tracing::error!(%info, "panic");
        original_hook(info);
    }));
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    // -- parse arguments -----------------------------------------------------
    let config = Config::try_from(Args::parse())?;
    let _log_guard = logging::init(&config.log_file, config.verbose)?;
    tracing::info!(api = %config.api_url, interval = ?config.poll_interval, "starting");

    install_panic_hook();

    // -- start the request worker --------------------------------------------
    let runtime = tokio::runtime::Runtime::new()?;
    let catalog = Arc::new(HttpCatalog::new(config.api_url.clone())?);
    let (requests, mut responses) = poll::spawn(runtime.handle(), catalog);

    // -- terminal setup (RAII — Drop restores on exit or panic) --------------
    let mut guard = TerminalGuard::new()?;
    let now = Instant::now();
    let mut app = App::new(
        PollSchedule::new(config.poll_interval, config.auto_refresh, now),
        config.start_page,
    );
    app.start();

    // -- main event loop -----------------------------------------------------
    // Runs at ~10 fps (100 ms tick).  Each iteration:
    //   1. Apply completions from the worker.
    //   2. Advance timers (polls, badge expiry).
    //   3. Hand queued requests to the worker.
    //   4. Render the UI.
    //   5. Poll for keyboard input (non-blocking, up to tick_rate).
    let tick_rate = Duration::from_millis(100);

    loop {
        let now = Instant::now();

        while let Ok(response) = responses.try_recv() {
            app.apply(response, now);
        }

        app.tick(now);

        for request in app.drain_requests() {
            if requests.send(request).is_err() {
                anyhow::bail!("request worker stopped unexpectedly");
            }
        }

        guard.terminal.draw(|f| ui::draw(&mut app, f, now))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                input::handle_key_event(&mut app, key, Instant::now());
            }
        }

        if app.quit {
            break;
        }
    }

    tracing::info!("exiting");
    drop(requests);
    // In-flight requests are not awaited.
    runtime.shutdown_background();

    // `guard` is dropped here, restoring the terminal.
    Ok(())
}
