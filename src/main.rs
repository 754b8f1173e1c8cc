//! cinimatch-tui: browse, search and get movie recommendations in the
//! terminal.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌─────────────┐   Msg    ┌──────────┐  draw()  ┌──────────┐
//! │ dispatch.rs │ ───────► │  app.rs  │ ───────► │  ui.rs   │
//! │   (tokio)   │ (channel)│ (state)  │          │ (render) │
//! └─────────────┘          └──────────┘          └──────────┘
//!        ▲        Task          │  ▲
//!        └──────────────────────┘  │ handle_key_event()
//!                             ┌──────────┐
//!                             │ input.rs │
//!                             └──────────┘
//! ```
//!
//! * **`source/`**: the `Movie` type, the `PageSource` trait and the
//!   API-backed feeds (trending, genre, personal recommendations).
//! * **`api`**: HTTP client for the metadata API.
//! * **`feed`**: the paginating loader behind every row.
//! * **`search`**, **`showcase`**, **`detail`**, **`reco`**: state for the
//!   search box, the rotating banner, the detail pane and the
//!   recommendation form.
//! * **`dispatch`**: runs queued work on the tokio runtime.
//! * **`app`**: owns all application state.
//! * **`ui`**: pure rendering: reads `App` state and draws widgets.
//! * **`input`**: maps key events to `App` mutations.
//! * **`config`**, **`logging`**: CLI/config file and tracing setup.
//! * **`main`**: wires everything together: parse args, set up the terminal,
//!   and run the event loop.

mod api;
mod app;
mod config;
mod detail;
mod dispatch;
mod feed;
mod input;
mod logging;
mod reco;
mod search;
mod showcase;
mod source;
mod ui;

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use api::ApiClient;
use app::{App, Settings};
use config::{Args, Config};
use dispatch::Dispatcher;

// ---------------------------------------------------------------------------
// RAII terminal guard
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
    // -- parse arguments & config --------------------------------------------
    let args = Args::parse();
    let config = Config::load(&args)?;
    logging::init(&config.log)?;
    install_panic_hook();

    // -- runtime & API -------------------------------------------------------
    let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
    let timeout = config.api.request_timeout();
    let api = Arc::new(ApiClient::new(&config.api.base_url, timeout)?);
    tracing::info!(base = %api.base_url(), "using metadata API");

    let (mut dispatcher, mut rx) =
        Dispatcher::new(runtime.handle().clone(), Arc::clone(&api), timeout);
    let mut app = App::bootstrap(api, Settings::from(&config));

    // -- terminal setup (Drop restores on exit or panic) --------------
    let mut guard = TerminalGuard::new()?;

    // -- main event loop -----------------------------------------------------
    // Runs at ~10 fps (100 ms tick).  Each iteration:
    //   1. Apply results posted by background tasks.
    //   2. Advance timers and hand queued work to the dispatcher.
    //   3. Render the UI.
    //   4. Poll for keyboard input (non-blocking, up to tick_rate).
    let tick_rate = Duration::from_millis(100);

    loop {
        let now = Instant::now();
        while let Ok(msg) = rx.try_recv() {
            app.handle(msg, now);
        }

        app.tick(now);
        for task in app.take_tasks() {
            dispatcher.run(task);
        }

        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                input::handle_key_event(&mut app, key, Instant::now());
            }
        }

        if app.quit {
            break;
        }
    }

    // Drop the terminal first so the screen is restored before the runtime
    // waits on any in-flight requests.
    drop(guard);
    runtime.shutdown_timeout(Duration::from_millis(500));
    tracing::info!("bye");
    Ok(())
}
