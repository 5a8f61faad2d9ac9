//! f1viewer: live F1 schedules, standings and results in the terminal.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌──────────┐  PollMsg   ┌──────────┐  draw()  ┌──────────┐
//! │  poll.rs │ ─────────► │  app.rs  │ ───────► │  ui.rs   │
//! │ (thread) │ ◄───────── │ (state)  │          │ (render) │
//! └──────────┘  Command   └──────────┘          └──────────┘
//!      │                       ▲
//!      │ refresh::             │ handle_key_event()
//!      ▼ update_all_if_changed ┌──────────┐
//! ┌──────────┐                 │ input.rs │
//! │ source/  │                 └──────────┘
//! └──────────┘
//! ```
//!
//! * **`source/`**: the `Fetcher` trait and its HTTP implementation.
//! * **`refresh/`**: concurrent fetch, content hashing and change detection.
//! * **`f1/`**: the API feeds, their response types and table builders.
//! * **`session`**: next-session countdown and live windows.
//! * **`poll`**: background thread that refreshes feeds on a timer or on
//!   command.
//! * **`watch`**: headless mode that only logs what changed.
//! * **`app`**: owns all application state (tabs, payloads, selection).
//! * **`ui`**: pure rendering: reads `App` state and draws widgets.
//! * **`input`**: maps key events to `App` mutations.
//! * **`main`**: wires everything together: parse args, load config, set
//!   up logging and the terminal, and run the event loop.

mod app;
mod config;
mod error;
mod f1;
mod input;
mod logging;
mod poll;
mod refresh;
mod session;
mod source;
mod ui;
mod watch;

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Datelike, Local, Utc};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use app::App;
use config::{Cli, Command, Config};
use f1::Selection;
use source::{Fetcher, HttpFetcher};

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
        tracing::error!("panic: {info}");
        original_hook(info);
    }));
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    let (cfg, created) =
        config::load_or_init(cli.config.as_deref()).context("loading configuration")?;
    let cfg = cfg.merge_cli(&cli);

    let current_year = Local::now().year();
    let season = cfg.season_or(current_year);
    let fetcher = HttpFetcher::new(cfg.request_timeout()).context("building HTTP client")?;

    match cli.command() {
        Command::Tui => run_tui(
            Arc::new(fetcher),
            &cfg,
            created.as_deref(),
            season,
            current_year,
        ),
        Command::Watch => {
            logging::init_logging_stderr(cfg.log_filter.as_deref())?;
            log_config(&cfg, created.as_deref());
            watch::run(
                &fetcher,
                &cfg.api_base,
                Selection::new(season.to_string()),
                cfg.poll_interval(),
            )
        }
    }
}

/// Called once a subscriber is installed; config loading runs before that.
fn log_config(cfg: &Config, created: Option<&Path>) {
    if let Some(path) = created {
        tracing::info!("created default config at {}", path.display());
    }
    tracing::debug!(?cfg, "loaded config");
}

fn run_tui(
    fetcher: Arc<dyn Fetcher>,
    cfg: &Config,
    created: Option<&Path>,
    season: i32,
    current_year: i32,
) -> Result<()> {
    let log_path = logging::init_logging(cfg.log_filter.as_deref())?;
    log_config(cfg, created);
    install_panic_hook();

    // -- start background polling --------------------------------------------
    let mut app = App::new(season, current_year, cfg.use_24h_clock);
    let poller = poll::Poller::new(
        fetcher,
        cfg.api_base.clone(),
        Selection::new(app.season.to_string()),
    );
    let (commands, rx) = poll::spawn(poller, cfg.poll_interval());
    app.status = format!("Loading… (log: {})", log_path.display());

    // -- terminal setup (RAII, Drop restores on exit or panic) --------------
    let mut guard = TerminalGuard::new()?;

    // -- main event loop -----------------------------------------------------
    // Runs at ~4 fps (250 ms tick) so the countdown ticks smoothly.  Each
    // iteration:
    //   1. Drain any messages from the poller.
    //   2. Forward queued commands to the poller.
    //   3. Render the UI.
    //   4. Poll for keyboard input (non-blocking, up to tick_rate).
    let tick_rate = Duration::from_millis(250);

    loop {
        while let Ok(msg) = rx.try_recv() {
            app.apply(msg);
        }

        for cmd in app.take_commands() {
            if commands.send(cmd).is_err() {
                anyhow::bail!("poller thread exited");
            }
        }

        let now = Utc::now();
        guard.terminal.draw(|f| ui::draw(&mut app, f, now))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                input::handle_key_event(&mut app, key);
            }
        }

        if app.quit {
            break;
        }
    }

    tracing::info!("exiting");
    // `guard` is dropped here, restoring the terminal.
    Ok(())
}
