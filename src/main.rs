mod ui;

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;

use cyber_drill::{load_catalog, telemetry, DataStore};
use ui::{draw_ui, App};

const IDLE_POLL: Duration = Duration::from_millis(250);

/// Cyber Training Simulator: scenario-based security drills in the terminal.
#[derive(Debug, Parser)]
#[command(name = "cyber-drill", version, about)]
struct Args {
    /// Directory holding settings, profile, leaderboard and reports
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Directory of `*.toml` scenario catalog files
    #[arg(long, default_value = "scenarios")]
    scenarios: PathBuf,

    /// Player name recorded on the leaderboard (saved to the profile)
    #[arg(long)]
    name: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let store = DataStore::new(&args.data_dir);
    store
        .ensure_dirs()
        .with_context(|| format!("preparing data directory {}", args.data_dir.display()))?;
    telemetry::init_tracing(&store.root().join("cyber-drill.log")).context("opening log file")?;

    let settings = store.load_settings();
    let mut profile = store.load_profile();
    if let Some(name) = args.name.filter(|n| !n.trim().is_empty()) {
        profile.name = name.trim().to_string();
        store.save_profile(&profile)?;
    }

    let catalog = load_catalog(&args.scenarios);
    info!(
        scenarios = catalog.len(),
        player = %profile.name,
        "Starting cyber-drill"
    );

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(store, catalog, settings, profile);
    let outcome = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    outcome?;
    if let Some(session) = app.session().filter(|s| s.is_finished() && !s.results().is_empty()) {
        println!("\nLast session score: {}. Stay safe out there.\n", session.score());
    }
    Ok(())
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    let mut dirty = true;
    loop {
        if dirty {
            terminal.draw(|f| draw_ui(f, app))?;
            dirty = false;
        }

        // Wake for the next countdown tick, otherwise idle on input
        let timeout = app
            .session()
            .and_then(|s| s.until_next_tick(Instant::now()))
            .map_or(IDLE_POLL, |d| d.min(IDLE_POLL));

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    app.handle_key(key, Instant::now());
                    dirty = true;
                }
                Event::Resize(_, _) => dirty = true,
                _ => {}
            }
        }

        if app.on_tick(Instant::now()) {
            dirty = true;
        }
        if app.should_quit() {
            break;
        }
    }
    Ok(())
}
