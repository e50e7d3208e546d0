//! Tracing setup.
//!
//! The terminal belongs to the UI, so log lines go to a file instead of
//! stderr. `LOG_LEVEL` sets the filter (default `info,cyber_drill=debug`),
//! `LOG_FORMAT=json` switches to JSON lines.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub fn init_tracing(log_path: &Path) -> std::io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(log_path)?;

    let filter = EnvFilter::try_from_env("LOG_LEVEL")
        .unwrap_or_else(|_| EnvFilter::new("info,cyber_drill=debug"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true);

    // A second init (tests, embedding) keeps the first subscriber
    let _ = match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => builder.json().try_init(),
        _ => builder.try_init(),
    };
    Ok(())
}
