//! Local JSON persistence for settings, profile and leaderboard, plus the
//! feedback log and saved session reports.
//!
//! Loads never fail: a missing file is created with defaults, and an
//! unparsable one is archived under `backups/` before being reset.

mod json;
pub mod records;

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::settings::GameSettings;

pub use records::{insert_ranked, LeaderboardEntry, Profile, LEADERBOARD_CAP};

const SETTINGS_FILE: &str = "settings.json";
const PROFILE_FILE: &str = "profile.json";
const LEADERBOARD_FILE: &str = "leaderboard.json";
const FEEDBACK_FILE: &str = "feedback.csv";
const FEEDBACK_HEADER: &str = "timestamp,player,scenario_id,message\n";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct DataStore {
    root: PathBuf,
}

impl DataStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn backups_dir(&self) -> PathBuf {
        self.root.join("backups")
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.root.join("reports")
    }

    pub fn settings_path(&self) -> PathBuf {
        self.root.join(SETTINGS_FILE)
    }

    pub fn profile_path(&self) -> PathBuf {
        self.root.join(PROFILE_FILE)
    }

    pub fn leaderboard_path(&self) -> PathBuf {
        self.root.join(LEADERBOARD_FILE)
    }

    pub fn feedback_path(&self) -> PathBuf {
        self.root.join(FEEDBACK_FILE)
    }

    /// Creates the data layout and the feedback log header.
    pub fn ensure_dirs(&self) -> Result<(), StorageError> {
        for dir in [self.root.clone(), self.backups_dir(), self.reports_dir()] {
            std::fs::create_dir_all(dir)?;
        }
        let feedback = self.feedback_path();
        if !feedback.exists() {
            std::fs::write(&feedback, FEEDBACK_HEADER)?;
        }
        Ok(())
    }

    pub fn load_settings(&self) -> GameSettings {
        json::load_or_recover(&self.settings_path(), &self.backups_dir(), GameSettings::default)
    }

    pub fn save_settings(&self, settings: &GameSettings) -> Result<(), StorageError> {
        json::save_json(&self.settings_path(), settings)?;
        debug!(difficulty = %settings.difficulty, "Saved settings");
        Ok(())
    }

    pub fn load_profile(&self) -> Profile {
        json::load_or_recover(&self.profile_path(), &self.backups_dir(), Profile::default)
    }

    pub fn save_profile(&self, profile: &Profile) -> Result<(), StorageError> {
        json::save_json(&self.profile_path(), profile)?;
        debug!(name = %profile.name, best = profile.best_score, "Saved profile");
        Ok(())
    }

    pub fn get_leaderboard(&self) -> Vec<LeaderboardEntry> {
        json::load_or_recover(&self.leaderboard_path(), &self.backups_dir(), Vec::new)
    }

    /// Adds a score stamped with local time and keeps the top ten.
    pub fn append_leaderboard(&self, name: &str, score: i32) -> Result<Vec<LeaderboardEntry>, StorageError> {
        let mut board = self.get_leaderboard();
        insert_ranked(
            &mut board,
            LeaderboardEntry {
                name: name.to_string(),
                score,
                timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M").to_string(),
            },
        );
        json::save_json(&self.leaderboard_path(), &board)?;
        info!(%name, score, entries = board.len(), "Updated leaderboard");
        Ok(board)
    }

    pub fn log_feedback(&self, player: &str, scenario_id: &str, message: &str) -> Result<(), StorageError> {
        let path = self.feedback_path();
        let needs_header = !path.exists();
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        if needs_header {
            file.write_all(FEEDBACK_HEADER.as_bytes())?;
        }
        let line = format!(
            "{},{},{},{}\n",
            chrono::Utc::now().timestamp(),
            sanitize_field(player),
            sanitize_field(scenario_id),
            sanitize_field(message)
        );
        file.write_all(line.as_bytes())?;
        info!(%player, %scenario_id, "Logged feedback");
        Ok(())
    }

    /// Writes a Markdown report to `reports/summary-<ts>.md`. Reports from the
    /// same second get a `-N` suffix instead of replacing each other.
    pub fn save_report(&self, markdown: &str) -> Result<PathBuf, StorageError> {
        let dir = self.reports_dir();
        std::fs::create_dir_all(&dir)?;
        let path = json::unused_path(&dir, "summary", "md");
        json::write_atomic(&path, markdown.as_bytes())?;
        info!(path = %path.display(), "Saved session report");
        Ok(path)
    }
}

/// Keeps a free-text value on one CSV field.
pub fn sanitize_field(text: &str) -> String {
    text.trim()
        .chars()
        .map(|c| match c {
            ',' => ';',
            '\r' | '\n' => ' ',
            other => other,
        })
        .collect()
}
