//! User-tunable game configuration, persisted as `settings.json`.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn next(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };
        f.write_str(name)
    }
}

/// Scoring constants and presentation preferences. Every field falls back to
/// its default when absent from the stored file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub difficulty: Difficulty,
    pub timer_enabled: bool,
    pub round_seconds: u32,
    pub penalties_enabled: bool,
    pub hints_enabled: bool,
    pub sound_enabled: bool,
    pub high_contrast: bool,
    pub font_scale: u32,
    pub unsafe_penalty: i32,
    pub base_correct: i32,
    pub base_partial: i32,
    pub skip_penalty: i32,
    pub hint_cost: i32,
    pub appearance: String,
    pub accent: String,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Medium,
            timer_enabled: true,
            round_seconds: 45,
            penalties_enabled: true,
            hints_enabled: true,
            sound_enabled: false,
            high_contrast: false,
            font_scale: 100,
            unsafe_penalty: -25,
            base_correct: 100,
            base_partial: 50,
            skip_penalty: -10,
            hint_cost: -5,
            appearance: "Dark".to_string(),
            accent: "blue".to_string(),
        }
    }
}

pub const APPEARANCES: [&str; 2] = ["Dark", "Light"];
pub const ACCENTS: [&str; 3] = ["blue", "green", "dark-blue"];

impl GameSettings {
    pub fn is_light(&self) -> bool {
        self.appearance.eq_ignore_ascii_case("light")
    }

    pub fn cycle_appearance(&mut self) {
        self.appearance = cycle(&APPEARANCES, &self.appearance).to_string();
    }

    pub fn cycle_accent(&mut self) {
        self.accent = cycle(&ACCENTS, &self.accent).to_string();
    }
}

fn cycle<'a>(options: &[&'a str], current: &str) -> &'a str {
    let pos = options
        .iter()
        .position(|o| o.eq_ignore_ascii_case(current))
        .map(|p| (p + 1) % options.len())
        .unwrap_or(0);
    options[pos]
}
