use std::fmt;

use serde::{Deserialize, Serialize};

use crate::scenario::Scenario;
use crate::settings::{Difficulty, GameSettings};

pub const MAX_TIME_BONUS: i32 = 20;
pub const STREAK_BONUS: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Correct,
    Partial,
    Unsafe,
    Skipped,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Outcome::Correct => "Correct",
            Outcome::Partial => "Partial",
            Outcome::Unsafe => "Unsafe",
            Outcome::Skipped => "Skipped",
        };
        f.write_str(name)
    }
}

/// Round length after the difficulty adjustment.
pub fn pick_round_seconds(settings: &GameSettings) -> u32 {
    let base = settings.round_seconds;
    match settings.difficulty {
        Difficulty::Easy => base.saturating_add(10),
        Difficulty::Hard => base.saturating_sub(10).max(20),
        Difficulty::Medium => base,
    }
}

/// Points and outcome for one answer. `selected` must be a valid choice
/// index or `None` for a skip; `streak` is the value before this round.
pub fn compute_score(
    settings: &GameSettings,
    scenario: &Scenario,
    selected: Option<usize>,
    remaining_seconds: u32,
    streak: u32,
) -> (i32, Outcome) {
    let Some(index) = selected else {
        let points = if settings.penalties_enabled {
            settings.skip_penalty
        } else {
            0
        };
        return (points, Outcome::Skipped);
    };

    let weight = scenario.choices.get(index).and_then(|c| c.effective_weight());

    if scenario.is_correct(index) {
        let base = weight.unwrap_or(settings.base_correct);
        return (
            base.saturating_add(time_bonus(settings, remaining_seconds))
                .saturating_add(streak_bonus(streak)),
            Outcome::Correct,
        );
    }

    if scenario.is_partial(index) {
        return (weight.unwrap_or(settings.base_partial), Outcome::Partial);
    }

    let penalty = if settings.penalties_enabled {
        scenario
            .effective_unsafe_penalty()
            .unwrap_or(settings.unsafe_penalty)
    } else {
        0
    };
    (penalty, Outcome::Unsafe)
}

fn time_bonus(settings: &GameSettings, remaining_seconds: u32) -> i32 {
    if !settings.timer_enabled {
        return 0;
    }
    let bonus = i32::try_from(remaining_seconds / 3).unwrap_or(MAX_TIME_BONUS);
    bonus.clamp(0, MAX_TIME_BONUS)
}

fn streak_bonus(streak: u32) -> i32 {
    if streak > 0 && streak % 2 == 0 {
        STREAK_BONUS
    } else {
        0
    }
}
