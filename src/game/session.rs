use std::collections::{BTreeMap, HashSet};
use std::time::{Duration, Instant};

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use super::analytics::{most_missed, per_category, CategoryScore};
use super::badges::{unlock_badges, Badge};
use super::report::lessons_learned;
use super::scoring::{compute_score, pick_round_seconds, Outcome};
use super::select::select_scenarios;
use super::timer::RoundTimer;
use crate::scenario::Scenario;
use crate::settings::GameSettings;
use crate::storage::{DataStore, Profile, StorageError};

pub const ROUNDS_TOTAL: usize = 10;
pub const SUMMARY_LESSONS: usize = 3;
const FALLBACK_HINT: &str = "Use policy + least privilege.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    pub scenario_id: String,
    /// `None` when the round was skipped.
    pub selected_index: Option<usize>,
    pub time_taken: f64,
    pub gained: i32,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    InRound(usize),
    RoundSubmitted(usize),
    Finished,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session has already started")]
    AlreadyStarted,
    #[error("no round is in progress")]
    NotInRound,
    #[error("the current round has not been answered yet")]
    NotSubmitted,
    #[error("choice {index} does not exist ({len} choices)")]
    InvalidChoice { index: usize, len: usize },
    #[error("hints are disabled in settings")]
    HintsDisabled,
}

/// What the end-of-session pass produced.
#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub score: i32,
    pub rounds: usize,
    pub new_best: bool,
    pub new_badges: Vec<Badge>,
    pub categories: BTreeMap<String, CategoryScore>,
    pub most_missed: String,
    pub lessons: Vec<String>,
}

#[derive(Debug, Serialize)]
struct SessionSnapshot {
    score: i32,
    rounds: usize,
    correct: usize,
    partial: usize,
    #[serde(rename = "unsafe")]
    unsafe_: usize,
    skipped: usize,
    finished_at: String,
}

/// One fixed-length game from first round to summary.
#[derive(Debug, Clone)]
pub struct Session {
    rounds_total: usize,
    current_index: usize,
    score: i32,
    streak: u32,
    results: Vec<RoundResult>,
    seen_ids: HashSet<String>,
    deck: Vec<Scenario>,
    phase: Phase,
    round_seconds: u32,
    timer: RoundTimer,
    hints_used: u32,
    finalized: bool,
}

impl Session {
    /// `seen_ids` carries over from earlier sessions to steer selection away
    /// from repeats.
    pub fn new(seen_ids: HashSet<String>) -> Self {
        Self {
            rounds_total: ROUNDS_TOTAL,
            current_index: 0,
            score: 0,
            streak: 0,
            results: Vec::new(),
            seen_ids,
            deck: Vec::new(),
            phase: Phase::NotStarted,
            round_seconds: 0,
            timer: RoundTimer::default(),
            hints_used: 0,
            finalized: false,
        }
    }

    /// Deals the deck and opens the first round. An empty pool finishes the
    /// session immediately.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        settings: &GameSettings,
        pool: &[Scenario],
        rng: &mut R,
        now: Instant,
    ) -> Result<(), SessionError> {
        if self.phase != Phase::NotStarted {
            return Err(SessionError::AlreadyStarted);
        }
        self.deck = select_scenarios(pool, ROUNDS_TOTAL, &self.seen_ids, rng);
        self.seen_ids.extend(self.deck.iter().map(|s| s.id.clone()));
        self.rounds_total = self.deck.len();
        self.round_seconds = pick_round_seconds(settings);

        info!(
            rounds = self.rounds_total,
            round_seconds = self.round_seconds,
            difficulty = %settings.difficulty,
            "Session started"
        );

        if self.deck.is_empty() {
            self.phase = Phase::Finished;
        } else {
            self.enter_round(0, settings.timer_enabled, now);
        }
        Ok(())
    }

    fn enter_round(&mut self, index: usize, countdown: bool, now: Instant) {
        self.current_index = index;
        self.phase = Phase::InRound(index);
        self.timer.arm(self.round_seconds, countdown, now);
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn rounds_total(&self) -> usize {
        self.rounds_total
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn hints_used(&self) -> u32 {
        self.hints_used
    }

    pub fn results(&self) -> &[RoundResult] {
        &self.results
    }

    pub fn last_result(&self) -> Option<&RoundResult> {
        self.results.last()
    }

    pub fn seen_ids(&self) -> &HashSet<String> {
        &self.seen_ids
    }

    pub fn deck(&self) -> &[Scenario] {
        &self.deck
    }

    pub fn round_seconds(&self) -> u32 {
        self.round_seconds
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.timer.remaining()
    }

    pub fn countdown_enabled(&self) -> bool {
        self.timer.countdown()
    }

    pub fn until_next_tick(&self, now: Instant) -> Option<Duration> {
        self.timer.until_next_tick(now)
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    /// True when there is an unfinished game worth returning to.
    pub fn is_resumable(&self) -> bool {
        matches!(self.phase, Phase::InRound(_) | Phase::RoundSubmitted(_))
    }

    pub fn current_scenario(&self) -> Option<&Scenario> {
        match self.phase {
            Phase::InRound(i) | Phase::RoundSubmitted(i) => self.deck.get(i),
            Phase::NotStarted | Phase::Finished => None,
        }
    }

    pub fn progress_fraction(&self) -> f64 {
        (self.current_index as f64 / self.rounds_total.max(1) as f64).min(1.0)
    }

    /// Delivers due timer ticks. Returns true if the display should refresh.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.phase {
            Phase::InRound(_) => self.timer.poll(now),
            _ => false,
        }
    }

    pub fn submit(&mut self, settings: &GameSettings, index: usize, now: Instant) -> Result<&RoundResult, SessionError> {
        let Phase::InRound(i) = self.phase else {
            return Err(SessionError::NotInRound);
        };
        let len = self.deck[i].choices.len();
        if index >= len {
            return Err(SessionError::InvalidChoice { index, len });
        }
        Ok(self.resolve(settings, Some(index), now))
    }

    pub fn skip(&mut self, settings: &GameSettings, now: Instant) -> Result<&RoundResult, SessionError> {
        if !matches!(self.phase, Phase::InRound(_)) {
            return Err(SessionError::NotInRound);
        }
        Ok(self.resolve(settings, None, now))
    }

    fn resolve(&mut self, settings: &GameSettings, selected: Option<usize>, now: Instant) -> &RoundResult {
        let i = self.current_index;
        self.timer.poll(now);
        self.timer.cancel();

        let scenario = &self.deck[i];
        let (gained, outcome) = compute_score(settings, scenario, selected, self.timer.remaining(), self.streak);

        self.score = self.score.saturating_add(gained);
        self.streak = if outcome == Outcome::Correct { self.streak.saturating_add(1) } else { 0 };
        self.phase = Phase::RoundSubmitted(i);

        debug!(
            round = i + 1,
            scenario = %scenario.id,
            ?selected,
            %outcome,
            gained,
            score = self.score,
            streak = self.streak,
            "Round resolved"
        );

        self.results.push(RoundResult {
            scenario_id: scenario.id.clone(),
            selected_index: selected,
            time_taken: f64::from(self.timer.elapsed()),
            gained,
            outcome,
        });
        &self.results[self.results.len() - 1]
    }

    /// Charges the hint cost and returns the hint for the current round.
    pub fn use_hint(&mut self, settings: &GameSettings) -> Result<String, SessionError> {
        let Phase::InRound(i) = self.phase else {
            return Err(SessionError::NotInRound);
        };
        if !settings.hints_enabled {
            return Err(SessionError::HintsDisabled);
        }
        self.score = self.score.saturating_add(settings.hint_cost);
        self.hints_used += 1;
        let hint = &self.deck[i].hint;
        debug!(round = i + 1, cost = settings.hint_cost, "Hint used");
        Ok(if hint.trim().is_empty() {
            FALLBACK_HINT.to_string()
        } else {
            hint.clone()
        })
    }

    /// Moves past an answered round.
    pub fn advance(&mut self, settings: &GameSettings, now: Instant) -> Result<Phase, SessionError> {
        let Phase::RoundSubmitted(i) = self.phase else {
            return Err(match self.phase {
                Phase::InRound(_) => SessionError::NotSubmitted,
                _ => SessionError::NotInRound,
            });
        };
        if i + 1 >= self.rounds_total {
            self.current_index = self.rounds_total;
            self.phase = Phase::Finished;
            info!(score = self.score, rounds = self.results.len(), "Session finished");
        } else {
            self.enter_round(i + 1, settings.timer_enabled, now);
        }
        Ok(self.phase)
    }

    /// End-of-session pass: badges, best score, profile and leaderboard.
    /// Returns `None` for sessions without rounds and once the pass has
    /// succeeded. `profile` only changes when both writes go through, so a
    /// failed pass can be retried.
    pub fn finish(&mut self, profile: &mut Profile, store: &DataStore) -> Result<Option<SessionSummary>, StorageError> {
        if self.phase != Phase::Finished || self.finalized || self.results.is_empty() {
            return Ok(None);
        }

        let mut updated = profile.clone();
        let mut summary = self.summary();
        summary.new_badges = unlock_badges(&mut updated, &self.results);
        summary.new_best = updated.record_score(self.score);
        updated.last_session = serde_json::to_value(self.snapshot())?;

        store.save_profile(&updated)?;
        store.append_leaderboard(&updated.name, self.score)?;

        *profile = updated;
        self.finalized = true;
        Ok(Some(summary))
    }

    /// Score and analytics for the rounds played, without touching the
    /// profile or the store.
    pub fn summary(&self) -> SessionSummary {
        let categories = self
            .deck
            .iter()
            .map(|s| (s.id.clone(), s.category.clone()))
            .collect();

        SessionSummary {
            score: self.score,
            rounds: self.results.len(),
            new_best: false,
            new_badges: Vec::new(),
            categories: per_category(&self.results, &categories),
            most_missed: most_missed(&self.results),
            lessons: lessons_learned(&self.results, &self.deck, SUMMARY_LESSONS),
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        let count = |o: Outcome| self.results.iter().filter(|r| r.outcome == o).count();
        SessionSnapshot {
            score: self.score,
            rounds: self.results.len(),
            correct: count(Outcome::Correct),
            partial: count(Outcome::Partial),
            unsafe_: count(Outcome::Unsafe),
            skipped: count(Outcome::Skipped),
            finished_at: chrono::Local::now().to_rfc3339(),
        }
    }
}
