//! Cyber Training Simulator core
//!
//! Scenario-based security drills: scoring, session flow, badges, analytics
//! and local JSON persistence. Rendering lives in the `cyber-drill` binary;
//! nothing here depends on it.

pub mod game;
pub mod scenario;
pub mod settings;
pub mod storage;
pub mod telemetry;

pub use game::{
    compute_score, evaluate_badges, most_missed, per_category, pick_round_seconds,
    select_scenarios, unlock_badges, Badge, CategoryScore, Outcome, Phase, RoundResult, Session,
    SessionError, SessionSummary, ROUNDS_TOTAL,
};
pub use scenario::{load_catalog, Catalog, Choice, Scenario};
pub use settings::{Difficulty, GameSettings};
pub use storage::{DataStore, LeaderboardEntry, Profile, StorageError};
