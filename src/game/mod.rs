pub mod analytics;
pub mod badges;
pub mod report;
pub mod scoring;
pub mod select;
pub mod session;
pub mod timer;

pub use analytics::{most_missed, per_category, CategoryScore};
pub use badges::{evaluate_badges, unlock_badges, Badge};
pub use report::{lessons_learned, render_report};
pub use scoring::{compute_score, pick_round_seconds, Outcome};
pub use select::select_scenarios;
pub use session::{Phase, RoundResult, Session, SessionError, SessionSummary, ROUNDS_TOTAL};
pub use timer::RoundTimer;
