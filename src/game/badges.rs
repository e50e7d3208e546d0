use std::fmt;

use tracing::info;

use super::scoring::Outcome;
use super::session::RoundResult;
use crate::storage::Profile;

pub const PHISH_PREFIX: &str = "phish";
pub const PHISH_FRYER_THRESHOLD: usize = 5;
pub const FAST_THINKER_SECONDS: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Badge {
    PhishFryer,
    ZeroTrust,
    FastThinker,
}

impl Badge {
    pub const ALL: [Badge; 3] = [Badge::PhishFryer, Badge::ZeroTrust, Badge::FastThinker];

    pub fn name(self) -> &'static str {
        match self {
            Badge::PhishFryer => "Phish Fryer",
            Badge::ZeroTrust => "Zero Trust",
            Badge::FastThinker => "Fast Thinker",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Badge::PhishFryer => "Answer five phishing scenarios correctly in one session",
            Badge::ZeroTrust => "Finish a session without skipping",
            Badge::FastThinker => "Average under ten seconds per round",
        }
    }

    fn earned(self, results: &[RoundResult]) -> bool {
        match self {
            Badge::PhishFryer => {
                results
                    .iter()
                    .filter(|r| r.outcome == Outcome::Correct && r.scenario_id.starts_with(PHISH_PREFIX))
                    .count()
                    >= PHISH_FRYER_THRESHOLD
            }
            Badge::ZeroTrust => results.iter().all(|r| r.outcome != Outcome::Skipped),
            Badge::FastThinker => {
                !results.is_empty()
                    && results.iter().map(|r| r.time_taken).sum::<f64>() / (results.len() as f64)
                        < FAST_THINKER_SECONDS
            }
        }
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Badges earned by one session's results.
pub fn evaluate_badges(results: &[RoundResult]) -> Vec<Badge> {
    Badge::ALL.into_iter().filter(|b| b.earned(results)).collect()
}

/// Merges earned badges into the profile; never removes one. Returns the
/// badges that were not unlocked before.
pub fn unlock_badges(profile: &mut Profile, results: &[RoundResult]) -> Vec<Badge> {
    let mut fresh = Vec::new();
    for badge in evaluate_badges(results) {
        if profile.unlocked_badges.insert(badge.name().to_string()) {
            info!(badge = badge.name(), "Badge unlocked");
            fresh.push(badge);
        }
    }
    fresh
}
