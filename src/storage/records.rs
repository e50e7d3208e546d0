use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub const LEADERBOARD_CAP: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub name: String,
    pub best_score: i32,
    /// Serialized as a sorted, de-duplicated list.
    pub unlocked_badges: BTreeSet<String>,
    pub last_session: serde_json::Value,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: "Player".to_string(),
            best_score: 0,
            unlocked_badges: BTreeSet::new(),
            last_session: serde_json::Value::Object(serde_json::Map::new()),
        }
    }
}

impl Profile {
    /// Raises the high-water mark. Returns true on a new best.
    pub fn record_score(&mut self, score: i32) -> bool {
        if score > self.best_score {
            self.best_score = score;
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: i32,
    #[serde(rename = "ts")]
    pub timestamp: String,
}

/// Inserts, sorts by score descending and keeps the top entries. The sort is
/// stable, but tie order is not part of the contract.
pub fn insert_ranked(board: &mut Vec<LeaderboardEntry>, entry: LeaderboardEntry) {
    board.push(entry);
    board.sort_by(|a, b| b.score.cmp(&a.score));
    board.truncate(LEADERBOARD_CAP);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, score: i32) -> LeaderboardEntry {
        LeaderboardEntry {
            name: name.to_string(),
            score,
            timestamp: "2026-01-01 10:00".to_string(),
        }
    }

    #[test]
    fn ranking_is_descending_and_capped() {
        let mut board = Vec::new();
        for (i, score) in [30, 900, -20, 450, 120, 75, 600, 10, 0, 310, 880, 5].into_iter().enumerate() {
            insert_ranked(&mut board, entry(&format!("p{i}"), score));
        }
        assert_eq!(board.len(), LEADERBOARD_CAP);
        assert!(board.windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(board[0].score, 900);
        assert!(board.iter().all(|e| e.score > 0));
    }

    #[test]
    fn profile_badges_serialize_sorted() {
        let mut profile = Profile::default();
        profile.unlocked_badges.insert("Zero Trust".into());
        profile.unlocked_badges.insert("Fast Thinker".into());
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["unlocked_badges"], serde_json::json!(["Fast Thinker", "Zero Trust"]));
        assert_eq!(json["last_session"], serde_json::json!({}));
    }

    #[test]
    fn entry_timestamp_uses_short_key() {
        let json = serde_json::to_string(&entry("a", 1)).unwrap();
        assert!(json.contains(r#""ts":"2026-01-01 10:00""#));
    }

    #[test]
    fn best_score_is_a_high_water_mark() {
        let mut profile = Profile::default();
        assert!(profile.record_score(250));
        assert!(!profile.record_score(100));
        assert_eq!(profile.best_score, 250);
    }
}
