use std::collections::{BTreeMap, HashMap};

use super::scoring::Outcome;
use super::session::RoundResult;

pub const UNKNOWN_CATEGORY: &str = "Other";
pub const NO_MISSES: &str = "None";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryScore {
    pub correct: usize,
    pub total: usize,
}

impl CategoryScore {
    /// Whole-number share of correct answers, 0 for an empty category.
    pub fn percent(&self) -> u64 {
        if self.total == 0 {
            0
        } else {
            (self.correct * 100 / self.total) as u64
        }
    }
}

pub fn per_category(
    results: &[RoundResult],
    categories: &HashMap<String, String>,
) -> BTreeMap<String, CategoryScore> {
    let mut acc: BTreeMap<String, CategoryScore> = BTreeMap::new();
    for r in results {
        let category = categories
            .get(&r.scenario_id)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_CATEGORY);
        let entry = acc.entry(category.to_string()).or_default();
        entry.total += 1;
        if r.outcome == Outcome::Correct {
            entry.correct += 1;
        }
    }
    acc
}

/// Scenario with the most unsafe answers; ties go to the one seen first.
pub fn most_missed(results: &[RoundResult]) -> String {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for r in results.iter().filter(|r| r.outcome == Outcome::Unsafe) {
        match counts.iter_mut().find(|(id, _)| *id == r.scenario_id) {
            Some((_, n)) => *n += 1,
            None => counts.push((r.scenario_id.as_str(), 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (id, n) in counts {
        if best.map_or(true, |(_, top)| n > top) {
            best = Some((id, n));
        }
    }
    best.map(|(id, _)| id.to_string())
        .unwrap_or_else(|| NO_MISSES.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: &str, outcome: Outcome) -> RoundResult {
        RoundResult {
            scenario_id: id.to_string(),
            selected_index: Some(0),
            time_taken: 5.0,
            gained: 0,
            outcome,
        }
    }

    #[test]
    fn per_category_counts_every_result() {
        let categories = HashMap::from([
            ("phish-1".to_string(), "Phishing".to_string()),
            ("pw-1".to_string(), "Passwords".to_string()),
        ]);
        let results = vec![
            result("phish-1", Outcome::Correct),
            result("phish-1", Outcome::Unsafe),
            result("pw-1", Outcome::Partial),
            result("ghost", Outcome::Correct),
        ];
        let stats = per_category(&results, &categories);
        assert_eq!(stats["Phishing"], CategoryScore { correct: 1, total: 2 });
        assert_eq!(stats["Passwords"], CategoryScore { correct: 0, total: 1 });
        assert_eq!(stats[UNKNOWN_CATEGORY], CategoryScore { correct: 1, total: 1 });
        assert_eq!(stats.values().map(|c| c.total).sum::<usize>(), results.len());
        assert_eq!(stats["Phishing"].percent(), 50);
    }

    #[test]
    fn most_missed_picks_highest_unsafe_count() {
        assert_eq!(most_missed(&[]), "None");
        let results = vec![
            result("phish-2", Outcome::Unsafe),
            result("phish-1", Outcome::Unsafe),
            result("phish-1", Outcome::Unsafe),
            result("phish-3", Outcome::Partial),
            result("phish-1", Outcome::Unsafe),
        ];
        assert_eq!(most_missed(&results), "phish-1");
    }

    #[test]
    fn most_missed_ties_go_to_first_seen() {
        let results = vec![
            result("b", Outcome::Unsafe),
            result("a", Outcome::Unsafe),
            result("c", Outcome::Correct),
        ];
        assert_eq!(most_missed(&results), "b");
        assert_eq!(most_missed(&[result("c", Outcome::Skipped)]), "None");
    }
}
