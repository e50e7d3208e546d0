use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::settings::Difficulty;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub label: String,
    /// Scoring override; zero counts as unset.
    #[serde(default)]
    pub weight: Option<i32>,
}

impl Choice {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            weight: None,
        }
    }

    pub fn weighted(label: impl Into<String>, weight: i32) -> Self {
        Self {
            label: label.into(),
            weight: Some(weight),
        }
    }

    pub fn effective_weight(&self) -> Option<i32> {
        self.weight.filter(|w| *w != 0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub title: String,
    pub category: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub narrative: String,
    pub choices: Vec<Choice>,
    pub correct_indexes: BTreeSet<usize>,
    #[serde(default)]
    pub partial_indexes: BTreeSet<usize>,
    #[serde(default)]
    pub unsafe_penalty: Option<i32>,
    #[serde(default)]
    pub hint: String,
    #[serde(default)]
    pub feedback_why: String,
    #[serde(default)]
    pub pro_tip: String,
    #[serde(default)]
    pub references: Vec<String>,
}

impl Scenario {
    /// Structural problems that keep this scenario out of the playable pool.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.title.trim().is_empty() || self.choices.is_empty() {
            errors.push(format!("{}: missing title/choices", self.id));
        }
        if self.correct_indexes.is_empty() {
            errors.push(format!("{}: missing correct indexes", self.id));
        }
        let n = self.choices.len();
        for ix in self.correct_indexes.iter().chain(self.partial_indexes.iter()) {
            if *ix >= n {
                errors.push(format!("{}: bad index {}", self.id, ix));
            }
        }
        errors
    }

    pub fn is_playable(&self) -> bool {
        self.validate().is_empty()
    }

    pub fn is_correct(&self, index: usize) -> bool {
        self.correct_indexes.contains(&index)
    }

    pub fn is_partial(&self, index: usize) -> bool {
        self.partial_indexes.contains(&index)
    }

    pub fn effective_unsafe_penalty(&self) -> Option<i32> {
        self.unsafe_penalty.filter(|p| *p != 0)
    }
}

#[cfg(test)]
pub(crate) fn sample(id: &str, category: &str) -> Scenario {
    Scenario {
        id: id.to_string(),
        title: format!("Scenario {id}"),
        category: category.to_string(),
        difficulty: Difficulty::Easy,
        narrative: "An unexpected message arrives.".to_string(),
        choices: vec![Choice::new("a"), Choice::new("b"), Choice::new("c")],
        correct_indexes: BTreeSet::from([1]),
        partial_indexes: BTreeSet::from([2]),
        unsafe_penalty: Some(-25),
        hint: "Check the sender.".to_string(),
        feedback_why: "Verify out of band.".to_string(),
        pro_tip: "Report suspicious mail.".to_string(),
        references: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_is_playable() {
        assert!(sample("phish-1", "Phishing").is_playable());
    }

    #[test]
    fn out_of_range_partial_index_is_rejected() {
        let mut s = sample("phish-1", "Phishing");
        s.partial_indexes.insert(7);
        let errors = s.validate();
        assert_eq!(errors, vec!["phish-1: bad index 7".to_string()]);
    }

    #[test]
    fn empty_choices_and_answers_are_rejected() {
        let mut s = sample("x", "Other");
        s.choices.clear();
        s.correct_indexes.clear();
        s.partial_indexes.clear();
        assert_eq!(s.validate().len(), 2);
    }

    #[test]
    fn blank_title_is_rejected() {
        let mut s = sample("x", "Other");
        s.title = "  ".into();
        assert!(!s.is_playable());
    }

    #[test]
    fn zero_weight_counts_as_unset() {
        assert_eq!(Choice::weighted("a", 0).effective_weight(), None);
        assert_eq!(Choice::weighted("a", 40).effective_weight(), Some(40));
    }
}
