use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use super::types::Scenario;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("bad catalog pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    scenario: Vec<toml::Value>,
}

/// Validated scenarios available for play.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    scenarios: Vec<Scenario>,
    rejected: usize,
}

impl Catalog {
    /// Keeps only playable scenarios with a not-yet-seen id.
    pub fn from_scenarios(candidates: impl IntoIterator<Item = Scenario>) -> Self {
        let mut scenarios = Vec::new();
        let mut ids = HashSet::new();
        let mut rejected = 0;
        for scenario in candidates {
            let errors = scenario.validate();
            if !errors.is_empty() {
                warn!(id = %scenario.id, ?errors, "Excluding invalid scenario");
                rejected += 1;
            } else if !ids.insert(scenario.id.clone()) {
                warn!(id = %scenario.id, "Excluding duplicate scenario id");
                rejected += 1;
            } else {
                scenarios.push(scenario);
            }
        }
        Self {
            scenarios,
            rejected,
        }
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn rejected(&self) -> usize {
        self.rejected
    }

    pub fn get(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id == id)
    }

    pub fn categories(&self) -> HashMap<String, String> {
        self.scenarios
            .iter()
            .map(|s| (s.id.clone(), s.category.clone()))
            .collect()
    }
}

/// Entries read from one catalog file.
#[derive(Debug, Default)]
pub struct ScenarioFile {
    pub scenarios: Vec<Scenario>,
    /// Entries that did not deserialize.
    pub malformed: usize,
}

/// Reads one catalog file. Entries that do not deserialize are skipped so a
/// single bad record cannot hide the rest of the file.
pub fn load_scenario_file(path: &Path) -> Result<ScenarioFile, CatalogError> {
    let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file: CatalogFile = toml::from_str(&content).map_err(|source| CatalogError::Toml {
        path: path.to_path_buf(),
        source,
    })?;

    let mut parsed = ScenarioFile {
        scenarios: Vec::with_capacity(file.scenario.len()),
        malformed: 0,
    };
    for (position, value) in file.scenario.into_iter().enumerate() {
        match value.try_into::<Scenario>() {
            Ok(scenario) => parsed.scenarios.push(scenario),
            Err(e) => {
                warn!(path = %path.display(), position, error = %e, "Skipping malformed scenario entry");
                parsed.malformed += 1;
            }
        }
    }
    Ok(parsed)
}

/// Loads every `*.toml` file in `dir`. Failures never propagate: unreadable
/// files are logged and contribute nothing, so the pool may be empty.
pub fn load_catalog(dir: &Path) -> Catalog {
    match collect_candidates(dir) {
        Ok(parsed) => {
            let mut catalog = Catalog::from_scenarios(parsed.scenarios);
            catalog.rejected += parsed.malformed;
            info!(
                dir = %dir.display(),
                playable = catalog.len(),
                rejected = catalog.rejected(),
                "Loaded scenario catalog"
            );
            catalog
        }
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "Scenario catalog unavailable");
            Catalog::default()
        }
    }
}

fn collect_candidates(dir: &Path) -> Result<ScenarioFile, CatalogError> {
    let pattern = dir.join("*.toml");
    let mut paths: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())?
        .filter_map(|e| e.ok())
        .collect();

    // Filename order keeps the catalog stable between runs
    paths.sort();

    let mut candidates = ScenarioFile::default();
    for path in paths {
        match load_scenario_file(&path) {
            Ok(mut file) => {
                candidates.scenarios.append(&mut file.scenarios);
                candidates.malformed += file.malformed;
            }
            Err(e) => warn!(error = %e, "Skipping catalog file"),
        }
    }
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::types::sample;
    use tempfile::TempDir;

    const GOOD: &str = r#"
[[scenario]]
id = "phish-1"
title = "Urgent invoice"
category = "Phishing"
difficulty = "easy"
narrative = "Finance forwards an invoice from an unknown sender."
correct_indexes = [1]
partial_indexes = [2]
choices = [
  { label = "Open the attachment" },
  { label = "Report it", weight = 120 },
  { label = "Reply asking who they are" },
]

[[scenario]]
id = "broken"
title = "Bad indexes"
category = "Phishing"
narrative = "..."
correct_indexes = [5]
choices = [{ label = "only" }]

[[scenario]]
id = "negative"
title = "Negative index"
category = "Phishing"
narrative = "..."
correct_indexes = [-1]
choices = [{ label = "only" }]
"#;

    #[test]
    fn malformed_entries_are_skipped_per_record() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("phishing.toml");
        std::fs::write(&path, GOOD).unwrap();

        let loaded = load_scenario_file(&path).unwrap();
        assert_eq!(loaded.scenarios.len(), 2);
        assert_eq!(loaded.malformed, 1);
        assert_eq!(loaded.scenarios[0].choices[1].weight, Some(120));
    }

    #[test]
    fn catalog_excludes_invalid_scenarios() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.toml"), GOOD).unwrap();
        std::fs::write(dir.path().join("b.toml"), "not [valid toml").unwrap();

        let catalog = load_catalog(dir.path());
        assert_eq!(catalog.len(), 1);
        // "broken" fails validation, "negative" fails to deserialize
        assert_eq!(catalog.rejected(), 2);
        assert!(catalog.get("phish-1").is_some());
        assert!(catalog.get("broken").is_none());
    }

    #[test]
    fn missing_directory_yields_empty_pool() {
        let dir = TempDir::new().unwrap();
        let catalog = load_catalog(&dir.path().join("nowhere"));
        assert!(catalog.is_empty());
    }

    #[test]
    fn duplicate_ids_keep_the_first() {
        let mut second = sample("phish-1", "Malware");
        second.title = "Second".into();
        let catalog = Catalog::from_scenarios(vec![sample("phish-1", "Phishing"), second]);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.scenarios()[0].category, "Phishing");
        assert_eq!(catalog.categories().get("phish-1").map(String::as_str), Some("Phishing"));
    }
}
