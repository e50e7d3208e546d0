use std::collections::HashSet;
use std::path::Path;

use cyber_drill::game::badges::{PHISH_FRYER_THRESHOLD, PHISH_PREFIX};
use cyber_drill::load_catalog;

fn shipped() -> cyber_drill::Catalog {
    load_catalog(&Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios"))
}

#[test]
fn shipped_catalog_is_fully_playable() {
    let catalog = shipped();
    assert_eq!(catalog.rejected(), 0);
    assert!(catalog.len() >= cyber_drill::ROUNDS_TOTAL);

    let ids: HashSet<_> = catalog.scenarios().iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids.len(), catalog.len());
}

#[test]
fn shipped_catalog_can_earn_phish_fryer() {
    let phishing = shipped()
        .scenarios()
        .iter()
        .filter(|s| s.id.starts_with(PHISH_PREFIX))
        .count();
    assert!(phishing >= PHISH_FRYER_THRESHOLD);
}

#[test]
fn every_scenario_teaches_something() {
    for scenario in shipped().scenarios() {
        assert!(!scenario.feedback_why.is_empty(), "{} lacks feedback", scenario.id);
        assert!(!scenario.pro_tip.is_empty(), "{} lacks a pro tip", scenario.id);
    }
}
