use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::scenario::Scenario;

/// Picks up to `count` scenarios, preferring ids not in `seen`. When too few
/// unseen scenarios remain the whole pool is reshuffled, so repeats are
/// possible again.
pub fn select_scenarios<R: Rng + ?Sized>(
    pool: &[Scenario],
    count: usize,
    seen: &HashSet<String>,
    rng: &mut R,
) -> Vec<Scenario> {
    let mut deck: Vec<&Scenario> = pool.iter().filter(|s| !seen.contains(&s.id)).collect();
    deck.shuffle(rng);

    if deck.len() < count {
        debug!(unseen = deck.len(), count, "Unseen pool exhausted; reshuffling full catalog");
        deck = pool.iter().collect();
        deck.shuffle(rng);
    }

    deck.into_iter().take(count).cloned().collect()
}
