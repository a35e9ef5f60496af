/// Encounter statistics — distributions and win rate over a history.

use serde::{Deserialize, Serialize};

use crate::core::catalog::EnemyCatalog;
use crate::schema::encounter::{EncounterRecord, Outcome};
use crate::schema::enemy::{Element, Rarity};

/// One bucket of a distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Share<K> {
    pub key: K,
    pub count: usize,
    /// Percentage of the whole history, 0–100.
    pub percentage: f64,
}

/// Summary of an encounter history.
///
/// Distributions list buckets in order of first appearance; empty buckets
/// are omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterStats {
    pub total: usize,
    /// Victories as a percentage of all encounters, 0 for an empty history.
    pub win_rate: f64,
    pub last_chest: Option<u32>,
    pub elements: Vec<Share<Element>>,
    pub rarities: Vec<Share<Rarity>>,
    pub outcomes: Vec<Share<Outcome>>,
}

impl EncounterStats {
    /// Records whose enemy is missing from `catalog` are left out of the
    /// element and rarity distributions but still count toward the total.
    pub fn compute(history: &[EncounterRecord], catalog: &EnemyCatalog) -> Self {
        let total = history.len();

        let enemies = history.iter().filter_map(|r| catalog.get(&r.enemy_id));
        let elements = distribution(enemies.clone().map(|e| e.element), total);
        let rarities = distribution(enemies.map(|e| e.rarity), total);
        let outcomes = distribution(history.iter().map(|r| r.outcome), total);

        let victories = history
            .iter()
            .filter(|r| r.outcome == Outcome::Victory)
            .count();

        Self {
            total,
            win_rate: percentage(victories, total),
            last_chest: history.last().map(|r| r.chest_number),
            elements,
            rarities,
            outcomes,
        }
    }

    pub fn element_count(&self, element: Element) -> usize {
        lookup(&self.elements, element)
    }

    pub fn rarity_count(&self, rarity: Rarity) -> usize {
        lookup(&self.rarities, rarity)
    }

    pub fn outcome_count(&self, outcome: Outcome) -> usize {
        lookup(&self.outcomes, outcome)
    }
}

fn distribution<K: PartialEq>(keys: impl Iterator<Item = K>, total: usize) -> Vec<Share<K>> {
    let mut counts: Vec<(K, usize)> = Vec::new();
    for key in keys {
        match counts.iter_mut().find(|(k, _)| *k == key) {
            Some((_, count)) => *count += 1,
            None => counts.push((key, 1)),
        }
    }
    counts
        .into_iter()
        .map(|(key, count)| Share {
            key,
            count,
            percentage: percentage(count, total),
        })
        .collect()
}

fn lookup<K: PartialEq>(shares: &[Share<K>], key: K) -> usize {
    shares
        .iter()
        .find(|s| s.key == key)
        .map(|s| s.count)
        .unwrap_or(0)
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}
