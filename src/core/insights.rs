/// Strategic insights — simple pattern checks over the encounter history.
///
/// Independent of the Markov model: each check looks at raw counts and
/// emits at most one insight.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::core::catalog::EnemyCatalog;
use crate::core::config::InsightConfig;
use crate::schema::encounter::EncounterRecord;
use crate::schema::enemy::Element;

/// An observation about the encounter history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Insight {
    /// Too few records to say anything; never combined with other insights.
    InsufficientData,
    /// One element makes up an outsized share of encounters.
    DominantElement(Element),
    /// Most of the recent encounters were above Common rarity.
    HighTierStreak,
    /// One location accounts for an outsized share of encounters.
    LocationHotspot(String),
}

impl fmt::Display for Insight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientData => {
                f.write_str("More data needed for accurate pattern analysis")
            }
            Self::DominantElement(element) => write!(
                f,
                "{element} element enemies appear frequently - prepare counters"
            ),
            Self::HighTierStreak => {
                f.write_str("High-tier enemy streak detected - legendary encounter likely")
            }
            Self::LocationHotspot(location) => {
                write!(f, "{location} shows concentrated enemy activity")
            }
        }
    }
}

/// Run every check in order: element, rarity streak, location.
pub fn analyze(
    history: &[EncounterRecord],
    catalog: &EnemyCatalog,
    config: &InsightConfig,
) -> Vec<Insight> {
    if history.len() < config.min_history {
        return vec![Insight::InsufficientData];
    }

    let mut insights = Vec::new();

    if let Some(element) = dominant_element(history, catalog, config.dominant_element_share) {
        insights.push(Insight::DominantElement(element));
    }

    if high_tier_streak(history, catalog, config.streak_window, config.streak_threshold) {
        insights.push(Insight::HighTierStreak);
    }

    if let Some(location) = location_hotspot(history, config.location_share) {
        insights.push(Insight::LocationHotspot(location.to_string()));
    }

    insights
}

/// The element with the strictly highest count, provided that count exceeds
/// `share` of the history. Elements are visited in order of first
/// appearance, so the earliest of several tied leaders wins.
pub fn dominant_element(
    history: &[EncounterRecord],
    catalog: &EnemyCatalog,
    share: f64,
) -> Option<Element> {
    let mut counts: Vec<(Element, usize)> = Vec::new();
    for record in history {
        let Some(enemy) = catalog.get(&record.enemy_id) else {
            debug!(enemy = %record.enemy_id, "skipping unknown enemy in element count");
            continue;
        };
        match counts.iter_mut().find(|(e, _)| *e == enemy.element) {
            Some((_, count)) => *count += 1,
            None => counts.push((enemy.element, 1)),
        }
    }

    let threshold = history.len() as f64 * share;
    let mut max_count = 0;
    let mut dominant = None;
    for (element, count) in counts {
        if count > max_count && count as f64 > threshold {
            max_count = count;
            dominant = Some(element);
        }
    }
    dominant
}

/// True when at least `threshold` of the last `window` records are above
/// Common rarity. Histories shorter than `window` never form a streak.
pub fn high_tier_streak(
    history: &[EncounterRecord],
    catalog: &EnemyCatalog,
    window: usize,
    threshold: usize,
) -> bool {
    if history.len() < window {
        return false;
    }

    let recent = &history[history.len() - window..];
    let high_tier = recent
        .iter()
        .filter_map(|record| catalog.get(&record.enemy_id))
        .filter(|enemy| enemy.rarity.is_high_tier())
        .count();

    high_tier >= threshold
}

/// The first location, by order of first appearance, whose count exceeds
/// `share` of the history.
pub fn location_hotspot(history: &[EncounterRecord], share: f64) -> Option<&str> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for record in history {
        match counts.iter_mut().find(|(l, _)| *l == record.location) {
            Some((_, count)) => *count += 1,
            None => counts.push((record.location.as_str(), 1)),
        }
    }

    let threshold = history.len() as f64 * share;
    counts
        .into_iter()
        .find(|&(_, count)| count as f64 > threshold)
        .map(|(location, _)| location)
}
