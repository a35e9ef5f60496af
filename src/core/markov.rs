/// First-order Markov transition table over enemy encounters.

use rustc_hash::FxHashMap;

use crate::schema::encounter::EncounterRecord;
use crate::schema::enemy::EnemyId;

/// Successor counts for a single enemy: next enemy → occurrences.
pub type TransitionRow = FxHashMap<EnemyId, u32>;

/// Counts of which enemy followed which, across a whole history.
///
/// A row only exists once at least one transition has been recorded into
/// it, so every stored count is positive and every row total is non-zero.
#[derive(Debug, Clone, Default)]
pub struct TransitionMatrix {
    rows: FxHashMap<EnemyId, TransitionRow>,
}

impl TransitionMatrix {
    /// Build the table from every adjacent pair of a chronological history.
    pub fn from_history(history: &[EncounterRecord]) -> Self {
        let mut matrix = Self::default();
        for pair in history.windows(2) {
            matrix.record(&pair[0].enemy_id, &pair[1].enemy_id);
        }
        tracing::trace!(
            rows = matrix.rows.len(),
            transitions = matrix.transition_count(),
            "transition matrix built"
        );
        matrix
    }

    /// Record one observed transition, incrementing its count.
    pub fn record(&mut self, from: &EnemyId, to: &EnemyId) {
        let row = self.rows.entry(from.clone()).or_default();
        *row.entry(to.clone()).or_insert(0) += 1;
    }

    /// Successor counts for `from`, or `None` if nothing ever followed it.
    pub fn row(&self, from: &EnemyId) -> Option<&TransitionRow> {
        self.rows.get(from)
    }

    /// Sum of all counts in the row for `from` (0 when there is no row).
    pub fn row_total(&self, from: &EnemyId) -> u32 {
        self.rows
            .get(from)
            .map(|row| row.values().sum())
            .unwrap_or(0)
    }

    /// Number of enemies with at least one recorded successor.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Total number of transitions recorded.
    pub fn transition_count(&self) -> u32 {
        self.rows.values().flat_map(|row| row.values()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::encounter::{EncounterId, Outcome};
    use chrono::Utc;

    fn count(matrix: &TransitionMatrix, from: &EnemyId, to: &EnemyId) -> u32 {
        matrix
            .row(from)
            .and_then(|row| row.get(to))
            .copied()
            .unwrap_or(0)
    }

    fn history(ids: &[&str]) -> Vec<EncounterRecord> {
        ids.iter()
            .enumerate()
            .map(|(i, id)| EncounterRecord {
                id: EncounterId(format!("e{i}")),
                chest_number: i as u32 + 1,
                enemy_id: EnemyId::from(*id),
                timestamp: Utc::now(),
                location: "Forest".to_string(),
                outcome: Outcome::Victory,
            })
            .collect()
    }

    #[test]
    fn empty_and_single_histories_have_no_rows() {
        assert!(TransitionMatrix::from_history(&[]).is_empty());
        assert!(TransitionMatrix::from_history(&history(&["a"])).is_empty());
    }

    #[test]
    fn counts_adjacent_pairs() {
        let matrix = TransitionMatrix::from_history(&history(&["a", "b", "a", "b", "a"]));
        let a = EnemyId::from("a");
        let b = EnemyId::from("b");

        assert_eq!(matrix.len(), 2);
        assert_eq!(count(&matrix, &a, &b), 2);
        assert_eq!(count(&matrix, &b, &a), 2);
        assert_eq!(count(&matrix, &a, &a), 0);
        assert_eq!(matrix.row_total(&a), 2);
        assert_eq!(matrix.transition_count(), 4);
    }

    #[test]
    fn last_enemy_without_successor_has_no_row() {
        let matrix = TransitionMatrix::from_history(&history(&["a", "a", "b"]));
        assert!(matrix.row(&EnemyId::from("b")).is_none());
        assert_eq!(matrix.row_total(&EnemyId::from("b")), 0);
        assert_eq!(count(&matrix, &EnemyId::from("a"), &EnemyId::from("a")), 1);
    }

    #[test]
    fn self_transitions_are_counted() {
        let matrix = TransitionMatrix::from_history(&history(&["a", "a", "a"]));
        let a = EnemyId::from("a");
        assert_eq!(count(&matrix, &a, &a), 2);
        assert_eq!(matrix.row(&a).map(|r| r.len()), Some(1));
    }

    #[test]
    fn every_stored_count_is_positive() {
        let matrix =
            TransitionMatrix::from_history(&history(&["a", "b", "c", "a", "c", "b", "b"]));
        for from in ["a", "b", "c"] {
            if let Some(row) = matrix.row(&EnemyId::from(from)) {
                assert!(row.values().all(|&c| c > 0));
            }
        }
    }
}
