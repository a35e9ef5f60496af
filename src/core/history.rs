/// Encounter log — the session that owns the history and persists it.

use chrono::{DateTime, Utc};
use rand::Rng;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::core::catalog::EnemyCatalog;
use crate::schema::encounter::{EncounterId, EncounterRecord, NewEncounter};
use crate::schema::enemy::EnemyId;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("RON serialization error: {0}")]
    RonSerialize(#[from] ron::Error),
    #[error("unknown enemy: {0}")]
    UnknownEnemy(EnemyId),
    #[error("encounter not found: {0}")]
    NotFound(EncounterId),
    #[error("duplicate encounter id: {0}")]
    DuplicateId(EncounterId),
}

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 9;

/// A named, chronologically ordered list of encounter records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncounterLog {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    #[serde(default)]
    encounters: Vec<EncounterRecord>,
}

impl EncounterLog {
    pub fn new(name: &str) -> Self {
        let now = Utc::now();
        Self {
            name: name.to_string(),
            created_at: now,
            last_modified: now,
            encounters: Vec::new(),
        }
    }

    /// Records, oldest first.
    pub fn encounters(&self) -> &[EncounterRecord] {
        &self.encounters
    }

    pub fn len(&self) -> usize {
        self.encounters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encounters.is_empty()
    }

    pub fn get(&self, id: &EncounterId) -> Option<&EncounterRecord> {
        self.encounters.iter().find(|r| &r.id == id)
    }

    /// Suggested chest number for the next record: one past the last.
    pub fn next_chest_number(&self) -> u32 {
        self.encounters
            .last()
            .map(|r| r.chest_number.saturating_add(1))
            .unwrap_or(1)
    }

    /// Append a new encounter, assigning it a fresh ID.
    ///
    /// The enemy must exist in `catalog`. Chest numbers are taken as given.
    pub fn add<R: Rng + ?Sized>(
        &mut self,
        encounter: NewEncounter,
        catalog: &EnemyCatalog,
        rng: &mut R,
    ) -> Result<&EncounterRecord, HistoryError> {
        if !catalog.contains(&encounter.enemy_id) {
            return Err(HistoryError::UnknownEnemy(encounter.enemy_id));
        }

        let now = Utc::now();
        let id = self.fresh_id(now, rng);
        debug!(id = %id, enemy = %encounter.enemy_id, chest = encounter.chest_number, "encounter logged");

        self.encounters.push(encounter.into_record(id));
        self.last_modified = now;
        let index = self.encounters.len() - 1;
        Ok(&self.encounters[index])
    }

    /// Remove a record by ID, returning it.
    pub fn remove(&mut self, id: &EncounterId) -> Result<EncounterRecord, HistoryError> {
        let pos = self
            .encounters
            .iter()
            .position(|r| &r.id == id)
            .ok_or_else(|| HistoryError::NotFound(id.clone()))?;
        self.last_modified = Utc::now();
        debug!(id = %id, "encounter removed");
        Ok(self.encounters.remove(pos))
    }

    /// Records whose enemy is missing from `catalog`.
    pub fn dangling<'a>(&'a self, catalog: &EnemyCatalog) -> Vec<&'a EncounterRecord> {
        self.encounters
            .iter()
            .filter(|r| !catalog.contains(&r.enemy_id))
            .collect()
    }

    /// Millisecond timestamp followed by nine random base-36 characters.
    fn fresh_id<R: Rng + ?Sized>(&self, now: DateTime<Utc>, rng: &mut R) -> EncounterId {
        loop {
            let suffix: String = (0..ID_SUFFIX_LEN)
                .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
                .collect();
            let id = EncounterId(format!("{}{}", now.timestamp_millis(), suffix));
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    /// Serialize to a pretty RON string.
    pub fn to_ron(&self) -> Result<String, HistoryError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    /// Parse a log from RON, rejecting duplicate record IDs.
    pub fn parse_ron(source: &str) -> Result<Self, HistoryError> {
        let log: EncounterLog = ron::from_str(source)?;
        log.validate()?;
        Ok(log)
    }

    /// Check invariants a deserialized log may violate: record IDs must be
    /// unique.
    pub fn validate(&self) -> Result<(), HistoryError> {
        let mut seen = FxHashSet::default();
        for record in &self.encounters {
            if !seen.insert(&record.id) {
                return Err(HistoryError::DuplicateId(record.id.clone()));
            }
        }
        Ok(())
    }

    /// Save the log to a RON file.
    pub fn save_to_ron(&self, path: &Path) -> Result<(), HistoryError> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }

    /// Load a log from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<Self, HistoryError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }
}
