use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::enemy::EnemyId;

/// Newtype wrapper for encounter record IDs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncounterId(pub String);

impl From<&str> for EncounterId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for EncounterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a chest encounter ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Victory,
    Defeat,
    Fled,
}

impl Outcome {
    pub const ALL: [Outcome; 3] = [Self::Victory, Self::Defeat, Self::Fled];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Victory => "Victory",
            Self::Defeat => "Defeat",
            Self::Fled => "Fled",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// One logged chest opening: which enemy guarded it, where, and how it went.
///
/// Records are immutable once created. A history is a slice of records in
/// chronological order, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterRecord {
    pub id: EncounterId,
    pub chest_number: u32,
    pub enemy_id: EnemyId,
    pub timestamp: DateTime<Utc>,
    pub location: String,
    pub outcome: Outcome,
}

/// The caller-provided part of a record; the log fills in the ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEncounter {
    pub chest_number: u32,
    pub enemy_id: EnemyId,
    pub timestamp: DateTime<Utc>,
    pub location: String,
    pub outcome: Outcome,
}

impl NewEncounter {
    pub fn into_record(self, id: EncounterId) -> EncounterRecord {
        EncounterRecord {
            id,
            chest_number: self.chest_number,
            enemy_id: self.enemy_id,
            timestamp: self.timestamp,
            location: self.location,
            outcome: self.outcome,
        }
    }
}
