//! WASM bindings for chest-predictor — backs the browser tracker UI.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use wasm_bindgen::prelude::*;

use chest_predictor::core::catalog::EnemyCatalog;
use chest_predictor::core::history::EncounterLog;
use chest_predictor::core::predictor::Predictor;
use chest_predictor::core::stats::EncounterStats;
use chest_predictor::schema::encounter::{EncounterId, NewEncounter, Outcome};
use chest_predictor::schema::enemy::EnemyId;

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------
#[derive(serde::Deserialize)]
struct EncounterInput {
    enemy_id: String,
    location: String,
    outcome: String,
    chest_number: Option<u32>,
    timestamp: Option<DateTime<Utc>>,
}

#[derive(serde::Serialize)]
struct PredictionOutput<'a> {
    enemy_id: &'a str,
    name: &'a str,
    icon: &'a str,
    probability: f64,
    confidence: f64,
    reasoning: &'a str,
}

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------
fn parse_outcome(s: &str) -> Option<Outcome> {
    Outcome::ALL
        .into_iter()
        .find(|outcome| outcome.name().eq_ignore_ascii_case(s))
}

/// Deserialize a saved log and check it the same way a RON load does.
fn parse_saved_log(json: &str) -> Result<EncounterLog, String> {
    let log: EncounterLog = serde_json::from_str(json).map_err(|e| e.to_string())?;
    log.validate().map_err(|e| e.to_string())?;
    Ok(log)
}

fn build_encounter(input: EncounterInput, next_chest: u32) -> Option<NewEncounter> {
    Some(NewEncounter {
        chest_number: input.chest_number.unwrap_or(next_chest),
        enemy_id: EnemyId::new(input.enemy_id),
        timestamp: input.timestamp.unwrap_or_else(Utc::now),
        location: input.location.trim().to_string(),
        outcome: parse_outcome(&input.outcome)?,
    })
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, JsError> {
    serde_json::to_string(value).map_err(|e| JsError::new(&format!("Serialization error: {e}")))
}

#[wasm_bindgen]
pub struct ChestTracker {
    catalog: EnemyCatalog,
    log: EncounterLog,
    rng: StdRng,
}

#[wasm_bindgen]
impl ChestTracker {
    /// Create an empty tracker over the built-in catalog.
    #[wasm_bindgen(constructor)]
    pub fn new(name: &str, seed: u64) -> ChestTracker {
        ChestTracker {
            catalog: EnemyCatalog::default(),
            log: EncounterLog::new(name),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Restore a tracker from the JSON produced by `save`.
    pub fn restore(saved_json: &str, seed: u64) -> Result<ChestTracker, JsError> {
        let log = parse_saved_log(saved_json)
            .map_err(|e| JsError::new(&format!("Invalid saved log: {e}")))?;
        Ok(ChestTracker {
            catalog: EnemyCatalog::default(),
            log,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Serialize the whole log to JSON for the browser's local store.
    pub fn save(&self) -> Result<String, JsError> {
        to_json(&self.log)
    }

    /// Log an encounter described by a JSON string. Returns the new record ID.
    ///
    /// Expected JSON shape:
    /// ```json
    /// {
    ///   "enemy_id": "earth-golem",
    ///   "location": "Crystal Caves",
    ///   "outcome": "victory",
    ///   "chest_number": 12,
    ///   "timestamp": "2024-05-01T10:00:00Z"
    /// }
    /// ```
    /// `chest_number` defaults to one past the last record and `timestamp`
    /// to now.
    pub fn add_encounter(&mut self, encounter_json: &str) -> Result<String, JsError> {
        let input: EncounterInput = serde_json::from_str(encounter_json)
            .map_err(|e| JsError::new(&format!("Invalid encounter JSON: {e}")))?;
        let outcome = input.outcome.clone();
        let encounter = build_encounter(input, self.log.next_chest_number())
            .ok_or_else(|| JsError::new(&format!("Unknown outcome: {outcome}")))?;
        let record = self
            .log
            .add(encounter, &self.catalog, &mut self.rng)
            .map_err(|e| JsError::new(&format!("Cannot add encounter: {e}")))?;
        Ok(record.id.to_string())
    }

    /// Remove an encounter by ID.
    pub fn remove_encounter(&mut self, id: &str) -> Result<(), JsError> {
        self.log
            .remove(&EncounterId::from(id))
            .map(|_| ())
            .map_err(|e| JsError::new(&format!("Cannot remove encounter: {e}")))
    }

    /// JSON array of logged encounters, oldest first.
    pub fn encounters(&self) -> Result<String, JsError> {
        to_json(self.log.encounters())
    }

    /// JSON array of catalog enemies.
    pub fn catalog(&self) -> Result<String, JsError> {
        to_json(self.catalog.enemies())
    }

    /// JSON array of ranked predictions for the next chest.
    pub fn predictions(&self) -> Result<String, JsError> {
        let predictor = Predictor::new(&self.catalog);
        let results = predictor.predict_next_enemy(self.log.encounters());
        let output: Vec<PredictionOutput<'_>> = results
            .iter()
            .map(|r| PredictionOutput {
                enemy_id: r.enemy.id.as_str(),
                name: &r.enemy.name,
                icon: &r.enemy.icon,
                probability: r.probability,
                confidence: r.confidence,
                reasoning: &r.reasoning,
            })
            .collect();
        to_json(&output)
    }

    /// JSON array of insight strings.
    pub fn insights(&self) -> Result<String, JsError> {
        let predictor = Predictor::new(&self.catalog);
        to_json(&predictor.insight_messages(self.log.encounters()))
    }

    /// JSON object with distributions, win rate, and last chest number.
    pub fn stats(&self) -> Result<String, JsError> {
        to_json(&EncounterStats::compute(self.log.encounters(), &self.catalog))
    }

    /// Number of logged encounters.
    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    /// JSON array of outcome names accepted by `add_encounter`.
    pub fn outcomes() -> String {
        let names: Vec<String> = Outcome::ALL
            .iter()
            .map(|outcome| outcome.name().to_lowercase())
            .collect();
        serde_json::to_string(&names).unwrap_or_else(|_| "[]".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(outcome: &str, chest: Option<u32>) -> EncounterInput {
        EncounterInput {
            enemy_id: "void-lord".to_string(),
            location: "  Dark Tower ".to_string(),
            outcome: outcome.to_string(),
            chest_number: chest,
            timestamp: None,
        }
    }

    #[test]
    fn outcome_parsing_is_case_insensitive() {
        assert_eq!(parse_outcome("Victory"), Some(Outcome::Victory));
        assert_eq!(parse_outcome("FLED"), Some(Outcome::Fled));
        assert_eq!(parse_outcome("draw"), None);
    }

    #[test]
    fn build_encounter_defaults_chest_number() {
        let encounter = build_encounter(input("defeat", None), 9).unwrap();
        assert_eq!(encounter.chest_number, 9);
        assert_eq!(encounter.location, "Dark Tower");
        assert_eq!(encounter.outcome, Outcome::Defeat);

        let explicit = build_encounter(input("victory", Some(3)), 9).unwrap();
        assert_eq!(explicit.chest_number, 3);
    }

    #[test]
    fn build_encounter_rejects_unknown_outcome() {
        assert!(build_encounter(input("stalemate", None), 1).is_none());
    }

    #[test]
    fn encounter_input_from_json() {
        let parsed: EncounterInput = serde_json::from_str(
            r#"{"enemy_id":"air-wraith","location":"Ruins","outcome":"fled","timestamp":"2024-05-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(parsed.enemy_id, "air-wraith");
        assert!(parsed.chest_number.is_none());
        assert!(parsed.timestamp.is_some());
    }

    #[test]
    fn outcomes_lists_every_outcome() {
        let names: Vec<String> = serde_json::from_str(&ChestTracker::outcomes()).unwrap();
        assert_eq!(names, vec!["victory", "defeat", "fled"]);
        for name in &names {
            assert!(parse_outcome(name).is_some());
        }
    }

    #[test]
    fn saved_log_with_duplicate_ids_is_rejected() {
        let json = r#"{
            "name": "dup",
            "created_at": "2024-05-01T10:00:00Z",
            "last_modified": "2024-05-01T10:00:00Z",
            "encounters": [
                {"id": "x", "chest_number": 1, "enemy_id": "fire-goblin",
                 "timestamp": "2024-05-01T10:00:00Z", "location": "A", "outcome": "Victory"},
                {"id": "x", "chest_number": 2, "enemy_id": "void-lord",
                 "timestamp": "2024-05-01T10:05:00Z", "location": "A", "outcome": "Fled"}
            ]
        }"#;
        let err = parse_saved_log(json).unwrap_err();
        assert!(err.contains("duplicate"), "{err}");
    }

    #[test]
    fn saved_log_rejects_malformed_json() {
        assert!(parse_saved_log("{\"name\": ").is_err());
    }

    #[test]
    fn tracker_session_round_trip() {
        let mut tracker = ChestTracker::new("Browser run", 17);
        assert!(tracker.is_empty());

        let mut ids = Vec::new();
        for (enemy, outcome) in [
            ("fire-goblin", "victory"),
            ("earth-golem", "Defeat"),
            ("fire-goblin", "victory"),
            ("earth-golem", "fled"),
            ("fire-goblin", "VICTORY"),
        ] {
            let json = format!(
                r#"{{"enemy_id":"{enemy}","location":"Crystal Caves","outcome":"{outcome}"}}"#
            );
            ids.push(tracker.add_encounter(&json).unwrap());
        }
        assert_eq!(tracker.len(), 5);

        let predictions: Vec<serde_json::Value> =
            serde_json::from_str(&tracker.predictions().unwrap()).unwrap();
        assert_eq!(predictions.len(), tracker.catalog.len());
        let probabilities: Vec<f64> = predictions
            .iter()
            .map(|p| p["probability"].as_f64().unwrap())
            .collect();
        assert!(probabilities.windows(2).all(|w| w[0] >= w[1]));
        let mut enemy_ids: Vec<&str> = predictions
            .iter()
            .map(|p| p["enemy_id"].as_str().unwrap())
            .collect();
        assert_eq!(enemy_ids[0], "earth-golem");
        enemy_ids.sort_unstable();
        enemy_ids.dedup();
        assert_eq!(enemy_ids.len(), tracker.catalog.len());

        let insights: Vec<String> = serde_json::from_str(&tracker.insights().unwrap()).unwrap();
        assert!(!insights.is_empty());

        let stats: serde_json::Value = serde_json::from_str(&tracker.stats().unwrap()).unwrap();
        assert_eq!(stats["total"], 5);
        assert_eq!(stats["last_chest"], 5);

        let saved = tracker.save().unwrap();
        let mut restored = ChestTracker::restore(&saved, 3).unwrap();
        assert_eq!(restored.log.name, "Browser run");
        assert_eq!(restored.log.encounters(), tracker.log.encounters());
        assert_eq!(restored.encounters().unwrap(), tracker.encounters().unwrap());

        restored.remove_encounter(&ids[1]).unwrap();
        assert_eq!(restored.len(), 4);
        assert!(restored
            .log
            .encounters()
            .iter()
            .all(|r| r.id.to_string() != ids[1]));

        let next = restored
            .add_encounter(r#"{"enemy_id":"void-lord","location":"Dark Tower","outcome":"fled"}"#)
            .unwrap();
        assert!(!ids.contains(&next));
        assert_eq!(restored.log.encounters()[4].chest_number, 6);
    }
}
