/// Next-enemy prediction: Markov transitions blended with a rarity prior.
///
/// Every call rebuilds its transition table from the full history, so the
/// predictor holds no state between calls and never fails. Missing or
/// dangling data degrades to weaker estimates instead of errors.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::core::catalog::EnemyCatalog;
use crate::core::config::{ConfigError, PredictorConfig};
use crate::core::insights::{self, Insight};
use crate::core::markov::TransitionMatrix;
use crate::schema::encounter::EncounterRecord;
use crate::schema::enemy::Enemy;

#[derive(Debug, Error)]
pub enum PredictorError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("no enemy catalog provided")]
    MissingCatalog,
}

/// A ranked guess for the next enemy.
///
/// Probabilities across one result set are not normalized: observed
/// transition frequencies and scaled rarity priors are mixed in the same
/// list, so callers must not treat them as a distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub enemy: Enemy,
    pub probability: f64,
    pub confidence: f64,
    pub reasoning: String,
}

/// Predicts the next chest enemy from an encounter history.
#[derive(Debug, Clone)]
pub struct Predictor<'a> {
    catalog: &'a EnemyCatalog,
    config: PredictorConfig,
}

/// Builder for constructing a `Predictor`.
pub struct PredictorBuilder<'a> {
    catalog: Option<&'a EnemyCatalog>,
    config: Option<PredictorConfig>,
    config_path: Option<String>,
}

impl<'a> Predictor<'a> {
    /// A predictor over `catalog` with the default tuning.
    pub fn new(catalog: &'a EnemyCatalog) -> Self {
        Self {
            catalog,
            config: PredictorConfig::default(),
        }
    }

    pub fn builder() -> PredictorBuilder<'a> {
        PredictorBuilder {
            catalog: None,
            config: None,
            config_path: None,
        }
    }

    pub fn catalog(&self) -> &EnemyCatalog {
        self.catalog
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    /// Rank every catalog enemy by how likely it is to guard the next chest.
    ///
    /// With fewer than `min_history` records, or when the most recent enemy
    /// has never been followed by anything, the rarity baseline is returned.
    /// Otherwise enemies observed after the most recent one get their
    /// transition frequency, and all remaining catalog enemies get a scaled
    /// rarity prior. The result is sorted by probability, descending, with
    /// ties kept in emission order.
    pub fn predict_next_enemy(&self, history: &[EncounterRecord]) -> Vec<PredictionResult> {
        let mut results = self.score(history);
        results.sort_by(|a, b| b.probability.total_cmp(&a.probability));
        results
    }

    fn score(&self, history: &[EncounterRecord]) -> Vec<PredictionResult> {
        let last = match history.last() {
            Some(record) if history.len() >= self.config.min_history => &record.enemy_id,
            _ => {
                debug!(records = history.len(), "history too short, using rarity baseline");
                return self.baseline_predictions();
            }
        };

        let transitions = TransitionMatrix::from_history(history);
        let Some(row) = transitions.row(last) else {
            debug!(enemy = %last, "no successors recorded, using rarity baseline");
            return self.baseline_predictions();
        };

        let total = transitions.row_total(last);
        let last_name = self
            .catalog
            .get(last)
            .map(|e| e.name.as_str())
            .unwrap_or(last.as_str());

        for id in row.keys().filter(|id| !self.catalog.contains(id)) {
            debug!(enemy = %id, "dropping transition to enemy missing from catalog");
        }

        let mut results = Vec::with_capacity(self.catalog.len());

        for enemy in self.catalog {
            if let Some(&count) = row.get(&enemy.id) {
                results.push(PredictionResult {
                    enemy: enemy.clone(),
                    probability: f64::from(count) / f64::from(total),
                    confidence: self.calculate_confidence(count, total),
                    reasoning: format!("Based on {count} occurrences after {last_name}"),
                });
            }
        }

        for enemy in self.catalog {
            if !row.contains_key(&enemy.id) {
                results.push(PredictionResult {
                    enemy: enemy.clone(),
                    probability: self.base_probability(enemy),
                    confidence: self.config.unseen_confidence,
                    reasoning: format!("Estimated based on {} rarity", enemy.rarity),
                });
            }
        }

        results
    }

    /// Heuristic confidence for a transition seen `count` times out of
    /// `total` transitions from the same enemy.
    ///
    /// Grows with the transition's share of the row and with the row's
    /// sample size, which earns full credit at `sample_saturation`.
    /// Always in [0, 1].
    pub fn calculate_confidence(&self, count: u32, total: u32) -> f64 {
        if total == 0 {
            return 0.0;
        }
        let frequency = f64::from(count) / f64::from(total);
        let sample_size = (f64::from(total) / self.config.sample_saturation).min(1.0);
        (frequency * sample_size).min(1.0)
    }

    /// Scaled rarity prior for an enemy with no transition evidence.
    pub fn base_probability(&self, enemy: &Enemy) -> f64 {
        self.config.rarity_priors.weight(enemy.rarity) * self.config.prior_scale
    }

    /// One rarity-prior estimate per catalog enemy, in catalog order.
    pub fn baseline_predictions(&self) -> Vec<PredictionResult> {
        self.catalog
            .iter()
            .map(|enemy| PredictionResult {
                enemy: enemy.clone(),
                probability: self.base_probability(enemy),
                confidence: self.config.baseline_confidence,
                reasoning: format!("Initial prediction based on {} rarity", enemy.rarity),
            })
            .collect()
    }

    /// Pattern-based observations about the history.
    pub fn strategic_insights(&self, history: &[EncounterRecord]) -> Vec<Insight> {
        insights::analyze(history, self.catalog, &self.config.insights)
    }

    /// `strategic_insights` rendered as display strings.
    pub fn insight_messages(&self, history: &[EncounterRecord]) -> Vec<String> {
        self.strategic_insights(history)
            .iter()
            .map(ToString::to_string)
            .collect()
    }
}

impl<'a> PredictorBuilder<'a> {
    pub fn catalog(mut self, catalog: &'a EnemyCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Provide a config directly.
    pub fn with_config(mut self, config: PredictorConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Load the config from a RON file at build time.
    pub fn config_path(mut self, path: &str) -> Self {
        self.config_path = Some(path.to_string());
        self
    }

    pub fn build(self) -> Result<Predictor<'a>, PredictorError> {
        let catalog = self.catalog.ok_or(PredictorError::MissingCatalog)?;

        let config = match (self.config, self.config_path) {
            (Some(config), _) => config,
            (None, Some(path)) => PredictorConfig::load_from_ron(Path::new(&path))?,
            (None, None) => PredictorConfig::default(),
        };
        config.validate()?;

        Ok(Predictor { catalog, config })
    }
}
