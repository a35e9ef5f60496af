/// Predictor tuning — rarity priors, confidence constants, and insight thresholds.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::schema::enemy::Rarity;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Prior weight per rarity tier, used when no transition data exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RarityPriors {
    pub common: f64,
    pub rare: f64,
    pub epic: f64,
    pub legendary: f64,
}

impl Default for RarityPriors {
    fn default() -> Self {
        Self {
            common: 0.4,
            rare: 0.3,
            epic: 0.2,
            legendary: 0.1,
        }
    }
}

impl RarityPriors {
    pub fn weight(&self, rarity: Rarity) -> f64 {
        match rarity {
            Rarity::Common => self.common,
            Rarity::Rare => self.rare,
            Rarity::Epic => self.epic,
            Rarity::Legendary => self.legendary,
        }
    }
}

/// Thresholds for the strategic insight heuristics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    /// Below this many records only the "more data needed" insight is produced.
    pub min_history: usize,
    /// An element must exceed this share of the history to be dominant.
    pub dominant_element_share: f64,
    /// Number of most recent records inspected for a high-tier streak.
    pub streak_window: usize,
    /// High-tier records needed inside the window.
    pub streak_threshold: usize,
    /// A location must exceed this share of the history to be a hotspot.
    pub location_share: f64,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            min_history: 3,
            dominant_element_share: 0.3,
            streak_window: 5,
            streak_threshold: 3,
            location_share: 0.4,
        }
    }
}

/// All tunable constants of the predictor. The defaults are the shipped
/// behavior; a RON file only needs to name the fields it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    /// Histories shorter than this skip the Markov step entirely.
    pub min_history: usize,
    pub rarity_priors: RarityPriors,
    /// Multiplier applied to rarity priors so unseen enemies rank below
    /// observed transitions.
    pub prior_scale: f64,
    pub unseen_confidence: f64,
    pub baseline_confidence: f64,
    /// Row total at which sample size stops limiting confidence.
    pub sample_saturation: f64,
    pub insights: InsightConfig,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            min_history: 2,
            rarity_priors: RarityPriors::default(),
            prior_scale: 0.1,
            unseen_confidence: 0.3,
            baseline_confidence: 0.2,
            sample_saturation: 10.0,
            insights: InsightConfig::default(),
        }
    }
}

impl PredictorConfig {
    /// Parse a config from a RON string and validate it.
    pub fn parse_ron(source: &str) -> Result<Self, ConfigError> {
        let config: PredictorConfig = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a RON file and validate it.
    pub fn load_from_ron(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit_fields = [
            ("rarity_priors.common", self.rarity_priors.common),
            ("rarity_priors.rare", self.rarity_priors.rare),
            ("rarity_priors.epic", self.rarity_priors.epic),
            ("rarity_priors.legendary", self.rarity_priors.legendary),
            ("prior_scale", self.prior_scale),
            ("unseen_confidence", self.unseen_confidence),
            ("baseline_confidence", self.baseline_confidence),
            (
                "insights.dominant_element_share",
                self.insights.dominant_element_share,
            ),
            ("insights.location_share", self.insights.location_share),
        ];
        for (field, value) in unit_fields {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{value} is outside [0, 1]"),
                });
            }
        }

        if self.sample_saturation.is_nan() || self.sample_saturation <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "sample_saturation",
                reason: format!("{} must be positive", self.sample_saturation),
            });
        }
        if self.min_history < 2 {
            return Err(ConfigError::Invalid {
                field: "min_history",
                reason: "at least two records are needed to form a transition".to_string(),
            });
        }
        if self.insights.streak_window == 0 {
            return Err(ConfigError::Invalid {
                field: "insights.streak_window",
                reason: "must inspect at least one record".to_string(),
            });
        }
        if self.insights.streak_threshold == 0 {
            return Err(ConfigError::Invalid {
                field: "insights.streak_threshold",
                reason: "a streak needs at least one high-tier record".to_string(),
            });
        }
        if self.insights.streak_threshold > self.insights.streak_window {
            return Err(ConfigError::Invalid {
                field: "insights.streak_threshold",
                reason: format!(
                    "{} exceeds streak_window {}",
                    self.insights.streak_threshold, self.insights.streak_window
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(PredictorConfig::default().validate().is_ok());
    }

    #[test]
    fn rarity_weights() {
        let priors = RarityPriors::default();
        assert_eq!(priors.weight(Rarity::Common), 0.4);
        assert_eq!(priors.weight(Rarity::Rare), 0.3);
        assert_eq!(priors.weight(Rarity::Epic), 0.2);
        assert_eq!(priors.weight(Rarity::Legendary), 0.1);
    }

    #[test]
    fn partial_ron_keeps_defaults() {
        let config = PredictorConfig::parse_ron("(unseen_confidence: 0.25)").unwrap();
        assert_eq!(config.unseen_confidence, 0.25);
        assert_eq!(config.baseline_confidence, 0.2);
        assert_eq!(config.insights.streak_window, 5);
    }

    #[test]
    fn nested_partial_ron() {
        let config =
            PredictorConfig::parse_ron("(insights: (location_share: 0.5))").unwrap();
        assert_eq!(config.insights.location_share, 0.5);
        assert_eq!(config.insights.min_history, 3);
    }

    #[test]
    fn rejects_out_of_range_share() {
        let err = PredictorConfig::parse_ron("(prior_scale: 1.5)").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "prior_scale", .. }));
    }

    #[test]
    fn rejects_streak_threshold_above_window() {
        let err = PredictorConfig::parse_ron("(insights: (streak_window: 2, streak_threshold: 3))")
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "insights.streak_threshold",
                ..
            }
        ));
    }

    #[test]
    fn rejects_empty_streak_window() {
        let err = PredictorConfig::parse_ron("(insights: (streak_window: 0, streak_threshold: 0))")
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "insights.streak_window",
                ..
            }
        ));
    }

    #[test]
    fn rejects_zero_streak_threshold() {
        let err = PredictorConfig::parse_ron("(insights: (streak_threshold: 0))").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "insights.streak_threshold",
                ..
            }
        ));
    }

    #[test]
    fn rejects_zero_saturation() {
        let err = PredictorConfig::parse_ron("(sample_saturation: 0.0)").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "sample_saturation", .. }));
    }

    #[test]
    fn malformed_ron_is_error() {
        assert!(matches!(
            PredictorConfig::parse_ron("(prior_scale: "),
            Err(ConfigError::Ron(_))
        ));
    }
}
