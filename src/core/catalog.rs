/// Enemy catalog — the fixed table of enemies that can appear at a chest.

use rustc_hash::FxHashMap;
use std::path::Path;
use thiserror::Error;

use crate::schema::enemy::{Element, Enemy, EnemyId, Rarity};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("duplicate enemy id: {0}")]
    DuplicateId(EnemyId),
    #[error("enemy {0} has zero strength")]
    ZeroStrength(EnemyId),
    #[error("catalog is empty")]
    Empty,
}

/// An ordered, immutable set of enemies with O(1) lookup by ID.
///
/// Catalog order is meaningful: it is the tiebreak for predictions with
/// equal probability.
#[derive(Debug, Clone)]
pub struct EnemyCatalog {
    enemies: Vec<Enemy>,
    index: FxHashMap<EnemyId, usize>,
}

impl EnemyCatalog {
    /// Build a catalog, rejecting duplicate IDs and zero-strength entries.
    pub fn new(enemies: Vec<Enemy>) -> Result<Self, CatalogError> {
        if enemies.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut index = FxHashMap::default();
        for (i, enemy) in enemies.iter().enumerate() {
            if enemy.strength == 0 {
                return Err(CatalogError::ZeroStrength(enemy.id.clone()));
            }
            if index.insert(enemy.id.clone(), i).is_some() {
                return Err(CatalogError::DuplicateId(enemy.id.clone()));
            }
        }

        Ok(Self { enemies, index })
    }

    /// Parse a catalog from a RON list of enemies.
    pub fn parse_ron(source: &str) -> Result<Self, CatalogError> {
        let enemies: Vec<Enemy> = ron::from_str(source)?;
        Self::new(enemies)
    }

    /// Load a catalog from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn get(&self, id: &EnemyId) -> Option<&Enemy> {
        self.index.get(id).map(|&i| &self.enemies[i])
    }

    pub fn contains(&self, id: &EnemyId) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Enemy> {
        self.enemies.iter()
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }
}

impl Default for EnemyCatalog {
    fn default() -> Self {
        let enemies = default_enemies();
        let index = enemies
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id.clone(), i))
            .collect();
        Self { enemies, index }
    }
}

impl<'a> IntoIterator for &'a EnemyCatalog {
    type Item = &'a Enemy;
    type IntoIter = std::slice::Iter<'a, Enemy>;

    fn into_iter(self) -> Self::IntoIter {
        self.enemies.iter()
    }
}

#[allow(clippy::too_many_arguments)]
fn enemy(
    id: &str,
    name: &str,
    rarity: Rarity,
    element: Element,
    strength: u32,
    weakness: &str,
    description: &str,
    icon: &str,
) -> Enemy {
    Enemy {
        id: EnemyId::from(id),
        name: name.to_string(),
        rarity,
        element,
        strength,
        weakness: weakness.to_string(),
        description: description.to_string(),
        icon: icon.to_string(),
    }
}

/// The built-in eight-enemy catalog.
pub fn default_enemies() -> Vec<Enemy> {
    vec![
        enemy(
            "fire-goblin",
            "Fire Goblin",
            Rarity::Common,
            Element::Fire,
            3,
            "Water magic",
            "A small, aggressive creature with flaming attacks.",
            "🔥",
        ),
        enemy(
            "water-sprite",
            "Water Sprite",
            Rarity::Common,
            Element::Water,
            2,
            "Lightning spells",
            "A nimble aquatic being with healing abilities.",
            "💧",
        ),
        enemy(
            "earth-golem",
            "Earth Golem",
            Rarity::Rare,
            Element::Earth,
            7,
            "Wind attacks",
            "A massive rock creature with devastating physical attacks.",
            "🗿",
        ),
        enemy(
            "air-wraith",
            "Air Wraith",
            Rarity::Rare,
            Element::Air,
            5,
            "Holy magic",
            "A ghostly being that phases in and out of reality.",
            "🌪️",
        ),
        enemy(
            "shadow-dragon",
            "Shadow Dragon",
            Rarity::Epic,
            Element::Dark,
            15,
            "Light magic",
            "A fearsome dragon cloaked in darkness.",
            "🐉",
        ),
        enemy(
            "light-phoenix",
            "Light Phoenix",
            Rarity::Epic,
            Element::Light,
            12,
            "Dark magic",
            "A majestic bird of pure light and rebirth.",
            "🔥",
        ),
        enemy(
            "void-lord",
            "Void Lord",
            Rarity::Legendary,
            Element::Dark,
            20,
            "Combined elements",
            "An ancient entity from the void realm.",
            "👑",
        ),
        enemy(
            "crystal-guardian",
            "Crystal Guardian",
            Rarity::Legendary,
            Element::Light,
            18,
            "Chaos magic",
            "A protector of ancient crystal formations.",
            "💎",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_has_eight_enemies() {
        let catalog = EnemyCatalog::default();
        assert_eq!(catalog.len(), 8);
        assert!(catalog.contains(&EnemyId::from("void-lord")));
        assert_eq!(catalog.enemies()[0].id.as_str(), "fire-goblin");
        assert_eq!(catalog.enemies()[7].id.as_str(), "crystal-guardian");
    }

    #[test]
    fn default_catalog_is_valid() {
        assert!(EnemyCatalog::new(default_enemies()).is_ok());
    }

    #[test]
    fn lookup_by_id() {
        let catalog = EnemyCatalog::default();
        let golem = catalog.get(&EnemyId::from("earth-golem")).unwrap();
        assert_eq!(golem.name, "Earth Golem");
        assert_eq!(golem.rarity, Rarity::Rare);
        assert_eq!(golem.element, Element::Earth);
        assert!(catalog.get(&EnemyId::from("missing")).is_none());
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut enemies = default_enemies();
        enemies.push(enemies[0].clone());
        let err = EnemyCatalog::new(enemies).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateId(id) if id.as_str() == "fire-goblin"));
    }

    #[test]
    fn rejects_zero_strength() {
        let mut enemies = default_enemies();
        enemies[2].strength = 0;
        assert!(matches!(
            EnemyCatalog::new(enemies),
            Err(CatalogError::ZeroStrength(_))
        ));
    }

    #[test]
    fn rejects_empty() {
        assert!(matches!(EnemyCatalog::new(Vec::new()), Err(CatalogError::Empty)));
    }

    #[test]
    fn parse_ron_list() {
        let src = r#"[
            (
                id: "ember-imp",
                name: "Ember Imp",
                rarity: Common,
                element: Fire,
                strength: 2,
                weakness: "Frost",
                description: "A tiny spark with a temper.",
            ),
            (
                id: "storm-titan",
                name: "Storm Titan",
                rarity: Legendary,
                element: Air,
                strength: 25,
                weakness: "Grounding",
                description: "Thunder given form.",
                icon: "⚡",
            ),
        ]"#;
        let catalog = EnemyCatalog::parse_ron(src).unwrap();
        assert_eq!(catalog.len(), 2);
        let names: Vec<&str> = catalog.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Ember Imp", "Storm Titan"]);
    }
}
