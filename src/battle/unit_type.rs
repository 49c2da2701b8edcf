//! Unit templates and the shared template catalog
//!
//! Templates are immutable stat blocks. Every unit in a battle holds an
//! `Arc` to its template, so thousands of soldiers share one allocation.

use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use crate::core::error::{BattleError, Result};

/// Broad class of a unit template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum UnitCategory {
    #[default]
    Infantry,
    Cavalry,
    Archer,
    Elite,
    Recruit,
}

impl UnitCategory {
    /// Attacks use the ranged terrain/weather modifiers instead of melee
    pub fn is_ranged(&self) -> bool {
        matches!(self, UnitCategory::Archer)
    }
}

/// Immutable stat block shared by all units of one type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitTemplate {
    pub name: String,
    pub max_health: f32,
    pub attack_range: f32,
    pub speed: f32,
    /// Seconds between attacks
    pub attack_interval: f32,
    pub damage: f32,
    pub armor: f32,
    pub base_morale: f32,
    pub strength: f32,
    pub wage: f32,
    pub recruitment_cost: f32,
    pub category: UnitCategory,
}

impl Default for UnitTemplate {
    fn default() -> Self {
        Self {
            name: String::new(),
            max_health: 100.0,
            attack_range: 50.0,
            speed: 100.0,
            attack_interval: 1.0,
            damage: 10.0,
            armor: 10.0,
            base_morale: 50.0,
            strength: 10.0,
            wage: 5.0,
            recruitment_cost: 100.0,
            category: UnitCategory::Infantry,
        }
    }
}

impl UnitTemplate {
    /// Template with default stats and the given name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn infantry() -> Self {
        Self {
            name: "Infantry".into(),
            max_health: 100.0,
            attack_range: 2.0,
            speed: 5.0,
            attack_interval: 1.0,
            damage: 10.0,
            armor: 5.0,
            base_morale: 50.0,
            strength: 8.0,
            wage: 2.0,
            recruitment_cost: 100.0,
            category: UnitCategory::Infantry,
        }
    }

    pub fn archer() -> Self {
        Self {
            name: "Archer".into(),
            max_health: 80.0,
            attack_range: 20.0,
            speed: 4.0,
            attack_interval: 0.8,
            damage: 15.0,
            armor: 3.0,
            base_morale: 45.0,
            strength: 6.0,
            wage: 3.0,
            recruitment_cost: 150.0,
            category: UnitCategory::Archer,
        }
    }

    pub fn cavalry() -> Self {
        Self {
            name: "Cavalry".into(),
            max_health: 120.0,
            attack_range: 3.0,
            speed: 8.0,
            attack_interval: 1.2,
            damage: 12.0,
            armor: 6.0,
            base_morale: 60.0,
            strength: 10.0,
            wage: 5.0,
            recruitment_cost: 200.0,
            category: UnitCategory::Cavalry,
        }
    }

    /// Check the stats a battle relies on
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("max_health", self.max_health),
            ("attack_interval", self.attack_interval),
        ];
        for (field, value) in positive {
            if !(value > 0.0 && value.is_finite()) {
                return Err(BattleError::InvalidConfig(format!(
                    "{}: {} must be positive, got {}",
                    self.name, field, value
                )));
            }
        }

        let non_negative = [
            ("attack_range", self.attack_range),
            ("speed", self.speed),
            ("damage", self.damage),
            ("armor", self.armor),
        ];
        for (field, value) in non_negative {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(BattleError::InvalidConfig(format!(
                    "{}: {} must be non-negative, got {}",
                    self.name, field, value
                )));
            }
        }

        Ok(())
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "unit")]
    units: Vec<UnitTemplate>,
}

/// Read-only catalog of unit templates, keyed by name
#[derive(Debug, Clone, Default)]
pub struct UnitCatalog {
    templates: Vec<Arc<UnitTemplate>>,
}

impl UnitCatalog {
    /// Build a catalog; later duplicates of a name are rejected
    pub fn new(templates: Vec<UnitTemplate>) -> Result<Self> {
        let mut catalog = Self::default();
        for template in templates {
            template.validate()?;
            if catalog.get(&template.name).is_some() {
                return Err(BattleError::InvalidConfig(format!(
                    "duplicate unit template: {}",
                    template.name
                )));
            }
            catalog.templates.push(Arc::new(template));
        }
        Ok(catalog)
    }

    /// Infantry, archers and cavalry
    pub fn standard() -> Self {
        Self {
            templates: vec![
                Arc::new(UnitTemplate::infantry()),
                Arc::new(UnitTemplate::archer()),
                Arc::new(UnitTemplate::cavalry()),
            ],
        }
    }

    /// Load templates from TOML `[[unit]]` tables
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content)?;
        Self::new(file.units)
    }

    /// Look up a template by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<Arc<UnitTemplate>> {
        self.templates
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
            .cloned()
    }

    /// Look up a template by name, failing with `UnknownTemplate`
    pub fn require(&self, name: &str) -> Result<Arc<UnitTemplate>> {
        self.get(name)
            .ok_or_else(|| BattleError::UnknownTemplate(name.to_string()))
    }

    /// Templates of one category
    pub fn by_category(&self, category: UnitCategory) -> impl Iterator<Item = &Arc<UnitTemplate>> {
        self.templates.iter().filter(move |t| t.category == category)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<UnitTemplate>> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

static STANDARD_UNITS: OnceLock<UnitCatalog> = OnceLock::new();

/// Process-wide standard catalog, built on first use
pub fn standard_units() -> &'static UnitCatalog {
    STANDARD_UNITS.get_or_init(UnitCatalog::standard)
}
