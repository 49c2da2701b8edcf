//! Battle configuration with documented constants
//!
//! Tunable numbers for a single battle are collected here. Values that are
//! fixed by the rules (terrain tables, tactic multipliers) live next to the
//! code that uses them instead.

use std::path::Path;

use serde::Deserialize;

use crate::core::error::{BattleError, Result};

/// Largest accepted battlefield width or height (world units)
///
/// Keeps the terrain grid bounded (at most 2000 x 2000 cells) and keeps
/// deployment bands wide enough to sample at f32 precision.
pub const MAX_BATTLEFIELD_EXTENT: f32 = 20_000.0;

/// Configuration for one battle
///
/// Defaults reproduce the classic 1000 x 600 field with ±20% damage rolls.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    // === BATTLEFIELD ===
    /// Width of the battlefield (world units)
    ///
    /// Players deploy near x = 0, enemies near x = width.
    pub battlefield_width: f32,

    /// Height of the battlefield (world units)
    pub battlefield_height: f32,

    // === COMBAT ===
    /// Half-width of the uniform damage roll around 1.0
    ///
    /// At 0.2 every hit deals between 80% and 120% of template damage.
    /// At 0.0 every hit deals exactly template damage, which makes fights
    /// fully predictable apart from deployment.
    pub damage_variance: f32,

    /// Lower bound on the combined movement modifier
    ///
    /// Terrain, weather and tactics multiply together. Without a floor a
    /// zero-intensity weather front would freeze every unit in place.
    pub min_movement_modifier: f32,

    // === REWARDS ===
    /// Gold awarded per enemy troop present at the start of the battle
    ///
    /// Scaled by (1 + player survivor fraction), so a flawless win pays 2x.
    pub gold_per_enemy_troop: f32,

    // === LOGGING ===
    /// Number of events retained in the battle log
    ///
    /// Older entries are dropped silently. Presentation layers usually show
    /// the last five.
    pub event_log_capacity: usize,

    // === RANDOMNESS ===
    /// Seed for the battle's random source
    ///
    /// `None` seeds from OS entropy. The same seed and rosters reproduce
    /// the same battle.
    pub seed: Option<u64>,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            battlefield_width: 1000.0,
            battlefield_height: 600.0,
            damage_variance: 0.2,
            min_movement_modifier: 0.1,
            gold_per_enemy_troop: 10.0,
            event_log_capacity: 100,
            seed: None,
        }
    }
}

impl BattleConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Same config with a fixed seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Same config with no damage variance
    pub fn without_variance(mut self) -> Self {
        self.damage_variance = 0.0;
        self
    }

    /// Parse a config from TOML; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: BattleConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let (w, h) = (self.battlefield_width, self.battlefield_height);
        let in_bounds = |v: f32| v > 0.0 && v <= MAX_BATTLEFIELD_EXTENT;
        if !(in_bounds(w) && in_bounds(h)) {
            return Err(BattleError::InvalidBattlefield {
                width: w,
                height: h,
            });
        }

        if !(0.0..1.0).contains(&self.damage_variance) {
            return Err(BattleError::InvalidConfig(format!(
                "damage_variance ({}) must be in [0, 1)",
                self.damage_variance
            )));
        }

        if !(self.min_movement_modifier > 0.0 && self.min_movement_modifier <= 1.0) {
            return Err(BattleError::InvalidConfig(format!(
                "min_movement_modifier ({}) must be in (0, 1]",
                self.min_movement_modifier
            )));
        }

        if !(self.gold_per_enemy_troop >= 0.0) {
            return Err(BattleError::InvalidConfig(
                "gold_per_enemy_troop must be non-negative".into(),
            ));
        }

        if self.event_log_capacity == 0 {
            return Err(BattleError::InvalidConfig(
                "event_log_capacity must be at least 1".into(),
            ));
        }

        Ok(())
    }
}
