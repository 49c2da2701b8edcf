//! Battle system - real-time skirmish between two rosters
//!
//! A battle deploys both rosters onto a continuous field, waits in
//! deployment until told to proceed, then ticks units toward their nearest
//! enemy until one side is gone. Terrain, weather and tactics are optional
//! layers that scale movement, damage and morale once attached.

pub mod constants;
pub mod execution;
pub mod formation;
pub mod noise;
pub mod resolution;
pub mod rewards;
pub mod tactics;
pub mod terrain;
pub mod unit_type;
pub mod units;
pub mod weather;

// Re-exports for convenient access
pub use constants::*;
pub use execution::{
    Battle, BattleEvent, BattleEventLog, BattleEventType, BattlePhase, BattleSummary,
};
pub use formation::{Formation, FormationType};
pub use resolution::{armor_reduction, compute_damage, roll_damage_factor};
pub use rewards::{victory_gold, LootPolicy, LootYield, NoLoot, Rewards};
pub use tactics::{BattleTactics, TacticModifiers, TacticType};
pub use terrain::{BattleTerrain, TerrainEffects, TerrainType};
pub use unit_type::{standard_units, UnitCatalog, UnitCategory, UnitTemplate};
pub use units::{BattleUnit, DamageOutcome};
pub use weather::{BattleWeather, TimeOfDay, WeatherEffects, WeatherParticle, WeatherType};
