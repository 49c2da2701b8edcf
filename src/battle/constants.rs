//! Battle system constants - fixed rule values in one place
//!
//! Per-battle tunables (field size, damage variance, reward rate) live in
//! `core::config::BattleConfig`.

// Terrain grid
pub const TERRAIN_CELL_SIZE: f32 = 10.0; // world units per terrain cell

// Deployment bands (world units, shrunk proportionally on small fields)
pub const DEPLOYMENT_EDGE_MARGIN: f32 = 50.0;
pub const DEPLOYMENT_BAND_DEPTH: f32 = 150.0;
pub const DEPLOYMENT_VERTICAL_MARGIN: f32 = 50.0;

// Units
pub const DEFAULT_FORMATION_COHESION: f32 = 0.8;
pub const COMBAT_PULL_RANGE_FACTOR: f32 = 2.0; // enemy pulls units within 2x attack range

// Formations
pub const DEFAULT_FORMATION_SPACING: f32 = 20.0;

// Tactics (world units)
pub const SKIRMISH_TRIGGER_RANGE_FACTOR: f32 = 1.5;
pub const SKIRMISH_DISENGAGE_DISTANCE: f32 = 100.0;
pub const FLANK_OFFSET: f32 = 150.0;
pub const RETREAT_DISTANCE: f32 = 200.0;

// Weather
pub const MAX_WEATHER_PARTICLES: usize = 1000;
pub const PARTICLE_SPAWN_HEIGHT: f32 = -10.0; // just above the top edge

// Damage
pub const ARMOR_REDUCTION_BASE: f32 = 100.0; // damage *= 100 / (100 + armor)
pub const MIN_DAMAGE_MODIFIER: f32 = 0.1; // floor for terrain x weather x tactic

// Campaign
pub const STARTING_PLAYER_GOLD: u32 = 5000;
pub const WAGE_PER_STRENGTH: f32 = 0.1;
