//! Battle execution loop
//!
//! Phases: deployment -> combat -> finished. Each combat tick:
//! progress -> tactics -> player units -> enemy units -> end check.

use std::collections::VecDeque;

use ordered_float::OrderedFloat;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::battle::constants::{
    DEPLOYMENT_BAND_DEPTH, DEPLOYMENT_EDGE_MARGIN, DEPLOYMENT_VERTICAL_MARGIN,
    MIN_DAMAGE_MODIFIER,
};
use crate::battle::formation::{Formation, FormationType};
use crate::battle::resolution::{compute_damage, roll_damage_factor};
use crate::battle::rewards::{victory_gold, LootPolicy, NoLoot, Rewards};
use crate::battle::tactics::{BattleTactics, TacticModifiers, TacticType};
use crate::battle::terrain::{BattleTerrain, TerrainEffects, TerrainType};
use crate::battle::units::{BattleUnit, DamageOutcome};
use crate::battle::weather::{BattleWeather, WeatherEffects, WeatherType};
use crate::campaign::party::Roster;
use crate::core::config::BattleConfig;
use crate::core::error::{BattleError, Result};
use crate::core::types::{Side, UnitId, Vec2};

/// Battle phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BattlePhase {
    #[default]
    Deployment, // Waiting for the order to engage
    Combat,     // Battle in progress
    Finished,   // Battle over
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BattleEventType {
    BattleStarted,
    Damage {
        attacker: UnitId,
        defender: UnitId,
        amount: f32,
    },
    UnitDefeated {
        unit: UnitId,
        side: Side,
    },
    BattleEnded {
        player_won: bool,
    },
}

/// Log entry for battle events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleEvent {
    /// Battle clock (seconds of combat) when the event happened
    pub time: f32,
    pub event_type: BattleEventType,
    pub description: String,
}

/// Bounded log; the oldest entries fall off once full
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleEventLog {
    events: VecDeque<BattleEvent>,
    capacity: usize,
    total_logged: u64,
}

impl BattleEventLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
            total_logged: 0,
        }
    }

    pub fn push(&mut self, event_type: BattleEventType, description: String, time: f32) {
        if self.events.len() == self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(BattleEvent {
            time,
            event_type,
            description,
        });
        self.total_logged += 1;
    }

    /// Up to `n` most recent events, oldest first
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &BattleEvent> {
        self.events.iter().skip(self.events.len().saturating_sub(n))
    }

    pub fn iter(&self) -> impl Iterator<Item = &BattleEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Events ever logged, including those already dropped
    pub fn total_logged(&self) -> u64 {
        self.total_logged
    }
}

/// Units and standing orders of one side
#[derive(Debug, Clone, Default)]
struct SideState {
    /// Living units only, in deployment order
    units: Vec<BattleUnit>,
    deployed: usize,
    /// Arranged formation not yet handed to tactics
    formation: Option<Formation>,
    tactics: Option<BattleTactics>,
}

impl SideState {
    fn centroid(&self) -> Option<Vec2> {
        Vec2::centroid(self.units.iter().map(|u| u.position))
    }
}

/// Headline numbers for presentation layers and tooling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleSummary {
    pub phase: BattlePhase,
    pub elapsed: f32,
    pub progress: f32,
    pub player_alive: usize,
    pub player_deployed: usize,
    pub enemy_alive: usize,
    pub enemy_deployed: usize,
    pub player_won: bool,
    pub gold: Option<u32>,
}

/// One battle between the player's roster and an enemy roster
#[derive(Debug)]
pub struct Battle {
    config: BattleConfig,
    phase: BattlePhase,
    battlefield_size: Vec2,

    player: SideState,
    enemy: SideState,
    /// Fallen units of both sides, in order of death
    casualties: Vec<BattleUnit>,
    /// Enemy roster as it entered the field; basis for gold and loot
    enemy_roster: Roster,

    elapsed: f32,
    progress: f32,
    player_won: bool,
    rewards: Option<Rewards>,
    log: BattleEventLog,

    terrain: Option<BattleTerrain>,
    weather: Option<BattleWeather>,

    loot_policy: Box<dyn LootPolicy>,
    rng: ChaCha8Rng,
}

impl Battle {
    /// Deploy both rosters; fails on empty rosters or a bad config
    pub fn new(player: &Roster, enemy: &Roster, config: BattleConfig) -> Result<Self> {
        Self::with_loot_policy(player, enemy, config, Box::new(NoLoot))
    }

    /// As `new`, with a custom policy for items and prisoners on victory
    pub fn with_loot_policy(
        player: &Roster,
        enemy: &Roster,
        config: BattleConfig,
        loot_policy: Box<dyn LootPolicy>,
    ) -> Result<Self> {
        config.validate()?;
        if player.total_troops() == 0 && enemy.total_troops() == 0 {
            return Err(BattleError::EmptyRosters);
        }
        for entry in player.entries().iter().chain(enemy.entries()) {
            entry.template.validate()?;
        }

        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let battlefield_size = Vec2::new(config.battlefield_width, config.battlefield_height);

        let mut battle = Self {
            log: BattleEventLog::new(config.event_log_capacity),
            config,
            phase: BattlePhase::Deployment,
            battlefield_size,
            player: SideState::default(),
            enemy: SideState::default(),
            casualties: Vec::new(),
            enemy_roster: enemy.clone(),
            elapsed: 0.0,
            progress: 0.0,
            player_won: false,
            rewards: None,
            terrain: None,
            weather: None,
            loot_policy,
            rng,
        };

        battle.deploy(Side::Player, player);
        battle.deploy(Side::Enemy, enemy);

        tracing::info!(
            "Battle deployed: {} player units vs {} enemy units",
            battle.player.deployed,
            battle.enemy.deployed
        );

        // One side never showed up
        if battle.player.units.is_empty() || battle.enemy.units.is_empty() {
            battle.finish();
        }

        Ok(battle)
    }

    fn deploy(&mut self, side: Side, roster: &Roster) {
        let mut next_id = (self.player.deployed + self.enemy.deployed) as u32;
        let mut units = Vec::with_capacity(roster.total_troops() as usize);
        for entry in roster.entries() {
            for _ in 0..entry.count {
                let position = deployment_position(side, self.battlefield_size, &mut self.rng);
                units.push(BattleUnit::new(
                    UnitId(next_id),
                    entry.template.clone(),
                    side,
                    position,
                ));
                next_id += 1;
            }
        }

        let state = self.side_mut(side);
        state.deployed = units.len();
        state.units = units;
    }

    // === PHASE CONTROL ===

    /// Leave deployment and start fighting
    pub fn proceed(&mut self) -> Result<()> {
        self.require_phase(BattlePhase::Deployment)?;
        self.phase = BattlePhase::Combat;
        self.log
            .push(BattleEventType::BattleStarted, "Battle has begun!".into(), self.elapsed);
        tracing::info!("Battle entered combat");
        Ok(())
    }

    /// Advance the battle by `dt` seconds
    ///
    /// Only combat advances the battle clock. Non-positive or non-finite
    /// steps are ignored.
    pub fn update(&mut self, dt: f32) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }

        match self.phase {
            BattlePhase::Deployment => {
                self.update_weather(dt);
            }
            BattlePhase::Combat => {
                self.elapsed += dt;
                self.update_weather(dt);
                self.update_progress();
                self.apply_tactics();
                self.update_side(Side::Player, dt);
                self.update_side(Side::Enemy, dt);
                self.check_battle_end();
            }
            BattlePhase::Finished => {}
        }
    }

    fn require_phase(&self, expected: BattlePhase) -> Result<()> {
        if self.phase != expected {
            return Err(BattleError::WrongPhase {
                expected,
                actual: self.phase,
            });
        }
        Ok(())
    }

    fn update_weather(&mut self, dt: f32) {
        if let Some(weather) = self.weather.as_mut() {
            weather.update(dt, self.battlefield_size, &mut self.rng);
        }
    }

    fn update_progress(&mut self) {
        let total = self.player.deployed + self.enemy.deployed;
        self.progress = if total == 0 {
            0.0
        } else {
            let remaining = self.player.units.len() + self.enemy.units.len();
            1.0 - remaining as f32 / total as f32
        };
    }

    fn apply_tactics(&mut self) {
        let player_center = self.player.centroid();
        let enemy_center = self.enemy.centroid();
        steer_side(&mut self.player, player_center, enemy_center);
        steer_side(&mut self.enemy, enemy_center, player_center);
    }

    /// Move and attack with every living unit of one side
    fn update_side(&mut self, side: Side, dt: f32) {
        let (own, foes) = match side {
            Side::Player => (&mut self.player, &mut self.enemy),
            Side::Enemy => (&mut self.enemy, &mut self.player),
        };
        let tactic_mods = own
            .tactics
            .as_ref()
            .map(|t| t.modifiers())
            .unwrap_or(TacticModifiers::NEUTRAL);
        let steered = own.tactics.is_some();
        let weather_fx = self
            .weather
            .as_ref()
            .map(|w| w.effects())
            .unwrap_or(WeatherEffects::NEUTRAL);
        let size = self.battlefield_size;

        // Own units never die during their own pass, so indices stay valid;
        // foes are removed the moment they fall.
        for ai in 0..own.units.len() {
            let attacker = &mut own.units[ai];
            let Some(ti) = nearest_enemy(attacker, &foes.units) else {
                continue;
            };

            let enemy_position = foes.units[ti].position;
            let distance = attacker.position.distance(&enemy_position);
            let terrain_fx = terrain_effects(self.terrain.as_ref(), attacker.position);

            if distance > attacker.template.attack_range {
                let modifier = (terrain_fx.movement * weather_fx.movement * tactic_mods.speed)
                    .max(self.config.min_movement_modifier);
                // Never step past the target
                let step = (attacker.template.speed * dt * modifier).min(distance);
                if steered {
                    let direction = attacker.steering_direction(enemy_position);
                    attacker.position = attacker.position + direction * step;
                } else {
                    attacker.advance_toward(enemy_position, step);
                }
                attacker.position = clamp_to_field(attacker.position, size);
                continue;
            }

            attacker.attack_cooldown += dt;
            if attacker.attack_cooldown < attacker.template.attack_interval {
                continue;
            }
            attacker.attack_cooldown = 0.0;

            let situational = if attacker.template.category.is_ranged() {
                terrain_fx.ranged * weather_fx.ranged
            } else {
                terrain_fx.melee
            } * tactic_mods.damage;
            let factor = roll_damage_factor(&mut self.rng, self.config.damage_variance);
            let armor = foes.units[ti].template.armor;
            let damage = compute_damage(attacker.template.damage, factor, armor)
                * situational.max(MIN_DAMAGE_MODIFIER);

            resolve_attack(
                attacker,
                &mut foes.units,
                ti,
                damage,
                &mut self.casualties,
                &mut self.log,
                self.elapsed,
            );
        }
    }

    fn check_battle_end(&mut self) {
        if self.player.units.is_empty() || self.enemy.units.is_empty() {
            self.finish();
        }
    }

    fn finish(&mut self) {
        self.phase = BattlePhase::Finished;
        self.player_won = !self.player.units.is_empty();
        self.update_progress();

        let rewards = if self.player_won {
            let gold = victory_gold(
                self.enemy_roster.total_troops(),
                self.player.units.len(),
                self.player.deployed,
                self.config.gold_per_enemy_troop,
            );
            let loot = self.loot_policy.loot(&self.enemy_roster, &mut self.rng);
            Rewards {
                gold,
                items: loot.items,
                prisoners: loot.prisoners,
            }
        } else {
            Rewards::none()
        };

        let description = if self.player_won {
            format!("Victory! {} gold taken", rewards.gold)
        } else {
            "Defeat!".to_string()
        };
        self.log.push(
            BattleEventType::BattleEnded {
                player_won: self.player_won,
            },
            description,
            self.elapsed,
        );
        tracing::info!(
            "Battle finished after {:.1}s: player_won={}, survivors {}/{}, gold {}",
            self.elapsed,
            self.player_won,
            self.player.units.len(),
            self.player.deployed,
            rewards.gold
        );

        self.rewards = Some(rewards);
    }

    // === SETUP ===

    /// Generate terrain for this battlefield from the battle's random source
    pub fn set_terrain(&mut self, terrain_type: TerrainType) -> Result<&BattleTerrain> {
        self.require_phase(BattlePhase::Deployment)?;
        let terrain = BattleTerrain::generate(terrain_type, self.battlefield_size, &mut self.rng);
        tracing::debug!("Terrain set to {:?}", terrain_type);
        Ok(&*self.terrain.insert(terrain))
    }

    pub fn set_weather(
        &mut self,
        weather_type: WeatherType,
        hour: f32,
    ) -> Result<&mut BattleWeather> {
        self.require_phase(BattlePhase::Deployment)?;
        tracing::debug!("Weather set to {:?} at {:.1}h", weather_type, hour);
        Ok(self.weather.insert(BattleWeather::new(weather_type, hour)))
    }

    /// Arrange a side into a formation around its centroid
    ///
    /// Deployment only. Units are placed directly on their slots (clamped to
    /// the field). Returns the number of units arranged.
    pub fn arrange_formation(
        &mut self,
        side: Side,
        formation_type: FormationType,
        spacing: f32,
        rotation: f32,
    ) -> Result<usize> {
        self.require_phase(BattlePhase::Deployment)?;
        if !(spacing.is_finite() && spacing >= 0.0 && rotation.is_finite()) {
            return Err(BattleError::InvalidConfig(format!(
                "formation spacing {} / rotation {} must be finite, spacing non-negative",
                spacing, rotation
            )));
        }

        let size = self.battlefield_size;
        let state = match side {
            Side::Player => &mut self.player,
            Side::Enemy => &mut self.enemy,
        };
        let Some(center) = state.centroid() else {
            return Ok(0);
        };

        let mut formation = Formation::new(formation_type, center)
            .with_spacing(spacing)
            .with_rotation(rotation);
        formation.assign(state.units.iter().map(|u| u.id));
        let arranged = formation.layout(&mut state.units, &mut self.rng);

        for unit in &mut state.units {
            unit.position = clamp_to_field(unit.target_position, size);
            unit.target_position = unit.position;
        }

        match state.tactics.as_mut() {
            Some(tactics) => tactics.formation = formation,
            None => state.formation = Some(formation),
        }
        tracing::debug!("{:?} arranged {} units in {:?}", side, arranged, formation_type);
        Ok(arranged)
    }

    /// Order a tactic for one side; takes effect on the next tick
    ///
    /// The first order adopts the side's arranged formation, or a line
    /// around its centroid when none was arranged.
    pub fn set_tactics(&mut self, side: Side, tactic: TacticType) -> Result<()> {
        if self.phase == BattlePhase::Finished {
            return Err(BattleError::WrongPhase {
                expected: BattlePhase::Combat,
                actual: self.phase,
            });
        }

        let state = self.side_mut(side);
        match state.tactics.as_mut() {
            Some(tactics) => tactics.set_tactic(tactic),
            None => {
                let formation = match state.formation.take() {
                    Some(formation) => formation,
                    None => {
                        let mut line = Formation::new(
                            FormationType::Line,
                            state.centroid().unwrap_or_default(),
                        );
                        line.assign(state.units.iter().map(|u| u.id));
                        line
                    }
                };
                let mut tactics = BattleTactics::new(formation);
                tactics.set_tactic(tactic);
                state.tactics = Some(tactics);
            }
        }
        tracing::debug!("{:?} ordered to {:?}", side, tactic);
        Ok(())
    }

    // === QUERIES ===

    fn side(&self, side: Side) -> &SideState {
        match side {
            Side::Player => &self.player,
            Side::Enemy => &self.enemy,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut SideState {
        match side {
            Side::Player => &mut self.player,
            Side::Enemy => &mut self.enemy,
        }
    }

    pub fn phase(&self) -> BattlePhase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.phase == BattlePhase::Finished
    }

    pub fn player_won(&self) -> bool {
        self.player_won
    }

    /// Fraction of deployed units that have fallen, in [0, 1]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Seconds of combat so far
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn battlefield_size(&self) -> Vec2 {
        self.battlefield_size
    }

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    /// Living units of one side
    pub fn living_units(&self, side: Side) -> &[BattleUnit] {
        &self.side(side).units
    }

    /// Units that have fallen, both sides, in order of death
    pub fn casualties(&self) -> &[BattleUnit] {
        &self.casualties
    }

    pub fn deployed_count(&self, side: Side) -> usize {
        self.side(side).deployed
    }

    pub fn alive_count(&self, side: Side) -> usize {
        self.side(side).units.len()
    }

    pub fn dead_count(&self, side: Side) -> usize {
        self.casualties.iter().filter(|u| u.side == side).count()
    }

    /// Find a unit by id, living or dead
    pub fn unit(&self, id: UnitId) -> Option<&BattleUnit> {
        self.player
            .units
            .iter()
            .chain(&self.enemy.units)
            .chain(&self.casualties)
            .find(|u| u.id == id)
    }

    pub fn events(&self) -> &BattleEventLog {
        &self.log
    }

    /// Up to `n` most recent events, oldest first
    pub fn recent_events(&self, n: usize) -> impl Iterator<Item = &BattleEvent> {
        self.log.recent(n)
    }

    pub fn terrain(&self) -> Option<&BattleTerrain> {
        self.terrain.as_ref()
    }

    pub fn weather(&self) -> Option<&BattleWeather> {
        self.weather.as_ref()
    }

    pub fn tactics(&self, side: Side) -> Option<&BattleTactics> {
        self.side(side).tactics.as_ref()
    }

    /// Terrain modifiers at a position, neutral when no terrain is set
    pub fn terrain_effects_at(&self, position: Vec2) -> TerrainEffects {
        terrain_effects(self.terrain.as_ref(), position)
    }

    /// Combined weather and tactic morale multiplier for a side
    pub fn morale_modifier(&self, side: Side) -> f32 {
        let weather = self.weather.as_ref().map(|w| w.effects().morale).unwrap_or(1.0);
        let tactic = self
            .side(side)
            .tactics
            .as_ref()
            .map(|t| t.modifiers().morale)
            .unwrap_or(1.0);
        weather * tactic
    }

    /// Rewards once the battle is finished and until they are taken
    pub fn rewards(&self) -> Option<&Rewards> {
        self.rewards.as_ref()
    }

    /// Hand the rewards out; returns `Some` exactly once per battle
    pub fn take_rewards(&mut self) -> Option<Rewards> {
        self.rewards.take()
    }

    pub fn summary(&self) -> BattleSummary {
        BattleSummary {
            phase: self.phase,
            elapsed: self.elapsed,
            progress: self.progress,
            player_alive: self.player.units.len(),
            player_deployed: self.player.deployed,
            enemy_alive: self.enemy.units.len(),
            enemy_deployed: self.enemy.deployed,
            player_won: self.player_won,
            gold: self.rewards.as_ref().map(|r| r.gold),
        }
    }
}

/// Index of the nearest living enemy; the first of equally near ones wins
fn nearest_enemy(unit: &BattleUnit, enemies: &[BattleUnit]) -> Option<usize> {
    enemies
        .iter()
        .enumerate()
        .filter(|(_, e)| e.is_alive())
        .min_by_key(|(_, e)| OrderedFloat(unit.position.distance(&e.position)))
        .map(|(i, _)| i)
}

/// Apply one hit; a killed defender leaves its roster immediately
fn resolve_attack(
    attacker: &BattleUnit,
    defenders: &mut Vec<BattleUnit>,
    target: usize,
    damage: f32,
    casualties: &mut Vec<BattleUnit>,
    log: &mut BattleEventLog,
    time: f32,
) {
    let defender = &mut defenders[target];
    let outcome = defender.take_damage(damage);
    if outcome == DamageOutcome::Ignored {
        return;
    }

    log.push(
        BattleEventType::Damage {
            attacker: attacker.id,
            defender: defender.id,
            amount: damage,
        },
        format!(
            "{} dealt {:.1} damage to {}",
            attacker.name(),
            damage,
            defender.name()
        ),
        time,
    );
    tracing::trace!(
        "{} {} hit {} {} for {:.1}",
        attacker.name(),
        attacker.id,
        defender.name(),
        defender.id,
        damage
    );

    if outcome == DamageOutcome::Killed {
        let fallen = defenders.remove(target);
        log.push(
            BattleEventType::UnitDefeated {
                unit: fallen.id,
                side: fallen.side,
            },
            format!("{} was defeated!", fallen.name()),
            time,
        );
        tracing::debug!(
            "{:?} {} {} fell at {:.1}s",
            fallen.side,
            fallen.name(),
            fallen.id,
            time
        );
        casualties.push(fallen);
    }
}

/// Refresh tactic targets for a side that has standing orders
fn steer_side(state: &mut SideState, own_center: Option<Vec2>, enemy_center: Option<Vec2>) {
    let (Some(tactics), Some(own_center), Some(enemy_center)) =
        (state.tactics.as_mut(), own_center, enemy_center)
    else {
        return;
    };
    tactics.formation.center = own_center;
    for unit in &mut state.units {
        tactics.apply_to(unit, enemy_center);
    }
}

fn terrain_effects(terrain: Option<&BattleTerrain>, position: Vec2) -> TerrainEffects {
    terrain
        .map(|t| t.effects_at(position))
        .unwrap_or(TerrainEffects::NEUTRAL)
}

fn clamp_to_field(position: Vec2, size: Vec2) -> Vec2 {
    Vec2::new(position.x.clamp(0.0, size.x), position.y.clamp(0.0, size.y))
}

/// Random spot in a side's deployment band
///
/// Players deploy along the left edge, enemies along the right. Margins
/// shrink with the field so small battlefields still have room.
fn deployment_position<R: Rng + ?Sized>(side: Side, size: Vec2, rng: &mut R) -> Vec2 {
    let margin = DEPLOYMENT_EDGE_MARGIN.min(size.x * 0.05);
    let depth = DEPLOYMENT_BAND_DEPTH.min(size.x * 0.2);
    let vertical = DEPLOYMENT_VERTICAL_MARGIN.min(size.y * 0.1);

    let x = match side {
        Side::Player => sample_band(rng, margin, margin + depth),
        Side::Enemy => sample_band(rng, size.x - margin - depth, size.x - margin),
    };
    let y = sample_band(rng, vertical, size.y - vertical);
    Vec2::new(x, y)
}

/// Uniform in [low, high); a band that rounds to nothing yields `low`
fn sample_band<R: Rng + ?Sized>(rng: &mut R, low: f32, high: f32) -> f32 {
    if high > low {
        rng.gen_range(low..high)
    } else {
        low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::unit_type::UnitTemplate;
    use crate::core::config::MAX_BATTLEFIELD_EXTENT;
    use std::sync::Arc;

    fn roster(template: UnitTemplate, count: u32) -> Roster {
        Roster::new().with(Arc::new(template), count)
    }

    fn seeded() -> BattleConfig {
        BattleConfig::default().with_seed(11)
    }

    #[test]
    fn test_rejects_two_empty_rosters() {
        let result = Battle::new(&Roster::new(), &Roster::new(), seeded());
        assert!(matches!(result, Err(BattleError::EmptyRosters)));
    }

    #[test]
    fn test_rejects_bad_battlefield() {
        let config = BattleConfig {
            battlefield_height: -1.0,
            ..seeded()
        };
        let result = Battle::new(&roster(UnitTemplate::infantry(), 1), &Roster::new(), config);
        assert!(matches!(result, Err(BattleError::InvalidBattlefield { .. })));
    }

    #[test]
    fn test_deployment_bands() {
        let battle = Battle::new(
            &roster(UnitTemplate::infantry(), 20),
            &roster(UnitTemplate::archer(), 20),
            seeded(),
        )
        .unwrap();
        assert_eq!(battle.phase(), BattlePhase::Deployment);
        for unit in battle.living_units(Side::Player) {
            assert!((50.0..200.0).contains(&unit.position.x));
            assert!((50.0..550.0).contains(&unit.position.y));
            assert_eq!(unit.health(), 100.0);
        }
        for unit in battle.living_units(Side::Enemy) {
            assert!((800.0..950.0).contains(&unit.position.x));
        }
    }

    #[test]
    fn test_ids_follow_input_order() {
        let battle = Battle::new(
            &roster(UnitTemplate::infantry(), 2),
            &roster(UnitTemplate::archer(), 3),
            seeded(),
        )
        .unwrap();
        let ids: Vec<u32> = battle
            .living_units(Side::Player)
            .iter()
            .chain(battle.living_units(Side::Enemy))
            .map(|u| u.id.0)
            .collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_deployment_is_gated() {
        let mut battle = Battle::new(
            &roster(UnitTemplate::cavalry(), 2),
            &roster(UnitTemplate::cavalry(), 2),
            seeded(),
        )
        .unwrap();
        let before: Vec<Vec2> = battle
            .living_units(Side::Player)
            .iter()
            .map(|u| u.position)
            .collect();
        for _ in 0..50 {
            battle.update(0.1);
        }
        let after: Vec<Vec2> = battle
            .living_units(Side::Player)
            .iter()
            .map(|u| u.position)
            .collect();
        assert_eq!(before, after);
        assert_eq!(battle.elapsed(), 0.0);

        battle.proceed().unwrap();
        assert_eq!(battle.phase(), BattlePhase::Combat);
        assert!(matches!(battle.proceed(), Err(BattleError::WrongPhase { .. })));
    }

    #[test]
    fn test_degenerate_dt_ignored() {
        let mut battle = Battle::new(
            &roster(UnitTemplate::infantry(), 1),
            &roster(UnitTemplate::infantry(), 1),
            seeded(),
        )
        .unwrap();
        battle.proceed().unwrap();
        battle.update(f32::NAN);
        battle.update(-1.0);
        battle.update(0.0);
        assert_eq!(battle.elapsed(), 0.0);
    }

    #[test]
    fn test_units_close_distance() {
        let mut battle = Battle::new(
            &roster(UnitTemplate::infantry(), 1),
            &roster(UnitTemplate::infantry(), 1),
            seeded(),
        )
        .unwrap();
        battle.proceed().unwrap();
        let gap = |b: &Battle| {
            b.living_units(Side::Player)[0]
                .position
                .distance(&b.living_units(Side::Enemy)[0].position)
        };
        let start = gap(&battle);
        battle.update(1.0);
        // Both close at speed 5
        assert!((start - gap(&battle) - 10.0).abs() < 1e-2);
    }

    #[test]
    fn test_nearest_enemy_tie_breaks_to_first() {
        let template = Arc::new(UnitTemplate::infantry());
        let me = BattleUnit::new(UnitId(0), template.clone(), Side::Player, Vec2::new(0.0, 0.0));
        let foes = vec![
            BattleUnit::new(UnitId(1), template.clone(), Side::Enemy, Vec2::new(10.0, 0.0)),
            BattleUnit::new(UnitId(2), template.clone(), Side::Enemy, Vec2::new(0.0, 5.0)),
            BattleUnit::new(UnitId(3), template.clone(), Side::Enemy, Vec2::new(-5.0, 0.0)),
        ];
        assert_eq!(nearest_enemy(&me, &foes), Some(1));
        assert_eq!(nearest_enemy(&me, &[]), None);
    }

    #[test]
    fn test_attack_on_dead_unit_is_noop() {
        let template = Arc::new(UnitTemplate::infantry());
        let attacker = BattleUnit::new(UnitId(0), template.clone(), Side::Player, Vec2::ZERO);
        let mut dead = BattleUnit::new(UnitId(1), template.clone(), Side::Enemy, Vec2::ZERO);
        dead.take_damage(1000.0);
        let mut defenders = vec![dead];
        let mut casualties = Vec::new();
        let mut log = BattleEventLog::new(10);

        resolve_attack(&attacker, &mut defenders, 0, 50.0, &mut casualties, &mut log, 1.0);

        assert_eq!(defenders.len(), 1);
        assert!(casualties.is_empty());
        assert!(log.is_empty());
    }

    #[test]
    fn test_kill_moves_unit_to_casualties() {
        let template = Arc::new(UnitTemplate::infantry());
        let attacker = BattleUnit::new(UnitId(0), template.clone(), Side::Player, Vec2::ZERO);
        let mut defenders = vec![
            BattleUnit::new(UnitId(1), template.clone(), Side::Enemy, Vec2::ZERO),
            BattleUnit::new(UnitId(2), template.clone(), Side::Enemy, Vec2::ZERO),
        ];
        let mut casualties = Vec::new();
        let mut log = BattleEventLog::new(10);

        resolve_attack(&attacker, &mut defenders, 0, 150.0, &mut casualties, &mut log, 2.5);

        assert_eq!(defenders.len(), 1);
        assert_eq!(defenders[0].id, UnitId(2));
        assert_eq!(casualties[0].id, UnitId(1));
        let messages: Vec<&str> = log.iter().map(|e| e.description.as_str()).collect();
        assert_eq!(
            messages,
            vec!["Infantry dealt 150.0 damage to Infantry", "Infantry was defeated!"]
        );
        assert!(log.iter().all(|e| e.time == 2.5));
    }

    #[test]
    fn test_event_log_bounded() {
        let mut log = BattleEventLog::new(3);
        for i in 0..5 {
            log.push(BattleEventType::BattleStarted, format!("e{i}"), i as f32);
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.total_logged(), 5);
        let recent: Vec<&str> = log.recent(2).map(|e| e.description.as_str()).collect();
        assert_eq!(recent, vec!["e3", "e4"]);
        assert_eq!(log.recent(10).count(), 3);
    }

    #[test]
    fn test_setup_only_during_deployment() {
        let mut battle = Battle::new(
            &roster(UnitTemplate::infantry(), 3),
            &roster(UnitTemplate::infantry(), 3),
            seeded(),
        )
        .unwrap();
        assert!(battle.set_terrain(TerrainType::Forest).is_ok());
        assert!(battle.set_weather(WeatherType::Rain, 14.0).is_ok());
        battle.proceed().unwrap();
        assert!(battle.set_terrain(TerrainType::Hills).is_err());
        assert!(battle.set_weather(WeatherType::Fog, 3.0).is_err());
        assert!(battle
            .arrange_formation(Side::Player, FormationType::Square, 20.0, 0.0)
            .is_err());
        // Orders may still change mid-fight
        assert!(battle.set_tactics(Side::Player, TacticType::Charge).is_ok());
    }

    #[test]
    fn test_arrange_formation_places_units() {
        let mut battle = Battle::new(
            &roster(UnitTemplate::infantry(), 4),
            &roster(UnitTemplate::infantry(), 1),
            seeded(),
        )
        .unwrap();
        let arranged = battle
            .arrange_formation(Side::Player, FormationType::Line, 10.0, 0.0)
            .unwrap();
        assert_eq!(arranged, 4);

        let units = battle.living_units(Side::Player);
        let y = units[0].position.y;
        assert!(units.iter().all(|u| (u.position.y - y).abs() < 1e-3));
        for pair in units.windows(2) {
            assert!((pair[1].position.x - pair[0].position.x - 10.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_tactics_adopt_arranged_formation() {
        let mut battle = Battle::new(
            &roster(UnitTemplate::infantry(), 4),
            &roster(UnitTemplate::infantry(), 4),
            seeded(),
        )
        .unwrap();
        battle
            .arrange_formation(Side::Enemy, FormationType::Circle, 15.0, 0.0)
            .unwrap();
        battle.set_tactics(Side::Enemy, TacticType::Flank).unwrap();
        let tactics = battle.tactics(Side::Enemy).unwrap();
        assert_eq!(tactics.formation.formation_type, FormationType::Circle);
        assert_eq!(tactics.formation.len(), 4);
        assert_eq!(tactics.current(), TacticType::Flank);
    }

    #[test]
    fn test_morale_modifier_combines() {
        let mut battle = Battle::new(
            &roster(UnitTemplate::infantry(), 1),
            &roster(UnitTemplate::infantry(), 1),
            seeded(),
        )
        .unwrap();
        assert_eq!(battle.morale_modifier(Side::Player), 1.0);
        battle.set_weather(WeatherType::Storm, 12.0).unwrap();
        battle.set_tactics(Side::Player, TacticType::Charge).unwrap();
        assert!((battle.morale_modifier(Side::Player) - 0.84).abs() < 1e-5);
        assert!((battle.morale_modifier(Side::Enemy) - 0.7).abs() < 1e-5);
    }

    #[test]
    fn test_hold_position_stays_put() {
        let mut battle = Battle::new(
            &roster(UnitTemplate::infantry(), 3),
            &roster(UnitTemplate::infantry(), 3),
            seeded(),
        )
        .unwrap();
        battle.set_tactics(Side::Player, TacticType::HoldPosition).unwrap();
        let before: Vec<Vec2> = battle
            .living_units(Side::Player)
            .iter()
            .map(|u| u.position)
            .collect();
        battle.proceed().unwrap();
        for _ in 0..10 {
            battle.update(0.1);
        }
        let after: Vec<Vec2> = battle
            .living_units(Side::Player)
            .iter()
            .map(|u| u.position)
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_take_rewards_once() {
        let mut battle = Battle::new(&roster(UnitTemplate::cavalry(), 5), &Roster::new(), seeded())
            .unwrap();
        assert!(battle.is_complete());
        assert!(battle.take_rewards().is_some());
        assert!(battle.take_rewards().is_none());
        assert!(battle.rewards().is_none());
    }

    /// One-on-one battle with both units placed on a horizontal line
    fn placed_duel(player: UnitTemplate, enemy: UnitTemplate, px: f32, ex: f32) -> Battle {
        let config = seeded().without_variance();
        let mut battle = Battle::new(&roster(player, 1), &roster(enemy, 1), config).unwrap();
        battle.player.units[0].position = Vec2::new(px, 300.0);
        battle.enemy.units[0].position = Vec2::new(ex, 300.0);
        battle
    }

    fn gap(battle: &Battle) -> f32 {
        battle.player.units[0].distance_to(&battle.enemy.units[0])
    }

    /// Amount of the first hit dealt by `attacker`
    fn first_hit_by(battle: &Battle, attacker: UnitId) -> Option<f32> {
        battle.events().iter().find_map(|e| match e.event_type {
            BattleEventType::Damage {
                attacker: a,
                amount,
                ..
            } if a == attacker => Some(amount),
            _ => None,
        })
    }

    #[test]
    fn test_largest_battlefield_deploys_in_bands() {
        let config = BattleConfig {
            battlefield_width: MAX_BATTLEFIELD_EXTENT,
            battlefield_height: MAX_BATTLEFIELD_EXTENT,
            ..seeded()
        };
        let battle = Battle::new(
            &roster(UnitTemplate::infantry(), 10),
            &roster(UnitTemplate::infantry(), 10),
            config,
        )
        .unwrap();
        for unit in battle.living_units(Side::Player) {
            assert!((50.0..200.0).contains(&unit.position.x));
        }
        let far = MAX_BATTLEFIELD_EXTENT - 200.0..MAX_BATTLEFIELD_EXTENT - 50.0;
        for unit in battle.living_units(Side::Enemy) {
            assert!(far.contains(&unit.position.x));
            assert!((50.0..MAX_BATTLEFIELD_EXTENT - 50.0).contains(&unit.position.y));
        }
    }

    #[test]
    fn test_oversized_battlefield_rejected() {
        let config = BattleConfig {
            battlefield_width: 1.0e12,
            ..seeded()
        };
        let result = Battle::new(
            &roster(UnitTemplate::infantry(), 1),
            &roster(UnitTemplate::infantry(), 1),
            config,
        );
        assert!(matches!(result, Err(BattleError::InvalidBattlefield { .. })));
    }

    #[test]
    fn test_empty_band_yields_low_edge() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(sample_band(&mut rng, 5.0, 5.0), 5.0);
        assert_eq!(sample_band(&mut rng, 5.0, 4.0), 5.0);
        let x = sample_band(&mut rng, 1.0, 2.0);
        assert!((1.0..2.0).contains(&x));
    }

    #[test]
    fn test_weather_floor_keeps_units_moving() {
        let mut battle =
            placed_duel(UnitTemplate::infantry(), UnitTemplate::infantry(), 100.0, 500.0);
        battle.set_weather(WeatherType::Rain, 12.0).unwrap().set_intensity(0.0);
        battle.proceed().unwrap();
        battle.update(1.0);
        // Zero-intensity rain zeroes the movement factor; the floor of 0.1 remains
        assert!((gap(&battle) - 399.0).abs() < 1e-3, "gap {}", gap(&battle));
    }

    #[test]
    fn test_charge_speeds_up_approach() {
        let mut battle =
            placed_duel(UnitTemplate::infantry(), UnitTemplate::infantry(), 100.0, 500.0);
        battle.set_tactics(Side::Player, TacticType::Charge).unwrap();
        battle.proceed().unwrap();
        battle.update(1.0);
        // 5 * 1.5 for the charging side, 5 for the other
        assert!((400.0 - gap(&battle) - 12.5).abs() < 1e-3, "gap {}", gap(&battle));
    }

    #[test]
    fn test_swamp_slows_movement() {
        let mut battle =
            placed_duel(UnitTemplate::infantry(), UnitTemplate::infantry(), 100.0, 500.0);
        battle.set_terrain(TerrainType::Swamp).unwrap();
        let floor = battle.config().min_movement_modifier;
        let mp = battle.terrain_effects_at(Vec2::new(100.0, 300.0)).movement;
        let me = battle.terrain_effects_at(Vec2::new(500.0, 300.0)).movement;
        assert!(mp <= 0.6 && me <= 0.6);

        battle.proceed().unwrap();
        battle.update(1.0);
        let closed = 400.0 - gap(&battle);
        let expected = 5.0 * mp.max(floor) + 5.0 * me.max(floor);
        assert!((closed - expected).abs() < 1e-3, "closed {} expected {}", closed, expected);
        assert!(closed < 10.0);
    }

    #[test]
    fn test_charge_boosts_damage() {
        let mut battle =
            placed_duel(UnitTemplate::infantry(), UnitTemplate::infantry(), 100.0, 101.0);
        battle.set_tactics(Side::Player, TacticType::Charge).unwrap();
        battle.proceed().unwrap();
        battle.update(1.0);

        let base = 10.0 * 100.0 / 105.0;
        let charged = first_hit_by(&battle, UnitId(0)).unwrap();
        let plain = first_hit_by(&battle, UnitId(1)).unwrap();
        assert!((charged - base * 1.3).abs() < 1e-3, "charged hit {}", charged);
        assert!((plain - base).abs() < 1e-3, "plain hit {}", plain);
    }

    #[test]
    fn test_damage_floor_applies() {
        let mut battle =
            placed_duel(UnitTemplate::archer(), UnitTemplate::infantry(), 100.0, 110.0);
        battle.set_weather(WeatherType::Rain, 12.0).unwrap().set_intensity(0.0);
        battle.proceed().unwrap();
        battle.update(1.0);

        // Ranged factor is zero; the hit still lands at a tenth of its base
        let hit = first_hit_by(&battle, UnitId(0)).unwrap();
        assert!((hit - 15.0 * 100.0 / 105.0 * 0.1).abs() < 1e-4, "hit {}", hit);
    }
}
