//! Battle units: one soldier instantiated from a template
//!
//! Units are owned by the `Battle` that deployed them. Health and the alive
//! flag only move one way: once a unit is dead it stays dead.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::battle::constants::{COMBAT_PULL_RANGE_FACTOR, DEFAULT_FORMATION_COHESION};
use crate::battle::unit_type::UnitTemplate;
use crate::core::types::{Side, UnitId, Vec2};

/// Outcome of applying damage to a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Target was already dead; nothing changed
    Ignored,
    Wounded,
    Killed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleUnit {
    pub id: UnitId,
    pub template: Arc<UnitTemplate>,
    pub side: Side,
    pub position: Vec2,
    /// Where formation or tactics want this unit to be
    pub target_position: Vec2,
    health: f32,
    alive: bool,
    /// Seconds accumulated toward the next attack
    pub attack_cooldown: f32,
    /// 0 = ignores its formation slot, 1 = never leaves it
    pub formation_cohesion: f32,
}

impl BattleUnit {
    pub fn new(id: UnitId, template: Arc<UnitTemplate>, side: Side, position: Vec2) -> Self {
        let health = template.max_health;
        Self {
            id,
            template,
            side,
            position,
            target_position: position,
            health,
            alive: health > 0.0,
            attack_cooldown: 0.0,
            formation_cohesion: DEFAULT_FORMATION_COHESION,
        }
    }

    pub fn name(&self) -> &str {
        &self.template.name
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    /// Remaining health as a fraction of template max
    pub fn health_fraction(&self) -> f32 {
        (self.health / self.template.max_health).clamp(0.0, 1.0)
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn is_player_unit(&self) -> bool {
        self.side.is_player()
    }

    /// Subtract health; a dead unit ignores further damage
    pub fn take_damage(&mut self, amount: f32) -> DamageOutcome {
        if !self.alive {
            return DamageOutcome::Ignored;
        }
        self.health -= amount;
        if self.health <= 0.0 {
            self.alive = false;
            DamageOutcome::Killed
        } else {
            DamageOutcome::Wounded
        }
    }

    pub fn distance_to(&self, other: &BattleUnit) -> f32 {
        self.position.distance(&other.position)
    }

    pub fn in_attack_range(&self, other: &BattleUnit) -> bool {
        self.distance_to(other) <= self.template.attack_range
    }

    /// Move straight toward `destination` by `distance`; zero-length is a no-op
    pub fn advance_toward(&mut self, destination: Vec2, distance: f32) {
        let direction = (destination - self.position).normalize();
        self.position = self.position + direction * distance;
    }

    /// Steering direction blending the formation slot and the nearest enemy
    ///
    /// The slot pulls with weight `cohesion`; the enemy pulls with weight
    /// `1 - cohesion`, but only once it is within twice the attack range.
    pub fn steering_direction(&self, enemy_position: Vec2) -> Vec2 {
        let formation_force = (self.target_position - self.position) * self.formation_cohesion;

        let reach = self.template.attack_range * COMBAT_PULL_RANGE_FACTOR;
        let combat_force = if self.position.distance(&enemy_position) < reach {
            (enemy_position - self.position).normalize() * (1.0 - self.formation_cohesion)
        } else {
            Vec2::ZERO
        };

        (formation_force + combat_force).normalize()
    }
}
