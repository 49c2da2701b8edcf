//! Side-wide tactics
//!
//! A tactic sets how tightly units cling to their formation and where they
//! head, plus morale/speed/damage multipliers for the whole side.

use serde::{Deserialize, Serialize};

use crate::battle::constants::{
    FLANK_OFFSET, RETREAT_DISTANCE, SKIRMISH_DISENGAGE_DISTANCE, SKIRMISH_TRIGGER_RANGE_FACTOR,
};
use crate::battle::formation::Formation;
use crate::battle::units::BattleUnit;
use crate::core::types::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TacticType {
    Charge,
    #[default]
    HoldPosition,
    Skirmish,
    Flank,
    Retreat,
}

impl TacticType {
    /// Formation cohesion units adopt under this tactic
    pub fn cohesion(&self) -> f32 {
        match self {
            TacticType::Charge => 0.3,
            TacticType::HoldPosition => 0.9,
            TacticType::Skirmish => 0.6,
            TacticType::Flank => 0.7,
            TacticType::Retreat => 0.4,
        }
    }

    pub fn modifiers(&self) -> TacticModifiers {
        let (morale, speed, damage) = match self {
            TacticType::Charge => (1.2, 1.5, 1.3),
            TacticType::HoldPosition => (1.1, 0.5, 1.1),
            TacticType::Skirmish => (0.9, 1.2, 0.8),
            TacticType::Flank => (1.1, 1.3, 1.2),
            TacticType::Retreat => (0.5, 1.4, 0.6),
        };
        TacticModifiers {
            morale,
            speed,
            damage,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TacticModifiers {
    pub morale: f32,
    pub speed: f32,
    pub damage: f32,
}

impl TacticModifiers {
    pub const NEUTRAL: TacticModifiers = TacticModifiers {
        morale: 1.0,
        speed: 1.0,
        damage: 1.0,
    };
}

/// Tactic currently ordered for one side, with the formation it modifies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleTactics {
    current: TacticType,
    modifiers: TacticModifiers,
    pub formation: Formation,
}

impl BattleTactics {
    /// Starts out holding position
    pub fn new(formation: Formation) -> Self {
        let current = TacticType::default();
        Self {
            current,
            modifiers: current.modifiers(),
            formation,
        }
    }

    pub fn current(&self) -> TacticType {
        self.current
    }

    pub fn modifiers(&self) -> TacticModifiers {
        self.modifiers
    }

    pub fn set_tactic(&mut self, tactic: TacticType) {
        self.current = tactic;
        self.modifiers = tactic.modifiers();
    }

    /// Set cohesion and target position of one unit for the current tactic
    pub fn apply_to(&self, unit: &mut BattleUnit, enemy_center: Vec2) {
        unit.formation_cohesion = self.current.cohesion();

        match self.current {
            TacticType::Charge => {
                unit.target_position = enemy_center;
            }
            TacticType::HoldPosition => {}
            TacticType::Skirmish => {
                let trigger = unit.template.attack_range * SKIRMISH_TRIGGER_RANGE_FACTOR;
                if unit.position.distance(&enemy_center) < trigger {
                    let away = (unit.position - enemy_center).normalize();
                    unit.target_position = unit.position + away * SKIRMISH_DISENGAGE_DISTANCE;
                }
            }
            TacticType::Flank => {
                let mut perpendicular = (enemy_center - unit.position).perpendicular().normalize();
                // Units right of the enemy swing to the other flank
                if unit.position.x > enemy_center.x {
                    perpendicular = -perpendicular;
                }
                unit.target_position = enemy_center + perpendicular * FLANK_OFFSET;
            }
            TacticType::Retreat => {
                let away = (unit.position - self.formation.center).normalize();
                unit.target_position = unit.position + away * RETREAT_DISTANCE;
            }
        }
    }
}
