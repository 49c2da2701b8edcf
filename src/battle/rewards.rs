//! Victory rewards and the loot hook
//!
//! Gold follows a fixed formula. Items and prisoners come from a
//! `LootPolicy`; the default policy yields nothing.

use std::fmt::Debug;
use std::sync::Arc;

use ahash::AHashMap;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::battle::unit_type::UnitTemplate;
use crate::campaign::inventory::Inventory;
use crate::campaign::item::ItemId;
use crate::campaign::party::Roster;

/// Spoils of a finished battle
///
/// Claiming consumes the value, so the same rewards cannot be paid twice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rewards {
    pub gold: u32,
    pub items: AHashMap<ItemId, u32>,
    pub prisoners: Vec<Arc<UnitTemplate>>,
}

impl Rewards {
    /// Nothing at all; what a defeat pays
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.gold == 0 && self.items.is_empty() && self.prisoners.is_empty()
    }

    /// Pay gold and items into `inventory`, enlist prisoners into `roster`
    pub fn claim(self, roster: &mut Roster, inventory: &mut Inventory) {
        inventory.add_gold(self.gold);
        for (item, count) in &self.items {
            inventory.add_item(item, *count);
        }
        for prisoner in self.prisoners {
            roster.add_troop(prisoner, 1);
        }
    }
}

/// Items and captives taken from a defeated roster
#[derive(Debug, Clone, Default)]
pub struct LootYield {
    pub items: AHashMap<ItemId, u32>,
    pub prisoners: Vec<Arc<UnitTemplate>>,
}

/// Decides what a victorious side strips from the defeated roster
pub trait LootPolicy: Debug + Send + Sync {
    fn loot(&self, defeated: &Roster, rng: &mut dyn RngCore) -> LootYield;
}

/// Takes nothing. No drop tables exist yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLoot;

impl LootPolicy for NoLoot {
    fn loot(&self, _defeated: &Roster, _rng: &mut dyn RngCore) -> LootYield {
        LootYield::default()
    }
}

/// Victory gold: enemy troops × rate × (1 + survivor fraction), truncated
pub fn victory_gold(
    enemy_troops: u32,
    survivors: usize,
    deployed: usize,
    gold_per_troop: f32,
) -> u32 {
    let survivor_fraction = if deployed == 0 {
        0.0
    } else {
        survivors as f32 / deployed as f32
    };
    let gold = enemy_troops as f32 * gold_per_troop * (1.0 + survivor_fraction);
    gold.max(0.0) as u32
}
