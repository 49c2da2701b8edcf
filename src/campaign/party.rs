//! Parties: a troop roster plus the single inventory that pays for it
//!
//! The player is a named wrapper around a `Party`, not a subtype, so there is
//! exactly one inventory (and one gold balance) per party.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::battle::constants::{STARTING_PLAYER_GOLD, WAGE_PER_STRENGTH};
use crate::battle::unit_type::UnitTemplate;
use crate::campaign::inventory::Inventory;

/// One line of a roster
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterEntry {
    pub template: Arc<UnitTemplate>,
    pub count: u32,
}

/// Troops of one party: template -> count, in insertion order
///
/// Templates are keyed by name. Order matters only for deployment, which
/// walks entries front to back.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    entries: Vec<RosterEntry>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style add
    pub fn with(mut self, template: Arc<UnitTemplate>, count: u32) -> Self {
        self.add_troop(template, count);
        self
    }

    pub fn add_troop(&mut self, template: Arc<UnitTemplate>, count: u32) {
        if count == 0 {
            return;
        }
        match self.entries.iter_mut().find(|e| e.template.name == template.name) {
            Some(entry) => entry.count = entry.count.saturating_add(count),
            None => self.entries.push(RosterEntry { template, count }),
        }
    }

    /// Remove up to `count` troops of a template, returns amount removed
    pub fn remove_troop(&mut self, name: &str, count: u32) -> u32 {
        let Some(idx) = self.entries.iter().position(|e| e.template.name == name) else {
            return 0;
        };
        let removed = count.min(self.entries[idx].count);
        self.entries[idx].count -= removed;
        if self.entries[idx].count == 0 {
            self.entries.remove(idx);
        }
        removed
    }

    pub fn count_of(&self, name: &str) -> u32 {
        self.entries
            .iter()
            .find(|e| e.template.name == name)
            .map(|e| e.count)
            .unwrap_or(0)
    }

    pub fn total_troops(&self) -> u32 {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// Wage bill: Σ count × strength × 0.1
    pub fn total_wages(&self) -> f32 {
        self.entries
            .iter()
            .map(|e| e.count as f32 * e.template.strength * WAGE_PER_STRENGTH)
            .sum()
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Troops and the inventory that supports them
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Party {
    pub roster: Roster,
    pub inventory: Inventory,
}

impl Party {
    pub fn new(roster: Roster, inventory: Inventory) -> Self {
        Self { roster, inventory }
    }

    pub fn total_troops(&self) -> u32 {
        self.roster.total_troops()
    }
}

/// The player's party with a display name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub party: Party,
}

impl Player {
    /// New player with an empty roster and starting gold
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_roster(name, Roster::new())
    }

    /// Take over an existing roster with a fresh purse of starting gold
    pub fn with_roster(name: impl Into<String>, roster: Roster) -> Self {
        Self {
            name: name.into(),
            party: Party::new(roster, Inventory::with_gold(STARTING_PLAYER_GOLD)),
        }
    }

    pub fn gold(&self) -> u32 {
        self.party.inventory.gold()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_merges_by_name() {
        let mut roster = Roster::new();
        roster.add_troop(Arc::new(UnitTemplate::infantry()), 3);
        roster.add_troop(Arc::new(UnitTemplate::infantry()), 2);
        roster.add_troop(Arc::new(UnitTemplate::archer()), 0);
        assert_eq!(roster.entries().len(), 1);
        assert_eq!(roster.count_of("Infantry"), 5);
    }

    #[test]
    fn test_remove_drops_empty_entries() {
        let mut roster = Roster::new().with(Arc::new(UnitTemplate::cavalry()), 2);
        assert_eq!(roster.remove_troop("Cavalry", 5), 2);
        assert!(roster.is_empty());
        assert_eq!(roster.remove_troop("Cavalry", 1), 0);
    }

    #[test]
    fn test_wages() {
        // 10 infantry × strength 8 × 0.1 + 2 cavalry × 10 × 0.1
        let roster = Roster::new()
            .with(Arc::new(UnitTemplate::infantry()), 10)
            .with(Arc::new(UnitTemplate::cavalry()), 2);
        assert!((roster.total_wages() - 10.0).abs() < 1e-4);
        assert_eq!(roster.total_troops(), 12);
    }

    #[test]
    fn test_player_starting_gold() {
        let player = Player::new("Aldric");
        assert_eq!(player.gold(), STARTING_PLAYER_GOLD);
        assert_eq!(player.party.total_troops(), 0);
    }
}
