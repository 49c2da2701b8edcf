//! Inventory - gold plus item counts for one party

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::campaign::item::{Item, ItemId};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory {
    gold: u32,
    items: AHashMap<ItemId, u32>,
    /// Local price overrides; items without one sell at base price
    prices: AHashMap<ItemId, f32>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_gold(gold: u32) -> Self {
        Self {
            gold,
            ..Default::default()
        }
    }

    pub fn gold(&self) -> u32 {
        self.gold
    }

    pub fn add_gold(&mut self, amount: u32) {
        self.gold = self.gold.saturating_add(amount);
    }

    /// Spend gold if there is enough, returns true if successful
    pub fn spend_gold(&mut self, amount: u32) -> bool {
        if self.gold < amount {
            return false;
        }
        self.gold -= amount;
        true
    }

    pub fn add_item(&mut self, item: &ItemId, count: u32) {
        if count == 0 {
            return;
        }
        let entry = self.items.entry(item.clone()).or_insert(0);
        *entry = entry.saturating_add(count);
    }

    /// Remove up to `count`, returns amount actually removed
    pub fn remove_item(&mut self, item: &ItemId, count: u32) -> u32 {
        let Some(held) = self.items.get_mut(item) else {
            return 0;
        };
        let removed = count.min(*held);
        *held -= removed;
        if *held == 0 {
            self.items.remove(item);
        }
        removed
    }

    pub fn item_count(&self, item: &ItemId) -> u32 {
        self.items.get(item).copied().unwrap_or(0)
    }

    pub fn price_of(&self, item: &Item) -> f32 {
        self.prices.get(&item.id).copied().unwrap_or(item.base_price)
    }

    pub fn set_price(&mut self, item: &ItemId, price: f32) {
        self.prices.insert(item.clone(), price);
    }

    pub fn items(&self) -> impl Iterator<Item = (&ItemId, u32)> {
        self.items.iter().map(|(id, count)| (id, *count))
    }
}
