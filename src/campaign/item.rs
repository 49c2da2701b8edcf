//! Trade items and the shared item catalog

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Stable key for an item across inventories and loot tables
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Food,
    RawMaterial,
    TradeGood,
    Equipment,
    Weapon,
    Armor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub kind: ItemKind,
    pub base_price: f32,
    pub weight: f32,
    pub description: String,
}

impl Item {
    pub fn new(
        name: &str,
        kind: ItemKind,
        base_price: f32,
        weight: f32,
        description: &str,
    ) -> Self {
        Self {
            id: ItemId::new(name.to_ascii_lowercase()),
            name: name.to_string(),
            kind,
            base_price,
            weight,
            description: description.to_string(),
        }
    }
}

/// Read-only list of known items
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    items: Vec<Item>,
}

impl ItemCatalog {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    pub fn standard() -> Self {
        use ItemKind::*;
        Self::new(vec![
            Item::new("Food", Food, 10.0, 1.0, "Basic food supplies"),
            Item::new("Grain", Food, 8.0, 1.0, "Raw grain"),
            Item::new("Bread", Food, 12.0, 0.5, "Baked bread"),
            Item::new("Fish", Food, 15.0, 1.0, "Fresh fish"),
            Item::new("Water", Food, 5.0, 2.0, "Fresh water"),
            Item::new("Iron", RawMaterial, 30.0, 5.0, "Raw iron ore"),
            Item::new("Wood", RawMaterial, 15.0, 3.0, "Lumber"),
            Item::new("Herbs", RawMaterial, 20.0, 0.5, "Medicinal herbs"),
            Item::new("Stone", RawMaterial, 25.0, 6.0, "Raw stone"),
            Item::new("Ore", RawMaterial, 35.0, 4.0, "Raw ore"),
            Item::new("Cloth", TradeGood, 20.0, 2.0, "Basic cloth material"),
            Item::new("Spices", TradeGood, 50.0, 1.0, "Exotic spices"),
            Item::new("Wine", TradeGood, 40.0, 2.0, "Fine wine"),
            Item::new("Salt", TradeGood, 25.0, 1.0, "Preserved salt"),
        ])
    }

    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|i| &i.id == id)
    }

    /// Look up by display name (case-insensitive)
    pub fn by_name(&self, name: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.name.eq_ignore_ascii_case(name))
    }

    pub fn of_kind(&self, kind: ItemKind) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(move |i| i.kind == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }
}

static STANDARD_ITEMS: OnceLock<ItemCatalog> = OnceLock::new();

/// Process-wide standard item catalog
pub fn standard_items() -> &'static ItemCatalog {
    STANDARD_ITEMS.get_or_init(ItemCatalog::standard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let catalog = standard_items();
        let mut ids: Vec<&ItemId> = catalog.iter().map(|i| &i.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), catalog.iter().count());
    }

    #[test]
    fn test_lookup() {
        let wine = standard_items().by_name("WINE").unwrap();
        assert_eq!(wine.id, ItemId::new("wine"));
        assert_eq!(standard_items().get(&wine.id).unwrap().base_price, 40.0);
        assert_eq!(standard_items().of_kind(ItemKind::Food).count(), 5);
    }
}
