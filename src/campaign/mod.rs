//! Campaign-side collaborators of a battle
//!
//! Parties supply the rosters a battle deploys and receive its rewards.

pub mod inventory;
pub mod item;
pub mod party;

pub use inventory::Inventory;
pub use item::{standard_items, Item, ItemCatalog, ItemId, ItemKind};
pub use party::{Party, Player, Roster, RosterEntry};
