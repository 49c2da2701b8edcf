pub mod config;
pub mod error;
pub mod types;

pub use config::{BattleConfig, MAX_BATTLEFIELD_EXTENT};
pub use error::{BattleError, Result};
pub use types::{Side, UnitId, Vec2};
