use thiserror::Error;

use crate::battle::execution::BattlePhase;

#[derive(Error, Debug)]
pub enum BattleError {
    #[error("Both rosters are empty; a battle needs at least one unit")]
    EmptyRosters,

    #[error("Invalid battlefield extent: {width} x {height}")]
    InvalidBattlefield { width: f32, height: f32 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Operation requires phase {expected:?}, battle is in {actual:?}")]
    WrongPhase {
        expected: BattlePhase,
        actual: BattlePhase,
    },

    #[error("Unknown unit template: {0}")]
    UnknownTemplate(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BattleError>;
