//! Meadoworld Battle - real-time battle engine for an overworld strategy game

pub mod battle;
pub mod campaign;
pub mod core;
