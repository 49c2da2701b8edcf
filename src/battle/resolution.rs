//! Per-hit damage resolution
//!
//! damage = base × roll × 100 / (100 + armor) × situational modifiers

use rand::Rng;

use crate::battle::constants::ARMOR_REDUCTION_BASE;

/// Fraction of damage that gets through `armor`
///
/// Negative armor is treated as none.
pub fn armor_reduction(armor: f32) -> f32 {
    ARMOR_REDUCTION_BASE / (ARMOR_REDUCTION_BASE + armor.max(0.0))
}

/// Damage for one hit before situational modifiers
pub fn compute_damage(base_damage: f32, factor: f32, armor: f32) -> f32 {
    base_damage * factor * armor_reduction(armor)
}

/// Uniform roll in [1 - variance, 1 + variance]; zero variance yields exactly 1
pub fn roll_damage_factor<R: Rng + ?Sized>(rng: &mut R, variance: f32) -> f32 {
    if variance <= 0.0 {
        return 1.0;
    }
    rng.gen_range((1.0 - variance)..=(1.0 + variance))
}
