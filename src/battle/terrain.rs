//! Battle terrain: heightmap and cover grid
//!
//! Generated once per battle from simplex noise plus per-cell cover rolls,
//! then read-only. Modifiers are always clamped to safe ranges so no query
//! can yield a zero or negative multiplier.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::battle::constants::TERRAIN_CELL_SIZE;
use crate::battle::noise;
use crate::core::types::Vec2;

/// Overall character of a battlefield
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TerrainType {
    #[default]
    Plains,
    Forest,
    Hills,
    Mountains,
    Swamp,
    Desert,
}

impl TerrainType {
    /// Noise sampling frequency; higher reads as rougher ground
    pub fn noise_frequency(&self) -> f32 {
        match self {
            TerrainType::Plains => 0.01,
            TerrainType::Mountains => 0.05,
            _ => 0.02,
        }
    }

    /// Probability that a cell holds cover (trees, rocks)
    pub fn cover_density(&self) -> f64 {
        match self {
            TerrainType::Forest => 0.3,
            TerrainType::Mountains => 0.2,
            TerrainType::Plains => 0.05,
            _ => 0.1,
        }
    }

    fn movement_factor(&self) -> f32 {
        match self {
            TerrainType::Swamp => 0.6,
            TerrainType::Forest => 0.8,
            TerrainType::Mountains => 0.7,
            TerrainType::Desert => 0.9,
            _ => 1.0,
        }
    }

    fn ranged_factor(&self) -> f32 {
        match self {
            TerrainType::Forest => 0.6,
            TerrainType::Mountains => 1.2,
            _ => 1.0,
        }
    }

    fn melee_factor(&self) -> f32 {
        match self {
            TerrainType::Forest => 0.9,
            TerrainType::Mountains => 0.8,
            TerrainType::Swamp => 0.7,
            _ => 1.0,
        }
    }

    fn visibility_factor(&self) -> f32 {
        match self {
            TerrainType::Forest => 0.7,
            TerrainType::Mountains => 1.3,
            TerrainType::Desert => 1.2,
            _ => 1.0,
        }
    }
}

/// Multipliers terrain applies at one position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TerrainEffects {
    /// Movement speed, in [0.2, 1.0]
    pub movement: f32,
    /// Ranged attack damage, in [0.3, 1.5]
    pub ranged: f32,
    /// Melee attack damage, in [0.6, 1.3]
    pub melee: f32,
    /// Sight range, in [0.4, 1.5]
    pub visibility: f32,
}

impl TerrainEffects {
    /// Effects that change nothing
    pub const NEUTRAL: TerrainEffects = TerrainEffects {
        movement: 1.0,
        ranged: 1.0,
        melee: 1.0,
        visibility: 1.0,
    };

    fn from_cell(terrain: TerrainType, height: f32, cover: bool) -> Self {
        let cover_penalty = |p: f32| if cover { p } else { 1.0 };

        let movement = (1.0 - height * 0.5) * terrain.movement_factor() * cover_penalty(0.8);
        let ranged = (1.0 + height * 0.3) * cover_penalty(0.7) * terrain.ranged_factor();
        // Cover doesn't hinder melee
        let melee = (1.0 + height * 0.2) * terrain.melee_factor();
        let visibility = (1.0 + height * 0.4) * cover_penalty(0.6) * terrain.visibility_factor();

        Self {
            movement: movement.clamp(0.2, 1.0),
            ranged: ranged.clamp(0.3, 1.5),
            melee: melee.clamp(0.6, 1.3),
            visibility: visibility.clamp(0.4, 1.5),
        }
    }
}

/// Static terrain grid for one battle
///
/// Cells are `TERRAIN_CELL_SIZE` world units square, stored row-major.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleTerrain {
    terrain_type: TerrainType,
    size: Vec2,
    width: usize,
    height: usize,
    heights: Vec<f32>,
    cover: Vec<bool>,
}

impl BattleTerrain {
    /// Generate terrain covering a battlefield of `size` world units
    pub fn generate<R: Rng + ?Sized>(terrain_type: TerrainType, size: Vec2, rng: &mut R) -> Self {
        let width = ((size.x / TERRAIN_CELL_SIZE).ceil() as usize).max(1);
        let height = ((size.y / TERRAIN_CELL_SIZE).ceil() as usize).max(1);

        // Random sampling origin so two battles on the same type differ
        let origin = Vec2::new(rng.gen_range(0.0..10_000.0), rng.gen_range(0.0..10_000.0));
        let frequency = terrain_type.noise_frequency();

        let mut heights = Vec::with_capacity(width * height);
        for cy in 0..height {
            for cx in 0..width {
                let wx = origin.x + cx as f32 * TERRAIN_CELL_SIZE;
                let wy = origin.y + cy as f32 * TERRAIN_CELL_SIZE;
                let n = noise::generate(wx * frequency, wy * frequency);
                heights.push(((n + 1.0) * 0.5).clamp(0.0, 1.0));
            }
        }

        let density = terrain_type.cover_density();
        let cover = (0..width * height).map(|_| rng.gen_bool(density)).collect();

        Self {
            terrain_type,
            size,
            width,
            height,
            heights,
            cover,
        }
    }

    pub fn terrain_type(&self) -> TerrainType {
        self.terrain_type
    }

    /// Battlefield extent this terrain covers (world units)
    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Grid dimensions in cells (columns, rows)
    pub fn grid_dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Nearest in-bounds cell index for a world position
    fn cell_index(&self, position: Vec2) -> usize {
        let clamp_axis = |v: f32, cells: usize| -> usize {
            let c = (v / TERRAIN_CELL_SIZE).floor();
            if c.is_nan() || c < 0.0 {
                0
            } else {
                (c as usize).min(cells - 1)
            }
        };
        let cx = clamp_axis(position.x, self.width);
        let cy = clamp_axis(position.y, self.height);
        cy * self.width + cx
    }

    /// Height in [0, 1] at the cell nearest `position`
    pub fn height_at(&self, position: Vec2) -> f32 {
        self.heights[self.cell_index(position)]
    }

    /// Whether the cell nearest `position` has cover
    pub fn has_cover_at(&self, position: Vec2) -> bool {
        self.cover[self.cell_index(position)]
    }

    /// Fraction of cells that hold cover
    pub fn cover_fraction(&self) -> f32 {
        let covered = self.cover.iter().filter(|c| **c).count();
        covered as f32 / self.cover.len() as f32
    }

    /// Terrain modifiers at a position; out-of-bounds positions are clamped
    pub fn effects_at(&self, position: Vec2) -> TerrainEffects {
        let idx = self.cell_index(position);
        TerrainEffects::from_cell(self.terrain_type, self.heights[idx], self.cover[idx])
    }
}
