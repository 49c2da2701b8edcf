//! Formation layout computation
//!
//! A formation assigns each governed unit a target slot around a center.
//! It never moves units; the combat loop eases them toward their targets.

use std::f32::consts::PI;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::battle::constants::DEFAULT_FORMATION_SPACING;
use crate::battle::units::BattleUnit;
use crate::core::types::{UnitId, Vec2};

/// Geometric arrangement of a formation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FormationType {
    #[default]
    Line,
    Square,
    Wedge,
    Circle,
    Scattered,
}

/// Formation governing a set of units by id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Formation {
    pub formation_type: FormationType,
    pub center: Vec2,
    pub spacing: f32,
    /// Radians, counter-clockwise
    pub rotation: f32,
    /// Governed units in slot order
    pub units: Vec<UnitId>,
}

impl Formation {
    pub fn new(formation_type: FormationType, center: Vec2) -> Self {
        Self {
            formation_type,
            center,
            spacing: DEFAULT_FORMATION_SPACING,
            rotation: 0.0,
            units: Vec::new(),
        }
    }

    pub fn with_spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    /// Replace the governed units, keeping the given order
    pub fn assign(&mut self, unit_ids: impl IntoIterator<Item = UnitId>) {
        self.units = unit_ids.into_iter().collect();
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Slot positions for `count` units
    ///
    /// Deterministic for every type except `Scattered`, which draws from `rng`.
    pub fn positions<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<Vec2> {
        if count == 0 {
            return Vec::new();
        }

        match self.formation_type {
            FormationType::Line => self.line_positions(count),
            FormationType::Square => self.square_positions(count),
            FormationType::Wedge => self.wedge_positions(count),
            FormationType::Circle => self.circle_positions(count),
            FormationType::Scattered => self.scattered_positions(count, rng),
        }
    }

    /// Write target positions of governed units found in `units`
    ///
    /// Slots are handed out in formation order. Ids with no matching unit
    /// (already dead, or never deployed) keep their slot so the remaining
    /// units do not shuffle. Returns the number of units updated.
    pub fn layout<R: Rng + ?Sized>(&self, units: &mut [BattleUnit], rng: &mut R) -> usize {
        let slots = self.positions(self.units.len(), rng);
        let mut updated = 0;
        for (id, slot) in self.units.iter().zip(slots) {
            if let Some(unit) = units.iter_mut().find(|u| u.id == *id) {
                unit.target_position = slot;
                updated += 1;
            }
        }
        updated
    }

    fn rotated(&self, point: Vec2) -> Vec2 {
        point.rotate_about(self.center, self.rotation)
    }

    fn line_positions(&self, count: usize) -> Vec<Vec2> {
        let total_width = (count - 1) as f32 * self.spacing;
        let start_x = self.center.x - total_width / 2.0;
        (0..count)
            .map(|i| self.rotated(Vec2::new(start_x + i as f32 * self.spacing, self.center.y)))
            .collect()
    }

    fn square_positions(&self, count: usize) -> Vec<Vec2> {
        let side = (count as f32).sqrt().ceil() as usize;
        let half = side as f32 / 2.0;
        (0..count)
            .map(|i| {
                let (row, col) = (i / side, i % side);
                let x = self.center.x + (col as f32 - half) * self.spacing;
                let y = self.center.y + (row as f32 - half) * self.spacing;
                self.rotated(Vec2::new(x, y))
            })
            .collect()
    }

    fn wedge_positions(&self, count: usize) -> Vec<Vec2> {
        let mut positions = Vec::with_capacity(count);
        let mut row = 0usize;
        // Row k holds k + 1 slots; rows are added until everyone has one
        while positions.len() < count {
            let in_row = row + 1;
            let row_width = (in_row - 1) as f32 * self.spacing;
            let start_x = self.center.x - row_width / 2.0;
            let y = self.center.y + row as f32 * self.spacing;
            for col in 0..in_row {
                if positions.len() == count {
                    break;
                }
                let x = start_x + col as f32 * self.spacing;
                positions.push(self.rotated(Vec2::new(x, y)));
            }
            row += 1;
        }
        positions
    }

    fn circle_positions(&self, count: usize) -> Vec<Vec2> {
        let radius = count as f32 * self.spacing / (2.0 * PI);
        let step = 2.0 * PI / count as f32;
        (0..count)
            .map(|i| {
                let angle = i as f32 * step + self.rotation;
                Vec2::new(
                    self.center.x + radius * angle.cos(),
                    self.center.y + radius * angle.sin(),
                )
            })
            .collect()
    }

    fn scattered_positions<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<Vec2> {
        let scatter_radius = self.spacing * (count as f32).sqrt();
        (0..count)
            .map(|_| {
                let angle = rng.gen_range(0.0..2.0 * PI);
                let distance = if scatter_radius > 0.0 {
                    rng.gen_range(0.0..=scatter_radius)
                } else {
                    0.0
                };
                Vec2::new(
                    self.center.x + distance * angle.cos(),
                    self.center.y + distance * angle.sin(),
                )
            })
            .collect()
    }
}
