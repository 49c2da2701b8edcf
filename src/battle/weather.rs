//! Battle weather and time of day
//!
//! Weather scales visibility, movement, ranged accuracy and morale. The
//! particle list is presentation data only; nothing in combat reads it.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::battle::constants::{MAX_WEATHER_PARTICLES, PARTICLE_SPAWN_HEIGHT};
use crate::core::types::Vec2;

/// Atmospheric condition over the battlefield
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum WeatherType {
    #[default]
    Clear,
    Cloudy,
    Rain,
    Storm,
    Fog,
    Snow,
}

impl WeatherType {
    fn visibility_factor(&self) -> f32 {
        match self {
            Self::Clear => 1.0,
            Self::Cloudy => 0.9,
            Self::Rain => 0.7,
            Self::Storm => 0.5,
            Self::Fog => 0.3,
            Self::Snow => 0.6,
        }
    }

    fn movement_factor(&self) -> f32 {
        match self {
            Self::Clear => 1.0,
            Self::Rain => 0.8,
            Self::Storm => 0.6,
            Self::Snow => 0.7,
            _ => 0.9,
        }
    }

    fn ranged_factor(&self) -> f32 {
        match self {
            Self::Clear => 1.0,
            Self::Rain => 0.7,
            Self::Storm => 0.4,
            Self::Snow => 0.6,
            Self::Fog => 0.5,
            _ => 0.8,
        }
    }

    fn morale_factor(&self) -> f32 {
        match self {
            Self::Clear => 1.0,
            Self::Storm => 0.7,
            Self::Snow => 0.8,
            _ => 0.9,
        }
    }

    /// Particles spawned per update while under the cap
    pub fn particle_spawn_count(&self) -> usize {
        match self {
            Self::Rain => 20,
            Self::Storm => 30,
            Self::Snow => 15,
            _ => 0,
        }
    }

    fn particle_velocity(&self) -> Vec2 {
        match self {
            Self::Rain => Vec2::new(2.0, 15.0),
            Self::Storm => Vec2::new(4.0, 20.0),
            Self::Snow => Vec2::new(1.0, 3.0),
            _ => Vec2::ZERO,
        }
    }
}

/// Coarse bucket of the hour used for lighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeOfDay {
    Night,
    Dawn,
    Day,
    Dusk,
}

impl TimeOfDay {
    pub fn from_hour(hour: f32) -> Self {
        match hour {
            h if h < 6.0 => Self::Night,
            h if h < 8.0 => Self::Dawn,
            h if h < 18.0 => Self::Day,
            h if h < 20.0 => Self::Dusk,
            _ => Self::Night,
        }
    }

    pub fn visibility_factor(&self) -> f32 {
        match self {
            Self::Night => 0.5,
            Self::Dawn | Self::Dusk => 0.7,
            Self::Day => 1.0,
        }
    }
}

/// Multipliers weather applies to the whole battlefield
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherEffects {
    pub visibility: f32,
    pub movement: f32,
    pub ranged: f32,
    pub morale: f32,
}

impl WeatherEffects {
    pub const NEUTRAL: WeatherEffects = WeatherEffects {
        visibility: 1.0,
        movement: 1.0,
        ranged: 1.0,
        morale: 1.0,
    };
}

/// A falling raindrop or snowflake
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherParticle {
    pub position: Vec2,
    pub velocity: Vec2,
}

impl WeatherParticle {
    /// Advance; returns false once the particle has left the battlefield
    fn advance(&mut self, dt: f32, bounds: Vec2) -> bool {
        self.position = self.position + self.velocity * dt;
        self.position.y < bounds.y && self.position.x > 0.0 && self.position.x < bounds.x
    }
}

/// Weather state for one battle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleWeather {
    weather_type: WeatherType,
    intensity: f32,
    time_of_day: f32,
    particles: Vec<WeatherParticle>,
}

impl BattleWeather {
    /// New weather at full intensity; `hour` wraps into [0, 24)
    pub fn new(weather_type: WeatherType, hour: f32) -> Self {
        Self {
            weather_type,
            intensity: 1.0,
            time_of_day: wrap_hour(hour),
            particles: Vec::new(),
        }
    }

    pub fn weather_type(&self) -> WeatherType {
        self.weather_type
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    /// Set intensity, clamped into [0, 1]
    pub fn set_intensity(&mut self, intensity: f32) {
        self.intensity = if intensity.is_nan() {
            0.0
        } else {
            intensity.clamp(0.0, 1.0)
        };
    }

    /// Hour of day in [0, 24)
    pub fn time_of_day(&self) -> f32 {
        self.time_of_day
    }

    pub fn set_time_of_day(&mut self, hour: f32) {
        self.time_of_day = wrap_hour(hour);
    }

    pub fn time_bucket(&self) -> TimeOfDay {
        TimeOfDay::from_hour(self.time_of_day)
    }

    pub fn effects(&self) -> WeatherEffects {
        let w = self.weather_type;
        WeatherEffects {
            visibility: self.time_bucket().visibility_factor()
                * w.visibility_factor()
                * self.intensity,
            movement: w.movement_factor() * self.intensity,
            ranged: w.ranged_factor() * self.intensity,
            morale: w.morale_factor() * self.intensity,
        }
    }

    /// Live particles for presentation layers
    pub fn particles(&self) -> &[WeatherParticle] {
        &self.particles
    }

    /// Age particles, prune those outside the field, spawn new ones up to the cap
    pub fn update<R: Rng + ?Sized>(&mut self, dt: f32, battlefield_size: Vec2, rng: &mut R) {
        self.particles.retain_mut(|p| p.advance(dt, battlefield_size));

        if self.particles.len() >= MAX_WEATHER_PARTICLES || battlefield_size.x <= 0.0 {
            return;
        }

        let room = MAX_WEATHER_PARTICLES - self.particles.len();
        let spawn = self.weather_type.particle_spawn_count().min(room);
        let velocity = self.weather_type.particle_velocity() * self.intensity;
        for _ in 0..spawn {
            self.particles.push(WeatherParticle {
                position: Vec2::new(rng.gen_range(0.0..battlefield_size.x), PARTICLE_SPAWN_HEIGHT),
                velocity,
            });
        }
    }
}

impl Default for BattleWeather {
    fn default() -> Self {
        Self::new(WeatherType::Clear, 12.0)
    }
}

fn wrap_hour(hour: f32) -> f32 {
    if !hour.is_finite() {
        return 12.0;
    }
    let h = hour.rem_euclid(24.0);
    // rem_euclid can round up to exactly 24.0 for tiny negatives
    if h >= 24.0 {
        0.0
    } else {
        h
    }
}
