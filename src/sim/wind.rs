//! Wind generator
//!
//! A bounded, slowly-varying lateral force. The direction flips on a randomized
//! timer; magnitude grows with distance walked.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Base wind strength before the distance multiplier
pub const BASE_WIND_STRENGTH: f32 = 0.15;
/// Per-tick random jitter amplitude (total span)
pub const WIND_JITTER: f32 = 0.01;
/// Direction flip interval range (ticks)
pub const WIND_INTERVAL_MIN: f32 = 60.0;
pub const WIND_INTERVAL_SPAN: f32 = 90.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindState {
    /// Signed scalar force, always within `max_force(distance)`
    pub force: f32,
    /// +1.0 or -1.0
    pub direction: f32,
    pub change_timer: u32,
    pub change_interval: u32,
}

impl Default for WindState {
    fn default() -> Self {
        Self {
            force: 0.0,
            direction: 1.0,
            change_timer: 0,
            change_interval: WIND_INTERVAL_MIN as u32,
        }
    }
}

impl WindState {
    /// Advance one tick
    pub fn tick(&mut self, distance: f32, rng: &mut impl Rng) {
        self.change_timer += 1;
        if self.change_timer >= self.change_interval {
            self.direction = -self.direction;
            let distance_multiplier = (1.0 + distance / 1000.0).min(2.0);
            self.force = (rng.random::<f32>() - 0.5) * BASE_WIND_STRENGTH * distance_multiplier;
            self.change_timer = 0;
            self.change_interval =
                (WIND_INTERVAL_MIN + rng.random::<f32>() * WIND_INTERVAL_SPAN) as u32;
            log::debug!(
                "Wind flip: direction={} force={:.3} next in {} ticks",
                self.direction,
                self.force,
                self.change_interval
            );
        }

        self.force += (rng.random::<f32>() - 0.5) * WIND_JITTER;
        let limit = Self::max_force(distance);
        self.force = self.force.clamp(-limit, limit);
    }

    /// Force bound at a given distance: 0.3 at the start, +0.2 every 2000 units
    pub fn max_force(distance: f32) -> f32 {
        0.3 + distance.max(0.0) / 2000.0 * 0.2
    }

    /// Effective signed push (force times direction)
    #[inline]
    pub fn signed_force(&self) -> f32 {
        self.force * self.direction
    }

    /// Gauge band 1-3 for the wind readout
    pub fn level(&self) -> u8 {
        ((self.signed_force().abs() * 6.0).floor() as u8 + 1).clamp(1, 3)
    }
}
