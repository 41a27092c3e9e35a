//! Balance rod controller
//!
//! The rod length is driven by two hold inputs. A short rod is flexible (reactive,
//! less stable); a long rod is stiff.

use serde::{Deserialize, Serialize};

/// Half-length of the rod art at 100% scale
pub const ROD_BASE_LENGTH: f32 = 150.0;
pub const ROD_START_SCALE: f32 = 0.78;
pub const ROD_MIN_SCALE: f32 = 0.5;
pub const ROD_MAX_SCALE: f32 = 1.3;

/// Extension rate segments (length units per tick)
const RATE_NEAR: f32 = 2.0;
const RATE_MID: f32 = 3.0;
const RATE_CAP: f32 = 4.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RodState {
    /// Current half-length, always within [min_length, max_length]
    pub length: f32,
    pub min_length: f32,
    pub max_length: f32,
}

impl Default for RodState {
    fn default() -> Self {
        Self::with_base(ROD_BASE_LENGTH)
    }
}

impl RodState {
    pub fn with_base(base: f32) -> Self {
        Self {
            length: base * ROD_START_SCALE,
            min_length: base * ROD_MIN_SCALE,
            max_length: base * ROD_MAX_SCALE,
        }
    }

    /// Apply one tick of hold input.
    ///
    /// Holding both extend and retract cancels out: the rod does not move.
    pub fn update(&mut self, extend: bool, retract: bool, distance: f32) {
        let rate = Self::extend_rate(distance);
        match (extend, retract) {
            (true, false) => self.length = (self.length + rate).min(self.max_length),
            (false, true) => self.length = (self.length - rate).max(self.min_length),
            _ => {}
        }
    }

    /// Piecewise extension rate: flat near the start, then two linear ramps, capped
    pub fn extend_rate(distance: f32) -> f32 {
        if distance < 1000.0 {
            RATE_NEAR
        } else if distance < 3000.0 {
            RATE_NEAR + (RATE_MID - RATE_NEAR) * crate::ramp(distance, 1000.0, 3000.0)
        } else {
            RATE_MID + (RATE_CAP - RATE_MID) * crate::ramp(distance, 3000.0, 6000.0)
        }
    }

    /// 1.0 at the shortest rod, 0.0 at the longest
    pub fn flexibility(&self) -> f32 {
        let span = self.max_length - self.min_length;
        if span <= f32::EPSILON {
            return 0.5;
        }
        (1.0 - (self.length - self.min_length) / span).clamp(0.0, 1.0)
    }
}
