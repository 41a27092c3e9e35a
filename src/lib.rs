//! Tightrope - A single-screen balance arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (wind, rod, sway physics, hazards, rescue, bird, progression)
//! - `levels`: Built-in level rules and JSON level configs
//! - `profiles`: Per-player records written on verdict transitions
//! - `persistence`: Key-value storage seam (memory / LocalStorage)
//! - `platform`: Browser/native logging bootstrap

pub mod levels;
pub mod persistence;
pub mod platform;
pub mod profiles;
pub mod sim;

pub use levels::{catalog, load_levels_json};
pub use profiles::{PlayerProfile, ProfileBook};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Simulation rate (one tick per rendered frame)
    pub const TICKS_PER_SECOND: u32 = 60;

    /// Play area dimensions (design pixels, y grows downward)
    pub const PLAY_WIDTH: f32 = 832.0;
    pub const PLAY_HEIGHT: f32 = 1480.0;

    /// Balance pivot (feet on the rope)
    pub const PIVOT_X: f32 = 416.0;
    pub const PIVOT_Y: f32 = PLAY_HEIGHT - 430.0;

    /// Tilt bound (degrees) for both sway and sway velocity
    pub const TILT_BOUND: f32 = 90.0;
    /// Tilt at which the walker falls off the rope
    pub const DEATH_THRESHOLD: f32 = 60.0;

    /// Below this tilt the walker is in the stable zone (no gravity, full wind)
    pub const STABLE_ZONE_DEG: f32 = 15.0;

    /// Forward speed baseline (distance units per tick)
    pub const BASE_SPEED: f32 = 0.083;

    /// Player health pool (bird strikes)
    pub const MAX_HEALTH: u8 = 3;
}

/// Degrees to radians
#[inline]
pub fn deg_to_rad(deg: f32) -> f32 {
    deg * std::f32::consts::PI / 180.0
}

/// Rotate a vector by a clockwise-on-screen angle in degrees (screen y grows downward)
#[inline]
pub fn rotate_deg(v: Vec2, deg: f32) -> Vec2 {
    Vec2::from_angle(deg_to_rad(deg)).rotate(v)
}

/// Linear ramp: 0 at `start`, 1 at `end`, clamped outside
#[inline]
pub fn ramp(value: f32, start: f32, end: f32) -> f32 {
    ((value - start) / (end - start)).clamp(0.0, 1.0)
}
