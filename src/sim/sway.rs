//! Sway dynamics
//!
//! Integrates wind, steering, angle-dependent gravity and damping into the tilt
//! angle. Below the stable zone a weak spring rights the walker; past it gravity
//! takes over and tilting feeds on itself.

use serde::{Deserialize, Serialize};

use super::effects::ActiveEffects;
use super::rod::RodState;
use super::wind::WindState;
use crate::consts::*;
use crate::ramp;

/// Tilt where wind leverage bottoms out and gravity reaches full strength
pub const FULL_TILT_DEG: f32 = 50.0;
/// Residual wind factor past `FULL_TILT_DEG`
pub const WIND_FLOOR: f32 = 0.05;
/// Peak gravity contribution (degrees/tick²) before rod scaling
pub const GRAVITY_STRENGTH: f32 = 0.04;
/// Steering gain before flexibility and angle scaling
pub const CONTROL_GAIN: f32 = 0.075;
/// Tilt at which the steering boost peaks
pub const CONTROL_PEAK_DEG: f32 = 70.0;
/// Max wind/steering contribution per second (degrees)
pub const MAX_RATE_DEG_PER_SEC: f32 = 9.0;
/// Self-righting spring inside the stable zone
pub const RIGHTING_SPRING: f32 = 0.002;

/// Steering intent from the two hold inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Steer {
    #[default]
    None,
    Left,
    Right,
}

impl Steer {
    /// Both held cancels out
    pub fn from_holds(left: bool, right: bool) -> Self {
        match (left, right) {
            (true, false) => Steer::Left,
            (false, true) => Steer::Right,
            _ => Steer::None,
        }
    }

    fn sign(self) -> f32 {
        match self {
            Steer::None => 0.0,
            Steer::Left => -1.0,
            Steer::Right => 1.0,
        }
    }
}

/// Authoritative per-run progress and tilt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    /// Forward progress, never decreases
    pub distance: f32,
    /// Forward rate per tick (effects shift it)
    pub speed: f32,
    /// Ticks simulated (frozen while suspended)
    pub tick_count: u64,
    /// Tilt in degrees, clamped to ±TILT_BOUND
    pub sway: f32,
    /// Degrees per tick
    pub sway_velocity: f32,
}

impl Default for SimulationState {
    fn default() -> Self {
        Self {
            distance: 0.0,
            speed: BASE_SPEED,
            tick_count: 0,
            sway: 0.0,
            sway_velocity: 0.0,
        }
    }
}

impl SimulationState {
    /// Advance the clock and forward progress by one tick
    pub fn advance(&mut self) {
        self.tick_count += 1;
        self.distance += self.speed.max(0.0);
    }

    /// Instant balance reset (steady pickup, forgiving rescue)
    pub fn reset_tilt(&mut self) {
        self.sway = 0.0;
        self.sway_velocity = 0.0;
    }

    /// One-shot tilt kick, clamped to the tilt bound
    pub fn offset_sway(&mut self, degrees: f32) {
        self.sway = (self.sway + degrees).clamp(-TILT_BOUND, TILT_BOUND);
    }

    pub fn adjust_speed(&mut self, delta: f32) {
        self.speed += delta;
    }

    /// Whole units walked
    pub fn score(&self) -> u64 {
        self.distance.floor() as u64
    }

    pub fn has_fallen(&self) -> bool {
        self.sway.abs() >= DEATH_THRESHOLD
    }
}

/// Wind leverage: full in the stable zone, fading to `WIND_FLOOR` at full tilt
pub fn wind_angle_factor(abs_sway: f32) -> f32 {
    1.0 - (1.0 - WIND_FLOOR) * ramp(abs_sway, STABLE_ZONE_DEG, FULL_TILT_DEG)
}

/// Steering boost: 1.0 in the stable zone, up to 1.8-2.0 at `CONTROL_PEAK_DEG`
pub fn control_angle_factor(abs_sway: f32, flexibility: f32) -> f32 {
    let peak = 1.8 + 0.2 * flexibility;
    1.0 + (peak - 1.0) * ramp(abs_sway, STABLE_ZONE_DEG, CONTROL_PEAK_DEG)
}

/// Gravity scale from rod length: a long rod halves the pull
pub fn rod_length_reduction(flexibility: f32) -> f32 {
    0.5 + 0.5 * flexibility
}

/// Baseline damping from rod stiffness, in [0.95, 0.98]
pub fn baseline_damping(flexibility: f32) -> f32 {
    0.95 + 0.03 * (1.0 - flexibility)
}

/// Max wind or steering contribution per tick
pub fn max_rate_per_tick() -> f32 {
    MAX_RATE_DEG_PER_SEC / TICKS_PER_SECOND as f32
}

/// Integrate one tick of sway.
///
/// Runs unconditionally once per active tick. An absolute-balance effect pins the
/// walker upright and skips the physics entirely.
pub fn step_sway(
    sim: &mut SimulationState,
    wind: &WindState,
    rod: &RodState,
    effects: &ActiveEffects,
    steer: Steer,
) {
    if effects.forces_zero_sway() {
        sim.reset_tilt();
        return;
    }

    let flexibility = rod.flexibility();
    let abs_sway = sim.sway.abs();
    let rate_cap = max_rate_per_tick();

    let wind_push = wind.signed_force()
        * (0.3 + 0.2 * flexibility)
        * (0.4 + 0.6 * flexibility)
        * wind_angle_factor(abs_sway);

    let gravity = GRAVITY_STRENGTH
        * rod_length_reduction(flexibility)
        * ramp(abs_sway, STABLE_ZONE_DEG, FULL_TILT_DEG)
        * sim.sway.signum();

    let righting = if abs_sway < STABLE_ZONE_DEG {
        -RIGHTING_SPRING * sim.sway
    } else {
        0.0
    };

    let control = if effects.input_immune() {
        0.0
    } else {
        steer.sign()
            * CONTROL_GAIN
            * (0.5 + 0.5 * flexibility)
            * control_angle_factor(abs_sway, flexibility)
    };

    sim.sway_velocity += wind_push.clamp(-rate_cap, rate_cap)
        + control.clamp(-rate_cap, rate_cap)
        + gravity
        + righting;

    let damping = effects
        .damping_override()
        .unwrap_or_else(|| baseline_damping(flexibility));
    sim.sway_velocity *= damping;

    sim.sway_velocity = sim.sway_velocity.clamp(-TILT_BOUND, TILT_BOUND);
    sim.sway = (sim.sway + sim.sway_velocity).clamp(-TILT_BOUND, TILT_BOUND);
}
