//! Bomb rescue quick-time event
//!
//! An explosive pickup freezes the run and demands one specific key before the
//! fuse runs out. While armed, nothing else in the tick runs.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Fuse length (ticks)
pub const RESCUE_DURATION_TICKS: u32 = 45;
/// Above this contact tilt a successful rescue also rights the walker
pub const FORGIVING_RESET_DEG: f32 = 40.0;

/// The six rescue symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RescueKey {
    Q,
    W,
    E,
    A,
    S,
    D,
}

impl RescueKey {
    pub const ALL: [RescueKey; 6] = [
        RescueKey::Q,
        RescueKey::W,
        RescueKey::E,
        RescueKey::A,
        RescueKey::S,
        RescueKey::D,
    ];

    pub fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    pub fn as_char(self) -> char {
        match self {
            RescueKey::Q => 'Q',
            RescueKey::W => 'W',
            RescueKey::E => 'E',
            RescueKey::A => 'A',
            RescueKey::S => 'S',
            RescueKey::D => 'D',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_char() == c.to_ascii_uppercase())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum BombRescue {
    #[default]
    Dormant,
    Active {
        timer: u32,
        duration: u32,
        /// |sway| when the bomb hit the rod
        contact_angle: f32,
        required_key: RescueKey,
    },
}

/// How an armed rescue resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RescueOutcome {
    Success {
        /// The contact tilt was severe enough to force the walker upright
        reset_tilt: bool,
    },
    Failure,
}

impl BombRescue {
    /// Dormant -> Active. Re-arming an active rescue is ignored.
    pub fn arm(&mut self, sway: f32, rng: &mut impl Rng) -> Option<RescueKey> {
        if self.is_active() {
            return None;
        }
        let required_key = RescueKey::random(rng);
        *self = BombRescue::Active {
            timer: 0,
            duration: RESCUE_DURATION_TICKS,
            contact_angle: sway.abs(),
            required_key,
        };
        Some(required_key)
    }

    /// Advance one suspended tick. Returns the outcome when the rescue resolves
    /// and drops back to `Dormant`.
    pub fn tick(&mut self, pressed: Option<RescueKey>) -> Option<RescueOutcome> {
        let BombRescue::Active {
            timer,
            duration,
            contact_angle,
            required_key,
        } = self
        else {
            return None;
        };

        if pressed == Some(*required_key) {
            let reset_tilt = *contact_angle > FORGIVING_RESET_DEG;
            *self = BombRescue::Dormant;
            return Some(RescueOutcome::Success { reset_tilt });
        }

        *timer += 1;
        if *timer >= *duration {
            *self = BombRescue::Dormant;
            return Some(RescueOutcome::Failure);
        }
        None
    }

    pub fn is_active(&self) -> bool {
        matches!(self, BombRescue::Active { .. })
    }

    pub fn required_key(&self) -> Option<RescueKey> {
        match self {
            BombRescue::Active { required_key, .. } => Some(*required_key),
            BombRescue::Dormant => None,
        }
    }

    /// Remaining fraction of the fuse (1.0 when freshly armed)
    pub fn fuse_fraction(&self) -> f32 {
        match self {
            BombRescue::Active {
                timer, duration, ..
            } => 1.0 - *timer as f32 / (*duration).max(1) as f32,
            BombRescue::Dormant => 0.0,
        }
    }
}
