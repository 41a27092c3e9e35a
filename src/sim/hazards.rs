//! Falling hazards and power-ups
//!
//! Spawned on a timer with level-weighted kinds, they fall past the rod and resolve
//! at most once when they touch it.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::hazard_hits_rod;
use super::effects::{ActiveEffects, EffectKind, EffectPayload, Registration};
use super::rod::RodState;
use super::sway::SimulationState;
use crate::consts::*;

/// Ticks before the first spawn of a run
pub const FIRST_SPAWN_TICKS: u32 = 20;
/// Spawn interval range after the first (ticks)
pub const SPAWN_INTERVAL_MIN: f32 = 60.0;
pub const SPAWN_INTERVAL_SPAN: f32 = 60.0;
/// Spawn height (above the top edge)
pub const SPAWN_Y: f32 = -50.0;
/// Hazards below this line are gone
pub const DESPAWN_Y: f32 = PLAY_HEIGHT + 100.0;
/// Closest lateral spawn beyond the shortest rod
pub const SPAWN_REACH_PAD: f32 = 50.0;
/// Fall speed at distance 0 (pixels/tick)
pub const BASE_FALL_SPEED: f32 = 7.0;

pub const ACCELERATE_DELTA: f32 = 0.05;
pub const DECELERATE_DELTA: f32 = -0.03;
pub const SPEED_EFFECT_TICKS: u32 = 300;
pub const STEADY_TICKS: u32 = 180;
pub const DESTABILIZE_TICKS: u32 = 120;
/// One-shot tilt kick from a destabilize pickup (degrees)
pub const DESTABILIZE_OFFSET: f32 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HazardKind {
    Accelerate,
    Decelerate,
    Steady,
    Destabilize,
    Explosive,
}

impl HazardKind {
    pub const ALL: [HazardKind; 5] = [
        HazardKind::Accelerate,
        HazardKind::Decelerate,
        HazardKind::Steady,
        HazardKind::Destabilize,
        HazardKind::Explosive,
    ];

    /// Intrinsic sprite size used as the collision box
    pub fn size(self) -> Vec2 {
        match self {
            HazardKind::Explosive => Vec2::new(60.0, 64.0),
            HazardKind::Steady | HazardKind::Destabilize => Vec2::new(56.0, 56.0),
            HazardKind::Accelerate | HazardKind::Decelerate => Vec2::new(52.0, 52.0),
        }
    }

    /// Effect registered on collection (explosives hand off instead)
    pub fn effect_kind(self) -> Option<EffectKind> {
        match self {
            HazardKind::Accelerate => Some(EffectKind::Accelerate),
            HazardKind::Decelerate => Some(EffectKind::Decelerate),
            HazardKind::Steady => Some(EffectKind::Steady),
            HazardKind::Destabilize => Some(EffectKind::Destabilize),
            HazardKind::Explosive => None,
        }
    }
}

/// Per-kind spawn weights
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HazardWeights {
    pub accelerate: u32,
    pub decelerate: u32,
    pub steady: u32,
    pub destabilize: u32,
    pub explosive: u32,
}

impl Default for HazardWeights {
    fn default() -> Self {
        Self {
            accelerate: 2,
            decelerate: 2,
            steady: 2,
            destabilize: 2,
            explosive: 1,
        }
    }
}

impl HazardWeights {
    pub fn weight(&self, kind: HazardKind) -> u32 {
        match kind {
            HazardKind::Accelerate => self.accelerate,
            HazardKind::Decelerate => self.decelerate,
            HazardKind::Steady => self.steady,
            HazardKind::Destabilize => self.destabilize,
            HazardKind::Explosive => self.explosive,
        }
    }

    pub fn total(&self) -> u32 {
        HazardKind::ALL.iter().map(|k| self.weight(*k)).sum()
    }

    /// Weighted draw; `None` when every weight is zero
    pub fn pick(&self, rng: &mut impl Rng) -> Option<HazardKind> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        let mut roll = rng.random_range(0..total);
        for kind in HazardKind::ALL {
            let w = self.weight(kind);
            if roll < w {
                return Some(kind);
            }
            roll -= w;
        }
        None
    }
}

/// A falling entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hazard {
    pub id: u32,
    pub kind: HazardKind,
    pub pos: Vec2,
    pub fall_speed: f32,
}

/// Outcome of one collected hazard, for the tick dispatcher
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Collection {
    Applied {
        kind: HazardKind,
        registration: Registration,
        /// Effects removed by the steady antagonism rule
        cancelled: [Option<EffectKind>; 2],
    },
    /// Explosive: control passes to the bomb rescue
    Explosive,
}

/// Fall speed at a given distance
pub fn fall_speed_at(distance: f32) -> f32 {
    BASE_FALL_SPEED * (1.0 + distance / 2000.0).min(1.5)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardField {
    /// Live hazards, sorted by id
    pub hazards: Vec<Hazard>,
    pub spawn_timer: u32,
    pub spawn_interval: u32,
}

impl Default for HazardField {
    fn default() -> Self {
        Self {
            hazards: Vec::new(),
            spawn_timer: 0,
            spawn_interval: FIRST_SPAWN_TICKS,
        }
    }
}

impl HazardField {
    /// Advance the spawn timer; returns a freshly spawned hazard when it fires
    pub fn tick_spawner(
        &mut self,
        id: u32,
        weights: &HazardWeights,
        rod: &RodState,
        distance: f32,
        rng: &mut impl Rng,
    ) -> Option<&Hazard> {
        self.spawn_timer += 1;
        if self.spawn_timer < self.spawn_interval {
            return None;
        }
        self.spawn_timer = 0;
        self.spawn_interval =
            (SPAWN_INTERVAL_MIN + rng.random::<f32>() * SPAWN_INTERVAL_SPAN) as u32;

        let kind = weights.pick(rng)?;
        let side = if rng.random::<bool>() { 1.0 } else { -1.0 };
        let near = rod.min_length + SPAWN_REACH_PAD;
        let far = rod.max_length.max(near);
        let offset = near + rng.random::<f32>() * (far - near);

        self.hazards.push(Hazard {
            id,
            kind,
            pos: Vec2::new(PIVOT_X + side * offset, SPAWN_Y),
            fall_speed: fall_speed_at(distance),
        });
        self.hazards.last()
    }

    /// Move every hazard down and drop the ones that left the play area
    pub fn fall(&mut self) {
        for hazard in &mut self.hazards {
            hazard.pos.y += hazard.fall_speed;
        }
        self.hazards.retain(|h| h.pos.y <= DESPAWN_Y);
    }

    /// Remove and return the first hazard (by id) touching the rod
    pub fn take_next_collision(&mut self, rod_length: f32, sway: f32) -> Option<Hazard> {
        let index = self
            .hazards
            .iter()
            .position(|h| hazard_hits_rod(h.pos, h.kind.size(), rod_length, sway))?;
        Some(self.hazards.remove(index))
    }
}

/// Apply a collected hazard to the sim and the effect map
pub fn collect(
    hazard: &Hazard,
    sim: &mut SimulationState,
    effects: &mut ActiveEffects,
) -> Collection {
    let mut cancelled = [None, None];
    let registration = match hazard.kind {
        HazardKind::Accelerate => effects.register(
            EffectKind::Accelerate,
            EffectPayload::Speed {
                delta: ACCELERATE_DELTA,
            },
            SPEED_EFFECT_TICKS,
            sim,
        ),
        HazardKind::Decelerate => effects.register(
            EffectKind::Decelerate,
            EffectPayload::Speed {
                delta: DECELERATE_DELTA,
            },
            SPEED_EFFECT_TICKS,
            sim,
        ),
        HazardKind::Steady => {
            sim.reset_tilt();
            for (slot, kind) in [EffectKind::Destabilize, EffectKind::Decelerate]
                .into_iter()
                .enumerate()
            {
                if effects.cancel(kind, sim).is_some() {
                    cancelled[slot] = Some(kind);
                }
            }
            effects.register(EffectKind::Steady, EffectPayload::Steady, STEADY_TICKS, sim)
        }
        HazardKind::Destabilize => {
            let registration = effects.register(
                EffectKind::Destabilize,
                EffectPayload::Destabilize,
                DESTABILIZE_TICKS,
                sim,
            );
            if registration == Registration::Inserted {
                let side = if hazard.pos.x > PIVOT_X { 1.0 } else { -1.0 };
                sim.offset_sway(side * DESTABILIZE_OFFSET);
            }
            registration
        }
        HazardKind::Explosive => return Collection::Explosive,
    };

    Collection::Applied {
        kind: hazard.kind,
        registration,
        cancelled,
    }
}
