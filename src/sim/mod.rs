//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (one tick per frame)
//! - Seeded RNG only (the run's `Pcg32`)
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or storage dependencies

pub mod bird;
pub mod collision;
pub mod effects;
pub mod hazards;
pub mod progression;
pub mod rescue;
pub mod rod;
pub mod state;
pub mod sway;
pub mod tick;
pub mod wind;

pub use bird::{Bird, BirdCombat, BirdState, Projectile};
pub use collision::{OrientedRect, hazard_hits_rod, obb_intersects};
pub use effects::{ActiveEffect, ActiveEffects, EffectKind};
pub use hazards::{Hazard, HazardKind, HazardWeights};
pub use progression::{
    EnabledSystems, FailureReason, LevelRule, LevelRuleError, LevelVerdict, Objective,
    ProgressionGate,
};
pub use rescue::{BombRescue, RescueKey};
pub use rod::RodState;
pub use state::{GameEvent, GamePhase, GameState, RunSummary};
pub use sway::{SimulationState, Steer};
pub use tick::{TickInput, tick};
pub use wind::WindState;
