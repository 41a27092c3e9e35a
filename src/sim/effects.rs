//! Timed effects from collected hazards
//!
//! At most one active instance per kind: the map is keyed by kind, so a second
//! collision can only refresh the duration. Speed deltas are applied once on
//! insert and reversed exactly once on removal.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::sway::SimulationState;

/// Damping factor while a steady effect is active
pub const STEADY_DAMPING: f32 = 0.98;
/// Damping factor while a destabilize effect is active
pub const DESTABILIZE_DAMPING: f32 = 0.90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    Accelerate,
    Decelerate,
    Steady,
    Destabilize,
}

/// Typed payload per effect kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EffectPayload {
    /// Forward speed delta applied on insert, reversed on removal
    Speed { delta: f32 },
    /// Absolute balance: sway pinned to zero, steering ignored
    Steady,
    /// Damping override after a one-shot sway kick
    Destabilize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub kind: EffectKind,
    /// Ticks left before expiry
    pub remaining: u32,
    pub payload: EffectPayload,
}

impl ActiveEffect {
    pub fn input_immune(&self) -> bool {
        matches!(self.payload, EffectPayload::Steady)
    }

    pub fn forces_zero_sway(&self) -> bool {
        matches!(self.payload, EffectPayload::Steady)
    }

    fn speed_delta(&self) -> f32 {
        match self.payload {
            EffectPayload::Speed { delta } => delta,
            _ => 0.0,
        }
    }
}

/// Whether a call registered a new effect or refreshed an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Inserted,
    Refreshed,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffects {
    effects: BTreeMap<EffectKind, ActiveEffect>,
}

impl ActiveEffects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an effect, or refresh the duration of the live one.
    ///
    /// A speed payload is applied to `sim` only when the effect is new.
    pub fn register(
        &mut self,
        kind: EffectKind,
        payload: EffectPayload,
        duration: u32,
        sim: &mut SimulationState,
    ) -> Registration {
        if let Some(existing) = self.effects.get_mut(&kind) {
            existing.remaining = duration;
            return Registration::Refreshed;
        }
        let effect = ActiveEffect {
            kind,
            remaining: duration,
            payload,
        };
        let delta = effect.speed_delta();
        if delta != 0.0 {
            sim.adjust_speed(delta);
        }
        self.effects.insert(kind, effect);
        Registration::Inserted
    }

    /// Remove an effect outright, reversing its speed delta
    pub fn cancel(&mut self, kind: EffectKind, sim: &mut SimulationState) -> Option<ActiveEffect> {
        let effect = self.effects.remove(&kind)?;
        let delta = effect.speed_delta();
        if delta != 0.0 {
            sim.adjust_speed(-delta);
        }
        Some(effect)
    }

    /// Count every effect down by one tick; returns the kinds that expired
    pub fn tick(&mut self, sim: &mut SimulationState) -> Vec<EffectKind> {
        let mut expired = Vec::new();
        for effect in self.effects.values_mut() {
            effect.remaining = effect.remaining.saturating_sub(1);
            if effect.remaining == 0 {
                expired.push(effect.kind);
            }
        }
        for kind in &expired {
            self.cancel(*kind, sim);
        }
        expired
    }

    pub fn get(&self, kind: EffectKind) -> Option<&ActiveEffect> {
        self.effects.get(&kind)
    }

    pub fn contains(&self, kind: EffectKind) -> bool {
        self.effects.contains_key(&kind)
    }

    /// Live effects in kind order
    pub fn iter(&self) -> impl Iterator<Item = &ActiveEffect> {
        self.effects.values()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn input_immune(&self) -> bool {
        self.iter().any(ActiveEffect::input_immune)
    }

    pub fn forces_zero_sway(&self) -> bool {
        self.iter().any(ActiveEffect::forces_zero_sway)
    }

    /// Damping factor forced by an active effect (steady wins over destabilize)
    pub fn damping_override(&self) -> Option<f32> {
        if self.contains(EffectKind::Steady) {
            Some(STEADY_DAMPING)
        } else if self.contains(EffectKind::Destabilize) {
            Some(DESTABILIZE_DAMPING)
        } else {
            None
        }
    }
}
