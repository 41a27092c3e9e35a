//! Game state and core simulation types
//!
//! Everything a run needs lives here so a snapshot can be serialized and replayed.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::bird::BirdCombat;
use super::effects::{ActiveEffects, EffectKind};
use super::hazards::{HazardField, HazardKind};
use super::progression::{LevelRule, LevelRuleError, LevelVerdict, ProgressionGate};
use super::rescue::{BombRescue, RescueKey};
use super::rod::RodState;
use super::sway::SimulationState;
use super::wind::WindState;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    Playing,
    /// Frozen by the player
    Paused,
    /// Verdict reached; ticks are no-ops until reset
    Finished,
}

/// Presentation-facing events, drained every tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Paused,
    Resumed,
    HazardSpawned { kind: HazardKind },
    HazardCollected { kind: HazardKind, refreshed: bool },
    EffectCancelled { kind: EffectKind },
    EffectExpired { kind: EffectKind },
    RescueStarted { key: RescueKey },
    RescueSucceeded { reset_tilt: bool },
    RescueFailed,
    ProjectileFired,
    BirdAppeared,
    BirdShot { kills: u32 },
    BirdStruck { health: u8 },
    ObjectiveReached,
    RunEnded { verdict: LevelVerdict },
}

/// What a finished run reports to the profile book
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub verdict: LevelVerdict,
    pub distance: f32,
    pub kills: u32,
    pub ticks: u64,
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// The one run RNG; every random draw goes through it
    pub rng: Pcg32,
    /// Active level rule and verdict
    pub gate: ProgressionGate,
    pub sim: SimulationState,
    pub wind: WindState,
    pub rod: RodState,
    pub effects: ActiveEffects,
    pub hazards: HazardField,
    pub rescue: BombRescue,
    pub combat: BirdCombat,
    /// Ticks spent under a steady effect
    pub steady_ticks: u64,
    pub phase: GamePhase,
    /// Events produced by the last tick
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    /// Next entity ID
    pub(super) next_id: u32,
}

impl GameState {
    /// Create a new run of `rule` with the given seed
    pub fn new(seed: u64, rule: LevelRule) -> Result<Self, LevelRuleError> {
        let gate = ProgressionGate::new(rule)?;
        log::info!("New run of '{}' (seed {seed})", gate.rule().name);
        let mut rng = Pcg32::seed_from_u64(seed);
        let combat = BirdCombat::new(&mut rng);
        Ok(Self {
            seed,
            rng,
            gate,
            sim: SimulationState::default(),
            wind: WindState::default(),
            rod: RodState::default(),
            effects: ActiveEffects::new(),
            hazards: HazardField::default(),
            rescue: BombRescue::default(),
            combat,
            steady_ticks: 0,
            phase: GamePhase::Playing,
            events: Vec::new(),
            next_id: 1,
        })
    }

    /// Clear every piece of per-run state in one step. The RNG is re-seeded, so a
    /// reset run replays exactly like a fresh one.
    pub fn reset(&mut self) {
        self.rng = Pcg32::seed_from_u64(self.seed);
        self.gate.reset();
        self.sim = SimulationState::default();
        self.wind = WindState::default();
        self.rod = RodState::default();
        self.effects = ActiveEffects::new();
        self.hazards = HazardField::default();
        self.rescue = BombRescue::default();
        self.combat = BirdCombat::new(&mut self.rng);
        self.steady_ticks = 0;
        self.phase = GamePhase::Playing;
        self.events.clear();
        self.next_id = 1;
        log::info!("Run of '{}' reset", self.gate.rule().name);
    }

    /// Leave the run early. A latched objective still ends in success.
    pub fn exit(&mut self) -> Option<LevelVerdict> {
        let verdict = self.gate.exit()?;
        self.phase = GamePhase::Finished;
        self.events.push(GameEvent::RunEnded { verdict });
        Some(verdict)
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.hazards.hazards.sort_by_key(|h| h.id);
        self.combat.projectiles.sort_by_key(|p| p.id);
    }

    pub fn rule(&self) -> &LevelRule {
        self.gate.rule()
    }

    pub fn verdict(&self) -> LevelVerdict {
        self.gate.verdict()
    }

    pub fn score(&self) -> u64 {
        self.sim.score()
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            verdict: self.verdict(),
            distance: self.sim.distance,
            kills: self.combat.kills,
            ticks: self.sim.tick_count,
        }
    }

    /// Drain this tick's events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
