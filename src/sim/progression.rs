//! Level rules and the progression gate
//!
//! A `LevelRule` is plain data; the gate turns it plus a per-tick snapshot of the run
//! into a `LevelVerdict`. Rules are validated once at construction.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::hazards::{HazardKind, HazardWeights};

/// What a level asks of the player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Objective {
    /// No win condition; play until something fatal happens
    Endless,
    /// Reach `target_distance`
    Distance,
    /// Reach `target_distance` before the clock runs out; the level always lasts
    /// `limit_ticks`
    TimeBoxed { limit_ticks: u64 },
    /// Reach `target_distance` having spent `target_ticks` under a steady effect
    SteadyBalance { target_ticks: u64 },
    /// Shoot down `target` birds
    KillCount { target: u32 },
}

/// Which optional systems run this level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnabledSystems {
    pub hazards: bool,
    pub bird: bool,
}

impl Default for EnabledSystems {
    fn default() -> Self {
        Self {
            hazards: true,
            bird: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelRule {
    pub name: String,
    pub objective: Objective,
    #[serde(default)]
    pub target_distance: f32,
    #[serde(default)]
    pub systems: EnabledSystems,
    #[serde(default)]
    pub hazard_weights: HazardWeights,
}

impl LevelRule {
    pub fn endless() -> Self {
        Self {
            name: "Endless".to_string(),
            objective: Objective::Endless,
            target_distance: 0.0,
            systems: EnabledSystems {
                hazards: true,
                bird: true,
            },
            hazard_weights: HazardWeights::default(),
        }
    }

    /// Bird levels without hazards lure the bird regardless of tilt
    pub fn is_bird_only(&self) -> bool {
        self.systems.bird && !self.systems.hazards
    }

    pub fn validate(&self) -> Result<(), LevelRuleError> {
        let name = || self.name.clone();
        let needs_distance = matches!(
            self.objective,
            Objective::Distance | Objective::TimeBoxed { .. } | Objective::SteadyBalance { .. }
        );
        if needs_distance && (self.target_distance.is_nan() || self.target_distance <= 0.0) {
            return Err(LevelRuleError::MissingTargetDistance(name()));
        }

        match self.objective {
            Objective::TimeBoxed { limit_ticks: 0 } => {
                return Err(LevelRuleError::ZeroTimeLimit(name()));
            }
            Objective::SteadyBalance { .. } => {
                if !self.systems.hazards {
                    return Err(LevelRuleError::SteadyWithoutHazards(name()));
                }
                if self.hazard_weights.weight(HazardKind::Steady) == 0 {
                    return Err(LevelRuleError::NoSteadySource(name()));
                }
            }
            Objective::KillCount { target } => {
                if !self.systems.bird {
                    return Err(LevelRuleError::KillCountWithoutBird(name()));
                }
                if target == 0 {
                    return Err(LevelRuleError::ZeroKillTarget(name()));
                }
            }
            _ => {}
        }

        if self.systems.hazards && self.hazard_weights.total() == 0 {
            return Err(LevelRuleError::NoHazardWeights(name()));
        }
        Ok(())
    }
}

/// Malformed level configuration
#[derive(Error, Debug)]
pub enum LevelRuleError {
    #[error("level '{0}' needs a positive target distance")]
    MissingTargetDistance(String),
    #[error("level '{0}' has a zero time limit")]
    ZeroTimeLimit(String),
    #[error("level '{0}' tracks steady balance but has hazards disabled")]
    SteadyWithoutHazards(String),
    #[error("level '{0}' tracks steady balance but never spawns steady pickups")]
    NoSteadySource(String),
    #[error("level '{0}' counts kills but has the bird disabled")]
    KillCountWithoutBird(String),
    #[error("level '{0}' has a zero kill target")]
    ZeroKillTarget(String),
    #[error("level '{0}' enables hazards with every spawn weight at zero")]
    NoHazardWeights(String),
    #[error("level list is empty")]
    NoLevels,
    #[error("invalid level JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    Fell,
    HealthDepleted,
    RescueFailed,
    Timeout,
    BalanceInsufficient,
    /// Player quit before the objective was met
    Exited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LevelVerdict {
    #[default]
    InProgress,
    Success,
    Failure(FailureReason),
}

impl LevelVerdict {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LevelVerdict::InProgress)
    }
}

/// What the gate reads each tick
#[derive(Debug, Clone, Copy, Default)]
pub struct GateSnapshot {
    pub distance: f32,
    pub tick_count: u64,
    pub steady_ticks: u64,
    pub kills: u32,
    pub fell: bool,
    pub health_depleted: bool,
}

/// Result of one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GateStep {
    /// The objective was met for the first time this tick
    pub objective_reached: bool,
    /// The verdict left `InProgress` this tick
    pub finished: Option<LevelVerdict>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionGate {
    rule: LevelRule,
    verdict: LevelVerdict,
    /// Success latch; set once, never re-fires
    objective_reached: bool,
}

impl ProgressionGate {
    pub fn new(rule: LevelRule) -> Result<Self, LevelRuleError> {
        rule.validate()?;
        Ok(Self {
            rule,
            verdict: LevelVerdict::InProgress,
            objective_reached: false,
        })
    }

    pub fn rule(&self) -> &LevelRule {
        &self.rule
    }

    pub fn verdict(&self) -> LevelVerdict {
        self.verdict
    }

    pub fn objective_reached(&self) -> bool {
        self.objective_reached
    }

    /// Back to a fresh run of the same level
    pub fn reset(&mut self) {
        self.verdict = LevelVerdict::InProgress;
        self.objective_reached = false;
    }

    /// End the run through a fatal event. A level whose objective is already met
    /// still ends in success.
    pub fn fail(&mut self, reason: FailureReason) -> Option<LevelVerdict> {
        if self.verdict.is_terminal() {
            return None;
        }
        self.verdict = if self.objective_reached {
            LevelVerdict::Success
        } else {
            LevelVerdict::Failure(reason)
        };
        log::info!("Level '{}' ended: {:?}", self.rule.name, self.verdict);
        Some(self.verdict)
    }

    /// End a live run on request. Counts as success once the objective is met.
    pub fn exit(&mut self) -> Option<LevelVerdict> {
        self.fail(FailureReason::Exited)
    }

    fn succeed(&mut self, step: &mut GateStep) {
        self.latch(step);
        self.verdict = LevelVerdict::Success;
        log::info!("Level '{}' ended: {:?}", self.rule.name, self.verdict);
        step.finished = Some(self.verdict);
    }

    fn latch(&mut self, step: &mut GateStep) {
        if !self.objective_reached {
            self.objective_reached = true;
            step.objective_reached = true;
            log::info!("Objective reached on '{}'", self.rule.name);
        }
    }

    /// Evaluate once per live tick, after every other system has run
    pub fn evaluate(&mut self, snapshot: &GateSnapshot) -> GateStep {
        let mut step = GateStep::default();
        if self.verdict.is_terminal() {
            return step;
        }

        if snapshot.fell {
            step.finished = self.fail(FailureReason::Fell);
            return step;
        }
        if snapshot.health_depleted {
            step.finished = self.fail(FailureReason::HealthDepleted);
            return step;
        }

        let distance_met = snapshot.distance >= self.rule.target_distance;
        match self.rule.objective {
            Objective::Endless => {}
            Objective::Distance => {
                if distance_met {
                    self.succeed(&mut step);
                }
            }
            Objective::TimeBoxed { limit_ticks } => {
                if distance_met {
                    self.latch(&mut step);
                }
                if snapshot.tick_count >= limit_ticks {
                    step.finished = self.fail(FailureReason::Timeout);
                }
            }
            Objective::SteadyBalance { target_ticks } => {
                if distance_met {
                    if snapshot.steady_ticks >= target_ticks {
                        self.succeed(&mut step);
                    } else {
                        step.finished = self.fail(FailureReason::BalanceInsufficient);
                    }
                }
            }
            Objective::KillCount { target } => {
                if snapshot.kills >= target {
                    self.succeed(&mut step);
                }
            }
        }
        step
    }
}
