//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically. Order within a live
//! tick: wind, rod, sway, hazards (which may arm the bomb rescue), effect expiry,
//! bird, progression gate.

use super::bird::{BirdContext, BirdEvent};
use super::effects::{EffectKind, Registration};
use super::hazards::{Collection, collect};
use super::progression::{FailureReason, GateSnapshot};
use super::rescue::{RescueKey, RescueOutcome};
use super::rod::RodState;
use super::state::{GameEvent, GamePhase, GameState};
use super::sway::{Steer, step_sway};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Steering holds
    pub hold_left: bool,
    pub hold_right: bool,
    /// Rod holds
    pub hold_extend: bool,
    pub hold_retract: bool,
    /// Fire a projectile (edge)
    pub fire: bool,
    /// Rescue key pressed this tick (edge)
    pub rescue_key: Option<RescueKey>,
    /// Pause toggle
    pub pause: bool,
    /// Demo mode - AI plays the game
    pub autopilot: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) {
    state.events.clear();

    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                state.events.push(GameEvent::Paused);
                return;
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Playing;
                state.events.push(GameEvent::Resumed);
            }
            GamePhase::Finished => {}
        }
    }

    // Don't tick if paused or finished
    if state.phase != GamePhase::Playing {
        return;
    }

    let mut input = input.clone();
    if input.autopilot {
        autopilot(state, &mut input);
    }

    // An armed rescue replaces the whole tick body
    if state.rescue.is_active() {
        resolve_rescue(state, input.rescue_key);
    } else {
        advance_run(state, &input);
    }

    state.normalize_order();
}

/// One live tick: wind, rod, sway, hazards, effects, bird, gate
fn advance_run(state: &mut GameState, input: &TickInput) {
    state.sim.advance();
    let distance = state.sim.distance;
    state.wind.tick(distance, &mut state.rng);
    state.rod.update(input.hold_extend, input.hold_retract, distance);
    step_sway(
        &mut state.sim,
        &state.wind,
        &state.rod,
        &state.effects,
        Steer::from_holds(input.hold_left, input.hold_right),
    );

    if state.rule().systems.hazards && update_hazards(state) {
        // Bomb hit: everything else waits for the rescue
        return;
    }

    if state.effects.contains(EffectKind::Steady) {
        state.steady_ticks += 1;
    }
    for kind in state.effects.tick(&mut state.sim) {
        log::debug!("Effect expired: {kind:?}");
        state.events.push(GameEvent::EffectExpired { kind });
    }

    if state.rule().systems.bird {
        update_bird(state, input.fire);
    }

    let snapshot = GateSnapshot {
        distance: state.sim.distance,
        tick_count: state.sim.tick_count,
        steady_ticks: state.steady_ticks,
        kills: state.combat.kills,
        fell: state.sim.has_fallen(),
        health_depleted: state.combat.is_dead(),
    };
    let step = state.gate.evaluate(&snapshot);
    if step.objective_reached {
        state.events.push(GameEvent::ObjectiveReached);
    }
    if let Some(verdict) = step.finished {
        state.phase = GamePhase::Finished;
        state.events.push(GameEvent::RunEnded { verdict });
    }
}

/// Spawn, move and collide hazards. Returns true when a bomb armed the rescue.
fn update_hazards(state: &mut GameState) -> bool {
    let weights = state.rule().hazard_weights;
    let id = state.next_id;
    if let Some(hazard) = state.hazards.tick_spawner(
        id,
        &weights,
        &state.rod,
        state.sim.distance,
        &mut state.rng,
    ) {
        let kind = hazard.kind;
        state.next_id += 1;
        state.events.push(GameEvent::HazardSpawned { kind });
    }

    state.hazards.fall();

    while let Some(hazard) = state
        .hazards
        .take_next_collision(state.rod.length, state.sim.sway)
    {
        log::debug!("Hazard {} ({:?}) hit the rod", hazard.id, hazard.kind);
        match collect(&hazard, &mut state.sim, &mut state.effects) {
            Collection::Applied {
                kind,
                registration,
                cancelled,
            } => {
                state.events.push(GameEvent::HazardCollected {
                    kind,
                    refreshed: registration == Registration::Refreshed,
                });
                for kind in cancelled.into_iter().flatten() {
                    state.events.push(GameEvent::EffectCancelled { kind });
                }
            }
            Collection::Explosive => {
                if let Some(key) = state.rescue.arm(state.sim.sway, &mut state.rng) {
                    log::info!(
                        "Bomb rescue armed at {:.1} deg, press {}",
                        state.sim.sway.abs(),
                        key.as_char()
                    );
                    state.events.push(GameEvent::RescueStarted { key });
                }
                return true;
            }
        }
    }
    false
}

fn resolve_rescue(state: &mut GameState, pressed: Option<RescueKey>) {
    match state.rescue.tick(pressed) {
        Some(RescueOutcome::Success { reset_tilt }) => {
            if reset_tilt {
                state.sim.reset_tilt();
            }
            log::info!("Bomb rescue succeeded (reset tilt: {reset_tilt})");
            state.events.push(GameEvent::RescueSucceeded { reset_tilt });
        }
        Some(RescueOutcome::Failure) => {
            log::info!("Bomb rescue failed");
            state.events.push(GameEvent::RescueFailed);
            if let Some(verdict) = state.gate.fail(FailureReason::RescueFailed) {
                state.phase = GamePhase::Finished;
                state.events.push(GameEvent::RunEnded { verdict });
            }
        }
        None => {}
    }
}

fn update_bird(state: &mut GameState, fire: bool) {
    let ctx = BirdContext {
        sway: state.sim.sway,
        bird_only: state.rule().is_bird_only(),
        fire,
    };
    let GameState {
        combat,
        rng,
        next_id,
        events,
        ..
    } = state;
    let bird_events = combat.update(
        ctx,
        || {
            let id = *next_id;
            *next_id += 1;
            id
        },
        rng,
    );
    events.extend(bird_events.into_iter().map(|e| match e {
        BirdEvent::ProjectileFired => GameEvent::ProjectileFired,
        BirdEvent::Appeared => GameEvent::BirdAppeared,
        BirdEvent::ShotDown { kills } => GameEvent::BirdShot { kills },
        BirdEvent::Struck { health } => GameEvent::BirdStruck { health },
    }));
}

/// Tilt the autopilot tries to hold inside
const AUTOPILOT_DEADBAND: f32 = 1.5;
/// How far ahead the autopilot extrapolates sway (ticks)
const AUTOPILOT_LOOKAHEAD: f32 = 12.0;

/// Attract-mode player: counter-steer the predicted tilt, lengthen the rod when
/// wobbling, answer rescues and shoot at the bird.
fn autopilot(state: &GameState, input: &mut TickInput) {
    let predicted = state.sim.sway + state.sim.sway_velocity * AUTOPILOT_LOOKAHEAD;
    input.hold_left = predicted > AUTOPILOT_DEADBAND;
    input.hold_right = predicted < -AUTOPILOT_DEADBAND;

    let resting = RodState::default().length;
    input.hold_extend = state.sim.sway.abs() > 10.0;
    input.hold_retract =
        !input.hold_extend && state.sim.sway.abs() < 3.0 && state.rod.length > resting;

    input.rescue_key = state.rescue.required_key();
    input.fire = state.combat.bird.state.is_shootable();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::collision::rod_rect;
    use crate::sim::hazards::{Hazard, HazardKind};
    use crate::sim::progression::{LevelRule, LevelVerdict};
    use glam::Vec2;

    fn endless(seed: u64) -> GameState {
        GameState::new(seed, LevelRule::endless()).unwrap()
    }

    /// Drop a hazard straight onto the rod
    fn place_on_rod(state: &mut GameState, kind: HazardKind) {
        let id = state.next_entity_id();
        let center = rod_rect(state.rod.length, state.sim.sway).center;
        state.hazards.hazards.push(Hazard {
            id,
            kind,
            pos: center,
            fall_speed: 0.0,
        });
    }

    #[test]
    fn test_tick_advances_distance() {
        let mut state = endless(1);
        tick(&mut state, &TickInput::default());
        assert_eq!(state.sim.tick_count, 1);
        assert!(state.sim.distance > 0.0);
    }

    #[test]
    fn test_tick_pause() {
        let mut state = endless(12345);
        tick(&mut state, &TickInput::default());
        let before = state.sim.clone();

        let input = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &input);
        assert_eq!(state.phase, GamePhase::Paused);
        assert_eq!(state.events, vec![GameEvent::Paused]);

        for _ in 0..10 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.sim, before);

        // Unpause resumes in the same tick
        tick(&mut state, &input);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.sim.tick_count, before.tick_count + 1);
    }

    #[test]
    fn test_steady_pickup_counts_steady_ticks() {
        let mut state = endless(3);
        place_on_rod(&mut state, HazardKind::Steady);
        tick(&mut state, &TickInput::default());
        assert!(state.events.contains(&GameEvent::HazardCollected {
            kind: HazardKind::Steady,
            refreshed: false
        }));
        assert_eq!(state.steady_ticks, 1);
        for _ in 0..10 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.steady_ticks, 11);
        assert_eq!(state.sim.sway, 0.0);
    }

    #[test]
    fn test_bomb_suspends_until_resolved() {
        let mut state = endless(4);
        place_on_rod(&mut state, HazardKind::Explosive);
        tick(&mut state, &TickInput::default());
        let key = state.rescue.required_key().unwrap();
        assert!(matches!(state.events[..], [.., GameEvent::RescueStarted { .. }]));

        let frozen = state.sim.clone();
        for _ in 0..5 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.sim, frozen);

        tick(
            &mut state,
            &TickInput {
                rescue_key: Some(key),
                ..Default::default()
            },
        );
        assert!(!state.rescue.is_active());
        assert_eq!(state.verdict(), LevelVerdict::InProgress);

        tick(&mut state, &TickInput::default());
        assert_eq!(state.sim.tick_count, frozen.tick_count + 1);
    }

    #[test]
    fn test_tick_keeps_hazards_in_id_order() {
        let mut state = endless(8);
        state.hazards.spawn_interval = u32::MAX;
        for id in [9, 2, 5] {
            state.hazards.hazards.push(Hazard {
                id,
                kind: HazardKind::Steady,
                pos: Vec2::new(20.0, 20.0),
                fall_speed: 0.0,
            });
        }
        tick(&mut state, &TickInput::default());
        let ids: Vec<u32> = state.hazards.hazards.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![2, 5, 9]);
    }

    #[test]
    fn test_finished_run_is_frozen() {
        let mut state = endless(5);
        state.sim.sway = 70.0;
        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::Finished);
        let ticks = state.sim.tick_count;
        tick(&mut state, &TickInput::default());
        assert_eq!(state.sim.tick_count, ticks);
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_autopilot_answers_rescue() {
        let mut state = endless(6);
        place_on_rod(&mut state, HazardKind::Explosive);
        tick(&mut state, &TickInput::default());
        assert!(state.rescue.is_active());

        let auto = TickInput {
            autopilot: true,
            ..Default::default()
        };
        tick(&mut state, &auto);
        assert!(!state.rescue.is_active());
        assert_eq!(state.verdict(), LevelVerdict::InProgress);
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let mut state1 = endless(99999);
        let mut state2 = endless(99999);

        let inputs = [
            TickInput {
                hold_left: true,
                ..Default::default()
            },
            TickInput {
                hold_extend: true,
                fire: true,
                ..Default::default()
            },
            TickInput {
                hold_right: true,
                ..Default::default()
            },
            TickInput::default(),
        ];

        for i in 0..2000 {
            let input = &inputs[i % inputs.len()];
            tick(&mut state1, input);
            tick(&mut state2, input);
        }

        assert_eq!(state1, state2);
    }
}
