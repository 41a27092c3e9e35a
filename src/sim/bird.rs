//! Mechanical bird combat
//!
//! A single clockwork bird that swoops in when the walker is wobbling, hovers, then
//! dives at the walker's head. Shots only land while it is entering or hovering.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::rotate_deg;

/// Idle cooldown range before the bird may appear (ticks)
pub const BIRD_COOLDOWN_MIN: u32 = 300;
pub const BIRD_COOLDOWN_MAX: u32 = 600;
/// Tilt window that lures the bird (outside bird-only levels)
pub const LURE_MIN_DEG: f32 = 15.0;
pub const LURE_MAX_DEG: f32 = 30.0;
pub const BIRD_ENTER_SPEED: f32 = 6.0;
pub const BIRD_ATTACK_SPEED: f32 = 12.0;
pub const BIRD_ARRIVE_EPSILON: f32 = 4.0;
/// Distance to the head that counts as a strike
pub const BIRD_CONTACT_RADIUS: f32 = 24.0;
pub const BIRD_HOVER_TICKS: u32 = 90;
pub const BIRD_STUN_TICKS: u32 = 30;
/// Spawn distance beyond the screen edge
pub const BIRD_OFFSCREEN: f32 = 80.0;
pub const BIRD_SPAWN_Y: f32 = 300.0;
/// Hover spot relative to the head (x mirrored by side)
pub const HOVER_OFFSET: Vec2 = Vec2::new(120.0, -220.0);

pub const PROJECTILE_SPEED: f32 = 14.0;
pub const PROJECTILE_TTL: u32 = 120;
pub const PROJECTILE_HIT_RADIUS: f32 = 40.0;
pub const FIRE_COOLDOWN_TICKS: u32 = 12;

/// Head height above the pivot along the tilted body
pub const HEAD_HEIGHT: f32 = 330.0;

/// Walker's head in world space at a given tilt
pub fn head_position(sway: f32) -> Vec2 {
    Vec2::new(PIVOT_X, PIVOT_Y) + rotate_deg(Vec2::new(0.0, -HEAD_HEIGHT), sway)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BirdState {
    Idle { cooldown: u32, interval: u32 },
    Entering { target: Vec2 },
    Hovering { dwell: u32 },
    Attacking,
    /// Shot down: removed from play until the next cooldown
    Stunned { timer: u32 },
}

impl BirdState {
    fn fresh_idle(rng: &mut impl Rng) -> Self {
        BirdState::Idle {
            cooldown: 0,
            interval: rng.random_range(BIRD_COOLDOWN_MIN..=BIRD_COOLDOWN_MAX),
        }
    }

    pub fn is_shootable(&self) -> bool {
        matches!(self, BirdState::Entering { .. } | BirdState::Hovering { .. })
    }

    pub fn is_visible(&self) -> bool {
        matches!(
            self,
            BirdState::Entering { .. } | BirdState::Hovering { .. } | BirdState::Attacking
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bird {
    pub state: BirdState,
    pub pos: Vec2,
    /// Hover spot picked on entry
    pub target: Vec2,
}

impl Default for Bird {
    fn default() -> Self {
        Self {
            state: BirdState::Idle {
                cooldown: 0,
                interval: BIRD_COOLDOWN_MIN,
            },
            pos: Vec2::new(-BIRD_OFFSCREEN, BIRD_SPAWN_Y),
            target: Vec2::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub ttl: u32,
}

impl Projectile {
    fn in_bounds(&self) -> bool {
        let margin = 50.0;
        self.pos.x >= -margin
            && self.pos.x <= PLAY_WIDTH + margin
            && self.pos.y >= -margin
            && self.pos.y <= PLAY_HEIGHT + margin
    }
}

/// Things the presentation layer cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BirdEvent {
    ProjectileFired,
    Appeared,
    ShotDown { kills: u32 },
    Struck { health: u8 },
}

/// Per-tick inputs the bird reads
#[derive(Debug, Clone, Copy)]
pub struct BirdContext {
    pub sway: f32,
    /// Dedicated bird levels ignore the lure window
    pub bird_only: bool,
    pub fire: bool,
}

/// Move `pos` toward `target` by at most `speed`; returns the remaining distance
fn step_toward(pos: &mut Vec2, target: Vec2, speed: f32) -> f32 {
    let to = target - *pos;
    let dist = to.length();
    if dist <= speed {
        *pos = target;
        0.0
    } else {
        *pos += to / dist * speed;
        dist - speed
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirdCombat {
    pub bird: Bird,
    /// Player shots, sorted by id
    pub projectiles: Vec<Projectile>,
    pub fire_cooldown: u32,
    pub kills: u32,
    /// Player health pool
    pub health: u8,
}

impl Default for BirdCombat {
    fn default() -> Self {
        Self {
            bird: Bird::default(),
            projectiles: Vec::new(),
            fire_cooldown: 0,
            kills: 0,
            health: MAX_HEALTH,
        }
    }
}

impl BirdCombat {
    /// Fresh combat state with the first idle interval drawn from the run RNG
    pub fn new(rng: &mut impl Rng) -> Self {
        let mut combat = Self::default();
        combat.bird.state = BirdState::fresh_idle(rng);
        combat
    }

    /// Advance projectiles and the bird by one tick
    pub fn update(
        &mut self,
        ctx: BirdContext,
        mut next_id: impl FnMut() -> u32,
        rng: &mut impl Rng,
    ) -> Vec<BirdEvent> {
        let mut events = Vec::new();
        let head = head_position(ctx.sway);

        // Fire
        self.fire_cooldown = self.fire_cooldown.saturating_sub(1);
        if ctx.fire && self.fire_cooldown == 0 {
            let aim = if self.bird.state.is_visible() {
                (self.bird.pos - head).normalize_or(Vec2::NEG_Y)
            } else {
                Vec2::NEG_Y
            };
            self.projectiles.push(Projectile {
                id: next_id(),
                pos: head,
                vel: aim * PROJECTILE_SPEED,
                ttl: PROJECTILE_TTL,
            });
            self.fire_cooldown = FIRE_COOLDOWN_TICKS;
            events.push(BirdEvent::ProjectileFired);
        }

        for shot in &mut self.projectiles {
            shot.pos += shot.vel;
            shot.ttl = shot.ttl.saturating_sub(1);
        }
        self.projectiles.retain(|p| p.ttl > 0 && p.in_bounds());

        // Shots only land on an entering or hovering bird
        if self.bird.state.is_shootable() {
            let bird_pos = self.bird.pos;
            if let Some(index) = self
                .projectiles
                .iter()
                .position(|p| p.pos.distance(bird_pos) <= PROJECTILE_HIT_RADIUS)
            {
                self.projectiles.remove(index);
                self.kills += 1;
                self.bird.state = BirdState::Stunned { timer: 0 };
                log::info!("Bird shot down (kills: {})", self.kills);
                events.push(BirdEvent::ShotDown { kills: self.kills });
            }
        }

        match &mut self.bird.state {
            BirdState::Idle { cooldown, interval } => {
                *cooldown = (*cooldown + 1).min(*interval);
                let lured = ctx.bird_only
                    || (LURE_MIN_DEG..=LURE_MAX_DEG).contains(&ctx.sway.abs());
                if *cooldown >= *interval && lured {
                    let side = if ctx.sway < 0.0 { -1.0 } else { 1.0 };
                    let spawn_x = if side < 0.0 {
                        -BIRD_OFFSCREEN
                    } else {
                        PLAY_WIDTH + BIRD_OFFSCREEN
                    };
                    let target = head + Vec2::new(HOVER_OFFSET.x * side, HOVER_OFFSET.y);
                    self.bird.pos = Vec2::new(spawn_x, BIRD_SPAWN_Y);
                    self.bird.target = target;
                    self.bird.state = BirdState::Entering { target };
                    log::debug!(
                        "Bird entering from {}",
                        if side < 0.0 { "left" } else { "right" }
                    );
                    events.push(BirdEvent::Appeared);
                }
            }
            BirdState::Entering { target } => {
                let target = *target;
                if step_toward(&mut self.bird.pos, target, BIRD_ENTER_SPEED)
                    <= BIRD_ARRIVE_EPSILON
                {
                    self.bird.pos = target;
                    self.bird.state = BirdState::Hovering { dwell: 0 };
                }
            }
            BirdState::Hovering { dwell } => {
                *dwell += 1;
                if *dwell >= BIRD_HOVER_TICKS {
                    self.bird.state = BirdState::Attacking;
                }
            }
            BirdState::Attacking => {
                if step_toward(&mut self.bird.pos, head, BIRD_ATTACK_SPEED) <= BIRD_CONTACT_RADIUS {
                    self.health = self.health.saturating_sub(1);
                    self.bird.state = BirdState::fresh_idle(rng);
                    self.bird.pos = Vec2::new(-BIRD_OFFSCREEN, BIRD_SPAWN_Y);
                    log::info!("Bird struck the walker (health: {})", self.health);
                    events.push(BirdEvent::Struck {
                        health: self.health,
                    });
                }
            }
            BirdState::Stunned { timer } => {
                *timer += 1;
                if *timer >= BIRD_STUN_TICKS {
                    self.bird.state = BirdState::fresh_idle(rng);
                    self.bird.pos = Vec2::new(-BIRD_OFFSCREEN, BIRD_SPAWN_Y);
                }
            }
        }

        events
    }

    pub fn is_dead(&self) -> bool {
        self.health == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn ctx(sway: f32) -> BirdContext {
        BirdContext {
            sway,
            bird_only: false,
            fire: false,
        }
    }

    fn run(combat: &mut BirdCombat, c: BirdContext, rng: &mut Pcg32) -> Vec<BirdEvent> {
        let mut id = 100;
        combat.update(
            c,
            || {
                id += 1;
                id
            },
            rng,
        )
    }

    fn ready() -> BirdCombat {
        let mut combat = BirdCombat::default();
        combat.bird.state = BirdState::Idle {
            cooldown: BIRD_COOLDOWN_MIN,
            interval: BIRD_COOLDOWN_MIN,
        };
        combat
    }

    #[test]
    fn test_first_interval_comes_from_rng() {
        let mut intervals = Vec::new();
        for seed in 0..8 {
            let mut rng = Pcg32::seed_from_u64(seed);
            match BirdCombat::new(&mut rng).bird.state {
                BirdState::Idle { cooldown, interval } => {
                    assert_eq!(cooldown, 0);
                    assert!((BIRD_COOLDOWN_MIN..=BIRD_COOLDOWN_MAX).contains(&interval));
                    intervals.push(interval);
                }
                other => panic!("expected Idle, got {other:?}"),
            }
        }
        assert!(intervals.iter().any(|&i| i != intervals[0]));
    }

    #[test]
    fn test_bird_waits_for_lure_window() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut combat = ready();
        run(&mut combat, ctx(5.0), &mut rng);
        assert!(matches!(combat.bird.state, BirdState::Idle { .. }));
        run(&mut combat, ctx(40.0), &mut rng);
        assert!(matches!(combat.bird.state, BirdState::Idle { .. }));

        let events = run(&mut combat, ctx(-20.0), &mut rng);
        assert_eq!(events, vec![BirdEvent::Appeared]);
        assert!(matches!(combat.bird.state, BirdState::Entering { .. }));
        // Spawned on the side the walker leans toward
        assert!(combat.bird.pos.x < 0.0);
    }

    #[test]
    fn test_bird_only_ignores_lure_window() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut combat = ready();
        let c = BirdContext {
            bird_only: true,
            ..ctx(0.0)
        };
        run(&mut combat, c, &mut rng);
        assert!(matches!(combat.bird.state, BirdState::Entering { .. }));
        assert!(combat.bird.pos.x > PLAY_WIDTH);
    }

    #[test]
    fn test_full_attack_cycle_costs_one_health() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut combat = ready();
        run(&mut combat, ctx(20.0), &mut rng);

        let mut struck = false;
        for _ in 0..1000 {
            let events = run(&mut combat, ctx(20.0), &mut rng);
            if events.contains(&BirdEvent::Struck { health: MAX_HEALTH - 1 }) {
                struck = true;
                break;
            }
        }
        assert!(struck);
        assert_eq!(combat.health, MAX_HEALTH - 1);
        assert_eq!(combat.kills, 0);
        match combat.bird.state {
            BirdState::Idle { cooldown, interval } => {
                assert_eq!(cooldown, 0);
                assert!((BIRD_COOLDOWN_MIN..=BIRD_COOLDOWN_MAX).contains(&interval));
            }
            other => panic!("expected Idle, got {other:?}"),
        }
    }

    #[test]
    fn test_entering_reaches_hover_then_attacks() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut combat = ready();
        run(&mut combat, ctx(20.0), &mut rng);
        let mut ticks = 0;
        while !matches!(combat.bird.state, BirdState::Hovering { .. }) {
            run(&mut combat, ctx(20.0), &mut rng);
            ticks += 1;
            assert!(ticks < 500);
        }
        assert_eq!(combat.bird.pos, combat.bird.target);
        for _ in 0..BIRD_HOVER_TICKS {
            run(&mut combat, ctx(20.0), &mut rng);
        }
        assert_eq!(combat.bird.state, BirdState::Attacking);
    }

    #[test]
    fn test_hovering_bird_can_be_shot() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut combat = BirdCombat::default();
        combat.bird.state = BirdState::Hovering { dwell: 0 };
        combat.bird.pos = head_position(0.0) + Vec2::new(0.0, -100.0);

        let fire = BirdContext {
            fire: true,
            ..ctx(0.0)
        };
        let mut shot = false;
        for _ in 0..20 {
            let events = run(&mut combat, fire, &mut rng);
            if events.contains(&BirdEvent::ShotDown { kills: 1 }) {
                shot = true;
                break;
            }
        }
        assert!(shot);
        assert_eq!(combat.kills, 1);
        assert!(matches!(combat.bird.state, BirdState::Stunned { .. }));

        // The shot tick already counted one stun tick
        for _ in 1..BIRD_STUN_TICKS {
            run(&mut combat, ctx(0.0), &mut rng);
        }
        assert!(matches!(combat.bird.state, BirdState::Idle { cooldown: 0, .. }));
    }

    #[test]
    fn test_attacking_bird_is_immune_to_shots() {
        let mut rng = Pcg32::seed_from_u64(6);
        let mut combat = BirdCombat::default();
        let head = head_position(0.0);
        combat.bird.state = BirdState::Attacking;
        combat.bird.pos = head;
        combat.projectiles.push(Projectile {
            id: 1,
            pos: head,
            vel: Vec2::ZERO,
            ttl: 10,
        });

        let events = run(&mut combat, ctx(0.0), &mut rng);
        assert_eq!(combat.kills, 0);
        assert_eq!(combat.health, MAX_HEALTH - 1);
        assert_eq!(events, vec![BirdEvent::Struck { health: MAX_HEALTH - 1 }]);
        // The shot passed through untouched
        assert_eq!(combat.projectiles.len(), 1);
    }

    #[test]
    fn test_fire_cooldown_limits_rate() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut combat = BirdCombat::default();
        let fire = BirdContext {
            fire: true,
            ..ctx(0.0)
        };
        for _ in 0..FIRE_COOLDOWN_TICKS {
            run(&mut combat, fire, &mut rng);
        }
        assert_eq!(combat.projectiles.len(), 1);
        run(&mut combat, fire, &mut rng);
        assert_eq!(combat.projectiles.len(), 2);
    }

    #[test]
    fn test_projectiles_expire_off_screen() {
        let mut rng = Pcg32::seed_from_u64(8);
        let mut combat = BirdCombat::default();
        combat.projectiles.push(Projectile {
            id: 1,
            pos: Vec2::new(400.0, 10.0),
            vel: Vec2::new(0.0, -PROJECTILE_SPEED),
            ttl: PROJECTILE_TTL,
        });
        for _ in 0..10 {
            run(&mut combat, ctx(0.0), &mut rng);
        }
        assert!(combat.projectiles.is_empty());
    }

    #[test]
    fn test_health_floors_at_zero() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut combat = BirdCombat::default();
        combat.health = 1;
        combat.bird.state = BirdState::Attacking;
        combat.bird.pos = head_position(0.0);
        run(&mut combat, ctx(0.0), &mut rng);
        assert!(combat.is_dead());
    }
}
