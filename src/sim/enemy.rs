//! Enemy state machine and per-archetype behaviour tables
//!
//! Every enemy runs the same outer machine:
//! - `Spawning`: collider disabled until the spawn animation ends
//! - `Normal`: takes damage, then runs its archetype's movement and attack
//! - `Damaged`: brief window that only resolves collisions and coasts
//! - `Destroyed`: terminal
//!
//! What an archetype does inside `Normal` is a [`Behaviour`] table. Each table
//! starts from [`BASE`] and overrides the entries that archetype cares about.

use std::fmt;

use glam::DVec2;
use rand::Rng;

use crate::physics::{Baton, ColliderType, CollisionResponseInfo, ObjectId};
use crate::{angle_between_degrees, deg_to_rad};

use super::events::GameEvent;
use super::templates::EntityKind;
use super::transform::Transform;
use super::world::{Frame, SpawnRequest};
use super::ticks;

/// Seconds between spawning and becoming solid
pub const SPAWN_TIME: f64 = 2.5;
/// Seconds spent in the damaged window
pub const DAMAGED_TIME: f64 = 0.1;

// Rhombus
const RHOMBUS_PLAYER_OFFSET: f64 = 450.0;
const RHOMBUS_SPEED_OFFSET: f64 = 150.0;
const RHOMBUS_ACCELERATION: f64 = 1000.0;
const RHOMBUS_KEEP_DISTANCE: f64 = 300.0;
const RHOMBUS_KNOCKBACK: f64 = 150.0;
const RHOMBUS_MAX_SHOT_DELAY_MS: u32 = 3000;
const RHOMBUS_MIN_SHOT_DELAY: f64 = 1.0;

// Square
const SQUARE_SEEK_HALF_ANGLE: f64 = 5.0;
const SQUARE_WARNING_TIME: f64 = 0.6;
const SQUARE_ATTACK_TIME: f64 = 1.0;
const SQUARE_INACTIVE_TIME: f64 = 1.0;
const SQUARE_ACCELERATION: f64 = 8000.0;
const UP: DVec2 = DVec2::new(0.0, -1.0);
const RIGHT: DVec2 = DVec2::new(1.0, 0.0);

// Hexagon
const HEXAGON_ATTACK_TIME: f64 = 2.5;
const HEXAGON_TURN_DEGREES: f64 = 29.2;
const HEX_BEAM_SPAWNS: [DVec2; 6] = [
    DVec2::new(-58.5, -35.0),
    DVec2::new(-58.5, 35.0),
    DVec2::new(58.5, -35.0),
    DVec2::new(58.5, 35.0),
    DVec2::new(0.0, 83.5),
    DVec2::new(0.0, -83.5),
];
const HEX_BEAM_SPAWNS_ROTATED: [DVec2; 6] = [
    DVec2::new(-48.0, -83.5),
    DVec2::new(-48.0, 83.5),
    DVec2::new(48.0, -83.5),
    DVec2::new(48.0, 83.5),
    DVec2::new(-96.0, 0.0),
    DVec2::new(96.0, 0.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyState {
    Spawning,
    Normal,
    Damaged,
    Destroyed,
}

/// Stages of a square's charge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SquarePhase {
    Searching,
    Warning,
    Attacking,
    Inactive,
}

/// Archetype-specific runtime data
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Archetype {
    Rhombus {
        /// Where around the player this rhombus is heading
        offset: DVec2,
        base_speed: f64,
        shot_timer: u32,
    },
    Square {
        phase: SquarePhase,
        timer: u32,
        direction: DVec2,
    },
    Hexagon {
        timer: u32,
        rotated: bool,
        /// Orientation at the start of the current attack period
        turn_from: f64,
    },
}

type Hook = fn(&mut Enemy, &mut Frame<'_>);
type CollisionHook = fn(&mut Enemy, &CollisionResponseInfo, &mut Frame<'_>);

/// How one archetype behaves while `Normal`
#[derive(Clone, Copy)]
pub struct Behaviour {
    pub name: &'static str,
    /// Runs once when spawning ends
    pub on_start: Hook,
    pub movement: Hook,
    pub attack: Hook,
    /// Runs whenever the resolved response was colliding
    pub on_collision: CollisionHook,
    /// Runs after damage was applied and the enemy survived
    pub on_damage: CollisionHook,
}

impl fmt::Debug for Behaviour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Behaviour").field("name", &self.name).finish()
    }
}

fn idle(_enemy: &mut Enemy, _frame: &mut Frame<'_>) {}

fn ignore(_enemy: &mut Enemy, _info: &CollisionResponseInfo, _frame: &mut Frame<'_>) {}

pub const BASE: Behaviour = Behaviour {
    name: "base",
    on_start: idle,
    movement: idle,
    attack: idle,
    on_collision: ignore,
    on_damage: ignore,
};

pub const RHOMBUS: Behaviour = Behaviour {
    name: "rhombus",
    on_start: rhombus_start,
    movement: rhombus_chase,
    attack: rhombus_shoot,
    on_collision: rhombus_retarget,
    on_damage: rhombus_knockback,
};

pub const SQUARE: Behaviour = Behaviour {
    name: "square",
    movement: square_charge,
    on_collision: square_abrupt_stop,
    ..BASE
};

pub const HEXAGON: Behaviour = Behaviour {
    name: "hexagon",
    on_start: hexagon_start,
    attack: hexagon_fire,
    ..BASE
};

#[derive(Debug, Clone)]
pub struct Enemy {
    kind: EntityKind,
    pub transform: Transform,
    state: EnemyState,
    health: i32,
    /// Ticks left in `Spawning` or `Damaged`
    timer: u32,
    archetype: Archetype,
    behaviour: &'static Behaviour,
}

impl Enemy {
    /// Build an enemy of an enemy kind; other kinds yield `None`
    pub fn new(kind: EntityKind, transform: Transform, health: i32) -> Option<Self> {
        let (archetype, behaviour) = match kind {
            EntityKind::Rhombus => (
                Archetype::Rhombus {
                    offset: DVec2::ZERO,
                    base_speed: transform.body.speed(),
                    shot_timer: 0,
                },
                &RHOMBUS,
            ),
            EntityKind::Square => (
                Archetype::Square {
                    phase: SquarePhase::Searching,
                    timer: 0,
                    direction: UP,
                },
                &SQUARE,
            ),
            EntityKind::Hexagon => (
                Archetype::Hexagon {
                    timer: 0,
                    rotated: false,
                    turn_from: 0.0,
                },
                &HEXAGON,
            ),
            _ => return None,
        };
        Some(Self {
            kind,
            transform,
            state: EnemyState::Spawning,
            health,
            timer: ticks(SPAWN_TIME),
            archetype,
            behaviour,
        })
    }

    #[inline]
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    #[inline]
    pub fn state(&self) -> EnemyState {
        self.state
    }

    #[inline]
    pub fn health(&self) -> i32 {
        self.health
    }

    #[inline]
    pub fn archetype(&self) -> &Archetype {
        &self.archetype
    }

    #[inline]
    pub fn behaviour(&self) -> &'static Behaviour {
        self.behaviour
    }

    /// Returns false once destroyed
    pub fn update(&mut self, frame: &mut Frame<'_>) -> bool {
        match self.state {
            EnemyState::Spawning => {
                self.timer = self.timer.saturating_sub(1);
                if self.timer == 0 {
                    if let Some(collider) = frame.collisions.collider_mut(self.transform.collider()) {
                        collider.set_is_active(true);
                    }
                    self.state = EnemyState::Normal;
                    let on_start = self.behaviour.on_start;
                    on_start(self, frame);
                }
                true
            }
            EnemyState::Normal => self.update_normal(frame),
            EnemyState::Damaged => {
                self.transform.resolve_collisions(frame.collisions);
                self.transform.step(frame.collisions);
                self.timer = self.timer.saturating_sub(1);
                if self.timer == 0 {
                    self.state = EnemyState::Normal;
                }
                true
            }
            EnemyState::Destroyed => false,
        }
    }

    fn update_normal(&mut self, frame: &mut Frame<'_>) -> bool {
        let behaviour = self.behaviour;
        let info = self.transform.resolve_collisions(frame.collisions);

        let damage = info.damage_from(|b| b.collider_type() == ColliderType::PlayerAttack);
        if damage > 0 {
            self.take_damage(damage, &info, frame);
            if self.state == EnemyState::Destroyed {
                return false;
            }
        }

        if info.is_colliding {
            (behaviour.on_collision)(self, &info, frame);
        }
        if damage > 0 {
            (behaviour.on_damage)(self, &info, frame);
            self.state = EnemyState::Damaged;
            self.timer = ticks(DAMAGED_TIME);
        }

        (behaviour.movement)(self, frame);
        (behaviour.attack)(self, frame);
        self.transform.step(frame.collisions);
        true
    }

    fn take_damage(&mut self, damage: i32, info: &CollisionResponseInfo, frame: &mut Frame<'_>) {
        if info.touched(ColliderType::PlayerAttack, ObjectId::PlayerSpecialAttack) {
            frame.events.publish(GameEvent::EnemySpecialDamage);
        }
        if info.touched(ColliderType::PlayerAttack, ObjectId::PlayerProjectileBasic) {
            frame.events.publish(GameEvent::EnemyBasicDamage);
        }

        self.health -= damage;
        log::debug!("{} took {} damage, {} left", self.kind, damage, self.health);
        if self.health <= 0 {
            self.state = EnemyState::Destroyed;
            frame.events.publish(GameEvent::EnemyDeath {
                kind: self.kind,
                position: self.transform.origin(),
            });
        }
    }
}

// Rhombus: drift toward a random point near the player and shoot at it

fn rhombus_start(enemy: &mut Enemy, frame: &mut Frame<'_>) {
    rhombus_randomize(enemy, frame);
    rhombus_reset_shot(enemy, frame);
}

fn rhombus_randomize(enemy: &mut Enemy, frame: &mut Frame<'_>) {
    let Archetype::Rhombus {
        offset, base_speed, ..
    } = &mut enemy.archetype
    else {
        return;
    };
    *offset = DVec2::new(
        frame.rng.random_range(-RHOMBUS_PLAYER_OFFSET..=RHOMBUS_PLAYER_OFFSET),
        frame.rng.random_range(-RHOMBUS_PLAYER_OFFSET..=RHOMBUS_PLAYER_OFFSET),
    );
    let speed = *base_speed + frame.rng.random_range(-RHOMBUS_SPEED_OFFSET..=RHOMBUS_SPEED_OFFSET);
    enemy.transform.body.set_speed(speed);
}

fn rhombus_reset_shot(enemy: &mut Enemy, frame: &mut Frame<'_>) {
    let Archetype::Rhombus { shot_timer, .. } = &mut enemy.archetype else {
        return;
    };
    let delay_ms = frame.rng.random_range(0..RHOMBUS_MAX_SHOT_DELAY_MS);
    *shot_timer = ticks((delay_ms as f64 / 1000.0).max(RHOMBUS_MIN_SHOT_DELAY));
}

fn rhombus_chase(enemy: &mut Enemy, frame: &mut Frame<'_>) {
    let Archetype::Rhombus { offset, .. } = enemy.archetype else {
        return;
    };
    let origin = enemy.transform.origin();
    let to_player = frame.player.origin - origin;
    enemy.transform.set_forward(to_player);

    let body = &mut enemy.transform.body;
    if to_player.length() > RHOMBUS_KEEP_DISTANCE {
        let heading = (frame.player.origin + offset - origin).normalize_or_zero();
        body.set_acceleration(heading * RHOMBUS_ACCELERATION);
    } else {
        body.halt();
    }
}

fn rhombus_shoot(enemy: &mut Enemy, frame: &mut Frame<'_>) {
    let Archetype::Rhombus { shot_timer, .. } = &mut enemy.archetype else {
        return;
    };
    *shot_timer = shot_timer.saturating_sub(1);
    if *shot_timer > 0 {
        return;
    }
    let direction = frame.player.origin - enemy.transform.origin();
    frame.spawns.push(SpawnRequest::projectile(
        EntityKind::EnemyShot,
        enemy.transform.origin(),
        direction,
    ));
    rhombus_reset_shot(enemy, frame);
}

fn rhombus_retarget(enemy: &mut Enemy, _info: &CollisionResponseInfo, frame: &mut Frame<'_>) {
    rhombus_randomize(enemy, frame);
}

fn rhombus_knockback(enemy: &mut Enemy, info: &CollisionResponseInfo, _frame: &mut Frame<'_>) {
    enemy
        .transform
        .body
        .add_impulse_velocity(info.nudge_direction * RHOMBUS_KNOCKBACK);
}

// Square: wait until the player lines up on an axis, warn, then charge

fn square_charge(enemy: &mut Enemy, frame: &mut Frame<'_>) {
    let to_player = frame.player.origin - enemy.transform.origin();
    let Archetype::Square {
        phase,
        timer,
        direction,
    } = &mut enemy.archetype
    else {
        return;
    };
    let body = &mut enemy.transform.body;
    *timer = timer.saturating_sub(1);

    match *phase {
        SquarePhase::Searching => {
            if let Some(axis) = square_target_axis(to_player) {
                *direction = axis;
                *phase = SquarePhase::Warning;
                *timer = ticks(SQUARE_WARNING_TIME);
                frame.events.publish(GameEvent::EnemyTargetLocked);
            }
        }
        SquarePhase::Warning if *timer == 0 => {
            *phase = SquarePhase::Attacking;
            *timer = ticks(SQUARE_ATTACK_TIME);
            body.set_acceleration(*direction * SQUARE_ACCELERATION);
        }
        SquarePhase::Attacking if *timer == 0 => {
            *phase = SquarePhase::Inactive;
            *timer = ticks(SQUARE_INACTIVE_TIME);
            body.halt();
        }
        SquarePhase::Inactive if *timer == 0 => *phase = SquarePhase::Searching,
        _ => {}
    }
}

/// Cardinal direction toward the target, if it sits close enough to one
fn square_target_axis(to_target: DVec2) -> Option<DVec2> {
    [UP, RIGHT].into_iter().find_map(|axis| {
        let angle = angle_between_degrees(axis, to_target);
        if angle <= SQUARE_SEEK_HALF_ANGLE {
            Some(axis)
        } else if angle >= 180.0 - SQUARE_SEEK_HALF_ANGLE {
            Some(-axis)
        } else {
            None
        }
    })
}

fn square_stops_on(baton: &Baton) -> bool {
    matches!(
        baton,
        Baton::Environment
            | Baton::Player
            | Baton::Enemy {
                id: ObjectId::EnemySquare | ObjectId::EnemyHexagon,
                ..
            }
    )
}

fn square_abrupt_stop(enemy: &mut Enemy, info: &CollisionResponseInfo, _frame: &mut Frame<'_>) {
    if !info.batons.iter().any(square_stops_on) {
        return;
    }
    enemy.transform.body.halt();
    enemy.transform.body.add_impulse_velocity(-info.impulse_vector);
    if let Archetype::Square { phase, timer, .. } = &mut enemy.archetype {
        if *phase == SquarePhase::Attacking {
            *phase = SquarePhase::Inactive;
            *timer = ticks(SQUARE_INACTIVE_TIME);
        }
    }
}

// Hexagon: turn in place and fire a ring of beams every period

fn hexagon_start(enemy: &mut Enemy, _frame: &mut Frame<'_>) {
    if let Archetype::Hexagon { timer, .. } = &mut enemy.archetype {
        *timer = ticks(HEXAGON_ATTACK_TIME);
    }
}

fn hexagon_fire(enemy: &mut Enemy, frame: &mut Frame<'_>) {
    let Archetype::Hexagon {
        timer,
        rotated,
        turn_from,
    } = &mut enemy.archetype
    else {
        return;
    };
    let period = ticks(HEXAGON_ATTACK_TIME);
    *timer = timer.saturating_sub(1);

    let progress = 1.0 - *timer as f64 / period as f64;
    let orientation = *turn_from + deg_to_rad(HEXAGON_TURN_DEGREES) * progress;
    enemy.transform.set_orientation(orientation, frame.collisions);
    if *timer > 0 {
        return;
    }

    let spawns = if *rotated {
        &HEX_BEAM_SPAWNS_ROTATED
    } else {
        &HEX_BEAM_SPAWNS
    };
    let origin = enemy.transform.origin();
    for &location in spawns {
        frame.spawns.push(SpawnRequest::projectile(
            EntityKind::HexBeam,
            origin + location,
            location,
        ));
    }
    *rotated = !*rotated;
    *turn_from = orientation;
    *timer = period;
}
