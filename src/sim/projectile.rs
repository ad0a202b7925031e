//! Projectiles and the player's laser beam
//!
//! Projectiles are launched with a single impulse and coast (no deceleration).
//! What ends them depends on the kind:
//! - basic shots (player and enemy) die on any contact
//! - bounce shots survive a fixed number of colliding frames
//! - hex beams pass through basic player shots and die on anything else

use std::f64::consts::FRAC_PI_2;

use glam::DVec2;

use crate::physics::{ColliderHandle, ColliderType, CollisionManager, ObjectId};

use super::events::{EventBus, GameEvent};
use super::player::PlayerInfo;
use super::templates::EntityKind;
use super::transform::Transform;
use super::world::Frame;
use super::ticks;

/// Colliding frames a bounce shot survives
pub const BOUNCE_SHOT_BOUNCES: u32 = 3;
/// Seconds before an unspent projectile is removed
pub const PROJECTILE_LIFETIME: f64 = 10.0;
/// Distance from the ship's origin to the beam's base
pub const LASER_OFFSET: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileKind {
    Basic,
    Bounce,
    EnemyBasic,
    HexBeam,
}

impl ProjectileKind {
    pub fn from_entity(kind: EntityKind) -> Option<Self> {
        match kind {
            EntityKind::BasicShot => Some(ProjectileKind::Basic),
            EntityKind::BounceShot => Some(ProjectileKind::Bounce),
            EntityKind::EnemyShot => Some(ProjectileKind::EnemyBasic),
            EntityKind::HexBeam => Some(ProjectileKind::HexBeam),
            _ => None,
        }
    }
}

/// Orientation that turns a shape's local -y axis toward `direction`
#[inline]
pub fn facing(direction: DVec2) -> f64 {
    direction.y.atan2(direction.x) + FRAC_PI_2
}

#[derive(Debug, Clone)]
pub struct Projectile {
    kind: ProjectileKind,
    entity: EntityKind,
    pub transform: Transform,
    bounces_left: u32,
    /// Ticks until removal
    lifetime: u32,
}

impl Projectile {
    pub fn new(entity: EntityKind, kind: ProjectileKind, transform: Transform) -> Self {
        Self {
            kind,
            entity,
            transform,
            bounces_left: BOUNCE_SHOT_BOUNCES,
            lifetime: ticks(PROJECTILE_LIFETIME),
        }
    }

    #[inline]
    pub fn kind(&self) -> ProjectileKind {
        self.kind
    }

    #[inline]
    pub fn entity_kind(&self) -> EntityKind {
        self.entity
    }

    #[inline]
    pub fn bounces_left(&self) -> u32 {
        self.bounces_left
    }

    /// Launch along `direction` at the body's speed
    pub fn fire(&mut self, direction: DVec2, collisions: &mut CollisionManager) {
        let Some(direction) = direction.try_normalize() else {
            return;
        };
        self.transform.set_forward(direction);
        self.transform.set_orientation(facing(direction), collisions);
        let speed = self.transform.body.speed();
        self.transform.body.add_impulse_velocity(direction * speed);
    }

    /// Returns false once the projectile is spent
    pub fn update(&mut self, frame: &mut Frame<'_>) -> bool {
        self.lifetime = self.lifetime.saturating_sub(1);
        if self.lifetime == 0 {
            return false;
        }

        let collisions = &mut *frame.collisions;
        match self.kind {
            ProjectileKind::Basic | ProjectileKind::EnemyBasic => {
                if self
                    .transform
                    .collisions(collisions)
                    .is_some_and(|info| info.is_colliding)
                {
                    return false;
                }
                self.transform.resolve_collisions(collisions);
            }
            ProjectileKind::Bounce => {
                let info = self.transform.resolve_collisions(collisions);
                if info.is_colliding {
                    self.bounces_left = self.bounces_left.saturating_sub(1);
                    if self.bounces_left == 0 {
                        return false;
                    }
                }
            }
            ProjectileKind::HexBeam => {
                let Some(info) = self.transform.collisions(collisions) else {
                    return false;
                };
                let fatal = info
                    .batons
                    .iter()
                    .any(|b| !b.is(ColliderType::PlayerAttack, ObjectId::PlayerProjectileBasic));
                if fatal {
                    return false;
                }
                // Keep flying straight through basic shots
                let cancel = -info.impulse_vector;
                self.transform.discard_collisions(collisions);
                self.transform.body.add_impulse_velocity(cancel);
            }
        }

        self.transform.step(collisions);
        true
    }
}

/// The player's special attack: a long trigger anchored to the ship's nose
#[derive(Debug, Clone)]
pub struct LaserBeam {
    collider: ColliderHandle,
    active: bool,
}

impl LaserBeam {
    pub fn new(collider: ColliderHandle) -> Self {
        Self {
            collider,
            active: false,
        }
    }

    #[inline]
    pub fn collider(&self) -> ColliderHandle {
        self.collider
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Report last pass's hits, then follow the player
    pub fn update(&mut self, player: &PlayerInfo, collisions: &mut CollisionManager, events: &mut EventBus) {
        let Some(collider) = collisions.collider_mut(self.collider) else {
            return;
        };

        if self.active {
            for &point in &collider.collision_response_info().all_collision_points {
                events.publish(GameEvent::LaserHit { point });
            }
        }
        collider.clear_collision_response_info();

        self.active = player.laser_active;
        collider.set_is_active(self.active);
        if self.active {
            collider.translate(player.origin + player.aim * LASER_OFFSET);
            collider.shape_mut().set_orientation(facing(player.aim));
        }
    }
}
