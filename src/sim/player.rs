//! The player ship
//!
//! States:
//! - `Normal`: move, shoot basic shots, refill the special bar
//! - `Bounce`: like `Normal` but shots bounce, until the power-up runs out
//! - `Damaged`: like `Normal`, immune to further damage for a moment
//! - `Laser`: slowed down, no shots, the beam drains the special bar

use glam::DVec2;

use crate::physics::{Baton, ColliderType, ObjectId};

use super::events::GameEvent;
use super::templates::EntityKind;
use super::transform::Transform;
use super::world::{Frame, SpawnRequest, TickInput};
use super::ticks;

pub const MAX_HEALTH: i32 = 100;
pub const MAX_SPECIAL: i32 = 100;

const ACCELERATION: f64 = 6000.0;
const LASER_SPEED: f64 = 350.0;
const PROJECTILE_SPAWN_DISTANCE: f64 = 50.0;
const SHOT_DELAY: f64 = 0.15;
const DAMAGED_TIME: f64 = 0.15;
const BOUNCE_TIME: f64 = 10.0;
const SPECIAL_REFILL_AMOUNT: i32 = 5;
const SPECIAL_REFILL_TIME: f64 = 1.75;
const SPECIAL_DEPLETE_AMOUNT: i32 = 5;
const SPECIAL_DEPLETE_TIME: f64 = 0.125;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Normal,
    Bounce,
    Damaged,
    Laser,
}

/// Snapshot of the player that other entities steer by
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlayerInfo {
    pub origin: DVec2,
    /// Direction of travel
    pub forward: DVec2,
    /// Unit vector toward the cursor
    pub aim: DVec2,
    pub velocity: DVec2,
    pub laser_active: bool,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub transform: Transform,
    state: PlayerState,
    health: i32,
    special: i32,
    aim: DVec2,
    normal_speed: f64,

    // === Timers (ticks) ===
    shot_cooldown: u32,
    damaged: u32,
    bounce: u32,
    refill: u32,
    deplete: u32,
}

impl Player {
    pub fn new(transform: Transform) -> Self {
        let normal_speed = transform.body.speed();
        Self {
            aim: transform.forward(),
            transform,
            state: PlayerState::Normal,
            health: MAX_HEALTH,
            special: MAX_SPECIAL,
            normal_speed,
            shot_cooldown: 0,
            damaged: 0,
            bounce: 0,
            refill: ticks(SPECIAL_REFILL_TIME),
            deplete: 0,
        }
    }

    #[inline]
    pub fn state(&self) -> PlayerState {
        self.state
    }

    #[inline]
    pub fn health(&self) -> i32 {
        self.health
    }

    #[inline]
    pub fn special(&self) -> i32 {
        self.special
    }

    #[inline]
    pub fn is_powered(&self) -> bool {
        self.bounce > 0
    }

    pub fn info(&self) -> PlayerInfo {
        PlayerInfo {
            origin: self.transform.origin(),
            forward: self.transform.forward(),
            aim: self.aim,
            velocity: self.transform.body.velocity(),
            laser_active: self.state == PlayerState::Laser,
        }
    }

    /// One tick of player logic. Returns false when health ran out.
    pub fn update(&mut self, input: &TickInput, frame: &mut Frame<'_>) -> bool {
        if !self.react_to_collisions(frame) {
            return false;
        }
        self.steer(input, frame);
        self.shoot(input, frame);
        self.update_special(input, frame);
        self.update_power_up(frame);
        true
    }

    fn react_to_collisions(&mut self, frame: &mut Frame<'_>) -> bool {
        let info = self.transform.resolve_collisions(frame.collisions);

        let healed: i32 = info
            .batons
            .iter()
            .filter(|b| b.is(ColliderType::Pickup, ObjectId::PickUpHealth))
            .map(Baton::value)
            .sum();
        if healed > 0 {
            self.health = (self.health + healed).min(MAX_HEALTH);
            frame.events.publish(GameEvent::PlayerHealed {
                health: self.health,
            });
        }

        if info.touched(ColliderType::Pickup, ObjectId::PickUpBounce) {
            self.bounce = ticks(BOUNCE_TIME);
            if self.state == PlayerState::Normal {
                self.state = PlayerState::Bounce;
            }
            frame.events.publish(GameEvent::PoweredUp);
        }

        if self.state == PlayerState::Damaged {
            return true;
        }
        let damage = info.damage_from(|b| {
            matches!(
                b.collider_type(),
                ColliderType::Enemy | ColliderType::EnemyAttack
            )
        });
        if damage == 0 {
            return true;
        }

        self.health = (self.health - damage).max(0);
        log::debug!("Player took {} damage, {} left", damage, self.health);
        if self.state == PlayerState::Laser {
            frame.events.publish(GameEvent::SpecialAttack { active: false });
        }
        self.state = PlayerState::Damaged;
        self.damaged = ticks(DAMAGED_TIME);
        frame.events.publish(GameEvent::PlayerDamaged {
            health: self.health,
        });
        self.health > 0
    }

    fn steer(&mut self, input: &TickInput, frame: &mut Frame<'_>) {
        if let Some(aim) = (input.cursor - self.transform.origin()).try_normalize() {
            self.aim = aim;
        }
        self.transform.set_forward(input.movement);

        let body = &mut self.transform.body;
        body.set_speed(if self.state == PlayerState::Laser {
            LASER_SPEED
        } else {
            self.normal_speed
        });
        body.set_acceleration(input.movement.normalize_or_zero() * ACCELERATION);
        self.transform.step(frame.collisions);
    }

    fn shoot(&mut self, input: &TickInput, frame: &mut Frame<'_>) {
        self.shot_cooldown = self.shot_cooldown.saturating_sub(1);
        if !input.shoot || self.shot_cooldown > 0 || self.state == PlayerState::Laser {
            return;
        }
        let kind = if self.is_powered() {
            EntityKind::BounceShot
        } else {
            EntityKind::BasicShot
        };
        let position = self.transform.origin() + self.aim * PROJECTILE_SPAWN_DISTANCE;
        frame
            .spawns
            .push(SpawnRequest::projectile(kind, position, self.aim));
        self.shot_cooldown = ticks(SHOT_DELAY);
    }

    fn update_special(&mut self, input: &TickInput, frame: &mut Frame<'_>) {
        match self.state {
            PlayerState::Laser => {
                self.deplete = self.deplete.saturating_sub(1);
                if self.deplete == 0 {
                    self.special = (self.special - SPECIAL_DEPLETE_AMOUNT).max(0);
                    self.deplete = ticks(SPECIAL_DEPLETE_TIME);
                }
                if !input.beam || self.special <= 0 {
                    self.state = self.resting_state();
                    frame.events.publish(GameEvent::SpecialAttack { active: false });
                }
            }
            PlayerState::Damaged => {
                self.refill_special();
                self.damaged = self.damaged.saturating_sub(1);
                if self.damaged == 0 {
                    self.state = self.resting_state();
                    frame.events.publish(GameEvent::PlayerRecovered);
                }
            }
            PlayerState::Normal | PlayerState::Bounce => {
                self.refill_special();
                if input.beam && self.special > 0 {
                    self.state = PlayerState::Laser;
                    self.deplete = ticks(SPECIAL_DEPLETE_TIME);
                    frame.events.publish(GameEvent::SpecialAttack { active: true });
                }
            }
        }
    }

    fn refill_special(&mut self) {
        if self.special >= MAX_SPECIAL {
            self.refill = ticks(SPECIAL_REFILL_TIME);
            return;
        }
        self.refill = self.refill.saturating_sub(1);
        if self.refill == 0 {
            self.special = (self.special + SPECIAL_REFILL_AMOUNT).min(MAX_SPECIAL);
            self.refill = ticks(SPECIAL_REFILL_TIME);
        }
    }

    fn update_power_up(&mut self, frame: &mut Frame<'_>) {
        if self.bounce == 0 {
            return;
        }
        self.bounce -= 1;
        if self.bounce == 0 {
            frame.events.publish(GameEvent::PoweredDown);
            if self.state == PlayerState::Bounce {
                self.state = PlayerState::Normal;
            }
        }
    }

    fn resting_state(&self) -> PlayerState {
        if self.is_powered() {
            PlayerState::Bounce
        } else {
            PlayerState::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{
        BodyId, Collider, ColliderHandle, CollisionManager, NoBodies, RigidBody, prototypes,
    };
    use crate::sim::world::{FrameLog, test_frame_logged};

    fn player(collisions: &mut CollisionManager) -> Player {
        let handle = collisions.add_collider(prototypes::player());
        Player::new(Transform::new(DVec2::ZERO, RigidBody::new(), BodyId(0), handle))
    }

    fn place(collisions: &mut CollisionManager, mut collider: Collider, at: DVec2) -> ColliderHandle {
        collider.translate(at);
        collisions.add_collider(collider)
    }

    fn update(player: &mut Player, collisions: &mut CollisionManager, input: &TickInput) -> (bool, FrameLog) {
        test_frame_logged(collisions, |frame| player.update(input, frame))
    }

    #[test]
    fn test_damage_then_heal() {
        let mut collisions = CollisionManager::new();
        let mut player = player(&mut collisions);
        let shot = place(&mut collisions, prototypes::enemy_attack_basic(), DVec2::new(10.0, 0.0));
        collisions.simulate_current_collisions(&mut NoBodies);

        let (alive, log) = update(&mut player, &mut collisions, &TickInput::default());
        assert!(alive);
        assert_eq!(player.health(), 95);
        assert_eq!(player.state(), PlayerState::Damaged);
        assert!(log.events.contains(&GameEvent::PlayerDamaged { health: 95 }));

        collisions.remove_collider(shot);
        let _item = place(&mut collisions, prototypes::item_health(), DVec2::new(20.0, 0.0));
        collisions.simulate_current_collisions(&mut NoBodies);

        let (_, log) = update(&mut player, &mut collisions, &TickInput::default());
        assert_eq!(player.health(), MAX_HEALTH);
        assert!(log.events.contains(&GameEvent::PlayerHealed { health: MAX_HEALTH }));
    }

    #[test]
    fn test_damaged_window_blocks_damage() {
        let mut collisions = CollisionManager::new();
        let mut player = player(&mut collisions);
        let _enemy = place(
            &mut collisions,
            prototypes::enemy_rhombus().with_active(true),
            DVec2::new(0.0, 20.0),
        );

        collisions.simulate_current_collisions(&mut NoBodies);
        update(&mut player, &mut collisions, &TickInput::default());
        assert_eq!(player.health(), 85);

        let mut recovered = false;
        for _ in 1..ticks(DAMAGED_TIME) {
            player.transform.set_origin(DVec2::ZERO, &mut collisions);
            collisions.simulate_current_collisions(&mut NoBodies);
            let (_, log) = update(&mut player, &mut collisions, &TickInput::default());
            recovered |= log.events.contains(&GameEvent::PlayerRecovered);
        }
        // One hit only; immunity ended on the last tick
        assert_eq!(player.health(), 85);
        assert!(recovered);
        assert_eq!(player.state(), PlayerState::Normal);
    }

    #[test]
    fn test_lethal_damage() {
        let mut collisions = CollisionManager::new();
        let mut player = player(&mut collisions);
        for _ in 0..7 {
            let _ = place(
                &mut collisions,
                prototypes::enemy_rhombus().with_active(true),
                DVec2::new(0.0, 10.0),
            );
        }
        collisions.simulate_current_collisions(&mut NoBodies);

        let (alive, _) = update(&mut player, &mut collisions, &TickInput::default());
        assert!(!alive);
        assert_eq!(player.health(), 0);
    }

    #[test]
    fn test_shot_cooldown() {
        let mut collisions = CollisionManager::new();
        let mut player = player(&mut collisions);
        let input = TickInput {
            cursor: DVec2::new(0.0, -500.0),
            shoot: true,
            ..TickInput::default()
        };

        let mut shots = Vec::new();
        for _ in 0..20 {
            let (_, log) = update(&mut player, &mut collisions, &input);
            shots.extend(log.spawns);
        }
        assert_eq!(shots.len(), 3);
        assert!(shots.iter().all(|s| s.kind == EntityKind::BasicShot));
        assert_eq!(shots[0].position, DVec2::new(0.0, -50.0));
        assert_eq!(shots[0].direction, DVec2::new(0.0, -1.0));
    }

    #[test]
    fn test_bounce_power_up() {
        let mut collisions = CollisionManager::new();
        let mut player = player(&mut collisions);
        let _item = place(&mut collisions, prototypes::item_bounce(), DVec2::new(30.0, 0.0));
        collisions.simulate_current_collisions(&mut NoBodies);

        let input = TickInput {
            cursor: DVec2::new(500.0, 0.0),
            shoot: true,
            ..TickInput::default()
        };
        let (_, log) = update(&mut player, &mut collisions, &input);
        assert_eq!(player.state(), PlayerState::Bounce);
        assert!(log.events.contains(&GameEvent::PoweredUp));
        assert_eq!(log.spawns[0].kind, EntityKind::BounceShot);

        collisions.remove_all_colliders();
        let mut powered_down = false;
        for _ in 1..ticks(BOUNCE_TIME) {
            let (_, log) = update(&mut player, &mut collisions, &TickInput::default());
            powered_down |= log.events.contains(&GameEvent::PoweredDown);
        }
        assert!(powered_down);
        assert_eq!(player.state(), PlayerState::Normal);
    }

    #[test]
    fn test_laser_drains_special() {
        let mut collisions = CollisionManager::new();
        let mut player = player(&mut collisions);
        let beam = TickInput {
            beam: true,
            ..TickInput::default()
        };

        let (_, log) = update(&mut player, &mut collisions, &beam);
        assert_eq!(player.state(), PlayerState::Laser);
        assert!(player.info().laser_active);
        assert!(log.events.contains(&GameEvent::SpecialAttack { active: true }));

        for _ in 0..ticks(SPECIAL_DEPLETE_TIME) * 4 {
            update(&mut player, &mut collisions, &beam);
        }
        assert_eq!(player.special(), MAX_SPECIAL - 4 * SPECIAL_DEPLETE_AMOUNT);

        let (_, log) = update(&mut player, &mut collisions, &TickInput::default());
        assert_eq!(player.state(), PlayerState::Normal);
        assert!(log.events.contains(&GameEvent::SpecialAttack { active: false }));

        // Refills while the beam is off
        for _ in 0..ticks(SPECIAL_REFILL_TIME) {
            update(&mut player, &mut collisions, &TickInput::default());
        }
        assert_eq!(player.special(), MAX_SPECIAL - 3 * SPECIAL_DEPLETE_AMOUNT);
    }

    #[test]
    fn test_laser_slows_the_ship() {
        let mut collisions = CollisionManager::new();
        let mut player = player(&mut collisions);
        let input = TickInput {
            movement: DVec2::new(1.0, 0.0),
            beam: true,
            ..TickInput::default()
        };
        for _ in 0..60 {
            update(&mut player, &mut collisions, &input);
        }
        assert!(player.info().velocity.length() <= LASER_SPEED + 1e-9);
        assert_eq!(player.transform.forward(), DVec2::new(1.0, 0.0));
    }
}
