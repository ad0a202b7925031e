//! Fixed-step world: owns every entity and drives one frame at a time
//!
//! Frame order:
//! 1. Deregister entities destroyed last frame
//! 2. Run the collision pass
//! 3. Player, then laser, then every other entity in id order; each consumes
//!    and clears its own collision response
//! 4. Queue destructions and item drops, then instantiate queued spawns

use std::collections::BTreeMap;

use glam::DVec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH};
use crate::physics::{
    BodyId, ColliderHandle, CollisionManager, RigidBody, RigidBodySet, ShapeError, prototypes,
};
use crate::tuning::Tuning;

use super::enemy::{Enemy, EnemyState};
use super::events::{EventBus, GameEvent};
use super::item::Item;
use super::player::{Player, PlayerInfo};
use super::projectile::{LaserBeam, Projectile, ProjectileKind};
use super::templates::{EntityKind, ItemSpawner, SpawnError, TemplateRegistry};
use super::transform::Transform;

/// Body id reserved for the player
pub const PLAYER_BODY: BodyId = BodyId(0);
/// Body id shared by every wall
pub const ENVIRONMENT_BODY: BodyId = BodyId(1);
/// Thickness of the walls placed by [`World::enclose_arena`]
const WALL_THICKNESS: f64 = 50.0;

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickInput {
    /// Desired movement direction; need not be normalized
    pub movement: DVec2,
    /// Cursor position in world space
    pub cursor: DVec2,
    pub shoot: bool,
    /// Special attack held
    pub beam: bool,
}

/// Something to instantiate once the current frame's updates are done
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRequest {
    pub kind: EntityKind,
    pub position: DVec2,
    /// Unit launch direction for projectiles, zero otherwise
    pub direction: DVec2,
}

impl SpawnRequest {
    pub fn at(kind: EntityKind, position: DVec2) -> Self {
        Self {
            kind,
            position,
            direction: DVec2::ZERO,
        }
    }

    pub fn projectile(kind: EntityKind, position: DVec2, direction: DVec2) -> Self {
        Self {
            kind,
            position,
            direction: direction.normalize_or_zero(),
        }
    }
}

/// Everything an entity may touch while it updates
pub struct Frame<'a> {
    pub collisions: &'a mut CollisionManager,
    pub events: &'a mut EventBus,
    pub rng: &'a mut Pcg32,
    pub spawns: &'a mut Vec<SpawnRequest>,
    pub player: PlayerInfo,
}

/// Any entity other than the player
#[derive(Debug, Clone)]
pub enum Entity {
    Enemy(Enemy),
    Projectile(Projectile),
    Item(Item),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Enemy(e) => e.kind(),
            Entity::Projectile(p) => p.entity_kind(),
            Entity::Item(i) => i.kind(),
        }
    }

    pub fn transform(&self) -> &Transform {
        match self {
            Entity::Enemy(e) => &e.transform,
            Entity::Projectile(p) => &p.transform,
            Entity::Item(i) => &i.transform,
        }
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        match self {
            Entity::Enemy(e) => &mut e.transform,
            Entity::Projectile(p) => &mut p.transform,
            Entity::Item(i) => &mut i.transform,
        }
    }

    fn update(&mut self, frame: &mut Frame<'_>) -> bool {
        match self {
            Entity::Enemy(e) => e.update(frame),
            Entity::Projectile(p) => p.update(frame),
            Entity::Item(i) => i.update(frame),
        }
    }
}

/// Bodies as the collision pass sees them
struct SceneBodies<'a> {
    player: &'a mut RigidBody,
    environment: &'a mut RigidBody,
    entities: &'a mut BTreeMap<BodyId, Entity>,
}

impl RigidBodySet for SceneBodies<'_> {
    fn body(&self, id: BodyId) -> Option<&RigidBody> {
        match id {
            PLAYER_BODY => return Some(&*self.player),
            ENVIRONMENT_BODY => return Some(&*self.environment),
            _ => {}
        }
        self.entities.get(&id).map(|e| &e.transform().body)
    }

    fn body_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        match id {
            PLAYER_BODY => return Some(&mut *self.player),
            ENVIRONMENT_BODY => return Some(&mut *self.environment),
            _ => {}
        }
        self.entities.get_mut(&id).map(|e| &mut e.transform_mut().body)
    }
}

#[derive(Debug)]
pub struct World {
    collisions: CollisionManager,
    events: EventBus,
    templates: TemplateRegistry,
    drops: ItemSpawner,
    rng: Pcg32,
    player: Player,
    laser: LaserBeam,
    /// Immovable, inelastic body behind the walls
    environment: RigidBody,
    entities: BTreeMap<BodyId, Entity>,
    walls: Vec<ColliderHandle>,
    spawn_queue: Vec<SpawnRequest>,
    /// Destroyed this frame, deregistered at the start of the next
    doomed: Vec<BodyId>,
    next_body: u32,
    tick_count: u64,
    game_over: bool,
}

impl World {
    pub fn new(tuning: &Tuning) -> Self {
        Self::with_templates(tuning, TemplateRegistry::standard(tuning))
    }

    pub fn with_templates(tuning: &Tuning, templates: TemplateRegistry) -> Self {
        let mut collisions = CollisionManager::with_clearing(tuning.clearing);

        let origin = DVec2::new(ARENA_WIDTH / 2.0, ARENA_HEIGHT / 2.0);
        let mut collider = prototypes::player();
        collider.translate(origin);
        collider.set_associated_body(Some(PLAYER_BODY));
        let handle = collisions.add_collider(collider);
        let player = Player::new(Transform::new(
            origin,
            RigidBody::from(&tuning.player),
            PLAYER_BODY,
            handle,
        ));
        let laser = LaserBeam::new(collisions.add_collider(prototypes::player_attack_laser()));

        log::info!(
            "World created (seed {:#x}, {:?} response clearing)",
            tuning.seed,
            tuning.clearing
        );

        Self {
            collisions,
            events: EventBus::new(),
            templates,
            drops: ItemSpawner::new(tuning.drops, tuning.seed.wrapping_add(1)),
            rng: Pcg32::seed_from_u64(tuning.seed),
            player,
            laser,
            environment: RigidBody::from(&tuning.environment),
            entities: BTreeMap::new(),
            walls: Vec::new(),
            spawn_queue: Vec::new(),
            doomed: Vec::new(),
            next_body: ENVIRONMENT_BODY.0 + 1,
            tick_count: 0,
            game_over: false,
        }
    }

    // === Accessors ===

    #[inline]
    pub fn player(&self) -> &Player {
        &self.player
    }

    #[inline]
    pub fn laser(&self) -> &LaserBeam {
        &self.laser
    }

    #[inline]
    pub fn collisions(&self) -> &CollisionManager {
        &self.collisions
    }

    #[inline]
    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    pub fn entity(&self, id: BodyId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Live entities in id order
    pub fn entities(&self) -> impl Iterator<Item = (BodyId, &Entity)> + '_ {
        self.entities.iter().map(|(id, e)| (*id, e))
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.entities.values().filter(|e| e.kind() == kind).count()
    }

    #[inline]
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    // === Scene setup ===

    /// Add static level geometry from world-space vertices
    pub fn add_wall(&mut self, vertices: impl Into<Vec<DVec2>>) -> Result<ColliderHandle, ShapeError> {
        let mut wall = prototypes::environment_wall(vertices)?;
        wall.set_associated_body(Some(ENVIRONMENT_BODY));
        let handle = self.collisions.add_collider(wall);
        self.walls.push(handle);
        Ok(handle)
    }

    /// Surround the arena with four walls
    pub fn enclose_arena(&mut self) -> Result<(), ShapeError> {
        let (w, h, t) = (ARENA_WIDTH, ARENA_HEIGHT, WALL_THICKNESS);
        for (min, max) in [
            (DVec2::new(-t, -t), DVec2::new(w + t, 0.0)),
            (DVec2::new(-t, h), DVec2::new(w + t, h + t)),
            (DVec2::new(-t, 0.0), DVec2::new(0.0, h)),
            (DVec2::new(w, 0.0), DVec2::new(w + t, h)),
        ] {
            self.add_wall([
                min,
                DVec2::new(max.x, min.y),
                max,
                DVec2::new(min.x, max.y),
            ])?;
        }
        Ok(())
    }

    /// Instantiate an entity right away
    pub fn spawn(&mut self, kind: EntityKind, position: DVec2) -> Result<BodyId, SpawnError> {
        self.instantiate(SpawnRequest::at(kind, position))
    }

    /// Instantiate an entity at the end of the next frame
    pub fn queue_spawn(&mut self, request: SpawnRequest) {
        self.spawn_queue.push(request);
    }

    // === Frame ===

    /// Advance the world by one fixed step
    pub fn tick(&mut self, input: &TickInput) {
        if self.game_over {
            return;
        }

        self.destroy_doomed();

        let mut bodies = SceneBodies {
            player: &mut self.player.transform.body,
            environment: &mut self.environment,
            entities: &mut self.entities,
        };
        self.collisions.simulate_current_collisions(&mut bodies);

        let mut frame = Frame {
            collisions: &mut self.collisions,
            events: &mut self.events,
            rng: &mut self.rng,
            spawns: &mut self.spawn_queue,
            player: self.player.info(),
        };

        let alive = self.player.update(input, &mut frame);
        if !alive {
            self.end_game();
            return;
        }
        frame.player = self.player.info();
        self.laser.update(&frame.player, frame.collisions, frame.events);

        let mut finished = Vec::new();
        for (id, entity) in self.entities.iter_mut() {
            if !entity.update(&mut frame) {
                finished.push(*id);
            }
        }

        for id in finished {
            self.retire(id);
        }
        for &wall in &self.walls {
            if let Some(collider) = self.collisions.collider_mut(wall) {
                collider.clear_collision_response_info();
            }
        }
        for request in std::mem::take(&mut self.spawn_queue) {
            if let Err(e) = self.instantiate(request) {
                log::warn!("Dropped spawn request: {}", e);
            }
        }

        self.tick_count += 1;
    }

    fn instantiate(&mut self, request: SpawnRequest) -> Result<BodyId, SpawnError> {
        let spawned = self.templates.spawn(request.kind, request.position)?;
        let id = BodyId(self.next_body);

        let mut collider = spawned.collider;
        collider.set_associated_body(Some(id));
        let handle = self.collisions.add_collider(collider);
        let transform = Transform::new(request.position, spawned.body, id, handle);

        let entity = match request.kind {
            EntityKind::HealthItem | EntityKind::BounceItem => {
                Entity::Item(Item::new(request.kind, transform))
            }
            kind => match ProjectileKind::from_entity(kind) {
                Some(projectile_kind) => {
                    let mut projectile = Projectile::new(kind, projectile_kind, transform);
                    projectile.fire(request.direction, &mut self.collisions);
                    self.events.publish(GameEvent::Fired { kind });
                    Entity::Projectile(projectile)
                }
                None => match Enemy::new(kind, transform, spawned.health) {
                    Some(enemy) => Entity::Enemy(enemy),
                    None => {
                        self.collisions.remove_collider(handle);
                        return Err(SpawnError::UnknownKind(kind));
                    }
                },
            },
        };

        self.next_body += 1;
        log::trace!("Spawned {} as {:?}", request.kind, id);
        self.entities.insert(id, entity);
        Ok(id)
    }

    /// Mark an entity for removal; dead enemies may leave an item behind
    fn retire(&mut self, id: BodyId) {
        let Some(entity) = self.entities.get(&id) else {
            return;
        };
        if let Entity::Enemy(enemy) = entity {
            if enemy.state() == EnemyState::Destroyed {
                if let Some(kind) = self.drops.roll() {
                    let position = enemy.transform.origin();
                    self.events.publish(GameEvent::ItemDropped { kind, position });
                    self.spawn_queue.push(SpawnRequest::at(kind, position));
                }
            }
        }
        self.events.publish(GameEvent::Destroyed { entity: id });
        self.doomed.push(id);
    }

    fn destroy_doomed(&mut self) {
        for id in std::mem::take(&mut self.doomed) {
            if let Some(entity) = self.entities.remove(&id) {
                self.collisions.remove_collider(entity.transform().collider());
            }
        }
    }

    fn end_game(&mut self) {
        log::info!(
            "Game over after {} ticks ({} entities cleared)",
            self.tick_count,
            self.entities.len()
        );
        self.events.publish(GameEvent::GameOver);
        self.entities.clear();
        self.doomed.clear();
        self.spawn_queue.clear();
        self.walls.clear();
        self.collisions.remove_all_colliders();
        self.game_over = true;
    }
}

/// Records what a test frame published and queued
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct FrameLog {
    pub events: Vec<GameEvent>,
    pub spawns: Vec<SpawnRequest>,
}

/// Run `f` against a throwaway frame with the player at the origin
#[cfg(test)]
pub(crate) fn test_frame_logged<R>(
    collisions: &mut CollisionManager,
    f: impl FnOnce(&mut Frame<'_>) -> R,
) -> (R, FrameLog) {
    use std::cell::RefCell;
    use std::rc::Rc;

    let published = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&published);
    let mut bus = EventBus::new();
    bus.subscribe(move |event| sink.borrow_mut().push(*event));
    let mut rng = Pcg32::seed_from_u64(7);
    let mut spawns = Vec::new();

    let mut frame = Frame {
        collisions,
        events: &mut bus,
        rng: &mut rng,
        spawns: &mut spawns,
        player: PlayerInfo::default(),
    };
    let result = f(&mut frame);

    let events = published.borrow().clone();
    (result, FrameLog { events, spawns })
}

#[cfg(test)]
pub(crate) fn test_frame<R>(collisions: &mut CollisionManager, f: impl FnOnce(&mut Frame<'_>) -> R) -> R {
    test_frame_logged(collisions, f).0
}

#[cfg(test)]
pub(crate) fn test_frame_with_spawns(
    collisions: &mut CollisionManager,
    f: impl FnOnce(&mut Frame<'_>),
) -> Vec<SpawnRequest> {
    test_frame_logged(collisions, f).1.spawns
}
