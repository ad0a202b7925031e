//! Collider data tables for every kind of object in the arena
//!
//! Each factory returns a fresh, fully configured collider placed at the world
//! origin. Callers translate it and attach a body before registering it.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::collider::{Baton, Collider, ColliderType, ObjectId};
use super::shape::{Shape, ShapeError, ShapeKind};

/// Damage an enemy deals to the player on body contact
pub const ENEMY_CONTACT_DAMAGE: i32 = 15;
/// Health restored by a health pickup
pub const HEALTH_PICKUP_AMOUNT: i32 = 20;
pub const PLAYER_BASIC_DAMAGE: i32 = 15;
pub const PLAYER_LASER_DAMAGE: i32 = 15;
pub const ENEMY_BASIC_DAMAGE: i32 = 5;
pub const ENEMY_HEX_BEAM_DAMAGE: i32 = 10;

const HEALTH_RADIUS: f64 = 32.0;
const HEALTH_OUTLINE: [DVec2; 8] = [
    DVec2::new(-32.0, 0.0),
    DVec2::new(-22.6, -22.6),
    DVec2::new(0.0, -32.0),
    DVec2::new(22.6, -22.6),
    DVec2::new(32.0, 0.0),
    DVec2::new(22.6, 22.6),
    DVec2::new(0.0, 32.0),
    DVec2::new(-22.6, 22.6),
];

const BOUNCE_DIAMOND: [DVec2; 4] = [
    DVec2::new(-48.0, 0.0),
    DVec2::new(0.0, -48.0),
    DVec2::new(48.0, 0.0),
    DVec2::new(0.0, 48.0),
];

const PLAYER_TRIANGLE: [DVec2; 3] = [
    DVec2::new(-32.0, 32.0),
    DVec2::new(0.0, -32.0),
    DVec2::new(32.0, 32.0),
];

/// Beam extends from the ship's nose straight up (local -y)
const LASER_BEAM: [DVec2; 4] = [
    DVec2::new(-26.5, 0.0),
    DVec2::new(-26.5, -1300.0),
    DVec2::new(26.5, -1300.0),
    DVec2::new(26.5, 0.0),
];

const PLAYER_BASIC_RADIUS: f64 = 12.0;
const PLAYER_BASIC_OUTLINE: [DVec2; 8] = [
    DVec2::new(-16.0, 0.0),
    DVec2::new(-11.3, -11.3),
    DVec2::new(0.0, -16.0),
    DVec2::new(11.3, -11.3),
    DVec2::new(16.0, 0.0),
    DVec2::new(11.3, 11.3),
    DVec2::new(0.0, 16.0),
    DVec2::new(-11.3, 11.3),
];

const ENEMY_BASIC_DIAMOND: [DVec2; 4] = [
    DVec2::new(-8.3, 0.0),
    DVec2::new(0.0, -24.0),
    DVec2::new(8.3, 0.0),
    DVec2::new(0.0, 24.0),
];

const HEX_BEAM_BAR: [DVec2; 4] = [
    DVec2::new(-100.0, -14.0),
    DVec2::new(100.0, -14.0),
    DVec2::new(100.0, 7.0),
    DVec2::new(-100.0, 7.0),
];

const RHOMBUS: [DVec2; 4] = [
    DVec2::new(-32.0, 0.0),
    DVec2::new(0.0, -48.0),
    DVec2::new(32.0, 0.0),
    DVec2::new(0.0, 48.0),
];

const SQUARE: [DVec2; 4] = [
    DVec2::new(-64.0, -64.0),
    DVec2::new(64.0, -64.0),
    DVec2::new(64.0, 64.0),
    DVec2::new(-64.0, 64.0),
];

const HEXAGON: [DVec2; 6] = [
    DVec2::new(-96.0, 0.0),
    DVec2::new(-48.0, -83.5),
    DVec2::new(48.0, -83.5),
    DVec2::new(96.0, 0.0),
    DVec2::new(48.0, 83.5),
    DVec2::new(-48.0, 83.5),
];

/// Every configured collider kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PrototypeKind {
    ItemHealth,
    ItemBounce,
    Player,
    PlayerAttackLaser,
    PlayerAttackBasic,
    EnemyAttackBasic,
    EnemyAttackHex,
    EnemyRhombus,
    EnemySquare,
    EnemyHexagon,
}

impl PrototypeKind {
    pub const ALL: [PrototypeKind; 10] = [
        PrototypeKind::ItemHealth,
        PrototypeKind::ItemBounce,
        PrototypeKind::Player,
        PrototypeKind::PlayerAttackLaser,
        PrototypeKind::PlayerAttackBasic,
        PrototypeKind::EnemyAttackBasic,
        PrototypeKind::EnemyAttackHex,
        PrototypeKind::EnemyRhombus,
        PrototypeKind::EnemySquare,
        PrototypeKind::EnemyHexagon,
    ];
}

/// Look up a prototype by kind
pub fn for_kind(kind: PrototypeKind) -> Collider {
    match kind {
        PrototypeKind::ItemHealth => item_health(),
        PrototypeKind::ItemBounce => item_bounce(),
        PrototypeKind::Player => player(),
        PrototypeKind::PlayerAttackLaser => player_attack_laser(),
        PrototypeKind::PlayerAttackBasic => player_attack_basic(),
        PrototypeKind::EnemyAttackBasic => enemy_attack_basic(),
        PrototypeKind::EnemyAttackHex => enemy_attack_hex(),
        PrototypeKind::EnemyRhombus => enemy_rhombus(),
        PrototypeKind::EnemySquare => enemy_square(),
        PrototypeKind::EnemyHexagon => enemy_hexagon(),
    }
}

fn polygon(vertices: &[DVec2]) -> Shape {
    Shape::from_table(ShapeKind::Polygon, vertices)
}

fn circle(radius: f64, outline: &[DVec2]) -> Shape {
    Shape::from_table(ShapeKind::Circle { radius }, outline)
}

// Items

/// Base pickup: a trigger that only the player can touch
pub fn item(shape: Shape, baton: Baton) -> Collider {
    Collider::new(shape, baton)
        .with_trigger(true)
        .with_minimum_collision_distance(150.0)
        .with_ignore_types([
            ColliderType::Pickup,
            ColliderType::PlayerAttack,
            ColliderType::Enemy,
            ColliderType::Environment,
            ColliderType::EnemyAttack,
        ])
}

pub fn item_health() -> Collider {
    item(
        circle(HEALTH_RADIUS, &HEALTH_OUTLINE),
        Baton::Pickup {
            id: ObjectId::PickUpHealth,
            amount: HEALTH_PICKUP_AMOUNT,
        },
    )
}

pub fn item_bounce() -> Collider {
    item(
        polygon(&BOUNCE_DIAMOND),
        Baton::Pickup {
            id: ObjectId::PickUpBounce,
            amount: 0,
        },
    )
}

// Player

pub fn player() -> Collider {
    Collider::new(polygon(&PLAYER_TRIANGLE), Baton::Player)
        .with_ignore_types([ColliderType::Player, ColliderType::PlayerAttack])
        .with_minimum_collision_distance(100.0)
}

/// Base player attack: never hits the player or other player attacks
pub fn player_attack(shape: Shape, baton: Baton) -> Collider {
    Collider::new(shape, baton)
        .with_ignore_types([ColliderType::PlayerAttack, ColliderType::Player])
}

/// Special attack beam; starts disabled until the player fires it
pub fn player_attack_laser() -> Collider {
    player_attack(
        polygon(&LASER_BEAM),
        Baton::PlayerAttack {
            id: ObjectId::PlayerSpecialAttack,
            damage: PLAYER_LASER_DAMAGE,
        },
    )
    .with_trigger(true)
    .with_active(false)
    .with_ignore_types([
        ColliderType::PlayerAttack,
        ColliderType::Player,
        ColliderType::Environment,
        ColliderType::Pickup,
    ])
    .with_minimum_collision_distance(2000.0)
}

pub fn player_attack_basic() -> Collider {
    player_attack(
        circle(PLAYER_BASIC_RADIUS, &PLAYER_BASIC_OUTLINE),
        Baton::PlayerAttack {
            id: ObjectId::PlayerProjectileBasic,
            damage: PLAYER_BASIC_DAMAGE,
        },
    )
    .with_minimum_collision_distance(50.0)
}

// Enemy attacks

/// Base enemy attack: never hits enemies or other enemy attacks
pub fn enemy_attack(shape: Shape, baton: Baton) -> Collider {
    Collider::new(shape, baton).with_ignore_types([ColliderType::EnemyAttack, ColliderType::Enemy])
}

pub fn enemy_attack_basic() -> Collider {
    enemy_attack(
        polygon(&ENEMY_BASIC_DIAMOND),
        Baton::EnemyAttack {
            id: ObjectId::EnemyProjectileBasic,
            damage: ENEMY_BASIC_DAMAGE,
        },
    )
    .with_minimum_collision_distance(70.0)
}

pub fn enemy_attack_hex() -> Collider {
    enemy_attack(
        polygon(&HEX_BEAM_BAR),
        Baton::EnemyAttack {
            id: ObjectId::EnemyProjectileHexBeam,
            damage: ENEMY_HEX_BEAM_DAMAGE,
        },
    )
    .with_minimum_collision_distance(1400.0)
}

// Enemies

/// Base enemy: solid, disabled until its spawn animation ends
pub fn enemy(shape: Shape, id: ObjectId) -> Collider {
    Collider::new(
        shape,
        Baton::Enemy {
            id,
            contact_damage: ENEMY_CONTACT_DAMAGE,
        },
    )
    .with_active(false)
    .with_trigger(false)
    .with_ignore_types([ColliderType::EnemyAttack])
}

pub fn enemy_rhombus() -> Collider {
    enemy(polygon(&RHOMBUS), ObjectId::EnemyRhombus).with_minimum_collision_distance(150.0)
}

pub fn enemy_square() -> Collider {
    enemy(polygon(&SQUARE), ObjectId::EnemySquare).with_minimum_collision_distance(250.0)
}

pub fn enemy_hexagon() -> Collider {
    enemy(polygon(&HEXAGON), ObjectId::EnemyHexagon)
        .with_static(true)
        .with_minimum_collision_distance(350.0)
}

// Environment

/// Static level geometry; never pruned by distance
pub fn environment(shape: Shape) -> Collider {
    Collider::new(shape, Baton::Environment).with_static(true)
}

/// Static wall from world-space vertices, with its origin at the vertex average
pub fn environment_wall(vertices: impl Into<Vec<DVec2>>) -> Result<Collider, ShapeError> {
    let vertices: Vec<DVec2> = vertices.into();
    let center = vertices.iter().copied().sum::<DVec2>() / vertices.len().max(1) as f64;
    let mut shape = Shape::polygon(vertices.iter().map(|v| *v - center).collect::<Vec<_>>())?;
    shape.translate(center);
    Ok(environment(shape))
}
