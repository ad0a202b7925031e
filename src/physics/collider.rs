//! Colliders: a shape plus filtering rules plus the response channel
//!
//! Each collider accumulates a [`CollisionResponseInfo`] during a collision pass.
//! The record survives until its owner clears it, so the owner decides when a
//! collision has been consumed.

use std::cell::Cell;
use std::fmt;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::rigid_body::BodyId;
use super::shape::Shape;

/// Broad category of a collider, used for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ColliderType {
    Environment,
    Enemy,
    EnemyAttack,
    Player,
    PlayerAttack,
    Pickup,
}

impl ColliderType {
    pub const ALL: [ColliderType; 6] = [
        ColliderType::Environment,
        ColliderType::Enemy,
        ColliderType::EnemyAttack,
        ColliderType::Player,
        ColliderType::PlayerAttack,
        ColliderType::Pickup,
    ];

    #[inline]
    fn bit(self) -> u8 {
        1 << self as u8
    }
}

impl fmt::Display for ColliderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColliderType::Environment => "environment",
            ColliderType::Enemy => "enemy",
            ColliderType::EnemyAttack => "enemy attack",
            ColliderType::Player => "player",
            ColliderType::PlayerAttack => "player attack",
            ColliderType::Pickup => "pickup",
        };
        f.write_str(name)
    }
}

/// Compact set of collider types (one bit per type)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Vec<ColliderType>", into = "Vec<ColliderType>")]
pub struct ColliderTypeSet(u8);

impl ColliderTypeSet {
    pub const EMPTY: ColliderTypeSet = ColliderTypeSet(0);

    pub fn insert(&mut self, kind: ColliderType) {
        self.0 |= kind.bit();
    }

    pub fn remove(&mut self, kind: ColliderType) {
        self.0 &= !kind.bit();
    }

    #[inline]
    pub fn contains(&self, kind: ColliderType) -> bool {
        self.0 & kind.bit() != 0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = ColliderType> + '_ {
        ColliderType::ALL.into_iter().filter(|k| self.contains(*k))
    }
}

impl FromIterator<ColliderType> for ColliderTypeSet {
    fn from_iter<I: IntoIterator<Item = ColliderType>>(iter: I) -> Self {
        let mut set = ColliderTypeSet::EMPTY;
        for kind in iter {
            set.insert(kind);
        }
        set
    }
}

impl<const N: usize> From<[ColliderType; N]> for ColliderTypeSet {
    fn from(kinds: [ColliderType; N]) -> Self {
        kinds.into_iter().collect()
    }
}

impl From<Vec<ColliderType>> for ColliderTypeSet {
    fn from(kinds: Vec<ColliderType>) -> Self {
        kinds.into_iter().collect()
    }
}

impl From<ColliderTypeSet> for Vec<ColliderType> {
    fn from(set: ColliderTypeSet) -> Self {
        set.iter().collect()
    }
}

/// Identity of a game object, for responses unique to one kind of object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObjectId {
    Environment,
    PickUpHealth,
    PickUpBounce,
    PlayerProjectileBasic,
    PlayerSpecialAttack,
    EnemyProjectileBasic,
    EnemyProjectileHexBeam,
    EnemyRhombus,
    EnemySquare,
    EnemyHexagon,
}

/// Gameplay metadata that rides along a collision.
///
/// The variant is the collider type of whoever produced it; each carries only
/// the fields that type uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Baton {
    Environment,
    /// Body contact with an enemy hurts the player
    Enemy { id: ObjectId, contact_damage: i32 },
    EnemyAttack { id: ObjectId, damage: i32 },
    Player,
    PlayerAttack { id: ObjectId, damage: i32 },
    /// `amount` is pickup-specific (health restored for health pickups)
    Pickup { id: ObjectId, amount: i32 },
}

impl Baton {
    /// Collider type this baton belongs to
    pub fn collider_type(&self) -> ColliderType {
        match self {
            Baton::Environment => ColliderType::Environment,
            Baton::Enemy { .. } => ColliderType::Enemy,
            Baton::EnemyAttack { .. } => ColliderType::EnemyAttack,
            Baton::Player => ColliderType::Player,
            Baton::PlayerAttack { .. } => ColliderType::PlayerAttack,
            Baton::Pickup { .. } => ColliderType::Pickup,
        }
    }

    /// Object identity, when the producer has one
    pub fn object_id(&self) -> Option<ObjectId> {
        match self {
            Baton::Environment => Some(ObjectId::Environment),
            Baton::Player => None,
            Baton::Enemy { id, .. }
            | Baton::EnemyAttack { id, .. }
            | Baton::PlayerAttack { id, .. }
            | Baton::Pickup { id, .. } => Some(*id),
        }
    }

    /// Magnitude carried by the baton (damage or pickup amount), zero otherwise
    pub fn value(&self) -> i32 {
        match self {
            Baton::Environment | Baton::Player => 0,
            Baton::Enemy { contact_damage, .. } => *contact_damage,
            Baton::EnemyAttack { damage, .. } | Baton::PlayerAttack { damage, .. } => *damage,
            Baton::Pickup { amount, .. } => *amount,
        }
    }

    /// Damage this baton inflicts on whoever receives it
    pub fn damage(&self) -> i32 {
        match self {
            Baton::Enemy { contact_damage, .. } => *contact_damage,
            Baton::EnemyAttack { damage, .. } | Baton::PlayerAttack { damage, .. } => *damage,
            _ => 0,
        }
    }

    #[inline]
    pub fn is(&self, kind: ColliderType, id: ObjectId) -> bool {
        self.collider_type() == kind && self.object_id() == Some(id)
    }
}

/// Everything a collider learned during collision passes since it was last cleared
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CollisionResponseInfo {
    pub is_colliding: bool,
    /// Unit vector pushing this collider away from whatever it hit
    pub nudge_direction: DVec2,
    /// Deepest penetration among the recorded collisions
    pub penetration_depth: f64,
    /// Velocity change produced by the collisions
    pub impulse_vector: DVec2,
    pub all_collision_points: Vec<DVec2>,
    /// One baton per collision, describing the other side
    pub batons: Vec<Baton>,
    /// Sum of corrections from solid (non-trigger) collisions
    correction: DVec2,
    /// Depth-weighted sum of the origin-based nudges
    heading: DVec2,
}

impl CollisionResponseInfo {
    /// Positional correction that pushes this collider out of everything solid it hit.
    ///
    /// Trigger overlaps never contribute.
    pub fn nudge_vector(&self) -> DVec2 {
        self.correction
    }

    /// Check for a baton from a given producer
    pub fn touched(&self, kind: ColliderType, id: ObjectId) -> bool {
        self.batons.iter().any(|b| b.is(kind, id))
    }

    /// Check for any baton of a collider type
    pub fn touched_type(&self, kind: ColliderType) -> bool {
        self.batons.iter().any(|b| b.collider_type() == kind)
    }

    /// Total damage carried by the batons accepted by `filter`
    pub fn damage_from(&self, filter: impl Fn(&Baton) -> bool) -> i32 {
        self.batons.iter().filter(|b| filter(b)).map(Baton::damage).sum()
    }

    pub(crate) fn record(&mut self, hit: Hit<'_>) {
        let Hit {
            nudge,
            push,
            depth,
            solid,
            impulse,
            contacts,
            baton,
        } = hit;
        self.is_colliding = true;
        if solid {
            self.correction += push * depth;
        }
        self.heading += nudge * depth;
        self.nudge_direction = self.heading.try_normalize().unwrap_or(nudge);
        self.penetration_depth = self.penetration_depth.max(depth);
        self.impulse_vector += impulse;
        self.all_collision_points.extend_from_slice(contacts);
        self.batons.push(baton);
    }
}

/// One collision as seen from one side
#[derive(Debug, Clone, Copy)]
pub(crate) struct Hit<'a> {
    /// Unit direction from the other origin toward this one
    pub nudge: DVec2,
    /// Unit minimum translation direction out of the other shape
    pub push: DVec2,
    pub depth: f64,
    /// False when either side is a trigger
    pub solid: bool,
    pub impulse: DVec2,
    pub contacts: &'a [DVec2],
    /// Template of the other side
    pub baton: Baton,
}

/// A shape bound to filtering rules and a response record
#[derive(Debug, Clone)]
pub struct Collider {
    collider_type: ColliderType,
    ignore_types: ColliderTypeSet,
    /// Template copied into the other side's record on every collision
    baton: Baton,
    is_trigger: bool,
    is_static: bool,
    is_active: bool,
    /// Broad-phase cutoff on origin distance
    minimum_collision_distance: f64,
    shape: Shape,
    associated_body: Option<BodyId>,
    pending_response: CollisionResponseInfo,
    /// Set on write, cleared by reads and clears
    unread: Cell<bool>,
}

impl Collider {
    /// Create an active, dynamic, non-trigger collider whose type follows the baton.
    ///
    /// Without a configured minimum distance the collider is never pruned.
    pub fn new(shape: Shape, baton: Baton) -> Self {
        Self {
            collider_type: baton.collider_type(),
            ignore_types: ColliderTypeSet::EMPTY,
            baton,
            is_trigger: false,
            is_static: false,
            is_active: true,
            minimum_collision_distance: f64::INFINITY,
            shape,
            associated_body: None,
            pending_response: CollisionResponseInfo::default(),
            unread: Cell::new(false),
        }
    }

    /// Read the accumulated response. Does not clear it.
    pub fn collision_response_info(&self) -> &CollisionResponseInfo {
        self.unread.set(false);
        &self.pending_response
    }

    /// Reset the response record to the non-colliding state
    pub fn clear_collision_response_info(&mut self) {
        self.pending_response = CollisionResponseInfo::default();
        self.unread.set(false);
    }

    /// True when a collision pass wrote a response nobody has read yet
    #[inline]
    pub fn has_unread_response(&self) -> bool {
        self.unread.get()
    }

    /// Whether collisions against `kind` are filtered out on this side
    #[inline]
    pub fn ignores(&self, kind: ColliderType) -> bool {
        self.ignore_types.contains(kind)
    }

    /// Neither side filters the other out
    pub fn interacts_with(&self, other: &Collider) -> bool {
        !self.ignores(other.collider_type) && !other.ignores(self.collider_type)
    }

    pub(crate) fn record_collision(&mut self, hit: Hit<'_>) {
        self.pending_response.record(hit);
        self.unread.set(true);
    }

    #[inline]
    pub fn collider_type(&self) -> ColliderType {
        self.collider_type
    }

    #[inline]
    pub fn ignore_types(&self) -> ColliderTypeSet {
        self.ignore_types
    }

    #[inline]
    pub fn baton(&self) -> Baton {
        self.baton
    }

    #[inline]
    pub fn is_trigger(&self) -> bool {
        self.is_trigger
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    #[inline]
    pub fn minimum_collision_distance(&self) -> f64 {
        self.minimum_collision_distance
    }

    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn shape_mut(&mut self) -> &mut Shape {
        &mut self.shape
    }

    #[inline]
    pub fn associated_body(&self) -> Option<BodyId> {
        self.associated_body
    }

    /// Replace the baton template; the collider type follows it
    pub fn set_baton(&mut self, baton: Baton) {
        self.collider_type = baton.collider_type();
        self.baton = baton;
    }

    pub fn set_collider_ignore_types(&mut self, types: impl Into<ColliderTypeSet>) {
        self.ignore_types = types.into();
    }

    pub fn set_is_trigger(&mut self, trigger: bool) {
        self.is_trigger = trigger;
    }

    pub fn set_is_static(&mut self, is_static: bool) {
        self.is_static = is_static;
    }

    pub fn set_is_active(&mut self, active: bool) {
        self.is_active = active;
    }

    pub fn set_minimum_collision_distance(&mut self, distance: f64) {
        self.minimum_collision_distance = distance.max(0.0);
    }

    pub fn set_associated_body(&mut self, body: Option<BodyId>) {
        self.associated_body = body;
    }

    /// Move the shape's origin
    pub fn translate(&mut self, origin: DVec2) {
        self.shape.translate(origin);
    }

    // Builder-style variants used by the prototype tables

    pub fn with_ignore_types(mut self, types: impl Into<ColliderTypeSet>) -> Self {
        self.set_collider_ignore_types(types);
        self
    }

    pub fn with_trigger(mut self, trigger: bool) -> Self {
        self.is_trigger = trigger;
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.is_active = active;
        self
    }

    pub fn with_minimum_collision_distance(mut self, distance: f64) -> Self {
        self.set_minimum_collision_distance(distance);
        self
    }

    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_baton(mut self, baton: Baton) -> Self {
        self.set_baton(baton);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_circle(baton: Baton) -> Collider {
        Collider::new(Shape::circle(1.0).unwrap(), baton)
    }

    #[test]
    fn test_type_set_membership() {
        let set = ColliderTypeSet::from([ColliderType::Player, ColliderType::PlayerAttack]);
        assert!(set.contains(ColliderType::Player));
        assert!(set.contains(ColliderType::PlayerAttack));
        assert!(!set.contains(ColliderType::Enemy));
        assert_eq!(set.iter().count(), 2);
        assert!(ColliderTypeSet::EMPTY.is_empty());
    }

    #[test]
    fn test_type_set_serializes_as_list() {
        let set = ColliderTypeSet::from([ColliderType::Enemy, ColliderType::Pickup]);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["Enemy","Pickup"]"#);
        let back: ColliderTypeSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn test_baton_views() {
        let health = Baton::Pickup {
            id: ObjectId::PickUpHealth,
            amount: 20,
        };
        assert_eq!(health.collider_type(), ColliderType::Pickup);
        assert_eq!(health.object_id(), Some(ObjectId::PickUpHealth));
        assert_eq!(health.value(), 20);
        assert_eq!(health.damage(), 0);

        let shot = Baton::EnemyAttack {
            id: ObjectId::EnemyProjectileBasic,
            damage: 5,
        };
        assert_eq!(shot.damage(), 5);
        assert_eq!(Baton::Player.object_id(), None);
    }

    #[test]
    fn test_collider_type_follows_baton() {
        let mut collider = unit_circle(Baton::Player);
        assert_eq!(collider.collider_type(), ColliderType::Player);
        collider.set_baton(Baton::Environment);
        assert_eq!(collider.collider_type(), ColliderType::Environment);
    }

    #[test]
    fn test_mutual_ignore() {
        let player = unit_circle(Baton::Player).with_ignore_types([ColliderType::PlayerAttack]);
        let shot = unit_circle(Baton::PlayerAttack {
            id: ObjectId::PlayerProjectileBasic,
            damage: 15,
        });
        // Only one side needs to ignore the other
        assert!(!player.interacts_with(&shot));
        assert!(!shot.interacts_with(&player));
    }

    #[test]
    fn test_trigger_hits_do_not_nudge() {
        let mut collider = unit_circle(Baton::Player);
        collider.record_collision(Hit {
            nudge: DVec2::X,
            push: DVec2::X,
            depth: 6.0,
            solid: false,
            impulse: DVec2::ZERO,
            contacts: &[DVec2::ZERO],
            baton: Baton::Pickup {
                id: ObjectId::PickUpHealth,
                amount: 20,
            },
        });
        let info = collider.collision_response_info();
        assert!(info.is_colliding);
        assert_eq!(info.nudge_direction, DVec2::X);
        assert_eq!(info.penetration_depth, 6.0);
        assert_eq!(info.nudge_vector(), DVec2::ZERO);
    }

    #[test]
    fn test_record_accumulates_and_clear_resets() {
        let mut collider = unit_circle(Baton::Player);
        collider.record_collision(Hit {
            nudge: DVec2::X,
            push: DVec2::X,
            depth: 4.0,
            solid: true,
            impulse: DVec2::new(10.0, 0.0),
            contacts: &[DVec2::ZERO],
            baton: Baton::Environment,
        });
        collider.record_collision(Hit {
            nudge: DVec2::Y,
            push: DVec2::Y,
            depth: 2.0,
            solid: true,
            impulse: DVec2::new(0.0, 5.0),
            contacts: &[DVec2::ONE],
            baton: Baton::Enemy {
                id: ObjectId::EnemyRhombus,
                contact_damage: 15,
            },
        });
        assert!(collider.has_unread_response());

        let info = collider.collision_response_info();
        assert!(info.is_colliding);
        assert_eq!(info.batons.len(), 2);
        assert_eq!(info.all_collision_points.len(), 2);
        assert_eq!(info.penetration_depth, 4.0);
        assert_eq!(info.impulse_vector, DVec2::new(10.0, 5.0));
        assert!((info.nudge_direction - DVec2::new(4.0, 2.0).normalize()).length() < 1e-12);
        assert_eq!(info.nudge_vector(), DVec2::new(4.0, 2.0));
        assert!(!collider.has_unread_response());

        collider.clear_collision_response_info();
        let info = collider.collision_response_info();
        assert_eq!(info.nudge_vector(), DVec2::ZERO);
        assert!(!info.is_colliding);
        assert!(info.batons.is_empty());
        assert!(info.all_collision_points.is_empty());
        assert_eq!(info.impulse_vector, DVec2::ZERO);
    }

    #[test]
    fn test_correction_follows_push_not_origins() {
        // Hitting a long wall far from its centre: origins line up along the wall
        let mut collider = unit_circle(Baton::Player);
        collider.record_collision(Hit {
            nudge: DVec2::X,
            push: DVec2::new(0.0, 1.0),
            depth: 3.0,
            solid: true,
            impulse: DVec2::ZERO,
            contacts: &[DVec2::ZERO],
            baton: Baton::Environment,
        });
        let info = collider.collision_response_info();
        assert_eq!(info.nudge_direction, DVec2::X);
        assert_eq!(info.nudge_vector(), DVec2::new(0.0, 3.0));
    }
}
