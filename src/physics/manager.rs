//! Per-frame collision pass over every registered collider
//!
//! The manager owns collider storage; rigid bodies live with their entities and
//! are reached through [`RigidBodySet`] for the duration of a pass.
//!
//! Each pass:
//! - filters pairs (inactive, mutually ignored, both static)
//! - prunes pairs whose origins are further apart than either side's minimum distance
//! - runs the narrow phase and records contacts, nudges and batons on both sides;
//!   the positional correction follows the separating axis, not the origins
//! - exchanges impulses between non-trigger pairs

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::BuildHasher;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::collider::{Baton, Collider, Hit};
use super::rigid_body::{BodyId, RigidBody};
use super::shape::OverlapResult;
use crate::consts::SIM_DT;

/// Fraction of the penetration fed back as separating velocity each step
const CORRECTION_PERCENT: f64 = 0.2;
/// Penetration tolerated without correction
const CORRECTION_SLOP: f64 = 0.01;

/// Stable key of a registered collider
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColliderHandle(u32);

impl fmt::Display for ColliderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "collider#{}", self.0)
    }
}

/// Storage the manager reaches rigid bodies through
pub trait RigidBodySet {
    fn body(&self, id: BodyId) -> Option<&RigidBody>;
    fn body_mut(&mut self, id: BodyId) -> Option<&mut RigidBody>;
}

impl RigidBodySet for BTreeMap<BodyId, RigidBody> {
    fn body(&self, id: BodyId) -> Option<&RigidBody> {
        self.get(&id)
    }

    fn body_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        self.get_mut(&id)
    }
}

impl<S: BuildHasher> RigidBodySet for HashMap<BodyId, RigidBody, S> {
    fn body(&self, id: BodyId) -> Option<&RigidBody> {
        self.get(&id)
    }

    fn body_mut(&mut self, id: BodyId) -> Option<&mut RigidBody> {
        self.get_mut(&id)
    }
}

/// Empty body set, for geometry-only passes
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBodies;

impl RigidBodySet for NoBodies {
    fn body(&self, _id: BodyId) -> Option<&RigidBody> {
        None
    }

    fn body_mut(&mut self, _id: BodyId) -> Option<&mut RigidBody> {
        None
    }
}

/// Who resets response records between passes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResponseClearing {
    /// Records accumulate until each owner clears its own
    #[default]
    ConsumerDriven,
    /// The manager clears every record before a pass
    AutoAtPassStart,
}

/// Counters from the most recent pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PassStats {
    pub active_colliders: usize,
    pub pairs_considered: usize,
    pub pairs_filtered: usize,
    pub pairs_pruned: usize,
    pub pairs_tested: usize,
    pub pairs_colliding: usize,
}

/// Registry of colliders plus the per-frame simulation
#[derive(Debug, Default)]
pub struct CollisionManager {
    colliders: BTreeMap<ColliderHandle, Collider>,
    next_handle: u32,
    clearing: ResponseClearing,
    last_pass: PassStats,
    stale: Vec<ColliderHandle>,
}

impl CollisionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clearing(clearing: ResponseClearing) -> Self {
        Self {
            clearing,
            ..Self::default()
        }
    }

    pub fn add_collider(&mut self, collider: Collider) -> ColliderHandle {
        let handle = ColliderHandle(self.next_handle);
        self.next_handle += 1;
        log::trace!("Registered {} ({})", handle, collider.collider_type());
        self.colliders.insert(handle, collider);
        handle
    }

    /// Unregister a collider, handing it back to the caller
    pub fn remove_collider(&mut self, handle: ColliderHandle) -> Option<Collider> {
        let removed = self.colliders.remove(&handle);
        if removed.is_none() {
            log::debug!("Tried to remove unknown {}", handle);
        }
        removed
    }

    pub fn remove_all_colliders(&mut self) {
        log::debug!("Clearing {} colliders", self.colliders.len());
        self.colliders.clear();
        self.stale.clear();
    }

    pub fn collider(&self, handle: ColliderHandle) -> Option<&Collider> {
        self.colliders.get(&handle)
    }

    pub fn collider_mut(&mut self, handle: ColliderHandle) -> Option<&mut Collider> {
        self.colliders.get_mut(&handle)
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    /// Registered handles in registration order
    pub fn handles(&self) -> impl Iterator<Item = ColliderHandle> + '_ {
        self.colliders.keys().copied()
    }

    pub fn clearing(&self) -> ResponseClearing {
        self.clearing
    }

    pub fn set_clearing(&mut self, clearing: ResponseClearing) {
        self.clearing = clearing;
    }

    pub fn last_pass(&self) -> PassStats {
        self.last_pass
    }

    /// Colliders whose record was written and never read before the last pass began
    pub fn stale_colliders(&self) -> &[ColliderHandle] {
        &self.stale
    }

    /// Run one collision pass over the active colliders.
    ///
    /// Colliders whose body is missing from `bodies` still collide and receive
    /// batons; only the impulse exchange is skipped for them.
    pub fn simulate_current_collisions(&mut self, bodies: &mut impl RigidBodySet) {
        self.stale = self
            .colliders
            .iter()
            .filter(|(_, c)| c.has_unread_response())
            .map(|(h, _)| *h)
            .collect();
        if !self.stale.is_empty() {
            log::debug!("{} colliders carry unread responses into this pass", self.stale.len());
        }

        if self.clearing == ResponseClearing::AutoAtPassStart {
            for collider in self.colliders.values_mut() {
                collider.clear_collision_response_info();
            }
        }

        let active: Vec<ColliderHandle> = self
            .colliders
            .iter()
            .filter(|(_, c)| c.is_active())
            .map(|(h, _)| *h)
            .collect();

        let mut stats = PassStats {
            active_colliders: active.len(),
            ..PassStats::default()
        };

        for (i, &ha) in active.iter().enumerate() {
            for &hb in &active[i + 1..] {
                stats.pairs_considered += 1;
                let Some(contact) = self.test_pair(ha, hb, &*bodies, &mut stats) else {
                    continue;
                };
                stats.pairs_colliding += 1;
                self.apply_contact(ha, hb, contact, bodies);
            }
        }

        log::trace!(
            "Collision pass: {} active, {} pairs, {} pruned, {} tested, {} colliding",
            stats.active_colliders,
            stats.pairs_considered,
            stats.pairs_pruned,
            stats.pairs_tested,
            stats.pairs_colliding
        );
        self.last_pass = stats;
    }

    /// Filter, prune and narrow-phase one pair. Computes the full response on a hit.
    fn test_pair(
        &self,
        ha: ColliderHandle,
        hb: ColliderHandle,
        bodies: &impl RigidBodySet,
        stats: &mut PassStats,
    ) -> Option<Contact> {
        let a = self.colliders.get(&ha)?;
        let b = self.colliders.get(&hb)?;

        if !a.interacts_with(b) || (a.is_static() && b.is_static()) {
            stats.pairs_filtered += 1;
            return None;
        }

        let origin_a = a.shape().origin();
        let origin_b = b.shape().origin();
        let cutoff = a
            .minimum_collision_distance()
            .max(b.minimum_collision_distance());
        if origin_a.distance(origin_b) > cutoff {
            stats.pairs_pruned += 1;
            return None;
        }

        stats.pairs_tested += 1;
        let overlap = a.shape().overlaps(b.shape())?;

        let solid = !a.is_trigger() && !b.is_trigger();
        let (impulse_a, impulse_b) = if solid {
            exchange_impulse(a, b, &overlap, bodies)
        } else {
            (DVec2::ZERO, DVec2::ZERO)
        };

        Some(Contact {
            nudge_a: push_direction(origin_a, origin_b, -overlap.separating_axis),
            nudge_b: push_direction(origin_b, origin_a, overlap.separating_axis),
            solid,
            impulse_a,
            impulse_b,
            baton_a: a.baton(),
            baton_b: b.baton(),
            body_a: a.associated_body(),
            body_b: b.associated_body(),
            overlap,
        })
    }

    fn apply_contact(
        &mut self,
        ha: ColliderHandle,
        hb: ColliderHandle,
        contact: Contact,
        bodies: &mut impl RigidBodySet,
    ) {
        let depth = contact.overlap.penetration_depth;
        let axis = contact.overlap.separating_axis;
        let contacts = contact.overlap.contact_points.as_slice();

        if let Some(a) = self.colliders.get_mut(&ha) {
            a.record_collision(Hit {
                nudge: contact.nudge_a,
                push: -axis,
                depth,
                solid: contact.solid,
                impulse: contact.impulse_a,
                contacts,
                baton: contact.baton_b,
            });
        }
        if let Some(b) = self.colliders.get_mut(&hb) {
            b.record_collision(Hit {
                nudge: contact.nudge_b,
                push: axis,
                depth,
                solid: contact.solid,
                impulse: contact.impulse_b,
                contacts,
                baton: contact.baton_a,
            });
        }

        for (body, impulse) in [
            (contact.body_a, contact.impulse_a),
            (contact.body_b, contact.impulse_b),
        ] {
            if impulse == DVec2::ZERO {
                continue;
            }
            if let Some(body) = body.and_then(|id| bodies.body_mut(id)) {
                body.add_impulse_velocity(impulse);
            }
        }
    }
}

/// Everything one colliding pair writes back
struct Contact {
    overlap: OverlapResult,
    nudge_a: DVec2,
    nudge_b: DVec2,
    solid: bool,
    impulse_a: DVec2,
    impulse_b: DVec2,
    baton_a: Baton,
    baton_b: Baton,
    body_a: Option<BodyId>,
    body_b: Option<BodyId>,
}

/// Unit vector from `other` toward `own`, or `fallback` when the origins coincide
fn push_direction(own: DVec2, other: DVec2, fallback: DVec2) -> DVec2 {
    (own - other).try_normalize().unwrap_or(fallback)
}

/// Body of a collider, logging ids that no longer resolve
fn resolve_body<'a>(collider: &Collider, bodies: &'a impl RigidBodySet) -> Option<&'a RigidBody> {
    let id = collider.associated_body()?;
    let body = bodies.body(id);
    if body.is_none() {
        log::debug!("Body {:?} of a {} collider is gone", id, collider.collider_type());
    }
    body
}

/// Share of the correction a side receives (zero for static, bodiless or immovable)
fn response_weight(collider: &Collider, body: Option<&RigidBody>) -> f64 {
    match body {
        Some(body) if !collider.is_static() => body.inverted_mass(),
        _ => 0.0,
    }
}

/// Velocity change for each side of a non-trigger collision.
///
/// The separating axis points from `a` toward `b`, so `a` is pushed along the
/// negative axis.
fn exchange_impulse(
    a: &Collider,
    b: &Collider,
    overlap: &OverlapResult,
    bodies: &impl RigidBodySet,
) -> (DVec2, DVec2) {
    let body_a = resolve_body(a, bodies);
    let body_b = resolve_body(b, bodies);

    let weight_a = response_weight(a, body_a);
    let weight_b = response_weight(b, body_b);
    let total_weight = weight_a + weight_b;
    if total_weight <= 0.0 {
        return (DVec2::ZERO, DVec2::ZERO);
    }

    let normal = overlap.separating_axis;
    let velocity_a = body_a.map_or(DVec2::ZERO, RigidBody::velocity);
    let velocity_b = body_b.map_or(DVec2::ZERO, RigidBody::velocity);
    let approach = (-(velocity_b - velocity_a).dot(normal)).max(0.0);
    let bias = CORRECTION_PERCENT * (overlap.penetration_depth - CORRECTION_SLOP).max(0.0) / SIM_DT;

    let elasticity = [body_a, body_b]
        .into_iter()
        .flatten()
        .map(RigidBody::elasticity_coefficient)
        .fold(1.0, f64::min);

    let magnitude = (1.0 + elasticity) * (approach + bias) / total_weight;
    (-normal * magnitude * weight_a, normal * magnitude * weight_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::collider::{ColliderType, ObjectId};
    use crate::physics::prototypes;
    use crate::physics::shape::Shape;
    use proptest::prelude::*;

    fn circle_at(radius: f64, origin: DVec2, baton: Baton) -> Collider {
        let mut collider = Collider::new(Shape::circle(radius).unwrap(), baton);
        collider.translate(origin);
        collider
    }

    fn enemy_baton() -> Baton {
        Baton::Enemy {
            id: ObjectId::EnemyRhombus,
            contact_damage: 15,
        }
    }

    fn player_shot() -> Baton {
        Baton::PlayerAttack {
            id: ObjectId::PlayerProjectileBasic,
            damage: 15,
        }
    }

    #[test]
    fn test_scenario_a_circle_pair() {
        let mut manager = CollisionManager::new();
        let small = manager.add_collider(circle_at(12.0, DVec2::ZERO, player_shot()));
        let large = manager.add_collider(circle_at(16.0, DVec2::new(20.0, 0.0), enemy_baton()));

        manager.simulate_current_collisions(&mut NoBodies);

        let info = manager.collider(small).unwrap().collision_response_info();
        assert!(info.is_colliding);
        assert_eq!(info.batons, vec![enemy_baton()]);
        assert!((info.nudge_direction - DVec2::new(-1.0, 0.0)).length() < 1e-12);
        assert!((info.penetration_depth - 8.0).abs() < 1e-9);
        assert!(info.nudge_vector().length() <= 8.0 + 1e-9);
        assert!(!info.all_collision_points.is_empty());

        let info = manager.collider(large).unwrap().collision_response_info();
        assert!(info.is_colliding);
        assert_eq!(info.batons, vec![player_shot()]);
        assert!((info.nudge_direction - DVec2::new(1.0, 0.0)).length() < 1e-12);
        assert_eq!(manager.last_pass().pairs_colliding, 1);
    }

    #[test]
    fn test_scenario_b_trigger_pickup_heals_without_impulse() {
        let mut bodies = BTreeMap::new();
        let player_body = BodyId(1);
        bodies.insert(player_body, RigidBody::new());

        let mut manager = CollisionManager::new();
        let mut item = prototypes::item_health();
        item.translate(DVec2::ZERO);
        let mut player = prototypes::player();
        player.translate(DVec2::new(10.0, 0.0));
        player.set_associated_body(Some(player_body));

        let _item = manager.add_collider(item);
        let player = manager.add_collider(player);
        manager.simulate_current_collisions(&mut bodies);

        let info = manager.collider(player).unwrap().collision_response_info();
        assert!(info.is_colliding);
        assert_eq!(info.batons.len(), 1);
        let baton = info.batons[0];
        assert_eq!(baton.collider_type(), ColliderType::Pickup);
        assert_eq!(baton.object_id(), Some(ObjectId::PickUpHealth));
        assert_eq!(baton.value(), 20);
        assert_eq!(info.impulse_vector, DVec2::ZERO);
        assert_eq!(bodies[&player_body].impulse_velocity(), DVec2::ZERO);
    }

    #[test]
    fn test_scenario_c_environment_pushes_enemy_away() {
        let mut bodies = BTreeMap::new();
        let wall_body = BodyId(1);
        let enemy_body = BodyId(2);
        bodies.insert(wall_body, RigidBody::new());
        bodies.insert(enemy_body, RigidBody::from(&crate::tuning::Tuning::default().rhombus));

        let mut wall = prototypes::environment_wall([
            DVec2::new(-100.0, -200.0),
            DVec2::new(0.0, -200.0),
            DVec2::new(0.0, 200.0),
            DVec2::new(-100.0, 200.0),
        ])
        .unwrap();
        wall.set_associated_body(Some(wall_body));

        let mut enemy = prototypes::enemy_rhombus();
        enemy.set_is_active(true);
        enemy.translate(DVec2::new(10.0, 0.0));
        enemy.set_associated_body(Some(enemy_body));

        let mut manager = CollisionManager::new();
        let wall = manager.add_collider(wall);
        let enemy = manager.add_collider(enemy);
        manager.simulate_current_collisions(&mut bodies);

        let enemy_info = manager.collider(enemy).unwrap().collision_response_info();
        assert!(enemy_info.is_colliding);
        assert!(enemy_info.impulse_vector.x > 0.0);
        assert!(bodies[&enemy_body].impulse_velocity().x > 0.0);

        let wall_info = manager.collider(wall).unwrap().collision_response_info();
        assert!(wall_info.is_colliding);
        assert_eq!(wall_info.impulse_vector, DVec2::ZERO);
        assert_eq!(bodies[&wall_body], RigidBody::new());
    }

    /// Impulse magnitude a rhombus moving left receives from a wall at its side
    fn wall_bounce(wall_body: Option<RigidBody>) -> (f64, f64) {
        let tuning = crate::tuning::Tuning::default();
        let mut bodies = BTreeMap::new();
        let mut rhombus = RigidBody::from(&tuning.rhombus);
        rhombus.set_input_velocity(DVec2::new(-300.0, 0.0));
        rhombus.apply_movement_forces(SIM_DT);
        let velocity = rhombus.velocity();
        bodies.insert(BodyId(2), rhombus);

        let mut wall = prototypes::environment_wall([
            DVec2::new(-100.0, -200.0),
            DVec2::new(0.0, -200.0),
            DVec2::new(0.0, 200.0),
            DVec2::new(-100.0, 200.0),
        ])
        .unwrap();
        if let Some(body) = wall_body {
            bodies.insert(BodyId(1), body);
            wall.set_associated_body(Some(BodyId(1)));
        }
        let mut enemy = prototypes::enemy_rhombus().with_active(true);
        enemy.translate(DVec2::new(10.0, 0.0));
        enemy.set_associated_body(Some(BodyId(2)));

        let mut manager = CollisionManager::new();
        manager.add_collider(wall);
        let enemy = manager.add_collider(enemy);
        manager.simulate_current_collisions(&mut bodies);

        let info = manager.collider(enemy).unwrap().collision_response_info();
        let normal = info.impulse_vector.normalize();
        let bias = CORRECTION_PERCENT * (info.penetration_depth - CORRECTION_SLOP).max(0.0) / SIM_DT;
        let closing = (-velocity.dot(normal)).max(0.0) + bias;
        (info.impulse_vector.length(), closing)
    }

    #[test]
    fn test_environment_body_makes_walls_inelastic() {
        let environment = RigidBody::from(&crate::tuning::Tuning::default().environment);
        let (impulse, closing) = wall_bounce(Some(environment));
        assert!((impulse - closing).abs() < 1e-9);

        // A bodiless wall leaves only the rhombus's own elasticity
        let (impulse, closing) = wall_bounce(None);
        assert!((impulse - 1.85 * closing).abs() < 1e-9);
    }

    #[test]
    fn test_scenario_d_attacks_ignore_each_other() {
        let mut manager = CollisionManager::new();
        let first = manager.add_collider(prototypes::player_attack_basic());
        let second = manager.add_collider(prototypes::player_attack_basic());

        manager.simulate_current_collisions(&mut NoBodies);

        for handle in [first, second] {
            let info = manager.collider(handle).unwrap().collision_response_info();
            assert!(!info.is_colliding);
            assert!(info.batons.is_empty());
        }
        assert_eq!(manager.last_pass().pairs_filtered, 1);
    }

    #[test]
    fn test_broad_phase_prune_is_authoritative() {
        let mut manager = CollisionManager::new();
        let a = manager.add_collider(
            circle_at(50.0, DVec2::ZERO, player_shot()).with_minimum_collision_distance(5.0),
        );
        let b = manager.add_collider(
            circle_at(50.0, DVec2::new(10.0, 0.0), enemy_baton())
                .with_minimum_collision_distance(8.0),
        );

        manager.simulate_current_collisions(&mut NoBodies);

        assert!(!manager.collider(a).unwrap().collision_response_info().is_colliding);
        assert!(!manager.collider(b).unwrap().collision_response_info().is_colliding);
        assert_eq!(manager.last_pass().pairs_pruned, 1);
    }

    #[test]
    fn test_inactive_and_static_pairs_are_skipped() {
        let mut manager = CollisionManager::new();
        let a = manager.add_collider(circle_at(10.0, DVec2::ZERO, enemy_baton()).with_active(false));
        let b = manager.add_collider(circle_at(10.0, DVec2::ZERO, player_shot()));
        manager.simulate_current_collisions(&mut NoBodies);
        assert!(!manager.collider(a).unwrap().collision_response_info().is_colliding);
        assert!(!manager.collider(b).unwrap().collision_response_info().is_colliding);

        let mut manager = CollisionManager::new();
        let a = manager.add_collider(circle_at(10.0, DVec2::ZERO, Baton::Environment).with_static(true));
        let b = manager.add_collider(circle_at(10.0, DVec2::ONE, Baton::Environment).with_static(true));
        manager.simulate_current_collisions(&mut NoBodies);
        assert!(!manager.collider(a).unwrap().collision_response_info().is_colliding);
        assert!(!manager.collider(b).unwrap().collision_response_info().is_colliding);
    }

    #[test]
    fn test_static_body_is_never_pushed() {
        let mut bodies = BTreeMap::new();
        bodies.insert(BodyId(1), RigidBody::new());
        bodies.insert(BodyId(2), RigidBody::new());

        let mut pillar = circle_at(20.0, DVec2::ZERO, Baton::Environment).with_static(true);
        pillar.set_associated_body(Some(BodyId(1)));
        let mut rock = circle_at(20.0, DVec2::new(30.0, 0.0), enemy_baton());
        rock.set_associated_body(Some(BodyId(2)));

        let mut manager = CollisionManager::new();
        manager.add_collider(pillar);
        manager.add_collider(rock);
        manager.simulate_current_collisions(&mut bodies);

        assert_eq!(bodies[&BodyId(1)], RigidBody::new());
        assert!(bodies[&BodyId(2)].impulse_velocity().x > 0.0);
    }

    #[test]
    fn test_equal_masses_receive_opposite_impulses() {
        let mut bodies = HashMap::new();
        bodies.insert(BodyId(1), RigidBody::new());
        bodies.insert(BodyId(2), RigidBody::new());

        let mut left = circle_at(10.0, DVec2::ZERO, enemy_baton());
        left.set_associated_body(Some(BodyId(1)));
        let mut right = circle_at(10.0, DVec2::new(15.0, 0.0), player_shot());
        right.set_associated_body(Some(BodyId(2)));

        let mut manager = CollisionManager::new();
        let left = manager.add_collider(left);
        let right = manager.add_collider(right);
        manager.simulate_current_collisions(&mut bodies);

        let left_impulse = manager.collider(left).unwrap().collision_response_info().impulse_vector;
        let right_impulse = manager.collider(right).unwrap().collision_response_info().impulse_vector;
        assert!(left_impulse.x < 0.0);
        assert!((left_impulse + right_impulse).length() < 1e-9);
        assert_eq!(bodies[&BodyId(1)].impulse_velocity(), left_impulse);
    }

    #[test]
    fn test_dangling_body_degrades_to_metadata() {
        let mut bodies: BTreeMap<BodyId, RigidBody> = BTreeMap::new();
        let mut ghost = circle_at(10.0, DVec2::ZERO, enemy_baton());
        ghost.set_associated_body(Some(BodyId(99)));

        let mut manager = CollisionManager::new();
        let ghost = manager.add_collider(ghost);
        let other = manager.add_collider(circle_at(10.0, DVec2::new(5.0, 0.0), player_shot()));
        manager.simulate_current_collisions(&mut bodies);

        let info = manager.collider(ghost).unwrap().collision_response_info();
        assert!(info.is_colliding);
        assert_eq!(info.impulse_vector, DVec2::ZERO);
        assert_eq!(
            manager.collider(other).unwrap().collision_response_info().batons,
            vec![enemy_baton()]
        );
    }

    #[test]
    fn test_consumer_driven_accumulates_and_reports_stale() {
        let mut manager = CollisionManager::new();
        let a = manager.add_collider(circle_at(10.0, DVec2::ZERO, enemy_baton()));
        let b = manager.add_collider(circle_at(10.0, DVec2::new(5.0, 0.0), player_shot()));

        manager.simulate_current_collisions(&mut NoBodies);
        assert!(manager.stale_colliders().is_empty());
        // Only `a` gets read
        assert_eq!(manager.collider(a).unwrap().collision_response_info().batons.len(), 1);

        manager.simulate_current_collisions(&mut NoBodies);
        assert_eq!(manager.stale_colliders(), &[b]);
        assert_eq!(manager.collider(a).unwrap().collision_response_info().batons.len(), 2);
    }

    #[test]
    fn test_auto_clear_policy_resets_each_pass() {
        let mut manager = CollisionManager::with_clearing(ResponseClearing::AutoAtPassStart);
        let a = manager.add_collider(circle_at(10.0, DVec2::ZERO, enemy_baton()));
        manager.add_collider(circle_at(10.0, DVec2::new(5.0, 0.0), player_shot()));

        manager.simulate_current_collisions(&mut NoBodies);
        manager.simulate_current_collisions(&mut NoBodies);
        assert_eq!(manager.collider(a).unwrap().collision_response_info().batons.len(), 1);
    }

    #[test]
    fn test_registry_mutation() {
        let mut manager = CollisionManager::new();
        let a = manager.add_collider(circle_at(10.0, DVec2::ZERO, enemy_baton()));
        let b = manager.add_collider(circle_at(10.0, DVec2::ZERO, player_shot()));
        assert_eq!(manager.handles().collect::<Vec<_>>(), vec![a, b]);

        assert!(manager.remove_collider(a).is_some());
        assert!(manager.remove_collider(a).is_none());
        assert_eq!(manager.len(), 1);

        manager.remove_all_colliders();
        assert!(manager.is_empty());
    }

    proptest! {
        #[test]
        fn prop_triggers_never_change_velocity(
            x in -40.0f64..40.0,
            y in -40.0f64..40.0,
            vx in -300.0f64..300.0,
        ) {
            let mut bodies = BTreeMap::new();
            let mut body = RigidBody::new();
            body.set_input_velocity(DVec2::new(vx, 0.0));
            body.apply_movement_forces(SIM_DT);
            let before = body.clone();
            bodies.insert(BodyId(1), body);
            bodies.insert(BodyId(2), RigidBody::new());

            let mut trigger = circle_at(30.0, DVec2::ZERO, player_shot()).with_trigger(true);
            trigger.set_associated_body(Some(BodyId(2)));
            let mut target = circle_at(20.0, DVec2::new(x, y), enemy_baton());
            target.set_associated_body(Some(BodyId(1)));

            let mut manager = CollisionManager::new();
            manager.add_collider(trigger);
            manager.add_collider(target);
            manager.simulate_current_collisions(&mut bodies);

            prop_assert_eq!(&bodies[&BodyId(1)], &before);
            prop_assert_eq!(&bodies[&BodyId(2)], &RigidBody::new());
        }

        #[test]
        fn prop_clear_then_get_is_empty(x in -30.0f64..30.0, y in -30.0f64..30.0) {
            let mut manager = CollisionManager::new();
            let a = manager.add_collider(circle_at(20.0, DVec2::ZERO, enemy_baton()));
            manager.add_collider(circle_at(20.0, DVec2::new(x, y), player_shot()));
            manager.simulate_current_collisions(&mut NoBodies);

            let collider = manager.collider_mut(a).unwrap();
            collider.clear_collision_response_info();
            let info = collider.collision_response_info();
            prop_assert!(!info.is_colliding);
            prop_assert!(info.batons.is_empty());
            prop_assert!(info.all_collision_points.is_empty());
        }
    }
}
