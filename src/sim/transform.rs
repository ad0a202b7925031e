//! Position, heading and body of one entity, kept in sync with its collider

use glam::DVec2;

use crate::consts::SIM_DT;
use crate::physics::{
    BodyId, ColliderHandle, CollisionManager, CollisionResponseInfo, RigidBody,
};

/// Where an entity is and how it moves
#[derive(Debug, Clone)]
pub struct Transform {
    origin: DVec2,
    /// Unit heading
    forward: DVec2,
    pub body: RigidBody,
    body_id: BodyId,
    collider: ColliderHandle,
}

impl Transform {
    pub fn new(origin: DVec2, body: RigidBody, body_id: BodyId, collider: ColliderHandle) -> Self {
        Self {
            origin,
            forward: DVec2::new(0.0, -1.0),
            body,
            body_id,
            collider,
        }
    }

    #[inline]
    pub fn origin(&self) -> DVec2 {
        self.origin
    }

    #[inline]
    pub fn forward(&self) -> DVec2 {
        self.forward
    }

    #[inline]
    pub fn body_id(&self) -> BodyId {
        self.body_id
    }

    #[inline]
    pub fn collider(&self) -> ColliderHandle {
        self.collider
    }

    /// Zero vectors leave the heading unchanged
    pub fn set_forward(&mut self, forward: DVec2) {
        if let Some(unit) = forward.try_normalize() {
            self.forward = unit;
        }
    }

    pub fn set_origin(&mut self, origin: DVec2, collisions: &mut CollisionManager) {
        self.origin = origin;
        if let Some(collider) = collisions.collider_mut(self.collider) {
            collider.translate(origin);
        }
    }

    pub fn move_by(&mut self, displacement: DVec2, collisions: &mut CollisionManager) {
        self.set_origin(self.origin + displacement, collisions);
    }

    /// Rotate the collider shape around the origin
    pub fn set_orientation(&self, radians: f64, collisions: &mut CollisionManager) {
        if let Some(collider) = collisions.collider_mut(self.collider) {
            collider.shape_mut().set_orientation(radians);
        }
    }

    /// Response accumulated since the last clear
    pub fn collisions<'a>(&self, collisions: &'a CollisionManager) -> Option<&'a CollisionResponseInfo> {
        collisions
            .collider(self.collider)
            .map(|c| c.collision_response_info())
    }

    /// Consume the pending response: push out of solid overlaps, then clear it.
    ///
    /// Static colliders are never moved. Returns what was consumed.
    pub fn resolve_collisions(&mut self, collisions: &mut CollisionManager) -> CollisionResponseInfo {
        let Some(collider) = collisions.collider_mut(self.collider) else {
            return CollisionResponseInfo::default();
        };
        let info = collider.collision_response_info().clone();
        collider.clear_collision_response_info();
        if !collider.is_static() && info.nudge_vector() != DVec2::ZERO {
            self.origin += info.nudge_vector();
            collider.translate(self.origin);
        }
        info
    }

    /// Clear the pending response without reacting to it
    pub fn discard_collisions(&self, collisions: &mut CollisionManager) {
        if let Some(collider) = collisions.collider_mut(self.collider) {
            collider.clear_collision_response_info();
        }
    }

    /// Integrate the body for one fixed step and move by the result
    pub fn step(&mut self, collisions: &mut CollisionManager) {
        let displacement = self.body.apply_movement_forces(SIM_DT);
        self.move_by(displacement, collisions);
    }
}
