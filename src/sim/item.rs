//! Pickups dropped by destroyed enemies

use crate::physics::ColliderType;

use super::templates::EntityKind;
use super::transform::Transform;
use super::world::Frame;

/// A stationary pickup; gone as soon as the player touches it
#[derive(Debug, Clone)]
pub struct Item {
    kind: EntityKind,
    pub transform: Transform,
}

impl Item {
    pub fn new(kind: EntityKind, transform: Transform) -> Self {
        Self { kind, transform }
    }

    #[inline]
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Returns false once picked up
    pub fn update(&mut self, frame: &mut Frame<'_>) -> bool {
        let info = self.transform.resolve_collisions(frame.collisions);
        !info.touched_type(ColliderType::Player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{BodyId, CollisionManager, NoBodies, RigidBody, prototypes};
    use crate::sim::world::test_frame;
    use glam::DVec2;

    #[test]
    fn test_item_waits_for_player() {
        let mut collisions = CollisionManager::new();
        let mut collider = prototypes::item_health();
        collider.translate(DVec2::new(500.0, 0.0));
        let handle = collisions.add_collider(collider);
        let mut item = Item::new(
            EntityKind::HealthItem,
            Transform::new(DVec2::new(500.0, 0.0), RigidBody::new(), BodyId(3), handle),
        );

        let mut player = prototypes::player();
        player.translate(DVec2::new(400.0, 0.0));
        let player = collisions.add_collider(player);

        collisions.simulate_current_collisions(&mut NoBodies);
        assert!(test_frame(&mut collisions, |frame| item.update(frame)));

        collisions.collider_mut(player).unwrap().translate(DVec2::new(480.0, 0.0));
        collisions.simulate_current_collisions(&mut NoBodies);
        assert!(!test_frame(&mut collisions, |frame| item.update(frame)));
    }
}
