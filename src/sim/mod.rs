//! Deterministic consumer layer
//!
//! Entities that read collision responses and react to them. Everything here
//! runs inside `World::tick`:
//! - Fixed timestep only (timers count ticks, not seconds)
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or input devices

pub mod enemy;
pub mod events;
pub mod item;
pub mod player;
pub mod projectile;
pub mod templates;
pub mod transform;
pub mod world;

pub use enemy::{Behaviour, Enemy, EnemyState};
pub use events::{EventBus, GameEvent, SubscriberId};
pub use item::Item;
pub use player::{Player, PlayerInfo, PlayerState};
pub use projectile::{LaserBeam, Projectile, ProjectileKind};
pub use templates::{EntityKind, ItemSpawner, SpawnError, Spawned, Template, TemplateRegistry};
pub use transform::Transform;
pub use world::{Entity, Frame, SpawnRequest, TickInput, World};

use crate::consts::UPDATES_PER_SECOND;

/// Convert a duration to whole ticks
#[inline]
pub fn ticks(seconds: f64) -> u32 {
    (seconds * UPDATES_PER_SECOND as f64).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticks() {
        assert_eq!(ticks(1.0), 60);
        assert_eq!(ticks(0.15), 9);
        assert_eq!(ticks(0.125), 8);
        assert_eq!(ticks(1.75), 105);
        assert_eq!(ticks(0.0), 0);
    }
}
