//! Gameplay events and their synchronous fan-out
//!
//! Subscribers are called in registration order, inside the step that raised
//! the event.

use glam::DVec2;

use crate::physics::BodyId;

use super::templates::EntityKind;

/// Something listeners (audio, UI, camera) may react to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// Player took damage and entered its invulnerable window
    PlayerDamaged { health: i32 },
    /// Invulnerable window ended
    PlayerRecovered,
    PlayerHealed { health: i32 },
    PoweredUp,
    PoweredDown,
    /// Laser switched on or off
    SpecialAttack { active: bool },
    /// A projectile left its shooter
    Fired { kind: EntityKind },
    EnemyBasicDamage,
    EnemySpecialDamage,
    /// A square found a target and is about to charge
    EnemyTargetLocked,
    EnemyDeath { kind: EntityKind, position: DVec2 },
    ItemDropped { kind: EntityKind, position: DVec2 },
    /// Laser touched something at this point
    LaserHit { point: DVec2 },
    /// Entity will be removed at the next frame boundary
    Destroyed { entity: BodyId },
    GameOver,
}

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriberId(u32);

type Subscriber = Box<dyn FnMut(&GameEvent)>;

/// Ordered list of listeners
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<(SubscriberId, Subscriber)>,
    next_id: u32,
    published: u64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .field("published", &self.published)
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&GameEvent) + 'static) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener; returns false if it was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Deliver to every subscriber, oldest first
    pub fn publish(&mut self, event: GameEvent) {
        log::trace!("Event: {:?}", event);
        self.published += 1;
        for (_, listener) in &mut self.subscribers {
            listener(&event);
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Events published since creation
    pub fn published(&self) -> u64 {
        self.published
    }
}
