//! Spawn templates and the item drop table
//!
//! A template holds everything shared by all instances of a kind (collider
//! prototype, body tuning, starting health). Spawning copies it and places the
//! copy; nothing about the template changes afterwards.

use std::collections::BTreeMap;
use std::fmt;

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::physics::{Collider, PrototypeKind, RigidBody, prototypes};
use crate::tuning::{DropRates, Tuning};

/// Everything the world knows how to spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    Rhombus,
    Square,
    Hexagon,
    BasicShot,
    BounceShot,
    EnemyShot,
    HexBeam,
    HealthItem,
    BounceItem,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Spawn request for a kind nobody registered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnError {
    UnknownKind(EntityKind),
}

impl fmt::Display for SpawnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpawnError::UnknownKind(kind) => write!(f, "no template registered for {}", kind),
        }
    }
}

impl std::error::Error for SpawnError {}

/// Shared configuration of one entity kind
#[derive(Debug, Clone)]
pub struct Template {
    pub collider: Collider,
    pub body: RigidBody,
    /// Starting health; zero for things that cannot be damaged
    pub health: i32,
}

impl Template {
    pub fn new(collider: Collider, body: RigidBody) -> Self {
        Self {
            collider,
            body,
            health: 0,
        }
    }

    pub fn with_health(mut self, health: i32) -> Self {
        self.health = health;
        self
    }
}

/// Fresh runtime copy of a template, already placed
#[derive(Debug, Clone)]
pub struct Spawned {
    pub kind: EntityKind,
    pub collider: Collider,
    pub body: RigidBody,
    pub health: i32,
}

/// Templates keyed by kind
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: BTreeMap<EntityKind, Template>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every kind the game uses, tuned from `tuning`
    pub fn standard(tuning: &Tuning) -> Self {
        let mut registry = Self::new();
        registry.register(
            EntityKind::Rhombus,
            Template::new(prototypes::for_kind(PrototypeKind::EnemyRhombus), RigidBody::from(&tuning.rhombus))
                .with_health(25),
        );
        registry.register(
            EntityKind::Square,
            Template::new(prototypes::for_kind(PrototypeKind::EnemySquare), RigidBody::from(&tuning.square))
                .with_health(60),
        );
        registry.register(
            EntityKind::Hexagon,
            Template::new(prototypes::for_kind(PrototypeKind::EnemyHexagon), RigidBody::from(&tuning.hexagon))
                .with_health(90),
        );
        registry.register(
            EntityKind::BasicShot,
            Template::new(
                prototypes::for_kind(PrototypeKind::PlayerAttackBasic),
                RigidBody::from(&tuning.basic_shot),
            ),
        );
        registry.register(
            EntityKind::BounceShot,
            Template::new(
                prototypes::for_kind(PrototypeKind::PlayerAttackBasic),
                RigidBody::from(&tuning.bounce_shot),
            ),
        );
        registry.register(
            EntityKind::EnemyShot,
            Template::new(
                prototypes::for_kind(PrototypeKind::EnemyAttackBasic),
                RigidBody::from(&tuning.enemy_shot),
            ),
        );
        registry.register(
            EntityKind::HexBeam,
            Template::new(prototypes::for_kind(PrototypeKind::EnemyAttackHex), RigidBody::from(&tuning.hex_beam)),
        );
        registry.register(
            EntityKind::HealthItem,
            Template::new(prototypes::for_kind(PrototypeKind::ItemHealth), RigidBody::new()),
        );
        registry.register(
            EntityKind::BounceItem,
            Template::new(prototypes::for_kind(PrototypeKind::ItemBounce), RigidBody::new()),
        );
        registry
    }

    /// Add or replace the template for `kind`
    pub fn register(&mut self, kind: EntityKind, template: Template) {
        if self.templates.insert(kind, template).is_some() {
            log::debug!("Replaced template for {}", kind);
        }
    }

    pub fn get(&self, kind: EntityKind) -> Option<&Template> {
        self.templates.get(&kind)
    }

    pub fn contains(&self, kind: EntityKind) -> bool {
        self.templates.contains_key(&kind)
    }

    /// Copy the template for `kind` and place it at `position`
    pub fn spawn(&self, kind: EntityKind, position: DVec2) -> Result<Spawned, SpawnError> {
        let template = self.get(kind).ok_or(SpawnError::UnknownKind(kind))?;
        let mut collider = template.collider.clone();
        collider.translate(position);
        Ok(Spawned {
            kind,
            collider,
            body: template.body.clone(),
            health: template.health,
        })
    }
}

/// Seeded drop table rolled when an enemy dies
#[derive(Debug, Clone)]
pub struct ItemSpawner {
    rng: Pcg32,
    /// `(kind, percent)` in roll order
    table: Vec<(EntityKind, u32)>,
}

impl ItemSpawner {
    pub fn new(rates: DropRates, seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            table: vec![
                (EntityKind::BounceItem, rates.bounce),
                (EntityKind::HealthItem, rates.health),
            ],
        }
    }

    /// Roll 0..100 against the cumulative rates. Most rolls drop nothing.
    pub fn roll(&mut self) -> Option<EntityKind> {
        let roll: u32 = self.rng.random_range(0..100);
        Self::pick(&self.table, roll)
    }

    fn pick(table: &[(EntityKind, u32)], roll: u32) -> Option<EntityKind> {
        let mut upper = 0;
        for &(kind, rate) in table {
            let lower = upper;
            upper += rate;
            if lower < roll && roll <= upper {
                return Some(kind);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::ColliderType;

    #[test]
    fn test_spawn_copies_template() {
        let registry = TemplateRegistry::standard(&Tuning::default());
        let a = registry.spawn(EntityKind::Rhombus, DVec2::new(100.0, 50.0)).unwrap();
        let b = registry.spawn(EntityKind::Rhombus, DVec2::new(-20.0, 0.0)).unwrap();

        assert_eq!(a.collider.shape().origin(), DVec2::new(100.0, 50.0));
        assert_eq!(b.collider.shape().origin(), DVec2::new(-20.0, 0.0));
        assert_eq!(a.health, 25);
        assert_eq!(a.collider.collider_type(), ColliderType::Enemy);
        assert_eq!(a.body.min_collision_impulse_magnitude(), 500.0);
        // Template stays at the origin
        let template = registry.get(EntityKind::Rhombus).unwrap();
        assert_eq!(template.collider.shape().origin(), DVec2::ZERO);
    }

    #[test]
    fn test_unknown_kind_is_reported() {
        let registry = TemplateRegistry::new();
        let err = registry.spawn(EntityKind::Square, DVec2::ZERO).unwrap_err();
        assert_eq!(err, SpawnError::UnknownKind(EntityKind::Square));
        assert_eq!(err.to_string(), "no template registered for Square");
    }

    #[test]
    fn test_every_kind_is_registered() {
        let registry = TemplateRegistry::standard(&Tuning::default());
        for kind in [
            EntityKind::Rhombus,
            EntityKind::Square,
            EntityKind::Hexagon,
            EntityKind::BasicShot,
            EntityKind::BounceShot,
            EntityKind::EnemyShot,
            EntityKind::HexBeam,
            EntityKind::HealthItem,
            EntityKind::BounceItem,
        ] {
            assert!(registry.contains(kind), "{} missing", kind);
        }
    }

    #[test]
    fn test_drop_table_bounds() {
        let table = [(EntityKind::BounceItem, 10), (EntityKind::HealthItem, 15)];
        assert_eq!(ItemSpawner::pick(&table, 0), None);
        assert_eq!(ItemSpawner::pick(&table, 1), Some(EntityKind::BounceItem));
        assert_eq!(ItemSpawner::pick(&table, 10), Some(EntityKind::BounceItem));
        assert_eq!(ItemSpawner::pick(&table, 11), Some(EntityKind::HealthItem));
        assert_eq!(ItemSpawner::pick(&table, 25), Some(EntityKind::HealthItem));
        assert_eq!(ItemSpawner::pick(&table, 26), None);
    }

    #[test]
    fn test_rolls_are_deterministic_per_seed() {
        let mut a = ItemSpawner::new(DropRates::default(), 42);
        let mut b = ItemSpawner::new(DropRates::default(), 42);
        let rolls_a: Vec<_> = (0..200).map(|_| a.roll()).collect();
        let rolls_b: Vec<_> = (0..200).map(|_| b.roll()).collect();
        assert_eq!(rolls_a, rolls_b);
        assert!(rolls_a.iter().any(Option::is_some));
        assert!(rolls_a.iter().any(Option::is_none));
    }

    #[test]
    fn test_guaranteed_drop() {
        let mut spawner = ItemSpawner::new(DropRates { bounce: 0, health: 100 }, 1);
        // Roll 0 is the only miss
        let drops = (0..100).filter(|_| spawner.roll().is_some()).count();
        assert!(drops >= 90);
    }
}
