//! Collision core
//!
//! - `shape`: convex polygons and circles with narrow-phase overlap tests
//! - `rigid_body`: per-entity kinematics integrated once per fixed step
//! - `collider`: shape + filtering rules + accumulated collision response
//! - `manager`: collider registry and the per-frame collision pass
//! - `prototypes`: collider tables for every object in the arena

pub mod collider;
pub mod manager;
pub mod prototypes;
pub mod rigid_body;
pub mod shape;

pub use collider::{
    Baton, Collider, ColliderType, ColliderTypeSet, CollisionResponseInfo, ObjectId,
};
pub use manager::{
    ColliderHandle, CollisionManager, NoBodies, PassStats, ResponseClearing, RigidBodySet,
};
pub use prototypes::PrototypeKind;
pub use rigid_body::{BodyId, RigidBody};
pub use shape::{OverlapResult, Shape, ShapeError, ShapeKind};
