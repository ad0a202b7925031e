//! Particle Shooter - fixed-step 2D collision core for an arena shooter
//!
//! Core modules:
//! - `physics`: Shapes, rigid bodies, colliders and the per-frame collision pass
//! - `sim`: Entities that consume collision results (player, enemies, projectiles, pickups)
//! - `tuning`: Data-driven physical constants

pub mod physics;
pub mod sim;
pub mod tuning;

pub use physics::{
    Baton, BodyId, Collider, ColliderHandle, ColliderType, ColliderTypeSet, CollisionManager,
    CollisionResponseInfo, ObjectId, RigidBody, Shape, ShapeError,
};
pub use tuning::{ConfigError, Tuning};

use glam::DVec2;

/// Game configuration constants
pub mod consts {
    /// Simulation steps per second
    pub const UPDATES_PER_SECOND: u32 = 60;
    /// Fixed simulation timestep
    pub const SIM_DT: f64 = 1.0 / UPDATES_PER_SECOND as f64;

    /// Arena dimensions
    pub const ARENA_WIDTH: f64 = 1920.0;
    pub const ARENA_HEIGHT: f64 = 1080.0;
}

/// Degrees to radians
#[inline]
pub fn deg_to_rad(degrees: f64) -> f64 {
    degrees.to_radians()
}

/// Approximate equality within `tolerance`
#[inline]
pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}

/// Approximate vector equality within `tolerance` per component
#[inline]
pub fn approx_eq_vec(a: DVec2, b: DVec2, tolerance: f64) -> bool {
    approx_eq(a.x, b.x, tolerance) && approx_eq(a.y, b.y, tolerance)
}

/// Unsigned angle between two vectors in degrees, in [0, 180].
///
/// Zero-length inputs yield 0.
pub fn angle_between_degrees(a: DVec2, b: DVec2) -> f64 {
    if a.length_squared() == 0.0 || b.length_squared() == 0.0 {
        return 0.0;
    }
    a.perp_dot(b).atan2(a.dot(b)).abs().to_degrees()
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f64, theta: f64) -> DVec2 {
    DVec2::new(r * theta.cos(), r * theta.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angle_between() {
        let up = DVec2::new(0.0, -1.0);
        let right = DVec2::new(1.0, 0.0);
        assert!(approx_eq(angle_between_degrees(up, right), 90.0, 1e-9));
        assert!(approx_eq(angle_between_degrees(up, -up), 180.0, 1e-9));
        assert!(approx_eq(angle_between_degrees(right, right * 3.0), 0.0, 1e-9));
        assert_eq!(angle_between_degrees(DVec2::ZERO, right), 0.0);
    }

    #[test]
    fn test_polar_round_trip_axis() {
        let p = polar_to_cartesian(2.0, std::f64::consts::FRAC_PI_2);
        assert!(approx_eq_vec(p, DVec2::new(0.0, 2.0), 1e-9));
    }
}
