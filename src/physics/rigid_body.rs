//! Per-entity kinematic state and fixed-step integration
//!
//! Motion is the sum of two channels:
//! - input velocity: steering intent, driven by acceleration and capped at `speed`
//! - impulse velocity: injected momentum (knockback, recoil, collision response)
//!   that decays geometrically every step, at the same rate whatever the
//!   body's elasticity

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Non-owning reference to a rigid body held outside the collision manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyId(pub u32);

/// Kinematic state of one entity
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBody {
    /// Net velocity used during the last step (pixels/s)
    velocity: DVec2,
    acceleration: DVec2,
    input_velocity: DVec2,
    impulse_velocity: DVec2,
    /// 1/mass; zero means immovable
    inverted_mass: f64,
    /// Fraction of collision energy returned, in [0, 1]
    elasticity_coefficient: f64,
    /// Steering speed cap (pixels/s)
    speed: f64,
    /// Fraction of residual velocity lost per second
    deceleration_speed: f64,
    /// Impulses weaker than this are dropped
    min_collision_impulse_magnitude: f64,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self {
            velocity: DVec2::ZERO,
            acceleration: DVec2::ZERO,
            input_velocity: DVec2::ZERO,
            impulse_velocity: DVec2::ZERO,
            inverted_mass: 1.0,
            elasticity_coefficient: 1.0,
            speed: 500.0,
            deceleration_speed: 5.0,
            min_collision_impulse_magnitude: 1.0,
        }
    }
}

impl RigidBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one fixed step and return the displacement to apply to the shape.
    pub fn apply_movement_forces(&mut self, dt: f64) -> DVec2 {
        let retention = (1.0 - self.deceleration_speed * dt).clamp(0.0, 1.0);

        if self.impulse_velocity.length() < self.min_collision_impulse_magnitude {
            self.impulse_velocity = DVec2::ZERO;
        }

        if self.acceleration != DVec2::ZERO {
            self.input_velocity += self.acceleration * dt;
        } else {
            // No steering: coast to a stop
            self.input_velocity *= retention;
        }
        self.input_velocity = self.input_velocity.clamp_length_max(self.speed);

        // Steering can never exceed the cap; a stronger impulse may
        let cap = self.speed.max(self.impulse_velocity.length());
        self.velocity = (self.input_velocity + self.impulse_velocity).clamp_length_max(cap);

        self.impulse_velocity *= retention;
        self.velocity * dt
    }

    /// Accumulate externally injected momentum
    pub fn add_impulse_velocity(&mut self, impulse: DVec2) {
        self.impulse_velocity += impulse;
    }

    /// Drop steering intent (acceleration and input velocity), keeping impulses
    pub fn halt(&mut self) {
        self.acceleration = DVec2::ZERO;
        self.input_velocity = DVec2::ZERO;
    }

    #[inline]
    pub fn is_immovable(&self) -> bool {
        self.inverted_mass == 0.0
    }

    #[inline]
    pub fn velocity(&self) -> DVec2 {
        self.velocity
    }

    #[inline]
    pub fn acceleration(&self) -> DVec2 {
        self.acceleration
    }

    #[inline]
    pub fn input_velocity(&self) -> DVec2 {
        self.input_velocity
    }

    #[inline]
    pub fn impulse_velocity(&self) -> DVec2 {
        self.impulse_velocity
    }

    #[inline]
    pub fn inverted_mass(&self) -> f64 {
        self.inverted_mass
    }

    #[inline]
    pub fn elasticity_coefficient(&self) -> f64 {
        self.elasticity_coefficient
    }

    #[inline]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    #[inline]
    pub fn deceleration_speed(&self) -> f64 {
        self.deceleration_speed
    }

    #[inline]
    pub fn min_collision_impulse_magnitude(&self) -> f64 {
        self.min_collision_impulse_magnitude
    }

    pub fn set_acceleration(&mut self, acceleration: DVec2) {
        self.acceleration = acceleration;
    }

    pub fn set_input_velocity(&mut self, velocity: DVec2) {
        self.input_velocity = velocity;
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed.max(0.0);
    }

    pub fn set_inverted_mass(&mut self, inverted_mass: f64) {
        self.inverted_mass = inverted_mass.max(0.0);
    }

    pub fn set_elasticity_coefficient(&mut self, elasticity: f64) {
        self.elasticity_coefficient = elasticity.clamp(0.0, 1.0);
    }

    pub fn set_deceleration_speed(&mut self, deceleration: f64) {
        self.deceleration_speed = deceleration.max(0.0);
    }

    pub fn set_min_collision_impulse_magnitude(&mut self, magnitude: f64) {
        self.min_collision_impulse_magnitude = magnitude.max(0.0);
    }
}
