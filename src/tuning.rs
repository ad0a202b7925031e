//! Physical tuning for every archetype
//!
//! Loaded from JSON; any missing field falls back to the shipped value.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::physics::{ResponseClearing, RigidBody};

/// Errors raised while loading tuning data
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read
    Io(std::io::Error),
    /// The JSON is malformed or has the wrong shape
    Parse(serde_json::Error),
    /// The JSON parsed but a value is out of range
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read tuning: {}", e),
            ConfigError::Parse(e) => write!(f, "failed to parse tuning: {}", e),
            ConfigError::Invalid(msg) => write!(f, "invalid tuning: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Rigid-body constants for one archetype
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyTuning {
    /// Fraction of collision energy returned (0 - 1)
    pub elasticity: f64,
    /// 1/mass; zero is immovable
    pub inverted_mass: f64,
    /// Steering cap, or launch speed for projectiles
    pub speed: f64,
    /// Fraction of residual velocity lost per second
    pub deceleration: f64,
    /// Impulses weaker than this are dropped
    pub min_collision_impulse: f64,
}

impl Default for BodyTuning {
    fn default() -> Self {
        Self {
            elasticity: 1.0,
            inverted_mass: 1.0,
            speed: 500.0,
            deceleration: 5.0,
            min_collision_impulse: 1.0,
        }
    }
}

impl BodyTuning {
    fn projectile(speed: f64) -> Self {
        Self {
            elasticity: 1.0,
            inverted_mass: 0.9,
            speed,
            deceleration: 0.0,
            ..Self::default()
        }
    }

    fn check(&self, name: &str) -> Result<(), ConfigError> {
        let invalid = |what: &str, value: f64| {
            Err(ConfigError::Invalid(format!("{}.{} = {}", name, what, value)))
        };
        if !(0.0..=1.0).contains(&self.elasticity) {
            return invalid("elasticity", self.elasticity);
        }
        for (what, value) in [
            ("inverted_mass", self.inverted_mass),
            ("speed", self.speed),
            ("deceleration", self.deceleration),
            ("min_collision_impulse", self.min_collision_impulse),
        ] {
            if !value.is_finite() || value < 0.0 {
                return invalid(what, value);
            }
        }
        Ok(())
    }
}

impl From<&BodyTuning> for RigidBody {
    fn from(tuning: &BodyTuning) -> Self {
        let mut body = RigidBody::new();
        body.set_elasticity_coefficient(tuning.elasticity);
        body.set_inverted_mass(tuning.inverted_mass);
        body.set_speed(tuning.speed);
        body.set_deceleration_speed(tuning.deceleration);
        body.set_min_collision_impulse_magnitude(tuning.min_collision_impulse);
        body
    }
}

/// Item drop chances, in percent, rolled once per destroyed enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropRates {
    pub bounce: u32,
    pub health: u32,
}

impl Default for DropRates {
    fn default() -> Self {
        Self {
            bounce: 10,
            health: 15,
        }
    }
}

/// Complete physical tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Bodies ===
    pub player: BodyTuning,
    pub rhombus: BodyTuning,
    pub square: BodyTuning,
    pub hexagon: BodyTuning,
    pub basic_shot: BodyTuning,
    pub bounce_shot: BodyTuning,
    pub enemy_shot: BodyTuning,
    pub hex_beam: BodyTuning,
    /// Shared body behind every wall
    pub environment: BodyTuning,

    // === Collision ===
    /// Who clears collision responses between passes
    pub clearing: ResponseClearing,

    // === Items ===
    pub drops: DropRates,
    /// Seed for every random roll in the world
    pub seed: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player: BodyTuning {
                elasticity: 0.4,
                speed: 800.0,
                ..BodyTuning::default()
            },
            rhombus: BodyTuning {
                elasticity: 0.85,
                inverted_mass: 1.0 / 10.0,
                speed: 300.0,
                min_collision_impulse: 500.0,
                ..BodyTuning::default()
            },
            square: BodyTuning {
                elasticity: 0.0,
                inverted_mass: 0.0,
                speed: 1400.0,
                ..BodyTuning::default()
            },
            hexagon: BodyTuning {
                elasticity: 0.0,
                inverted_mass: 1.0 / 50.0,
                speed: 1700.0,
                ..BodyTuning::default()
            },
            basic_shot: BodyTuning::projectile(1200.0),
            bounce_shot: BodyTuning::projectile(1200.0),
            enemy_shot: BodyTuning::projectile(1200.0),
            hex_beam: BodyTuning {
                elasticity: 0.0,
                inverted_mass: 0.1,
                ..BodyTuning::projectile(300.0)
            },
            environment: BodyTuning {
                elasticity: 0.0,
                inverted_mass: 0.0,
                speed: 0.0,
                ..BodyTuning::default()
            },
            clearing: ResponseClearing::ConsumerDriven,
            drops: DropRates::default(),
            seed: 0x5EED,
        }
    }
}

impl Tuning {
    /// Parse and validate tuning JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Read, parse and validate a tuning file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.as_ref().display());
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, body) in self.bodies() {
            body.check(name)?;
        }
        let total = self.drops.bounce + self.drops.health;
        if total > 100 {
            return Err(ConfigError::Invalid(format!(
                "drop rates add up to {}%",
                total
            )));
        }
        Ok(())
    }

    /// Every body tuning with its field name
    pub fn bodies(&self) -> [(&'static str, &BodyTuning); 9] {
        [
            ("player", &self.player),
            ("rhombus", &self.rhombus),
            ("square", &self.square),
            ("hexagon", &self.hexagon),
            ("basic_shot", &self.basic_shot),
            ("bounce_shot", &self.bounce_shot),
            ("enemy_shot", &self.enemy_shot),
            ("hex_beam", &self.hex_beam),
            ("environment", &self.environment),
        ]
    }
}
