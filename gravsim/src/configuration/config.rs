//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde` representation of a scenario:
//!
//! - [`EngineConfig`]     – integrator and collision policy
//! - [`ParametersConfig`] – physical constants, step size and batch length
//! - [`BodyRecord`]       – initial state of each body
//! - [`ScenarioConfig`]   – top-level wrapper read from and written to YAML
//!
//! # YAML format
//!
//! ```yaml
//! engine:
//!   integrator: rk4           # or verlet
//!   collision_model: merge    # or ignore, elastic
//!
//! parameters:
//!   G: 6.674e-11              # gravitational constant
//!   dt: 3600.0                # fixed step size (s)
//!   total_time: 5184000.0     # batch pre-calculation length (s)
//!   seed: 42                  # jitter seed, optional
//!
//! bodies:
//!   - id: 0
//!     name: Earth
//!     mass: 5.972e24
//!     position: [-4.67e6, 0.0, 0.0]
//!     velocity: [0.0, -12.4, 0.0]
//!     radius: 6.371e6
//!     color: deepskyblue
//! ```

use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::simulation::states::BodyRecord;

/// Which integrator advances the bodies
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegratorType {
    #[serde(rename = "verlet")] // velocity Verlet, symplectic, two force evaluations per step
    Verlet,

    #[default]
    #[serde(rename = "rk4")] // classical RK4 per body against a frozen background
    Rk4,
}

impl fmt::Display for IntegratorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegratorType::Verlet => write!(f, "verlet"),
            IntegratorType::Rk4 => write!(f, "rk4"),
        }
    }
}

impl FromStr for IntegratorType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "verlet" => Ok(IntegratorType::Verlet),
            "rk4" => Ok(IntegratorType::Rk4),
            other => Err(format!("unknown integrator '{other}', expected verlet or rk4")),
        }
    }
}

/// What happens when two bodies overlap
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionModel {
    #[default]
    #[serde(rename = "ignore")]
    Ignore,

    #[serde(rename = "elastic")]
    Elastic,

    #[serde(rename = "merge")]
    Merge,
}

impl fmt::Display for CollisionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollisionModel::Ignore => write!(f, "ignore"),
            CollisionModel::Elastic => write!(f, "elastic"),
            CollisionModel::Merge => write!(f, "merge"),
        }
    }
}

impl FromStr for CollisionModel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(CollisionModel::Ignore),
            "elastic" => Ok(CollisionModel::Elastic),
            "merge" => Ok(CollisionModel::Merge),
            other => Err(format!(
                "unknown collision model '{other}', expected ignore, elastic or merge"
            )),
        }
    }
}

/// Engine-level configuration
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub integrator: IntegratorType,
    #[serde(default)]
    pub collision_model: CollisionModel,
}

/// Global numerical and physical parameters for a scenario
#[allow(non_snake_case)]
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ParametersConfig {
    pub G: f64,          // gravitational constant
    pub dt: f64,         // time step size
    pub total_time: f64, // length of a batch run
    #[serde(default = "default_seed")]
    pub seed: u64,       // seed for the collision jitter, makes runs reproducible
}

fn default_seed() -> u64 {
    42
}

/// Top-level scenario configuration
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    pub parameters: ParametersConfig,
    #[serde(default)]
    pub bodies: Vec<BodyRecord>,
}

impl ScenarioConfig {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_yaml::from_reader(reader)?)
    }

    pub fn from_yaml_str(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
