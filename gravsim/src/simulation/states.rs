//! Core state types for the gravity simulation.
//!
//! - `Body`: one point/sphere mass with its kinematic state, trail and merge flag
//! - `BodyRecord`: flat serializable form of a body (scenario files, exports)
//! - `Trail`: bounded history of past positions
//! - `PointMass`: frozen (position, mass) snapshot used as a gravity source

use std::collections::VecDeque;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::simulation::params::{ASSUMED_DENSITY, TRAIL_CAPACITY};

pub type NVec3 = Vector3<f64>;

/// Engine-assigned body identity
pub type BodyId = u64;

/// Rolling window of past positions, oldest first.
#[derive(Debug, Clone, Default)]
pub struct Trail {
    points: VecDeque<NVec3>,
}

impl Trail {
    pub fn new() -> Self {
        Self {
            points: VecDeque::with_capacity(TRAIL_CAPACITY),
        }
    }

    /// Append a sample, dropping the oldest one once the window is full
    pub fn push(&mut self, x: NVec3) {
        self.points.push_back(x);
        while self.points.len() > TRAIL_CAPACITY {
            self.points.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NVec3> {
        self.points.iter()
    }

    pub fn latest(&self) -> Option<&NVec3> {
        self.points.back()
    }
}

#[derive(Debug, Clone)]
pub struct Body {
    pub id: BodyId,
    pub name: String,
    pub x: NVec3,   // position
    pub v: NVec3,   // velocity
    pub a: NVec3,   // acceleration from the last force evaluation
    pub m: f64,     // mass
    pub radius: f64,
    pub color: String,
    pub trail: Trail,
    pub merged: bool, // absorbed by a merge, no longer part of the physics
}

impl Body {
    /// Build a body, rejecting non-positive mass or radius.
    /// Nothing is constructed on failure.
    pub fn new(
        id: BodyId,
        name: impl Into<String>,
        m: f64,
        x: NVec3,
        v: NVec3,
        radius: f64,
        color: impl Into<String>,
    ) -> Result<Self> {
        let name = name.into();
        if !(m > 0.0 && m.is_finite()) {
            return Err(SimError::NonPositiveMass { name, mass: m });
        }
        if !(radius > 0.0 && radius.is_finite()) {
            return Err(SimError::NonPositiveRadius { name, radius });
        }

        Ok(Self {
            id,
            name,
            x,
            v,
            a: NVec3::zeros(),
            m,
            radius,
            color: color.into(),
            trail: Trail::new(),
            merged: false,
        })
    }

    /// Rebuild a body from its flat record, validating vector arity as well
    pub fn from_record(record: &BodyRecord) -> Result<Self> {
        let x = vec3_from_slice(&record.name, "position", &record.position)?;
        let v = vec3_from_slice(&record.name, "velocity", &record.velocity)?;
        Self::new(
            record.id,
            record.name.clone(),
            record.mass,
            x,
            v,
            record.radius,
            record.color.clone(),
        )
    }

    pub fn to_record(&self) -> BodyRecord {
        BodyRecord {
            id: self.id,
            name: self.name.clone(),
            mass: self.m,
            position: self.x.iter().copied().collect(),
            velocity: self.v.iter().copied().collect(),
            radius: self.radius,
            color: self.color.clone(),
        }
    }

    pub fn is_active(&self) -> bool {
        !self.merged
    }

    pub fn momentum(&self) -> NVec3 {
        self.m * self.v
    }

    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.m * self.v.norm_squared()
    }

    /// Sample the current position into the trail
    pub fn record_trail(&mut self) {
        self.trail.push(self.x);
    }

    pub fn point_mass(&self) -> PointMass {
        PointMass {
            x: self.x,
            m: self.m,
        }
    }
}

impl TryFrom<&BodyRecord> for Body {
    type Error = SimError;

    fn try_from(record: &BodyRecord) -> Result<Self> {
        Body::from_record(record)
    }
}

/// Flat, serializable body description.
/// Unit of persistence for scenario files and trajectory frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyRecord {
    pub id: BodyId,
    pub name: String,
    pub mass: f64,
    #[serde(alias = "pos")]
    pub position: Vec<f64>,
    #[serde(alias = "vel")]
    pub velocity: Vec<f64>,
    pub radius: f64,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_color() -> String {
    "blue".to_string()
}

/// Radius of a uniform sphere of `mass` at `density`, never below 1 m.
/// Non-positive masses get the 1 m floor.
pub fn radius_from_mass(mass: f64, density: Option<f64>) -> f64 {
    if !(mass > 0.0) {
        return 1.0;
    }
    let volume = mass / density.unwrap_or(ASSUMED_DENSITY);
    (3.0 * volume / (4.0 * std::f64::consts::PI)).cbrt().max(1.0)
}

/// Position and mass of a gravity source, frozen at some instant
#[derive(Debug, Clone, Copy)]
pub struct PointMass {
    pub x: NVec3,
    pub m: f64,
}

fn vec3_from_slice(name: &str, field: &'static str, values: &[f64]) -> Result<NVec3> {
    match values {
        [x, y, z] => Ok(NVec3::new(*x, *y, *z)),
        _ => Err(SimError::BadArity {
            name: name.to_string(),
            field,
            len: values.len(),
        }),
    }
}
