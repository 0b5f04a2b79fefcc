//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds the runtime settings of one engine:
//! - gravitational constant `g` and fixed step size `dt`,
//! - integrator and collision policy,
//! - seed for the collision jitter RNG
//!
//! The near-zero thresholds below are tuned for SI, astronomical-scale units.
//! Retune them together when switching to another unit system.

use crate::configuration::config::{CollisionModel, IntegratorType};

/// Pairs with squared separation below this are treated as coincident and
/// contribute no force (units²)
pub const MIN_SEPARATION_SQ: f64 = 1e-18;

/// Linear distance at or below which two bodies count as coincident.
/// Used by the potential energy sum and the elastic resolver.
pub const COINCIDENT_DISTANCE: f64 = 1e-9;

/// Overlap correction is scaled by this so the pair does not re-trigger next step
pub const SEPARATION_OVERSHOOT: f64 = 1.01;

/// Max jitter applied to coincident bodies, as a fraction of each radius
pub const JITTER_FRACTION: f64 = 0.1;

/// Max number of samples kept in a body trail
pub const TRAIL_CAPACITY: usize = 1000;

/// Centre of mass queries below this total mass fall back to the origin
pub const MIN_TOTAL_MASS: f64 = 1e-18;

/// Upper bound on the number of steps a batch pre-calculation may record
pub const MAX_PRECALC_STEPS: usize = 10_000_000;

/// Bulk density used to size bodies that come without a radius (kg/m³)
pub const ASSUMED_DENSITY: f64 = 5510.0;

/// Newtonian gravitational constant (SI)
pub const G_SI: f64 = 6.674e-11;

#[derive(Debug, Clone)]
pub struct Parameters {
    pub g: f64,  // gravitational constant
    pub dt: f64, // step size in seconds
    pub integrator: IntegratorType,
    pub collision: CollisionModel,
    pub seed: u64, // deterministic seed for collision jitter
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            g: G_SI,
            dt: 3600.0,
            integrator: IntegratorType::Rk4,
            collision: CollisionModel::Ignore,
            seed: 42,
        }
    }
}
