//! Error types for gravsim.
//!
//! Only construction and configuration can fail. Stepping the engine never
//! returns an error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("body '{name}': mass must be positive and finite, got {mass}")]
    NonPositiveMass { name: String, mass: f64 },

    #[error("body '{name}': radius must be positive and finite, got {radius}")]
    NonPositiveRadius { name: String, radius: f64 },

    #[error("body '{name}': {field} must have 3 components, got {len}")]
    BadArity {
        name: String,
        field: &'static str,
        len: usize,
    },

    #[error("gravitational constant must be positive, got {0}")]
    NonPositiveG(f64),

    #[error("time step must be positive, got {0}")]
    NonPositiveTimeStep(f64),

    #[error("total simulation time must be positive, got {0}")]
    NonPositiveDuration(f64),

    #[error("total simulation time {total} is shorter than one step of {dt}")]
    DurationTooShort { total: f64, dt: f64 },

    #[error("{steps} steps requested, at most {max} can be pre-calculated")]
    TooManySteps { steps: f64, max: usize },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
