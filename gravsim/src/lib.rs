pub mod error;
pub mod simulation;
pub mod configuration;
pub mod export;
pub mod benchmark;

pub use error::{Result, SimError};

pub use simulation::states::{radius_from_mass, Body, BodyId, BodyRecord, NVec3, PointMass, Trail};
pub use simulation::params::Parameters;
pub use simulation::engine::{CenterOfMass, Engine, SystemEnergy};
pub use simulation::forces::{Acceleration, NewtonianGravity};
pub use simulation::integrator::{rk4_integrator, verlet_integrator};
pub use simulation::collisions::{resolve_elastic, resolve_merge};
pub use simulation::scenario::{earth_moon_config, Scenario};
pub use simulation::precalc::{precalculate, Frame, Trajectory};

pub use configuration::config::{CollisionModel, EngineConfig, IntegratorType, ParametersConfig, ScenarioConfig};

pub use export::csv::{read_bodies_csv, write_trajectory_csv};

pub use benchmark::benchmark::{bench_gravity, bench_integrators};
