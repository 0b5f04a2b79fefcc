//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces a runtime `Scenario`:
//! - the engine (parameters + bodies at t = 0, accelerations evaluated)
//! - the initial body records, kept so the run can be reset
//! - the batch run length
//!
//! Also provides the built-in Earth-Moon preset

use log::info;

use crate::configuration::config::{
    CollisionModel, EngineConfig, IntegratorType, ParametersConfig, ScenarioConfig,
};
use crate::error::{Result, SimError};
use crate::simulation::engine::Engine;
use crate::simulation::params::Parameters;
use crate::simulation::states::{Body, BodyRecord};

const EARTH_MASS: f64 = 5.972e24;
const MOON_MASS: f64 = 7.348e22;
const EARTH_MOON_DISTANCE: f64 = 3.844e8;
const EARTH_RADIUS: f64 = 6.371e6;
const MOON_RADIUS: f64 = 1.737e6;
const HOUR: f64 = 3600.0;
const DAY: f64 = 24.0 * HOUR;

pub struct Scenario {
    pub engine: Engine,
    pub initial_bodies: Vec<BodyRecord>,
    pub total_time: f64,
}

impl Scenario {
    /// Validate the config and build the engine from it. Fails on the first
    /// invalid parameter or body; no partially built scenario is returned.
    pub fn build(cfg: ScenarioConfig) -> Result<Self> {
        let p_cfg = cfg.parameters;
        if !(p_cfg.total_time > 0.0 && p_cfg.total_time.is_finite()) {
            return Err(SimError::NonPositiveDuration(p_cfg.total_time));
        }

        let parameters = Parameters {
            g: p_cfg.G,
            dt: p_cfg.dt,
            integrator: cfg.engine.integrator,
            collision: cfg.engine.collision_model,
            seed: p_cfg.seed,
        };
        let engine = Engine::with_parameters(parameters)?;

        // Validate every record before touching the engine
        for record in &cfg.bodies {
            Body::from_record(record)?;
        }

        let mut scenario = Self {
            engine,
            initial_bodies: cfg.bodies,
            total_time: p_cfg.total_time,
        };
        scenario.reset()?;

        info!(
            "scenario ready: {} bodies, G = {:e}, dt = {} s, {} / {}",
            scenario.engine.active_count(),
            scenario.engine.g(),
            scenario.engine.dt(),
            scenario.engine.integrator_type(),
            scenario.engine.collision_model(),
        );
        Ok(scenario)
    }

    /// Back to the initial configuration: clear the engine, re-seed the
    /// initial bodies, zero time and trails, and evaluate accelerations.
    pub fn reset(&mut self) -> Result<()> {
        self.engine.clear_bodies();
        for record in &self.initial_bodies {
            let body = Body::from_record(record)?;
            self.engine.add_body_instance(body);
        }
        self.engine.reset_time_and_trails();
        self.engine.compute_accelerations();
        Ok(())
    }

    /// Saveable form: current settings plus the initial bodies
    pub fn to_config(&self) -> ScenarioConfig {
        ScenarioConfig {
            engine: EngineConfig {
                integrator: self.engine.integrator_type(),
                collision_model: self.engine.collision_model(),
            },
            parameters: ParametersConfig {
                G: self.engine.g(),
                dt: self.engine.dt(),
                total_time: self.total_time,
                seed: self.engine.parameters().seed,
            },
            bodies: self.initial_bodies.clone(),
        }
    }

    /// Earth and Moon on circular orbits about their common centre of mass,
    /// one hour steps over sixty days
    pub fn earth_moon(g: f64) -> Result<Self> {
        Self::build(earth_moon_config(g))
    }
}

/// Config of the Earth-Moon preset. `g` scales the orbital speeds.
pub fn earth_moon_config(g: f64) -> ScenarioConfig {
    let m_total = EARTH_MASS + MOON_MASS;
    let r_earth = MOON_MASS / m_total * EARTH_MOON_DISTANCE;
    let r_moon = EARTH_MASS / m_total * EARTH_MOON_DISTANCE;

    // ω of a circular two-body orbit; NaN for a bad g is rejected by build()
    let omega = (g * m_total / EARTH_MOON_DISTANCE.powi(3)).sqrt();

    let earth = BodyRecord {
        id: 0,
        name: "Earth".to_string(),
        mass: EARTH_MASS,
        position: vec![-r_earth, 0.0, 0.0],
        velocity: vec![0.0, omega * r_earth, 0.0],
        radius: EARTH_RADIUS,
        color: "deepskyblue".to_string(),
    };
    let moon = BodyRecord {
        id: 1,
        name: "Moon".to_string(),
        mass: MOON_MASS,
        position: vec![r_moon, 0.0, 0.0],
        velocity: vec![0.0, -omega * r_moon, 0.0],
        radius: MOON_RADIUS,
        color: "lightgrey".to_string(),
    };

    ScenarioConfig {
        engine: EngineConfig {
            integrator: IntegratorType::Rk4,
            collision_model: CollisionModel::Ignore,
        },
        parameters: ParametersConfig {
            G: g,
            dt: HOUR,
            total_time: 60.0 * DAY,
            seed: 42,
        },
        bodies: vec![earth, moon],
    }
}
