//! The simulation engine
//!
//! Owns the body arena, the parameters and the elapsed time, and runs one
//! discrete step at a time:
//! trail recording -> integration -> collision handling -> time bookkeeping.
//!
//! The engine is single-threaded and not reentrant; `simulation_step` takes
//! `&mut self`, so callers serialise access by construction.

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::configuration::config::{CollisionModel, IntegratorType};
use crate::error::{Result, SimError};
use crate::simulation::collisions::{resolve_elastic, resolve_merge};
use crate::simulation::forces::{Acceleration, NewtonianGravity};
use crate::simulation::integrator::{rk4_integrator, verlet_integrator};
use crate::simulation::params::{Parameters, MIN_TOTAL_MASS};
use crate::simulation::states::{Body, BodyId, NVec3};

/// Kinetic, potential and total energy of the active bodies
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SystemEnergy {
    pub kinetic: f64,
    pub potential: f64,
    pub total: f64,
}

/// Mass-weighted mean position and velocity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CenterOfMass {
    pub x: NVec3,
    pub v: NVec3,
}

impl CenterOfMass {
    fn origin() -> Self {
        Self {
            x: NVec3::zeros(),
            v: NVec3::zeros(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Engine {
    bodies: Vec<Body>,
    parameters: Parameters,
    time_elapsed: f64,
    next_body_id: BodyId,
    rng: StdRng,
    // stored accelerations no longer match the configuration
    accels_stale: bool,
}

impl Default for Engine {
    fn default() -> Self {
        Self::from_parameters(Parameters::default())
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an engine with the given parameters, rejecting G <= 0 or dt <= 0
    pub fn with_parameters(parameters: Parameters) -> Result<Self> {
        validate_g(parameters.g)?;
        validate_dt(parameters.dt)?;
        Ok(Self::from_parameters(parameters))
    }

    fn from_parameters(parameters: Parameters) -> Self {
        Self {
            bodies: Vec::new(),
            rng: StdRng::seed_from_u64(parameters.seed),
            parameters,
            time_elapsed: 0.0,
            next_body_id: 0,
            accels_stale: true,
        }
    }

    // ---------------------------------------------------------------------
    // configuration
    // ---------------------------------------------------------------------

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn g(&self) -> f64 {
        self.parameters.g
    }

    pub fn set_g(&mut self, g: f64) -> Result<()> {
        validate_g(g)?;
        self.parameters.g = g;
        self.accels_stale = true;
        Ok(())
    }

    pub fn dt(&self) -> f64 {
        self.parameters.dt
    }

    pub fn set_dt(&mut self, dt: f64) -> Result<()> {
        validate_dt(dt)?;
        self.parameters.dt = dt;
        Ok(())
    }

    pub fn integrator_type(&self) -> IntegratorType {
        self.parameters.integrator
    }

    pub fn set_integrator_type(&mut self, integrator: IntegratorType) {
        self.parameters.integrator = integrator;
    }

    pub fn collision_model(&self) -> CollisionModel {
        self.parameters.collision
    }

    pub fn set_collision_model(&mut self, collision: CollisionModel) {
        self.parameters.collision = collision;
    }

    /// Reseed the jitter RNG
    pub fn set_seed(&mut self, seed: u64) {
        self.parameters.seed = seed;
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn time_elapsed(&self) -> f64 {
        self.time_elapsed
    }

    pub fn next_body_id(&self) -> BodyId {
        self.next_body_id
    }

    fn gravity(&self) -> NewtonianGravity {
        NewtonianGravity::new(self.parameters.g)
    }

    // ---------------------------------------------------------------------
    // body management
    // ---------------------------------------------------------------------

    /// Create a body with a fresh id and add it. Returns the id.
    /// On a validation error nothing is added and the id is not consumed.
    pub fn add_new_body(
        &mut self,
        name: impl Into<String>,
        mass: f64,
        position: NVec3,
        velocity: NVec3,
        radius: f64,
        color: impl Into<String>,
    ) -> Result<BodyId> {
        let body = Body::new(self.next_body_id, name, mass, position, velocity, radius, color)?;
        let id = body.id;
        self.bodies.push(body);
        self.next_body_id = self.next_body_id.saturating_add(1);
        self.accels_stale = true;
        Ok(id)
    }

    /// Attach an externally built body. If its id is already taken it gets a
    /// fresh one. Returns the id the body ends up with.
    pub fn add_body_instance(&mut self, mut body: Body) -> BodyId {
        // The last id is reserved so the counter can always move past it
        if body.id == BodyId::MAX || self.bodies.iter().any(|b| b.id == body.id) {
            debug!(
                "body id {} unavailable, reassigning '{}' to {}",
                body.id, body.name, self.next_body_id
            );
            body.id = self.next_body_id;
        }
        if let Some(after) = body.id.checked_add(1) {
            self.next_body_id = self.next_body_id.max(after);
        }
        let id = body.id;
        self.bodies.push(body);
        self.accels_stale = true;
        id
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.iter().find(|b| b.id == id)
    }

    /// Mutable lookup. Stored accelerations are refreshed before the next step.
    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        let body = self.bodies.iter_mut().find(|b| b.id == id)?;
        self.accels_stale = true;
        Some(body)
    }

    /// Lookup by a textual id, as typed by a user. Unparsable ids are a miss.
    pub fn find_body(&self, key: &str) -> Option<&Body> {
        let id = key.trim().parse::<BodyId>().ok()?;
        self.body(id)
    }

    /// Remove every body and restart the id sequence at zero
    pub fn clear_bodies(&mut self) {
        self.bodies.clear();
        self.next_body_id = 0;
        self.accels_stale = true;
    }

    /// Every body in the arena, merged ones included
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn active_bodies(&self) -> impl Iterator<Item = &Body> {
        self.bodies.iter().filter(|b| b.is_active())
    }

    pub fn active_count(&self) -> usize {
        self.active_bodies().count()
    }

    // ---------------------------------------------------------------------
    // stepping
    // ---------------------------------------------------------------------

    /// Evaluate accelerations for the current configuration
    pub fn compute_accelerations(&mut self) {
        let gravity = self.gravity();
        gravity.accumulate_accels(&mut self.bodies);
        self.accels_stale = false;
    }

    /// Advance the system by one `dt`. Does nothing without active bodies.
    pub fn simulation_step(&mut self) {
        if self.active_count() == 0 {
            return;
        }
        if self.accels_stale {
            self.compute_accelerations();
        }

        for b in self.bodies.iter_mut().filter(|b| b.is_active()) {
            b.record_trail();
        }

        let gravity = self.gravity();
        let dt = self.parameters.dt;
        match self.parameters.integrator {
            IntegratorType::Verlet => verlet_integrator(&mut self.bodies, &gravity, dt),
            IntegratorType::Rk4 => rk4_integrator(&mut self.bodies, &gravity, dt),
        }

        match self.parameters.collision {
            CollisionModel::Ignore => {}
            CollisionModel::Elastic => {
                // positions may have moved, a(t) has to be re-evaluated
                if resolve_elastic(&mut self.bodies, &mut self.rng) > 0 {
                    self.accels_stale = true;
                }
            }
            CollisionModel::Merge => {
                let merges = resolve_merge(&mut self.bodies, &mut self.next_body_id);
                if merges > 0 {
                    debug!("{merges} merge(s) at t = {}", self.time_elapsed + dt);
                    gravity.accumulate_accels(&mut self.bodies);
                }
            }
        }

        self.time_elapsed += dt;
    }

    /// Zero the clock, empty every trail and clear every merged flag.
    /// Mass, position and velocity are left as they are.
    pub fn reset_time_and_trails(&mut self) {
        self.time_elapsed = 0.0;
        for b in self.bodies.iter_mut() {
            b.trail.clear();
            b.merged = false;
        }
        self.accels_stale = true;
    }

    // ---------------------------------------------------------------------
    // queries
    // ---------------------------------------------------------------------

    pub fn system_energy(&self) -> SystemEnergy {
        let kinetic: f64 = self.active_bodies().map(Body::kinetic_energy).sum();
        let potential = self.gravity().potential_energy(&self.bodies);
        SystemEnergy {
            kinetic,
            potential,
            total: kinetic + potential,
        }
    }

    /// Centre of mass of all active bodies, or of the active bodies among
    /// `ids` when given. Unknown ids are ignored. Falls back to the origin at
    /// rest when nothing (or no mass) is selected.
    pub fn center_of_mass(&self, ids: Option<&[BodyId]>) -> CenterOfMass {
        let selected: Vec<&Body> = match ids {
            None => self.active_bodies().collect(),
            Some(ids) => ids
                .iter()
                .filter_map(|id| self.body(*id))
                .filter(|b| b.is_active())
                .collect(),
        };

        let total_mass: f64 = selected.iter().map(|b| b.m).sum();
        if selected.is_empty() || total_mass.abs() < MIN_TOTAL_MASS {
            return CenterOfMass::origin();
        }

        let x = selected.iter().fold(NVec3::zeros(), |acc, b| acc + b.m * b.x) / total_mass;
        let v = selected.iter().fold(NVec3::zeros(), |acc, b| acc + b.momentum()) / total_mass;
        CenterOfMass { x, v }
    }
}

fn validate_g(g: f64) -> Result<()> {
    if g > 0.0 && g.is_finite() {
        Ok(())
    } else {
        warn!("rejected gravitational constant {g}");
        Err(SimError::NonPositiveG(g))
    }
}

fn validate_dt(dt: f64) -> Result<()> {
    if dt > 0.0 && dt.is_finite() {
        Ok(())
    } else {
        warn!("rejected time step {dt}");
        Err(SimError::NonPositiveTimeStep(dt))
    }
}
