//! Batch pre-calculation of a whole trajectory
//!
//! Runs the engine in a tight loop and keeps one `Frame` per step, so a
//! viewer or exporter can replay the run without stepping the engine again.

use log::info;

use crate::error::{Result, SimError};
use crate::simulation::engine::{Engine, SystemEnergy};
use crate::simulation::params::MAX_PRECALC_STEPS;
use crate::simulation::states::BodyRecord;

/// Snapshot of the active bodies right after one step
#[derive(Debug, Clone)]
pub struct Frame {
    pub time: f64,
    pub bodies: Vec<BodyRecord>,
    pub energy: SystemEnergy,
}

#[derive(Debug, Clone, Default)]
pub struct Trajectory {
    pub initial_energy: Option<SystemEnergy>,
    pub frames: Vec<Frame>,
}

impl Trajectory {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// (time, total energy) series, starting with the t = 0 sample
    pub fn energy_series(&self) -> Vec<(f64, f64)> {
        let mut series = Vec::with_capacity(self.frames.len() + 1);
        if let Some(e0) = self.initial_energy {
            series.push((0.0, e0.total));
        }
        series.extend(self.frames.iter().map(|f| (f.time, f.energy.total)));
        series
    }

    /// Relative change of total energy from the first to the last sample,
    /// in percent. `None` for fewer than two samples or a near-zero E_0.
    pub fn energy_drift_percent(&self) -> Option<f64> {
        let series = self.energy_series();
        if series.len() < 2 {
            return None;
        }
        let e0 = series[0].1;
        let e1 = series[series.len() - 1].1;
        if e0.abs() <= 1e-9 {
            return None;
        }
        Some((e1 - e0) / e0 * 100.0)
    }
}

/// Run `floor(total_time / dt)` steps and record every one of them.
/// Runs longer than `MAX_PRECALC_STEPS` are refused.
///
/// The engine is stepped from its current state; reset it first to start
/// from the initial configuration.
pub fn precalculate(engine: &mut Engine, total_time: f64) -> Result<Trajectory> {
    let dt = engine.dt();
    if !(total_time > 0.0) {
        return Err(SimError::NonPositiveDuration(total_time));
    }
    if !(dt > 0.0) {
        return Err(SimError::NonPositiveTimeStep(dt));
    }
    let steps = (total_time / dt).floor();
    if steps < 1.0 {
        return Err(SimError::DurationTooShort { total: total_time, dt });
    }
    if !(steps <= MAX_PRECALC_STEPS as f64) {
        return Err(SimError::TooManySteps { steps, max: MAX_PRECALC_STEPS });
    }
    let total_steps = steps as usize;

    engine.compute_accelerations();

    let mut trajectory = Trajectory {
        initial_energy: (engine.active_count() > 0).then(|| engine.system_energy()),
        frames: Vec::new(),
    };

    let report_every = (total_steps / 20).max(1);
    for step in 0..total_steps {
        engine.simulation_step();

        trajectory.frames.push(Frame {
            time: engine.time_elapsed(),
            bodies: engine.active_bodies().map(|b| b.to_record()).collect(),
            energy: engine.system_energy(),
        });

        if step % report_every == 0 {
            info!(
                "pre-calculating: {:.0}% ({} / {} steps)",
                step as f64 * 100.0 / total_steps as f64,
                step,
                total_steps
            );
        }
    }

    info!("pre-calculation done: {} frames", trajectory.len());
    Ok(trajectory)
}
