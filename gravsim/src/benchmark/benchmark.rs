use std::time::Instant;

use crate::configuration::config::{CollisionModel, IntegratorType};
use crate::error::Result;
use crate::simulation::engine::Engine;
use crate::simulation::forces::{Acceleration, NewtonianGravity};
use crate::simulation::params::Parameters;
use crate::simulation::states::{Body, NVec3};

/// Helper to build `n` unit-mass bodies on a deterministic pseudo-random cloud
fn make_bodies(n: usize) -> Vec<Body> {
    let mut bodies = Vec::with_capacity(n);

    for i in 0..n {
        let i_f = i as f64;
        // deterministic positions, no rand needed
        let x = NVec3::new(
            (i_f * 0.37).sin() * 5.0,
            (i_f * 0.13).cos() * 5.0,
            (i_f * 0.07).sin() * 5.0,
        );
        if let Ok(b) = Body::new(i as u64, format!("p{i}"), 1.0, x, NVec3::zeros(), 0.01, "white") {
            bodies.push(b);
        }
    }
    bodies
}

/// Helper to build an engine holding `n` bodies
fn make_engine(n: usize, integrator: IntegratorType) -> Result<Engine> {
    let mut engine = Engine::with_parameters(Parameters {
        g: 0.1,
        dt: 0.001,
        integrator,
        collision: CollisionModel::Ignore,
        seed: 42,
    })?;

    for b in make_bodies(n) {
        engine.add_body_instance(b);
    }
    engine.compute_accelerations();
    Ok(engine)
}

/// Time one direct force evaluation for growing n
pub fn bench_gravity() {
    let ns = [50, 100, 200, 400, 800, 1600];
    let gravity = NewtonianGravity::new(0.1);

    for n in ns {
        let mut bodies = make_bodies(n);

        // Warm up
        gravity.accumulate_accels(&mut bodies);

        let t0 = Instant::now();
        gravity.accumulate_accels(&mut bodies);
        let dt_direct = t0.elapsed().as_secs_f64();

        println!("N = {n:5}, direct = {:8.6} s", dt_direct);
    }
}

/// Per-step cost of Verlet vs RK4, as CSV
/// Paste output directly into a spreadsheet to graph
pub fn bench_integrators() -> Result<()> {
    println!("N,verlet_ms,rk4_ms");

    for n in (50..=800).step_by(50) {
        // Small n: average over a few steps to smooth noise
        let steps = if n <= 200 { 10 } else { 2 };

        let mut verlet = make_engine(n, IntegratorType::Verlet)?;
        let t0 = Instant::now();
        for _ in 0..steps {
            verlet.simulation_step();
        }
        let ms_verlet = t0.elapsed().as_secs_f64() * 1000.0 / steps as f64;

        let mut rk4 = make_engine(n, IntegratorType::Rk4)?;
        let t1 = Instant::now();
        for _ in 0..steps {
            rk4.simulation_step();
        }
        let ms_rk4 = t1.elapsed().as_secs_f64() * 1000.0 / steps as f64;

        println!("{},{:.6},{:.6}", n, ms_verlet, ms_rk4);
    }
    Ok(())
}
