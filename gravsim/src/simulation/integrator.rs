//! Fixed-step time integrators for the body arena
//!
//! Provides velocity-Verlet and a per-body RK4, both driven by an
//! [`Acceleration`] implementation and a fixed `dt`. Merged bodies are skipped.

use std::collections::HashMap;

use super::forces::Acceleration;
use super::states::{Body, BodyId, NVec3, PointMass};

/// Advance all active bodies by one step using velocity-Verlet.
///
/// Positions use the accelerations already stored on the bodies (a_n), so
/// those must be current before the first step. Velocities are corrected with
/// the average of a_n and the freshly evaluated a_n+1.
pub fn verlet_integrator<F: Acceleration>(bodies: &mut [Body], forces: &F, dt: f64) {
    if !bodies.iter().any(Body::is_active) { // no active bodies, return
        return;
    }
    let half_dt2 = 0.5 * dt * dt;

    // Drift: x_n+1 = x_n + dt v_n + (dt^2 / 2) a_n
    for b in bodies.iter_mut().filter(|b| b.is_active()) {
        b.x += dt * b.v + half_dt2 * b.a;
    }

    // a_n keyed by id, only bodies that existed before the force evaluation
    let a_old: HashMap<BodyId, NVec3> = bodies
        .iter()
        .filter(|b| b.is_active())
        .map(|b| (b.id, b.a))
        .collect();

    // a_n+1 from x_n+1
    forces.accumulate_accels(bodies);

    // Kick: v_n+1 = v_n + (dt / 2) (a_n + a_n+1)
    for b in bodies.iter_mut().filter(|b| b.is_active()) {
        if let Some(a0) = a_old.get(&b.id) {
            b.v += 0.5 * dt * (a0 + b.a);
        }
    }
}

/// Advance all active bodies by one step using classical RK4.
///
/// Each body is integrated on its own against a frozen snapshot of every
/// other active body taken at the start of the step; the background does not
/// move through the four stages. Accelerations are refreshed before and
/// after, so the next step's k1 matches the new configuration.
pub fn rk4_integrator<F: Acceleration>(bodies: &mut [Body], forces: &F, dt: f64) {
    if !bodies.iter().any(Body::is_active) {
        return;
    }

    // a(t) from the true current configuration, used as k1
    forces.accumulate_accels(bodies);

    // Frozen background: (index, position, mass) of every active body at t
    let frozen: Vec<(usize, PointMass)> = bodies
        .iter()
        .enumerate()
        .filter(|(_, b)| b.is_active())
        .map(|(i, b)| (i, b.point_mass()))
        .collect();

    let mut others: Vec<PointMass> = Vec::with_capacity(frozen.len());
    for (i, b) in bodies.iter_mut().enumerate() {
        if !b.is_active() {
            continue;
        }
        others.clear();
        others.extend(frozen.iter().filter(|(j, _)| *j != i).map(|(_, s)| *s));

        let (x, v) = rk4_body(b.x, b.v, b.a, forces, &others, dt);
        b.x = x;
        b.v = v;
    }

    // a(t + dt) for the next step
    forces.accumulate_accels(bodies);
}

/// One RK4 step for a single body. `a0` is the acceleration at `x`.
fn rk4_body<F: Acceleration>(
    x: NVec3,
    v: NVec3,
    a0: NVec3,
    forces: &F,
    sources: &[PointMass],
    dt: f64,
) -> (NVec3, NVec3) {
    let half_dt = 0.5 * dt;

    // k = (dx/dt, dv/dt)
    let k1_x = v;
    let k1_v = a0;

    let k2_x = v + half_dt * k1_v;
    let k2_v = forces.field_at(x + half_dt * k1_x, sources);

    let k3_x = v + half_dt * k2_v;
    let k3_v = forces.field_at(x + half_dt * k2_x, sources);

    let k4_x = v + dt * k3_v;
    let k4_v = forces.field_at(x + dt * k3_x, sources);

    let sixth_dt = dt / 6.0;
    let x_new = x + sixth_dt * (k1_x + 2.0 * k2_x + 2.0 * k3_x + k4_x);
    let v_new = v + sixth_dt * (k1_v + 2.0 * k2_v + 2.0 * k3_v + k4_v);
    (x_new, v_new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::forces::NewtonianGravity;

    #[test]
    fn rk4_body_without_sources_is_exact_drift() {
        let gravity = NewtonianGravity::new(1.0);
        let x = NVec3::new(1.0, 2.0, 3.0);
        let v = NVec3::new(0.5, -0.25, 0.0);

        let (x1, v1) = rk4_body(x, v, NVec3::zeros(), &gravity, &[], 0.1);

        assert!((x1 - (x + 0.1 * v)).norm() < 1e-15);
        assert_eq!(v1, v);
    }

    #[test]
    fn rk4_body_in_uniform_pull_matches_free_fall() {
        // A far-away heavy source acts like a uniform field over one short step
        let gravity = NewtonianGravity::new(1.0);
        let source = PointMass {
            x: NVec3::new(0.0, -1.0e6, 0.0),
            m: 1.0e12,
        };
        let x = NVec3::zeros();
        let v = NVec3::new(1.0, 0.0, 0.0);
        let a0 = gravity.field_at(x, &[source]);
        let dt = 0.01;

        let (x1, _) = rk4_body(x, v, a0, &gravity, &[source], dt);
        let expected = x + dt * v + 0.5 * dt * dt * a0;

        assert!((x1 - expected).norm() < 1e-9, "got {x1:?}, expected {expected:?}");
    }
}
