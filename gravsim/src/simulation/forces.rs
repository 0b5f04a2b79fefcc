//! Force / acceleration evaluation for the engine
//!
//! Defines the acceleration trait the integrators are written against and the
//! direct (O(n²), unsoftened) Newtonian gravity that implements it

use crate::simulation::params::{COINCIDENT_DISTANCE, MIN_SEPARATION_SQ};
use crate::simulation::states::{Body, NVec3, PointMass};

/// Source of accelerations for the integrators
pub trait Acceleration {
    /// Overwrite `a` of every active body with its net acceleration
    /// from all other active bodies. Merged bodies are left untouched.
    fn accumulate_accels(&self, bodies: &mut [Body]);

    /// Acceleration felt at point `x` due to a fixed set of sources
    fn field_at(&self, x: NVec3, sources: &[PointMass]) -> NVec3;
}

/// Newtonian gravity with a coincidence cutoff instead of softening
#[derive(Debug, Clone, Copy)]
pub struct NewtonianGravity {
    pub g: f64, // gravitational constant
}

impl NewtonianGravity {
    pub fn new(g: f64) -> Self {
        Self { g }
    }

    /// Pairwise potential energy -G·m_i·m_j/r over active bodies.
    /// Pairs closer than `COINCIDENT_DISTANCE` are skipped.
    pub fn potential_energy(&self, bodies: &[Body]) -> f64 {
        let active: Vec<&Body> = bodies.iter().filter(|b| b.is_active()).collect();

        let mut potential = 0.0;
        for (i, bi) in active.iter().enumerate() {
            for bj in &active[i + 1..] {
                let r = (bj.x - bi.x).norm();
                if r > COINCIDENT_DISTANCE {
                    potential -= self.g * bi.m * bj.m / r;
                }
            }
        }
        potential
    }
}

impl Acceleration for NewtonianGravity {
    fn accumulate_accels(&self, bodies: &mut [Body]) {
        let n = bodies.len();
        if n == 0 { // No bodies, return
            return;
        }

        let mut out = vec![NVec3::zeros(); n];

        // Loop over each unordered pair (i, j) with i < j, both active
        for i in 0..n {
            let bi = &bodies[i];
            if bi.merged {
                continue;
            }

            for j in (i + 1)..n {
                let bj = &bodies[j];
                if bj.merged {
                    continue;
                }

                // r points from i to j: i is pulled along +r, j along -r
                let r = bj.x - bi.x;
                let r2 = r.norm_squared();

                // Coincident pair, no well-defined direction
                if r2 < MIN_SEPARATION_SQ {
                    continue;
                }

                // coef = G / |r|^3
                let inv_r = r2.sqrt().recip();
                let coef = self.g * inv_r * inv_r * inv_r;

                // a_i +=  G m_j r / |r|^3
                // a_j += -G m_i r / |r|^3
                out[i] += coef * bj.m * r;
                out[j] -= coef * bi.m * r;
            }
        }

        for (b, a) in bodies.iter_mut().zip(out) {
            if b.is_active() {
                b.a = a;
            }
        }
    }

    fn field_at(&self, x: NVec3, sources: &[PointMass]) -> NVec3 {
        let mut acc = NVec3::zeros();
        for s in sources {
            let r = s.x - x;
            let r2 = r.norm_squared();
            if r2 < MIN_SEPARATION_SQ {
                continue;
            }
            let inv_r = r2.sqrt().recip();
            acc += self.g * s.m * inv_r * inv_r * inv_r * r;
        }
        acc
    }
}
