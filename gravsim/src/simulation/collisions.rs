//! Collision response applied after each integration step
//!
//! - elastic: 1-D elastic exchange along the line of centres, plus overlap
//!   separation; coincident pairs are jittered apart
//! - merge: overlapping pairs fuse into one new body
//!
//! Both passes scan active pairs in ascending (i, j) index order, so results
//! are deterministic for a given body ordering (and jitter seed).

use log::{debug, warn};
use rand::Rng;

use super::params::{COINCIDENT_DISTANCE, JITTER_FRACTION, SEPARATION_OVERSHOOT};
use super::states::{Body, BodyId, NVec3, Trail};

/// Bounce overlapping, approaching pairs off each other.
/// Returns the number of pairs that were resolved or jittered.
pub fn resolve_elastic<R: Rng>(bodies: &mut [Body], rng: &mut R) -> usize {
    let n = bodies.len();
    let mut resolved = 0;

    for i in 0..n {
        if bodies[i].merged {
            continue;
        }
        for j in (i + 1)..n {
            if bodies[j].merged {
                continue;
            }
            let (b1, b2) = pair_mut(bodies, i, j);

            let d_vec = b1.x - b2.x;
            let dist = d_vec.norm();
            let min_dist = b1.radius + b2.radius;

            if dist <= COINCIDENT_DISTANCE {
                // No contact normal exists; nudge them apart and let the next step decide
                warn!("bodies {} and {} are coincident, jittering apart", b1.id, b2.id);
                b1.x += jitter(rng) * b1.radius * JITTER_FRACTION;
                b2.x -= jitter(rng) * b2.radius * JITTER_FRACTION;
                resolved += 1;
                continue;
            }
            if dist >= min_dist {
                continue;
            }

            // n points from 2 to 1
            let n_vec = d_vec / dist;
            let v_rel_n = (b1.v - b2.v).dot(&n_vec);
            if v_rel_n >= 0.0 { // already separating
                continue;
            }

            let (m1, m2) = (b1.m, b2.m);
            let m_sum = m1 + m2;
            let v1_n = b1.v.dot(&n_vec);
            let v2_n = b2.v.dot(&n_vec);

            let v1_n_final = (v1_n * (m1 - m2) + 2.0 * m2 * v2_n) / m_sum;
            let v2_n_final = (v2_n * (m2 - m1) + 2.0 * m1 * v1_n) / m_sum;

            b1.v += (v1_n_final - v1_n) * n_vec;
            b2.v += (v2_n_final - v2_n) * n_vec;

            // Split the overlap so the lighter body moves further
            let overlap = min_dist - dist;
            b1.x += n_vec * (overlap * m2 / m_sum) * SEPARATION_OVERSHOOT;
            b2.x -= n_vec * (overlap * m1 / m_sum) * SEPARATION_OVERSHOOT;

            resolved += 1;
        }
    }
    resolved
}

/// Fuse overlapping pairs. Each body merges at most once per call: the
/// lowest-index body takes its lowest-index overlapping partner.
///
/// The inputs are flagged `merged` and stay in the arena; products get fresh
/// ids from `next_id` and are appended after the scan. Returns the number of
/// merges.
pub fn resolve_merge(bodies: &mut Vec<Body>, next_id: &mut BodyId) -> usize {
    let n = bodies.len();
    let mut consumed: Vec<bool> = bodies.iter().map(|b| b.merged).collect();
    let mut pending: Vec<(usize, usize)> = Vec::new();
    let mut products: Vec<Body> = Vec::new();

    for i in 0..n {
        if consumed[i] {
            continue;
        }
        for j in (i + 1)..n {
            if consumed[j] {
                continue;
            }
            let (b1, b2) = (&bodies[i], &bodies[j]);
            if (b1.x - b2.x).norm() >= b1.radius + b2.radius {
                continue;
            }

            let product = merge_pair(b1, b2, *next_id);
            *next_id = next_id.saturating_add(1);
            debug!(
                "merged bodies {} and {} into {} ('{}', m = {:e})",
                b1.id, b2.id, product.id, product.name, product.m
            );

            consumed[i] = true;
            consumed[j] = true;
            pending.push((i, j));
            products.push(product);
            break; // i is spent, move on
        }
    }

    for &(i, j) in &pending {
        bodies[i].merged = true;
        bodies[j].merged = true;
    }
    bodies.extend(products);

    pending.len()
}

/// Product of a perfectly inelastic collision: conserves mass and momentum,
/// sits at the pair's centre of mass, and keeps the combined volume.
fn merge_pair(b1: &Body, b2: &Body, id: BodyId) -> Body {
    let m = b1.m + b2.m;
    let x = (b1.m * b1.x + b2.m * b2.x) / m;
    let v = (b1.momentum() + b2.momentum()) / m;
    let radius = (b1.radius.powi(3) + b2.radius.powi(3)).cbrt();
    let color = if b1.m >= b2.m { &b1.color } else { &b2.color };

    Body {
        id,
        name: format!("Merged({}+{})", b1.name, b2.name),
        x,
        v,
        a: NVec3::zeros(),
        m,
        radius,
        color: color.clone(),
        trail: Trail::new(),
        merged: false,
    }
}

/// Mutable access to two distinct bodies, i < j
fn pair_mut(bodies: &mut [Body], i: usize, j: usize) -> (&mut Body, &mut Body) {
    let (left, right) = bodies.split_at_mut(j);
    (&mut left[i], &mut right[0])
}

fn jitter<R: Rng>(rng: &mut R) -> NVec3 {
    NVec3::new(rng.gen::<f64>(), rng.gen::<f64>(), rng.gen::<f64>())
}
