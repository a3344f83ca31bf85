use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

use super::quadtree::Quad;

/// Minimum squared distance used by the charge force, so coincident nodes
/// cannot produce unbounded velocities.
const CHARGE_DISTANCE_MIN_SQ: f32 = 1.0;

#[derive(Clone, Copy)]
pub(super) struct ChargeParams {
    pub(super) alpha: f32,
    pub(super) theta_sq: f32,
}

/// Deterministic unit direction for coincident points.
pub(super) fn separation_direction(a: usize, b: usize) -> Vec2 {
    let angle = ((a as f32) * 0.618_034 + (b as f32) * 0.414_214) * TAU;
    vec2(angle.cos(), angle.sin())
}

fn charge_pull(delta: Vec2, charge: f32, alpha: f32, fallback: Vec2) -> Vec2 {
    let mut distance_sq = delta.length_sq();
    let delta = if distance_sq <= f32::EPSILON {
        distance_sq = 1e-6;
        fallback * 1e-3
    } else {
        delta
    };
    if distance_sq < CHARGE_DISTANCE_MIN_SQ {
        distance_sq = (CHARGE_DISTANCE_MIN_SQ * distance_sq).sqrt();
    }
    delta * (charge * alpha / distance_sq)
}

/// Many-body velocity change for one node; negative charges repel.
pub(super) fn accumulate_charge(
    quad: &Quad,
    index: usize,
    positions: &[Vec2],
    charges: &[f32],
    params: ChargeParams,
    velocity: &mut Vec2,
) {
    if quad.charge == 0.0 && quad.points.is_empty() && quad.is_leaf() {
        return;
    }

    let point = positions[index];
    let delta = quad.charge_center - point;
    let width = quad.bounds.width();
    let far_enough = width * width / params.theta_sq < delta.length_sq();

    if !quad.is_leaf() && far_enough && !quad.bounds.contains(point) {
        *velocity += charge_pull(delta, quad.charge, params.alpha, Vec2::ZERO);
        return;
    }

    if quad.is_leaf() {
        for &other in &quad.points {
            if other == index {
                continue;
            }
            let fallback = separation_direction(other, index);
            *velocity += charge_pull(
                positions[other] - point,
                charges.get(other).copied().unwrap_or(0.0),
                params.alpha,
                fallback,
            );
        }
        return;
    }

    for child in quad.children() {
        accumulate_charge(child, index, positions, charges, params, velocity);
    }
}

/// Pushes overlapping pairs apart, splitting the correction by squared radius
/// so the smaller node moves further.
pub(super) fn accumulate_collisions(
    quad_a: &Quad,
    quad_b: &Quad,
    same: bool,
    predicted: &[Vec2],
    radii: &[f32],
    deltas: &mut [Vec2],
) {
    let reach = quad_a.max_radius + quad_b.max_radius;
    if quad_a.bounds.gap_sq(quad_b.bounds) > reach * reach {
        return;
    }

    if quad_a.is_leaf() && quad_b.is_leaf() {
        for (offset, &i) in quad_a.points.iter().enumerate() {
            let partners = if same {
                &quad_a.points[offset + 1..]
            } else {
                &quad_b.points[..]
            };
            for &j in partners {
                resolve_overlap(i, j, predicted, radii, deltas);
            }
        }
        return;
    }

    if same {
        let children = quad_a.children().collect::<Vec<_>>();
        for (offset, child) in children.iter().enumerate() {
            accumulate_collisions(child, child, true, predicted, radii, deltas);
            for other in &children[offset + 1..] {
                accumulate_collisions(child, other, false, predicted, radii, deltas);
            }
        }
        return;
    }

    let split_a = !quad_a.is_leaf()
        && (quad_b.is_leaf() || quad_a.bounds.half_extent >= quad_b.bounds.half_extent);
    if split_a {
        for child in quad_a.children() {
            accumulate_collisions(child, quad_b, false, predicted, radii, deltas);
        }
    } else {
        for child in quad_b.children() {
            accumulate_collisions(quad_a, child, false, predicted, radii, deltas);
        }
    }
}

fn resolve_overlap(i: usize, j: usize, predicted: &[Vec2], radii: &[f32], deltas: &mut [Vec2]) {
    let ri = radii[i];
    let rj = radii[j];
    let reach = ri + rj;
    let mut delta = predicted[i] - predicted[j];
    let mut distance_sq = delta.length_sq();
    if distance_sq >= reach * reach {
        return;
    }
    if distance_sq <= f32::EPSILON {
        delta = separation_direction(i, j) * 1e-3;
        distance_sq = delta.length_sq();
    }

    let distance = distance_sq.sqrt();
    let push = delta * ((reach - distance) / distance);
    let ri_sq = ri * ri;
    let rj_sq = rj * rj;
    let total = (ri_sq + rj_sq).max(f32::EPSILON);
    let share = rj_sq / total;
    deltas[i] += push * share;
    deltas[j] -= push * (1.0 - share);
}
