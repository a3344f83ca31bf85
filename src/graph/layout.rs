use std::f32::consts::{FRAC_PI_4, FRAC_PI_8, TAU};

use eframe::egui::{Pos2, pos2};

use crate::util::stable_pair;

use super::build::NodeKind;

/// Fractional anchors for small datasets, ordered to match the backbone
/// edges 0-1, 0-2, 1-3, 2-4 and 3-4.
const SMALL_LAYOUT: [(f32, f32); 5] = [
    (0.50, 0.22),
    (0.26, 0.45),
    (0.74, 0.45),
    (0.34, 0.76),
    (0.66, 0.76),
];

const GRID_JITTER: f32 = 0.15;
const QUESTIONS_PER_RING: usize = 8;
const RING_ANGLE_JITTER: f32 = 0.12;
const RING_RADIUS_JITTER: f32 = 0.2;

pub fn calculate_cluster_positions(width: f32, height: f32, cluster_count: usize) -> Vec<Pos2> {
    if cluster_count <= SMALL_LAYOUT.len() {
        return SMALL_LAYOUT
            .iter()
            .map(|(fx, fy)| pos2(width * fx, height * fy))
            .collect();
    }

    let columns = (cluster_count as f32).sqrt().ceil() as usize;
    let rows = cluster_count.div_ceil(columns);
    let cell_width = width / columns as f32;
    let cell_height = height / rows as f32;

    (0..cluster_count)
        .map(|index| {
            let column = index % columns;
            let row = index / columns;
            let (jx, jy) = stable_pair(&format!("cluster-cell-{index}"));
            pos2(
                (column as f32 + 0.5 + jx * GRID_JITTER) * cell_width,
                (row as f32 + 0.5 + jy * GRID_JITTER) * cell_height,
            )
        })
        .collect()
}

/// Viewport-proportional sizes; every field scales linearly with the
/// shorter viewport side.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sizes {
    pub cluster_radius: f32,
    pub focused_cluster_radius: f32,
    pub question_radius: f32,
    pub focused_question_radius: f32,
    pub font_size: f32,
    pub question_orbit_radius: f32,
    pub link_distance: f32,
    pub ring_increment: f32,
}

impl Sizes {
    pub fn collision_radius(&self, kind: &NodeKind) -> f32 {
        match kind {
            NodeKind::Cluster { .. } => self.cluster_radius * 1.2,
            NodeKind::Question { .. } => self.question_radius * 1.5,
        }
    }
}

pub fn calculate_sizes(width: f32, height: f32) -> Sizes {
    let base = width.min(height).max(0.0);
    Sizes {
        cluster_radius: base * 0.06,
        focused_cluster_radius: base * 0.10,
        question_radius: base * 0.012,
        focused_question_radius: base * 0.02,
        font_size: base * 0.024,
        question_orbit_radius: base * 0.11,
        link_distance: base * 0.15,
        ring_increment: base * 0.035,
    }
}

pub fn calculate_question_position(
    question_index: usize,
    total_questions: usize,
    center_x: f32,
    center_y: f32,
    width: f32,
    height: f32,
) -> Pos2 {
    let sizes = calculate_sizes(width, height);
    let orbit = sizes.question_orbit_radius;

    let (angle, radius) = if total_questions <= 1 {
        (-FRAC_PI_4, orbit)
    } else if total_questions <= 5 {
        (question_index as f32 / total_questions as f32 * TAU, orbit)
    } else {
        let ring = question_index / QUESTIONS_PER_RING;
        let slot = question_index % QUESTIONS_PER_RING;
        let on_ring = (total_questions - ring * QUESTIONS_PER_RING).min(QUESTIONS_PER_RING);
        let (ja, jr) = stable_pair(&format!("question-slot-{question_index}-{total_questions}"));
        let angle = slot as f32 / on_ring as f32 * TAU
            + ring as f32 * FRAC_PI_8
            + ja * RING_ANGLE_JITTER;
        let radius = orbit
            + ring as f32 * sizes.ring_increment
            + jr * RING_RADIUS_JITTER * sizes.ring_increment;
        (angle, radius)
    };

    pos2(
        center_x + angle.cos() * radius,
        center_y + angle.sin() * radius,
    )
}
