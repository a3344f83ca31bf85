mod forces;
mod quadtree;

use std::collections::HashMap;

use eframe::egui::{Pos2, Vec2};
use tracing::{debug, warn};

use super::build::{GraphLink, GraphNode};
use super::layout::Sizes;
use forces::{ChargeParams, accumulate_charge, accumulate_collisions, separation_direction};
use quadtree::Quad;

/// Wall-clock budget for one settle pass.
pub const SETTLE_BUDGET_SECS: f64 = 1.0;
/// Tick budget used when no frame clock drives the simulation.
pub const HEADLESS_TICKS: usize = 60;

const ALPHA_START: f32 = 0.3;
const ALPHA_DECAY: f32 = 0.1;
const ALPHA_MIN: f32 = 0.001;
const ALPHA_TARGET: f32 = 0.0;
const VELOCITY_DECAY: f32 = 0.4;
const LINK_STRENGTH: f32 = 0.05;
const CHARGE_STRENGTH: f32 = -100.0;
const BARNES_HUT_THETA: f32 = 0.9;

pub struct Simulation {
    alpha: f32,
    links: Vec<ResolvedLink>,
    link_distance: f32,
    collision_radii: Vec<f32>,
    center: Pos2,
    started_at: f64,
    ticks: usize,
    running: bool,
}

struct ResolvedLink {
    source: usize,
    target: usize,
    bias: f32,
}

impl Simulation {
    pub fn new(
        nodes: &[GraphNode],
        links: &[GraphLink],
        sizes: &Sizes,
        center: Pos2,
        now: f64,
    ) -> Self {
        let index_by_id = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.as_str(), index))
            .collect::<HashMap<_, _>>();

        let mut degree = vec![0usize; nodes.len()];
        let mut pairs = Vec::with_capacity(links.len());
        for link in links {
            let (Some(&source), Some(&target)) = (
                index_by_id.get(link.source.as_str()),
                index_by_id.get(link.target.as_str()),
            ) else {
                warn!(source = %link.source, target = %link.target, "link endpoint missing; ignored by simulation");
                continue;
            };
            degree[source] += 1;
            degree[target] += 1;
            pairs.push((source, target));
        }

        let links = pairs
            .into_iter()
            .map(|(source, target)| ResolvedLink {
                source,
                target,
                bias: degree[source] as f32 / (degree[source] + degree[target]) as f32,
            })
            .collect();

        Self {
            alpha: ALPHA_START,
            links,
            link_distance: sizes.link_distance,
            collision_radii: nodes
                .iter()
                .map(|node| sizes.collision_radius(&node.kind))
                .collect(),
            center,
            started_at: now,
            ticks: 0,
            running: true,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn ticks(&self) -> usize {
        self.ticks
    }

    /// Ticks once per frame until the settle budget runs out or the
    /// simulation cools down. Returns whether node positions changed.
    pub fn advance(&mut self, nodes: &mut [GraphNode], now: f64) -> bool {
        if !self.running {
            return false;
        }
        if now - self.started_at >= SETTLE_BUDGET_SECS || self.alpha < ALPHA_MIN {
            self.stop();
            return false;
        }
        self.tick(nodes);
        true
    }

    pub fn run_headless(&mut self, nodes: &mut [GraphNode]) {
        while self.running && self.ticks < HEADLESS_TICKS && self.alpha >= ALPHA_MIN {
            self.tick(nodes);
        }
        self.stop();
    }

    fn stop(&mut self) {
        if self.running {
            debug!(ticks = self.ticks, alpha = self.alpha, "simulation settled");
        }
        self.running = false;
    }

    pub fn tick(&mut self, nodes: &mut [GraphNode]) {
        self.alpha += (ALPHA_TARGET - self.alpha) * ALPHA_DECAY;
        self.ticks += 1;
        if nodes.is_empty() {
            return;
        }

        self.apply_links(nodes);
        self.apply_charge(nodes);
        self.apply_collisions(nodes);
        self.apply_centering(nodes);

        for node in nodes.iter_mut() {
            if node.pinned {
                node.pos = node.fixed;
                node.velocity = Vec2::ZERO;
            } else {
                node.velocity *= 1.0 - VELOCITY_DECAY;
                node.pos += node.velocity;
            }
        }
    }

    fn apply_links(&self, nodes: &mut [GraphNode]) {
        for link in &self.links {
            if link.source == link.target {
                continue;
            }
            let source = nodes[link.source].pos + nodes[link.source].velocity;
            let target = nodes[link.target].pos + nodes[link.target].velocity;
            let mut delta = target - source;
            if delta.length_sq() <= f32::EPSILON {
                delta = separation_direction(link.source, link.target) * 1e-3;
            }
            let distance = delta.length();
            let correction =
                delta * ((distance - self.link_distance) / distance * self.alpha * LINK_STRENGTH);

            nodes[link.target].velocity -= correction * link.bias;
            nodes[link.source].velocity += correction * (1.0 - link.bias);
        }
    }

    fn apply_charge(&self, nodes: &mut [GraphNode]) {
        let positions = nodes.iter().map(|node| node.pos.to_vec2()).collect::<Vec<_>>();
        let charges = vec![CHARGE_STRENGTH; nodes.len()];
        let Some(quad) = Quad::build(&positions, &charges, &self.collision_radii) else {
            return;
        };

        let params = ChargeParams {
            alpha: self.alpha,
            theta_sq: BARNES_HUT_THETA * BARNES_HUT_THETA,
        };
        for (index, node) in nodes.iter_mut().enumerate() {
            accumulate_charge(&quad, index, &positions, &charges, params, &mut node.velocity);
        }
    }

    fn apply_collisions(&self, nodes: &mut [GraphNode]) {
        let predicted = nodes
            .iter()
            .map(|node| node.pos.to_vec2() + node.velocity)
            .collect::<Vec<_>>();
        let Some(quad) = Quad::build(&predicted, &[], &self.collision_radii) else {
            return;
        };

        let mut deltas = vec![Vec2::ZERO; nodes.len()];
        accumulate_collisions(&quad, &quad, true, &predicted, &self.collision_radii, &mut deltas);
        for (node, delta) in nodes.iter_mut().zip(deltas) {
            node.velocity += delta;
        }
    }

    fn apply_centering(&self, nodes: &mut [GraphNode]) {
        let sum = nodes
            .iter()
            .fold(Vec2::ZERO, |acc, node| acc + node.pos.to_vec2());
        let mean = sum / nodes.len() as f32;
        let shift = mean - self.center.to_vec2();
        for node in nodes.iter_mut() {
            node.pos -= shift;
        }
    }
}
