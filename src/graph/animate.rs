use eframe::egui::Pos2;

use crate::data::ClusterId;

use super::build::{GraphLink, GraphNode, LinkKind};
use super::layout::{Sizes, calculate_question_position};
use super::step::NarrativeStep;
use super::tween::Animated;
use super::viewport::Dimensions;

pub const HIDDEN_OPACITY: f32 = 0.05;
pub const SHRUNK_SCALE: f32 = 0.7;
pub const INITIAL_LABEL_OPACITY: f32 = 0.5;

pub const CLUSTER_STROKE_WIDTH: f32 = 2.0;
pub const FOCUSED_CLUSTER_STROKE_WIDTH: f32 = 3.0;
pub const QUESTION_STROKE_WIDTH: f32 = 0.0;

pub const MEMBERSHIP_LINK_OPACITY: f32 = 0.3;
pub const BACKBONE_LINK_OPACITY: f32 = 0.15;
pub const LINK_WIDTH: f32 = 1.0;
pub const FOCUSED_LINK_OPACITY: f32 = 0.6;
pub const FOCUSED_LINK_WIDTH: f32 = 1.5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeStyle {
    pub position: Pos2,
    pub radius: f32,
    pub opacity: f32,
    pub stroke_width: f32,
}

/// `weight` runs from 0 (regular) to 1 (bold).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelStyle {
    pub opacity: f32,
    pub weight: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinkStyle {
    pub opacity: f32,
    pub width: f32,
}

/// Target styling for every element; `labels` follows the order of
/// `cluster_indices` passed to [`step_targets`].
#[derive(Clone, Debug, PartialEq)]
pub struct StyleTargets {
    pub nodes: Vec<NodeStyle>,
    pub labels: Vec<LabelStyle>,
    pub links: Vec<LinkStyle>,
}

pub fn base_radius(node: &GraphNode, sizes: &Sizes) -> f32 {
    if node.is_cluster() {
        sizes.cluster_radius
    } else {
        sizes.question_radius
    }
}

pub fn default_link_style(link: &GraphLink) -> LinkStyle {
    match link.kind {
        LinkKind::Backbone => LinkStyle {
            opacity: BACKBONE_LINK_OPACITY,
            width: LINK_WIDTH,
        },
        LinkKind::Membership(_) => LinkStyle {
            opacity: MEMBERSHIP_LINK_OPACITY,
            width: LINK_WIDTH,
        },
    }
}

/// Styling applied once when elements are first built, before any step
/// transition has run.
pub fn initial_targets(
    nodes: &[GraphNode],
    cluster_indices: &[usize],
    links: &[GraphLink],
    sizes: &Sizes,
) -> StyleTargets {
    StyleTargets {
        nodes: nodes
            .iter()
            .map(|node| NodeStyle {
                position: node.pos,
                radius: base_radius(node, sizes),
                opacity: 1.0,
                stroke_width: stroke_width(node, false),
            })
            .collect(),
        labels: cluster_indices
            .iter()
            .map(|_| LabelStyle {
                opacity: INITIAL_LABEL_OPACITY,
                weight: 0.0,
            })
            .collect(),
        links: links.iter().map(default_link_style).collect(),
    }
}

fn stroke_width(node: &GraphNode, focused: bool) -> f32 {
    match (node.is_cluster(), focused) {
        (true, true) => FOCUSED_CLUSTER_STROKE_WIDTH,
        (true, false) => CLUSTER_STROKE_WIDTH,
        (false, _) => QUESTION_STROKE_WIDTH,
    }
}

pub fn step_targets(
    nodes: &[GraphNode],
    cluster_indices: &[usize],
    links: &[GraphLink],
    sizes: &Sizes,
    dimensions: Dimensions,
    step: NarrativeStep,
) -> StyleTargets {
    match step.focused() {
        None => overview_targets(nodes, cluster_indices, links, sizes),
        Some(cluster_id) => {
            focused_targets(nodes, cluster_indices, links, sizes, dimensions, cluster_id)
        }
    }
}

fn overview_targets(
    nodes: &[GraphNode],
    cluster_indices: &[usize],
    links: &[GraphLink],
    sizes: &Sizes,
) -> StyleTargets {
    StyleTargets {
        nodes: nodes
            .iter()
            .map(|node| NodeStyle {
                position: node.fixed,
                radius: base_radius(node, sizes),
                opacity: 1.0,
                stroke_width: stroke_width(node, false),
            })
            .collect(),
        labels: cluster_indices
            .iter()
            .map(|_| LabelStyle {
                opacity: 1.0,
                weight: 0.0,
            })
            .collect(),
        links: links.iter().map(default_link_style).collect(),
    }
}

fn focused_targets(
    nodes: &[GraphNode],
    cluster_indices: &[usize],
    links: &[GraphLink],
    sizes: &Sizes,
    dimensions: Dimensions,
    focus: ClusterId,
) -> StyleTargets {
    let center = dimensions.center();
    let spread = sizes.focused_cluster_radius / sizes.cluster_radius.max(f32::EPSILON);

    let members = nodes
        .iter()
        .filter(|node| !node.is_cluster() && node.belongs_to(focus))
        .count();
    let mut member_rank = 0usize;

    let node_styles = nodes
        .iter()
        .map(|node| {
            let in_focus = node.belongs_to(focus);
            if !in_focus {
                return NodeStyle {
                    position: node.fixed,
                    radius: base_radius(node, sizes) * SHRUNK_SCALE,
                    opacity: HIDDEN_OPACITY,
                    stroke_width: stroke_width(node, false),
                };
            }

            if node.is_cluster() {
                return NodeStyle {
                    position: center,
                    radius: sizes.focused_cluster_radius,
                    opacity: 1.0,
                    stroke_width: stroke_width(node, true),
                };
            }

            let ring = calculate_question_position(
                member_rank,
                members,
                center.x,
                center.y,
                dimensions.width,
                dimensions.height,
            );
            member_rank += 1;
            NodeStyle {
                position: center + (ring - center) * spread,
                radius: sizes.focused_question_radius,
                opacity: 1.0,
                stroke_width: stroke_width(node, true),
            }
        })
        .collect();

    let labels = cluster_indices
        .iter()
        .map(|&index| {
            if nodes[index].cluster_id() == Some(focus) {
                LabelStyle {
                    opacity: 1.0,
                    weight: 1.0,
                }
            } else {
                LabelStyle {
                    opacity: HIDDEN_OPACITY,
                    weight: 0.0,
                }
            }
        })
        .collect();

    let links = links
        .iter()
        .map(|link| match link.kind {
            LinkKind::Membership(cluster_id) if cluster_id == focus => LinkStyle {
                opacity: FOCUSED_LINK_OPACITY,
                width: FOCUSED_LINK_WIDTH,
            },
            _ => LinkStyle {
                opacity: HIDDEN_OPACITY,
                width: LINK_WIDTH,
            },
        })
        .collect();

    StyleTargets {
        nodes: node_styles,
        labels,
        links,
    }
}

/// Animated presentation state of one node.
#[derive(Clone, Copy, Debug)]
pub struct NodeVisual {
    pub position: Animated<Pos2>,
    pub radius: Animated<f32>,
    pub opacity: Animated<f32>,
    pub stroke_width: Animated<f32>,
}

impl NodeVisual {
    fn new(style: NodeStyle) -> Self {
        Self {
            position: Animated::new(style.position),
            radius: Animated::new(style.radius),
            opacity: Animated::new(style.opacity),
            stroke_width: Animated::new(style.stroke_width),
        }
    }

    fn animate_to(&mut self, style: NodeStyle, now: f64, duration: f64) {
        self.position.animate_to(style.position, now, duration);
        self.radius.animate_to(style.radius, now, duration);
        self.opacity.animate_to(style.opacity, now, duration);
        self.stroke_width.animate_to(style.stroke_width, now, duration);
    }

    pub fn style(&self, now: f64) -> NodeStyle {
        NodeStyle {
            position: self.position.value(now),
            radius: self.radius.value(now),
            opacity: self.opacity.value(now),
            stroke_width: self.stroke_width.value(now),
        }
    }

    fn is_animating(&self, now: f64) -> bool {
        self.position.is_animating(now)
            || self.radius.is_animating(now)
            || self.opacity.is_animating(now)
            || self.stroke_width.is_animating(now)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct LabelVisual {
    pub opacity: Animated<f32>,
    pub weight: Animated<f32>,
}

#[derive(Clone, Copy, Debug)]
pub struct LinkVisual {
    pub opacity: Animated<f32>,
    pub width: Animated<f32>,
}

/// Animated state for every drawn element, index-aligned with the style
/// targets it was built from.
#[derive(Clone, Debug, Default)]
pub struct Visuals {
    pub nodes: Vec<NodeVisual>,
    pub labels: Vec<LabelVisual>,
    pub links: Vec<LinkVisual>,
}

impl Visuals {
    pub fn from_targets(targets: &StyleTargets) -> Self {
        Self {
            nodes: targets.nodes.iter().copied().map(NodeVisual::new).collect(),
            labels: targets
                .labels
                .iter()
                .map(|style| LabelVisual {
                    opacity: Animated::new(style.opacity),
                    weight: Animated::new(style.weight),
                })
                .collect(),
            links: targets
                .links
                .iter()
                .map(|style| LinkVisual {
                    opacity: Animated::new(style.opacity),
                    width: Animated::new(style.width),
                })
                .collect(),
        }
    }

    /// Starts a transition of every element toward `targets`; in-flight
    /// transitions are superseded from their current value.
    pub fn transition(&mut self, targets: &StyleTargets, now: f64, duration: f64) {
        for (visual, style) in self.nodes.iter_mut().zip(&targets.nodes) {
            visual.animate_to(*style, now, duration);
        }
        for (visual, style) in self.labels.iter_mut().zip(&targets.labels) {
            visual.opacity.animate_to(style.opacity, now, duration);
            visual.weight.animate_to(style.weight, now, duration);
        }
        for (visual, style) in self.links.iter_mut().zip(&targets.links) {
            visual.opacity.animate_to(style.opacity, now, duration);
            visual.width.animate_to(style.width, now, duration);
        }
    }

    /// Moves nodes to simulated positions without animating, skipping any
    /// node whose position is mid-transition.
    pub fn sync_positions(&mut self, nodes: &[GraphNode], now: f64) {
        for (visual, node) in self.nodes.iter_mut().zip(nodes) {
            if !visual.position.is_animating(now) {
                visual.position.set(node.pos);
            }
        }
    }

    pub fn is_animating(&self, now: f64) -> bool {
        self.nodes.iter().any(|visual| visual.is_animating(now))
            || self
                .labels
                .iter()
                .any(|visual| visual.opacity.is_animating(now) || visual.weight.is_animating(now))
            || self
                .links
                .iter()
                .any(|visual| visual.opacity.is_animating(now) || visual.width.is_animating(now))
    }
}
