use std::collections::BTreeSet;

use crate::data::ClusterId;

use super::animate::{LabelStyle, LinkStyle, StyleTargets, base_radius};
use super::build::{GraphLink, GraphNode, LinkKind};
use super::layout::Sizes;
use super::step::NarrativeStep;

pub const HIGHLIGHT_TRANSITION_SECS: f64 = 0.5;
pub const HIGHLIGHT_REVERT_SECS: f64 = 3.0;

const HIGHLIGHT_CLUSTER_OPACITY: f32 = 0.9;
const HIGHLIGHT_STROKE_WIDTH: f32 = 4.0;
const HIGHLIGHT_LINK_OPACITY: f32 = 0.85;
const HIGHLIGHT_LINK_WIDTH: f32 = 2.5;

/// Reported when a multi-cluster question is clicked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionClick {
    pub question_id: String,
    pub cluster_ids: Vec<ClusterId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ActiveHighlight {
    pub question_id: String,
    pub connected: BTreeSet<ClusterId>,
    pub revert_at: f64,
}

/// Whether a click on `node` should highlight its clusters in `step`.
pub fn click_allowed(node: &GraphNode, step: NarrativeStep) -> bool {
    if node.is_cluster() || node.cluster_ids().len() < 2 {
        return false;
    }
    match step.focused() {
        None => true,
        Some(focus) => node.belongs_to(focus),
    }
}

/// Clusters reached from `question_id` through its membership links.
pub fn connected_clusters(question_id: &str, links: &[GraphLink]) -> BTreeSet<ClusterId> {
    links
        .iter()
        .filter(|link| link.source == question_id)
        .filter_map(|link| match link.kind {
            LinkKind::Membership(cluster_id) => Some(cluster_id),
            LinkKind::Backbone => None,
        })
        .collect()
}

/// Raises the connected clusters, their labels and links above `base`.
pub fn highlight_targets(
    base: &StyleTargets,
    nodes: &[GraphNode],
    cluster_indices: &[usize],
    links: &[GraphLink],
    sizes: &Sizes,
    connected: &BTreeSet<ClusterId>,
) -> StyleTargets {
    let mut targets = base.clone();

    for (node, style) in nodes.iter().zip(targets.nodes.iter_mut()) {
        let Some(cluster_id) = node.cluster_id() else {
            continue;
        };
        if !connected.contains(&cluster_id) {
            continue;
        }
        style.opacity = style.opacity.max(HIGHLIGHT_CLUSTER_OPACITY);
        style.stroke_width = HIGHLIGHT_STROKE_WIDTH;
        style.radius = style.radius.max(base_radius(node, sizes));
    }

    for (&index, label) in cluster_indices.iter().zip(targets.labels.iter_mut()) {
        if nodes[index]
            .cluster_id()
            .is_some_and(|cluster_id| connected.contains(&cluster_id))
        {
            *label = LabelStyle {
                opacity: 1.0,
                weight: 1.0,
            };
        }
    }

    for (link, style) in links.iter().zip(targets.links.iter_mut()) {
        if let LinkKind::Membership(cluster_id) = link.kind
            && connected.contains(&cluster_id)
        {
            *style = LinkStyle {
                opacity: HIGHLIGHT_LINK_OPACITY,
                width: HIGHLIGHT_LINK_WIDTH,
            };
        }
    }

    targets
}
