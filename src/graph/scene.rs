use std::collections::HashMap;

use eframe::egui::{Color32, Pos2, pos2};

use crate::data::ClusterId;
use crate::util::finite_or_zero;

use super::animate::Visuals;
use super::build::{GraphLink, GraphNode, LinkKind, NodeKind};
use super::layout::Sizes;
use super::tooltip::{TooltipContent, TooltipView};

/// Category palette indexed by `cluster_id mod 10`.
const PALETTE: [Color32; 10] = [
    Color32::from_rgb(0x1f, 0x77, 0xb4),
    Color32::from_rgb(0xff, 0x7f, 0x0e),
    Color32::from_rgb(0x2c, 0xa0, 0x2c),
    Color32::from_rgb(0xd6, 0x27, 0x28),
    Color32::from_rgb(0x94, 0x67, 0xbd),
    Color32::from_rgb(0x8c, 0x56, 0x4b),
    Color32::from_rgb(0xe3, 0x77, 0xc2),
    Color32::from_rgb(0x7f, 0x7f, 0x7f),
    Color32::from_rgb(0xbc, 0xbd, 0x22),
    Color32::from_rgb(0x17, 0xbe, 0xcf),
];

pub const BACKBONE_COLOR: Color32 = Color32::from_rgb(0x9a, 0xa3, 0xad);
pub const CLUSTER_FILL: Color32 = Color32::WHITE;
pub const LABEL_COLOR: Color32 = Color32::from_rgb(0x33, 0x33, 0x33);

/// Elements fainter than this ignore the pointer.
const HIT_OPACITY_MIN: f32 = 0.1;
/// Extra pick distance around small question circles.
const HIT_SLOP: f32 = 3.0;

pub fn cluster_color(cluster_id: ClusterId) -> Color32 {
    PALETTE[cluster_id.rem_euclid(PALETTE.len() as ClusterId) as usize]
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClusterView {
    pub node_id: String,
    pub cluster_id: ClusterId,
    pub center: Pos2,
    pub radius: f32,
    pub fill: Color32,
    pub stroke: Color32,
    pub stroke_width: f32,
    pub opacity: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LabelView {
    pub cluster_id: ClusterId,
    pub text: String,
    pub position: Pos2,
    pub font_size: f32,
    pub opacity: f32,
    pub bold: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct QuestionView {
    pub node_id: String,
    pub center: Pos2,
    pub radius: f32,
    pub fill: Color32,
    pub opacity: f32,
    pub multi_cluster: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LinkView {
    pub from: Pos2,
    pub to: Pos2,
    pub kind: LinkKind,
    pub color: Color32,
    pub width: f32,
    pub opacity: f32,
}

/// Everything needed to draw one frame, in paint order: links, clusters,
/// questions, labels, then the tooltip.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    pub width: f32,
    pub height: f32,
    pub links: Vec<LinkView>,
    pub clusters: Vec<ClusterView>,
    pub questions: Vec<QuestionView>,
    pub labels: Vec<LabelView>,
    pub tooltip: Option<TooltipView>,
}

#[cfg(test)]
impl Scene {
    pub fn cluster(&self, cluster_id: ClusterId) -> Option<&ClusterView> {
        self.clusters
            .iter()
            .find(|cluster| cluster.cluster_id == cluster_id)
    }

    pub fn question(&self, node_id: &str) -> Option<&QuestionView> {
        self.questions
            .iter()
            .find(|question| question.node_id == node_id)
    }
}

fn finite_pos(pos: Pos2) -> Pos2 {
    pos2(finite_or_zero(pos.x), finite_or_zero(pos.y))
}

pub(super) struct SceneInputs<'a> {
    pub nodes: &'a [GraphNode],
    pub cluster_indices: &'a [usize],
    pub links: &'a [GraphLink],
    pub link_endpoints: &'a [Option<(usize, usize)>],
    pub visuals: &'a Visuals,
    pub sizes: &'a Sizes,
}

pub(super) fn build_scene(inputs: &SceneInputs<'_>, width: f32, height: f32, now: f64) -> Scene {
    let node_styles = inputs
        .visuals
        .nodes
        .iter()
        .map(|visual| visual.style(now))
        .collect::<Vec<_>>();

    let links = inputs
        .links
        .iter()
        .zip(inputs.link_endpoints)
        .zip(&inputs.visuals.links)
        .filter_map(|((link, endpoints), visual)| {
            let (source, target) = (*endpoints)?;
            let color = match link.kind {
                LinkKind::Backbone => BACKBONE_COLOR,
                LinkKind::Membership(cluster_id) => cluster_color(cluster_id),
            };
            Some(LinkView {
                from: finite_pos(node_styles.get(source)?.position),
                to: finite_pos(node_styles.get(target)?.position),
                kind: link.kind,
                color,
                width: finite_or_zero(visual.width.value(now)),
                opacity: finite_or_zero(visual.opacity.value(now)),
            })
        })
        .collect();

    let mut clusters = Vec::new();
    let mut questions = Vec::new();
    for (node, style) in inputs.nodes.iter().zip(&node_styles) {
        let center = finite_pos(style.position);
        let radius = finite_or_zero(style.radius).max(0.0);
        let opacity = finite_or_zero(style.opacity);
        match &node.kind {
            NodeKind::Cluster { cluster_id, .. } => clusters.push(ClusterView {
                node_id: node.id.clone(),
                cluster_id: *cluster_id,
                center,
                radius,
                fill: CLUSTER_FILL,
                stroke: cluster_color(*cluster_id),
                stroke_width: finite_or_zero(style.stroke_width),
                opacity,
            }),
            NodeKind::Question { cluster_ids, .. } => questions.push(QuestionView {
                node_id: node.id.clone(),
                center,
                radius,
                fill: node
                    .primary_cluster()
                    .map_or(BACKBONE_COLOR, cluster_color),
                opacity,
                multi_cluster: cluster_ids.len() > 1,
            }),
        }
    }

    let labels = inputs
        .cluster_indices
        .iter()
        .zip(&inputs.visuals.labels)
        .filter_map(|(&index, visual)| {
            let node = inputs.nodes.get(index)?;
            let style = node_styles.get(index)?;
            let center = finite_pos(style.position);
            let radius = finite_or_zero(style.radius).max(0.0);
            Some(LabelView {
                cluster_id: node.cluster_id()?,
                text: node.label.clone(),
                position: pos2(center.x, center.y - radius - inputs.sizes.font_size * 0.6),
                font_size: inputs.sizes.font_size,
                opacity: finite_or_zero(visual.opacity.value(now)),
                bold: visual.weight.value(now) >= 0.5,
            })
        })
        .collect();

    Scene {
        width,
        height,
        links,
        clusters,
        questions,
        labels,
        tooltip: None,
    }
}

pub fn cluster_tooltip(node: &GraphNode) -> TooltipContent {
    TooltipContent::title(node.label.clone())
}

/// Question tooltip; the cluster list is gathered by following the
/// question's membership links to their target nodes.
pub fn question_tooltip(node: &GraphNode, nodes: &[GraphNode], links: &[GraphLink]) -> TooltipContent {
    let NodeKind::Question {
        country,
        date,
        drug,
        ..
    } = &node.kind
    else {
        return cluster_tooltip(node);
    };

    let labels_by_id = nodes
        .iter()
        .filter(|candidate| candidate.is_cluster())
        .map(|cluster| (cluster.id.as_str(), cluster.label.as_str()))
        .collect::<HashMap<_, _>>();
    let cluster_labels = links
        .iter()
        .filter(|link| link.source == node.id && matches!(link.kind, LinkKind::Membership(_)))
        .filter_map(|link| labels_by_id.get(link.target.as_str()).copied())
        .collect::<Vec<_>>();

    let mut lines = Vec::with_capacity(4);
    if !cluster_labels.is_empty() {
        lines.push(format!("Clusters: {}", cluster_labels.join(", ")));
    }
    lines.push(format!("Country: {country}"));
    lines.push(format!("Date: {date}"));
    lines.push(format!("Product: {drug}"));

    TooltipContent {
        title: node.label.clone(),
        lines,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hit {
    Cluster(usize),
    Question(usize),
}

/// Topmost interactive node under `point`; questions paint above clusters.
pub(super) fn hit_test(nodes: &[GraphNode], visuals: &Visuals, point: Pos2, now: f64) -> Option<Hit> {
    let hit = |want_cluster: bool| {
        nodes
            .iter()
            .zip(&visuals.nodes)
            .enumerate()
            .rev()
            .filter(|(_, (node, _))| node.is_cluster() == want_cluster)
            .find_map(|(index, (_, visual))| {
                let style = visual.style(now);
                let slop = if want_cluster { 0.0 } else { HIT_SLOP };
                let reach = style.radius + slop;
                (style.opacity >= HIT_OPACITY_MIN
                    && (style.position - point).length_sq() <= reach * reach)
                    .then_some(index)
            })
    };

    hit(false)
        .map(Hit::Question)
        .or_else(|| hit(true).map(Hit::Cluster))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build::cluster_node_id;
    use eframe::egui::Vec2;

    fn node(id: &str, label: &str, kind: NodeKind) -> GraphNode {
        GraphNode {
            id: id.into(),
            label: label.into(),
            kind,
            fixed: pos2(0.0, 0.0),
            pos: pos2(0.0, 0.0),
            velocity: Vec2::ZERO,
            pinned: true,
        }
    }

    #[test]
    fn palette_wraps_and_handles_negative_ids() {
        assert_eq!(cluster_color(0), cluster_color(10));
        assert_eq!(cluster_color(3), PALETTE[3]);
        assert_eq!(cluster_color(-1), PALETTE[9]);
    }

    #[test]
    fn question_tooltip_lists_linked_cluster_labels() {
        let nodes = vec![
            node(
                &cluster_node_id(0),
                "Storage",
                NodeKind::Cluster {
                    cluster_id: 0,
                    summary: String::new(),
                },
            ),
            node(
                &cluster_node_id(1),
                "Dosing",
                NodeKind::Cluster {
                    cluster_id: 1,
                    summary: String::new(),
                },
            ),
        ];
        let question = node(
            "question-Q1",
            "Can it be frozen?",
            NodeKind::Question {
                country: "DE".into(),
                date: "2024-02-02".into(),
                drug: "Alpha".into(),
                cluster_ids: vec![0, 1],
            },
        );
        let links = vec![
            GraphLink {
                source: "question-Q1".into(),
                target: cluster_node_id(1),
                kind: LinkKind::Membership(1),
            },
            GraphLink {
                source: "question-Q1".into(),
                target: cluster_node_id(0),
                kind: LinkKind::Membership(0),
            },
        ];

        let content = question_tooltip(&question, &nodes, &links);
        assert_eq!(content.title, "Can it be frozen?");
        assert_eq!(
            content.lines,
            vec![
                "Clusters: Dosing, Storage".to_string(),
                "Country: DE".to_string(),
                "Date: 2024-02-02".to_string(),
                "Product: Alpha".to_string(),
            ]
        );
    }
}
