use std::collections::HashMap;

use eframe::egui::{Pos2, Vec2};
use tracing::warn;

use crate::data::{Cluster, ClusterId, Question, question_node_ids};

use super::layout::calculate_question_position;

/// Narrative backbone between the first five clusters.
const BACKBONE: [(ClusterId, ClusterId); 5] = [(0, 1), (0, 2), (1, 3), (2, 4), (3, 4)];

/// Wire value of the cluster id carried by backbone links.
pub const BACKBONE_CLUSTER_ID: ClusterId = -1;

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Cluster {
        cluster_id: ClusterId,
        summary: String,
    },
    Question {
        country: String,
        date: String,
        drug: String,
        cluster_ids: Vec<ClusterId>,
    },
}

#[derive(Clone, Debug)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    pub fixed: Pos2,
    pub pos: Pos2,
    pub velocity: Vec2,
    pub pinned: bool,
}

impl GraphNode {
    fn pinned_at(id: String, label: String, kind: NodeKind, anchor: Pos2) -> Self {
        Self {
            id,
            label,
            kind,
            fixed: anchor,
            pos: anchor,
            velocity: Vec2::ZERO,
            pinned: true,
        }
    }

    pub fn is_cluster(&self) -> bool {
        matches!(self.kind, NodeKind::Cluster { .. })
    }

    pub fn cluster_id(&self) -> Option<ClusterId> {
        match &self.kind {
            NodeKind::Cluster { cluster_id, .. } => Some(*cluster_id),
            NodeKind::Question { .. } => None,
        }
    }

    pub fn cluster_ids(&self) -> &[ClusterId] {
        match &self.kind {
            NodeKind::Cluster { cluster_id, .. } => std::slice::from_ref(cluster_id),
            NodeKind::Question { cluster_ids, .. } => cluster_ids,
        }
    }

    pub fn primary_cluster(&self) -> Option<ClusterId> {
        self.cluster_ids().first().copied()
    }

    pub fn belongs_to(&self, cluster_id: ClusterId) -> bool {
        self.cluster_ids().contains(&cluster_id)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LinkKind {
    Backbone,
    Membership(ClusterId),
}

impl LinkKind {
    pub fn wire_cluster_id(self) -> ClusterId {
        match self {
            Self::Backbone => BACKBONE_CLUSTER_ID,
            Self::Membership(cluster_id) => cluster_id,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphLink {
    pub source: String,
    pub target: String,
    pub kind: LinkKind,
}

pub fn cluster_node_id(cluster_id: ClusterId) -> String {
    format!("cluster-{cluster_id}")
}

pub fn create_cluster_nodes(clusters: &[Cluster], positions: &[Pos2]) -> Vec<GraphNode> {
    if clusters.len() > positions.len() {
        warn!(
            clusters = clusters.len(),
            positions = positions.len(),
            "more clusters than layout slots; extra clusters are not rendered"
        );
    }

    clusters
        .iter()
        .zip(positions)
        .map(|(cluster, anchor)| {
            GraphNode::pinned_at(
                cluster_node_id(cluster.cluster_id),
                cluster.display_title(),
                NodeKind::Cluster {
                    cluster_id: cluster.cluster_id,
                    summary: cluster.summary.clone(),
                },
                *anchor,
            )
        })
        .collect()
}

fn cluster_anchors(cluster_nodes: &[GraphNode]) -> HashMap<ClusterId, Pos2> {
    cluster_nodes
        .iter()
        .filter_map(|node| node.cluster_id().map(|id| (id, node.fixed)))
        .collect()
}

pub fn create_question_nodes(
    questions: &[Question],
    cluster_nodes: &[GraphNode],
    width: f32,
    height: f32,
) -> Vec<GraphNode> {
    let anchors = cluster_anchors(cluster_nodes);
    let ids = question_node_ids(questions);

    let mut accepted = Vec::with_capacity(questions.len());
    let mut totals: HashMap<ClusterId, usize> = HashMap::new();
    for (question, id) in questions.iter().zip(&ids) {
        let Some(primary) = question.primary_cluster() else {
            warn!(question = %id, "question has no cluster memberships; skipping");
            continue;
        };
        if !anchors.contains_key(&primary) {
            warn!(question = %id, cluster = primary, "primary cluster missing; skipping question");
            continue;
        }
        *totals.entry(primary).or_default() += 1;
        accepted.push((question, id, primary));
    }

    let mut ranks: HashMap<ClusterId, usize> = HashMap::new();
    accepted
        .into_iter()
        .filter_map(|(question, id, primary)| {
            let anchor = anchors.get(&primary)?;
            let rank = ranks.entry(primary).or_default();
            let position = calculate_question_position(
                *rank,
                totals.get(&primary).copied().unwrap_or(1),
                anchor.x,
                anchor.y,
                width,
                height,
            );
            *rank += 1;

            Some(GraphNode::pinned_at(
                id.clone(),
                question.question.clone(),
                NodeKind::Question {
                    country: question.country_code.clone(),
                    date: question
                        .case_created_date
                        .get(..10)
                        .unwrap_or(question.case_created_date.as_str())
                        .to_string(),
                    drug: question.product.clone(),
                    cluster_ids: question.clusters.clone(),
                },
                position,
            ))
        })
        .collect()
}

/// Fixed backbone among clusters 0-4; clusters past 4 get no backbone edges.
pub fn create_cluster_links(clusters: &[Cluster]) -> Vec<GraphLink> {
    let exists = |id: ClusterId| clusters.iter().any(|cluster| cluster.cluster_id == id);

    BACKBONE
        .iter()
        .filter(|(source, target)| exists(*source) && exists(*target))
        .map(|(source, target)| GraphLink {
            source: cluster_node_id(*source),
            target: cluster_node_id(*target),
            kind: LinkKind::Backbone,
        })
        .collect()
}

pub fn create_question_links(questions: &[Question], cluster_nodes: &[GraphNode]) -> Vec<GraphLink> {
    let anchors = cluster_anchors(cluster_nodes);
    let ids = question_node_ids(questions);

    let mut links = Vec::new();
    for (question, id) in questions.iter().zip(&ids) {
        let Some(primary) = question.primary_cluster() else {
            continue;
        };
        if !anchors.contains_key(&primary) {
            continue;
        }

        for &cluster_id in &question.clusters {
            if !anchors.contains_key(&cluster_id) {
                warn!(question = %id, cluster = cluster_id, "linked cluster missing; skipping link");
                continue;
            }
            links.push(GraphLink {
                source: id.clone(),
                target: cluster_node_id(cluster_id),
                kind: LinkKind::Membership(cluster_id),
            });
        }
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::layout::calculate_cluster_positions;

    fn cluster(cluster_id: ClusterId) -> Cluster {
        Cluster {
            cluster_id,
            title: format!("\"Topic {cluster_id}\""),
            summary: format!("Summary {cluster_id}"),
        }
    }

    fn question(case_no: &str, clusters: &[ClusterId]) -> Question {
        Question {
            clusters: clusters.to_vec(),
            question: format!("Question {case_no}"),
            country_code: "US".into(),
            case_created_date: "2024-03-01T12:00:00Z".into(),
            product: "Alpha".into(),
            case_no: Some(case_no.into()),
        }
    }

    fn cluster_nodes(ids: &[ClusterId]) -> Vec<GraphNode> {
        let clusters = ids.iter().copied().map(cluster).collect::<Vec<_>>();
        let positions = calculate_cluster_positions(800.0, 600.0, clusters.len());
        create_cluster_nodes(&clusters, &positions)
    }

    #[test]
    fn cluster_nodes_are_pinned_at_their_slots() {
        let nodes = cluster_nodes(&[0, 1, 2]);
        let positions = calculate_cluster_positions(800.0, 600.0, 3);
        assert_eq!(nodes.len(), 3);
        for (node, anchor) in nodes.iter().zip(&positions) {
            assert!(node.pinned);
            assert_eq!(node.fixed, *anchor);
            assert_eq!(node.pos, *anchor);
        }
        assert_eq!(nodes[1].label, "Topic 1");
        assert_eq!(nodes[1].id, "cluster-1");
    }

    #[test]
    fn orphan_questions_are_dropped_without_panicking() {
        let clusters = cluster_nodes(&[0, 1]);
        let questions = vec![question("Q1", &[0]), question("ORPHAN", &[9, 0])];

        let nodes = create_question_nodes(&questions, &clusters, 800.0, 600.0);
        assert_eq!(nodes.len(), 1);
        assert!(nodes.iter().all(|node| node.id != "question-ORPHAN"));

        let links = create_question_links(&questions, &clusters);
        assert!(links.iter().all(|link| link.source != "question-ORPHAN"));
    }

    #[test]
    fn questions_orbit_their_primary_cluster() {
        let clusters = cluster_nodes(&[0, 1]);
        let questions = vec![question("A", &[1]), question("B", &[1, 0]), question("C", &[0])];
        let nodes = create_question_nodes(&questions, &clusters, 800.0, 600.0);

        let orbit = crate::graph::layout::calculate_sizes(800.0, 600.0).question_orbit_radius;
        for node in &nodes {
            let primary = node.primary_cluster().expect("question has clusters");
            let anchor = clusters
                .iter()
                .find(|cluster| cluster.cluster_id() == Some(primary))
                .expect("anchor")
                .fixed;
            assert!(((node.fixed - anchor).length() - orbit).abs() < 1e-2);
            assert!(node.pinned);
        }
        assert!(matches!(&nodes[0].kind, NodeKind::Question { date, .. } if date == "2024-03-01"));
    }

    #[test]
    fn backbone_only_connects_existing_clusters() {
        let links = create_cluster_links(&[cluster(0), cluster(1), cluster(3)]);
        let pairs = links
            .iter()
            .map(|link| (link.source.as_str(), link.target.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(pairs, vec![("cluster-0", "cluster-1"), ("cluster-1", "cluster-3")]);
        assert!(links.iter().all(|link| link.kind == LinkKind::Backbone));
        assert_eq!(LinkKind::Backbone.wire_cluster_id(), -1);
    }

    #[test]
    fn large_datasets_keep_only_the_fixed_backbone() {
        let clusters = (0..9).map(cluster).collect::<Vec<_>>();
        let links = create_cluster_links(&clusters);
        assert_eq!(links.len(), 5);
        assert!(
            links
                .iter()
                .all(|link| !link.source.ends_with(['5', '6', '7', '8'])
                    && !link.target.ends_with(['5', '6', '7', '8']))
        );
    }

    #[test]
    fn multi_cluster_question_links_to_each_cluster() {
        let clusters = cluster_nodes(&[0, 1]);
        let links = create_question_links(&[question("Q1", &[0, 1, 7])], &clusters);
        assert_eq!(links.len(), 2);
        for link in &links {
            let LinkKind::Membership(cluster_id) = link.kind else {
                panic!("question links carry their cluster");
            };
            assert_eq!(link.target, cluster_node_id(cluster_id));
            let target = clusters
                .iter()
                .find(|node| node.id == link.target)
                .expect("target exists");
            assert_eq!(target.cluster_id(), Some(cluster_id));
        }
    }
}
