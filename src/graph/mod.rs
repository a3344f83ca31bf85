mod animate;
mod build;
mod highlight;
mod layout;
mod physics;
mod scene;
mod step;
mod svg;
mod tooltip;
mod tween;
mod viewport;

use std::collections::HashMap;

use eframe::egui::Pos2;
use tracing::{debug, info};

use crate::data::{ClusterId, Dataset};

use animate::{StyleTargets, Visuals, initial_targets, step_targets};
use build::{
    GraphLink, GraphNode, create_cluster_links, create_cluster_nodes, create_question_links,
    create_question_nodes,
};
use highlight::{
    ActiveHighlight, HIGHLIGHT_REVERT_SECS, HIGHLIGHT_TRANSITION_SECS, click_allowed,
    connected_clusters, highlight_targets,
};
use layout::{Sizes, calculate_cluster_positions, calculate_sizes};
use physics::Simulation;
use scene::{Hit, SceneInputs, build_scene, cluster_tooltip, hit_test, question_tooltip};
use tween::STEP_TRANSITION_SECS;

pub use highlight::QuestionClick;
pub use scene::{LABEL_COLOR, Scene, cluster_color};
pub use step::{NarrativeStep, clamp_step, total_steps};
pub use svg::render_svg;
pub use tooltip::TooltipView;
pub use viewport::{DimensionObserver, Dimensions};

use tooltip::TooltipService;

/// Lifecycle of the current graph: elements are built, the simulation
/// settles them, then step and highlight transitions play.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Settling,
    Animating,
    Idle,
}

/// Owns the node/link collections, their simulation and animation state,
/// and the tooltip for one mounted graph.
pub struct ClusterGraph {
    dataset: Dataset,
    dimensions: Dimensions,
    sizes: Sizes,
    nodes: Vec<GraphNode>,
    cluster_indices: Vec<usize>,
    links: Vec<GraphLink>,
    link_endpoints: Vec<Option<(usize, usize)>>,
    simulation: Simulation,
    visuals: Visuals,
    step: NarrativeStep,
    highlight: Option<ActiveHighlight>,
    tooltip: TooltipService,
    hovered: Option<usize>,
}

impl ClusterGraph {
    pub fn new(dataset: Dataset, dimensions: Dimensions, now: f64) -> Self {
        let sizes = calculate_sizes(dimensions.width, dimensions.height);
        let mut graph = Self {
            dataset,
            dimensions,
            sizes,
            nodes: Vec::new(),
            cluster_indices: Vec::new(),
            links: Vec::new(),
            link_endpoints: Vec::new(),
            simulation: Simulation::new(&[], &[], &sizes, dimensions.center(), now),
            visuals: Visuals::default(),
            step: NarrativeStep::Overview,
            highlight: None,
            tooltip: TooltipService::default(),
            hovered: None,
        };
        graph.build(now);
        graph
    }

    /// Replaces the dataset, keeping the current step when it still exists.
    pub fn set_dataset(&mut self, dataset: Dataset, now: f64) {
        self.dataset = dataset;
        self.build(now);
    }

    /// Rebuilds at new dimensions; callers feed this from a
    /// [`DimensionObserver`] so sub-pixel jitter never triggers it.
    pub fn resize(&mut self, dimensions: Dimensions, now: f64) {
        if dimensions == self.dimensions {
            return;
        }
        self.dimensions = dimensions;
        self.sizes = calculate_sizes(dimensions.width, dimensions.height);
        self.build(now);
    }

    fn build(&mut self, now: f64) {
        let Dimensions { width, height } = self.dimensions;
        let positions = calculate_cluster_positions(width, height, self.dataset.clusters.len());
        let cluster_nodes = create_cluster_nodes(&self.dataset.clusters, &positions);
        let question_nodes =
            create_question_nodes(&self.dataset.questions, &cluster_nodes, width, height);

        let mut links = create_cluster_links(&self.dataset.clusters);
        links.extend(create_question_links(&self.dataset.questions, &cluster_nodes));

        self.cluster_indices = (0..cluster_nodes.len()).collect();
        let mut nodes = cluster_nodes;
        nodes.extend(question_nodes);

        let index_by_id = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.as_str(), index))
            .collect::<HashMap<_, _>>();
        self.link_endpoints = links
            .iter()
            .map(|link| {
                Some((
                    *index_by_id.get(link.source.as_str())?,
                    *index_by_id.get(link.target.as_str())?,
                ))
            })
            .collect();

        self.simulation = Simulation::new(&nodes, &links, &self.sizes, self.dimensions.center(), now);
        self.nodes = nodes;
        self.links = links;
        self.highlight = None;
        self.tooltip.hide_now();
        self.hovered = None;

        let initial = initial_targets(&self.nodes, &self.cluster_indices, &self.links, &self.sizes);
        self.visuals = Visuals::from_targets(&initial);

        let step = clamp_step(self.step.index(), self.dataset.clusters.len());
        self.step = NarrativeStep::from_index(step);
        let targets = self.step_targets();
        self.visuals.transition(&targets, now, STEP_TRANSITION_SECS);

        info!(
            clusters = self.cluster_indices.len(),
            questions = self.nodes.len() - self.cluster_indices.len(),
            links = self.links.len(),
            width,
            height,
            "graph built"
        );
    }

    fn step_targets(&self) -> StyleTargets {
        step_targets(
            &self.nodes,
            &self.cluster_indices,
            &self.links,
            &self.sizes,
            self.dimensions,
            self.step,
        )
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    pub fn cluster_count(&self) -> usize {
        self.dataset.clusters.len()
    }

    pub fn question_count(&self) -> usize {
        self.nodes.len() - self.cluster_indices.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn total_steps(&self) -> usize {
        total_steps(self.cluster_count())
    }

    pub fn step(&self) -> usize {
        self.step.index()
    }

    pub fn narrative_step(&self) -> NarrativeStep {
        self.step
    }

    pub fn phase(&self, now: f64) -> Phase {
        if self.simulation.is_running() {
            Phase::Settling
        } else if self.visuals.is_animating(now) || self.highlight.is_some() {
            Phase::Animating
        } else {
            Phase::Idle
        }
    }

    /// Moves to `step` (clamped). Every element animates toward the step's
    /// styling; an active highlight is dropped.
    pub fn set_step(&mut self, step: usize, now: f64) {
        let step = NarrativeStep::from_index(clamp_step(step, self.cluster_count()));
        debug!(from = self.step.index(), to = step.index(), "step change");
        self.step = step;
        self.highlight = None;
        let targets = self.step_targets();
        self.visuals.transition(&targets, now, STEP_TRANSITION_SECS);
    }

    /// Advances the simulation, deferred reverts and the tooltip debounce.
    /// Returns whether another frame is needed.
    pub fn advance(&mut self, now: f64) -> bool {
        if self.simulation.advance(&mut self.nodes, now) {
            self.visuals.sync_positions(&self.nodes, now);
        }

        if let Some(highlight) = &self.highlight
            && now >= highlight.revert_at
        {
            debug!(question = %highlight.question_id, "highlight reverted");
            self.highlight = None;
            let targets = self.step_targets();
            self.visuals
                .transition(&targets, now, HIGHLIGHT_TRANSITION_SECS);
        }

        let tooltip_changed = self.tooltip.update(now);
        tooltip_changed
            || self.simulation.is_running()
            || self.visuals.is_animating(now)
            || self.highlight.is_some()
            || self.tooltip.is_hide_pending()
    }

    /// Runs the fixed-tick settle used when no frame clock is available.
    pub fn settle_headless(&mut self) {
        self.simulation.run_headless(&mut self.nodes);
        debug!(ticks = self.simulation.ticks(), "headless settle finished");
        for (visual, node) in self.visuals.nodes.iter_mut().zip(&self.nodes) {
            if visual.position.target() == node.fixed {
                continue;
            }
            visual.position.set(node.pos);
        }
    }

    pub fn scene(&self, now: f64) -> Scene {
        let inputs = SceneInputs {
            nodes: &self.nodes,
            cluster_indices: &self.cluster_indices,
            links: &self.links,
            link_endpoints: &self.link_endpoints,
            visuals: &self.visuals,
            sizes: &self.sizes,
        };
        let mut scene = build_scene(&inputs, self.dimensions.width, self.dimensions.height, now);
        scene.tooltip = self.tooltip.view();
        scene
    }

    /// Shows the tooltip of the node under `point`; moving within the same
    /// node only re-anchors it.
    pub fn pointer_moved(&mut self, point: Pos2, now: f64) {
        let hit = hit_test(&self.nodes, &self.visuals, point, now);
        let index = match hit {
            Some(Hit::Cluster(index) | Hit::Question(index)) => index,
            None => {
                self.pointer_left(now);
                return;
            }
        };
        if self.hovered == Some(index) {
            self.tooltip.move_to(point);
            return;
        }

        self.hovered = Some(index);
        let content = match hit {
            Some(Hit::Question(_)) => question_tooltip(&self.nodes[index], &self.nodes, &self.links),
            _ => cluster_tooltip(&self.nodes[index]),
        };
        self.tooltip.show(content, point);
    }

    pub fn pointer_left(&mut self, now: f64) {
        self.hovered = None;
        self.tooltip.request_hide(now);
    }

    pub fn set_pointer_over_tooltip(&mut self, inside: bool, now: f64) {
        self.tooltip.set_pointer_inside(inside, now);
    }

    pub fn is_interactive(&self, point: Pos2, now: f64) -> bool {
        hit_test(&self.nodes, &self.visuals, point, now).is_some()
    }

    /// Handles a click in scene coordinates. Clicks on clusters are consumed
    /// without an event; only allowed multi-cluster questions report one.
    pub fn click(&mut self, point: Pos2, now: f64) -> Option<QuestionClick> {
        let Some(Hit::Question(index)) = hit_test(&self.nodes, &self.visuals, point, now) else {
            return None;
        };
        let id = self.nodes[index].id.clone();
        self.activate_question(&id, now)
    }

    /// Highlights every cluster linked to the question node `question_id`
    /// for [`HIGHLIGHT_REVERT_SECS`], when the current step allows it.
    pub fn activate_question(&mut self, question_id: &str, now: f64) -> Option<QuestionClick> {
        let node = self.nodes.iter().find(|node| node.id == question_id)?;
        if !click_allowed(node, self.step) {
            debug!(question = question_id, step = self.step.index(), "click ignored");
            return None;
        }

        let click = QuestionClick {
            question_id: node.id.clone(),
            cluster_ids: node.cluster_ids().to_vec(),
        };
        let connected = connected_clusters(question_id, &self.links);
        let base = self.step_targets();
        let targets = highlight_targets(
            &base,
            &self.nodes,
            &self.cluster_indices,
            &self.links,
            &self.sizes,
            &connected,
        );
        self.visuals
            .transition(&targets, now, HIGHLIGHT_TRANSITION_SECS);
        self.highlight = Some(ActiveHighlight {
            question_id: click.question_id.clone(),
            connected,
            revert_at: now + HIGHLIGHT_REVERT_SECS,
        });
        info!(question = %click.question_id, clusters = ?click.cluster_ids, "multi-cluster highlight");
        Some(click)
    }

    pub fn highlighted_clusters(&self) -> Vec<ClusterId> {
        self.highlight
            .as_ref()
            .map(|highlight| highlight.connected.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Settles, applies `step` and returns the scene with every transition
    /// finished, for headless export.
    pub fn settled_scene(&mut self, step: usize) -> Scene {
        self.settle_headless();
        self.set_step(step, 0.0);
        self.scene(STEP_TRANSITION_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Cluster, Question, sample_dataset};
    use eframe::egui::pos2;

    const DIMENSIONS: Dimensions = Dimensions::new(800.0, 600.0);

    fn two_cluster_dataset() -> Dataset {
        Dataset {
            clusters: vec![
                Cluster {
                    cluster_id: 0,
                    title: "Storage".into(),
                    summary: "Storage conditions".into(),
                },
                Cluster {
                    cluster_id: 1,
                    title: "Dosing".into(),
                    summary: "Dosing schedules".into(),
                },
            ],
            questions: vec![Question {
                clusters: vec![0, 1],
                question: "Can the pen be stored after the first dose?".into(),
                country_code: "US".into(),
                case_created_date: "2024-05-02T08:00:00Z".into(),
                product: "Alpha".into(),
                case_no: Some("Q1".into()),
            }],
        }
    }

    fn settled(dataset: Dataset) -> ClusterGraph {
        let mut graph = ClusterGraph::new(dataset, DIMENSIONS, 0.0);
        graph.settle_headless();
        graph
    }

    fn question_center(graph: &ClusterGraph, id: &str, now: f64) -> Pos2 {
        graph
            .scene(now)
            .question(id)
            .map(|question| question.center)
            .expect("question rendered")
    }

    #[test]
    fn two_clusters_sharing_a_question_end_to_end() {
        let mut graph = settled(two_cluster_dataset());
        let scene = graph.scene(2.0);

        assert_eq!(graph.step(), 0);
        assert_eq!(scene.clusters.len(), 2);
        assert!(scene.clusters.iter().all(|cluster| cluster.opacity == 1.0));
        assert_eq!(scene.questions.len(), 1);
        let outgoing = graph
            .links
            .iter()
            .filter(|link| link.source == "question-Q1")
            .map(|link| link.target.as_str())
            .collect::<Vec<_>>();
        assert_eq!(outgoing, vec!["cluster-0", "cluster-1"]);

        let center = question_center(&graph, "question-Q1", 2.0);
        let click = graph.click(center, 2.0);
        assert_eq!(
            click,
            Some(QuestionClick {
                question_id: "question-Q1".into(),
                cluster_ids: vec![0, 1],
            })
        );
        assert_eq!(graph.highlighted_clusters(), vec![0, 1]);
    }

    #[test]
    fn highlight_reverts_after_three_seconds() {
        let mut graph = settled(two_cluster_dataset());
        graph.set_step(1, 0.0);
        graph.advance(1.5);

        let center = question_center(&graph, "question-Q1", 1.5);
        assert!(graph.click(center, 2.0).is_some());

        graph.advance(2.6);
        let raised = graph.scene(2.6);
        let dimmed = raised.cluster(1).expect("cluster 1");
        assert!(dimmed.opacity >= 0.9);
        assert_eq!(dimmed.stroke_width, 4.0);

        graph.advance(4.99);
        assert!(graph.scene(4.99).cluster(1).expect("cluster 1").opacity >= 0.9);
        assert_eq!(graph.highlighted_clusters(), vec![0, 1]);

        graph.advance(5.0);
        assert!(graph.highlighted_clusters().is_empty());
        graph.advance(5.6);
        let reverted = graph.scene(5.6);
        assert!((reverted.cluster(1).expect("cluster 1").opacity - 0.05).abs() < 1e-4);
        assert_eq!(reverted.cluster(0).expect("cluster 0").opacity, 1.0);
        assert_eq!(graph.phase(5.6), Phase::Idle);
    }

    #[test]
    fn clicks_outside_the_focused_cluster_are_ignored() {
        let mut dataset = two_cluster_dataset();
        dataset.clusters.push(Cluster {
            cluster_id: 2,
            title: "Travel".into(),
            summary: String::new(),
        });
        let mut graph = settled(dataset);

        graph.set_step(3, 0.0);
        graph.advance(1.5);
        assert!(graph.activate_question("question-Q1", 1.5).is_none());

        graph.set_step(2, 1.5);
        graph.advance(3.0);
        assert!(graph.activate_question("question-Q1", 3.0).is_some());
    }

    #[test]
    fn single_cluster_question_never_reports_a_click() {
        let mut graph = settled(sample_dataset());
        let single = graph
            .nodes
            .iter()
            .find(|node| !node.is_cluster() && node.cluster_ids().len() == 1)
            .map(|node| node.id.clone())
            .expect("sample has single-cluster questions");

        for step in 0..graph.total_steps() {
            graph.set_step(step, step as f64 * 2.0);
            assert!(graph.activate_question(&single, step as f64 * 2.0 + 1.5).is_none());
        }
    }

    #[test]
    fn clicking_a_cluster_is_consumed_without_an_event() {
        let mut graph = settled(two_cluster_dataset());
        let cluster_center = graph.scene(2.0).cluster(0).expect("cluster").center;
        assert!(graph.click(cluster_center, 2.0).is_none());
        assert!(graph.is_interactive(cluster_center, 2.0));
        assert!(graph.highlighted_clusters().is_empty());
    }

    #[test]
    fn steps_are_clamped_and_focus_one_cluster() {
        let mut graph = settled(sample_dataset());
        assert_eq!(graph.total_steps(), 6);

        graph.set_step(42, 0.0);
        assert_eq!(graph.step(), 5);
        assert_eq!(graph.narrative_step(), NarrativeStep::Focused(4));

        let scene = graph.scene(1.0);
        let opaque = scene
            .clusters
            .iter()
            .filter(|cluster| cluster.opacity >= 1.0)
            .map(|cluster| cluster.cluster_id)
            .collect::<Vec<_>>();
        assert_eq!(opaque, vec![4]);
        assert_eq!(
            scene.cluster(4).expect("focused").center,
            DIMENSIONS.center()
        );
    }

    #[test]
    fn clusters_stay_on_anchors_after_settling() {
        let graph = settled(sample_dataset());
        for &index in &graph.cluster_indices {
            assert_eq!(graph.nodes[index].pos, graph.nodes[index].fixed);
        }
        assert_eq!(graph.phase(10.0), Phase::Idle);
    }

    #[test]
    fn new_data_keeps_a_valid_step() {
        let mut graph = settled(sample_dataset());
        graph.set_step(4, 0.0);
        graph.set_dataset(two_cluster_dataset(), 1.0);
        assert_eq!(graph.step(), 2);
        assert_eq!(graph.question_count(), 1);
        assert_eq!(graph.phase(1.0), Phase::Settling);
    }

    #[test]
    fn resize_rebuilds_layout() {
        let mut graph = settled(two_cluster_dataset());
        let before = graph.scene(2.0).cluster(0).expect("cluster").center;
        graph.resize(Dimensions::new(1200.0, 900.0), 3.0);
        graph.settle_headless();
        let after = graph.scene(5.0).cluster(0).expect("cluster").center;
        assert!((after - pos2(600.0, 198.0)).length() < 1e-3);
        assert_ne!(before, after);
    }

    #[test]
    fn hovering_shows_and_debounces_the_tooltip() {
        let mut graph = settled(two_cluster_dataset());
        let center = graph.scene(2.0).cluster(1).expect("cluster").center;

        graph.pointer_moved(center, 2.0);
        let tooltip = graph.scene(2.0).tooltip.expect("tooltip shown");
        assert_eq!(tooltip.content.title, "Dosing");

        graph.pointer_moved(pos2(1.0, 1.0), 2.1);
        assert!(graph.advance(2.2));
        assert!(graph.scene(2.2).tooltip.is_some());
        graph.advance(2.35);
        assert!(graph.scene(2.35).tooltip.is_none());
    }

    #[test]
    fn tooltip_follows_the_pointer_within_one_node() {
        let mut graph = settled(two_cluster_dataset());
        let center = graph.scene(2.0).cluster(1).expect("cluster").center;
        let nudged = center + eframe::egui::vec2(2.0, 1.0);

        graph.pointer_moved(center, 2.0);
        graph.pointer_moved(nudged, 2.1);
        let tooltip = graph.scene(2.1).tooltip.expect("tooltip shown");
        assert_eq!(tooltip.anchor, nudged);
        assert_eq!(tooltip.content.title, "Dosing");
        graph.advance(2.5);
        assert!(graph.scene(2.5).tooltip.is_some());
    }

    #[test]
    fn orphan_questions_do_not_break_the_build() {
        let mut dataset = two_cluster_dataset();
        dataset.questions.push(Question {
            clusters: vec![7],
            question: "Lost".into(),
            country_code: "FR".into(),
            case_created_date: "2024-01-01".into(),
            product: "Beta".into(),
            case_no: Some("Q2".into()),
        });
        let graph = settled(dataset);
        assert_eq!(graph.question_count(), 1);
        assert!(graph.scene(2.0).question("question-Q2").is_none());
    }

    #[test]
    fn exported_scene_finishes_transitions() {
        let mut graph = ClusterGraph::new(sample_dataset(), DIMENSIONS, 0.0);
        let scene = graph.settled_scene(1);
        assert_eq!(scene.cluster(0).expect("focused").center, DIMENSIONS.center());
        assert!(render_svg(&scene).contains("viewBox=\"0 0 800 600\""));
    }
}
