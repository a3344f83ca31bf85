use eframe::egui::{self, RichText, Sense, Ui, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::data::{ClusterId, Question, question_node_ids};
use crate::graph::{NarrativeStep, cluster_color};
use crate::util::truncate_label;

use super::super::ViewModel;

const SEARCH_RESULT_LIMIT: usize = 20;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

/// Best score across the searchable fields of a question.
fn question_score(matcher: &SkimMatcherV2, question: &Question, query: &str) -> Option<i64> {
    [
        Some(question.question.as_str()),
        question.case_no.as_deref(),
        Some(question.product.as_str()),
    ]
    .into_iter()
    .flatten()
    .filter_map(|text| fuzzy_match_score(matcher, text, query))
    .max()
}

/// Question indices ordered by descending score, ties kept in data order.
pub(in crate::app) fn search_questions(questions: &[Question], query: &str, limit: usize) -> Vec<usize> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    let matcher = SkimMatcherV2::default();
    let mut scored = questions
        .iter()
        .enumerate()
        .filter_map(|(index, question)| {
            question_score(&matcher, question, query).map(|score| (index, score))
        })
        .collect::<Vec<_>>();
    scored.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    scored.into_iter().take(limit).map(|(index, _)| index).collect()
}

fn color_dot(ui: &mut Ui, cluster_id: ClusterId) {
    let (rect, _) = ui.allocate_exact_size(vec2(10.0, 10.0), Sense::hover());
    ui.painter()
        .circle_filled(rect.center(), 4.5, cluster_color(cluster_id));
}

impl ViewModel {
    pub(in crate::app) fn draw_narrative(&mut self, ui: &mut Ui, now: f64) {
        let Some(step) = self.graph.as_ref().map(|graph| graph.narrative_step()) else {
            ui.heading("Narrative");
            ui.label("Waiting for the graph area.");
            return;
        };
        let total = self.graph.as_ref().map_or(1, |graph| graph.total_steps());

        match step {
            NarrativeStep::Overview => {
                ui.heading("Overview");
                ui.label(format!(
                    "{} clusters, {} questions. Step through the clusters to focus each topic.",
                    self.loaded.dataset.clusters.len(),
                    self.loaded.dataset.questions.len()
                ));
            }
            NarrativeStep::Focused(cluster_id) => match self.loaded.dataset.cluster(cluster_id) {
                Some(cluster) => {
                    ui.horizontal(|ui| {
                        color_dot(ui, cluster_id);
                        ui.heading(cluster.display_title());
                    });
                    if !cluster.summary.is_empty() {
                        ui.label(cluster.summary.as_str());
                    }
                    let members = self
                        .loaded
                        .dataset
                        .questions
                        .iter()
                        .filter(|question| question.clusters.contains(&cluster_id))
                        .count();
                    ui.small(format!("{members} questions in this cluster"));
                }
                None => {
                    ui.heading(format!("Cluster {cluster_id}"));
                    ui.label("This cluster is not part of the current data.");
                }
            },
        }

        ui.add_space(6.0);
        let mut requested_step = None;
        ui.horizontal(|ui| {
            let current = step.index();
            if ui.add_enabled(current > 0, egui::Button::new("< Previous")).clicked() {
                requested_step = Some(current - 1);
            }
            ui.label(format!("{current} / {}", total - 1));
            if ui
                .add_enabled(current + 1 < total, egui::Button::new("Next >"))
                .clicked()
            {
                requested_step = Some(current + 1);
            }
        });

        if let Some(graph) = &self.graph {
            let highlighted = graph.highlighted_clusters();
            if !highlighted.is_empty() {
                ui.horizontal(|ui| {
                    ui.small("highlighted:");
                    for cluster_id in highlighted {
                        color_dot(ui, cluster_id);
                    }
                });
            }
        }

        ui.separator();
        ui.label(RichText::new("Clusters").strong());
        for cluster in &self.loaded.dataset.clusters {
            ui.horizontal(|ui| {
                color_dot(ui, cluster.cluster_id);
                let selected = step.focused() == Some(cluster.cluster_id);
                let title = truncate_label(&cluster.display_title(), 40);
                if ui.selectable_label(selected, title).clicked() {
                    requested_step = usize::try_from(cluster.cluster_id).ok().map(|id| id + 1);
                }
            });
        }

        ui.separator();
        ui.label(RichText::new("Find a question").strong());
        ui.add(egui::TextEdit::singleline(&mut self.search).hint_text("text, case number or product"));

        let results = search_questions(&self.loaded.dataset.questions, &self.search, SEARCH_RESULT_LIMIT);
        let node_ids = question_node_ids(&self.loaded.dataset.questions);
        let mut activated = None;
        if !self.search.trim().is_empty() && results.is_empty() {
            ui.small("No matching questions.");
        }
        egui::ScrollArea::vertical()
            .id_salt("question_search")
            .show(ui, |ui| {
                for index in results {
                    let question = &self.loaded.dataset.questions[index];
                    ui.horizontal(|ui| {
                        for &cluster_id in &question.clusters {
                            color_dot(ui, cluster_id);
                        }
                        let label = truncate_label(&question.question, 60);
                        let response = ui
                            .selectable_label(false, label)
                            .on_hover_text(question.question.as_str());
                        if response.clicked() {
                            activated = Some(index);
                        }
                    });
                }
            });

        if let Some(step) = requested_step
            && let Some(graph) = self.graph.as_mut()
        {
            graph.set_step(step, now);
        }

        if let Some(index) = activated
            && let Some(node_id) = node_ids.get(index)
        {
            self.activate_search_result(index, node_id, now);
        }
    }

    /// Multi-cluster questions are highlighted as if clicked; any other
    /// question moves the narrative to its primary cluster.
    fn activate_search_result(&mut self, index: usize, node_id: &str, now: f64) {
        let Some(question) = self.loaded.dataset.questions.get(index) else {
            return;
        };
        let Some(graph) = self.graph.as_mut() else {
            return;
        };

        if question.is_multi_cluster() {
            if let Some(focus) = graph.narrative_step().focused()
                && !question.clusters.contains(&focus)
            {
                graph.set_step(0, now);
            }
            if let Some(click) = graph.activate_question(node_id, now) {
                self.notify_click(&click, now);
            }
            return;
        }

        if let Some(primary) = question
            .primary_cluster()
            .and_then(|id| usize::try_from(id).ok())
        {
            graph.set_step(primary + 1, now);
        }
    }
}
