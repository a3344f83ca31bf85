use eframe::egui::{self, Align, Context, Layout, RichText};
use tracing::{debug, info};

use crate::data::{FilterSelection, FilterState, LoadedData, Role, visible_filters};
use crate::graph::{DimensionObserver, Phase, QuestionClick};

use super::super::graph::interaction::StepScroller;
use super::super::ViewModel;
use super::notification::Notification;

impl ViewModel {
    pub(in crate::app) fn new(loaded: LoadedData, role: Role, initial: FilterSelection) -> Self {
        Self {
            catalog: loaded.dataset.clone(),
            loaded,
            graph: None,
            observer: DimensionObserver::default(),
            role,
            visibility: visible_filters(role),
            filters: FilterState::new(initial),
            options_cache: None,
            search: String::new(),
            notification: None,
            scroller: StepScroller::default(),
        }
    }

    /// Takes a freshly loaded dataset. The filter catalog only grows from
    /// unfiltered loads so option lists never shrink to the current result.
    pub(in crate::app) fn apply_loaded(&mut self, loaded: LoadedData, now: f64) {
        if self.filters.applied.is_empty() {
            self.catalog = loaded.dataset.clone();
            self.options_cache = None;
        }
        if let Some(graph) = self.graph.as_mut() {
            graph.set_dataset(loaded.dataset.clone(), now);
        }
        info!(
            questions = loaded.dataset.questions.len(),
            sample = loaded.is_sample,
            "graph data replaced"
        );
        self.loaded = loaded;
    }

    /// Takes an unfiltered load as the source of filter options. A sample
    /// fallback never replaces the options of real data.
    pub(in crate::app) fn apply_catalog(&mut self, loaded: LoadedData) {
        if loaded.is_sample && !self.loaded.is_sample {
            debug!("catalog load fell back to sample data; keeping current options");
            return;
        }
        info!(questions = loaded.dataset.questions.len(), "filter catalog loaded");
        self.catalog = loaded.dataset;
        self.options_cache = None;
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        source_label: &str,
        reload_request: &mut Option<FilterSelection>,
        is_loading: bool,
    ) {
        let now = ctx.input(|input| input.time);

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("cluster-lens");
                    ui.separator();
                    ui.label(format!("source: {source_label}"));
                    ui.label(format!("clusters: {}", self.loaded.dataset.clusters.len()));
                    ui.label(format!("questions: {}", self.loaded.dataset.questions.len()));
                    ui.label(format!("role: {}", self.role));
                    if self.loaded.is_sample {
                        ui.label(
                            RichText::new("sample data")
                                .color(egui::Color32::from_rgb(214, 120, 40)),
                        )
                        .on_hover_text(
                            self.loaded
                                .fallback_reason
                                .as_deref()
                                .unwrap_or("no data source configured"),
                        );
                    }
                    let reload_button = ui.add_enabled(!is_loading, egui::Button::new("Reload"));
                    if reload_button.clicked() {
                        *reload_request = Some(self.filters.applied.clone());
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if let Some(graph) = &self.graph {
                            let phase = match graph.phase(now) {
                                Phase::Settling => "settling",
                                Phase::Animating => "animating",
                                Phase::Idle => "idle",
                            };
                            let dimensions = graph.dimensions();
                            ui.label(format!(
                                "step {} / {}  |  {phase}",
                                graph.step(),
                                graph.total_steps() - 1
                            ))
                            .on_hover_text(format!(
                                "{} nodes shown, {} links, {:.0}x{:.0}",
                                graph.cluster_count() + graph.question_count(),
                                graph.link_count(),
                                dimensions.width,
                                dimensions.height
                            ));
                        }
                    });
                });
            });

        egui::SidePanel::left("filters")
            .resizable(true)
            .default_width(280.0)
            .show(ctx, |ui| {
                if let Some(selection) = self.draw_filters(ui, is_loading) {
                    *reload_request = Some(selection);
                }
            });

        egui::SidePanel::right("narrative")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| self.draw_narrative(ui, now));

        egui::CentralPanel::default().show(ctx, |ui| {
            if is_loading && self.graph.is_none() {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Loading question clusters...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
            } else {
                self.draw_graph(ui, now);
            }
        });

        self.draw_notification(ctx, now);
    }

    pub(in crate::app) fn notify_click(&mut self, click: &QuestionClick, now: f64) {
        self.notification = Some(Notification::from_click(click, &self.loaded.dataset, now));
    }
}
