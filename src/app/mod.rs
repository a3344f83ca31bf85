use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context};
use tracing::warn;

use crate::data::{
    DataSource, Dataset, FetchError, FilterOptions, FilterSelection, FilterState,
    FilterVisibility, LoadedData, Role, load_with_fallback,
};
use crate::graph::{ClusterGraph, DimensionObserver};

mod graph;
mod render_utils;
mod ui;

use graph::interaction::StepScroller;
use ui::notification::Notification;

type LoadResult = Result<LoadedData, FetchError>;

/// Startup configuration resolved from the command line.
pub struct AppConfig {
    pub source: DataSource,
    pub role: Role,
    pub initial_filters: FilterSelection,
}

pub struct ClusterLensApp {
    loader: Loader,
    role: Role,
    state: AppState,
}

/// Background loads in flight. Each pending receiver doubles as the guard
/// against starting the same kind of load twice.
struct Loader {
    source: Arc<DataSource>,
    last_selection: FilterSelection,
    reload_rx: Option<Receiver<LoadResult>>,
    catalog_rx: Option<Receiver<LoadResult>>,
}

impl Loader {
    fn new(source: DataSource) -> Self {
        Self {
            source: Arc::new(source),
            last_selection: FilterSelection::default(),
            reload_rx: None,
            catalog_rx: None,
        }
    }

    fn spawn(&self, selection: FilterSelection) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();
        let source = Arc::clone(&self.source);

        thread::spawn(move || {
            let result = load_with_fallback(&source, &selection);
            let _ = tx.send(result);
        });

        rx
    }

    /// Starts the primary load. A filtered start also fetches the unfiltered
    /// dataset so filter options are not limited to the filtered rows.
    fn start(&mut self, selection: FilterSelection) -> AppState {
        self.reload_rx = None;
        self.request_catalog(&selection);
        self.last_selection = selection.clone();
        AppState::Loading {
            rx: self.spawn(selection),
        }
    }

    fn retry(&mut self) -> AppState {
        self.start(self.last_selection.clone())
    }

    fn request_catalog(&mut self, selection: &FilterSelection) -> bool {
        if selection.is_empty() || self.catalog_rx.is_some() {
            return false;
        }
        self.catalog_rx = Some(self.spawn(FilterSelection::default()));
        true
    }

    fn request_reload(&mut self, selection: FilterSelection) -> bool {
        if self.reload_rx.is_some() {
            return false;
        }
        self.last_selection = selection.clone();
        self.reload_rx = Some(self.spawn(selection));
        true
    }

    fn is_reloading(&self) -> bool {
        self.reload_rx.is_some()
    }
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    Error(FetchError),
}

struct ViewModel {
    loaded: LoadedData,
    catalog: Dataset,
    graph: Option<ClusterGraph>,
    observer: DimensionObserver,
    role: Role,
    visibility: FilterVisibility,
    filters: FilterState,
    options_cache: Option<(FilterSelection, FilterOptions)>,
    search: String,
    notification: Option<Notification>,
    scroller: StepScroller,
}

impl ClusterLensApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let mut loader = Loader::new(config.source);
        let state = loader.start(config.initial_filters);
        Self {
            loader,
            role: config.role,
            state,
        }
    }
}

impl ViewModel {
    fn poll_catalog(&mut self, loader: &mut Loader, ctx: &Context) {
        let Some(rx) = loader.catalog_rx.take() else {
            return;
        };
        match rx.try_recv() {
            Ok(Ok(loaded)) => self.apply_catalog(loaded),
            Ok(Err(error)) => warn!(%error, "filter catalog load failed"),
            Err(TryRecvError::Empty) => {
                loader.catalog_rx = Some(rx);
                ctx.request_repaint();
            }
            Err(TryRecvError::Disconnected) => warn!("filter catalog worker disconnected"),
        }
    }
}

impl eframe::App for ClusterLensApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;
        let now = ctx.input(|input| input.time);

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(Ok(loaded)) => {
                        transition = Some(AppState::Ready(Box::new(ViewModel::new(
                            loaded,
                            self.role,
                            self.loader.last_selection.clone(),
                        ))));
                    }
                    Ok(Err(error)) => transition = Some(AppState::Error(error)),
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(AppState::Error(FetchError::Network(
                            "background load worker disconnected".to_owned(),
                        )));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading question clusters...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    if error.is_auth() {
                        ui.heading("Not authorised to load question clusters");
                        ui.add_space(6.0);
                        ui.label("Check the API token and device id, then retry.");
                    } else {
                        ui.heading("Failed to load question clusters");
                    }
                    ui.add_space(6.0);
                    ui.label(error.to_string());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(self.loader.retry());
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_request = None;
                let source_label = self.loader.source.describe();
                model.show(ctx, &source_label, &mut reload_request, self.loader.is_reloading());

                if let Some(selection) = reload_request {
                    self.loader.request_reload(selection);
                }
                model.poll_catalog(&mut self.loader, ctx);

                if let Some(rx) = self.loader.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(Ok(loaded)) => model.apply_loaded(loaded, now),
                        Ok(Err(error)) => transition = Some(AppState::Error(error)),
                        Err(TryRecvError::Empty) => {
                            self.loader.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition = Some(AppState::Error(FetchError::Network(
                                "background load worker disconnected".to_owned(),
                            )));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.loader.reload_rx = None;
            self.state = next_state;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sample_dataset;

    fn us_only() -> FilterSelection {
        FilterSelection {
            countries: ["US".to_string()].into(),
            ..FilterSelection::default()
        }
    }

    fn receive(rx: Receiver<LoadResult>) -> LoadedData {
        rx.recv()
            .expect("load worker replies")
            .expect("sample data loads")
    }

    #[test]
    fn filtered_start_also_loads_the_unfiltered_catalog() {
        let mut loader = Loader::new(DataSource::Sample);
        let AppState::Loading { rx } = loader.start(us_only()) else {
            panic!("start begins loading");
        };
        assert!(!loader.request_catalog(&us_only()));

        let primary = receive(rx);
        assert!(primary.dataset.questions.iter().all(|q| q.country_code == "US"));
        let catalog = receive(loader.catalog_rx.take().expect("catalog load pending"));
        assert_eq!(catalog.dataset.questions.len(), sample_dataset().questions.len());
    }

    #[test]
    fn unfiltered_start_needs_no_catalog_load() {
        let mut loader = Loader::new(DataSource::Sample);
        let _state = loader.start(FilterSelection::default());
        assert!(loader.catalog_rx.is_none());
    }

    #[test]
    fn retry_uses_the_last_requested_selection() {
        let mut loader = Loader::new(DataSource::Sample);
        let _state = loader.start(FilterSelection::default());
        assert!(loader.request_reload(us_only()));
        assert!(!loader.request_reload(FilterSelection::default()));

        let AppState::Loading { rx } = loader.retry() else {
            panic!("retry begins loading");
        };
        assert_eq!(loader.last_selection, us_only());
        assert!(!loader.is_reloading());
        let loaded = receive(rx);
        assert!(loaded.dataset.questions.iter().all(|q| q.country_code == "US"));
    }
}
