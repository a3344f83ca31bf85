mod app;
mod data;
mod graph;
mod util;

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use data::{ApiClient, DataSource, FilterSelection, Role, load_with_fallback};
use graph::{ClusterGraph, Dimensions, render_svg};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Read clusters and questions from a JSON file instead of the API.
    #[arg(long, conflicts_with = "api_url")]
    data: Option<PathBuf>,

    #[arg(long, env = "CLUSTER_LENS_API_URL")]
    api_url: Option<String>,

    #[arg(long, env = "CLUSTER_LENS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[arg(long, env = "CLUSTER_LENS_DEVICE_ID")]
    device_id: Option<String>,

    /// admin, analyst, product_manager or country_manager.
    #[arg(long, default_value = "analyst")]
    role: Role,

    #[arg(long = "product")]
    products: Vec<String>,

    #[arg(long = "country")]
    countries: Vec<String>,

    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=4))]
    quarter: Option<u8>,

    #[arg(long)]
    year: Option<i32>,

    /// Render the graph headlessly to an SVG file and exit.
    #[arg(long)]
    export_svg: Option<PathBuf>,

    /// Narrative step for the export: 0 is the overview, k focuses cluster k-1.
    #[arg(long, default_value_t = 0)]
    step: usize,

    #[arg(long, default_value_t = 1200.0)]
    width: f32,

    #[arg(long, default_value_t = 800.0)]
    height: f32,
}

impl Args {
    fn filters(&self) -> FilterSelection {
        FilterSelection {
            products: self.products.iter().cloned().collect::<BTreeSet<_>>(),
            countries: self.countries.iter().cloned().collect::<BTreeSet<_>>(),
            quarter: self.quarter,
            year: self.year,
        }
    }

    fn source(&self) -> anyhow::Result<DataSource> {
        if let Some(base_url) = &self.api_url {
            let client = ApiClient::new(base_url.clone(), self.token.clone(), self.device_id.clone())
                .context("building the cluster API client")?;
            return Ok(DataSource::Api(client));
        }
        Ok(match &self.data {
            Some(path) => DataSource::File(path.clone()),
            None => DataSource::Sample,
        })
    }
}

fn export_svg(args: &Args, source: &DataSource, path: &Path) -> anyhow::Result<()> {
    let loaded = load_with_fallback(source, &args.filters())
        .with_context(|| format!("loading clusters from {}", source.describe()))?;
    if loaded.dataset.is_empty() {
        warn!("no clusters matched; the export will be an empty canvas");
    }
    let dimensions = Dimensions::new(args.width, args.height).with_floor();

    let mut graph = ClusterGraph::new(loaded.dataset, dimensions, 0.0);
    let scene = graph.settled_scene(args.step);
    fs::write(path, render_svg(&scene))
        .with_context(|| format!("writing {}", path.display()))?;

    info!(
        path = %path.display(),
        step = graph.step(),
        width = dimensions.width,
        height = dimensions.height,
        sample = loaded.is_sample,
        "svg exported"
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("cluster_lens=info".parse()?))
        .init();

    let args = Args::parse();
    let source = args.source()?;

    if let Some(path) = &args.export_svg {
        return export_svg(&args, &source, path);
    }

    let config = app::AppConfig {
        source,
        role: args.role,
        initial_filters: args.filters(),
    };
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "cluster-lens",
        options,
        Box::new(move |cc| Ok(Box::new(app::ClusterLensApp::new(cc, config)))),
    )
    .map_err(|err| anyhow!("running the viewer: {err}"))
}
