//! market-lens CLI: load a sales CSV, apply filters, print views as JSON.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use serde::Serialize;

use market_lens::config::MapMarker;
use market_lens::{
    compute_view, Choice, DashboardConfig, Dataset, DatasetBounds, DateRange, FilterCriteria,
    FilterWarning, PriceRange, ViewKind, ViewOutput,
};

#[derive(Parser)]
#[command(
    name = "market-lens",
    about = "Filter real-estate sales and summarize them into dashboard views",
    version
)]
struct Cli {
    /// Configuration file
    #[arg(long, env = "MARKET_LENS_CONFIG", default_value = "market-lens.toml")]
    config: PathBuf,

    /// Sales CSV (overrides the configured path)
    #[arg(long)]
    data: Option<PathBuf>,

    /// First contract date, YYYY-MM-DD
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last contract date, YYYY-MM-DD
    #[arg(long)]
    to: Option<NaiveDate>,

    #[arg(long, default_value = "All")]
    project: String,

    #[arg(long, default_value = "All")]
    bedrooms: String,

    /// Market segment
    #[arg(long, default_value = "All")]
    segment: String,

    #[arg(long)]
    min_price: Option<f64>,

    #[arg(long)]
    max_price: Option<f64>,

    /// View to compute; repeat for several. Defaults to every view.
    #[arg(long = "view")]
    views: Vec<ViewKind>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct ControlOptions {
    projects: Vec<String>,
    bedrooms: Vec<String>,
    market_segments: Vec<String>,
}

#[derive(Serialize)]
struct Report<'a> {
    criteria: &'a FilterCriteria,
    matched_rows: usize,
    options: ControlOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    bounds: Option<&'a DatasetBounds>,
    #[serde(skip_serializing_if = "no_warnings")]
    warnings: &'a [FilterWarning],
    views: Vec<ViewOutput>,
    map_zoom: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    map_highlight: Option<&'a MapMarker>,
}

fn no_warnings(warnings: &&[FilterWarning]) -> bool {
    warnings.is_empty()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = DashboardConfig::load_from(&cli.config)?;
    let data_path = cli.data.clone().unwrap_or_else(|| config.data.path.clone());
    let dataset = Dataset::load_csv(&data_path, &config.data.load_options())?;

    let criteria = build_criteria(&cli, &dataset, config.filters.start_date_floor);
    let selection = dataset.filter(&criteria)?;
    for warning in selection.warnings() {
        tracing::warn!("{warning}");
    }

    let kinds = if cli.views.is_empty() {
        ViewKind::ALL.to_vec()
    } else {
        cli.views.clone()
    };
    let mut views = Vec::with_capacity(kinds.len());
    for kind in kinds {
        let output = compute_view(kind, selection.frame())?;
        if output.is_no_data() {
            eprintln!("{kind}: {}", kind.no_data_notice(selection.len()));
        }
        views.push(output);
    }

    let options = dataset.options();
    let report = Report {
        criteria: &criteria,
        matched_rows: selection.len(),
        options: ControlOptions {
            projects: options.project_choices(),
            bedrooms: options.bedroom_choices(),
            market_segments: options.market_segment_choices(),
        },
        bounds: dataset.bounds(),
        warnings: selection.warnings(),
        views,
        map_zoom: config.map.zoom,
        map_highlight: config.map.highlight.as_ref(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Control defaults from the dataset, overridden by whatever flags were given.
fn build_criteria(cli: &Cli, dataset: &Dataset, start_floor: Option<NaiveDate>) -> FilterCriteria {
    let defaults = dataset.default_criteria(start_floor).unwrap_or_else(|| {
        FilterCriteria::new(
            DateRange::new(NaiveDate::MIN, NaiveDate::MAX),
            PriceRange::new(0.0, f64::MAX),
        )
    });

    FilterCriteria {
        date_range: DateRange::new(
            cli.from.unwrap_or(defaults.date_range.start),
            cli.to.unwrap_or(defaults.date_range.end),
        ),
        project: Choice::from(cli.project.as_str()),
        bedrooms: Choice::from(cli.bedrooms.as_str()),
        price_range: PriceRange::new(
            cli.min_price.unwrap_or(defaults.price_range.min),
            cli.max_price.unwrap_or(defaults.price_range.max),
        ),
        market_segment: Choice::from(cli.segment.as_str()),
    }
}
