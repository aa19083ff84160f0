//! landpattern CLI - zonal landscape-pattern metrics

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use landpattern_algorithms::landscape::{ClassDomainPolicy, LandCoverClass, SingleClassContagion};
use landpattern_algorithms::zonal::{
    run_batch, CsvSink, GeoJsonSink, GeoTiffSource, LabelRules, MetricSet, MetricsParams,
    RasterReport, TableSink,
};
use landpattern_core::io::{read_class_raster, read_zones};
use landpattern_core::{Raster, CRS};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "landpattern")]
#[command(author, version, about = "Zonal landscape-pattern metrics for land-cover rasters", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a land-cover raster
    Info {
        /// Input raster file
        input: PathBuf,
        /// Band to read (1-based)
        #[arg(long)]
        band: Option<usize>,
    },
    /// Compute PD, ED, SHDI, LPI and CONTAG per fishnet zone
    Metrics {
        /// Zone layer (GeoJSON FeatureCollection of polygons)
        #[arg(short, long)]
        zones: PathBuf,
        /// Land-cover rasters (GeoTIFF), one output table each
        #[arg(required = true)]
        rasters: Vec<PathBuf>,
        /// Output directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
        /// JSON config with `metrics` and `labels` sections
        #[arg(long)]
        config: Option<PathBuf>,
        /// Metric set: class, landscape or all
        #[arg(short, long)]
        metrics: Option<String>,
        /// Expected CRS of rasters and zones, e.g. EPSG:32649
        #[arg(long)]
        crs: Option<String>,
        /// Nodata sentinel, overriding the raster's own
        #[arg(long)]
        nodata: Option<u32>,
        /// Count codes outside 1..=6 in window totals instead of failing the raster
        #[arg(long)]
        lenient: bool,
        /// CONTAG for single-class zones
        #[arg(long, value_enum)]
        single_class: Option<SingleClassArg>,
        /// Output format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: OutputFormat,
        /// Band to read (1-based)
        #[arg(long)]
        band: Option<usize>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SingleClassArg {
    /// Report NaN
    Undefined,
    /// Report 100
    Maximal,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Geojson,
}

/// Config file layout; every section is optional
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    metrics: MetricsParams,
    labels: LabelRules,
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("Invalid config {}", path.display()))
        }
        None => Ok(Config::default()),
    }
}

fn read_landcover(path: &Path, band: Option<usize>) -> Result<Raster<u8>> {
    let pb = spinner("Reading raster...");
    let raster: Raster<u8> = read_class_raster(path, band).context("Failed to read raster")?;
    pb.finish_and_clear();
    info!("Input: {} x {}", raster.cols(), raster.rows());
    Ok(raster)
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

fn report(reports: &[RasterReport], written: &[PathBuf], elapsed: std::time::Duration) -> Result<()> {
    let mut written = written.iter();
    let mut failed = 0;

    for r in reports {
        match &r.outcome {
            Ok(summary) => {
                if let Some(path) = written.next() {
                    done(&format!("{} ({})", r.label, r.source), path, elapsed);
                }
                println!("  Zones: {} ({} without a usable window)", summary.rows, summary.invalid_zones);
            }
            Err(e) => {
                failed += 1;
                eprintln!("{}: {}", r.source, e);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} raster(s) failed", failed, reports.len());
    }
    Ok(())
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        // ── Info ─────────────────────────────────────────────────────
        Commands::Info { input, band } => {
            let raster = read_landcover(&input, band)?;
            let (rows, cols) = raster.shape();
            let bounds = raster.bounds();
            let (res_x, res_y) = raster.transform().resolution();

            println!("File: {}", input.display());
            println!("Dimensions: {} x {} ({} cells)", cols, rows, raster.len());
            println!("Cell size: {} x {}", res_x, res_y);
            println!(
                "Bounds: ({:.6}, {:.6}) - ({:.6}, {:.6})",
                bounds.0, bounds.1, bounds.2, bounds.3
            );
            match raster.crs() {
                Some(crs) => println!("CRS: {}", crs),
                None => println!("CRS: none"),
            }
            if let Some(nodata) = raster.nodata() {
                println!("NoData: {}", nodata);
            }

            println!("Classes:");
            for (code, count) in raster.class_histogram() {
                let name = LandCoverClass::from_code(u32::from(code))
                    .map(|c| c.name())
                    .unwrap_or("outside 1..=6");
                println!("  {:>3} {:<14} {}", code, name, count);
            }
        }

        // ── Metrics ──────────────────────────────────────────────────
        Commands::Metrics {
            zones,
            rasters,
            output,
            config,
            metrics,
            crs,
            nodata,
            lenient,
            single_class,
            format,
            band,
        } => {
            let Config {
                metrics: mut params,
                labels,
            } = load_config(config.as_deref())?;

            if let Some(set) = metrics {
                params.metric_set = set.parse::<MetricSet>()?;
            }
            if let Some(crs) = crs {
                params.expected_crs = crs.parse::<CRS>()?;
            }
            if nodata.is_some() {
                params.nodata = nodata;
            }
            if lenient {
                params.class_domain = ClassDomainPolicy::Lenient;
            }
            if let Some(choice) = single_class {
                params.single_class_contagion = match choice {
                    SingleClassArg::Undefined => SingleClassContagion::Undefined,
                    SingleClassArg::Maximal => SingleClassContagion::Maximal,
                };
            }

            let pb = spinner("Reading zones...");
            let layer = read_zones(&zones, &params.expected_crs).context("Failed to read zones")?;
            pb.finish_and_clear();
            info!("Zones: {} (expected CRS {})", layer.len(), params.expected_crs);
            if layer.is_empty() {
                warn!("Zone layer is empty; tables will have no rows");
            }

            let sources: Vec<GeoTiffSource> = rasters
                .into_iter()
                .map(|path| GeoTiffSource { path, band })
                .collect();

            let start = Instant::now();
            let pb = spinner(&format!("Computing metrics for {} raster(s)...", sources.len()));
            let (reports, written) = match format {
                OutputFormat::Csv => {
                    let mut sink = CsvSink::new(&output);
                    let reports = batch(&sources, &layer, &params, &labels, &mut sink);
                    (reports, sink.written().to_vec())
                }
                OutputFormat::Geojson => {
                    let mut sink = GeoJsonSink::new(&output);
                    let reports = batch(&sources, &layer, &params, &labels, &mut sink);
                    (reports, sink.written().to_vec())
                }
            };
            pb.finish_and_clear();

            report(&reports, &written, start.elapsed())?;
        }
    }

    Ok(())
}

fn batch<K: TableSink>(
    sources: &[GeoTiffSource],
    zones: &landpattern_core::ZoneLayer,
    params: &MetricsParams,
    labels: &LabelRules,
    sink: &mut K,
) -> Vec<RasterReport> {
    run_batch::<u8, _, _>(sources, zones, params, labels, sink)
}
