//! Batch driver: many rasters against one zone layer

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use landpattern_core::io::read_class_raster;
use landpattern_core::{ClassCode, Raster, Result, ZoneLayer};

use super::driver::zonal_landscape_metrics;
use super::label::LabelRules;
use super::params::MetricsParams;
use super::sink::TableSink;
use super::table::MetricsTable;

/// Something that yields a named class raster
pub trait RasterSource<T: ClassCode> {
    /// Name used to derive the table label
    fn name(&self) -> String;
    fn load(&self) -> Result<Raster<T>>;
}

/// Single band of a GeoTIFF file
#[derive(Debug, Clone)]
pub struct GeoTiffSource {
    pub path: PathBuf,
    /// 1-based band index; `None` reads the first band
    pub band: Option<usize>,
}

impl GeoTiffSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            band: None,
        }
    }
}

impl<T: ClassCode> RasterSource<T> for GeoTiffSource {
    /// File stem, e.g. `landcover_2020` for `landcover_2020.tif`
    fn name(&self) -> String {
        file_stem(&self.path)
    }

    fn load(&self) -> Result<Raster<T>> {
        read_class_raster(&self.path, self.band)
    }
}

/// A raster already in memory
#[derive(Debug, Clone)]
pub struct InMemorySource<T: ClassCode> {
    pub name: String,
    pub raster: Raster<T>,
}

impl<T: ClassCode> RasterSource<T> for InMemorySource<T> {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn load(&self) -> Result<Raster<T>> {
        Ok(self.raster.clone())
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Rows and invalid zones of a raster that made it to the sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterSummary {
    pub rows: usize,
    pub invalid_zones: usize,
}

/// Outcome of one raster in a batch
#[derive(Debug)]
pub struct RasterReport {
    pub source: String,
    pub label: String,
    pub outcome: Result<RasterSummary>,
}

impl RasterReport {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Compute and emit one table per raster source.
///
/// A failing raster (unreadable, wrong CRS, malformed class domain, sink
/// error) is logged and reported; the remaining rasters still run. When two
/// sources map to the same label, later ones get a `_2`, `_3`, ... suffix so
/// no output file is overwritten.
pub fn run_batch<T, S, K>(
    sources: &[S],
    zones: &ZoneLayer,
    params: &MetricsParams,
    labels: &LabelRules,
    sink: &mut K,
) -> Vec<RasterReport>
where
    T: ClassCode,
    S: RasterSource<T>,
    K: TableSink + ?Sized,
{
    let mut seen: HashMap<String, usize> = HashMap::new();

    sources
        .iter()
        .map(|source| {
            let name = source.name();
            let base = labels.label_for(&name).to_string();
            let count = seen.entry(base.clone()).or_insert(0);
            *count += 1;
            let label = if *count == 1 { base } else { format!("{}_{}", base, count) };

            let start = Instant::now();
            let outcome = process(source, &name, &label, zones, params, sink);
            match &outcome {
                Ok(summary) => tracing::info!(
                    source = %name,
                    %label,
                    zones = summary.rows,
                    invalid = summary.invalid_zones,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "raster processed"
                ),
                Err(e) => tracing::warn!(source = %name, %label, error = %e, "raster skipped"),
            }

            RasterReport {
                source: name,
                label,
                outcome,
            }
        })
        .collect()
}

fn process<T, S, K>(
    source: &S,
    name: &str,
    label: &str,
    zones: &ZoneLayer,
    params: &MetricsParams,
    sink: &mut K,
) -> Result<RasterSummary>
where
    T: ClassCode,
    S: RasterSource<T>,
    K: TableSink + ?Sized,
{
    let raster = source.load()?;
    let rows = zonal_landscape_metrics(&raster, zones, params)?;
    let table = MetricsTable {
        label: label.to_string(),
        source: name.to_string(),
        metric_set: params.metric_set,
        rows,
    };
    sink.write_table(&table, zones)?;

    Ok(RasterSummary {
        rows: table.rows.len(),
        invalid_zones: table.invalid_zones(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use landpattern_core::{Bounds, Error, GeoTransform, CRS};

    fn source(name: &str, crs: CRS) -> InMemorySource<u8> {
        let raster = Raster::from_vec(vec![1, 2, 3, 4], 2, 2)
            .unwrap()
            .with_transform(GeoTransform::new(0.0, 60.0, 30.0, -30.0))
            .with_crs(crs)
            .with_nodata(255);
        InMemorySource {
            name: name.into(),
            raster,
        }
    }

    fn zones() -> ZoneLayer {
        ZoneLayer::from_bounds(
            [Bounds::new(0.0, 0.0, 60.0, 60.0), Bounds::new(0.0, 0.0, 90.0, 60.0)],
            None,
        )
    }

    #[test]
    fn test_batch_continues_past_failure() {
        let sources = vec![
            source("lc_2015", CRS::utm_49n()),
            source("lc_2020", CRS::from_epsg(4326)),
            source("Simulation_run", CRS::utm_49n()),
        ];
        let mut tables: Vec<MetricsTable> = Vec::new();
        let reports = run_batch(&sources, &zones(), &MetricsParams::default(), &LabelRules::default(), &mut tables);

        assert_eq!(reports.len(), 3);
        assert!(reports[0].is_ok());
        assert!(matches!(reports[1].outcome, Err(Error::CrsMismatch { .. })));
        assert_eq!(reports[2].label, "2030_prediction");

        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].label, "2015_landcover");
        assert_eq!(tables[0].source, "lc_2015");
        assert_eq!(tables[1].label, "2030_prediction");

        let summary = reports[0].outcome.as_ref().unwrap();
        assert_eq!(summary.rows, 2);
        assert_eq!(summary.invalid_zones, 1);
    }

    #[test]
    fn test_duplicate_labels_are_suffixed() {
        let sources = vec![
            source("a", CRS::utm_49n()),
            source("b", CRS::utm_49n()),
            source("c", CRS::utm_49n()),
        ];
        let mut tables: Vec<MetricsTable> = Vec::new();
        let reports = run_batch(&sources, &zones(), &MetricsParams::default(), &LabelRules::default(), &mut tables);
        let labels: Vec<_> = reports.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["unknown", "unknown_2", "unknown_3"]);
    }

    #[test]
    fn test_missing_geotiff_is_reported() {
        let sources = vec![GeoTiffSource::new("/nonexistent/lc_2020.tif")];
        let mut tables: Vec<MetricsTable> = Vec::new();
        let reports = run_batch::<u8, _, _>(
            &sources,
            &zones(),
            &MetricsParams::default(),
            &LabelRules::default(),
            &mut tables,
        );
        assert_eq!(reports[0].source, "lc_2020");
        assert!(matches!(reports[0].outcome, Err(Error::Io(_))));
        assert!(tables.is_empty());
    }
}
