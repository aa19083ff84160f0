//! Zonal landscape metrics
//!
//! Drives the per-window landscape metrics over every zone of a fishnet:
//! - **Driver**: one row per zone, rasters validated against the expected CRS
//! - **Table**: rows with explicit valid/invalid outcomes
//! - **Sinks**: CSV and GeoJSON output, one file per raster
//! - **Batch**: several rasters against one zone layer

mod batch;
mod driver;
mod label;
mod params;
mod sink;
mod table;

pub use crate::landscape::ClassDomainPolicy;
pub use batch::{run_batch, GeoTiffSource, InMemorySource, RasterReport, RasterSource, RasterSummary};
pub use driver::{zonal_landscape_metrics, zone_metrics, ZonalLandscapeMetrics};
pub use label::{output_file_name, LabelRule, LabelRules};
pub use params::{MetricSet, MetricsParams};
pub use sink::{table_to_geojson, CsvSink, GeoJsonSink, TableSink};
pub use table::{round4, MetricsRow, MetricsTable, ZoneOutcome};
