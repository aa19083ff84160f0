//! # landpattern algorithms
//!
//! Landscape-pattern metrics for land-cover rasters aggregated over zones.
//!
//! ## Modules
//!
//! - **landscape**: window extraction, class composition, rook adjacency and
//!   the PD, ED, SHDI, LPI and CONTAG formulas
//! - **zonal**: per-zone driver, result tables, sinks and the batch runner

pub mod landscape;
pub mod zonal;

pub(crate) mod maybe_rayon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::landscape::{
        extract_window, ClassMetrics, InvalidWindow, LandCoverClass, LandscapeMetrics,
        SingleClassContagion,
    };
    pub use crate::zonal::{
        run_batch, zonal_landscape_metrics, zone_metrics, ClassDomainPolicy, CsvSink,
        GeoJsonSink, GeoTiffSource, LabelRules, MetricSet, MetricsParams, MetricsRow,
        MetricsTable, RasterSource, TableSink, ZonalLandscapeMetrics, ZoneOutcome,
    };
    pub use landpattern_core::prelude::*;
}
