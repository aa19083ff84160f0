//! Per-zone results and the per-raster results table

use crate::landscape::{ClassMetrics, InvalidWindow, LandCoverClass, LandscapeMetrics};

use super::params::MetricSet;

/// Result of one (zone, raster) computation
#[derive(Debug, Clone, PartialEq)]
pub enum ZoneOutcome {
    /// Metrics of the requested set; the other set is `None`
    Computed {
        class: Option<ClassMetrics>,
        landscape: Option<LandscapeMetrics>,
    },
    /// No window could be extracted; every metric reads as NaN
    Invalid(InvalidWindow),
}

/// One output record, keyed by the zone's position in its layer
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsRow {
    pub zone_id: usize,
    pub outcome: ZoneOutcome,
}

impl MetricsRow {
    pub fn is_valid(&self) -> bool {
        matches!(self.outcome, ZoneOutcome::Computed { .. })
    }

    /// `ok` or the reason the zone was skipped
    pub fn status(&self) -> &'static str {
        match &self.outcome {
            ZoneOutcome::Computed { .. } => "ok",
            ZoneOutcome::Invalid(reason) => reason.as_str(),
        }
    }

    /// Metric values aligned with [`MetricSet::columns`]
    pub fn values(&self, metric_set: MetricSet) -> Vec<f64> {
        let (class, landscape) = match &self.outcome {
            ZoneOutcome::Computed { class, landscape } => (class.as_ref(), landscape.as_ref()),
            ZoneOutcome::Invalid(_) => (None, None),
        };

        let mut values = Vec::with_capacity(15);
        if metric_set.includes_class() {
            for c in LandCoverClass::ALL {
                values.push(class.map_or(f64::NAN, |m| m.pd(c)));
                values.push(class.map_or(f64::NAN, |m| m.ed(c)));
            }
        }
        if metric_set.includes_landscape() {
            values.push(landscape.map_or(f64::NAN, |m| m.shdi));
            values.push(landscape.map_or(f64::NAN, |m| m.lpi));
            values.push(landscape.map_or(f64::NAN, |m| m.contag));
        }
        values
    }
}

/// All zone rows for one raster, in zone order
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsTable {
    /// Label derived from the raster name, used in the output file name
    pub label: String,
    /// Raster name the table was computed from
    pub source: String,
    pub metric_set: MetricSet,
    pub rows: Vec<MetricsRow>,
}

impl MetricsTable {
    pub fn columns(&self) -> Vec<String> {
        self.metric_set.columns()
    }

    pub fn invalid_zones(&self) -> usize {
        self.rows.iter().filter(|r| !r.is_valid()).count()
    }
}

/// Round to four decimals for output; NaN passes through
pub fn round4(value: f64) -> f64 {
    if value.is_finite() {
        (value * 10_000.0).round() / 10_000.0
    } else {
        value
    }
}
