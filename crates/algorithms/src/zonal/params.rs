//! Parameters for zonal landscape metrics

use std::str::FromStr;

use landpattern_core::{ClassCode, Error, Raster, Result, CRS};
use serde::{Deserialize, Serialize};

use crate::landscape::{ClassDomainPolicy, LandCoverClass, SingleClassContagion};

/// Which metric columns are computed and emitted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricSet {
    /// PD_1..PD_6 and ED_1..ED_6
    ClassMetrics,
    /// SHDI, LPI and CONTAG
    LandscapeMetrics,
    #[default]
    All,
}

impl MetricSet {
    pub fn includes_class(self) -> bool {
        matches!(self, MetricSet::ClassMetrics | MetricSet::All)
    }

    pub fn includes_landscape(self) -> bool {
        matches!(self, MetricSet::LandscapeMetrics | MetricSet::All)
    }

    /// Metric column names, in output order.
    ///
    /// Class columns interleave per class: `PD_1, ED_1, PD_2, ED_2, ...`.
    pub fn columns(self) -> Vec<String> {
        let mut columns = Vec::new();
        if self.includes_class() {
            for class in LandCoverClass::ALL {
                columns.push(format!("PD_{}", class.code()));
                columns.push(format!("ED_{}", class.code()));
            }
        }
        if self.includes_landscape() {
            columns.extend(["SHDI", "LPI", "CONTAG"].map(String::from));
        }
        columns
    }
}

impl FromStr for MetricSet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "class" | "class_metrics" | "pd-ed" => Ok(MetricSet::ClassMetrics),
            "landscape" | "landscape_metrics" | "shdi-lpi-contag" => Ok(MetricSet::LandscapeMetrics),
            "all" => Ok(MetricSet::All),
            other => Err(Error::InvalidParameter {
                name: "metric_set",
                value: other.to_string(),
                reason: "expected class, landscape or all".into(),
            }),
        }
    }
}

/// Parameters for [`zonal_landscape_metrics`](super::zonal_landscape_metrics)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsParams {
    /// Metric columns to compute
    pub metric_set: MetricSet,
    /// CRS that every raster and the zone layer must carry
    pub expected_crs: CRS,
    /// Nodata override; `None` uses the raster's own sentinel, then the
    /// type maximum
    pub nodata: Option<u32>,
    /// Handling of valid codes outside 1..=6
    pub class_domain: ClassDomainPolicy,
    /// CONTAG for windows holding one class
    pub single_class_contagion: SingleClassContagion,
}

impl Default for MetricsParams {
    fn default() -> Self {
        Self {
            metric_set: MetricSet::All,
            expected_crs: CRS::utm_49n(),
            nodata: None,
            class_domain: ClassDomainPolicy::Strict,
            single_class_contagion: SingleClassContagion::Undefined,
        }
    }
}

impl MetricsParams {
    /// Nodata sentinel to use for `raster`
    pub fn nodata_for<T: ClassCode>(&self, raster: &Raster<T>) -> Result<T> {
        match self.nodata {
            Some(value) => num_traits::cast(value).ok_or_else(|| Error::InvalidParameter {
                name: "nodata",
                value: value.to_string(),
                reason: "not representable in the raster's pixel type".into(),
            }),
            None => Ok(raster.nodata().unwrap_or_else(T::default_nodata)),
        }
    }
}
