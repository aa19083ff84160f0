//! Zonal driver: one metrics row per zone of a layer
//!
//! Zones are independent, so the loop runs through `maybe_rayon` and
//! collects rows in zone order.

use std::time::Instant;

use landpattern_core::{Algorithm, Bounds, ClassCode, Error, Raster, Result, ZoneLayer, CRS};

use crate::landscape::{
    class_metrics, composition, extract_window, fixed_composition, landscape_metrics,
    scan_adjacency,
};
use crate::maybe_rayon::*;

use super::params::MetricsParams;
use super::table::{MetricsRow, ZoneOutcome};

/// Zonal landscape metrics algorithm
#[derive(Debug, Clone, Default)]
pub struct ZonalLandscapeMetrics;

impl Algorithm for ZonalLandscapeMetrics {
    type Input = (Raster<u8>, ZoneLayer);
    type Output = Vec<MetricsRow>;
    type Params = MetricsParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "ZonalLandscapeMetrics"
    }

    fn description(&self) -> &'static str {
        "Compute PD, ED, SHDI, LPI and CONTAG for every zone of a fishnet over a land-cover raster"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        let (raster, zones) = input;
        zonal_landscape_metrics(&raster, &zones, &params)
    }
}

/// Metrics for a single zone.
///
/// An unusable window is an [`ZoneOutcome::Invalid`] outcome, not an error.
/// Errors are reserved for conditions that invalidate the whole raster, such
/// as a code outside the class domain under the strict policy.
pub fn zone_metrics<T: ClassCode>(
    raster: &Raster<T>,
    bounds: &Bounds,
    nodata: T,
    params: &MetricsParams,
) -> Result<ZoneOutcome> {
    let window = match extract_window(raster, bounds, nodata) {
        Ok(window) => window,
        Err(reason) => return Ok(ZoneOutcome::Invalid(reason)),
    };

    let observed = composition(&window);
    let scan = scan_adjacency(&window, &observed.codes());

    let class = if params.metric_set.includes_class() {
        let fixed = fixed_composition(&window, params.class_domain)?;
        Some(class_metrics(&window, &fixed, &scan.edges))
    } else {
        None
    };

    let landscape = params
        .metric_set
        .includes_landscape()
        .then(|| landscape_metrics(&observed, &scan.matrix, params.single_class_contagion));

    Ok(ZoneOutcome::Computed { class, landscape })
}

/// Metrics for every zone of `zones` over `raster`, in zone order.
///
/// The raster must carry `params.expected_crs`; a zone layer that declares
/// a CRS must match it too. Nothing is reprojected.
pub fn zonal_landscape_metrics<T: ClassCode>(
    raster: &Raster<T>,
    zones: &ZoneLayer,
    params: &MetricsParams,
) -> Result<Vec<MetricsRow>> {
    validate_inputs(raster, zones, params)?;
    let nodata = params.nodata_for(raster)?;
    let start = Instant::now();

    let rows = zones
        .zones
        .par_iter()
        .map(|zone| {
            let outcome = zone_metrics(raster, &zone.bounds, nodata, params)?;
            if let ZoneOutcome::Invalid(reason) = &outcome {
                tracing::debug!(zone = zone.index, %reason, "zone skipped");
            }
            Ok(MetricsRow {
                zone_id: zone.index,
                outcome,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let invalid = rows.iter().filter(|r| !r.is_valid()).count();
    tracing::info!(
        zones = rows.len(),
        invalid,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "zonal metrics computed"
    );

    Ok(rows)
}

fn validate_inputs<T: ClassCode>(raster: &Raster<T>, zones: &ZoneLayer, params: &MetricsParams) -> Result<()> {
    let raster_crs = raster
        .crs()
        .ok_or_else(|| Error::MissingCrs("raster".into()))?;
    check_crs("raster", raster_crs, &params.expected_crs)?;
    if let Some(crs) = &zones.crs {
        check_crs("zone layer", crs, &params.expected_crs)?;
    }

    let gt = raster.transform();
    if !gt.is_north_up() || gt.pixel_width <= 0.0 {
        return Err(Error::InvalidParameter {
            name: "transform",
            value: format!("{:?}", gt),
            reason: "raster must be north-up with no rotation".into(),
        });
    }
    Ok(())
}

fn check_crs(context: &str, found: &CRS, expected: &CRS) -> Result<()> {
    if found.is_equivalent(expected) {
        Ok(())
    } else {
        Err(Error::CrsMismatch {
            context: context.to_string(),
            expected: expected.identifier(),
            found: found.identifier(),
        })
    }
}
