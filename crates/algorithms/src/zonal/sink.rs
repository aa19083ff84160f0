//! Result sinks: where finished tables go
//!
//! File sinks write one file per table, named after the table label, and
//! round metric values to four decimals at write time.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use landpattern_core::io::{geometry_to_geojson, properties_to_geojson};
use landpattern_core::{Error, Result, Zone, ZoneLayer};
use serde_json::{json, Map, Value};

use super::label::output_file_name;
use super::table::{round4, MetricsRow, MetricsTable};

/// Receives one finished table per raster
pub trait TableSink {
    fn write_table(&mut self, table: &MetricsTable, zones: &ZoneLayer) -> Result<()>;
}

/// Collect tables in memory
impl TableSink for Vec<MetricsTable> {
    fn write_table(&mut self, table: &MetricsTable, _zones: &ZoneLayer) -> Result<()> {
        self.push(table.clone());
        Ok(())
    }
}

fn zone_for<'a>(zones: &'a ZoneLayer, row: &MetricsRow) -> Result<&'a Zone> {
    zones.zones.get(row.zone_id).ok_or_else(|| Error::InvalidParameter {
        name: "zone_id",
        value: row.zone_id.to_string(),
        reason: format!("zone layer has {} zones", zones.len()),
    })
}

fn prepare_path(dir: &Path, label: &str, extension: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    Ok(dir.join(output_file_name(label, extension)))
}

/// CSV text for a metric value; NaN is written literally
fn csv_value(value: f64) -> String {
    let value = round4(value);
    if value.is_nan() {
        "NaN".to_string()
    } else {
        value.to_string()
    }
}

/// Writes `fishnet_metrics_{label}.csv`.
///
/// Columns: `zone_id, feature_id, status, min_x, min_y, max_x, max_y`, then
/// the metric columns of the table.
#[derive(Debug, Clone)]
pub struct CsvSink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl CsvSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    /// Files written so far
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl TableSink for CsvSink {
    fn write_table(&mut self, table: &MetricsTable, zones: &ZoneLayer) -> Result<()> {
        let path = prepare_path(&self.dir, &table.label, "csv")?;
        let mut writer = csv::Writer::from_path(&path)?;

        let mut header: Vec<String> = ["zone_id", "feature_id", "status", "min_x", "min_y", "max_x", "max_y"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        header.extend(table.columns());
        writer.write_record(&header)?;

        for row in &table.rows {
            let zone = zone_for(zones, row)?;
            let b = zone.bounds;
            let mut record = vec![
                row.zone_id.to_string(),
                zone.feature_id.clone().unwrap_or_default(),
                row.status().to_string(),
                b.min_x.to_string(),
                b.min_y.to_string(),
                b.max_x.to_string(),
                b.max_y.to_string(),
            ];
            record.extend(row.values(table.metric_set).into_iter().map(csv_value));
            writer.write_record(&record)?;
        }
        writer.flush()?;

        tracing::debug!(path = %path.display(), rows = table.rows.len(), "wrote CSV table");
        self.written.push(path);
        Ok(())
    }
}

/// Writes `fishnet_metrics_{label}.geojson`: the zone layer with metric
/// properties added. NaN metrics become `null`.
#[derive(Debug, Clone)]
pub struct GeoJsonSink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl GeoJsonSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    /// Files written so far
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

fn json_value(value: f64) -> Value {
    let value = round4(value);
    if value.is_finite() {
        json!(value)
    } else {
        Value::Null
    }
}

/// The GeoJSON document for one table
pub fn table_to_geojson(table: &MetricsTable, zones: &ZoneLayer) -> Result<Value> {
    let columns = table.columns();
    let features = table
        .rows
        .iter()
        .map(|row| {
            let zone = zone_for(zones, row)?;
            let mut properties: Map<String, Value> = properties_to_geojson(&zone.properties);
            properties.insert("zone_id".into(), json!(row.zone_id));
            properties.insert("status".into(), json!(row.status()));
            for (name, value) in columns.iter().zip(row.values(table.metric_set)) {
                properties.insert(name.clone(), json_value(value));
            }

            let mut feature = json!({
                "type": "Feature",
                "properties": properties,
                "geometry": geometry_to_geojson(&zone.geometry),
            });
            if let Some(id) = &zone.feature_id {
                feature["id"] = json!(id);
            }
            Ok(feature)
        })
        .collect::<Result<Vec<_>>>()?;

    let mut doc = json!({
        "type": "FeatureCollection",
        "name": format!("fishnet_metrics_{}", table.label),
        "features": features,
    });
    if let Some(code) = zones.crs.as_ref().and_then(|c| c.epsg()) {
        doc["crs"] = json!({
            "type": "name",
            "properties": { "name": format!("urn:ogc:def:crs:EPSG::{}", code) },
        });
    }
    Ok(doc)
}

impl TableSink for GeoJsonSink {
    fn write_table(&mut self, table: &MetricsTable, zones: &ZoneLayer) -> Result<()> {
        let doc = table_to_geojson(table, zones)?;
        let path = prepare_path(&self.dir, &table.label, "geojson")?;
        let writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer(writer, &doc)?;

        tracing::debug!(path = %path.display(), rows = table.rows.len(), "wrote GeoJSON table");
        self.written.push(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landscape::{InvalidWindow, LandscapeMetrics};
    use crate::zonal::{MetricSet, ZoneOutcome};
    use landpattern_core::{AttributeValue, Bounds, CRS};

    fn table() -> (MetricsTable, ZoneLayer) {
        let mut zones = ZoneLayer::from_bounds(
            [Bounds::new(0.0, 0.0, 60.0, 60.0), Bounds::new(60.0, 0.0, 120.0, 60.0)],
            Some(CRS::utm_49n()),
        );
        zones.zones[0].feature_id = Some("cell-a".into());
        zones.zones[0].set_property("name", AttributeValue::String("A".into()));

        let rows = vec![
            MetricsRow {
                zone_id: 0,
                outcome: ZoneOutcome::Computed {
                    class: None,
                    landscape: Some(LandscapeMetrics {
                        shdi: 4f64.ln(),
                        lpi: 0.25,
                        contag: f64::NAN,
                    }),
                },
            },
            MetricsRow {
                zone_id: 1,
                outcome: ZoneOutcome::Invalid(InvalidWindow::OutsideExtent),
            },
        ];
        let table = MetricsTable {
            label: "2020_landcover".into(),
            source: "lc_2020".into(),
            metric_set: MetricSet::LandscapeMetrics,
            rows,
        };
        (table, zones)
    }

    #[test]
    fn test_csv_sink() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested");
        let (table, zones) = table();

        let mut sink = CsvSink::new(&out);
        sink.write_table(&table, &zones).unwrap();
        assert_eq!(sink.written(), &[out.join("fishnet_metrics_2020_landcover.csv")]);

        let mut reader = csv::Reader::from_path(&sink.written()[0]).unwrap();
        let header: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(&header[7..], &["SHDI", "LPI", "CONTAG"]);

        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(&records[0][1], "cell-a");
        assert_eq!(&records[0][2], "ok");
        assert_eq!(&records[0][7], "1.3863");
        assert_eq!(&records[0][8], "0.25");
        assert_eq!(&records[0][9], "NaN");
        assert_eq!(&records[1][2], "outside_extent");
        assert_eq!(&records[1][7], "NaN");
    }

    #[test]
    fn test_geojson_document() {
        let (table, zones) = table();
        let doc = table_to_geojson(&table, &zones).unwrap();

        assert_eq!(doc["crs"]["properties"]["name"], "urn:ogc:def:crs:EPSG::32649");
        let first = &doc["features"][0];
        assert_eq!(first["id"], "cell-a");
        assert_eq!(first["properties"]["name"], "A");
        assert_eq!(first["properties"]["SHDI"], 1.3863);
        assert!(first["properties"]["CONTAG"].is_null());
        assert_eq!(first["geometry"]["type"], "Polygon");

        let second = &doc["features"][1];
        assert_eq!(second["properties"]["status"], "outside_extent");
        assert!(second["properties"]["LPI"].is_null());
    }

    #[test]
    fn test_geojson_sink_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let (table, zones) = table();
        let mut sink = GeoJsonSink::new(dir.path());
        sink.write_table(&table, &zones).unwrap();

        let text = fs::read_to_string(dir.path().join("fishnet_metrics_2020_landcover.geojson")).unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["features"].as_array().map(|f| f.len()), Some(2));
    }

    #[test]
    fn test_unknown_zone_is_error() {
        let (mut table, zones) = table();
        table.rows[1].zone_id = 9;
        assert!(table_to_geojson(&table, &zones).is_err());
    }
}
