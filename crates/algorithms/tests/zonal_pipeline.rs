//! End-to-end tests: GeoTIFF and GeoJSON fixtures on disk, through the batch
//! driver, out to CSV and GeoJSON tables.
//!
//! Fixture raster (8x8, 30 m, origin 500000 / 3000000, EPSG:32649):
//! - top-left quadrant: four 2x2 blocks of classes 1..4
//! - top-right quadrant: all water (5)
//! - bottom-left quadrant: impervious (6) with two nodata pixels
//! - bottom-right quadrant: nodata

use std::fs::File;
use std::path::{Path, PathBuf};

use approx::assert_relative_eq;
use landpattern_algorithms::zonal::{
    run_batch, CsvSink, GeoJsonSink, GeoTiffSource, LabelRules, MetricSet, MetricsParams,
};
use landpattern_core::io::read_zones;
use landpattern_core::{Error, CRS};
use tiff::encoder::colortype::Gray8;
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;

const ORIGIN_X: f64 = 500_000.0;
const ORIGIN_Y: f64 = 3_000_000.0;

#[rustfmt::skip]
const LANDCOVER: [u8; 64] = [
    1, 1, 2, 2,     5, 5, 5, 5,
    1, 1, 2, 2,     5, 5, 5, 5,
    3, 3, 4, 4,     5, 5, 5, 5,
    3, 3, 4, 4,     5, 5, 5, 5,
    6, 6, 255, 255, 255, 255, 255, 255,
    6, 6, 6, 6,     255, 255, 255, 255,
    6, 6, 6, 6,     255, 255, 255, 255,
    6, 6, 6, 6,     255, 255, 255, 255,
];

fn write_geotiff(path: &Path, data: &[u8], epsg: u16) {
    let file = File::create(path).unwrap();
    let mut encoder = TiffEncoder::new(file).unwrap();
    let mut image = encoder.new_image::<Gray8>(8, 8).unwrap();

    let scale = vec![30.0f64, 30.0, 0.0];
    let tiepoint = vec![0.0f64, 0.0, 0.0, ORIGIN_X, ORIGIN_Y, 0.0];
    let geokeys: Vec<u16> = vec![1, 1, 0, 2, 1024, 0, 1, 1, 3072, 0, 1, epsg];
    image
        .encoder()
        .write_tag(Tag::from_u16_exhaustive(33550), scale.as_slice())
        .unwrap();
    image
        .encoder()
        .write_tag(Tag::from_u16_exhaustive(33922), tiepoint.as_slice())
        .unwrap();
    image
        .encoder()
        .write_tag(Tag::from_u16_exhaustive(34735), geokeys.as_slice())
        .unwrap();
    image
        .encoder()
        .write_tag(Tag::from_u16_exhaustive(42113), "255")
        .unwrap();
    image.write_data(data).unwrap();
}

/// Polygon ring for a pixel-aligned square of `size` pixels at (row, col)
fn square(row: usize, col: usize, size: usize) -> String {
    let min_x = ORIGIN_X + col as f64 * 30.0;
    let max_y = ORIGIN_Y - row as f64 * 30.0;
    let (max_x, min_y) = (min_x + size as f64 * 30.0, max_y - size as f64 * 30.0);
    format!(
        "[[[{min_x},{min_y}],[{max_x},{min_y}],[{max_x},{max_y}],[{min_x},{max_y}],[{min_x},{min_y}]]]"
    )
}

fn write_fishnet(path: &Path) {
    let cells = [
        ("A", square(0, 0, 4)),
        ("B", square(0, 4, 4)),
        ("C", square(4, 0, 4)),
        ("D", square(4, 4, 4)),
        ("E", square(2, 6, 4)),
    ];
    let features: Vec<String> = cells
        .iter()
        .map(|(name, ring)| {
            format!(
                r#"{{"type":"Feature","id":"{name}","properties":{{"cell":"{name}"}},"geometry":{{"type":"Polygon","coordinates":{ring}}}}}"#
            )
        })
        .collect();
    let doc = format!(
        r#"{{"type":"FeatureCollection","crs":{{"type":"name","properties":{{"name":"urn:ogc:def:crs:EPSG::32649"}}}},"features":[{}]}}"#,
        features.join(",")
    );
    std::fs::write(path, doc).unwrap();
}

struct Fixture {
    _dir: tempfile::TempDir,
    root: PathBuf,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_path_buf();
    write_geotiff(&root.join("landcover_2020.tif"), &LANDCOVER, 32649);
    write_geotiff(&root.join("landcover_2015.tif"), &LANDCOVER, 32650);
    write_fishnet(&root.join("fishnet.geojson"));
    Fixture { _dir: dir, root }
}

fn read_csv(path: &Path) -> (Vec<String>, Vec<csv::StringRecord>) {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let header = reader.headers().unwrap().iter().map(String::from).collect();
    let records = reader.records().map(|r| r.unwrap()).collect();
    (header, records)
}

fn column(header: &[String], name: &str) -> usize {
    header.iter().position(|h| h == name).unwrap()
}

fn number(record: &csv::StringRecord, index: usize) -> f64 {
    record[index].parse().unwrap()
}

#[test]
fn test_csv_pipeline() {
    let fx = fixture();
    let params = MetricsParams::default();
    let zones = read_zones(fx.root.join("fishnet.geojson"), &params.expected_crs).unwrap();
    assert_eq!(zones.len(), 5);

    let out = fx.root.join("out");
    let sources = vec![GeoTiffSource::new(fx.root.join("landcover_2020.tif"))];
    let mut sink = CsvSink::new(&out);
    let reports = run_batch::<u8, _, _>(&sources, &zones, &params, &LabelRules::default(), &mut sink);

    assert!(reports[0].is_ok());
    assert_eq!(reports[0].label, "2020_landcover");
    let summary = reports[0].outcome.as_ref().unwrap();
    assert_eq!(summary.rows, 5);
    assert_eq!(summary.invalid_zones, 2);

    let (header, rows) = read_csv(&out.join("fishnet_metrics_2020_landcover.csv"));
    assert_eq!(header.len(), 7 + 15);
    assert_eq!(rows.len(), 5);

    // A: four equal blocks
    let a = &rows[0];
    assert_eq!(&a[1], "A");
    assert_eq!(&a[2], "ok");
    assert_relative_eq!(number(a, column(&header, "PD_1")), 0.25);
    assert_relative_eq!(number(a, column(&header, "ED_1")), 0.0083, epsilon = 1e-9);
    assert_relative_eq!(number(a, column(&header, "PD_5")), 0.0);
    assert_relative_eq!(number(a, column(&header, "SHDI")), 1.3863, epsilon = 1e-9);
    assert_relative_eq!(number(a, column(&header, "LPI")), 0.25);
    assert_relative_eq!(number(a, column(&header, "CONTAG")), 67.1773, epsilon = 1e-3);

    // B: homogeneous water
    let b = &rows[1];
    assert_relative_eq!(number(b, column(&header, "PD_5")), 1.0);
    assert_relative_eq!(number(b, column(&header, "SHDI")), 0.0);
    assert_eq!(&b[column(&header, "CONTAG")], "NaN");

    // C: impervious with nodata
    let c = &rows[2];
    assert_relative_eq!(number(c, column(&header, "PD_6")), 0.875);
    assert_relative_eq!(number(c, column(&header, "LPI")), 0.875);
    // one horizontal and two vertical neighbors are nodata: 90 m / 14400 m²
    assert_relative_eq!(number(c, column(&header, "ED_6")), 0.00625, epsilon = 1e-4);

    assert_eq!(&rows[3][2], "all_nodata");
    assert_eq!(&rows[4][2], "outside_extent");
    assert!(number(&rows[4], column(&header, "PD_1")).is_nan());
}

#[test]
fn test_batch_reports_crs_mismatch_and_continues() {
    let fx = fixture();
    let params = MetricsParams {
        metric_set: MetricSet::LandscapeMetrics,
        ..Default::default()
    };
    let zones = read_zones(fx.root.join("fishnet.geojson"), &params.expected_crs).unwrap();

    let sources = vec![
        GeoTiffSource::new(fx.root.join("landcover_2015.tif")),
        GeoTiffSource::new(fx.root.join("landcover_2020.tif")),
    ];
    let out = fx.root.join("geojson");
    let mut sink = GeoJsonSink::new(&out);
    let reports = run_batch::<u8, _, _>(&sources, &zones, &params, &LabelRules::default(), &mut sink);

    assert!(matches!(reports[0].outcome, Err(Error::CrsMismatch { .. })));
    assert!(reports[1].is_ok());
    assert!(!out.join("fishnet_metrics_2015_landcover.geojson").exists());

    let text = std::fs::read_to_string(out.join("fishnet_metrics_2020_landcover.geojson")).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
    let features = doc["features"].as_array().unwrap();
    assert_eq!(features.len(), 5);
    assert_eq!(features[0]["properties"]["cell"], "A");
    assert!(features[0]["properties"].get("PD_1").is_none());
    assert_eq!(features[0]["properties"]["LPI"], 0.25);
    assert!(features[1]["properties"]["CONTAG"].is_null());
    assert_eq!(features[4]["properties"]["status"], "outside_extent");
}

#[test]
fn test_zone_layer_in_other_crs_is_rejected() {
    let fx = fixture();
    let err = read_zones(fx.root.join("fishnet.geojson"), &CRS::from_epsg(4326)).unwrap_err();
    assert!(matches!(err, Error::CrsMismatch { .. }));
}
