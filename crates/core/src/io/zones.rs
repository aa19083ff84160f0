//! GeoJSON zone layers
//!
//! Reads a FeatureCollection of Polygon / MultiPolygon features into a
//! [`ZoneLayer`]. The optional legacy `crs` member is honored for identity
//! checks only; coordinates are never transformed.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use geo_types::{Coord, Geometry, LineString, MultiPolygon, Polygon};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::vector::{AttributeValue, Zone, ZoneLayer};

#[derive(Debug, Deserialize)]
struct FeatureCollectionDoc {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    crs: Option<NamedCrsDoc>,
    #[serde(default)]
    features: Vec<FeatureDoc>,
}

#[derive(Debug, Deserialize)]
struct NamedCrsDoc {
    properties: NamedCrsProperties,
}

#[derive(Debug, Deserialize)]
struct NamedCrsProperties {
    name: String,
}

#[derive(Debug, Deserialize)]
struct FeatureDoc {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    properties: Option<serde_json::Map<String, Value>>,
    geometry: Option<GeometryDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum GeometryDoc {
    Polygon { coordinates: Vec<Vec<Vec<f64>>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Vec<f64>>>> },
    #[serde(other)]
    Unsupported,
}

/// Read zones from a GeoJSON file.
///
/// Zones must already be expressed in `target_crs`. A layer that declares a
/// different CRS is rejected with [`Error::CrsMismatch`].
pub fn read_zones<P: AsRef<Path>>(path: P, target_crs: &CRS) -> Result<ZoneLayer> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let doc: FeatureCollectionDoc = serde_json::from_reader(BufReader::new(file))?;
    build_layer(doc, target_crs, &path.display().to_string())
}

/// Read zones from a GeoJSON string
pub fn read_zones_from_str(text: &str, target_crs: &CRS) -> Result<ZoneLayer> {
    let doc: FeatureCollectionDoc = serde_json::from_str(text)?;
    build_layer(doc, target_crs, "zone layer")
}

fn build_layer(doc: FeatureCollectionDoc, target_crs: &CRS, context: &str) -> Result<ZoneLayer> {
    if doc.kind != "FeatureCollection" {
        return Err(Error::UnsupportedDataType(format!(
            "expected a GeoJSON FeatureCollection, found {}",
            doc.kind
        )));
    }

    let declared = doc
        .crs
        .map(|c| c.properties.name.parse::<CRS>())
        .transpose()?;

    if let Some(crs) = &declared {
        if !crs.is_equivalent(target_crs) {
            return Err(Error::CrsMismatch {
                context: context.to_string(),
                expected: target_crs.identifier(),
                found: crs.identifier(),
            });
        }
    } else {
        tracing::debug!(%context, target = %target_crs, "zone layer declares no CRS, assuming target");
    }

    let mut layer = ZoneLayer::new(declared);
    for (index, feature) in doc.features.into_iter().enumerate() {
        let geometry = match feature.geometry {
            Some(g) => convert_geometry(index, g)?,
            None => {
                return Err(Error::InvalidGeometry {
                    index,
                    reason: "feature has no geometry".into(),
                });
            }
        };

        let mut zone = Zone::new(index, geometry)?;
        zone.feature_id = feature.id.map(|id| match id {
            Value::String(s) => s,
            other => other.to_string(),
        });
        for (key, value) in feature.properties.unwrap_or_default() {
            zone.set_property(key, attribute_from_json(value));
        }
        layer.push(zone);
    }

    tracing::debug!(%context, zones = layer.len(), "loaded zone layer");
    Ok(layer)
}

fn convert_geometry(index: usize, doc: GeometryDoc) -> Result<Geometry<f64>> {
    match doc {
        GeometryDoc::Polygon { coordinates } => Ok(Geometry::Polygon(polygon(index, coordinates)?)),
        GeometryDoc::MultiPolygon { coordinates } => {
            let polygons = coordinates
                .into_iter()
                .map(|rings| polygon(index, rings))
                .collect::<Result<Vec<_>>>()?;
            Ok(Geometry::MultiPolygon(MultiPolygon::new(polygons)))
        }
        GeometryDoc::Unsupported => Err(Error::InvalidGeometry {
            index,
            reason: "only Polygon and MultiPolygon zones are supported".into(),
        }),
    }
}

fn polygon(index: usize, rings: Vec<Vec<Vec<f64>>>) -> Result<Polygon<f64>> {
    let mut rings = rings
        .into_iter()
        .map(|ring| {
            ring.into_iter()
                .map(|pos| match pos.as_slice() {
                    [x, y, ..] => Ok(Coord { x: *x, y: *y }),
                    _ => Err(Error::InvalidGeometry {
                        index,
                        reason: "position with fewer than two coordinates".into(),
                    }),
                })
                .collect::<Result<Vec<_>>>()
                .map(LineString::new)
        })
        .collect::<Result<Vec<_>>>()?
        .into_iter();

    let exterior = rings.next().ok_or_else(|| Error::InvalidGeometry {
        index,
        reason: "polygon without exterior ring".into(),
    })?;
    Ok(Polygon::new(exterior, rings.collect()))
}

fn attribute_from_json(value: Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null,
        Value::Bool(b) => AttributeValue::Bool(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => AttributeValue::Int(i),
            None => AttributeValue::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => AttributeValue::String(s),
        other => AttributeValue::String(other.to_string()),
    }
}

/// GeoJSON geometry object for a zone geometry
pub fn geometry_to_geojson(geometry: &Geometry<f64>) -> Value {
    fn rings(poly: &Polygon<f64>) -> Vec<Vec<[f64; 2]>> {
        std::iter::once(poly.exterior())
            .chain(poly.interiors())
            .map(|ring| ring.coords().map(|c| [c.x, c.y]).collect())
            .collect()
    }

    match geometry {
        Geometry::Polygon(p) => json!({ "type": "Polygon", "coordinates": rings(p) }),
        Geometry::MultiPolygon(mp) => json!({
            "type": "MultiPolygon",
            "coordinates": mp.iter().map(rings).collect::<Vec<_>>(),
        }),
        _ => Value::Null,
    }
}

/// GeoJSON properties object from zone attributes
pub fn properties_to_geojson(properties: &BTreeMap<String, AttributeValue>) -> serde_json::Map<String, Value> {
    properties
        .iter()
        .map(|(k, v)| {
            let value = match v {
                AttributeValue::Null => Value::Null,
                AttributeValue::Bool(b) => Value::Bool(*b),
                AttributeValue::Int(i) => json!(i),
                AttributeValue::Float(f) => json!(f),
                AttributeValue::String(s) => Value::String(s.clone()),
            };
            (k.clone(), value)
        })
        .collect()
}
