//! Zone layers: the polygons (fishnet cells) metrics are aggregated over

use std::collections::BTreeMap;

use geo::BoundingRect;
use geo_types::Geometry;
use serde::{Deserialize, Serialize};

use crate::crs::CRS;
use crate::error::{Error, Result};

/// Attribute value carried through from the zone source to the output table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

/// Axis-aligned bounding box `(min_x, min_y, max_x, max_y)` in map units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// A zone polygon with its stable identifier (row position in the layer)
#[derive(Debug, Clone)]
pub struct Zone {
    /// Row position in the zone layer
    pub index: usize,
    /// Optional feature ID from the source
    pub feature_id: Option<String>,
    /// Polygon or multipolygon geometry
    pub geometry: Geometry<f64>,
    /// Bounding box of `geometry`
    pub bounds: Bounds,
    /// Source attributes, preserved in output
    pub properties: BTreeMap<String, AttributeValue>,
}

impl Zone {
    /// Build a zone from a geometry, computing its bounding box.
    pub fn new(index: usize, geometry: Geometry<f64>) -> Result<Self> {
        let rect = geometry.bounding_rect().ok_or_else(|| Error::InvalidGeometry {
            index,
            reason: "geometry has no coordinates".into(),
        })?;
        let (min, max) = (rect.min(), rect.max());
        let bounds = Bounds::new(min.x, min.y, max.x, max.y);

        if ![bounds.min_x, bounds.min_y, bounds.max_x, bounds.max_y]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(Error::InvalidGeometry {
                index,
                reason: "non-finite coordinates".into(),
            });
        }

        Ok(Self {
            index,
            feature_id: None,
            geometry,
            bounds,
            properties: BTreeMap::new(),
        })
    }

    /// Rectangular zone covering exactly `bounds`
    pub fn from_bounds(index: usize, bounds: Bounds) -> Self {
        let rect = geo_types::Rect::new(
            geo_types::coord! { x: bounds.min_x, y: bounds.min_y },
            geo_types::coord! { x: bounds.max_x, y: bounds.max_y },
        );
        Self {
            index,
            feature_id: None,
            geometry: Geometry::Polygon(rect.to_polygon()),
            bounds,
            properties: BTreeMap::new(),
        }
    }

    /// Set an attribute
    pub fn set_property(&mut self, key: impl Into<String>, value: AttributeValue) {
        self.properties.insert(key.into(), value);
    }

    /// Get an attribute
    pub fn get_property(&self, key: &str) -> Option<&AttributeValue> {
        self.properties.get(key)
    }
}

/// Ordered zone layer with its declared coordinate reference
#[derive(Debug, Clone, Default)]
pub struct ZoneLayer {
    pub zones: Vec<Zone>,
    /// CRS declared by the source, if any
    pub crs: Option<CRS>,
}

impl ZoneLayer {
    pub fn new(crs: Option<CRS>) -> Self {
        Self { zones: Vec::new(), crs }
    }

    /// Build a layer of rectangular zones, indexed in iteration order
    pub fn from_bounds<I>(bounds: I, crs: Option<CRS>) -> Self
    where
        I: IntoIterator<Item = Bounds>,
    {
        let zones = bounds
            .into_iter()
            .enumerate()
            .map(|(i, b)| Zone::from_bounds(i, b))
            .collect();
        Self { zones, crs }
    }

    /// Append a zone, re-indexing it to its row position
    pub fn push(&mut self, mut zone: Zone) {
        zone.index = self.zones.len();
        self.zones.push(zone);
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Zone> {
        self.zones.iter()
    }
}
