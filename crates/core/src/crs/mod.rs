//! Coordinate Reference System handling
//!
//! Only identity is tracked here. Rasters and zone layers must already share
//! the working reference; nothing in this crate reprojects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Coordinate Reference System representation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CRS {
    /// EPSG code if known
    epsg: Option<u32>,
    /// Free-form definition (WKT or PROJ) when no EPSG code is known
    definition: Option<String>,
}

impl CRS {
    /// Create a CRS from an EPSG code
    pub fn from_epsg(code: u32) -> Self {
        Self {
            epsg: Some(code),
            definition: None,
        }
    }

    /// Create a CRS from a WKT or PROJ definition
    pub fn from_definition(definition: impl Into<String>) -> Self {
        Self {
            epsg: None,
            definition: Some(definition.into()),
        }
    }

    /// WGS 84 / UTM zone 49N (EPSG:32649), the default working reference
    pub fn utm_49n() -> Self {
        Self::from_epsg(32649)
    }

    /// Get EPSG code if known
    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    /// Get the free-form definition, if any
    pub fn definition(&self) -> Option<&str> {
        self.definition.as_deref()
    }

    /// Exact identity check.
    ///
    /// EPSG codes compare by value; definitions compare as strings. A CRS
    /// with only an EPSG code never matches one with only a definition.
    pub fn is_equivalent(&self, other: &CRS) -> bool {
        if let (Some(a), Some(b)) = (self.epsg, other.epsg) {
            return a == b;
        }

        if let (Some(a), Some(b)) = (&self.definition, &other.definition) {
            return a.trim() == b.trim();
        }

        false
    }

    /// Get a string identifier for this CRS
    pub fn identifier(&self) -> String {
        if let Some(code) = self.epsg {
            return format!("EPSG:{}", code);
        }
        if let Some(def) = &self.definition {
            return def.clone();
        }
        "Unknown".to_string()
    }
}

impl FromStr for CRS {
    type Err = Error;

    /// Accepts `EPSG:32649`, `epsg:32649`, `urn:ogc:def:crs:EPSG::32649`
    /// and `urn:ogc:def:crs:EPSG:6.6:32649`. Anything else non-empty is kept
    /// as a definition.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidParameter {
                name: "crs",
                value: s.to_string(),
                reason: "empty CRS identifier".into(),
            });
        }

        let upper = trimmed.to_ascii_uppercase();
        let code = if let Some(rest) = upper.strip_prefix("EPSG:") {
            Some(rest)
        } else if upper.starts_with("URN:OGC:DEF:CRS:EPSG:") {
            upper.rsplit(':').next()
        } else {
            None
        };

        match code {
            Some(code) => code
                .parse::<u32>()
                .map(CRS::from_epsg)
                .map_err(|_| Error::InvalidParameter {
                    name: "crs",
                    value: s.to_string(),
                    reason: "EPSG code is not an integer".into(),
                }),
            None => Ok(CRS::from_definition(trimmed)),
        }
    }
}

impl TryFrom<String> for CRS {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CRS> for String {
    fn from(crs: CRS) -> Self {
        crs.identifier()
    }
}

impl fmt::Display for CRS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

impl Default for CRS {
    fn default() -> Self {
        Self::utm_49n()
    }
}
