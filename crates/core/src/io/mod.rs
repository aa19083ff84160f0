//! Collaborator adapters: class rasters in, zone layers in
//!
//! Both readers are deliberately thin. Reprojection and format conversion
//! happen upstream; these only check that identities line up.

mod native;
mod zones;

pub use native::{read_class_raster, read_class_raster_from_buffer};
pub use zones::{geometry_to_geojson, properties_to_geojson, read_zones, read_zones_from_str};
