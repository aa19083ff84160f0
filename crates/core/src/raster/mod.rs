//! Raster data structures and operations

mod element;
mod geotransform;
mod grid;
pub mod neighborhood;

pub use element::ClassCode;
pub use geotransform::GeoTransform;
pub use grid::Raster;
pub use neighborhood::{rook_neighbors, Axis};
