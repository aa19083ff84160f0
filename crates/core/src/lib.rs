//! # landpattern core
//!
//! Core types, traits and I/O for zonal landscape-pattern metrics.
//!
//! This crate provides:
//! - `Raster<T>`: georeferenced grid of land-cover class codes
//! - `GeoTransform`: affine transformation for georeferencing
//! - `CRS`: coordinate reference identity (no reprojection)
//! - `Zone` / `ZoneLayer`: the fishnet polygons metrics are aggregated over
//! - Thin readers for GeoTIFF class rasters and GeoJSON zone layers

pub mod crs;
pub mod error;
pub mod io;
pub mod raster;
pub mod vector;

pub use crs::CRS;
pub use error::{Error, Result};
pub use raster::{ClassCode, GeoTransform, Raster};
pub use vector::{AttributeValue, Bounds, Zone, ZoneLayer};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::CRS;
    pub use crate::error::{Error, Result};
    pub use crate::raster::{ClassCode, GeoTransform, Raster};
    pub use crate::vector::{Bounds, Zone, ZoneLayer};
    pub use crate::Algorithm;
}

/// Core trait for all algorithms in landpattern.
///
/// Algorithms are pure functions that transform input data according to parameters.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
