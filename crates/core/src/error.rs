//! Error types for landpattern

use thiserror::Error;

/// Main error type for landpattern operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("CRS mismatch for {context}: expected {expected}, found {found}")]
    CrsMismatch {
        context: String,
        expected: String,
        found: String,
    },

    #[error("No coordinate reference system declared for {0}")]
    MissingCrs(String),

    #[error("Class code {code} is outside the land-cover domain 1..={max}")]
    MalformedClassDomain { code: u32, max: u32 },

    #[error("Invalid geometry in feature {index}: {reason}")]
    InvalidGeometry { index: usize, reason: String },

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for landpattern operations
pub type Result<T> = std::result::Result<T, Error>;
