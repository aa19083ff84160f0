//! Landscape ecology metrics over land-cover windows
//!
//! Per-window building blocks for zonal pattern analysis:
//! - **Window**: zone bounds to a validated pixel block
//! - **Composition**: pixel counts per class, fixed domain and observed codes
//! - **Adjacency**: one rook scan yielding class edges and the adjacency matrix
//! - **Metrics**: PD, ED, SHDI, LPI and CONTAG

mod adjacency;
mod composition;
mod metrics;
mod window;

pub use adjacency::{scan_adjacency, AdjacencyMatrix, AdjacencyScan, EdgeCounts};
pub use composition::{
    composition, fixed_composition, ClassDomainPolicy, ClassStats, Composition,
    FixedComposition, LandCoverClass,
};
pub use metrics::{
    class_metrics, contagion, edge_density, landscape_metrics, largest_patch_index,
    patch_density, shannon_diversity, ClassMetrics, LandscapeMetrics, SingleClassContagion,
};
pub use window::{extract_window, GridWindow, InvalidWindow};
