//! Rook-adjacency scan of a pixel window
//!
//! One pass over the window visits every ordered pair of 4-connected cells.
//! It produces both the per-class edge tallies used by edge density and the
//! class adjacency matrix used by contagion.

use landpattern_core::raster::neighborhood::{rook_neighbors, Axis};
use landpattern_core::ClassCode;

use super::composition::LandCoverClass;
use super::window::GridWindow;

/// Differing-neighbor tallies per fixed class, split by axis.
///
/// A neighbor counts when its code differs from the cell's, nodata included.
/// Each boundary between two domain classes is therefore seen from both
/// sides, once per class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeCounts {
    /// Left/right neighbors that differ
    pub horizontal: [usize; LandCoverClass::COUNT],
    /// Up/down neighbors that differ
    pub vertical: [usize; LandCoverClass::COUNT],
}

impl EdgeCounts {
    fn record(&mut self, class: LandCoverClass, axis: Axis) {
        match axis {
            Axis::Horizontal => self.horizontal[class.index()] += 1,
            Axis::Vertical => self.vertical[class.index()] += 1,
        }
    }

    /// Edge length in map units: each horizontal neighbor contributes
    /// `res_x` and each vertical neighbor `res_y`.
    pub fn edge_length(&self, class: LandCoverClass, res_x: f64, res_y: f64) -> f64 {
        let i = class.index();
        self.horizontal[i] as f64 * res_x + self.vertical[i] as f64 * res_y
    }

    /// Total differing-neighbor count for `class`
    pub fn count(&self, class: LandCoverClass) -> usize {
        self.horizontal[class.index()] + self.vertical[class.index()]
    }
}

/// Ordered adjacency counts between the classes present in a window.
///
/// Rows and columns follow `classes` (sorted codes, nodata excluded).
/// The matrix is symmetric because every pair is visited from both ends.
#[derive(Debug, Clone, PartialEq)]
pub struct AdjacencyMatrix<T> {
    classes: Vec<T>,
    counts: Vec<u64>,
}

impl<T: ClassCode> AdjacencyMatrix<T> {
    fn new(classes: Vec<T>) -> Self {
        let m = classes.len();
        Self {
            classes,
            counts: vec![0; m * m],
        }
    }

    /// Number of classes (`m`)
    pub fn size(&self) -> usize {
        self.classes.len()
    }

    pub fn classes(&self) -> &[T] {
        &self.classes
    }

    /// Count of ordered pairs (class `i`, neighbor class `k`)
    pub fn get(&self, i: usize, k: usize) -> u64 {
        self.counts[i * self.size() + k]
    }

    /// Row `i`: neighbor counts for class `i`
    pub fn row(&self, i: usize) -> &[u64] {
        let m = self.size();
        &self.counts[i * m..(i + 1) * m]
    }

    /// Sum of all ordered pairs
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    fn increment(&mut self, i: usize, k: usize) {
        let m = self.size();
        self.counts[i * m + k] += 1;
    }
}

/// Result of one adjacency scan
#[derive(Debug, Clone, PartialEq)]
pub struct AdjacencyScan<T> {
    pub edges: EdgeCounts,
    pub matrix: AdjacencyMatrix<T>,
}

/// Scan `window` once, tallying class edges and the adjacency matrix.
///
/// `classes` must be the sorted distinct valid codes of the window, as
/// returned by [`Composition::codes`](super::composition::Composition::codes).
/// Pairs involving nodata are left out of the matrix.
pub fn scan_adjacency<T: ClassCode>(window: &GridWindow<'_, T>, classes: &[T]) -> AdjacencyScan<T> {
    let cells = window.cells();
    let shape = window.shape();
    let slot = |code: T| classes.binary_search(&code).ok();

    let mut edges = EdgeCounts::default();
    let mut matrix = AdjacencyMatrix::new(classes.to_vec());

    for ((row, col), &value) in cells.indexed_iter() {
        let (class, i) = if window.is_valid(value) {
            (LandCoverClass::from_code(value.to_u32()), slot(value))
        } else {
            (None, None)
        };

        for (nr, nc, axis) in rook_neighbors(shape, row, col) {
            let neighbor = cells[(nr, nc)];
            if neighbor != value {
                if let Some(class) = class {
                    edges.record(class, axis);
                }
            }
            if let (Some(i), true) = (i, window.is_valid(neighbor)) {
                if let Some(k) = slot(neighbor) {
                    matrix.increment(i, k);
                }
            }
        }
    }

    AdjacencyScan { edges, matrix }
}
