//! Class- and landscape-level pattern metrics
//!
//! Class level (fixed domain, one value per class):
//! - **PD**: class area over window area
//! - **ED**: class edge length over window area
//!
//! Landscape level (classes present in the window):
//! - **SHDI**: Shannon diversity of class proportions
//! - **LPI**: share of the window held by the most abundant class
//! - **CONTAG**: contagion from the rook adjacency matrix

use landpattern_core::ClassCode;
use serde::{Deserialize, Serialize};

use super::adjacency::{AdjacencyMatrix, EdgeCounts};
use super::composition::{Composition, FixedComposition, LandCoverClass};
use super::window::GridWindow;

/// What contagion reports for a window holding a single class.
///
/// The general formula divides by `2 ln m`, which is zero when `m == 1`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SingleClassContagion {
    /// Report NaN
    #[default]
    Undefined,
    /// Report 100, the maximum of the index
    Maximal,
}

/// PD and ED for each fixed class, indexed by [`LandCoverClass::index`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassMetrics {
    pub pd: [f64; LandCoverClass::COUNT],
    pub ed: [f64; LandCoverClass::COUNT],
}

impl ClassMetrics {
    pub fn pd(&self, class: LandCoverClass) -> f64 {
        self.pd[class.index()]
    }

    pub fn ed(&self, class: LandCoverClass) -> f64 {
        self.ed[class.index()]
    }
}

/// Landscape-level indices of one window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandscapeMetrics {
    pub shdi: f64,
    pub lpi: f64,
    pub contag: f64,
}

/// Patch density as used here: class area over window area.
///
/// Not a patch count; no connected components are labelled.
pub fn patch_density(pixel_count: usize, cell_area: f64, total_area: f64) -> f64 {
    pixel_count as f64 * cell_area / total_area
}

/// Edge density: class edge length over window area.
///
/// Edge length comes from [`EdgeCounts::edge_length`], where a boundary
/// between two classes is counted once from each side. Boundaries against
/// nodata and interior boundaries are both included; the window border is
/// not.
pub fn edge_density(edge_length: f64, total_area: f64) -> f64 {
    edge_length / total_area
}

/// Shannon diversity `-Σ p_i ln p_i` over the classes present
pub fn shannon_diversity<T: ClassCode>(composition: &Composition<T>) -> f64 {
    composition
        .iter()
        .map(|(_, s)| s.area_fraction)
        .filter(|&p| p > 0.0)
        .map(|p| -p * p.ln())
        .sum()
}

/// Largest patch index: largest class pixel count over window pixel count.
///
/// The denominator includes nodata pixels.
pub fn largest_patch_index<T: ClassCode>(composition: &Composition<T>) -> f64 {
    if composition.total_pixels == 0 {
        return f64::NAN;
    }
    composition.largest_count() as f64 / composition.total_pixels as f64
}

/// Contagion, as a percentage.
///
/// `CONTAG = (1 + Σ_i Σ_k p_ik ln p_ik / (2 ln m)) * 100` where
/// `p_ik = p_i * g_ik / Σ g`, the denominator being the sum of the whole
/// matrix. Zero terms are skipped, and a window whose cells have no valid
/// neighbors contributes an empty sum.
pub fn contagion<T: ClassCode>(
    composition: &Composition<T>,
    matrix: &AdjacencyMatrix<T>,
    single_class: SingleClassContagion,
) -> f64 {
    let m = composition.len();
    match m {
        0 => return f64::NAN,
        1 => {
            return match single_class {
                SingleClassContagion::Undefined => f64::NAN,
                SingleClassContagion::Maximal => 100.0,
            };
        }
        _ => {}
    }

    let total = matrix.total();
    let mut sum = 0.0;
    if total > 0 {
        for (i, &(_, stats)) in composition.iter().enumerate() {
            for &g in matrix.row(i) {
                let p = stats.area_fraction * (g as f64 / total as f64);
                if p > 0.0 {
                    sum += p * p.ln();
                }
            }
        }
    }

    (1.0 + sum / (2.0 * (m as f64).ln())) * 100.0
}

/// PD and ED for every fixed class of `window`
pub fn class_metrics<T: ClassCode>(
    window: &GridWindow<'_, T>,
    composition: &FixedComposition,
    edges: &EdgeCounts,
) -> ClassMetrics {
    let cell_area = window.cell_area();
    let total_area = window.total_area();
    let (res_x, res_y) = window.resolution();

    let mut metrics = ClassMetrics {
        pd: [0.0; LandCoverClass::COUNT],
        ed: [0.0; LandCoverClass::COUNT],
    };
    for (class, stats) in composition.iter() {
        let i = class.index();
        metrics.pd[i] = patch_density(stats.pixel_count, cell_area, total_area);
        metrics.ed[i] = edge_density(edges.edge_length(class, res_x, res_y), total_area);
    }
    metrics
}

/// SHDI, LPI and CONTAG for one window
pub fn landscape_metrics<T: ClassCode>(
    composition: &Composition<T>,
    matrix: &AdjacencyMatrix<T>,
    single_class: SingleClassContagion,
) -> LandscapeMetrics {
    LandscapeMetrics {
        shdi: shannon_diversity(composition),
        lpi: largest_patch_index(composition),
        contag: contagion(composition, matrix, single_class),
    }
}
