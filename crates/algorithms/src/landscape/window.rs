//! Zone-to-pixel windowing
//!
//! Maps a zone's bounding box through the inverse geotransform and borrows
//! the covered block of the class raster. Windows that reach past the raster
//! edge are rejected rather than clamped: a clamped window would silently
//! shrink the area every metric is normalized by.

use std::fmt;

use landpattern_core::{Bounds, ClassCode, Raster};
use ndarray::ArrayView2;

/// Why a zone has no computable window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidWindow {
    /// The window is partly or fully outside the raster extent
    OutsideExtent,
    /// The window covers no pixels
    Empty,
    /// Every pixel in the window is the nodata sentinel
    AllNodata,
}

impl InvalidWindow {
    /// Stable status label used in output tables
    pub fn as_str(&self) -> &'static str {
        match self {
            InvalidWindow::OutsideExtent => "outside_extent",
            InvalidWindow::Empty => "empty",
            InvalidWindow::AllNodata => "all_nodata",
        }
    }
}

impl fmt::Display for InvalidWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated pixel window borrowed from a class raster.
///
/// Invariant: `row_start < row_end <= raster.rows()`,
/// `col_start < col_end <= raster.cols()`, and at least one cell differs
/// from `nodata`.
#[derive(Debug, Clone)]
pub struct GridWindow<'a, T: ClassCode> {
    pub row_start: usize,
    pub row_end: usize,
    pub col_start: usize,
    pub col_end: usize,
    cells: ArrayView2<'a, T>,
    nodata: T,
    resolution: (f64, f64),
}

impl<'a, T: ClassCode> GridWindow<'a, T> {
    /// The class-code sub-grid
    pub fn cells(&self) -> &ArrayView2<'a, T> {
        &self.cells
    }

    /// Window shape as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.cells.dim()
    }

    /// Number of pixels in the window, nodata included
    pub fn pixel_count(&self) -> usize {
        self.cells.len()
    }

    pub fn nodata(&self) -> T {
        self.nodata
    }

    /// Whether `value` is an observation rather than the nodata sentinel
    pub fn is_valid(&self, value: T) -> bool {
        value != self.nodata
    }

    /// Absolute pixel resolution `(res_x, res_y)`
    pub fn resolution(&self) -> (f64, f64) {
        self.resolution
    }

    /// Ground area of one pixel
    pub fn cell_area(&self) -> f64 {
        self.resolution.0 * self.resolution.1
    }

    /// Ground area of the whole window, nodata pixels included
    pub fn total_area(&self) -> f64 {
        self.pixel_count() as f64 * self.cell_area()
    }
}

/// Extract the pixel window covering `bounds`.
///
/// `(min_x, max_y)` maps to the top-left pixel and `(max_x, min_y)` to the
/// exclusive bottom-right corner; fractional positions are floored. The
/// extent check runs on the unfloored positions.
pub fn extract_window<'a, T: ClassCode>(
    raster: &'a Raster<T>,
    bounds: &Bounds,
    nodata: T,
) -> Result<GridWindow<'a, T>, InvalidWindow> {
    let (rows, cols) = raster.shape();
    let (col_start, row_start) = raster.geo_to_pixel(bounds.min_x, bounds.max_y);
    let (col_end, row_end) = raster.geo_to_pixel(bounds.max_x, bounds.min_y);

    let positions = [col_start, row_start, col_end, row_end];
    if positions.iter().any(|p| !p.is_finite())
        || col_start < 0.0
        || row_start < 0.0
        || col_end > cols as f64
        || row_end > rows as f64
    {
        return Err(InvalidWindow::OutsideExtent);
    }

    let (row_start, row_end) = (row_start.floor() as usize, row_end.floor() as usize);
    let (col_start, col_end) = (col_start.floor() as usize, col_end.floor() as usize);

    if row_end <= row_start || col_end <= col_start {
        return Err(InvalidWindow::Empty);
    }

    let cells = raster
        .block(row_start..row_end, col_start..col_end)
        .map_err(|_| InvalidWindow::OutsideExtent)?;

    if cells.iter().all(|&v| v == nodata) {
        return Err(InvalidWindow::AllNodata);
    }

    Ok(GridWindow {
        row_start,
        row_end,
        col_start,
        col_end,
        cells,
        nodata,
        resolution: raster.transform().resolution(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use landpattern_core::GeoTransform;

    /// 6x8 raster at 30 m, origin (0, 180)
    fn raster() -> Raster<u8> {
        let data = (0..48).map(|i| (i % 6 + 1) as u8).collect();
        Raster::from_vec(data, 6, 8)
            .unwrap()
            .with_transform(GeoTransform::new(0.0, 180.0, 30.0, -30.0))
            .with_nodata(255)
    }

    #[test]
    fn test_aligned_zone() {
        let r = raster();
        let w = extract_window(&r, &Bounds::new(60.0, 60.0, 120.0, 120.0), 255).unwrap();
        assert_eq!((w.row_start, w.row_end, w.col_start, w.col_end), (2, 4, 2, 4));
        assert_eq!(w.shape(), (2, 2));
        assert_eq!(w.cells()[(0, 0)], r.get(2, 2).unwrap());
        assert_eq!(w.total_area(), 4.0 * 900.0);
    }

    #[test]
    fn test_fractional_bounds_are_floored() {
        let r = raster();
        let w = extract_window(&r, &Bounds::new(45.0, 75.0, 100.0, 170.0), 255).unwrap();
        // col 1.5 -> 1, row 0.33 -> 0, col_end 3.33 -> 3, row_end 3.5 -> 3
        assert_eq!((w.row_start, w.row_end, w.col_start, w.col_end), (0, 3, 1, 3));
    }

    #[test]
    fn test_full_extent_is_valid() {
        let r = raster();
        let w = extract_window(&r, &Bounds::new(0.0, 0.0, 240.0, 180.0), 255).unwrap();
        assert_eq!(w.shape(), (6, 8));
    }

    #[test]
    fn test_straddling_zone_is_not_clamped() {
        let r = raster();
        let west = Bounds::new(-30.0, 60.0, 60.0, 120.0);
        let south = Bounds::new(60.0, -1.0, 120.0, 60.0);
        let east = Bounds::new(200.0, 60.0, 241.0, 120.0);
        for b in [west, south, east] {
            assert_eq!(extract_window(&r, &b, 255).unwrap_err(), InvalidWindow::OutsideExtent);
        }
    }

    #[test]
    fn test_zone_far_outside() {
        let r = raster();
        let b = Bounds::new(10_000.0, 10_000.0, 10_060.0, 10_060.0);
        assert_eq!(extract_window(&r, &b, 255).unwrap_err(), InvalidWindow::OutsideExtent);
    }

    #[test]
    fn test_sub_pixel_zone_is_empty() {
        let r = raster();
        let b = Bounds::new(35.0, 125.0, 50.0, 140.0);
        assert_eq!(extract_window(&r, &b, 255).unwrap_err(), InvalidWindow::Empty);
    }

    #[test]
    fn test_all_nodata_window() {
        let r = Raster::filled(4, 4, 255u8)
            .with_transform(GeoTransform::new(0.0, 4.0, 1.0, -1.0))
            .with_nodata(255);
        let b = Bounds::new(0.0, 0.0, 2.0, 2.0);
        assert_eq!(extract_window(&r, &b, 255).unwrap_err(), InvalidWindow::AllNodata);
    }

    #[test]
    fn test_degenerate_transform_is_outside() {
        let r = Raster::filled(4, 4, 1u8).with_transform(GeoTransform::new(0.0, 4.0, 0.0, -1.0));
        let b = Bounds::new(0.0, 0.0, 2.0, 2.0);
        assert_eq!(extract_window(&r, &b, 255).unwrap_err(), InvalidWindow::OutsideExtent);
    }
}
