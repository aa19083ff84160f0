//! 4-connected (rook) neighborhood for categorical adjacency scans

/// Axis along which two neighboring cells touch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Neighbor in the same row (left or right)
    Horizontal,
    /// Neighbor in the same column (above or below)
    Vertical,
}

/// Rook offsets: up, down, left, right
pub const ROOK_OFFSETS: [(isize, isize, Axis); 4] = [
    (-1, 0, Axis::Vertical),
    (1, 0, Axis::Vertical),
    (0, -1, Axis::Horizontal),
    (0, 1, Axis::Horizontal),
];

/// In-bounds rook neighbors of `(row, col)` in a grid of shape `(rows, cols)`.
pub fn rook_neighbors(
    (rows, cols): (usize, usize),
    row: usize,
    col: usize,
) -> impl Iterator<Item = (usize, usize, Axis)> {
    ROOK_OFFSETS.iter().filter_map(move |&(dr, dc, axis)| {
        let nr = row.checked_add_signed(dr)?;
        let nc = col.checked_add_signed(dc)?;
        (nr < rows && nc < cols).then_some((nr, nc, axis))
    })
}
