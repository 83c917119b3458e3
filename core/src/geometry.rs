//! Grid coordinates and their mapping onto pixel space.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Location of a single grid cell expressed as row and column indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    row: u32,
    col: u32,
}

impl GridCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn col(&self) -> u32 {
        self.col
    }
}

/// Maps a grid cell onto the pixel coordinates of its centre.
#[must_use]
pub fn grid_to_pixel(coord: GridCoord, cell_size: f32) -> Vec2 {
    let half = cell_size / 2.0;
    Vec2::new(
        coord.col() as f32 * cell_size + half,
        coord.row() as f32 * cell_size + half,
    )
}

/// Reports whether two pixel positions fall within half a cell of each other on both axes.
#[must_use]
pub fn colocated(a: Vec2, b: Vec2, cell_size: f32) -> bool {
    let half = cell_size / 2.0;
    (a.x - b.x).abs() < half && (a.y - b.y).abs() < half
}
