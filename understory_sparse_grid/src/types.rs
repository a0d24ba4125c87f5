// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Coordinates, windows, and cell metrics.

use kurbo::{Size, Vec2};

use crate::diff::AxisSpan;

/// An integer cell coordinate. Unbounded in both directions.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Coordinate {
    /// The origin, `(0, 0)`.
    pub const ORIGIN: Self = Self::new(0, 0);

    /// Creates a coordinate.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Coordinate {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// The size of a [`GridWindow`] in cells.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct GridSize {
    /// Number of columns.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
}

impl GridSize {
    /// Creates a size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns `true` if either dimension is zero.
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// The rectangular logical window of a grid.
///
/// Covers columns `offset.x .. offset.x + width` and rows
/// `offset.y .. offset.y + height`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct GridWindow {
    /// Top-left cell of the window.
    pub offset: Coordinate,
    /// Extent in cells.
    pub size: GridSize,
}

impl GridWindow {
    /// Creates a window.
    pub const fn new(offset: Coordinate, size: GridSize) -> Self {
        Self { offset, size }
    }

    /// The column span covered by this window.
    pub const fn columns(&self) -> AxisSpan {
        AxisSpan::new(self.offset.x, self.size.width)
    }

    /// The row span covered by this window.
    pub const fn rows(&self) -> AxisSpan {
        AxisSpan::new(self.offset.y, self.size.height)
    }

    /// Returns `true` if the window covers no cells.
    pub const fn is_empty(&self) -> bool {
        self.size.is_empty()
    }

    /// Returns `true` if `coordinate` lies inside the window.
    pub fn contains(&self, coordinate: Coordinate) -> bool {
        self.columns().contains(coordinate.x) && self.rows().contains(coordinate.y)
    }
}

/// Pixel geometry shared by every cell of a grid.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CellMetrics {
    /// Width and height of a single cell.
    pub size: Size,
    /// Pixel offset applied to every cell when laying out.
    pub offset: Vec2,
}

impl CellMetrics {
    /// Creates cell metrics.
    pub const fn new(size: Size, offset: Vec2) -> Self {
        Self { size, offset }
    }
}

impl Default for CellMetrics {
    fn default() -> Self {
        Self {
            size: Size::new(1.0, 1.0),
            offset: Vec2::ZERO,
        }
    }
}

/// A side of a [`GridWindow`], used by [`SparseGrid::resize`](crate::SparseGrid::resize).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// Grows or shrinks upward; moves `offset.y`.
    Top,
    /// Grows or shrinks to the right.
    Right,
    /// Grows or shrinks downward.
    Bottom,
    /// Grows or shrinks to the left; moves `offset.x`.
    Left,
}

#[cfg(test)]
mod tests {
    use super::{Coordinate, GridSize, GridWindow};

    #[test]
    fn window_contains_is_half_open() {
        let w = GridWindow::new(Coordinate::new(-2, 3), GridSize::new(4, 2));
        assert!(w.contains(Coordinate::new(-2, 3)));
        assert!(w.contains(Coordinate::new(1, 4)));
        assert!(!w.contains(Coordinate::new(2, 4)));
        assert!(!w.contains(Coordinate::new(1, 5)));
        assert!(!w.contains(Coordinate::new(-3, 3)));
    }

    #[test]
    fn empty_window_contains_nothing() {
        let w = GridWindow::new(Coordinate::ORIGIN, GridSize::new(0, 5));
        assert!(w.is_empty());
        assert!(!w.contains(Coordinate::ORIGIN));
    }
}
