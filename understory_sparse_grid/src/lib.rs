// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_sparse_grid --heading-base-level=0

//! Understory Sparse Grid: an unbounded 2D grid behind a scrollable window.
//!
//! This crate provides the logical side of an infinitely scrollable, virtualized
//! grid. It does not know how a cell looks; it knows which cells exist, which
//! ones are in view, and how a continuous pixel scroll maps onto integer cell
//! coordinates.
//!
//! - [`SparseGrid`]: a key-value store over integer [`Coordinate`]s, unbounded in
//!   all four directions. Cells materialize lazily through an [`InitialValue`]
//!   (a constant or a factory) the first time they are looked up.
//! - [`GridWindow`]: the rectangular logical window (offset + size) currently in
//!   view. It can be resized from any [`Side`].
//! - Scroll state: an integer `position` plus a `position_fraction` in `[0, 1)`,
//!   driven by [`SparseGrid::move_pixel_position`]. The pixel/cell relation is
//!   [`coordinate_pixel_position`].
//! - [`diff`]: compares the window of one frame against the next and classifies
//!   every row, column, and cell as added, removed, or unchanged, optionally
//!   skipping the unchanged interior entirely.
//!
//! ## Minimal example
//!
//! ```rust
//! use understory_sparse_grid::{Coordinate, GridSize, GridWindow, SparseGrid};
//! use understory_sparse_grid::diff::{Change, DiffIterator};
//!
//! // Cells hold their own coordinate as a label.
//! let mut grid = SparseGrid::with_factory(|c: Coordinate, _: &GridWindow| {
//!     format!("{},{}", c.x, c.y)
//! });
//! assert_eq!(grid.get_cell(-4, 7), "-4,7");
//! assert!(grid.has_cell(-4, 7));
//!
//! // Optional lookups never materialize.
//! assert!(grid.try_get_cell(100, 100).is_none());
//! assert!(!grid.has_cell(100, 100));
//!
//! // Diff two windows one column apart.
//! let before = GridWindow::new(Coordinate::new(0, 0), GridSize::new(3, 2));
//! let after = GridWindow::new(Coordinate::new(1, 0), GridSize::new(3, 2));
//! let mut columns = Vec::new();
//! DiffIterator::new().each_column(&before, &after, |x, change| columns.push((x, change)));
//! assert_eq!(
//!     columns,
//!     [
//!         (0, Change::Removed),
//!         (1, Change::Unchanged),
//!         (2, Change::Unchanged),
//!         (3, Change::Added),
//!     ]
//! );
//! ```
//!
//! ## Pixel space
//!
//! Cell sizes, cell offsets and the scroll fraction are [`kurbo`] values in a
//! caller-chosen pixel space. Moving by a pixel delta `d` along an axis with
//! cell extent `s` moves the real-valued position by `-d / s`: dragging content
//! to the left (negative `d`) scrolls toward higher coordinates.
//!
//! ## Features
//!
//! - `std` (default): enables `std` support for `kurbo`.
//! - `libm`: enables `no_std` builds that rely on `libm` for floating-point math.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod diff;
mod grid;
mod position;
mod types;

pub use grid::{InitialValue, SparseGrid};
pub use position::{coordinate_pixel_position, coordinate_position};
pub use types::{CellMetrics, Coordinate, GridSize, GridWindow, Side};
