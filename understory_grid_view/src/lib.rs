// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_grid_view --heading-base-level=0

//! Understory Grid View: an infinitely scrollable, virtualized grid.
//!
//! [`GridView`] ties the other Understory grid crates together:
//!
//! - content lives in an [`understory_sparse_grid::SparseGrid`], materialized
//!   lazily as cells scroll into view;
//! - visual resources come from an [`understory_pool::ResourcePool`] and are
//!   recycled every render pass;
//! - row and column headers are relabeled from a window diff
//!   ([`understory_sparse_grid::diff`]);
//! - the visible rows and columns are tracked in
//!   [`understory_hot_array::HotArray`]s;
//! - dragging, flinging, and render pacing come from [`understory_scroll`].
//!
//! Drawing is delegated to a [`CellSink`], which creates resources and places
//! them at pixel positions. The view never draws anything itself.
//!
//! Rendering is frame-driven. Every mutator queues a render; any number of
//! mutations between two frames produce one render pass, and passes are capped
//! at 30 per second by default. The host owns the clock and the event loop: it
//! implements [`understory_scroll::FrameScheduler`] and hands frames back to
//! [`GridView::on_frame`].
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Size, Vec2};
//! use understory_grid_view::{CellPlacement, CellSink, FrameOutcome, GridView};
//! use understory_scroll::{FrameHandle, FrameScheduler};
//! use understory_sparse_grid::{Coordinate, GridWindow, InitialValue};
//!
//! /// Draws cells as text lines.
//! #[derive(Default)]
//! struct TextSink {
//!     lines: Vec<String>,
//! }
//!
//! impl CellSink<String> for TextSink {
//!     type Resource = ();
//!     type Error = core::convert::Infallible;
//!
//!     fn create(&mut self) -> Result<(), Self::Error> {
//!         Ok(())
//!     }
//!
//!     fn place(&mut self, _: &mut (), cell: &CellPlacement<'_, String>) -> Result<(), Self::Error> {
//!         self.lines.push(format!("{} at x={}", cell.value, cell.origin.x));
//!         Ok(())
//!     }
//! }
//!
//! /// Queues frame requests for the host loop.
//! #[derive(Default)]
//! struct Frames {
//!     pending: Vec<FrameHandle>,
//!     next: u64,
//! }
//!
//! impl FrameScheduler for Frames {
//!     fn request_frame(&mut self) -> FrameHandle {
//!         self.next += 1;
//!         self.pending.push(FrameHandle::new(self.next));
//!         FrameHandle::new(self.next)
//!     }
//!     fn cancel_frame(&mut self, handle: FrameHandle) {
//!         self.pending.retain(|h| *h != handle);
//!     }
//! }
//!
//! let content = InitialValue::Factory(Box::new(|c: Coordinate, _: &GridWindow| {
//!     format!("({}, {})", c.x, c.y)
//! }));
//! let mut view = GridView::new(content, TextSink::default(), Frames::default())
//!     .with_viewport(Size::new(400.0, 50.0));
//!
//! let frame = view.scheduler_mut().pending.remove(0);
//! let Ok(FrameOutcome::Rendered(stats)) = view.on_frame(frame, 0) else {
//!     panic!("first frame renders");
//! };
//! assert_eq!(stats.cells, 2);
//! assert_eq!(view.sink().lines[1], "(1, 0) at x=200");
//!
//! // Scroll a quarter cell to the right: three columns are now partly visible.
//! view.move_pixel_position(Vec2::new(-50.0, 0.0));
//! let frame = view.scheduler_mut().pending.remove(0);
//! let Ok(FrameOutcome::Rendered(stats)) = view.on_frame(frame, 100) else {
//!     panic!("second frame renders");
//! };
//! assert_eq!(stats.cells, 3);
//! assert_eq!(stats.created, 1);
//! ```
//!
//! ## Features
//!
//! - `std` (default): enables `std` support for `kurbo`.
//! - `libm`: enables `no_std` builds that rely on `libm` for floating-point math.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod sink;
mod view;

pub use sink::{CellPlacement, CellSink};
pub use view::{FrameOutcome, FrameStats, GridView};
