// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_scroll --heading-base-level=0

//! Understory Scroll: frame pacing and momentum scrolling.
//!
//! Virtualized views are driven by the host's animation frames. This crate
//! holds the two pieces of timing state such a view needs, without owning a
//! clock or an event loop:
//!
//! - [`FrameGate`]: coalesces any number of render requests within one tick
//!   into a single render and caps the render rate (30 fps by default). Frames
//!   that arrive too early are postponed, not dropped.
//! - [`MomentumScroller`]: a drag/fling state machine. While dragging, every
//!   pointer move is applied to a [`ScrollTarget`] immediately and remembered
//!   as the current velocity. On release the velocity is multiplied by a fling
//!   factor and decays each frame by a friction picked from ordered
//!   [`FrictionTier`]s until both components fall below a minimum.
//!
//! The host provides frames through a [`FrameScheduler`], which hands out a
//! [`FrameHandle`] per request so a pending fling can be cancelled.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Point, Size, Vec2};
//! use understory_scroll::{FrameHandle, FrameScheduler, MomentumScroller};
//! use understory_sparse_grid::SparseGrid;
//!
//! #[derive(Default)]
//! struct Frames {
//!     next: u64,
//! }
//!
//! impl FrameScheduler for Frames {
//!     fn request_frame(&mut self) -> FrameHandle {
//!         self.next += 1;
//!         FrameHandle::new(self.next)
//!     }
//!     fn cancel_frame(&mut self, _: FrameHandle) {}
//! }
//!
//! let mut grid = SparseGrid::with_constant(());
//! grid.set_cell_size(Size::new(100.0, 100.0));
//! let mut frames = Frames::default();
//! let mut scroller = MomentumScroller::new();
//!
//! // Drag one and a half cells to the left.
//! scroller.drag_start(Point::new(300.0, 0.0), &mut frames);
//! scroller.drag_move(Point::new(150.0, 0.0), &mut grid);
//! assert_eq!(grid.position().x, 1);
//! assert_eq!(grid.position_fraction(), Vec2::new(0.5, 0.0));
//!
//! // Letting go while moving starts a fling that runs on frames.
//! assert!(scroller.drag_end(&mut frames));
//! while let Some(handle) = scroller.pending_frame() {
//!     scroller.on_frame(handle, &mut grid, &mut frames);
//! }
//! assert!(!scroller.is_flinging());
//! assert!(grid.position().x > 1);
//! ```
//!
//! ## Features
//!
//! - `std` (default): enables `std` support for `kurbo`.
//! - `libm`: enables `no_std` builds that rely on `libm` for floating-point math.
//!
//! This crate is `no_std`.

#![no_std]

mod frame;
mod momentum;

pub use frame::{FrameDecision, FrameGate, FrameHandle, FrameScheduler};
pub use momentum::{FlingConfig, FrictionTier, MomentumScroller, ScrollTarget};
