// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag tracking and fling animation.

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Point, Vec2};
use smallvec::SmallVec;
use understory_sparse_grid::SparseGrid;

use crate::frame::{FrameHandle, FrameScheduler};

/// Something that scrolls by pixel deltas.
pub trait ScrollTarget {
    /// Moves the content by `delta` pixels.
    fn move_pixel_position(&mut self, delta: Vec2);
}

impl<V> ScrollTarget for SparseGrid<V> {
    fn move_pixel_position(&mut self, delta: Vec2) {
        Self::move_pixel_position(self, delta);
    }
}

/// Friction applied while the fling speed is at or above `threshold`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FrictionTier {
    /// Minimum speed, in pixels per frame, for this tier.
    pub threshold: f64,
    /// Velocity multiplier per frame.
    pub friction: f64,
}

impl FrictionTier {
    /// Creates a tier.
    pub const fn new(threshold: f64, friction: f64) -> Self {
        Self {
            threshold,
            friction,
        }
    }
}

/// Fling tuning.
#[derive(Clone, Debug, PartialEq)]
pub struct FlingConfig {
    /// Factor applied to the last drag delta on release.
    pub multiplier: f64,
    /// Speed below which a fling does not start and a running fling stops.
    pub min_velocity: f64,
    tiers: SmallVec<[FrictionTier; 4]>,
}

impl Default for FlingConfig {
    fn default() -> Self {
        Self {
            multiplier: 3.0,
            min_velocity: 1.0,
            tiers: SmallVec::from_slice(&[
                FrictionTier::new(10.0, 0.99),
                FrictionTier::new(5.0, 0.97),
                FrictionTier::new(0.0, 0.85),
            ]),
        }
    }
}

impl FlingConfig {
    /// Returns this configuration with its friction tiers replaced.
    ///
    /// Tiers are kept ordered by descending threshold.
    #[must_use]
    pub fn with_tiers(mut self, tiers: impl IntoIterator<Item = FrictionTier>) -> Self {
        self.tiers = tiers.into_iter().collect();
        self.tiers.sort_by(|a, b| b.threshold.total_cmp(&a.threshold));
        self
    }

    /// Friction tiers by descending threshold.
    pub fn tiers(&self) -> &[FrictionTier] {
        &self.tiers
    }

    /// Friction for a fling moving at `speed` pixels per frame.
    ///
    /// Picks the first tier whose threshold is at or below `speed`. Speeds
    /// below every threshold use the lowest tier; with no tiers at all the
    /// fling stops after one frame.
    pub fn friction_for(&self, speed: f64) -> f64 {
        self.tiers
            .iter()
            .find(|tier| tier.threshold <= speed)
            .or(self.tiers.last())
            .map_or(0.0, |tier| tier.friction)
    }
}

/// Pointer-driven scrolling with momentum.
///
/// Two states, idle and dragging, plus a fling that may run after a drag ends.
/// A fling lives on host frames: it holds the handle of the frame it expects
/// next, and [`on_frame`](Self::on_frame) ignores any other handle.
#[derive(Clone, Debug)]
pub struct MomentumScroller {
    config: FlingConfig,
    last_pointer: Option<Point>,
    velocity: Vec2,
    fling: Option<FrameHandle>,
}

impl Default for MomentumScroller {
    fn default() -> Self {
        Self::new()
    }
}

impl MomentumScroller {
    /// Creates an idle scroller with the default [`FlingConfig`].
    pub fn new() -> Self {
        Self::with_config(FlingConfig::default())
    }

    /// Creates an idle scroller.
    pub fn with_config(config: FlingConfig) -> Self {
        Self {
            config,
            last_pointer: None,
            velocity: Vec2::ZERO,
            fling: None,
        }
    }

    /// Fling tuning.
    pub fn config(&self) -> &FlingConfig {
        &self.config
    }

    /// Returns `true` between [`drag_start`](Self::drag_start) and
    /// [`drag_end`](Self::drag_end).
    pub const fn is_dragging(&self) -> bool {
        self.last_pointer.is_some()
    }

    /// Returns `true` while a fling is waiting for its next frame.
    pub const fn is_flinging(&self) -> bool {
        self.fling.is_some()
    }

    /// Frame the running fling is waiting for.
    pub const fn pending_frame(&self) -> Option<FrameHandle> {
        self.fling
    }

    /// Current velocity in pixels per event (dragging) or per frame (flinging).
    pub const fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Starts a drag at `pointer`, cancelling any running fling.
    pub fn drag_start(&mut self, pointer: Point, scheduler: &mut impl FrameScheduler) {
        self.stop(scheduler);
        self.last_pointer = Some(pointer);
        self.velocity = Vec2::ZERO;
    }

    /// Applies the pointer movement since the last event to `target`.
    ///
    /// The movement becomes the current velocity. Returns `false` when not
    /// dragging.
    pub fn drag_move(&mut self, pointer: Point, target: &mut impl ScrollTarget) -> bool {
        let Some(last) = self.last_pointer else {
            return false;
        };
        self.last_pointer = Some(pointer);
        let delta = pointer - last;
        debug_assert!(delta.is_finite(), "pointer positions must be finite");
        self.velocity = delta;
        target.move_pixel_position(delta);
        true
    }

    /// Ends the drag and starts a fling if the scaled velocity is large
    /// enough. Returns `true` if a fling started.
    pub fn drag_end(&mut self, scheduler: &mut impl FrameScheduler) -> bool {
        if self.last_pointer.take().is_none() {
            return false;
        }
        self.velocity *= self.config.multiplier;
        if speed(self.velocity) < self.config.min_velocity {
            self.velocity = Vec2::ZERO;
            return false;
        }
        log::debug!("fling started at {:?}", self.velocity);
        self.fling = Some(scheduler.request_frame());
        true
    }

    /// Advances the fling by one frame.
    ///
    /// Moves `target` by the current velocity, then decays it by the friction
    /// for the current speed. Requests the next frame unless both components
    /// fell below the minimum. Returns `false`, doing nothing, if `handle` is
    /// not the frame the fling is waiting for.
    pub fn on_frame(
        &mut self,
        handle: FrameHandle,
        target: &mut impl ScrollTarget,
        scheduler: &mut impl FrameScheduler,
    ) -> bool {
        if self.fling != Some(handle) {
            return false;
        }
        target.move_pixel_position(self.velocity);
        self.velocity *= self.config.friction_for(speed(self.velocity));
        let min = self.config.min_velocity;
        if self.velocity.x.abs() < min && self.velocity.y.abs() < min {
            log::debug!("fling stopped");
            self.fling = None;
            self.velocity = Vec2::ZERO;
        } else {
            self.fling = Some(scheduler.request_frame());
        }
        true
    }

    /// Cancels a running fling. Returns `true` if one was running.
    pub fn stop(&mut self, scheduler: &mut impl FrameScheduler) -> bool {
        match self.fling.take() {
            Some(handle) => {
                scheduler.cancel_frame(handle);
                self.velocity = Vec2::ZERO;
                log::debug!("fling cancelled");
                true
            }
            None => false,
        }
    }
}

/// The larger velocity component magnitude.
fn speed(velocity: Vec2) -> f64 {
    velocity.x.abs().max(velocity.y.abs())
}

#[cfg(test)]
mod tests {
    extern crate alloc;

    use alloc::vec::Vec;

    use kurbo::{Point, Size, Vec2};
    use understory_sparse_grid::{Coordinate, SparseGrid};

    use super::{FlingConfig, FrictionTier, MomentumScroller, ScrollTarget};
    use crate::frame::{FrameHandle, FrameScheduler};

    #[derive(Default)]
    struct Frames {
        next: u64,
        cancelled: Vec<FrameHandle>,
    }

    impl FrameScheduler for Frames {
        fn request_frame(&mut self) -> FrameHandle {
            self.next += 1;
            FrameHandle::new(self.next)
        }

        fn cancel_frame(&mut self, handle: FrameHandle) {
            self.cancelled.push(handle);
        }
    }

    #[derive(Default)]
    struct Moves(Vec<Vec2>);

    impl ScrollTarget for Moves {
        fn move_pixel_position(&mut self, delta: Vec2) {
            self.0.push(delta);
        }
    }

    fn run_fling(scroller: &mut MomentumScroller, target: &mut Moves, frames: &mut Frames) {
        let mut ticks = 0;
        while let Some(handle) = scroller.pending_frame() {
            assert!(scroller.on_frame(handle, target, frames));
            ticks += 1;
            assert!(ticks < 10_000, "fling never settled");
        }
    }

    #[test]
    fn drag_applies_each_move_immediately() {
        let mut frames = Frames::default();
        let mut moves = Moves::default();
        let mut scroller = MomentumScroller::new();

        assert!(!scroller.drag_move(Point::new(1.0, 1.0), &mut moves));
        assert!(moves.0.is_empty());

        scroller.drag_start(Point::new(10.0, 10.0), &mut frames);
        assert!(scroller.is_dragging());
        assert!(scroller.drag_move(Point::new(7.0, 12.0), &mut moves));
        assert!(scroller.drag_move(Point::new(5.0, 12.0), &mut moves));
        assert_eq!(moves.0, [Vec2::new(-3.0, 2.0), Vec2::new(-2.0, 0.0)]);
        // Velocity is the last delta, not an average.
        assert_eq!(scroller.velocity(), Vec2::new(-2.0, 0.0));
    }

    #[test]
    fn release_scales_velocity_and_decays_by_tier() {
        let mut frames = Frames::default();
        let mut moves = Moves::default();
        let mut scroller = MomentumScroller::new();

        scroller.drag_start(Point::ZERO, &mut frames);
        scroller.drag_move(Point::new(-4.0, 0.0), &mut moves);
        assert!(scroller.drag_end(&mut frames));
        assert!(!scroller.is_dragging());
        assert!(scroller.is_flinging());
        assert_eq!(scroller.velocity(), Vec2::new(-12.0, 0.0));

        moves.0.clear();
        let handle = scroller.pending_frame().unwrap();
        assert!(scroller.on_frame(handle, &mut moves, &mut frames));
        assert_eq!(moves.0, [Vec2::new(-12.0, 0.0)]);
        // 12 px/frame is in the fastest tier.
        assert!((scroller.velocity().x + 11.88).abs() < 1e-9);

        run_fling(&mut scroller, &mut moves, &mut frames);
        assert!(!scroller.is_flinging());
        assert_eq!(scroller.velocity(), Vec2::ZERO);
        let last = moves.0.last().unwrap();
        assert!(last.x.abs() >= 1.0);
        assert!(moves.0.windows(2).all(|w| w[1].x.abs() < w[0].x.abs()));
    }

    #[test]
    fn slow_release_does_not_fling() {
        let mut frames = Frames::default();
        let mut moves = Moves::default();
        let mut scroller = MomentumScroller::new();

        scroller.drag_start(Point::ZERO, &mut frames);
        scroller.drag_move(Point::new(0.2, -0.3), &mut moves);
        assert!(!scroller.drag_end(&mut frames));
        assert!(!scroller.is_flinging());
        assert_eq!(frames.next, 0);
        assert!(!scroller.drag_end(&mut frames));
    }

    #[test]
    fn new_drag_cancels_the_fling() {
        let mut frames = Frames::default();
        let mut moves = Moves::default();
        let mut scroller = MomentumScroller::new();

        scroller.drag_start(Point::ZERO, &mut frames);
        scroller.drag_move(Point::new(50.0, 0.0), &mut moves);
        scroller.drag_end(&mut frames);
        let pending = scroller.pending_frame().unwrap();

        scroller.drag_start(Point::ZERO, &mut frames);
        assert!(!scroller.is_flinging());
        assert_eq!(frames.cancelled, [pending]);

        // The cancelled frame is ignored if the host delivers it anyway.
        moves.0.clear();
        assert!(!scroller.on_frame(pending, &mut moves, &mut frames));
        assert!(moves.0.is_empty());
    }

    #[test]
    fn stop_is_a_no_op_when_idle() {
        let mut frames = Frames::default();
        let mut scroller = MomentumScroller::new();
        assert!(!scroller.stop(&mut frames));
        assert!(frames.cancelled.is_empty());
    }

    #[test]
    fn friction_tiers_pick_by_descending_threshold() {
        let config = FlingConfig::default();
        assert_eq!(config.friction_for(25.0), 0.99);
        assert_eq!(config.friction_for(10.0), 0.99);
        assert_eq!(config.friction_for(7.0), 0.97);
        assert_eq!(config.friction_for(1.0), 0.85);

        let config = FlingConfig::default().with_tiers([
            FrictionTier::new(2.0, 0.5),
            FrictionTier::new(20.0, 0.9),
        ]);
        assert_eq!(config.tiers()[0].threshold, 20.0);
        assert_eq!(config.friction_for(30.0), 0.9);
        assert_eq!(config.friction_for(3.0), 0.5);
        // Below every threshold the lowest tier applies.
        assert_eq!(config.friction_for(1.0), 0.5);
        assert_eq!(FlingConfig::default().with_tiers([]).friction_for(8.0), 0.0);
    }

    #[test]
    fn drags_move_a_sparse_grid() {
        let mut frames = Frames::default();
        let mut grid = SparseGrid::with_constant(());
        grid.set_cell_size(Size::new(100.0, 50.0));
        let mut scroller = MomentumScroller::new();

        let start = Point::new(500.0, 500.0);
        scroller.drag_start(start, &mut frames);
        for step in 1..=4 {
            scroller.drag_move(start - Vec2::new(50.0, 25.0) * f64::from(step), &mut grid);
        }
        assert_eq!(grid.position(), Coordinate::new(2, 2));
        assert_eq!(grid.position_fraction(), Vec2::ZERO);
    }
}
