// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame requests and render pacing.

/// Identifies one requested frame so it can be cancelled or matched.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(u64);

impl FrameHandle {
    /// Wraps a host-assigned frame identifier.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The host-assigned identifier.
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// The host's "next animation opportunity".
///
/// A requested frame is delivered back to whoever requested it together with
/// its handle; cancelling a handle means that frame must not be delivered.
pub trait FrameScheduler {
    /// Requests a callback on the next frame.
    fn request_frame(&mut self) -> FrameHandle;

    /// Cancels a pending request. Unknown or delivered handles are ignored.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// What a [`FrameGate`] decided for an incoming frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FrameDecision {
    /// Render now.
    Render,
    /// A render is queued but the minimum frame interval has not elapsed; ask
    /// for another frame.
    Postpone,
    /// Nothing is queued.
    Idle,
}

/// Coalesces render requests and caps the render rate.
///
/// [`queue`](Self::queue) returns `true` only for the first request since the
/// last render, so callers request exactly one frame per batch of mutations.
/// [`on_frame`](Self::on_frame) turns a delivered frame into a render unless
/// the previous render was less than one frame interval ago.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameGate {
    fps: u32,
    min_interval_ms: u64,
    queued: bool,
    last_render_ms: Option<u64>,
}

impl Default for FrameGate {
    fn default() -> Self {
        Self::new(Self::DEFAULT_FPS)
    }
}

impl FrameGate {
    /// Default frame rate cap.
    pub const DEFAULT_FPS: u32 = 30;

    /// Creates a gate capped at `fps` renders per second. Zero is treated as one.
    pub const fn new(fps: u32) -> Self {
        let fps = if fps == 0 { 1 } else { fps };
        Self {
            fps,
            min_interval_ms: 1000 / fps as u64,
            queued: false,
            last_render_ms: None,
        }
    }

    /// Frame rate cap.
    pub const fn fps(&self) -> u32 {
        self.fps
    }

    /// Minimum time between two renders.
    pub const fn min_interval_ms(&self) -> u64 {
        self.min_interval_ms
    }

    /// Changes the frame rate cap. Zero is treated as one.
    pub fn set_fps(&mut self, fps: u32) {
        let queued = self.queued;
        let last = self.last_render_ms;
        *self = Self::new(fps);
        self.queued = queued;
        self.last_render_ms = last;
    }

    /// Marks a render as wanted. Returns `true` if this is the first request
    /// since the last render, in which case the caller should request a frame.
    pub fn queue(&mut self) -> bool {
        !core::mem::replace(&mut self.queued, true)
    }

    /// Returns `true` if a render is queued.
    pub const fn is_queued(&self) -> bool {
        self.queued
    }

    /// Drops a queued render without rendering.
    pub fn cancel(&mut self) {
        self.queued = false;
    }

    /// Time of the last render, if any.
    pub const fn last_render_ms(&self) -> Option<u64> {
        self.last_render_ms
    }

    /// Decides what to do with a frame delivered at `now_ms`.
    ///
    /// On [`FrameDecision::Render`] the queue is cleared and `now_ms` recorded.
    /// On [`FrameDecision::Postpone`] the render stays queued.
    pub fn on_frame(&mut self, now_ms: u64) -> FrameDecision {
        if !self.queued {
            return FrameDecision::Idle;
        }
        if let Some(last) = self.last_render_ms {
            let elapsed = now_ms.saturating_sub(last);
            if elapsed < self.min_interval_ms {
                log::trace!("render postponed, {elapsed}ms since last");
                return FrameDecision::Postpone;
            }
        }
        self.queued = false;
        self.last_render_ms = Some(now_ms);
        FrameDecision::Render
    }
}

#[cfg(test)]
mod tests {
    use super::{FrameDecision, FrameGate};

    #[test]
    fn requests_coalesce_until_rendered() {
        let mut gate = FrameGate::default();
        assert!(gate.queue());
        assert!(!gate.queue());
        assert!(!gate.queue());
        assert_eq!(gate.on_frame(0), FrameDecision::Render);
        assert!(!gate.is_queued());
        assert!(gate.queue());
    }

    #[test]
    fn frames_without_requests_are_idle() {
        let mut gate = FrameGate::default();
        assert_eq!(gate.on_frame(10), FrameDecision::Idle);
        assert_eq!(gate.last_render_ms(), None);
    }

    #[test]
    fn renders_are_capped_to_the_frame_interval() {
        let mut gate = FrameGate::new(30);
        assert_eq!(gate.min_interval_ms(), 33);

        gate.queue();
        assert_eq!(gate.on_frame(1_000), FrameDecision::Render);

        gate.queue();
        assert_eq!(gate.on_frame(1_016), FrameDecision::Postpone);
        assert!(gate.is_queued());
        assert_eq!(gate.on_frame(1_032), FrameDecision::Postpone);
        assert_eq!(gate.on_frame(1_033), FrameDecision::Render);
        assert_eq!(gate.last_render_ms(), Some(1_033));
    }

    #[test]
    fn first_render_is_never_postponed() {
        let mut gate = FrameGate::new(1);
        gate.queue();
        assert_eq!(gate.on_frame(0), FrameDecision::Render);
    }

    #[test]
    fn zero_fps_is_clamped() {
        let mut gate = FrameGate::new(0);
        assert_eq!(gate.fps(), 1);
        assert_eq!(gate.min_interval_ms(), 1000);
        gate.queue();
        gate.set_fps(60);
        assert!(gate.is_queued());
        assert_eq!(gate.min_interval_ms(), 16);
    }

    #[test]
    fn cancel_drops_the_queued_render() {
        let mut gate = FrameGate::default();
        gate.queue();
        gate.cancel();
        assert_eq!(gate.on_frame(0), FrameDecision::Idle);
    }
}
