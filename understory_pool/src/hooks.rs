// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lifecycle hooks invoked by [`ResourcePool`](crate::ResourcePool).

use core::convert::Infallible;
use core::fmt;

/// Lifecycle callbacks for pooled resources.
///
/// Only [`create`](Self::create) is required. Every other hook defaults to a
/// no-op. Hooks are invoked synchronously from the pool method that triggers
/// them, in the order documented on each pool method.
pub trait PoolHooks<R> {
    /// Error produced by [`create`](Self::create).
    ///
    /// Use [`Infallible`] for factories that cannot fail; the pool then offers
    /// a plain [`borrow`](crate::ResourcePool::borrow).
    type Error;

    /// Creates a brand new resource. Called when no idle resource exists.
    fn create(&mut self) -> Result<R, Self::Error>;

    /// Called on every checkout, whether the resource was idle or just created.
    fn on_borrow(&mut self, _resource: &mut R) {}

    /// Called when a borrowed resource returns to the idle set.
    fn on_release(&mut self, _resource: &mut R) {}

    /// Called once at the start of a release-all, with the number of borrowed resources.
    fn on_release_all(&mut self, _borrowed: usize) {}

    /// Called when a resource is permanently disposed of.
    fn on_remove(&mut self, _resource: R) {}

    /// Called once per clear, after everything was released and before any removal.
    fn on_clear(&mut self) {}
}

/// [`PoolHooks`] backed by an infallible factory closure.
///
/// All other hooks are no-ops.
pub struct FnHooks<F> {
    create: F,
}

impl<F> FnHooks<F> {
    /// Wraps a factory closure.
    pub const fn new(create: F) -> Self {
        Self { create }
    }
}

impl<F> fmt::Debug for FnHooks<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHooks").finish_non_exhaustive()
    }
}

impl<R, F: FnMut() -> R> PoolHooks<R> for FnHooks<F> {
    type Error = Infallible;

    fn create(&mut self) -> Result<R, Infallible> {
        Ok((self.create)())
    }
}
