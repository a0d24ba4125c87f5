// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_pool --heading-base-level=0

//! Understory Pool: a lend/return pool for expensive visual resources.
//!
//! Virtualized views show a small, moving window over a much larger logical
//! space. Creating and destroying a visual resource (a widget, a display-list
//! node, a GPU quad) every time a cell scrolls in or out is wasteful; a
//! [`ResourcePool`] keeps released resources idle so the next borrow can reuse
//! them.
//!
//! - [`ResourcePool::try_borrow`] hands out an idle resource if one exists and
//!   otherwise asks [`PoolHooks::create`] for a new one.
//! - [`ResourcePool::release`] returns a borrowed resource to the idle set.
//!   Releasing something that is not currently borrowed is a silent no-op.
//! - [`ResourcePool::release_all`] recycles everything at once, which is the
//!   usual start of a render pass.
//! - [`ResourcePool::clear`] releases everything and then disposes of every
//!   resource permanently.
//!
//! Resources are stored in a dense slot array and addressed by a generational
//! [`PoolKey`]. A key never resolves once its resource has been disposed of.
//!
//! ## Minimal example
//!
//! ```rust
//! use understory_pool::ResourcePool;
//!
//! let mut created = 0;
//! let mut pool = ResourcePool::from_fn(move || {
//!     created += 1;
//!     format!("label #{created}")
//! });
//!
//! let a = pool.borrow();
//! let b = pool.borrow();
//! assert_eq!(pool.stats().created, 2);
//!
//! // Recycle everything, then borrow again: no new resources are created.
//! pool.release_all();
//! let c = pool.borrow();
//! assert_eq!(pool.stats().created, 2);
//! // The oldest idle resource is handed out first.
//! assert_eq!(c, a);
//! assert!(!pool.is_borrowed(b));
//! ```
//!
//! Hooks that can fail (for example a factory that talks to a renderer) set
//! [`PoolHooks::Error`] and are driven through [`ResourcePool::try_borrow`].
//! Errors are returned unchanged; the pool is left as it was before the call.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod hooks;
mod pool;

pub use hooks::{FnHooks, PoolHooks};
pub use pool::{PoolKey, PoolStats, ResourcePool};
