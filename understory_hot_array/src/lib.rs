// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_hot_array --heading-base-level=0

//! Understory Hot Array: a windowed sparse array for sliding sets of items.
//!
//! A [`HotArray`] tracks the "hot" items of a virtualized view, for example the
//! rows currently on screen. Items enter and leave at both ends as the view
//! scrolls, so the array supports `push`/`pop` at the tail and
//! `unshift`/`shift` at the head, each in amortized O(1).
//!
//! Internally items live in a sparse map keyed by a *shifted* index. The live
//! window is `head..tail`; the outer bounds `head_outer..tail_outer` remember how
//! far the window has reached since the last reindex. Sustained scrolling in one
//! direction would otherwise push those indices without bound, so once the slack
//! between the outer and inner bounds reaches
//! [`HotArrayConfig::excess_window`] (or the head would underflow) the array
//! recenters all live items at [`HotArrayConfig::head_window`].
//!
//! ## Minimal example
//!
//! ```rust
//! use understory_hot_array::HotArray;
//!
//! let mut rows = HotArray::new();
//! rows.extend([10, 11, 12]);
//!
//! // Scroll down one row: row 10 leaves at the head, row 13 enters at the tail.
//! assert_eq!(rows.shift(), Some(10));
//! rows.push(13);
//!
//! // Scroll back up.
//! assert_eq!(rows.pop(), Some(13));
//! rows.unshift(10);
//!
//! assert_eq!(rows.iter().copied().collect::<Vec<_>>(), [10, 11, 12]);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod hot_array;

pub use hot_array::{HotArray, HotArrayConfig};
