// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The [`HotArray`] container and its reindexing policy.

use alloc::vec::Vec;

use hashbrown::HashMap;

/// Placement and reindexing thresholds for a [`HotArray`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HotArrayConfig {
    /// Backing index at which an empty or reindexed array starts.
    ///
    /// This is the headroom available to `unshift` before a reindex is forced.
    pub head_window: usize,
    /// Slack (`(head - head_outer) + (tail_outer - tail)`) that triggers a reindex.
    pub excess_window: usize,
}

impl Default for HotArrayConfig {
    fn default() -> Self {
        Self {
            head_window: 10_000,
            excess_window: 10_000,
        }
    }
}

/// A sparse, index-shiftable double-ended array.
///
/// Invariant: `head_outer <= head <= tail <= tail_outer`, and the backing
/// index span `tail_outer - head_outer` stays within
/// `len + excess_window` (plus the single operation that crossed the threshold)
/// regardless of how many items have passed through.
///
/// The array does not own its items in any semantic sense; it is bookkeeping
/// for which items are currently hot.
#[derive(Clone, Debug)]
pub struct HotArray<T> {
    items: HashMap<usize, T>,
    config: HotArrayConfig,
    head: usize,
    tail: usize,
    head_outer: usize,
    tail_outer: usize,
    reindexes: usize,
}

impl<T> Default for HotArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HotArray<T> {
    /// Creates an empty array with the default [`HotArrayConfig`].
    pub fn new() -> Self {
        Self::with_config(HotArrayConfig::default())
    }

    /// Creates an empty array with an explicit configuration.
    pub fn with_config(config: HotArrayConfig) -> Self {
        Self {
            items: HashMap::new(),
            config,
            head: config.head_window,
            tail: config.head_window,
            head_outer: config.head_window,
            tail_outer: config.head_window,
            reindexes: 0,
        }
    }

    /// Returns the configuration.
    pub const fn config(&self) -> HotArrayConfig {
        self.config
    }

    /// Appends an item at the tail.
    pub fn push(&mut self, item: T) {
        self.items.insert(self.tail, item);
        self.tail += 1;
        self.tail_outer = self.tail_outer.max(self.tail);
    }

    /// Removes the item at the tail.
    pub fn pop(&mut self) -> Option<T> {
        if self.head == self.tail {
            return None;
        }
        self.tail -= 1;
        let item = self.items.remove(&self.tail);
        self.reindex_if_slack();
        item
    }

    /// Inserts an item at the head.
    pub fn unshift(&mut self, item: T) {
        self.reserve_head(1);
        self.head -= 1;
        self.items.insert(self.head, item);
        self.head_outer = self.head_outer.min(self.head);
    }

    /// Inserts several items at the head, keeping their order.
    ///
    /// After `prepend([a, b])` the array starts with `a, b`.
    pub fn prepend<I: IntoIterator<Item = T>>(&mut self, items: I) {
        let items: Vec<T> = items.into_iter().collect();
        self.reserve_head(items.len());
        for item in items.into_iter().rev() {
            self.head -= 1;
            self.items.insert(self.head, item);
        }
        self.head_outer = self.head_outer.min(self.head);
    }

    /// Removes the item at the head.
    pub fn shift(&mut self) -> Option<T> {
        if self.head == self.tail {
            return None;
        }
        let item = self.items.remove(&self.head);
        self.head += 1;
        self.reindex_if_slack();
        item
    }

    /// Removes every item and recenters the window at `head_window`.
    pub fn clear(&mut self) {
        self.items.clear();
        let origin = self.config.head_window;
        self.head = origin;
        self.tail = origin;
        self.head_outer = origin;
        self.tail_outer = origin;
    }

    /// Number of live items.
    pub const fn len(&self) -> usize {
        self.tail - self.head
    }

    /// Returns `true` if there are no live items.
    pub const fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    /// Item at logical position `index` (0 is the head).
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len() {
            return None;
        }
        self.items.get(&(self.head + index))
    }

    /// Mutable item at logical position `index` (0 is the head).
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.len() {
            return None;
        }
        self.items.get_mut(&(self.head + index))
    }

    /// Item at the head.
    pub fn first(&self) -> Option<&T> {
        self.get(0)
    }

    /// Item at the tail.
    pub fn last(&self) -> Option<&T> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }

    /// Iterates live items from head to tail.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + '_ {
        (self.head..self.tail).filter_map(|i| self.items.get(&i))
    }

    /// Backing index of the head.
    pub const fn head(&self) -> usize {
        self.head
    }

    /// Backing index one past the tail.
    pub const fn tail(&self) -> usize {
        self.tail
    }

    /// Lowest backing index touched since the last reindex.
    pub const fn head_outer(&self) -> usize {
        self.head_outer
    }

    /// One past the highest backing index touched since the last reindex.
    pub const fn tail_outer(&self) -> usize {
        self.tail_outer
    }

    /// Stale backing indices on both sides of the live window.
    pub const fn slack(&self) -> usize {
        (self.head - self.head_outer) + (self.tail_outer - self.tail)
    }

    /// Width of the backing index range touched since the last reindex.
    pub const fn backing_span(&self) -> usize {
        self.tail_outer - self.head_outer
    }

    /// Number of reindexes performed so far.
    pub const fn reindex_count(&self) -> usize {
        self.reindexes
    }

    fn reserve_head(&mut self, n: usize) {
        if self.head < n {
            self.reindex(self.config.head_window.max(n));
        }
    }

    fn reindex_if_slack(&mut self) {
        if self.slack() >= self.config.excess_window {
            self.reindex(self.config.head_window);
        }
    }

    /// Moves live items to `origin..origin + len` and forgets the outer bounds.
    fn reindex(&mut self, origin: usize) {
        let len = self.len();
        let mut items = HashMap::with_capacity(len);
        for (offset, i) in (self.head..self.tail).enumerate() {
            if let Some(item) = self.items.remove(&i) {
                items.insert(origin + offset, item);
            }
        }
        self.items = items;
        self.head = origin;
        self.tail = origin + len;
        self.head_outer = self.head;
        self.tail_outer = self.tail;
        self.reindexes += 1;
        log::trace!("hot array reindexed {len} items at {origin}");
    }
}

impl<T> Extend<T> for HotArray<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }
}
