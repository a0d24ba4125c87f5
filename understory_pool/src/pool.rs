// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Slot storage and the borrow/release state machine.

use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::convert::Infallible;
use core::fmt;

use crate::hooks::{FnHooks, PoolHooks};

/// Generational handle to a pooled resource.
///
/// A key stays valid while its resource is alive (idle or borrowed) and never
/// resolves again once [`ResourcePool::clear`] disposed of it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PoolKey(u32, u32);

impl PoolKey {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Pool keys are intentionally 32-bit; pools never approach u32::MAX slots."
    )]
    const fn new(idx: usize, generation: u32) -> Self {
        Self(idx as u32, generation)
    }

    const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Lifetime counters for a pool.
///
/// At all times `borrowed_len() + idle_len() == created - removed`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Resources produced by [`PoolHooks::create`].
    pub created: usize,
    /// Resources disposed of through [`PoolHooks::on_remove`].
    pub removed: usize,
    /// Successful checkouts, including ones that created a resource.
    pub borrows: usize,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum SlotState {
    Idle,
    Borrowed,
    Vacant,
}

struct Slot<R> {
    generation: u32,
    state: SlotState,
    // Position in `ResourcePool::borrowed` while borrowed.
    borrowed_at: usize,
    resource: Option<R>,
}

/// A pool of reusable resources with idle and borrowed sets.
///
/// Every live resource is in exactly one of the two sets. Idle resources are
/// handed out oldest first, and [`borrowed`](Self::borrowed) reports borrowed
/// keys in checkout order so a render pass can rely on deterministic reuse.
pub struct ResourcePool<R, H> {
    slots: Vec<Slot<R>>,
    idle: VecDeque<usize>,
    // Checkout order; released entries become `None` until the next compaction.
    borrowed: Vec<Option<usize>>,
    borrowed_len: usize,
    free_list: Vec<usize>,
    stats: PoolStats,
    hooks: H,
}

impl<R, H> fmt::Debug for ResourcePool<R, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourcePool")
            .field("slots", &self.slots.len())
            .field("idle", &self.idle.len())
            .field("borrowed", &self.borrowed_len)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<R, F: FnMut() -> R> ResourcePool<R, FnHooks<F>> {
    /// Creates a pool whose resources come from an infallible factory closure.
    pub fn from_fn(create: F) -> Self {
        Self::new(FnHooks::new(create))
    }
}

impl<R, H: PoolHooks<R>> ResourcePool<R, H> {
    /// Creates an empty pool driven by `hooks`.
    pub fn new(hooks: H) -> Self {
        Self {
            slots: Vec::new(),
            idle: VecDeque::new(),
            borrowed: Vec::new(),
            borrowed_len: 0,
            free_list: Vec::new(),
            stats: PoolStats::default(),
            hooks,
        }
    }

    /// Checks out a resource, creating one if the idle set is empty.
    ///
    /// Fires [`PoolHooks::create`] (only when nothing is idle) followed by
    /// [`PoolHooks::on_borrow`]. A failed creation leaves the pool unchanged.
    pub fn try_borrow(&mut self) -> Result<PoolKey, H::Error> {
        let idx = match self.idle.pop_front() {
            Some(idx) => idx,
            None => {
                let resource = self.hooks.create()?;
                self.stats.created += 1;
                let idx = self.insert_slot(resource);
                log::trace!("pool created resource in slot {idx}");
                idx
            }
        };
        let slot = &mut self.slots[idx];
        slot.state = SlotState::Borrowed;
        slot.borrowed_at = self.borrowed.len();
        if let Some(resource) = slot.resource.as_mut() {
            self.hooks.on_borrow(resource);
        }
        self.borrowed.push(Some(idx));
        self.borrowed_len += 1;
        self.stats.borrows += 1;
        Ok(PoolKey::new(idx, slot.generation))
    }

    /// Returns a borrowed resource to the idle set.
    ///
    /// Returns `false` without firing any hook if `key` is not currently
    /// borrowed (already released, disposed of, or never issued).
    pub fn release(&mut self, key: PoolKey) -> bool {
        if !self.is_borrowed(key) {
            return false;
        }
        let idx = key.idx();
        self.borrowed[self.slots[idx].borrowed_at] = None;
        self.borrowed_len -= 1;
        if self.borrowed.len() > 2 * self.borrowed_len {
            self.compact_borrowed();
        }
        self.park(idx);
        true
    }

    /// Releases every borrowed resource, in checkout order.
    ///
    /// Fires [`PoolHooks::on_release_all`] once, then [`PoolHooks::on_release`]
    /// for each resource.
    pub fn release_all(&mut self) {
        let mut borrowed = core::mem::take(&mut self.borrowed);
        let count = core::mem::take(&mut self.borrowed_len);
        self.hooks.on_release_all(count);
        for &idx in borrowed.iter().flatten() {
            self.park(idx);
        }
        log::trace!("pool released {count} resources");
        borrowed.clear();
        self.borrowed = borrowed;
    }

    /// Releases everything, then permanently disposes of every resource.
    ///
    /// Fires [`PoolHooks::on_clear`] once after the release and then
    /// [`PoolHooks::on_remove`] for each resource, oldest idle first.
    pub fn clear(&mut self) {
        self.release_all();
        self.hooks.on_clear();
        let mut removed = 0_usize;
        while let Some(idx) = self.idle.pop_front() {
            let slot = &mut self.slots[idx];
            slot.state = SlotState::Vacant;
            slot.generation = slot.generation.wrapping_add(1);
            if let Some(resource) = slot.resource.take() {
                self.hooks.on_remove(resource);
                removed += 1;
            }
            self.free_list.push(idx);
        }
        self.stats.removed += removed;
        log::debug!("pool cleared, {removed} resources removed");
    }

    /// Returns a live resource (idle or borrowed).
    pub fn get(&self, key: PoolKey) -> Option<&R> {
        self.live_slot(key).and_then(|slot| slot.resource.as_ref())
    }

    /// Returns a live resource mutably (idle or borrowed).
    pub fn get_mut(&mut self, key: PoolKey) -> Option<&mut R> {
        self.live_slot_mut(key)
            .and_then(|slot| slot.resource.as_mut())
    }

    /// Returns a live resource together with the hooks, for callers that need
    /// the factory side (for example a renderer) while updating a resource.
    pub fn resource_and_hooks_mut(&mut self, key: PoolKey) -> Option<(&mut R, &mut H)> {
        let slot = self
            .slots
            .get_mut(key.idx())
            .filter(|slot| slot.generation == key.1 && slot.state != SlotState::Vacant)?;
        let resource = slot.resource.as_mut()?;
        Some((resource, &mut self.hooks))
    }

    /// Returns `true` if `key` refers to a currently borrowed resource.
    pub fn is_borrowed(&self, key: PoolKey) -> bool {
        self.live_slot(key)
            .is_some_and(|slot| slot.state == SlotState::Borrowed)
    }

    /// Borrowed keys in checkout order.
    pub fn borrowed(&self) -> impl Iterator<Item = PoolKey> + '_ {
        self.borrowed
            .iter()
            .flatten()
            .map(|&idx| PoolKey::new(idx, self.slots[idx].generation))
    }

    /// Number of idle resources.
    pub fn idle_len(&self) -> usize {
        self.idle.len()
    }

    /// Number of borrowed resources.
    pub fn borrowed_len(&self) -> usize {
        self.borrowed_len
    }

    /// Number of live resources, idle and borrowed.
    pub fn len(&self) -> usize {
        self.idle.len() + self.borrowed_len
    }

    /// Returns `true` if the pool holds no live resources.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lifetime counters.
    pub const fn stats(&self) -> PoolStats {
        self.stats
    }

    /// Shared access to the hooks.
    pub const fn hooks(&self) -> &H {
        &self.hooks
    }

    /// Mutable access to the hooks.
    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    fn insert_slot(&mut self, resource: R) -> usize {
        if let Some(idx) = self.free_list.pop() {
            let slot = &mut self.slots[idx];
            slot.state = SlotState::Idle;
            slot.resource = Some(resource);
            idx
        } else {
            self.slots.push(Slot {
                generation: 0,
                state: SlotState::Idle,
                borrowed_at: 0,
                resource: Some(resource),
            });
            self.slots.len() - 1
        }
    }

    /// Drops released entries from `borrowed`, keeping checkout order.
    fn compact_borrowed(&mut self) {
        self.borrowed.retain(Option::is_some);
        for (pos, idx) in self.borrowed.iter().flatten().enumerate() {
            self.slots[*idx].borrowed_at = pos;
        }
    }

    /// Moves a slot that was just taken out of `borrowed` into the idle set.
    fn park(&mut self, idx: usize) {
        let slot = &mut self.slots[idx];
        slot.state = SlotState::Idle;
        if let Some(resource) = slot.resource.as_mut() {
            self.hooks.on_release(resource);
        }
        self.idle.push_back(idx);
    }

    fn live_slot(&self, key: PoolKey) -> Option<&Slot<R>> {
        self.slots
            .get(key.idx())
            .filter(|slot| slot.generation == key.1 && slot.state != SlotState::Vacant)
    }

    fn live_slot_mut(&mut self, key: PoolKey) -> Option<&mut Slot<R>> {
        self.slots
            .get_mut(key.idx())
            .filter(|slot| slot.generation == key.1 && slot.state != SlotState::Vacant)
    }
}

impl<R, H: PoolHooks<R, Error = Infallible>> ResourcePool<R, H> {
    /// Checks out a resource from a pool whose hooks cannot fail.
    ///
    /// See [`try_borrow`](Self::try_borrow) for the hook order.
    pub fn borrow(&mut self) -> PoolKey {
        match self.try_borrow() {
            Ok(key) => key,
            Err(never) => match never {},
        }
    }
}
