// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The boundary between a [`GridView`](crate::GridView) and whatever draws it.

use core::fmt;
use core::marker::PhantomData;

use kurbo::{Point, Size};
use understory_pool::PoolHooks;
use understory_sparse_grid::Coordinate;
use understory_sparse_grid::diff::Change;

/// Everything needed to draw one visible cell.
#[derive(Debug)]
pub struct CellPlacement<'a, V> {
    /// Logical cell coordinate.
    pub coordinate: Coordinate,
    /// Top-left corner of the cell in viewport pixels.
    pub origin: Point,
    /// Cell size in pixels.
    pub size: Size,
    /// Cell content.
    pub value: &'a V,
    /// [`Change::Unchanged`] if the cell was also visible last frame,
    /// [`Change::Added`] otherwise.
    pub change: Change,
}

/// Creates, positions, and disposes of the visual resources of a grid view.
///
/// Resources are pooled: a resource is created once, then repeatedly shown,
/// placed at some cell, and hidden again as the view scrolls. A resource is
/// not tied to a coordinate across frames, so [`place`](Self::place) always
/// receives the current content.
pub trait CellSink<V> {
    /// The visual resource type, for example a widget or a display-list node.
    type Resource;
    /// Failure reported by [`create`](Self::create) or [`place`](Self::place).
    type Error;

    /// Produces a new resource.
    fn create(&mut self) -> Result<Self::Resource, Self::Error>;

    /// Moves, sizes, and fills `resource` for one visible cell.
    fn place(
        &mut self,
        resource: &mut Self::Resource,
        placement: &CellPlacement<'_, V>,
    ) -> Result<(), Self::Error>;

    /// Makes a resource visible as it is checked out.
    fn show(&mut self, _resource: &mut Self::Resource) {}

    /// Hides a resource as it returns to the pool.
    fn hide(&mut self, _resource: &mut Self::Resource) {}

    /// Disposes of a resource for good.
    fn destroy(&mut self, _resource: Self::Resource) {}

    /// Labels row `y`; called for rows that entered, left, or need relabeling.
    fn row_header(&mut self, _y: i32, _change: Change) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Labels column `x`; called for columns that entered, left, or need relabeling.
    fn column_header(&mut self, _x: i32, _change: Change) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Drives a [`CellSink`]'s resource lifecycle from pool hooks.
pub(crate) struct SinkHooks<S, V> {
    pub(crate) sink: S,
    _value: PhantomData<fn(&V)>,
}

impl<S, V> SinkHooks<S, V> {
    pub(crate) const fn new(sink: S) -> Self {
        Self {
            sink,
            _value: PhantomData,
        }
    }
}

impl<S, V> fmt::Debug for SinkHooks<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinkHooks").finish_non_exhaustive()
    }
}

impl<S: CellSink<V>, V> PoolHooks<S::Resource> for SinkHooks<S, V> {
    type Error = S::Error;

    fn create(&mut self) -> Result<S::Resource, S::Error> {
        self.sink.create()
    }

    fn on_borrow(&mut self, resource: &mut S::Resource) {
        self.sink.show(resource);
    }

    fn on_release(&mut self, resource: &mut S::Resource) {
        self.sink.hide(resource);
    }

    fn on_remove(&mut self, resource: S::Resource) {
        self.sink.destroy(resource);
    }
}
