// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The [`SparseGrid`] store and its scroll state.

use alloc::boxed::Box;
use core::fmt::{self, Debug};

use hashbrown::HashMap;
use kurbo::{Size, Vec2};

use crate::diff::{CellLookup, GridShape};
use crate::position::{coordinate_pixel_position, coordinate_position, split_position};
use crate::types::{CellMetrics, Coordinate, GridSize, GridWindow, Side};

/// How a cell is materialized the first time it is looked up.
pub enum InitialValue<V> {
    /// Every new cell starts as a clone of this value.
    Constant(V),
    /// Every new cell is produced by this factory.
    ///
    /// The factory sees the coordinate being materialized and the window at
    /// that moment. It gets the window rather than the grid because the grid
    /// is mutably borrowed while the new cell is inserted.
    Factory(Box<dyn FnMut(Coordinate, &GridWindow) -> V>),
}

/// [`InitialValue`] with the clone of a constant captured up front, so
/// materializing needs no `Clone` bound.
enum Materializer<V> {
    Constant { value: V, clone: fn(&V) -> V },
    Factory(Box<dyn FnMut(Coordinate, &GridWindow) -> V>),
}

impl<V> Materializer<V> {
    fn resolve(&mut self, coordinate: Coordinate, window: &GridWindow) -> V {
        match self {
            Self::Constant { value, clone } => clone(value),
            Self::Factory(factory) => factory(coordinate, window),
        }
    }
}

impl<V: Clone> From<InitialValue<V>> for Materializer<V> {
    fn from(initial_value: InitialValue<V>) -> Self {
        match initial_value {
            InitialValue::Constant(value) => Self::Constant {
                value,
                clone: V::clone,
            },
            InitialValue::Factory(factory) => Self::Factory(factory),
        }
    }
}

impl<V: Debug> Debug for InitialValue<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Self::Factory(_) => f.debug_tuple("Factory").finish_non_exhaustive(),
        }
    }
}

/// An unbounded sparse 2D grid with a logical window and scroll state.
///
/// Cells exist only once they have been set or materialized through
/// [`get_cell`](Self::get_cell). The window, cell metrics, and scroll
/// position describe what is in view; none of them affect which cells exist.
pub struct SparseGrid<V> {
    cells: HashMap<Coordinate, V>,
    initial_value: Materializer<V>,
    window: GridWindow,
    metrics: CellMetrics,
    position: Coordinate,
    position_fraction: Vec2,
}

impl<V> Debug for SparseGrid<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SparseGrid")
            .field("cells", &self.cells.len())
            .field("window", &self.window)
            .field("metrics", &self.metrics)
            .field("position", &self.position)
            .field("position_fraction", &self.position_fraction)
            .finish_non_exhaustive()
    }
}

impl<V: Default + Clone> Default for SparseGrid<V> {
    fn default() -> Self {
        Self::new(InitialValue::Constant(V::default()))
    }
}

impl<V: Clone> SparseGrid<V> {
    /// Creates an empty grid with an empty window at the origin.
    ///
    /// Grids of values that are not `Clone` are built with
    /// [`with_factory`](Self::with_factory).
    pub fn new(initial_value: InitialValue<V>) -> Self {
        Self::with_materializer(initial_value.into())
    }

    /// Creates an empty grid whose cells start as clones of `value`.
    pub fn with_constant(value: V) -> Self {
        Self::new(InitialValue::Constant(value))
    }
}

impl<V> SparseGrid<V> {
    fn with_materializer(initial_value: Materializer<V>) -> Self {
        Self {
            cells: HashMap::new(),
            initial_value,
            window: GridWindow::default(),
            metrics: CellMetrics::default(),
            position: Coordinate::ORIGIN,
            position_fraction: Vec2::ZERO,
        }
    }

    /// Creates an empty grid whose cells are produced by `factory`.
    pub fn with_factory(factory: impl FnMut(Coordinate, &GridWindow) -> V + 'static) -> Self {
        Self::with_materializer(Materializer::Factory(Box::new(factory)))
    }

    /// Returns this grid with its window replaced.
    #[must_use]
    pub fn with_window(mut self, window: GridWindow) -> Self {
        self.window = window;
        self
    }

    /// Returns this grid with its cell metrics replaced.
    #[must_use]
    pub fn with_cell_metrics(mut self, metrics: CellMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    // --- cells ---

    /// Returns the cell at `(x, y)` without materializing it.
    pub fn try_get_cell(&self, x: i32, y: i32) -> Option<&V> {
        self.cells.get(&Coordinate::new(x, y))
    }

    /// Returns `true` if the cell at `(x, y)` exists.
    pub fn has_cell(&self, x: i32, y: i32) -> bool {
        self.cells.contains_key(&Coordinate::new(x, y))
    }

    /// Stores `value` at `(x, y)`, returning the previous value.
    pub fn set_cell(&mut self, x: i32, y: i32, value: V) -> Option<V> {
        self.cells.insert(Coordinate::new(x, y), value)
    }

    /// Removes the cell at `(x, y)`. The next [`get_cell`](Self::get_cell)
    /// materializes it afresh.
    pub fn remove_cell(&mut self, x: i32, y: i32) -> Option<V> {
        self.cells.remove(&Coordinate::new(x, y))
    }

    /// Removes every cell. Window and scroll state are kept.
    pub fn clear_cells(&mut self) {
        self.cells.clear();
    }

    /// Number of cells that currently exist.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Iterates existing cells in unspecified order.
    pub fn cells(&self) -> impl Iterator<Item = (Coordinate, &V)> + '_ {
        self.cells.iter().map(|(c, v)| (*c, v))
    }

    // --- window ---

    /// The logical window.
    pub const fn window(&self) -> GridWindow {
        self.window
    }

    /// The window size.
    pub const fn size(&self) -> GridSize {
        self.window.size
    }

    /// The window offset.
    pub const fn offset(&self) -> Coordinate {
        self.window.offset
    }

    /// Replaces the window.
    pub fn set_window(&mut self, window: GridWindow) -> &mut Self {
        self.window = window;
        self
    }

    /// Sets the window size, keeping the offset.
    pub fn set_size(&mut self, width: u32, height: u32) -> &mut Self {
        self.window.size = GridSize::new(width, height);
        self
    }

    /// Sets the window offset, keeping the size.
    pub fn set_offset(&mut self, x: i32, y: i32) -> &mut Self {
        self.window.offset = Coordinate::new(x, y);
        self
    }

    /// Sets the window from its edges; `right` and `bottom` are exclusive.
    ///
    /// Inverted edges yield an empty window at `(left, top)`.
    pub fn set_rect(&mut self, left: i32, top: i32, right: i32, bottom: i32) -> &mut Self {
        self.window = GridWindow::new(
            Coordinate::new(left, top),
            GridSize::new(span_len(left, right), span_len(top, bottom)),
        );
        self
    }

    /// Grows the window by `amount` cells on `side`; negative values shrink it.
    ///
    /// Growing [`Side::Top`] or [`Side::Left`] moves the offset so the
    /// opposite edge stays put. Shrinking saturates at an empty window.
    pub fn resize(&mut self, side: Side, amount: i32) -> &mut Self {
        match side {
            Side::Top => {
                let applied = grow(&mut self.window.size.height, amount);
                self.window.offset.y = self.window.offset.y.saturating_sub(applied);
            }
            Side::Bottom => {
                grow(&mut self.window.size.height, amount);
            }
            Side::Left => {
                let applied = grow(&mut self.window.size.width, amount);
                self.window.offset.x = self.window.offset.x.saturating_sub(applied);
            }
            Side::Right => {
                grow(&mut self.window.size.width, amount);
            }
        }
        self
    }

    // --- metrics ---

    /// Cell metrics.
    pub const fn cell_metrics(&self) -> CellMetrics {
        self.metrics
    }

    /// Size of a single cell in pixels.
    pub const fn cell_size(&self) -> Size {
        self.metrics.size
    }

    /// Pixel offset applied to every cell.
    pub const fn cell_offset(&self) -> Vec2 {
        self.metrics.offset
    }

    /// Sets the size of a single cell in pixels.
    pub fn set_cell_size(&mut self, size: Size) -> &mut Self {
        debug_assert!(
            size.width >= 0.0 && size.height >= 0.0,
            "cell size must not be negative"
        );
        self.metrics.size = size;
        self
    }

    /// Sets the pixel offset applied to every cell.
    pub fn set_cell_offset(&mut self, offset: Vec2) -> &mut Self {
        self.metrics.offset = offset;
        self
    }

    /// Replaces all cell metrics at once.
    pub fn set_cell_metrics(&mut self, metrics: CellMetrics) -> &mut Self {
        self.metrics = metrics;
        self
    }

    // --- scroll position ---

    /// Integer scroll position.
    pub const fn position(&self) -> Coordinate {
        self.position
    }

    /// Fractional scroll position; both components lie in `[0, 1)`.
    pub const fn position_fraction(&self) -> Vec2 {
        self.position_fraction
    }

    /// Sets the scroll position.
    ///
    /// Fractions outside `[0, 1)` are carried into `position`.
    pub fn set_position(&mut self, position: Coordinate, fraction: Vec2) -> &mut Self {
        let (x, fx) = split_position(f64::from(position.x) + fraction.x);
        let (y, fy) = split_position(f64::from(position.y) + fraction.y);
        self.position = Coordinate::new(x, y);
        self.position_fraction = Vec2::new(fx, fy);
        self
    }

    /// Moves the scroll position by a pixel delta.
    ///
    /// Along each axis the real position becomes
    /// `position + fraction - delta / cell_extent`. Axes with a zero cell
    /// extent are left unchanged.
    pub fn move_pixel_position(&mut self, delta: Vec2) -> &mut Self {
        let size = self.metrics.size;
        if size.width > 0.0 {
            let real =
                coordinate_position(self.position.x, self.position_fraction.x, size.width, delta.x);
            (self.position.x, self.position_fraction.x) = split_position(real);
        }
        if size.height > 0.0 {
            let real = coordinate_position(
                self.position.y,
                self.position_fraction.y,
                size.height,
                delta.y,
            );
            (self.position.y, self.position_fraction.y) = split_position(real);
        }
        self
    }

    /// Pixel offset of the grid origin for the current scroll position.
    pub fn pixel_position(&self) -> Vec2 {
        let size = self.metrics.size;
        Vec2::new(
            coordinate_pixel_position(self.position.x, self.position_fraction.x, size.width, 0.0),
            coordinate_pixel_position(self.position.y, self.position_fraction.y, size.height, 0.0),
        )
    }

    /// Returns the cell at `(x, y)`, materializing it if needed.
    pub fn get_cell(&mut self, x: i32, y: i32) -> &V {
        self.materialize(Coordinate::new(x, y))
    }

    /// Returns the cell at `(x, y)` mutably, materializing it if needed.
    pub fn get_cell_mut(&mut self, x: i32, y: i32) -> &mut V {
        self.materialize(Coordinate::new(x, y))
    }

    fn materialize(&mut self, coordinate: Coordinate) -> &mut V {
        let Self {
            cells,
            initial_value,
            window,
            ..
        } = self;
        cells
            .entry(coordinate)
            .or_insert_with(|| initial_value.resolve(coordinate, window))
    }
}

impl<V> GridShape for SparseGrid<V> {
    fn window(&self) -> GridWindow {
        self.window
    }

    fn cell_metrics(&self) -> CellMetrics {
        self.metrics
    }
}

impl<V> CellLookup for SparseGrid<V> {
    type Cell = V;

    fn lookup(&self, coordinate: Coordinate) -> Option<&V> {
        self.cells.get(&coordinate)
    }
}

fn span_len(start: i32, end: i32) -> u32 {
    u32::try_from(i64::from(end) - i64::from(start)).unwrap_or(0)
}

/// Adds `amount` to `len`, saturating at `0..=u32::MAX`. Returns the change
/// actually applied.
fn grow(len: &mut u32, amount: i32) -> i32 {
    let target = (i64::from(*len) + i64::from(amount)).clamp(0, i64::from(u32::MAX));
    let applied = target - i64::from(*len);
    *len = u32::try_from(target).unwrap_or(u32::MAX);
    i32::try_from(applied).unwrap_or(amount)
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::rc::Rc;
    use alloc::string::String;
    use alloc::vec::Vec;
    use alloc::{format, vec};
    use core::cell::Cell;

    use kurbo::{Size, Vec2};

    use super::{InitialValue, SparseGrid};
    use crate::types::{Coordinate, GridSize, GridWindow, Side};

    #[test]
    fn get_cell_materializes_once() {
        let calls = Rc::new(Cell::new(0_u32));
        let seen = calls.clone();
        let mut grid = SparseGrid::with_factory(move |c: Coordinate, _: &GridWindow| {
            seen.set(seen.get() + 1);
            c.x * 10 + c.y
        });
        assert_eq!(*grid.get_cell(2, 3), 23);
        assert_eq!(*grid.get_cell(2, 3), 23);
        assert_eq!(calls.get(), 1);
        assert!(grid.has_cell(2, 3));
        assert_eq!(grid.cell_count(), 1);
    }

    #[test]
    fn factory_grids_hold_values_that_are_not_clone() {
        #[derive(Debug, PartialEq)]
        struct Handle(i32);

        let mut grid = SparseGrid::with_factory(|c: Coordinate, _: &GridWindow| Handle(c.x - c.y));
        assert_eq!(grid.get_cell(5, 2), &Handle(3));
        grid.get_cell_mut(5, 2).0 += 1;
        assert_eq!(grid.try_get_cell(5, 2), Some(&Handle(4)));
        assert_eq!(grid.cell_count(), 1);
    }

    #[test]
    fn constant_initial_value_is_cloned() {
        let mut grid = SparseGrid::with_constant(vec![0_u8; 2]);
        grid.get_cell_mut(0, 0).push(7);
        assert_eq!(grid.get_cell(0, 0), &[0, 0, 7]);
        assert_eq!(grid.get_cell(5, -5), &[0, 0]);
    }

    #[test]
    fn optional_lookups_never_materialize() {
        let mut grid: SparseGrid<u32> = SparseGrid::default();
        assert_eq!(grid.try_get_cell(-100, 100), None);
        assert!(!grid.has_cell(-100, 100));
        assert_eq!(grid.cell_count(), 0);

        assert_eq!(grid.set_cell(-100, 100, 4), None);
        assert_eq!(grid.try_get_cell(-100, 100), Some(&4));
        assert_eq!(grid.set_cell(-100, 100, 5), Some(4));
        assert_eq!(grid.remove_cell(-100, 100), Some(5));
        assert!(!grid.has_cell(-100, 100));
    }

    #[test]
    fn factory_sees_the_current_window() {
        let mut grid = SparseGrid::with_factory(|c: Coordinate, w: &GridWindow| {
            format!("{:?}@{}", c, w.size.width)
        });
        grid.set_size(4, 1);
        let label: String = grid.get_cell(1, 0).clone();
        assert!(label.ends_with("@4"), "unexpected label {label}");
    }

    #[test]
    fn cells_are_unbounded_in_every_direction() {
        let mut grid = SparseGrid::with_constant(0_i8);
        for (x, y) in [(i32::MIN, 0), (i32::MAX, 0), (0, i32::MIN), (0, i32::MAX)] {
            *grid.get_cell_mut(x, y) = 1;
        }
        let mut coords: Vec<Coordinate> = grid.cells().map(|(c, _)| c).collect();
        coords.sort();
        assert_eq!(coords.len(), 4);
        assert_eq!(coords[0], Coordinate::new(i32::MIN, 0));
    }

    #[test]
    fn setters_chain() {
        let mut grid = SparseGrid::with_constant(());
        grid.set_size(3, 2)
            .set_offset(-1, 4)
            .set_cell_size(Size::new(200.0, 50.0))
            .set_cell_offset(Vec2::new(5.0, 0.0));
        assert_eq!(
            grid.window(),
            GridWindow::new(Coordinate::new(-1, 4), GridSize::new(3, 2))
        );
        assert_eq!(grid.cell_size(), Size::new(200.0, 50.0));
        assert_eq!(grid.cell_offset(), Vec2::new(5.0, 0.0));
    }

    #[test]
    fn set_rect_uses_exclusive_edges() {
        let mut grid = SparseGrid::with_constant(());
        grid.set_rect(-2, 1, 3, 4);
        assert_eq!(grid.offset(), Coordinate::new(-2, 1));
        assert_eq!(grid.size(), GridSize::new(5, 3));

        grid.set_rect(3, 3, 1, 1);
        assert!(grid.window().is_empty());
    }

    #[test]
    fn resize_moves_offset_only_for_top_and_left() {
        let mut grid = SparseGrid::with_constant(());
        grid.set_offset(10, 20).set_size(4, 4);

        grid.resize(Side::Top, 2);
        assert_eq!(grid.offset(), Coordinate::new(10, 18));
        assert_eq!(grid.size(), GridSize::new(4, 6));

        grid.resize(Side::Left, 3);
        assert_eq!(grid.offset(), Coordinate::new(7, 18));
        assert_eq!(grid.size(), GridSize::new(7, 6));

        grid.resize(Side::Right, -2).resize(Side::Bottom, 1);
        assert_eq!(grid.offset(), Coordinate::new(7, 18));
        assert_eq!(grid.size(), GridSize::new(5, 7));

        // Shrinking from the top keeps the bottom edge.
        grid.resize(Side::Top, -3);
        assert_eq!(grid.offset(), Coordinate::new(7, 21));
        assert_eq!(grid.size(), GridSize::new(5, 4));
    }

    #[test]
    fn resize_saturates_at_empty() {
        let mut grid = SparseGrid::with_constant(());
        grid.set_offset(0, 0).set_size(2, 2);
        grid.resize(Side::Left, -5);
        assert_eq!(grid.size(), GridSize::new(0, 2));
        assert_eq!(grid.offset(), Coordinate::new(2, 0));
    }

    #[test]
    fn pixel_moves_of_minus_two_cells_advance_two_positions() {
        let mut grid = SparseGrid::with_constant(());
        grid.set_cell_size(Size::new(100.0, 40.0));
        for _ in 0..4 {
            grid.move_pixel_position(Vec2::new(-50.0, 0.0));
        }
        assert_eq!(grid.position(), Coordinate::new(2, 0));
        assert_eq!(grid.position_fraction(), Vec2::ZERO);

        grid.move_pixel_position(Vec2::new(25.0, 10.0));
        assert_eq!(grid.position(), Coordinate::new(1, -1));
        assert_eq!(grid.position_fraction(), Vec2::new(0.75, 0.75));
    }

    #[test]
    fn fraction_stays_in_unit_interval() {
        let mut grid = SparseGrid::with_constant(());
        grid.set_cell_size(Size::new(30.0, 30.0));
        for step in [-7.0, 13.0, -0.1, 29.9, -91.0, 0.3, 1e-12, -1e-12] {
            grid.move_pixel_position(Vec2::new(step, -step));
            let f = grid.position_fraction();
            assert!((0.0..1.0).contains(&f.x), "x fraction {}", f.x);
            assert!((0.0..1.0).contains(&f.y), "y fraction {}", f.y);
        }
    }

    #[test]
    fn zero_cell_extent_freezes_that_axis() {
        let mut grid = SparseGrid::with_constant(());
        grid.set_cell_size(Size::new(0.0, 10.0));
        grid.move_pixel_position(Vec2::new(-100.0, -25.0));
        assert_eq!(grid.position(), Coordinate::new(0, 2));
        assert_eq!(grid.position_fraction(), Vec2::new(0.0, 0.5));
    }

    #[test]
    fn set_position_normalizes_fraction() {
        let mut grid = SparseGrid::with_constant(());
        grid.set_position(Coordinate::new(3, 3), Vec2::new(1.5, -0.25));
        assert_eq!(grid.position(), Coordinate::new(4, 2));
        assert_eq!(grid.position_fraction(), Vec2::new(0.5, 0.75));
    }

    #[test]
    fn pixel_position_tracks_scroll() {
        let mut grid = SparseGrid::with_constant(());
        grid.set_cell_size(Size::new(200.0, 50.0));
        grid.move_pixel_position(Vec2::new(-300.0, -25.0));
        assert_eq!(grid.pixel_position(), Vec2::new(-300.0, -25.0));
    }

    #[test]
    fn initial_value_debug_hides_factory() {
        let constant: InitialValue<u8> = InitialValue::Constant(3);
        assert_eq!(format!("{constant:?}"), "Constant(3)");
        let factory: InitialValue<u8> = InitialValue::Factory(Box::new(|_: Coordinate, _: &GridWindow| 0));
        assert_eq!(format!("{factory:?}"), "Factory(..)");
    }
}
