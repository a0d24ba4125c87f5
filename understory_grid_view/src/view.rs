// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! [`GridView`]: frame-driven rendering of a [`SparseGrid`] through pooled resources.

use core::fmt;

use hashbrown::HashMap;
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Point, Size, Vec2};
use understory_hot_array::HotArray;
use understory_pool::{PoolKey, PoolStats, ResourcePool};
use understory_scroll::{
    FlingConfig, FrameDecision, FrameGate, FrameHandle, FrameScheduler, MomentumScroller,
};
use understory_sparse_grid::diff::{AxisSpan, Change, DiffIterator, GridShape};
use understory_sparse_grid::{CellMetrics, Coordinate, GridSize, GridWindow, InitialValue, SparseGrid};

use crate::sink::{CellPlacement, CellSink, SinkHooks};

/// Counters for one completed render pass.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Cells placed.
    pub cells: usize,
    /// Resources created during the pass.
    pub created: usize,
    /// Row headers visited.
    pub rows_visited: usize,
    /// Column headers visited.
    pub columns_visited: usize,
}

/// What [`GridView::on_frame`] did with a frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// A render pass ran.
    Rendered(FrameStats),
    /// A render is queued but the frame came too early; another frame was requested.
    Postponed,
    /// The fling advanced; a render was queued.
    Scrolled,
    /// The frame did not belong to this view.
    Ignored,
}

/// The window and metrics of the last completed render pass.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Rendered {
    window: GridWindow,
    metrics: CellMetrics,
}

impl GridShape for Rendered {
    fn window(&self) -> GridWindow {
        self.window
    }

    fn cell_metrics(&self) -> CellMetrics {
        self.metrics
    }
}

/// An infinitely scrollable grid view.
///
/// Owns the content grid, a pool of visual resources, the scroll state, and
/// render pacing. Every mutator queues at most one render through the
/// [`FrameScheduler`]; the host delivers frames back through
/// [`on_frame`](Self::on_frame).
///
/// Each render pass recycles every resource, then checks one out per visible
/// cell, top to bottom and left to right. Row and column headers are diffed
/// against the previous pass; unchanged ones are skipped unless the cell
/// metrics changed.
pub struct GridView<V, S: CellSink<V>, F> {
    content: SparseGrid<V>,
    viewport: Size,
    pool: ResourcePool<S::Resource, SinkHooks<S, V>>,
    diff: DiffIterator,
    rendered: Option<Rendered>,
    rows: HotArray<i32>,
    columns: HotArray<i32>,
    visible: HashMap<Coordinate, PoolKey>,
    scroller: MomentumScroller,
    gate: FrameGate,
    scheduler: F,
    render_frame: Option<FrameHandle>,
    last_stats: Option<FrameStats>,
}

impl<V, S: CellSink<V>, F> fmt::Debug for GridView<V, S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridView")
            .field("content", &self.content)
            .field("viewport", &self.viewport)
            .field("pool", &self.pool)
            .field("rendered", &self.rendered)
            .field("visible", &self.visible.len())
            .field("scroller", &self.scroller)
            .field("gate", &self.gate)
            .field("render_frame", &self.render_frame)
            .finish_non_exhaustive()
    }
}

impl<V, S: CellSink<V>, F: FrameScheduler> GridView<V, S, F> {
    /// Cell size of a view created with [`new`](Self::new).
    pub const DEFAULT_CELL_SIZE: Size = Size::new(200.0, 50.0);

    /// Creates a view over a fresh grid with [`DEFAULT_CELL_SIZE`](Self::DEFAULT_CELL_SIZE)
    /// cells and queues the first render.
    pub fn new(initial_value: InitialValue<V>, sink: S, scheduler: F) -> Self
    where
        V: Clone,
    {
        let mut content = SparseGrid::new(initial_value);
        content.set_cell_size(Self::DEFAULT_CELL_SIZE);
        Self::from_grid(content, sink, scheduler)
    }

    /// Creates a view over an existing grid and queues the first render.
    pub fn from_grid(content: SparseGrid<V>, sink: S, scheduler: F) -> Self {
        let mut view = Self {
            content,
            viewport: Size::ZERO,
            pool: ResourcePool::new(SinkHooks::new(sink)),
            diff: DiffIterator::new()
                .columns_of_rows()
                .top_to_bottom()
                .left_to_right(),
            rendered: None,
            rows: HotArray::new(),
            columns: HotArray::new(),
            visible: HashMap::new(),
            scroller: MomentumScroller::new(),
            gate: FrameGate::default(),
            scheduler,
            render_frame: None,
            last_stats: None,
        };
        view.request_render();
        view
    }

    /// Returns this view with a viewport size in pixels.
    #[must_use]
    pub fn with_viewport(mut self, viewport: Size) -> Self {
        self.viewport = viewport;
        self
    }

    /// Returns this view with a render rate cap.
    #[must_use]
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.gate.set_fps(fps);
        self
    }

    /// Returns this view with custom fling tuning.
    #[must_use]
    pub fn with_fling(mut self, config: FlingConfig) -> Self {
        self.scroller = MomentumScroller::with_config(config);
        self
    }

    // --- content ---

    /// The content grid.
    pub fn grid(&self) -> &SparseGrid<V> {
        &self.content
    }

    /// Returns the cell at `(x, y)`, materializing it if needed.
    pub fn get_cell(&mut self, x: i32, y: i32) -> &V {
        self.content.get_cell(x, y)
    }

    /// Returns the cell at `(x, y)` if it exists.
    pub fn try_get_cell(&self, x: i32, y: i32) -> Option<&V> {
        self.content.try_get_cell(x, y)
    }

    /// Returns `true` if the cell at `(x, y)` exists.
    pub fn has_cell(&self, x: i32, y: i32) -> bool {
        self.content.has_cell(x, y)
    }

    /// Stores `value` at `(x, y)` and queues a render.
    pub fn set_cell(&mut self, x: i32, y: i32, value: V) -> Option<V> {
        let previous = self.content.set_cell(x, y, value);
        self.request_render();
        previous
    }

    // --- geometry ---

    /// Viewport size in pixels.
    pub const fn viewport(&self) -> Size {
        self.viewport
    }

    /// Sets the viewport size and queues a render.
    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
        self.request_render();
    }

    /// Size of a single cell in pixels.
    pub const fn cell_size(&self) -> Size {
        self.content.cell_size()
    }

    /// Sets the cell size and queues a render.
    pub fn set_cell_size(&mut self, size: Size) {
        self.content.set_cell_size(size);
        self.request_render();
    }

    /// Sets the pixel offset of every cell and queues a render.
    pub fn set_cell_offset(&mut self, offset: Vec2) {
        self.content.set_cell_offset(offset);
        self.request_render();
    }

    /// Integer scroll position.
    pub const fn position(&self) -> Coordinate {
        self.content.position()
    }

    /// Fractional scroll position.
    pub const fn position_fraction(&self) -> Vec2 {
        self.content.position_fraction()
    }

    /// Jumps to a scroll position and queues a render.
    pub fn set_position(&mut self, position: Coordinate, fraction: Vec2) {
        self.content.set_position(position, fraction);
        self.request_render();
    }

    /// Scrolls by a pixel delta and queues a render.
    pub fn move_pixel_position(&mut self, delta: Vec2) {
        self.content.move_pixel_position(delta);
        self.request_render();
    }

    // --- input ---

    /// Starts a drag, cancelling any fling.
    pub fn pointer_down(&mut self, pointer: Point) {
        self.scroller.drag_start(pointer, &mut self.scheduler);
    }

    /// Scrolls by the pointer movement while dragging.
    pub fn pointer_move(&mut self, pointer: Point) {
        if self.scroller.drag_move(pointer, &mut self.content) {
            self.request_render();
        }
    }

    /// Ends a drag, possibly starting a fling.
    pub fn pointer_up(&mut self) {
        self.scroller.drag_end(&mut self.scheduler);
    }

    /// Cancels a running fling.
    pub fn stop_scrolling(&mut self) {
        self.scroller.stop(&mut self.scheduler);
    }

    /// The drag and fling state machine.
    pub fn scroller(&self) -> &MomentumScroller {
        &self.scroller
    }

    // --- frames ---

    /// Returns `true` if a render is waiting for a frame.
    pub const fn is_render_queued(&self) -> bool {
        self.gate.is_queued()
    }

    /// The frame scheduler.
    pub fn scheduler(&self) -> &F {
        &self.scheduler
    }

    /// The frame scheduler, mutably.
    pub fn scheduler_mut(&mut self) -> &mut F {
        &mut self.scheduler
    }

    /// Handles a frame delivered by the scheduler at `now_ms`.
    ///
    /// Advances the fling if the frame is the one it waits for, then renders if
    /// the frame is the one a queued render waits for and the frame interval
    /// allows it. If the render pass fails, the render is queued again and the
    /// sink's error is returned.
    pub fn on_frame(&mut self, handle: FrameHandle, now_ms: u64) -> Result<FrameOutcome, S::Error> {
        let mut outcome = FrameOutcome::Ignored;
        if self
            .scroller
            .on_frame(handle, &mut self.content, &mut self.scheduler)
        {
            self.request_render();
            outcome = FrameOutcome::Scrolled;
        }
        if self.render_frame != Some(handle) {
            return Ok(outcome);
        }
        self.render_frame = None;
        match self.gate.on_frame(now_ms) {
            FrameDecision::Render => match self.render() {
                Ok(stats) => Ok(FrameOutcome::Rendered(stats)),
                Err(err) => {
                    log::debug!("render pass failed, retrying next frame");
                    self.request_render();
                    Err(err)
                }
            },
            FrameDecision::Postpone => {
                self.render_frame = Some(self.scheduler.request_frame());
                Ok(FrameOutcome::Postponed)
            }
            FrameDecision::Idle => Ok(outcome),
        }
    }

    fn request_render(&mut self) {
        if self.gate.queue() {
            self.render_frame = Some(self.scheduler.request_frame());
        }
    }

    /// Runs one render pass immediately, bypassing frame pacing.
    pub fn render(&mut self) -> Result<FrameStats, S::Error> {
        let metrics = self.content.cell_metrics();
        let (target, start) = visible_window(
            self.content.position(),
            self.content.position_fraction(),
            metrics,
            self.viewport,
        );
        self.content.set_window(target);
        let previous = self.rendered;
        let created_before = self.pool.stats().created;

        self.pool.release_all();
        self.visible.clear();
        let mut cells = 0;
        for row in 0..target.size.height {
            let y = target.offset.y.saturating_add_unsigned(row);
            for column in 0..target.size.width {
                let x = target.offset.x.saturating_add_unsigned(column);
                let coordinate = Coordinate::new(x, y);
                let change = match previous {
                    Some(p) if p.window.contains(coordinate) => Change::Unchanged,
                    _ => Change::Added,
                };
                let origin = Point::new(
                    start.x + f64::from(column) * metrics.size.width,
                    start.y + f64::from(row) * metrics.size.height,
                );
                let key = self.pool.try_borrow()?;
                let placement = CellPlacement {
                    coordinate,
                    origin,
                    size: metrics.size,
                    value: self.content.get_cell(x, y),
                    change,
                };
                if let Some((resource, hooks)) = self.pool.resource_and_hooks_mut(key) {
                    hooks.sink.place(resource, &placement)?;
                }
                self.visible.insert(coordinate, key);
                cells += 1;
            }
        }

        // Cell metric changes move every header, so nothing is skipped then.
        let shape = Rendered {
            window: target,
            metrics,
        };
        let source = previous.unwrap_or(Rendered {
            window: GridWindow::default(),
            metrics,
        });
        let diff = self
            .diff
            .skip_unchanged(previous.is_some_and(|p| p.metrics == metrics));
        let sink = &mut self.pool.hooks_mut().sink;
        let mut rows_visited = 0;
        for (y, change) in diff.rows(&source, &shape).skip_gap(true) {
            sink.row_header(y, change)?;
            rows_visited += 1;
        }
        let mut columns_visited = 0;
        for (x, change) in diff.columns(&source, &shape).skip_gap(true) {
            sink.column_header(x, change)?;
            columns_visited += 1;
        }
        track(&mut self.rows, target.rows());
        track(&mut self.columns, target.columns());

        self.rendered = Some(shape);
        let stats = FrameStats {
            cells,
            created: self.pool.stats().created - created_before,
            rows_visited,
            columns_visited,
        };
        log::debug!(
            "rendered {} cells ({} created), {} rows and {} columns relabeled",
            stats.cells,
            stats.created,
            stats.rows_visited,
            stats.columns_visited
        );
        self.last_stats = Some(stats);
        Ok(stats)
    }

    /// Disposes of every resource and forgets the last render. Queues a render.
    pub fn clear(&mut self) {
        self.pool.clear();
        self.visible.clear();
        self.rows.clear();
        self.columns.clear();
        self.rendered = None;
        self.request_render();
    }

    // --- rendered state ---

    /// Window covered by the last completed render pass.
    pub fn rendered_window(&self) -> Option<GridWindow> {
        self.rendered.map(|r| r.window)
    }

    /// Counters of the last completed render pass.
    pub const fn last_stats(&self) -> Option<FrameStats> {
        self.last_stats
    }

    /// Rows of the last render pass, top to bottom.
    pub fn visible_rows(&self) -> impl Iterator<Item = i32> + '_ {
        self.rows.iter().copied()
    }

    /// Columns of the last render pass, left to right.
    pub fn visible_columns(&self) -> impl Iterator<Item = i32> + '_ {
        self.columns.iter().copied()
    }

    /// The resource showing `coordinate`, if it was placed in the last pass.
    pub fn resource(&self, coordinate: Coordinate) -> Option<&S::Resource> {
        self.visible
            .get(&coordinate)
            .and_then(|key| self.pool.get(*key))
    }

    /// Lifetime counters of the resource pool.
    pub const fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    /// Number of resources shown in the last pass.
    pub fn borrowed_resources(&self) -> usize {
        self.pool.borrowed_len()
    }

    /// Number of pooled resources waiting for reuse.
    pub fn idle_resources(&self) -> usize {
        self.pool.idle_len()
    }

    /// The cell sink.
    pub fn sink(&self) -> &S {
        &self.pool.hooks().sink
    }

    /// The cell sink, mutably.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.pool.hooks_mut().sink
    }
}

/// The window of cells covering `viewport`, and the pixel origin of its
/// top-left cell with the cell offset applied.
///
/// Cell `position` starts `fraction` of a cell to the left of (and above) the
/// viewport origin, moved by the cell offset. The window starts at whichever
/// cell that puts across the viewport's leading edge.
pub(crate) fn visible_window(
    position: Coordinate,
    fraction: Vec2,
    metrics: CellMetrics,
    viewport: Size,
) -> (GridWindow, Point) {
    let cell = metrics.size;
    let (x, start_x) = leading_cell(
        position.x,
        metrics.offset.x - fraction.x * cell.width,
        cell.width,
    );
    let (y, start_y) = leading_cell(
        position.y,
        metrics.offset.y - fraction.y * cell.height,
        cell.height,
    );
    let size = GridSize::new(
        visible_count(viewport.width, start_x, cell.width),
        visible_count(viewport.height, start_y, cell.height),
    );
    (GridWindow::new(Coordinate::new(x, y), size), Point::new(start_x, start_y))
}

/// Moves `start` of cell `index` into `(-cell, 0]` by stepping whole cells.
#[allow(
    clippy::cast_possible_truncation,
    reason = "steps past i32 saturate, as do the indices they are applied to"
)]
fn leading_cell(index: i32, start: f64, cell: f64) -> (i32, f64) {
    if cell <= 0.0 {
        return (index, start);
    }
    let steps = (start / cell).ceil();
    (index.saturating_sub(steps as i32), start - steps * cell)
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "counts past u32::MAX saturate, and a viewport that large has no meaningful cells"
)]
fn visible_count(viewport: f64, start: f64, cell: f64) -> u32 {
    if cell <= 0.0 || viewport <= 0.0 {
        return 0;
    }
    ((viewport - start) / cell).ceil().max(0.0) as u32
}

/// Brings `tracker` in line with `span` by trimming indices that left at
/// either end and adding the ones that entered.
fn track(tracker: &mut HotArray<i32>, span: AxisSpan) {
    while tracker.first().is_some_and(|i| !span.contains(*i)) {
        tracker.shift();
    }
    while tracker.last().is_some_and(|i| !span.contains(*i)) {
        tracker.pop();
    }
    let end = span.offset.saturating_add_unsigned(span.len);
    match (tracker.first().copied(), tracker.last().copied()) {
        (Some(first), Some(last)) => {
            tracker.prepend(span.offset..first);
            tracker.extend(last.saturating_add(1)..end);
        }
        _ => tracker.extend(span.offset..end),
    }
}
