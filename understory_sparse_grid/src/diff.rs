// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Window-diff iteration.
//!
//! Given the window of a grid before and after a change, a [`DiffIterator`]
//! enumerates every row, column, or cell in the union of both windows and
//! classifies it as [`Change::Added`] (only in the target), [`Change::Removed`]
//! (only in the source), or [`Change::Unchanged`] (in both).
//!
//! - Every index from the lowest to the highest index of either window is
//!   visited exactly once. Indices between two disjoint windows take the
//!   change of the lower window, so they read as removed when the target moved
//!   past the source and as added when it moved before it.
//! - Traversal direction is configurable per axis and never affects the
//!   classification.
//! - With [`DiffFlags::SKIP_UNCHANGED`] the intersection is skipped as a
//!   block. A whole row (or column) is only skipped when the perpendicular
//!   extent and the cell metrics of both sides are equal; otherwise its
//!   unchanged cells may sit at new pixel positions and it is still visited,
//!   while the cell-level skip still applies inside it.
//!
//! Cells of a row that exists on only one side are classified by that row: a
//! row that only the target has contributes only added cells.

use bitflags::bitflags;

use crate::types::{CellMetrics, Coordinate, GridWindow};

/// A contiguous run of indices along one axis: `offset .. offset + len`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct AxisSpan {
    /// First index.
    pub offset: i32,
    /// Number of indices.
    pub len: u32,
}

impl AxisSpan {
    /// Creates a span.
    pub const fn new(offset: i32, len: u32) -> Self {
        Self { offset, len }
    }

    /// An empty span at index zero.
    pub const EMPTY: Self = Self::new(0, 0);

    /// Returns `true` if the span covers no indices.
    pub const fn is_empty(self) -> bool {
        self.len == 0
    }

    /// Returns `true` if `index` lies inside the span.
    pub fn contains(self, index: i32) -> bool {
        !self.is_empty() && self.first() <= i64::from(index) && i64::from(index) <= self.last()
    }

    fn first(self) -> i64 {
        i64::from(self.offset)
    }

    // Indices past `i32::MAX` do not exist.
    fn last(self) -> i64 {
        (self.first() + i64::from(self.len) - 1).min(i64::from(i32::MAX))
    }
}

/// Classification of an index or cell between two windows.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Change {
    /// Present only in the target window.
    Added,
    /// Present only in the source window.
    Removed,
    /// Present in both windows.
    Unchanged,
}

impl Change {
    /// Returns `true` for [`Change::Added`].
    pub const fn is_added(self) -> bool {
        matches!(self, Self::Added)
    }

    /// Returns `true` for [`Change::Removed`].
    pub const fn is_removed(self) -> bool {
        matches!(self, Self::Removed)
    }

    /// Returns `true` for [`Change::Unchanged`].
    pub const fn is_unchanged(self) -> bool {
        matches!(self, Self::Unchanged)
    }
}

/// Iterator over the union of two [`AxisSpan`]s with each index classified.
///
/// Yields `(index, change)` pairs in ascending order, or descending when
/// reversed. The intersection is jumped over in one step when unchanged
/// indices are skipped, and so is the gap between disjoint spans when
/// [`skip_gap`](Self::skip_gap) is set.
#[derive(Clone, Debug)]
pub struct AxisDiff {
    source: AxisSpan,
    target: AxisSpan,
    reverse: bool,
    skip_unchanged: bool,
    skip_gap: bool,
    cursor: i64,
    lo: i64,
    hi: i64,
}

impl AxisDiff {
    /// Creates an ascending diff of `source` against `target`.
    pub fn new(source: AxisSpan, target: AxisSpan) -> Self {
        let bounds = [source, target]
            .into_iter()
            .filter(|s| !s.is_empty())
            .map(|s| (s.first(), s.last()))
            .reduce(|(lo, hi), (first, last)| (lo.min(first), hi.max(last)));
        // An empty union is represented by `lo > hi`.
        let (lo, hi) = bounds.unwrap_or((0, -1));
        Self {
            source,
            target,
            reverse: false,
            skip_unchanged: false,
            skip_gap: false,
            cursor: lo,
            lo,
            hi,
        }
    }

    /// Traverses from the highest index to the lowest.
    #[must_use]
    pub fn reversed(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self.cursor = if reverse { self.hi } else { self.lo };
        self
    }

    /// Skips the intersection of both spans.
    #[must_use]
    pub fn skip_unchanged(mut self, skip: bool) -> Self {
        self.skip_unchanged = skip;
        self
    }

    /// Jumps over indices that lie in neither span instead of reporting them.
    #[must_use]
    pub fn skip_gap(mut self, skip: bool) -> Self {
        self.skip_gap = skip;
        self
    }

    /// Change of an index between two disjoint spans: that of the lower span.
    fn gap_change(&self) -> Change {
        if self.source.first() < self.target.first() {
            Change::Removed
        } else {
            Change::Added
        }
    }

    fn in_bounds(&self) -> bool {
        self.lo <= self.cursor && self.cursor <= self.hi
    }

    /// Moves the cursor past the run of indices containing the cursor whose
    /// membership is `in_source`/`in_target`.
    fn jump_past(&mut self, in_source: bool, in_target: bool) {
        let (s, t) = (self.source, self.target);
        match (in_source, in_target, self.reverse) {
            (true, true, false) => self.cursor = s.last().min(t.last()) + 1,
            (true, true, true) => self.cursor = s.first().max(t.first()) - 1,
            // Gap between disjoint spans: land on the nearer edge of the other span.
            (false, false, false) => {
                self.cursor = [s, t]
                    .into_iter()
                    .filter(|span| !span.is_empty() && span.first() > self.cursor)
                    .map(AxisSpan::first)
                    .min()
                    .unwrap_or(self.hi + 1);
            }
            (false, false, true) => {
                self.cursor = [s, t]
                    .into_iter()
                    .filter(|span| !span.is_empty() && span.last() < self.cursor)
                    .map(AxisSpan::last)
                    .max()
                    .unwrap_or(self.lo - 1);
            }
            _ => self.step(),
        }
    }

    fn step(&mut self) {
        if self.reverse {
            self.cursor -= 1;
        } else {
            self.cursor += 1;
        }
    }
}

impl Iterator for AxisDiff {
    type Item = (i32, Change);

    fn next(&mut self) -> Option<Self::Item> {
        while self.in_bounds() {
            #[allow(
                clippy::cast_possible_truncation,
                reason = "the cursor stays between the bounds of the two i32 spans"
            )]
            let index = self.cursor as i32;
            let in_source = self.source.contains(index);
            let in_target = self.target.contains(index);
            let change = match (in_source, in_target) {
                (true, true) if self.skip_unchanged => {
                    self.jump_past(true, true);
                    continue;
                }
                (false, false) if self.skip_gap => {
                    self.jump_past(false, false);
                    continue;
                }
                (false, false) => self.gap_change(),
                (true, true) => Change::Unchanged,
                (false, true) => Change::Added,
                (true, false) => Change::Removed,
            };
            self.step();
            return Some((index, change));
        }
        None
    }
}

bitflags! {
    /// Traversal options for a [`DiffIterator`].
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct DiffFlags: u8 {
        /// Visit rows from the highest `y` to the lowest.
        const BOTTOM_TO_TOP = 1 << 0;
        /// Visit columns from the highest `x` to the lowest.
        const RIGHT_TO_LEFT = 1 << 1;
        /// Make columns the outer loop and rows the inner loop.
        const ROWS_OF_COLUMNS = 1 << 2;
        /// Do not report indices and cells present in both windows.
        const SKIP_UNCHANGED = 1 << 3;
    }
}

/// Anything with a logical window and cell metrics that can be diffed.
pub trait GridShape {
    /// The logical window.
    fn window(&self) -> GridWindow;

    /// Pixel geometry of every cell.
    fn cell_metrics(&self) -> CellMetrics {
        CellMetrics::default()
    }
}

impl GridShape for GridWindow {
    fn window(&self) -> GridWindow {
        *self
    }
}

/// A [`GridShape`] whose cells can be looked up without side effects.
pub trait CellLookup: GridShape {
    /// Cell value type.
    type Cell;

    /// Returns the cell at `coordinate` if it exists. Must not materialize.
    fn lookup(&self, coordinate: Coordinate) -> Option<&Self::Cell>;
}

/// One cell reported by [`DiffIterator::each_cell`] and friends.
#[derive(Debug)]
pub struct CellVisit<'a, A, B> {
    /// Where the cell is.
    pub coordinate: Coordinate,
    /// How the cell changed between source and target.
    pub change: Change,
    /// The cell in the source grid, if it exists there.
    pub source: Option<&'a A>,
    /// The cell in the target grid, if it exists there.
    pub target: Option<&'a B>,
}

/// Configurable traversal of the difference between two grid windows.
///
/// The iterator itself holds no state besides its [`DiffFlags`]; the same
/// instance can diff any number of window pairs.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DiffIterator {
    flags: DiffFlags,
}

impl DiffIterator {
    /// Top-to-bottom, left-to-right, columns within rows, reporting everything.
    pub const fn new() -> Self {
        Self {
            flags: DiffFlags::empty(),
        }
    }

    /// Creates an iterator with explicit flags.
    pub const fn with_flags(flags: DiffFlags) -> Self {
        Self { flags }
    }

    /// Current flags.
    pub const fn flags(&self) -> DiffFlags {
        self.flags
    }

    /// Visit rows from the lowest `y` upward.
    #[must_use]
    pub fn top_to_bottom(mut self) -> Self {
        self.flags.remove(DiffFlags::BOTTOM_TO_TOP);
        self
    }

    /// Visit rows from the highest `y` downward.
    #[must_use]
    pub fn bottom_to_top(mut self) -> Self {
        self.flags.insert(DiffFlags::BOTTOM_TO_TOP);
        self
    }

    /// Visit columns from the lowest `x` upward.
    #[must_use]
    pub fn left_to_right(mut self) -> Self {
        self.flags.remove(DiffFlags::RIGHT_TO_LEFT);
        self
    }

    /// Visit columns from the highest `x` downward.
    #[must_use]
    pub fn right_to_left(mut self) -> Self {
        self.flags.insert(DiffFlags::RIGHT_TO_LEFT);
        self
    }

    /// Rows are the outer loop.
    #[must_use]
    pub fn columns_of_rows(mut self) -> Self {
        self.flags.remove(DiffFlags::ROWS_OF_COLUMNS);
        self
    }

    /// Columns are the outer loop.
    #[must_use]
    pub fn rows_of_columns(mut self) -> Self {
        self.flags.insert(DiffFlags::ROWS_OF_COLUMNS);
        self
    }

    /// Returns this iterator with unchanged skipping set.
    #[must_use]
    pub fn skip_unchanged(mut self, skip: bool) -> Self {
        self.set_skip_unchanged(skip);
        self
    }

    /// Enables or disables skipping of unchanged indices and cells.
    pub fn set_skip_unchanged(&mut self, skip: bool) {
        self.flags.set(DiffFlags::SKIP_UNCHANGED, skip);
    }

    /// Returns `true` if unchanged indices and cells are skipped.
    pub const fn skips_unchanged(&self) -> bool {
        self.flags.contains(DiffFlags::SKIP_UNCHANGED)
    }

    /// Returns `true` if columns are the outer loop.
    pub const fn columns_outer(&self) -> bool {
        self.flags.contains(DiffFlags::ROWS_OF_COLUMNS)
    }

    /// The row diff between `source` and `target`.
    pub fn rows<S: GridShape + ?Sized, T: GridShape + ?Sized>(
        &self,
        source: &S,
        target: &T,
    ) -> AxisDiff {
        let (s, t) = (source.window(), target.window());
        let whole = self.skip_whole(s.columns(), t.columns(), source, target);
        AxisDiff::new(s.rows(), t.rows())
            .reversed(self.flags.contains(DiffFlags::BOTTOM_TO_TOP))
            .skip_unchanged(whole)
    }

    /// The column diff between `source` and `target`.
    pub fn columns<S: GridShape + ?Sized, T: GridShape + ?Sized>(
        &self,
        source: &S,
        target: &T,
    ) -> AxisDiff {
        let (s, t) = (source.window(), target.window());
        let whole = self.skip_whole(s.rows(), t.rows(), source, target);
        AxisDiff::new(s.columns(), t.columns())
            .reversed(self.flags.contains(DiffFlags::RIGHT_TO_LEFT))
            .skip_unchanged(whole)
    }

    /// Calls `f` for every row in either window.
    pub fn each_row<S, T, F>(&self, source: &S, target: &T, mut f: F)
    where
        S: GridShape + ?Sized,
        T: GridShape + ?Sized,
        F: FnMut(i32, Change),
    {
        for (row, change) in self.rows(source, target) {
            f(row, change);
        }
    }

    /// Calls `f` for every column in either window.
    pub fn each_column<S, T, F>(&self, source: &S, target: &T, mut f: F)
    where
        S: GridShape + ?Sized,
        T: GridShape + ?Sized,
        F: FnMut(i32, Change),
    {
        for (column, change) in self.columns(source, target) {
            f(column, change);
        }
    }

    /// Calls `f` for every row, or every column if columns are the outer loop.
    pub fn each_row_or_column<S, T, F>(&self, source: &S, target: &T, f: F)
    where
        S: GridShape + ?Sized,
        T: GridShape + ?Sized,
        F: FnMut(i32, Change),
    {
        if self.columns_outer() {
            self.each_column(source, target, f);
        } else {
            self.each_row(source, target, f);
        }
    }

    /// Calls `f` for every cell of row `y` in either window.
    pub fn each_cell_of_row<'a, S, T, F>(&self, y: i32, source: &'a S, target: &'a T, mut f: F)
    where
        S: CellLookup + ?Sized,
        T: CellLookup + ?Sized,
        F: FnMut(CellVisit<'a, S::Cell, T::Cell>),
    {
        let (s, t) = (source.window(), target.window());
        let diff = AxisDiff::new(
            if s.rows().contains(y) { s.columns() } else { AxisSpan::EMPTY },
            if t.rows().contains(y) { t.columns() } else { AxisSpan::EMPTY },
        )
        .reversed(self.flags.contains(DiffFlags::RIGHT_TO_LEFT))
        .skip_unchanged(self.skips_unchanged());
        for (x, change) in diff {
            f(visit(Coordinate::new(x, y), change, source, target));
        }
    }

    /// Calls `f` for every cell of column `x` in either window.
    pub fn each_cell_of_column<'a, S, T, F>(&self, x: i32, source: &'a S, target: &'a T, mut f: F)
    where
        S: CellLookup + ?Sized,
        T: CellLookup + ?Sized,
        F: FnMut(CellVisit<'a, S::Cell, T::Cell>),
    {
        let (s, t) = (source.window(), target.window());
        let diff = AxisDiff::new(
            if s.columns().contains(x) { s.rows() } else { AxisSpan::EMPTY },
            if t.columns().contains(x) { t.rows() } else { AxisSpan::EMPTY },
        )
        .reversed(self.flags.contains(DiffFlags::BOTTOM_TO_TOP))
        .skip_unchanged(self.skips_unchanged());
        for (y, change) in diff {
            f(visit(Coordinate::new(x, y), change, source, target));
        }
    }

    /// Calls `f` for every cell of the outer-loop row or column at `index`.
    pub fn each_cell_of_row_or_column<'a, S, T, F>(
        &self,
        index: i32,
        source: &'a S,
        target: &'a T,
        f: F,
    ) where
        S: CellLookup + ?Sized,
        T: CellLookup + ?Sized,
        F: FnMut(CellVisit<'a, S::Cell, T::Cell>),
    {
        if self.columns_outer() {
            self.each_cell_of_column(index, source, target, f);
        } else {
            self.each_cell_of_row(index, source, target, f);
        }
    }

    /// Calls `f` for every cell in either window, row by row (or column by
    /// column if columns are the outer loop).
    pub fn each_cell<'a, S, T, F>(&self, source: &'a S, target: &'a T, mut f: F)
    where
        S: CellLookup + ?Sized,
        T: CellLookup + ?Sized,
        F: FnMut(CellVisit<'a, S::Cell, T::Cell>),
    {
        self.each_row_or_column(source, target, |index, _| {
            self.each_cell_of_row_or_column(index, source, target, &mut f);
        });
    }

    /// Whether whole rows (or columns) in the intersection can be skipped.
    fn skip_whole<S: GridShape + ?Sized, T: GridShape + ?Sized>(
        &self,
        source_perpendicular: AxisSpan,
        target_perpendicular: AxisSpan,
        source: &S,
        target: &T,
    ) -> bool {
        self.skips_unchanged()
            && source_perpendicular == target_perpendicular
            && source.cell_metrics() == target.cell_metrics()
    }
}

fn visit<'a, S, T>(
    coordinate: Coordinate,
    change: Change,
    source: &'a S,
    target: &'a T,
) -> CellVisit<'a, S::Cell, T::Cell>
where
    S: CellLookup + ?Sized,
    T: CellLookup + ?Sized,
{
    CellVisit {
        coordinate,
        change,
        source: if change.is_added() {
            None
        } else {
            source.lookup(coordinate)
        },
        target: if change.is_removed() {
            None
        } else {
            target.lookup(coordinate)
        },
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use kurbo::Size;

    use super::{AxisDiff, AxisSpan, Change, DiffFlags, DiffIterator};
    use crate::grid::SparseGrid;
    use crate::types::{Coordinate, GridSize, GridWindow};

    fn window(x: i32, y: i32, w: u32, h: u32) -> GridWindow {
        GridWindow::new(Coordinate::new(x, y), GridSize::new(w, h))
    }

    fn axis(source: (i32, u32), target: (i32, u32)) -> AxisDiff {
        AxisDiff::new(
            AxisSpan::new(source.0, source.1),
            AxisSpan::new(target.0, target.1),
        )
    }

    fn columns(iter: DiffIterator, source: GridWindow, target: GridWindow) -> Vec<(i32, Change)> {
        let mut out = Vec::new();
        iter.each_column(&source, &target, |x, c| out.push((x, c)));
        out
    }

    #[test]
    fn shifting_a_window_right_by_one_column() {
        let before = window(0, 0, 3, 2);
        let after = window(1, 0, 3, 2);
        assert_eq!(
            columns(DiffIterator::new(), before, after),
            [
                (0, Change::Removed),
                (1, Change::Unchanged),
                (2, Change::Unchanged),
                (3, Change::Added),
            ]
        );
        assert_eq!(
            columns(DiffIterator::new().skip_unchanged(true), before, after),
            [(0, Change::Removed), (3, Change::Added)]
        );
    }

    #[test]
    fn reversing_only_reverses_order() {
        for (s, t) in [((0, 5), (3, 4)), ((2, 3), (-4, 10)), ((0, 2), (6, 2)), ((0, 0), (1, 3))] {
            let forward: Vec<_> = axis(s, t).collect();
            let mut backward: Vec<_> = axis(s, t).reversed(true).collect();
            backward.reverse();
            assert_eq!(forward, backward);
        }
    }

    #[test]
    fn union_range_is_visited_exactly_once() {
        let spans = [(-3, 0), (-3, 4), (0, 1), (0, 6), (2, 2), (5, 3), (9, 1), (-10, 30)];
        for &s in &spans {
            for &t in &spans {
                let source = AxisSpan::new(s.0, s.1);
                let target = AxisSpan::new(t.0, t.1);
                let nonempty = [source, target].into_iter().filter(|span| !span.is_empty());
                let expected: Vec<i32> = match (
                    nonempty.clone().map(|span| span.offset).min(),
                    nonempty.map(|span| span.offset + i32::try_from(span.len).unwrap() - 1).max(),
                ) {
                    (Some(lo), Some(hi)) => (lo..=hi).collect(),
                    _ => Vec::new(),
                };
                for reverse in [false, true] {
                    let mut visited: Vec<_> = axis(s, t).reversed(reverse).collect();
                    if reverse {
                        visited.reverse();
                    }
                    let indices: Vec<i32> = visited.iter().map(|(i, _)| *i).collect();
                    assert_eq!(indices, expected, "range of {s:?} vs {t:?}");

                    for (i, change) in visited {
                        let want = match (source.contains(i), target.contains(i)) {
                            (true, true) => Change::Unchanged,
                            (false, true) => Change::Added,
                            (true, false) => Change::Removed,
                            (false, false) if source.offset < target.offset => Change::Removed,
                            (false, false) => Change::Added,
                        };
                        assert_eq!(change, want, "index {i} of {s:?} vs {t:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn skipping_never_reports_the_intersection() {
        let visited: Vec<_> = axis((0, 10), (4, 10)).skip_unchanged(true).collect();
        assert!(visited.iter().all(|(_, c)| !c.is_unchanged()));
        assert_eq!(visited.len(), 8);
        let backward: Vec<_> = axis((0, 10), (4, 10))
            .skip_unchanged(true)
            .reversed(true)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(backward, [13, 12, 11, 10, 3, 2, 1, 0]);
    }

    #[test]
    fn disjoint_spans_report_the_gap_as_the_lower_span() {
        let visited: Vec<_> = axis((0, 2), (5, 2)).collect();
        assert_eq!(
            visited.iter().map(|(i, _)| *i).collect::<Vec<_>>(),
            (0..=6).collect::<Vec<_>>()
        );
        assert!(visited[..5].iter().all(|(_, c)| c.is_removed()));
        assert!(visited[5..].iter().all(|(_, c)| c.is_added()));

        let visited: Vec<_> = axis((5, 2), (0, 2)).reversed(true).collect();
        assert_eq!(visited[0], (6, Change::Removed));
        assert_eq!(visited[2], (4, Change::Added));
        assert_eq!(visited.len(), 7);
    }

    #[test]
    fn disjoint_spans_terminate_when_skipping_unchanged() {
        let visited: Vec<_> = axis((0, 2), (4, 2)).skip_unchanged(true).collect();
        assert_eq!(visited.len(), 6);
        let visited: Vec<_> = axis((4, 2), (0, 2))
            .skip_unchanged(true)
            .reversed(true)
            .collect();
        assert_eq!(visited.len(), 6);
    }

    #[test]
    fn skip_gap_jumps_between_disjoint_spans() {
        let visited: Vec<_> = axis((0, 2), (1_000_000, 2))
            .skip_gap(true)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(visited, [0, 1, 1_000_000, 1_000_001]);
        let visited: Vec<_> = axis((0, 2), (-1_000_000, 1))
            .skip_gap(true)
            .reversed(true)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(visited, [1, 0, -1_000_000]);
    }

    #[test]
    fn empty_spans_contribute_nothing() {
        assert_eq!(axis((5, 0), (9, 0)).count(), 0);
        let added: Vec<_> = axis((50, 0), (1, 2)).collect();
        assert_eq!(added, [(1, Change::Added), (2, Change::Added)]);
    }

    #[test]
    fn spans_at_the_edge_of_the_index_range() {
        let visited: Vec<_> = axis((i32::MAX - 1, 10), (i32::MAX, 1)).collect();
        assert_eq!(
            visited,
            [(i32::MAX - 1, Change::Removed), (i32::MAX, Change::Unchanged)]
        );
        let visited: Vec<_> = axis((i32::MIN, 1), (i32::MIN, 0)).reversed(true).collect();
        assert_eq!(visited, [(i32::MIN, Change::Removed)]);
    }

    #[test]
    fn builders_toggle_flags() {
        let iter = DiffIterator::new()
            .bottom_to_top()
            .right_to_left()
            .rows_of_columns()
            .skip_unchanged(true);
        assert_eq!(iter.flags(), DiffFlags::all());
        let iter = iter.top_to_bottom().left_to_right().columns_of_rows();
        assert_eq!(iter.flags(), DiffFlags::SKIP_UNCHANGED);
        let mut iter = iter;
        iter.set_skip_unchanged(false);
        assert_eq!(iter, DiffIterator::new());
    }

    #[test]
    fn each_row_uses_row_direction() {
        let mut rows = Vec::new();
        DiffIterator::new().bottom_to_top().each_row(
            &window(0, 0, 1, 2),
            &window(0, 1, 1, 2),
            |y, c| rows.push((y, c)),
        );
        assert_eq!(
            rows,
            [(2, Change::Added), (1, Change::Unchanged), (0, Change::Removed)]
        );
    }

    #[test]
    fn each_row_or_column_follows_outer_loop() {
        let (s, t) = (window(0, 0, 2, 5), window(0, 0, 3, 5));
        let mut seen = Vec::new();
        DiffIterator::new().each_row_or_column(&s, &t, |i, _| seen.push(i));
        assert_eq!(seen, [0, 1, 2, 3, 4]);
        seen.clear();
        DiffIterator::new()
            .rows_of_columns()
            .each_row_or_column(&s, &t, |i, _| seen.push(i));
        assert_eq!(seen, [0, 1, 2]);
    }

    #[test]
    fn unchanged_rows_are_bulk_skipped_only_when_columns_match() {
        let iter = DiffIterator::new().skip_unchanged(true);
        let mut rows = Vec::new();
        iter.each_row(&window(0, 0, 4, 3), &window(0, 1, 4, 3), |y, _| rows.push(y));
        assert_eq!(rows, [0, 3]);

        // Widening changes every row even though the row span overlaps.
        rows.clear();
        iter.each_row(&window(0, 0, 4, 3), &window(0, 1, 5, 3), |y, _| rows.push(y));
        assert_eq!(rows, [0, 1, 2, 3]);
    }

    #[test]
    fn cell_metric_change_revisits_rows_but_not_cells() {
        let mut before = SparseGrid::with_constant(0_u8);
        before.set_size(3, 2);
        let mut after = SparseGrid::with_constant(0_u8);
        after.set_size(3, 2).set_cell_size(Size::new(10.0, 10.0));

        let iter = DiffIterator::new().skip_unchanged(true);
        let mut rows = Vec::new();
        iter.each_row(&before, &after, |y, c| rows.push((y, c)));
        assert_eq!(rows, [(0, Change::Unchanged), (1, Change::Unchanged)]);

        let mut cells = 0;
        iter.each_cell(&before, &after, |_| cells += 1);
        assert_eq!(cells, 0);
    }

    #[test]
    fn cells_of_an_added_row_are_all_added() {
        let before = SparseGrid::with_constant(()).with_window(window(0, 0, 3, 1));
        let after = SparseGrid::with_constant(()).with_window(window(1, 0, 3, 2));
        let mut row = Vec::new();
        DiffIterator::new()
            .skip_unchanged(true)
            .each_cell_of_row(1, &before, &after, |v| row.push((v.coordinate.x, v.change)));
        assert_eq!(
            row,
            [(1, Change::Added), (2, Change::Added), (3, Change::Added)]
        );
    }

    #[test]
    fn each_cell_covers_both_windows() {
        let before = SparseGrid::with_constant(()).with_window(window(0, 0, 2, 2));
        let after = SparseGrid::with_constant(()).with_window(window(1, 1, 2, 2));
        let mut cells = Vec::new();
        DiffIterator::new().each_cell(&before, &after, |v| {
            cells.push((v.coordinate.x, v.coordinate.y, v.change));
        });
        assert_eq!(
            cells,
            [
                (0, 0, Change::Removed),
                (1, 0, Change::Removed),
                (0, 1, Change::Removed),
                (1, 1, Change::Unchanged),
                (2, 1, Change::Added),
                (1, 2, Change::Added),
                (2, 2, Change::Added),
            ]
        );

        let mut by_column = Vec::new();
        DiffIterator::new()
            .rows_of_columns()
            .each_cell(&before, &after, |v| by_column.push((v.coordinate.x, v.coordinate.y)));
        assert_eq!(by_column, [(0, 0), (0, 1), (1, 0), (1, 1), (1, 2), (2, 1), (2, 2)]);
    }

    #[test]
    fn cell_visits_carry_existing_values_without_materializing() {
        let mut before = SparseGrid::with_constant(0_u32).with_window(window(0, 0, 2, 1));
        before.set_cell(0, 0, 10);
        before.set_cell(1, 0, 11);
        let mut after = SparseGrid::with_constant(0_u32).with_window(window(1, 0, 2, 1));
        after.set_cell(1, 0, 21);

        let mut seen = Vec::new();
        DiffIterator::new().each_cell(&before, &after, |v| {
            seen.push((v.coordinate.x, v.change, v.source.copied(), v.target.copied()));
        });
        assert_eq!(
            seen,
            [
                (0, Change::Removed, Some(10), None),
                (1, Change::Unchanged, Some(11), Some(21)),
                (2, Change::Added, None, None),
            ]
        );
        assert!(!after.has_cell(2, 0));
    }
}
