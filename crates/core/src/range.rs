//! Rectangular cell ranges with sentinel extents.
//!
//! A `GridRange` is anchored at `(row, col)` and spans `width` columns and
//! `height` rows. Extents follow three rules per axis:
//!
//! ```text
//! extent  > 0   anchor .. anchor + extent
//! extent == 0   empty (the whole range selects nothing)
//! extent == -1  the whole axis ("entire row" / "entire column")
//! extent  < -1  |extent| cells ending at the anchor (extends backwards)
//! ```
//!
//! Row 0 and column 0 are the header strips; membership tests never report
//! header cells as selected.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// One axis of a range after sentinel resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span {
    Empty,
    Whole,
    /// Half-open `start..stop`.
    Bounded { start: i32, stop: i32 },
}

impl Span {
    /// Resolve an (anchor, extent) pair.
    pub fn from_extent(begin: i32, extent: i32) -> Span {
        let (begin, extent) = if extent < -1 {
            (begin + extent + 1, -extent)
        } else {
            (begin, extent)
        };
        let stop = begin + extent;
        if begin == stop {
            Span::Empty
        } else if begin > stop {
            Span::Whole
        } else {
            Span::Bounded { start: begin, stop }
        }
    }

    pub fn contains(&self, index: i32) -> bool {
        match *self {
            Span::Empty => false,
            Span::Whole => true,
            Span::Bounded { start, stop } => index >= start && index < stop,
        }
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        match (*self, *other) {
            (Span::Empty, _) | (_, Span::Empty) => false,
            (Span::Whole, _) | (_, Span::Whole) => true,
            (Span::Bounded { start: a, stop: b }, Span::Bounded { start: c, stop: d }) => {
                a < d && c < b
            }
        }
    }

    /// Indices covered within `0..=count`. `Whole` resolves to `1..=count`.
    pub fn clamp_to(&self, count: i32) -> Option<RangeInclusive<i32>> {
        let (first, last) = match *self {
            Span::Empty => return None,
            Span::Whole => (1, count),
            Span::Bounded { start, stop } => (start.max(0), (stop - 1).min(count)),
        };
        if first > last {
            None
        } else {
            Some(first..=last)
        }
    }
}

/// A rectangular selection of cells: `(row, col, width, height)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridRange {
    pub row: i32,
    pub col: i32,
    pub width: i32,
    pub height: i32,
}

impl GridRange {
    pub const fn new(row: i32, col: i32, width: i32, height: i32) -> Self {
        Self { row, col, width, height }
    }

    /// A 1x1 range.
    pub const fn single(row: i32, col: i32) -> Self {
        Self { row, col, width: 1, height: 1 }
    }

    /// Every column of `row`.
    pub const fn entire_row(row: i32, col: i32) -> Self {
        Self { row, col, width: -1, height: 1 }
    }

    /// Every row of `col`.
    pub const fn entire_col(row: i32, col: i32) -> Self {
        Self { row, col, width: 1, height: -1 }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn row_span(&self) -> Span {
        Span::from_extent(self.row, self.height)
    }

    pub fn col_span(&self) -> Span {
        Span::from_extent(self.col, self.width)
    }

    pub fn is_single(&self) -> bool {
        self.width == 1 && self.height == 1
    }

    /// Membership test for data cells. Header cells are never inside a range.
    pub fn contains(&self, row: i32, col: i32) -> bool {
        if row == 0 || col == 0 || self.is_empty() {
            return false;
        }
        self.row_span().contains(row) && self.col_span().contains(col)
    }

    /// True when both axes overlap. An empty range intersects nothing; a
    /// whole-axis extent overlaps any non-empty extent on that axis.
    pub fn intersects(&self, other: &GridRange) -> bool {
        self.row_span().overlaps(&other.row_span()) && self.col_span().overlaps(&other.col_span())
    }

    /// Range from this range's anchor to `(row, col)`, signs encoding direction.
    pub fn extended_to(&self, row: i32, col: i32) -> GridRange {
        let height = row - self.row + if row >= self.row { 1 } else { -1 };
        let width = col - self.col + if col >= self.col { 1 } else { -1 };
        GridRange::new(self.row, self.col, width, height)
    }

    /// Iterate `(row, col)` pairs covered by the range inside a grid of the
    /// given size (row-major). Whole-axis extents cover `1..=count`.
    pub fn cells(&self, row_count: i32, col_count: i32) -> impl Iterator<Item = (i32, i32)> {
        let rows = self.row_span().clamp_to(row_count);
        let cols = self.col_span().clamp_to(col_count);
        let (rows, cols) = match (rows, cols) {
            (Some(r), Some(c)) => (r, c),
            _ => (1..=0, 1..=0),
        };
        rows.flat_map(move |r| cols.clone().map(move |c| (r, c)))
    }

    /// True if the range touches the header row or header column.
    pub fn touches_headers(&self) -> bool {
        let row_hit = match self.row_span() {
            Span::Bounded { start, .. } => start <= 0,
            _ => false,
        };
        let col_hit = match self.col_span() {
            Span::Bounded { start, .. } => start <= 0,
            _ => false,
        };
        row_hit || col_hit
    }
}

impl std::fmt::Display for GridRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {}x{})", self.row, self.col, self.width, self.height)
    }
}
