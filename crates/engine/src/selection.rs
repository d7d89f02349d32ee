//! Current cell and highlighted range.
//!
//! Pure state; the view layers invalidation, scrolling and notifications on
//! top of the transitions reported here.

use gridview_core::GridRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Focus {
    row: i32,
    col: i32,
    highlight: GridRange,
}

impl Default for Focus {
    fn default() -> Self {
        Self { row: 1, col: 1, highlight: GridRange::single(1, 1) }
    }
}

impl Focus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> (i32, i32) {
        (self.row, self.col)
    }

    pub fn highlight(&self) -> GridRange {
        self.highlight
    }

    /// The moving corner of the highlight: the cell opposite its anchor.
    /// Whole-axis extents fall back to the current cell on that axis.
    pub fn highlight_end(&self) -> (i32, i32) {
        fn far(anchor: i32, extent: i32, current: i32) -> i32 {
            match extent {
                e if e > 0 => anchor + e - 1,
                -1 => current,
                e if e < -1 => anchor + e + 1,
                _ => anchor,
            }
        }
        let h = self.highlight;
        (far(h.row, h.height, self.row), far(h.col, h.width, self.col))
    }

    /// Clamp into `[1, rows] x [1, cols]`.
    pub fn clamp(row: i32, col: i32, rows: i32, cols: i32) -> (i32, i32) {
        (row.clamp(1, rows.max(1)), col.clamp(1, cols.max(1)))
    }

    /// Move the current cell (clamped). Returns the previous cell when it
    /// actually changed.
    pub fn set_current(&mut self, row: i32, col: i32, rows: i32, cols: i32) -> Option<(i32, i32)> {
        let (row, col) = Self::clamp(row, col, rows, cols);
        if (row, col) == (self.row, self.col) {
            return None;
        }
        let previous = (self.row, self.col);
        self.row = row;
        self.col = col;
        Some(previous)
    }

    /// Replace the highlight, returning the old one. The current cell is
    /// left alone.
    pub fn set_highlight(&mut self, range: GridRange) -> GridRange {
        std::mem::replace(&mut self.highlight, range)
    }

    /// Stretch the highlight from its anchor to `(row, col)`; signs of the
    /// resulting extents encode direction. Out-of-range targets are ignored.
    pub fn extend_highlight_to(&mut self, row: i32, col: i32, rows: i32, cols: i32) -> Option<GridRange> {
        if row < 1 || col < 1 || row > rows || col > cols {
            return None;
        }
        let extended = self.highlight.extended_to(row, col);
        if extended == self.highlight {
            return None;
        }
        Some(self.set_highlight(extended))
    }

    /// A row was inserted after `index`.
    pub fn row_inserted(&mut self, index: i32) {
        if self.row >= index {
            self.row += 1;
        }
    }

    pub fn col_inserted(&mut self, index: i32) {
        if self.col >= index {
            self.col += 1;
        }
    }

    /// Row `index` was removed; `rows` is the new count.
    pub fn row_deleted(&mut self, index: i32, rows: i32) {
        if self.row >= index && self.row > 1 {
            self.row -= 1;
        }
        self.row = self.row.clamp(1, rows.max(1));
    }

    pub fn col_deleted(&mut self, index: i32, cols: i32) {
        if self.col >= index && self.col > 1 {
            self.col -= 1;
        }
        self.col = self.col.clamp(1, cols.max(1));
    }

    /// Back to (1, 1) with a 1x1 highlight.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
