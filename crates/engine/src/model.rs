//! Sparse 2-D cell store.
//!
//! Header cells are held in dense strips so the structural invariant is
//! guaranteed by construction: (0, 0) is the table header, every (r, 0) and
//! (0, c) is a header, and data cells exist only at row >= 1, col >= 1.
//! Data cells are created lazily on first set and live in an FxHashMap keyed
//! by position.
//!
//! Cells removed from the store hand any live editor control to a release
//! queue; the owner drains it with [`GridDataModel::take_released_controls`]
//! and destroys the controls through its editor factory.

use gridview_core::CellType;
use rustc_hash::FxHashMap;

use crate::cell::{GridCell, Header, TableHeader};
use crate::cell_id::CellId;
use crate::edit::ControlId;
use crate::error::{GridError, GridResult};

#[derive(Debug, Clone)]
pub struct GridDataModel {
    rows: i32,
    cols: i32,
    table: GridCell,
    /// Row headers 1..=rows, stored at index r - 1.
    row_headers: Vec<GridCell>,
    /// Column headers 1..=cols, stored at index c - 1.
    col_headers: Vec<GridCell>,
    cells: FxHashMap<CellId, GridCell>,
    released: Vec<ControlId>,
}

fn blank_header(size: i32) -> GridCell {
    let mut cell = GridCell::new(CellType::Header);
    if let Some(header) = cell.as_header_mut() {
        header.size = size;
    }
    cell
}

impl GridDataModel {
    /// Create a `rows` x `cols` grid. The table header takes the column width
    /// as the row-header strip width and the row height as the column-header
    /// strip height; its default cell is an empty Text cell.
    pub fn new(rows: i32, cols: i32, row_height: i32, col_width: i32) -> GridResult<Self> {
        if rows < 1 || cols < 1 {
            return Err(GridError::InvalidArgument(format!(
                "grid needs at least one row and column, got {}x{}",
                rows, cols
            )));
        }
        let table = GridCell::table_header(col_width, row_height).with_default_cell(GridCell::new(CellType::Text));
        Ok(Self {
            rows,
            cols,
            table,
            row_headers: (0..rows).map(|_| blank_header(row_height)).collect(),
            col_headers: (0..cols).map(|_| blank_header(col_width)).collect(),
            cells: FxHashMap::default(),
            released: Vec::new(),
        })
    }

    #[inline]
    pub fn row_count(&self) -> i32 {
        self.rows
    }

    #[inline]
    pub fn col_count(&self) -> i32 {
        self.cols
    }

    /// True for any position including the header strips.
    #[inline]
    pub fn contains(&self, row: i32, col: i32) -> bool {
        row >= 0 && col >= 0 && row <= self.rows && col <= self.cols
    }

    pub fn value_at(&self, row: i32, col: i32) -> Option<&GridCell> {
        if !self.contains(row, col) {
            return None;
        }
        match (row, col) {
            (0, 0) => Some(&self.table),
            (r, 0) => self.row_headers.get((r - 1) as usize),
            (0, c) => self.col_headers.get((c - 1) as usize),
            (r, c) => self.cells.get(&CellId::new(r, c)),
        }
    }

    pub fn value_at_mut(&mut self, row: i32, col: i32) -> Option<&mut GridCell> {
        if !self.contains(row, col) {
            return None;
        }
        match (row, col) {
            (0, 0) => Some(&mut self.table),
            (r, 0) => self.row_headers.get_mut((r - 1) as usize),
            (0, c) => self.col_headers.get_mut((c - 1) as usize),
            (r, c) => self.cells.get_mut(&CellId::new(r, c)),
        }
    }

    /// Store `cell` at `(row, col)`, or remove the stored cell when `None`.
    ///
    /// The replaced cell runs its on-destroy. Header slots only accept the
    /// matching header variant and cannot be removed.
    pub fn set_value_at(&mut self, row: i32, col: i32, cell: Option<GridCell>) -> GridResult<()> {
        if !self.contains(row, col) {
            log::warn!("set_value_at out of range: ({}, {})", row, col);
            return Err(GridError::InvalidIndex { row, col });
        }

        if row == 0 || col == 0 {
            let expected = if row == 0 && col == 0 { CellType::TableHeader } else { CellType::Header };
            let Some(cell) = cell else {
                return Err(GridError::InvalidArgument(format!(
                    "header cell ({}, {}) cannot be removed",
                    row, col
                )));
            };
            if cell.cell_type() != expected {
                return Err(GridError::TypeMismatch { expected, found: cell.cell_type() });
            }
            if let Some(slot) = self.value_at_mut(row, col) {
                let mut old = std::mem::replace(slot, cell);
                old.on_destroy(&mut self.released);
            }
            return Ok(());
        }

        let id = CellId::new(row, col);
        let old = match cell {
            Some(cell) => {
                if cell.is_header() {
                    return Err(GridError::InvalidArgument(format!(
                        "{} cell cannot be stored at data position {}",
                        cell.cell_type(),
                        id
                    )));
                }
                self.cells.insert(id, cell)
            }
            None => self.cells.remove(&id),
        };
        if let Some(mut old) = old {
            old.on_destroy(&mut self.released);
        }
        Ok(())
    }

    /// Stored cell, else the default sub-cell inherited from the headers.
    ///
    /// With `col_first` the column header (row 0) is consulted before the row
    /// header (column 0); the table header's default comes last. Never
    /// creates a stored cell.
    pub fn value_or_default_at(&self, row: i32, col: i32) -> Option<&GridCell> {
        let stored = self.value_at(row, col);
        if stored.is_some() || row == 0 || col == 0 || !self.contains(row, col) {
            return stored;
        }
        let col_first = self.table().map_or(true, |t| t.col_first);
        let (first, second) = if col_first { ((0, col), (row, 0)) } else { ((row, 0), (0, col)) };
        self.value_at(first.0, first.1)
            .and_then(GridCell::default_cell)
            .or_else(|| self.value_at(second.0, second.1).and_then(GridCell::default_cell))
            .or_else(|| self.table.default_cell())
    }

    /// Controls released by removed cells since the last call.
    pub fn take_released_controls(&mut self) -> Vec<ControlId> {
        std::mem::take(&mut self.released)
    }

    // ========================================================================
    // Header access
    // ========================================================================

    pub fn table(&self) -> Option<&TableHeader> {
        self.table.as_table()
    }

    pub fn table_mut(&mut self) -> Option<&mut TableHeader> {
        self.table.as_table_mut()
    }

    pub fn row_header(&self, row: i32) -> Option<&Header> {
        if row < 1 {
            return None;
        }
        self.row_headers.get((row - 1) as usize).and_then(GridCell::as_header)
    }

    pub fn row_header_mut(&mut self, row: i32) -> Option<&mut Header> {
        if row < 1 {
            return None;
        }
        self.row_headers.get_mut((row - 1) as usize).and_then(GridCell::as_header_mut)
    }

    pub fn col_header(&self, col: i32) -> Option<&Header> {
        if col < 1 {
            return None;
        }
        self.col_headers.get((col - 1) as usize).and_then(GridCell::as_header)
    }

    pub fn col_header_mut(&mut self, col: i32) -> Option<&mut Header> {
        if col < 1 {
            return None;
        }
        self.col_headers.get_mut((col - 1) as usize).and_then(GridCell::as_header_mut)
    }

    /// Stored data cells (headers excluded), in no particular order.
    pub fn stored_cells(&self) -> impl Iterator<Item = (CellId, &GridCell)> {
        self.cells.iter().map(|(id, cell)| (*id, cell))
    }

    pub fn stored_count(&self) -> usize {
        self.cells.len()
    }

    // ========================================================================
    // Structural edits
    // ========================================================================

    /// Insert a blank row after `index` (clamped to `0..=rows`) and return the
    /// new row's 1-based index. The new header has size -1 (table default).
    pub fn add_new_row(&mut self, index: i32) -> i32 {
        let index = if index < 0 || index > self.rows { self.rows } else { index };
        self.shift_rows(index + 1, 1);
        self.row_headers.insert(index as usize, blank_header(-1));
        self.rows += 1;
        log::debug!("Inserted row {} ({} rows)", index + 1, self.rows);
        index + 1
    }

    /// Insert a blank column after `index`; see [`GridDataModel::add_new_row`].
    pub fn add_new_col(&mut self, index: i32) -> i32 {
        let index = if index < 0 || index > self.cols { self.cols } else { index };
        self.shift_cols(index + 1, 1);
        self.col_headers.insert(index as usize, blank_header(-1));
        self.cols += 1;
        log::debug!("Inserted column {} ({} columns)", index + 1, self.cols);
        index + 1
    }

    /// Physically remove row `row` (1-based) and its cells.
    pub fn delete_row(&mut self, row: i32) -> GridResult<()> {
        if row < 1 || row > self.rows {
            return Err(GridError::InvalidIndex { row, col: 0 });
        }
        self.clear_row(row);
        let mut header = self.row_headers.remove((row - 1) as usize);
        header.on_destroy(&mut self.released);
        self.shift_rows(row + 1, -1);
        self.rows -= 1;
        log::debug!("Deleted row {} ({} rows)", row, self.rows);
        Ok(())
    }

    /// Physically remove column `col` (1-based) and its cells.
    pub fn delete_col(&mut self, col: i32) -> GridResult<()> {
        if col < 1 || col > self.cols {
            return Err(GridError::InvalidIndex { row: 0, col });
        }
        self.clear_col(col);
        let mut header = self.col_headers.remove((col - 1) as usize);
        header.on_destroy(&mut self.released);
        self.shift_cols(col + 1, -1);
        self.cols -= 1;
        log::debug!("Deleted column {} ({} columns)", col, self.cols);
        Ok(())
    }

    /// Destroy every stored data cell of `row`; the header stays.
    pub fn clear_row(&mut self, row: i32) {
        let ids: Vec<CellId> = self.cells.keys().filter(|id| id.row == row).copied().collect();
        for id in ids {
            if let Some(mut cell) = self.cells.remove(&id) {
                cell.on_destroy(&mut self.released);
            }
        }
    }

    /// Destroy every stored data cell of `col`; the header stays.
    pub fn clear_col(&mut self, col: i32) {
        let ids: Vec<CellId> = self.cells.keys().filter(|id| id.col == col).copied().collect();
        for id in ids {
            if let Some(mut cell) = self.cells.remove(&id) {
                cell.on_destroy(&mut self.released);
            }
        }
    }

    /// Move every data cell with row >= `from` by `delta` rows.
    fn shift_rows(&mut self, from: i32, delta: i32) {
        let to_shift: Vec<CellId> = self.cells.keys().filter(|id| id.row >= from).copied().collect();
        let moved: Vec<(CellId, GridCell)> =
            to_shift.into_iter().filter_map(|id| self.cells.remove(&id).map(|cell| (id, cell))).collect();
        for (id, cell) in moved {
            self.cells.insert(CellId::new(id.row + delta, id.col), cell);
        }
    }

    fn shift_cols(&mut self, from: i32, delta: i32) {
        let to_shift: Vec<CellId> = self.cells.keys().filter(|id| id.col >= from).copied().collect();
        let moved: Vec<(CellId, GridCell)> =
            to_shift.into_iter().filter_map(|id| self.cells.remove(&id).map(|cell| (id, cell))).collect();
        for (id, cell) in moved {
            self.cells.insert(CellId::new(id.row, id.col + delta), cell);
        }
    }
}
