//! The grid view: model, layout, selection, editing and input wired to the
//! host collaborators.
//!
//! Every operation runs to completion on the caller's thread. Structural
//! changes recompute layout immediately and invalidate only what moved;
//! already painted pixels are shifted with [`WindowHost::scroll_window`].
//!
//! Dependency callbacks must not add or delete rows or columns while a
//! resize drag or an edit session is in progress.

use gridview_config::{GridSettings, GridTheme};
use gridview_core::{CellType, GridRange, Point, Rect, Span};

use crate::cell::{CellPayload, GridCell};
use crate::dep_graph::{DependencyCallback, DependencyGraph, DependencyId};
use crate::edit::{EditSession, EditorEvent, EditorFactory, EditorKind};
use crate::error::{GridError, GridResult};
use crate::events::GridNotification;
use crate::host::WindowHost;
use crate::input::{starts_edit, CursorShape, Key, MouseState, PointerTracker};
use crate::layout::{Layout, Viewport};
use crate::model::GridDataModel;
use crate::render::{draw_cell, CellPaintState, Surface};
use crate::selection::Focus;

/// Construction parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridDimensions {
    pub rows: i32,
    pub cols: i32,
    pub row_height: i32,
    pub col_width: i32,
}

impl GridDimensions {
    /// `rows` x `cols` with the configured default sizes.
    pub fn from_settings(rows: i32, cols: i32, settings: &GridSettings) -> Self {
        Self { rows, cols, row_height: settings.default_row_height, col_width: settings.default_column_width }
    }
}

/// Scroll-bar request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollRequest {
    LineUp,
    LineDown,
    PageUp,
    PageDown,
    Top,
    Bottom,
    /// Absolute position in scroll space.
    ThumbTo(i32),
}

/// Content of a single cell as seen through the default fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct CellSnapshot {
    pub cell: GridCell,
    /// Rendered text value.
    pub text: String,
    /// The cell has no stored value; `cell` is the inherited default.
    pub is_default: bool,
}

pub struct GridView<V: Viewport, H: WindowHost, E: EditorFactory> {
    model: GridDataModel,
    layout: Layout,
    deps: DependencyGraph,
    focus: Focus,
    edit: EditSession,
    pointer: PointerTracker,
    settings: GridSettings,
    theme: GridTheme,
    viewport: V,
    host: H,
    editors: E,
}

impl<V: Viewport, H: WindowHost, E: EditorFactory> GridView<V, H, E> {
    pub fn new(
        dims: GridDimensions,
        settings: GridSettings,
        theme: GridTheme,
        viewport: V,
        host: H,
        editors: E,
    ) -> GridResult<Self> {
        let mut model = GridDataModel::new(dims.rows, dims.cols, dims.row_height, dims.col_width)?;
        if let Some(table) = model.table_mut() {
            table.col_first = settings.col_first;
        }
        let mut view = Self {
            model,
            layout: Layout::new(),
            deps: DependencyGraph::new(),
            focus: Focus::new(),
            edit: EditSession::new(),
            pointer: PointerTracker::default(),
            settings,
            theme,
            viewport,
            host,
            editors,
        };
        view.relayout();
        log::debug!("Created {}x{} grid", dims.rows, dims.cols);
        Ok(view)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn model(&self) -> &GridDataModel {
        &self.model
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn viewport(&self) -> &V {
        &self.viewport
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn editors(&self) -> &E {
        &self.editors
    }

    pub fn editors_mut(&mut self) -> &mut E {
        &mut self.editors
    }

    pub fn settings(&self) -> &GridSettings {
        &self.settings
    }

    pub fn theme(&self) -> &GridTheme {
        &self.theme
    }

    pub fn set_theme(&mut self, theme: GridTheme) {
        self.theme = theme;
        self.host.invalidate(None);
    }

    pub fn dependencies(&self) -> &DependencyGraph {
        &self.deps
    }

    pub fn edit_session(&self) -> &EditSession {
        &self.edit
    }

    pub fn current_cell(&self) -> (i32, i32) {
        self.focus.current()
    }

    pub fn highlight(&self) -> GridRange {
        self.focus.highlight()
    }

    pub fn mouse_state(&self) -> MouseState {
        self.pointer.state
    }

    pub fn row_count(&self) -> i32 {
        self.model.row_count()
    }

    pub fn col_count(&self) -> i32 {
        self.model.col_count()
    }

    /// Window rectangle of a cell at the current scroll position.
    pub fn cell_rect(&self, row: i32, col: i32) -> Option<Rect> {
        self.layout.cell_rect(&self.model, &self.viewport, row, col)
    }

    pub fn cell_at(&self, x: i32, y: i32) -> Option<(i32, i32)> {
        self.layout.cell_at(&self.model, &self.viewport, x, y)
    }

    pub fn range_rect(&self, range: &GridRange) -> Rect {
        self.layout.range_rect(&self.model, &self.viewport, range)
    }

    // ========================================================================
    // Housekeeping
    // ========================================================================

    /// Recompute offsets; a clamped scroll position repaints everything.
    fn relayout(&mut self) {
        let before = self.viewport.content_offset();
        let client = self.host.client_rect();
        self.layout.update_sizes(&mut self.model, &self.settings, client, &mut self.viewport);
        if self.viewport.content_offset() != before {
            self.host.invalidate(None);
            self.reposition_editor();
        }
    }

    /// Shift painted pixels after the scroll position moved from `before`.
    fn sync_scroll(&mut self, before: Point) {
        let after = self.viewport.content_offset();
        if after == before {
            return;
        }
        let client = self.layout.client_rect();
        let cells = self.layout.cells_rect();
        if after.x != before.x {
            let clip = Rect::new(cells.left, client.top, client.right, client.bottom);
            self.host.scroll_window(before.x - after.x, 0, clip);
        }
        if after.y != before.y {
            let clip = Rect::new(client.left, cells.top, client.right, client.bottom);
            self.host.scroll_window(0, before.y - after.y, clip);
        }
        self.reposition_editor();
    }

    fn reposition_editor(&mut self) {
        let Some(active) = self.edit.active().copied() else {
            return;
        };
        if let Some(rect) = self.cell_rect(active.row, active.col) {
            let rect = rect.inset(self.settings.editor_inset_x, self.settings.editor_inset_y);
            self.editors.move_to(active.control, rect);
        }
    }

    /// Destroy controls released by removed cells, dropping any session
    /// bound to one of them.
    fn release_controls(&mut self) {
        for control in self.model.take_released_controls() {
            if self.edit.abandon(control) {
                log::debug!("Edit session abandoned with its control");
            }
            self.editors.destroy(control);
        }
    }

    fn invalidate_cell(&mut self, row: i32, col: i32) {
        if let Some(rect) = self.cell_rect(row, col) {
            self.host.invalidate(Some(rect));
        }
    }

    fn invalidate_range(&mut self, range: &GridRange) {
        let rect = self.range_rect(range);
        if !rect.is_empty() {
            self.host.invalidate(Some(rect));
        }
    }

    fn propagate(&mut self, range: &GridRange) -> usize {
        let headers_hit = self.deps.edges().any(|e| e.source.intersects(range) && e.target.touches_headers());
        let fired = self.deps.update_on_change(range, &mut self.model);
        if fired > 0 {
            self.release_controls();
            if headers_hit {
                self.relayout();
            }
            self.host.invalidate(None);
        }
        fired
    }

    fn table_size(&self) -> (i32, i32) {
        self.model.table().map_or((0, 0), |t| (t.width, t.height))
    }

    // ========================================================================
    // Selection and focus
    // ========================================================================

    /// Move the current cell (clamped) and scroll it into view. Emits
    /// FocusChanged only when the cell actually changed.
    pub fn set_current_cell(&mut self, row: i32, col: i32) {
        let (rows, cols) = (self.model.row_count(), self.model.col_count());
        let previous = self.focus.set_current(row, col, rows, cols);
        let (row, col) = self.focus.current();
        if let Some((old_row, old_col)) = previous {
            self.invalidate_cell(old_row, old_col);
            self.invalidate_cell(row, col);
        }
        self.make_cell_visible(row, col);
        if previous.is_some() {
            self.host.notify(GridNotification::FocusChanged { row, col });
        }
    }

    pub fn make_cell_visible(&mut self, row: i32, col: i32) {
        let Some(rect) = self.cell_rect(row, col) else {
            return;
        };
        let before = self.viewport.content_offset();
        self.layout.make_rect_visible(&self.model, &mut self.viewport, rect);
        self.sync_scroll(before);
    }

    /// Replace the highlighted range; the current cell is unchanged.
    pub fn set_highlight(&mut self, range: GridRange) {
        let old = self.focus.set_highlight(range);
        self.invalidate_range(&old);
        self.invalidate_range(&range);
    }

    pub fn extend_highlight_to(&mut self, row: i32, col: i32) {
        let (rows, cols) = (self.model.row_count(), self.model.col_count());
        if let Some(old) = self.focus.extend_highlight_to(row, col, rows, cols) {
            self.invalidate_range(&old);
            let new = self.focus.highlight();
            self.invalidate_range(&new);
        }
    }

    fn collapse_highlight(&mut self) {
        let (row, col) = self.focus.current();
        self.set_highlight(GridRange::single(row, col));
    }

    /// Keyboard move: new current cell with a 1x1 highlight.
    fn move_current(&mut self, row: i32, col: i32) {
        self.set_current_cell(row, col);
        self.collapse_highlight();
    }

    // ========================================================================
    // Editing
    // ========================================================================

    /// Open an editor on `(row, col)`. A live session is committed first.
    pub fn begin_edit(&mut self, row: i32, col: i32) -> GridResult<()> {
        if self.edit.is_editing() {
            self.end_edit(true)?;
        }
        let rect = self.cell_rect(row, col).ok_or(GridError::InvalidIndex { row, col })?;
        self.edit.begin(&mut self.model, &mut self.editors, row, col, rect, &self.settings)
    }

    /// Close the live editor. A commit runs dependency propagation over the
    /// edited cell and emits CellTextChanged.
    pub fn end_edit(&mut self, commit: bool) -> GridResult<()> {
        let ended = self.edit.end(&mut self.model, &mut self.editors, commit);
        self.release_controls();
        let Some((row, col)) = ended? else {
            return Ok(());
        };
        self.invalidate_cell(row, col);
        if commit {
            let range = GridRange::single(row, col);
            self.propagate(&range);
            self.host.notify(GridNotification::CellTextChanged { range });
        }
        Ok(())
    }

    pub fn on_editor_event(&mut self, event: EditorEvent) -> GridResult<()> {
        self.end_edit(event.commits())
    }

    fn commit_quietly(&mut self) {
        if let Err(e) = self.end_edit(true) {
            log::warn!("Commit of live edit failed: {}", e);
        }
    }

    // ========================================================================
    // Cell properties
    // ========================================================================

    /// Every position of `range` in the current grid, headers included.
    /// Bounded extents must lie inside the grid.
    fn range_positions(&self, range: &GridRange) -> GridResult<Vec<(i32, i32)>> {
        let check = |span: Span, count: i32, bad: (i32, i32)| match span {
            Span::Bounded { start, stop } if start < 0 || stop - 1 > count => Err(GridError::InvalidIndex { row: bad.0, col: bad.1 }),
            _ => Ok(()),
        };
        check(range.row_span(), self.model.row_count(), (range.row, range.col))?;
        check(range.col_span(), self.model.col_count(), (range.row, range.col))?;
        Ok(range.cells(self.model.row_count(), self.model.col_count()).collect())
    }

    /// Merge `cell` into every cell of `range`, creating missing cells of the
    /// payload's type. The whole range is validated before anything changes.
    pub fn set_cell_property(&mut self, range: &GridRange, cell: &GridCell) -> GridResult<()> {
        let positions = self.range_positions(range)?;
        let found = cell.cell_type();
        for &(row, col) in &positions {
            match self.model.value_at(row, col) {
                Some(existing) if existing.cell_type() != found => {
                    return Err(GridError::TypeMismatch { expected: existing.cell_type(), found });
                }
                None if cell.is_header() => {
                    return Err(GridError::InvalidArgument(format!(
                        "{} payload at data position ({}, {})",
                        found, row, col
                    )));
                }
                _ => {}
            }
        }

        for &(row, col) in &positions {
            match self.model.value_at_mut(row, col) {
                Some(existing) => existing.merge(cell)?,
                None => {
                    let mut created = GridCell::new(found);
                    created.merge(cell)?;
                    self.model.set_value_at(row, col, Some(created))?;
                }
            }
        }
        self.release_controls();

        self.host.notify(GridNotification::CellTextChanged { range: *range });
        self.host.invalidate(None);
        if range.row == 0 || range.col == 0 {
            self.relayout();
        }
        self.propagate(range);
        Ok(())
    }

    /// Read one cell through the default fallback. With `expected`, a
    /// differing variant is a TypeMismatch.
    pub fn get_cell_property(&self, row: i32, col: i32, expected: Option<CellType>) -> GridResult<CellSnapshot> {
        let cell = self.model.value_or_default_at(row, col).ok_or(GridError::InvalidIndex { row, col })?;
        if let Some(expected) = expected {
            if expected != cell.cell_type() {
                return Err(GridError::TypeMismatch { expected: cell.cell_type(), found: expected });
            }
        }
        Ok(CellSnapshot {
            cell: cell.clone(),
            text: cell.text_value(row, col),
            is_default: self.model.value_at(row, col).is_none(),
        })
    }

    /// Replace the format of every stored Number cell in `range`.
    pub fn set_num_format(&mut self, range: &GridRange, format: &str) -> GridResult<usize> {
        let positions = self.range_positions(range)?;
        let mut changed = 0;
        for (row, col) in positions {
            if let Some(cell) = self.model.value_at_mut(row, col) {
                if let CellPayload::Number(number) = &mut cell.payload {
                    number.format = Some(format.to_string());
                    changed += 1;
                }
            }
        }
        self.invalidate_range(range);
        Ok(changed)
    }

    // ========================================================================
    // Structural edits
    // ========================================================================

    fn check_header_spec(header: &Option<GridCell>) -> GridResult<()> {
        match header {
            Some(cell) if cell.cell_type() != CellType::Header => {
                Err(GridError::TypeMismatch { expected: CellType::Header, found: cell.cell_type() })
            }
            _ => Ok(()),
        }
    }

    /// Insert a row after `index` (clamped; out of range appends). `header`
    /// supplies the new row header's size and caption.
    pub fn add_row(&mut self, index: i32, header: Option<GridCell>) -> GridResult<i32> {
        Self::check_header_spec(&header)?;
        if self.edit.is_editing() {
            self.commit_quietly();
        }
        let row = self.model.add_new_row(index);
        if index >= 0 {
            self.focus.row_inserted(index);
        }
        if let Some(header) = header {
            self.model.set_value_at(row, 0, Some(header))?;
        }
        self.relayout();

        let client = self.layout.client_rect();
        let cells = self.layout.cells_rect();
        if let Some((top, bottom)) = self.layout.row_extent(&self.model, &self.viewport, row) {
            let height = bottom - top;
            let strip = Rect::new(client.left, cells.top, cells.left, cells.bottom);
            if top <= cells.top {
                self.host.invalidate(Some(strip));
                self.host.scroll_window(0, height, Rect::new(client.left, cells.top, client.right, client.bottom));
            } else if top < cells.bottom {
                self.host.invalidate(Some(strip));
                self.host.scroll_window(0, height, Rect::new(client.left, top, client.right, client.bottom));
            }
        }

        if self.focus.current().0 >= row {
            self.collapse_highlight();
        }
        Ok(row)
    }

    pub fn add_column(&mut self, index: i32, header: Option<GridCell>) -> GridResult<i32> {
        Self::check_header_spec(&header)?;
        if self.edit.is_editing() {
            self.commit_quietly();
        }
        let col = self.model.add_new_col(index);
        if index >= 0 {
            self.focus.col_inserted(index);
        }
        if let Some(header) = header {
            self.model.set_value_at(0, col, Some(header))?;
        }
        self.relayout();

        let client = self.layout.client_rect();
        let cells = self.layout.cells_rect();
        if let Some((left, right)) = self.layout.col_extent(&self.model, &self.viewport, col) {
            let width = right - left;
            let strip = Rect::new(cells.left, client.top, cells.right, cells.top);
            if left <= cells.left {
                self.host.invalidate(Some(strip));
                self.host.scroll_window(width, 0, Rect::new(cells.left, client.top, client.right, client.bottom));
            } else if left < cells.right {
                self.host.invalidate(Some(strip));
                self.host.scroll_window(width, 0, Rect::new(left, client.top, client.right, client.bottom));
            }
        }

        if self.focus.current().1 >= col {
            self.collapse_highlight();
        }
        Ok(col)
    }

    /// Remove row `row`. The last remaining row is never removed: its cells
    /// are cleared and the current cell returns to (1, 1).
    pub fn delete_row(&mut self, row: i32) -> GridResult<()> {
        let rows = self.model.row_count();
        if row < 1 || row > rows {
            log::warn!("delete_row out of range: {}", row);
            return Err(GridError::InvalidIndex { row, col: 0 });
        }
        if self.edit.is_editing() {
            self.commit_quietly();
        }
        if rows == 1 {
            self.model.clear_row(1);
            self.release_controls();
            self.host.invalidate(None);
            self.set_current_cell(1, 1);
            return Ok(());
        }

        let old = self.layout.row_extent(&self.model, &self.viewport, row);
        self.model.delete_row(row)?;
        self.release_controls();
        self.focus.row_deleted(row, self.model.row_count());
        self.relayout();

        let client = self.layout.client_rect();
        let cells = self.layout.cells_rect();
        if let Some((top, bottom)) = old {
            let height = bottom - top;
            let strip = Rect::new(client.left, cells.top, cells.left, cells.bottom);
            if top <= cells.top {
                self.host.invalidate(Some(strip));
                self.host.scroll_window(0, -height, Rect::new(client.left, cells.top, client.right, client.bottom));
            } else if top < cells.bottom {
                self.host.invalidate(Some(strip));
                self.host.scroll_window(0, -height, Rect::new(client.left, top, client.right, client.bottom));
            }
        }

        if self.focus.current().0 >= row {
            self.collapse_highlight();
        }
        Ok(())
    }

    pub fn delete_column(&mut self, col: i32) -> GridResult<()> {
        let cols = self.model.col_count();
        if col < 1 || col > cols {
            log::warn!("delete_column out of range: {}", col);
            return Err(GridError::InvalidIndex { row: 0, col });
        }
        if self.edit.is_editing() {
            self.commit_quietly();
        }
        if cols == 1 {
            self.model.clear_col(1);
            self.release_controls();
            self.host.invalidate(None);
            self.set_current_cell(1, 1);
            return Ok(());
        }

        let old = self.layout.col_extent(&self.model, &self.viewport, col);
        self.model.delete_col(col)?;
        self.release_controls();
        self.focus.col_deleted(col, self.model.col_count());
        self.relayout();

        let client = self.layout.client_rect();
        let cells = self.layout.cells_rect();
        if let Some((left, right)) = old {
            let width = right - left;
            let strip = Rect::new(cells.left, client.top, cells.right, cells.top);
            if left <= cells.left {
                self.host.invalidate(Some(strip));
                self.host.scroll_window(-width, 0, Rect::new(cells.left, client.top, client.right, client.bottom));
            } else if left < cells.right {
                self.host.invalidate(Some(strip));
                self.host.scroll_window(-width, 0, Rect::new(left, client.top, client.right, client.bottom));
            }
        }

        if self.focus.current().1 >= col {
            self.collapse_highlight();
        }
        Ok(())
    }

    // ========================================================================
    // Sizes
    // ========================================================================

    /// Set a row height; index 0 is the column-header strip.
    pub fn set_row_height(&mut self, row: i32, height: i32) -> GridResult<()> {
        if row < 0 || row > self.model.row_count() {
            return Err(GridError::InvalidIndex { row, col: 0 });
        }
        if height < 0 {
            return Err(GridError::InvalidArgument(format!("negative row height {}", height)));
        }
        let old = self.layout.row_extent(&self.model, &self.viewport, row);
        let delta = if row == 0 {
            let table = self.model.table_mut().ok_or(GridError::InvalidIndex { row, col: 0 })?;
            let delta = height - table.height;
            table.height = height;
            delta
        } else {
            let header = self.model.row_header_mut(row).ok_or(GridError::InvalidIndex { row, col: 0 })?;
            let delta = height - header.size;
            header.size = height;
            header.end_offset += delta;
            delta
        };
        self.relayout();
        log::debug!("Row {} height -> {} ({:+})", row, height, delta);

        if row == 0 {
            self.host.invalidate(None);
        } else if let Some((top, bottom)) = old {
            let client = self.layout.client_rect();
            let cells = self.layout.cells_rect();
            if top >= cells.top && top <= cells.bottom {
                self.host.scroll_window(0, delta, Rect::new(client.left, bottom, client.right, client.bottom));
                self.host.invalidate(Some(Rect::new(client.left, top, client.right, bottom.max(bottom + delta))));
            } else if top < cells.top {
                self.host.scroll_window(0, delta, Rect::new(client.left, cells.top, client.right, client.bottom));
            }
        }
        self.reposition_editor();
        Ok(())
    }

    pub fn get_row_height(&self, row: i32) -> GridResult<i32> {
        if row == 0 {
            return self.model.table().map(|t| t.height).ok_or(GridError::InvalidIndex { row, col: 0 });
        }
        self.model.row_header(row).map(|h| h.size).ok_or(GridError::InvalidIndex { row, col: 0 })
    }

    /// Set a column width; index 0 is the row-header strip.
    pub fn set_col_width(&mut self, col: i32, width: i32) -> GridResult<()> {
        if col < 0 || col > self.model.col_count() {
            return Err(GridError::InvalidIndex { row: 0, col });
        }
        if width < 0 {
            return Err(GridError::InvalidArgument(format!("negative column width {}", width)));
        }
        let old = self.layout.col_extent(&self.model, &self.viewport, col);
        let delta = if col == 0 {
            let table = self.model.table_mut().ok_or(GridError::InvalidIndex { row: 0, col })?;
            let delta = width - table.width;
            table.width = width;
            delta
        } else {
            let header = self.model.col_header_mut(col).ok_or(GridError::InvalidIndex { row: 0, col })?;
            let delta = width - header.size;
            header.size = width;
            header.end_offset += delta;
            delta
        };
        self.relayout();
        log::debug!("Column {} width -> {} ({:+})", col, width, delta);

        if col == 0 {
            self.host.invalidate(None);
        } else if let Some((left, right)) = old {
            let client = self.layout.client_rect();
            let cells = self.layout.cells_rect();
            if right >= cells.left && left <= cells.right {
                self.host.scroll_window(delta, 0, Rect::new(right, client.top, client.right, client.bottom));
                self.host.invalidate(Some(Rect::new(left, client.top, right.max(right + delta), client.bottom)));
            }
            if left < cells.left {
                self.host.scroll_window(delta, 0, Rect::new(cells.left, client.top, client.right, client.bottom));
            }
        }
        self.reposition_editor();
        Ok(())
    }

    pub fn get_col_width(&self, col: i32) -> GridResult<i32> {
        if col == 0 {
            return self.model.table().map(|t| t.width).ok_or(GridError::InvalidIndex { row: 0, col });
        }
        self.model.col_header(col).map(|h| h.size).ok_or(GridError::InvalidIndex { row: 0, col })
    }

    // ========================================================================
    // Dependencies
    // ========================================================================

    /// Register a dependency and run it once to initialize the target.
    pub fn add_dependency(
        &mut self,
        source: GridRange,
        target: GridRange,
        callback: DependencyCallback,
        user_data: usize,
    ) -> GridResult<DependencyId> {
        let id = self.deps.add(source, target, callback, user_data)?;
        self.propagate(&source);
        Ok(id)
    }

    pub fn delete_dependency(&mut self, id: DependencyId) -> GridResult<()> {
        self.deps.delete(id)
    }

    // ========================================================================
    // Painting
    // ========================================================================

    pub fn paint(&mut self, surface: &mut dyn Surface) {
        if let Some(rect) = self.edit.control().and_then(|c| self.editors.rect(c)) {
            surface.exclude_clip(rect);
        }
        let (rows, cols) = (self.model.row_count(), self.model.col_count());
        for row in 1..=rows {
            for col in 1..=cols {
                self.paint_cell(surface, row, col);
            }
        }
        for row in 0..=rows {
            self.paint_cell(surface, row, 0);
        }
        for col in 1..=cols {
            self.paint_cell(surface, 0, col);
        }
        self.release_controls();
    }

    /// A toggle or drop-down opened over a default-displayed cell is not
    /// attached to any stored cell; it goes away when the cell leaves the
    /// cells area.
    fn drop_hidden_default_editor(&mut self, row: i32, col: i32) {
        let Some(active) = self.edit.active().copied() else {
            return;
        };
        let windowed = matches!(active.kind, EditorKind::Toggle | EditorKind::DropDown);
        if (active.row, active.col) == (row, col) && active.is_default && windowed && self.model.value_at(row, col).is_none() {
            log::debug!("Dropping editor of scrolled-out default cell ({}, {})", row, col);
            self.edit.abandon(active.control);
            self.editors.destroy(active.control);
        }
    }

    fn paint_cell(&mut self, surface: &mut dyn Surface, row: i32, col: i32) {
        let Some(rect) = self.cell_rect(row, col) else {
            return;
        };
        let cells_rect = self.layout.cells_rect();

        let scrolled_out = self.model.value_at(row, col).is_some_and(|c| c.has_invisible_draw()) && !rect.intersects(&cells_rect);
        if scrolled_out {
            let released = self.model.value_at_mut(row, col).and_then(GridCell::invisible_draw);
            if let Some(control) = released {
                self.edit.abandon(control);
                self.editors.destroy(control);
            }
            return;
        }
        if !rect.intersects(&cells_rect) {
            self.drop_hidden_default_editor(row, col);
        }
        if !rect.intersects(&self.layout.client_rect()) {
            return;
        }

        let Some(cell) = self.model.value_or_default_at(row, col) else {
            return;
        };
        let state = CellPaintState {
            current: self.focus.current() == (row, col),
            highlighted: self.focus.highlight().contains(row, col),
        };
        draw_cell(surface, cell, row, col, rect, state, &self.theme);
    }

    // ========================================================================
    // Pointer input
    // ========================================================================

    fn tracking_line_row(&mut self, y: i32) {
        let client = self.layout.client_rect();
        self.host.draw_tracking_line(Point::new(client.left, y), Point::new(client.right, y));
    }

    fn tracking_line_col(&mut self, x: i32) {
        let client = self.layout.client_rect();
        self.host.draw_tracking_line(Point::new(x, client.top), Point::new(x, client.bottom));
    }

    pub fn on_lbutton_down(&mut self, x: i32, y: i32) {
        let hit = self.cell_at(x, y);

        if let Some(control) = self.edit.control() {
            let inside = self.editors.rect(control).is_some_and(|r| r.contains(x, y));
            if !inside {
                self.commit_quietly();
                if let Some((row, col)) = hit {
                    self.set_current_cell(row, col);
                    let (row, col) = self.focus.current();
                    self.set_highlight(GridRange::single(row, col));
                }
            }
            return;
        }

        let Some((row, col)) = hit else {
            return;
        };
        let Some(rect) = self.cell_rect(row, col) else {
            return;
        };
        if !self.host.has_capture() {
            self.host.set_capture();
        }

        let state = MouseState::classify(row, col, rect, x, y, self.settings.resize_grip);
        self.pointer.state = state;
        match state {
            MouseState::CellSelect => {
                self.set_highlight(GridRange::single(row, col));
                self.set_current_cell(row, col);
                self.host.notify(GridNotification::CellClick { row, col });
            }
            MouseState::RowSelect => {
                self.set_highlight(GridRange::entire_row(row, col));
                self.set_current_cell(row, 1);
                self.host.notify(GridNotification::HeaderMouseDown { row, col });
            }
            MouseState::ColumnSelect => {
                self.set_highlight(GridRange::entire_col(row, col));
                self.set_current_cell(1, col);
                self.host.notify(GridNotification::HeaderMouseDown { row, col });
            }
            MouseState::RowResize { .. } => {
                self.tracking_line_row(y);
                self.pointer.drag_pos = y;
            }
            MouseState::ColumnResize { .. } => {
                self.tracking_line_col(x);
                self.pointer.drag_pos = x;
            }
            MouseState::Default => {}
        }
    }

    pub fn on_lbutton_up(&mut self, x: i32, y: i32) {
        if self.host.has_capture() {
            self.host.release_capture();
        } else if self.edit.is_editing() {
            return;
        }

        let tracker = self.pointer;
        self.pointer.reset();
        match tracker.state {
            MouseState::RowSelect | MouseState::ColumnSelect => {
                let (row, col) = self.focus.current();
                self.host.notify(GridNotification::HeaderMouseUp { row, col });
            }
            MouseState::RowResize { index } => {
                self.tracking_line_row(tracker.drag_pos);
                let y = y.max(tracker.drag_pos);
                if let Some((top, _)) = self.layout.row_extent(&self.model, &self.viewport, index) {
                    if let Err(e) = self.set_row_height(index, y - top + 2) {
                        log::warn!("Row resize failed: {}", e);
                    }
                }
            }
            MouseState::ColumnResize { index } => {
                self.tracking_line_col(tracker.drag_pos);
                let x = x.max(tracker.drag_pos);
                if let Some((left, _)) = self.layout.col_extent(&self.model, &self.viewport, index) {
                    if let Err(e) = self.set_col_width(index, x - left + 2) {
                        log::warn!("Column resize failed: {}", e);
                    }
                }
            }
            MouseState::CellSelect | MouseState::Default => {}
        }
    }

    pub fn on_mouse_move(&mut self, x: i32, y: i32) {
        if self.edit.is_editing() {
            return;
        }
        let (x, y) = if self.host.has_capture() {
            let client = self.layout.client_rect();
            (x.clamp(0, client.width().max(0)), y.clamp(0, client.height().max(0)))
        } else {
            (x, y)
        };

        match self.pointer.state {
            MouseState::CellSelect => self.drag_cells(x, y),
            MouseState::RowSelect => {
                let (Some(row), Some(_)) = (
                    self.layout.row_at(&self.model, &self.viewport, y),
                    self.layout.col_at(&self.model, &self.viewport, x),
                ) else {
                    return;
                };
                let row = row.max(1);
                let anchor = self.focus.highlight();
                let height = row - anchor.row + if row >= anchor.row { 1 } else { -1 };
                self.set_highlight(GridRange::new(anchor.row, anchor.col, -1, height));
                self.set_current_cell(row, 1);
            }
            MouseState::ColumnSelect => {
                let (Some(_), Some(col)) = (
                    self.layout.row_at(&self.model, &self.viewport, y),
                    self.layout.col_at(&self.model, &self.viewport, x),
                ) else {
                    return;
                };
                let col = col.max(1);
                let anchor = self.focus.highlight();
                let width = col - anchor.col + if col >= anchor.col { 1 } else { -1 };
                self.set_highlight(GridRange::new(anchor.row, anchor.col, width, -1));
                self.set_current_cell(1, col);
            }
            MouseState::RowResize { index } => {
                let Some((top, _)) = self.layout.row_extent(&self.model, &self.viewport, index) else {
                    return;
                };
                if y <= top {
                    return;
                }
                self.tracking_line_row(self.pointer.drag_pos);
                self.tracking_line_row(y);
                self.pointer.drag_pos = y;
            }
            MouseState::ColumnResize { index } => {
                let Some((left, _)) = self.layout.col_extent(&self.model, &self.viewport, index) else {
                    return;
                };
                if x <= left {
                    return;
                }
                self.tracking_line_col(self.pointer.drag_pos);
                self.tracking_line_col(x);
                self.pointer.drag_pos = x;
            }
            MouseState::Default => {
                let shape = match self.cell_at(x, y) {
                    Some((row, col)) => match self.cell_rect(row, col) {
                        Some(rect) => CursorShape::for_hover(row, col, rect, x, y, self.settings.resize_grip),
                        None => Some(CursorShape::Default),
                    },
                    None => Some(CursorShape::Default),
                };
                if let Some(shape) = shape {
                    self.host.set_cursor(shape);
                }
            }
        }
    }

    /// CellSelect drag: over a header strip, snap to the neighboring data
    /// row/column.
    fn drag_cells(&mut self, x: i32, y: i32) {
        let (Some(mut row), Some(mut col)) = (
            self.layout.row_at(&self.model, &self.viewport, y),
            self.layout.col_at(&self.model, &self.viewport, x),
        ) else {
            return;
        };
        let (table_w, table_h) = self.table_size();
        if row == 0 {
            if let Some(below) = self.layout.row_at(&self.model, &self.viewport, y + table_h) {
                if below != 1 {
                    row = below - 1;
                }
            }
        }
        if col == 0 {
            if let Some(right) = self.layout.col_at(&self.model, &self.viewport, x + table_w) {
                if right != 1 {
                    col = right - 1;
                }
            }
        }
        if row < 1 || col < 1 {
            return;
        }
        self.extend_highlight_to(row, col);
        self.set_current_cell(row, col);
    }

    pub fn on_lbutton_dblclk(&mut self, x: i32, y: i32) {
        let Some((row, col)) = self.cell_at(x, y) else {
            return;
        };
        if row < 1 || col < 1 {
            return;
        }
        self.set_current_cell(row, col);
        self.set_highlight(GridRange::single(row, col));
        if let Err(e) = self.begin_edit(row, col) {
            log::debug!("No editor for ({}, {}): {}", row, col, e);
        }
        self.host.notify(GridNotification::CellDoubleClick { row, col });
    }

    // ========================================================================
    // Keyboard and scrolling
    // ========================================================================

    /// Navigation keys. Ignored while an editor is live (the editor owns the
    /// keyboard then). Every key reaching the grid emits KeyDown.
    pub fn on_key_down(&mut self, key: Key, shift: bool) {
        if self.edit.is_editing() {
            return;
        }
        let (row, col) = self.focus.current();
        let (end_row, end_col) = self.focus.highlight_end();
        let cols = self.model.col_count();

        match key {
            Key::Tab => self.move_current(row, col + 1),
            Key::Enter => self.move_current(row + 1, col),
            Key::Up | Key::Down | Key::Left | Key::Right => {
                if let Some((dr, dc)) = key.arrow_delta() {
                    if shift {
                        self.extend_highlight_to(end_row + dr, end_col + dc);
                    } else {
                        self.move_current(row + dr, col + dc);
                    }
                }
            }
            Key::Home => {
                if shift {
                    self.extend_highlight_to(end_row, 1);
                } else {
                    self.move_current(row, 1);
                }
            }
            Key::End => {
                if shift {
                    self.extend_highlight_to(end_row, cols);
                } else {
                    self.move_current(row, cols);
                }
            }
            Key::PageDown => {
                let rows = self.model.row_count();
                let client = self.layout.client_rect();
                let last = self.layout.row_extent(&self.model, &self.viewport, rows);
                let probe = match last {
                    Some((_, bottom)) if client.bottom > bottom => bottom - 1,
                    _ => client.bottom - 1,
                };
                let target = self.layout.row_at(&self.model, &self.viewport, probe).unwrap_or(rows).max(1);
                self.on_vscroll(ScrollRequest::PageDown);
                if shift {
                    self.extend_highlight_to(target, end_col);
                } else {
                    self.move_current(target, col);
                }
            }
            Key::PageUp => {
                let (_, table_h) = self.table_size();
                let target = self.layout.row_at(&self.model, &self.viewport, table_h).unwrap_or(1).max(1);
                self.on_vscroll(ScrollRequest::PageUp);
                if shift {
                    self.extend_highlight_to(target, end_col);
                } else {
                    self.move_current(target, col);
                }
            }
            Key::Escape => {
                if !self.focus.highlight().is_empty() {
                    self.collapse_highlight();
                }
            }
            Key::Other(_) => {}
        }
        self.host.notify(GridNotification::KeyDown { key });
    }

    /// Type-to-edit. Returns whether an editor was opened.
    pub fn on_char(&mut self, ch: char) -> bool {
        if self.edit.is_editing() || !starts_edit(ch) {
            return false;
        }
        let (row, col) = self.focus.current();
        self.make_cell_visible(row, col);
        match self.begin_edit(row, col) {
            Ok(()) => true,
            Err(e) => {
                log::debug!("Type-to-edit refused at ({}, {}): {}", row, col, e);
                false
            }
        }
    }

    fn scroll_target(request: ScrollRequest, offset: i32, line: i32, page: i32, content: i32) -> i32 {
        match request {
            ScrollRequest::LineUp => offset - line,
            ScrollRequest::LineDown => offset + line,
            ScrollRequest::PageUp => offset - page.max(1),
            ScrollRequest::PageDown => offset + page.max(1),
            ScrollRequest::Top => 0,
            ScrollRequest::Bottom => content,
            ScrollRequest::ThumbTo(pos) => pos,
        }
    }

    pub fn on_hscroll(&mut self, request: ScrollRequest) {
        if self.edit.is_editing() {
            self.commit_quietly();
        }
        let before = self.viewport.content_offset();
        let x = Self::scroll_target(
            request,
            before.x,
            self.settings.default_column_width,
            self.viewport.visible_size().0,
            self.viewport.content_size().0,
        );
        self.viewport.set_content_pos(x, before.y);
        self.sync_scroll(before);
    }

    pub fn on_vscroll(&mut self, request: ScrollRequest) {
        if self.edit.is_editing() {
            self.commit_quietly();
        }
        let before = self.viewport.content_offset();
        let y = Self::scroll_target(
            request,
            before.y,
            self.settings.default_row_height,
            self.viewport.visible_size().1,
            self.viewport.content_size().1,
        );
        self.viewport.set_content_pos(before.x, y);
        self.sync_scroll(before);
    }

    /// The host window was resized.
    pub fn on_size_changed(&mut self) {
        self.relayout();
        self.reposition_editor();
        self.host.invalidate(None);
    }
}
