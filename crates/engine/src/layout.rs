//! Row/column geometry, hit testing and scroll synchronization.
//!
//! Header sizes are prefix-summed into each header's `end_offset`. Offsets
//! are in content coordinates, which start at the window origin and include
//! the header strips: row 1 begins at the table header height, column 1 at
//! the table header width. The header strips themselves never scroll.
//!
//! ```text
//!  0        tw        end(1)    end(2)
//!  +--------+---------+---------+
//!  | table  | col 1   | col 2   |   th
//!  +--------+---------+---------+
//!  | row 1  |         |         |   end(1)
//! ```

use gridview_config::GridSettings;
use gridview_core::{GridRange, Point, Rect, Span};

use crate::model::GridDataModel;

// ============================================================================
// Viewport
// ============================================================================

/// Scrollable-viewport helper.
///
/// The scroll position lives in "scroll space", which starts at the first
/// data pixel (content coordinates minus the header strip).
pub trait Viewport {
    /// Current scroll position.
    fn content_offset(&self) -> Point;

    /// Size of the scrollable cells area.
    fn visible_size(&self) -> (i32, i32);

    fn content_size(&self) -> (i32, i32);

    fn set_visible_size(&mut self, width: i32, height: i32);

    /// Also clamps the scroll position into the new bounds.
    fn set_content_size(&mut self, width: i32, height: i32);

    fn set_content_pos(&mut self, x: i32, y: i32);

    /// Scroll the minimum distance that brings `(x, y)` (scroll space) into
    /// view.
    fn make_pos_visible(&mut self, x: i32, y: i32);

    fn content_to_window(&self, x: i32, y: i32) -> (i32, i32) {
        let offset = self.content_offset();
        (x - offset.x, y - offset.y)
    }

    fn window_to_content(&self, x: i32, y: i32) -> (i32, i32) {
        let offset = self.content_offset();
        (x + offset.x, y + offset.y)
    }
}

/// Default in-process viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrolledViewport {
    offset: Point,
    visible: (i32, i32),
    content: (i32, i32),
}

impl ScrolledViewport {
    pub fn new() -> Self {
        Self::default()
    }

    fn clamp_axis(pos: i32, content: i32, visible: i32) -> i32 {
        if content <= visible {
            0
        } else {
            pos.clamp(0, content - visible)
        }
    }

    fn reveal_axis(offset: i32, pos: i32, content: i32, visible: i32) -> i32 {
        let pos = pos.clamp(0, (content - 1).max(0));
        let offset = if pos < offset {
            pos
        } else if pos > offset + visible - 1 {
            pos - visible + 1
        } else {
            offset
        };
        Self::clamp_axis(offset, content, visible)
    }

    fn reclamp(&mut self) {
        self.offset.x = Self::clamp_axis(self.offset.x, self.content.0, self.visible.0);
        self.offset.y = Self::clamp_axis(self.offset.y, self.content.1, self.visible.1);
    }
}

impl Viewport for ScrolledViewport {
    fn content_offset(&self) -> Point {
        self.offset
    }

    fn visible_size(&self) -> (i32, i32) {
        self.visible
    }

    fn content_size(&self) -> (i32, i32) {
        self.content
    }

    fn set_visible_size(&mut self, width: i32, height: i32) {
        self.visible = (width.max(0), height.max(0));
        self.reclamp();
    }

    fn set_content_size(&mut self, width: i32, height: i32) {
        self.content = (width.max(0), height.max(0));
        self.reclamp();
    }

    fn set_content_pos(&mut self, x: i32, y: i32) {
        self.offset = Point::new(x, y);
        self.reclamp();
    }

    fn make_pos_visible(&mut self, x: i32, y: i32) {
        self.offset.x = Self::reveal_axis(self.offset.x, x, self.content.0, self.visible.0);
        self.offset.y = Self::reveal_axis(self.offset.y, y, self.content.1, self.visible.1);
    }
}

// ============================================================================
// Layout
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Layout {
    client: Rect,
    cells_rect: Rect,
}

impl Layout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Client rectangle minus the header strips.
    pub fn cells_rect(&self) -> Rect {
        self.cells_rect
    }

    pub fn client_rect(&self) -> Rect {
        self.client
    }

    /// Recompute every cumulative offset and push the new content and
    /// visible sizes to the viewport. O(rows + cols).
    ///
    /// A table header size <= 0 is replaced by the configured fallback; a
    /// header size < 0 is replaced by the table header's size. Both
    /// replacements are stored.
    pub fn update_sizes(
        &mut self,
        model: &mut GridDataModel,
        settings: &GridSettings,
        client: Rect,
        viewport: &mut dyn Viewport,
    ) {
        let (table_w, table_h) = match model.table_mut() {
            Some(table) => {
                table.width = settings.effective_header_width(table.width);
                table.height = settings.effective_header_height(table.height);
                (table.width, table.height)
            }
            None => (settings.table_header_width, settings.table_header_height),
        };

        let mut end = table_h;
        for row in 1..=model.row_count() {
            if let Some(header) = model.row_header_mut(row) {
                if header.size < 0 {
                    header.size = table_h;
                }
                end += header.size;
                header.end_offset = end;
            }
        }
        let content_h = end - table_h;

        let mut end = table_w;
        for col in 1..=model.col_count() {
            if let Some(header) = model.col_header_mut(col) {
                if header.size < 0 {
                    header.size = table_w;
                }
                end += header.size;
                header.end_offset = end;
            }
        }
        let content_w = end - table_w;

        self.client = client;
        let left = (client.left + table_w).min(client.right);
        let top = (client.top + table_h).min(client.bottom);
        self.cells_rect = Rect::new(left, top, client.right.max(left), client.bottom.max(top));

        viewport.set_visible_size(self.cells_rect.width(), self.cells_rect.height());
        viewport.set_content_size(content_w, content_h);
    }

    fn table_size(model: &GridDataModel) -> (i32, i32) {
        model.table().map_or((0, 0), |t| (t.width, t.height))
    }

    /// Content-space end offset of `row` (0 = the column-header strip).
    pub fn row_end(model: &GridDataModel, row: i32) -> Option<i32> {
        if row == 0 {
            return Some(Self::table_size(model).1);
        }
        model.row_header(row).map(|h| h.end_offset)
    }

    pub fn col_end(model: &GridDataModel, col: i32) -> Option<i32> {
        if col == 0 {
            return Some(Self::table_size(model).0);
        }
        model.col_header(col).map(|h| h.end_offset)
    }

    /// Window-space `(top, bottom)` of `row`.
    pub fn row_extent(&self, model: &GridDataModel, viewport: &dyn Viewport, row: i32) -> Option<(i32, i32)> {
        let bottom = Self::row_end(model, row)?;
        let top = match row {
            0 => return Some((0, bottom)),
            1 => Self::table_size(model).1,
            r => Self::row_end(model, r - 1)?,
        };
        let offset = viewport.content_offset().y;
        Some((top - offset, bottom - offset))
    }

    /// Window-space `(left, right)` of `col`.
    pub fn col_extent(&self, model: &GridDataModel, viewport: &dyn Viewport, col: i32) -> Option<(i32, i32)> {
        let right = Self::col_end(model, col)?;
        let left = match col {
            0 => return Some((0, right)),
            1 => Self::table_size(model).0,
            c => Self::col_end(model, c - 1)?,
        };
        let offset = viewport.content_offset().x;
        Some((left - offset, right - offset))
    }

    /// Window rectangle of a cell; header strips are not scrolled.
    pub fn cell_rect(&self, model: &GridDataModel, viewport: &dyn Viewport, row: i32, col: i32) -> Option<Rect> {
        let (top, bottom) = self.row_extent(model, viewport, row)?;
        let (left, right) = self.col_extent(model, viewport, col)?;
        Some(Rect::new(left, top, right, bottom))
    }

    /// Row under window y, or `None` past the last row.
    pub fn row_at(&self, model: &GridDataModel, viewport: &dyn Viewport, y: i32) -> Option<i32> {
        let table_h = Self::table_size(model).1;
        if y < table_h {
            return Some(0);
        }
        let offset = viewport.content_offset().y;
        (1..=model.row_count()).find(|&row| Self::row_end(model, row).is_some_and(|end| y < end - offset))
    }

    /// Column under window x, or `None` past the last column.
    pub fn col_at(&self, model: &GridDataModel, viewport: &dyn Viewport, x: i32) -> Option<i32> {
        let table_w = Self::table_size(model).0;
        if x < table_w {
            return Some(0);
        }
        let offset = viewport.content_offset().x;
        (1..=model.col_count()).find(|&col| Self::col_end(model, col).is_some_and(|end| x < end - offset))
    }

    pub fn cell_at(&self, model: &GridDataModel, viewport: &dyn Viewport, x: i32, y: i32) -> Option<(i32, i32)> {
        Some((self.row_at(model, viewport, y)?, self.col_at(model, viewport, x)?))
    }

    /// Window rectangle covering a range. Whole-axis extents cover the cells
    /// area along that axis.
    pub fn range_rect(&self, model: &GridDataModel, viewport: &dyn Viewport, range: &GridRange) -> Rect {
        if range.is_empty() {
            return Rect::empty();
        }
        let rows = match range.row_span() {
            Span::Whole => Some((self.cells_rect.top, self.cells_rect.bottom)),
            span => span.clamp_to(model.row_count()).and_then(|r| {
                let (top, _) = self.row_extent(model, viewport, *r.start())?;
                let (_, bottom) = self.row_extent(model, viewport, *r.end())?;
                Some((top, bottom))
            }),
        };
        let cols = match range.col_span() {
            Span::Whole => Some((self.cells_rect.left, self.cells_rect.right)),
            span => span.clamp_to(model.col_count()).and_then(|c| {
                let (left, _) = self.col_extent(model, viewport, *c.start())?;
                let (_, right) = self.col_extent(model, viewport, *c.end())?;
                Some((left, right))
            }),
        };
        match (rows, cols) {
            (Some((top, bottom)), Some((left, right))) => Rect::new(left, top, right, bottom),
            _ => Rect::empty(),
        }
    }

    /// Scroll so the window rectangle `rect` lies inside the cells area.
    /// A rectangle larger than the area keeps its top-left corner visible.
    pub fn make_rect_visible(&self, model: &GridDataModel, viewport: &mut dyn Viewport, rect: Rect) {
        let (table_w, table_h) = Self::table_size(model);
        let (left, top) = viewport.window_to_content(rect.left, rect.top);
        let (left, top) = (left - table_w, top - table_h);
        let (visible_w, visible_h) = viewport.visible_size();
        let width = rect.width().min(visible_w).max(1);
        let height = rect.height().min(visible_h).max(1);

        viewport.make_pos_visible(left + width - 1, top + height - 1);
        viewport.make_pos_visible(left, top);
    }
}
