//! Pointer and keyboard input state.
//!
//! The pointer gesture is a single enum value owned by the view; capture and
//! the resize tracking line are tracked beside it. The handlers that drive
//! the transitions live on [`GridView`](crate::view::GridView).

use gridview_core::Rect;

/// Pointer gesture in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MouseState {
    #[default]
    Default,
    CellSelect,
    RowSelect,
    ColumnSelect,
    /// Dragging the bottom edge of row `index`.
    RowResize { index: i32 },
    /// Dragging the right edge of column `index`.
    ColumnResize { index: i32 },
}

impl MouseState {
    /// Classify a pointer-down on `(row, col)` whose window rectangle is
    /// `rect`. The last `grip` pixels of a header are its resize handle.
    pub fn classify(row: i32, col: i32, rect: Rect, x: i32, y: i32, grip: i32) -> MouseState {
        if row == 0 {
            if col >= 1 && x >= rect.right - grip {
                MouseState::ColumnResize { index: col }
            } else {
                MouseState::ColumnSelect
            }
        } else if col == 0 {
            if y >= rect.bottom - grip {
                MouseState::RowResize { index: row }
            } else {
                MouseState::RowSelect
            }
        } else {
            MouseState::CellSelect
        }
    }

    pub fn is_resize(&self) -> bool {
        matches!(self, MouseState::RowResize { .. } | MouseState::ColumnResize { .. })
    }
}

/// Per-gesture pointer bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerTracker {
    pub state: MouseState,
    /// Last drawn tracking line position (window y for rows, x for columns).
    pub drag_pos: i32,
}

impl PointerTracker {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Keys the grid reacts to. Everything else arrives as `Other` and only
/// produces a key-down notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Tab,
    Enter,
    Escape,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Other(u32),
}

impl Key {
    /// Row/column step of an arrow key.
    pub fn arrow_delta(self) -> Option<(i32, i32)> {
        match self {
            Key::Up => Some((-1, 0)),
            Key::Down => Some((1, 0)),
            Key::Left => Some((0, -1)),
            Key::Right => Some((0, 1)),
            _ => None,
        }
    }
}

/// Pointer shape requested while hovering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorShape {
    #[default]
    Default,
    /// Over a column header's right edge.
    SplitVertical,
    /// Over a row header's bottom edge.
    SplitHorizontal,
}

impl CursorShape {
    /// Hover shape for `(row, col)` with window rectangle `rect`. `None`
    /// leaves the current shape alone (the table header corner).
    pub fn for_hover(row: i32, col: i32, rect: Rect, x: i32, y: i32, grip: i32) -> Option<CursorShape> {
        match (row, col) {
            (0, 0) => None,
            (0, _) if x >= rect.right - grip && x <= rect.right => Some(CursorShape::SplitVertical),
            (_, 0) if y >= rect.bottom - grip && y <= rect.bottom => Some(CursorShape::SplitHorizontal),
            _ => Some(CursorShape::Default),
        }
    }
}

/// Character that starts a type-to-edit session.
pub fn starts_edit(ch: char) -> bool {
    ch.is_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_headers_and_grips() {
        let col_header = Rect::new(50, 0, 100, 20);
        assert_eq!(MouseState::classify(0, 1, col_header, 60, 5, 2), MouseState::ColumnSelect);
        assert_eq!(MouseState::classify(0, 1, col_header, 98, 5, 2), MouseState::ColumnResize { index: 1 });

        let row_header = Rect::new(0, 20, 50, 40);
        assert_eq!(MouseState::classify(3, 0, row_header, 10, 30, 2), MouseState::RowSelect);
        assert_eq!(MouseState::classify(3, 0, row_header, 10, 39, 2), MouseState::RowResize { index: 3 });

        // The corner never resizes columns.
        let corner = Rect::new(0, 0, 50, 20);
        assert_eq!(MouseState::classify(0, 0, corner, 49, 5, 2), MouseState::ColumnSelect);

        assert_eq!(MouseState::classify(2, 2, Rect::new(0, 0, 10, 10), 9, 9, 2), MouseState::CellSelect);
    }

    #[test]
    fn test_hover_cursor() {
        let col_header = Rect::new(50, 0, 100, 20);
        assert_eq!(CursorShape::for_hover(0, 1, col_header, 99, 5, 2), Some(CursorShape::SplitVertical));
        assert_eq!(CursorShape::for_hover(0, 1, col_header, 70, 5, 2), Some(CursorShape::Default));
        let row_header = Rect::new(0, 20, 50, 40);
        assert_eq!(CursorShape::for_hover(1, 0, row_header, 5, 38, 2), Some(CursorShape::SplitHorizontal));
        assert_eq!(CursorShape::for_hover(0, 0, Rect::new(0, 0, 50, 20), 49, 19, 2), None);
    }

    #[test]
    fn test_type_to_edit_chars() {
        assert!(starts_edit('a'));
        assert!(starts_edit('7'));
        assert!(!starts_edit(' '));
        assert!(!starts_edit('\r'));
    }
}
