//! Window-system substrate the view runs on.

use gridview_core::{Point, Rect};

use crate::events::GridNotification;
use crate::input::CursorShape;

/// Message-dispatch side of the host window: invalidation, pointer capture,
/// cursor shape, scrolling of already painted pixels and notifications.
pub trait WindowHost {
    /// Client area in window coordinates.
    fn client_rect(&self) -> Rect;

    /// Schedule a repaint of `rect`, or of the whole client area.
    fn invalidate(&mut self, rect: Option<Rect>);

    /// Move the pixels inside `clip` by `(dx, dy)` and invalidate the exposed
    /// strip.
    fn scroll_window(&mut self, dx: i32, dy: i32, clip: Rect);

    fn set_capture(&mut self);

    fn release_capture(&mut self);

    fn has_capture(&self) -> bool;

    fn set_cursor(&mut self, shape: CursorShape);

    /// Draw (or erase, when drawn twice) an inverted tracking line.
    fn draw_tracking_line(&mut self, from: Point, to: Point);

    fn notify(&mut self, notification: GridNotification);
}
