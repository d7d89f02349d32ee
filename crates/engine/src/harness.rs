//! Test doubles for the host collaborators.
//!
//! - `FakeEditors` hands out numbered controls and keeps their values so a
//!   test can "type" into them with `set_value`
//! - `FakeHost` records every window call and collects notifications
//! - `RecordingSurface` records draw operations in order
//!
//! `grid(rows, cols)` builds a view over all three with default settings and
//! a 500x300 client area.

use gridview_config::{GridSettings, GridTheme};
use gridview_core::{Color, FontRef, ImageRef, Point, Rect};

use crate::edit::{ControlId, EditorFactory, EditorSeed, EditorSpec, EditorValue};
use crate::events::{GridNotification, NotificationCollector};
use crate::host::WindowHost;
use crate::input::CursorShape;
use crate::layout::ScrolledViewport;
use crate::render::{Surface, TextFormat};
use crate::view::{GridDimensions, GridView};

// ============================================================================
// Editors
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
struct FakeControl {
    id: ControlId,
    spec: EditorSpec,
    rect: Rect,
    value: EditorValue,
}

#[derive(Debug, Default)]
pub struct FakeEditors {
    next_id: u64,
    live: Vec<FakeControl>,
    /// Make the next `create` fail.
    pub fail_next: bool,
    pub focused: Option<ControlId>,
    pub destroyed: Vec<ControlId>,
}

impl FakeEditors {
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Simulate the user changing the control's content.
    pub fn set_value(&mut self, control: ControlId, value: EditorValue) {
        if let Some(c) = self.live.iter_mut().find(|c| c.id == control) {
            c.value = value;
        }
    }

    pub fn spec(&self, control: ControlId) -> Option<&EditorSpec> {
        self.live.iter().find(|c| c.id == control).map(|c| &c.spec)
    }
}

impl EditorFactory for FakeEditors {
    fn create(&mut self, spec: &EditorSpec, rect: Rect) -> Option<ControlId> {
        if std::mem::take(&mut self.fail_next) {
            return None;
        }
        self.next_id += 1;
        let id = ControlId(self.next_id);
        let value = match &spec.seed {
            EditorSeed::Text(text) => EditorValue::Text(text.clone()),
            EditorSeed::Checked { checked, .. } => EditorValue::Checked(*checked),
            EditorSeed::Choice { index, .. } => EditorValue::Index(*index),
        };
        self.live.push(FakeControl { id, spec: spec.clone(), rect, value });
        Some(id)
    }

    fn destroy(&mut self, control: ControlId) {
        self.live.retain(|c| c.id != control);
        self.destroyed.push(control);
        if self.focused == Some(control) {
            self.focused = None;
        }
    }

    fn move_to(&mut self, control: ControlId, rect: Rect) {
        if let Some(c) = self.live.iter_mut().find(|c| c.id == control) {
            c.rect = rect;
        }
    }

    fn value(&self, control: ControlId) -> Option<EditorValue> {
        self.live.iter().find(|c| c.id == control).map(|c| c.value.clone())
    }

    fn rect(&self, control: ControlId) -> Option<Rect> {
        self.live.iter().find(|c| c.id == control).map(|c| c.rect)
    }

    fn focus(&mut self, control: ControlId) {
        self.focused = Some(control);
    }
}

// ============================================================================
// Host window
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCall {
    Invalidate(Option<Rect>),
    Scroll { dx: i32, dy: i32, clip: Rect },
    Capture,
    Release,
    Cursor(CursorShape),
    TrackingLine(Point, Point),
}

#[derive(Debug)]
pub struct FakeHost {
    pub client: Rect,
    pub calls: Vec<HostCall>,
    pub captured: bool,
    pub cursor: CursorShape,
    pub notes: NotificationCollector,
}

impl FakeHost {
    pub fn new(client: Rect) -> Self {
        Self {
            client,
            calls: Vec::new(),
            captured: false,
            cursor: CursorShape::Default,
            notes: NotificationCollector::new(),
        }
    }

    pub fn scrolls(&self) -> Vec<(i32, i32)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HostCall::Scroll { dx, dy, .. } => Some((*dx, *dy)),
                _ => None,
            })
            .collect()
    }
}

impl WindowHost for FakeHost {
    fn client_rect(&self) -> Rect {
        self.client
    }

    fn invalidate(&mut self, rect: Option<Rect>) {
        self.calls.push(HostCall::Invalidate(rect));
    }

    fn scroll_window(&mut self, dx: i32, dy: i32, clip: Rect) {
        self.calls.push(HostCall::Scroll { dx, dy, clip });
    }

    fn set_capture(&mut self) {
        self.captured = true;
        self.calls.push(HostCall::Capture);
    }

    fn release_capture(&mut self) {
        self.captured = false;
        self.calls.push(HostCall::Release);
    }

    fn has_capture(&self) -> bool {
        self.captured
    }

    fn set_cursor(&mut self, shape: CursorShape) {
        self.cursor = shape;
        self.calls.push(HostCall::Cursor(shape));
    }

    fn draw_tracking_line(&mut self, from: Point, to: Point) {
        self.calls.push(HostCall::TrackingLine(from, to));
    }

    fn notify(&mut self, notification: GridNotification) {
        self.notes.push(notification);
    }
}

// ============================================================================
// Drawing
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Fill(Rect, Color),
    Line(Point, Point, Color),
    Frame(Rect, Color),
    Text(Rect, String, Color),
    Image(Rect, ImageRef),
    HeaderFrame(Rect, Color),
    ExcludeClip(Rect),
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub ops: Vec<DrawOp>,
}

impl RecordingSurface {
    /// Every string drawn, in order.
    pub fn texts(&self) -> Vec<String> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text(_, text, _) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.ops.push(DrawOp::Fill(rect, color));
    }

    fn draw_line(&mut self, from: Point, to: Point, color: Color) {
        self.ops.push(DrawOp::Line(from, to, color));
    }

    fn frame_rect(&mut self, rect: Rect, color: Color) {
        self.ops.push(DrawOp::Frame(rect, color));
    }

    fn draw_text(&mut self, rect: Rect, text: &str, _format: &TextFormat, color: Color, _font: Option<FontRef>) {
        self.ops.push(DrawOp::Text(rect, text.to_string(), color));
    }

    fn draw_image(&mut self, rect: Rect, image: ImageRef) {
        self.ops.push(DrawOp::Image(rect, image));
    }

    fn draw_header_frame(&mut self, rect: Rect, face: Color) {
        self.ops.push(DrawOp::HeaderFrame(rect, face));
    }

    fn exclude_clip(&mut self, rect: Rect) {
        self.ops.push(DrawOp::ExcludeClip(rect));
    }
}

// ============================================================================
// Grid builder
// ============================================================================

pub type TestGrid = GridView<ScrolledViewport, FakeHost, FakeEditors>;

/// A `rows` x `cols` grid with default settings in a 500x300 client area.
/// Row height 24, column width 80, table header 80x24.
pub fn grid(rows: i32, cols: i32) -> TestGrid {
    let settings = GridSettings::default();
    let dims = GridDimensions::from_settings(rows, cols, &settings);
    GridView::new(
        dims,
        settings,
        GridTheme::classic(),
        ScrolledViewport::new(),
        FakeHost::new(Rect::new(0, 0, 500, 300)),
        FakeEditors::default(),
    )
    .expect("test grid")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::EditorKind;

    #[test]
    fn test_fake_editors_seed_and_fail() {
        let mut editors = FakeEditors::default();
        let spec = EditorSpec { kind: EditorKind::Toggle, seed: EditorSeed::Checked { checked: true, label: "Yes/No".into() } };
        let id = editors.create(&spec, Rect::new(0, 0, 10, 10)).unwrap();
        assert_eq!(editors.value(id), Some(EditorValue::Checked(true)));

        editors.fail_next = true;
        assert!(editors.create(&spec, Rect::new(0, 0, 10, 10)).is_none());
        assert!(editors.create(&spec, Rect::new(0, 0, 10, 10)).is_some());
        editors.destroy(id);
        assert_eq!(editors.live_count(), 1);
    }

    #[test]
    fn test_grid_builder_lays_out() {
        let view = grid(4, 4);
        assert_eq!(view.layout().cells_rect(), Rect::new(80, 24, 500, 300));
        assert!(view.host().notes.is_empty());
    }
}
