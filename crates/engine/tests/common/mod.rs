//! Minimal collaborators for driving a grid through its public API.

#![allow(dead_code)]

use gridview_config::{GridSettings, GridTheme};
use gridview_core::{Point, Rect};
use gridview_engine::{
    ControlId, CursorShape, EditorFactory, EditorSpec, EditorValue, GridDimensions, GridNotification, GridView,
    NotificationCollector, ScrolledViewport, WindowHost,
};

#[derive(Debug, Default)]
pub struct Editors {
    next: u64,
    pub live: Vec<(ControlId, Rect, Option<EditorValue>)>,
}

impl Editors {
    pub fn type_value(&mut self, control: ControlId, value: EditorValue) {
        if let Some(entry) = self.live.iter_mut().find(|e| e.0 == control) {
            entry.2 = Some(value);
        }
    }
}

impl EditorFactory for Editors {
    fn create(&mut self, _spec: &EditorSpec, rect: Rect) -> Option<ControlId> {
        self.next += 1;
        self.live.push((ControlId(self.next), rect, None));
        Some(ControlId(self.next))
    }

    fn destroy(&mut self, control: ControlId) {
        self.live.retain(|e| e.0 != control);
    }

    fn move_to(&mut self, control: ControlId, rect: Rect) {
        if let Some(entry) = self.live.iter_mut().find(|e| e.0 == control) {
            entry.1 = rect;
        }
    }

    fn value(&self, control: ControlId) -> Option<EditorValue> {
        self.live.iter().find(|e| e.0 == control).and_then(|e| e.2.clone())
    }

    fn rect(&self, control: ControlId) -> Option<Rect> {
        self.live.iter().find(|e| e.0 == control).map(|e| e.1)
    }
}

#[derive(Debug)]
pub struct Host {
    pub client: Rect,
    pub captured: bool,
    pub invalidations: usize,
    pub scrolls: Vec<(i32, i32)>,
    pub notes: NotificationCollector,
}

impl Default for Host {
    fn default() -> Self {
        Self {
            client: Rect::new(0, 0, 640, 480),
            captured: false,
            invalidations: 0,
            scrolls: Vec::new(),
            notes: NotificationCollector::new(),
        }
    }
}

impl WindowHost for Host {
    fn client_rect(&self) -> Rect {
        self.client
    }

    fn invalidate(&mut self, _rect: Option<Rect>) {
        self.invalidations += 1;
    }

    fn scroll_window(&mut self, dx: i32, dy: i32, _clip: Rect) {
        self.scrolls.push((dx, dy));
    }

    fn set_capture(&mut self) {
        self.captured = true;
    }

    fn release_capture(&mut self) {
        self.captured = false;
    }

    fn has_capture(&self) -> bool {
        self.captured
    }

    fn set_cursor(&mut self, _shape: CursorShape) {}

    fn draw_tracking_line(&mut self, _from: Point, _to: Point) {}

    fn notify(&mut self, notification: GridNotification) {
        self.notes.push(notification);
    }
}

pub type Grid = GridView<ScrolledViewport, Host, Editors>;

pub fn grid(rows: i32, cols: i32) -> Grid {
    let settings = GridSettings::default();
    let dims = GridDimensions::from_settings(rows, cols, &settings);
    GridView::new(dims, settings, GridTheme::classic(), ScrolledViewport::new(), Host::default(), Editors::default())
        .unwrap()
}
