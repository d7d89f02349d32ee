//! Notifications sent from the grid to its host.
//!
//! The view forwards each notification through
//! [`WindowHost::notify`](crate::host::WindowHost::notify). Hosts that only
//! want to record them (tests, headless embedding) can use
//! [`NotificationCollector`].

use gridview_core::GridRange;

use crate::input::Key;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridNotification {
    /// Pointer pressed on a row or column header.
    HeaderMouseDown { row: i32, col: i32 },
    /// Pointer released after a row/column header selection.
    HeaderMouseUp { row: i32, col: i32 },
    /// Any key reached the grid while no editor was live.
    KeyDown { key: Key },
    CellDoubleClick { row: i32, col: i32 },
    CellClick { row: i32, col: i32 },
    /// The current cell moved.
    FocusChanged { row: i32, col: i32 },
    /// Cell content in `range` changed through an edit or a property set.
    CellTextChanged { range: GridRange },
}

/// Records notifications in arrival order.
#[derive(Debug, Default)]
pub struct NotificationCollector {
    events: Vec<GridNotification>,
}

impl NotificationCollector {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: GridNotification) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[GridNotification] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Positions of every FocusChanged, in order.
    pub fn focus_changes(&self) -> Vec<(i32, i32)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                GridNotification::FocusChanged { row, col } => Some((*row, *col)),
                _ => None,
            })
            .collect()
    }

    /// Ranges of every CellTextChanged, in order.
    pub fn text_changes(&self) -> Vec<GridRange> {
        self.events
            .iter()
            .filter_map(|e| match e {
                GridNotification::CellTextChanged { range } => Some(*range),
                _ => None,
            })
            .collect()
    }

    pub fn count_where(&self, pred: impl Fn(&GridNotification) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}
