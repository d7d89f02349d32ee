//! Message-level entry point.
//!
//! `GridMessage` is the host's request vocabulary and `MessageReply` its
//! answer; `MessageReply::code` flattens a reply into the integer return
//! code of the window-message convention (-1 on any error). Window events
//! arrive separately as `WindowEvent` and are fanned out to the view's
//! handlers.

use gridview_core::{CellType, GridRange};

use crate::cell::GridCell;
use crate::dep_graph::{DependencyCallback, DependencyId};
use crate::edit::{EditorEvent, EditorFactory};
use crate::error::{GridError, GridResult};
use crate::host::WindowHost;
use crate::input::Key;
use crate::layout::Viewport;
use crate::render::Surface;
use crate::view::{CellSnapshot, GridView, ScrollRequest};

/// Host request.
pub enum GridMessage {
    AddRow { index: i32, header: Option<GridCell> },
    DeleteRow { index: i32 },
    AddColumn { index: i32, header: Option<GridCell> },
    DeleteColumn { index: i32 },
    SetCellProperty { range: GridRange, cell: GridCell },
    GetCellProperty { row: i32, col: i32, expected: Option<CellType> },
    SetSelected { range: GridRange },
    GetSelected,
    SetRowHeight { index: i32, height: i32 },
    GetRowHeight { index: i32 },
    SetColWidth { index: i32, width: i32 },
    GetColWidth { index: i32 },
    AddDependency { source: GridRange, target: GridRange, callback: DependencyCallback, user_data: usize },
    DeleteDependency { id: DependencyId },
    GetRowCount,
    GetColCount,
    SetNumFormat { range: GridRange, format: String },
    EndCellEdit { commit: bool },
}

impl std::fmt::Debug for GridMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GridMessage::AddDependency { source, target, user_data, .. } => f
                .debug_struct("AddDependency")
                .field("source", source)
                .field("target", target)
                .field("user_data", user_data)
                .finish_non_exhaustive(),
            GridMessage::AddRow { index, .. } => write!(f, "AddRow({})", index),
            GridMessage::DeleteRow { index } => write!(f, "DeleteRow({})", index),
            GridMessage::AddColumn { index, .. } => write!(f, "AddColumn({})", index),
            GridMessage::DeleteColumn { index } => write!(f, "DeleteColumn({})", index),
            GridMessage::SetCellProperty { range, cell } => write!(f, "SetCellProperty({}, {})", range, cell.cell_type()),
            GridMessage::GetCellProperty { row, col, .. } => write!(f, "GetCellProperty({}, {})", row, col),
            GridMessage::SetSelected { range } => write!(f, "SetSelected({})", range),
            GridMessage::GetSelected => f.write_str("GetSelected"),
            GridMessage::SetRowHeight { index, height } => write!(f, "SetRowHeight({}, {})", index, height),
            GridMessage::GetRowHeight { index } => write!(f, "GetRowHeight({})", index),
            GridMessage::SetColWidth { index, width } => write!(f, "SetColWidth({}, {})", index, width),
            GridMessage::GetColWidth { index } => write!(f, "GetColWidth({})", index),
            GridMessage::DeleteDependency { id } => write!(f, "DeleteDependency({})", id.raw()),
            GridMessage::GetRowCount => f.write_str("GetRowCount"),
            GridMessage::GetColCount => f.write_str("GetColCount"),
            GridMessage::SetNumFormat { range, format } => write!(f, "SetNumFormat({}, {:?})", range, format),
            GridMessage::EndCellEdit { commit } => write!(f, "EndCellEdit({})", commit),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MessageReply {
    Ok,
    /// Index of an inserted row or column.
    Index(i32),
    /// Row height or column width.
    Size(i32),
    Count(i32),
    /// Number of cells a SetNumFormat touched.
    Updated(usize),
    Selected(GridRange),
    Cell(CellSnapshot),
    Dependency(DependencyId),
    Err(GridError),
}

impl MessageReply {
    pub fn is_err(&self) -> bool {
        matches!(self, MessageReply::Err(_))
    }

    /// Integer return code: the index/size/count/id payload, 0 for plain
    /// success, -1 for any error.
    pub fn code(&self) -> i32 {
        match self {
            MessageReply::Ok | MessageReply::Selected(_) | MessageReply::Cell(_) => 0,
            MessageReply::Index(n) | MessageReply::Size(n) | MessageReply::Count(n) => *n,
            MessageReply::Updated(n) => i32::try_from(*n).unwrap_or(i32::MAX),
            MessageReply::Dependency(id) => id.raw(),
            MessageReply::Err(_) => -1,
        }
    }

    pub fn into_result(self) -> GridResult<MessageReply> {
        match self {
            MessageReply::Err(e) => Err(e),
            reply => Ok(reply),
        }
    }
}

impl<T> From<GridResult<T>> for MessageReply
where
    T: Into<MessageReply>,
{
    fn from(result: GridResult<T>) -> Self {
        match result {
            Ok(value) => value.into(),
            Err(e) => MessageReply::Err(e),
        }
    }
}

impl From<()> for MessageReply {
    fn from(_: ()) -> Self {
        MessageReply::Ok
    }
}

impl From<CellSnapshot> for MessageReply {
    fn from(snapshot: CellSnapshot) -> Self {
        MessageReply::Cell(snapshot)
    }
}

impl From<DependencyId> for MessageReply {
    fn from(id: DependencyId) -> Self {
        MessageReply::Dependency(id)
    }
}

/// Window-system event delivered to the grid.
pub enum WindowEvent<'a> {
    Paint(&'a mut dyn Surface),
    SizeChanged,
    LButtonDown { x: i32, y: i32 },
    LButtonUp { x: i32, y: i32 },
    LButtonDblClk { x: i32, y: i32 },
    MouseMove { x: i32, y: i32 },
    KeyDown { key: Key, shift: bool },
    Char(char),
    HScroll(ScrollRequest),
    VScroll(ScrollRequest),
    /// Report from the live editor control.
    Editor(EditorEvent),
}

impl<V: Viewport, H: WindowHost, E: EditorFactory> GridView<V, H, E> {
    /// Execute one host request.
    pub fn dispatch(&mut self, message: GridMessage) -> MessageReply {
        log::trace!("dispatch {:?}", message);
        let reply: MessageReply = match message {
            GridMessage::AddRow { index, header } => self.add_row(index, header).map(MessageReply::Index).into(),
            GridMessage::DeleteRow { index } => self.delete_row(index).into(),
            GridMessage::AddColumn { index, header } => self.add_column(index, header).map(MessageReply::Index).into(),
            GridMessage::DeleteColumn { index } => self.delete_column(index).into(),
            GridMessage::SetCellProperty { range, cell } => self.set_cell_property(&range, &cell).into(),
            GridMessage::GetCellProperty { row, col, expected } => self.get_cell_property(row, col, expected).into(),
            GridMessage::SetSelected { range } => {
                self.set_highlight(range);
                MessageReply::Ok
            }
            GridMessage::GetSelected => MessageReply::Selected(self.highlight()),
            GridMessage::SetRowHeight { index, height } => self.set_row_height(index, height).into(),
            GridMessage::GetRowHeight { index } => self.get_row_height(index).map(MessageReply::Size).into(),
            GridMessage::SetColWidth { index, width } => self.set_col_width(index, width).into(),
            GridMessage::GetColWidth { index } => self.get_col_width(index).map(MessageReply::Size).into(),
            GridMessage::AddDependency { source, target, callback, user_data } => {
                self.add_dependency(source, target, callback, user_data).into()
            }
            GridMessage::DeleteDependency { id } => self.delete_dependency(id).into(),
            GridMessage::GetRowCount => MessageReply::Count(self.row_count()),
            GridMessage::GetColCount => MessageReply::Count(self.col_count()),
            GridMessage::SetNumFormat { range, format } => {
                self.set_num_format(&range, &format).map(MessageReply::Updated).into()
            }
            GridMessage::EndCellEdit { commit } => self.end_edit(commit).into(),
        };
        if let MessageReply::Err(e) = &reply {
            log::debug!("Request failed: {}", e);
        }
        reply
    }

    /// Fan a window event out to its handler.
    pub fn handle_event(&mut self, event: WindowEvent<'_>) {
        match event {
            WindowEvent::Paint(surface) => self.paint(surface),
            WindowEvent::SizeChanged => self.on_size_changed(),
            WindowEvent::LButtonDown { x, y } => self.on_lbutton_down(x, y),
            WindowEvent::LButtonUp { x, y } => self.on_lbutton_up(x, y),
            WindowEvent::LButtonDblClk { x, y } => self.on_lbutton_dblclk(x, y),
            WindowEvent::MouseMove { x, y } => self.on_mouse_move(x, y),
            WindowEvent::KeyDown { key, shift } => self.on_key_down(key, shift),
            WindowEvent::Char(ch) => {
                self.on_char(ch);
            }
            WindowEvent::HScroll(request) => self.on_hscroll(request),
            WindowEvent::VScroll(request) => self.on_vscroll(request),
            WindowEvent::Editor(event) => {
                if let Err(e) = self.on_editor_event(event) {
                    log::warn!("Editor event {:?} failed: {}", event, e);
                }
            }
        }
    }
}
