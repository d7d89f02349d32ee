//! In-place cell editing.
//!
//! At most one edit session is live per grid. Beginning an edit asks the
//! host's [`EditorFactory`] for a native control sized to the cell; ending it
//! reads the control back (on commit), destroys it, and writes the value into
//! the stored cell. A cell that was only displayed through a header default
//! is promoted to a stored copy before the committed value lands, so the
//! shared default is never mutated.

use gridview_config::GridSettings;
use gridview_core::Rect;

use crate::error::{GridError, GridResult};
use crate::model::GridDataModel;

/// Opaque handle of a host editor control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKind {
    /// Single- or multi-line text box (Text and Number cells).
    LineEdit { multiline: bool },
    /// Check box with a caption.
    Toggle,
    /// Drop-down list.
    DropDown,
}

/// Initial content of a new editor.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorSeed {
    Text(String),
    Checked { checked: bool, label: String },
    Choice { options: Vec<String>, index: i32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditorSpec {
    pub kind: EditorKind,
    pub seed: EditorSeed,
}

/// Value read back from an editor on commit.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorValue {
    Text(String),
    Checked(bool),
    Index(i32),
}

/// What a live editor control reports back to the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorEvent {
    Enter,
    Escape,
    FocusLost,
    /// A Toggle was clicked.
    Toggled,
    /// A DropDown selection changed.
    Selected,
    /// A DropDown list closed.
    CloseUp,
}

impl EditorEvent {
    /// Whether the event ends the session with a commit. Only Escape cancels.
    pub fn commits(self) -> bool {
        !matches!(self, EditorEvent::Escape)
    }
}

/// Host-side factory for the native controls editors are built from.
pub trait EditorFactory {
    /// Create a control over `rect` (window coordinates). `None` on failure.
    fn create(&mut self, spec: &EditorSpec, rect: Rect) -> Option<ControlId>;

    fn destroy(&mut self, control: ControlId);

    fn move_to(&mut self, control: ControlId, rect: Rect);

    /// Current value of a live control.
    fn value(&self, control: ControlId) -> Option<EditorValue>;

    /// Current bounds of a live control.
    fn rect(&self, control: ControlId) -> Option<Rect>;

    fn focus(&mut self, _control: ControlId) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveEdit {
    pub row: i32,
    pub col: i32,
    pub control: ControlId,
    /// The cell had no stored value when the edit began.
    pub is_default: bool,
    pub kind: EditorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditState {
    #[default]
    Idle,
    Editing(ActiveEdit),
}

#[derive(Debug, Default)]
pub struct EditSession {
    state: EditState,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, EditState::Editing(_))
    }

    pub fn active(&self) -> Option<&ActiveEdit> {
        match &self.state {
            EditState::Editing(active) => Some(active),
            EditState::Idle => None,
        }
    }

    pub fn control(&self) -> Option<ControlId> {
        self.active().map(|a| a.control)
    }

    /// Open an editor over `(row, col)`.
    ///
    /// `cell_rect` is the cell's window rectangle; the control is inset by
    /// the configured editor margins. Fails if a session is already live,
    /// the cell is read-only or a header, or the host cannot create the
    /// control.
    pub fn begin(
        &mut self,
        model: &mut GridDataModel,
        editors: &mut dyn EditorFactory,
        row: i32,
        col: i32,
        cell_rect: Rect,
        settings: &GridSettings,
    ) -> GridResult<()> {
        if self.is_editing() {
            return Err(GridError::InvalidArgument("an edit session is already active".to_string()));
        }
        if row < 1 || col < 1 {
            return Err(GridError::InvalidIndex { row, col });
        }
        let cell = model.value_or_default_at(row, col).ok_or(GridError::InvalidIndex { row, col })?;
        if cell.is_readonly() {
            log::warn!("Refusing to edit read-only cell ({}, {})", row, col);
            return Err(GridError::ReadOnly { row, col });
        }
        let spec = cell.editor_spec(row, col, settings).ok_or_else(|| {
            GridError::InvalidArgument(format!("{} cells have no editor", cell.cell_type()))
        })?;
        let is_default = model.value_at(row, col).is_none();

        let rect = cell_rect.inset(settings.editor_inset_x, settings.editor_inset_y);
        let Some(control) = editors.create(&spec, rect) else {
            log::error!("Editor control creation failed for ({}, {})", row, col);
            return Err(GridError::AllocationFailure(format!("editor for ({}, {})", row, col)));
        };

        if let Some(stored) = model.value_at_mut(row, col) {
            stored.attach_control(control);
        }
        editors.focus(control);
        self.state = EditState::Editing(ActiveEdit { row, col, control, is_default, kind: spec.kind });
        log::debug!("Editing ({}, {}) with {:?}", row, col, spec.kind);
        Ok(())
    }

    /// Close the live editor. With `commit`, the editor's value is written
    /// into the cell (promoting a default-displayed cell first). Returns the
    /// edited position, or `None` when no session was live.
    pub fn end(
        &mut self,
        model: &mut GridDataModel,
        editors: &mut dyn EditorFactory,
        commit: bool,
    ) -> GridResult<Option<(i32, i32)>> {
        let EditState::Editing(active) = std::mem::take(&mut self.state) else {
            return Ok(None);
        };
        let ActiveEdit { row, col, control, .. } = active;

        let value = if commit { editors.value(control) } else { None };
        if let Some(stored) = model.value_at_mut(row, col) {
            stored.detach_control(control);
        }
        editors.destroy(control);

        if let Some(value) = value {
            if model.value_at(row, col).is_none() {
                let promoted = model.value_or_default_at(row, col).cloned().ok_or(GridError::InvalidIndex { row, col })?;
                model.set_value_at(row, col, Some(promoted))?;
            }
            if let Some(cell) = model.value_at_mut(row, col) {
                cell.apply_editor_value(value);
            }
            log::debug!("Committed edit of ({}, {})", row, col);
        } else if commit {
            log::warn!("Editor for ({}, {}) had no value to commit", row, col);
        }
        Ok(Some((row, col)))
    }

    /// Drop the session without touching the host if it is bound to
    /// `control`, which has already been destroyed elsewhere.
    pub fn abandon(&mut self, control: ControlId) -> bool {
        if self.control() == Some(control) {
            self.state = EditState::Idle;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::GridCell;
    use crate::harness::FakeEditors;
    use gridview_core::{CellStyle, CellType};

    fn setup() -> (GridDataModel, FakeEditors, EditSession, GridSettings) {
        (GridDataModel::new(3, 3, 24, 80).unwrap(), FakeEditors::default(), EditSession::new(), GridSettings::default())
    }

    #[test]
    fn test_begin_creates_inset_editor() {
        let (mut model, mut editors, mut session, settings) = setup();
        model.set_value_at(1, 1, Some(GridCell::text("abc"))).unwrap();
        session.begin(&mut model, &mut editors, 1, 1, Rect::new(40, 20, 120, 44), &settings).unwrap();

        let control = session.control().unwrap();
        assert_eq!(editors.rect(control), Some(Rect::new(43, 22, 117, 42)));
        assert_eq!(editors.value(control), Some(EditorValue::Text("abc".into())));
        assert!(!session.active().unwrap().is_default);
    }

    #[test]
    fn test_second_begin_rejected() {
        let (mut model, mut editors, mut session, settings) = setup();
        session.begin(&mut model, &mut editors, 1, 1, Rect::new(0, 0, 10, 10), &settings).unwrap();
        assert!(session.begin(&mut model, &mut editors, 2, 2, Rect::new(0, 0, 10, 10), &settings).is_err());
        assert_eq!(editors.live_count(), 1);
    }

    #[test]
    fn test_readonly_and_header_rejected() {
        let (mut model, mut editors, mut session, settings) = setup();
        model.set_value_at(2, 2, Some(GridCell::text("x").with_style(CellStyle::READONLY))).unwrap();
        let r = Rect::new(0, 0, 10, 10);
        assert_eq!(
            session.begin(&mut model, &mut editors, 2, 2, r, &settings),
            Err(GridError::ReadOnly { row: 2, col: 2 })
        );
        assert!(session.begin(&mut model, &mut editors, 0, 2, r, &settings).is_err());
        assert!(!session.is_editing());
    }

    #[test]
    fn test_factory_failure_is_allocation_error() {
        let (mut model, mut editors, mut session, settings) = setup();
        editors.fail_next = true;
        let err = session.begin(&mut model, &mut editors, 1, 1, Rect::new(0, 0, 10, 10), &settings).unwrap_err();
        assert!(matches!(err, GridError::AllocationFailure(_)));
        assert!(!session.is_editing());
    }

    #[test]
    fn test_commit_promotes_default_cell() {
        let (mut model, mut editors, mut session, settings) = setup();
        session.begin(&mut model, &mut editors, 2, 3, Rect::new(0, 0, 80, 24), &settings).unwrap();
        assert!(session.active().unwrap().is_default);
        let control = session.control().unwrap();
        editors.set_value(control, EditorValue::Text("typed".into()));

        assert_eq!(session.end(&mut model, &mut editors, true).unwrap(), Some((2, 3)));
        assert_eq!(model.value_at(2, 3).unwrap().text_value(2, 3), "typed");
        // The table default stays blank for every other cell.
        assert_eq!(model.value_or_default_at(1, 1).unwrap().text_value(1, 1), "");
        assert_eq!(editors.live_count(), 0);
    }

    #[test]
    fn test_cancel_never_mutates() {
        let (mut model, mut editors, mut session, settings) = setup();
        model.set_value_at(1, 1, Some(GridCell::number(1.5, Some("%.1f")))).unwrap();
        session.begin(&mut model, &mut editors, 1, 1, Rect::new(0, 0, 80, 24), &settings).unwrap();
        let control = session.control().unwrap();
        editors.set_value(control, EditorValue::Text("9".into()));

        session.end(&mut model, &mut editors, false).unwrap();
        assert_eq!(model.value_at(1, 1).unwrap().text_value(1, 1), "1.5");
        assert!(model.value_at(1, 2).is_none());
        assert_eq!(session.end(&mut model, &mut editors, false).unwrap(), None);
    }

    #[test]
    fn test_checkbox_control_mirrored_in_cell() {
        let (mut model, mut editors, mut session, settings) = setup();
        model.set_value_at(1, 2, Some(GridCell::checkbox(false, None))).unwrap();
        session.begin(&mut model, &mut editors, 1, 2, Rect::new(0, 0, 80, 24), &settings).unwrap();
        let control = session.control().unwrap();
        assert_eq!(model.value_at(1, 2).unwrap().control(), Some(control));

        editors.set_value(control, EditorValue::Checked(true));
        session.end(&mut model, &mut editors, true).unwrap();
        let cell = model.value_at(1, 2).unwrap();
        assert_eq!(cell.control(), None);
        assert_eq!(cell.cell_type(), CellType::CheckBox);
        assert_eq!(cell.text_value(1, 2), "Yes");
    }

    #[test]
    fn test_abandon_only_matching_control() {
        let (mut model, mut editors, mut session, settings) = setup();
        session.begin(&mut model, &mut editors, 1, 1, Rect::new(0, 0, 80, 24), &settings).unwrap();
        let control = session.control().unwrap();
        assert!(!session.abandon(ControlId(control.0 + 100)));
        assert!(session.abandon(control));
        assert_eq!(session.state(), EditState::Idle);
    }
}
