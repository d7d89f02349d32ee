//! Grid cells and their per-variant behavior.
//!
//! A `GridCell` carries the properties every variant shares (mask, style,
//! colors, font, image) plus a `CellPayload` with the variant data. All
//! behavior dispatches on the payload with exhaustive matches; callers never
//! special-case a variant themselves.
//!
//! The property mask means two things depending on direction. On an incoming
//! cell handed to [`GridCell::merge`] it flags which fields to copy. On a
//! stored cell it records which optional overrides (colors, font, image,
//! content) have been set.

use gridview_config::GridSettings;
use gridview_core::{CellStyle, CellType, Color, FontRef, ImageRef, ItemMask};
use serde::{Deserialize, Serialize};

use crate::cell_id::{column_label, row_label};
use crate::edit::{ControlId, EditorKind, EditorSeed, EditorSpec, EditorValue};
use crate::error::{GridError, GridResult};
use crate::numfmt::{format_number, parse_leading_f64, DEFAULT_FORMAT};

/// Label shown beside a check box when the cell has none.
pub const DEFAULT_CHECKBOX_LABEL: &str = "Yes/No";

/// Option list of a Selection cell that has none.
pub const DEFAULT_SELECTION_OPTIONS: &str = "Yes\nNo\n";

// ============================================================================
// Payloads
// ============================================================================

/// The (0, 0) cell: header strip sizes and the grid-wide default cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableHeader {
    /// Width of the row-header strip; also the size of unsized column headers.
    pub width: i32,
    /// Height of the column-header strip; also the size of unsized row headers.
    pub height: i32,
    pub text: Option<String>,
    /// Default lookup consults the column header (row 0) before the row header.
    pub col_first: bool,
    pub default_cell: Option<Box<GridCell>>,
}

/// A row-0 or column-0 cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    /// Row height or column width; negative means "use the table default".
    pub size: i32,
    /// Cumulative end offset in content coordinates, maintained by the layout.
    pub end_offset: i32,
    pub text: Option<String>,
    pub default_cell: Option<Box<GridCell>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NumberContent {
    pub value: f64,
    /// printf-style display format; `%f` when absent.
    pub format: Option<String>,
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckBoxContent {
    pub checked: bool,
    pub label: Option<String>,
    #[serde(skip)]
    pub control: Option<ControlId>,
    #[serde(skip)]
    pub dirty: bool,
}

impl Clone for CheckBoxContent {
    fn clone(&self) -> Self {
        // A copy never shares the live control.
        Self { checked: self.checked, label: self.label.clone(), control: None, dirty: false }
    }
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionContent {
    pub index: i32,
    /// Newline-separated option list.
    pub options: Option<String>,
    #[serde(skip)]
    pub control: Option<ControlId>,
    #[serde(skip)]
    pub dirty: bool,
}

impl Clone for SelectionContent {
    fn clone(&self) -> Self {
        Self { index: self.index, options: self.options.clone(), control: None, dirty: false }
    }
}

impl SelectionContent {
    pub fn option_list(&self) -> Vec<String> {
        let options = self.options.as_deref().unwrap_or(DEFAULT_SELECTION_OPTIONS);
        options.split('\n').filter(|s| !s.is_empty()).map(str::to_string).collect()
    }

    pub fn current_option(&self) -> Option<String> {
        if self.index < 0 {
            return None;
        }
        self.option_list().into_iter().nth(self.index as usize)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellPayload {
    TableHeader(TableHeader),
    Header(Header),
    Text(TextContent),
    Number(NumberContent),
    CheckBox(CheckBoxContent),
    Selection(SelectionContent),
}

impl CellPayload {
    pub fn cell_type(&self) -> CellType {
        match self {
            CellPayload::TableHeader(_) => CellType::TableHeader,
            CellPayload::Header(_) => CellType::Header,
            CellPayload::Text(_) => CellType::Text,
            CellPayload::Number(_) => CellType::Number,
            CellPayload::CheckBox(_) => CellType::CheckBox,
            CellPayload::Selection(_) => CellType::Selection,
        }
    }

    fn initial(cell_type: CellType) -> CellPayload {
        match cell_type {
            CellType::TableHeader => CellPayload::TableHeader(TableHeader {
                width: 0,
                height: 0,
                text: None,
                col_first: true,
                default_cell: None,
            }),
            CellType::Header => CellPayload::Header(Header {
                size: -1,
                end_offset: 0,
                text: None,
                default_cell: None,
            }),
            CellType::Text => CellPayload::Text(TextContent::default()),
            CellType::Number => CellPayload::Number(NumberContent::default()),
            CellType::CheckBox => CellPayload::CheckBox(CheckBoxContent::default()),
            CellType::Selection => CellPayload::Selection(SelectionContent::default()),
        }
    }
}

// ============================================================================
// GridCell
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    pub mask: ItemMask,
    pub style: CellStyle,
    pub color_fg: Color,
    pub color_bg: Color,
    pub font: Option<FontRef>,
    pub image: Option<ImageRef>,
    pub payload: CellPayload,
}

impl GridCell {
    /// A blank cell of the given variant.
    pub fn new(cell_type: CellType) -> Self {
        Self {
            mask: ItemMask::empty(),
            style: CellStyle::of_type(cell_type),
            color_fg: Color::BLACK,
            color_bg: Color::WHITE,
            font: None,
            image: None,
            payload: CellPayload::initial(cell_type),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        let mut cell = Self::new(CellType::Text);
        cell.payload = CellPayload::Text(TextContent { text: Some(text.into()) });
        cell.mask.insert(ItemMask::MAINCONTENT);
        cell
    }

    pub fn number(value: f64, format: Option<&str>) -> Self {
        let mut cell = Self::new(CellType::Number);
        cell.payload = CellPayload::Number(NumberContent { value, format: format.map(str::to_string) });
        cell.mask.insert(ItemMask::MAINCONTENT);
        cell
    }

    pub fn checkbox(checked: bool, label: Option<&str>) -> Self {
        let mut cell = Self::new(CellType::CheckBox);
        cell.payload = CellPayload::CheckBox(CheckBoxContent {
            checked,
            label: label.map(str::to_string),
            ..Default::default()
        });
        cell.mask.insert(ItemMask::MAINCONTENT);
        cell
    }

    pub fn selection(index: i32, options: Option<&str>) -> Self {
        let mut cell = Self::new(CellType::Selection);
        cell.payload = CellPayload::Selection(SelectionContent {
            index,
            options: options.map(str::to_string),
            ..Default::default()
        });
        cell.mask.insert(ItemMask::MAINCONTENT);
        cell
    }

    /// Header payload with a size (negative = table default) and optional caption.
    pub fn header(size: i32, text: Option<&str>) -> Self {
        let mut cell = Self::new(CellType::Header);
        cell.payload = CellPayload::Header(Header {
            size,
            end_offset: 0,
            text: text.map(str::to_string),
            default_cell: None,
        });
        cell.mask.insert(ItemMask::SIZE);
        if text.is_some() {
            cell.mask.insert(ItemMask::MAINCONTENT);
        }
        cell
    }

    pub fn table_header(width: i32, height: i32) -> Self {
        let mut cell = Self::new(CellType::TableHeader);
        if let CellPayload::TableHeader(table) = &mut cell.payload {
            table.width = width;
            table.height = height;
        }
        cell
    }

    /// Replace the mask outright.
    pub fn with_mask(mut self, mask: ItemMask) -> Self {
        self.mask = mask;
        self
    }

    /// Set behavior/alignment flags; the type tag is kept.
    pub fn with_style(mut self, flags: u32) -> Self {
        self.style = CellStyle::of_type(self.cell_type()).with(flags & !CellStyle::TYPE_MASK);
        self.mask.insert(ItemMask::STYLE);
        self
    }

    pub fn with_bg(mut self, color: Color) -> Self {
        self.color_bg = color;
        self.mask.insert(ItemMask::BGCOLOR);
        self
    }

    pub fn with_fg(mut self, color: Color) -> Self {
        self.color_fg = color;
        self.mask.insert(ItemMask::FGCOLOR);
        self
    }

    pub fn with_font(mut self, font: FontRef) -> Self {
        self.font = Some(font);
        self.mask.insert(ItemMask::FONT);
        self
    }

    pub fn with_image(mut self, image: ImageRef) -> Self {
        self.image = Some(image);
        self.mask.insert(ItemMask::IMAGE);
        self
    }

    /// Attach a default sub-cell to a header or the table header. Other
    /// variants ignore it.
    pub fn with_default_cell(mut self, default: GridCell) -> Self {
        match &mut self.payload {
            CellPayload::TableHeader(table) => table.default_cell = Some(Box::new(default)),
            CellPayload::Header(header) => header.default_cell = Some(Box::new(default)),
            _ => {}
        }
        self
    }

    #[inline]
    pub fn cell_type(&self) -> CellType {
        self.payload.cell_type()
    }

    #[inline]
    pub fn is_readonly(&self) -> bool {
        self.style.is_readonly()
    }

    pub fn is_header(&self) -> bool {
        matches!(self.payload, CellPayload::Header(_) | CellPayload::TableHeader(_))
    }

    pub fn as_header(&self) -> Option<&Header> {
        match &self.payload {
            CellPayload::Header(header) => Some(header),
            _ => None,
        }
    }

    pub fn as_header_mut(&mut self) -> Option<&mut Header> {
        match &mut self.payload {
            CellPayload::Header(header) => Some(header),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&TableHeader> {
        match &self.payload {
            CellPayload::TableHeader(table) => Some(table),
            _ => None,
        }
    }

    pub fn as_table_mut(&mut self) -> Option<&mut TableHeader> {
        match &mut self.payload {
            CellPayload::TableHeader(table) => Some(table),
            _ => None,
        }
    }

    /// Default sub-cell of a header or the table header.
    pub fn default_cell(&self) -> Option<&GridCell> {
        match &self.payload {
            CellPayload::TableHeader(table) => table.default_cell.as_deref(),
            CellPayload::Header(header) => header.default_cell.as_deref(),
            _ => None,
        }
    }

    // ========================================================================
    // Merge
    // ========================================================================

    /// Copy the fields flagged in `incoming.mask` into this cell.
    ///
    /// Unflagged fields are left alone, so merging the same cell twice is a
    /// no-op the second time. A variant mismatch fails without touching
    /// anything.
    pub fn merge(&mut self, incoming: &GridCell) -> GridResult<()> {
        let expected = self.cell_type();
        let found = incoming.cell_type();
        if expected != found {
            return Err(GridError::TypeMismatch { expected, found });
        }

        let m = incoming.mask;
        let mut touched_visuals = false;

        if m.has(ItemMask::STYLE) {
            self.style = CellStyle::of_type(expected).with(incoming.style.0 & !CellStyle::TYPE_MASK);
            touched_visuals = true;
        }
        if m.has(ItemMask::BGCOLOR) {
            self.color_bg = incoming.color_bg;
            self.mask.insert(ItemMask::BGCOLOR);
        }
        if m.has(ItemMask::FGCOLOR) {
            self.color_fg = incoming.color_fg;
            self.mask.insert(ItemMask::FGCOLOR);
        }
        if m.has(ItemMask::FONT) {
            self.font = incoming.font;
            self.mask.insert(ItemMask::FONT);
        }
        if m.has(ItemMask::IMAGE) {
            self.image = incoming.image;
            self.mask.insert(ItemMask::IMAGE);
            touched_visuals = true;
        }
        let content = m.has(ItemMask::MAINCONTENT);
        if content {
            self.mask.insert(ItemMask::MAINCONTENT);
            touched_visuals = true;
        }

        match (&mut self.payload, &incoming.payload) {
            (CellPayload::TableHeader(to), CellPayload::TableHeader(from)) => {
                if content {
                    to.text = from.text.clone();
                }
                if m.has(ItemMask::SIZE) {
                    to.width = from.width;
                    to.height = from.height;
                }
            }
            (CellPayload::Header(to), CellPayload::Header(from)) => {
                if content {
                    to.text = from.text.clone();
                }
                if m.has(ItemMask::SIZE) {
                    to.size = from.size;
                }
            }
            (CellPayload::Text(to), CellPayload::Text(from)) => {
                if content {
                    to.text = from.text.clone();
                }
            }
            (CellPayload::Number(to), CellPayload::Number(from)) => {
                if content {
                    to.value = from.value;
                }
                if from.format.is_some() {
                    to.format = from.format.clone();
                }
            }
            (CellPayload::CheckBox(to), CellPayload::CheckBox(from)) => {
                if content {
                    to.checked = from.checked;
                    to.label = from.label.clone();
                }
                if touched_visuals {
                    to.dirty = true;
                }
            }
            (CellPayload::Selection(to), CellPayload::Selection(from)) => {
                if content {
                    to.index = from.index;
                    to.options = from.options.clone();
                }
                if touched_visuals {
                    to.dirty = true;
                }
            }
            _ => return Err(GridError::TypeMismatch { expected, found }),
        }
        Ok(())
    }

    // ========================================================================
    // Values
    // ========================================================================

    /// Display text of the cell at `(row, col)`.
    ///
    /// Headers without a caption render their default label: the decimal row
    /// number for row headers, a base-26 letter label for column headers.
    pub fn text_value(&self, row: i32, col: i32) -> String {
        match &self.payload {
            CellPayload::TableHeader(table) => table.text.clone().unwrap_or_default(),
            CellPayload::Header(header) => match &header.text {
                Some(text) => text.clone(),
                None if col == 0 && row > 0 => row_label(row),
                None => column_label(col),
            },
            CellPayload::Text(text) => text.text.clone().unwrap_or_default(),
            CellPayload::Number(number) => {
                format_number(number.format.as_deref().unwrap_or(DEFAULT_FORMAT), number.value)
            }
            CellPayload::CheckBox(checkbox) => {
                if checkbox.checked { "Yes".to_string() } else { "No".to_string() }
            }
            CellPayload::Selection(selection) => selection.current_option().unwrap_or_default(),
        }
    }

    /// Two-call text access.
    ///
    /// Returns the byte length of the text value. With a non-empty buffer,
    /// copies as much as fits in `buf.len() - 1` bytes and terminates with a
    /// NUL, so `copy_text_value(r, c, None) + 1` is always a sufficient size.
    pub fn copy_text_value(&self, row: i32, col: i32, buf: Option<&mut [u8]>) -> usize {
        let text = self.text_value(row, col);
        let bytes = text.as_bytes();
        if let Some(buf) = buf {
            if !buf.is_empty() {
                let n = bytes.len().min(buf.len() - 1);
                buf[..n].copy_from_slice(&bytes[..n]);
                buf[n] = 0;
            }
        }
        bytes.len()
    }

    /// Parse `text` into the cell's payload.
    pub fn set_text_value(&mut self, text: &str) {
        match &mut self.payload {
            CellPayload::TableHeader(table) => table.text = Some(text.to_string()),
            CellPayload::Header(header) => header.text = Some(text.to_string()),
            CellPayload::Text(content) => content.text = Some(text.to_string()),
            CellPayload::Number(number) => {
                let value = parse_leading_f64(text);
                if value.is_finite() {
                    number.value = value;
                } else {
                    log::warn!("Rejected non-finite number input {:?}", text);
                }
            }
            CellPayload::CheckBox(checkbox) => {
                let t = text.trim();
                checkbox.checked = t.eq_ignore_ascii_case("yes") || t.eq_ignore_ascii_case("checked");
                checkbox.dirty = true;
            }
            CellPayload::Selection(selection) => {
                let options = selection.option_list();
                if let Some(index) = options.iter().position(|o| o == text) {
                    selection.index = index as i32;
                } else if let Ok(index) = text.trim().parse::<i32>() {
                    if index >= 0 && (index as usize) < options.len() {
                        selection.index = index;
                    }
                }
                selection.dirty = true;
            }
        }
    }

    /// Numeric reading of the cell. Non-number variants parse their text.
    pub fn number_value(&self, row: i32, col: i32) -> f64 {
        match &self.payload {
            CellPayload::Number(number) => number.value,
            CellPayload::CheckBox(checkbox) => {
                if checkbox.checked { 1.0 } else { 0.0 }
            }
            CellPayload::Selection(selection) => selection.index as f64,
            _ => parse_leading_f64(&self.text_value(row, col)),
        }
    }

    // ========================================================================
    // Transient controls
    // ========================================================================

    /// Live editor control recorded in this cell, if any.
    pub fn control(&self) -> Option<ControlId> {
        match &self.payload {
            CellPayload::CheckBox(checkbox) => checkbox.control,
            CellPayload::Selection(selection) => selection.control,
            _ => None,
        }
    }

    /// Record a live control. Only variants that own one keep it.
    pub fn attach_control(&mut self, control: ControlId) {
        match &mut self.payload {
            CellPayload::CheckBox(checkbox) => checkbox.control = Some(control),
            CellPayload::Selection(selection) => selection.control = Some(control),
            _ => {}
        }
    }

    /// Forget `control` if it is the one recorded here.
    pub fn detach_control(&mut self, control: ControlId) {
        match &mut self.payload {
            CellPayload::CheckBox(c) if c.control == Some(control) => c.control = None,
            CellPayload::Selection(s) if s.control == Some(control) => s.control = None,
            _ => {}
        }
    }

    /// Whether the cell needs [`GridCell::invisible_draw`] when scrolled out.
    pub fn has_invisible_draw(&self) -> bool {
        matches!(self.payload, CellPayload::CheckBox(_) | CellPayload::Selection(_))
    }

    /// Called instead of drawing when the cell lies outside the visible cells
    /// area. Returns the control that must be destroyed.
    pub fn invisible_draw(&mut self) -> Option<ControlId> {
        match &mut self.payload {
            CellPayload::CheckBox(checkbox) => checkbox.control.take(),
            CellPayload::Selection(selection) => selection.control.take(),
            _ => None,
        }
    }

    /// Release everything the cell owns before it is dropped. Live controls
    /// (including those of default sub-cells) are pushed to `released`.
    pub fn on_destroy(&mut self, released: &mut Vec<ControlId>) {
        if let Some(control) = self.invisible_draw() {
            released.push(control);
        }
        match &mut self.payload {
            CellPayload::TableHeader(table) => {
                if let Some(mut default) = table.default_cell.take() {
                    default.on_destroy(released);
                }
            }
            CellPayload::Header(header) => {
                if let Some(mut default) = header.default_cell.take() {
                    default.on_destroy(released);
                }
            }
            _ => {}
        }
    }

    // ========================================================================
    // Editing
    // ========================================================================

    /// Editor to open over this cell, or `None` for header variants.
    pub fn editor_spec(&self, row: i32, col: i32, settings: &GridSettings) -> Option<EditorSpec> {
        let (kind, seed) = match &self.payload {
            CellPayload::TableHeader(_) | CellPayload::Header(_) => return None,
            CellPayload::Text(_) => (
                EditorKind::LineEdit { multiline: self.style.is_multiline() },
                EditorSeed::Text(self.text_value(row, col)),
            ),
            CellPayload::Number(_) => (
                EditorKind::LineEdit { multiline: false },
                EditorSeed::Text(self.text_value(row, col)),
            ),
            CellPayload::CheckBox(checkbox) => (
                EditorKind::Toggle,
                EditorSeed::Checked {
                    checked: checkbox.checked,
                    label: checkbox.label.clone().unwrap_or_else(|| settings.checkbox_label.clone()),
                },
            ),
            CellPayload::Selection(selection) => {
                let options = match &selection.options {
                    Some(_) => selection.option_list(),
                    None => SelectionContent {
                        options: Some(settings.selection_options.clone()),
                        ..Default::default()
                    }
                    .option_list(),
                };
                (EditorKind::DropDown, EditorSeed::Choice { options, index: selection.index })
            }
        };
        Some(EditorSpec { kind, seed })
    }

    /// Write a committed editor value into the payload.
    pub fn apply_editor_value(&mut self, value: EditorValue) {
        match (&mut self.payload, value) {
            (CellPayload::CheckBox(checkbox), EditorValue::Checked(checked)) => {
                checkbox.checked = checked;
                checkbox.dirty = true;
            }
            (CellPayload::Selection(selection), EditorValue::Index(index)) => {
                selection.index = index;
                selection.dirty = true;
            }
            (_, EditorValue::Text(text)) => self.set_text_value(&text),
            (_, EditorValue::Checked(checked)) => self.set_text_value(if checked { "yes" } else { "no" }),
            (_, EditorValue::Index(index)) => self.set_text_value(&index.to_string()),
        }
    }
}
