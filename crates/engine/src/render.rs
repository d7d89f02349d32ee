//! Display format computation and cell painting.
//!
//! Painting goes through the [`Surface`] trait; the grid never touches pixels
//! itself. Exact appearance is up to the surface.

use gridview_config::GridTheme;
use gridview_core::{CellType, Color, FontRef, HAlign, ImageRef, ItemMask, Point, Rect, VAlign};

use crate::cell::{CellPayload, GridCell, DEFAULT_CHECKBOX_LABEL};

/// Side of the check box glyph drawn in CheckBox cells.
const CHECK_BOX_SIZE: i32 = 12;

/// 2-D drawing surface.
pub trait Surface {
    fn fill_rect(&mut self, rect: Rect, color: Color);

    fn draw_line(&mut self, from: Point, to: Point, color: Color);

    /// One-pixel outline; the current-cell frame.
    fn frame_rect(&mut self, rect: Rect, color: Color);

    fn draw_text(&mut self, rect: Rect, text: &str, format: &TextFormat, color: Color, font: Option<FontRef>);

    fn draw_image(&mut self, rect: Rect, image: ImageRef);

    /// Raised 3-D frame used for header cells, filled with `face`.
    fn draw_header_frame(&mut self, rect: Rect, face: Color);

    /// Remove `rect` from the paint clip for the rest of this paint.
    fn exclude_clip(&mut self, rect: Rect);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextFormat {
    pub halign: HAlign,
    /// `None` for multi-line text, which flows from the top.
    pub valign: Option<VAlign>,
    pub single_line: bool,
}

/// Resolved colors and text layout for one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellFormat {
    pub bg: Color,
    pub fg: Color,
    pub highlight_bg: Color,
    pub highlight_fg: Color,
    pub border: Color,
    pub text: TextFormat,
    pub font: Option<FontRef>,
}

/// Paint-time position of a cell relative to the selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellPaintState {
    pub current: bool,
    pub highlighted: bool,
}

fn default_alignment(cell_type: CellType, multiline: bool) -> (HAlign, VAlign) {
    match cell_type {
        CellType::Header => (HAlign::Center, VAlign::Center),
        CellType::TableHeader | CellType::Number => (HAlign::Left, VAlign::Top),
        CellType::Text | CellType::CheckBox | CellType::Selection => {
            (HAlign::Left, if multiline { VAlign::Top } else { VAlign::Center })
        }
    }
}

/// Colors from the theme, overridden by the cell's own colors where its mask
/// says they were set.
pub fn compute_format(cell: &GridCell, theme: &GridTheme) -> CellFormat {
    let cell_type = cell.cell_type();
    let multiline = cell.style.is_multiline();
    let (default_h, default_v) = default_alignment(cell_type, multiline);
    let text = TextFormat {
        halign: cell.style.halign().unwrap_or(default_h),
        valign: if multiline { None } else { Some(cell.style.valign().unwrap_or(default_v)) },
        single_line: !multiline,
    };

    let mut format = match cell_type {
        CellType::Text | CellType::Number => CellFormat {
            bg: theme.window_bg,
            fg: theme.window_fg,
            highlight_bg: theme.highlight_bg,
            highlight_fg: theme.highlight_fg,
            border: theme.gridline,
            text,
            font: None,
        },
        CellType::CheckBox | CellType::Selection => CellFormat {
            bg: theme.body_bg,
            fg: theme.body_fg,
            highlight_bg: theme.highlight_bg,
            highlight_fg: theme.highlight_fg,
            border: theme.gridline,
            text,
            font: None,
        },
        CellType::Header | CellType::TableHeader => CellFormat {
            bg: theme.body_bg,
            fg: theme.body_fg,
            highlight_bg: theme.body_bg,
            highlight_fg: theme.body_fg,
            border: theme.border,
            text,
            font: None,
        },
    };

    let header = cell.is_header();
    if cell.mask.has(ItemMask::BGCOLOR) {
        format.bg = cell.color_bg;
        format.highlight_bg = if header { cell.color_bg } else { cell.color_bg.inverted() };
    }
    if cell.mask.has(ItemMask::FGCOLOR) {
        format.fg = cell.color_fg;
        format.highlight_fg = if header { cell.color_fg } else { cell.color_fg.inverted() };
    }
    if cell.mask.has(ItemMask::FONT) {
        format.font = cell.font;
    }
    format
}

/// Paint one cell into `rect`.
///
/// Headers get the surface's 3-D frame. Data cells fill their background,
/// draw right/bottom grid lines unless highlighted, and frame the current
/// cell before the content goes on top.
pub fn draw_cell(
    surface: &mut dyn Surface,
    cell: &GridCell,
    row: i32,
    col: i32,
    rect: Rect,
    state: CellPaintState,
    theme: &GridTheme,
) {
    let format = compute_format(cell, theme);

    if cell.is_header() {
        surface.draw_header_frame(rect, format.bg);
        draw_content(surface, cell, row, col, rect.inset(1, 1), &format, format.fg);
        return;
    }

    let highlighted = state.highlighted && !state.current;
    let (bg, fg) = if highlighted { (format.highlight_bg, format.highlight_fg) } else { (format.bg, format.fg) };
    surface.fill_rect(rect, bg);
    if !highlighted {
        let right = rect.right - 1;
        let bottom = rect.bottom - 1;
        surface.draw_line(Point::new(right, rect.top), Point::new(right, bottom), format.border);
        surface.draw_line(Point::new(rect.left, bottom), Point::new(right, bottom), format.border);
    }
    let inner = Rect::new(rect.left, rect.top, rect.right - 1, rect.bottom - 1);
    if state.current {
        surface.frame_rect(inner, theme.border);
    }
    if cell.control().is_none() {
        draw_content(surface, cell, row, col, inner, &format, fg);
    }
}

/// Type-specific payload drawing inside the cell border.
pub fn draw_content(
    surface: &mut dyn Surface,
    cell: &GridCell,
    row: i32,
    col: i32,
    rect: Rect,
    format: &CellFormat,
    fg: Color,
) {
    let mut area = Rect::new(rect.left + 3, rect.top + 2, rect.right - 3, rect.bottom - 2);
    if let Some(image) = cell.image {
        let side = area.height().max(0);
        surface.draw_image(Rect::from_size(area.left, area.top, side, side), image);
        area.left += side + 2;
    }
    if area.is_empty() {
        return;
    }

    match &cell.payload {
        CellPayload::CheckBox(checkbox) => {
            let top = area.top + (area.height() - CHECK_BOX_SIZE) / 2;
            let check = Rect::from_size(area.left, top, CHECK_BOX_SIZE, CHECK_BOX_SIZE);
            surface.frame_rect(check, fg);
            if checkbox.checked {
                let inner = check.inset(3, 3);
                surface.draw_line(Point::new(inner.left, inner.top), Point::new(inner.right, inner.bottom), fg);
                surface.draw_line(Point::new(inner.left, inner.bottom), Point::new(inner.right, inner.top), fg);
            }
            let label = checkbox.label.as_deref().unwrap_or(DEFAULT_CHECKBOX_LABEL);
            let label_rect = Rect::new(check.right + 4, area.top, area.right, area.bottom);
            surface.draw_text(label_rect, label, &format.text, fg, format.font);
        }
        _ => {
            let text = cell.text_value(row, col);
            if !text.is_empty() {
                surface.draw_text(area, &text, &format.text, fg, format.font);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::{DrawOp, RecordingSurface};
    use gridview_core::CellStyle;

    #[test]
    fn test_default_alignments() {
        let theme = GridTheme::classic();
        let header = compute_format(&GridCell::new(CellType::Header), &theme);
        assert_eq!(header.text.halign, HAlign::Center);
        assert_eq!(header.text.valign, Some(VAlign::Center));

        let number = compute_format(&GridCell::number(1.0, None), &theme);
        assert_eq!((number.text.halign, number.text.valign), (HAlign::Left, Some(VAlign::Top)));

        let multi = compute_format(&GridCell::text("a\nb").with_style(CellStyle::MULTILINE), &theme);
        assert_eq!(multi.text.valign, None);
        assert!(!multi.text.single_line);

        let right = compute_format(&GridCell::text("x").with_style(CellStyle::HALIGN_RIGHT), &theme);
        assert_eq!(right.text.halign, HAlign::Right);
        assert_eq!(right.text.valign, Some(VAlign::Center));
    }

    #[test]
    fn test_color_overrides() {
        let theme = GridTheme::classic();
        let data = compute_format(&GridCell::text("x").with_bg(Color(0x00FF00)), &theme);
        assert_eq!(data.bg, Color(0x00FF00));
        assert_eq!(data.highlight_bg, Color(0x00FF00).inverted());
        assert_eq!(data.fg, theme.window_fg);

        let header = compute_format(&GridCell::header(10, None).with_fg(Color(0x0000FF)), &theme);
        assert_eq!(header.fg, Color(0x0000FF));
        assert_eq!(header.highlight_fg, Color(0x0000FF));
        assert_eq!(header.border, theme.border);

        let check = compute_format(&GridCell::checkbox(true, None), &theme);
        assert_eq!(check.bg, theme.body_bg);
    }

    #[test]
    fn test_draw_current_cell_frames() {
        let theme = GridTheme::classic();
        let mut surface = RecordingSurface::default();
        let state = CellPaintState { current: true, highlighted: true };
        draw_cell(&mut surface, &GridCell::text("hi"), 1, 1, Rect::new(0, 0, 50, 20), state, &theme);

        assert_eq!(surface.ops[0], DrawOp::Fill(Rect::new(0, 0, 50, 20), theme.window_bg));
        assert!(surface.ops.contains(&DrawOp::Frame(Rect::new(0, 0, 49, 19), theme.border)));
        assert_eq!(surface.texts(), vec!["hi".to_string()]);
    }

    #[test]
    fn test_highlighted_cell_uses_highlight_colors_without_lines() {
        let theme = GridTheme::classic();
        let mut surface = RecordingSurface::default();
        let state = CellPaintState { current: false, highlighted: true };
        draw_cell(&mut surface, &GridCell::number(2.0, Some("%.0f")), 2, 2, Rect::new(0, 0, 50, 20), state, &theme);

        assert_eq!(surface.ops[0], DrawOp::Fill(Rect::new(0, 0, 50, 20), theme.highlight_bg));
        assert!(!surface.ops.iter().any(|op| matches!(op, DrawOp::Line(..))));
        assert_eq!(surface.texts(), vec!["2".to_string()]);
    }

    #[test]
    fn test_header_uses_frame_and_default_label() {
        let theme = GridTheme::classic();
        let mut surface = RecordingSurface::default();
        draw_cell(&mut surface, &GridCell::new(CellType::Header), 0, 27, Rect::new(0, 0, 50, 20), CellPaintState::default(), &theme);
        assert_eq!(surface.ops[0], DrawOp::HeaderFrame(Rect::new(0, 0, 50, 20), theme.body_bg));
        assert_eq!(surface.texts(), vec!["AA".to_string()]);
    }

    #[test]
    fn test_checkbox_content_draws_label() {
        let theme = GridTheme::classic();
        let mut surface = RecordingSurface::default();
        draw_cell(&mut surface, &GridCell::checkbox(true, Some("Paid")), 1, 1, Rect::new(0, 0, 80, 24), CellPaintState::default(), &theme);
        assert_eq!(surface.texts(), vec!["Paid".to_string()]);
    }
}
