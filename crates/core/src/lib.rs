//! Value types shared by the grid engine and its configuration.

pub mod geometry;
pub mod range;
pub mod style;

pub use geometry::{Point, Rect};
pub use range::{GridRange, Span};
pub use style::{CellStyle, CellType, Color, FontRef, HAlign, ImageRef, ItemMask, VAlign};
