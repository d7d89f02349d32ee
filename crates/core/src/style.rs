//! Style words, property masks and resource handles shared by every cell.

use serde::{Deserialize, Serialize};

/// Packed 0xRRGGBB pixel value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub const BLACK: Color = Color(0x000000);
    pub const WHITE: Color = Color(0xFFFFFF);
    pub const LIGHT_GRAY: Color = Color(0xC0C0C0);

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Color(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// Bitwise inverse within the 24-bit color space.
    pub fn inverted(self) -> Color {
        Color(!self.0 & 0x00FF_FFFF)
    }

    /// Parse `#RRGGBB`.
    pub fn from_hex(hex: &str) -> Option<Color> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 {
            return None;
        }
        u32::from_str_radix(hex, 16).ok().map(Color)
    }
}

/// Opaque handle to a font owned by the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FontRef(pub u32);

/// Opaque handle to an image owned by the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageRef(pub u32);

/// The closed set of cell variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellType {
    Text,
    Number,
    CheckBox,
    Selection,
    Header,
    TableHeader,
}

impl CellType {
    fn tag(self) -> u32 {
        match self {
            CellType::Text => 0x100,
            CellType::Number => 0x200,
            CellType::CheckBox => 0x300,
            CellType::Selection => 0x400,
            CellType::Header => 0x500,
            CellType::TableHeader => 0x600,
        }
    }

    fn from_tag(tag: u32) -> Option<CellType> {
        match tag {
            0x100 => Some(CellType::Text),
            0x200 => Some(CellType::Number),
            0x300 => Some(CellType::CheckBox),
            0x400 => Some(CellType::Selection),
            0x500 => Some(CellType::Header),
            0x600 => Some(CellType::TableHeader),
            _ => None,
        }
    }
}

impl std::fmt::Display for CellType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CellType::Text => "text",
            CellType::Number => "number",
            CellType::CheckBox => "checkbox",
            CellType::Selection => "selection",
            CellType::Header => "header",
            CellType::TableHeader => "table-header",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HAlign {
    #[default]
    Left,
    Right,
    Center,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VAlign {
    #[default]
    Top,
    Bottom,
    Center,
}

/// Cell style word: alignment nibbles, a type tag and behavior flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellStyle(pub u32);

impl CellStyle {
    pub const HALIGN_LEFT: u32 = 0x0000_0001;
    pub const HALIGN_RIGHT: u32 = 0x0000_0002;
    pub const HALIGN_CENTER: u32 = 0x0000_0003;
    pub const HALIGN_MASK: u32 = 0x0000_000F;

    pub const VALIGN_TOP: u32 = 0x0000_0010;
    pub const VALIGN_BOTTOM: u32 = 0x0000_0020;
    pub const VALIGN_CENTER: u32 = 0x0000_0030;
    pub const VALIGN_MASK: u32 = 0x0000_00F0;

    pub const TYPE_MASK: u32 = 0x0000_FF00;

    pub const WITH_ICON: u32 = 0x0001_0000;
    pub const WITH_CHECKBOX: u32 = 0x0002_0000;
    pub const MULTILINE: u32 = 0x0010_0000;
    pub const READONLY: u32 = 0x0020_0000;
    pub const BOX_CHECKED: u32 = 0x0040_0000;

    pub const fn empty() -> Self {
        CellStyle(0)
    }

    /// Style word carrying only a type tag.
    pub fn of_type(cell_type: CellType) -> Self {
        CellStyle(cell_type.tag())
    }

    pub fn with(self, flags: u32) -> Self {
        CellStyle(self.0 | flags)
    }

    pub fn has(&self, flags: u32) -> bool {
        self.0 & flags == flags
    }

    pub fn cell_type(&self) -> Option<CellType> {
        CellType::from_tag(self.0 & Self::TYPE_MASK)
    }

    /// Replace the type tag, keeping every other bit.
    pub fn with_type(self, cell_type: CellType) -> Self {
        CellStyle((self.0 & !Self::TYPE_MASK) | cell_type.tag())
    }

    /// Explicit horizontal alignment, if one is set.
    pub fn halign(&self) -> Option<HAlign> {
        match self.0 & Self::HALIGN_MASK {
            Self::HALIGN_LEFT => Some(HAlign::Left),
            Self::HALIGN_RIGHT => Some(HAlign::Right),
            Self::HALIGN_CENTER => Some(HAlign::Center),
            _ => None,
        }
    }

    /// Explicit vertical alignment, if one is set.
    pub fn valign(&self) -> Option<VAlign> {
        match self.0 & Self::VALIGN_MASK {
            Self::VALIGN_TOP => Some(VAlign::Top),
            Self::VALIGN_BOTTOM => Some(VAlign::Bottom),
            Self::VALIGN_CENTER => Some(VAlign::Center),
            _ => None,
        }
    }

    pub fn is_multiline(&self) -> bool {
        self.has(Self::MULTILINE)
    }

    pub fn is_readonly(&self) -> bool {
        self.has(Self::READONLY)
    }
}

/// Which sub-fields of a cell payload are meaningful.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemMask(pub u32);

impl ItemMask {
    pub const STYLE: u32 = 0x01;
    pub const BGCOLOR: u32 = 0x02;
    pub const FGCOLOR: u32 = 0x04;
    pub const FONT: u32 = 0x08;
    pub const IMAGE: u32 = 0x10;
    pub const MAINCONTENT: u32 = 0x20;
    /// Header size. Ignored by data cells.
    pub const SIZE: u32 = 0x40;
    pub const ALLCONTENT: u32 = 0xFF;

    pub const fn empty() -> Self {
        ItemMask(0)
    }

    pub const fn all() -> Self {
        ItemMask(Self::ALLCONTENT)
    }

    pub fn has(&self, bits: u32) -> bool {
        self.0 & bits == bits
    }

    pub fn insert(&mut self, bits: u32) {
        self.0 |= bits;
    }

    pub fn with(self, bits: u32) -> Self {
        ItemMask(self.0 | bits)
    }
}
