// Property tests for partial-update merge semantics.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

mod common;

use proptest::prelude::*;

use gridview_core::{CellStyle, CellType, Color, FontRef, GridRange, ImageRef, ItemMask};
use gridview_engine::{CellPayload, GridCell};

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

fn mask_strategy() -> impl Strategy<Value = u32> {
    prop::collection::vec(
        prop::sample::select(vec![
            ItemMask::STYLE,
            ItemMask::BGCOLOR,
            ItemMask::FGCOLOR,
            ItemMask::FONT,
            ItemMask::IMAGE,
            ItemMask::MAINCONTENT,
            ItemMask::SIZE,
        ]),
        0..7,
    )
    .prop_map(|bits| bits.into_iter().fold(0, |acc, b| acc | b))
}

fn style_strategy() -> impl Strategy<Value = u32> {
    (0u32..4, 0u32..4, any::<bool>()).prop_map(|(h, v, multi)| {
        let mut flags = h | (v << 4);
        if multi {
            flags |= CellStyle::MULTILINE;
        }
        flags
    })
}

const VARIANTS: [CellType; 6] = [
    CellType::TableHeader,
    CellType::Header,
    CellType::Text,
    CellType::Number,
    CellType::CheckBox,
    CellType::Selection,
];

/// Variant payload built from generic draws: `word` feeds the string field,
/// `n` the numeric one.
fn payload_cell(cell_type: CellType, word: Option<String>, n: i32, format: Option<&str>) -> GridCell {
    let word_ref = word.as_deref();
    match cell_type {
        CellType::TableHeader => {
            let mut cell = GridCell::table_header(40 + n, 10 + n);
            if let CellPayload::TableHeader(table) = &mut cell.payload {
                table.text = word;
            }
            cell
        }
        CellType::Header => GridCell::header(10 + n, word_ref),
        CellType::Text => GridCell::text(word.unwrap_or_default()),
        CellType::Number => GridCell::number(f64::from(n) / 4.0, format),
        CellType::CheckBox => GridCell::checkbox(n % 2 == 0, word_ref),
        CellType::Selection => GridCell::selection(n % 3, word_ref),
    }
}

fn cell_strategy(cell_type: CellType, mask: BoxedStrategy<u32>) -> impl Strategy<Value = GridCell> {
    (
        (prop::option::of("[a-z]{1,8}"), 0i32..200, prop::sample::select(vec![None, Some("%.2f"), Some("%g")])),
        (0u32..0xFF_FFFF, 0u32..0xFF_FFFF, 0u32..16, prop::option::of(0u32..16)),
        style_strategy(),
        mask,
    )
        .prop_map(move |((word, n, format), (bg, fg, font, image), style, mask)| {
            let mut cell = payload_cell(cell_type, word, n, format);
            cell.color_bg = Color(bg);
            cell.color_fg = Color(fg);
            cell.font = Some(FontRef(font));
            cell.image = image.map(ImageRef);
            cell.style = CellStyle::of_type(cell_type).with(style);
            cell.mask = ItemMask(mask);
            cell
        })
}

/// A stored cell and an incoming update of the same variant.
fn merge_pair() -> impl Strategy<Value = (GridCell, GridCell)> {
    prop::sample::select(VARIANTS.to_vec()).prop_flat_map(|cell_type| {
        (
            cell_strategy(cell_type, Just(ItemMask::MAINCONTENT | ItemMask::SIZE).boxed()),
            cell_strategy(cell_type, mask_strategy().boxed()),
        )
    })
}

/// An update of any variant.
fn update_strategy() -> impl Strategy<Value = GridCell> {
    prop::sample::select(VARIANTS.to_vec()).prop_flat_map(|cell_type| cell_strategy(cell_type, mask_strategy().boxed()))
}

/// The MAINCONTENT fields of a cell, whatever its variant.
fn main_content(cell: &GridCell) -> (Option<String>, i64) {
    match &cell.payload {
        CellPayload::TableHeader(table) => (table.text.clone(), 0),
        CellPayload::Header(header) => (header.text.clone(), 0),
        CellPayload::Text(text) => (text.text.clone(), 0),
        CellPayload::Number(number) => (None, (number.value * 4.0) as i64),
        CellPayload::CheckBox(checkbox) => (checkbox.label.clone(), i64::from(checkbox.checked)),
        CellPayload::Selection(selection) => (selection.options.clone(), i64::from(selection.index)),
    }
}

/// The SIZE fields of a header cell; `None` for data variants.
fn size_fields(cell: &GridCell) -> Option<(i32, i32)> {
    match &cell.payload {
        CellPayload::TableHeader(table) => Some((table.width, table.height)),
        CellPayload::Header(header) => Some((header.size, 0)),
        _ => None,
    }
}

fn number_format(cell: &GridCell) -> Option<String> {
    match &cell.payload {
        CellPayload::Number(number) => number.format.clone(),
        _ => None,
    }
}

/// Where a cell of `cell_type` may be written in a 3x3 grid.
fn position_for(cell_type: CellType, row: i32, col: i32, on_row_header: bool) -> (i32, i32) {
    match cell_type {
        CellType::TableHeader => (0, 0),
        CellType::Header if on_row_header => (row, 0),
        CellType::Header => (0, col),
        _ => (row, col),
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config())]

    #[test]
    fn merge_copies_only_flagged_fields((base, incoming) in merge_pair()) {
        let mut merged = base.clone();
        merged.merge(&incoming).unwrap();
        let m = incoming.mask;

        let pick = |flag: u32| if m.has(flag) { &incoming } else { &base };
        prop_assert_eq!(merged.color_bg, pick(ItemMask::BGCOLOR).color_bg);
        prop_assert_eq!(merged.color_fg, pick(ItemMask::FGCOLOR).color_fg);
        prop_assert_eq!(merged.font, pick(ItemMask::FONT).font);
        prop_assert_eq!(merged.image, pick(ItemMask::IMAGE).image);
        prop_assert_eq!(merged.style, pick(ItemMask::STYLE).style);
        prop_assert_eq!(main_content(&merged), main_content(pick(ItemMask::MAINCONTENT)));
        prop_assert_eq!(size_fields(&merged), size_fields(pick(ItemMask::SIZE)));
        prop_assert_eq!(number_format(&merged), number_format(&incoming).or_else(|| number_format(&base)));

        let mut again = merged.clone();
        again.merge(&incoming).unwrap();
        prop_assert_eq!(again, merged);
    }

    #[test]
    fn set_then_get_round_trips_flagged_fields(
        row in 1i32..=3,
        col in 1i32..=3,
        on_row_header in any::<bool>(),
        incoming in update_strategy(),
    ) {
        let cell_type = incoming.cell_type();
        let (row, col) = position_for(cell_type, row, col, on_row_header);
        let mut view = common::grid(3, 3);
        let before = match view.model().value_at(row, col) {
            Some(stored) => stored.clone(),
            None => GridCell::new(cell_type),
        };
        view.set_cell_property(&GridRange::single(row, col), &incoming).unwrap();
        let after = view.get_cell_property(row, col, Some(cell_type)).unwrap().cell;
        let m = incoming.mask;

        let pick = |flag: u32| if m.has(flag) { &incoming } else { &before };
        prop_assert_eq!(after.color_bg, pick(ItemMask::BGCOLOR).color_bg);
        prop_assert_eq!(after.color_fg, pick(ItemMask::FGCOLOR).color_fg);
        prop_assert_eq!(after.font, pick(ItemMask::FONT).font);
        prop_assert_eq!(after.image, pick(ItemMask::IMAGE).image);
        prop_assert_eq!(after.style, pick(ItemMask::STYLE).style);
        prop_assert_eq!(main_content(&after), main_content(pick(ItemMask::MAINCONTENT)));
        prop_assert_eq!(size_fields(&after), size_fields(pick(ItemMask::SIZE)));
    }
}
