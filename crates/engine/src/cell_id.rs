//! Cell coordinates and header labels.
//!
//! Row 0 is the column-header strip and column 0 the row-header strip, so
//! data cells start at (1, 1).

use serde::{Deserialize, Serialize};

/// Key of a cell in the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId {
    pub row: i32,
    pub col: i32,
}

impl CellId {
    #[inline]
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    #[inline]
    pub fn is_header(&self) -> bool {
        self.row == 0 || self.col == 0
    }
}

impl std::fmt::Display for CellId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.col >= 1 {
            write!(f, "{}{}", column_label(self.col), self.row)
        } else {
            write!(f, "R{}C{}", self.row, self.col)
        }
    }
}

/// Bijective base-26 label for a 1-based column: 1=A, 26=Z, 27=AA, 53=BA.
///
/// Returns an empty string for columns below 1.
pub fn column_label(col: i32) -> String {
    if col < 1 {
        return String::new();
    }
    let mut result = String::new();
    let mut n = (col - 1) as u32;
    loop {
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    result
}

/// Decimal label for a 1-based row.
pub fn row_label(row: i32) -> String {
    row.to_string()
}
