use core::fmt;

use thiserror::Error;

/// Longest accepted column label. 13 `Z`s is already ~2.5 × 10¹⁸ columns, so
/// anything longer is rejected before it can overflow the accumulator.
pub const MAX_LABEL_LEN: usize = 13;

/// Errors from the spreadsheet address codec.
///
/// These are always local caller mistakes; nothing here is retryable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid address format: {0:?}")]
    InvalidFormat(String),
    #[error("address input too long to classify safely: {0:?}")]
    BoundsExceeded(String),
}

/// Convert a 1-based column number to its spreadsheet letter label
/// (`1 → "A"`, `26 → "Z"`, `27 → "AA"`).
///
/// The alphabet is bijective base-26: there is no digit for zero, so
/// non-positive input has no representation and yields the empty string.
pub fn column_label(number: i64) -> String {
    let mut n = number;
    let mut out = Vec::<u8>::new();
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        out.push(b'A' + rem);
        n = (n - 1) / 26;
    }
    out.reverse();
    String::from_utf8(out).expect("column letters are always valid UTF-8")
}

/// Inverse of [`column_label`]: parse an `A–Z` label into its 1-based column
/// number.
pub fn label_to_column(label: &str) -> Result<i64, AddressError> {
    if label.is_empty() {
        return Err(AddressError::InvalidFormat(label.to_string()));
    }
    if label.len() > MAX_LABEL_LEN {
        return Err(AddressError::BoundsExceeded(label.to_string()));
    }
    let mut column: i64 = 0;
    for b in label.bytes() {
        if !b.is_ascii_uppercase() {
            return Err(AddressError::InvalidFormat(label.to_string()));
        }
        column = column * 26 + i64::from(b - b'A') + 1;
    }
    Ok(column)
}

/// Render a 0-based `(row, column)` position as its human-readable label
/// (`(0, 0) → "A1"`).
pub fn position(row: u32, column: u32) -> String {
    format!("{}{}", column_label(i64::from(column) + 1), row + 1)
}

/// A parsed `'Sheet Name'!A1:B2` range reference.
///
/// Coordinates are 0-based and inclusive on both ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeRef {
    /// Sheet name without the surrounding quotes; empty when the reference
    /// carried none.
    pub sheet_name: String,
    pub start_column: u32,
    pub start_row: u32,
    pub end_column: u32,
    pub end_row: u32,
}

impl fmt::Display for RangeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.sheet_name.is_empty() {
            write!(f, "'{}'", self.sheet_name)?;
        }
        write!(
            f,
            "!{}{}:{}{}",
            column_label(i64::from(self.start_column) + 1),
            self.start_row + 1,
            column_label(i64::from(self.end_column) + 1),
            self.end_row + 1,
        )
    }
}

/// Parse a `'Sheet Name'!A1:B2`-style range reference.
///
/// The grammar is fixed: an optional single-quoted sheet name, `!`, column
/// letters, 1-based row digits, `:`, column letters, row digits. Any other
/// shape is [`AddressError::InvalidFormat`].
pub fn parse_range_reference(text: &str) -> Result<RangeRef, AddressError> {
    let invalid = || AddressError::InvalidFormat(text.to_string());

    let (sheet_name, rest) = match text.strip_prefix('\'') {
        Some(quoted) => {
            let (name, rest) = quoted.split_once('\'').ok_or_else(invalid)?;
            (name.to_string(), rest)
        }
        None => (String::new(), text),
    };
    let cells = rest.strip_prefix('!').ok_or_else(invalid)?;
    let (start, end) = cells.split_once(':').ok_or_else(invalid)?;

    let (start_column, start_row) = parse_cell_reference(start, text)?;
    let (end_column, end_row) = parse_cell_reference(end, text)?;

    Ok(RangeRef {
        sheet_name,
        start_column,
        start_row,
        end_column,
        end_row,
    })
}

/// Parse one `A1`-style endpoint into 0-based `(column, row)`.
fn parse_cell_reference(s: &str, whole: &str) -> Result<(u32, u32), AddressError> {
    let invalid = || AddressError::InvalidFormat(whole.to_string());

    let digits_at = s
        .bytes()
        .position(|b| b.is_ascii_digit())
        .ok_or_else(invalid)?;
    let (letters, digits) = s.split_at(digits_at);
    if letters.is_empty() {
        return Err(invalid());
    }

    let column = match label_to_column(letters) {
        Ok(column) => column,
        Err(AddressError::BoundsExceeded(_)) => {
            return Err(AddressError::BoundsExceeded(whole.to_string()))
        }
        Err(AddressError::InvalidFormat(_)) => return Err(invalid()),
    };
    let column = u32::try_from(column - 1).map_err(|_| AddressError::BoundsExceeded(whole.to_string()))?;

    let row: u32 = digits.parse().map_err(|_| invalid())?;
    if row == 0 {
        return Err(invalid());
    }
    Ok((column, row - 1))
}
