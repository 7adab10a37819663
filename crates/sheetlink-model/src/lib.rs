//! `sheetlink-model` defines the in-memory mirror of a remote spreadsheet.
//!
//! The crate is intentionally free of I/O so it can be reused by:
//! - the synchronization client (`sheetlink-client`)
//! - alternative transports and test harnesses via `serde` (JSON-safe schema)
//!
//! Rows and columns are 0-indexed internally; A1-style labels are 1-based.

mod address;
mod cell;
mod document;
mod grid;
mod sheet;
mod value;

pub use address::{
    column_label, label_to_column, parse_range_reference, position, AddressError, RangeRef,
    MAX_LABEL_LEN,
};
pub use cell::{Cell, CellField, FieldSet};
pub use document::{Document, DocumentProperties};
pub use grid::Grid;
pub use sheet::{
    CellData, DimensionProperties, GridData, GridProperties, RowData, Sheet, SheetData,
    SheetProperties, TabColor,
};
pub use value::{classify, ErrorValue, ExtendedValue, ValueKind};
