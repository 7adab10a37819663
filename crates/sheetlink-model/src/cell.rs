use crate::address;

/// The closed set of per-cell fields the update protocol can touch.
///
/// The remote requires a `fields` mask naming exactly what an update changes;
/// keeping this a closed enum (rather than free-form strings) makes duplicate
/// or malformed masks unrepresentable.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CellField {
    Value,
    Note,
}

impl CellField {
    /// The field's name in the remote `fields` mask.
    pub fn wire_name(self) -> &'static str {
        match self {
            CellField::Value => "userEnteredValue",
            CellField::Note => "note",
        }
    }
}

/// The set of [`CellField`]s changed since the last committed synchronization.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldSet {
    value: bool,
    note: bool,
}

impl FieldSet {
    pub fn insert(&mut self, field: CellField) {
        match field {
            CellField::Value => self.value = true,
            CellField::Note => self.note = true,
        }
    }

    pub fn contains(self, field: CellField) -> bool {
        match field {
            CellField::Value => self.value,
            CellField::Note => self.note,
        }
    }

    pub fn is_empty(self) -> bool {
        !self.value && !self.note
    }

    pub fn clear(&mut self) {
        *self = FieldSet::default();
    }

    /// Iterate the contained fields in mask order.
    pub fn iter(self) -> impl Iterator<Item = CellField> {
        [CellField::Value, CellField::Note]
            .into_iter()
            .filter(move |&f| self.contains(f))
    }

    /// The comma-joined `fields` mask, in a deterministic order
    /// (`"userEnteredValue,note"` when both are set).
    pub fn mask(self) -> String {
        self.iter()
            .map(CellField::wire_name)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// One grid position: a display value, an optional note, and the set of
/// fields edited locally since the last commit.
///
/// A cell's coordinates are fixed at creation; only value, note, and the
/// dirty-field set ever change.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Cell {
    row: u32,
    column: u32,
    value: String,
    note: String,
    dirty: FieldSet,
}

impl Cell {
    pub(crate) fn new(row: u32, column: u32) -> Self {
        Cell {
            row,
            column,
            ..Cell::default()
        }
    }

    /// 0-based row index.
    pub fn row(&self) -> u32 {
        self.row
    }

    /// 0-based column index.
    pub fn column(&self) -> u32 {
        self.column
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    /// Fields changed locally since the last committed synchronization.
    pub fn dirty_fields(&self) -> FieldSet {
        self.dirty
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// The cell's human-readable position, like `"A1"`.
    pub fn position(&self) -> String {
        address::position(self.row, self.column)
    }

    /// Seed content from a fetch without marking anything dirty.
    pub(crate) fn fill(&mut self, value: String, note: String) {
        self.value = value;
        self.note = note;
    }

    /// Apply a local edit and record the touched field.
    pub(crate) fn apply(&mut self, field: CellField, text: String) {
        match field {
            CellField::Value => self.value = text,
            CellField::Note => self.note = text,
        }
        self.dirty.insert(field);
    }

    pub(crate) fn clear_dirty(&mut self) {
        self.dirty.clear();
    }
}
