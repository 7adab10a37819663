use crate::cell::{Cell, CellField};

/// One sheet's matrix of cells plus its field-level dirty tracking.
///
/// The backing store is a single row-major arena; the column view strides
/// through it, so row/column consistency holds by construction instead of
/// being a bookkeeping obligation.
///
/// Bounds come in two flavors:
/// - *committed*: the last row/column counts acknowledged by the remote
/// - *pending*: the high-water mark implied by local writes not yet flushed
///
/// Pending bounds are always ≥ committed bounds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
    committed_rows: u32,
    committed_columns: u32,
    pending_rows: u32,
    pending_columns: u32,
    /// Dirty coordinates in insertion order, deduplicated by position.
    dirty: Vec<(u32, u32)>,
}

impl Grid {
    /// Build a grid from fetched cell content.
    ///
    /// The arena is sized to the maximum observed position, with every
    /// position in that rectangle filled by a clean empty cell. Committed and
    /// pending bounds are both set to the *declared* dimensions, which need
    /// not match the observed rectangle.
    pub fn seed<I>(cells: I, declared_rows: u32, declared_columns: u32) -> Self
    where
        I: IntoIterator<Item = (u32, u32, String, String)>,
    {
        let cells: Vec<_> = cells.into_iter().collect();
        let mut height = 0u32;
        let mut width = 0u32;
        for &(row, column, ..) in &cells {
            height = height.max(row + 1);
            width = width.max(column + 1);
        }

        let mut grid = Grid {
            rows: new_arena(height, width),
            committed_rows: declared_rows,
            committed_columns: declared_columns,
            pending_rows: declared_rows,
            pending_columns: declared_columns,
            dirty: Vec::new(),
        };
        for (row, column, value, note) in cells {
            grid.rows[row as usize][column as usize].fill(value, note);
        }
        grid
    }

    /// Set a cell's value, growing the grid if the position is beyond its
    /// current extent.
    pub fn write(&mut self, row: u32, column: u32, value: impl Into<String>) {
        self.apply(row, column, CellField::Value, value.into());
    }

    /// Set a cell's note, growing the grid if needed.
    pub fn write_note(&mut self, row: u32, column: u32, note: impl Into<String>) {
        self.apply(row, column, CellField::Note, note.into());
    }

    fn apply(&mut self, row: u32, column: u32, field: CellField, text: String) {
        self.grow_to(row + 1, column + 1);
        let cell = &mut self.rows[row as usize][column as usize];
        let was_dirty = cell.is_dirty();
        cell.apply(field, text);
        if !was_dirty {
            self.dirty.push((row, column));
        }
        self.pending_rows = self.pending_rows.max(row + 1);
        self.pending_columns = self.pending_columns.max(column + 1);
    }

    /// Extend the arena in place so it covers at least `rows` × `columns`.
    ///
    /// Growth never shrinks or reorders existing rows/columns; new cells
    /// start clean and carry only their coordinates.
    fn grow_to(&mut self, rows: u32, columns: u32) {
        let width = (columns as usize).max(self.rows.first().map_or(0, Vec::len));
        for (r, row) in self.rows.iter_mut().enumerate() {
            for c in row.len()..width {
                row.push(Cell::new(r as u32, c as u32));
            }
        }
        for r in self.rows.len()..rows as usize {
            self.rows
                .push((0..width).map(|c| Cell::new(r as u32, c as u32)).collect());
        }
    }

    /// The cell at `(row, column)`, or `None` outside the arena.
    pub fn get(&self, row: u32, column: u32) -> Option<&Cell> {
        self.rows.get(row as usize)?.get(column as usize)
    }

    /// A snapshot of the cell at `(row, column)`. Out-of-bounds reads yield
    /// an empty cell rather than failing.
    pub fn read(&self, row: u32, column: u32) -> Cell {
        self.get(row, column)
            .cloned()
            .unwrap_or_else(|| Cell::new(row, column))
    }

    /// Row-major view of the arena.
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Column view: strides through the row-major arena.
    pub fn column(&self, column: u32) -> impl Iterator<Item = &Cell> {
        self.rows.iter().filter_map(move |row| row.get(column as usize))
    }

    /// `(rows, columns)` acknowledged by the remote.
    pub fn committed_bounds(&self) -> (u32, u32) {
        (self.committed_rows, self.committed_columns)
    }

    /// `(rows, columns)` implied by local writes not yet flushed.
    pub fn pending_bounds(&self) -> (u32, u32) {
        (self.pending_rows, self.pending_columns)
    }

    /// Whether a structural resize must precede the next flush.
    pub fn needs_resize(&self) -> bool {
        self.pending_rows > self.committed_rows || self.pending_columns > self.committed_columns
    }

    /// Raise pending bounds to at least `rows` × `columns` (used after an
    /// explicit remote expansion).
    pub fn raise_pending(&mut self, rows: u32, columns: u32) {
        self.pending_rows = self.pending_rows.max(rows);
        self.pending_columns = self.pending_columns.max(columns);
    }

    /// Reduce both bounds after a remote dimension deletion. The arena itself
    /// is left untouched.
    pub fn shrink_committed(&mut self, rows: u32, columns: u32) {
        self.committed_rows = self.committed_rows.saturating_sub(rows);
        self.committed_columns = self.committed_columns.saturating_sub(columns);
        self.pending_rows = self.pending_rows.saturating_sub(rows).max(self.committed_rows);
        self.pending_columns = self
            .pending_columns
            .saturating_sub(columns)
            .max(self.committed_columns);
    }

    pub fn dirty_len(&self) -> usize {
        self.dirty.len()
    }

    pub fn has_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Dirty cells in insertion order.
    pub fn dirty_cells(&self) -> impl Iterator<Item = &Cell> {
        self.dirty
            .iter()
            .map(|&(row, column)| &self.rows[row as usize][column as usize])
    }

    /// Clear the dirty markers for the given cells (a flush batch that
    /// landed), keeping the remaining dirty list in insertion order.
    pub fn mark_flushed<'a, I>(&mut self, cells: I)
    where
        I: IntoIterator<Item = &'a (u32, u32)>,
    {
        for &(row, column) in cells {
            if let Some(cell) = self
                .rows
                .get_mut(row as usize)
                .and_then(|r| r.get_mut(column as usize))
            {
                cell.clear_dirty();
            }
        }
        let rows = &self.rows;
        self.dirty
            .retain(|&(row, column)| rows[row as usize][column as usize].is_dirty());
    }

    /// Commit a fully successful synchronization: every dirty marker clears
    /// and committed bounds advance to pending, together.
    pub fn commit(&mut self) {
        for &(row, column) in &self.dirty {
            self.rows[row as usize][column as usize].clear_dirty();
        }
        self.dirty.clear();
        self.committed_rows = self.pending_rows;
        self.committed_columns = self.pending_columns;
    }
}

fn new_arena(rows: u32, columns: u32) -> Vec<Vec<Cell>> {
    (0..rows)
        .map(|r| (0..columns).map(|c| Cell::new(r, c)).collect())
        .collect()
}
