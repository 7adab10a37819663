use serde::{Deserialize, Deserializer, Serialize};

use crate::cell::Cell;
use crate::grid::Grid;
use crate::value::ExtendedValue;

/// Properties of one sheet within a document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SheetProperties {
    #[serde(rename = "sheetId")]
    pub id: u32,
    pub title: String,
    pub index: u32,
    pub sheet_type: String,
    pub grid_properties: GridProperties,
    pub hidden: bool,
    pub tab_color: TabColor,
    pub right_to_left: bool,
}

/// Grid dimensions and display properties of a sheet.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridProperties {
    pub row_count: u32,
    pub column_count: u32,
    pub frozen_row_count: u32,
    pub frozen_column_count: u32,
    pub hide_gridlines: bool,
}

/// The color of a sheet's tab.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TabColor {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
    pub alpha: f32,
}

/// Visibility and sizing metadata for one row or column.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DimensionProperties {
    pub hidden_by_filter: bool,
    pub hidden_by_user: bool,
    pub pixel_size: u32,
}

/// Fetched cell content.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CellData {
    pub user_entered_value: Option<ExtendedValue>,
    pub effective_value: Option<ExtendedValue>,
    pub formatted_value: String,
    pub hyperlink: String,
    pub note: String,
}

/// One fetched row of cells.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RowData {
    pub values: Vec<CellData>,
}

/// A fetched rectangle of grid content plus per-dimension metadata.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridData {
    pub start_row: u32,
    pub start_column: u32,
    pub row_data: Vec<RowData>,
    pub row_metadata: Vec<DimensionProperties>,
    pub column_metadata: Vec<DimensionProperties>,
}

/// The raw fetched grid rectangles of a sheet; kept around for the
/// row/column visibility metadata the grid itself does not mirror.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SheetData {
    pub grid_data: Vec<GridData>,
}

/// One sheet of a document: its properties, the raw fetched data, and the
/// local grid mirror with dirty tracking.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Sheet {
    pub properties: SheetProperties,
    pub data: SheetData,
    grid: Grid,
    pub(crate) document_id: String,
}

impl Sheet {
    /// Seed a sheet's grid from its fetched parts.
    pub fn from_parts(properties: SheetProperties, data: SheetData) -> Self {
        let mut seeds = Vec::new();
        for grid_data in &data.grid_data {
            for (r, row) in grid_data.row_data.iter().enumerate() {
                for (c, cell) in row.values.iter().enumerate() {
                    seeds.push((
                        grid_data.start_row + r as u32,
                        grid_data.start_column + c as u32,
                        cell.formatted_value.clone(),
                        cell.note.clone(),
                    ));
                }
            }
        }
        let grid = Grid::seed(
            seeds,
            properties.grid_properties.row_count,
            properties.grid_properties.column_count,
        );
        Sheet {
            properties,
            data,
            grid,
            document_id: String::new(),
        }
    }

    /// The id of the document this sheet was fetched from.
    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    /// The remote sheet id used to address updates.
    pub fn sheet_id(&self) -> u32 {
        self.properties.id
    }

    /// The local grid mirror.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Set a cell's value, growing the grid on demand.
    pub fn write(&mut self, row: u32, column: u32, value: impl Into<String>) {
        self.grid.write(row, column, value);
    }

    /// Set a cell's note, growing the grid on demand.
    pub fn write_note(&mut self, row: u32, column: u32, note: impl Into<String>) {
        self.grid.write_note(row, column, note);
    }

    /// A snapshot of the cell at `(row, column)`; empty when out of bounds.
    pub fn read(&self, row: u32, column: u32) -> Cell {
        self.grid.read(row, column)
    }

    pub fn get(&self, row: u32, column: u32) -> Option<&Cell> {
        self.grid.get(row, column)
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        self.grid.rows()
    }

    pub fn column(&self, column: u32) -> impl Iterator<Item = &Cell> {
        self.grid.column(column)
    }

    pub fn has_dirty(&self) -> bool {
        self.grid.has_dirty()
    }

    pub fn dirty_cells(&self) -> impl Iterator<Item = &Cell> {
        self.grid.dirty_cells()
    }

    pub fn pending_bounds(&self) -> (u32, u32) {
        self.grid.pending_bounds()
    }

    pub fn committed_bounds(&self) -> (u32, u32) {
        self.grid.committed_bounds()
    }

    pub fn needs_resize(&self) -> bool {
        self.grid.needs_resize()
    }

    /// Raise pending bounds after an explicit remote expansion.
    pub fn raise_pending(&mut self, rows: u32, columns: u32) {
        self.grid.raise_pending(rows, columns);
    }

    /// Clear the dirty markers of one landed flush batch.
    pub fn mark_flushed<'a, I>(&mut self, cells: I)
    where
        I: IntoIterator<Item = &'a (u32, u32)>,
    {
        self.grid.mark_flushed(cells);
    }

    /// Commit a fully successful synchronization: dirty markers clear and
    /// committed bounds advance to pending, in both the grid and the sheet
    /// properties.
    pub fn commit_sync(&mut self) {
        self.grid.commit();
        let (rows, columns) = self.grid.committed_bounds();
        self.properties.grid_properties.row_count = rows;
        self.properties.grid_properties.column_count = columns;
    }

    /// Drop `count` rows from the declared bounds after a remote deletion.
    pub fn shrink_rows(&mut self, count: u32) {
        self.grid.shrink_committed(count, 0);
        self.properties.grid_properties.row_count =
            self.properties.grid_properties.row_count.saturating_sub(count);
    }

    /// Drop `count` columns from the declared bounds after a remote deletion.
    pub fn shrink_columns(&mut self, count: u32) {
        self.grid.shrink_committed(0, count);
        self.properties.grid_properties.column_count = self
            .properties
            .grid_properties
            .column_count
            .saturating_sub(count);
    }
}

impl<'de> Deserialize<'de> for Sheet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Default, Deserialize)]
        #[serde(default)]
        struct Raw {
            properties: SheetProperties,
            data: SheetData,
        }

        let raw = Raw::deserialize(deserializer)?;
        Ok(Sheet::from_parts(raw.properties, raw.data))
    }
}
