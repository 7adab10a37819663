//! Typed builders for the remote batch-update payload.
//!
//! Each [`Request`] variant serializes to one entry of the `requests` array,
//! externally tagged (`{"updateCells": {...}}`).

use serde::Serialize;
use serde_json::{json, Map, Value};
use sheetlink_model::{Cell, CellField, ExtendedValue, SheetProperties};

/// One remote update operation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Request {
    #[serde(rename = "updateCells")]
    UpdateCells(UpdateCells),
    #[serde(rename = "updateSheetProperties")]
    UpdateSheetProperties(UpdateSheetProperties),
    #[serde(rename = "addSheet")]
    AddSheet(AddSheet),
    #[serde(rename = "deleteSheet")]
    DeleteSheet(DeleteSheet),
    #[serde(rename = "duplicateSheet")]
    DuplicateSheet(DuplicateSheet),
    #[serde(rename = "deleteDimension")]
    DeleteDimension(DeleteDimension),
}

/// A field-masked update of one or more cells starting at a coordinate.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UpdateCells {
    pub rows: Vec<RowValues>,
    pub fields: String,
    pub start: GridCoordinate,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RowValues {
    pub values: Vec<CellUpdate>,
}

/// Only the fields named in the enclosing mask are populated; an absent
/// field must stay absent so untouched remote state is never erased.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_entered_value: Option<ExtendedValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCoordinate {
    pub sheet_id: u32,
    pub row_index: u32,
    pub column_index: u32,
}

/// A partial sheet-properties update: only the entries named by `fields` are
/// present in `properties` (plus the addressing `sheetId`).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UpdateSheetProperties {
    pub properties: Value,
    pub fields: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AddSheet {
    pub properties: SheetProperties,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSheet {
    pub sheet_id: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateSheet {
    pub source_sheet_id: u32,
    pub insert_sheet_index: u32,
    pub new_sheet_name: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteDimension {
    pub range: DimensionRange,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionRange {
    pub sheet_id: u32,
    pub dimension: Dimension,
    pub start_index: u32,
    pub end_index: u32,
}

/// Which axis a dimension request addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Dimension {
    Rows,
    Columns,
}

impl Request {
    /// One `updateCells` request for a single dirty cell, touching only its
    /// changed fields (classified into the typed wire value where needed).
    pub fn update_cell(sheet_id: u32, cell: &Cell) -> Request {
        let mut update = CellUpdate::default();
        for field in cell.dirty_fields().iter() {
            match field {
                CellField::Value => {
                    update.user_entered_value = Some(ExtendedValue::from_raw(cell.value()));
                }
                CellField::Note => update.note = Some(cell.note().to_string()),
            }
        }
        Request::UpdateCells(UpdateCells {
            rows: vec![RowValues {
                values: vec![update],
            }],
            fields: cell.dirty_fields().mask(),
            start: GridCoordinate {
                sheet_id,
                row_index: cell.row(),
                column_index: cell.column(),
            },
        })
    }

    /// A field-masked diff between the current and desired sheet properties.
    /// `None` when nothing differs.
    pub fn sheet_properties_diff(
        current: &SheetProperties,
        desired: &SheetProperties,
    ) -> Option<Request> {
        let mut properties = Map::new();
        let mut fields: Vec<&str> = Vec::new();
        properties.insert("sheetId".to_string(), json!(current.id));

        if desired.title != current.title {
            properties.insert("title".to_string(), json!(desired.title));
            fields.push("title");
        }
        if desired.index != current.index {
            properties.insert("index".to_string(), json!(desired.index));
            fields.push("index");
        }

        let mut grid = Map::new();
        let want = &desired.grid_properties;
        let have = &current.grid_properties;
        if want.row_count != have.row_count {
            grid.insert("rowCount".to_string(), json!(want.row_count));
            fields.push("gridProperties.rowCount");
        }
        if want.column_count != have.column_count {
            grid.insert("columnCount".to_string(), json!(want.column_count));
            fields.push("gridProperties.columnCount");
        }
        if want.frozen_row_count != have.frozen_row_count {
            grid.insert("frozenRowCount".to_string(), json!(want.frozen_row_count));
            fields.push("gridProperties.frozenRowCount");
        }
        if want.frozen_column_count != have.frozen_column_count {
            grid.insert(
                "frozenColumnCount".to_string(),
                json!(want.frozen_column_count),
            );
            fields.push("gridProperties.frozenColumnCount");
        }
        if want.hide_gridlines != have.hide_gridlines {
            grid.insert("hideGridlines".to_string(), json!(want.hide_gridlines));
            fields.push("gridProperties.hideGridlines");
        }
        if !grid.is_empty() {
            properties.insert("gridProperties".to_string(), Value::Object(grid));
        }

        if desired.hidden != current.hidden {
            properties.insert("hidden".to_string(), json!(desired.hidden));
            fields.push("hidden");
        }
        if desired.tab_color != current.tab_color {
            properties.insert("tabColor".to_string(), json!(desired.tab_color));
            fields.push("tabColor");
        }
        if desired.right_to_left != current.right_to_left {
            properties.insert("rightToLeft".to_string(), json!(desired.right_to_left));
            fields.push("rightToLeft");
        }

        if fields.is_empty() {
            return None;
        }
        Some(Request::UpdateSheetProperties(UpdateSheetProperties {
            properties: Value::Object(properties),
            fields: fields.join(","),
        }))
    }

    /// The structural resize request growing a sheet's grid to
    /// `rows` × `columns`.
    pub fn expand_grid(sheet_id: u32, rows: u32, columns: u32) -> Request {
        Request::UpdateSheetProperties(UpdateSheetProperties {
            properties: json!({
                "sheetId": sheet_id,
                "gridProperties": { "rowCount": rows, "columnCount": columns },
            }),
            fields: "gridProperties.rowCount,gridProperties.columnCount".to_string(),
        })
    }

    pub fn add_sheet(properties: SheetProperties) -> Request {
        Request::AddSheet(AddSheet { properties })
    }

    pub fn delete_sheet(sheet_id: u32) -> Request {
        Request::DeleteSheet(DeleteSheet { sheet_id })
    }

    pub fn duplicate_sheet(sheet_id: u32, insert_index: u32, title: &str) -> Request {
        Request::DuplicateSheet(DuplicateSheet {
            source_sheet_id: sheet_id,
            insert_sheet_index: insert_index,
            new_sheet_name: title.to_string(),
        })
    }

    pub fn delete_dimension(
        sheet_id: u32,
        dimension: Dimension,
        start_index: u32,
        end_index: u32,
    ) -> Request {
        Request::DeleteDimension(DeleteDimension {
            range: DimensionRange {
                sheet_id,
                dimension,
                start_index,
                end_index,
            },
        })
    }
}
