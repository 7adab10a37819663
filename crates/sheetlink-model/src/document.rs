use serde::{Deserialize, Deserializer, Serialize};

use crate::sheet::Sheet;

/// Document-level properties.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentProperties {
    pub title: String,
    pub locale: String,
    pub auto_recalc: String,
    #[serde(rename = "timezone")]
    pub time_zone: String,
}

/// A fetched remote document: properties plus its sheets.
///
/// Deserializing a document links each sheet back to the document id so a
/// sheet alone is enough to address updates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    pub id: String,
    pub properties: DocumentProperties,
    pub sheets: Vec<Sheet>,
}

impl Document {
    pub fn sheet_by_index(&self, index: usize) -> Option<&Sheet> {
        self.sheets.get(index)
    }

    pub fn sheet_by_index_mut(&mut self, index: usize) -> Option<&mut Sheet> {
        self.sheets.get_mut(index)
    }

    pub fn sheet_by_id(&self, id: u32) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.properties.id == id)
    }

    pub fn sheet_by_id_mut(&mut self, id: u32) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|s| s.properties.id == id)
    }

    pub fn sheet_by_title(&self, title: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.properties.title == title)
    }

    pub fn sheet_by_title_mut(&mut self, title: &str) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|s| s.properties.title == title)
    }
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Default, Deserialize)]
        #[serde(rename_all = "camelCase", default)]
        struct Raw {
            spreadsheet_id: String,
            properties: DocumentProperties,
            sheets: Vec<Sheet>,
        }

        let raw = Raw::deserialize(deserializer)?;
        let mut document = Document {
            id: raw.spreadsheet_id,
            properties: raw.properties,
            sheets: raw.sheets,
        };
        for sheet in &mut document.sheets {
            sheet.document_id = document.id.clone();
        }
        Ok(document)
    }
}
