// src/models/table.rs

use serde::{Deserialize, Serialize};

use crate::models::image::ScaleRequest;
use crate::models::style::Alignment;

/// One cell of a table grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableCell {
    /// Plain text of the cell.
    pub text: String,
    /// Inline HTML of the cell (formatting tags kept).
    pub html: String,
    /// True for `th` cells.
    #[serde(default)]
    pub header: bool,
    /// Alignment hint from the cell's inline style.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align: Option<Alignment>,
}

/// Row-major table grid. Rows may be ragged; renderers pad as needed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableContent {
    pub rows: Vec<Vec<TableCell>>,
    /// Measured widths of the first row's cells, when the measurer reported them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_widths: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<ScaleRequest>,
}

impl TableContent {
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn has_header(&self) -> bool {
        self.rows
            .first()
            .is_some_and(|row| !row.is_empty() && row.iter().all(|c| c.header))
    }
}
