// src/blocks/mod.rs
//
// Assembles the normalized per-sheet unit the dashboard consumes. One sheet
// becomes one block: header names, the selected date slice as JSON rows,
// the numeric-column indices, and (for the designated sheet) the
// previous-period snapshot.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::dates::normalize_cell;
use crate::delta::{previous_snapshot, Snapshot};
use crate::shape::{find_date_column, numeric_column_indices};
use crate::slice::{select, SlicePolicy};
use crate::workbook::{Cell, Sheet};

/// Day-over-day section, present only on the designated delta sheet's block.
/// Both keys are always emitted there, as `null` / `{}` when the sheet has
/// no earlier slice to compare against.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeltaSection {
    pub prev_date: Option<String>,
    pub prev_values: Snapshot,
}

/// Normalized output unit for one sheet.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: String,
    pub title: String,
    pub sheet_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub numeric_columns: Vec<usize>,
    #[serde(flatten)]
    pub delta: Option<DeltaSection>,
}

/// Build one block per sheet, in workbook order.
pub fn build_blocks(
    sheets: &[Sheet],
    requested: Option<NaiveDate>,
    policy: SlicePolicy,
    delta_sheet: &str,
    identifier_markers: &[String],
) -> Vec<Block> {
    sheets
        .iter()
        .map(|sheet| build_block(sheet, requested, policy, delta_sheet, identifier_markers))
        .collect()
}

fn build_block(
    sheet: &Sheet,
    requested: Option<NaiveDate>,
    policy: SlicePolicy,
    delta_sheet: &str,
    identifier_markers: &[String],
) -> Block {
    let mut block = Block {
        id: sheet.name.clone(),
        title: sheet.name.clone(),
        sheet_name: sheet.name.clone(),
        columns: sheet.columns.clone(),
        rows: Vec::new(),
        numeric_columns: Vec::new(),
        delta: None,
    };

    if sheet.is_blank() {
        debug!(sheet = %sheet.name, "sheet has no rows at all; emitting empty block");
        return block;
    }

    let date_col = find_date_column(sheet);
    let (selected, resolved) = select(sheet, date_col, requested, policy);

    if sheet.name == delta_sheet {
        let mut section = DeltaSection::default();
        if let (Some(col), Some(resolved)) = (date_col, resolved) {
            let (prev_date, prev_values) =
                previous_snapshot(sheet, col, resolved, identifier_markers);
            section.prev_date = prev_date.map(|d| d.format("%Y-%m-%d").to_string());
            section.prev_values = prev_values;
        }
        block.delta = Some(section);
    }

    // Rows that are null in every cell never reach the output, whatever the
    // slice said.
    let kept: Vec<&Vec<Cell>> = selected
        .into_iter()
        .map(|idx| &sheet.rows[idx])
        .filter(|row| row.iter().any(|cell| !cell.is_empty()))
        .collect();

    block.rows = kept.iter().map(|row| display_row(row)).collect();
    block.numeric_columns = numeric_column_indices(sheet.columns.len(), &kept);
    block
}

/// A row for the wire: cells that read as dates become ISO `YYYY-MM-DD`
/// text, everything else stays a raw scalar.
fn display_row(row: &[Cell]) -> Vec<Value> {
    row.iter()
        .map(|cell| match normalize_cell(cell) {
            Some(date) => Value::from(date.format("%Y-%m-%d").to_string()),
            None => cell.to_json(),
        })
        .collect()
}
