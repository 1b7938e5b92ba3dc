// src/shape/mod.rs
//
// Structure discovery for one sheet: which column carries dates, how rows
// group by date, and which columns are numeric. Nothing here is declared in
// a schema; it is all sniffed from the data.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::trace;

use crate::dates::normalize_cell;
use crate::workbook::{Cell, Sheet};

/// Find the sheet's date column, if any: columns are scanned left to right,
/// rows top to bottom, and the first column with at least one cell that reads
/// as a date wins. No scoring across columns.
pub fn find_date_column(sheet: &Sheet) -> Option<usize> {
    for col in 0..sheet.columns.len() {
        for row in &sheet.rows {
            if normalize_cell(&row[col]).is_some() {
                trace!(sheet = %sheet.name, col, "date column found");
                return Some(col);
            }
        }
    }
    None
}

/// Group data-row indices by the date in `date_col`. Rows whose cell in that
/// column does not read as a date are left out of the mapping entirely.
pub fn rows_by_date(sheet: &Sheet, date_col: usize) -> BTreeMap<NaiveDate, Vec<usize>> {
    let mut by_date: BTreeMap<NaiveDate, Vec<usize>> = BTreeMap::new();
    for (idx, row) in sheet.rows.iter().enumerate() {
        if let Some(date) = normalize_cell(&row[date_col]) {
            by_date.entry(date).or_default().push(idx);
        }
    }
    by_date
}

/// Columns holding at least one native number across the given rows. Computed
/// over the rows actually selected for display, not the whole sheet.
pub fn numeric_column_indices(width: usize, rows: &[&Vec<Cell>]) -> Vec<usize> {
    let mut flags = vec![false; width];
    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(width) {
            if cell.as_number().is_some() {
                flags[idx] = true;
            }
        }
    }
    flags
        .into_iter()
        .enumerate()
        .filter_map(|(idx, is_num)| is_num.then_some(idx))
        .collect()
}
