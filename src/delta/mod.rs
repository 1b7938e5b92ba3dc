// src/delta/mod.rs
//
// Previous-period lookup for the one sheet that shows day-over-day movement.
// The dashboard renders arrows next to numbers by comparing today's slice
// against the per-identifier snapshot computed here.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::debug;

use crate::shape::rows_by_date;
use crate::workbook::Sheet;

/// identifier → (column name → numeric value) for one date slice.
pub type Snapshot = BTreeMap<String, BTreeMap<String, f64>>;

/// First header column whose lowercased name contains one of `markers`;
/// column 0 when nothing matches.
pub fn identifier_column(columns: &[String], markers: &[String]) -> usize {
    columns
        .iter()
        .position(|name| {
            let name = name.trim().to_lowercase();
            markers.iter().any(|marker| name.contains(marker.as_str()))
        })
        .unwrap_or(0)
}

/// Resolve the slice immediately preceding `resolved` and snapshot its
/// numeric cells per row identifier.
///
/// The previous date is the greatest date on the sheet strictly before
/// `resolved`, or absent if there is none (then the snapshot is empty). Rows
/// whose identifier cell is null or trims to empty are skipped; a duplicate
/// identifier overwrites the earlier row's entry.
pub fn previous_snapshot(
    sheet: &Sheet,
    date_col: usize,
    resolved: NaiveDate,
    identifier_markers: &[String],
) -> (Option<NaiveDate>, Snapshot) {
    let by_date = rows_by_date(sheet, date_col);

    let prev_date = by_date
        .range(..resolved)
        .next_back()
        .map(|(date, _)| *date);
    let Some(prev_date) = prev_date else {
        return (None, Snapshot::new());
    };

    let id_col = identifier_column(&sheet.columns, identifier_markers);
    debug!(sheet = %sheet.name, %prev_date, id_col, "building previous-period snapshot");

    let mut snapshot = Snapshot::new();
    for &row_idx in &by_date[&prev_date] {
        let row = &sheet.rows[row_idx];
        let key = row[id_col].display_text().trim().to_string();
        if key.is_empty() {
            continue;
        }

        let mut values = BTreeMap::new();
        for (col_idx, cell) in row.iter().enumerate() {
            if let Some(num) = cell.as_number() {
                values.insert(sheet.columns[col_idx].clone(), num);
            }
        }
        snapshot.insert(key, values);
    }

    (Some(prev_date), snapshot)
}
